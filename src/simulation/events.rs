//! Events and the run log

use serde::{Deserialize, Serialize};

use crate::core::types::{Position, TechLevel};

/// Something that happened during a step
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u32,
    /// 1-based step the event was produced in
    pub step: u32,
    /// Years elapsed at the end of that step
    pub year: f32,
    pub tech: TechLevel,
    pub kind: EventKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    // Intrusions
    IntrusionRepelled { position: Position, risk: f32 },
    IntrusionSucceeded { position: Position, risk: f32, damage: f32 },

    // Decay
    MarkerRuined { position: Position, from: String, to: String },

    // Terminal
    Breach { position: Position },
}

impl EventKind {
    pub fn position(&self) -> Position {
        match self {
            EventKind::IntrusionRepelled { position, .. }
            | EventKind::IntrusionSucceeded { position, .. }
            | EventKind::MarkerRuined { position, .. }
            | EventKind::Breach { position } => *position,
        }
    }

    pub fn is_intrusion(&self) -> bool {
        matches!(
            self,
            EventKind::IntrusionRepelled { .. }
                | EventKind::IntrusionSucceeded { .. }
                | EventKind::Breach { .. }
        )
    }
}

/// Chronological, append-only event log
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    pub events: Vec<Event>,
    next_event_id: u32,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event(&mut self, kind: EventKind, step: u32, year: f32, tech: TechLevel) -> u32 {
        let id = self.next_event_id;
        self.next_event_id += 1;

        self.events.push(Event {
            id,
            step,
            year,
            tech,
            kind,
        });

        id
    }

    pub fn events_for_step(&self, step: u32) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.step == step)
    }

    pub fn events_at(&self, position: Position) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.kind.position() == position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
