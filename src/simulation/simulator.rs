//! Event simulator: the time-stepped run loop
//!
//! A run takes its own copy of the site map and walks it through a fixed
//! number of steps. Each step ages every marker, resolves effective
//! attributes, rolls intrusions cell by cell in row-major order, applies
//! ruin transitions and records a snapshot. A successful intrusion on a core
//! cell ends the run as `Breached`; surviving every step ends it as
//! `Completed`.
//!
//! All randomness comes from one `ChaCha8Rng` whose seed is derived from the
//! run parameters, so the same map, duration and buffs always produce the
//! same report.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::core::config::{config, SimulationConfig};
use crate::core::error::{InvariantViolation, Result};
use crate::core::types::TechLevel;
use crate::markers::MarkerCatalog;
use crate::simulation::events::{EventKind, EventLog};
use crate::simulation::intrusion::{assess, attempt_probability, CellRisk};
use crate::simulation::report::{CellSnapshot, MapSnapshot, SimulationReport, SimulationStats};
use crate::simulation::resolver::{EffectiveGrid, InteractionResolver};
use crate::site::{GlobalBuffs, Grid, SiteMap};

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Running,
    Breached,
    Completed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        self != RunState::Running
    }
}

/// Run the built-in catalog and global config over a copy of `site_map`
///
/// The seed is derived from the arguments; see [`derive_seed`].
pub fn run_simulation(duration_years: u32, site_map: &SiteMap, global_buffs: &GlobalBuffs) -> Result<SimulationReport> {
    let seed = derive_seed(duration_years, site_map, global_buffs);
    run_simulation_seeded(duration_years, site_map, global_buffs, seed)
}

/// Like [`run_simulation`] with an explicit seed
pub fn run_simulation_seeded(
    duration_years: u32,
    site_map: &SiteMap,
    global_buffs: &GlobalBuffs,
    seed: u64,
) -> Result<SimulationReport> {
    let catalog = MarkerCatalog::builtin()?;
    Simulator::new(catalog, config(), duration_years, site_map, global_buffs, seed)?.run()
}

/// Stable seed for a run: blake3 over a canonical encoding of its inputs
pub fn derive_seed(duration_years: u32, site_map: &SiteMap, global_buffs: &GlobalBuffs) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"place-of-honor/run-seed");
    hasher.update(&duration_years.to_le_bytes());
    hasher.update(&(site_map.width() as u64).to_le_bytes());
    hasher.update(&(site_map.height() as u64).to_le_bytes());

    let core: Vec<_> = site_map.core_positions().collect();
    hasher.update(&(core.len() as u64).to_le_bytes());
    for pos in core {
        hasher.update(&(pos.row as u64).to_le_bytes());
        hasher.update(&(pos.col as u64).to_le_bytes());
    }

    hasher.update(&(site_map.cell_count() as u64).to_le_bytes());
    for cell in site_map.cells() {
        hasher.update(&(cell.position.row as u64).to_le_bytes());
        hasher.update(&(cell.position.col as u64).to_le_bytes());
        hasher.update(&(cell.marker.len() as u64).to_le_bytes());
        hasher.update(cell.marker.as_bytes());
    }

    hasher.update(&(global_buffs.len() as u64).to_le_bytes());
    for (id, magnitude) in global_buffs.iter() {
        hasher.update(&(id.len() as u64).to_le_bytes());
        hasher.update(id.as_bytes());
        hasher.update(&magnitude.to_bits().to_le_bytes());
    }

    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hasher.finalize().as_bytes()[..8]);
    u64::from_le_bytes(seed)
}

/// One run in progress
pub struct Simulator<'a> {
    catalog: &'a MarkerCatalog,
    config: &'a SimulationConfig,
    buffs: &'a GlobalBuffs,
    map: SiteMap,
    duration_years: u32,
    seed: u64,
    rng: ChaCha8Rng,
    state: RunState,
    step: u32,
    elapsed_years: f32,
    peak_risk: f32,
    log: EventLog,
    snapshots: Vec<MapSnapshot>,
}

impl<'a> Simulator<'a> {
    /// Validate the inputs and take a working copy of the map
    pub fn new(
        catalog: &'a MarkerCatalog,
        config: &'a SimulationConfig,
        duration_years: u32,
        site_map: &SiteMap,
        buffs: &'a GlobalBuffs,
        seed: u64,
    ) -> Result<Self> {
        if duration_years == 0 {
            return Err(InvariantViolation::NonPositiveDuration(duration_years).into());
        }
        config.validate()?;
        buffs.validate()?;
        site_map.validate(catalog)?;

        Ok(Self {
            catalog,
            config,
            buffs,
            map: site_map.snapshot(),
            duration_years,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            state: RunState::Running,
            step: 0,
            elapsed_years: 0.0,
            peak_risk: 0.0,
            log: EventLog::new(),
            snapshots: Vec::with_capacity(config.steps_per_run as usize),
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn elapsed_years(&self) -> f32 {
        self.elapsed_years
    }

    /// The run's working copy of the map
    pub fn map(&self) -> &SiteMap {
        &self.map
    }

    /// Step until the run reaches a terminal state
    pub fn run(mut self) -> Result<SimulationReport> {
        info!(
            seed = self.seed,
            duration = self.duration_years,
            cells = self.map.cell_count(),
            "Starting site simulation"
        );

        while !self.state.is_terminal() {
            self.step()?;
        }

        info!(
            outcome = ?self.state,
            events = self.log.len(),
            years = self.elapsed_years,
            "Site simulation finished"
        );

        Ok(self.into_report())
    }

    /// Advance one step; a no-op once the run is over
    pub fn step(&mut self) -> Result<RunState> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }

        let steps = self.config.steps_per_run;
        self.step += 1;
        let elapsed = elapsed_at(self.duration_years, self.step, steps);
        let step_years = elapsed - self.elapsed_years;
        self.elapsed_years = elapsed;

        // 1. Age every marker
        for cell in self.map.cells_mut() {
            cell.advance(step_years);
        }

        // 2. Resolve effective attributes
        let tech = self.config.tech_level(elapsed);
        let effective = InteractionResolver::new(self.catalog, self.config, self.buffs).resolve(&self.map)?;

        // 3-5. Intrusions
        let risks = assess(&effective, tech, self.config);
        let events_before = self.log.len();
        self.roll_intrusions(&risks, tech, step_years);

        // 6. Ruin (the run is already over on a breach)
        if self.state == RunState::Running {
            self.apply_ruin(&effective, tech, step_years)?;
        }

        // 7. Snapshot
        self.record_snapshot(&effective, &risks, tech)?;

        debug!(
            step = self.step,
            year = elapsed,
            ?tech,
            events = self.log.len() - events_before,
            "Step complete"
        );

        if self.state == RunState::Running && self.step >= steps {
            self.state = RunState::Completed;
        }
        Ok(self.state)
    }

    fn roll_intrusions(&mut self, risks: &[CellRisk], tech: TechLevel, step_years: f32) {
        for cell in risks {
            self.peak_risk = self.peak_risk.max(cell.risk);
            if cell.risk <= 0.0 {
                continue;
            }

            let p_attempt = attempt_probability(cell.risk, step_years, self.config);
            let roll: f32 = self.rng.gen();
            trace!(position = %cell.position, risk = cell.risk, p_attempt, roll, "Intrusion roll");
            if roll >= p_attempt {
                continue;
            }

            let succeeded = self.rng.gen::<f32>() < cell.risk;
            let position = cell.position;

            if !succeeded {
                self.log.add_event(
                    EventKind::IntrusionRepelled { position, risk: cell.risk },
                    self.step,
                    self.elapsed_years,
                    tech,
                );
            } else if self.map.is_core(position) {
                warn!(%position, year = self.elapsed_years, "Waste core breached");
                self.log
                    .add_event(EventKind::Breach { position }, self.step, self.elapsed_years, tech);
                self.state = RunState::Breached;
                return;
            } else if let Some(target) = self.map.get_mut(position) {
                target.damage += self.config.intrusion_damage;
                let damage = target.damage;
                self.log.add_event(
                    EventKind::IntrusionSucceeded { position, risk: cell.risk, damage },
                    self.step,
                    self.elapsed_years,
                    tech,
                );
            }
        }
    }

    fn apply_ruin(&mut self, effective: &EffectiveGrid, tech: TechLevel, step_years: f32) -> Result<()> {
        let config = self.config;
        let catalog = self.catalog;

        for cell in self.map.cells_mut() {
            let definition = catalog.get(&cell.marker)?;
            let Some(ruin) = definition.ruin.as_deref() else {
                continue;
            };

            let integrity = definition.standing_fraction(cell.age_years) - cell.damage;
            let usability = effective
                .get(cell.position)
                .copied()
                .flatten()
                .map_or(0.0, |a| a.usability.get(tech));
            let failing =
                integrity < config.ruin_integrity_threshold || usability <= config.ruin_usability_threshold;

            if !failing {
                cell.failing_years = 0.0;
                continue;
            }
            cell.failing_years += step_years;
            if cell.failing_years < config.ruin_sustain_years {
                continue;
            }

            let from = std::mem::take(&mut cell.marker);
            cell.ruin_into(ruin);
            debug!(position = %cell.position, %from, to = ruin, "Marker ruined");
            self.log.add_event(
                EventKind::MarkerRuined {
                    position: cell.position,
                    from,
                    to: ruin.to_string(),
                },
                self.step,
                self.elapsed_years,
                tech,
            );
        }
        Ok(())
    }

    fn record_snapshot(&mut self, effective: &EffectiveGrid, risks: &[CellRisk], tech: TechLevel) -> Result<()> {
        // Ruined cells changed marker after resolution; show what now stands
        let resolver = InteractionResolver::new(self.catalog, self.config, self.buffs);
        let current = if self.map.cells().any(|c| c.ruined && c.age_years == 0.0) {
            let grid = resolver.resolve(&self.map)?;
            let reassessed = assess(&grid, tech, self.config);
            Some((grid, reassessed))
        } else {
            None
        };
        let (shown, shown_risks) = match &current {
            Some((grid, reassessed)) => (grid, reassessed.as_slice()),
            None => (effective, risks),
        };

        let mut risk_at: Grid<f32> = Grid::new(self.map.width(), self.map.height());
        for r in shown_risks {
            risk_at.set(r.position, r.risk);
        }

        let cells = self
            .map
            .cells()
            .map(|cell| CellSnapshot {
                position: cell.position,
                marker: cell.marker.clone(),
                ruined: cell.ruined,
                damage: cell.damage,
                risk: risk_at.get(cell.position).copied().unwrap_or(0.0),
                effective: shown.get(cell.position).copied().flatten().unwrap_or_default(),
            })
            .collect();

        self.snapshots.push(MapSnapshot {
            step: self.step,
            year: self.elapsed_years,
            tech,
            cells,
        });
        Ok(())
    }

    fn into_report(self) -> SimulationReport {
        let statistics =
            SimulationStats::from_log(&self.log, self.seed, self.step, self.elapsed_years, self.peak_risk);
        SimulationReport {
            outcome: self.state,
            duration_years: self.duration_years,
            events: self.log,
            snapshots: self.snapshots,
            statistics,
        }
    }
}

/// Years elapsed at the end of 1-based `step`; the last step lands exactly on `duration`
fn elapsed_at(duration_years: u32, step: u32, steps: u32) -> f32 {
    if step >= steps {
        return duration_years as f32;
    }
    ((duration_years as u64 * step as u64) as f64 / steps as f64) as f32
}
