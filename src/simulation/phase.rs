//! Campaign phase helpers
//!
//! A campaign re-simulates the same map over longer spans: phase `n`
//! (1-based) covers `n * YEARS_IN_PHASE` years, and surviving the phase that
//! reaches `YEARS_TO_WIN` wins. These are pure functions; the caller keeps
//! track of which phase it is in.

use crate::core::constants::{PHASE_FUNDING, YEARS_IN_PHASE, YEARS_TO_WIN};

/// Number of the phase whose run reaches the win horizon
pub const FINAL_PHASE: u32 = YEARS_TO_WIN / YEARS_IN_PHASE;

/// Simulated span of `phase`, in years
pub fn phase_duration(phase: u32) -> u32 {
    phase.saturating_mul(YEARS_IN_PHASE)
}

pub fn is_final_phase(phase: u32) -> bool {
    phase >= FINAL_PHASE
}

/// Funding granted for surviving `phase`; nothing after the final phase
pub fn phase_funding(phase: u32) -> u64 {
    if phase == 0 || is_final_phase(phase) {
        0
    } else {
        PHASE_FUNDING
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_grow_by_fixed_span() {
        assert_eq!(phase_duration(1), 400);
        assert_eq!(phase_duration(3), 1_200);
        assert_eq!(phase_duration(FINAL_PHASE), YEARS_TO_WIN);
    }

    #[test]
    fn test_final_phase() {
        assert_eq!(FINAL_PHASE, 25);
        assert!(!is_final_phase(24));
        assert!(is_final_phase(25));
    }

    #[test]
    fn test_funding_stops_at_final_phase() {
        assert_eq!(phase_funding(1), PHASE_FUNDING);
        assert_eq!(phase_funding(FINAL_PHASE), 0);
    }
}
