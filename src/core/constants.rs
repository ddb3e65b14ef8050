//! Game-wide constants shared by the engine and its callers

/// Years added to the simulated span with every campaign phase
pub const YEARS_IN_PHASE: u32 = 400;

/// Years the site has to stay undisturbed to win the campaign
pub const YEARS_TO_WIN: u32 = 10_000;

/// Funding granted to the player after each survived phase
pub const PHASE_FUNDING: u64 = 100_000;

/// Catalog keys of the four tiles marking the waste core
pub const CORE_MARKER_KEYS: [&str; 4] = [
    "core-top-left",
    "core-top-right",
    "core-bottom-left",
    "core-bottom-right",
];
