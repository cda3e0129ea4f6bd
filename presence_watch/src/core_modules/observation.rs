// THEORY:
// The `observation` module holds the two small value types that flow through the
// system once per cycle. An `Observation` is what the outside world tells us (was
// the known subject seen, and when). A `ResultCategory` is what the state machine
// concludes from the whole history of observations, and it is the only thing the
// screen dispatcher ever looks at.

use std::time::Instant;

/// A single timestamped detection result, produced once per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    /// Whether the known subject was recognised in this cycle's frame.
    pub matched: bool,
    /// When the frame was taken. Expected to be non-decreasing across cycles.
    pub timestamp: Instant,
}

impl Observation {
    pub fn new(matched: bool, timestamp: Instant) -> Self {
        Self { matched, timestamp }
    }
}

/// The discrete decision produced by one state-machine evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCategory {
    /// The subject has been present for at least the sustained threshold.
    SustainedTarget,
    /// The subject is present.
    Target,
    /// The subject has been missing for a short while, but the episode is still open.
    LittleLost,
    /// Reserved for a confidence-tiered detector. Never produced by the state machine.
    Unknown,
    /// No episode is open.
    NoTarget,
    /// No opinion; the display should be left untouched.
    Nothing,
}
