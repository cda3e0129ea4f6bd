// THEORY:
// The `presence_state` module is the temporal layer of the appliance. It folds an
// unbounded stream of boolean observations into a handful of `ResultCategory`s,
// and it does so using nothing but the timestamps carried by the observations.
// There are no timers: every decision is a comparison between "now" (the event)
// and what was remembered about the current episode.
//
// Key architectural principles:
// 1.  **Episodes**: A run of presence is an `Episode`. It is born on the first
//     match, its `earliest` timestamp is fixed for life, and only `latest`
//     advances (and only on matches).
// 2.  **Hysteresis**: Short gaps are ignored (`Nothing`), medium gaps are
//     reported as `LittleLost` without closing the episode, and only a gap of
//     at least the expiration time destroys it.
// 3.  **Escalation**: Once an episode has spanned the sustained time it stays
//     escalated. Because `earliest` never moves, the escalation cannot revert
//     until the episode itself is destroyed.
// 4.  **Clamping**: A timestamp older than the remembered one yields a zero
//     gap instead of a negative one, and never drags `latest` backwards.

use crate::core_modules::observation::{Observation, ResultCategory};
use crate::error::PresenceError;
use crate::pipeline::MonitorConfig;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// The little-lost threshold is this fraction of the expiration time.
const LITTLE_LOST_DIVISOR: u32 = 6;

/// Whole-second expirations give a whole-second threshold (truncated); others divide exactly.
fn little_lost_threshold(expiration: Duration) -> Duration {
    if expiration.subsec_nanos() == 0 {
        Duration::from_secs(expiration.as_secs() / LITTLE_LOST_DIVISOR as u64)
    } else {
        expiration / LITTLE_LOST_DIVISOR
    }
}

/// An open run of presumed subject presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Episode {
    /// Timestamp of the first matched observation. Fixed for the life of the episode.
    earliest: Instant,
    /// Timestamp of the most recent matched observation.
    latest: Instant,
    /// Set once a gap of at least the little-lost threshold has been seen.
    little_lost: bool,
}

impl Episode {
    fn new(timestamp: Instant) -> Self {
        Self {
            earliest: timestamp,
            latest: timestamp,
            little_lost: false,
        }
    }

    fn span(&self) -> Duration {
        self.latest.saturating_duration_since(self.earliest)
    }
}

/// The machine's only mutable memory. `None` means no episode is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceState {
    episode: Option<Episode>,
}

impl PresenceState {
    pub fn is_active(&self) -> bool {
        self.episode.is_some()
    }

    pub fn earliest(&self) -> Option<Instant> {
        self.episode.map(|e| e.earliest)
    }

    pub fn latest(&self) -> Option<Instant> {
        self.episode.map(|e| e.latest)
    }

    /// Always `false` when no episode is open.
    pub fn little_lost(&self) -> bool {
        self.episode.is_some_and(|e| e.little_lost)
    }
}

/// Folds observations into result categories, tracking one presence episode at a time.
#[derive(Debug, Clone)]
pub struct PresenceStateMachine {
    expiration_time: Duration,
    sustained_time: Duration,
    little_lost_threshold: Duration,
    state: PresenceState,
}

impl PresenceStateMachine {
    /// Creates an inactive machine. Fails if either duration is zero.
    pub fn new(config: &MonitorConfig) -> Result<Self, PresenceError> {
        config.validate()?;
        debug!(
            expiration = ?config.expiration_time,
            sustained = ?config.sustained_time,
            "Init presence state machine"
        );
        Ok(Self {
            expiration_time: config.expiration_time,
            sustained_time: config.sustained_time,
            little_lost_threshold: little_lost_threshold(config.expiration_time),
            state: PresenceState::default(),
        })
    }

    pub fn state(&self) -> &PresenceState {
        &self.state
    }

    pub fn little_lost_threshold(&self) -> Duration {
        self.little_lost_threshold
    }

    pub fn process(&mut self, event: Observation) -> ResultCategory {
        if event.matched {
            self.on_match(event.timestamp)
        } else {
            self.on_miss(event.timestamp)
        }
    }

    fn on_match(&mut self, timestamp: Instant) -> ResultCategory {
        let Some(episode) = self.state.episode.as_mut() else {
            debug!("New presence episode");
            self.state.episode = Some(Episode::new(timestamp));
            return ResultCategory::Target;
        };

        if timestamp < episode.latest {
            warn!("Observation timestamp went backwards; keeping latest match time");
        }
        episode.latest = episode.latest.max(timestamp);
        episode.little_lost = false;

        if episode.span() >= self.sustained_time {
            ResultCategory::SustainedTarget
        } else {
            ResultCategory::Target
        }
    }

    fn on_miss(&mut self, timestamp: Instant) -> ResultCategory {
        let Some(episode) = self.state.episode.as_mut() else {
            return ResultCategory::NoTarget;
        };

        if timestamp < episode.latest {
            warn!("Observation timestamp went backwards; treating gap as zero");
        }
        let gap = timestamp.saturating_duration_since(episode.latest);

        if gap >= self.expiration_time {
            debug!(?gap, "Presence episode expired");
            self.state.episode = None;
            ResultCategory::NoTarget
        } else if gap >= self.little_lost_threshold {
            episode.little_lost = true;
            ResultCategory::LittleLost
        } else {
            ResultCategory::Nothing
        }
    }
}
