// THEORY:
// The `pipeline` module is the top-level API of the presence engine. It wires the
// injected collaborators (frame source, detector, clock) to the two core
// components and runs them in a strict sequence, once per cycle:
//
//     capture -> timestamp -> detect -> process -> apply -> render
//
// Nothing overlaps and nothing is retried. Any collaborator failure ends the
// cycle with an error, and the caller decides what to do with it.

use crate::core_modules::observation::{Observation, ResultCategory};
use crate::core_modules::presence_state::{PresenceState, PresenceStateMachine};
use crate::core_modules::screen_dispatcher::{RenderSink, ScreenDispatcher, ScreenState};
use crate::error::{BoxError, PresenceError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Timing configuration for the presence state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// How long the subject may be absent before an open episode is over.
    pub expiration_time: Duration,
    /// How long an episode must last before it is escalated to `SustainedTarget`.
    pub sustained_time: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            expiration_time: Duration::from_secs(120),
            sustained_time: Duration::from_secs(25 * 60),
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<(), PresenceError> {
        if self.expiration_time.is_zero() {
            return Err(PresenceError::NonPositiveDuration {
                name: "expiration_time",
            });
        }
        if self.sustained_time.is_zero() {
            return Err(PresenceError::NonPositiveDuration {
                name: "sustained_time",
            });
        }
        Ok(())
    }
}

/// Produces one frame per cycle. May block.
pub trait FrameSource {
    type Frame;

    fn capture(&mut self) -> Result<Self::Frame, BoxError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    type Frame = S::Frame;

    fn capture(&mut self) -> Result<Self::Frame, BoxError> {
        (**self).capture()
    }
}

/// Decides whether the known subject appears in a frame.
pub trait Detector<F> {
    fn detect(&mut self, frame: &F) -> Result<bool, BoxError>;
}

/// Source of observation timestamps. Must be non-decreasing.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// The outcome of a single cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub matched: bool,
    pub result: ResultCategory,
    pub screen_changed: bool,
}

/// The main, top-level struct of the presence engine.
pub struct PresenceMonitor<S, D, C, A, R>
where
    S: FrameSource,
    D: Detector<S::Frame>,
    C: Clock,
    R: RenderSink<A>,
{
    source: S,
    detector: D,
    clock: C,
    machine: PresenceStateMachine,
    dispatcher: ScreenDispatcher<A, R>,
}

impl<S, D, C, A, R> PresenceMonitor<S, D, C, A, R>
where
    S: FrameSource,
    D: Detector<S::Frame>,
    C: Clock,
    R: RenderSink<A>,
{
    pub fn new(
        config: &MonitorConfig,
        source: S,
        detector: D,
        clock: C,
        dispatcher: ScreenDispatcher<A, R>,
    ) -> Result<Self, PresenceError> {
        // A rejected configuration never reaches the panel.
        let machine = match PresenceStateMachine::new(config) {
            Ok(machine) => machine,
            Err(e) => {
                dispatcher.discard();
                return Err(e);
            }
        };
        Ok(Self {
            source,
            detector,
            clock,
            machine,
            dispatcher,
        })
    }

    /// Runs one capture-to-render cycle.
    pub fn run_cycle(&mut self) -> Result<CycleReport, PresenceError> {
        let frame = self.source.capture().map_err(PresenceError::Capture)?;
        let timestamp = self.clock.now();
        let matched = self.detector.detect(&frame).map_err(PresenceError::Detection)?;

        let result = self.machine.process(Observation::new(matched, timestamp));
        debug!(matched, ?result, "Processed observation");
        let screen_changed = self.dispatcher.apply(result)?;

        Ok(CycleReport {
            matched,
            result,
            screen_changed,
        })
    }

    /// Runs cycles until the first failure and returns it.
    pub fn run(&mut self) -> PresenceError {
        loop {
            if let Err(e) = self.run_cycle() {
                return e;
            }
        }
    }

    pub fn state(&self) -> &PresenceState {
        self.machine.state()
    }

    pub fn screen(&self) -> &ScreenState {
        self.dispatcher.screen()
    }

    pub fn sink(&self) -> &R {
        self.dispatcher.sink()
    }

    /// Stops the monitor and leaves the display on a neutral picture.
    pub fn shutdown(self) -> Result<(), PresenceError> {
        debug!("Shutting down presence monitor");
        self.dispatcher.shutdown()
    }
}
