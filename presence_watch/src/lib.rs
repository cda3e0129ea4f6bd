// THEORY:
// This file is the main entry point for the `presence_watch` library crate.
// It exposes the `PresenceMonitor` pipeline and its collaborator traits as the
// public API of the engine, alongside the two core components it drives: the
// `PresenceStateMachine`, which decides what is going on, and the
// `ScreenDispatcher`, which decides whether the display needs to change.
//
// Frame acquisition, recognition and the physical panel are not implemented
// here. They are injected through the `FrameSource`, `Detector` and
// `RenderSink` traits so the appliance binary (or a test) can supply its own.

pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use core_modules::asset_pool::{AssetPool, AssetPools};
pub use core_modules::observation::{Observation, ResultCategory};
pub use core_modules::presence_state::{PresenceState, PresenceStateMachine};
pub use core_modules::screen_dispatcher::{RenderSink, ScreenDispatcher, ScreenState};
pub use core_modules::selector::{AssetSelector, CyclingSelector, FirstSelector, RandomSelector};
pub use error::{BoxError, PresenceError};
pub use pipeline::{Clock, CycleReport, Detector, FrameSource, MonitorConfig, PresenceMonitor, SystemClock};
