//! presence-device: runs the presence watch appliance.
//!
//! Captures a frame, checks it against the reference photo, folds the result
//! into the presence state machine and updates the display when the picture
//! category changes. Runs until interrupted or until a cycle fails; either way
//! the display is left on a neutral picture.

mod capture;
mod detector;
mod display;
mod logging;
mod orientation;

use anyhow::Context;
use clap::Parser;
use image::RgbImage;
use presence_watch::{AssetPools, FrameSource, MonitorConfig, PresenceMonitor, ScreenDispatcher, SystemClock};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::detector::{DEFAULT_MATCH_THRESHOLD, ReferenceDetector};
use crate::display::FileDisplay;
use crate::orientation::Orientation;

#[cfg(feature = "camera")]
const CAMERA_WIDTH: u32 = 1024;
#[cfg(feature = "camera")]
const CAMERA_HEIGHT: u32 = 768;

type Appliance = PresenceMonitor<Box<dyn FrameSource<Frame = RgbImage>>, ReferenceDetector, SystemClock, PathBuf, FileDisplay>;

#[derive(Parser, Debug)]
#[command(name = "presence-device")]
#[command(about = "Shows who is watching: presence-driven e-paper pictures")]
#[command(version)]
struct Cli {
    /// Seconds without a match before the presence episode is over
    #[arg(long, value_name = "SECONDS", default_value_t = 120)]
    state_expiration_time: u64,

    /// Minutes of continuous presence before the sustained pictures are shown
    #[arg(long, value_name = "MINUTES", default_value_t = 25)]
    tired_time: u64,

    /// Photo of the subject to recognise
    #[arg(long, value_name = "PATH", default_value = "pic/user_photo.jpg")]
    reference: PathBuf,

    /// Picture directory with target/, tired_target/ and no_target/ sub-directories
    #[arg(long, value_name = "DIR", default_value = "pic")]
    pictures: PathBuf,

    /// Replay still images from this directory instead of a camera
    #[arg(long, value_name = "DIR")]
    frames: Option<PathBuf>,

    /// Capture from this OpenCV camera index
    #[cfg(feature = "camera")]
    #[arg(long, value_name = "INDEX")]
    camera: Option<i32>,

    /// Flip captured frames top to bottom
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    camera_vflip: bool,

    /// Flip captured frames left to right
    #[arg(long, default_value_t = false, action = clap::ArgAction::Set)]
    camera_hflip: bool,

    /// Rotate rendered pictures by 180 degrees
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    display_rotate: bool,

    /// Mirror rendered pictures left to right
    #[arg(long, default_value_t = false, action = clap::ArgAction::Set)]
    display_mirror: bool,

    /// File the display image is written to
    #[arg(long, value_name = "PATH", default_value = "screen.png")]
    output: PathBuf,

    /// Maximum mean luminance difference still counted as a match
    #[arg(long, default_value_t = DEFAULT_MATCH_THRESHOLD)]
    match_threshold: f64,

    /// Milliseconds between cycles
    #[arg(long, value_name = "MS", default_value_t = 500)]
    interval_ms: u64,
}

impl Cli {
    fn monitor_config(&self) -> anyhow::Result<MonitorConfig> {
        let sustained_secs = self
            .tired_time
            .checked_mul(60)
            .with_context(|| format!("--tired-time {} minutes is out of range", self.tired_time))?;
        Ok(MonitorConfig {
            expiration_time: Duration::from_secs(self.state_expiration_time),
            sustained_time: Duration::from_secs(sustained_secs),
        })
    }

    fn frame_orientation(&self) -> Orientation {
        Orientation {
            vflip: self.camera_vflip,
            hflip: self.camera_hflip,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    // --- 1. Configuration ---
    let config = cli.monitor_config()?;
    config.validate()?;
    let pools = AssetPools::from_directory(&cli.pictures)?;

    // --- 2. Collaborators ---
    let source = frame_source(&cli)?;
    let detector = ReferenceDetector::from_file(&cli.reference, cli.match_threshold)?;
    let display = FileDisplay::new(
        cli.output.clone(),
        Orientation::for_display(cli.display_rotate, cli.display_mirror),
    );
    let dispatcher = ScreenDispatcher::new(pools, display);
    let mut monitor: Appliance = PresenceMonitor::new(&config, source, detector, SystemClock, dispatcher)?;

    // --- 3. Main Processing Loop ---
    info!(?config, "Presence watch running");
    let outcome = run(&mut monitor, Duration::from_millis(cli.interval_ms.max(1))).await;
    if let Err(e) = &outcome {
        error!(error = %e, "Cycle failed");
    }

    // --- 4. Neutral Screen ---
    if let Err(e) = monitor.shutdown() {
        error!(error = %e, "Neutral render on shutdown failed");
    }
    outcome
}

async fn run(monitor: &mut Appliance, interval: Duration) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            _ = &mut interrupted => {
                info!("Interrupted, shutting down");
                return Ok(());
            }
            _ = ticker.tick() => {
                let report = monitor.run_cycle()?;
                debug!(?report, "Cycle complete");
            }
        }
    }
}

fn frame_source(cli: &Cli) -> anyhow::Result<Box<dyn FrameSource<Frame = RgbImage>>> {
    let orientation = cli.frame_orientation();

    #[cfg(feature = "camera")]
    if let Some(index) = cli.camera {
        let camera = capture::CameraCapture::open(index, CAMERA_WIDTH, CAMERA_HEIGHT, orientation)?;
        return Ok(Box::new(camera));
    }

    let dir = cli
        .frames
        .as_deref()
        .context("no frame source configured; pass --frames <DIR>")?;
    Ok(Box::new(capture::DirectoryReplay::open(dir, orientation)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_appliance_setup() {
        let cli = Cli::parse_from(["presence-device"]);
        assert_eq!(cli.monitor_config().unwrap(), MonitorConfig::default());
        assert_eq!(
            cli.frame_orientation(),
            Orientation {
                vflip: true,
                hflip: false
            }
        );
        assert!(cli.display_rotate);
        assert_eq!(cli.pictures, PathBuf::from("pic"));
    }

    #[test]
    fn durations_are_read_in_seconds_and_minutes() {
        let cli = Cli::parse_from([
            "presence-device",
            "--state-expiration-time",
            "30",
            "--tired-time",
            "2",
            "--camera-vflip",
            "false",
        ]);
        let config = cli.monitor_config().unwrap();
        assert_eq!(config.expiration_time, Duration::from_secs(30));
        assert_eq!(config.sustained_time, Duration::from_secs(120));
        assert!(!cli.frame_orientation().vflip);
    }

    #[test]
    fn oversized_tired_time_is_rejected() {
        let too_long = (u64::MAX / 60 + 1).to_string();
        let cli = Cli::parse_from(["presence-device", "--tired-time", too_long.as_str()]);
        let err = cli.monitor_config().unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn frames_are_required_without_a_camera() {
        let cli = Cli::parse_from(["presence-device"]);
        assert!(frame_source(&cli).is_err());
    }
}
