use presence_watch::{
    AssetPools, BoxError, Clock, Detector, FirstSelector, FrameSource, MonitorConfig, PresenceError,
    PresenceMonitor, RenderSink, ResultCategory, ScreenDispatcher,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Replays a script of `(subject visible, seconds since start)` steps.
struct Script {
    steps: VecDeque<(bool, u64)>,
    now: Rc<RefCell<Instant>>,
    start: Instant,
}

impl FrameSource for Script {
    type Frame = bool;

    fn capture(&mut self) -> Result<bool, BoxError> {
        let (visible, secs) = self.steps.pop_front().ok_or("camera disconnected")?;
        *self.now.borrow_mut() = self.start + Duration::from_secs(secs);
        Ok(visible)
    }
}

struct ScriptClock(Rc<RefCell<Instant>>);

impl Clock for ScriptClock {
    fn now(&self) -> Instant {
        *self.0.borrow()
    }
}

struct PassThrough;

impl Detector<bool> for PassThrough {
    fn detect(&mut self, frame: &bool) -> Result<bool, BoxError> {
        Ok(*frame)
    }
}

struct FailingDetector;

impl Detector<bool> for FailingDetector {
    fn detect(&mut self, _frame: &bool) -> Result<bool, BoxError> {
        Err("model not loaded".into())
    }
}

#[derive(Clone, Default)]
struct Panel(Rc<RefCell<Vec<&'static str>>>);

impl RenderSink<&'static str> for Panel {
    fn render(&mut self, asset: &&'static str) -> Result<(), BoxError> {
        self.0.borrow_mut().push(*asset);
        Ok(())
    }
}

fn monitor<D: Detector<bool>>(
    steps: &[(bool, u64)],
    detector: D,
    panel: Panel,
) -> PresenceMonitor<Script, D, ScriptClock, &'static str, Panel> {
    let start = Instant::now();
    let now = Rc::new(RefCell::new(start));
    let source = Script {
        steps: steps.iter().copied().collect(),
        now: now.clone(),
        start,
    };
    let pools = AssetPools::new(vec!["hello"], vec!["take-a-break"], vec!["idle"]).unwrap();
    let dispatcher = ScreenDispatcher::with_selector(pools, panel, FirstSelector);
    PresenceMonitor::new(&MonitorConfig::default(), source, detector, ScriptClock(now), dispatcher).unwrap()
}

#[test]
fn full_presence_episode_drives_the_panel() {
    let panel = Panel::default();
    let mut m = monitor(
        &[
            (false, 0),
            (true, 10),
            (true, 20),
            (true, 1510),
            (false, 1525),
            (false, 1540),
            (false, 1640),
            (false, 1650),
        ],
        PassThrough,
        panel.clone(),
    );

    let results: Vec<(ResultCategory, bool)> = (0..8)
        .map(|_| {
            let report = m.run_cycle().unwrap();
            (report.result, report.screen_changed)
        })
        .collect();

    assert_eq!(
        results,
        vec![
            (ResultCategory::NoTarget, false),
            (ResultCategory::Target, true),
            (ResultCategory::Target, false),
            (ResultCategory::SustainedTarget, true),
            (ResultCategory::Nothing, false),
            (ResultCategory::LittleLost, true),
            (ResultCategory::NoTarget, true),
            (ResultCategory::NoTarget, false),
        ]
    );
    assert!(!m.state().is_active());
    assert_eq!(*panel.0.borrow(), vec!["hello", "take-a-break", "idle", "idle"]);

    m.shutdown().unwrap();
    assert_eq!(panel.0.borrow().last(), Some(&"idle"));
    assert_eq!(panel.0.borrow().len(), 5);
}

#[test]
fn run_stops_at_the_first_capture_failure() {
    let panel = Panel::default();
    let mut m = monitor(&[(true, 0), (true, 5)], PassThrough, panel.clone());

    let err = m.run();
    assert!(matches!(err, PresenceError::Capture(_)));
    assert!(!err.is_configuration());
    assert_eq!(m.screen().current_category(), ResultCategory::Target);

    drop(m);
    assert_eq!(*panel.0.borrow(), vec!["hello", "idle"]);
}

#[test]
fn detection_failure_aborts_the_cycle_before_processing() {
    let panel = Panel::default();
    let mut m = monitor(&[(true, 0)], FailingDetector, panel.clone());

    let err = m.run_cycle().unwrap_err();
    assert!(matches!(err, PresenceError::Detection(_)));
    assert!(!m.state().is_active());
    assert!(panel.0.borrow().is_empty());
}

#[test]
fn rejects_invalid_configuration_up_front() {
    let pools = AssetPools::new(vec!["hello"], vec!["take-a-break"], vec!["idle"]).unwrap();
    let panel = Panel::default();
    let dispatcher = ScreenDispatcher::with_selector(pools, panel.clone(), FirstSelector);
    let now = Rc::new(RefCell::new(Instant::now()));
    let source = Script {
        steps: VecDeque::new(),
        now: now.clone(),
        start: Instant::now(),
    };
    let config = MonitorConfig {
        sustained_time: Duration::ZERO,
        ..MonitorConfig::default()
    };

    let result = PresenceMonitor::new(&config, source, PassThrough, ScriptClock(now), dispatcher);
    assert!(matches!(
        result,
        Err(PresenceError::NonPositiveDuration {
            name: "sustained_time"
        })
    ));
    drop(result);
    assert!(panel.0.borrow().is_empty());
}
