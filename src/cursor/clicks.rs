//! Synthetic clicks fired while the cursor path plays.
//!
//! Two sources: a scripted queue of timed clicks taken from config, or the
//! default proximity tracker that selects the shortcut once the cursor gets
//! close and opens it shortly after.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::{Point, Rect};

/// Delay between the "select" and the "open" click in proximity mode.
pub const SELECT_TO_OPEN_MS: f64 = 300.0;
/// Proximity radius as a fraction of the target's larger side.
pub const PROXIMITY_FACTOR: f64 = 0.9;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickKind {
    Select,
    Open,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Click {
    pub target: String,
    pub kind: ClickKind,
}

impl Click {
    pub fn new(target: impl Into<String>, kind: ClickKind) -> Self {
        Self { target: target.into(), kind }
    }
}

/// Click recorded with an absolute offset from the start of playback.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduledClick {
    /// Milliseconds since playback start. A click without a time never fires.
    #[serde(default = "never")]
    pub time: f64,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: ClickKind,
}

fn never() -> f64 {
    f64::INFINITY
}

impl ScheduledClick {
    fn to_click(&self) -> Click {
        Click::new(self.target.clone(), self.kind)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProximityState {
    Idle,
    Selected { at: f64 },
    Done,
}

/// Select-then-open state machine driven by cursor distance to the target.
#[derive(Clone, Debug)]
pub struct ProximityTracker {
    target: String,
    state: ProximityState,
}

impl ProximityTracker {
    pub fn new(target: impl Into<String>) -> Self {
        Self { target: target.into(), state: ProximityState::Idle }
    }

    pub fn state(&self) -> ProximityState {
        self.state
    }

    fn advance(&mut self, elapsed: f64, cursor: Point, target: Rect) -> Option<Click> {
        match self.state {
            ProximityState::Idle => {
                let center = target.center();
                let dist = (cursor.x - center.x).hypot(cursor.y - center.y);
                let threshold = target.width.max(target.height) * PROXIMITY_FACTOR;
                if dist <= threshold {
                    self.state = ProximityState::Selected { at: elapsed };
                    return Some(Click::new(self.target.clone(), ClickKind::Select));
                }
                None
            }
            ProximityState::Selected { at } if elapsed - at >= SELECT_TO_OPEN_MS => {
                self.state = ProximityState::Done;
                Some(Click::new(self.target.clone(), ClickKind::Open))
            }
            ProximityState::Selected { .. } | ProximityState::Done => None,
        }
    }
}

/// Where a run's clicks come from. One instance per playback run.
#[derive(Clone, Debug)]
pub enum ClickSource {
    Scripted(VecDeque<ScheduledClick>),
    Proximity(ProximityTracker),
}

impl ClickSource {
    /// Scripted when `scripted` holds at least one click, proximity otherwise.
    pub fn for_run(scripted: Option<&[ScheduledClick]>, target: &str) -> Self {
        match scripted {
            Some(clicks) if !clicks.is_empty() => Self::Scripted(clicks.iter().cloned().collect()),
            _ => Self::Proximity(ProximityTracker::new(target)),
        }
    }

    /// Clicks due at `elapsed`. `cursor` and `target` are page coordinates;
    /// proximity mode does nothing while either is unknown.
    pub fn process(&mut self, elapsed: f64, cursor: Option<Point>, target: Option<Rect>) -> Vec<Click> {
        match self {
            Self::Scripted(queue) => {
                let mut due = Vec::new();
                while queue.front().is_some_and(|c| elapsed >= c.time) {
                    if let Some(next) = queue.pop_front() {
                        due.push(next.to_click());
                    }
                }
                due
            }
            Self::Proximity(tracker) => match (cursor, target) {
                (Some(cursor), Some(target)) => tracker.advance(elapsed, cursor, target).into_iter().collect(),
                _ => Vec::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shortcut() -> Rect {
        Rect::new(100.0, 100.0, 40.0, 60.0)
    }

    #[test]
    fn test_proximity_fires_select_then_open_once() {
        let mut src = ClickSource::for_run(None, "portfolio");
        let near = Some(Point { x: 120.0, y: 130.0 });
        let mut fired = Vec::new();
        let mut t = 0.0;
        while t <= 2000.0 {
            fired.extend(src.process(t, near, Some(shortcut())));
            t += 16.0;
        }
        assert_eq!(
            fired,
            vec![
                Click::new("portfolio", ClickKind::Select),
                Click::new("portfolio", ClickKind::Open),
            ]
        );
    }

    #[test]
    fn test_open_waits_for_delay() {
        let mut tracker = ProximityTracker::new("portfolio");
        let near = Point { x: 120.0, y: 130.0 };
        assert!(tracker.advance(1000.0, near, shortcut()).is_some());
        assert_eq!(tracker.state(), ProximityState::Selected { at: 1000.0 });
        assert!(tracker.advance(1299.0, near, shortcut()).is_none());
        let open = tracker.advance(1300.0, near, shortcut()).unwrap();
        assert_eq!(open.kind, ClickKind::Open);
        assert_eq!(tracker.state(), ProximityState::Done);
    }

    #[test]
    fn test_threshold_uses_larger_side() {
        // larger side 60 -> radius 54 around centre (120, 130)
        let mut tracker = ProximityTracker::new("portfolio");
        assert!(tracker.advance(0.0, Point { x: 120.0, y: 184.5 }, shortcut()).is_none());
        assert!(tracker.advance(0.0, Point { x: 120.0, y: 184.0 }, shortcut()).is_some());
    }

    #[test]
    fn test_far_cursor_never_clicks() {
        let mut src = ClickSource::for_run(Some(&[][..]), "portfolio");
        let far = Some(Point { x: 900.0, y: 900.0 });
        for i in 0..100 {
            assert!(src.process(i as f64 * 16.0, far, Some(shortcut())).is_empty());
        }
    }

    #[test]
    fn test_missing_target_is_noop() {
        let mut src = ClickSource::for_run(None, "portfolio");
        let near = Some(Point { x: 120.0, y: 130.0 });
        assert!(src.process(0.0, near, None).is_empty());
        assert!(src.process(10.0, None, Some(shortcut())).is_empty());
        match &src {
            ClickSource::Proximity(t) => assert_eq!(t.state(), ProximityState::Idle),
            ClickSource::Scripted(_) => panic!("expected proximity mode"),
        }
    }

    #[test]
    fn test_scripted_dequeues_in_order() {
        let script = vec![
            ScheduledClick { time: 100.0, target: "portfolio".into(), kind: ClickKind::Select },
            ScheduledClick { time: 150.0, target: "portfolio".into(), kind: ClickKind::Open },
            ScheduledClick { time: 900.0, target: "other".into(), kind: ClickKind::Select },
        ];
        let mut src = ClickSource::for_run(Some(script.as_slice()), "portfolio");
        assert!(src.process(50.0, None, None).is_empty());
        let due = src.process(200.0, None, None);
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].kind, ClickKind::Select);
        assert_eq!(due[1].kind, ClickKind::Open);
        assert!(src.process(800.0, None, None).is_empty());
        assert_eq!(src.process(900.0, None, None), vec![Click::new("other", ClickKind::Select)]);
        assert!(src.process(5000.0, None, None).is_empty());
    }

    #[test]
    fn test_scheduled_click_json_shape() {
        let clicks: Vec<ScheduledClick> =
            serde_json::from_str(r#"[{"time":120,"target":"portfolio","type":"open"}]"#).unwrap();
        assert_eq!(clicks[0].kind, ClickKind::Open);
        assert_eq!(clicks[0].time, 120.0);
    }

    #[test]
    fn test_untimed_scripted_click_never_fires() {
        let clicks: Vec<ScheduledClick> = serde_json::from_str(
            r#"[{"target":"portfolio","type":"select"},{"time":10,"target":"portfolio","type":"open"}]"#,
        )
        .unwrap();
        assert!(clicks[0].time.is_infinite());
        let mut src = ClickSource::for_run(Some(clicks.as_slice()), "portfolio");
        assert!(src.process(0.0, None, None).is_empty());
        // the untimed head blocks the queue, as a click that is never due
        assert!(src.process(1e12, None, None).is_empty());
    }
}
