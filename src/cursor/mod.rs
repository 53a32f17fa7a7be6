//! Cursor path model and playback core.
//!
//! A trajectory is a list of timestamped waypoints in desktop-relative
//! coordinates (0..1 on both axes). Playback resolves the cursor position for
//! any elapsed time by linear interpolation, feeds it to a click processor and
//! drives a [`DesktopSurface`](playback::DesktopSurface) until the path ends.
//!
//! Nothing in here touches the browser directly; the web bindings live in
//! `crate::desktop`.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

pub mod clicks;
mod fallback_path;
pub mod path_file;
pub mod playback;
pub mod recorder;

pub use fallback_path::FALLBACK_CURSOR_POINTS;

// --- Waypoints ---------------------------------------------------------------

/// A single sample of the cursor path.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Milliseconds since the start of the trajectory.
    pub t: f64,
    pub x: f64,
    pub y: f64,
}

impl Waypoint {
    pub const fn new(t: f64, x: f64, y: f64) -> Self {
        Self { t, x, y }
    }
}

/// Pixel position on the page (client coordinates).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Axis-aligned rectangle in client coordinates, as returned by
/// `getBoundingClientRect()`.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.left + self.width / 2.0,
            y: self.top + self.height / 2.0,
        }
    }

    /// Maps a normalized waypoint onto this rectangle.
    pub fn project(&self, wp: &Waypoint) -> Point {
        Point {
            x: self.left + wp.x * self.width,
            y: self.top + wp.y * self.height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

// --- Trajectory --------------------------------------------------------------

/// Ordered, non-empty list of waypoints. Cheap to clone; runs hold their own
/// snapshot so a later load never disturbs playback in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    points: Rc<[Waypoint]>,
}

impl Trajectory {
    /// Returns `None` for an empty list.
    pub fn new(points: Vec<Waypoint>) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(Self { points: points.into() })
    }

    pub fn fallback() -> Self {
        Self { points: Rc::from(&FALLBACK_CURSOR_POINTS[..]) }
    }

    pub fn points(&self) -> &[Waypoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn first(&self) -> &Waypoint {
        &self.points[0]
    }

    pub fn last(&self) -> &Waypoint {
        &self.points[self.points.len() - 1]
    }

    /// Timestamp of the final waypoint.
    pub fn duration_ms(&self) -> f64 {
        self.last().t
    }

    /// Cursor position at `elapsed` ms. Clamps to the first / last waypoint
    /// outside the recorded range.
    pub fn interpolate(&self, elapsed: f64) -> Waypoint {
        let first = self.first();
        if elapsed <= first.t {
            return *first;
        }
        for pair in self.points.windows(2) {
            let (current, next) = (&pair[0], &pair[1]);
            if elapsed <= next.t {
                // equal timestamps would otherwise divide by zero
                let delta = (next.t - current.t).max(1.0);
                let ratio = (elapsed - current.t) / delta;
                return Waypoint {
                    t: elapsed,
                    x: current.x + (next.x - current.x) * ratio,
                    y: current.y + (next.y - current.y) * ratio,
                };
            }
        }
        *self.last()
    }
}

/// Holds the built-in path plus whatever was loaded at startup.
/// The loaded path wins once present.
#[derive(Clone, Debug)]
pub struct TrajectoryStore {
    fallback: Trajectory,
    loaded: Option<Trajectory>,
}

impl Default for TrajectoryStore {
    fn default() -> Self {
        Self::new(Trajectory::fallback())
    }
}

impl TrajectoryStore {
    pub fn new(fallback: Trajectory) -> Self {
        Self { fallback, loaded: None }
    }

    pub fn set_loaded(&mut self, trajectory: Trajectory) {
        self.loaded = Some(trajectory);
    }

    pub fn has_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Snapshot used for one playback run.
    pub fn active(&self) -> Trajectory {
        self.loaded.clone().unwrap_or_else(|| self.fallback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_trajectory_rejected() {
        assert!(Trajectory::new(Vec::new()).is_none());
    }

    #[test]
    fn test_before_first_returns_first() {
        let traj = Trajectory::new(vec![
            Waypoint::new(200.0, 0.1, 0.2),
            Waypoint::new(400.0, 0.5, 0.6),
        ])
        .unwrap();
        for e in [-50.0, 0.0, 150.0, 200.0] {
            assert_eq!(traj.interpolate(e), Waypoint::new(200.0, 0.1, 0.2));
        }
    }

    #[test]
    fn test_after_last_returns_last() {
        let traj = Trajectory::fallback();
        for e in [3600.0, 3600.5, 4100.0, 1.0e9] {
            let wp = traj.interpolate(e);
            assert_eq!((wp.x, wp.y), (0.48, 0.36));
        }
    }

    #[test]
    fn test_equal_timestamps_do_not_divide_by_zero() {
        let traj = Trajectory::new(vec![
            Waypoint::new(0.0, 0.0, 0.0),
            Waypoint::new(100.0, 0.2, 0.2),
            Waypoint::new(100.0, 0.8, 0.8),
            Waypoint::new(200.0, 1.0, 1.0),
        ])
        .unwrap();
        let wp = traj.interpolate(100.0);
        assert!(wp.x.is_finite() && wp.y.is_finite());
        assert!(approx(wp.x, 0.2));
        let wp = traj.interpolate(150.0);
        assert!(approx(wp.x, 0.9));
    }

    #[test]
    fn test_linear_within_segment_without_overshoot() {
        let traj = Trajectory::new(vec![
            Waypoint::new(0.0, 0.2, 0.8),
            Waypoint::new(1000.0, 0.6, 0.4),
        ])
        .unwrap();
        let mut prev_x = 0.2;
        for step in 1..=10 {
            let e = step as f64 * 100.0;
            let wp = traj.interpolate(e);
            assert!(approx(wp.x, 0.2 + 0.4 * e / 1000.0));
            assert!(wp.x >= prev_x && wp.x <= 0.6 + 1e-12);
            assert!(wp.y <= 0.8 && wp.y >= 0.4 - 1e-12);
            assert_eq!(wp.t, e);
            prev_x = wp.x;
        }
    }

    #[test]
    fn test_fallback_at_1500_hits_waypoint() {
        let traj = Trajectory::fallback();
        assert_eq!(traj.len(), 10);
        let wp = traj.interpolate(1500.0);
        assert!(approx(wp.x, 0.12));
        assert!(approx(wp.y, 0.47));
    }

    #[test]
    fn test_out_of_order_input_does_not_panic() {
        let traj = Trajectory::new(vec![
            Waypoint::new(0.0, 0.0, 0.0),
            Waypoint::new(500.0, 0.5, 0.5),
            Waypoint::new(250.0, 0.9, 0.1),
            Waypoint::new(800.0, 1.0, 1.0),
        ])
        .unwrap();
        for e in [0.0, 100.0, 300.0, 600.0, 900.0] {
            let wp = traj.interpolate(e);
            assert!(wp.x.is_finite() && wp.y.is_finite());
        }
    }

    #[test]
    fn test_store_prefers_loaded() {
        let mut store = TrajectoryStore::default();
        assert_eq!(store.active(), Trajectory::fallback());
        let loaded = Trajectory::new(vec![Waypoint::new(0.0, 0.5, 0.5)]).unwrap();
        store.set_loaded(loaded.clone());
        assert!(store.has_loaded());
        assert_eq!(store.active(), loaded);
    }

    #[test]
    fn test_snapshot_survives_later_load() {
        let mut store = TrajectoryStore::default();
        let snapshot = store.active();
        store.set_loaded(Trajectory::new(vec![Waypoint::new(0.0, 0.9, 0.9)]).unwrap());
        assert_eq!(snapshot.len(), 10);
        assert_eq!(snapshot.last().t, 3600.0);
    }
}
