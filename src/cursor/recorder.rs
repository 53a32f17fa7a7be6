//! Captures live pointer movement as a cursor path, for producing a new
//! `cursor-path.json`.

use super::path_file::{round4, to_path_json};
use super::{Rect, Waypoint};

#[derive(Clone, Debug)]
pub struct PathRecorder {
    started_at: f64,
    points: Vec<Waypoint>,
}

impl PathRecorder {
    pub fn new(started_at: f64) -> Self {
        Self { started_at, points: Vec::new() }
    }

    /// Records a pointer sample at client position (`client_x`, `client_y`)
    /// relative to `desktop`. Samples against a zero-sized desktop are dropped.
    pub fn record(&mut self, now: f64, client_x: f64, client_y: f64, desktop: Rect) -> bool {
        if desktop.is_empty() {
            return false;
        }
        self.points.push(Waypoint {
            t: (now - self.started_at).round(),
            x: round4((client_x - desktop.left) / desktop.width),
            y: round4((client_y - desktop.top) / desktop.height),
        });
        true
    }

    pub fn points(&self) -> &[Waypoint] {
        &self.points
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        to_path_json(&self.points)
    }
}
