// Built-in cursor path used when `cursor-path.json` is missing or unusable.
// Drifts from the desktop centre to the portfolio shortcut on the left edge,
// pauses over it, then swings back towards where the window opens.
use super::Waypoint;

pub const FALLBACK_CURSOR_POINTS: [Waypoint; 10] = [
    Waypoint::new(0.0, 0.26, 0.36),
    Waypoint::new(380.0, 0.21, 0.32),
    Waypoint::new(760.0, 0.17, 0.35),
    Waypoint::new(1120.0, 0.14, 0.41),
    Waypoint::new(1500.0, 0.12, 0.47),
    Waypoint::new(1880.0, 0.11, 0.54),
    Waypoint::new(2150.0, 0.11, 0.56),
    Waypoint::new(2700.0, 0.30, 0.50),
    Waypoint::new(3200.0, 0.42, 0.42),
    Waypoint::new(3600.0, 0.48, 0.36),
];
