//! Runtime configuration for the desktop intro.
//!
//! Every field has a default matching the shipped page, so the host can pass
//! `None` or any partial JSON object to `init_desktop`.

use serde::Deserialize;
use thiserror::Error;

use crate::cursor::clicks::ScheduledClick;

pub const DEFAULT_CURSOR_PATH_URL: &str = "cursor-path.json";
pub const DEFAULT_SHORTCUT_TARGET: &str = "portfolio";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid desktop config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    pub cursor_path_url: String,
    pub cursor_intro_enabled: bool,
    /// Record live pointer movement so it can be exported as a new path.
    pub record_cursor_path: bool,
    /// Click target id the shortcut answers to.
    pub shortcut_target: String,
    pub playback: PlaybackConfig,
    pub selectors: DesktopSelectors,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            cursor_path_url: DEFAULT_CURSOR_PATH_URL.to_string(),
            cursor_intro_enabled: true,
            record_cursor_path: false,
            shortcut_target: DEFAULT_SHORTCUT_TARGET.to_string(),
            playback: PlaybackConfig::default(),
            selectors: DesktopSelectors::default(),
        }
    }
}

impl DesktopConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parses `text` when given, defaults otherwise.
    pub fn from_optional_json(text: Option<&str>) -> Result<Self, ConfigError> {
        match text.map(str::trim) {
            Some(t) if !t.is_empty() => Self::from_json(t),
            _ => Ok(Self::default()),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Text shown next to the demo cursor.
    pub label_text: Option<String>,
    /// Extra time the cursor lingers after the last waypoint.
    pub start_intro_delay_ms: f64,
    /// Scripted clicks; proximity detection is used when absent or empty.
    pub clicks: Option<Vec<ScheduledClick>>,
    pub reveal_delay_after_open_ms: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            label_text: Some("thought_ed".to_string()),
            start_intro_delay_ms: 500.0,
            clicks: None,
            reveal_delay_after_open_ms: 600.0,
        }
    }
}

/// CSS selectors for the elements the intro drives.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DesktopSelectors {
    pub window: String,
    pub desktop: String,
    pub cursor: String,
    pub cursor_label: String,
    pub shortcut: String,
    pub preview_button: String,
}

impl Default for DesktopSelectors {
    fn default() -> Self {
        Self {
            window: ".window".into(),
            desktop: ".win11-desktop".into(),
            cursor: "#demo-cursor".into(),
            cursor_label: "#demo-cursor-label".into(),
            shortcut: "[data-shortcut=\"portfolio\"]".into(),
            preview_button: "#cursor-preview".into(),
        }
    }
}

/// Query parameter that opts a deployed page into the preview button.
pub const PREVIEW_QUERY_FLAG: &str = "cursorPreview";

/// Whether the manual preview button should be offered. `flag_in_query` is
/// the decoded presence of [`PREVIEW_QUERY_FLAG`] in the page URL.
pub fn preview_enabled(flag_in_query: bool, hostname: &str, recording: bool) -> bool {
    flag_in_query || hostname == "localhost" || recording
}
