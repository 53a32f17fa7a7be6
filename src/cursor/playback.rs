//! One playback run of the cursor intro.
//!
//! The run is a plain state machine stepped with frame timestamps; whoever owns
//! it (the requestAnimationFrame loop in the browser, a test in native builds)
//! calls [`PlaybackRun::step`] until it reports [`Frame::Finished`].

use super::clicks::{Click, ClickSource};
use super::{Point, Rect, Trajectory};
use crate::config::PlaybackConfig;

/// Everything the player needs from the page. Implementations degrade to
/// no-ops when an element is missing.
pub trait DesktopSurface {
    /// Reference rectangle the normalized path is projected onto.
    fn desktop_rect(&self) -> Option<Rect>;
    /// Bounding box of the shortcut the cursor aims for.
    fn target_rect(&self) -> Option<Rect>;
    fn has_cursor(&self) -> bool;
    fn set_cursor_label(&mut self, text: &str);
    fn set_cursor_visible(&mut self, visible: bool);
    fn move_cursor(&mut self, pos: Point);
    fn apply_click(&mut self, click: &Click, preview: bool);
    /// Drops any transient selected / opening state from the shortcut.
    fn clear_target_state(&mut self);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Preview runs never trigger the portfolio window reveal.
    pub preview: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame {
    Continue,
    Finished,
}

type OnFinish = Box<dyn FnOnce()>;

pub struct PlaybackRun<S: DesktopSurface> {
    trajectory: Trajectory,
    surface: S,
    clicks: ClickSource,
    options: RunOptions,
    started_at: f64,
    total_duration: f64,
    finished: bool,
    on_finish: Option<OnFinish>,
}

impl<S: DesktopSurface> PlaybackRun<S> {
    /// Starts a run at `now`. Returns `None` when the surface has no desktop
    /// or cursor to animate; the caller decides what that means.
    pub fn begin(
        trajectory: Trajectory,
        mut surface: S,
        config: &PlaybackConfig,
        target: &str,
        options: RunOptions,
        now: f64,
    ) -> Option<Self> {
        if surface.desktop_rect().is_none() || !surface.has_cursor() {
            return None;
        }
        let total_duration = trajectory.duration_ms() + config.start_intro_delay_ms;
        let clicks = ClickSource::for_run(config.clicks.as_deref(), target);
        if let Some(label) = config.label_text.as_deref().filter(|l| !l.is_empty()) {
            surface.set_cursor_label(label);
        }
        surface.set_cursor_visible(true);
        Some(Self {
            trajectory,
            surface,
            clicks,
            options,
            started_at: now,
            total_duration,
            finished: false,
            on_finish: None,
        })
    }

    /// Callback fired exactly once, when the run finishes or is cancelled.
    pub fn on_finish(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_finish = Some(Box::new(f));
        self
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Advances the run to frame time `now`.
    pub fn step(&mut self, now: f64) -> Frame {
        if self.finished {
            return Frame::Finished;
        }
        let elapsed = now - self.started_at;
        let point = self.trajectory.interpolate(elapsed);
        let coords = self.surface.desktop_rect().map(|rect| rect.project(&point));
        if let Some(pos) = coords {
            self.surface.move_cursor(pos);
        }
        let target = self.surface.target_rect();
        for click in self.clicks.process(elapsed, coords, target) {
            self.surface.apply_click(&click, self.options.preview);
        }
        if elapsed >= self.total_duration {
            self.finalize();
            return Frame::Finished;
        }
        Frame::Continue
    }

    /// Stops the run immediately. Safe to call any number of times.
    pub fn cancel(&mut self) {
        self.finalize();
    }

    fn finalize(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.surface.set_cursor_visible(false);
        self.surface.clear_target_state();
        if let Some(done) = self.on_finish.take() {
            done();
        }
    }
}
