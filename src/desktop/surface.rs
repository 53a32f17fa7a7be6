// DOM-backed desktop surface and the portfolio window reveal.
use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use super::{clear_timeout, set_timeout};
use crate::config::DesktopConfig;
use crate::cursor::clicks::{Click, ClickKind};
use crate::cursor::playback::DesktopSurface;
use crate::cursor::{Point, Rect};

/// How long the shortcut keeps its opening highlight.
const OPENING_CLEAR_MS: f64 = 800.0;

fn query(doc: &Document, selector: &str) -> Option<Element> {
    doc.query_selector(selector).ok().flatten()
}

fn rect_of(el: &Element) -> Rect {
    let r = el.get_bounding_client_rect();
    Rect::new(r.left(), r.top(), r.width(), r.height())
}

/// Shows the portfolio window once, either right away or after a delay.
pub(crate) struct WindowReveal {
    window_el: Option<Element>,
    shown: Cell<bool>,
    pending: Cell<Option<i32>>,
}

impl WindowReveal {
    pub(crate) fn new(window_el: Option<Element>) -> Self {
        Self { window_el, shown: Cell::new(false), pending: Cell::new(None) }
    }

    pub(crate) fn is_shown(&self) -> bool {
        self.shown.get()
    }

    pub(crate) fn reveal(&self) {
        if self.shown.replace(true) {
            return;
        }
        if let Some(id) = self.pending.take() {
            clear_timeout(id);
        }
        if let Some(el) = &self.window_el {
            el.class_list().add_1("show").ok();
        }
    }

    /// Replaces any pending delayed reveal.
    pub(crate) fn queue(self: &Rc<Self>, delay_ms: f64) {
        if self.is_shown() {
            return;
        }
        if let Some(id) = self.pending.take() {
            clear_timeout(id);
        }
        let me = Rc::clone(self);
        let id = set_timeout(delay_ms, move || {
            me.pending.set(None);
            me.reveal();
        });
        self.pending.set(id);
    }
}

/// Handles to the elements the cursor intro animates. Cloned into every run;
/// overlapping runs therefore share the same cursor element.
#[derive(Clone)]
pub(crate) struct WebDesktop {
    desktop: Option<Element>,
    cursor: Option<HtmlElement>,
    label: Option<Element>,
    shortcut: Option<Element>,
    shortcut_target: String,
    reveal_delay_ms: f64,
    pub(crate) reveal: Rc<WindowReveal>,
}

impl WebDesktop {
    pub(crate) fn lookup(doc: &Document, config: &DesktopConfig) -> Self {
        let sel = &config.selectors;
        Self {
            desktop: query(doc, &sel.desktop),
            cursor: query(doc, &sel.cursor).and_then(|el| el.dyn_into::<HtmlElement>().ok()),
            label: query(doc, &sel.cursor_label),
            shortcut: query(doc, &sel.shortcut),
            shortcut_target: config.shortcut_target.clone(),
            reveal_delay_ms: config.playback.reveal_delay_after_open_ms,
            reveal: Rc::new(WindowReveal::new(query(doc, &sel.window))),
        }
    }
}

impl DesktopSurface for WebDesktop {
    fn desktop_rect(&self) -> Option<Rect> {
        self.desktop.as_ref().map(rect_of)
    }

    fn target_rect(&self) -> Option<Rect> {
        self.shortcut.as_ref().map(rect_of)
    }

    fn has_cursor(&self) -> bool {
        self.cursor.is_some()
    }

    fn set_cursor_label(&mut self, text: &str) {
        if let Some(label) = &self.label {
            label.set_text_content(Some(text));
        }
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        if let Some(cursor) = &self.cursor {
            let classes = cursor.class_list();
            if visible {
                classes.add_1("is-visible").ok();
            } else {
                classes.remove_1("is-visible").ok();
            }
        }
    }

    fn move_cursor(&mut self, pos: Point) {
        if let Some(cursor) = &self.cursor {
            let transform = format!("translate({}px, {}px)", pos.x, pos.y);
            cursor.style().set_property("transform", &transform).ok();
        }
    }

    fn apply_click(&mut self, click: &Click, preview: bool) {
        if click.target != self.shortcut_target {
            return;
        }
        let Some(shortcut) = &self.shortcut else {
            return;
        };
        match click.kind {
            ClickKind::Select => {
                shortcut.class_list().add_1("is-selected").ok();
            }
            ClickKind::Open => {
                shortcut.class_list().add_1("is-opening").ok();
                let el = shortcut.clone();
                set_timeout(OPENING_CLEAR_MS, move || {
                    el.class_list().remove_1("is-opening").ok();
                });
                if !preview {
                    self.reveal.queue(self.reveal_delay_ms);
                }
            }
        }
    }

    fn clear_target_state(&mut self) {
        if let Some(shortcut) = &self.shortcut {
            shortcut.class_list().remove_2("is-selected", "is-opening").ok();
        }
    }
}
