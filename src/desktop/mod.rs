//! Browser bindings for the desktop intro.
//!
//! `init_desktop()` looks up the page elements, starts loading the cursor path
//! and wires the optional preview button / path recorder. The host page then
//! calls `launch_desktop_intro()` once its loader screen is gone; the returned
//! promise resolves after the cursor demo finished and the portfolio window is
//! shown, which is the cue to start the typing animation.
//!
//! Everything runs on the page's single thread. Runs are stepped from
//! requestAnimationFrame; a preview run may overlap the primary one and both
//! move the same cursor element.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, future_to_promise};
use web_sys::{
    Blob, BlobPropertyBag, Document, HtmlAnchorElement, HtmlElement, Url, UrlSearchParams, Window, console, window,
};

use crate::config::{DesktopConfig, PREVIEW_QUERY_FLAG, preview_enabled};
use crate::cursor::playback::{DesktopSurface, Frame, PlaybackRun, RunOptions};
use crate::cursor::recorder::PathRecorder;
use crate::cursor::TrajectoryStore;
use crate::performance_now;

mod loader;
mod surface;

use surface::WebDesktop;

struct DesktopState {
    config: DesktopConfig,
    surface: WebDesktop,
    store: TrajectoryStore,
    // resolves once the cursor path fetch settled (loaded or not)
    path_ready: Option<js_sys::Promise>,
    active_run: Option<RunHandle>,
    recorder: Option<PathRecorder>,
}

thread_local! {
    static DESKTOP: RefCell<Option<DesktopState>> = const { RefCell::new(None) };
}

/// Runs `f` against the desktop state; `None` before `init_desktop()`.
/// Never call back into the web layer from inside `f`.
fn with_state<R>(f: impl FnOnce(&mut DesktopState) -> R) -> Option<R> {
    DESKTOP.with(|cell| cell.borrow_mut().as_mut().map(f))
}

fn warn(msg: &str, err: &JsValue) {
    console::warn_2(&JsValue::from_str(msg), err);
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

pub(crate) fn set_timeout(delay_ms: f64, f: impl FnOnce() + 'static) -> Option<i32> {
    let win = window()?;
    let cb = Closure::once_into_js(f);
    win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), delay_ms as i32)
        .ok()
}

pub(crate) fn clear_timeout(id: i32) {
    if let Some(win) = window() {
        win.clear_timeout_with_handle(id);
    }
}

// --- Entry points -------------------------------------------------------------

#[wasm_bindgen]
pub fn init_desktop(config_json: Option<String>) -> Result<(), JsValue> {
    let config = DesktopConfig::from_optional_json(config_json.as_deref()).map_err(to_js)?;
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let url = config.cursor_path_url.clone();
    let recording = config.record_cursor_path;
    let state = DesktopState {
        surface: WebDesktop::lookup(&doc, &config),
        store: TrajectoryStore::default(),
        path_ready: None,
        active_run: None,
        recorder: recording.then(|| PathRecorder::new(performance_now())),
        config,
    };
    DESKTOP.with(|d| d.replace(Some(state)));

    let ready = future_to_promise(async move {
        match loader::fetch_cursor_path(&url).await {
            Ok(trajectory) => {
                with_state(|s| s.store.set_loaded(trajectory));
            }
            Err(err) => warn("Falling back to default cursor path", &to_js(err)),
        }
        Ok(JsValue::UNDEFINED)
    });
    with_state(|s| s.path_ready = Some(ready));

    wire_preview_button(&win, &doc)?;
    if recording {
        wire_recorder(&doc)?;
    }
    Ok(())
}

/// Plays the primary intro (after the path load settled) and reveals the
/// portfolio window. Never rejects.
#[wasm_bindgen]
pub fn launch_desktop_intro() -> js_sys::Promise {
    future_to_promise(async {
        if let Some(ready) = with_state(|s| s.path_ready.clone()).flatten() {
            if let Err(err) = JsFuture::from(ready).await {
                warn("Cursor path load failed", &err);
            }
        }
        let enabled = with_state(|s| s.config.cursor_intro_enabled).unwrap_or(false);
        if enabled {
            if let Err(err) = JsFuture::from(play_cursor_intro(RunOptions::default())).await {
                warn("Cursor intro sequence failed", &err);
            }
        }
        reveal_portfolio_window();
        Ok(JsValue::UNDEFINED)
    })
}

/// Replays the intro without revealing the window.
#[wasm_bindgen]
pub fn preview_cursor_intro() -> js_sys::Promise {
    play_cursor_intro(RunOptions { preview: true })
}

/// Stops the most recent run; no-op when nothing is playing.
#[wasm_bindgen]
pub fn cancel_cursor_intro() {
    if let Some(handle) = with_state(|s| s.active_run.take()).flatten() {
        handle.cancel();
    }
}

#[wasm_bindgen]
pub fn reveal_portfolio_window() {
    if let Some(reveal) = with_state(|s| Rc::clone(&s.surface.reveal)) {
        reveal.reveal();
    }
}

/// Recorded path as `cursor-path.json` content, when recording is enabled.
#[wasm_bindgen]
pub fn recorded_cursor_path() -> Option<String> {
    with_state(|s| s.recorder.as_ref().and_then(|r| r.to_json().ok())).flatten()
}

#[wasm_bindgen(js_name = downloadCursorPath)]
pub fn download_cursor_path() -> Result<(), JsValue> {
    let json = recorded_cursor_path().ok_or_else(|| JsValue::from_str("cursor path recorder is not active"))?;
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let props = BlobPropertyBag::new();
    props.set_type("application/json");
    let parts = js_sys::Array::of1(&JsValue::from_str(&json));
    let blob = Blob::new_with_str_sequence_and_options(&parts, &props)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = doc.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download("cursor-path.json");
    anchor.click();
    set_timeout(2000.0, move || {
        Url::revoke_object_url(&url).ok();
    });
    Ok(())
}

// --- Playback ----------------------------------------------------------------

fn play_cursor_intro(options: RunOptions) -> js_sys::Promise {
    js_sys::Promise::new(&mut |resolve, _reject| {
        start_run(
            options,
            Box::new(move || {
                resolve.call0(&JsValue::UNDEFINED).ok();
            }),
        );
    })
}

fn start_run(options: RunOptions, done: Box<dyn FnOnce()>) {
    let setup = with_state(|s| {
        (
            s.store.active(),
            s.surface.clone(),
            s.config.playback.clone(),
            s.config.shortcut_target.clone(),
        )
    });
    let Some((trajectory, surface, playback, target)) = setup else {
        done();
        return;
    };
    let reveal = Rc::clone(&surface.reveal);
    let Some(run) = PlaybackRun::begin(trajectory, surface, &playback, &target, options, performance_now()) else {
        if !options.preview {
            reveal.reveal();
        }
        done();
        return;
    };
    let run = Rc::new(RefCell::new(run.on_finish(move || {
        // clears the slot even when a newer overlapping run owns it; that run
        // then plays out without a cancel handle
        with_state(|s| s.active_run = None);
        done();
    })));
    match drive(Rc::clone(&run)) {
        Ok(handle) => {
            with_state(|s| s.active_run = Some(handle));
        }
        Err(err) => {
            warn("Cursor intro could not be scheduled", &err);
            run.borrow_mut().cancel();
        }
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Cancellation hook for a run driven by [`drive`].
struct RunHandle {
    run: Rc<RefCell<PlaybackRun<WebDesktop>>>,
    frame: FrameCallback,
    raf_id: Rc<Cell<Option<i32>>>,
}

impl RunHandle {
    fn cancel(&self) {
        if let (Some(id), Some(w)) = (self.raf_id.take(), window()) {
            w.cancel_animation_frame(id).ok();
        }
        if let Ok(mut run) = self.run.try_borrow_mut() {
            run.cancel();
        }
        // breaks the closure <-> handle cycle
        if let Ok(mut frame) = self.frame.try_borrow_mut() {
            frame.take();
        }
    }
}

fn drive(run: Rc<RefCell<PlaybackRun<WebDesktop>>>) -> Result<RunHandle, JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let raf_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    let ticking = Rc::clone(&run);
    let next_id = Rc::clone(&raf_id);
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        next_id.set(None);
        if ticking.borrow_mut().step(ts) == Frame::Finished {
            // last frame: drop our handle so the closure gets cleaned up
            let _ = f.borrow_mut().take();
            return;
        }
        if let Some(w) = window() {
            if let Some(cb) = f.borrow().as_ref() {
                next_id.set(w.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
            }
        }
    }) as Box<dyn FnMut(f64)>));
    let first = match g.borrow().as_ref() {
        Some(cb) => win.request_animation_frame(cb.as_ref().unchecked_ref())?,
        None => return Err(JsValue::from_str("frame callback missing")),
    };
    raf_id.set(Some(first));
    Ok(RunHandle { run, frame: g, raf_id })
}

// --- Preview button / recorder ----------------------------------------------

fn wire_preview_button(win: &Window, doc: &Document) -> Result<(), JsValue> {
    let Some((selector, recording)) =
        with_state(|s| (s.config.selectors.preview_button.clone(), s.config.record_cursor_path))
    else {
        return Ok(());
    };
    let Some(button) = doc
        .query_selector(&selector)?
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        return Ok(());
    };
    let location = win.location();
    let enabled = preview_enabled(
        preview_requested(&location.search().unwrap_or_default())?,
        &location.hostname().unwrap_or_default(),
        recording,
    );
    button.set_hidden(!enabled);
    if enabled {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            let _ = preview_cursor_intro();
        }) as Box<dyn FnMut(_)>);
        button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

/// Whether a `location.search` string carries the preview flag. Keys are
/// percent- and `+`-decoded the way the browser does it.
pub fn preview_requested(search: &str) -> Result<bool, JsValue> {
    Ok(UrlSearchParams::new_with_str(search)?.has(PREVIEW_QUERY_FLAG))
}

fn wire_recorder(doc: &Document) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
        let now = performance_now();
        with_state(|s| {
            if let (Some(rec), Some(rect)) = (s.recorder.as_mut(), s.surface.desktop_rect()) {
                rec.record(now, evt.client_x() as f64, evt.client_y() as f64, rect);
            }
        });
    }) as Box<dyn FnMut(_)>);
    doc.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
    closure.forget();
    console::info_1(&JsValue::from_str(
        "Cursor path recorder active - call downloadCursorPath() to export the data.",
    ));
    Ok(())
}
