// Fetches `cursor-path.json`, bypassing the HTTP cache.
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestCache, RequestInit, Response, window};

use crate::cursor::Trajectory;
use crate::cursor::path_file::{PathLoadError, parse_path_document};

fn js_error(err: JsValue) -> PathLoadError {
    PathLoadError::Request(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

pub(crate) async fn fetch_cursor_path(url: &str) -> Result<Trajectory, PathLoadError> {
    let win = window().ok_or(PathLoadError::Unavailable)?;

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_cache(RequestCache::NoStore);
    let request = Request::new_with_str_and_init(url, &opts).map_err(js_error)?;

    let resp: Response = JsFuture::from(win.fetch_with_request(&request))
        .await
        .map_err(js_error)?
        .dyn_into()
        .map_err(js_error)?;
    if !resp.ok() {
        return Err(PathLoadError::Status(resp.status()));
    }
    let body = JsFuture::from(resp.text().map_err(js_error)?)
        .await
        .map_err(js_error)?;
    let text = body
        .as_string()
        .ok_or_else(|| PathLoadError::Request("response body is not text".to_string()))?;
    parse_path_document(&text)
}
