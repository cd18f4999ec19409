//! Browser bindings.
//!
//! The page constructs one [`SiteSearch`] and one [`SiteAnalytics`] from its
//! own script and keeps the handles; there is no global engine state.
//!
//! ```js
//! import init, { SiteSearch, SiteAnalytics } from "./pkg/site_engine.js";
//! await init();
//! const analytics = new SiteAnalytics("{}");
//! const search = new SiteSearch("{}");
//! search.bindShortcut(() => toggleSearchModal());
//! input.oninput = () => results.innerHTML = search.performSearch(input.value, "all");
//! ```

use crate::analytics::heatmap::rasterize;
use crate::analytics::render::{render_tab, Tab};
use crate::analytics::store::{DeviceInfo, PerformanceMetrics};
use crate::analytics::tracker::{ClickTarget, UsageAnalytics};
use crate::build::TextSource;
use crate::config::{AnalyticsConfig, SiteConfig};
use crate::error::StorageError;
use crate::render::{render_history, render_results};
use crate::search::SearchIndexer;
use crate::storage::KeyValueStore;
use crate::types::{FilterType, TextFragment};
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{
    CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, ImageData, KeyboardEvent,
    MouseEvent, PerformanceEntry, VisibilityState, Window,
};

/// Elements whose clicks become click events
const CLICKABLE: &str = r#"a, button, [role="button"]"#;

fn js_error(err: JsValue) -> JsError {
    JsError::new(&format!("{:?}", err))
}

fn window() -> Result<Window, JsError> {
    web_sys::window().ok_or_else(|| JsError::new("no window"))
}

fn document() -> Result<Document, JsError> {
    window()?
        .document()
        .ok_or_else(|| JsError::new("no document"))
}

fn current_path(window: &Window) -> String {
    window.location().pathname().unwrap_or_default()
}

fn parse_config(config_json: &str) -> Result<SiteConfig, JsError> {
    crate::logging::init(tracing::Level::INFO);
    console_error_panic_hook::set_once();
    SiteConfig::from_json(config_json)
        .map_err(|e| JsError::new(&format!("Failed to parse config: {}", e)))
}

/// `window.localStorage`
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    pub fn new() -> Result<Self, StorageError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(StorageError::Unavailable)?;
        Ok(LocalStorage { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|_| StorageError::Read(key.to_string()))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|_| StorageError::Write(key.to_string()))
    }
}

/// Text of every element matching `selectors` in the rendered document
pub struct DomTextSource {
    document: Document,
    selectors: String,
}

impl TextSource for DomTextSource {
    fn fragments(&self) -> Vec<TextFragment> {
        let nodes = match self.document.query_selector_all(&self.selectors) {
            Ok(nodes) => nodes,
            Err(e) => {
                warn!("Bad index selectors '{}': {:?}", self.selectors, e);
                return Vec::new();
            }
        };

        (0..nodes.length())
            .filter_map(|i| nodes.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|el| TextFragment::new(el.text_content().unwrap_or_default(), el.tag_name()))
            .collect()
    }
}

/// Search handle owned by the page script
#[wasm_bindgen]
pub struct SiteSearch {
    inner: SearchIndexer<LocalStorage>,
}

#[wasm_bindgen]
impl SiteSearch {
    /// Load the history and index the page as currently rendered
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<SiteSearch, JsError> {
        let config = parse_config(config_json)?;
        let store = LocalStorage::new().map_err(|e| JsError::new(&e.to_string()))?;
        let mut inner = SearchIndexer::new(store, config.search);
        inner.load();

        let mut search = SiteSearch { inner };
        search.rebuild()?;
        Ok(search)
    }

    /// Re-scan the document
    pub fn rebuild(&mut self) -> Result<(), JsError> {
        let window = window()?;
        let source = DomTextSource {
            document: document()?,
            selectors: self.inner.config().selectors.clone(),
        };
        self.inner.build(&source, &current_path(&window));
        Ok(())
    }

    #[wasm_bindgen(js_name = entryCount)]
    pub fn entry_count(&self) -> usize {
        self.inner.entries().len()
    }

    /// Ranked results as JSON
    pub fn query(&self, query: &str, filter: &str) -> Result<String, JsError> {
        let filter: FilterType = filter.parse().map_err(|e: String| JsError::new(&e))?;
        let results = self.inner.query(query, filter);
        serde_json::to_string(&results).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Result pane markup for the current input: results for searchable
    /// queries (recorded in the history), the history otherwise
    #[wasm_bindgen(js_name = performSearch)]
    pub fn perform_search(&mut self, query: &str, filter: &str) -> String {
        let filter = filter.parse().unwrap_or_default();
        match self.inner.perform_search(query, filter) {
            Some(results) => render_results(&results, query),
            None => render_history(self.inner.history()),
        }
    }

    #[wasm_bindgen(js_name = historyHtml)]
    pub fn history_html(&self) -> String {
        render_history(self.inner.history())
    }

    #[wasm_bindgen(js_name = historyJson)]
    pub fn history_json(&self) -> String {
        serde_json::to_string(self.inner.history()).unwrap_or_else(|_| "[]".to_string())
    }

    #[wasm_bindgen(js_name = clearHistory)]
    pub fn clear_history(&mut self) {
        self.inner.clear_history();
    }

    /// Call `callback` on Ctrl+K / Cmd+K
    #[wasm_bindgen(js_name = bindShortcut)]
    pub fn bind_shortcut(&self, callback: js_sys::Function) -> Result<(), JsError> {
        let handler = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            if (e.ctrl_key() || e.meta_key()) && e.key() == "k" {
                e.prevent_default();
                if let Err(err) = callback.call0(&JsValue::NULL) {
                    warn!("Search shortcut callback failed: {:?}", err);
                }
            }
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document()?
            .add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())
            .map_err(js_error)?;
        handler.forget();
        Ok(())
    }
}

type SharedAnalytics = Rc<RefCell<UsageAnalytics<LocalStorage>>>;

/// Analytics handle owned by the page script
#[wasm_bindgen]
pub struct SiteAnalytics {
    inner: SharedAnalytics,
    config: AnalyticsConfig,
}

#[wasm_bindgen]
impl SiteAnalytics {
    /// Count this page view, open a session and start listening
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<SiteAnalytics, JsError> {
        let config = parse_config(config_json)?.analytics;
        let window = window()?;
        let document = document()?;
        let store = LocalStorage::new().map_err(|e| JsError::new(&e.to_string()))?;

        let mut analytics = UsageAnalytics::new(store, config.clone(), current_path(&window));
        analytics.load();
        analytics.track_page_view();
        analytics.start_session(device_info(&window), &document.referrer());
        info!(session = analytics.session_id(), "analytics session started");

        let inner = Rc::new(RefCell::new(analytics));
        listen_clicks(&document, Rc::clone(&inner))?;
        listen_scroll(&window, Rc::clone(&inner))?;
        listen_page_hide(&window, &document, Rc::clone(&inner))?;
        schedule_performance(&window, &document, Rc::clone(&inner))?;

        Ok(SiteAnalytics { inner, config })
    }

    /// Overview figures as JSON
    #[wasm_bindgen(js_name = summaryJson)]
    pub fn summary_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.inner.borrow().summary())
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Markup for one of `overview`, `pageviews`, `heatmap`, `performance`
    #[wasm_bindgen(js_name = renderTab)]
    pub fn render_tab(&self, tab: &str) -> Result<String, JsError> {
        let tab: Tab = tab.parse().map_err(|e: String| JsError::new(&e))?;
        Ok(render_tab(tab, self.inner.borrow().data(), self.config.top_pages))
    }

    /// Paint the click heatmap into the canvas with id `canvas_id`. Does
    /// nothing if the canvas is gone (dashboard closed).
    #[wasm_bindgen(js_name = paintHeatmap)]
    pub fn paint_heatmap(&self, canvas_id: &str) -> Result<(), JsError> {
        let window = window()?;
        let Some(element) = document()?.get_element_by_id(canvas_id) else {
            return Ok(());
        };
        let canvas: HtmlCanvasElement = element
            .dyn_into()
            .map_err(|_| JsError::new("heatmap target is not a canvas"))?;
        let (width, height) = (self.config.heatmap_width, self.config.heatmap_height);
        canvas.set_width(width);
        canvas.set_height(height);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(js_error)?
            .ok_or_else(|| JsError::new("2d context unavailable"))?
            .dyn_into()
            .map_err(|_| JsError::new("2d context unavailable"))?;

        let viewport_width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let viewport_height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let heatmap = rasterize(
            &self.inner.borrow().data().heatmap_data,
            viewport_width,
            viewport_height,
            width,
            height,
            self.config.heatmap_radius,
        );

        let rgba = heatmap.to_rgba();
        let image =
            ImageData::new_with_u8_clamped_array_and_sh(Clamped(rgba.as_slice()), width, height)
                .map_err(js_error)?;
        ctx.put_image_data(&image, 0.0, 0.0).map_err(js_error)
    }

    /// Write the in-memory record to local storage
    pub fn flush(&self) -> Result<(), JsError> {
        self.inner
            .borrow()
            .flush()
            .map_err(|e| JsError::new(&e.to_string()))
    }
}

fn device_info(window: &Window) -> DeviceInfo {
    let navigator = window.navigator();
    DeviceInfo {
        width: window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0),
        height: window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0),
        user_agent: navigator.user_agent().unwrap_or_default(),
        platform: navigator.platform().unwrap_or_default(),
        language: navigator.language().unwrap_or_default(),
    }
}

fn listen_clicks(document: &Document, analytics: SharedAnalytics) -> Result<(), JsError> {
    let handler = Closure::wrap(Box::new(move |e: MouseEvent| {
        let target = e
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .and_then(|el| el.closest(CLICKABLE).ok().flatten())
            .map(|el| ClickTarget {
                tag: el.tag_name(),
                text: el.text_content().unwrap_or_default(),
            });
        analytics
            .borrow_mut()
            .record_click(e.client_x() as f64, e.client_y() as f64, target);
    }) as Box<dyn FnMut(MouseEvent)>);
    document
        .add_event_listener_with_callback("click", handler.as_ref().unchecked_ref())
        .map_err(js_error)?;
    handler.forget();
    Ok(())
}

fn listen_scroll(window: &Window, analytics: SharedAnalytics) -> Result<(), JsError> {
    let win = window.clone();
    let handler = Closure::wrap(Box::new(move || {
        let Some(body) = win.document().and_then(|d| d.body()) else {
            return;
        };
        let scroll_y = win.scroll_y().unwrap_or(0.0);
        let viewport = win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        analytics
            .borrow_mut()
            .observe_scroll(scroll_y, body.scroll_height() as f64, viewport);
    }) as Box<dyn FnMut()>);
    window
        .add_event_listener_with_callback("scroll", handler.as_ref().unchecked_ref())
        .map_err(js_error)?;
    handler.forget();
    Ok(())
}

/// Time on page is written when the page is hidden or torn down. The write
/// may still be lost if the browser kills the page first.
fn listen_page_hide(
    window: &Window,
    document: &Document,
    analytics: SharedAnalytics,
) -> Result<(), JsError> {
    let on_hide = Rc::clone(&analytics);
    let pagehide = Closure::wrap(Box::new(move || {
        on_hide.borrow_mut().record_time_on_page();
    }) as Box<dyn FnMut()>);
    window
        .add_event_listener_with_callback("pagehide", pagehide.as_ref().unchecked_ref())
        .map_err(js_error)?;
    pagehide.forget();

    let doc = document.clone();
    let visibility = Closure::wrap(Box::new(move || {
        if doc.visibility_state() == VisibilityState::Hidden {
            analytics.borrow_mut().record_time_on_page();
        }
    }) as Box<dyn FnMut()>);
    document
        .add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())
        .map_err(js_error)?;
    visibility.forget();
    Ok(())
}

fn read_performance(window: &Window) -> Option<PerformanceMetrics> {
    let performance = window.performance()?;
    let timing = performance.timing();
    let first_paint = performance
        .get_entries_by_type("paint")
        .get(0)
        .dyn_into::<PerformanceEntry>()
        .map(|entry| entry.start_time())
        .unwrap_or(0.0);

    Some(PerformanceMetrics {
        load_time: timing.load_event_end() - timing.navigation_start(),
        dom_ready: timing.dom_content_loaded_event_end() - timing.navigation_start(),
        first_paint,
    })
}

/// Read navigation timings on the next tick, when `loadEventEnd` is set
fn defer_performance(window: Window, analytics: SharedAnalytics) {
    Timeout::new(0, move || {
        if let Some(metrics) = read_performance(&window) {
            analytics.borrow_mut().record_performance(metrics);
        }
    })
    .forget();
}

/// Read navigation timings once, just after the load event has finished
fn schedule_performance(
    window: &Window,
    document: &Document,
    analytics: SharedAnalytics,
) -> Result<(), JsError> {
    if document.ready_state() == "complete" {
        defer_performance(window.clone(), analytics);
        return Ok(());
    }

    let win = window.clone();
    let on_load = Closure::wrap(Box::new(move || {
        defer_performance(win.clone(), Rc::clone(&analytics));
    }) as Box<dyn FnMut()>);
    window
        .add_event_listener_with_callback("load", on_load.as_ref().unchecked_ref())
        .map_err(js_error)?;
    on_load.forget();
    Ok(())
}
