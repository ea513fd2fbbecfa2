#![forbid(unsafe_code)]
//! Progressive enhancements for the polo lookup pages.
//!
//! `start` runs when the module loads: it restores the saved accessibility
//! preferences and wires the postal-code field, the geolocation button, form
//! validation, the map controls and the keyboard shortcuts. The functions
//! exported to JavaScript let page markup call the same operations.
use polo_core::{FontAction, Severity};
use std::cell::RefCell;
use std::time::Duration;
use wasm_bindgen::prelude::*;

pub mod dom;
pub mod feedback;
pub mod forms;
pub mod geo;
pub mod keyboard;
pub mod map;
pub mod page;
pub mod render;
pub mod storage;

use page::Page;

thread_local! {
    static PAGE: RefCell<Option<Page>> = const { RefCell::new(None) };
}

fn with_page<T>(f: impl FnOnce(&Page) -> T) -> Option<T> {
    let page = PAGE.with(|slot| slot.borrow().clone());
    match page {
        Some(page) => Some(f(&page)),
        None => {
            log::warn!("page not initialised yet");
            None
        }
    }
}

/// Route the `log` macros to the browser console at `Info`.
pub fn init_logging() {
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    init_logging();
    let page = Page::boot(page::config());
    page.enhance();
    PAGE.with(|slot| *slot.borrow_mut() = Some(page));
}

/// Flip high-contrast mode. Returns the new state.
#[wasm_bindgen(js_name = toggleHighContrast)]
pub fn toggle_high_contrast() -> bool {
    with_page(Page::toggle_high_contrast).unwrap_or(false)
}

/// `increase`, `decrease` or `reset`. Returns the resulting scale.
#[wasm_bindgen(js_name = adjustFontSize)]
pub fn adjust_font_size(action: &str) -> f64 {
    let Some(action) = FontAction::from_name(action) else {
        log::warn!("unknown font action {action:?}");
        return with_page(|page| page.prefs.borrow().preferences().font_scale.as_f64())
            .unwrap_or(1.0);
    };
    with_page(|page| page.adjust_font_size(action)).unwrap_or(1.0)
}

#[wasm_bindgen(js_name = switchTheme)]
pub fn switch_theme(name: &str) -> bool {
    with_page(|page| page.switch_theme(name)).unwrap_or(false)
}

/// Show a banner. `duration` is in milliseconds; the configured ttl applies when omitted.
#[wasm_bindgen(js_name = showFeedback)]
pub fn show_feedback(text: &str, kind: Option<String>, duration: Option<u32>) {
    let severity = kind.as_deref().map_or(Severity::Info, Severity::from_name);
    let ttl = duration.map(|ms| Duration::from_millis(u64::from(ms)));
    with_page(|page| page.show_feedback(text, severity, ttl));
}

#[wasm_bindgen(js_name = mapZoomIn)]
pub fn map_zoom_in() {
    with_page(|page| {
        map::zoom_and_announce(page.renderer.as_ref(), &page.config.messages, map::ZoomDirection::In);
    });
}

#[wasm_bindgen(js_name = mapZoomOut)]
pub fn map_zoom_out() {
    with_page(|page| {
        map::zoom_and_announce(page.renderer.as_ref(), &page.config.messages, map::ZoomDirection::Out);
    });
}
