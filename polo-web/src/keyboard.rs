//! Document-wide keyboard shortcuts.
use crate::dom;
use crate::page::Page;
use polo_core::{KeyChord, Shortcut};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::KeyboardEvent;

pub fn install(page: &Page) {
    let Some(doc) = dom::document() else {
        return;
    };
    let page = page.clone();
    let on_key = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
        let key = event.key();
        let chord = KeyChord {
            key: &key,
            alt: event.alt_key(),
            ctrl: event.ctrl_key(),
        };
        let Some(shortcut) = Shortcut::from_chord(chord) else {
            return;
        };
        if shortcut.prevents_default() {
            event.prevent_default();
        }
        dispatch(&page, shortcut);
    });
    let _ = doc.add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref());
    on_key.forget();
}

fn dispatch(page: &Page, shortcut: Shortcut) {
    match shortcut {
        Shortcut::Navigate(destination) => {
            let path = destination.path(&page.config.shortcuts);
            if let Some(win) = dom::window()
                && let Err(err) = win.location().set_href(path)
            {
                log::warn!("navigation to {path} failed: {}", dom::js_error_message(&err));
            }
        }
        Shortcut::ToggleContrast => {
            page.toggle_high_contrast();
        }
        Shortcut::Font(action) => {
            page.adjust_font_size(action);
        }
    }
}
