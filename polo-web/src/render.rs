//! DOM implementation of the render port.
use crate::dom;
use polo_core::{MaskedInput, RenderPort};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, HtmlInputElement};

/// Class that hides an element visually while keeping it readable by screen readers.
pub const VISUALLY_HIDDEN: &str = "visually-hidden";

/// Mutates the live document. Missing elements are skipped silently.
///
/// The renderer also remembers the last value the postal-code field held, so a
/// keystroke after a programmatic write is not announced as a fresh completion.
#[derive(Debug, Clone)]
pub struct DocumentRenderer {
    field_id: String,
    announce_for: Duration,
    last_field_value: Rc<RefCell<String>>,
}

impl DocumentRenderer {
    pub fn new(field_id: impl Into<String>, announce_for: Duration) -> Self {
        Self {
            field_id: field_id.into(),
            announce_for,
            last_field_value: Rc::new(RefCell::new(String::new())),
        }
    }

    fn field(&self) -> Option<HtmlInputElement> {
        dom::element_by_id(&self.field_id)?.dyn_into().ok()
    }

    /// Current value of the postal-code field, if the page has one.
    #[must_use]
    pub fn field_value(&self) -> Option<String> {
        self.field().map(|input| input.value())
    }

    /// Start tracking from the value the field already holds.
    pub fn track_field_value(&self, value: &str) {
        value.clone_into(&mut self.last_field_value.borrow_mut());
    }

    /// Mask a raw field value against the last one seen and remember the result.
    #[must_use]
    pub fn mask_input(&self, raw: &str) -> MaskedInput {
        let step = MaskedInput::apply(&self.last_field_value.borrow(), raw);
        self.track_field_value(&step.value);
        step
    }
}

impl RenderPort for DocumentRenderer {
    fn set_body_class(&self, class: &str, enabled: bool) {
        if let Some(el) = dom::body() {
            let _ = if enabled {
                el.class_list().add_1(class)
            } else {
                el.class_list().remove_1(class)
            };
        }
    }

    fn set_root_property(&self, name: &str, value: &str) {
        if let Some(root) = dom::document()
            .and_then(|doc| doc.document_element())
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            let _ = root.style().set_property(name, value);
        }
    }

    fn set_field_value(&self, value: &str) {
        if let Some(input) = self.field() {
            input.set_value(value);
            self.track_field_value(value);
        }
    }

    fn announce(&self, message: &str) {
        announce(message, self.announce_for);
    }
}

/// Append a short-lived live region carrying `message` and drop it after `linger`.
pub fn announce(message: &str, linger: Duration) {
    let (Some(doc), Some(body)) = (dom::document(), dom::body()) else {
        return;
    };
    let Ok(node) = doc.create_element("div") else {
        return;
    };
    let _ = node.set_attribute("role", "alert");
    let _ = node.set_attribute("aria-live", "polite");
    let _ = node.class_list().add_1(VISUALLY_HIDDEN);
    node.set_text_content(Some(message));
    if body.append_child(&node).is_err() {
        return;
    }
    wasm_bindgen_futures::spawn_local(async move {
        if dom::sleep(linger).await.is_ok() {
            node.remove();
        }
    });
}
