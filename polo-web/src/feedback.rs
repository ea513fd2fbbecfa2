//! Dismissible feedback banners in a fixed-position container.
use crate::dom;
use polo_core::{BannerId, FeedbackBoard, FeedbackMessage, FeedbackSink};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Element, HtmlElement};

pub const CONTAINER_CLASS: &str = "position-fixed top-0 end-0 p-3";
const SHOW_CLASS: &str = "show";

type CloseHandlers = Rc<RefCell<HashMap<BannerId, Closure<dyn FnMut()>>>>;

/// Class attribute of a banner with the given severity class, e.g. `alert-danger`.
#[must_use]
pub fn banner_class(severity_class: &str) -> String {
    format!("alert {severity_class} alert-dismissible fade {SHOW_CLASS} feedback-message")
}

/// Renders a [`FeedbackBoard`] into the page.
///
/// The container is created on first use. Each banner fades (its `show` class is
/// dropped) when its ttl elapses and leaves the tree after the fade. The close
/// button removes it immediately.
#[derive(Clone)]
pub struct DomFeedback {
    board: Rc<RefCell<FeedbackBoard>>,
    close_handlers: CloseHandlers,
    container_id: String,
    fade: Duration,
    dismiss_label: String,
}

impl DomFeedback {
    pub fn new(
        container_id: impl Into<String>,
        fade: Duration,
        dismiss_label: impl Into<String>,
    ) -> Self {
        Self {
            board: Rc::new(RefCell::new(FeedbackBoard::new())),
            close_handlers: Rc::new(RefCell::new(HashMap::new())),
            container_id: container_id.into(),
            fade,
            dismiss_label: dismiss_label.into(),
        }
    }

    /// Number of banners still on screen.
    #[must_use]
    pub fn live_banners(&self) -> usize {
        self.board.borrow().len()
    }

    /// Close-button listeners still held for banners on screen.
    #[must_use]
    pub fn close_handlers(&self) -> usize {
        self.close_handlers.borrow().len()
    }

    fn container(&self) -> Option<Element> {
        if let Some(existing) = dom::element_by_id(&self.container_id) {
            return Some(existing);
        }
        let doc = dom::document()?;
        let container = doc.create_element("div").ok()?;
        container.set_id(&self.container_id);
        container.set_class_name(CONTAINER_CLASS);
        if let Some(styled) = container.dyn_ref::<HtmlElement>() {
            let _ = styled.style().set_property("z-index", "1050");
        }
        dom::body()?.append_child(&container).ok()?;
        Some(container)
    }

    fn build_banner(&self, message: &FeedbackMessage) -> Option<(Element, Element)> {
        let doc = dom::document()?;
        let banner = doc.create_element("div").ok()?;
        banner.set_class_name(&banner_class(&message.severity.alert_class()));
        banner.set_attribute("role", "alert").ok()?;
        let text = doc.create_element("span").ok()?;
        text.set_text_content(Some(&message.text));
        banner.append_child(&text).ok()?;
        let close = doc.create_element("button").ok()?;
        close.set_attribute("type", "button").ok()?;
        close.set_class_name("btn-close");
        close.set_attribute("aria-label", &self.dismiss_label).ok()?;
        banner.append_child(&close).ok()?;
        Some((banner, close))
    }

    fn wire_close(&self, id: BannerId, banner: &Element, close: &Element) {
        let board = Rc::clone(&self.board);
        let handlers = Rc::clone(&self.close_handlers);
        let node = banner.clone();
        let on_close = Closure::once(move || {
            if board.borrow_mut().dismiss(id).is_some() {
                node.remove();
            }
            // The running handler is released after it returns.
            let handler = handlers.borrow_mut().remove(&id);
            wasm_bindgen_futures::spawn_local(async move { drop(handler) });
        });
        let _ = close.add_event_listener_with_callback("click", on_close.as_ref().unchecked_ref());
        self.close_handlers.borrow_mut().insert(id, on_close);
    }

    fn schedule_expiry(&self, id: BannerId, banner: Element, ttl: Duration) {
        let board = Rc::clone(&self.board);
        let handlers = Rc::clone(&self.close_handlers);
        let fade = self.fade;
        wasm_bindgen_futures::spawn_local(async move {
            if dom::sleep(ttl).await.is_err() || !board.borrow_mut().hide(id) {
                return;
            }
            let _ = banner.class_list().remove_1(SHOW_CLASS);
            if dom::sleep(fade).await.is_err() {
                return;
            }
            if board.borrow_mut().remove(id).is_some() {
                banner.remove();
                handlers.borrow_mut().remove(&id);
            }
        });
    }
}

impl FeedbackSink for DomFeedback {
    fn show(&self, message: FeedbackMessage) {
        let Some(container) = self.container() else {
            log::warn!("no document to show feedback in: {}", message.text);
            return;
        };
        let Some((banner, close)) = self.build_banner(&message) else {
            return;
        };
        if container.append_child(&banner).is_err() {
            return;
        }
        let ttl = message.ttl;
        let id = self.board.borrow_mut().show(message);
        self.wire_close(id, &banner, &close);
        self.schedule_expiry(id, banner, ttl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_class_matches_bootstrap_alert_markup() {
        assert_eq!(
            banner_class("alert-success"),
            "alert alert-success alert-dismissible fade show feedback-message"
        );
    }
}
