#![cfg(target_arch = "wasm32")]

use polo_core::{FeedbackMessage, FeedbackSink, KeyValueStore, LocateError, RenderPort};
use polo_web::dom;
use polo_web::feedback::DomFeedback;
use polo_web::forms;
use polo_web::geo;
use polo_web::page::{self, Page};
use polo_web::render::DocumentRenderer;
use polo_web::storage::LocalStore;
use std::time::Duration;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Event, HtmlElement, HtmlInputElement};

wasm_bindgen_test_configure!(run_in_browser);

fn ensure_cep_field(id: &str) -> HtmlInputElement {
    let doc = dom::document().expect("document");
    if let Some(existing) = doc.get_element_by_id(id) {
        return existing.dyn_into().expect("input element");
    }
    let input = doc.create_element("input").expect("create input");
    input.set_id(id);
    doc.body()
        .expect("document body")
        .append_child(&input)
        .expect("append input");
    input.dyn_into().expect("input element")
}

#[wasm_bindgen_test]
fn dom_helpers_find_the_browser() {
    assert!(dom::window().is_some());
    assert!(dom::document().is_some());
    assert!(dom::body().is_some());
}

#[wasm_bindgen_test]
fn renderer_toggles_classes_and_properties() {
    let renderer = DocumentRenderer::new("cep-test", Duration::from_millis(10));
    renderer.set_body_class("high-contrast", true);
    let body = dom::body().expect("body");
    assert!(body.class_list().contains("high-contrast"));
    renderer.set_body_class("high-contrast", false);
    assert!(!body.class_list().contains("high-contrast"));

    renderer.set_root_property("--font-size-scale", "1.2");
    let root = dom::document()
        .and_then(|doc| doc.document_element())
        .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
        .expect("root element");
    assert_eq!(
        root.style().get_property_value("--font-size-scale").ok().as_deref(),
        Some("1.2")
    );
}

#[wasm_bindgen_test]
fn renderer_writes_the_cep_field() {
    let input = ensure_cep_field("cep-test");
    let renderer = DocumentRenderer::new("cep-test", Duration::from_millis(10));
    renderer.set_field_value("01310-930");
    assert_eq!(input.value(), "01310-930");
    assert_eq!(renderer.field_value().as_deref(), Some("01310-930"));
}

#[wasm_bindgen_test]
fn feedback_container_is_created_once() {
    let feedback = DomFeedback::new("feedback-test", Duration::from_millis(10), "Fechar");
    feedback.show(FeedbackMessage::info("um"));
    feedback.show(FeedbackMessage::danger("dois"));
    let container = dom::element_by_id("feedback-test").expect("container");
    assert_eq!(container.children().length(), 2);
    assert_eq!(feedback.live_banners(), 2);
    let doc = dom::document().expect("document");
    assert_eq!(
        doc.query_selector_all("#feedback-test").expect("query").length(),
        1
    );
    let close = container
        .query_selector(".btn-close")
        .expect("query")
        .expect("close button");
    assert_eq!(close.get_attribute("aria-label").as_deref(), Some("Fechar"));
}

#[wasm_bindgen_test]
fn local_store_round_trips_values() {
    let store = LocalStore;
    store.set("polo-test", "true").expect("localStorage write");
    assert_eq!(store.get("polo-test").as_deref(), Some("true"));
}

#[wasm_bindgen_test]
async fn banner_fades_then_leaves_the_tree() {
    let feedback = DomFeedback::new("feedback-expiry", Duration::from_millis(200), "Fechar");
    feedback.show(FeedbackMessage::success("salvo").with_ttl(Duration::from_millis(10)));
    let container = dom::element_by_id("feedback-expiry").expect("container");
    let banner = container.first_element_child().expect("banner");
    assert!(banner.class_list().contains("show"));

    dom::sleep(Duration::from_millis(60)).await.expect("sleep");
    assert!(!banner.class_list().contains("show"));
    assert!(banner.is_connected());
    assert_eq!(feedback.live_banners(), 1);

    dom::sleep(Duration::from_millis(300)).await.expect("sleep");
    assert!(!banner.is_connected());
    assert_eq!(feedback.live_banners(), 0);
    assert_eq!(feedback.close_handlers(), 0);
}

#[wasm_bindgen_test]
async fn close_button_removes_banner_at_once() {
    let feedback = DomFeedback::new("feedback-dismiss", Duration::from_millis(10), "Fechar");
    feedback.show(FeedbackMessage::info("fechar").with_ttl(Duration::from_millis(20)));
    let container = dom::element_by_id("feedback-dismiss").expect("container");
    let close: HtmlElement = container
        .query_selector(".btn-close")
        .expect("query")
        .expect("close button")
        .dyn_into()
        .expect("html element");

    close.click();
    assert_eq!(container.children().length(), 0);
    assert_eq!(feedback.live_banners(), 0);
    assert_eq!(feedback.close_handlers(), 0);

    // Both timer steps have elapsed by now and must find nothing to do.
    dom::sleep(Duration::from_millis(80)).await.expect("sleep");
    assert_eq!(container.children().length(), 0);
    assert_eq!(feedback.live_banners(), 0);
}

#[wasm_bindgen_test]
fn cep_field_is_masked_on_input() {
    let config = page::config();
    let input = ensure_cep_field(&config.elements.cep);
    input.set_value("");
    let page = Page::boot(config);
    forms::enhance_cep_input(&page);

    input.set_value("01.310930x");
    let event = Event::new("input").expect("input event");
    input.dispatch_event(&event).expect("dispatch");
    assert_eq!(input.value(), "01310-930");
}

#[wasm_bindgen_test]
fn written_cep_is_not_announced_on_next_keystroke() {
    ensure_cep_field("cep-tracked");
    let renderer = DocumentRenderer::new("cep-tracked", Duration::from_millis(10));
    renderer.set_field_value("01310-930");
    let step = renderer.mask_input("01310-9301");
    assert_eq!(step.value, "01310-930");
    assert!(!step.completed);
}

#[wasm_bindgen_test]
async fn thrown_position_request_rejects() {
    let promise = geo::position_promise(|_, _| Err(JsValue::from_str("blocked")));
    let err = JsFuture::from(promise).await.expect_err("rejected");
    assert_eq!(geo::locate_error(err), LocateError::PositionUnavailable);
}

#[wasm_bindgen_test]
fn logging_goes_to_the_console_at_info() {
    polo_web::init_logging();
    assert_eq!(log::max_level(), log::LevelFilter::Info);
    log::info!("browser logging ready");
}
