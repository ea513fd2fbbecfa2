use futures::executor::block_on;
use polo_core::{PoloConfig, Severity};
use polo_web::feedback::{CONTAINER_CLASS, banner_class};
use polo_web::map::{ZoomControls, ZoomControlsProps, ZoomDirection};
use polo_web::page::config;
use polo_web::render::DocumentRenderer;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use yew::{AttrValue, Callback, LocalServerRenderer};

#[test]
fn bundled_config_is_served_to_the_page() {
    let cfg = config();
    assert_eq!(cfg, &PoloConfig::default());
    assert_eq!(cfg.elements.cep, "cep");
    assert_eq!(cfg.feedback.ttl_ms, 5000);
}

#[test]
fn zoom_controls_use_configured_labels() {
    let messages = &config().messages;
    let props = ZoomControlsProps {
        zoom_in_label: AttrValue::from(messages.zoom_in_label.clone()),
        zoom_out_label: AttrValue::from(messages.zoom_out_label.clone()),
        on_zoom: Callback::noop(),
    };
    let html = block_on(LocalServerRenderer::<ZoomControls>::with_props(props).render());
    assert!(html.contains(&format!("aria-label=\"{}\"", messages.zoom_in_label)));
    assert!(html.contains(&format!("aria-label=\"{}\"", messages.zoom_out_label)));
    assert_eq!(html.matches("type=\"button\"").count(), 2);
}

#[test]
fn zoom_callback_receives_direction() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let cb = Callback::from(move |direction: ZoomDirection| sink.borrow_mut().push(direction));
    cb.emit(ZoomDirection::Out);
    cb.emit(ZoomDirection::In);
    assert_eq!(*seen.borrow(), vec![ZoomDirection::Out, ZoomDirection::In]);
}

#[test]
fn banner_markup_tracks_severity() {
    for severity in [
        Severity::Info,
        Severity::Success,
        Severity::Warning,
        Severity::Danger,
    ] {
        let class = banner_class(&severity.alert_class());
        assert!(class.starts_with("alert alert-"));
        assert!(class.contains(severity.as_str()));
        assert!(class.contains("alert-dismissible"));
    }
    assert!(CONTAINER_CLASS.contains("position-fixed"));
}

#[test]
fn completed_cep_is_announced_once() {
    let renderer = DocumentRenderer::new("cep", Duration::from_millis(10));
    renderer.track_field_value("0131");
    let step = renderer.mask_input("01310930");
    assert_eq!(step.value, "01310-930");
    assert!(step.completed);
    assert!(!renderer.mask_input("01310-9301").completed);
    assert!(!renderer.mask_input("01310-930").completed);
}
