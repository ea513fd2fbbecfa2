//! Postal-code field, geolocation button and form validation glue.
use crate::dom;
use crate::geo::BrowserGeolocator;
use crate::page::Page;
use polo_core::{FeedbackMessage, FeedbackSink, RenderPort};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Event, HtmlFormElement, HtmlInputElement};

pub const VALIDATION_SELECTOR: &str = ".needs-validation";
pub const VALIDATED_CLASS: &str = "was-validated";

/// Mask the postal-code field on every input event.
pub fn enhance_cep_input(page: &Page) {
    let Some(input) = dom::element_by_id(&page.config.elements.cep)
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
    else {
        return;
    };
    page.renderer.track_field_value(&input.value());
    let renderer = Rc::clone(&page.renderer);
    let announcement = page.config.messages.cep_formatted.clone();
    let on_input = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let Some(field) = event
            .target()
            .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        let step = renderer.mask_input(&field.value());
        field.set_value(&step.value);
        if step.completed {
            renderer.announce(&announcement);
        }
    });
    let _ = input.add_event_listener_with_callback("input", on_input.as_ref().unchecked_ref());
    on_input.forget();
}

/// Resolve the visitor's CEP when the geolocation button is clicked.
pub fn enhance_locate_button(page: &Page) {
    let Some(button) = dom::element_by_id(&page.config.elements.locate_button) else {
        return;
    };
    if !BrowserGeolocator::is_supported() {
        log::info!("geolocation unsupported, leaving the location button inert");
        return;
    }
    let page = page.clone();
    let on_click = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        let page = page.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = page
                .resolver
                .resolve(page.renderer.as_ref(), page.feedback.as_ref())
                .await
            {
                log::debug!("location request ended without a CEP: {err}");
            }
        });
    });
    let _ = button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref());
    on_click.forget();
}

/// Warn about missing required fields on `.needs-validation` forms.
pub fn enhance_validation(page: &Page) {
    let Some(forms) = dom::document().and_then(|doc| doc.query_selector_all(VALIDATION_SELECTOR).ok())
    else {
        return;
    };
    for index in 0..forms.length() {
        let Some(form) = forms
            .item(index)
            .and_then(|node| node.dyn_into::<HtmlFormElement>().ok())
        else {
            continue;
        };
        let feedback = Rc::clone(&page.feedback);
        let warning = page.config.messages.form_invalid.clone();
        let ttl = page.config.feedback.ttl();
        let target = form.clone();
        let on_submit = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if !target.check_validity() {
                event.prevent_default();
                event.stop_propagation();
                feedback.show(FeedbackMessage::warning(warning.as_str()).with_ttl(ttl));
            }
            let _ = target.class_list().add_1(VALIDATED_CLASS);
        });
        let _ = form.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref());
        on_submit.forget();
    }
}
