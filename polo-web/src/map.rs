//! Accessible zoom buttons and usage instructions for the Leaflet map.
use crate::dom;
use crate::render::VISUALLY_HIDDEN;
use js_sys::{Function, Reflect};
use polo_core::{Messages, RenderPort};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use yew::prelude::*;

/// Global the page stores its Leaflet map under.
pub const LEAFLET_GLOBAL: &str = "leafletMap";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    #[must_use]
    pub const fn method(self) -> &'static str {
        match self {
            Self::In => "zoomIn",
            Self::Out => "zoomOut",
        }
    }
}

#[derive(Properties, PartialEq, Clone)]
pub struct ZoomControlsProps {
    pub zoom_in_label: AttrValue,
    pub zoom_out_label: AttrValue,
    #[prop_or_default]
    pub on_zoom: Callback<ZoomDirection>,
}

#[function_component(ZoomControls)]
pub fn zoom_controls(props: &ZoomControlsProps) -> Html {
    let zoom = |direction: ZoomDirection| {
        let cb = props.on_zoom.clone();
        Callback::from(move |_e: MouseEvent| cb.emit(direction))
    };
    html! {
        <div class="map-zoom-controls">
            <button type="button" class="btn btn-secondary btn-sm mb-2"
                aria-label={props.zoom_in_label.clone()} onclick={zoom(ZoomDirection::In)}>
                <i class="fas fa-plus" aria-hidden="true"></i>
            </button>
            <button type="button" class="btn btn-secondary btn-sm"
                aria-label={props.zoom_out_label.clone()} onclick={zoom(ZoomDirection::Out)}>
                <i class="fas fa-minus" aria-hidden="true"></i>
            </button>
        </div>
    }
}

/// Call `window.leafletMap.zoomIn()` / `zoomOut()`. Returns `false` when there is no map.
pub fn zoom_leaflet(direction: ZoomDirection) -> bool {
    let Some(win) = dom::window() else {
        return false;
    };
    let Ok(map) = Reflect::get(&win, &JsValue::from_str(LEAFLET_GLOBAL)) else {
        return false;
    };
    if map.is_undefined() || map.is_null() {
        return false;
    }
    let Some(method) = Reflect::get(&map, &JsValue::from_str(direction.method()))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
    else {
        return false;
    };
    match method.call0(&map) {
        Ok(_) => true,
        Err(err) => {
            log::warn!("leaflet {} failed: {}", direction.method(), dom::js_error_message(&err));
            false
        }
    }
}

/// Zoom the map and announce it when a map was found.
pub fn zoom_and_announce<R: RenderPort + ?Sized>(
    port: &R,
    messages: &Messages,
    direction: ZoomDirection,
) {
    if zoom_leaflet(direction) {
        port.announce(match direction {
            ZoomDirection::In => messages.zoom_in.as_str(),
            ZoomDirection::Out => messages.zoom_out.as_str(),
        });
    }
}

/// Insert the instructions live region and zoom buttons before the map container.
pub fn enhance_map<R: RenderPort + 'static>(
    map_id: &str,
    instructions_id: &str,
    messages: &Messages,
    port: Rc<R>,
) {
    let (Some(doc), Some(map)) = (dom::document(), dom::element_by_id(map_id)) else {
        return;
    };
    let Some(parent) = map.parent_node() else {
        return;
    };

    if let Ok(instructions) = doc.create_element("div") {
        instructions.set_id(instructions_id);
        instructions.set_class_name(VISUALLY_HIDDEN);
        let _ = instructions.set_attribute("aria-live", "polite");
        let _ = parent.insert_before(&instructions, Some(&map));
    }

    let Ok(root) = doc.create_element("div") else {
        return;
    };
    if parent.insert_before(&root, Some(&map)).is_err() {
        return;
    }
    let copy = messages.clone();
    let props = ZoomControlsProps {
        zoom_in_label: AttrValue::from(messages.zoom_in_label.clone()),
        zoom_out_label: AttrValue::from(messages.zoom_out_label.clone()),
        on_zoom: Callback::from(move |direction| zoom_and_announce(port.as_ref(), &copy, direction)),
    };
    yew::Renderer::<ZoomControls>::with_root_and_props(root, props).render();
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use yew::LocalServerRenderer;

    #[test]
    fn zoom_controls_render_labelled_buttons() {
        let props = ZoomControlsProps {
            zoom_in_label: AttrValue::from("Aumentar zoom do mapa"),
            zoom_out_label: AttrValue::from("Diminuir zoom do mapa"),
            on_zoom: Callback::noop(),
        };
        let html = block_on(LocalServerRenderer::<ZoomControls>::with_props(props).render());
        assert!(html.contains("map-zoom-controls"));
        assert!(html.contains("aria-label=\"Aumentar zoom do mapa\""));
        assert!(html.contains("aria-label=\"Diminuir zoom do mapa\""));
        assert!(html.contains("fa-plus"));
        assert!(html.contains("fa-minus"));
    }

    #[test]
    fn zoom_methods_match_leaflet() {
        assert_eq!(ZoomDirection::In.method(), "zoomIn");
        assert_eq!(ZoomDirection::Out.method(), "zoomOut");
    }
}
