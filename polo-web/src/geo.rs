//! Browser geolocation and fetch-based reverse geocoding.
use crate::dom;
use async_trait::async_trait;
use js_sys::{Function, Promise};
use polo_core::{
    Coordinates, GeocodeError, Geolocator, LocateError, ReverseGeocoder, ReverseResponse,
    reverse_url,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{GeolocationPosition, GeolocationPositionError};

/// `navigator.geolocation.getCurrentPosition` as a future.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserGeolocator;

impl BrowserGeolocator {
    /// Whether the browser exposes `navigator.geolocation` at all.
    #[must_use]
    pub fn is_supported() -> bool {
        dom::window().is_some_and(|win| win.navigator().geolocation().is_ok())
    }
}

/// Map a rejected position request to a [`LocateError`].
#[must_use]
pub fn locate_error(err: JsValue) -> LocateError {
    err.dyn_into::<GeolocationPositionError>()
        .map_or(LocateError::PositionUnavailable, |err| {
            LocateError::from_code(err.code())
        })
}

/// Wrap a callback-style position request in a promise.
///
/// `request` receives the success and error callbacks. If it throws, the
/// promise rejects with the thrown value.
pub fn position_promise(
    request: impl FnOnce(&Function, &Function) -> Result<(), JsValue>,
) -> Promise {
    let mut request = Some(request);
    Promise::new(&mut |resolve, reject| {
        let Some(request) = request.take() else {
            return;
        };
        let reject_thrown = reject.clone();
        let on_position = Closure::once_into_js(move |position: JsValue| {
            let _ = resolve.call1(&JsValue::UNDEFINED, &position);
        });
        let on_error = Closure::once_into_js(move |error: JsValue| {
            let _ = reject.call1(&JsValue::UNDEFINED, &error);
        });
        if let Err(err) = request(on_position.unchecked_ref(), on_error.unchecked_ref()) {
            log::warn!(
                "getCurrentPosition threw: {}",
                dom::js_error_message(&err)
            );
            let _ = reject_thrown.call1(&JsValue::UNDEFINED, &err);
        }
    })
}

#[async_trait(?Send)]
impl Geolocator for BrowserGeolocator {
    async fn current_position(&self) -> Result<Coordinates, LocateError> {
        let geolocation = dom::window()
            .ok_or(LocateError::Unsupported)?
            .navigator()
            .geolocation()
            .map_err(|_| LocateError::Unsupported)?;

        let promise = position_promise(|on_position, on_error| {
            geolocation.get_current_position_with_error_callback(on_position, Some(on_error))
        });

        let position = JsFuture::from(promise)
            .await
            .map_err(locate_error)?
            .dyn_into::<GeolocationPosition>()
            .map_err(|_| LocateError::PositionUnavailable)?;
        let coords = position.coords();
        Ok(Coordinates {
            latitude: coords.latitude(),
            longitude: coords.longitude(),
        })
    }
}

/// Reverse geocoding over `fetch`.
#[derive(Debug, Clone)]
pub struct FetchGeocoder {
    endpoint: String,
}

impl FetchGeocoder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait(?Send)]
impl ReverseGeocoder for FetchGeocoder {
    async fn postcode_for(&self, coords: Coordinates) -> Result<String, GeocodeError> {
        let url = reverse_url(&self.endpoint, coords);
        let response = dom::fetch_response(&url)
            .await
            .map_err(|err| GeocodeError::Network(dom::js_error_message(&err)))?;
        if !response.ok() {
            return Err(GeocodeError::Status(response.status()));
        }
        let body = response
            .json()
            .map_err(|err| GeocodeError::Format(dom::js_error_message(&err)))?;
        let value = JsFuture::from(body)
            .await
            .map_err(|err| GeocodeError::Format(dom::js_error_message(&err)))?;
        serde_wasm_bindgen::from_value::<ReverseResponse>(value)
            .map_err(|err| GeocodeError::Format(err.to_string()))?
            .into_postcode()
    }
}
