//! Resolve the visitor's position into a CEP for the postal-code field.
use crate::cep::{digits_only, format_cep};
use crate::config::{FeedbackConfig, Messages, PoloConfig};
use crate::feedback::{FeedbackMessage, FeedbackSink};
use crate::RenderPort;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocateError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("location request timed out")]
    Timeout,
    #[error("geolocation is not supported")]
    Unsupported,
}

impl LocateError {
    /// Map a `GeolocationPositionError.code`.
    #[must_use]
    pub const fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            3 => Self::Timeout,
            _ => Self::PositionUnavailable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    #[error("network error: {0}")]
    Network(String),
    #[error("geocoder answered with status {0}")]
    Status(u16),
    #[error("malformed geocoder response: {0}")]
    Format(String),
    #[error("geocoder response has no postcode")]
    MissingPostcode,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error(transparent)]
    Locate(#[from] LocateError),
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
    #[error("superseded by a newer location request")]
    Superseded,
}

/// Source of the device's current position.
#[async_trait(?Send)]
pub trait Geolocator {
    async fn current_position(&self) -> Result<Coordinates, LocateError>;
}

/// Coordinates to postcode lookup.
#[async_trait(?Send)]
pub trait ReverseGeocoder {
    async fn postcode_for(&self, coords: Coordinates) -> Result<String, GeocodeError>;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReverseResponse {
    #[serde(default)]
    pub address: Option<ReverseAddress>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReverseAddress {
    #[serde(default)]
    pub postcode: Option<String>,
}

impl ReverseResponse {
    /// The postcode, if the geocoder found one.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::MissingPostcode`] when the address or its postcode is absent.
    pub fn into_postcode(self) -> Result<String, GeocodeError> {
        self.address
            .and_then(|address| address.postcode)
            .ok_or(GeocodeError::MissingPostcode)
    }
}

/// Build the reverse lookup URL for `coords`.
#[must_use]
pub fn reverse_url(endpoint: &str, coords: Coordinates) -> String {
    format!(
        "{endpoint}?lat={}&lon={}&format=json",
        coords.latitude, coords.longitude
    )
}

/// Extract `address.postcode` from a reverse geocoding response body.
///
/// # Errors
///
/// Returns [`GeocodeError::Format`] for invalid JSON and
/// [`GeocodeError::MissingPostcode`] when the field is absent.
pub fn parse_reverse_response(body: &str) -> Result<String, GeocodeError> {
    serde_json::from_str::<ReverseResponse>(body)
        .map_err(|err| GeocodeError::Format(err.to_string()))?
        .into_postcode()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// Hands out one ticket per location trigger; only the newest ticket may write.
#[derive(Debug, Default)]
pub struct RequestGate {
    latest: Cell<u64>,
}

impl RequestGate {
    pub fn issue(&self) -> Ticket {
        let next = self.latest.get() + 1;
        self.latest.set(next);
        Ticket(next)
    }

    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.get() == ticket.0
    }
}

pub struct LocationResolver<G, R> {
    locator: G,
    geocoder: R,
    gate: RequestGate,
    messages: Messages,
    timings: FeedbackConfig,
}

impl<G: Geolocator, R: ReverseGeocoder> LocationResolver<G, R> {
    pub fn new(locator: G, geocoder: R, config: &PoloConfig) -> Self {
        Self {
            locator,
            geocoder,
            gate: RequestGate::default(),
            messages: config.messages.clone(),
            timings: config.feedback,
        }
    }

    /// Look up the current CEP and write it into the postal-code field.
    ///
    /// One attempt per call. Failures are reported through `feedback` as a
    /// danger banner and leave the field untouched. When another call starts
    /// before this one finishes, this one's outcome is discarded.
    ///
    /// # Errors
    ///
    /// Returns the failure that was reported, or [`LocationError::Superseded`].
    pub async fn resolve<P, F>(&self, port: &P, feedback: &F) -> Result<String, LocationError>
    where
        P: RenderPort + ?Sized,
        F: FeedbackSink + ?Sized,
    {
        let ticket = self.gate.issue();
        feedback.show(self.banner(FeedbackMessage::info(&self.messages.locating)));

        let outcome = self.lookup().await;
        if !self.gate.is_current(ticket) {
            log::debug!("dropping superseded location result: {outcome:?}");
            return Err(LocationError::Superseded);
        }

        match outcome {
            Ok(value) => {
                port.set_field_value(&value);
                feedback.show(self.banner(FeedbackMessage::success(
                    &self.messages.location_success,
                )));
                Ok(value)
            }
            Err(err) => {
                log::debug!("location lookup failed: {err}");
                let text = match err {
                    LocationError::Locate(_) => &self.messages.location_failed,
                    _ => &self.messages.postcode_failed,
                };
                feedback.show(self.banner(FeedbackMessage::danger(text.as_str())));
                Err(err)
            }
        }
    }

    async fn lookup(&self) -> Result<String, LocationError> {
        let coords = self.locator.current_position().await?;
        let postcode = self.geocoder.postcode_for(coords).await?;
        let digits = digits_only(&postcode);
        if digits.is_empty() {
            return Err(GeocodeError::MissingPostcode.into());
        }
        Ok(format_cep(&digits))
    }

    fn banner(&self, message: FeedbackMessage) -> FeedbackMessage {
        message.with_ttl(self.timings.ttl())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::Severity;
    use crate::testing::{FixedGeocoder, FixedGeolocator, RecordingFeedback, RecordingRenderer};
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use std::cell::RefCell;

    const SAO_PAULO: Coordinates = Coordinates {
        latitude: -23.561_414,
        longitude: -46.655_881,
    };

    fn resolver(
        located: Result<Coordinates, LocateError>,
        geocoded: Result<String, GeocodeError>,
    ) -> LocationResolver<FixedGeolocator, FixedGeocoder> {
        LocationResolver::new(
            FixedGeolocator(located),
            FixedGeocoder(geocoded),
            &PoloConfig::default(),
        )
    }

    #[test]
    fn success_writes_field_and_reports() {
        let resolver = resolver(Ok(SAO_PAULO), Ok("01310-930".to_string()));
        let port = RecordingRenderer::default();
        let feedback = RecordingFeedback::default();
        let value = block_on(resolver.resolve(&port, &feedback)).unwrap();
        assert_eq!(value, "01310-930");
        assert_eq!(port.field_value(), "01310-930");
        assert_eq!(
            feedback.severities(),
            vec![Severity::Info, Severity::Success]
        );
        assert_eq!(feedback.texts()[1], "Localização obtida com sucesso!");
    }

    #[test]
    fn denied_permission_leaves_field_untouched() {
        let resolver = resolver(Err(LocateError::PermissionDenied), Ok("01310930".into()));
        let port = RecordingRenderer::default();
        port.set_field_value("04");
        let feedback = RecordingFeedback::default();
        let err = block_on(resolver.resolve(&port, &feedback)).unwrap_err();
        assert_eq!(err, LocationError::Locate(LocateError::PermissionDenied));
        assert_eq!(port.field_value(), "04");
        assert_eq!(feedback.severities(), vec![Severity::Info, Severity::Danger]);
        assert_eq!(
            feedback.texts()[1],
            "Erro ao obter localização. Por favor, digite o CEP."
        );
    }

    #[test]
    fn missing_postcode_is_a_geocode_failure() {
        let resolver = resolver(Ok(SAO_PAULO), Err(GeocodeError::MissingPostcode));
        let port = RecordingRenderer::default();
        let feedback = RecordingFeedback::default();
        let err = block_on(resolver.resolve(&port, &feedback)).unwrap_err();
        assert_eq!(err, LocationError::Geocode(GeocodeError::MissingPostcode));
        assert_eq!(port.field_value(), "");
        assert_eq!(feedback.texts()[1], "Erro ao obter CEP da localização.");
    }

    #[test]
    fn postcode_without_digits_is_rejected() {
        let resolver = resolver(Ok(SAO_PAULO), Ok("n/a".to_string()));
        let port = RecordingRenderer::default();
        let feedback = RecordingFeedback::default();
        let err = block_on(resolver.resolve(&port, &feedback)).unwrap_err();
        assert_eq!(err, LocationError::Geocode(GeocodeError::MissingPostcode));
        assert_eq!(port.field_value(), "");
    }

    #[test]
    fn response_parsing() {
        assert_eq!(
            parse_reverse_response(r#"{"address":{"postcode":"01310-930","city":"São Paulo"}}"#),
            Ok("01310-930".to_string())
        );
        assert_eq!(
            parse_reverse_response(r#"{"address":{"road":"Avenida Paulista"}}"#),
            Err(GeocodeError::MissingPostcode)
        );
        assert_eq!(
            parse_reverse_response(r#"{"error":"Unable to geocode"}"#),
            Err(GeocodeError::MissingPostcode)
        );
        assert!(matches!(
            parse_reverse_response("<html>"),
            Err(GeocodeError::Format(_))
        ));
    }

    #[test]
    fn url_carries_lat_and_lon() {
        let url = reverse_url("https://geo.example/reverse", SAO_PAULO);
        assert_eq!(
            url,
            "https://geo.example/reverse?lat=-23.561414&lon=-46.655881&format=json"
        );
    }

    #[test]
    fn error_codes_map_to_locate_errors() {
        assert_eq!(LocateError::from_code(1), LocateError::PermissionDenied);
        assert_eq!(LocateError::from_code(2), LocateError::PositionUnavailable);
        assert_eq!(LocateError::from_code(3), LocateError::Timeout);
    }

    struct QueuedGeolocator {
        pending: RefCell<Vec<oneshot::Receiver<Coordinates>>>,
    }

    #[async_trait(?Send)]
    impl Geolocator for QueuedGeolocator {
        async fn current_position(&self) -> Result<Coordinates, LocateError> {
            let rx = self.pending.borrow_mut().remove(0);
            rx.await.map_err(|_| LocateError::PositionUnavailable)
        }
    }

    struct EchoGeocoder;

    #[async_trait(?Send)]
    impl ReverseGeocoder for EchoGeocoder {
        async fn postcode_for(&self, coords: Coordinates) -> Result<String, GeocodeError> {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let code = coords.latitude as u32;
            Ok(format!("{code:08}"))
        }
    }

    #[test]
    fn later_trigger_wins_a_race() {
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();
        let resolver = LocationResolver::new(
            QueuedGeolocator {
                pending: RefCell::new(vec![first_rx, second_rx]),
            },
            EchoGeocoder,
            &PoloConfig::default(),
        );
        let port = RecordingRenderer::default();
        let feedback = RecordingFeedback::default();

        let (first, second) = block_on(async {
            let first = resolver.resolve(&port, &feedback);
            let second = resolver.resolve(&port, &feedback);
            futures::pin_mut!(first, second);
            assert!(futures::poll!(first.as_mut()).is_pending());
            assert!(futures::poll!(second.as_mut()).is_pending());

            // The newer request answers first, the older one afterwards.
            second_tx
                .send(Coordinates {
                    latitude: 22_222_222.0,
                    longitude: 0.0,
                })
                .unwrap();
            let second = second.await;
            first_tx
                .send(Coordinates {
                    latitude: 11_111_111.0,
                    longitude: 0.0,
                })
                .unwrap();
            let first = first.await;
            (first, second)
        });

        assert_eq!(first, Err(LocationError::Superseded));
        assert_eq!(second, Ok("22222-222".to_string()));
        assert_eq!(port.field_value(), "22222-222");
        assert_eq!(
            feedback.severities(),
            vec![Severity::Info, Severity::Info, Severity::Success]
        );
    }
}
