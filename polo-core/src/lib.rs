//! Polo Finder front-end core
//!
//! Platform-agnostic logic behind the polo lookup site's progressive
//! enhancements: the CEP input mask, persisted accessibility preferences,
//! feedback banners, the geolocation to CEP resolver and keyboard shortcuts.
//! Nothing here touches a browser; the web crate supplies the ports.

pub mod cep;
pub mod config;
pub mod feedback;
pub mod location;
pub mod prefs;
pub mod shortcuts;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cep::{Cep, CepError, MaskedInput, digits_only, format_cep, is_complete};
pub use config::{ElementIds, FeedbackConfig, GeocoderConfig, Messages, PoloConfig, ShortcutPaths};
pub use feedback::{
    Banner, BannerId, BannerPhase, FeedbackBoard, FeedbackMessage, FeedbackSink, Severity,
};
pub use location::{
    Coordinates, GeocodeError, Geolocator, LocateError, LocationError, LocationResolver,
    RequestGate, ReverseAddress, ReverseGeocoder, ReverseResponse, Ticket, parse_reverse_response,
    reverse_url,
};
pub use prefs::{FontAction, FontScale, PreferenceStore, Preferences, Theme};
pub use shortcuts::{Destination, KeyChord, Shortcut};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage write rejected: {0}")]
    Rejected(String),
}

/// Trait for abstracting persistent string key-value storage
/// Platform-specific implementations should provide this
pub trait KeyValueStore {
    /// Read a stored value, `None` when absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Persist a value
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// Trait for the document mutations the enhancements perform
///
/// Every call is fire-and-forget: implementations silently skip elements that
/// are missing from the page.
pub trait RenderPort {
    /// Add or remove a class on the document body.
    fn set_body_class(&self, class: &str, enabled: bool);

    /// Set a CSS custom property on the root element.
    fn set_root_property(&self, name: &str, value: &str);

    /// Replace the postal-code field's value.
    fn set_field_value(&self, value: &str);

    /// Announce a message to assistive technology.
    fn announce(&self, message: &str);
}
