//! In-memory ports for tests and the QA tester.
use crate::feedback::{FeedbackMessage, FeedbackSink, Severity};
use crate::location::{Coordinates, GeocodeError, Geolocator, LocateError, ReverseGeocoder};
use crate::prefs::Theme;
use crate::{KeyValueStore, RenderPort, StorageError};
use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
    reject_writes: Cell<bool>,
}

impl MemoryStore {
    /// Make every later `set` fail, as a full or disabled `localStorage` would.
    pub fn fail_writes(&self, fail: bool) {
        self.reject_writes.set(fail);
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.reject_writes.get() {
            return Err(StorageError::Rejected("quota exceeded".to_string()));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Records every document mutation.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    body_classes: RefCell<BTreeSet<String>>,
    properties: RefCell<BTreeMap<String, String>>,
    field: RefCell<String>,
    announcements: RefCell<Vec<String>>,
}

impl RecordingRenderer {
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.body_classes.borrow().contains(class)
    }

    /// Theme classes currently on the body.
    #[must_use]
    pub fn theme_classes(&self) -> Vec<String> {
        self.body_classes
            .borrow()
            .iter()
            .filter(|class| Theme::ALL.iter().any(|theme| theme.class() == class.as_str()))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<String> {
        self.properties.borrow().get(name).cloned()
    }

    #[must_use]
    pub fn field_value(&self) -> String {
        self.field.borrow().clone()
    }

    #[must_use]
    pub fn announcements(&self) -> Vec<String> {
        self.announcements.borrow().clone()
    }
}

impl RenderPort for RecordingRenderer {
    fn set_body_class(&self, class: &str, enabled: bool) {
        let mut classes = self.body_classes.borrow_mut();
        if enabled {
            classes.insert(class.to_string());
        } else {
            classes.remove(class);
        }
    }

    fn set_root_property(&self, name: &str, value: &str) {
        self.properties
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    fn set_field_value(&self, value: &str) {
        value.clone_into(&mut self.field.borrow_mut());
    }

    fn announce(&self, message: &str) {
        self.announcements.borrow_mut().push(message.to_string());
    }
}

/// Collects every feedback message in order.
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    shown: RefCell<Vec<FeedbackMessage>>,
}

impl RecordingFeedback {
    #[must_use]
    pub fn messages(&self) -> Vec<FeedbackMessage> {
        self.shown.borrow().clone()
    }

    #[must_use]
    pub fn severities(&self) -> Vec<Severity> {
        self.shown.borrow().iter().map(|msg| msg.severity).collect()
    }

    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.shown.borrow().iter().map(|msg| msg.text.clone()).collect()
    }
}

impl FeedbackSink for RecordingFeedback {
    fn show(&self, message: FeedbackMessage) {
        self.shown.borrow_mut().push(message);
    }
}

/// Answers every position request with the same result.
#[derive(Debug, Clone)]
pub struct FixedGeolocator(pub Result<Coordinates, LocateError>);

#[async_trait(?Send)]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<Coordinates, LocateError> {
        self.0
    }
}

/// Answers every lookup with the same result.
#[derive(Debug, Clone)]
pub struct FixedGeocoder(pub Result<String, GeocodeError>);

#[async_trait(?Send)]
impl ReverseGeocoder for FixedGeocoder {
    async fn postcode_for(&self, _coords: Coordinates) -> Result<String, GeocodeError> {
        self.0.clone()
    }
}
