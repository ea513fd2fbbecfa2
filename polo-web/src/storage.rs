//! `localStorage` implementation of the preference storage port.
use crate::dom;
use polo_core::{KeyValueStore, StorageError};

/// Preference storage backed by `window.localStorage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        dom::local_storage().ok()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = dom::local_storage().map_err(|_| StorageError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|err| StorageError::Rejected(dom::js_error_message(&err)))
    }
}
