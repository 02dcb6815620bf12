//! Browser Token Storage
//!
//! `localStorage`-backed token store. Storage can be missing (private mode,
//! sandboxed iframes); every operation then degrades to a no-op.

use taskboard_core::TokenStore;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct LocalStorageTokenStore {
    key: String,
}

impl LocalStorageTokenStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage(&self) -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

impl TokenStore for LocalStorageTokenStore {
    fn load(&self) -> Option<String> {
        self.storage()?.get_item(&self.key).ok().flatten()
    }

    fn save(&self, token: &str) {
        if let Some(storage) = self.storage() {
            if storage.set_item(&self.key, token).is_err() {
                warn!(key = %self.key, "could not persist token");
            }
        }
    }

    fn clear(&self) {
        if let Some(storage) = self.storage() {
            if storage.remove_item(&self.key).is_err() {
                warn!(key = %self.key, "could not remove token");
            }
        }
    }
}
