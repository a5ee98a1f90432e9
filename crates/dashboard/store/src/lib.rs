//! Local preference storage for the multisig dashboard.
//!
//! Preferences are a flat string key/value map. The dashboard keeps one entry per account
//! label, keyed by [`account_label_key`].
//!
//! # Main Components
//!
//! - [`PreferenceStore`] - The key/value interface, with label helpers
//! - [`JsonFilePreferenceStore`] - A JSON file on disk, replaced atomically on every write
//! - [`InMemoryPreferenceStore`] - A process-local map

mod error;
mod file;
mod memory;

pub use self::{
    error::{PreferenceStoreError, Result},
    file::JsonFilePreferenceStore,
    memory::InMemoryPreferenceStore,
};

use alloy_primitives::Address;
use evm_multisig_dashboard_domain::account::{AccountLabel, account_label_key};

/// A string key/value preference store.
pub trait PreferenceStore {
    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`, if present.
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Returns the label stored for `address`.
    fn account_label(&self, address: &Address) -> Option<AccountLabel> {
        self.get(&account_label_key(address)).as_deref().and_then(AccountLabel::normalize)
    }

    /// Stores `label` for `address`, or removes the entry when `label` is `None`.
    fn set_account_label(&mut self, address: &Address, label: Option<&AccountLabel>) -> Result<()> {
        let key = account_label_key(address);

        match label {
            Some(label) => self.set(&key, label.as_str()),
            None => self.remove(&key),
        }
    }
}

impl<T> PreferenceStore for Box<T>
where
    T: PreferenceStore + ?Sized,
{
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
