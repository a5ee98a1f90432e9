use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use crate::{PreferenceStore, Result};

/// Preferences persisted as a JSON object in a single file.
///
/// The whole map is loaded on open and rewritten on every change through a temporary file
/// that is renamed over the original, so readers never observe a partial write.
#[derive(Debug)]
pub struct JsonFilePreferenceStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFilePreferenceStore {
    /// Opens the store at `path`. A missing file is an empty store.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref().to_path_buf();

        let entries: BTreeMap<String, String> = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(entries = entries.len(), "preferences loaded");

        Ok(Self { path, entries })
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[tracing::instrument(skip_all, fields(path = %self.path.display()))]
    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, serde_json::to_vec_pretty(&self.entries)?)?;
        fs::rename(&tmp, &self.path)?;

        Ok(())
    }
}

impl PreferenceStore for JsonFilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let previous = self.entries.insert(key.to_owned(), value.to_owned());

        if previous.as_deref() == Some(value) {
            return Ok(());
        }

        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_none() {
            return Ok(());
        }

        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;
    use evm_multisig_dashboard_domain::account::AccountLabel;

    use super::*;

    #[test]
    fn labels_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");
        let address = Address::repeat_byte(0x11);

        let mut store = JsonFilePreferenceStore::open(&path).unwrap();
        assert!(store.account_label(&address).is_none());

        let label = AccountLabel::normalize(" treasury ").unwrap();
        store.set_account_label(&address, Some(&label)).unwrap();

        let reopened = JsonFilePreferenceStore::open(&path).unwrap();
        assert_eq!(reopened.account_label(&address), Some(label));
        assert_eq!(
            reopened.get("multisig.accountName.0x1111111111111111111111111111111111111111"),
            Some("treasury".to_owned())
        );
    }

    #[test]
    fn removing_a_label_deletes_the_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let address = Address::repeat_byte(0x22);

        let mut store = JsonFilePreferenceStore::open(&path).unwrap();
        store.set("unrelated", "kept").unwrap();
        store.set_account_label(&address, AccountLabel::normalize("ops").as_ref()).unwrap();
        store.set_account_label(&address, None).unwrap();

        let reopened = JsonFilePreferenceStore::open(&path).unwrap();
        assert!(reopened.account_label(&address).is_none());
        assert_eq!(reopened.get("unrelated").as_deref(), Some("kept"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(JsonFilePreferenceStore::open(&path).is_err());
    }
}
