use std::{borrow::Cow, io};

pub type Result<T, E = PreferenceStoreError> = core::result::Result<T, E>;

/// Errors that can occur when reading or writing preferences.
#[derive(Debug, thiserror::Error)]
pub enum PreferenceStoreError {
    /// The preference file could not be read or replaced.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The preference file does not hold a flat JSON object of strings.
    #[error("serialization error: {0}")]
    Serialization(Cow<'static, str>),
}

impl From<serde_json::Error> for PreferenceStoreError {
    fn from(err: serde_json::Error) -> Self {
        PreferenceStoreError::Serialization(err.to_string().into())
    }
}
