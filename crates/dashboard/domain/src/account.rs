//! Connected account and its locally stored display label.

use core::fmt;

use alloy_primitives::{Address, hex};
use bon::Builder;
use dissolve_derive::Dissolve;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Prefix of the preference keys holding account labels.
pub const ACCOUNT_LABEL_KEY_PREFIX: &str = "multisig.accountName";

/// A non-empty, trimmed display name for an account.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct AccountLabel(String);

/// The account of the connected wallet.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Dissolve)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConnectedAccount {
    /// The signing address.
    address: Address,

    /// The chain the wallet was on when last queried.
    chain_id: u64,

    /// Name of the connector the wallet came through.
    #[builder(into)]
    connector: String,

    /// The stored display label, if any.
    label: Option<AccountLabel>,
}

/// Returns the preference key under which the label of `address` is stored.
///
/// The address is rendered lowercase, so labels survive checksum casing differences.
pub fn account_label_key(address: &Address) -> String {
    format!("{ACCOUNT_LABEL_KEY_PREFIX}.{}", hex::encode_prefixed(address))
}

impl AccountLabel {
    /// Trims `input`, returning `None` when nothing is left.
    pub fn normalize(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_owned()))
    }

    /// Returns the label text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<AccountLabel> for String {
    fn from(AccountLabel(label): AccountLabel) -> Self {
        label
    }
}

impl ConnectedAccount {
    /// Returns the signing address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Returns the wallet's active chain id.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Returns the connector name.
    pub fn connector(&self) -> &str {
        &self.connector
    }

    /// Returns the stored label.
    pub fn label(&self) -> Option<&AccountLabel> {
        self.label.as_ref()
    }

    /// Records the chain the wallet is currently on.
    pub fn set_chain_id(&mut self, chain_id: u64) {
        self.chain_id = chain_id;
    }

    /// Replaces the stored label.
    pub fn set_label(&mut self, label: Option<AccountLabel>) {
        self.label = label;
    }

    /// Returns the label, or the shortened address when there is none.
    pub fn display_name(&self) -> String {
        match &self.label {
            Some(label) => label.to_string(),
            None => crate::display::shorten_hex(&self.address.to_string(), 6),
        }
    }
}
