//! The single network the dashboard reads from and writes to.

use bon::Builder;
use dissolve_derive::Dissolve;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The network hosting the multisig contract.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Dissolve)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TargetNetwork {
    /// EIP-155 chain id.
    chain_id: u64,

    /// Human readable name, e.g. `Sepolia`.
    #[builder(into)]
    name: String,

    /// Symbol of the native currency.
    #[builder(into, default = "ETH".to_owned())]
    native_symbol: String,
}

impl TargetNetwork {
    /// Chain id of the Sepolia test network.
    pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

    /// The Sepolia test network.
    pub fn sepolia() -> Self {
        Self::builder().chain_id(Self::SEPOLIA_CHAIN_ID).name("Sepolia").build()
    }

    /// Returns the chain id.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Returns the network name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the native currency symbol.
    pub fn native_symbol(&self) -> &str {
        &self.native_symbol
    }

    /// Whether a wallet on `chain_id` may write to this network.
    pub fn accepts(&self, chain_id: u64) -> bool {
        self.chain_id == chain_id
    }

    /// Banner shown while the wallet is on `active_chain_id` instead of this network.
    pub fn mismatch_banner(&self, active_chain_id: u64) -> Option<String> {
        (!self.accepts(active_chain_id)).then(|| {
            format!(
                "Connected to chain ID {active_chain_id}. Switch to {} ({}) to write transactions.",
                self.name, self.chain_id
            )
        })
    }
}

impl Default for TargetNetwork {
    fn default() -> Self {
        Self::sepolia()
    }
}
