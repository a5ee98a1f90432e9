//! Multisig contract transactions and their eligibility rules.

use core::fmt;

use alloy_primitives::{Address, Bytes, U256};
use bon::Builder;
use dissolve_derive::Dissolve;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sequential index of a transaction in the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct TxId(u64);

/// A transaction as read from the multisig contract.
///
/// Transactions are never created or modified client side; they are re-read after every
/// successful write.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Dissolve)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContractTransaction {
    /// Index of the transaction.
    #[builder(into)]
    id: TxId,

    /// Destination of the transfer.
    to: Address,

    /// Value in wei.
    value: U256,

    /// Calldata forwarded on execution.
    #[builder(default)]
    data: Bytes,

    /// Whether the transaction was executed.
    #[builder(default)]
    executed: bool,

    /// Approvals collected so far.
    #[builder(default)]
    num_approvals: U256,
}

impl TxId {
    /// Returns the raw index.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for TxId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<TxId> for u64 {
    fn from(TxId(id): TxId) -> Self {
        id
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ContractTransaction {
    /// Returns the transaction id.
    pub fn id(&self) -> TxId {
        self.id
    }

    /// Returns the destination.
    pub fn to(&self) -> Address {
        self.to
    }

    /// Returns the value in wei.
    pub fn value(&self) -> U256 {
        self.value
    }

    /// Returns the calldata.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Returns whether the transaction was executed.
    pub fn executed(&self) -> bool {
        self.executed
    }

    /// Returns the number of approvals collected.
    pub fn num_approvals(&self) -> U256 {
        self.num_approvals
    }

    /// Whether the connected account may still approve.
    ///
    /// `approved_by_caller` is only a hint; the contract has the final word on duplicates.
    pub fn can_approve(&self, approved_by_caller: bool) -> bool {
        !self.executed && !approved_by_caller
    }

    /// Whether the transaction may be executed.
    ///
    /// An unknown threshold blocks execution, an unknown balance does not.
    pub fn can_execute(&self, threshold: Option<U256>, balance: Option<U256>) -> bool {
        let Some(threshold) = threshold else {
            return false;
        };

        let funded = balance.is_none_or(|balance| self.value <= balance);

        !self.executed && self.num_approvals >= threshold && funded
    }
}
