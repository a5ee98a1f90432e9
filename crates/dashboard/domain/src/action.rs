//! The single in-flight write action and the status shown for it.
//!
//! A write moves through `idle -> awaiting signature -> awaiting confirmation` and ends
//! `settled` or `failed`. Only one write may be in flight at a time; [`ActionState::try_begin`]
//! refuses a second one.

use core::fmt;

use alloy_primitives::TxHash;
use strum::{Display, EnumString, IntoStaticStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{display::shorten_hex, tx::TxId};

/// The kind of write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, EnumString, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum ActionKind {
    /// Propose a new transaction.
    Submit,
    /// Approve an existing transaction.
    Approve,
    /// Execute an approved transaction.
    Execute,
}

/// Identifies a write action, rendered as `submit`, `approve-<id>` or `execute-<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionTag {
    /// A submit of the form draft.
    Submit,
    /// An approval of the given transaction.
    Approve(TxId),
    /// An execution of the given transaction.
    Execute(TxId),
}

/// Where the current or last write action stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, IntoStaticStr, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum ActionPhase {
    /// No write has run yet.
    #[default]
    Idle,
    /// Waiting for the wallet to sign and broadcast.
    AwaitingSignature,
    /// Broadcast, waiting for the receipt.
    AwaitingConfirmation,
    /// Confirmed and state re-read.
    Settled,
    /// Failed at any step.
    Failed,
}

/// The write action controller state.
#[derive(Debug, Clone, Default)]
pub struct ActionState {
    phase: ActionPhase,
    pending: Option<ActionTag>,
    status: Option<String>,
    error: Option<String>,
}

impl ActionKind {
    /// Button label while an action of this kind is in flight.
    pub fn in_flight_label(self) -> &'static str {
        match self {
            Self::Submit => "Submitting...",
            Self::Approve => "Approving...",
            Self::Execute => "Executing...",
        }
    }
}

impl ActionTag {
    /// Returns the kind of write.
    pub fn kind(self) -> ActionKind {
        match self {
            Self::Submit => ActionKind::Submit,
            Self::Approve(_) => ActionKind::Approve,
            Self::Execute(_) => ActionKind::Execute,
        }
    }

    /// Returns the targeted transaction, if any.
    pub fn tx_id(self) -> Option<TxId> {
        match self {
            Self::Submit => None,
            Self::Approve(tx_id) | Self::Execute(tx_id) => Some(tx_id),
        }
    }

    /// Status shown once the write is confirmed.
    pub fn success_status(self) -> String {
        match self {
            Self::Submit => "Transaction submitted successfully.".to_owned(),
            Self::Approve(tx_id) => format!("Approve successful for tx {tx_id}."),
            Self::Execute(tx_id) => format!("Execute successful for tx {tx_id}."),
        }
    }
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submit => f.write_str("submit"),
            Self::Approve(tx_id) => write!(f, "approve-{tx_id}"),
            Self::Execute(tx_id) => write!(f, "execute-{tx_id}"),
        }
    }
}

impl ActionState {
    /// Returns the current phase.
    pub fn phase(&self) -> ActionPhase {
        self.phase
    }

    /// Returns the in-flight action.
    pub fn pending(&self) -> Option<ActionTag> {
        self.pending
    }

    /// Returns whether a write is in flight.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns the status line.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Returns the error line.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Starts `tag` unless another write is in flight. Returns whether it started.
    pub fn try_begin(&mut self, tag: ActionTag) -> bool {
        if self.is_pending() {
            return false;
        }

        self.phase = ActionPhase::AwaitingSignature;
        self.pending = Some(tag);
        self.error = None;
        self.status = Some(format!("{}: waiting for wallet confirmation...", tag.kind()));

        true
    }

    /// Records the broadcast of the in-flight action as `hash`.
    pub fn signed(&mut self, hash: &TxHash) {
        let Some(tag) = self.pending else {
            return;
        };

        self.phase = ActionPhase::AwaitingConfirmation;
        self.status =
            Some(format!("{}: pending {}...", tag.kind(), shorten_hex(&hash.to_string(), 6)));
    }

    /// Records the confirmation of the in-flight action. It stays pending until
    /// [`settle`](Self::settle).
    pub fn confirmed(&mut self) {
        if let Some(tag) = self.pending {
            self.status = Some(tag.success_status());
        }
    }

    /// Ends the in-flight action successfully.
    pub fn settle(&mut self) {
        self.phase = ActionPhase::Settled;
        self.pending = None;
    }

    /// Ends the in-flight action with `message`. The status line is left as it was.
    pub fn fail<M>(&mut self, message: M)
    where
        M: Into<String>,
    {
        self.phase = ActionPhase::Failed;
        self.pending = None;
        self.error = Some(message.into());
    }

    /// Reports a write refused before it started. An in-flight action is not affected.
    pub fn reject<M>(&mut self, message: M)
    where
        M: Into<String>,
    {
        self.error = Some(message.into());
    }
}
