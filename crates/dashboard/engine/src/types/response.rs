//! Response types for dashboard engine operations.

use alloy_primitives::TxHash;
use dissolve_derive::Dissolve;
use evm_multisig_dashboard_domain::{account::ConnectedAccount, action::ActionTag};

use crate::view::DashboardView;

/// How a write action ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Confirmed on chain and state re-read.
    Settled {
        /// The action.
        tag: ActionTag,
        /// Hash of the confirmed transaction.
        hash: TxHash,
    },

    /// Failed after it started: rejected by the wallet, reverted, or lost in transport.
    Failed {
        /// The action.
        tag: ActionTag,
        /// The underlying message, verbatim.
        message: String,
    },

    /// Refused before any wallet call: not connected, misconfigured, wrong network, or
    /// invalid form input.
    Rejected {
        /// The action.
        tag: ActionTag,
        /// Why it was refused.
        message: String,
    },

    /// Ignored because another action is in flight.
    Busy {
        /// The action that was requested.
        tag: ActionTag,
        /// The action in flight.
        pending: ActionTag,
    },
}

/// Response from a write action.
#[derive(Debug, Clone, Dissolve)]
pub struct ActionResponse {
    /// How the action ended.
    outcome: ActionOutcome,

    /// The dashboard right after.
    view: DashboardView,
}

/// Response from connecting the wallet.
#[derive(Debug, Clone, Dissolve)]
pub struct ConnectWalletResponse {
    /// The connected account, or the connection error.
    result: Result<ConnectedAccount, String>,

    /// The dashboard right after.
    view: DashboardView,
}

impl ActionOutcome {
    /// Returns the action this outcome belongs to.
    pub fn tag(&self) -> ActionTag {
        match self {
            Self::Settled { tag, .. }
            | Self::Failed { tag, .. }
            | Self::Rejected { tag, .. }
            | Self::Busy { tag, .. } => *tag,
        }
    }
}

impl ActionResponse {
    pub(crate) fn new(outcome: ActionOutcome, view: DashboardView) -> Self {
        Self { outcome, view }
    }

    /// Returns the outcome.
    pub fn outcome(&self) -> &ActionOutcome {
        &self.outcome
    }

    /// Returns the dashboard view.
    pub fn view(&self) -> &DashboardView {
        &self.view
    }
}

impl ConnectWalletResponse {
    pub(crate) fn new(result: Result<ConnectedAccount, String>, view: DashboardView) -> Self {
        Self { result, view }
    }

    /// Returns the connected account or the connection error.
    pub fn result(&self) -> Result<&ConnectedAccount, &str> {
        self.result.as_ref().map_err(String::as_str)
    }

    /// Returns the dashboard view.
    pub fn view(&self) -> &DashboardView {
        &self.view
    }
}
