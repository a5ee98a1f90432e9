pub mod request;
pub mod response;

use alloy_primitives::TxHash;
use bon::Builder;
use evm_multisig_dashboard_domain::account::ConnectedAccount;
use evm_multisig_dashboard_engine::response::ActionOutcome;
use serde::Serialize;
use serde_with::DisplayFromStr;

/// How a write action ended, as reported over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Settled,
    Failed,
    Rejected,
    Busy,
}

#[serde_with::serde_as]
#[derive(Debug, Builder, Serialize)]
pub struct ActionOutcomePayload {
    status: ActionStatus,

    /// The action, e.g. `approve-3`.
    action: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde_as(as = "Option<DisplayFromStr>")]
    tx_hash: Option<TxHash>,

    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Debug, Builder, Serialize)]
pub struct AccountPayload {
    address: String,
    chain_id: u64,
    connector: String,
    display_name: String,
    label: Option<String>,
}

impl ActionOutcomePayload {
    pub fn status(&self) -> ActionStatus {
        self.status
    }
}

impl From<&ActionOutcome> for ActionOutcomePayload {
    fn from(outcome: &ActionOutcome) -> Self {
        let builder = Self::builder().action(outcome.tag().to_string());

        match outcome {
            ActionOutcome::Settled { hash, .. } => {
                builder.status(ActionStatus::Settled).tx_hash(*hash).build()
            },
            ActionOutcome::Failed { message, .. } => {
                builder.status(ActionStatus::Failed).message(message.clone()).build()
            },
            ActionOutcome::Rejected { message, .. } => {
                builder.status(ActionStatus::Rejected).message(message.clone()).build()
            },
            ActionOutcome::Busy { pending, .. } => builder
                .status(ActionStatus::Busy)
                .message(format!("{pending} is still in flight"))
                .build(),
        }
    }
}

impl From<&ConnectedAccount> for AccountPayload {
    fn from(account: &ConnectedAccount) -> Self {
        Self::builder()
            .address(account.address().to_checksum(None))
            .chain_id(account.chain_id())
            .connector(account.connector().to_owned())
            .display_name(account.display_name())
            .maybe_label(account.label().map(ToString::to_string))
            .build()
    }
}
