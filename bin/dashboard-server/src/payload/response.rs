use bon::Builder;
use evm_multisig_dashboard_engine::{
    response::{ActionResponse, ActionResponseDissolved, ConnectWalletResponse},
    view::DashboardView,
};
use serde::Serialize;

use super::{AccountPayload, ActionOutcomePayload};

#[derive(Debug, Builder, Serialize)]
pub struct DashboardResponsePayload {
    dashboard: DashboardView,

    #[serde(skip_serializing_if = "Option::is_none")]
    wallet_connect_project_id: Option<String>,
}

#[derive(Debug, Builder, Serialize)]
pub struct ConnectWalletResponsePayload {
    account: Option<AccountPayload>,

    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,

    dashboard: DashboardView,
}

#[derive(Debug, Builder, Serialize)]
pub struct ActionResponsePayload {
    outcome: ActionOutcomePayload,
    dashboard: DashboardView,
}

impl ConnectWalletResponsePayload {
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl ActionResponsePayload {
    pub fn outcome(&self) -> &ActionOutcomePayload {
        &self.outcome
    }
}

impl From<DashboardView> for DashboardResponsePayload {
    fn from(dashboard: DashboardView) -> Self {
        Self::builder().dashboard(dashboard).build()
    }
}

impl From<ConnectWalletResponse> for ConnectWalletResponsePayload {
    fn from(response: ConnectWalletResponse) -> Self {
        let (account, error) = match response.result() {
            Ok(account) => (Some(AccountPayload::from(account)), None),
            Err(message) => (None, Some(message.to_owned())),
        };

        Self::builder()
            .maybe_account(account)
            .maybe_error(error)
            .dashboard(response.view().clone())
            .build()
    }
}

impl From<ActionResponse> for ActionResponsePayload {
    fn from(response: ActionResponse) -> Self {
        let ActionResponseDissolved { outcome, view } = response.dissolve();

        Self::builder().outcome(ActionOutcomePayload::from(&outcome)).dashboard(view).build()
    }
}
