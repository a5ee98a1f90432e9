use bon::Builder;
use dissolve_derive::Dissolve;
use evm_multisig_dashboard_domain::tx::TxId;
use evm_multisig_dashboard_store::PreferenceStoreError;
use tokio::sync::oneshot;

use crate::{
    types::{
        request::SubmitMultisigTxRequest,
        response::{ActionResponse, ConnectWalletResponse},
    },
    view::DashboardView,
};

pub enum DashboardMsg {
    GetDashboard(GetDashboard),
    Refresh(Refresh),
    ConnectWallet(ConnectWallet),
    DisconnectWallet(DisconnectWallet),
    SetAccountLabel(SetAccountLabel),
    SubmitMultisigTx(SubmitMultisigTx),
    ApproveMultisigTx(ApproveMultisigTx),
    ExecuteMultisigTx(ExecuteMultisigTx),
    Shutdown,
}

#[derive(Debug, Builder, Dissolve)]
pub struct GetDashboard {
    sender: oneshot::Sender<DashboardView>,
}

#[derive(Debug, Builder, Dissolve)]
pub struct Refresh {
    sender: oneshot::Sender<DashboardView>,
}

#[derive(Debug, Builder, Dissolve)]
pub struct ConnectWallet {
    sender: oneshot::Sender<ConnectWalletResponse>,
}

#[derive(Debug, Builder, Dissolve)]
pub struct DisconnectWallet {
    sender: oneshot::Sender<DashboardView>,
}

#[derive(Debug, Builder, Dissolve)]
pub struct SetAccountLabel {
    label: String,
    sender: oneshot::Sender<Result<DashboardView, PreferenceStoreError>>,
}

#[derive(Debug, Builder, Dissolve)]
pub struct SubmitMultisigTx {
    form: SubmitMultisigTxRequest,
    sender: oneshot::Sender<ActionResponse>,
}

#[derive(Debug, Builder, Dissolve)]
pub struct ApproveMultisigTx {
    tx_id: TxId,
    sender: oneshot::Sender<ActionResponse>,
}

#[derive(Debug, Builder, Dissolve)]
pub struct ExecuteMultisigTx {
    tx_id: TxId,
    sender: oneshot::Sender<ActionResponse>,
}
