use std::borrow::Cow;

use evm_multisig_dashboard_store::PreferenceStoreError;
use tokio::sync::oneshot;

use crate::dashboard_runtime::DashboardRuntimeError;

#[derive(Debug, thiserror::Error)]
#[error("dashboard engine error: {0}")]
pub struct DashboardEngineError(#[from] DashboardEngineErrorKind);

#[derive(Debug, thiserror::Error)]
pub(crate) enum DashboardEngineErrorKind {
    #[error("dashboard runtime error: {0}")]
    DashboardRuntime(#[from] DashboardRuntimeError),

    #[error("preference store error: {0}")]
    PreferenceStore(#[from] PreferenceStoreError),

    #[error("mpsc sender error: {0}")]
    MpscSender(Cow<'static, str>),

    #[error("oneshot receive error: {0}")]
    OneshotReceive(#[from] oneshot::error::RecvError),

    #[error("other error: {0}")]
    Other(Cow<'static, str>),
}

impl DashboardEngineErrorKind {
    pub fn mpsc_sender<E>(err: E) -> Self
    where
        Cow<'static, str>: From<E>,
    {
        Self::MpscSender(err.into())
    }

    pub fn other<E>(err: E) -> Self
    where
        Cow<'static, str>: From<E>,
    {
        Self::Other(err.into())
    }
}
