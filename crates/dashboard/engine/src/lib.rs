#![allow(missing_docs)]

mod dashboard;
mod dashboard_runtime;
mod error;
mod reader;
mod types;


pub mod owners;
pub mod view;

pub use self::{
    dashboard::{DEFAULT_APP_NAME, DEFAULT_RECEIPT_POLL_INTERVAL, Dashboard, PendingAction},
    dashboard_runtime::{DashboardRuntimeConfig, DashboardRuntimeError, WalletConfig},
    error::DashboardEngineError,
    reader::Loadable,
    types::{request, response},
};

use std::thread::JoinHandle;

use evm_multisig_client::{ChainRpc, WalletConnector};
use evm_multisig_dashboard_store::PreferenceStore;
use tokio::{
    runtime::Runtime,
    sync::{
        mpsc::{self, error::SendError},
        oneshot,
    },
};

use self::{
    dashboard_runtime::msg::{
        ApproveMultisigTx, ConnectWallet, DashboardMsg, DisconnectWallet, ExecuteMultisigTx,
        GetDashboard, Refresh, SetAccountLabel, SubmitMultisigTx,
    },
    error::DashboardEngineErrorKind,
    types::{
        request::{
            ApproveMultisigTxRequest, ApproveMultisigTxRequestDissolved,
            ExecuteMultisigTxRequest, ExecuteMultisigTxRequestDissolved, SetAccountLabelRequest,
            SetAccountLabelRequestDissolved, SubmitMultisigTxRequest,
        },
        response::{ActionResponse, ConnectWalletResponse},
    },
    view::DashboardView,
};

/// Handle to the dashboard, usable from any thread.
///
/// The dashboard itself runs on its own thread; see [`DashboardEngine::start_dashboard_runtime`].
pub struct DashboardEngine<R> {
    runtime: R,
}

pub struct Stopped;

pub struct Started {
    sender: mpsc::UnboundedSender<DashboardMsg>,
    handle: JoinHandle<Result<(), DashboardRuntimeError>>,
}

impl Default for DashboardEngine<Stopped> {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardEngine<Stopped> {
    pub fn new() -> Self {
        Self { runtime: Stopped }
    }

    /// Starts the runtime thread with the production chain seams built from `config`.
    ///
    /// The dashboard loads (owner scan and contract reads) before the first message is
    /// handled.
    pub fn start_dashboard_runtime(
        self,
        rt: Runtime,
        dashboard_runtime_config: DashboardRuntimeConfig,
    ) -> DashboardEngine<Started> {
        let (sender, receiver) = mpsc::unbounded_channel();

        let handle = dashboard_runtime::spawn_new(rt, receiver, dashboard_runtime_config);

        DashboardEngine { runtime: Started { sender, handle } }
    }

    /// Starts the runtime thread around the dashboard built by `make` on that thread.
    pub fn start_dashboard_runtime_with<R, W, P, F>(
        self,
        rt: Runtime,
        make: F,
    ) -> DashboardEngine<Started>
    where
        R: ChainRpc + 'static,
        W: WalletConnector + 'static,
        P: PreferenceStore + 'static,
        F: FnOnce() -> Dashboard<R, W, P> + Send + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();

        let handle = dashboard_runtime::spawn_with(rt, receiver, make);

        DashboardEngine { runtime: Started { sender, handle } }
    }
}

impl DashboardEngine<Started> {
    pub async fn get_dashboard(&self) -> Result<DashboardView, DashboardEngineError> {
        let (msg, receiver) = {
            let (sender, receiver) = oneshot::channel();
            let msg = GetDashboard::builder().sender(sender).build();
            (DashboardMsg::GetDashboard(msg), receiver)
        };

        self.send_to_dashboard_runtime(msg)
            .map_err(|_| DashboardEngineErrorKind::mpsc_sender("failed to send get dashboard"))?;

        receiver.await.map_err(DashboardEngineErrorKind::from).map_err(From::from)
    }

    /// Re-reads the contract state and returns the result.
    pub async fn refresh(&self) -> Result<DashboardView, DashboardEngineError> {
        let (msg, receiver) = {
            let (sender, receiver) = oneshot::channel();
            let msg = Refresh::builder().sender(sender).build();
            (DashboardMsg::Refresh(msg), receiver)
        };

        self.send_to_dashboard_runtime(msg)
            .map_err(|_| DashboardEngineErrorKind::mpsc_sender("failed to send refresh"))?;

        receiver.await.map_err(DashboardEngineErrorKind::from).map_err(From::from)
    }

    /// Connects the wallet. A connection failure is part of the response, not an error.
    pub async fn connect_wallet(&self) -> Result<ConnectWalletResponse, DashboardEngineError> {
        let (msg, receiver) = {
            let (sender, receiver) = oneshot::channel();
            let msg = ConnectWallet::builder().sender(sender).build();
            (DashboardMsg::ConnectWallet(msg), receiver)
        };

        self.send_to_dashboard_runtime(msg)
            .map_err(|_| DashboardEngineErrorKind::mpsc_sender("failed to send connect wallet"))?;

        receiver.await.map_err(DashboardEngineErrorKind::from).map_err(From::from)
    }

    pub async fn disconnect_wallet(&self) -> Result<DashboardView, DashboardEngineError> {
        let (msg, receiver) = {
            let (sender, receiver) = oneshot::channel();
            let msg = DisconnectWallet::builder().sender(sender).build();
            (DashboardMsg::DisconnectWallet(msg), receiver)
        };

        self.send_to_dashboard_runtime(msg).map_err(|_| {
            DashboardEngineErrorKind::mpsc_sender("failed to send disconnect wallet")
        })?;

        receiver.await.map_err(DashboardEngineErrorKind::from).map_err(From::from)
    }

    pub async fn set_account_label(
        &self,
        request: SetAccountLabelRequest,
    ) -> Result<DashboardView, DashboardEngineError> {
        let SetAccountLabelRequestDissolved { label } = request.dissolve();

        let (msg, receiver) = {
            let (sender, receiver) = oneshot::channel();
            let msg = SetAccountLabel::builder().label(label).sender(sender).build();
            (DashboardMsg::SetAccountLabel(msg), receiver)
        };

        self.send_to_dashboard_runtime(msg).map_err(|_| {
            DashboardEngineErrorKind::mpsc_sender("failed to send set account label")
        })?;

        receiver
            .await
            .map_err(DashboardEngineErrorKind::from)?
            .map_err(DashboardEngineErrorKind::from)
            .map_err(From::from)
    }

    /// Submits a new multisig transaction and resolves once the action ends.
    ///
    /// Refusals (busy, disconnected, invalid form, ...) are outcomes in the response.
    pub async fn submit_multisig_tx(
        &self,
        request: SubmitMultisigTxRequest,
    ) -> Result<ActionResponse, DashboardEngineError> {
        let (msg, receiver) = {
            let (sender, receiver) = oneshot::channel();
            let msg = SubmitMultisigTx::builder().form(request).sender(sender).build();
            (DashboardMsg::SubmitMultisigTx(msg), receiver)
        };

        self.send_to_dashboard_runtime(msg).map_err(|_| {
            DashboardEngineErrorKind::mpsc_sender("failed to send submit multisig tx")
        })?;

        receiver.await.map_err(DashboardEngineErrorKind::from).map_err(From::from)
    }

    pub async fn approve_multisig_tx(
        &self,
        request: ApproveMultisigTxRequest,
    ) -> Result<ActionResponse, DashboardEngineError> {
        let ApproveMultisigTxRequestDissolved { tx_id } = request.dissolve();

        let (msg, receiver) = {
            let (sender, receiver) = oneshot::channel();
            let msg = ApproveMultisigTx::builder().tx_id(tx_id).sender(sender).build();
            (DashboardMsg::ApproveMultisigTx(msg), receiver)
        };

        self.send_to_dashboard_runtime(msg).map_err(|_| {
            DashboardEngineErrorKind::mpsc_sender("failed to send approve multisig tx")
        })?;

        receiver.await.map_err(DashboardEngineErrorKind::from).map_err(From::from)
    }

    pub async fn execute_multisig_tx(
        &self,
        request: ExecuteMultisigTxRequest,
    ) -> Result<ActionResponse, DashboardEngineError> {
        let ExecuteMultisigTxRequestDissolved { tx_id } = request.dissolve();

        let (msg, receiver) = {
            let (sender, receiver) = oneshot::channel();
            let msg = ExecuteMultisigTx::builder().tx_id(tx_id).sender(sender).build();
            (DashboardMsg::ExecuteMultisigTx(msg), receiver)
        };

        self.send_to_dashboard_runtime(msg).map_err(|_| {
            DashboardEngineErrorKind::mpsc_sender("failed to send execute multisig tx")
        })?;

        receiver.await.map_err(DashboardEngineErrorKind::from).map_err(From::from)
    }

    /// Stops the runtime thread. Write actions still in flight are dropped.
    pub async fn stop_dashboard_runtime(
        self,
    ) -> Result<DashboardEngine<Stopped>, DashboardEngineError> {
        self.send_to_dashboard_runtime(DashboardMsg::Shutdown)
            .map_err(|_| DashboardEngineErrorKind::mpsc_sender("failed to send shutdown msg"))?;

        self.runtime
            .handle
            .join()
            .map_err(|_| DashboardEngineErrorKind::other("dashboard runtime thread misbehavior"))?
            .map_err(DashboardEngineErrorKind::from)?;

        Ok(DashboardEngine::new())
    }

    #[allow(clippy::result_large_err)]
    fn send_to_dashboard_runtime(&self, msg: DashboardMsg) -> Result<(), SendError<DashboardMsg>> {
        self.runtime.sender.send(msg)
    }
}
