//! Dashboard runtime for running the `!Send` [`Dashboard`] controller.
//!
//! The controller keeps its state in `RefCell`s and runs its reads and write actions as
//! local tasks, so it lives on a dedicated thread driving a tokio [`LocalSet`]. The rest of
//! the process talks to it through messages:
//!
//! ```text
//!  External Thread (Axum)            Runtime Thread (LocalSet)
//! ┌───────────────────────┐         ┌───────────────────────────────┐
//! │ DashboardEngine       │         │ Dashboard (!Send)             │
//! │                       │         │                               │
//! │ mpsc::UnboundedSender ┼─────────│──> mpsc::UnboundedReceiver    │
//! │                       │         │                               │
//! │ oneshot::Receiver <───┼─────────┤─── oneshot::Sender            │
//! └───────────────────────┘         └───────────────────────────────┘
//! ```
//!
//! 1. A [`DashboardMsg`] is sent from an external thread using a [`mpsc::UnboundedSender`].
//! 2. The runtime thread receives it and hands it to the [`Dashboard`].
//! 3. The result goes back through the [`oneshot::Sender`] carried by the message.
//!
//! Reads and write actions are spawned as local tasks, so a snapshot request is answered
//! while an action waits for its wallet signature or its receipt.
//!
//! [`LocalSet`]: tokio::task::LocalSet

pub mod msg;

mod error;

pub use self::error::DashboardRuntimeError;

use core::time::Duration;

use std::{
    path::PathBuf,
    rc::Rc,
    thread::{self, JoinHandle},
};

use alloy_primitives::Address;
use bon::Builder;
use evm_multisig_client::{ChainRpc, HttpChainRpc, LocalKeyWallet, WalletConnector};
use evm_multisig_dashboard_domain::network::TargetNetwork;
use evm_multisig_dashboard_store::{
    InMemoryPreferenceStore, JsonFilePreferenceStore, PreferenceStore,
};
use tokio::{
    runtime::Runtime,
    sync::{mpsc, oneshot},
    task::LocalSet,
};
use url::Url;

use crate::{
    dashboard::{Dashboard, PendingAction},
    types::response::{ActionOutcome, ActionResponse, ConnectWalletResponse},
};

use self::{
    error::Result,
    msg::{
        ApproveMultisigTx, ApproveMultisigTxDissolved, ConnectWallet, ConnectWalletDissolved,
        DashboardMsg, DisconnectWallet, DisconnectWalletDissolved, ExecuteMultisigTx,
        ExecuteMultisigTxDissolved, GetDashboard, GetDashboardDissolved, Refresh,
        RefreshDissolved, SetAccountLabel, SetAccountLabelDissolved, SubmitMultisigTx,
        SubmitMultisigTxDissolved,
    },
};

/// Configuration for the dashboard runtime.
#[derive(Debug, Builder)]
pub struct DashboardRuntimeConfig {
    #[builder(into)]
    app_name: String,
    network: TargetNetwork,
    contract: Option<Address>,
    rpc_url: Url,
    wallet: Option<WalletConfig>,
    prefs_path: PathBuf,
    owner_scan_cap: u64,
    receipt_poll_interval: Duration,
}

/// Signing credentials of the local wallet connector.
#[derive(Builder)]
pub struct WalletConfig {
    #[builder(into)]
    connector: String,
    #[builder(into)]
    private_key: String,
    /// Endpoint the wallet broadcasts to. Defaults to the read endpoint.
    rpc_url: Option<Url>,
}

impl core::fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WalletConfig")
            .field("connector", &self.connector)
            .field("private_key", &"<redacted>")
            .field("rpc_url", &self.rpc_url)
            .finish()
    }
}

/// Spawns the dashboard runtime thread with the production chain seams.
///
/// The read client, the wallet connector and the preference store are built on the runtime
/// thread. A wallet that cannot be built, or a preference file that cannot be read, is
/// logged and replaced: no wallet in the first case, an in-memory store in the second.
///
/// The thread runs until a [`DashboardMsg::Shutdown`] is received or the message channel
/// is closed.
#[tracing::instrument(skip_all, fields(?config))]
pub fn spawn_new(
    rt: Runtime,
    msg_receiver: mpsc::UnboundedReceiver<DashboardMsg>,
    config: DashboardRuntimeConfig,
) -> JoinHandle<Result<()>> {
    spawn_with(rt, msg_receiver, move || build_dashboard(config))
}

/// Spawns the dashboard runtime thread around the dashboard built by `make`.
///
/// `make` runs on the runtime thread, so the dashboard and its seams need not be `Send`.
pub fn spawn_with<R, W, P, F>(
    rt: Runtime,
    msg_receiver: mpsc::UnboundedReceiver<DashboardMsg>,
    make: F,
) -> JoinHandle<Result<()>>
where
    R: ChainRpc + 'static,
    W: WalletConnector + 'static,
    P: PreferenceStore + 'static,
    F: FnOnce() -> Dashboard<R, W, P> + Send + 'static,
{
    thread::spawn(move || {
        let local = LocalSet::new();
        let fut = run_dashboard_runtime(msg_receiver, make());
        let local_runtime = local.run_until(fut);
        rt.block_on(local_runtime)
            .inspect_err(|e| tracing::error!("failed to run dashboard runtime: {e}"))
    })
}

fn build_dashboard(
    DashboardRuntimeConfig {
        app_name,
        network,
        contract,
        rpc_url,
        wallet,
        prefs_path,
        owner_scan_cap,
        receipt_poll_interval,
    }: DashboardRuntimeConfig,
) -> Dashboard<HttpChainRpc, LocalKeyWallet, Box<dyn PreferenceStore>> {
    let wallet = wallet.and_then(|WalletConfig { connector, private_key, rpc_url: wallet_url }| {
        LocalKeyWallet::new(connector, &private_key, wallet_url.unwrap_or_else(|| rpc_url.clone()))
            .inspect_err(|e| tracing::error!("failed to build wallet connector: {e}"))
            .ok()
    });

    if wallet.is_none() {
        tracing::warn!("no wallet connector configured, writes are unavailable");
    }

    let prefs: Box<dyn PreferenceStore> = match JsonFilePreferenceStore::open(&prefs_path) {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::error!(
                path = %prefs_path.display(),
                "failed to open preferences, falling back to memory: {e}"
            );
            Box::new(InMemoryPreferenceStore::new())
        },
    };

    if contract.is_none() {
        tracing::warn!("multisig contract address is missing");
    }

    Dashboard::builder()
        .app_name(app_name)
        .network(network)
        .maybe_contract(contract)
        .rpc(HttpChainRpc::new(rpc_url))
        .maybe_wallet(wallet)
        .prefs(prefs)
        .owner_scan_cap(owner_scan_cap)
        .receipt_poll_interval(receipt_poll_interval)
        .build()
}

#[tracing::instrument(skip_all)]
async fn run_dashboard_runtime<R, W, P>(
    mut msg_receiver: mpsc::UnboundedReceiver<DashboardMsg>,
    dashboard: Dashboard<R, W, P>,
) -> Result<()>
where
    R: ChainRpc + 'static,
    W: WalletConnector + 'static,
    P: PreferenceStore + 'static,
{
    let dashboard = Rc::new(dashboard);

    dashboard.load().await;

    tracing::info!(title = %dashboard.view().title, "dashboard loaded");

    while let Some(msg) = msg_receiver.recv().await {
        match msg {
            DashboardMsg::Shutdown => {
                tracing::info!("received shutdown msg, stopping dashboard runtime");
                break;
            },
            DashboardMsg::GetDashboard(msg) => {
                let _ = handle_get_dashboard(&dashboard, msg)
                    .inspect_err(|e| tracing::error!("failed to handle get dashboard: {e}"));
            },
            DashboardMsg::Refresh(msg) => {
                tokio::task::spawn_local(handle_refresh(Rc::clone(&dashboard), msg));
            },
            DashboardMsg::ConnectWallet(msg) => {
                tokio::task::spawn_local(handle_connect_wallet(Rc::clone(&dashboard), msg));
            },
            DashboardMsg::DisconnectWallet(msg) => {
                let _ = handle_disconnect_wallet(&dashboard, msg)
                    .inspect_err(|e| tracing::error!("failed to handle disconnect wallet: {e}"));
            },
            DashboardMsg::SetAccountLabel(msg) => {
                let _ = handle_set_account_label(&dashboard, msg)
                    .inspect_err(|e| tracing::error!("failed to handle set account label: {e}"));
            },
            DashboardMsg::SubmitMultisigTx(msg) => {
                let SubmitMultisigTxDissolved { form, sender } = msg.dissolve();
                let prepared = dashboard.prepare_submit(form);
                start_action(&dashboard, prepared, sender);
            },
            DashboardMsg::ApproveMultisigTx(msg) => {
                let ApproveMultisigTxDissolved { tx_id, sender } = msg.dissolve();
                let prepared = dashboard.prepare_approve(tx_id);
                start_action(&dashboard, prepared, sender);
            },
            DashboardMsg::ExecuteMultisigTx(msg) => {
                let ExecuteMultisigTxDissolved { tx_id, sender } = msg.dissolve();
                let prepared = dashboard.prepare_execute(tx_id);
                start_action(&dashboard, prepared, sender);
            },
        }
    }

    tracing::info!("shutting down dashboard runtime");

    Ok(())
}

/// Answers an action refused up front right away; runs an accepted one as a local task.
///
/// The up-front checks and the single flight marker are applied before this returns, so a
/// second action message handled next sees the first one as pending.
fn start_action<R, W, P>(
    dashboard: &Rc<Dashboard<R, W, P>>,
    prepared: Result<PendingAction, ActionOutcome>,
    sender: oneshot::Sender<ActionResponse>,
) where
    R: ChainRpc + 'static,
    W: WalletConnector + 'static,
    P: PreferenceStore + 'static,
{
    let pending = match prepared {
        Ok(pending) => pending,
        Err(outcome) => {
            let _ = sender
                .send(ActionResponse::new(outcome, dashboard.view()))
                .inspect_err(|_| tracing::error!("oneshot sender failed to send action response"));
            return;
        },
    };

    let dashboard = Rc::clone(dashboard);

    tokio::task::spawn_local(async move {
        let outcome = dashboard.run(pending).await;

        let _ = sender
            .send(ActionResponse::new(outcome, dashboard.view()))
            .inspect_err(|_| tracing::error!("oneshot sender failed to send action response"));
    });
}

#[tracing::instrument(skip_all)]
fn handle_get_dashboard<R, W, P>(
    dashboard: &Dashboard<R, W, P>,
    msg: GetDashboard,
) -> Result<()> {
    let GetDashboardDissolved { sender } = msg.dissolve();

    sender
        .send(dashboard.view())
        .map_err(|_| DashboardRuntimeError::sender("dashboard view"))
}

#[tracing::instrument(skip_all)]
async fn handle_refresh<R, W, P>(dashboard: Rc<Dashboard<R, W, P>>, msg: Refresh)
where
    R: ChainRpc,
    W: WalletConnector,
    P: PreferenceStore,
{
    let RefreshDissolved { sender } = msg.dissolve();

    dashboard.refresh().await;

    let _ = sender
        .send(dashboard.view())
        .inspect_err(|_| tracing::error!("oneshot sender failed to send refreshed dashboard"));
}

#[tracing::instrument(skip_all)]
async fn handle_connect_wallet<R, W, P>(dashboard: Rc<Dashboard<R, W, P>>, msg: ConnectWallet)
where
    R: ChainRpc,
    W: WalletConnector,
    P: PreferenceStore,
{
    let ConnectWalletDissolved { sender } = msg.dissolve();

    let result = dashboard.connect_wallet().await.map_err(|e| e.to_string());

    let _ = sender
        .send(ConnectWalletResponse::new(result, dashboard.view()))
        .inspect_err(|_| tracing::error!("oneshot sender failed to send connect wallet response"));
}

#[tracing::instrument(skip_all)]
fn handle_disconnect_wallet<R, W, P>(
    dashboard: &Dashboard<R, W, P>,
    msg: DisconnectWallet,
) -> Result<()>
where
    R: ChainRpc,
    W: WalletConnector,
    P: PreferenceStore,
{
    let DisconnectWalletDissolved { sender } = msg.dissolve();

    dashboard.disconnect_wallet();

    sender
        .send(dashboard.view())
        .map_err(|_| DashboardRuntimeError::sender("dashboard view"))
}

#[tracing::instrument(skip_all)]
fn handle_set_account_label<R, W, P>(
    dashboard: &Dashboard<R, W, P>,
    msg: SetAccountLabel,
) -> Result<()>
where
    R: ChainRpc,
    W: WalletConnector,
    P: PreferenceStore,
{
    let SetAccountLabelDissolved { label, sender } = msg.dissolve();

    let result = dashboard
        .set_account_label(&label)
        .inspect_err(|e| tracing::error!("failed to store account label: {e}"))
        .map(|()| dashboard.view());

    sender.send(result).map_err(|_| DashboardRuntimeError::sender("account label result"))
}
