//! The dashboard controller.
//!
//! [`Dashboard`] owns everything the single screen shows: the wallet session, the contract
//! reads, the submit form draft and the write action in flight. It lives on one thread; its
//! state sits in a [`RefCell`] that is never borrowed across an await point, so reads and a
//! write action may interleave freely on a `LocalSet`.

use core::{cell::RefCell, convert::Infallible, time::Duration};

use std::collections::BTreeMap;

use alloy_primitives::{Address, TxHash, U256};
use evm_multisig_client::{
    ChainRpc, ContractCall, MultisigClient, MultisigClientError, WalletAccount, WalletConnector,
    WalletError,
};
use evm_multisig_dashboard_domain::{
    account::{AccountLabel, ConnectedAccount},
    action::{ActionState, ActionTag},
    network::TargetNetwork,
    tx::{ContractTransaction, TxId},
};
use evm_multisig_dashboard_store::{PreferenceStore, PreferenceStoreError};

use crate::{
    owners::{self, DEFAULT_OWNER_SCAN_CAP, OwnerCount},
    reader::{self, Loadable},
    types::{
        request::{SubmitFormError, SubmitMultisigTxRequest},
        response::ActionOutcome,
    },
};

/// Default interval between receipt lookups while waiting for a confirmation.
pub const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default application name.
pub const DEFAULT_APP_NAME: &str = "Multisig Wallet";

pub(crate) const MISSING_CONTRACT: &str = "Multisig contract address is missing or invalid.";

const NOT_CONNECTED: &str = "Connect wallet first.";

/// The dashboard state and the operations behind every control on the screen.
pub struct Dashboard<R, W, P> {
    pub(crate) app_name: String,
    pub(crate) network: TargetNetwork,
    pub(crate) contract: Option<Address>,
    rpc: Option<R>,
    wallet: Option<W>,
    owner_scan_cap: u64,
    receipt_poll_interval: Duration,
    prefs: RefCell<P>,
    pub(crate) state: RefCell<DashboardState>,
}

pub(crate) struct DashboardState {
    pub(crate) session: Option<ConnectedAccount>,
    pub(crate) connect_error: Option<String>,
    pub(crate) label_input: String,
    pub(crate) owners: Loadable<OwnerCount>,
    pub(crate) threshold: Loadable<U256>,
    pub(crate) tx_count: Loadable<u64>,
    pub(crate) balance: Loadable<U256>,
    pub(crate) transactions: Loadable<Vec<ContractTransaction>>,
    pub(crate) approvals: Loadable<BTreeMap<TxId, bool>>,
    pub(crate) form: SubmitMultisigTxRequest,
    pub(crate) action: ActionState,
    /// Bumped by every refresh; results of an older refresh are dropped.
    read_generation: u64,
}

/// A write action that passed every up-front check and is marked in flight.
#[derive(Debug)]
pub struct PendingAction {
    tag: ActionTag,
    call: ContractCall,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            session: None,
            connect_error: None,
            label_input: String::new(),
            owners: Loadable::default(),
            threshold: Loadable::default(),
            tx_count: Loadable::default(),
            balance: Loadable::default(),
            transactions: Loadable::default(),
            approvals: Loadable::default(),
            form: SubmitMultisigTxRequest::reset(),
            action: ActionState::default(),
            read_generation: 0,
        }
    }
}

impl PendingAction {
    /// Returns the action tag.
    pub fn tag(&self) -> ActionTag {
        self.tag
    }
}

#[bon::bon]
impl<R, W, P> Dashboard<R, W, P> {
    /// Creates a dashboard. Nothing is read until [`load`](Self::load) or
    /// [`refresh`](Self::refresh) is awaited.
    ///
    /// A missing `contract` leaves the dashboard in its misconfigured state: every read is
    /// skipped and every write is refused.
    #[builder]
    pub fn new(
        #[builder(into, default = DEFAULT_APP_NAME.to_owned())] app_name: String,
        #[builder(default)] network: TargetNetwork,
        contract: Option<Address>,
        rpc: Option<R>,
        wallet: Option<W>,
        prefs: P,
        #[builder(default = DEFAULT_OWNER_SCAN_CAP)] owner_scan_cap: u64,
        #[builder(default = DEFAULT_RECEIPT_POLL_INTERVAL)] receipt_poll_interval: Duration,
    ) -> Self {
        Self {
            app_name,
            network,
            contract,
            rpc,
            wallet,
            owner_scan_cap,
            receipt_poll_interval,
            prefs: RefCell::new(prefs),
            state: RefCell::new(DashboardState::default()),
        }
    }
}

impl<R, W, P> Dashboard<R, W, P> {
    /// Returns the target network.
    pub fn network(&self) -> &TargetNetwork {
        &self.network
    }

    /// Returns the contract address, if configured.
    pub fn contract(&self) -> Option<Address> {
        self.contract
    }

    /// Returns the connected account.
    pub fn session(&self) -> Option<ConnectedAccount> {
        self.state.borrow().session.clone()
    }

    /// Returns the write action in flight.
    pub fn pending_action(&self) -> Option<ActionTag> {
        self.state.borrow().action.pending()
    }

    /// Checks, in order, the session, the contract, the wallet's network and the read client.
    pub(crate) fn writable_client(
        &self,
        state: &DashboardState,
    ) -> Result<MultisigClient<&R>, String> {
        let session = state.session.as_ref().ok_or(NOT_CONNECTED)?;
        let contract = self.contract.ok_or(MISSING_CONTRACT)?;

        if !self.network.accepts(session.chain_id()) {
            return Err(format!("Switch wallet network to {}.", self.network.name()));
        }

        let rpc = self
            .rpc
            .as_ref()
            .ok_or_else(|| format!("{} RPC client is not available.", self.network.name()))?;

        Ok(MultisigClient::new(rpc, contract))
    }
}

impl<R, W, P> Dashboard<R, W, P>
where
    R: ChainRpc,
    W: WalletConnector,
    P: PreferenceStore,
{
    /// Scans the owners and reads the contract state, concurrently.
    #[tracing::instrument(skip_all)]
    pub async fn load(&self) {
        futures::join!(self.scan_owners(), self.refresh());
    }

    /// Counts the owners by probing, up to the configured cap.
    pub async fn scan_owners(&self) {
        let Some(client) = self.client() else {
            self.state.borrow_mut().owners.clear();
            return;
        };

        self.state.borrow_mut().owners.start();

        let owners = owners::discover_owner_count(&client, self.owner_scan_cap).await;

        self.state.borrow_mut().owners.finish(Ok::<_, Infallible>(owners));
    }

    /// Re-queries the wallet's chain and re-issues the five contract reads: threshold,
    /// transaction count, balance, then the transaction records and, with a wallet connected,
    /// its approval flags.
    ///
    /// A refresh started later supersedes this one: once it has begun, the results of this
    /// one are dropped instead of overwriting newer state.
    #[tracing::instrument(skip_all)]
    pub async fn refresh(&self) {
        let generation = {
            let mut state = self.state.borrow_mut();
            state.read_generation += 1;
            state.read_generation
        };

        self.refresh_session().await;

        let Some(client) = self.client() else {
            let mut state = self.state.borrow_mut();
            state.threshold.clear();
            state.tx_count.clear();
            state.balance.clear();
            state.transactions.clear();
            state.approvals.clear();
            return;
        };

        {
            let mut state = self.state.borrow_mut();
            state.threshold.start();
            state.tx_count.start();
            state.balance.start();
        }

        let (threshold, tx_count, balance) =
            futures::join!(client.threshold(), client.transaction_count(), client.balance());

        let count = tx_count.as_ref().ok().copied();

        let caller = {
            let mut state = self.state.borrow_mut();

            if state.read_generation != generation {
                tracing::debug!(generation, "dropping superseded contract reads");
                return;
            }

            state.threshold.finish(threshold);
            state.tx_count.finish(tx_count);
            state.balance.finish(balance);

            let caller = state.session.as_ref().map(ConnectedAccount::address);

            if count.is_some() {
                state.transactions.start();

                if caller.is_some() {
                    state.approvals.start();
                }
            }

            caller
        };

        let Some(count) = count else {
            let mut state = self.state.borrow_mut();
            state.transactions.clear();
            state.approvals.clear();
            return;
        };

        let (transactions, approvals) = futures::join!(
            reader::read_transactions(&client, count),
            async {
                match caller {
                    Some(owner) => Some(reader::read_approvals(&client, count, owner).await),
                    None => None,
                }
            }
        );

        let mut state = self.state.borrow_mut();

        if state.read_generation != generation {
            tracing::debug!(generation, "dropping superseded transaction reads");
            return;
        }

        state.transactions.finish(transactions);

        match approvals {
            Some(approvals) => state.approvals.finish(approvals),
            None => state.approvals.clear(),
        }
    }

    /// Connects the wallet and loads the stored label of its account.
    ///
    /// On failure the session stays disconnected and the message is kept for display.
    #[tracing::instrument(skip_all)]
    pub async fn connect_wallet(&self) -> Result<ConnectedAccount, WalletError> {
        let Some(wallet) = self.wallet.as_ref() else {
            let err = WalletError::not_configured("no wallet connector");
            self.state.borrow_mut().connect_error = Some(err.to_string());
            return Err(err);
        };

        let WalletAccount { address, chain_id } = match wallet.connect().await {
            Ok(account) => account,
            Err(e) => {
                tracing::warn!("failed to connect wallet: {e}");
                let mut state = self.state.borrow_mut();
                state.session = None;
                state.connect_error = Some(e.to_string());
                return Err(e);
            },
        };

        let label = self.prefs.borrow().account_label(&address);

        let account = ConnectedAccount::builder()
            .address(address)
            .chain_id(chain_id)
            .connector(wallet.name())
            .maybe_label(label.clone())
            .build();

        tracing::info!(%address, chain_id, connector = wallet.name(), "wallet connected");

        {
            let mut state = self.state.borrow_mut();
            state.session = Some(account.clone());
            state.connect_error = None;
            state.label_input = label.map(String::from).unwrap_or_default();
        }

        self.refresh().await;

        Ok(self.session().unwrap_or(account))
    }

    /// Drops the wallet session.
    pub fn disconnect_wallet(&self) {
        let mut state = self.state.borrow_mut();

        if let Some(account) = state.session.take() {
            tracing::info!(address = %account.address(), "wallet disconnected");
        }

        state.connect_error = None;
        state.label_input.clear();
        state.approvals.clear();
    }

    /// Stores `input` as the label of the connected account. Input is trimmed; blank input
    /// removes the label. Without a connected account this does nothing.
    #[tracing::instrument(skip_all)]
    pub fn set_account_label(&self, input: &str) -> Result<(), PreferenceStoreError> {
        let Some(address) = self.state.borrow().session.as_ref().map(ConnectedAccount::address)
        else {
            return Ok(());
        };

        let label = AccountLabel::normalize(input);

        self.prefs.borrow_mut().set_account_label(&address, label.as_ref())?;

        let mut state = self.state.borrow_mut();
        state.label_input = label.as_ref().map(ToString::to_string).unwrap_or_default();

        if let Some(session) = state.session.as_mut() {
            session.set_label(label);
        }

        Ok(())
    }

    /// Submits the form draft as a new multisig transaction and waits for it to settle.
    pub async fn submit(&self, form: SubmitMultisigTxRequest) -> ActionOutcome {
        match self.prepare_submit(form) {
            Ok(pending) => self.run(pending).await,
            Err(outcome) => outcome,
        }
    }

    /// Approves `tx_id` and waits for it to settle.
    pub async fn approve(&self, tx_id: TxId) -> ActionOutcome {
        match self.prepare_approve(tx_id) {
            Ok(pending) => self.run(pending).await,
            Err(outcome) => outcome,
        }
    }

    /// Executes `tx_id` and waits for it to settle.
    pub async fn execute(&self, tx_id: TxId) -> ActionOutcome {
        match self.prepare_execute(tx_id) {
            Ok(pending) => self.run(pending).await,
            Err(outcome) => outcome,
        }
    }

    /// Stores `form` as the draft and runs every up-front check of a submit.
    pub fn prepare_submit(
        &self,
        form: SubmitMultisigTxRequest,
    ) -> Result<PendingAction, ActionOutcome> {
        if let Some(pending) = self.pending_action() {
            return Err(ActionOutcome::Busy { tag: ActionTag::Submit, pending });
        }

        self.state.borrow_mut().form = form.clone();

        self.prepare(ActionTag::Submit, |client| {
            let submit = form.validate()?;
            Ok(client.submit_call(submit.to(), submit.value(), submit.data().clone()))
        })
    }

    /// Runs every up-front check of an approval.
    pub fn prepare_approve(&self, tx_id: TxId) -> Result<PendingAction, ActionOutcome> {
        self.prepare(ActionTag::Approve(tx_id), |client| Ok(client.approve_call(tx_id.get())))
    }

    /// Runs every up-front check of an execution.
    pub fn prepare_execute(&self, tx_id: TxId) -> Result<PendingAction, ActionOutcome> {
        self.prepare(ActionTag::Execute(tx_id), |client| Ok(client.execute_call(tx_id.get())))
    }

    /// Signs, broadcasts and confirms `pending`, then re-reads the contract state.
    ///
    /// The action stays in flight until the re-read is done. Any failure is recorded
    /// verbatim and ends the action.
    #[tracing::instrument(skip_all, fields(action = %pending.tag))]
    pub async fn run(&self, pending: PendingAction) -> ActionOutcome {
        let PendingAction { tag, call } = pending;

        match self.dispatch_and_confirm(call).await {
            Ok(hash) => {
                {
                    let mut state = self.state.borrow_mut();
                    state.action.confirmed();

                    if tag == ActionTag::Submit {
                        state.form = SubmitMultisigTxRequest::reset();
                    }
                }

                self.refresh().await;
                self.state.borrow_mut().action.settle();

                tracing::info!(%hash, "action settled");

                ActionOutcome::Settled { tag, hash }
            },
            Err(e) => {
                let message = e.to_string();
                tracing::warn!("action failed: {message}");

                self.state.borrow_mut().action.fail(message.clone());

                ActionOutcome::Failed { tag, message }
            },
        }
    }

    fn prepare<F>(&self, tag: ActionTag, encode: F) -> Result<PendingAction, ActionOutcome>
    where
        F: FnOnce(&MultisigClient<&R>) -> Result<ContractCall, SubmitFormError>,
    {
        let mut state = self.state.borrow_mut();

        if let Some(pending) = state.action.pending() {
            tracing::debug!(%pending, requested = %tag, "another action is in flight");
            return Err(ActionOutcome::Busy { tag, pending });
        }

        let call = self
            .writable_client(&state)
            .and_then(|client| encode(&client).map_err(|e| e.to_string()));

        let call = match call {
            Ok(call) => call,
            Err(message) => {
                tracing::debug!(action = %tag, "action refused: {message}");
                state.action.reject(message.clone());
                return Err(ActionOutcome::Rejected { tag, message });
            },
        };

        state.action.try_begin(tag);

        Ok(PendingAction { tag, call })
    }

    async fn dispatch_and_confirm(
        &self,
        call: ContractCall,
    ) -> Result<TxHash, MultisigClientError> {
        let (Some(rpc), Some(wallet)) = (self.rpc.as_ref(), self.wallet.as_ref()) else {
            return Err(WalletError::not_configured("no wallet connector").into());
        };

        let client = MultisigClient::new(rpc, call.to);

        let hash = client.dispatch(wallet, call).await?;
        self.state.borrow_mut().action.signed(&hash);

        client.wait_for_confirmation(hash, self.receipt_poll_interval).await?;

        Ok(hash)
    }

    async fn refresh_session(&self) {
        let Some(wallet) = self.wallet.as_ref() else {
            return;
        };

        if self.state.borrow().session.is_none() {
            return;
        }

        match wallet.chain_id().await {
            Ok(chain_id) => {
                if let Some(session) = self.state.borrow_mut().session.as_mut() {
                    session.set_chain_id(chain_id);
                }
            },
            Err(e) => tracing::warn!("failed to refresh wallet chain: {e}"),
        }
    }

    fn client(&self) -> Option<MultisigClient<&R>> {
        Some(MultisigClient::new(self.rpc.as_ref()?, self.contract?))
    }
}
