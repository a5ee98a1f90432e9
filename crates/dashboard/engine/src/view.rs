//! Read-only snapshot of the dashboard screen.

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use evm_multisig_dashboard_domain::{
    action::{ActionPhase, ActionTag},
    display::{format_ether, shorten_hex},
    tx::{ContractTransaction, TxId},
};

use crate::{
    dashboard::{Dashboard, DashboardState, MISSING_CONTRACT},
    reader::Loadable,
};

const PLACEHOLDER: &str = "-";
const LOADING: &str = "Loading...";

/// Everything the dashboard screen shows, derived from the controller state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DashboardView {
    /// Window title, `"<threshold> of <owners> Multisig Wallet"`.
    pub title: String,
    /// Application name.
    pub app_name: String,
    /// The target network.
    pub network: NetworkView,
    /// The multisig contract, if configured.
    pub contract: Option<Address>,
    /// The connected wallet.
    pub session: Option<SessionView>,
    /// Why the last connection attempt failed.
    pub connect_error: Option<String>,
    /// Persistent notices above the cards.
    pub banners: Banners,
    /// Summary cards.
    pub cards: SummaryCards,
    /// The submit form draft.
    pub form: SubmitFormView,
    /// The transaction table.
    pub transactions: TransactionsView,
    /// The write action status line.
    pub action: ActionView,
    /// Whether every write control is disabled.
    pub writes_disabled: bool,
}

/// The target network.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NetworkView {
    /// Chain id.
    pub chain_id: u64,
    /// Display name.
    pub name: String,
    /// Native currency symbol.
    pub native_symbol: String,
}

/// The connected wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SessionView {
    /// Connector name.
    pub connector: String,
    /// Signing address.
    pub address: Address,
    /// The address shortened for display.
    pub short_address: String,
    /// Label, or the short address.
    pub display_name: String,
    /// Current content of the label input.
    pub label_input: String,
    /// The wallet's active chain.
    pub chain_id: u64,
}

/// Persistent notices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Banners {
    /// Missing contract address.
    pub config: Option<String>,
    /// Wallet on the wrong chain.
    pub network: Option<String>,
    /// Owner scan stopped at its cap.
    pub owner_scan: Option<String>,
}

/// The summary cards.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SummaryCards {
    /// Required approvals.
    pub threshold: CardView,
    /// Number of transactions.
    pub transaction_count: CardView,
    /// Contract balance with the native symbol.
    pub balance: CardView,
    /// Discovered owners.
    pub owners: CardView,
}

/// One summary card.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CardView {
    /// Card title.
    pub label: String,
    /// Rendered value.
    pub value: String,
    /// Inline read error.
    pub error: Option<String>,
    /// Whether the read is in progress.
    pub loading: bool,
    /// When the value was last read.
    pub updated_at: Option<DateTime<Utc>>,
}

/// The submit form.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SubmitFormView {
    /// Recipient input.
    pub to: String,
    /// Amount input, in ETH.
    pub value_eth: String,
    /// Calldata input.
    pub data_hex: String,
    /// Whether the submit button is enabled.
    pub submit_enabled: bool,
    /// Submit button label.
    pub submit_label: String,
}

/// The transaction table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TransactionsView {
    /// Whether the records are being read.
    pub loading: bool,
    /// Inline read error of the transaction records.
    pub error: Option<String>,
    /// Inline read error of the connected account's approval flags.
    pub approvals_error: Option<String>,
    /// Shown in place of the table when there are no rows.
    pub note: Option<String>,
    /// One row per transaction, by id.
    pub rows: Vec<TransactionRow>,
}

/// One transaction row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", serde_with::serde_as, derive(serde::Serialize))]
pub struct TransactionRow {
    /// Transaction id.
    pub id: TxId,
    /// Destination.
    pub to: Address,
    /// Destination shortened for display.
    pub to_short: String,
    /// Value in ETH.
    pub value_eth: String,
    /// Value in wei.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub value_wei: U256,
    /// Approvals collected.
    #[cfg_attr(feature = "serde", serde_as(as = "serde_with::DisplayFromStr"))]
    pub num_approvals: U256,
    /// Whether it was executed.
    pub executed: bool,
    /// Whether the connected account approved it, when known.
    pub approved_by_caller: Option<bool>,
    /// Whether the approve button is enabled.
    pub can_approve: bool,
    /// Whether the execute button is enabled.
    pub can_execute: bool,
    /// Approve button label.
    pub approve_label: String,
    /// Execute button label.
    pub execute_label: String,
}

/// The write action status line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ActionView {
    /// State machine phase.
    pub phase: ActionPhase,
    /// The action in flight, e.g. `approve-3`.
    pub pending: Option<String>,
    /// Progress or success message.
    pub status: Option<String>,
    /// Failure message.
    pub error: Option<String>,
}

impl<R, W, P> Dashboard<R, W, P> {
    /// Renders the current state.
    pub fn view(&self) -> DashboardView {
        let state = self.state.borrow();

        let threshold = state.threshold.get();
        let owners = state.owners.get();
        let pending = state.action.pending();
        let writes_disabled = self.writable_client(&state).is_err();
        let controls_enabled = !writes_disabled && pending.is_none();

        let title = format!(
            "{} of {} Multisig Wallet",
            threshold.map_or_else(|| PLACEHOLDER.to_owned(), |t| t.to_string()),
            owners.map_or_else(|| PLACEHOLDER.to_owned(), |o| o.count.to_string()),
        );

        let banners = Banners {
            config: self.contract.is_none().then(|| MISSING_CONTRACT.to_owned()),
            network: state
                .session
                .as_ref()
                .and_then(|session| self.network.mismatch_banner(session.chain_id())),
            owner_scan: owners.and_then(|owners| owners.undercount_note()),
        };

        let symbol = self.network.native_symbol();

        let cards = SummaryCards {
            threshold: card("Threshold", &state.threshold, |t| t.to_string(), "0"),
            transaction_count: card("Transactions", &state.tx_count, |c| c.to_string(), "0"),
            balance: card(
                "Balance",
                &state.balance,
                |b| format!("{} {symbol}", format_ether(*b)),
                PLACEHOLDER,
            ),
            owners: card("Owners", &state.owners, |o| o.count.to_string(), PLACEHOLDER),
        };

        let form = SubmitFormView {
            to: state.form.to().to_owned(),
            value_eth: state.form.value_eth().to_owned(),
            data_hex: state.form.data_hex().to_owned(),
            submit_enabled: controls_enabled,
            submit_label: button_label(pending, ActionTag::Submit),
        };

        DashboardView {
            title,
            app_name: self.app_name.clone(),
            network: NetworkView {
                chain_id: self.network.chain_id(),
                name: self.network.name().to_owned(),
                native_symbol: symbol.to_owned(),
            },
            contract: self.contract,
            session: state.session.as_ref().map(|session| SessionView {
                connector: session.connector().to_owned(),
                address: session.address(),
                short_address: shorten_hex(&session.address().to_string(), 6),
                display_name: session.display_name(),
                label_input: state.label_input.clone(),
                chain_id: session.chain_id(),
            }),
            connect_error: state.connect_error.clone(),
            banners,
            cards,
            form,
            transactions: transactions(&state, controls_enabled),
            action: ActionView {
                phase: state.action.phase(),
                pending: pending.map(|tag| tag.to_string()),
                status: state.action.status().map(ToOwned::to_owned),
                error: state.action.error().map(ToOwned::to_owned),
            },
            writes_disabled,
        }
    }
}

fn card<T, F>(label: &str, read: &Loadable<T>, render: F, fallback: &str) -> CardView
where
    F: FnOnce(&T) -> String,
{
    let value = if read.is_loading() {
        LOADING.to_owned()
    } else {
        read.value().map_or_else(|| fallback.to_owned(), render)
    };

    CardView {
        label: label.to_owned(),
        value,
        error: read.error().map(ToOwned::to_owned),
        loading: read.is_loading(),
        updated_at: read.fetched_at(),
    }
}

fn transactions(state: &DashboardState, controls_enabled: bool) -> TransactionsView {
    let loading = state.transactions.is_loading();
    let threshold = state.threshold.get();
    let balance = state.balance.get();
    let pending = state.action.pending();
    let approvals = state.approvals.value();

    let rows: Vec<_> = state
        .transactions
        .value()
        .into_iter()
        .flatten()
        .map(|tx| {
            let approved_by_caller =
                approvals.and_then(|approvals| approvals.get(&tx.id())).copied();
            row(tx, approved_by_caller, threshold, balance, controls_enabled, pending)
        })
        .collect();

    let note = match (loading, state.transactions.error(), rows.is_empty()) {
        (true, _, true) => Some("Loading transactions...".to_owned()),
        (false, None, true) => Some("No transactions yet.".to_owned()),
        _ => None,
    };

    TransactionsView {
        loading,
        error: state.transactions.error().map(ToOwned::to_owned),
        approvals_error: state.approvals.error().map(ToOwned::to_owned),
        note,
        rows,
    }
}

fn row(
    tx: &ContractTransaction,
    approved_by_caller: Option<bool>,
    threshold: Option<U256>,
    balance: Option<U256>,
    controls_enabled: bool,
    pending: Option<ActionTag>,
) -> TransactionRow {
    TransactionRow {
        id: tx.id(),
        to: tx.to(),
        to_short: shorten_hex(&tx.to().to_string(), 6),
        value_eth: format_ether(tx.value()),
        value_wei: tx.value(),
        num_approvals: tx.num_approvals(),
        executed: tx.executed(),
        approved_by_caller,
        can_approve: controls_enabled && tx.can_approve(approved_by_caller.unwrap_or(false)),
        can_execute: controls_enabled && tx.can_execute(threshold, balance),
        approve_label: button_label(pending, ActionTag::Approve(tx.id())),
        execute_label: button_label(pending, ActionTag::Execute(tx.id())),
    }
}

fn button_label(pending: Option<ActionTag>, tag: ActionTag) -> String {
    let kind = tag.kind();

    if pending == Some(tag) {
        kind.in_flight_label().to_owned()
    } else {
        kind.to_string()
    }
}
