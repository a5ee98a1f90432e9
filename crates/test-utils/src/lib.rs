//! Test utilities for the EVM multisig components.
//!
//! This crate provides [`MockChain`], an in-memory stand-in for a network hosting a single
//! multisig contract. It implements both chain seams of `evm-multisig-client`
//! ([`ChainRpc`] through [`MockRpc`], [`WalletConnector`] through [`MockWallet`]), so the
//! client and the dashboard can be exercised end to end without a node.
//!
//! The contract semantics mirror a typical owner/threshold multisig: only owners may submit
//! or approve, each owner approves at most once, and execution needs `threshold` approvals
//! and enough balance to cover the transfer.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
};

use alloy::primitives::{Address, Bytes, TxHash, U256, address, keccak256, utils};
use alloy_sol_types::{SolInterface, SolValue};
use evm_multisig_client::{
    ChainRpc, ContractCall, RpcError, TxReceipt, WalletAccount, WalletConnector, WalletError,
    abi::IMultisig::{self, IMultisigCalls},
};
use tokio::sync::Notify;

/// Chain id of Sepolia, the default network of the mock.
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

/// A transaction as stored by the mock contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockTx {
    /// Destination of the transfer.
    pub to: Address,
    /// Value in wei.
    pub value: U256,
    /// Calldata.
    pub data: Bytes,
    /// Whether it was executed.
    pub executed: bool,
    /// Approvals collected.
    pub num_approvals: u64,
}

/// Shared handle on the in-memory chain. Clones observe the same state.
#[derive(Debug, Clone)]
pub struct MockChain {
    state: Arc<Mutex<ChainState>>,
}

/// Read side of a [`MockChain`].
#[derive(Debug, Clone)]
pub struct MockRpc {
    chain: MockChain,
}

/// A wallet signing for one account on a [`MockChain`].
#[derive(Debug, Clone)]
pub struct MockWallet {
    chain: MockChain,
    address: Address,
}

#[derive(Debug)]
struct ChainState {
    chain_id: u64,
    wallet_chain_id: u64,
    owners: Vec<Address>,
    threshold: U256,
    balance: U256,
    txs: Vec<MockTx>,
    approvals: HashSet<(u64, Address)>,
    receipts: HashMap<TxHash, TxReceipt>,
    calls: HashMap<&'static str, usize>,
    nonce: u64,
    owner_probe_limit: Option<u64>,
    read_failure: Option<String>,
    call_failures: HashMap<&'static str, String>,
    connect_failure: Option<String>,
    send_rejection: Option<String>,
    revert_next_receipt: bool,
    send_gate: Option<Arc<Notify>>,
    call_gate: Option<(&'static str, Arc<Notify>)>,
}

impl MockChain {
    /// The address the mock contract is deployed at.
    pub const CONTRACT: Address = address!("0x5fbdb2315678afecb367f032d93f642f64180aa3");
}

#[bon::bon]
impl MockChain {
    /// Creates a chain hosting a multisig with the given owners and threshold.
    #[builder]
    pub fn new(
        owners: Vec<Address>,
        threshold: u64,
        #[builder(default)] balance: U256,
        #[builder(default = SEPOLIA_CHAIN_ID)] chain_id: u64,
    ) -> Self {
        let state = ChainState {
            chain_id,
            wallet_chain_id: chain_id,
            owners,
            threshold: U256::from(threshold),
            balance,
            txs: Vec::new(),
            approvals: HashSet::new(),
            receipts: HashMap::new(),
            calls: HashMap::new(),
            nonce: 0,
            owner_probe_limit: None,
            read_failure: None,
            call_failures: HashMap::new(),
            connect_failure: None,
            send_rejection: None,
            revert_next_receipt: false,
            send_gate: None,
            call_gate: None,
        };

        Self { state: Arc::new(Mutex::new(state)) }
    }
}

impl MockChain {
    /// Returns a read client for this chain.
    pub fn rpc(&self) -> MockRpc {
        MockRpc { chain: self.clone() }
    }

    /// Returns a wallet signing as `address`.
    pub fn wallet(&self, address: Address) -> MockWallet {
        MockWallet { chain: self.clone(), address }
    }

    /// Stores a transaction directly, approved by `approvers`, and returns its id.
    pub fn push_transaction(
        &self,
        to: Address,
        value: U256,
        data: Bytes,
        approvers: &[Address],
    ) -> u64 {
        let mut state = self.lock();
        let tx_id = state.txs.len() as u64;

        state.txs.push(MockTx {
            to,
            value,
            data,
            executed: false,
            num_approvals: approvers.len() as u64,
        });
        state.approvals.extend(approvers.iter().map(|approver| (tx_id, *approver)));

        tx_id
    }

    /// Returns the owners of the contract.
    pub fn owners(&self) -> Vec<Address> {
        self.lock().owners.clone()
    }

    /// Returns the stored transaction `tx_id`.
    pub fn transaction(&self, tx_id: u64) -> Option<MockTx> {
        self.lock().txs.get(tx_id as usize).cloned()
    }

    /// Returns whether `owner` approved `tx_id`.
    pub fn has_approved(&self, tx_id: u64, owner: Address) -> bool {
        self.lock().approvals.contains(&(tx_id, owner))
    }

    /// Returns the contract balance.
    pub fn balance(&self) -> U256 {
        self.lock().balance
    }

    /// Points every wallet of this chain at `chain_id`.
    pub fn set_wallet_chain_id(&self, chain_id: u64) {
        self.lock().wallet_chain_id = chain_id;
    }

    /// Makes `owners(i)` revert for every `i >= limit`, regardless of the owner list.
    pub fn fail_owner_probes_from(&self, limit: u64) {
        self.lock().owner_probe_limit = Some(limit);
    }

    /// Makes every read fail with `message`, or restores reads with `None`.
    pub fn fail_reads(&self, message: Option<&str>) {
        self.lock().read_failure = message.map(str::to_owned);
    }

    /// Fails every later read of the contract function `function` with `message`.
    pub fn fail_calls(&self, function: &'static str, message: &str) {
        self.lock().call_failures.insert(function, message.to_owned());
    }

    /// Makes wallet connections fail with `message`.
    pub fn fail_connect(&self, message: &str) {
        self.lock().connect_failure = Some(message.to_owned());
    }

    /// Rejects the next wallet send with `message`, as a user declining the prompt.
    pub fn reject_next_send(&self, message: &str) {
        self.lock().send_rejection = Some(message.to_owned());
    }

    /// Holds the next wallet send, as an open signing prompt, until the returned handle is
    /// notified.
    pub fn hold_next_send(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.lock().send_gate = Some(Arc::clone(&gate));
        gate
    }

    /// Holds the response of the next read of `function` until the returned handle is
    /// notified. The response reflects the chain state at the time of the read, as a reply
    /// delayed in transit.
    pub fn hold_next_call(&self, function: &'static str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.lock().call_gate = Some((function, Arc::clone(&gate)));
        gate
    }

    /// Mines the next sent transaction with a failed status and no state change.
    pub fn revert_next_receipt(&self) {
        self.lock().revert_next_receipt = true;
    }

    /// Number of times `function` was invoked. Contract functions are counted by name
    /// (`threshold`, `transactions`, ...), plus `balance` for balance lookups and
    /// `sendTransaction` for wallet sends.
    pub fn call_count(&self, function: &str) -> usize {
        self.lock().calls.get(function).copied().unwrap_or_default()
    }

    /// Resets every call counter.
    pub fn reset_call_counts(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().expect("mock chain state poisoned")
    }
}

impl ChainState {
    fn count(&mut self, function: &'static str) {
        *self.calls.entry(function).or_default() += 1;
    }

    fn read(&mut self, input: &[u8]) -> Result<Bytes, RpcError> {
        let call = IMultisigCalls::abi_decode(input)
            .map_err(|e| RpcError::other(format!("invalid calldata: {e}")))?;

        let name = call_name(&call);
        self.count(name);

        if let Some(message) = self.read_failure.as_ref().or(self.call_failures.get(name)) {
            return Err(RpcError::other(message.clone()));
        }

        let output = match call {
            IMultisigCalls::owners(IMultisig::ownersCall { index }) => {
                let index = u64::try_from(index).map_err(|_| reverted())?;

                if self.owner_probe_limit.is_some_and(|limit| index >= limit) {
                    return Err(reverted());
                }

                self.owners.get(index as usize).ok_or_else(reverted)?.abi_encode()
            },
            IMultisigCalls::threshold(_) => self.threshold.abi_encode(),
            IMultisigCalls::getTransactionCount(_) => U256::from(self.txs.len()).abi_encode(),
            IMultisigCalls::transactions(IMultisig::transactionsCall { txId }) => {
                let tx = self.tx(txId).map_err(|_| reverted())?;

                (tx.to, tx.value, tx.data.clone(), tx.executed, U256::from(tx.num_approvals))
                    .abi_encode_params()
            },
            IMultisigCalls::approved(IMultisig::approvedCall { txId, owner }) => {
                let tx_id = u64::try_from(txId).map_err(|_| reverted())?;

                self.approvals.contains(&(tx_id, owner)).abi_encode()
            },
            IMultisigCalls::submit(_) | IMultisigCalls::approve(_) | IMultisigCalls::execute(_) => {
                Vec::new()
            },
        };

        Ok(output.into())
    }

    fn take_call_gate(&mut self, input: &[u8]) -> Option<Arc<Notify>> {
        let name = IMultisigCalls::abi_decode(input).ok().map(|call| call_name(&call))?;

        match &self.call_gate {
            Some((function, _)) if *function == name => self.call_gate.take().map(|(_, gate)| gate),
            _ => None,
        }
    }

    fn apply(&mut self, sender: Address, call: IMultisigCalls) -> Result<(), &'static str> {
        if !self.owners.contains(&sender) {
            return Err("not owner");
        }

        match call {
            IMultisigCalls::submit(IMultisig::submitCall { to, value, data }) => {
                self.txs.push(MockTx { to, value, data, executed: false, num_approvals: 0 });
            },
            IMultisigCalls::approve(IMultisig::approveCall { txId }) => {
                let tx_id = self.tx(txId).map(|_| txId.to::<u64>())?;

                if self.txs[tx_id as usize].executed {
                    return Err("tx already executed");
                }

                if !self.approvals.insert((tx_id, sender)) {
                    return Err("tx already approved");
                }

                self.txs[tx_id as usize].num_approvals += 1;
            },
            IMultisigCalls::execute(IMultisig::executeCall { txId }) => {
                let tx = self.tx(txId)?.clone();

                if tx.executed {
                    return Err("tx already executed");
                }

                if U256::from(tx.num_approvals) < self.threshold {
                    return Err("cannot execute tx");
                }

                if tx.value > self.balance {
                    return Err("tx failed");
                }

                self.balance -= tx.value;
                self.txs[txId.to::<usize>()].executed = true;
            },
            _ => return Err("function is read only"),
        }

        Ok(())
    }

    fn tx(&self, tx_id: U256) -> Result<&MockTx, &'static str> {
        usize::try_from(tx_id)
            .ok()
            .and_then(|index| self.txs.get(index))
            .ok_or("tx does not exist")
    }
}

impl ChainRpc for MockRpc {
    async fn chain_id(&self) -> Result<u64, RpcError> {
        Ok(self.chain.lock().chain_id)
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, RpcError> {
        if to != MockChain::CONTRACT {
            return Err(RpcError::other(format!("no contract deployed at {to}")));
        }

        let (response, gate) = {
            let mut state = self.chain.lock();
            let response = state.read(&input);
            let gate = state.take_call_gate(&input);
            (response, gate)
        };

        if let Some(gate) = gate {
            gate.notified().await;
        }

        response
    }

    async fn balance(&self, address: Address) -> Result<U256, RpcError> {
        let mut state = self.chain.lock();
        state.count("balance");

        if let Some(message) = &state.read_failure {
            return Err(RpcError::other(message.clone()));
        }

        Ok(if address == MockChain::CONTRACT { state.balance } else { U256::ZERO })
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<TxReceipt>, RpcError> {
        Ok(self.chain.lock().receipts.get(&hash).copied())
    }
}

impl MockWallet {
    /// Returns the account this wallet signs for.
    pub fn address(&self) -> Address {
        self.address
    }
}

impl WalletConnector for MockWallet {
    fn name(&self) -> &str {
        "mock"
    }

    async fn connect(&self) -> Result<WalletAccount, WalletError> {
        let state = self.chain.lock();

        if let Some(message) = &state.connect_failure {
            return Err(WalletError::transport(message.clone()));
        }

        Ok(WalletAccount { address: self.address, chain_id: state.wallet_chain_id })
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.chain.lock().wallet_chain_id)
    }

    async fn send_transaction(&self, call: ContractCall) -> Result<TxHash, WalletError> {
        let gate = self.chain.lock().send_gate.take();

        match gate {
            Some(gate) => gate.notified().await,
            // give concurrently polled futures a chance to run while the "prompt" is open
            None => tokio::task::yield_now().await,
        }

        let mut state = self.chain.lock();
        state.count("sendTransaction");

        if let Some(message) = state.send_rejection.take() {
            return Err(WalletError::rejected(message));
        }

        if call.to != MockChain::CONTRACT {
            return Err(WalletError::rejected(format!("no contract deployed at {}", call.to)));
        }

        let decoded = IMultisigCalls::abi_decode(&call.input)
            .map_err(|e| WalletError::rejected(format!("invalid calldata: {e}")))?;

        let success = !core::mem::take(&mut state.revert_next_receipt);

        if success {
            state
                .apply(self.address, decoded)
                .map_err(|reason| WalletError::rejected(format!("execution reverted: {reason}")))?;
        }

        state.nonce += 1;
        let hash = keccak256(state.nonce.to_be_bytes());
        let receipt = TxReceipt { hash, block_number: Some(state.nonce), success };
        state.receipts.insert(hash, receipt);

        Ok(hash)
    }
}

/// Parses a decimal ETH amount into wei, panicking on malformed input.
pub fn ether(amount: &str) -> U256 {
    utils::parse_ether(amount).expect("valid ether amount")
}

/// Returns a fresh random address.
pub fn random_address() -> Address {
    Address::from(rand::random::<[u8; 20]>())
}

fn reverted() -> RpcError {
    RpcError::other("execution reverted")
}

fn call_name(call: &IMultisigCalls) -> &'static str {
    match call {
        IMultisigCalls::owners(_) => "owners",
        IMultisigCalls::threshold(_) => "threshold",
        IMultisigCalls::getTransactionCount(_) => "getTransactionCount",
        IMultisigCalls::transactions(_) => "transactions",
        IMultisigCalls::approved(_) => "approved",
        IMultisigCalls::submit(_) => "submit",
        IMultisigCalls::approve(_) => "approve",
        IMultisigCalls::execute(_) => "execute",
    }
}
