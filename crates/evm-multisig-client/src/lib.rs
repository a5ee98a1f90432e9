//! A client for interacting with an EVM multisig wallet contract.

pub mod abi;

mod error;
mod http;
mod rpc;

pub use self::{
    error::{MultisigClientError, RpcError, WalletError},
    http::{HttpChainRpc, LocalKeyWallet},
    rpc::{ChainRpc, ContractCall, TxReceipt, WalletAccount, WalletConnector},
};

use core::{ops::Deref, time::Duration};

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy_sol_types::SolCall;

use self::abi::IMultisig;

/// A transaction record as stored by the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    /// Destination of the transfer.
    pub to: Address,

    /// Value in wei.
    pub value: U256,

    /// Calldata forwarded on execution.
    pub data: Bytes,

    /// Whether the transaction has been executed.
    pub executed: bool,

    /// Number of owner approvals collected so far.
    pub num_approvals: U256,
}

/// A client for reading and writing a single multisig contract.
///
/// Reads go through the [`ChainRpc`] the client was built with; writes are encoded here and
/// handed to a [`WalletConnector`] for signing.
pub struct MultisigClient<R> {
    rpc: R,
    contract: Address,
}

impl<R> MultisigClient<R> {
    /// Construct a `MultisigClient` for the contract at `contract`.
    pub fn new(rpc: R, contract: Address) -> Self {
        Self { rpc, contract }
    }

    /// Returns the address of the multisig contract.
    pub fn contract(&self) -> Address {
        self.contract
    }

    /// Encodes a `submit(to, value, data)` call.
    pub fn submit_call(&self, to: Address, value: U256, data: Bytes) -> ContractCall {
        self.contract_call(IMultisig::submitCall { to, value, data })
    }

    /// Encodes an `approve(tx_id)` call.
    pub fn approve_call(&self, tx_id: u64) -> ContractCall {
        self.contract_call(IMultisig::approveCall { txId: U256::from(tx_id) })
    }

    /// Encodes an `execute(tx_id)` call.
    pub fn execute_call(&self, tx_id: u64) -> ContractCall {
        self.contract_call(IMultisig::executeCall { txId: U256::from(tx_id) })
    }

    fn contract_call<C>(&self, call: C) -> ContractCall
    where
        C: SolCall,
    {
        ContractCall { to: self.contract, input: call.abi_encode().into(), value: U256::ZERO }
    }
}

impl<R> MultisigClient<R>
where
    R: ChainRpc,
{
    /// Returns the owner stored at `index`.
    ///
    /// Fails once `index` runs past the owner list, since the contract reverts on an out of
    /// bounds array access.
    pub async fn owner(&self, index: u64) -> Result<Address, MultisigClientError> {
        self.read(IMultisig::ownersCall { index: U256::from(index) }).await
    }

    /// Returns the number of approvals required to execute a transaction.
    pub async fn threshold(&self) -> Result<U256, MultisigClientError> {
        self.read(IMultisig::thresholdCall {}).await
    }

    /// Returns the number of transactions ever submitted.
    pub async fn transaction_count(&self) -> Result<u64, MultisigClientError> {
        let count = self.read(IMultisig::getTransactionCountCall {}).await?;

        u64::try_from(count)
            .map_err(|_| MultisigClientError::out_of_range(format!("transaction count {count}")))
    }

    /// Returns the transaction stored under `tx_id`.
    pub async fn transaction(&self, tx_id: u64) -> Result<TransactionRecord, MultisigClientError> {
        let IMultisig::transactionsReturn { to, value, data, executed, numApprovals } =
            self.read(IMultisig::transactionsCall { txId: U256::from(tx_id) }).await?;

        Ok(TransactionRecord { to, value, data, executed, num_approvals: numApprovals })
    }

    /// Returns whether `owner` has approved `tx_id`.
    pub async fn approved(&self, tx_id: u64, owner: Address) -> Result<bool, MultisigClientError> {
        self.read(IMultisig::approvedCall { txId: U256::from(tx_id), owner }).await
    }

    /// Returns the native currency balance held by the contract.
    pub async fn balance(&self) -> Result<U256, MultisigClientError> {
        self.rpc.balance(self.contract).await.map_err(From::from)
    }

    /// Hands `call` to `wallet` for signing and broadcasting.
    #[tracing::instrument(skip_all, fields(connector = wallet.name(), contract = %self.contract))]
    pub async fn dispatch<W>(
        &self,
        wallet: &W,
        call: ContractCall,
    ) -> Result<TxHash, MultisigClientError>
    where
        W: WalletConnector,
    {
        let hash = wallet.send_transaction(call).await?;

        tracing::info!(%hash, "transaction broadcast");

        Ok(hash)
    }

    /// Polls for the receipt of `hash` every `poll_interval` until the transaction is mined.
    ///
    /// A mined transaction whose execution reverted is reported as
    /// [`MultisigClientError::Reverted`].
    #[tracing::instrument(skip(self))]
    pub async fn wait_for_confirmation(
        &self,
        hash: TxHash,
        poll_interval: Duration,
    ) -> Result<TxReceipt, MultisigClientError> {
        loop {
            match self.rpc.transaction_receipt(hash).await? {
                Some(receipt) if receipt.success => {
                    tracing::info!(block_number = ?receipt.block_number, "transaction confirmed");
                    return Ok(receipt);
                },
                Some(_) => return Err(MultisigClientError::Reverted(hash)),
                None => tokio::time::sleep(poll_interval).await,
            }
        }
    }

    async fn read<C>(&self, call: C) -> Result<C::Return, MultisigClientError>
    where
        C: SolCall,
    {
        let output = self.rpc.call(self.contract, call.abi_encode().into()).await?;

        C::abi_decode_returns(&output).map_err(|e| MultisigClientError::decode(C::SIGNATURE, e))
    }
}

impl<R> Deref for MultisigClient<R> {
    type Target = R;

    fn deref(&self) -> &Self::Target {
        &self.rpc
    }
}
