//! Seams between the multisig client and the chain.
//!
//! [`ChainRpc`] is the read side bound to the target network, [`WalletConnector`] the write side
//! that signs and broadcasts on behalf of the connected account. Both are used from a
//! single-threaded `LocalSet`, so their futures are not required to be `Send`.

#![allow(async_fn_in_trait)]

use alloy::primitives::{Address, Bytes, TxHash, U256};

use crate::error::{RpcError, WalletError};

/// Read access to the target network.
pub trait ChainRpc {
    /// Returns the chain id of the endpoint.
    async fn chain_id(&self) -> Result<u64, RpcError>;

    /// Executes a read-only `eth_call` against `to` and returns the raw output.
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, RpcError>;

    /// Returns the native currency balance of `address` in wei.
    async fn balance(&self, address: Address) -> Result<U256, RpcError>;

    /// Looks up the receipt of a broadcast transaction, `None` while it is not yet mined.
    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<TxReceipt>, RpcError>;
}

/// A wallet able to sign and broadcast contract calls.
pub trait WalletConnector {
    /// Human readable connector name, e.g. `local-key`.
    fn name(&self) -> &str;

    /// Connects the wallet and returns the account it signs for.
    async fn connect(&self) -> Result<WalletAccount, WalletError>;

    /// Returns the chain the wallet is currently pointed at.
    async fn chain_id(&self) -> Result<u64, WalletError>;

    /// Signs and broadcasts `call`, returning the transaction hash.
    async fn send_transaction(&self, call: ContractCall) -> Result<TxHash, WalletError>;
}

/// The account a connected wallet signs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletAccount {
    /// Signing address.
    pub address: Address,

    /// Active chain of the wallet at connection time.
    pub chain_id: u64,
}

/// An encoded, not yet signed, call to a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    /// The contract being called.
    pub to: Address,

    /// ABI encoded calldata.
    pub input: Bytes,

    /// Native value attached to the call.
    pub value: U256,
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    /// Hash of the transaction.
    pub hash: TxHash,

    /// Block the transaction was included in, if reported.
    pub block_number: Option<u64>,

    /// Whether execution succeeded.
    pub success: bool,
}

impl<T> ChainRpc for &T
where
    T: ChainRpc + ?Sized,
{
    async fn chain_id(&self) -> Result<u64, RpcError> {
        (**self).chain_id().await
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, RpcError> {
        (**self).call(to, input).await
    }

    async fn balance(&self, address: Address) -> Result<U256, RpcError> {
        (**self).balance(address).await
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<TxReceipt>, RpcError> {
        (**self).transaction_receipt(hash).await
    }
}

impl<T> WalletConnector for &T
where
    T: WalletConnector + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn connect(&self) -> Result<WalletAccount, WalletError> {
        (**self).connect().await
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        (**self).chain_id().await
    }

    async fn send_transaction(&self, call: ContractCall) -> Result<TxHash, WalletError> {
        (**self).send_transaction(call).await
    }
}
