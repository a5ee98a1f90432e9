//! JSON-RPC over HTTP implementations of the chain seams, backed by alloy providers.

use alloy::{
    network::{EthereumWallet, ReceiptResponse, TransactionBuilder},
    primitives::{Address, Bytes, TxHash, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use url::Url;

use crate::{
    error::{RpcError, WalletError},
    rpc::{ChainRpc, ContractCall, TxReceipt, WalletAccount, WalletConnector},
};

/// Read client bound to a single HTTP endpoint.
#[derive(Clone)]
pub struct HttpChainRpc {
    provider: DynProvider,
}

/// Wallet connector signing with a locally held private key.
///
/// It broadcasts through its own endpoint, which may point at a different chain than the
/// read client. That is what the dashboard reports as a network mismatch.
#[derive(Clone)]
pub struct LocalKeyWallet {
    name: String,
    address: Address,
    provider: DynProvider,
}

impl HttpChainRpc {
    /// Creates a read client for `rpc_url`.
    pub fn new(rpc_url: Url) -> Self {
        let provider = ProviderBuilder::new().connect_http(rpc_url).erased();
        Self { provider }
    }
}

impl LocalKeyWallet {
    /// Creates a connector named `name` that signs with `private_key` (hex, optionally
    /// `0x`-prefixed) and broadcasts to `rpc_url`.
    pub fn new<N>(name: N, private_key: &str, rpc_url: Url) -> Result<Self, WalletError>
    where
        N: Into<String>,
    {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|e| WalletError::not_configured(format!("invalid private key: {e}")))?;

        let address = signer.address();

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(rpc_url)
            .erased();

        Ok(Self { name: name.into(), address, provider })
    }

    /// Returns the signing address.
    pub fn address(&self) -> Address {
        self.address
    }
}

impl ChainRpc for HttpChainRpc {
    async fn chain_id(&self) -> Result<u64, RpcError> {
        self.provider.get_chain_id().await.map_err(|e| RpcError::other(e.to_string()))
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, RpcError> {
        let tx = TransactionRequest::default().with_to(to).with_input(input);

        self.provider.call(tx).await.map_err(|e| RpcError::other(e.to_string()))
    }

    async fn balance(&self, address: Address) -> Result<U256, RpcError> {
        self.provider.get_balance(address).await.map_err(|e| RpcError::other(e.to_string()))
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<TxReceipt>, RpcError> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| RpcError::other(e.to_string()))?;

        Ok(receipt.map(|receipt| TxReceipt {
            hash,
            block_number: ReceiptResponse::block_number(&receipt),
            success: ReceiptResponse::status(&receipt),
        }))
    }
}

impl WalletConnector for LocalKeyWallet {
    fn name(&self) -> &str {
        &self.name
    }

    #[tracing::instrument(skip_all, fields(connector = %self.name, address = %self.address))]
    async fn connect(&self) -> Result<WalletAccount, WalletError> {
        let chain_id = self.chain_id().await?;

        Ok(WalletAccount { address: self.address, chain_id })
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        self.provider.get_chain_id().await.map_err(|e| WalletError::transport(e.to_string()))
    }

    #[tracing::instrument(skip_all, fields(connector = %self.name, to = %call.to))]
    async fn send_transaction(&self, call: ContractCall) -> Result<TxHash, WalletError> {
        let ContractCall { to, input, value } = call;

        let tx = TransactionRequest::default()
            .with_from(self.address)
            .with_to(to)
            .with_input(input)
            .with_value(value);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| WalletError::rejected(e.to_string()))?;

        Ok(*pending.tx_hash())
    }
}
