use std::borrow::Cow;

use alloy::primitives::TxHash;

/// Represents errors that can occur in the multisig client.
#[derive(Debug, thiserror::Error)]
pub enum MultisigClientError {
    /// The read endpoint failed.
    #[error("{0}")]
    Rpc(#[from] RpcError),

    /// The wallet refused or failed to broadcast a call.
    #[error("{0}")]
    Wallet(#[from] WalletError),

    /// A contract returned data that does not match the ABI.
    #[error("failed to decode {function} return data: {reason}")]
    Decode {
        /// Solidity signature of the called function.
        function: &'static str,
        /// Decoder message.
        reason: Cow<'static, str>,
    },

    /// A transaction was mined but its execution reverted.
    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    /// A contract value does not fit the client side representation.
    #[error("value out of range: {0}")]
    OutOfRange(Cow<'static, str>),
}

/// Error reported by a [`ChainRpc`](crate::ChainRpc) implementation.
///
/// The message is kept verbatim so it can be shown to the user as is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct RpcError(Cow<'static, str>);

/// Error reported by a [`WalletConnector`](crate::WalletConnector) implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    /// The request was declined, either by the signer or by the node (e.g. a revert during
    /// gas estimation).
    #[error("{0}")]
    Rejected(Cow<'static, str>),

    /// The wallet could not reach its endpoint.
    #[error("{0}")]
    Transport(Cow<'static, str>),

    /// The wallet is not configured with signing credentials.
    #[error("wallet is not configured: {0}")]
    NotConfigured(Cow<'static, str>),
}

impl RpcError {
    /// Creates an `RpcError` from any message.
    pub fn other<E>(err: E) -> Self
    where
        Cow<'static, str>: From<E>,
    {
        Self(err.into())
    }
}

impl WalletError {
    /// Creates a `Rejected` error.
    pub fn rejected<E>(err: E) -> Self
    where
        Cow<'static, str>: From<E>,
    {
        Self::Rejected(err.into())
    }

    /// Creates a `Transport` error.
    pub fn transport<E>(err: E) -> Self
    where
        Cow<'static, str>: From<E>,
    {
        Self::Transport(err.into())
    }

    /// Creates a `NotConfigured` error.
    pub fn not_configured<E>(err: E) -> Self
    where
        Cow<'static, str>: From<E>,
    {
        Self::NotConfigured(err.into())
    }
}

impl MultisigClientError {
    pub(crate) fn decode(function: &'static str, err: alloy_sol_types::Error) -> Self {
        Self::Decode { function, reason: err.to_string().into() }
    }

    pub(crate) fn out_of_range<E>(err: E) -> Self
    where
        Cow<'static, str>: From<E>,
    {
        Self::OutOfRange(err.into())
    }
}
