//! Contract state reads and their per-read status.

use core::fmt;

use std::collections::BTreeMap;

use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use evm_multisig_client::{ChainRpc, MultisigClient, MultisigClientError, TransactionRecord};
use evm_multisig_dashboard_domain::tx::{ContractTransaction, TxId};
use futures::future;

/// A value read from the chain, with its own loading flag, error and fetch time.
///
/// A failed read clears the value; a read in progress keeps the last one.
#[derive(Debug, Clone)]
pub struct Loadable<T> {
    value: Option<T>,
    error: Option<String>,
    loading: bool,
    fetched_at: Option<DateTime<Utc>>,
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Self { value: None, error: None, loading: false, fetched_at: None }
    }
}

impl<T> Loadable<T> {
    /// Returns the last successfully read value.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Returns the error of the last read.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns whether a read is in progress.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Returns when the last read completed.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub(crate) fn start(&mut self) {
        self.loading = true;
    }

    pub(crate) fn finish<E>(&mut self, result: Result<T, E>)
    where
        E: fmt::Display,
    {
        match result {
            Ok(value) => {
                self.value = Some(value);
                self.error = None;
            },
            Err(e) => {
                self.value = None;
                self.error = Some(e.to_string());
            },
        }

        self.loading = false;
        self.fetched_at = Some(Utc::now());
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

impl<T> Loadable<T>
where
    T: Copy,
{
    /// Returns a copy of the last successfully read value.
    pub fn get(&self) -> Option<T> {
        self.value
    }
}

/// Reads every transaction with an id below `count`. Fails as a whole if any read fails.
pub(crate) async fn read_transactions<R>(
    client: &MultisigClient<R>,
    count: u64,
) -> Result<Vec<ContractTransaction>, MultisigClientError>
where
    R: ChainRpc,
{
    let reads = (0..count).map(|tx_id| async move {
        let TransactionRecord { to, value, data, executed, num_approvals } =
            client.transaction(tx_id).await?;

        let tx = ContractTransaction::builder()
            .id(tx_id)
            .to(to)
            .value(value)
            .data(data)
            .executed(executed)
            .num_approvals(num_approvals)
            .build();

        Ok::<_, MultisigClientError>(tx)
    });

    future::try_join_all(reads).await
}

/// Reads whether `owner` approved each transaction with an id below `count`.
pub(crate) async fn read_approvals<R>(
    client: &MultisigClient<R>,
    count: u64,
    owner: Address,
) -> Result<BTreeMap<TxId, bool>, MultisigClientError>
where
    R: ChainRpc,
{
    let reads = (0..count).map(|tx_id| async move {
        client.approved(tx_id, owner).await.map(|approved| (TxId::from(tx_id), approved))
    });

    future::try_join_all(reads).await.map(BTreeMap::from_iter)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Bytes;
    use evm_multisig_test_utils::{MockChain, ether, random_address};

    use super::*;

    #[tokio::test]
    async fn reads_all_transactions_and_approvals() {
        let owners = vec![random_address(), random_address()];
        let chain = MockChain::builder().owners(owners.clone()).threshold(2).build();
        let client = MultisigClient::new(chain.rpc(), MockChain::CONTRACT);

        chain.push_transaction(random_address(), ether("0.1"), Bytes::new(), &owners[..1]);
        chain.push_transaction(random_address(), ether("0.2"), Bytes::new(), &[]);

        let txs = read_transactions(&client, 2).await.unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[1].id(), TxId::from(1));
        assert_eq!(txs[1].value(), ether("0.2"));

        let approvals = read_approvals(&client, 2, owners[0]).await.unwrap();
        assert_eq!(approvals.get(&TxId::from(0)), Some(&true));
        assert_eq!(approvals.get(&TxId::from(1)), Some(&false));
    }

    #[tokio::test]
    async fn transaction_batch_is_all_or_nothing() {
        let chain = MockChain::builder().owners(vec![random_address()]).threshold(1).build();
        let client = MultisigClient::new(chain.rpc(), MockChain::CONTRACT);

        chain.push_transaction(random_address(), ether("0.1"), Bytes::new(), &[]);

        // id 1 does not exist, so the whole batch fails
        assert!(read_transactions(&client, 2).await.is_err());
    }

    #[test]
    fn loadable_tracks_reads() {
        let mut threshold = Loadable::<u64>::default();
        assert!(threshold.fetched_at().is_none());

        threshold.start();
        assert!(threshold.is_loading());

        threshold.finish(Ok::<_, String>(2));
        assert_eq!(threshold.get(), Some(2));
        assert!(!threshold.is_loading());
        assert!(threshold.fetched_at().is_some());

        threshold.start();
        assert_eq!(threshold.get(), Some(2));

        threshold.finish(Err("execution reverted"));
        assert_eq!(threshold.get(), None);
        assert_eq!(threshold.error(), Some("execution reverted"));
    }
}
