//! Owner count discovery.
//!
//! The contract exposes its owners only as an indexed array, with no length accessor. The
//! count is found by probing `owners(0)`, `owners(1)`, ... until a read fails.

use evm_multisig_client::{ChainRpc, MultisigClient};

/// Default number of owner slots probed before giving up.
pub const DEFAULT_OWNER_SCAN_CAP: u64 = 50;

/// Result of an owner scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OwnerCount {
    /// Number of owner slots that could be read.
    pub count: u64,

    /// Whether the scan stopped at the cap, so the contract may have more owners.
    pub capped: bool,
}

impl OwnerCount {
    /// Note shown when the scan stopped at the cap.
    pub fn undercount_note(&self) -> Option<String> {
        self.capped.then(|| {
            format!("Owner scan stopped at {}; the contract may have more owners.", self.count)
        })
    }
}

/// Counts the owners of the contract by reading `owners(i)` for `i` in `0..cap`, one at a time.
///
/// The first failed read ends the scan. A transient RPC failure therefore reads as the end
/// of the owner list.
#[tracing::instrument(skip_all, fields(contract = %client.contract(), cap = cap))]
pub async fn discover_owner_count<R>(client: &MultisigClient<R>, cap: u64) -> OwnerCount
where
    R: ChainRpc,
{
    let mut count = 0;

    while count < cap {
        if let Err(e) = client.owner(count).await {
            tracing::debug!(index = count, "owner probe failed: {e}");
            break;
        }

        count += 1;
    }

    let owners = OwnerCount { count, capped: count == cap };

    if owners.capped {
        tracing::warn!(count, "owner scan reached its cap");
    }

    owners
}

#[cfg(test)]
mod tests {
    use evm_multisig_test_utils::{MockChain, random_address};

    use super::*;

    fn chain_with_owners(owners: usize) -> MockChain {
        MockChain::builder()
            .owners((0..owners).map(|_| random_address()).collect())
            .threshold(1)
            .build()
    }

    #[tokio::test]
    async fn stops_at_first_failed_probe() {
        for owners in [0, 1, 3, 7] {
            let chain = chain_with_owners(owners);
            let client = MultisigClient::new(chain.rpc(), MockChain::CONTRACT);

            let found = discover_owner_count(&client, DEFAULT_OWNER_SCAN_CAP).await;

            assert_eq!(found, OwnerCount { count: owners as u64, capped: false });
            assert_eq!(chain.call_count("owners"), owners + 1);
        }
    }

    #[tokio::test]
    async fn probe_failure_reads_as_end_of_list() {
        let chain = chain_with_owners(5);
        chain.fail_owner_probes_from(2);
        let client = MultisigClient::new(chain.rpc(), MockChain::CONTRACT);

        let found = discover_owner_count(&client, DEFAULT_OWNER_SCAN_CAP).await;

        assert_eq!(found.count, 2);
        assert!(found.undercount_note().is_none());
    }

    #[tokio::test]
    async fn never_exceeds_the_cap() {
        let chain = chain_with_owners(60);
        let client = MultisigClient::new(chain.rpc(), MockChain::CONTRACT);

        let found = discover_owner_count(&client, DEFAULT_OWNER_SCAN_CAP).await;

        assert_eq!(found, OwnerCount { count: 50, capped: true });
        assert_eq!(chain.call_count("owners"), 50);
        assert_eq!(
            found.undercount_note().as_deref(),
            Some("Owner scan stopped at 50; the contract may have more owners.")
        );

        let found = discover_owner_count(&client, 4).await;
        assert_eq!(found, OwnerCount { count: 4, capped: true });
    }

    #[tokio::test]
    async fn exactly_cap_owners_is_reported_as_capped() {
        let chain = chain_with_owners(3);
        let client = MultisigClient::new(chain.rpc(), MockChain::CONTRACT);

        assert_eq!(discover_owner_count(&client, 3).await, OwnerCount { count: 3, capped: true });
    }
}
