use core::time::Duration;

use alloy::primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use evm_multisig_client::{MultisigClient, MultisigClientError, TransactionRecord, WalletError, abi};
use evm_multisig_test_utils::{MockChain, ether, random_address};

fn setup(owners: usize, threshold: u64) -> (MockChain, Vec<Address>) {
    let owners: Vec<Address> = (0..owners).map(|_| random_address()).collect();

    let chain = MockChain::builder()
        .owners(owners.clone())
        .threshold(threshold)
        .balance(ether("1"))
        .build();

    (chain, owners)
}

#[tokio::test]
async fn reads_contract_state() {
    let (chain, owners) = setup(3, 2);
    let client = MultisigClient::new(chain.rpc(), MockChain::CONTRACT);

    assert_eq!(client.owner(0).await.unwrap(), owners[0]);
    assert_eq!(client.owner(2).await.unwrap(), owners[2]);
    assert!(client.owner(3).await.is_err());

    assert_eq!(client.threshold().await.unwrap(), U256::from(2));
    assert_eq!(client.balance().await.unwrap(), ether("1"));
    assert_eq!(client.transaction_count().await.unwrap(), 0);
}

#[tokio::test]
async fn reads_transactions_and_approvals() {
    let (chain, owners) = setup(2, 2);
    let client = MultisigClient::new(chain.rpc(), MockChain::CONTRACT);

    let to = random_address();
    let tx_id = chain.push_transaction(to, ether("0.25"), Bytes::from_static(&[0xab]), &owners[..1]);

    assert_eq!(client.transaction_count().await.unwrap(), 1);

    let record = client.transaction(tx_id).await.unwrap();
    assert_eq!(record, TransactionRecord {
        to,
        value: ether("0.25"),
        data: Bytes::from_static(&[0xab]),
        executed: false,
        num_approvals: U256::from(1),
    });

    assert!(client.approved(tx_id, owners[0]).await.unwrap());
    assert!(!client.approved(tx_id, owners[1]).await.unwrap());
    assert!(client.transaction(tx_id + 1).await.is_err());
}

#[tokio::test]
async fn read_failures_are_surfaced_verbatim() {
    let (chain, _) = setup(1, 1);
    let client = MultisigClient::new(chain.rpc(), MockChain::CONTRACT);

    chain.fail_reads(Some("connection refused"));

    let err = client.threshold().await.unwrap_err();
    assert!(matches!(err, MultisigClientError::Rpc(_)));
    assert_eq!(err.to_string(), "connection refused");
}

#[tokio::test]
async fn wrong_contract_address_fails_to_read() {
    let (chain, _) = setup(1, 1);
    let client = MultisigClient::new(chain.rpc(), random_address());

    assert!(client.threshold().await.is_err());
}

#[tokio::test]
async fn encodes_write_calls() {
    let client = MultisigClient::new((), MockChain::CONTRACT);
    let to = random_address();

    let call = client.submit_call(to, ether("0.1"), Bytes::new());
    assert_eq!(call.to, MockChain::CONTRACT);
    assert_eq!(call.value, U256::ZERO);

    let decoded = abi::IMultisig::submitCall::abi_decode(&call.input).unwrap();
    assert_eq!(decoded.to, to);
    assert_eq!(decoded.value, ether("0.1"));
    assert!(decoded.data.is_empty());

    let decoded = abi::IMultisig::approveCall::abi_decode(&client.approve_call(7).input).unwrap();
    assert_eq!(decoded.txId, U256::from(7));

    let decoded = abi::IMultisig::executeCall::abi_decode(&client.execute_call(3).input).unwrap();
    assert_eq!(decoded.txId, U256::from(3));
}

#[tokio::test]
async fn submit_approve_execute_flow() {
    let (chain, owners) = setup(2, 2);
    let client = MultisigClient::new(chain.rpc(), MockChain::CONTRACT);
    let wallet_a = chain.wallet(owners[0]);
    let wallet_b = chain.wallet(owners[1]);
    let poll = Duration::from_millis(1);

    let to = random_address();
    let hash = client
        .dispatch(&wallet_a, client.submit_call(to, ether("0.4"), Bytes::new()))
        .await
        .unwrap();
    let receipt = client.wait_for_confirmation(hash, poll).await.unwrap();
    assert_eq!(receipt.hash, hash);
    assert_eq!(client.transaction_count().await.unwrap(), 1);

    for wallet in [&wallet_a, &wallet_b] {
        let hash = client.dispatch(wallet, client.approve_call(0)).await.unwrap();
        client.wait_for_confirmation(hash, poll).await.unwrap();
    }

    let hash = client.dispatch(&wallet_b, client.execute_call(0)).await.unwrap();
    client.wait_for_confirmation(hash, poll).await.unwrap();

    let record = client.transaction(0).await.unwrap();
    assert!(record.executed);
    assert_eq!(record.num_approvals, U256::from(2));
    assert_eq!(client.balance().await.unwrap(), ether("0.6"));
}

#[tokio::test]
async fn rejected_send_is_reported_as_wallet_error() {
    let (chain, owners) = setup(1, 1);
    let client = MultisigClient::new(chain.rpc(), MockChain::CONTRACT);
    let wallet = chain.wallet(owners[0]);

    chain.reject_next_send("User rejected the request.");

    let err = client.dispatch(&wallet, client.approve_call(0)).await.unwrap_err();
    assert!(matches!(err, MultisigClientError::Wallet(WalletError::Rejected(_))));
    assert_eq!(err.to_string(), "User rejected the request.");

    // the contract itself refuses approvals of unknown transactions
    let err = client.dispatch(&wallet, client.approve_call(0)).await.unwrap_err();
    assert_eq!(err.to_string(), "execution reverted: tx does not exist");
}

#[tokio::test]
async fn reverted_receipt_fails_confirmation() {
    let (chain, owners) = setup(1, 1);
    let client = MultisigClient::new(chain.rpc(), MockChain::CONTRACT);
    let wallet = chain.wallet(owners[0]);

    chain.revert_next_receipt();

    let hash = client
        .dispatch(&wallet, client.submit_call(random_address(), U256::ZERO, Bytes::new()))
        .await
        .unwrap();

    let err = client.wait_for_confirmation(hash, Duration::from_millis(1)).await.unwrap_err();
    assert!(matches!(err, MultisigClientError::Reverted(reverted) if reverted == hash));
    assert_eq!(client.transaction_count().await.unwrap(), 0);
}
