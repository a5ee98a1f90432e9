use core::time::Duration;

use alloy_primitives::{Address, Bytes};
use evm_multisig_dashboard_domain::{action::ActionTag, tx::TxId};
use evm_multisig_dashboard_engine::{
    Dashboard, DashboardEngine, Started,
    request::{
        ApproveMultisigTxRequest, ExecuteMultisigTxRequest, SetAccountLabelRequest,
        SubmitMultisigTxRequest,
    },
    response::ActionOutcome,
};
use evm_multisig_dashboard_store::InMemoryPreferenceStore;
use evm_multisig_test_utils::{MockChain, ether, random_address};
use tokio::runtime::Builder;

fn start(chain: &MockChain, signer: Address) -> DashboardEngine<Started> {
    let rt = Builder::new_current_thread().enable_all().build().unwrap();
    let chain = chain.clone();

    DashboardEngine::new().start_dashboard_runtime_with(rt, move || {
        Dashboard::builder()
            .app_name("Test Wallet")
            .contract(MockChain::CONTRACT)
            .rpc(chain.rpc())
            .wallet(chain.wallet(signer))
            .prefs(InMemoryPreferenceStore::new())
            .receipt_poll_interval(Duration::from_millis(1))
            .build()
    })
}

#[tokio::test]
async fn runs_the_dashboard_behind_messages() {
    let owners: Vec<_> = (0..3).map(|_| random_address()).collect();
    let chain =
        MockChain::builder().owners(owners.clone()).threshold(2).balance(ether("1")).build();
    chain.push_transaction(random_address(), ether("0.5"), Bytes::new(), &owners[1..2]);

    let engine = start(&chain, owners[0]);

    // the dashboard is loaded before the first message is answered
    let view = engine.get_dashboard().await.unwrap();
    assert_eq!(view.title, "2 of 3 Multisig Wallet");
    assert_eq!(view.app_name, "Test Wallet");
    assert!(view.session.is_none());

    let connected = engine.connect_wallet().await.unwrap();
    assert_eq!(connected.result().map(|account| account.address()), Ok(owners[0]));
    assert!(!connected.view().writes_disabled);

    let view = engine
        .set_account_label(SetAccountLabelRequest::builder().label(" signer one ").build())
        .await
        .unwrap();
    assert_eq!(view.session.unwrap().display_name, "signer one");

    let response = engine
        .approve_multisig_tx(ApproveMultisigTxRequest::builder().tx_id(0_u64).build())
        .await
        .unwrap();
    assert!(matches!(response.outcome(), ActionOutcome::Settled { .. }));
    assert!(response.view().transactions.rows[0].can_execute);

    let response = engine
        .execute_multisig_tx(ExecuteMultisigTxRequest::builder().tx_id(0_u64).build())
        .await
        .unwrap();
    assert!(matches!(response.outcome(), ActionOutcome::Settled { .. }));
    assert!(response.view().transactions.rows[0].executed);
    assert_eq!(response.view().cards.balance.value, "0.5 ETH");

    let view = engine.disconnect_wallet().await.unwrap();
    assert!(view.session.is_none());
    assert!(view.writes_disabled);

    engine.stop_dashboard_runtime().await.unwrap();
}

#[tokio::test]
async fn snapshots_are_served_while_an_action_waits_for_its_signature() {
    let owners: Vec<_> = (0..2).map(|_| random_address()).collect();
    let chain = MockChain::builder().owners(owners.clone()).threshold(1).build();
    chain.push_transaction(random_address(), ether("0"), Bytes::new(), &[]);

    let engine = start(&chain, owners[0]);
    engine.connect_wallet().await.unwrap();

    let gate = chain.hold_next_send();

    let (approved, (submitted, during)) = tokio::join!(
        engine.approve_multisig_tx(ApproveMultisigTxRequest::builder().tx_id(0_u64).build()),
        async {
            let form = SubmitMultisigTxRequest::builder()
                .to(random_address().to_string())
                .value_eth("1")
                .build();

            let submitted = engine.submit_multisig_tx(form).await.unwrap();
            let during = engine.get_dashboard().await.unwrap();
            gate.notify_one();

            (submitted, during)
        },
    );

    assert_eq!(
        submitted.outcome(),
        &ActionOutcome::Busy { tag: ActionTag::Submit, pending: ActionTag::Approve(TxId::from(0)) }
    );
    assert_eq!(during.action.pending.as_deref(), Some("approve-0"));
    assert_eq!(during.transactions.rows[0].approve_label, "Approving...");

    let approved = approved.unwrap();
    assert!(matches!(approved.outcome(), ActionOutcome::Settled { .. }));
    assert!(approved.view().action.pending.is_none());
    assert_eq!(chain.call_count("sendTransaction"), 1);

    engine.stop_dashboard_runtime().await.unwrap();
}

#[tokio::test]
async fn refresh_picks_up_external_changes() {
    let owners: Vec<_> = (0..2).map(|_| random_address()).collect();
    let chain = MockChain::builder().owners(owners.clone()).threshold(1).build();

    let engine = start(&chain, owners[0]);
    assert!(engine.get_dashboard().await.unwrap().transactions.rows.is_empty());

    chain.push_transaction(random_address(), ether("0.1"), Bytes::new(), &owners[1..]);

    let view = engine.refresh().await.unwrap();
    assert_eq!(view.transactions.rows.len(), 1);
    assert_eq!(view.transactions.rows[0].value_eth, "0.1");
    assert_eq!(view.cards.transaction_count.value, "1");

    engine.stop_dashboard_runtime().await.unwrap();
}
