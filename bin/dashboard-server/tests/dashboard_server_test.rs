use core::time::Duration;
use std::sync::Arc;

use alloy_primitives::{Address, Bytes};
use axum::{
    Router,
    body::{self, Body},
    http::{Request, StatusCode, header},
};
use evm_multisig_dashboard_engine::{Dashboard, DashboardEngine};
use evm_multisig_dashboard_server::App;
use evm_multisig_dashboard_store::InMemoryPreferenceStore;
use evm_multisig_test_utils::{MockChain, SEPOLIA_CHAIN_ID, ether, random_address};
use serde_json::{Value, json};
use tokio::runtime::Builder;
use tower::ServiceExt;

fn router(chain: &MockChain, signer: Address) -> Router {
    let rt = Builder::new_current_thread().enable_all().build().unwrap();
    let chain = chain.clone();

    let engine = DashboardEngine::new().start_dashboard_runtime_with(rt, move || {
        Dashboard::builder()
            .contract(MockChain::CONTRACT)
            .rpc(chain.rpc())
            .wallet(chain.wallet(signer))
            .prefs(InMemoryPreferenceStore::new())
            .receipt_poll_interval(Duration::from_millis(1))
            .build()
    });

    let app =
        App::builder().engine(Arc::new(engine)).wallet_connect_project_id("test-project").build();

    evm_multisig_dashboard_server::create_router(app)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

async fn post(router: &Router, uri: &str, payload: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    send(router, request).await
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, value)
}

fn two_of_three() -> (MockChain, Vec<Address>) {
    let owners: Vec<_> = (0..3).map(|_| random_address()).collect();
    let chain =
        MockChain::builder().owners(owners.clone()).threshold(2).balance(ether("1")).build();

    (chain, owners)
}

#[tokio::test]
async fn health_is_ok() {
    let (chain, owners) = two_of_three();
    let router = router(&chain, owners[0]);

    let (status, _) = get(&router, "/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn dashboard_is_served_with_the_project_id() {
    let (chain, owners) = two_of_three();
    chain.push_transaction(random_address(), ether("0.25"), Bytes::new(), &owners[..1]);
    let router = router(&chain, owners[0]);

    let (status, body) = get(&router, "/api/v1/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["wallet_connect_project_id"], "test-project");

    let dashboard = &body["dashboard"];
    assert_eq!(dashboard["title"], "2 of 3 Multisig Wallet");
    assert_eq!(dashboard["cards"]["balance"]["value"], "1 ETH");
    assert_eq!(dashboard["cards"]["transaction_count"]["value"], "1");
    assert_eq!(dashboard["transactions"]["rows"][0]["value_eth"], "0.25");
    assert_eq!(dashboard["transactions"]["rows"][0]["num_approvals"], "1");
    assert_eq!(dashboard["writes_disabled"], true);
}

#[tokio::test]
async fn writes_without_a_wallet_are_bad_requests() {
    let (chain, owners) = two_of_three();
    chain.push_transaction(random_address(), ether("0"), Bytes::new(), &[]);
    let router = router(&chain, owners[0]);

    let (status, body) = post(&router, "/api/v1/multisig-tx/approve", json!({ "tx_id": 0 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["outcome"]["status"], "rejected");
    assert_eq!(body["outcome"]["action"], "approve-0");
    assert_eq!(body["outcome"]["message"], "Connect wallet first.");
    assert_eq!(chain.call_count("sendTransaction"), 0);
}

#[tokio::test]
async fn connected_wallet_approves_and_executes() {
    let (chain, owners) = two_of_three();
    chain.push_transaction(random_address(), ether("0.5"), Bytes::new(), &owners[1..2]);
    let router = router(&chain, owners[0]);

    let (status, body) = post(&router, "/api/v1/wallet/connect", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"]["chain_id"], SEPOLIA_CHAIN_ID);
    assert_eq!(body["dashboard"]["writes_disabled"], false);

    let (status, body) =
        post(&router, "/api/v1/account/label", json!({ "label": "  treasury  " })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dashboard"]["session"]["display_name"], "treasury");

    let (status, body) = post(&router, "/api/v1/multisig-tx/approve", json!({ "tx_id": 0 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["status"], "settled");
    assert!(body["outcome"]["tx_hash"].is_string());
    assert_eq!(body["dashboard"]["transactions"]["rows"][0]["can_execute"], true);

    let (status, body) = post(&router, "/api/v1/multisig-tx/execute", json!({ "tx_id": 0 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dashboard"]["transactions"]["rows"][0]["executed"], true);
    assert_eq!(body["dashboard"]["cards"]["balance"]["value"], "0.5 ETH");

    let (status, body) = post(&router, "/api/v1/wallet/disconnect", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["dashboard"]["session"].is_null());
}

#[tokio::test]
async fn invalid_submit_is_a_bad_request() {
    let (chain, owners) = two_of_three();
    let router = router(&chain, owners[0]);
    post(&router, "/api/v1/wallet/connect", json!({})).await;

    let (status, body) = post(
        &router,
        "/api/v1/multisig-tx/submit",
        json!({ "to": "0x1234", "value_eth": "1" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["outcome"]["status"], "rejected");
    assert_eq!(body["dashboard"]["form"]["to"], "0x1234");
    assert_eq!(chain.call_count("sendTransaction"), 0);
}

#[tokio::test]
async fn second_write_while_one_is_pending_conflicts() {
    let (chain, owners) = two_of_three();
    chain.push_transaction(random_address(), ether("0"), Bytes::new(), &[]);
    let router = router(&chain, owners[0]);
    post(&router, "/api/v1/wallet/connect", json!({})).await;

    let gate = chain.hold_next_send();

    let ((approved, _), (submitted, body)) = tokio::join!(
        post(&router, "/api/v1/multisig-tx/approve", json!({ "tx_id": 0 })),
        async {
            loop {
                let (_, body) = get(&router, "/api/v1/dashboard").await;
                if !body["dashboard"]["action"]["pending"].is_null() {
                    break;
                }
                tokio::task::yield_now().await;
            }

            let submitted = post(
                &router,
                "/api/v1/multisig-tx/submit",
                json!({ "to": random_address().to_string(), "value_eth": "0" }),
            )
            .await;
            gate.notify_one();

            submitted
        },
    );

    assert_eq!(approved, StatusCode::OK);
    assert_eq!(submitted, StatusCode::CONFLICT);
    assert_eq!(body["outcome"]["status"], "busy");
    assert_eq!(body["outcome"]["action"], "submit");
    assert_eq!(body["outcome"]["message"], "approve-0 is still in flight");
    assert_eq!(chain.call_count("sendTransaction"), 1);
}

#[tokio::test]
async fn wallet_rejection_is_a_bad_gateway() {
    let (chain, owners) = two_of_three();
    chain.push_transaction(random_address(), ether("0"), Bytes::new(), &[]);
    let router = router(&chain, owners[0]);
    post(&router, "/api/v1/wallet/connect", json!({})).await;

    chain.reject_next_send("user rejected the request");

    let (status, body) = post(&router, "/api/v1/multisig-tx/approve", json!({ "tx_id": 0 })).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["outcome"]["status"], "failed");
    assert!(body["outcome"]["message"].as_str().unwrap().contains("user rejected the request"));
    assert_eq!(body["dashboard"]["action"]["phase"], "failed");
}

#[tokio::test]
async fn connection_failure_is_a_bad_gateway() {
    let (chain, owners) = two_of_three();
    chain.fail_connect("wallet unavailable");
    let router = router(&chain, owners[0]);

    let (status, body) = post(&router, "/api/v1/wallet/connect", json!({})).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["account"].is_null());
    assert!(body["error"].as_str().unwrap().contains("wallet unavailable"));
    assert!(body["dashboard"]["session"].is_null());
}

#[tokio::test]
async fn malformed_body_is_refused_by_the_extractor() {
    let (chain, owners) = two_of_three();
    let router = router(&chain, owners[0]);

    let (status, _) =
        post(&router, "/api/v1/multisig-tx/approve", json!({ "tx_id": "zero" })).await;
    assert!(status.is_client_error());
}
