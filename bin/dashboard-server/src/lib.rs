#![allow(missing_docs)]

pub mod config;

mod error;
mod payload;
mod routes;

use std::sync::Arc;

use axum::{Router, routing};
use bon::Builder;
use dissolve_derive::Dissolve;
use evm_multisig_dashboard_engine::{DashboardEngine, Started};

pub fn create_router(app: App) -> Router {
    Router::new()
        .route("/health", routing::get(routes::health))
        .route("/api/v1/dashboard", routing::get(routes::get_dashboard))
        .route("/api/v1/dashboard/refresh", routing::post(routes::refresh_dashboard))
        .route("/api/v1/wallet/connect", routing::post(routes::connect_wallet))
        .route("/api/v1/wallet/disconnect", routing::post(routes::disconnect_wallet))
        .route("/api/v1/account/label", routing::post(routes::set_account_label))
        .route("/api/v1/multisig-tx/submit", routing::post(routes::submit_multisig_tx))
        .route("/api/v1/multisig-tx/approve", routing::post(routes::approve_multisig_tx))
        .route("/api/v1/multisig-tx/execute", routing::post(routes::execute_multisig_tx))
        .with_state(app)
}

#[derive(Clone, Builder, Dissolve)]
pub struct App {
    engine: Arc<DashboardEngine<Started>>,

    /// WalletConnect project id handed to browser front ends.
    #[builder(into)]
    wallet_connect_project_id: Arc<str>,
}
