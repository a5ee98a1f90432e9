//! # Configuration
//!
//! The server is configured through:
//! - Base configuration file (`base_config.ron`)
//! - Environment variables prefixed with `MULTISIGDASH_` (override base config)
//!
//! ## Base Configuration
//!
//! The default configuration is loaded from `base_config.ron`:
//!
//! ```ron
//! Config(
//!     app: AppConfig(
//!         listen: "localhost:59060",
//!         app_name: "Multisig Wallet",
//!         cors_allowed_origins: ["*"],
//!     ),
//!     chain: ChainConfig(
//!         chain_id: 11155111,
//!         name: "Sepolia",
//!         native_symbol: "ETH",
//!         rpc_url: "https://sepolia.drpc.org",
//!     ),
//!     multisig: MultisigConfig(
//!         address: None,
//!         owner_scan_cap: 50,
//!     ),
//!     wallet: WalletConfig(
//!         connector: "local-key",
//!         project_id: "c812fd95fcf20083cea0511cf754e963",
//!         private_key: None,
//!         rpc_url: None,
//!         receipt_poll_interval: "2s",
//!     ),
//!     prefs: PrefsConfig(
//!         path: "./preferences.json",
//!     ),
//! )
//! ```
//!
//! ## Environment Variable Overrides
//!
//! Use double underscores (`__`) to override nested configuration fields:
//!
//! ```bash
//! export MULTISIGDASH_APP__LISTEN="0.0.0.0:59060"
//! export MULTISIGDASH_APP__CORS_ALLOWED_ORIGINS='["http://localhost:3000"]'
//!
//! export MULTISIGDASH_MULTISIG__ADDRESS="0x5FbDB2315678afecb367f032d93F642f64180aa3"
//!
//! export MULTISIGDASH_WALLET__PRIVATE_KEY="0x..."
//! export MULTISIGDASH_WALLET__RECEIPT_POLL_INTERVAL="500ms"
//!
//! cargo run --bin evm-multisig-dashboard-server
//! ```
//!
//! Without `multisig.address` the dashboard starts in its misconfigured state: every card
//! stays empty and every write is refused. Without `wallet.private_key` no wallet can
//! connect.
//!
//! ## CORS Configuration
//!
//! - **Empty array `[]`**: CORS is disabled
//! - **Specific origins**: Only listed origins are allowed
//! - **Wildcard `["*"]`**: All origins are allowed (default for development)
//!
//! # Logging
//!
//! Logging is controlled via the `RUST_LOG` environment variable. Defaults to `info` level.
//!
//! Refused writes (4xx) are logged at `WARN`, failed writes and engine errors at `ERROR`.

use core::str::FromStr;

use axum::http::{HeaderValue, Method, header};
use evm_multisig_dashboard_domain::network::TargetNetwork;
use evm_multisig_dashboard_engine::{
    DashboardEngine, DashboardRuntimeConfig, WalletConfig, request::parse_address,
};
use evm_multisig_dashboard_server::{App, config};
use tokio::{net::TcpListener, runtime::Builder, task};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Subscriber, subscriber};
use tracing_subscriber::{EnvFilter, Registry, fmt::format::FmtSpan, layer::SubscriberExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = task::spawn_blocking(config::get_configuration).await??;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    subscriber::set_global_default(make_tracing_subscriber(env_filter))?;

    let app = {
        let network = TargetNetwork::builder()
            .chain_id(config.chain.chain_id)
            .name(config.chain.name)
            .native_symbol(config.chain.native_symbol)
            .build();

        let contract = config.multisig.address.as_deref().and_then(|address| {
            parse_address(address).or_else(|| {
                tracing::warn!("ignoring invalid multisig address: {address}");
                None
            })
        });

        let wallet = match config.wallet.private_key {
            Some(private_key) => Some(
                WalletConfig::builder()
                    .connector(config.wallet.connector)
                    .private_key(private_key)
                    .maybe_rpc_url(config.wallet.rpc_url.as_deref().map(str::parse).transpose()?)
                    .build(),
            ),
            None => None,
        };

        let dashboard_rt_config = DashboardRuntimeConfig::builder()
            .app_name(config.app.app_name)
            .network(network)
            .maybe_contract(contract)
            .rpc_url(config.chain.rpc_url.parse()?)
            .maybe_wallet(wallet)
            .prefs_path(config.prefs.path.into())
            .owner_scan_cap(config.multisig.owner_scan_cap)
            .receipt_poll_interval(config.wallet.receipt_poll_interval)
            .build();

        let rt = Builder::new_current_thread().enable_all().build()?;
        let engine = DashboardEngine::new().start_dashboard_runtime(rt, dashboard_rt_config);

        App::builder()
            .engine(engine.into())
            .wallet_connect_project_id(config.wallet.project_id)
            .build()
    };

    let axum_handle = {
        let router = evm_multisig_dashboard_server::create_router(app);
        let cors = create_cors_layer(&config.app.cors_allowed_origins)?;
        let router = router.layer(TraceLayer::new_for_http()).layer(cors);

        let listener = TcpListener::bind(&config.app.listen)
            .await
            .inspect(|_| tracing::info!("server listening at {}", config.app.listen))?;

        tokio::spawn(async { axum::serve(listener, router).await })
    };

    axum_handle.await??;

    Ok(())
}

fn create_cors_layer<S>(allowed_origins: &[S]) -> anyhow::Result<CorsLayer>
where
    S: AsRef<str>,
{
    if allowed_origins.iter().map(AsRef::as_ref).any(|s| s == "*") {
        return Ok(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .map(AsRef::as_ref)
        .map(FromStr::from_str)
        .collect::<Result<_, _>>()?;

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    Ok(cors)
}

fn make_tracing_subscriber(env_filter: EnvFilter) -> impl Subscriber {
    Registry::default()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_line_number(true)
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE),
        )
        .with(env_filter)
}
