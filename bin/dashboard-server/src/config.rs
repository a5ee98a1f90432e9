//! Configuration management for the multisig dashboard server.
//!
//! This module provides configuration loading from both base configuration file
//! and environment variables. Environment variables override the base configuration
//! and use the prefix `MULTISIGDASH_`.

use core::time::Duration;

use config::{ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

/// Loads the application configuration from base config and environment variables.
///
/// Environment variables use double underscores `__` to denote nested keys.
/// For example, `MULTISIGDASH_MULTISIG__ADDRESS` corresponds to `multisig.address`.
///
/// # Errors
///
/// If the configuration could not be loaded or parsed
pub fn get_configuration() -> Result<Config, ConfigError> {
    config::Config::builder()
        .add_source(File::from_str(include_str!("base_config.ron"), FileFormat::Ron))
        .add_source(
            Environment::with_prefix(Config::CONFIG_ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize()
}

/// Root configuration structure containing all application settings.
#[derive(Deserialize)]
pub struct Config {
    /// Application-specific configuration
    pub app: AppConfig,

    /// The network hosting the multisig contract
    pub chain: ChainConfig,

    /// The multisig contract
    pub multisig: MultisigConfig,

    /// The wallet connector
    pub wallet: WalletConfig,

    /// Local preferences
    pub prefs: PrefsConfig,
}

/// Application-specific configuration settings.
#[derive(Deserialize)]
pub struct AppConfig {
    /// The address to listen on (e.g., "0.0.0.0:59060")
    pub listen: String,

    /// Name shown by the dashboard
    pub app_name: String,

    /// CORS allowed origins (e.g., ["http://localhost:3000", "https://example.com"])
    /// Use ["*"] to allow all origins
    pub cors_allowed_origins: Vec<String>,
}

/// Target network configuration settings.
#[derive(Deserialize)]
pub struct ChainConfig {
    /// EIP-155 chain id writes are allowed on
    pub chain_id: u64,

    /// Display name of the network
    pub name: String,

    /// Symbol of the native currency
    pub native_symbol: String,

    /// JSON-RPC endpoint used for reads
    pub rpc_url: String,
}

/// Multisig contract configuration settings.
#[derive(Deserialize)]
pub struct MultisigConfig {
    /// Address of the deployed contract. A missing or malformed address leaves the
    /// dashboard in its misconfigured state.
    pub address: Option<String>,

    /// Number of owner slots probed before the owner count is reported as capped
    pub owner_scan_cap: u64,
}

/// Wallet connector configuration settings.
#[derive(Deserialize)]
pub struct WalletConfig {
    /// Name the connector is reported under
    pub connector: String,

    /// WalletConnect project id, exposed to browser front ends
    pub project_id: String,

    /// Hex private key of the local signer. Without one, no wallet can connect.
    pub private_key: Option<String>,

    /// JSON-RPC endpoint the wallet broadcasts to. Defaults to `chain.rpc_url`.
    pub rpc_url: Option<String>,

    /// Interval between receipt lookups while a write waits for confirmation
    #[serde(with = "humantime_serde")]
    pub receipt_poll_interval: Duration,
}

/// Local preference storage settings.
#[derive(Deserialize)]
pub struct PrefsConfig {
    /// Path of the JSON preference file
    pub path: String,
}

impl Config {
    const CONFIG_ENV_PREFIX: &str = "MULTISIGDASH";
}
