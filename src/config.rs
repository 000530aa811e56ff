// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup. Invalid values
//! are reported as [`ConfigError`] rather than silently replaced.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HYPERDRIVE_NETWORK` | Network (`mainnet`, `hoodi`, `hoodi-dev`) | `mainnet` |
//! | `NODESET_API_URL` | Override for the network's NodeSet API URL | Per network |
//! | `CLIENT_TIMEOUT_SECS` | Timeout for each NodeSet HTTP request | `30` |
//! | `HOST` | Daemon API bind address | `127.0.0.1` |
//! | `PORT` | Daemon API bind port | `8080` |
//! | `WALLET_KEY_PATH` | Node key file (PEM or hex) loaded at startup | Unset |
//! | `NODE_ADDRESS` | Node address to use when no key is loaded | Unset |
//! | `REGISTRATION_CHECK_INTERVAL_SECS` | Registration watcher interval | `15` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;
use url::Url;

/// Environment variable selecting the network.
pub const NETWORK_ENV: &str = "HYPERDRIVE_NETWORK";

/// Environment variable overriding the NodeSet API URL.
///
/// Used for local development against a mock or staging server.
pub const NODESET_API_URL_ENV: &str = "NODESET_API_URL";

pub const CLIENT_TIMEOUT_ENV: &str = "CLIENT_TIMEOUT_SECS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable for the node key file.
///
/// The file holds either a PEM private key (SEC1 or PKCS#8) or a hex key.
pub const WALLET_KEY_PATH_ENV: &str = "WALLET_KEY_PATH";

/// Environment variable for a read-only node address.
///
/// Ignored when a key file is configured; the key's address wins.
pub const NODE_ADDRESS_ENV: &str = "NODE_ADDRESS";

pub const REGISTRATION_CHECK_INTERVAL_ENV: &str = "REGISTRATION_CHECK_INTERVAL_SECS";

/// Environment variable for the log format (`json` or `pretty`).
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_REGISTRATION_CHECK_INTERVAL: Duration = Duration::from_secs(15);

const PRODUCTION_NODESET_URL: &str = "https://nodeset.io/api";
const STAGING_NODESET_URL: &str = "https://staging.nodeset.io/api";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

impl ConfigError {
    fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            name,
            message: message.into(),
        }
    }
}

/// Networks the daemon can run on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Network {
    #[default]
    Mainnet,
    Hoodi,
    /// Hoodi against the NodeSet staging server.
    HoodiDev,
}

impl Network {
    /// NodeSet API URL for the network.
    pub fn nodeset_api_url(self) -> &'static str {
        match self {
            Self::Mainnet | Self::Hoodi => PRODUCTION_NODESET_URL,
            Self::HoodiDev => STAGING_NODESET_URL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Hoodi => "hoodi",
            Self::HoodiDev => "hoodi-dev",
        }
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "hoodi" => Ok(Self::Hoodi),
            "hoodi-dev" => Ok(Self::HoodiDev),
            other => Err(ConfigError::invalid(
                NETWORK_ENV,
                format!("unknown network '{other}'"),
            )),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Resolved daemon configuration.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub network: Network,
    pub nodeset_api_url: Url,
    pub client_timeout: Duration,
    pub bind_addr: SocketAddr,
    pub wallet_key_path: Option<PathBuf>,
    pub node_address: Option<Address>,
    pub registration_check_interval: Duration,
    pub log_format: LogFormat,
}

impl DaemonConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let network = match var(NETWORK_ENV) {
            Some(value) => value.parse()?,
            None => Network::default(),
        };

        let raw_url = var(NODESET_API_URL_ENV).unwrap_or_else(|| network.nodeset_api_url().to_string());
        let nodeset_api_url = Url::parse(raw_url.trim())
            .map_err(|e| ConfigError::invalid(NODESET_API_URL_ENV, format!("{raw_url}: {e}")))?;
        if !matches!(nodeset_api_url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                NODESET_API_URL_ENV,
                format!("unsupported scheme '{}'", nodeset_api_url.scheme()),
            ));
        }

        let client_timeout = match var(CLIENT_TIMEOUT_ENV) {
            Some(value) => Duration::from_secs(parse_positive(CLIENT_TIMEOUT_ENV, &value)?),
            None => DEFAULT_CLIENT_TIMEOUT,
        };

        let host: IpAddr = match var(HOST_ENV) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(HOST_ENV, format!("{value}: {e}")))?,
            None => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };
        let port: u16 = match var(PORT_ENV) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(PORT_ENV, format!("{value}: {e}")))?,
            None => DEFAULT_PORT,
        };

        let node_address = var(NODE_ADDRESS_ENV)
            .map(|value| {
                value
                    .trim()
                    .parse::<Address>()
                    .map_err(|e| ConfigError::invalid(NODE_ADDRESS_ENV, format!("{value}: {e}")))
            })
            .transpose()?;

        let registration_check_interval = match var(REGISTRATION_CHECK_INTERVAL_ENV) {
            Some(value) => Duration::from_secs(parse_positive(REGISTRATION_CHECK_INTERVAL_ENV, &value)?),
            None => DEFAULT_REGISTRATION_CHECK_INTERVAL,
        };

        let log_format = match var(LOG_FORMAT_ENV).map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "json" => LogFormat::Json,
            Some(v) if v == "pretty" => LogFormat::Pretty,
            Some(other) => {
                return Err(ConfigError::invalid(
                    LOG_FORMAT_ENV,
                    format!("expected 'json' or 'pretty', got '{other}'"),
                ));
            }
            None => LogFormat::default(),
        };

        Ok(Self {
            network,
            nodeset_api_url,
            client_timeout,
            bind_addr: SocketAddr::new(host, port),
            wallet_key_path: var(WALLET_KEY_PATH_ENV).map(PathBuf::from),
            node_address,
            registration_check_interval,
            log_format,
        })
    }
}

fn parse_positive(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::invalid(name, "must be greater than zero")),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::invalid(name, format!("{value}: {e}"))),
    }
}
