//! Process configuration from the environment.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use chrono_tz::Tz;

use crate::board::{BoardPolicy, parse_operator_list};

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BIND_HOST: &str = "0.0.0.0";
const DEFAULT_DATABASE_URL: &str = "sqlite:site.db?mode=rwc";
const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::London;

/// Errors reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is not a valid {expected}: {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{0} lists no operators")]
    EmptyOperatorList(&'static str),
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    /// Externally visible origin, used to build the OAuth redirect URI.
    /// Falls back to the request's `Host` header when unset.
    pub public_base_url: Option<String>,
    pub trmnl_client_id: String,
    pub trmnl_client_secret: String,
    pub transport_api_base_url: Option<String>,
    pub timezone: Tz,
    pub policy: BoardPolicy,
    /// Directory holding `bus.json` / `train.json` to serve in demo mode
    /// instead of the built-in boards.
    pub demo_data_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`; unset and blank values take
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(v) => v.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "port number",
                value: v,
            })?,
            None => DEFAULT_PORT,
        };

        let host = get("BIND_HOST").unwrap_or_else(|| DEFAULT_BIND_HOST.to_string());
        let ip: IpAddr = host.trim().parse().map_err(|_| ConfigError::Invalid {
            name: "BIND_HOST",
            expected: "IP address",
            value: host.clone(),
        })?;

        let timezone = match get("BOARD_TIMEZONE") {
            Some(v) => v.trim().parse::<Tz>().map_err(|_| ConfigError::Invalid {
                name: "BOARD_TIMEZONE",
                expected: "IANA time zone",
                value: v,
            })?,
            None => DEFAULT_TIMEZONE,
        };

        let mut policy = BoardPolicy::default();
        if let Some(v) = get("BUS_OPERATORS") {
            policy.bus_operators = operators("BUS_OPERATORS", &v)?;
        }
        if let Some(v) = get("TRAIN_OPERATORS") {
            policy.train_operators = operators("TRAIN_OPERATORS", &v)?;
        }
        if let Some(v) = get("DEFAULT_MIN_TRAIN_TIME") {
            let minutes = v
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|m| *m >= 0)
                .ok_or_else(|| ConfigError::Invalid {
                    name: "DEFAULT_MIN_TRAIN_TIME",
                    expected: "non-negative number of minutes",
                    value: v.clone(),
                })?;
            policy = policy.with_default_min_lead(minutes);
        }
        if let Some(v) = get("RESULT_CAP") {
            let cap = v
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|c| *c > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    name: "RESULT_CAP",
                    expected: "positive count",
                    value: v.clone(),
                })?;
            policy = policy.with_result_cap(cap);
        }

        Ok(Self {
            bind_addr: SocketAddr::new(ip, port),
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            public_base_url: get("PUBLIC_BASE_URL").map(|u| u.trim_end_matches('/').to_string()),
            trmnl_client_id: get("TRMNL_CLIENT_ID").unwrap_or_default(),
            trmnl_client_secret: get("TRMNL_CLIENT_SECRET").unwrap_or_default(),
            transport_api_base_url: get("TRANSPORT_API_BASE_URL"),
            timezone,
            policy,
            demo_data_dir: get("DEMO_DATA_DIR").map(|d| PathBuf::from(d.trim())),
        })
    }
}

fn operators(name: &'static str, value: &str) -> Result<Vec<String>, ConfigError> {
    let list = parse_operator_list(value);
    if list.is_empty() {
        return Err(ConfigError::EmptyOperatorList(name));
    }
    Ok(list)
}
