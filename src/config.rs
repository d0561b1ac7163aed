//! Environment-sourced configuration, validated at startup.
//!
//! Required values missing at startup are fatal — the process exits
//! before serving traffic. Lookup is injected as a closure so tests
//! can feed a plain map instead of racing on process-global env vars.

use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::types::ScoutError;

pub const ENV_RPC_URL: &str = "AUCTION_RPC_URL";
pub const ENV_RPC_USER: &str = "AUCTION_RPC_USER";
pub const ENV_RPC_PASSWORD: &str = "AUCTION_RPC_PASSWORD";
pub const ENV_PORT: &str = "AUCTION_PORT";
pub const ENV_COOLDOWN_MS: &str = "AUCTION_COOLDOWN_MS";
pub const ENV_MIN_DIFF: &str = "AUCTION_MIN_DIFF";
pub const ENV_MAX_BID: &str = "AUCTION_MAX_BID";
pub const ENV_LOG_DIR: &str = "AUCTION_LOG_DIR";

const DEFAULT_LOG_DIR: &str = "logs";

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// DeFiChain node JSON-RPC endpoint.
    pub rpc_url: String,
    /// Optional basic-auth credentials for the node.
    pub rpc_auth: Option<(String, String)>,
    /// HTTP listen port.
    pub port: u16,
    /// Pause between successive auction batches.
    pub cooldown: Duration,
    /// Strict-policy knob: minimum absolute profit in DUSD.
    pub min_diff: Option<Decimal>,
    /// Strict-policy knob: maximum starting bid in DUSD.
    pub max_bid: Option<Decimal>,
    /// Directory for the per-run log file.
    pub log_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ScoutError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary name→value lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ScoutError> {
        let rpc_url = get(ENV_RPC_URL).ok_or(ScoutError::ConfigMissing(ENV_RPC_URL))?;

        let rpc_auth = match get(ENV_RPC_USER) {
            Some(user) => {
                let password =
                    get(ENV_RPC_PASSWORD).ok_or(ScoutError::ConfigMissing(ENV_RPC_PASSWORD))?;
                Some((user, password))
            }
            None => None,
        };

        let port: u16 = parse_required(&get, ENV_PORT)?;
        let cooldown_ms: u64 = parse_required(&get, ENV_COOLDOWN_MS)?;

        Ok(AppConfig {
            rpc_url,
            rpc_auth,
            port,
            cooldown: Duration::from_millis(cooldown_ms),
            min_diff: parse_optional(&get, ENV_MIN_DIFF)?,
            max_bid: parse_optional(&get, ENV_MAX_BID)?,
            log_dir: get(ENV_LOG_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
        })
    }
}

fn parse_required<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<T, ScoutError>
where
    T::Err: std::fmt::Display,
{
    parse_optional(get, name)?.ok_or(ScoutError::ConfigMissing(name))
}

fn parse_optional<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ScoutError>
where
    T::Err: std::fmt::Display,
{
    match get(name) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|e| ScoutError::ConfigInvalid {
            name,
            reason: format!("{raw:?}: {e}"),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ScoutError> {
        let map = env(pairs);
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_minimal_config() {
        let cfg = load(&[
            (ENV_RPC_URL, "http://127.0.0.1:8554"),
            (ENV_PORT, "3000"),
            (ENV_COOLDOWN_MS, "500"),
        ])
        .unwrap();

        assert_eq!(cfg.rpc_url, "http://127.0.0.1:8554");
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.cooldown, Duration::from_millis(500));
        assert!(cfg.rpc_auth.is_none());
        assert!(cfg.min_diff.is_none());
        assert!(cfg.max_bid.is_none());
        assert_eq!(cfg.log_dir, PathBuf::from("logs"));
    }

    #[test]
    fn test_full_config() {
        let cfg = load(&[
            (ENV_RPC_URL, "http://127.0.0.1:8554"),
            (ENV_RPC_USER, "scout"),
            (ENV_RPC_PASSWORD, "hunter2"),
            (ENV_PORT, "8080"),
            (ENV_COOLDOWN_MS, "250"),
            (ENV_MIN_DIFF, "5"),
            (ENV_MAX_BID, "2000.5"),
            (ENV_LOG_DIR, "/var/log/auction-scout"),
        ])
        .unwrap();

        assert_eq!(cfg.rpc_auth, Some(("scout".into(), "hunter2".into())));
        assert_eq!(cfg.min_diff, Some(dec!(5)));
        assert_eq!(cfg.max_bid, Some(dec!(2000.5)));
        assert_eq!(cfg.log_dir, PathBuf::from("/var/log/auction-scout"));
    }

    #[test]
    fn test_missing_url_is_fatal() {
        let err = load(&[(ENV_PORT, "3000"), (ENV_COOLDOWN_MS, "500")]).unwrap_err();
        assert!(matches!(err, ScoutError::ConfigMissing(ENV_RPC_URL)));
    }

    #[test]
    fn test_missing_cooldown_is_fatal() {
        let err = load(&[(ENV_RPC_URL, "http://x"), (ENV_PORT, "3000")]).unwrap_err();
        assert!(matches!(err, ScoutError::ConfigMissing(ENV_COOLDOWN_MS)));
    }

    #[test]
    fn test_user_without_password_is_fatal() {
        let err = load(&[
            (ENV_RPC_URL, "http://x"),
            (ENV_RPC_USER, "scout"),
            (ENV_PORT, "3000"),
            (ENV_COOLDOWN_MS, "500"),
        ])
        .unwrap_err();
        assert!(matches!(err, ScoutError::ConfigMissing(ENV_RPC_PASSWORD)));
    }

    #[test]
    fn test_unparsable_port_rejected() {
        let err = load(&[
            (ENV_RPC_URL, "http://x"),
            (ENV_PORT, "not-a-port"),
            (ENV_COOLDOWN_MS, "500"),
        ])
        .unwrap_err();
        assert!(matches!(err, ScoutError::ConfigInvalid { name: ENV_PORT, .. }));
    }

    #[test]
    fn test_unparsable_min_diff_rejected() {
        let err = load(&[
            (ENV_RPC_URL, "http://x"),
            (ENV_PORT, "3000"),
            (ENV_COOLDOWN_MS, "500"),
            (ENV_MIN_DIFF, "abc"),
        ])
        .unwrap_err();
        assert!(matches!(err, ScoutError::ConfigInvalid { name: ENV_MIN_DIFF, .. }));
    }
}
