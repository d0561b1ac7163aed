//! DeFiChain node JSON-RPC client.
//!
//! RPC methods used: `listauctions`, `getvault`, `getpoolpair`.
//! Amounts arrive as `<amount>@<symbol>` strings and are parsed downstream.
//! Pool pairs are addressed by name (`"A-B"`); the node answers with error
//! code -5 when no such pool exists, which we surface as a distinguishable
//! not-found so the oracle can fall back to a two-hop conversion.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::{AuctionSource, PoolRatio};
use crate::types::{ScoutError, Vault};

const RPC_CLIENT_ID: &str = "auction-scout";

/// defid RPC_INVALID_ADDRESS_OR_KEY — returned for unknown pools and vaults.
const RPC_NOT_FOUND: i64 = -5;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// `getpoolpair` result value. The response object is keyed by pool id;
/// we only deserialize the ratio fields we need.
#[derive(Debug, Deserialize)]
struct RpcPoolPair {
    #[serde(rename = "reserveA/reserveB")]
    ab: Decimal,
    #[serde(rename = "reserveB/reserveA")]
    ba: Decimal,
}

/// Internal call outcome, keeping not-found distinguishable from
/// transport and server failures.
enum CallError {
    NotFound,
    Failed(String),
}

impl CallError {
    fn into_upstream(self, method: &str) -> ScoutError {
        match self {
            CallError::NotFound => ScoutError::Upstream(format!("{method}: not found")),
            CallError::Failed(msg) => ScoutError::Upstream(msg),
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// JSON-RPC client for a DeFiChain node.
pub struct DefichainRpc {
    http: Client,
    url: String,
    auth: Option<(String, String)>,
}

impl DefichainRpc {
    pub fn new(url: String, auth: Option<(String, String)>) -> Result<Self, ScoutError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ScoutError::Upstream(format!("http client: {e}")))?;
        Ok(Self { http, url, auth })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, CallError> {
        debug!(method, %params, "RPC call");

        let body = json!({
            "jsonrpc": "1.0",
            "id": RPC_CLIENT_ID,
            "method": method,
            "params": params,
        });

        let mut request = self.http.post(&self.url).json(&body);
        if let Some((user, password)) = &self.auth {
            request = request.basic_auth(user, Some(password));
        }

        let response = request
            .send()
            .await
            .map_err(|e| CallError::Failed(format!("{method}: {e}")))?;

        let parsed: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| CallError::Failed(format!("{method}: invalid response: {e}")))?;

        if let Some(err) = parsed.error {
            if err.code == RPC_NOT_FOUND {
                return Err(CallError::NotFound);
            }
            return Err(CallError::Failed(format!(
                "{method}: RPC error {}: {}",
                err.code, err.message
            )));
        }

        parsed
            .result
            .ok_or_else(|| CallError::Failed(format!("{method}: empty result")))
    }

    /// Fetch a pool by its exact name, e.g. `"TSLA-DUSD"`.
    async fn fetch_pool(&self, name: &str) -> Result<PoolRatio, CallError> {
        let pools: HashMap<String, RpcPoolPair> =
            self.call("getpoolpair", json!([name])).await?;
        let pool = pools.into_values().next().ok_or(CallError::NotFound)?;
        Ok(PoolRatio {
            ab: pool.ab,
            ba: pool.ba,
        })
    }
}

#[async_trait]
impl AuctionSource for DefichainRpc {
    async fn list_auctions(&self, limit: u32) -> Result<Vec<Vault>, ScoutError> {
        self.call("listauctions", json!([{ "limit": limit }]))
            .await
            .map_err(|e| e.into_upstream("listauctions"))
    }

    async fn get_vault(&self, vault_id: &str) -> Result<Vault, ScoutError> {
        self.call("getvault", json!([vault_id]))
            .await
            .map_err(|e| e.into_upstream("getvault"))
    }

    async fn get_pool_pair(
        &self,
        symbol_a: &str,
        symbol_b: &str,
    ) -> Result<PoolRatio, ScoutError> {
        // Pools exist in one orientation only; try the requested order,
        // then the reverse with the ratios swapped to match (a, b).
        match self.fetch_pool(&format!("{symbol_a}-{symbol_b}")).await {
            Ok(ratio) => Ok(ratio),
            Err(CallError::Failed(msg)) => Err(ScoutError::Upstream(msg)),
            Err(CallError::NotFound) => {
                match self.fetch_pool(&format!("{symbol_b}-{symbol_a}")).await {
                    Ok(ratio) => Ok(ratio.flipped()),
                    Err(CallError::NotFound) => Err(ScoutError::PoolNotFound(
                        symbol_a.to_string(),
                        symbol_b.to_string(),
                    )),
                    Err(CallError::Failed(msg)) => Err(ScoutError::Upstream(msg)),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
