//! Upstream data sources.
//!
//! Defines the `AuctionSource` trait the valuation pipeline depends on,
//! and the DeFiChain node JSON-RPC implementation. Test code substitutes
//! an in-memory source.

pub mod rpc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::types::{ScoutError, Vault};

/// Directional spot ratios of a liquidity pool, relative to the
/// `(a, b)` order the pair was requested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolRatio {
    /// Units of A per one B (reserve A / reserve B).
    pub ab: Decimal,
    /// Units of B per one A (reserve B / reserve A).
    pub ba: Decimal,
}

impl PoolRatio {
    /// The same pool viewed from the opposite side.
    pub fn flipped(self) -> Self {
        PoolRatio {
            ab: self.ba,
            ba: self.ab,
        }
    }
}

/// Abstraction over the loan-auction data source.
///
/// The report service receives an implementation at construction time,
/// so tests can substitute a deterministic in-memory double.
#[async_trait]
pub trait AuctionSource: Send + Sync {
    /// Fetch up to `limit` vaults with open auction batches.
    async fn list_auctions(&self, limit: u32) -> Result<Vec<Vault>, ScoutError>;

    /// Fetch a single vault by id.
    async fn get_vault(&self, vault_id: &str) -> Result<Vault, ScoutError>;

    /// Fetch the reserve ratios of the pool between two symbols.
    /// Fails with `ScoutError::PoolNotFound` when no such pool exists
    /// in either orientation.
    async fn get_pool_pair(&self, symbol_a: &str, symbol_b: &str)
        -> Result<PoolRatio, ScoutError>;
}

// ---------------------------------------------------------------------------
// In-memory source for unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use std::collections::{HashMap, HashSet};

    /// Deterministic in-memory `AuctionSource` for unit tests.
    #[derive(Default)]
    pub struct StaticSource {
        pub vaults: Vec<Vault>,
        pub pools: HashMap<(String, String), PoolRatio>,
        /// Symbols whose pool lookups fail with a transport error
        /// instead of not-found.
        pub broken_symbols: HashSet<String>,
        pub fail_listing: bool,
        pub fail_vaults: bool,
    }

    impl StaticSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_pool(mut self, a: &str, b: &str, ab: Decimal, ba: Decimal) -> Self {
            self.pools
                .insert((a.to_string(), b.to_string()), PoolRatio { ab, ba });
            self
        }

        pub fn with_vault(mut self, vault: Vault) -> Self {
            self.vaults.push(vault);
            self
        }
    }

    #[async_trait]
    impl AuctionSource for StaticSource {
        async fn list_auctions(&self, limit: u32) -> Result<Vec<Vault>, ScoutError> {
            if self.fail_listing {
                return Err(ScoutError::Upstream("listauctions: connection refused".into()));
            }
            Ok(self.vaults.iter().take(limit as usize).cloned().collect())
        }

        async fn get_vault(&self, vault_id: &str) -> Result<Vault, ScoutError> {
            if self.fail_vaults {
                return Err(ScoutError::Upstream("getvault: connection refused".into()));
            }
            self.vaults
                .iter()
                .find(|v| v.vault_id == vault_id)
                .cloned()
                .ok_or_else(|| ScoutError::Upstream(format!("getvault: unknown vault {vault_id}")))
        }

        async fn get_pool_pair(
            &self,
            symbol_a: &str,
            symbol_b: &str,
        ) -> Result<PoolRatio, ScoutError> {
            if self.broken_symbols.contains(symbol_a) || self.broken_symbols.contains(symbol_b) {
                return Err(ScoutError::Upstream("getpoolpair: timed out".into()));
            }
            if let Some(ratio) = self.pools.get(&(symbol_a.to_string(), symbol_b.to_string())) {
                return Ok(*ratio);
            }
            if let Some(ratio) = self.pools.get(&(symbol_b.to_string(), symbol_a.to_string())) {
                return Ok(ratio.flipped());
            }
            Err(ScoutError::PoolNotFound(
                symbol_a.to_string(),
                symbol_b.to_string(),
            ))
        }
    }
}
