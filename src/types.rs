//! Shared types for the auction scanner.
//!
//! The data model mirrors what the DeFiChain node returns for
//! `listauctions` / `getvault`, plus the derived valuation record.
//! Source, pricing, and report modules all depend on these types
//! without circular references.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// AssetAmount
// ---------------------------------------------------------------------------

/// A token quantity in the node's `<amount>@<symbol>` wire format,
/// e.g. `"10.00000000@DFI"`. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetAmount {
    pub amount: Decimal,
    pub symbol: String,
}

impl FromStr for AssetAmount {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (amount, symbol) = s
            .split_once('@')
            .ok_or_else(|| ScoutError::MalformedAmount(s.to_string()))?;
        let amount = Decimal::from_str(amount)
            .map_err(|_| ScoutError::MalformedAmount(s.to_string()))?;
        if amount.is_sign_negative() || symbol.is_empty() {
            return Err(ScoutError::MalformedAmount(s.to_string()));
        }
        Ok(AssetAmount {
            amount,
            symbol: symbol.to_string(),
        })
    }
}

impl fmt::Display for AssetAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.amount, self.symbol)
    }
}

// ---------------------------------------------------------------------------
// Vault & auction batches (node wire shapes)
// ---------------------------------------------------------------------------

/// A collateralized loan position in liquidation. Both `listauctions`
/// entries and `getvault` results deserialize into this shape; we only
/// read the fields the valuation pipeline needs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vault {
    pub vault_id: String,
    /// Block height at which the current auction round ends.
    #[serde(default)]
    pub liquidation_height: Option<u64>,
    #[serde(default)]
    pub batches: Vec<AuctionBatch>,
}

/// One biddable lot of collateral within a vault.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionBatch {
    /// Batch index, unique within the vault.
    pub index: u32,
    /// Loan owed, as `<amount>@<symbol>`.
    pub loan: String,
    /// Collateral offered as the auction reward, as `<amount>@<symbol>`.
    #[serde(default)]
    pub collaterals: Vec<String>,
    /// Present once at least one bid has been placed.
    #[serde(default)]
    pub highest_bid: Option<HighestBid>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighestBid {
    pub owner: String,
    /// Bid as `<amount>@<symbol>`; denominated in the loan token.
    pub amount: String,
}

// ---------------------------------------------------------------------------
// Valuation result
// ---------------------------------------------------------------------------

/// Derived profitability figures for one auction batch. Recomputed on
/// every request — reserve ratios and bid state change continuously.
#[derive(Debug, Clone)]
pub struct ValuationResult {
    pub vault_id: String,
    pub batch_index: u32,
    /// Minimum viable bid, in DUSD.
    pub starting_bid: Decimal,
    /// Total collateral value, in DUSD.
    pub reward: Decimal,
    /// reward − starting_bid, in DUSD.
    pub diff: Decimal,
    /// diff / starting_bid × 100.
    pub margin: Decimal,
    pub liquidation_height: Option<u64>,
    pub url: String,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for the scanner.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    #[error("missing configuration value: {0}")]
    ConfigMissing(&'static str),

    #[error("invalid configuration value {name}: {reason}")]
    ConfigInvalid { name: &'static str, reason: String },

    #[error("no pool pair for {0}-{1}")]
    PoolNotFound(String, String),

    #[error("price lookup failed for {symbol}: {reason}")]
    PriceLookup { symbol: String, reason: String },

    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error("malformed asset amount {0:?}: expected <amount>@<symbol>")]
    MalformedAmount(String),

    #[error("vault {vault_id} batch {batch_index} has a non-positive starting bid")]
    ZeroStartingBid { vault_id: String, batch_index: u32 },
}

impl ScoutError {
    /// Whether this failure is confined to a single auction batch.
    /// Batch-local failures are logged and skipped; anything else
    /// aborts the whole report.
    pub fn is_batch_local(&self) -> bool {
        matches!(
            self,
            ScoutError::PoolNotFound(..)
                | ScoutError::PriceLookup { .. }
                | ScoutError::MalformedAmount(..)
                | ScoutError::ZeroStartingBid { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
