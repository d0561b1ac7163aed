//! Reference-unit pricing via liquidity pool reserve ratios.
//!
//! Converts an (amount, symbol) pair into its DUSD value. Assets
//! without a direct DUSD pool are converted in two hops through DFI.
//! All arithmetic is exact decimal; no binary floats touch money.

use rust_decimal::Decimal;
use tracing::debug;

use crate::source::AuctionSource;
use crate::types::ScoutError;

/// The stable unit every valuation is normalized into.
pub const REFERENCE_SYMBOL: &str = "DUSD";

/// The network's native token, used as the two-hop intermediate.
pub const BASE_SYMBOL: &str = "DFI";

/// Converts asset amounts into reference-unit (DUSD) values.
pub struct PriceOracle<'a> {
    source: &'a dyn AuctionSource,
}

impl<'a> PriceOracle<'a> {
    pub fn new(source: &'a dyn AuctionSource) -> Self {
        Self { source }
    }

    /// DUSD value of `amount` units of `symbol`.
    ///
    /// Resolution order: the base token prices directly against the
    /// DUSD-DFI pool; any other symbol tries its direct DUSD pool and
    /// falls back to a two-hop conversion through DFI when no such
    /// pool exists. A missing two-hop path or any unexpected lookup
    /// failure makes the valuation undefined for this symbol — the
    /// caller must skip the enclosing batch, never substitute zero.
    pub async fn value_in_reference(
        &self,
        amount: Decimal,
        symbol: &str,
    ) -> Result<Decimal, ScoutError> {
        if symbol == BASE_SYMBOL {
            let pair = self
                .source
                .get_pool_pair(BASE_SYMBOL, REFERENCE_SYMBOL)
                .await
                .map_err(|e| price_failure(symbol, e))?;
            return Ok(amount * pair.ba);
        }

        match self.source.get_pool_pair(symbol, REFERENCE_SYMBOL).await {
            Ok(pair) => Ok(amount * pair.ba),
            Err(ScoutError::PoolNotFound(..)) => {
                debug!(symbol, "no direct DUSD pool, converting via DFI");
                // Both hops are independent reads; fetch them concurrently.
                let (hop, base) = tokio::try_join!(
                    self.source.get_pool_pair(symbol, BASE_SYMBOL),
                    self.source.get_pool_pair(BASE_SYMBOL, REFERENCE_SYMBOL),
                )
                .map_err(|e| price_failure(symbol, e))?;
                Ok(amount * hop.ba * base.ba)
            }
            Err(e) => Err(price_failure(symbol, e)),
        }
    }
}

/// Map a lookup failure onto the batch-local price taxonomy.
/// A missing pool on the two-hop path stays `PoolNotFound` so callers
/// can tell "no conversion path" apart from an upstream fault.
fn price_failure(symbol: &str, err: ScoutError) -> ScoutError {
    match err {
        ScoutError::PoolNotFound(..) => err,
        other => ScoutError::PriceLookup {
            symbol: symbol.to_string(),
            reason: other.to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
