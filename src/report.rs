//! Auction report orchestration.
//!
//! Per request: list open auctions, flatten their batches, value each
//! batch (bid, reward, margin), filter, sort, format. Batches are
//! processed sequentially with an awaited cool-down between them —
//! deliberate backpressure against the rate-limited node, so no
//! concurrent fan-out across batches. Only the independent sub-lookups
//! inside one batch run concurrently.

use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::pricing::PriceOracle;
use crate::ranker::{self, FilterPolicy, ValuationRecord};
use crate::source::AuctionSource;
use crate::types::{AssetAmount, AuctionBatch, ScoutError, ValuationResult, Vault};
use crate::valuation;

/// Builds the ranked auction report served over HTTP.
pub struct AuctionReportService {
    source: Arc<dyn AuctionSource>,
    cooldown: Duration,
    min_diff: Option<Decimal>,
    max_bid: Option<Decimal>,
}

impl AuctionReportService {
    pub fn new(source: Arc<dyn AuctionSource>, config: &AppConfig) -> Self {
        Self {
            source,
            cooldown: config.cooldown,
            min_diff: config.min_diff,
            max_bid: config.max_bid,
        }
    }

    /// Value up to `limit` open auction batches and return those whose
    /// margin clears `min_margin`, best first. `limit` caps the
    /// upstream retrieval, not the filtered result count.
    pub async fn build_report(
        &self,
        limit: u32,
        min_margin: Decimal,
    ) -> Result<Vec<ValuationRecord>, ScoutError> {
        let policy = FilterPolicy {
            min_margin,
            min_diff: self.min_diff,
            max_bid: self.max_bid,
        };

        let vaults = self.source.list_auctions(limit).await?;
        let batch_count: usize = vaults.iter().map(|v| v.batches.len()).sum();
        info!(vaults = vaults.len(), batches = batch_count, "valuing open auctions");

        let mut results = Vec::new();
        let mut first = true;
        for vault in &vaults {
            for batch in &vault.batches {
                if !first {
                    // Advisory spacing for the node's rate limit; must
                    // actually be awaited, not fired and forgotten.
                    tokio::time::sleep(self.cooldown).await;
                }
                first = false;

                match self.value_batch(vault, batch).await {
                    Ok(valuation) => {
                        if policy.passes(&valuation) {
                            results.push(valuation);
                        }
                    }
                    Err(e) if e.is_batch_local() => {
                        warn!(
                            vault_id = %vault.vault_id,
                            batch_index = batch.index,
                            error = %e,
                            "skipping batch"
                        );
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        let ranked = ranker::rank(results);
        Ok(ranked.iter().map(ValuationRecord::from).collect())
    }

    /// Full valuation of one batch. Batch-local failures bubble up for
    /// the caller to skip; upstream failures abort the report.
    async fn value_batch(
        &self,
        listed: &Vault,
        batch: &AuctionBatch,
    ) -> Result<ValuationResult, ScoutError> {
        let loan: AssetAmount = batch.loan.parse()?;

        // Re-fetch the vault so the bid reflects current auction state.
        let vault = self.source.get_vault(&listed.vault_id).await?;
        let oracle = PriceOracle::new(self.source.as_ref());

        let starting_bid =
            valuation::starting_bid(&oracle, &vault, batch.index, &loan).await?;
        let reward = valuation::reward_value(&oracle, &batch.collaterals).await?;
        let margin = ranker::margin(starting_bid, reward, &vault.vault_id, batch.index)?;

        Ok(ValuationResult {
            vault_id: vault.vault_id.clone(),
            batch_index: batch.index,
            starting_bid,
            reward,
            diff: reward - starting_bid,
            margin,
            liquidation_height: vault.liquidation_height,
            url: format!(
                "https://defiscan.live/vaults/{}/auctions/{}",
                vault.vault_id, batch.index
            ),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
