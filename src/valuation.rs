//! Bid and reward estimation for a single auction batch.
//!
//! The starting bid follows the auction protocol's minimums: 5% over
//! the owed loan value for the first bid, 1% over the current highest
//! bid otherwise. The reward is the summed DUSD value of all collateral
//! in the batch.

use futures::future::try_join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

use crate::pricing::PriceOracle;
use crate::types::{AssetAmount, ScoutError, Vault};

/// First-bid premium over the owed loan value.
const FIRST_BID_PREMIUM: Decimal = dec!(1.05);

/// Minimum increment over the current highest bid.
const OUTBID_INCREMENT: Decimal = dec!(1.01);

/// Minimum viable bid for the batch at `batch_index`, in DUSD.
///
/// Reads the current highest bid from the vault's batch list; absent
/// one, the floor is the loan's DUSD value plus the first-bid premium.
/// The highest-bid amount is parsed like any `<amount>@<symbol>` string
/// but only its amount is used — the denomination is the loan token.
pub async fn starting_bid(
    oracle: &PriceOracle<'_>,
    vault: &Vault,
    batch_index: u32,
    loan: &AssetAmount,
) -> Result<Decimal, ScoutError> {
    let highest_bid = vault
        .batches
        .iter()
        .find(|b| b.index == batch_index)
        .and_then(|b| b.highest_bid.as_ref());

    match highest_bid {
        Some(bid) => {
            let bid_amount: AssetAmount = bid.amount.parse()?;
            if bid_amount.symbol != loan.symbol {
                // The node denominates bids in the loan token; tolerate
                // a mismatch but make it visible.
                warn!(
                    vault_id = %vault.vault_id,
                    batch_index,
                    bid_symbol = %bid_amount.symbol,
                    loan_symbol = %loan.symbol,
                    "highest bid symbol differs from loan symbol"
                );
            }
            let value = oracle
                .value_in_reference(bid_amount.amount, &loan.symbol)
                .await?;
            Ok(value * OUTBID_INCREMENT)
        }
        None => {
            let value = oracle.value_in_reference(loan.amount, &loan.symbol).await?;
            Ok(value * FIRST_BID_PREMIUM)
        }
    }
}

/// Total DUSD value of the collateral offered as the auction reward.
///
/// All conversions run concurrently; a single failure fails the whole
/// sum — a partial reward would misstate profitability. An empty
/// collateral list is worth zero.
pub async fn reward_value(
    oracle: &PriceOracle<'_>,
    collaterals: &[String],
) -> Result<Decimal, ScoutError> {
    let parsed = collaterals
        .iter()
        .map(|s| s.parse::<AssetAmount>())
        .collect::<Result<Vec<_>, _>>()?;

    let values = try_join_all(
        parsed
            .iter()
            .map(|c| oracle.value_in_reference(c.amount, &c.symbol)),
    )
    .await?;

    Ok(values.into_iter().fold(Decimal::ZERO, |acc, v| acc + v))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
