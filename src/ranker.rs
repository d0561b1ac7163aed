//! Margin computation, filtering, ranking, and display formatting.
//!
//! The filter has two observed strictness levels: the plain margin
//! threshold, and an optional stricter variant adding a minimum
//! absolute profit and a cap on the starting bid. Both knobs are
//! independent configuration, not hardcoded behavior.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::pricing::REFERENCE_SYMBOL;
use crate::types::{ScoutError, ValuationResult};

// ---------------------------------------------------------------------------
// Margin
// ---------------------------------------------------------------------------

/// Profitability margin in percent: (reward − bid) / bid × 100.
/// Undefined for a non-positive starting bid.
pub fn margin(starting_bid: Decimal, reward: Decimal, vault_id: &str, batch_index: u32)
    -> Result<Decimal, ScoutError>
{
    if starting_bid <= Decimal::ZERO {
        return Err(ScoutError::ZeroStartingBid {
            vault_id: vault_id.to_string(),
            batch_index,
        });
    }
    Ok((reward - starting_bid) / starting_bid * dec!(100))
}

// ---------------------------------------------------------------------------
// Filter policy
// ---------------------------------------------------------------------------

/// Which auctions make it into the report.
#[derive(Debug, Clone)]
pub struct FilterPolicy {
    /// Minimum margin in percent. Break-even or better by default.
    pub min_margin: Decimal,
    /// When set, the absolute profit must exceed this floor —
    /// excludes auctions too small to be worth acting on.
    pub min_diff: Option<Decimal>,
    /// When set, the starting bid must stay below this cap —
    /// excludes auctions too large to safely fund.
    pub max_bid: Option<Decimal>,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            min_margin: Decimal::ZERO,
            min_diff: None,
            max_bid: None,
        }
    }
}

impl FilterPolicy {
    pub fn passes(&self, valuation: &ValuationResult) -> bool {
        if valuation.margin < self.min_margin {
            return false;
        }
        if let Some(floor) = self.min_diff {
            if valuation.diff <= floor {
                return false;
            }
        }
        if let Some(cap) = self.max_bid {
            if valuation.starting_bid >= cap {
                return false;
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Ranking & formatting
// ---------------------------------------------------------------------------

/// Sort by margin descending, stable on input order for ties.
pub fn rank(mut results: Vec<ValuationResult>) -> Vec<ValuationResult> {
    results.sort_by(|a, b| b.margin.cmp(&a.margin));
    results
}

/// Formatted valuation record as served to the HTTP caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationRecord {
    pub vault_id: String,
    pub batch_index: u32,
    pub starting_bid: String,
    pub reward: String,
    pub diff: String,
    pub margin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liquidation_height: Option<u64>,
    pub url: String,
}

impl From<&ValuationResult> for ValuationRecord {
    fn from(v: &ValuationResult) -> Self {
        ValuationRecord {
            vault_id: v.vault_id.clone(),
            batch_index: v.batch_index,
            starting_bid: format_reference(v.starting_bid),
            reward: format_reference(v.reward),
            diff: format_reference(v.diff),
            margin: format!("{:.2}%", v.margin),
            liquidation_height: v.liquidation_height,
            url: v.url.clone(),
        }
    }
}

/// Fixed-precision reference-unit rendering, e.g. `"123.4500000 DUSD"`.
fn format_reference(value: Decimal) -> String {
    format!("{value:.7} {REFERENCE_SYMBOL}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn valuation(starting_bid: Decimal, reward: Decimal, margin: Decimal) -> ValuationResult {
        ValuationResult {
            vault_id: "v1".to_string(),
            batch_index: 0,
            starting_bid,
            reward,
            diff: reward - starting_bid,
            margin,
            liquidation_height: None,
            url: "https://defiscan.live/vaults/v1/auctions/0".to_string(),
        }
    }

    #[test]
    fn test_margin_basic() {
        let m = margin(dec!(100), dec!(120), "v1", 0).unwrap();
        assert_eq!(m, dec!(20));
    }

    #[test]
    fn test_margin_negative() {
        let m = margin(dec!(100), dec!(0), "v1", 0).unwrap();
        assert_eq!(m, dec!(-100));
    }

    #[test]
    fn test_margin_zero_bid_rejected() {
        let err = margin(Decimal::ZERO, dec!(50), "v1", 0).unwrap_err();
        assert!(matches!(err, ScoutError::ZeroStartingBid { .. }));
    }

    #[test]
    fn test_loose_policy_threshold() {
        let v = valuation(dec!(100), dec!(120), dec!(20));

        let included = FilterPolicy {
            min_margin: dec!(20),
            ..Default::default()
        };
        assert!(included.passes(&v));

        let excluded = FilterPolicy {
            min_margin: dec!(25),
            ..Default::default()
        };
        assert!(!excluded.passes(&v));
    }

    #[test]
    fn test_default_policy_keeps_break_even() {
        let v = valuation(dec!(100), dec!(100), Decimal::ZERO);
        assert!(FilterPolicy::default().passes(&v));
    }

    #[test]
    fn test_default_policy_drops_losses() {
        // Zero-collateral auction: reward 0, margin −100%.
        let v = valuation(dec!(100), Decimal::ZERO, dec!(-100));
        assert!(!FilterPolicy::default().passes(&v));
    }

    #[test]
    fn test_strict_policy_diff_floor() {
        let policy = FilterPolicy {
            min_margin: Decimal::ZERO,
            min_diff: Some(dec!(5)),
            max_bid: None,
        };
        // 4 DUSD profit: under the floor despite a healthy margin.
        assert!(!policy.passes(&valuation(dec!(10), dec!(14), dec!(40))));
        assert!(policy.passes(&valuation(dec!(10), dec!(16), dec!(60))));
    }

    #[test]
    fn test_strict_policy_bid_cap() {
        let policy = FilterPolicy {
            min_margin: Decimal::ZERO,
            min_diff: None,
            max_bid: Some(dec!(1000)),
        };
        assert!(!policy.passes(&valuation(dec!(1000), dec!(1200), dec!(20))));
        assert!(policy.passes(&valuation(dec!(999), dec!(1200), dec!(20))));
    }

    #[test]
    fn test_rank_descending_by_margin() {
        let ranked = rank(vec![
            valuation(dec!(100), dec!(105), dec!(5)),
            valuation(dec!(100), dec!(120), dec!(20)),
            valuation(dec!(100), dec!(112), dec!(12)),
        ]);
        let margins: Vec<Decimal> = ranked.iter().map(|v| v.margin).collect();
        assert_eq!(margins, vec![dec!(20), dec!(12), dec!(5)]);
    }

    #[test]
    fn test_rank_stable_on_ties() {
        let mut a = valuation(dec!(100), dec!(110), dec!(10));
        a.vault_id = "first".to_string();
        let mut b = valuation(dec!(100), dec!(110), dec!(10));
        b.vault_id = "second".to_string();

        let ranked = rank(vec![a, b]);
        assert_eq!(ranked[0].vault_id, "first");
        assert_eq!(ranked[1].vault_id, "second");
    }

    #[test]
    fn test_record_formatting() {
        let record = ValuationRecord::from(&valuation(dec!(100), dec!(123.45), dec!(23.45)));
        assert_eq!(record.starting_bid, "100.0000000 DUSD");
        assert_eq!(record.reward, "123.4500000 DUSD");
        assert_eq!(record.diff, "23.4500000 DUSD");
        assert_eq!(record.margin, "23.45%");
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = ValuationRecord::from(&valuation(dec!(100), dec!(120), dec!(20)));
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"vaultId\":\"v1\""));
        assert!(json.contains("\"startingBid\""));
        assert!(!json.contains("liquidationHeight")); // None is omitted
    }
}
