//! auction-scout — DeFiChain vault auction profitability scanner.
//!
//! Queries a DeFiChain node for open collateral auctions, derives the
//! minimum viable bid and the DUSD value of each batch's collateral
//! reward, and serves the list ranked by profitability margin over a
//! single HTTP endpoint. Read-only: no bids are ever submitted.

pub mod config;
pub mod logging;
pub mod pricing;
pub mod ranker;
pub mod report;
pub mod server;
pub mod source;
pub mod types;
pub mod valuation;
