//! # Balance Chain
//!
//! A library for rolling dated account activity into verified monthly and
//! weekly balance chains.
//!
//! ## Core Concepts
//!
//! - **Occurrence**: a single dated, signed cash movement on an account
//! - **Checkpoint**: an externally observed balance that overrides the
//!   rolled-forward balance for the period containing it
//! - **Anchor**: the balance and instant a period's net activity is measured
//!   forward from (a checkpoint, a roll-forward, or a zero initial baseline)
//! - **Roll-forward**: the prior period's computed ending balance becomes the
//!   next period's starting anchor
//! - **Verification**: every produced chain is checked for cross-period
//!   continuity and weekly/monthly reconciliation before it is returned
//!
//! ## Example
//!
//! ```rust,ignore
//! use balance_chain::*;
//! use std::collections::BTreeMap;
//!
//! let input = ForecastInput {
//!     months: vec!["2025-01".to_string(), "2025-02".to_string()],
//!     occurrences: vec![/* dated signed movements */],
//!     checkpoints: vec![/* observed balances */],
//!     prior_balances: BTreeMap::from([("operating".to_string(), 1250.0)]),
//! };
//!
//! let forecast = compute_balance_chain(&input).unwrap();
//! let january = &forecast.monthly["2025-01"]["operating"];
//! println!("ending balance: {}", january.balance);
//! ```

pub mod engine;
pub mod error;
pub mod ingestion;
pub mod period;
pub mod schema;
pub mod utils;
pub mod verifier;

pub use engine::{ChainBuilder, RunningBalances};
pub use error::{BalanceChainError, Result};
pub use ingestion::*;
pub use period::{month_window, weekly_partition, PeriodWindow, WeekWindow};
pub use schema::*;
pub use utils::{parse_month_identifier, parse_timestamp};
pub use verifier::{verify_balance_chain, ChainVerifier, BALANCE_TOLERANCE};

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorSource {
    /// An externally observed balance inside the window anchors it.
    Checkpoint,
    /// The prior period's computed ending balance anchors the window.
    RollForward,
    /// No checkpoint and no balance ever recorded; the anchor is zero.
    Initial,
}

/// Which balance anchors a period's computation, and where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorMetadata {
    pub balance: f64,
    pub timestamp: DateTime<Utc>,
    pub source: AnchorSource,
    pub checkpoint_id: Option<i64>,
    /// True only for a checkpoint strictly after the window start: a
    /// mid-period reconciliation rather than a start-of-period value.
    pub is_interim: bool,
}

/// One computed balance for one account in one window, monthly or weekly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceCell {
    /// "YYYY-MM" for monthly cells, the week-ending date for weekly cells.
    pub period_key: String,
    pub account: AccountSlug,
    /// The anchor balance. For an interim anchor this is not the literal
    /// first-instant balance of the period.
    pub beginning_balance: f64,
    /// Ending balance for the window.
    pub balance: f64,
    /// Aggregated signed activity applied after the anchor instant.
    pub net_after_anchor: f64,
    pub anchor: AnchorMetadata,
}

/// The complete result of one computation: sorted months and accounts plus
/// the monthly and weekly cell grids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceForecast {
    pub months: Vec<String>,
    pub accounts: Vec<AccountSlug>,
    pub monthly: BTreeMap<String, BTreeMap<AccountSlug, BalanceCell>>,
    pub weekly: BTreeMap<String, BTreeMap<NaiveDate, BTreeMap<AccountSlug, BalanceCell>>>,
}

pub struct BalanceChainProcessor;

impl BalanceChainProcessor {
    /// Builds the full monthly and weekly chain and verifies it with the
    /// default tolerance. The caller receives a complete, verified result or
    /// a single descriptive failure.
    pub fn process(input: &ForecastInput) -> Result<BalanceForecast> {
        Self::process_with_tolerance(input, BALANCE_TOLERANCE)
    }

    pub fn process_with_tolerance(
        input: &ForecastInput,
        tolerance: f64,
    ) -> Result<BalanceForecast> {
        info!(
            "Computing balance chain for {} months across {} occurrences and {} checkpoints",
            input.months.len(),
            input.occurrences.len(),
            input.checkpoints.len()
        );

        let forecast = ChainBuilder::new(input).build()?;

        debug!(
            "Chain covers {} accounts over months {:?}",
            forecast.accounts.len(),
            forecast.months
        );

        ChainVerifier::new(tolerance).verify(&forecast)?;
        Ok(forecast)
    }

    /// Chain build without the verification pass, for callers that run the
    /// verifier separately.
    pub fn build_unverified(input: &ForecastInput) -> Result<BalanceForecast> {
        ChainBuilder::new(input).build()
    }
}

pub fn compute_balance_chain(input: &ForecastInput) -> Result<BalanceForecast> {
    BalanceChainProcessor::process(input)
}
