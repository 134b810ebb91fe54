use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Opaque account identifier. The account universe for a computation is the
/// sorted union of every slug referenced by occurrences, checkpoints, and the
/// prior-balance map.
pub type AccountSlug = String;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Occurrence {
    #[schemars(description = "Slug of the account this cash movement belongs to")]
    pub account: AccountSlug,

    #[schemars(
        description = "Signed amount: positive for inflows, negative for outflows"
    )]
    pub amount: f64,

    #[schemars(description = "Instant at which the movement takes effect (UTC)")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnchorCheckpoint {
    #[schemars(description = "Identifier of the checkpoint row in the upstream store")]
    pub id: i64,

    #[schemars(description = "Slug of the account the balance was observed on")]
    pub account: AccountSlug,

    #[schemars(
        description = "Externally observed balance. Overrides the rolled-forward balance for the period containing the timestamp."
    )]
    pub balance: f64,

    #[schemars(description = "Instant at which the balance was observed (UTC)")]
    pub timestamp: DateTime<Utc>,
}

/// Fully materialized input for one forecast computation. All data is in
/// memory before the engine runs; the engine performs no I/O.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ForecastInput {
    #[schemars(
        description = "Month identifiers (YYYY-MM) to compute, in any order. Duplicates are collapsed."
    )]
    pub months: Vec<String>,

    #[schemars(description = "All dated cash movements, any order")]
    pub occurrences: Vec<Occurrence>,

    #[schemars(
        description = "All externally observed balances. Relative order is the tie-break for checkpoints sharing a timestamp."
    )]
    pub checkpoints: Vec<AnchorCheckpoint>,

    #[schemars(
        description = "Ending balance carried in from before the first computed month, per account"
    )]
    pub prior_balances: BTreeMap<AccountSlug, f64>,
}

impl ForecastInput {
    /// Sorted union of every account referenced anywhere in the input.
    pub fn account_slugs(&self) -> Vec<AccountSlug> {
        let mut slugs: BTreeSet<AccountSlug> = BTreeSet::new();

        for occurrence in &self.occurrences {
            slugs.insert(occurrence.account.clone());
        }
        for checkpoint in &self.checkpoints {
            slugs.insert(checkpoint.account.clone());
        }
        for account in self.prior_balances.keys() {
            slugs.insert(account.clone());
        }

        slugs.into_iter().collect()
    }

    /// Month identifiers sorted ascending with duplicates collapsed.
    pub fn sorted_months(&self) -> Vec<String> {
        let months: BTreeSet<String> = self.months.iter().cloned().collect();
        months.into_iter().collect()
    }
}
