use crate::error::Result;
use crate::schema::{AccountSlug, AnchorCheckpoint, ForecastInput, Occurrence};
use crate::utils::parse_timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An occurrence row as delivered by an external data loader, before its
/// timestamp string has been validated.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RawOccurrence {
    pub account: AccountSlug,
    pub amount: f64,
    #[schemars(description = "ISO-8601 instant, e.g. 2025-01-17T14:00:00Z")]
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RawCheckpoint {
    pub id: i64,
    pub account: AccountSlug,
    pub balance: f64,
    #[schemars(description = "ISO-8601 instant, e.g. 2025-01-17T14:00:00Z")]
    pub timestamp: String,
}

/// The wire shape a data-loading collaborator posts: months to compute plus
/// all rows the computation needs, with timestamps still as strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawForecastRequest {
    #[schemars(description = "Month identifiers in YYYY-MM form, any order")]
    pub months: Vec<String>,

    #[serde(default)]
    pub occurrences: Vec<RawOccurrence>,

    #[serde(default)]
    pub checkpoints: Vec<RawCheckpoint>,

    #[serde(default)]
    #[schemars(description = "Prior ending balance per account slug")]
    pub prior_balances: BTreeMap<AccountSlug, f64>,
}

impl RawForecastRequest {
    /// Validates every timestamp and produces the typed engine input.
    /// Fails on the first malformed instant, naming the offending string.
    pub fn into_input(self) -> Result<ForecastInput> {
        let mut occurrences = Vec::with_capacity(self.occurrences.len());
        for raw in self.occurrences {
            occurrences.push(Occurrence {
                account: raw.account,
                amount: raw.amount,
                timestamp: parse_timestamp(&raw.timestamp)?,
            });
        }

        // Checkpoint input order is preserved: it is the tie-break for
        // checkpoints sharing a timestamp.
        let mut checkpoints = Vec::with_capacity(self.checkpoints.len());
        for raw in self.checkpoints {
            checkpoints.push(AnchorCheckpoint {
                id: raw.id,
                account: raw.account,
                balance: raw.balance,
                timestamp: parse_timestamp(&raw.timestamp)?,
            });
        }

        Ok(ForecastInput {
            months: self.months,
            occurrences,
            checkpoints,
            prior_balances: self.prior_balances,
        })
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(RawForecastRequest)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

impl ForecastInput {
    /// Deserializes a raw request from JSON and validates its timestamps.
    pub fn from_json(json: &str) -> Result<ForecastInput> {
        let raw: RawForecastRequest = serde_json::from_str(json)?;
        raw.into_input()
    }
}
