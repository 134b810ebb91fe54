use thiserror::Error;

#[derive(Error, Debug)]
pub enum BalanceChainError {
    #[error("Invalid period identifier '{0}': expected YYYY-MM")]
    InvalidPeriodIdentifier(String),

    #[error("Unparseable timestamp '{0}': expected an ISO-8601 instant")]
    TimestampParse(String),

    #[error("Continuity violation for account '{account}' at {period}: expected beginning balance {expected}, got {actual}")]
    ContinuityViolation {
        account: String,
        period: String,
        expected: f64,
        actual: f64,
    },

    #[error("Reconciliation violation for account '{account}' in {month}: last week ended at {week_balance}, month ended at {month_balance}")]
    ReconciliationViolation {
        account: String,
        month: String,
        week_balance: f64,
        month_balance: f64,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BalanceChainError>;
