use crate::error::{BalanceChainError, Result};
use crate::{AnchorSource, BalanceCell, BalanceForecast};
use std::collections::BTreeMap;

/// Default tolerance for balance comparisons, matching the cent precision
/// the downstream store keeps.
pub const BALANCE_TOLERANCE: f64 = 0.01;

/// Post-hoc consistency check over a produced forecast. A failure here means
/// corrupted input data or an algorithmic regression, not bad user input.
pub struct ChainVerifier {
    tolerance: f64,
}

impl Default for ChainVerifier {
    fn default() -> Self {
        Self::new(BALANCE_TOLERANCE)
    }
}

impl ChainVerifier {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn verify(&self, forecast: &BalanceForecast) -> Result<()> {
        self.verify_monthly_continuity(forecast)?;
        self.verify_weekly_continuity(forecast)?;
        self.verify_reconciliation(forecast)?;
        Ok(())
    }

    /// Each month's beginning balance must equal the previous month's ending
    /// balance, except where a checkpoint anchor overrides the chain.
    fn verify_monthly_continuity(&self, forecast: &BalanceForecast) -> Result<()> {
        for account in &forecast.accounts {
            let cells = forecast
                .months
                .iter()
                .filter_map(|month| forecast.monthly.get(month).and_then(|c| c.get(account)));

            self.check_chain(account, cells)?;
        }
        Ok(())
    }

    /// Same rule across the full sequence of weeks, spanning month boundaries.
    fn verify_weekly_continuity(&self, forecast: &BalanceForecast) -> Result<()> {
        for account in &forecast.accounts {
            let cells = forecast
                .months
                .iter()
                .filter_map(|month| forecast.weekly.get(month))
                .flat_map(|weeks| weeks.values())
                .filter_map(|cells| cells.get(account));

            self.check_chain(account, cells)?;
        }
        Ok(())
    }

    fn check_chain<'a>(
        &self,
        account: &str,
        cells: impl Iterator<Item = &'a BalanceCell>,
    ) -> Result<()> {
        let mut previous: Option<f64> = None;

        for cell in cells {
            if let Some(expected) = previous {
                let overridden = cell.anchor.source == AnchorSource::Checkpoint;
                if !overridden && (cell.beginning_balance - expected).abs() > self.tolerance {
                    return Err(BalanceChainError::ContinuityViolation {
                        account: account.to_string(),
                        period: cell.period_key.clone(),
                        expected,
                        actual: cell.beginning_balance,
                    });
                }
            }
            previous = Some(cell.balance);
        }

        Ok(())
    }

    /// The last week of each month must land on the month's ending balance.
    fn verify_reconciliation(&self, forecast: &BalanceForecast) -> Result<()> {
        for month in &forecast.months {
            let month_cells = match forecast.monthly.get(month) {
                Some(cells) => cells,
                None => continue,
            };
            let last_week: Option<&BTreeMap<_, BalanceCell>> =
                forecast.weekly.get(month).and_then(|weeks| weeks.values().last());

            for account in &forecast.accounts {
                let (month_cell, week_cell) = match (
                    month_cells.get(account),
                    last_week.and_then(|cells| cells.get(account)),
                ) {
                    (Some(m), Some(w)) => (m, w),
                    _ => continue,
                };

                if (week_cell.balance - month_cell.balance).abs() > self.tolerance {
                    return Err(BalanceChainError::ReconciliationViolation {
                        account: account.to_string(),
                        month: month.clone(),
                        week_balance: week_cell.balance,
                        month_balance: month_cell.balance,
                    });
                }
            }
        }

        Ok(())
    }
}

pub fn verify_balance_chain(forecast: &BalanceForecast, tolerance: f64) -> Result<()> {
    ChainVerifier::new(tolerance).verify(forecast)
}
