use crate::error::Result;
use crate::period::{month_window, weekly_partition, PeriodWindow};
use crate::schema::{AccountSlug, AnchorCheckpoint, ForecastInput};
use crate::{AnchorMetadata, AnchorSource, BalanceCell, BalanceForecast};
use std::collections::BTreeMap;

/// Current ending balance per account, threaded forward as windows are
/// processed. Owned by one chain build and discarded with it; seeding a fresh
/// copy is how the weekly pass stays independent of the monthly pass.
#[derive(Debug, Clone)]
pub struct RunningBalances {
    balances: BTreeMap<AccountSlug, f64>,
}

impl RunningBalances {
    pub fn seeded_from(prior_balances: &BTreeMap<AccountSlug, f64>) -> Self {
        Self {
            balances: prior_balances.clone(),
        }
    }

    /// None means no balance has ever been recorded for the account, which
    /// makes the next anchor Initial rather than RollForward.
    pub fn get(&self, account: &str) -> Option<f64> {
        self.balances.get(account).copied()
    }

    pub fn record(&mut self, account: &str, balance: f64) {
        self.balances.insert(account.to_string(), balance);
    }
}

/// Walks months (and their weekly partitions) in ascending order, resolving
/// an anchor and aggregating net activity for every (window, account) pair.
pub struct ChainBuilder<'a> {
    input: &'a ForecastInput,
}

impl<'a> ChainBuilder<'a> {
    pub fn new(input: &'a ForecastInput) -> Self {
        Self { input }
    }

    pub fn build(&self) -> Result<BalanceForecast> {
        let months = self.input.sorted_months();
        let accounts = self.input.account_slugs();

        let monthly = self.build_monthly(&months, &accounts)?;
        let weekly = self.build_weekly(&months, &accounts)?;

        Ok(BalanceForecast {
            months,
            accounts,
            monthly,
            weekly,
        })
    }

    fn build_monthly(
        &self,
        months: &[String],
        accounts: &[AccountSlug],
    ) -> Result<BTreeMap<String, BTreeMap<AccountSlug, BalanceCell>>> {
        let mut running = RunningBalances::seeded_from(&self.input.prior_balances);
        let mut monthly = BTreeMap::new();

        for month in months {
            let window = month_window(month)?;
            let mut cells = BTreeMap::new();

            for account in accounts {
                let cell = self.window_cell(month.clone(), account, &window, &running);
                running.record(account, cell.balance);
                cells.insert(account.clone(), cell);
            }

            monthly.insert(month.clone(), cells);
        }

        Ok(monthly)
    }

    fn build_weekly(
        &self,
        months: &[String],
        accounts: &[AccountSlug],
    ) -> Result<BTreeMap<String, BTreeMap<chrono::NaiveDate, BTreeMap<AccountSlug, BalanceCell>>>>
    {
        let mut running = RunningBalances::seeded_from(&self.input.prior_balances);
        let mut weekly = BTreeMap::new();

        for month in months {
            let window = month_window(month)?;
            let mut month_weeks = BTreeMap::new();

            for week in weekly_partition(&window) {
                let period_key = week.week_ending.format("%Y-%m-%d").to_string();
                let mut cells = BTreeMap::new();

                for account in accounts {
                    let cell = self.window_cell(period_key.clone(), account, &week.window, &running);
                    running.record(account, cell.balance);
                    cells.insert(account.clone(), cell);
                }

                month_weeks.insert(week.week_ending, cells);
            }

            weekly.insert(month.clone(), month_weeks);
        }

        Ok(weekly)
    }

    /// Shared per-window computation used by both the monthly and the weekly
    /// drivers: resolve the anchor, aggregate activity after it, emit a cell.
    fn window_cell(
        &self,
        period_key: String,
        account: &str,
        window: &PeriodWindow,
        running: &RunningBalances,
    ) -> BalanceCell {
        let anchor = self.resolve_anchor(account, window, running);
        let net_after_anchor = self.net_after_anchor(account, window, &anchor);

        BalanceCell {
            period_key,
            account: account.to_string(),
            beginning_balance: anchor.balance,
            balance: anchor.balance + net_after_anchor,
            net_after_anchor,
            anchor,
        }
    }

    /// Chooses the balance and instant the window's computation measures from:
    /// the latest in-window checkpoint if any exist, otherwise the running
    /// balance (Initial when none was ever recorded).
    fn resolve_anchor(
        &self,
        account: &str,
        window: &PeriodWindow,
        running: &RunningBalances,
    ) -> AnchorMetadata {
        let mut in_window: Vec<&AnchorCheckpoint> = self
            .input
            .checkpoints
            .iter()
            .filter(|c| c.account == account && window.contains(c.timestamp))
            .collect();

        // Stable sort keeps input order among equal timestamps, so the
        // last-supplied checkpoint wins a tie.
        in_window.sort_by_key(|c| c.timestamp);

        if let Some(checkpoint) = in_window.last() {
            return AnchorMetadata {
                balance: checkpoint.balance,
                timestamp: checkpoint.timestamp,
                source: AnchorSource::Checkpoint,
                checkpoint_id: Some(checkpoint.id),
                is_interim: checkpoint.timestamp > window.start,
            };
        }

        match running.get(account) {
            Some(balance) => AnchorMetadata {
                balance,
                timestamp: window.start,
                source: AnchorSource::RollForward,
                checkpoint_id: None,
                is_interim: false,
            },
            None => AnchorMetadata {
                balance: 0.0,
                timestamp: window.start,
                source: AnchorSource::Initial,
                checkpoint_id: None,
                is_interim: false,
            },
        }
    }

    /// Sums in-window occurrences that apply after the anchor instant. A
    /// checkpoint balance already incorporates any movement at its own
    /// instant, so exact-timestamp matches are excluded for checkpoint
    /// anchors; roll-forward and initial anchors sit at the window start and
    /// include a movement landing exactly there.
    fn net_after_anchor(
        &self,
        account: &str,
        window: &PeriodWindow,
        anchor: &AnchorMetadata,
    ) -> f64 {
        self.input
            .occurrences
            .iter()
            .filter(|o| o.account == account && window.contains(o.timestamp))
            .filter(|o| match anchor.source {
                AnchorSource::Checkpoint => o.timestamp > anchor.timestamp,
                AnchorSource::RollForward | AnchorSource::Initial => {
                    o.timestamp >= anchor.timestamp
                }
            })
            .map(|o| o.amount)
            .sum()
    }
}
