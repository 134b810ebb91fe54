//! Builds a small two-account forecast and prints the monthly and weekly
//! chains. Run with: cargo run --example monthly_forecast

use anyhow::Result;
use balance_chain::*;
use std::collections::BTreeMap;

fn main() -> Result<()> {
    let request = RawForecastRequest {
        months: vec!["2025-01".to_string(), "2025-02".to_string()],
        occurrences: vec![
            raw_occurrence("operating", 450.0, "2025-01-03T00:00:00Z"),
            raw_occurrence("operating", -180.0, "2025-01-07T00:00:00Z"),
            raw_occurrence("operating", -220.0, "2025-01-20T00:00:00Z"),
            raw_occurrence("operating", 375.0, "2025-02-04T00:00:00Z"),
            raw_occurrence("operating", -120.0, "2025-02-12T00:00:00Z"),
            raw_occurrence("operating", -315.0, "2025-02-21T00:00:00Z"),
            raw_occurrence("profit", 75.0, "2025-01-10T00:00:00Z"),
            raw_occurrence("profit", -50.0, "2025-01-25T00:00:00Z"),
            raw_occurrence("profit", 80.0, "2025-02-08T00:00:00Z"),
        ],
        checkpoints: vec![
            RawCheckpoint {
                id: 1,
                account: "operating".to_string(),
                balance: 1480.0,
                timestamp: "2025-01-17T14:00:00Z".to_string(),
            },
            RawCheckpoint {
                id: 2,
                account: "profit".to_string(),
                balance: 430.0,
                timestamp: "2025-02-18T13:30:00Z".to_string(),
            },
        ],
        prior_balances: BTreeMap::from([
            ("operating".to_string(), 1250.0),
            ("profit".to_string(), 300.0),
        ]),
    };

    let input = request.into_input()?;
    let forecast = BalanceChainProcessor::process(&input)?;

    println!("Monthly balances");
    println!("{:<10} {:<12} {:>12} {:>10} {:>12}  anchor", "month", "account", "beginning", "net", "ending");
    for month in &forecast.months {
        for (account, cell) in &forecast.monthly[month] {
            println!(
                "{:<10} {:<12} {:>12.2} {:>10.2} {:>12.2}  {:?}{}",
                month,
                account,
                cell.beginning_balance,
                cell.net_after_anchor,
                cell.balance,
                cell.anchor.source,
                if cell.anchor.is_interim { " (interim)" } else { "" },
            );
        }
    }

    println!();
    println!("Weekly balances");
    for month in &forecast.months {
        for (week_ending, cells) in &forecast.weekly[month] {
            for (account, cell) in cells {
                println!(
                    "{:<10} {:<12} {:>12.2} {:>10.2} {:>12.2}",
                    week_ending, account, cell.beginning_balance, cell.net_after_anchor, cell.balance,
                );
            }
        }
    }

    Ok(())
}

fn raw_occurrence(account: &str, amount: f64, timestamp: &str) -> RawOccurrence {
    RawOccurrence {
        account: account.to_string(),
        amount,
        timestamp: timestamp.to_string(),
    }
}
