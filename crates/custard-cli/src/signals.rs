//! Per-store command handlers.

use chrono::NaiveDate;
use custard_signals::{compute_store_signals, summarize_store};

use crate::{print_json, EngineInputs};

/// Print the ranked signal list for one store.
///
/// # Errors
///
/// Returns an error if the store is unknown or the history read fails.
pub(crate) async fn run_signals(
    pool: &sqlx::PgPool,
    inputs: &EngineInputs,
    store_id: &str,
    today: NaiveDate,
    limit: usize,
    json: bool,
) -> anyhow::Result<()> {
    let snapshot = custard_db::load_store_snapshot(pool, store_id, today).await?;
    let signals = compute_store_signals(&snapshot, today, &inputs.thresholds.signals, limit);

    if json {
        return print_json(&signals);
    }

    if signals.is_empty() {
        println!("no signals for '{store_id}' as of {today}");
        return Ok(());
    }

    println!("{:<15}{:<30}{:>8}  HEADLINE", "TYPE", "FLAVOR", "SCORE");
    for signal in &signals {
        println!(
            "{:<15}{:<30}{:>8.2}  {}",
            signal.kind().to_string(),
            signal.flavor,
            signal.score(),
            signal.headline()
        );
    }
    Ok(())
}

/// Print the diversity summary for one store.
///
/// # Errors
///
/// Returns an error if the store is unknown or the history read fails.
pub(crate) async fn run_summary(
    pool: &sqlx::PgPool,
    inputs: &EngineInputs,
    store_id: &str,
    today: NaiveDate,
    json: bool,
) -> anyhow::Result<()> {
    let snapshot = custard_db::load_store_snapshot(pool, store_id, today).await?;
    let summary = summarize_store(&snapshot, today, &inputs.thresholds.signals);

    if json {
        return print_json(&summary);
    }

    println!("store:           {}", summary.store_id);
    println!("observations:    {}", summary.observations);
    println!("unique flavors:  {}", summary.unique_flavors);
    println!("entropy (bits):  {:.3}", summary.entropy);
    println!("evenness:        {:.3}", summary.evenness);
    println!(
        "gap median/p95:  {} / {}",
        fmt_days(summary.median_gap_days),
        fmt_days(summary.p95_gap_days)
    );
    println!("overdue flavors: {}", summary.overdue_count);
    println!("top flavors:");
    for top in &summary.top_flavors {
        println!("  {:<30}{}", top.flavor, top.count);
    }
    Ok(())
}

fn fmt_days(days: Option<f64>) -> String {
    days.map_or_else(|| "n/a".to_string(), |d| format!("{d:.1}d"))
}
