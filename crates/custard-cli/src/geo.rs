//! Scope-level command handler.

use chrono::NaiveDate;
use custard_core::{AppConfig, ScopeRequest};
use custard_signals::{compute_geographic_aggregate, FlavorRankTable};

use crate::{print_json, EngineInputs};

/// Print the geographic aggregate for a scope.
///
/// # Errors
///
/// Returns an error for an invalid scope, a scope with no stores, or a failed
/// scope resolution. Failed chunk reads are reported but not fatal.
pub(crate) async fn run_geo(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    inputs: &EngineInputs,
    scope: &str,
    region: Option<&str>,
    today: NaiveDate,
    json: bool,
) -> anyhow::Result<()> {
    let request = ScopeRequest::parse(scope, region)?;
    let snapshot = custard_db::load_scope_snapshot(
        pool,
        &request,
        today,
        config.geo_lookback_days,
        config.query_chunk_size,
    )
    .await?;
    let rank_table = inputs.baseline.as_ref().map(FlavorRankTable::from_baseline);
    let aggregate = compute_geographic_aggregate(
        &snapshot,
        inputs.baseline.as_ref(),
        rank_table.as_ref(),
        &inputs.thresholds.geo,
    );

    if snapshot.failed_chunks > 0 {
        tracing::warn!(
            failed_chunks = snapshot.failed_chunks,
            "some chunked reads failed; results are incomplete"
        );
    }

    if json {
        return print_json(&aggregate);
    }

    println!("{} ({} stores)", aggregate.scope_label, aggregate.store_count);

    println!("\nEXCLUSIVE FLAVORS");
    println!("{:<30}{:>8}{:>8}{:>8}", "FLAVOR", "COUNT", "STORES", "PCT");
    for f in &aggregate.exclusive_flavors {
        println!(
            "{:<30}{:>8}{:>8}{:>7.1}%",
            f.flavor, f.appearances, f.store_count, f.pct_of_scope_stores
        );
    }

    println!("\nCADENCE VARIANCE");
    if aggregate.cadence_variance.is_empty() && inputs.baseline.is_none() {
        println!("(no national baseline configured)");
    }
    println!("{:<30}{:>10}{:>10}{:>8}", "FLAVOR", "SCOPE GAP", "NATL GAP", "RATIO");
    for c in &aggregate.cadence_variance {
        println!(
            "{:<30}{:>10.1}{:>10.1}{:>8.2}",
            c.flavor, c.scope_avg_gap_days, c.national_avg_gap_days, c.variance_ratio
        );
    }

    println!("\nOUTLIER STORES");
    println!("{:<20}{:>12}{:>8}", "STORE", "AVG/MONTH", "Z");
    for o in &aggregate.outlier_stores {
        println!(
            "{:<20}{:>12.2}{:>8.2}",
            o.store_id, o.avg_unique_flavors_per_month, o.z_score
        );
    }
    Ok(())
}
