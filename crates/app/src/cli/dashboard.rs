use clap::Args;
use jiff::civil::Date;
use rebates_app::domain::dashboard::DashboardQuery;

use crate::cli::{EnterpriseScope, failure, print_json};

/// Rebate totals across the enterprise's calculations.
#[derive(Debug, Args)]
pub(crate) struct DashboardArgs {
    #[command(flatten)]
    scope: EnterpriseScope,

    /// Only periods starting on or after this date
    #[arg(long)]
    from: Option<Date>,

    /// Only periods ending on or before this date
    #[arg(long)]
    to: Option<Date>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

pub(crate) async fn run(args: DashboardArgs) -> Result<(), String> {
    let ctx = args.scope.connect().await?;

    let summary = ctx
        .dashboard
        .get_dashboard(
            args.scope.enterprise(),
            DashboardQuery {
                from: args.from,
                to: args.to,
            },
        )
        .await
        .map_err(|error| failure("failed to build dashboard", &error))?;

    if args.json {
        return print_json(&summary);
    }

    println!(
        "calculations: {} final, {} draft",
        summary.counts.finalized, summary.counts.draft
    );

    for totals in &summary.currencies {
        println!(
            "{}: rebate {} on turnover {} (average rate {}), provisional {}",
            totals.currency,
            totals.total_rebate,
            totals.total_turnover,
            totals.average_rate,
            totals.provisional_rebate,
        );
    }

    if !summary.trend.is_empty() {
        println!("trend:");
    }

    for month in &summary.trend {
        println!(
            "  {}-{:02} {}: rebate {} on turnover {}",
            month.year, month.month, month.currency, month.total_rebate, month.total_turnover
        );
    }

    if !summary.top_contracts.is_empty() {
        println!("top contracts:");
    }

    for ranking in &summary.top_contracts {
        println!(
            "  {} {} {}",
            ranking.contract_uuid, ranking.total_rebate, ranking.currency
        );
    }

    if !summary.recent.is_empty() {
        println!("recent:");
    }

    for recent in &summary.recent {
        println!(
            "  {} {} {} {} {}",
            recent.uuid, recent.period, recent.status, recent.total_rebate, recent.currency
        );
    }

    Ok(())
}
