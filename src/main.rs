// Entry point and high-level CLI flow.
//
// The binary plays both outside roles around the engine:
// - data source: reads the five worksheets exported as CSV from `--data-dir`;
// - presentation: prints markdown previews per view and, with `--out-dir`,
//   writes the full tables as CSV plus a JSON summary.
mod cli;
mod format;
mod output;
mod reports;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Cli, View};
use format::{format_currency, format_int, format_number, format_opt};
use fleet_analytics::aggregate::{
    aggregate, route_summary, truck_costs, Aggregation, GroupKey, Metric,
};
use fleet_analytics::compliance::{compliance, ComplianceSummary};
use fleet_analytics::filter::period_index;
use fleet_analytics::loader::{load_tables, LoadReport};
use fleet_analytics::recommend::{insights, pricing_recommendations};
use fleet_analytics::summary::{FinancialSummary, FuelSummary, OperationsSummary};
use fleet_analytics::{analyze, Analysis, EngineConfig, Period, Query, Selector, SourceTables};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

struct ViewContext<'a> {
    cli: &'a Cli,
    config: &'a EngineConfig,
    tables: &'a SourceTables,
    analysis: &'a Analysis,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn export<T: Serialize>(ctx: &ViewContext, file: &str, rows: &[T]) {
    let Some(dir) = &ctx.cli.out_dir else {
        return;
    };
    let path = dir.join(file);
    match output::write_csv(&path, rows) {
        Ok(()) => println!("(Full table exported to {})\n", path.display()),
        Err(e) => eprintln!("Write error: {:#}", e),
    }
}

fn pct(v: Option<f64>) -> String {
    v.map(|m| format!("{}%", format_number(m * 100.0, 1)))
        .unwrap_or_else(|| "-".to_string())
}

fn show_financials(ctx: &ViewContext) {
    let records = &ctx.analysis.records;
    let current = FinancialSummary::from_records(records);
    println!("Financials Overview\n");
    output::print_kpis(&[
        ("Total Revenue", format_currency(current.total_revenue)),
        ("Total Cost", format_currency(current.total_cost)),
        ("Total Profit", format_currency(current.total_profit)),
        (
            "Avg Cost/km",
            current
                .avg_cost_per_km
                .map(format_currency)
                .unwrap_or_else(|| "-".to_string()),
        ),
        ("Profit Margin", pct(current.profit_margin)),
    ]);
    if let (Some(first), Some(last)) = (current.first_date, current.last_date) {
        println!("Data from {} to {}\n", first, last);
    }

    // month-over-month, same truck/route selection
    let previous = Query {
        period: ctx.analysis.query.period.previous(),
        ..ctx.analysis.query.clone()
    };
    match analyze(ctx.tables, &previous, ctx.config) {
        Ok(prev) if !prev.records.is_empty() => {
            let p = FinancialSummary::from_records(&prev.records);
            let change = (p.total_revenue.abs() > f64::EPSILON)
                .then(|| (current.total_revenue - p.total_revenue) / p.total_revenue.abs());
            println!(
                "Revenue vs {}: {} ({})\n",
                previous.period,
                format_currency(p.total_revenue),
                pct(change)
            );
        }
        Ok(_) => {}
        Err(e) => warn!("previous period unavailable: {}", e),
    }

    let trucks = reports::truck_costs(&truck_costs(records));
    output::preview_table("Cost Structure by Truck", None, &trucks, ctx.cli.rows);
    export(ctx, "financials_by_truck.csv", &trucks);

    let routes = reports::routes(&route_summary(records));
    output::preview_table(
        "Route Profitability",
        Some("means per trip, tons offloaded"),
        &routes,
        ctx.cli.rows,
    );
    export(ctx, "route_profitability.csv", &routes);
}

fn show_operations(ctx: &ViewContext) {
    let records = &ctx.analysis.records;
    let s = OperationsSummary::from_records(records);
    println!("Operations Dashboard\n");
    output::print_kpis(&[
        ("Active Trucks", format_int(s.active_trucks)),
        ("Total Tons", format_number(s.total_tons, 1)),
        ("Distance", format!("{} km", format_number(s.total_km, 0))),
        ("Avg Tons/Truck", format_number(s.avg_tons_per_truck, 1)),
    ]);

    let daily = aggregate(records, GroupKey::Date, Metric::Tonnage, Aggregation::Sum);
    let daily = reports::groups(&daily, 1, false);
    output::preview_table("Daily Tons Moved", None, &daily, ctx.cli.rows);
    export(ctx, "daily_tons.csv", &daily);

    let tons = aggregate(records, GroupKey::Truck, Metric::Tonnage, Aggregation::Sum);
    let tons = reports::groups(&tons, 1, false);
    output::preview_table("Total Tons by Truck", None, &tons, ctx.cli.rows);
    export(ctx, "tons_by_truck.csv", &tons);

    let trips = aggregate(records, GroupKey::Truck, Metric::Tonnage, Aggregation::Count);
    let trips = reports::groups(&trips, 0, false);
    output::preview_table("Total Trips by Truck", None, &trips, ctx.cli.rows);
    export(ctx, "trips_by_truck.csv", &trips);
}

fn show_fuel(ctx: &ViewContext) {
    let records = &ctx.analysis.records;
    let s = FuelSummary::from_records(records);
    println!("Fuel Efficiency Dashboard\n");
    output::print_kpis(&[
        ("Avg Efficiency", format!("{} km/L", format_opt(s.avg_efficiency, 2))),
        ("Total Fuel", format!("{} L", format_number(s.total_fuel, 1))),
        (
            "Best Truck",
            format!("{} km/L", format_opt(s.best_truck_efficiency, 2)),
        ),
        ("Excluded Records", format_int(s.excluded_records)),
    ]);

    let daily = aggregate(
        records,
        GroupKey::Date,
        Metric::FuelEfficiency,
        Aggregation::Mean,
    );
    let daily = reports::groups(&daily, 2, false);
    output::preview_table("Daily Fuel Efficiency (km/L)", None, &daily, ctx.cli.rows);
    export(ctx, "daily_fuel_efficiency.csv", &daily);

    let trucks = aggregate(
        records,
        GroupKey::Truck,
        Metric::FuelEfficiency,
        Aggregation::Mean,
    );
    let trucks = reports::groups(&trucks, 2, false);
    output::preview_table("Fuel Efficiency by Truck (km/L)", None, &trucks, ctx.cli.rows);
    export(ctx, "fuel_efficiency_by_truck.csv", &trucks);
}

fn show_maintenance(ctx: &ViewContext, today: chrono::NaiveDate) {
    let rows = compliance(&ctx.tables.trucks, today, &ctx.config.compliance);
    let s = ComplianceSummary::from_rows(&rows);
    println!("Maintenance Dashboard (as of {})\n", today);
    output::print_kpis(&[
        ("Overdue Services", format_int(s.overdue_services)),
        ("Licenses Expiring", format_int(s.vehicle_licenses_expiring)),
        ("Driver Licenses", format_int(s.driver_licenses_expiring)),
        ("GIT Insurance", format_int(s.git_insurance_expiring)),
    ]);
    let flagged: Vec<_> = rows.iter().filter(|r| r.has_alert()).cloned().collect();
    if flagged.is_empty() {
        println!("No service or document alerts\n");
    } else {
        let attention = reports::compliance(&flagged);
        output::preview_table("Trucks Needing Attention", None, &attention, ctx.cli.rows);
        export(ctx, "compliance_alerts.csv", &attention);
    }

    let display = reports::compliance(&rows);
    output::preview_table(
        "Service and Document Status",
        Some("(!) expires within the warning window"),
        &display,
        ctx.cli.rows,
    );
    export(ctx, "compliance.csv", &display);
}

fn show_alerts(ctx: &ViewContext) {
    let records = &ctx.analysis.records;
    let found = insights(records, ctx.config.insights.top_n);
    println!("Performance Dashboard\n");
    match &found.most_profitable_truck {
        Some(t) => println!(
            "Most Profitable Truck: {} ({}) {}",
            t.key,
            t.label.as_deref().unwrap_or("-"),
            format_opt(t.value, 2)
        ),
        None => println!("No cost data available for analysis"),
    }
    match &found.most_profitable_route {
        Some(r) => println!(
            "Most Profitable Route: {} (avg profit {})\n",
            r.key,
            format_opt(r.value, 2)
        ),
        None => println!("No route data available for analysis\n"),
    }

    let worst = reports::groups(&found.least_efficient_trucks, 2, false);
    output::preview_table("Least Fuel-Efficient Trucks (km/L)", None, &worst, ctx.cli.rows);

    let losses = reports::groups(&found.loss_making_routes, 2, true);
    output::preview_table("Top Loss-Making Routes", None, &losses, ctx.cli.rows);

    let routes = route_summary(records);
    let advice = pricing_recommendations(&routes, &ctx.config.pricing);
    if advice.is_empty() {
        println!("No major pricing issues detected in high-volume routes\n");
    } else {
        let rows = reports::pricing(&advice);
        output::preview_table(
            "High-volume routes currently unprofitable",
            Some("consider rate adjustments"),
            &rows,
            ctx.cli.rows,
        );
        export(ctx, "pricing_recommendations.csv", &rows);
    }

    if let Some(dir) = &ctx.cli.out_dir {
        #[derive(Serialize)]
        struct Summary<'a> {
            query: &'a Query,
            quality: fleet_analytics::pipeline::DataQuality,
            financials: FinancialSummary,
            operations: OperationsSummary,
            fuel: FuelSummary,
            insights: &'a fleet_analytics::recommend::Insights,
            pricing: &'a [fleet_analytics::recommend::PricingRecommendation],
        }
        let summary = Summary {
            query: &ctx.analysis.query,
            quality: ctx.analysis.quality,
            financials: FinancialSummary::from_records(records),
            operations: OperationsSummary::from_records(records),
            fuel: FuelSummary::from_records(records),
            insights: &found,
            pricing: &advice,
        };
        let path = dir.join("summary.json");
        if let Err(e) = output::write_json(&path, &summary) {
            eprintln!("Write error: {:#}", e);
        } else {
            println!("Summary written to {}\n", path.display());
        }
    }
}

fn report_load(report: &LoadReport) {
    if report.skipped_rows() > 0 {
        println!(
            "Note: {} rows skipped due to parse/validation errors.",
            format_int(report.skipped_rows())
        );
    }
    if report.defaulted_quantities > 0 {
        println!(
            "Note: {} trip rows had no readable quantity and count as 0.",
            format_int(report.defaulted_quantities)
        );
    }
    if report.unparseable_dates > 0 {
        println!(
            "Note: {} expiry dates could not be read and count as missing.",
            format_int(report.unparseable_dates)
        );
    }
}

fn resolve_period(cli: &Cli, tables: &SourceTables) -> Result<Period> {
    match &cli.period {
        Some(p) => Ok(p.parse::<Period>()?),
        None => match period_index(&tables.trips).last() {
            Some(p) => Ok(*p),
            None => bail!("the trip log is empty; pass --period explicitly"),
        },
    }
}

fn ensure_out_dir(dir: &Option<PathBuf>) -> Result<()> {
    if let Some(d) = dir {
        std::fs::create_dir_all(d).with_context(|| format!("creating {}", d.display()))?;
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = EngineConfig::load(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    let (tables, load_report) = load_tables(&cli.data_dir, &config.sources)
        .with_context(|| format!("loading source tables from {}", cli.data_dir.display()))?;
    report_load(&load_report);

    if cli.command == View::Periods {
        for p in period_index(&tables.trips) {
            println!("{}  {}", p, p.display_name());
        }
        return Ok(());
    }

    ensure_out_dir(&cli.out_dir)?;
    let query = Query {
        period: resolve_period(&cli, &tables)?,
        truck: Selector::parse(&cli.truck),
        route: Selector::parse(&cli.route),
    };
    let analysis = analyze(&tables, &query, &config)?;
    info!(period = %query.period, rows = analysis.records.len(), view = ?cli.command, "running view");

    println!(
        "{} | Truck: {} | Route: {}\n",
        query.period.display_name(),
        query.truck,
        query.route
    );
    if analysis.records.is_empty() && cli.command != View::Maintenance {
        println!("No data for this selection.\n");
    } else if analysis.quality.missing_reference_rows > 0 {
        println!(
            "Warning: {} of {} records have missing reference data (counted as 0).\n",
            format_int(analysis.quality.missing_reference_rows),
            format_int(analysis.quality.filtered_rows)
        );
    }

    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let ctx = ViewContext {
        cli: &cli,
        config: &config,
        tables: &tables,
        analysis: &analysis,
    };
    match cli.command {
        View::Financials => show_financials(&ctx),
        View::Operations => show_operations(&ctx),
        View::Fuel => show_fuel(&ctx),
        View::Maintenance => show_maintenance(&ctx, today),
        View::Alerts => show_alerts(&ctx),
        View::All => {
            show_financials(&ctx);
            show_operations(&ctx);
            show_fuel(&ctx);
            show_maintenance(&ctx, today);
            show_alerts(&ctx);
        }
        View::Periods => {}
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli)
}
