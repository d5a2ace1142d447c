//! CLI definition using clap

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fleet-analytics")]
#[command(version)]
#[command(about = "Fleet revenue, cost, fuel and compliance reports from trip logs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: View,

    /// Directory holding the five source CSV files
    #[arg(long, short = 'd', global = true, default_value = "data")]
    pub data_dir: PathBuf,

    /// TOML config file; defaults apply when it does not exist
    #[arg(long, short = 'c', global = true, default_value = "fleet.toml")]
    pub config: PathBuf,

    /// Reporting month (YYYY-MM). Defaults to the latest month in the log.
    #[arg(long, short = 'p', global = true)]
    pub period: Option<String>,

    /// Truck filter, or "All"
    #[arg(long, global = true, default_value = "All")]
    pub truck: String,

    /// Route filter, or "All"
    #[arg(long, global = true, default_value = "All")]
    pub route: String,

    /// Date compliance windows are measured from (YYYY-MM-DD). Defaults to today.
    #[arg(long, global = true)]
    pub today: Option<NaiveDate>,

    /// Write CSV/JSON exports into this directory
    #[arg(long, short = 'o', global = true)]
    pub out_dir: Option<PathBuf>,

    /// Rows shown per table preview
    #[arg(long, global = true, default_value_t = 10)]
    pub rows: usize,

    /// Verbose logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// List the months present in the trip log
    Periods,
    /// Revenue, cost and profit by truck and route
    Financials,
    /// Tons moved, trips and distance
    Operations,
    /// Fuel efficiency by day and truck
    Fuel,
    /// Service and document expiry status
    Maintenance,
    /// Top performers, loss makers and pricing advice
    Alerts,
    /// Every view above except `periods`
    All,
}
