// Display rows for the console and the CSV exports.
//
// Every field is formatted text; engine results stay numeric until here.
use crate::format::{format_currency, format_number, format_opt};
use fleet_analytics::aggregate::{GroupRow, RouteAggregate, TruckCostRow};
use fleet_analytics::compliance::{ComplianceRow, DocumentStatus};
use fleet_analytics::recommend::PricingRecommendation;
use serde::Serialize;
use tabled::Tabled;

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TruckCostDisplay {
    #[serde(rename = "TruckID")]
    #[tabled(rename = "TruckID")]
    pub truck_id: String,
    #[serde(rename = "Driver Name")]
    #[tabled(rename = "Driver Name")]
    pub driver: String,
    #[serde(rename = "Revenue (R)")]
    #[tabled(rename = "Revenue (R)")]
    pub revenue: String,
    #[serde(rename = "Variable Cost (R)")]
    #[tabled(rename = "Variable Cost (R)")]
    pub variable_cost: String,
    #[serde(rename = "Fixed Cost (R)")]
    #[tabled(rename = "Fixed Cost (R)")]
    pub fixed_cost: String,
    #[serde(rename = "Total Cost (R)")]
    #[tabled(rename = "Total Cost (R)")]
    pub total_cost: String,
    #[serde(rename = "Profit (R)")]
    #[tabled(rename = "Profit (R)")]
    pub profit: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RouteDisplay {
    #[serde(rename = "Route Code")]
    #[tabled(rename = "Route Code")]
    pub route_code: String,
    #[serde(rename = "Mean Rate")]
    #[tabled(rename = "Mean Rate")]
    pub mean_rate: String,
    #[serde(rename = "Mean Revenue")]
    #[tabled(rename = "Mean Revenue")]
    pub mean_revenue: String,
    #[serde(rename = "Mean Cost")]
    #[tabled(rename = "Mean Cost")]
    pub mean_cost: String,
    #[serde(rename = "Mean Profit")]
    #[tabled(rename = "Mean Profit")]
    pub mean_profit: String,
    #[serde(rename = "Total Tons")]
    #[tabled(rename = "Total Tons")]
    pub total_tons: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct GroupDisplay {
    #[serde(rename = "Key")]
    #[tabled(rename = "Key")]
    pub key: String,
    #[serde(rename = "Driver Name")]
    #[tabled(rename = "Driver Name")]
    pub label: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(rename = "Records")]
    #[tabled(rename = "Records")]
    pub records: usize,
    #[serde(rename = "Excluded")]
    #[tabled(rename = "Excluded")]
    pub excluded: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ComplianceDisplay {
    #[serde(rename = "TruckID")]
    #[tabled(rename = "TruckID")]
    pub truck_id: String,
    #[serde(rename = "Driver Name")]
    #[tabled(rename = "Driver Name")]
    pub driver: String,
    #[serde(rename = "KM Since Service")]
    #[tabled(rename = "KM Since Service")]
    pub km_since_service: String,
    #[serde(rename = "Service Due")]
    #[tabled(rename = "Service Due")]
    pub service_due: String,
    #[serde(rename = "License Days Left")]
    #[tabled(rename = "License Days Left")]
    pub vehicle_license: String,
    #[serde(rename = "Driver License Days Left")]
    #[tabled(rename = "Driver License Days Left")]
    pub driver_license: String,
    #[serde(rename = "GIT Insurance Days Left")]
    #[tabled(rename = "GIT Insurance Days Left")]
    pub git_insurance: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct PricingDisplay {
    #[serde(rename = "Route Code")]
    #[tabled(rename = "Route Code")]
    pub route_code: String,
    #[serde(rename = "Current Rate")]
    #[tabled(rename = "Current Rate")]
    pub current_rate: String,
    #[serde(rename = "Suggested Rate")]
    #[tabled(rename = "Suggested Rate")]
    pub suggested_rate: String,
    #[serde(rename = "Mean Profit")]
    #[tabled(rename = "Mean Profit")]
    pub mean_profit: String,
    #[serde(rename = "Total Tons")]
    #[tabled(rename = "Total Tons")]
    pub total_tons: String,
}

fn currency_opt(v: Option<f64>) -> String {
    v.map(format_currency).unwrap_or_else(|| "-".to_string())
}

pub fn truck_costs(rows: &[TruckCostRow]) -> Vec<TruckCostDisplay> {
    rows.iter()
        .map(|r| TruckCostDisplay {
            truck_id: r.truck_id.clone(),
            driver: r.driver_name.clone().unwrap_or_default(),
            revenue: format_currency(r.revenue),
            variable_cost: format_currency(r.variable_cost),
            fixed_cost: format_currency(r.fixed_cost),
            total_cost: format_currency(r.total_cost),
            profit: format_currency(r.profit),
        })
        .collect()
}

pub fn routes(rows: &[RouteAggregate]) -> Vec<RouteDisplay> {
    rows.iter()
        .map(|r| RouteDisplay {
            route_code: r.route_code.clone(),
            mean_rate: currency_opt(r.mean_rate),
            mean_revenue: currency_opt(r.mean_revenue),
            mean_cost: currency_opt(r.mean_total_cost),
            mean_profit: currency_opt(r.mean_profit),
            total_tons: format_number(r.total_quantity, 1),
        })
        .collect()
}

/// `decimals` applies to the value column; `currency` prefixes it with `R`.
pub fn groups(rows: &[GroupRow], decimals: usize, currency: bool) -> Vec<GroupDisplay> {
    rows.iter()
        .map(|r| GroupDisplay {
            key: r.key.clone(),
            label: r.label.clone().unwrap_or_default(),
            value: if currency {
                currency_opt(r.value)
            } else {
                format_opt(r.value, decimals)
            },
            records: r.records,
            excluded: r.excluded,
        })
        .collect()
}

fn days(status: &DocumentStatus) -> String {
    match status.days_left {
        Some(d) if status.expiring_soon => format!("{} (!)", d),
        Some(d) => d.to_string(),
        None => "-".to_string(),
    }
}

pub fn compliance(rows: &[ComplianceRow]) -> Vec<ComplianceDisplay> {
    rows.iter()
        .map(|r| ComplianceDisplay {
            truck_id: r.truck.truck_id.clone(),
            driver: r.truck.driver_name.clone().unwrap_or_default(),
            km_since_service: format_opt(r.km_since_service, 0),
            service_due: if r.service_due { "Yes" } else { "No" }.to_string(),
            vehicle_license: days(&r.vehicle_license),
            driver_license: days(&r.driver_license),
            git_insurance: days(&r.git_insurance),
        })
        .collect()
}

pub fn pricing(rows: &[PricingRecommendation]) -> Vec<PricingDisplay> {
    rows.iter()
        .map(|r| PricingDisplay {
            route_code: r.route_code.clone(),
            current_rate: format_currency(r.current_rate),
            suggested_rate: format_currency(r.suggested_rate),
            mean_profit: format_currency(r.mean_profit),
            total_tons: format_number(r.total_quantity, 1),
        })
        .collect()
}
