//! Typed schemas of the five source tables.
//!
//! `Raw*` rows mirror the worksheet headers exactly and keep every cell as
//! text; the loader turns them into the typed entities below.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of event a trip log row records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocType {
    Offloading,
    Fuel,
    Other(String),
}

impl DocType {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "Offloading" => DocType::Offloading,
            "Fuel" => DocType::Fuel,
            other => DocType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocType::Offloading => write!(f, "Offloading"),
            DocType::Fuel => write!(f, "Fuel"),
            DocType::Other(s) => write!(f, "{}", s),
        }
    }
}

/// One row of the trip/fuel log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub date: NaiveDate,
    pub truck_id: String,
    pub route_code: String,
    pub doc_type: DocType,
    /// Overloaded by `doc_type`: tons offloaded for [`DocType::Offloading`],
    /// fuel volume for [`DocType::Fuel`]. The source log stores both in the
    /// same column, so it is kept as one field here.
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteContract {
    pub route_code: String,
    pub rate_per_ton: Option<f64>,
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckProfile {
    pub truck_id: String,
    pub driver_name: Option<String>,
    pub current_mileage: Option<f64>,
    pub last_service_mileage: Option<f64>,
    pub vehicle_license_expiry: Option<NaiveDate>,
    pub driver_license_expiry: Option<NaiveDate>,
    pub git_insurance_expiry: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSchedule {
    pub truck_id: String,
    pub fuel_cost_per_km: Option<f64>,
    pub maintenance_cost_per_km: Option<f64>,
    pub tyres_cost_per_km: Option<f64>,
    pub daily_fixed_cost: Option<f64>,
}

/// Distance tracker reading. Keyed by truck only, not by trip or date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceSample {
    pub truck_id: String,
    pub distance_km: Option<f64>,
}

/// The five tables a data source hands to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceTables {
    pub trips: Vec<TripRecord>,
    pub routes: Vec<RouteContract>,
    pub trucks: Vec<TruckProfile>,
    pub costs: Vec<CostSchedule>,
    pub distances: Vec<DistanceSample>,
}

#[derive(Debug, Deserialize)]
pub struct RawTripRow {
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "TruckID")]
    pub truck_id: Option<String>,
    #[serde(rename = "Route Code")]
    pub route_code: Option<String>,
    #[serde(rename = "Doc Type")]
    pub doc_type: Option<String>,
    #[serde(rename = "Ton Reg")]
    pub quantity: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawRouteRow {
    #[serde(rename = "Route Code")]
    pub route_code: Option<String>,
    #[serde(rename = "Rate per ton")]
    pub rate_per_ton: Option<String>,
    #[serde(rename = "Distance (km)", default)]
    pub distance_km: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawTruckRow {
    #[serde(rename = "TruckID")]
    pub truck_id: Option<String>,
    #[serde(rename = "Driver Name")]
    pub driver_name: Option<String>,
    #[serde(rename = "Current Mileage")]
    pub current_mileage: Option<String>,
    #[serde(rename = "Last Service Mileage")]
    pub last_service_mileage: Option<String>,
    #[serde(rename = "Vehicle License Expiry")]
    pub vehicle_license_expiry: Option<String>,
    #[serde(rename = "Driver License Expiry")]
    pub driver_license_expiry: Option<String>,
    #[serde(rename = "GIT Insurance Expiry")]
    pub git_insurance_expiry: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawCostRow {
    #[serde(rename = "TruckID")]
    pub truck_id: Option<String>,
    #[serde(rename = "Fuel Cost (R/km)")]
    pub fuel_cost_per_km: Option<String>,
    #[serde(rename = "Maintenance Cost (R/km)")]
    pub maintenance_cost_per_km: Option<String>,
    #[serde(rename = "Tyres (R/km)")]
    pub tyres_cost_per_km: Option<String>,
    #[serde(rename = "Daily Fixed Cost (R/day)")]
    pub daily_fixed_cost: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawDistanceRow {
    #[serde(rename = "TruckID")]
    pub truck_id: Option<String>,
    #[serde(rename = "Distance (km)")]
    pub distance_km: Option<String>,
}
