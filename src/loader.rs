//! Flat-file data source: the five worksheets exported as CSV.
//!
//! Headers are validated before any row is read. Rows that cannot be typed
//! (no date, no key) are skipped and counted; the engine never sees them.

use crate::config::SourceFiles;
use crate::error::{Error, Result};
use crate::types::{
    CostSchedule, DistanceSample, DocType, RawCostRow, RawDistanceRow, RawRouteRow, RawTripRow,
    RawTruckRow, RouteContract, SourceTables, TripRecord, TruckProfile,
};
use crate::util::{non_empty, parse_date_safe, parse_f64_safe};
use chrono::NaiveDate;
use csv::{Reader, ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

const TRIP_COLUMNS: [&str; 5] = ["Date", "TruckID", "Route Code", "Doc Type", "Ton Reg"];
const TRACKER_COLUMNS: [&str; 2] = ["TruckID", "Distance (km)"];
const ROUTE_COLUMNS: [&str; 2] = ["Route Code", "Rate per ton"];
const TRUCK_COLUMNS: [&str; 7] = [
    "TruckID",
    "Driver Name",
    "Current Mileage",
    "Last Service Mileage",
    "Vehicle License Expiry",
    "Driver License Expiry",
    "GIT Insurance Expiry",
];
const COST_COLUMNS: [&str; 5] = [
    "TruckID",
    "Fuel Cost (R/km)",
    "Maintenance Cost (R/km)",
    "Tyres (R/km)",
    "Daily Fixed Cost (R/day)",
];

/// Row counts for one source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub skipped_rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub trips: TableReport,
    pub routes: TableReport,
    pub trucks: TableReport,
    pub costs: TableReport,
    pub distances: TableReport,
    /// Trip rows whose quantity cell was empty or unparseable and was read as 0.
    pub defaulted_quantities: usize,
    /// Non-empty expiry cells that could not be read as a date.
    pub unparseable_dates: usize,
}

impl LoadReport {
    pub fn skipped_rows(&self) -> usize {
        self.trips.skipped_rows
            + self.routes.skipped_rows
            + self.trucks.skipped_rows
            + self.costs.skipped_rows
            + self.distances.skipped_rows
    }
}

/// Load all five tables from `dir`.
pub fn load_tables(dir: &Path, files: &SourceFiles) -> Result<(SourceTables, LoadReport)> {
    let mut report = LoadReport::default();

    let trips = load_trips(&dir.join(&files.operations), &mut report)?;
    let routes = load_routes(&dir.join(&files.routes), &mut report.routes)?;
    let trucks = load_trucks(&dir.join(&files.trucks), &mut report)?;
    let costs = load_costs(&dir.join(&files.costs), &mut report.costs)?;
    let distances = load_distances(&dir.join(&files.tracker), &mut report.distances)?;

    info!(
        trips = trips.len(),
        routes = routes.len(),
        trucks = trucks.len(),
        costs = costs.len(),
        distances = distances.len(),
        skipped = report.skipped_rows(),
        "loaded source tables from {}",
        dir.display()
    );

    let tables = SourceTables {
        trips,
        routes,
        trucks,
        costs,
        distances,
    };
    Ok((tables, report))
}

fn open(path: &Path, required: &[&str]) -> Result<Reader<File>> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)?;
    let headers = rdr.headers()?.clone();
    for col in required {
        if !headers.iter().any(|h| h == *col) {
            return Err(Error::MissingColumn {
                file: path.display().to_string(),
                column: col.to_string(),
            });
        }
    }
    Ok(rdr)
}

/// Deserialize every row of `path`, mapping each through `convert`.
/// Rows that fail to deserialize or that `convert` rejects are skipped.
fn read_table<R, T, F>(
    path: &Path,
    required: &[&str],
    report: &mut TableReport,
    mut convert: F,
) -> Result<Vec<T>>
where
    R: DeserializeOwned,
    F: FnMut(R) -> Option<T>,
{
    let mut rdr = open(path, required)?;
    let mut out = Vec::new();
    for (idx, result) in rdr.deserialize::<R>().enumerate() {
        report.total_rows += 1;
        match result.ok().and_then(&mut convert) {
            Some(v) => out.push(v),
            None => {
                report.skipped_rows += 1;
                // +2: header is line 1 and idx is 0-based
                warn!("skipping row {} of {}", idx + 2, path.display());
            }
        }
    }
    report.loaded_rows = out.len();
    Ok(out)
}

fn load_trips(path: &Path, report: &mut LoadReport) -> Result<Vec<TripRecord>> {
    let mut defaulted = 0usize;
    let trips = read_table(path, &TRIP_COLUMNS, &mut report.trips, |row: RawTripRow| {
        let date = parse_date_safe(row.date.as_deref())?;
        let truck_id = non_empty(row.truck_id.as_deref())?;
        let route_code =
            non_empty(row.route_code.as_deref()).unwrap_or_else(|| "Unknown".to_string());
        let doc_type = DocType::parse(row.doc_type.as_deref().unwrap_or(""));
        let quantity = match parse_f64_safe(row.quantity.as_deref()) {
            Some(q) => q,
            None => {
                defaulted += 1;
                0.0
            }
        };
        Some(TripRecord {
            date,
            truck_id,
            route_code,
            doc_type,
            quantity,
        })
    })?;
    report.defaulted_quantities += defaulted;
    Ok(trips)
}

fn load_routes(path: &Path, report: &mut TableReport) -> Result<Vec<RouteContract>> {
    read_table(path, &ROUTE_COLUMNS, report, |row: RawRouteRow| {
        Some(RouteContract {
            route_code: non_empty(row.route_code.as_deref())?,
            rate_per_ton: parse_f64_safe(row.rate_per_ton.as_deref()),
            distance_km: parse_f64_safe(row.distance_km.as_deref()),
        })
    })
}

fn load_trucks(path: &Path, report: &mut LoadReport) -> Result<Vec<TruckProfile>> {
    let mut unparseable = 0usize;
    let mut expiry = |truck: &str, cell: Option<String>| -> Option<NaiveDate> {
        let date = parse_date_safe(cell.as_deref());
        if date.is_none() && non_empty(cell.as_deref()).is_some() {
            unparseable += 1;
            warn!(truck, value = ?cell, "unparseable expiry date, treating as missing");
        }
        date
    };
    let trucks = read_table(path, &TRUCK_COLUMNS, &mut report.trucks, |row: RawTruckRow| {
        let truck_id = non_empty(row.truck_id.as_deref())?;
        Some(TruckProfile {
            driver_name: non_empty(row.driver_name.as_deref()),
            current_mileage: parse_f64_safe(row.current_mileage.as_deref()),
            last_service_mileage: parse_f64_safe(row.last_service_mileage.as_deref()),
            vehicle_license_expiry: expiry(&truck_id, row.vehicle_license_expiry),
            driver_license_expiry: expiry(&truck_id, row.driver_license_expiry),
            git_insurance_expiry: expiry(&truck_id, row.git_insurance_expiry),
            truck_id,
        })
    })?;
    report.unparseable_dates += unparseable;
    Ok(trucks)
}

fn load_costs(path: &Path, report: &mut TableReport) -> Result<Vec<CostSchedule>> {
    read_table(path, &COST_COLUMNS, report, |row: RawCostRow| {
        Some(CostSchedule {
            truck_id: non_empty(row.truck_id.as_deref())?,
            fuel_cost_per_km: parse_f64_safe(row.fuel_cost_per_km.as_deref()),
            maintenance_cost_per_km: parse_f64_safe(row.maintenance_cost_per_km.as_deref()),
            tyres_cost_per_km: parse_f64_safe(row.tyres_cost_per_km.as_deref()),
            daily_fixed_cost: parse_f64_safe(row.daily_fixed_cost.as_deref()),
        })
    })
}

fn load_distances(path: &Path, report: &mut TableReport) -> Result<Vec<DistanceSample>> {
    read_table(path, &TRACKER_COLUMNS, report, |row: RawDistanceRow| {
        Some(DistanceSample {
            truck_id: non_empty(row.truck_id.as_deref())?,
            distance_km: parse_f64_safe(row.distance_km.as_deref()),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    fn fixture() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path();
        write(
            p,
            "operations.csv",
            "Date,TruckID,Route Code,Doc Type,Ton Reg\n\
             2025-06-01,T1,R1,Offloading,20\n\
             2025-06-02 08:15:00,T1,R1,Fuel,\"1,200\"\n\
             ,T2,R1,Offloading,10\n\
             2025-06-03,T2,R2,Offloading,n/a\n",
        );
        write(p, "tracker.csv", "TruckID,Distance (km)\nT1,300\nT2,\n");
        write(
            p,
            "loi.csv",
            "Route Code,Rate per ton,Distance (km)\nR1,1500,300\n,900,100\n",
        );
        write(
            p,
            "truck_pak.csv",
            "TruckID,Driver Name,Current Mileage,Last Service Mileage,Vehicle License Expiry,Driver License Expiry,GIT Insurance Expiry\n\
             T1,Sipho,120000,105000,2025-01-20,not a date,\n",
        );
        write(
            p,
            "vehicle_cost_schedule.csv",
            "TruckID,Fuel Cost (R/km),Maintenance Cost (R/km),Tyres (R/km),Daily Fixed Cost (R/day)\n\
             T1,10,2,1.5,1000\n",
        );
        dir
    }

    #[test]
    fn loads_and_types_all_tables() {
        let dir = fixture();
        let (tables, report) = load_tables(dir.path(), &SourceFiles::default()).unwrap();

        assert_eq!(tables.trips.len(), 3);
        assert_eq!(report.trips.total_rows, 4);
        assert_eq!(report.trips.skipped_rows, 1);
        assert_eq!(tables.trips[1].doc_type, DocType::Fuel);
        assert_eq!(tables.trips[1].quantity, 1200.0);
        assert_eq!(
            tables.trips[1].date,
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
        );
        assert_eq!(tables.trips[2].quantity, 0.0);
        assert_eq!(report.defaulted_quantities, 1);

        assert_eq!(tables.routes.len(), 1);
        assert_eq!(report.routes.skipped_rows, 1);
        assert_eq!(tables.distances[1].distance_km, None);

        let t1 = &tables.trucks[0];
        assert_eq!(t1.driver_name.as_deref(), Some("Sipho"));
        assert_eq!(
            t1.vehicle_license_expiry,
            NaiveDate::from_ymd_opt(2025, 1, 20)
        );
        assert_eq!(t1.driver_license_expiry, None);
        assert_eq!(t1.git_insurance_expiry, None);
        assert_eq!(report.unparseable_dates, 1);
    }

    #[test]
    fn missing_header_is_reported() {
        let dir = fixture();
        write(dir.path(), "tracker.csv", "TruckID,Km\nT1,300\n");
        let err = load_tables(dir.path(), &SourceFiles::default()).unwrap_err();
        match err {
            Error::MissingColumn { column, .. } => assert_eq!(column, "Distance (km)"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = fixture();
        fs::remove_file(dir.path().join("loi.csv")).unwrap();
        assert!(load_tables(dir.path(), &SourceFiles::default()).is_err());
    }
}
