//! Left-joins filtered trips against the reference tables.
//!
//! Every reference table is indexed by its key first; a duplicate key aborts
//! the join instead of multiplying trip rows. The output always has exactly
//! one row per input trip.

use crate::error::{Error, Result};
use crate::types::{CostSchedule, DistanceSample, RouteContract, TripRecord, TruckProfile};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, error};

/// Where a trip's distance is read from.
///
/// The tracker holds one reading per truck, so under `Tracker` every trip a
/// truck makes in the period gets the same distance. `RouteContract` uses the
/// contracted distance of the trip's route instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceSource {
    #[default]
    Tracker,
    RouteContract,
}

/// A reference lookup that found no match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissingReference {
    RouteContract,
    TruckProfile,
    CostSchedule,
    DistanceSample,
}

/// A trip with its reference attributes attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    pub trip: TripRecord,
    pub rate_per_ton: Option<f64>,
    pub driver_name: Option<String>,
    /// Resolved per [`DistanceSource`].
    pub distance_km: Option<f64>,
    pub fuel_cost_per_km: Option<f64>,
    pub maintenance_cost_per_km: Option<f64>,
    pub tyres_cost_per_km: Option<f64>,
    pub daily_fixed_cost: Option<f64>,
    /// Lookups that found no row. Empty when every reference matched.
    pub missing: Vec<MissingReference>,
}

/// Index `rows` by `key`, failing on the first duplicate.
fn unique_index<'a, T>(
    table: &'static str,
    rows: &'a [T],
    key: impl Fn(&T) -> &str,
) -> Result<HashMap<&'a str, &'a T>> {
    let mut index = HashMap::with_capacity(rows.len());
    for row in rows {
        let k = key(row);
        if index.insert(k, row).is_some() {
            error!(table, key = k, "duplicate reference key");
            return Err(Error::DataIntegrity {
                table,
                key: k.to_string(),
            });
        }
    }
    Ok(index)
}

/// Join `trips` with route, truck, cost and distance attributes.
///
/// Fails with [`Error::DataIntegrity`] when a reference table repeats a key.
/// The tracker is only checked when it is the configured distance source.
pub fn join_trips(
    trips: &[TripRecord],
    routes: &[RouteContract],
    trucks: &[TruckProfile],
    costs: &[CostSchedule],
    distances: &[DistanceSample],
    distance_source: DistanceSource,
) -> Result<Vec<EnrichedRecord>> {
    let routes = unique_index("route contracts", routes, |r| r.route_code.as_str())?;
    let trucks = unique_index("truck registry", trucks, |t| t.truck_id.as_str())?;
    let costs = unique_index("cost schedule", costs, |c| c.truck_id.as_str())?;
    let tracker = match distance_source {
        DistanceSource::Tracker => {
            unique_index("distance tracker", distances, |d| d.truck_id.as_str())?
        }
        DistanceSource::RouteContract => HashMap::new(),
    };

    let out: Vec<EnrichedRecord> = trips
        .iter()
        .map(|trip| {
            let mut missing = Vec::new();

            let route = routes.get(trip.route_code.as_str()).copied();
            if route.is_none() {
                missing.push(MissingReference::RouteContract);
            }
            let truck = trucks.get(trip.truck_id.as_str()).copied();
            if truck.is_none() {
                missing.push(MissingReference::TruckProfile);
            }
            let cost = costs.get(trip.truck_id.as_str()).copied();
            if cost.is_none() {
                missing.push(MissingReference::CostSchedule);
            }
            let distance_km = match distance_source {
                DistanceSource::Tracker => {
                    let sample = tracker.get(trip.truck_id.as_str()).copied();
                    if sample.is_none() {
                        missing.push(MissingReference::DistanceSample);
                    }
                    sample.and_then(|d| d.distance_km)
                }
                DistanceSource::RouteContract => route.and_then(|r| r.distance_km),
            };

            EnrichedRecord {
                trip: trip.clone(),
                rate_per_ton: route.and_then(|r| r.rate_per_ton),
                driver_name: truck.and_then(|t| t.driver_name.clone()),
                distance_km,
                fuel_cost_per_km: cost.and_then(|c| c.fuel_cost_per_km),
                maintenance_cost_per_km: cost.and_then(|c| c.maintenance_cost_per_km),
                tyres_cost_per_km: cost.and_then(|c| c.tyres_cost_per_km),
                daily_fixed_cost: cost.and_then(|c| c.daily_fixed_cost),
                missing,
            }
        })
        .collect();

    let unmatched = out.iter().filter(|r| !r.missing.is_empty()).count();
    if unmatched > 0 {
        debug!(unmatched, rows = out.len(), "trips with missing reference rows");
    }
    Ok(out)
}
