//! Filter, join and derive in one call.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::filter::{filter_trips, Period, Selector};
use crate::join::join_trips;
use crate::metrics::{derive_all, DerivedRecord};
use crate::types::SourceTables;
use serde::{Deserialize, Serialize};
use tracing::info;

/// What the presentation layer asks for on each interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub period: Period,
    pub truck: Selector,
    pub route: Selector,
}

impl Query {
    pub fn period(period: Period) -> Self {
        Self {
            period,
            truck: Selector::All,
            route: Selector::All,
        }
    }
}

/// Data-quality counters for one analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DataQuality {
    pub filtered_rows: usize,
    pub missing_reference_rows: usize,
    pub invalid_efficiency_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub query: Query,
    pub records: Vec<DerivedRecord>,
    pub quality: DataQuality,
}

/// Run the per-record stages for `query`.
///
/// A query matching no trips returns an empty analysis. Duplicate reference
/// keys fail with [`crate::Error::DataIntegrity`] even then.
pub fn analyze(tables: &SourceTables, query: &Query, config: &EngineConfig) -> Result<Analysis> {
    let filtered = filter_trips(&tables.trips, query.period, &query.truck, &query.route);
    let enriched = join_trips(
        &filtered,
        &tables.routes,
        &tables.trucks,
        &tables.costs,
        &tables.distances,
        config.join.distance_source,
    )?;
    let records = derive_all(&enriched);

    let quality = DataQuality {
        filtered_rows: filtered.len(),
        missing_reference_rows: records.iter().filter(|r| r.missing_reference_data).count(),
        invalid_efficiency_rows: records
            .iter()
            .filter(|r| r.fuel_efficiency.is_invalid())
            .count(),
    };
    info!(
        period = %query.period,
        truck = %query.truck,
        route = %query.route,
        rows = quality.filtered_rows,
        missing = quality.missing_reference_rows,
        invalid = quality.invalid_efficiency_rows,
        "analysis complete"
    );

    Ok(Analysis {
        query: query.clone(),
        records,
        quality,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::FuelEfficiency;
    use crate::types::{CostSchedule, DistanceSample, DocType, TripRecord};
    use chrono::NaiveDate;

    fn tables() -> SourceTables {
        let trip = |day, doc, qty| TripRecord {
            date: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
            truck_id: "T1".to_string(),
            route_code: "R1".to_string(),
            doc_type: doc,
            quantity: qty,
        };
        SourceTables {
            trips: vec![
                trip(1, DocType::Offloading, 20.0),
                trip(2, DocType::Fuel, 0.0),
                trip(3, DocType::Fuel, 100.0),
            ],
            routes: Vec::new(),
            trucks: Vec::new(),
            costs: vec![CostSchedule {
                truck_id: "T1".to_string(),
                fuel_cost_per_km: Some(10.0),
                maintenance_cost_per_km: Some(2.0),
                tyres_cost_per_km: Some(1.5),
                daily_fixed_cost: Some(1000.0),
            }],
            distances: vec![DistanceSample {
                truck_id: "T1".to_string(),
                distance_km: Some(300.0),
            }],
        }
    }

    #[test]
    fn counts_quality_issues() {
        let query = Query::period(Period::new(2025, 6).unwrap());
        let analysis = analyze(&tables(), &query, &EngineConfig::default()).unwrap();

        assert_eq!(analysis.quality.filtered_rows, 3);
        // no route contract or truck profile for any row
        assert_eq!(analysis.quality.missing_reference_rows, 3);
        assert_eq!(analysis.quality.invalid_efficiency_rows, 1);
        assert_eq!(analysis.records[2].fuel_efficiency, FuelEfficiency::Valid(3.0));
        assert_eq!(analysis.records[0].revenue, Some(0.0));
    }

    #[test]
    fn selector_with_no_match_is_empty() {
        let query = Query {
            period: Period::new(2025, 6).unwrap(),
            truck: Selector::parse("T9"),
            route: Selector::All,
        };
        let analysis = analyze(&tables(), &query, &EngineConfig::default()).unwrap();
        assert!(analysis.records.is_empty());
        assert_eq!(analysis.quality, DataQuality::default());
    }
}
