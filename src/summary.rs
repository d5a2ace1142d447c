//! Headline figures for the financial, operations and fuel views.

use crate::aggregate::{aggregate, total, Aggregation, GroupKey, Metric};
use crate::metrics::DerivedRecord;
use crate::util::mean;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub total_revenue: f64,
    pub total_cost: f64,
    pub total_profit: f64,
    /// Profit over revenue; `None` without positive revenue.
    pub profit_margin: Option<f64>,
    /// Mean of total cost per km over records that travelled.
    pub avg_cost_per_km: Option<f64>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub records: usize,
    pub missing_reference_records: usize,
}

impl FinancialSummary {
    pub fn from_records(records: &[DerivedRecord]) -> Self {
        let total_revenue = total(records, Metric::Revenue);
        let total_profit = total(records, Metric::Profit);
        let per_km: Vec<f64> = records
            .iter()
            .filter_map(|r| match r.record.distance_km {
                Some(km) if km > 0.0 => Some(r.total_cost / km),
                _ => None,
            })
            .collect();
        let dates = records.iter().map(|r| r.record.trip.date);

        Self {
            total_revenue,
            total_cost: total(records, Metric::TotalCost),
            total_profit,
            profit_margin: (total_revenue > 0.0).then(|| total_profit / total_revenue),
            avg_cost_per_km: mean(&per_km),
            first_date: dates.clone().min(),
            last_date: dates.max(),
            records: records.len(),
            missing_reference_records: records
                .iter()
                .filter(|r| r.missing_reference_data)
                .count(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OperationsSummary {
    pub active_trucks: usize,
    pub total_tons: f64,
    pub total_km: f64,
    pub avg_tons_per_truck: f64,
    pub offloading_trips: usize,
}

impl OperationsSummary {
    pub fn from_records(records: &[DerivedRecord]) -> Self {
        let active_trucks = records
            .iter()
            .map(|r| r.truck_id())
            .collect::<HashSet<_>>()
            .len();
        let total_tons = total(records, Metric::Tonnage);
        Self {
            active_trucks,
            total_tons,
            total_km: total(records, Metric::Distance),
            avg_tons_per_truck: if active_trucks > 0 {
                total_tons / active_trucks as f64
            } else {
                0.0
            },
            offloading_trips: records.iter().filter(|r| r.is_offloading()).count(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FuelSummary {
    /// Mean km per unit of fuel over valid fuel records.
    pub avg_efficiency: Option<f64>,
    pub total_fuel: f64,
    /// Highest per-truck mean efficiency.
    pub best_truck_efficiency: Option<f64>,
    /// Fuel records left out of the efficiency figures.
    pub excluded_records: usize,
}

impl FuelSummary {
    pub fn from_records(records: &[DerivedRecord]) -> Self {
        let valid: Vec<f64> = records
            .iter()
            .filter_map(|r| r.fuel_efficiency.value())
            .collect();
        let best_truck_efficiency = aggregate(
            records,
            GroupKey::Truck,
            Metric::FuelEfficiency,
            Aggregation::Mean,
        )
        .into_iter()
        .filter_map(|row| row.value)
        .reduce(f64::max);

        Self {
            avg_efficiency: mean(&valid),
            total_fuel: total(records, Metric::FuelVolume),
            best_truck_efficiency,
            excluded_records: records
                .iter()
                .filter(|r| r.fuel_efficiency.is_invalid())
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::EnrichedRecord;
    use crate::metrics::derive;
    use crate::types::{DocType, TripRecord};

    fn rec(day: u32, truck: &str, doc_type: DocType, quantity: f64) -> DerivedRecord {
        derive(&EnrichedRecord {
            trip: TripRecord {
                date: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
                truck_id: truck.to_string(),
                route_code: "R1".to_string(),
                doc_type,
                quantity,
            },
            rate_per_ton: Some(100.0),
            driver_name: None,
            distance_km: Some(100.0),
            fuel_cost_per_km: Some(1.0),
            maintenance_cost_per_km: Some(1.0),
            tyres_cost_per_km: Some(0.0),
            daily_fixed_cost: Some(100.0),
            missing: vec![],
        })
    }

    fn sample() -> Vec<DerivedRecord> {
        vec![
            rec(3, "T1", DocType::Offloading, 10.0),
            rec(1, "T2", DocType::Offloading, 20.0),
            rec(2, "T1", DocType::Fuel, 50.0),
            rec(4, "T2", DocType::Fuel, 0.0),
        ]
    }

    #[test]
    fn financial_totals() {
        let s = FinancialSummary::from_records(&sample());
        // revenue 1000 + 2000; each record costs 100 * 2 + 100
        assert_eq!(s.total_revenue, 3000.0);
        assert_eq!(s.total_cost, 1200.0);
        assert_eq!(s.total_profit, 2400.0);
        assert_eq!(s.profit_margin, Some(0.8));
        assert_eq!(s.avg_cost_per_km, Some(3.0));
        assert_eq!(s.first_date, NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(s.last_date, NaiveDate::from_ymd_opt(2025, 6, 4));
        assert_eq!(s.missing_reference_records, 0);
    }

    #[test]
    fn operations_counts_tons_only_from_offloading() {
        let s = OperationsSummary::from_records(&sample());
        assert_eq!(s.active_trucks, 2);
        assert_eq!(s.total_tons, 30.0);
        assert_eq!(s.total_km, 400.0);
        assert_eq!(s.avg_tons_per_truck, 15.0);
        assert_eq!(s.offloading_trips, 2);
    }

    #[test]
    fn fuel_excludes_zero_volume() {
        let s = FuelSummary::from_records(&sample());
        assert_eq!(s.avg_efficiency, Some(2.0));
        assert_eq!(s.total_fuel, 50.0);
        assert_eq!(s.best_truck_efficiency, Some(2.0));
        assert_eq!(s.excluded_records, 1);
    }

    #[test]
    fn empty_period() {
        let s = FinancialSummary::from_records(&[]);
        assert_eq!(s.profit_margin, None);
        assert_eq!(s.first_date, None);
        assert_eq!(OperationsSummary::from_records(&[]).avg_tons_per_truck, 0.0);
        assert_eq!(FuelSummary::from_records(&[]).avg_efficiency, None);
    }
}
