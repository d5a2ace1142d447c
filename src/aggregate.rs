//! Grouping, summary statistics and rankings over derived records.

use crate::metrics::{DerivedRecord, FuelEfficiency};
use crate::util::mean;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupKey {
    Truck,
    Route,
    Date,
}

impl GroupKey {
    fn key_of(&self, r: &DerivedRecord) -> String {
        match self {
            GroupKey::Truck => r.truck_id().to_string(),
            GroupKey::Route => r.route_code().to_string(),
            // ISO dates sort chronologically as strings
            GroupKey::Date => r.record.trip.date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Per-record quantity to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    Revenue,
    VariableCost,
    FixedCost,
    TotalCost,
    Profit,
    /// Offloaded tons; fuel and other rows contribute nothing.
    Tonnage,
    /// Fuel volume; offloading and other rows contribute nothing.
    FuelVolume,
    FuelEfficiency,
    RatePerTon,
    Distance,
}

enum Sample {
    Value(f64),
    Null,
    Excluded,
}

impl Metric {
    fn sample(&self, r: &DerivedRecord) -> Sample {
        let v = match self {
            Metric::Revenue => r.revenue,
            // derived costs already read missing inputs as 0
            Metric::VariableCost => Some(r.variable_cost),
            Metric::FixedCost => Some(r.record.daily_fixed_cost.unwrap_or(0.0)),
            Metric::TotalCost => Some(r.total_cost),
            Metric::Profit => r.profit,
            Metric::Tonnage => r.tonnage(),
            Metric::FuelVolume => r.fuel_volume(),
            Metric::FuelEfficiency => match r.fuel_efficiency {
                FuelEfficiency::Valid(v) => Some(v),
                FuelEfficiency::Invalid(_) => return Sample::Excluded,
                FuelEfficiency::NotApplicable => None,
            },
            Metric::RatePerTon => r.record.rate_per_ton,
            Metric::Distance => r.record.distance_km,
        };
        v.map_or(Sample::Null, Sample::Value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregation {
    Sum,
    Mean,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ranking {
    /// The `n` groups with the largest values.
    Top(usize),
    /// The `n` groups with the smallest values.
    Bottom(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub key: String,
    /// Driver of the truck, for truck groups.
    pub label: Option<String>,
    /// `None` when the group holds no non-null value (Sum, Mean).
    pub value: Option<f64>,
    /// Records in the group.
    pub records: usize,
    /// Records skipped because their metric was invalid.
    pub excluded: usize,
}

/// Group `records` by `key` and aggregate `metric`. Rows come back in
/// ascending key order; empty input gives no rows.
pub fn aggregate(
    records: &[DerivedRecord],
    key: GroupKey,
    metric: Metric,
    agg: Aggregation,
) -> Vec<GroupRow> {
    #[derive(Default)]
    struct Acc {
        label: Option<String>,
        values: Vec<f64>,
        records: usize,
        excluded: usize,
    }

    let mut groups: BTreeMap<String, Acc> = BTreeMap::new();
    for r in records {
        let e = groups.entry(key.key_of(r)).or_default();
        e.records += 1;
        if key == GroupKey::Truck && e.label.is_none() {
            e.label = r.record.driver_name.clone();
        }
        match metric.sample(r) {
            Sample::Value(v) => e.values.push(v),
            Sample::Null => {}
            Sample::Excluded => e.excluded += 1,
        }
    }

    groups
        .into_iter()
        .map(|(key, acc)| {
            let value = match agg {
                Aggregation::Sum if acc.values.is_empty() => None,
                Aggregation::Sum => Some(acc.values.iter().sum()),
                Aggregation::Mean => mean(&acc.values),
                Aggregation::Count => Some(acc.values.len() as f64),
            };
            GroupRow {
                key,
                label: acc.label,
                value,
                records: acc.records,
                excluded: acc.excluded,
            }
        })
        .collect()
}

/// Pick the top or bottom `n` rows by value. Ties go to the smaller key;
/// rows without a value are never ranked.
pub fn rank(rows: &[GroupRow], ranking: Ranking) -> Vec<GroupRow> {
    let (n, descending) = match ranking {
        Ranking::Top(n) => (n, true),
        Ranking::Bottom(n) => (n, false),
    };
    let mut ranked: Vec<(f64, &GroupRow)> = rows
        .iter()
        .filter_map(|r| r.value.map(|v| (v, r)))
        .collect();
    ranked.sort_by(|(va, a), (vb, b)| {
        let by_value = if descending {
            vb.total_cmp(va)
        } else {
            va.total_cmp(vb)
        };
        by_value.then_with(|| a.key.cmp(&b.key))
    });
    ranked.into_iter().take(n).map(|(_, r)| r.clone()).collect()
}

/// Sum of `metric` over every record, ignoring nulls and invalid values.
pub fn total(records: &[DerivedRecord], metric: Metric) -> f64 {
    records
        .iter()
        .filter_map(|r| match metric.sample(r) {
            Sample::Value(v) => Some(v),
            _ => None,
        })
        .sum()
}

/// Route-level figures behind the profitability view and pricing advice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteAggregate {
    pub route_code: String,
    pub mean_rate: Option<f64>,
    pub mean_revenue: Option<f64>,
    pub mean_total_cost: Option<f64>,
    pub mean_profit: Option<f64>,
    /// Offloaded tons over the period.
    pub total_quantity: f64,
}

pub fn route_summary(records: &[DerivedRecord]) -> Vec<RouteAggregate> {
    let by = |metric, agg| aggregate(records, GroupKey::Route, metric, agg);
    let rate = by(Metric::RatePerTon, Aggregation::Mean);
    let revenue = by(Metric::Revenue, Aggregation::Mean);
    let cost = by(Metric::TotalCost, Aggregation::Mean);
    let profit = by(Metric::Profit, Aggregation::Mean);
    let tons = by(Metric::Tonnage, Aggregation::Sum);

    // all five share the same key set and order
    rate.into_iter()
        .zip(revenue)
        .zip(cost)
        .zip(profit)
        .zip(tons)
        .map(|((((rate, revenue), cost), profit), tons)| RouteAggregate {
            route_code: rate.key,
            mean_rate: rate.value,
            mean_revenue: revenue.value,
            mean_total_cost: cost.value,
            mean_profit: profit.value,
            total_quantity: tons.value.unwrap_or(0.0),
        })
        .collect()
}

/// Cost structure and result per truck.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TruckCostRow {
    pub truck_id: String,
    pub driver_name: Option<String>,
    pub revenue: f64,
    pub variable_cost: f64,
    pub fixed_cost: f64,
    pub total_cost: f64,
    pub profit: f64,
}

pub fn truck_costs(records: &[DerivedRecord]) -> Vec<TruckCostRow> {
    let mut map: BTreeMap<&str, TruckCostRow> = BTreeMap::new();
    for r in records {
        let e = map.entry(r.truck_id()).or_insert_with(|| TruckCostRow {
            truck_id: r.truck_id().to_string(),
            driver_name: r.record.driver_name.clone(),
            revenue: 0.0,
            variable_cost: 0.0,
            fixed_cost: 0.0,
            total_cost: 0.0,
            profit: 0.0,
        });
        e.revenue += r.revenue.unwrap_or(0.0);
        e.variable_cost += r.variable_cost;
        e.fixed_cost += r.record.daily_fixed_cost.unwrap_or(0.0);
        e.total_cost += r.total_cost;
        e.profit += r.profit.unwrap_or(0.0);
    }
    map.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::EnrichedRecord;
    use crate::metrics::{derive, InvalidComputation};
    use crate::types::{DocType, TripRecord};
    use chrono::NaiveDate;

    fn rec(truck: &str, route: &str, profit: Option<f64>) -> DerivedRecord {
        let trip = TripRecord {
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            truck_id: truck.to_string(),
            route_code: route.to_string(),
            doc_type: if profit.is_some() {
                DocType::Offloading
            } else {
                DocType::Fuel
            },
            quantity: 10.0,
        };
        let mut d = derive(&EnrichedRecord {
            trip,
            rate_per_ton: Some(100.0),
            driver_name: Some(format!("driver-{truck}")),
            distance_km: Some(50.0),
            fuel_cost_per_km: Some(1.0),
            maintenance_cost_per_km: Some(0.0),
            tyres_cost_per_km: Some(0.0),
            daily_fixed_cost: Some(0.0),
            missing: vec![],
        });
        d.profit = profit;
        d
    }

    #[test]
    fn sums_profit_per_truck() {
        let records = vec![rec("T1", "R1", Some(100.0)), rec("T1", "R2", Some(-50.0))];
        let rows = aggregate(&records, GroupKey::Truck, Metric::Profit, Aggregation::Sum);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "T1");
        assert_eq!(rows[0].label.as_deref(), Some("driver-T1"));
        assert_eq!(rows[0].value, Some(50.0));
    }

    #[test]
    fn empty_input_gives_no_rows() {
        let rows = aggregate(&[], GroupKey::Route, Metric::Profit, Aggregation::Mean);
        assert!(rows.is_empty());
    }

    #[test]
    fn mean_of_nulls_is_none() {
        let records = vec![rec("T1", "R1", None), rec("T2", "R1", Some(0.0))];
        let rows = aggregate(&records, GroupKey::Truck, Metric::Profit, Aggregation::Mean);
        assert_eq!(rows[0].value, None);
        assert_eq!(rows[1].value, Some(0.0));
    }

    #[test]
    fn count_skips_nulls() {
        let records = vec![
            rec("T1", "R1", Some(1.0)),
            rec("T1", "R1", None),
            rec("T1", "R1", Some(2.0)),
        ];
        let rows = aggregate(&records, GroupKey::Truck, Metric::Tonnage, Aggregation::Count);
        assert_eq!(rows[0].value, Some(2.0));
        assert_eq!(rows[0].records, 3);
    }

    #[test]
    fn invalid_efficiency_is_excluded_and_counted() {
        let mut bad = rec("T1", "R1", None);
        bad.fuel_efficiency = FuelEfficiency::Invalid(InvalidComputation::ZeroFuelVolume);
        let good = rec("T1", "R1", None);
        let rows = aggregate(
            &[bad, good],
            GroupKey::Truck,
            Metric::FuelEfficiency,
            Aggregation::Mean,
        );
        assert_eq!(rows[0].value, Some(5.0));
        assert_eq!(rows[0].excluded, 1);
    }

    #[test]
    fn ranking_breaks_ties_by_key() {
        let records = vec![
            rec("T3", "R1", Some(10.0)),
            rec("T1", "R1", Some(10.0)),
            rec("T2", "R1", Some(5.0)),
            rec("T4", "R1", None),
        ];
        let rows = aggregate(&records, GroupKey::Truck, Metric::Profit, Aggregation::Sum);

        let top: Vec<_> = rank(&rows, Ranking::Top(2)).into_iter().map(|r| r.key).collect();
        assert_eq!(top, vec!["T1", "T3"]);

        let bottom: Vec<_> = rank(&rows, Ranking::Bottom(5))
            .into_iter()
            .map(|r| r.key)
            .collect();
        assert_eq!(bottom, vec!["T2", "T1", "T3"]);
    }

    #[test]
    fn groups_by_date_in_order() {
        let mut a = rec("T1", "R1", Some(1.0));
        a.record.trip.date = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let b = rec("T1", "R1", Some(2.0));
        let rows = aggregate(&[a, b], GroupKey::Date, Metric::Profit, Aggregation::Sum);
        let keys: Vec<_> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["2025-06-01", "2025-06-10"]);
    }

    #[test]
    fn route_summary_uses_offloaded_tons() {
        let records = vec![
            rec("T1", "R1", Some(-10.0)),
            rec("T2", "R1", Some(30.0)),
            rec("T1", "R1", None),
            rec("T1", "R2", None),
        ];
        let routes = route_summary(&records);
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].route_code, "R1");
        assert_eq!(routes[0].mean_profit, Some(10.0));
        assert_eq!(routes[0].total_quantity, 20.0);
        assert_eq!(routes[0].mean_rate, Some(100.0));
        assert_eq!(routes[1].mean_profit, None);
        assert_eq!(routes[1].total_quantity, 0.0);
    }

    #[test]
    fn truck_costs_split_fixed_and_variable() {
        let records = vec![rec("T1", "R1", Some(950.0)), rec("T1", "R1", None)];
        let rows = truck_costs(&records);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].variable_cost, 100.0);
        assert_eq!(rows[0].revenue, 1000.0);
        assert_eq!(rows[0].profit, 950.0);
    }
}
