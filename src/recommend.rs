//! Pricing advice for unprofitable busy routes, and headline performers.

use crate::aggregate::{
    aggregate, rank, Aggregation, GroupKey, GroupRow, Metric, Ranking, RouteAggregate,
};
use crate::config::PricingConfig;
use crate::metrics::DerivedRecord;
use crate::util::percentile;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingRecommendation {
    pub route_code: String,
    /// Mean contracted rate per ton; 0 when the route has no contract rate.
    pub current_rate: f64,
    pub suggested_rate: f64,
    pub mean_profit: f64,
    pub total_quantity: f64,
}

/// Routes losing money on average while carrying more tonnage than the
/// configured percentile of all routes, each with a raised rate.
///
/// An empty result means no pricing issue was found.
pub fn pricing_recommendations(
    routes: &[RouteAggregate],
    config: &PricingConfig,
) -> Vec<PricingRecommendation> {
    let volumes: Vec<f64> = routes.iter().map(|r| r.total_quantity).collect();
    let Some(threshold) = percentile(volumes, config.volume_percentile) else {
        return Vec::new();
    };
    debug!(threshold, routes = routes.len(), "high-volume threshold");

    let mut out: Vec<PricingRecommendation> = routes
        .iter()
        .filter_map(|r| {
            let profit = r.mean_profit?;
            if profit >= 0.0 || r.total_quantity <= threshold {
                return None;
            }
            let current_rate = r.mean_rate.unwrap_or(0.0);
            Some(PricingRecommendation {
                route_code: r.route_code.clone(),
                current_rate,
                suggested_rate: current_rate * config.price_increase_factor,
                mean_profit: profit,
                total_quantity: r.total_quantity,
            })
        })
        .collect();
    out.sort_by(|a, b| a.route_code.cmp(&b.route_code));
    out
}

/// Best and worst performers for the alerts view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Insights {
    /// Highest total profit.
    pub most_profitable_truck: Option<GroupRow>,
    /// Highest mean profit per trip.
    pub most_profitable_route: Option<GroupRow>,
    /// Lowest mean fuel efficiency.
    pub least_efficient_trucks: Vec<GroupRow>,
    /// Lowest total profit, losses only.
    pub loss_making_routes: Vec<GroupRow>,
}

pub fn insights(records: &[DerivedRecord], top_n: usize) -> Insights {
    let truck_profit = aggregate(records, GroupKey::Truck, Metric::Profit, Aggregation::Sum);
    let route_mean = aggregate(records, GroupKey::Route, Metric::Profit, Aggregation::Mean);
    let route_total = aggregate(records, GroupKey::Route, Metric::Profit, Aggregation::Sum);
    let efficiency = aggregate(
        records,
        GroupKey::Truck,
        Metric::FuelEfficiency,
        Aggregation::Mean,
    );

    fn first(rows: &[GroupRow]) -> Option<GroupRow> {
        rank(rows, Ranking::Top(1)).into_iter().next()
    }

    Insights {
        most_profitable_truck: first(&truck_profit),
        most_profitable_route: first(&route_mean),
        least_efficient_trucks: rank(&efficiency, Ranking::Bottom(top_n)),
        loss_making_routes: rank(&route_total, Ranking::Bottom(top_n))
            .into_iter()
            .filter(|r| r.value.is_some_and(|v| v < 0.0))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(code: &str, rate: f64, profit: Option<f64>, tons: f64) -> RouteAggregate {
        RouteAggregate {
            route_code: code.to_string(),
            mean_rate: Some(rate),
            mean_revenue: None,
            mean_total_cost: None,
            mean_profit: profit,
            total_quantity: tons,
        }
    }

    #[test]
    fn flags_only_busy_losing_routes() {
        let routes = vec![
            route("R1", 1000.0, Some(-200.0), 700.0),
            route("R2", 1200.0, Some(-50.0), 10.0),
            route("R3", 900.0, Some(300.0), 600.0),
            route("R4", 800.0, Some(100.0), 20.0),
        ];
        let recs = pricing_recommendations(&routes, &PricingConfig::default());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].route_code, "R1");
        assert!((recs[0].suggested_rate - 1150.0).abs() < 1e-9);
    }

    #[test]
    fn threshold_is_strict() {
        // two routes: 75th percentile of [100, 100] is 100, nothing exceeds it
        let routes = vec![
            route("R1", 1000.0, Some(-1.0), 100.0),
            route("R2", 1000.0, Some(-1.0), 100.0),
        ];
        assert!(pricing_recommendations(&routes, &PricingConfig::default()).is_empty());
    }

    #[test]
    fn no_routes_no_advice() {
        assert!(pricing_recommendations(&[], &PricingConfig::default()).is_empty());
    }

    #[test]
    fn routes_without_profit_are_skipped() {
        let routes = vec![
            route("R1", 1000.0, None, 900.0),
            route("R2", 1000.0, Some(5.0), 1.0),
        ];
        assert!(pricing_recommendations(&routes, &PricingConfig::default()).is_empty());
    }
}
