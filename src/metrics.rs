//! Per-record revenue, cost, profit and fuel efficiency.

use crate::join::EnrichedRecord;
use crate::types::DocType;
use serde::Serialize;

/// Why a derived metric could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InvalidComputation {
    /// A fuel record logged zero volume; km per unit would divide by zero.
    ZeroFuelVolume,
    /// No distance was found for the record, so there is nothing to divide.
    MissingDistance,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum FuelEfficiency {
    /// Not a fuel record.
    NotApplicable,
    /// Kilometres per unit of fuel.
    Valid(f64),
    /// Excluded from efficiency aggregates.
    Invalid(InvalidComputation),
}

impl FuelEfficiency {
    pub fn value(&self) -> Option<f64> {
        match self {
            FuelEfficiency::Valid(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, FuelEfficiency::Invalid(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedRecord {
    pub record: EnrichedRecord,
    /// `quantity × rate`, offloading records only.
    pub revenue: Option<f64>,
    pub variable_cost: f64,
    pub total_cost: f64,
    /// `None` whenever `revenue` is `None`.
    pub profit: Option<f64>,
    pub fuel_efficiency: FuelEfficiency,
    /// Set when a missing rate, distance or cost was read as 0, or when a
    /// reference lookup found no row.
    pub missing_reference_data: bool,
}

impl DerivedRecord {
    pub fn truck_id(&self) -> &str {
        &self.record.trip.truck_id
    }

    pub fn route_code(&self) -> &str {
        &self.record.trip.route_code
    }

    pub fn is_offloading(&self) -> bool {
        self.record.trip.doc_type == DocType::Offloading
    }

    pub fn is_fuel(&self) -> bool {
        self.record.trip.doc_type == DocType::Fuel
    }

    /// Tons offloaded; `None` for every other doc type.
    pub fn tonnage(&self) -> Option<f64> {
        self.is_offloading().then_some(self.record.trip.quantity)
    }

    /// Fuel volume; `None` for every other doc type.
    pub fn fuel_volume(&self) -> Option<f64> {
        self.is_fuel().then_some(self.record.trip.quantity)
    }
}

/// Derive the financial and efficiency fields of one record.
pub fn derive(record: &EnrichedRecord) -> DerivedRecord {
    let mut missing = !record.missing.is_empty();
    let mut or_zero = |v: Option<f64>| {
        v.unwrap_or_else(|| {
            missing = true;
            0.0
        })
    };

    let trip = &record.trip;
    let distance = or_zero(record.distance_km);
    let per_km = or_zero(record.fuel_cost_per_km)
        + or_zero(record.maintenance_cost_per_km)
        + or_zero(record.tyres_cost_per_km);
    let fixed = or_zero(record.daily_fixed_cost);

    // quantity is tons here
    let revenue = match trip.doc_type {
        DocType::Offloading => Some(trip.quantity * or_zero(record.rate_per_ton)),
        _ => None,
    };

    let variable_cost = distance * per_km;
    let total_cost = variable_cost + fixed;
    let profit = revenue.map(|r| r - total_cost);

    // quantity is fuel volume here; a missing distance is never read as 0
    let fuel_efficiency = match trip.doc_type {
        DocType::Fuel if trip.quantity == 0.0 => {
            FuelEfficiency::Invalid(InvalidComputation::ZeroFuelVolume)
        }
        DocType::Fuel => match record.distance_km {
            None => FuelEfficiency::Invalid(InvalidComputation::MissingDistance),
            Some(km) => {
                let eff = km / trip.quantity;
                if eff.is_finite() {
                    FuelEfficiency::Valid(eff)
                } else {
                    FuelEfficiency::Invalid(InvalidComputation::ZeroFuelVolume)
                }
            }
        },
        _ => FuelEfficiency::NotApplicable,
    };

    DerivedRecord {
        record: record.clone(),
        revenue,
        variable_cost,
        total_cost,
        profit,
        fuel_efficiency,
        missing_reference_data: missing,
    }
}

pub fn derive_all(records: &[EnrichedRecord]) -> Vec<DerivedRecord> {
    records.iter().map(derive).collect()
}
