//! Service and document status per truck, computed against an explicit `today`.

use crate::config::ComplianceConfig;
use crate::types::TruckProfile;
use crate::util::days_between;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DocumentKind {
    VehicleLicense,
    DriverLicense,
    GitInsurance,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [
        DocumentKind::VehicleLicense,
        DocumentKind::DriverLicense,
        DocumentKind::GitInsurance,
    ];

    fn expiry_of(&self, truck: &TruckProfile) -> Option<NaiveDate> {
        match self {
            DocumentKind::VehicleLicense => truck.vehicle_license_expiry,
            DocumentKind::DriverLicense => truck.driver_license_expiry,
            DocumentKind::GitInsurance => truck.git_insurance_expiry,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocumentKind::VehicleLicense => "License Expiry",
            DocumentKind::DriverLicense => "Driver License",
            DocumentKind::GitInsurance => "GIT Insurance",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentStatus {
    pub expiry: Option<NaiveDate>,
    /// Negative once expired; `None` without an expiry date.
    pub days_left: Option<i64>,
    pub expiring_soon: bool,
}

impl DocumentStatus {
    fn evaluate(expiry: Option<NaiveDate>, today: NaiveDate, warning_days: i64) -> Self {
        let days_left = expiry.map(|d| days_between(today, d));
        Self {
            expiry,
            days_left,
            expiring_soon: days_left.is_some_and(|d| d <= warning_days),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceRow {
    pub truck: TruckProfile,
    pub km_since_service: Option<f64>,
    pub service_due: bool,
    pub vehicle_license: DocumentStatus,
    pub driver_license: DocumentStatus,
    pub git_insurance: DocumentStatus,
}

impl ComplianceRow {
    pub fn document(&self, kind: DocumentKind) -> &DocumentStatus {
        match kind {
            DocumentKind::VehicleLicense => &self.vehicle_license,
            DocumentKind::DriverLicense => &self.driver_license,
            DocumentKind::GitInsurance => &self.git_insurance,
        }
    }

    pub fn has_alert(&self) -> bool {
        self.service_due
            || DocumentKind::ALL
                .iter()
                .any(|k| self.document(*k).expiring_soon)
    }
}

/// One row per truck, in registry order. Incomplete profiles still get a row.
pub fn compliance(
    trucks: &[TruckProfile],
    today: NaiveDate,
    config: &ComplianceConfig,
) -> Vec<ComplianceRow> {
    trucks
        .iter()
        .map(|truck| {
            let km_since_service = match (truck.current_mileage, truck.last_service_mileage) {
                (Some(current), Some(last)) => Some(current - last),
                _ => None,
            };
            let doc = |kind: DocumentKind| {
                DocumentStatus::evaluate(kind.expiry_of(truck), today, config.expiry_warning_days)
            };
            ComplianceRow {
                truck: truck.clone(),
                km_since_service,
                service_due: km_since_service.is_some_and(|km| km > config.service_interval_km),
                vehicle_license: doc(DocumentKind::VehicleLicense),
                driver_license: doc(DocumentKind::DriverLicense),
                git_insurance: doc(DocumentKind::GitInsurance),
            }
        })
        .collect()
}

/// Fleet-wide counts for the maintenance view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComplianceSummary {
    pub trucks: usize,
    pub overdue_services: usize,
    pub vehicle_licenses_expiring: usize,
    pub driver_licenses_expiring: usize,
    pub git_insurance_expiring: usize,
}

impl ComplianceSummary {
    pub fn from_rows(rows: &[ComplianceRow]) -> Self {
        let count = |kind: DocumentKind| {
            rows.iter()
                .filter(|r| r.document(kind).expiring_soon)
                .count()
        };
        Self {
            trucks: rows.len(),
            overdue_services: rows.iter().filter(|r| r.service_due).count(),
            vehicle_licenses_expiring: count(DocumentKind::VehicleLicense),
            driver_licenses_expiring: count(DocumentKind::DriverLicense),
            git_insurance_expiring: count(DocumentKind::GitInsurance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn profile(id: &str) -> TruckProfile {
        TruckProfile {
            truck_id: id.to_string(),
            driver_name: Some("Sipho".to_string()),
            current_mileage: Some(120_000.0),
            last_service_mileage: Some(105_000.0),
            vehicle_license_expiry: Some(date(2025, 1, 20)),
            driver_license_expiry: None,
            git_insurance_expiry: Some(date(2025, 6, 30)),
        }
    }

    #[test]
    fn document_windows_against_fixed_today() {
        let rows = compliance(
            &[profile("T1")],
            date(2025, 1, 1),
            &ComplianceConfig::default(),
        );
        let r = &rows[0];
        assert_eq!(r.vehicle_license.days_left, Some(19));
        assert!(r.vehicle_license.expiring_soon);
        assert_eq!(r.driver_license.days_left, None);
        assert!(!r.driver_license.expiring_soon);
        assert_eq!(r.git_insurance.days_left, Some(180));
        assert!(!r.git_insurance.expiring_soon);
    }

    #[test]
    fn expired_documents_are_expiring() {
        let rows = compliance(
            &[profile("T1")],
            date(2025, 2, 1),
            &ComplianceConfig::default(),
        );
        assert_eq!(rows[0].vehicle_license.days_left, Some(-12));
        assert!(rows[0].vehicle_license.expiring_soon);
    }

    #[test]
    fn thirty_days_is_still_flagged() {
        let rows = compliance(
            &[profile("T1")],
            date(2024, 12, 21),
            &ComplianceConfig::default(),
        );
        assert_eq!(rows[0].vehicle_license.days_left, Some(30));
        assert!(rows[0].vehicle_license.expiring_soon);
    }

    #[test]
    fn service_due_over_threshold() {
        let mut p = profile("T1");
        let cfg = ComplianceConfig::default();
        let today = date(2025, 1, 1);
        assert!(compliance(&[p.clone()], today, &cfg)[0].service_due);

        p.current_mileage = Some(115_000.0);
        let rows = compliance(&[p], today, &cfg);
        let row = &rows[0];
        assert_eq!(row.km_since_service, Some(10_000.0));
        assert!(!row.service_due);
    }

    #[test]
    fn incomplete_profiles_are_kept() {
        let bare = TruckProfile {
            truck_id: "T2".to_string(),
            driver_name: None,
            current_mileage: None,
            last_service_mileage: Some(1.0),
            vehicle_license_expiry: None,
            driver_license_expiry: None,
            git_insurance_expiry: None,
        };
        let rows = compliance(
            &[profile("T1"), bare],
            date(2025, 1, 1),
            &ComplianceConfig::default(),
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].km_since_service, None);
        assert!(!rows[1].service_due);
        assert!(!rows[1].has_alert());
        assert!(rows[0].has_alert());
    }

    #[test]
    fn summary_counts() {
        let rows = compliance(
            &[profile("T1"), profile("T2")],
            date(2025, 1, 1),
            &ComplianceConfig::default(),
        );
        let s = ComplianceSummary::from_rows(&rows);
        assert_eq!(s.trucks, 2);
        assert_eq!(s.overdue_services, 2);
        assert_eq!(s.vehicle_licenses_expiring, 2);
        assert_eq!(s.driver_licenses_expiring, 0);
        assert_eq!(s.git_insurance_expiring, 0);
    }
}
