//! Dashboard summary numbers: totals, high-priority count, conversion
//! rate, and the vehicle-interest distribution. Pure derivation from a
//! snapshot; the TUI header and `lane stats` both consume it.

use std::collections::BTreeMap;

use serde::Serialize;

use leadlane_core::model::{Classification, Lead, Status};

/// Aggregated pipeline numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    /// Records in the system.
    pub total: usize,
    /// Leads the classifier tiered as high priority.
    pub high_priority: usize,
    /// Leads in the closed stage.
    pub closed: usize,
    /// Percentage of leads closed, one decimal.
    pub conversion_rate: f64,
    /// Vehicle-interest distribution, most requested first.
    pub by_vehicle: Vec<VehicleShare>,
}

/// One slice of the vehicle distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleShare {
    pub vehicle: String,
    pub count: usize,
}

/// Compute the summary from the unfiltered snapshot.
#[must_use]
pub fn compute(leads: &[Lead]) -> DashboardStats {
    let total = leads.len();
    let high_priority = leads
        .iter()
        .filter(|lead| lead.classification == Some(Classification::High))
        .count();
    let closed = leads.iter().filter(|lead| lead.status == Status::Closed).count();

    #[allow(clippy::cast_precision_loss)]
    let conversion_rate = if total == 0 {
        0.0
    } else {
        (closed as f64 / total as f64 * 1000.0).round() / 10.0
    };

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for lead in leads {
        *counts.entry(lead.vehicle_interest.as_str()).or_default() += 1;
    }
    let mut by_vehicle: Vec<VehicleShare> = counts
        .into_iter()
        .map(|(vehicle, count)| VehicleShare {
            vehicle: vehicle.to_string(),
            count,
        })
        .collect();
    by_vehicle.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.vehicle.cmp(&b.vehicle)));

    DashboardStats {
        total,
        high_priority,
        closed,
        conversion_rate,
        by_vehicle,
    }
}
