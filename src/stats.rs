//! Derived statistics for the dashboards

use crate::entities::{Boq, Invoice, InvoiceStatus};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Window for `monthlyGrowth`, in days
pub const GROWTH_WINDOW_DAYS: i64 = 30;

/// Window for `pendingBOQs`, in days
pub const PENDING_WINDOW_DAYS: i64 = 7;

/// Aggregates over a set of BOQs
///
/// Both windows are strict: a BOQ created exactly `GROWTH_WINDOW_DAYS` ago
/// does not count towards `monthly_growth`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoqStats {
    #[serde(rename = "totalBOQs")]
    pub total_boqs: usize,
    pub monthly_growth: usize,
    #[serde(rename = "pendingBOQs")]
    pub pending_boqs: usize,
    pub active_projects: usize,
    pub total_value: f64,
    pub average_value: f64,
}

impl BoqStats {
    pub fn compute(boqs: &[Boq], now: DateTime<Utc>) -> Self {
        let growth_cutoff = now - Duration::days(GROWTH_WINDOW_DAYS);
        let pending_cutoff = now - Duration::days(PENDING_WINDOW_DAYS);

        let mut monthly_growth = 0;
        let mut pending_boqs = 0;
        let mut total_value = 0.0;
        let mut projects = HashSet::new();

        for boq in boqs {
            if boq.created_at > growth_cutoff {
                monthly_growth += 1;
            }
            if boq.created_at > pending_cutoff {
                pending_boqs += 1;
            }
            total_value += boq.total_amount();
            projects.insert(boq.project_id);
        }

        let average_value = if boqs.is_empty() {
            0.0
        } else {
            total_value / boqs.len() as f64
        };

        Self {
            total_boqs: boqs.len(),
            monthly_growth,
            pending_boqs,
            active_projects: projects.len(),
            total_value,
            average_value,
        }
    }
}

/// Invoice totals for the accounts dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    pub total_invoices: usize,
    /// Count per status string, known and unknown alike
    pub by_status: BTreeMap<String, usize>,
    pub total_amount: f64,
    pub paid_amount: f64,
    /// Sum over every invoice that is not `Paid`
    pub outstanding_amount: f64,
}

impl InvoiceSummary {
    pub fn compute(invoices: &[Invoice]) -> Self {
        let mut by_status = BTreeMap::new();
        let mut total_amount = 0.0;
        let mut paid_amount = 0.0;

        for invoice in invoices {
            *by_status.entry(invoice.status.to_string()).or_insert(0) += 1;
            total_amount += invoice.amount;
            if invoice.status == InvoiceStatus::Paid {
                paid_amount += invoice.amount;
            }
        }

        Self {
            total_invoices: invoices.len(),
            by_status,
            total_amount,
            paid_amount,
            outstanding_amount: total_amount - paid_amount,
        }
    }
}
