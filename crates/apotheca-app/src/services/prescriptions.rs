//! Prescription uploads
//!
//! Listing, submission, review status changes and dashboard counts.

use super::{encode, Backend};
use crate::cache::QueryKey;
use crate::config::stats::RECENT_WINDOW_HOURS;
use crate::config::tables::PRESCRIPTIONS;
use crate::error::{AppError, Result};
use crate::notify::{Notice, Notifier};
use crate::records::{NewPrescription, Prescription, PrescriptionStats, PrescriptionStatus};
use crate::remote::{Direction, Query, TableSource};

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{json, Value};

/// Cache key of the prescription list
pub fn list_key() -> QueryKey {
    QueryKey::new(["prescriptions"])
}

/// Cache key of the dashboard counts
pub fn stats_key() -> QueryKey {
    QueryKey::new(["prescription-stats"])
}

/// Prescription queries and mutations
pub struct Prescriptions {
    backend: Backend,
}

impl Prescriptions {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Every prescription, newest first
    ///
    /// Not filtered by status; callers split by status themselves.
    pub fn list(&self) -> Result<Vec<Prescription>> {
        self.backend.cached(list_key(), PRESCRIPTIONS, |source| {
            let query = Query::table(PRESCRIPTIONS).order_by("created_at", Direction::Descending);
            source.select(&query).map(Value::Array)
        })
    }

    /// Dashboard counts as of now, cached under [`stats_key`]
    pub fn stats(&self) -> Result<PrescriptionStats> {
        self.backend.cached(stats_key(), PRESCRIPTIONS, |source| {
            count_stats(source, Utc::now()).map(|stats| json!(stats))
        })
    }

    /// Dashboard counts with the recent window ending at `now`
    ///
    /// Always goes to the source; the cache only holds the counts for the
    /// current time.
    pub fn stats_at(&self, now: DateTime<Utc>) -> Result<PrescriptionStats> {
        count_stats(self.backend.source(), now)
    }

    /// Submit a new prescription
    pub fn create(
        &self,
        prescription: &NewPrescription,
        notifier: Option<&dyn Notifier>,
    ) -> Result<Prescription> {
        let row = encode(PRESCRIPTIONS, prescription)?;
        self.backend.mutate(
            PRESCRIPTIONS,
            |source| source.insert(PRESCRIPTIONS, row),
            &[list_key(), stats_key()],
            notifier,
            Notice::new(
                "Prescription submitted",
                "We will review your prescription shortly.",
            ),
        )
    }

    /// Move a prescription to another review status
    pub fn update_status(
        &self,
        id: &str,
        status: PrescriptionStatus,
        notifier: Option<&dyn Notifier>,
    ) -> Result<Prescription> {
        let query = Query::table(PRESCRIPTIONS).eq("id", id);
        self.backend.mutate(
            PRESCRIPTIONS,
            |source| {
                source
                    .update(&query, json!({ "status": status.as_str() }))?
                    .into_iter()
                    .next()
                    .ok_or_else(|| AppError::NotFound(format!("prescription {id}")))
            },
            &[list_key(), stats_key()],
            notifier,
            Notice::new(
                "Prescription updated",
                format!("Status changed to {status}."),
            ),
        )
    }
}

/// Run every dashboard count
///
/// Each count is a separate query with no isolation between them. The first
/// failing count fails the whole call.
fn count_stats(source: &dyn TableSource, now: DateTime<Utc>) -> Result<PrescriptionStats> {
    let mut stats = PrescriptionStats {
        total: source.count(&Query::table(PRESCRIPTIONS))?,
        ..PrescriptionStats::default()
    };

    for status in PrescriptionStatus::ALL {
        let query = Query::table(PRESCRIPTIONS).eq("status", status.as_str());
        *stats.count_mut(status) = source.count(&query)?;
    }

    // Inclusive lower bound
    let since = (now - Duration::hours(RECENT_WINDOW_HOURS))
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    stats.recent = source.count(&Query::table(PRESCRIPTIONS).gte("created_at", since))?;

    Ok(stats)
}
