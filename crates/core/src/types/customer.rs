//! Customer domain types.
//!
//! Field names serialize in camelCase to match the wire format the mobile
//! client shell already consumes (`totalVisits`, `dateCreated`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::CustomerId;

/// A loyalty customer record.
///
/// Records are seeded at startup and never created or deleted at runtime;
/// the only mutation is awarding points (see [`crate::store::CustomerStore`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Unique customer ID, immutable once assigned.
    pub id: CustomerId,
    /// Display name.
    pub name: String,
    /// Contact email, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Phone number; fallback unique key where no id is available.
    pub phone: String,
    /// Current loyalty balance. Only ever increases.
    pub points: u32,
    /// Number of visits, incremented once per points award.
    pub total_visits: u32,
    /// Date the record was created, immutable.
    pub date_created: NaiveDate,
}

impl Customer {
    /// Whether the given search query matches this customer's name, phone,
    /// or email (case-insensitive substring match).
    ///
    /// An empty or whitespace-only query matches every record, mirroring the
    /// list screen's behavior of showing everything until the user types.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&q)
            || self.phone.to_lowercase().contains(&q)
            || self
                .email
                .as_deref()
                .is_some_and(|email| email.to_lowercase().contains(&q))
    }
}

/// Result of awarding points to a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsAward {
    /// The updated customer record.
    pub customer: Customer,
    /// How many points this award added.
    pub points_added: u32,
    /// The balance before the award.
    pub previous_points: u32,
}
