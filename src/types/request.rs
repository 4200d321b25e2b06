//! Resource requests: demand side of the allocation engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::quantity::outstanding;
use crate::types::{DonationId, RequestId, Reviewer, UserId, UserKind};

// ============================================================================
// Urgency enum
// ============================================================================

/// How soon the requester needs the resource.
///
/// Ordered by [`Urgency::rank`]: critical (4) > high (3) > medium (2) >
/// low (1). Values the service does not recognise deserialize to
/// `Unknown` and rank 0, behind everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Critical,
    High,
    #[default]
    Medium,
    Low,
    #[serde(other)]
    Unknown,
}

impl Urgency {
    /// Ordinal priority used as the primary key of forward allocation
    pub fn rank(self) -> u8 {
        match self {
            Urgency::Critical => 4,
            Urgency::High => 3,
            Urgency::Medium => 2,
            Urgency::Low => 1,
            Urgency::Unknown => 0,
        }
    }

    /// All levels a caller may choose, most urgent first
    pub const SELECTABLE: [Urgency; 4] =
        [Urgency::Critical, Urgency::High, Urgency::Medium, Urgency::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Critical => "critical",
            Urgency::High => "high",
            Urgency::Medium => "medium",
            Urgency::Low => "low",
            Urgency::Unknown => "unknown",
        }
    }
}

// ============================================================================
// Status and small value types
// ============================================================================

/// Request lifecycle
///
/// ```text
/// pending-verification --approve--> active --fills--> matched
///          |                          |
///          +--reject--> rejected      +--> fulfilled / cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestStatus {
    #[default]
    Active,
    PendingVerification,
    Matched,
    Fulfilled,
    Cancelled,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryPreference {
    Delivery,
    Pickup,
    #[default]
    Either,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// District POC assigned to review a held request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedPoc {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

// ============================================================================
// Request struct
// ============================================================================

/// A request for a resource.
///
/// `fulfilled_quantity` is a running total credited by allocation and direct
/// donations. Once it reaches `quantity` the request is `Matched`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: RequestId,
    pub user_id: UserId,
    pub user_name: String,
    pub user_type: UserKind,
    pub address: Option<String>,
    pub landmark: Option<String>,
    pub district: String,
    pub state: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub category: String,
    pub specific_resource: String,
    pub quantity: Decimal,
    pub fulfilled_quantity: Decimal,
    pub unit: String,
    pub urgency: Urgency,
    pub needed_by: Option<DateTime<Utc>>,
    pub delivery_preference: DeliveryPreference,
    pub people_affected: Option<u32>,
    pub special_requirements: Option<String>,
    pub pinged_organizations: Vec<UserId>,
    pub status: RequestStatus,
    pub matched_donations: Vec<DonationId>,
    #[serde(rename = "assignedPOC")]
    pub assigned_poc: Option<AssignedPoc>,
    #[serde(rename = "notifiedPOC")]
    pub notified_poc: bool,
    pub verified_by: Option<Reviewer>,
    pub verified_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Request {
    /// Quantity still needed (never negative)
    #[inline]
    pub fn outstanding(&self) -> Decimal {
        outstanding(self.quantity, self.fulfilled_quantity)
    }

    #[inline]
    pub fn is_fulfilled(&self) -> bool {
        self.fulfilled_quantity >= self.quantity
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == RequestStatus::Active
    }

    /// Credit a delivered amount and flip to `Matched` once the target is met.
    ///
    /// Returns the new fulfilled quantity, or `None` (leaving the request
    /// untouched) if the sum does not fit in a `Decimal`.
    pub fn credit(&mut self, amount: Decimal) -> Option<Decimal> {
        self.fulfilled_quantity = self.fulfilled_quantity.checked_add(amount)?;
        if self.is_fulfilled() {
            self.status = RequestStatus::Matched;
        }
        Some(self.fulfilled_quantity)
    }
}

/// A validated request ready to be inserted.
///
/// The service fills `status` and `assigned_poc` from the verification gate
/// before handing this to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRequest {
    pub user_id: UserId,
    pub user_name: String,
    pub user_type: UserKind,
    pub address: Option<String>,
    pub landmark: Option<String>,
    pub district: String,
    pub state: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub category: String,
    pub specific_resource: String,
    pub quantity: Decimal,
    pub unit: String,
    pub urgency: Urgency,
    pub needed_by: Option<DateTime<Utc>>,
    pub delivery_preference: DeliveryPreference,
    pub people_affected: Option<u32>,
    pub special_requirements: Option<String>,
    pub pinged_organizations: Vec<UserId>,
    pub status: RequestStatus,
    pub assigned_poc: Option<AssignedPoc>,
    pub notified_poc: bool,
    pub created_at: DateTime<Utc>,
}

impl NewRequest {
    /// Materialize with a store-assigned id
    pub fn into_request(self, id: RequestId) -> Request {
        Request {
            id,
            user_id: self.user_id,
            user_name: self.user_name,
            user_type: self.user_type,
            address: self.address,
            landmark: self.landmark,
            district: self.district,
            state: self.state,
            coordinates: self.coordinates,
            category: self.category,
            specific_resource: self.specific_resource,
            quantity: self.quantity,
            fulfilled_quantity: Decimal::ZERO,
            unit: self.unit,
            urgency: self.urgency,
            needed_by: self.needed_by,
            delivery_preference: self.delivery_preference,
            people_affected: self.people_affected,
            special_requirements: self.special_requirements,
            pinged_organizations: self.pinged_organizations,
            status: self.status,
            matched_donations: Vec::new(),
            assigned_poc: self.assigned_poc,
            notified_poc: self.notified_poc,
            verified_by: None,
            verified_at: None,
            rejection_reason: None,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
