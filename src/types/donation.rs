//! Donation records.
//!
//! ## Two record kinds
//!
//! - [`PoolDonation`]: a donor's listed supply. Its `remaining_quantity` is
//!   divisible and consumed across many matches.
//! - [`MatchRecord`]: one completed allocation of a donor's supply to one
//!   request. Fixed quantity, nothing remaining, always completed.
//!
//! Keeping them as separate types means a match record can never be picked
//! up as supply by the reverse allocator, and its remaining quantity cannot
//! drift from zero. [`Donation`] is the tagged union used for listings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{DonationId, DonorRef, RequestId};

// ============================================================================
// Enums
// ============================================================================

/// Pool donation lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Pending,
    #[default]
    Available,
    Matched,
    Completed,
    Cancelled,
}

/// Physical condition of donated goods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    #[default]
    New,
    GentlyUsed,
    Consumable,
}

/// How a match record came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "via", rename_all = "kebab-case")]
pub enum MatchOrigin {
    /// Carved out of a pool donation by one of the allocators
    AutoAllocation {
        #[serde(rename = "poolDonationId")]
        pool: DonationId,
    },
    /// A donor gave straight to a specific request
    Direct,
}

// ============================================================================
// Shared fields
// ============================================================================

/// What is being moved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpec {
    pub category: String,
    pub specific_resource: String,
    pub unit: String,
}

/// Where it can be collected
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupLocation {
    pub pickup_address: Option<String>,
    pub district: String,
    pub state: Option<String>,
}

// ============================================================================
// PoolDonation
// ============================================================================

/// Supply listed by a donor and consumable across many requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolDonation {
    pub id: DonationId,
    #[serde(flatten)]
    pub donor: DonorRef,
    #[serde(flatten)]
    pub resource: ResourceSpec,
    /// Original listed amount
    pub quantity: Decimal,
    /// Decremented as allocations consume the pool
    pub remaining_quantity: Decimal,
    pub condition: Condition,
    pub expiry_date: Option<DateTime<Utc>>,
    pub available_until: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub location: PickupLocation,
    pub can_deliver: bool,
    pub can_pickup: bool,
    pub delivery_radius: u32,
    pub status: DonationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PoolDonation {
    /// Whether the reverse allocator may draw from this pool
    #[inline]
    pub fn is_drawable(&self) -> bool {
        self.status == DonationStatus::Available && self.remaining_quantity > Decimal::ZERO
    }

    /// Take `amount` out of the pool, completing it when it runs dry.
    ///
    /// Returns the amount actually taken (never more than what remains).
    pub fn draw(&mut self, amount: Decimal) -> Decimal {
        let taken = amount.min(self.remaining_quantity).max(Decimal::ZERO);
        self.remaining_quantity -= taken;
        if self.remaining_quantity.is_zero() {
            self.status = DonationStatus::Completed;
        }
        taken
    }

    /// Build the history entry for `quantity` of this pool going to `request_id`
    pub fn match_draft(&self, request_id: RequestId, quantity: Decimal) -> MatchDraft {
        MatchDraft {
            request_id,
            donor: self.donor.clone(),
            resource: self.resource.clone(),
            quantity,
            location: self.location.clone(),
            origin: MatchOrigin::AutoAllocation { pool: self.id },
        }
    }
}

/// A validated pool listing ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPoolDonation {
    pub donor: DonorRef,
    pub resource: ResourceSpec,
    pub quantity: Decimal,
    pub condition: Condition,
    pub expiry_date: Option<DateTime<Utc>>,
    pub available_until: Option<DateTime<Utc>>,
    pub location: PickupLocation,
    pub can_deliver: bool,
    pub can_pickup: bool,
    pub delivery_radius: u32,
    pub created_at: DateTime<Utc>,
}

impl NewPoolDonation {
    /// Materialize with a store-assigned id; the whole quantity starts available
    pub fn into_pool(self, id: DonationId) -> PoolDonation {
        PoolDonation {
            id,
            donor: self.donor,
            resource: self.resource,
            quantity: self.quantity,
            remaining_quantity: self.quantity,
            condition: self.condition,
            expiry_date: self.expiry_date,
            available_until: self.available_until,
            location: self.location,
            can_deliver: self.can_deliver,
            can_pickup: self.can_pickup,
            delivery_radius: self.delivery_radius,
            status: DonationStatus::Available,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

// ============================================================================
// MatchRecord
// ============================================================================

/// Immutable history entry for one allocation between a donor and a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: DonationId,
    pub request_id: RequestId,
    #[serde(flatten)]
    pub donor: DonorRef,
    #[serde(flatten)]
    pub resource: ResourceSpec,
    pub quantity: Decimal,
    #[serde(flatten)]
    pub location: PickupLocation,
    pub origin: MatchOrigin,
    pub created_at: DateTime<Utc>,
}

impl MatchRecord {
    /// Always zero: a match record is fully delivered
    #[inline]
    pub fn remaining_quantity(&self) -> Decimal {
        Decimal::ZERO
    }

    /// Always completed
    #[inline]
    pub fn status(&self) -> DonationStatus {
        DonationStatus::Completed
    }
}

/// Match record before the store assigns its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchDraft {
    pub request_id: RequestId,
    pub donor: DonorRef,
    pub resource: ResourceSpec,
    pub quantity: Decimal,
    pub location: PickupLocation,
    pub origin: MatchOrigin,
}

impl MatchDraft {
    pub fn into_record(self, id: DonationId, created_at: DateTime<Utc>) -> MatchRecord {
        MatchRecord {
            id,
            request_id: self.request_id,
            donor: self.donor,
            resource: self.resource,
            quantity: self.quantity,
            location: self.location,
            origin: self.origin,
            created_at,
        }
    }
}

// ============================================================================
// Donation union
// ============================================================================

/// Either kind of donation record, tagged with `kind` on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Donation {
    Pool(PoolDonation),
    Match(MatchRecord),
}

impl Donation {
    pub fn id(&self) -> DonationId {
        match self {
            Donation::Pool(p) => p.id,
            Donation::Match(m) => m.id,
        }
    }

    pub fn remaining_quantity(&self) -> Decimal {
        match self {
            Donation::Pool(p) => p.remaining_quantity,
            Donation::Match(m) => m.remaining_quantity(),
        }
    }

    pub fn status(&self) -> DonationStatus {
        match self {
            Donation::Pool(p) => p.status,
            Donation::Match(m) => m.status(),
        }
    }

    /// Set only for match records
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            Donation::Pool(_) => None,
            Donation::Match(m) => Some(m.request_id),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{UserId, UserKind};

    fn pool(quantity: i64) -> PoolDonation {
        NewPoolDonation {
            donor: DonorRef {
                id: UserId(3),
                name: "Meera".into(),
                kind: UserKind::Organization,
            },
            resource: ResourceSpec {
                category: "water-sanitation".into(),
                specific_resource: "Bottled water".into(),
                unit: "litres".into(),
            },
            quantity: Decimal::from(quantity),
            condition: Condition::New,
            expiry_date: None,
            available_until: None,
            location: PickupLocation {
                pickup_address: Some("Depot 4".into()),
                district: "Madurai".into(),
                state: None,
            },
            can_deliver: false,
            can_pickup: true,
            delivery_radius: 25,
            created_at: Utc::now(),
        }
        .into_pool(DonationId(10))
    }

    #[test]
    fn test_new_pool_is_fully_available() {
        let p = pool(60);
        assert_eq!(p.remaining_quantity, Decimal::from(60));
        assert_eq!(p.status, DonationStatus::Available);
        assert!(p.is_drawable());
    }

    #[test]
    fn test_draw_until_completed() {
        let mut p = pool(60);

        assert_eq!(p.draw(Decimal::from(40)), Decimal::from(40));
        assert_eq!(p.status, DonationStatus::Available);

        // Asking for more than remains only takes what is left
        assert_eq!(p.draw(Decimal::from(40)), Decimal::from(20));
        assert_eq!(p.remaining_quantity, Decimal::ZERO);
        assert_eq!(p.status, DonationStatus::Completed);
        assert!(!p.is_drawable());
    }

    #[test]
    fn test_match_draft_copies_pool_fields() {
        let p = pool(60);
        let draft = p.match_draft(RequestId(5), Decimal::from(15));

        assert_eq!(draft.request_id, RequestId(5));
        assert_eq!(draft.donor, p.donor);
        assert_eq!(draft.resource, p.resource);
        assert_eq!(draft.location, p.location);
        assert_eq!(draft.origin, MatchOrigin::AutoAllocation { pool: DonationId(10) });

        let record = draft.into_record(DonationId(11), Utc::now());
        assert_eq!(record.remaining_quantity(), Decimal::ZERO);
        assert_eq!(record.status(), DonationStatus::Completed);
    }

    #[test]
    fn test_donation_union_tags_kind() {
        let union = Donation::Pool(pool(5));
        let json = serde_json::to_value(&union).unwrap();
        assert_eq!(json["kind"], "pool");
        assert_eq!(json["donorName"], "Meera");
        assert_eq!(json["district"], "Madurai");
        assert!(union.request_id().is_none());
    }
}
