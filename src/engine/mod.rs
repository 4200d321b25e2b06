//! Allocation engine for Relief Hub.
//!
//! ## Design Principles
//!
//! 1. **Pure planning**: allocators read candidates and return an
//!    [`AllocationPlan`]; the caller commits it through the store
//! 2. **Exact math**: all quantities are `Decimal`, no floats
//! 3. **Greedy priority**: serve candidates strictly in queue order
//! 4. **Determinism**: same records and timestamp, same plan
//!
//! ## Allocation Rules
//!
//! - **Reverse** (new request): drain pool donations oldest first
//! - **Forward** (new pool donation): serve requests by urgency, then age
//! - Each step moves `min(needed, available)` and is never zero
//! - A request turns `matched` once fulfilled reaches its target
//! - A pool turns `completed` once its remaining quantity reaches zero
//!
//! ## Example
//!
//! ```
//! use chrono::Utc;
//! use relief_hub::engine::AllocationEngine;
//! use relief_hub::types::{
//!     Condition, DonorRef, NewPoolDonation, PickupLocation, ResourceSpec, DonationId, UserId,
//!     UserKind,
//! };
//! use rust_decimal::Decimal;
//!
//! let pool = NewPoolDonation {
//!     donor: DonorRef { id: UserId(1), name: "Meera".into(), kind: UserKind::Organization },
//!     resource: ResourceSpec {
//!         category: "food-nutrition".into(),
//!         specific_resource: "Rice".into(),
//!         unit: "kg".into(),
//!     },
//!     quantity: Decimal::from(30),
//!     condition: Condition::New,
//!     expiry_date: None,
//!     available_until: None,
//!     location: PickupLocation { pickup_address: None, district: "Chennai".into(), state: None },
//!     can_deliver: false,
//!     can_pickup: true,
//!     delivery_radius: 25,
//!     created_at: Utc::now(),
//! }
//! .into_pool(DonationId(1));
//!
//! // Nobody is asking yet, so nothing moves
//! let plan = AllocationEngine::default().plan_forward(&pool, Vec::new(), Utc::now());
//! assert!(plan.is_empty());
//! ```

mod allocator;
mod events;
mod forward;
mod queue;
mod reverse;

pub use allocator::{AllocationEngine, AllocationPlan, DEFAULT_TRUST_REWARD};
pub use events::AllocationEvent;
pub use queue::{DemandQueue, SupplyQueue};

#[cfg(test)]
pub(crate) mod testing {
    //! Record builders shared by the engine's unit tests.

    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::types::{
        Condition, DeliveryPreference, DonationId, NewPoolDonation, NewRequest, PickupLocation,
        PoolDonation, Request, RequestId, RequestStatus, ResourceSpec, Urgency, User, UserId,
        UserKind,
    };

    /// Fixed instant `secs` seconds after an arbitrary epoch
    pub fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    pub fn user(id: u64, kind: UserKind) -> User {
        User {
            id: UserId(id),
            name: format!("user-{id}"),
            email: format!("user-{id}@example.org"),
            kind,
            phone: None,
            is_verified: false,
            trust_score: 0,
            organization_name: None,
            organization_type: None,
            specialization: None,
            district: Some("Chennai".into()),
            state: None,
            is_available: true,
            created_at: at(0),
        }
    }

    /// Active food request in Chennai owned by user `100 + id`
    pub fn request_at(id: u64, urgency: Urgency, created: i64, quantity: i64) -> Request {
        NewRequest {
            user_id: UserId(100 + id),
            user_name: format!("requester-{id}"),
            user_type: UserKind::Individual,
            address: None,
            landmark: None,
            district: "Chennai".into(),
            state: None,
            coordinates: None,
            category: "food-nutrition".into(),
            specific_resource: "Rice".into(),
            quantity: Decimal::from(quantity),
            unit: "kg".into(),
            urgency,
            needed_by: None,
            delivery_preference: DeliveryPreference::Either,
            people_affected: None,
            special_requirements: None,
            pinged_organizations: Vec::new(),
            status: RequestStatus::Active,
            assigned_poc: None,
            notified_poc: true,
            created_at: at(created),
        }
        .into_request(RequestId(id))
    }

    /// Available food pool in Chennai owned by user `200 + id`
    pub fn pool_at(id: u64, created: i64, quantity: i64) -> PoolDonation {
        NewPoolDonation {
            donor: user(200 + id, UserKind::Organization).as_donor(),
            resource: ResourceSpec {
                category: "food-nutrition".into(),
                specific_resource: "Rice".into(),
                unit: "kg".into(),
            },
            quantity: Decimal::from(quantity),
            condition: Condition::New,
            expiry_date: None,
            available_until: None,
            location: PickupLocation {
                pickup_address: None,
                district: "Chennai".into(),
                state: None,
            },
            can_deliver: false,
            can_pickup: true,
            delivery_radius: 25,
            created_at: at(created),
        }
        .into_pool(DonationId(id))
    }
}
