//! Allocation engine and its output type.
//!
//! The engine never touches storage. Each `plan_*` method takes the records
//! it needs by value, simulates the allocation on copies and returns an
//! [`AllocationPlan`]: the writes to commit plus the events to announce.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::engine::AllocationEvent;
use crate::store::{AllocationBatch, RequestUpdate, TrustAward};
use crate::types::{
    AllocationDirection, DonationId, Fill, MatchDraft, MatchOrigin, PickupLocation, Request,
    ResourceSpec, User,
};

/// Trust awarded per match unless configured otherwise
pub const DEFAULT_TRUST_REWARD: i64 = 5;

/// Result of planning one allocator run
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationPlan {
    pub batch: AllocationBatch,
    pub events: Vec<AllocationEvent>,
}

impl AllocationPlan {
    pub(crate) fn new(direction: AllocationDirection, at: DateTime<Utc>) -> Self {
        Self {
            batch: AllocationBatch::new(direction, at),
            events: Vec::new(),
        }
    }

    /// True when there is nothing to commit or announce
    pub fn is_empty(&self) -> bool {
        self.batch.is_empty() && self.events.is_empty()
    }

    #[inline]
    pub fn fill_count(&self) -> usize {
        self.batch.fills.len()
    }

    /// Sum of all fill quantities
    pub fn total_allocated(&self) -> Decimal {
        self.batch.fills.iter().map(|f| f.quantity).sum()
    }
}

/// Greedy allocator for both directions plus direct donations.
///
/// # Example
///
/// ```
/// use relief_hub::engine::AllocationEngine;
///
/// let engine = AllocationEngine::default();
/// assert_eq!(engine.trust_reward(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationEngine {
    trust_reward: i64,
}

impl Default for AllocationEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TRUST_REWARD)
    }
}

impl AllocationEngine {
    pub fn new(trust_reward: i64) -> Self {
        Self { trust_reward }
    }

    #[inline]
    pub fn trust_reward(&self) -> i64 {
        self.trust_reward
    }

    /// Plan a donor giving `quantity` straight to `request`.
    ///
    /// Bypasses both queues. The credit is not capped, so a request can end
    /// up over-fulfilled. Returns an empty plan if the credit would overflow.
    pub fn plan_direct(
        &self,
        request: &Request,
        donor: &User,
        quantity: Decimal,
        location: PickupLocation,
        at: DateTime<Utc>,
    ) -> AllocationPlan {
        let mut plan = AllocationPlan::new(AllocationDirection::Direct, at);
        if quantity <= Decimal::ZERO {
            return plan;
        }

        let mut credited = request.clone();
        if credited.credit(quantity).is_none() {
            return plan;
        }
        let fulfilled = credited.is_fulfilled();

        plan.batch.fills.push(Fill::new(
            0,
            DonationId::default(),
            donor.id,
            request.id,
            request.user_id,
            quantity,
        ));
        plan.batch.matches.push(MatchDraft {
            request_id: request.id,
            donor: donor.as_donor(),
            resource: ResourceSpec {
                category: request.category.clone(),
                specific_resource: request.specific_resource.clone(),
                unit: request.unit.clone(),
            },
            quantity,
            location,
            origin: MatchOrigin::Direct,
        });
        plan.batch.requests.push(RequestUpdate::planned(request, credited));
        plan.batch.trust.push(TrustAward {
            user_id: donor.id,
            delta: self.trust_reward,
        });

        plan.events.push(AllocationEvent::DirectDonationReceived {
            requester_id: request.user_id,
            request_id: request.id,
            resource: request.specific_resource.clone(),
            donated: quantity,
            requested: request.quantity,
            unit: request.unit.clone(),
            fulfilled,
        });
        plan
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
