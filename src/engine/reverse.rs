//! Reverse allocation: a new request draws on existing pool donations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::engine::{AllocationEngine, AllocationEvent, AllocationPlan, SupplyQueue};
use crate::store::{DonationUpdate, RequestUpdate, TrustAward};
use crate::types::quantity::allocatable;
use crate::types::{AllocationDirection, Fill, PoolDonation, Request};

impl AllocationEngine {
    /// Plan filling `request` from `supply`, oldest pool first.
    ///
    /// Every pool that gives something earns its donor one trust reward,
    /// regardless of amount. Returns an empty plan if the request is not
    /// active or already fulfilled.
    pub fn plan_reverse(
        &self,
        request: &Request,
        supply: impl IntoIterator<Item = PoolDonation>,
        at: DateTime<Utc>,
    ) -> AllocationPlan {
        let mut plan = AllocationPlan::new(AllocationDirection::Reverse, at);
        if !request.is_active() {
            return plan;
        }

        let mut needed = request.outstanding();
        if needed <= Decimal::ZERO {
            return plan;
        }

        let queue = SupplyQueue::collect(&request.category, &request.district, supply);
        let mut credited = request.clone();
        let mut sequence: u32 = 0;

        for mut pool in queue {
            if needed <= Decimal::ZERO {
                break;
            }
            let Some(amount) = allocatable(needed, pool.remaining_quantity) else {
                continue;
            };
            if credited.credit(amount).is_none() {
                break;
            }

            let expected_remaining = pool.remaining_quantity;
            pool.draw(amount);

            plan.batch.fills.push(Fill::new(
                sequence,
                pool.id,
                pool.donor.id,
                request.id,
                request.user_id,
                amount,
            ));
            plan.batch.matches.push(pool.match_draft(request.id, amount));
            plan.batch.trust.push(TrustAward {
                user_id: pool.donor.id,
                delta: self.trust_reward(),
            });
            plan.events.push(AllocationEvent::SupplyMatched {
                donor_id: pool.donor.id,
                resource: pool.resource.specific_resource.clone(),
                quantity: amount,
                unit: pool.resource.unit.clone(),
            });
            plan.batch.donations.push(DonationUpdate {
                donation: pool,
                expected_remaining,
            });

            needed -= amount;
            sequence += 1;
        }

        let matched = plan.batch.fills.len();
        if matched > 0 {
            plan.batch.requests.push(RequestUpdate::planned(request, credited));
            plan.events.push(AllocationEvent::RequestInstantlyMatched {
                requester_id: request.user_id,
                request_id: request.id,
                supplies: matched,
            });
        }

        plan
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
