//! Forward allocation: a new pool donation is spread over active requests.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::engine::{AllocationEngine, AllocationEvent, AllocationPlan, DemandQueue};
use crate::store::{DonationUpdate, RequestUpdate, TrustAward};
use crate::types::quantity::allocatable;
use crate::types::{AllocationDirection, Fill, PoolDonation, Request};

impl AllocationEngine {
    /// Plan spreading `donation` over `demand`, most urgent request first.
    ///
    /// The donor earns one trust reward per matched request, awarded once
    /// for the whole run. Returns an empty plan if the pool has nothing
    /// left to give or no request needs it.
    pub fn plan_forward(
        &self,
        donation: &PoolDonation,
        demand: impl IntoIterator<Item = Request>,
        at: DateTime<Utc>,
    ) -> AllocationPlan {
        let mut plan = AllocationPlan::new(AllocationDirection::Forward, at);
        if !donation.is_drawable() {
            return plan;
        }

        let queue = DemandQueue::collect(
            &donation.resource.category,
            &donation.location.district,
            demand,
        );
        let mut pool = donation.clone();
        let mut sequence: u32 = 0;

        for mut request in queue {
            if pool.remaining_quantity <= Decimal::ZERO {
                break;
            }
            let Some(amount) = allocatable(request.outstanding(), pool.remaining_quantity) else {
                continue;
            };

            let expected_fulfilled = request.fulfilled_quantity;
            let expected_status = request.status;
            if request.credit(amount).is_none() {
                continue;
            }
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
            plan.events.push(AllocationEvent::RequestAutoMatched {
                requester_id: request.user_id,
                request_id: request.id,
                resource: pool.resource.specific_resource.clone(),
                quantity: amount,
                unit: pool.resource.unit.clone(),
                donor_name: pool.donor.name.clone(),
            });
            plan.batch.requests.push(RequestUpdate {
                request,
                expected_fulfilled,
                expected_status,
            });

            sequence += 1;
        }

        let matched = plan.batch.fills.len();
        if matched > 0 {
            plan.batch.trust.push(TrustAward {
                user_id: pool.donor.id,
                delta: self.trust_reward() * matched as i64,
            });
            plan.batch.donations.push(DonationUpdate {
                donation: pool,
                expected_remaining: donation.remaining_quantity,
            });
        }

        plan
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
