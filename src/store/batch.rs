//! The unit of work an allocator hands to [`super::AllocationLedger::commit`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::types::{
    AllocationDirection, AllocationReceipt, DonationId, Fill, MatchDraft, PoolDonation, Request,
    RequestStatus, UserId,
};

/// New state for a pool donation, guarded by the remaining quantity the
/// allocator planned against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationUpdate {
    pub donation: PoolDonation,
    pub expected_remaining: Decimal,
}

/// New allocation state for a request, guarded by the fulfilled quantity and
/// status the allocator planned against.
///
/// Only `fulfilled_quantity` and `status` are written back; every other field
/// of the stored request is kept. The ledger appends the ids of the batch's
/// match records for this request when it commits.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestUpdate {
    pub request: Request,
    pub expected_fulfilled: Decimal,
    pub expected_status: RequestStatus,
}

impl RequestUpdate {
    /// Guard `request` with the state of `original`, the copy it was planned from
    pub fn planned(original: &Request, request: Request) -> Self {
        Self {
            request,
            expected_fulfilled: original.fulfilled_quantity,
            expected_status: original.status,
        }
    }
}

/// Trust score change for one donor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustAward {
    pub user_id: UserId,
    pub delta: i64,
}

/// All writes produced by one allocation step.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationBatch {
    pub direction: AllocationDirection,
    pub fills: Vec<Fill>,
    pub requests: Vec<RequestUpdate>,
    pub donations: Vec<DonationUpdate>,
    pub matches: Vec<MatchDraft>,
    pub trust: Vec<TrustAward>,
    pub committed_at: DateTime<Utc>,
}

impl AllocationBatch {
    pub fn new(direction: AllocationDirection, committed_at: DateTime<Utc>) -> Self {
        Self {
            direction,
            fills: Vec::new(),
            requests: Vec::new(),
            donations: Vec::new(),
            matches: Vec::new(),
            trust: Vec::new(),
            committed_at,
        }
    }

    /// True when committing would change nothing
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
            && self.donations.is_empty()
            && self.matches.is_empty()
            && self.trust.is_empty()
    }
}

/// Result of a successful commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedBatch {
    /// Ids assigned to the batch's match records, in batch order
    pub match_ids: Vec<DonationId>,
    pub receipt: AllocationReceipt,
}
