//! Candidate orderings for the two allocators.
//!
//! ## Priority
//!
//! - **Demand** (forward allocation): urgency rank high-to-low, then oldest
//!   request first, then lowest id
//! - **Supply** (reverse allocation): oldest pool donation first, then
//!   lowest id
//!
//! Both queues are `BTreeMap`s keyed by their priority tuple, the same way a
//! price level book keys bids by `Reverse(price)`. Iteration order is the
//! service order.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::types::{DonationId, PoolDonation, Request, RequestId};

type DemandKey = (Reverse<u8>, DateTime<Utc>, RequestId);
type SupplyKey = (DateTime<Utc>, DonationId);

// ============================================================================
// Demand queue
// ============================================================================

/// Active requests for one category and district, most urgent first.
#[derive(Debug, Clone, Default)]
pub struct DemandQueue {
    entries: BTreeMap<DemandKey, Request>,
}

impl DemandQueue {
    /// Keep only active requests matching `category` and `district` exactly
    pub fn collect(
        category: &str,
        district: &str,
        candidates: impl IntoIterator<Item = Request>,
    ) -> Self {
        let mut queue = Self::default();
        for request in candidates {
            if request.category == category && request.district == district {
                queue.push(request);
            }
        }
        queue
    }

    /// Queue a request; inactive ones are ignored. Returns whether it was queued.
    pub fn push(&mut self, request: Request) -> bool {
        if !request.is_active() {
            return false;
        }
        let key = (Reverse(request.urgency.rank()), request.created_at, request.id);
        self.entries.insert(key, request);
        true
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Requests in service order
    pub fn iter(&self) -> impl Iterator<Item = &Request> {
        self.entries.values()
    }
}

impl IntoIterator for DemandQueue {
    type Item = Request;
    type IntoIter = std::collections::btree_map::IntoValues<DemandKey, Request>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

// ============================================================================
// Supply queue
// ============================================================================

/// Drawable pool donations for one category and district, oldest first.
#[derive(Debug, Clone, Default)]
pub struct SupplyQueue {
    entries: BTreeMap<SupplyKey, PoolDonation>,
}

impl SupplyQueue {
    /// Keep only drawable pools matching `category` and `district` exactly
    pub fn collect(
        category: &str,
        district: &str,
        candidates: impl IntoIterator<Item = PoolDonation>,
    ) -> Self {
        let mut queue = Self::default();
        for donation in candidates {
            if donation.resource.category == category && donation.location.district == district {
                queue.push(donation);
            }
        }
        queue
    }

    /// Queue a pool; empty or unavailable ones are ignored
    pub fn push(&mut self, donation: PoolDonation) -> bool {
        if !donation.is_drawable() {
            return false;
        }
        self.entries.insert((donation.created_at, donation.id), donation);
        true
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PoolDonation> {
        self.entries.values()
    }
}

impl IntoIterator for SupplyQueue {
    type Item = PoolDonation;
    type IntoIter = std::collections::btree_map::IntoValues<SupplyKey, PoolDonation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
