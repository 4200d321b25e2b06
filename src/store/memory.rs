//! In-memory store backed by slab tables.
//!
//! ## Layout
//!
//! - **Slab** per record kind: O(1) insert and lookup by slot
//! - **HashMap** id -> slot index per table, plus an email index for users
//! - One `Mutex` around all tables, so a commit is a single critical section
//!
//! Records are never removed, so slot order equals insertion order and ids
//! increase with it.
//!
//! ## Example
//!
//! ```
//! use relief_hub::store::{MemoryStore, UserStore};
//! use relief_hub::types::NewUser;
//!
//! let store = MemoryStore::new();
//! let user = store
//!     .insert_user(NewUser {
//!         name: "Asha".into(),
//!         email: "asha@example.org".into(),
//!         ..Default::default()
//!     })
//!     .unwrap();
//!
//! assert_eq!(store.increment_trust_score(user.id, 5).unwrap(), 5);
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use slab::Slab;

use crate::store::{
    AllocationBatch, AllocationLedger, CommittedBatch, DonationQuery, DonationStore,
    NotificationStore, RequestQuery, RequestStore, StoreError, StoreResult, UserQuery, UserStore,
};
use crate::types::{
    AllocationReceipt, DonationId, MatchRecord, NewNotification, NewPoolDonation, NewRequest,
    NewUser, Notification, NotificationId, PoolDonation, Request, RequestId, User, UserId,
};

/// Where a donation id lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DonationSlot {
    Pool(usize),
    Match(usize),
}

#[derive(Debug)]
struct Tables {
    requests: Slab<Request>,
    request_index: HashMap<RequestId, usize>,

    pools: Slab<PoolDonation>,
    matches: Slab<MatchRecord>,
    donation_index: HashMap<DonationId, DonationSlot>,

    users: Slab<User>,
    user_index: HashMap<UserId, usize>,
    email_index: HashMap<String, UserId>,

    notifications: Slab<Notification>,
    notification_index: HashMap<NotificationId, usize>,

    next_request_id: u64,
    next_donation_id: u64,
    next_user_id: u64,
    next_notification_id: u64,
    next_batch_id: u64,
}

impl Tables {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            requests: Slab::with_capacity(capacity),
            request_index: HashMap::with_capacity(capacity),
            pools: Slab::with_capacity(capacity),
            matches: Slab::with_capacity(capacity),
            donation_index: HashMap::with_capacity(capacity),
            users: Slab::with_capacity(capacity),
            user_index: HashMap::with_capacity(capacity),
            email_index: HashMap::with_capacity(capacity),
            notifications: Slab::with_capacity(capacity),
            notification_index: HashMap::with_capacity(capacity),
            next_request_id: 1,
            next_donation_id: 1,
            next_user_id: 1,
            next_notification_id: 1,
            next_batch_id: 1,
        }
    }

    fn next_donation_id(&mut self) -> DonationId {
        let id = DonationId(self.next_donation_id);
        self.next_donation_id += 1;
        id
    }

    fn request_mut(&mut self, id: RequestId) -> StoreResult<&mut Request> {
        let key = *self
            .request_index
            .get(&id)
            .ok_or_else(|| StoreError::NotFound(format!("request {id}")))?;
        self.requests
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(format!("request {id}")))
    }

    fn pool_key(&self, id: DonationId) -> StoreResult<usize> {
        match self.donation_index.get(&id) {
            Some(DonationSlot::Pool(key)) => Ok(*key),
            Some(DonationSlot::Match(_)) => Err(StoreError::NotFound(format!(
                "donation {id} is a match record, not a pool"
            ))),
            None => Err(StoreError::NotFound(format!("donation {id}"))),
        }
    }

    fn user_mut(&mut self, id: UserId) -> Option<&mut User> {
        let key = *self.user_index.get(&id)?;
        self.users.get_mut(key)
    }

    /// Add `delta` to a user's trust score, returning the new score
    fn award_trust(&mut self, id: UserId, delta: i64) -> Option<i64> {
        let user = self.user_mut(id)?;
        user.trust_score = user.trust_score.saturating_add(delta);
        Some(user.trust_score)
    }
}

/// Thread-safe in-memory implementation of every store trait
#[derive(Debug)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a store with `capacity` slots pre-allocated per table
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tables: Mutex::new(Tables::with_capacity(capacity)),
        }
    }

    fn tables(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }
}

// ============================================================================
// Requests
// ============================================================================

impl RequestStore for MemoryStore {
    fn insert_request(&self, request: NewRequest) -> StoreResult<Request> {
        let mut t = self.tables()?;
        let id = RequestId(t.next_request_id);
        t.next_request_id += 1;

        let request = request.into_request(id);
        let key = t.requests.insert(request.clone());
        t.request_index.insert(id, key);
        Ok(request)
    }

    fn get_request(&self, id: RequestId) -> StoreResult<Option<Request>> {
        let t = self.tables()?;
        Ok(t.request_index
            .get(&id)
            .and_then(|key| t.requests.get(*key))
            .cloned())
    }

    fn find_requests(&self, query: &RequestQuery) -> StoreResult<Vec<Request>> {
        let t = self.tables()?;
        let mut out: Vec<Request> = t
            .requests
            .iter()
            .map(|(_, r)| r)
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        out.sort_by_key(|r| r.id);
        Ok(out)
    }

    fn save_request(&self, request: &Request) -> StoreResult<()> {
        let mut t = self.tables()?;
        let slot = t.request_mut(request.id)?;
        *slot = request.clone();
        Ok(())
    }
}

// ============================================================================
// Donations
// ============================================================================

impl DonationStore for MemoryStore {
    fn insert_donation(&self, donation: NewPoolDonation) -> StoreResult<PoolDonation> {
        let mut t = self.tables()?;
        let id = t.next_donation_id();

        let pool = donation.into_pool(id);
        let key = t.pools.insert(pool.clone());
        t.donation_index.insert(id, DonationSlot::Pool(key));
        Ok(pool)
    }

    fn get_donation(&self, id: DonationId) -> StoreResult<Option<PoolDonation>> {
        let t = self.tables()?;
        match t.donation_index.get(&id) {
            Some(DonationSlot::Pool(key)) => Ok(t.pools.get(*key).cloned()),
            _ => Ok(None),
        }
    }

    fn find_donations(&self, query: &DonationQuery) -> StoreResult<Vec<PoolDonation>> {
        let t = self.tables()?;
        let mut out: Vec<PoolDonation> = t
            .pools
            .iter()
            .map(|(_, d)| d)
            .filter(|d| query.matches(d))
            .cloned()
            .collect();
        out.sort_by_key(|d| d.id);
        Ok(out)
    }

    fn save_donation(&self, donation: &PoolDonation) -> StoreResult<()> {
        let mut t = self.tables()?;
        let key = t.pool_key(donation.id)?;
        let slot = t
            .pools
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(format!("donation {}", donation.id)))?;
        *slot = donation.clone();
        Ok(())
    }

    fn match_records_for_request(&self, request_id: RequestId) -> StoreResult<Vec<MatchRecord>> {
        let t = self.tables()?;
        let mut out: Vec<MatchRecord> = t
            .matches
            .iter()
            .map(|(_, m)| m)
            .filter(|m| m.request_id == request_id)
            .cloned()
            .collect();
        out.sort_by_key(|m| m.id);
        Ok(out)
    }

    fn match_records_by_donor(&self, donor_id: UserId) -> StoreResult<Vec<MatchRecord>> {
        let t = self.tables()?;
        let mut out: Vec<MatchRecord> = t
            .matches
            .iter()
            .map(|(_, m)| m)
            .filter(|m| m.donor.id == donor_id)
            .cloned()
            .collect();
        out.sort_by_key(|m| m.id);
        Ok(out)
    }
}

// ============================================================================
// Users
// ============================================================================

impl UserStore for MemoryStore {
    fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut t = self.tables()?;
        let email_key = user.email.to_lowercase();
        if t.email_index.contains_key(&email_key) {
            return Err(StoreError::Duplicate(format!("email {}", user.email)));
        }

        let id = UserId(t.next_user_id);
        t.next_user_id += 1;

        let user = User {
            id,
            name: user.name,
            email: user.email,
            kind: user.kind,
            phone: user.phone,
            is_verified: false,
            trust_score: 0,
            organization_name: user.organization_name,
            organization_type: user.organization_type,
            specialization: user.specialization,
            district: user.district,
            state: user.state,
            is_available: true,
            created_at: Utc::now(),
        };
        let key = t.users.insert(user.clone());
        t.user_index.insert(id, key);
        t.email_index.insert(email_key, id);
        Ok(user)
    }

    fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let t = self.tables()?;
        Ok(t.user_index.get(&id).and_then(|key| t.users.get(*key)).cloned())
    }

    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let t = self.tables()?;
        Ok(t.email_index
            .get(&email.to_lowercase())
            .and_then(|id| t.user_index.get(id))
            .and_then(|key| t.users.get(*key))
            .cloned())
    }

    fn find_users(&self, query: &UserQuery) -> StoreResult<Vec<User>> {
        let t = self.tables()?;
        let mut out: Vec<User> = t
            .users
            .iter()
            .map(|(_, u)| u)
            .filter(|u| query.matches(u))
            .cloned()
            .collect();
        out.sort_by_key(|u| u.id);
        Ok(out)
    }

    fn increment_trust_score(&self, id: UserId, delta: i64) -> StoreResult<i64> {
        self.tables()?
            .award_trust(id, delta)
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))
    }
}

// ============================================================================
// Notifications
// ============================================================================

impl NotificationStore for MemoryStore {
    fn create_notification(&self, notification: NewNotification) -> StoreResult<Notification> {
        let mut t = self.tables()?;
        let id = NotificationId(t.next_notification_id);
        t.next_notification_id += 1;

        let notification = notification.into_notification(id, Utc::now());
        let key = t.notifications.insert(notification.clone());
        t.notification_index.insert(id, key);
        Ok(notification)
    }

    fn notifications_for(&self, user_id: UserId, limit: usize) -> StoreResult<Vec<Notification>> {
        let t = self.tables()?;
        let mut out: Vec<Notification> = t
            .notifications
            .iter()
            .map(|(_, n)| n)
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        // Newest first; ids break ties between alerts created in the same instant
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        out.truncate(limit);
        Ok(out)
    }

    fn mark_read(&self, id: NotificationId, user_id: UserId) -> StoreResult<bool> {
        let mut t = self.tables()?;
        let Some(key) = t.notification_index.get(&id).copied() else {
            return Ok(false);
        };
        match t.notifications.get_mut(key) {
            Some(n) if n.user_id == user_id => {
                n.is_read = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

// ============================================================================
// Allocation ledger
// ============================================================================

impl AllocationLedger for MemoryStore {
    fn commit(&self, batch: AllocationBatch) -> StoreResult<CommittedBatch> {
        let mut t = self.tables()?;

        // Validate everything before the first write
        for update in &batch.donations {
            let key = t.pool_key(update.donation.id)?;
            let stored = t
                .pools
                .get(key)
                .ok_or_else(|| StoreError::NotFound(format!("donation {}", update.donation.id)))?;
            if stored.remaining_quantity != update.expected_remaining {
                return Err(StoreError::Conflict(format!(
                    "donation {} has {} remaining, planned against {}",
                    stored.id, stored.remaining_quantity, update.expected_remaining
                )));
            }
        }
        for update in &batch.requests {
            let stored = t.request_mut(update.request.id)?;
            if stored.fulfilled_quantity != update.expected_fulfilled {
                return Err(StoreError::Conflict(format!(
                    "request {} has {} fulfilled, planned against {}",
                    stored.id, stored.fulfilled_quantity, update.expected_fulfilled
                )));
            }
            if stored.status != update.expected_status {
                return Err(StoreError::Conflict(format!(
                    "request {} is {:?}, planned against {:?}",
                    stored.id, stored.status, update.expected_status
                )));
            }
        }
        for draft in &batch.matches {
            if !t.request_index.contains_key(&draft.request_id) {
                return Err(StoreError::NotFound(format!("request {}", draft.request_id)));
            }
        }

        let committed_at = batch.committed_at;

        for update in batch.donations {
            let key = t.pool_key(update.donation.id)?;
            if let Some(slot) = t.pools.get_mut(key) {
                *slot = update.donation;
                slot.updated_at = committed_at;
            }
        }

        for update in batch.requests {
            let slot = t.request_mut(update.request.id)?;
            slot.fulfilled_quantity = update.request.fulfilled_quantity;
            slot.status = update.request.status;
            slot.updated_at = committed_at;
        }

        let mut match_ids = Vec::with_capacity(batch.matches.len());
        for draft in batch.matches {
            let id = t.next_donation_id();
            let request = t.request_mut(draft.request_id)?;
            request.matched_donations.push(id);
            request.updated_at = committed_at;

            let key = t.matches.insert(draft.into_record(id, committed_at));
            t.donation_index.insert(id, DonationSlot::Match(key));
            match_ids.push(id);
        }

        for award in &batch.trust {
            if t.award_trust(award.user_id, award.delta).is_none() {
                tracing::warn!(
                    user_id = %award.user_id,
                    delta = award.delta,
                    "trust award for unknown user skipped"
                );
            }
        }

        let batch_id = t.next_batch_id;
        t.next_batch_id += 1;

        Ok(CommittedBatch {
            match_ids,
            receipt: AllocationReceipt::from_fills(batch_id, batch.direction, &batch.fills),
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
