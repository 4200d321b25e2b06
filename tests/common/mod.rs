//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use relief_hub::service::{DonationInput, RequestInput};
use relief_hub::store::{
    AllocationBatch, AllocationLedger, CommittedBatch, DonationQuery, DonationStore,
    NotificationStore, RequestQuery, RequestStore, StoreResult, UserQuery, UserStore,
};
use relief_hub::types::{
    DonationId, MatchRecord, NewNotification, NewPoolDonation, NewRequest, NewUser, Notification,
    NotificationId, PoolDonation, Request, RequestId, User, UserId, UserKind,
};
use relief_hub::{Config, MemoryStore, ReliefService, StoreError};

pub const DISTRICT: &str = "Chennai";
pub const CATEGORY: &str = "food-nutrition";

/// Fixed clock: `secs` after a reference instant
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

pub fn service() -> ReliefService<MemoryStore> {
    ReliefService::new(MemoryStore::new(), &Config::default())
}

pub fn register<S: relief_hub::Store>(svc: &ReliefService<S>, name: &str, kind: UserKind) -> User {
    let domain = if kind == UserKind::Poc { "poc.com" } else { "example.org" };
    svc.register_user(NewUser {
        name: name.into(),
        email: format!("{}@{domain}", name.to_lowercase()),
        kind,
        district: Some(DISTRICT.into()),
        ..NewUser::default()
    })
    .unwrap()
}

pub fn request_input(quantity: i64, urgency: &str) -> RequestInput {
    RequestInput {
        district: Some(DISTRICT.into()),
        category: Some(CATEGORY.into()),
        specific_resource: Some("Rice".into()),
        quantity: Some(json!(quantity)),
        unit: Some("kg".into()),
        urgency: Some(urgency.into()),
        ..RequestInput::default()
    }
}

pub fn donation_input(quantity: i64) -> DonationInput {
    DonationInput {
        category: Some(CATEGORY.into()),
        specific_resource: Some("Rice".into()),
        quantity: Some(json!(quantity)),
        unit: Some("kg".into()),
        district: Some(DISTRICT.into()),
        ..DonationInput::default()
    }
}

// ============================================================================
// Failing store
// ============================================================================

/// Delegates to a [`MemoryStore`] but can be told to reject every commit
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_commits: AtomicBool,
}

impl FlakyStore {
    pub fn failing() -> Self {
        let store = Self::default();
        store.set_failing(true);
        store
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }
}

impl RequestStore for FlakyStore {
    fn insert_request(&self, request: NewRequest) -> StoreResult<Request> {
        self.inner.insert_request(request)
    }
    fn get_request(&self, id: RequestId) -> StoreResult<Option<Request>> {
        self.inner.get_request(id)
    }
    fn find_requests(&self, query: &RequestQuery) -> StoreResult<Vec<Request>> {
        self.inner.find_requests(query)
    }
    fn save_request(&self, request: &Request) -> StoreResult<()> {
        self.inner.save_request(request)
    }
}

impl DonationStore for FlakyStore {
    fn insert_donation(&self, donation: NewPoolDonation) -> StoreResult<PoolDonation> {
        self.inner.insert_donation(donation)
    }
    fn get_donation(&self, id: DonationId) -> StoreResult<Option<PoolDonation>> {
        self.inner.get_donation(id)
    }
    fn find_donations(&self, query: &DonationQuery) -> StoreResult<Vec<PoolDonation>> {
        self.inner.find_donations(query)
    }
    fn save_donation(&self, donation: &PoolDonation) -> StoreResult<()> {
        self.inner.save_donation(donation)
    }
    fn match_records_for_request(&self, request_id: RequestId) -> StoreResult<Vec<MatchRecord>> {
        self.inner.match_records_for_request(request_id)
    }
    fn match_records_by_donor(&self, donor_id: UserId) -> StoreResult<Vec<MatchRecord>> {
        self.inner.match_records_by_donor(donor_id)
    }
}

impl UserStore for FlakyStore {
    fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        self.inner.insert_user(user)
    }
    fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        self.inner.get_user(id)
    }
    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.inner.find_user_by_email(email)
    }
    fn find_users(&self, query: &UserQuery) -> StoreResult<Vec<User>> {
        self.inner.find_users(query)
    }
    fn increment_trust_score(&self, id: UserId, delta: i64) -> StoreResult<i64> {
        self.inner.increment_trust_score(id, delta)
    }
}

impl NotificationStore for FlakyStore {
    fn create_notification(&self, notification: NewNotification) -> StoreResult<Notification> {
        self.inner.create_notification(notification)
    }
    fn notifications_for(&self, user_id: UserId, limit: usize) -> StoreResult<Vec<Notification>> {
        self.inner.notifications_for(user_id, limit)
    }
    fn mark_read(&self, id: NotificationId, user_id: UserId) -> StoreResult<bool> {
        self.inner.mark_read(id, user_id)
    }
}

impl AllocationLedger for FlakyStore {
    fn commit(&self, batch: AllocationBatch) -> StoreResult<CommittedBatch> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("commit disabled".into()));
        }
        self.inner.commit(batch)
    }
}
