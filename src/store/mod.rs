//! Storage collaborators for the allocation engine and service.
//!
//! ## Traits
//!
//! - [`RequestStore`]: requests, filterable by owner/category/district/status
//! - [`DonationStore`]: pool donations and match records
//! - [`UserStore`]: users and the atomic trust-score increment
//! - [`NotificationStore`]: alerts per user
//! - [`AllocationLedger`]: atomic commit of one [`AllocationBatch`]
//!
//! [`Store`] is the union the service works against. [`MemoryStore`] is the
//! bundled implementation.
//!
//! ## Consistency
//!
//! Allocators read candidates, plan, then commit. A commit re-checks every
//! running total it is about to overwrite, and the status of every request it
//! credits, and fails with [`StoreError::Conflict`] if another writer got
//! there first. Two concurrent runs cannot both spend the same remaining
//! quantity, and a request rejected mid-run stays rejected.

mod batch;
mod memory;
mod query;

pub use batch::{AllocationBatch, CommittedBatch, DonationUpdate, RequestUpdate, TrustAward};
pub use memory::MemoryStore;
pub use query::{DonationQuery, RequestQuery, UserQuery};

use crate::types::{
    DonationId, MatchRecord, NewNotification, NewPoolDonation, NewRequest, NewUser,
    Notification, NotificationId, PoolDonation, Request, RequestId, User, UserId,
};

/// Storage error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("write conflict: {0}")]
    Conflict(String),

    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Request persistence
pub trait RequestStore {
    fn insert_request(&self, request: NewRequest) -> StoreResult<Request>;
    fn get_request(&self, id: RequestId) -> StoreResult<Option<Request>>;
    /// Matching requests in insertion order
    fn find_requests(&self, query: &RequestQuery) -> StoreResult<Vec<Request>>;
    /// Overwrite a stored request as given (last write wins)
    fn save_request(&self, request: &Request) -> StoreResult<()>;
}

/// Pool donation and match record persistence
pub trait DonationStore {
    fn insert_donation(&self, donation: NewPoolDonation) -> StoreResult<PoolDonation>;
    fn get_donation(&self, id: DonationId) -> StoreResult<Option<PoolDonation>>;
    /// Matching pool donations in insertion order
    fn find_donations(&self, query: &DonationQuery) -> StoreResult<Vec<PoolDonation>>;
    fn save_donation(&self, donation: &PoolDonation) -> StoreResult<()>;
    /// Match records credited to `request_id`, in insertion order
    fn match_records_for_request(&self, request_id: RequestId) -> StoreResult<Vec<MatchRecord>>;
    /// Match records given by `donor_id`, in insertion order
    fn match_records_by_donor(&self, donor_id: UserId) -> StoreResult<Vec<MatchRecord>>;
}

/// User persistence
pub trait UserStore {
    fn insert_user(&self, user: NewUser) -> StoreResult<User>;
    fn get_user(&self, id: UserId) -> StoreResult<Option<User>>;
    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    fn find_users(&self, query: &UserQuery) -> StoreResult<Vec<User>>;
    /// Add `delta` to the user's trust score in one step; returns the new score
    fn increment_trust_score(&self, id: UserId, delta: i64) -> StoreResult<i64>;
}

/// Notification persistence
pub trait NotificationStore {
    fn create_notification(&self, notification: NewNotification) -> StoreResult<Notification>;
    /// Newest first, at most `limit`
    fn notifications_for(&self, user_id: UserId, limit: usize) -> StoreResult<Vec<Notification>>;
    /// Mark read if it belongs to `user_id`; false if no such notification
    fn mark_read(&self, id: NotificationId, user_id: UserId) -> StoreResult<bool>;
}

/// Atomic application of allocation results
pub trait AllocationLedger {
    /// Apply every write in `batch` or none of them
    fn commit(&self, batch: AllocationBatch) -> StoreResult<CommittedBatch>;
}

/// Everything the service needs from storage
pub trait Store:
    RequestStore + DonationStore + UserStore + NotificationStore + AllocationLedger
{
}

impl<T> Store for T where
    T: RequestStore + DonationStore + UserStore + NotificationStore + AllocationLedger
{
}
