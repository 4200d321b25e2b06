//! Core data types for Relief Hub
//!
//! ## Types
//!
//! - [`Request`]: demand for a resource in a district
//! - [`PoolDonation`]: supply listed by a donor, consumable across matches
//! - [`MatchRecord`]: immutable history entry for one completed allocation
//! - [`Donation`]: tagged union of the two donation kinds
//! - [`Notification`]: user-facing alert
//! - [`User`]: individual, organization or district POC
//! - [`Fill`]: one allocation step inside an allocator run
//! - [`AllocationReceipt`]: digest summary of a committed run
//!
//! ## Quantities
//!
//! All amounts are exact `rust_decimal::Decimal` values; see [`quantity`].

mod ids;
mod user;
mod request;
mod donation;
mod notification;
mod fill;
mod receipt;
pub mod quantity;

pub use ids::{DonationId, NotificationId, RequestId, UserId};
pub use user::{DonorRef, NewUser, Reviewer, User, UserKind};
pub use request::{
    AssignedPoc, Coordinates, DeliveryPreference, NewRequest, Request, RequestStatus, Urgency,
};
pub use donation::{
    Condition, Donation, DonationStatus, MatchDraft, MatchOrigin, MatchRecord, NewPoolDonation,
    PickupLocation, PoolDonation, ResourceSpec,
};
pub use notification::{NewNotification, Notification, NotificationKind, DASHBOARD_LINK};
pub use fill::Fill;
pub use receipt::{AllocationDirection, AllocationReceipt};
