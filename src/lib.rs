//! # Relief Hub
//!
//! Disaster-relief coordination: people post requests for resources, donors
//! list supplies, and the allocation engine matches the two by category and
//! district.
//!
//! ## Architecture
//!
//! - **Types**: Request, PoolDonation, MatchRecord, Notification, User
//! - **Store**: collaborator traits plus a slab-backed in-memory implementation
//! - **Engine**: pure allocators that turn candidates into an `AllocationPlan`
//! - **Service**: validation, verification gate, commit and notification
//! - **HTTP**: axum router over the service
//!
//! ## Design Principles
//!
//! 1. **Exact quantities**: all amounts are `rust_decimal::Decimal`
//! 2. **Pure planning**: allocators never touch the store
//! 3. **One commit per run**: every write of an allocation lands in a single batch
//! 4. **Deterministic order**: urgency, then creation time, then id
//!
//! ## Example
//!
//! ```
//! use relief_hub::{Config, MemoryStore, ReliefService};
//!
//! let service = ReliefService::new(MemoryStore::new(), &Config::default());
//! assert!(service.urgency_stats().unwrap().contains_key("critical"));
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Request, PoolDonation, MatchRecord, Notification, User
pub mod types;

/// Store traits and the in-memory store
pub mod store;

/// Allocation engine: forward, reverse and direct planning
pub mod engine;

/// Sensitive-resource gate and POC assignment
pub mod verification;

/// Notification rendering and delivery
pub mod notify;

/// File and environment configuration
pub mod config;

/// Validation and service errors
pub mod error;

/// Service layer orchestrating store, engine and notifier
pub mod service;

/// HTTP surface
pub mod http;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::Config;
pub use engine::{AllocationEngine, AllocationEvent, AllocationPlan};
pub use error::{ServiceError, ValidationError};
pub use service::ReliefService;
pub use store::{MemoryStore, Store, StoreError};
pub use types::{AllocationReceipt, MatchRecord, PoolDonation, Request, User};
