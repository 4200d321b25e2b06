//! A single allocation between one pool donation and one request.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{DonationId, RequestId, UserId};

/// One allocation step produced by an allocator.
///
/// ## Terminology
///
/// - **Pool**: the donation the quantity was drawn from
/// - **Request**: the demand it was credited to
///
/// A fill always moves `min(needed, available)` and is never zero.
///
/// ## Example
///
/// ```
/// use relief_hub::types::{Fill, DonationId, RequestId, UserId};
/// use rust_decimal::Decimal;
///
/// let fill = Fill::new(
///     0,                  // sequence within the run
///     DonationId(7),      // pool donation
///     UserId(1),          // donor
///     RequestId(3),       // request
///     UserId(2),          // requester
///     Decimal::from(40),  // quantity
/// );
/// assert_eq!(fill.quantity, Decimal::from(40));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    /// Position within the allocator run (0-based, in service order)
    pub sequence: u32,

    /// Pool donation the quantity came out of
    pub pool_donation_id: DonationId,

    /// Owner of the pool donation
    pub donor_id: UserId,

    /// Request the quantity was credited to
    pub request_id: RequestId,

    /// Owner of the request
    pub requester_id: UserId,

    /// Allocated amount
    pub quantity: Decimal,
}

impl Fill {
    pub fn new(
        sequence: u32,
        pool_donation_id: DonationId,
        donor_id: UserId,
        request_id: RequestId,
        requester_id: UserId,
        quantity: Decimal,
    ) -> Self {
        Self {
            sequence,
            pool_donation_id,
            donor_id,
            request_id,
            requester_id,
            quantity,
        }
    }

    /// Canonical byte encoding used for receipt digests.
    ///
    /// Layout: sequence (4 LE) | pool (8 LE) | donor (8 LE) | request (8 LE) |
    /// requester (8 LE) | quantity (16, `Decimal::serialize`).
    pub fn canonical_bytes(&self) -> [u8; 52] {
        let mut out = [0u8; 52];
        out[0..4].copy_from_slice(&self.sequence.to_le_bytes());
        out[4..12].copy_from_slice(&self.pool_donation_id.get().to_le_bytes());
        out[12..20].copy_from_slice(&self.donor_id.get().to_le_bytes());
        out[20..28].copy_from_slice(&self.request_id.get().to_le_bytes());
        out[28..36].copy_from_slice(&self.requester_id.get().to_le_bytes());
        out[36..52].copy_from_slice(&self.quantity.normalize().serialize());
        out
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
