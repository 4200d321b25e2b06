//! Allocation receipt summarizing one committed allocator run.
//!
//! The receipt carries a SHA-256 digest over the canonical encoding of the
//! run's fills. Logging the digest next to the batch id gives operators a
//! cheap way to compare what two replicas or two log lines actually did.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use rust_decimal::Decimal;

use crate::types::Fill;

/// Which allocator produced a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AllocationDirection {
    /// New request drawing on existing pool donations
    Reverse,
    /// New pool donation spread over existing requests
    Forward,
    /// Donor giving straight to one request
    Direct,
}

/// Summary of a committed allocation batch.
///
/// ## Example
///
/// ```
/// use relief_hub::types::{AllocationReceipt, AllocationDirection};
///
/// let receipt = AllocationReceipt::from_fills(1, AllocationDirection::Forward, &[]);
/// assert!(receipt.is_empty());
/// assert_eq!(receipt.digest_hex().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationReceipt {
    /// Store-assigned batch sequence number
    pub batch_id: u64,

    pub direction: AllocationDirection,

    /// Number of fills in the batch
    pub fills: u64,

    /// Sum of all fill quantities
    pub total_allocated: Decimal,

    /// SHA-256 over the fills' canonical bytes, in order
    pub digest: [u8; 32],
}

impl AllocationReceipt {
    /// Build a receipt for `fills`, computing totals and digest
    pub fn from_fills(batch_id: u64, direction: AllocationDirection, fills: &[Fill]) -> Self {
        let mut hasher = Sha256::new();
        let mut total = Decimal::ZERO;
        for fill in fills {
            hasher.update(fill.canonical_bytes());
            total += fill.quantity;
        }

        let mut digest = [0u8; 32];
        digest.copy_from_slice(&hasher.finalize());

        Self {
            batch_id,
            direction,
            fills: u64::try_from(fills.len()).unwrap_or(u64::MAX),
            total_allocated: total,
            digest,
        }
    }

    /// Digest as a lowercase hex string
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }

    /// True when the run allocated nothing
    pub fn is_empty(&self) -> bool {
        self.fills == 0
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
