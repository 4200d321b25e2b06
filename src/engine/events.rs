//! Domain events emitted by the allocators.
//!
//! Planning is pure, so allocators never write notifications themselves.
//! They describe what happened and [`crate::notify::Notifier`] turns each
//! event into an alert once the batch has been committed.

use rust_decimal::Decimal;

use crate::types::{RequestId, UserId};

/// Something a user should hear about after an allocation commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationEvent {
    /// Reverse allocation drew on a donor's pool
    SupplyMatched {
        donor_id: UserId,
        resource: String,
        quantity: Decimal,
        unit: String,
    },

    /// Reverse allocation matched a new request against `supplies` pools
    RequestInstantlyMatched {
        requester_id: UserId,
        request_id: RequestId,
        supplies: usize,
    },

    /// Forward allocation credited part of a new pool to a request
    RequestAutoMatched {
        requester_id: UserId,
        request_id: RequestId,
        resource: String,
        quantity: Decimal,
        unit: String,
        donor_name: String,
    },

    /// A donor gave straight to a request
    DirectDonationReceived {
        requester_id: UserId,
        request_id: RequestId,
        resource: String,
        donated: Decimal,
        requested: Decimal,
        unit: String,
        fulfilled: bool,
    },
}

impl AllocationEvent {
    /// User the event is addressed to
    pub fn recipient(&self) -> UserId {
        match self {
            AllocationEvent::SupplyMatched { donor_id, .. } => *donor_id,
            AllocationEvent::RequestInstantlyMatched { requester_id, .. }
            | AllocationEvent::RequestAutoMatched { requester_id, .. }
            | AllocationEvent::DirectDonationReceived { requester_id, .. } => *requester_id,
        }
    }
}
