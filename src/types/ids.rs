//! Typed record identifiers.
//!
//! Every id is a `u64` assigned by the store in insertion order, so a larger
//! id always means a later insert. Allocation uses that as the last
//! tie-break after `created_at`.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[derive(Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw numeric value
            #[inline]
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

record_id!(
    /// Identifier of a [`crate::types::Request`]
    RequestId
);
record_id!(
    /// Identifier shared by pool donations and match records
    DonationId
);
record_id!(
    /// Identifier of a [`crate::types::User`]
    UserId
);
record_id!(
    /// Identifier of a [`crate::types::Notification`]
    NotificationId
);
