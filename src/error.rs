//! Error types for the service layer.

use crate::store::StoreError;
use crate::types::RequestStatus;

/// Input rejected before anything is written or allocated
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("quantity must be a positive number")]
    BadQuantity,

    #[error("invalid urgency {0:?}")]
    BadUrgency(String),

    #[error("invalid {field} date {value:?}")]
    BadDate { field: &'static str, value: String },

    #[error("invalid email")]
    BadEmail,

    #[error("POC email must end with poc.com")]
    PocEmail,

    #[error("pinged user {0} is not an organization")]
    NotAnOrganization(u64),
}

/// Everything a service operation can fail with
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("authentication required")]
    Unauthenticated,

    #[error("{0} access required")]
    Forbidden(&'static str),

    #[error("cannot {action} a request that is {status:?}")]
    InvalidTransition {
        action: &'static str,
        status: RequestStatus,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
