//! Caller identification.
//!
//! There are no sessions: the `x-user-id` header names the acting user and
//! is trusted as given.

use std::future::Future;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ServiceError;
use crate::http::{ApiError, AppState};
use crate::types::{User, UserId};

/// Header carrying the caller's user id
pub const USER_HEADER: &str = "x-user-id";

fn header_user_id(parts: &Parts) -> Option<UserId> {
    parts
        .headers
        .get(USER_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(UserId)
}

/// The authenticated caller; 401 if the header is missing or unknown
pub struct ActingUser(pub User);

impl FromRequestParts<AppState> for ActingUser {
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let resolved = match header_user_id(parts) {
            Some(id) => state.service.authenticate(id).map(ActingUser),
            None => Err(ServiceError::Unauthenticated),
        };
        async move { resolved.map_err(ApiError::from) }
    }
}

/// The caller if one is identified, for endpoints that also serve anonymous users
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let resolved = match header_user_id(parts) {
            Some(id) => match state.service.authenticate(id) {
                Ok(user) => Ok(MaybeUser(Some(user))),
                Err(ServiceError::Unauthenticated) => Ok(MaybeUser(None)),
                Err(err) => Err(ApiError::from(err)),
            },
            None => Ok(MaybeUser(None)),
        };
        async move { resolved }
    }
}
