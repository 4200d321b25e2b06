//! Route handlers.
//!
//! Handlers are thin: extract, call the service with `Utc::now()`, wrap the
//! result in JSON. All rules live in [`crate::service`].

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ValidationError;
use crate::http::{ActingUser, ApiError, ApiResult, AppState, MaybeUser};
use crate::service::{DirectDonation, DirectDonationInput, DonationInput, RejectInput, RequestInput};
use crate::types::{
    Donation, NewUser, Notification, NotificationId, PoolDonation, Request, RequestId, User,
    UserId,
};

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// ============================================================================
// Users
// ============================================================================

pub async fn register_user(
    State(state): State<AppState>,
    Json(body): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.service.register_user(body)?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn current_user(ActingUser(user): ActingUser) -> Json<User> {
    Json(user)
}

pub async fn list_organizations(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.service.organizations()?))
}

pub async fn list_pocs(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.service.pocs()?))
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestListParams {
    pub org_id: Option<u64>,
}

pub async fn list_requests(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Query(params): Query<RequestListParams>,
) -> ApiResult<Json<Vec<Request>>> {
    let requests = state
        .service
        .list_requests(viewer.as_ref(), params.org_id.map(UserId))?;
    Ok(Json(requests))
}

pub async fn create_request(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Json(body): Json<RequestInput>,
) -> ApiResult<(StatusCode, Json<Request>)> {
    let request = state.service.create_request(&user, body, Utc::now())?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn my_requests(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
) -> ApiResult<Json<Vec<Request>>> {
    Ok(Json(state.service.my_requests(&user)?))
}

pub async fn pinged_requests(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
) -> ApiResult<Json<Vec<Request>>> {
    Ok(Json(state.service.pinged_requests(&user)?))
}

pub async fn helped_requests(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
) -> ApiResult<Json<Vec<Request>>> {
    Ok(Json(state.service.helped_requests(&user)?))
}

pub async fn approve_request(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Path(id): Path<u64>,
) -> ApiResult<Json<Request>> {
    let request = state
        .service
        .approve_request(&user, RequestId(id), Utc::now())?;
    Ok(Json(request))
}

/// The body is optional here, so parse it by hand instead of via `Json`
pub async fn reject_request(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Path(id): Path<u64>,
    body: Bytes,
) -> ApiResult<Json<Request>> {
    let input: RejectInput = if body.is_empty() {
        RejectInput::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|_| ApiError::from(ValidationError::MissingField("reason")))?
    };
    let request = state
        .service
        .reject_request(&user, RequestId(id), input.reason, Utc::now())?;
    Ok(Json(request))
}

pub async fn donate_to_request(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Path(id): Path<u64>,
    Json(body): Json<DirectDonationInput>,
) -> ApiResult<(StatusCode, Json<DirectDonation>)> {
    let outcome = state
        .service
        .donate_to_request(&user, RequestId(id), body, Utc::now())?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn request_donations(
    State(state): State<AppState>,
    ActingUser(_user): ActingUser,
    Path(id): Path<u64>,
) -> ApiResult<Json<Vec<Donation>>> {
    Ok(Json(state.service.request_donations(RequestId(id))?))
}

// ============================================================================
// Donations
// ============================================================================

pub async fn list_donations(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PoolDonation>>> {
    Ok(Json(state.service.available_donations()?))
}

pub async fn create_donation(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Json(body): Json<DonationInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let donation = state.service.create_donation(&user, body, Utc::now())?;
    Ok((StatusCode::CREATED, Json(json!({ "donation": donation }))))
}

// ============================================================================
// Stats
// ============================================================================

pub async fn urgency_stats(
    State(state): State<AppState>,
) -> ApiResult<Json<BTreeMap<String, usize>>> {
    Ok(Json(state.service.urgency_stats()?))
}

pub async fn category_stats(
    State(state): State<AppState>,
) -> ApiResult<Json<BTreeMap<String, usize>>> {
    Ok(Json(state.service.category_stats()?))
}

// ============================================================================
// Notifications
// ============================================================================

pub async fn list_notifications(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
) -> ApiResult<Json<Vec<Notification>>> {
    Ok(Json(state.service.notifications(&user)?))
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Path(id): Path<u64>,
) -> ApiResult<Json<Value>> {
    let updated = state
        .service
        .mark_notification_read(&user, NotificationId(id))?;
    if !updated {
        tracing::debug!(notification_id = id, user_id = %user.id, "nothing to mark read");
    }
    Ok(Json(json!({ "ok": true })))
}
