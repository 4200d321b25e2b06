//! Raw request bodies and their validation.
//!
//! Bodies deserialize leniently (every field optional, quantities as number
//! or string) so that bad input surfaces as a [`ValidationError`] instead of
//! a deserializer rejection.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ValidationError;
use crate::types::quantity::{is_positive, parse_quantity};
use crate::types::{
    Condition, Coordinates, DeliveryPreference, NewUser, Urgency, UserId, UserKind,
};

/// Unit used when a body leaves it out
pub const DEFAULT_UNIT: &str = "units";

/// Delivery radius (km) used when a body leaves it out
pub const DEFAULT_DELIVERY_RADIUS: u32 = 25;

/// Body of `POST /api/requests`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestInput {
    pub address: Option<String>,
    pub landmark: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub category: Option<String>,
    pub specific_resource: Option<String>,
    pub quantity: Option<Value>,
    pub unit: Option<String>,
    pub urgency: Option<String>,
    pub needed_by: Option<String>,
    pub delivery_preference: Option<DeliveryPreference>,
    pub people_affected: Option<u32>,
    pub special_requirements: Option<String>,
    #[serde(alias = "pingOrganizations")]
    pub pinged_organizations: Vec<UserId>,
}

/// Body of `POST /api/donations`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DonationInput {
    pub category: Option<String>,
    pub specific_resource: Option<String>,
    pub quantity: Option<Value>,
    pub unit: Option<String>,
    pub condition: Option<Condition>,
    pub expiry_date: Option<String>,
    pub available_until: Option<String>,
    pub pickup_address: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub can_deliver: Option<bool>,
    pub can_pickup: Option<bool>,
    pub delivery_radius: Option<u32>,
}

/// Body of `POST /api/requests/{id}/donate`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DirectDonationInput {
    pub quantity: Option<Value>,
    pub pickup_address: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
}

/// Body of `POST /api/requests/{id}/reject`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RejectInput {
    pub reason: Option<String>,
}

// ============================================================================
// Field validators
// ============================================================================

/// Non-blank text, trimmed
pub(crate) fn required(
    value: Option<&str>,
    field: &'static str,
) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ValidationError::MissingField(field)),
    }
}

/// Positive quantity given as a JSON number or numeric string
pub(crate) fn positive_quantity(value: Option<&Value>) -> Result<Decimal, ValidationError> {
    let parsed = match value {
        Some(Value::Number(n)) => parse_quantity(&n.to_string()),
        Some(Value::String(s)) => parse_quantity(s),
        _ => None,
    };
    parsed
        .filter(|q| is_positive(*q))
        .ok_or(ValidationError::BadQuantity)
}

/// One of the four selectable urgencies; absent means medium
pub(crate) fn urgency(value: Option<&str>) -> Result<Urgency, ValidationError> {
    let Some(raw) = value else {
        return Ok(Urgency::default());
    };
    Urgency::SELECTABLE
        .into_iter()
        .find(|u| u.as_str() == raw)
        .ok_or_else(|| ValidationError::BadUrgency(raw.to_string()))
}

/// RFC 3339 timestamp or plain `YYYY-MM-DD` date (midnight UTC)
pub(crate) fn optional_date(
    value: Option<&str>,
    field: &'static str,
) -> Result<Option<DateTime<Utc>>, ValidationError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Some(dt.and_utc()))
        .ok_or_else(|| ValidationError::BadDate {
            field,
            value: raw.to_string(),
        })
}

/// `local@domain.tld` with no whitespace and exactly one `@`
pub(crate) fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // Some dot with text on both sides
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Check a registration payload; returns it with name and email trimmed
pub(crate) fn validate_registration(mut user: NewUser) -> Result<NewUser, ValidationError> {
    user.name = required(Some(&user.name), "name")?;
    user.email = required(Some(&user.email), "email")?;
    if !looks_like_email(&user.email) {
        return Err(ValidationError::BadEmail);
    }
    if user.kind == UserKind::Poc && !user.email.to_lowercase().ends_with("poc.com") {
        return Err(ValidationError::PocEmail);
    }
    Ok(user)
}
