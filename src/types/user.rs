//! Registered participants: individuals, organizations and district POCs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// Kind of account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserKind {
    /// A person asking for or offering help
    #[default]
    Individual,
    /// NGO, company or community group
    Organization,
    /// District point-of-contact who verifies held requests
    Poc,
}

/// A registered user.
///
/// `trust_score` is never written directly by application code. It only
/// moves inside the store, either through `UserStore::increment_trust_score`
/// or as a trust award in a committed allocation batch. Both paths share one
/// saturating update applied under the store lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub kind: UserKind,
    pub phone: Option<String>,
    pub is_verified: bool,
    pub trust_score: i64,
    pub organization_name: Option<String>,
    pub organization_type: Option<String>,
    pub specialization: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Reference embedded in donations this user makes
    pub fn as_donor(&self) -> DonorRef {
        DonorRef {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind,
        }
    }

    #[inline]
    pub fn is_poc(&self) -> bool {
        self.kind == UserKind::Poc
    }

    #[inline]
    pub fn is_organization(&self) -> bool {
        self.kind == UserKind::Organization
    }
}

/// Registration payload, before the store assigns an id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(rename = "type", default)]
    pub kind: UserKind,
    pub phone: Option<String>,
    pub organization_name: Option<String>,
    pub organization_type: Option<String>,
    pub specialization: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
}

/// Denormalized donor fields copied onto every donation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorRef {
    #[serde(rename = "donorId")]
    pub id: UserId,
    #[serde(rename = "donorName")]
    pub name: String,
    #[serde(rename = "donorType")]
    pub kind: UserKind,
}

/// Reviewer stamp written on approve/reject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reviewer {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<&User> for Reviewer {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}
