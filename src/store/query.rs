//! Filters accepted by the `find_*` store operations.
//!
//! Every field is optional; `None` means "don't filter on this". District and
//! category comparisons are exact, case-sensitive string equality.

use crate::types::{DonationStatus, PoolDonation, Request, RequestStatus, User, UserId, UserKind};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestQuery {
    pub category: Option<String>,
    pub district: Option<String>,
    pub status: Option<RequestStatus>,
    pub owner: Option<UserId>,
    /// Requests that pinged this organization
    pub pinged: Option<UserId>,
}

impl RequestQuery {
    /// Active requests competing for supply in one category and district
    pub fn demand(category: &str, district: &str) -> Self {
        Self {
            category: Some(category.to_string()),
            district: Some(district.to_string()),
            status: Some(RequestStatus::Active),
            ..Self::default()
        }
    }

    pub fn matches(&self, request: &Request) -> bool {
        self.category.as_deref().map_or(true, |c| request.category == c)
            && self.district.as_deref().map_or(true, |d| request.district == d)
            && self.status.map_or(true, |s| request.status == s)
            && self.owner.map_or(true, |o| request.user_id == o)
            && self
                .pinged
                .map_or(true, |org| request.pinged_organizations.contains(&org))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonationQuery {
    pub category: Option<String>,
    pub district: Option<String>,
    pub status: Option<DonationStatus>,
    pub donor: Option<UserId>,
    /// Only pools with `remaining_quantity > 0`
    pub with_remaining: bool,
}

impl DonationQuery {
    /// Available pools a new request in `category`/`district` may draw on
    pub fn supply(category: &str, district: &str) -> Self {
        Self {
            category: Some(category.to_string()),
            district: Some(district.to_string()),
            status: Some(DonationStatus::Available),
            donor: None,
            with_remaining: true,
        }
    }

    /// Every available pool with something left, any category or district
    pub fn available() -> Self {
        Self {
            status: Some(DonationStatus::Available),
            with_remaining: true,
            ..Self::default()
        }
    }

    pub fn matches(&self, donation: &PoolDonation) -> bool {
        self.category
            .as_deref()
            .map_or(true, |c| donation.resource.category == c)
            && self
                .district
                .as_deref()
                .map_or(true, |d| donation.location.district == d)
            && self.status.map_or(true, |s| donation.status == s)
            && self.donor.map_or(true, |u| donation.donor.id == u)
            && (!self.with_remaining || donation.remaining_quantity > rust_decimal::Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub kind: Option<UserKind>,
    /// Compared case-insensitively
    pub district: Option<String>,
}

impl UserQuery {
    pub fn of_kind(kind: UserKind) -> Self {
        Self {
            kind: Some(kind),
            district: None,
        }
    }

    pub fn matches(&self, user: &User) -> bool {
        self.kind.map_or(true, |k| user.kind == k)
            && self.district.as_deref().map_or(true, |d| {
                let wanted = d.to_lowercase();
                user.district
                    .as_deref()
                    .is_some_and(|ud| ud.to_lowercase() == wanted)
            })
    }
}
