//! Service layer: validation, verification, persistence and allocation.
//!
//! ## Flow of a create operation
//!
//! ```text
//! input --validate--> gate --insert--> store
//!                                  |
//!                                  +--> plan (engine) --commit--> store
//!                                                         |
//!                                                         +--> notify
//! ```
//!
//! Creation is what the caller asked for; allocation is a side effect. A
//! failed allocation is logged with `tracing::error!` and swallowed, and the
//! record is returned as stored.
//!
//! Every mutating operation takes `now` so the clock stays outside.

mod input;

pub use input::{
    DirectDonationInput, DonationInput, RejectInput, RequestInput, DEFAULT_DELIVERY_RADIUS,
    DEFAULT_UNIT,
};

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Config;
use crate::engine::{AllocationEngine, AllocationPlan};
use crate::error::{ServiceError, ServiceResult, ValidationError};
use crate::notify::Notifier;
use crate::store::{CommittedBatch, DonationQuery, RequestQuery, Store, StoreResult, UserQuery};
use crate::types::{
    Donation, MatchRecord, NewNotification, NewPoolDonation, NewRequest, Notification,
    NotificationId, PickupLocation, PoolDonation, Request, RequestId, RequestStatus,
    ResourceSpec, Reviewer, Urgency, User, UserId, UserKind,
};
use crate::verification::{assign_poc, GateDecision, VerificationGate};

/// Result of a direct donation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectDonation {
    pub donation: MatchRecord,
    pub request: Request,
}

/// Relief Hub operations over a [`Store`].
#[derive(Debug)]
pub struct ReliefService<S> {
    store: S,
    engine: AllocationEngine,
    gate: VerificationGate,
    rematch_on_approval: bool,
    notification_limit: usize,
}

impl<S: Store> ReliefService<S> {
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            store,
            engine: AllocationEngine::new(config.allocation.trust_reward),
            gate: VerificationGate::from_config(&config.verification),
            rematch_on_approval: config.verification.rematch_on_approval,
            notification_limit: config.notifications.list_limit,
        }
    }

    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[inline]
    pub fn engine(&self) -> &AllocationEngine {
        &self.engine
    }

    fn notifier(&self) -> Notifier<'_, S> {
        Notifier::new(&self.store)
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub fn register_user(&self, user: crate::types::NewUser) -> ServiceResult<User> {
        let user = input::validate_registration(user)?;
        let user = self.store.insert_user(user)?;
        tracing::info!(user_id = %user.id, kind = ?user.kind, "user registered");
        Ok(user)
    }

    /// Resolve the caller; unknown ids are unauthenticated
    pub fn authenticate(&self, id: UserId) -> ServiceResult<User> {
        self.store
            .get_user(id)?
            .ok_or(ServiceError::Unauthenticated)
    }

    pub fn organizations(&self) -> ServiceResult<Vec<User>> {
        Ok(self.store.find_users(&UserQuery::of_kind(UserKind::Organization))?)
    }

    pub fn pocs(&self) -> ServiceResult<Vec<User>> {
        Ok(self.store.find_users(&UserQuery::of_kind(UserKind::Poc))?)
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Validate, gate, store, ping and (if live) reverse-allocate a request.
    pub fn create_request(
        &self,
        actor: &User,
        input: RequestInput,
        now: DateTime<Utc>,
    ) -> ServiceResult<Request> {
        let category = input::required(input.category.as_deref(), "category")?;
        let specific_resource =
            input::required(input.specific_resource.as_deref(), "specificResource")?;
        let quantity = input::positive_quantity(input.quantity.as_ref())?;
        let urgency = input::urgency(input.urgency.as_deref())?;
        let needed_by = input::optional_date(input.needed_by.as_deref(), "neededBy")?;
        let pinged = self.validate_pings(input.pinged_organizations)?;
        let district = input.district.unwrap_or_default();

        let decision = self.gate.classify(&category, &specific_resource, quantity);
        let (status, assigned_poc) = match &decision {
            GateDecision::Active => (RequestStatus::Active, None),
            GateDecision::Hold(reason) => {
                tracing::info!(category = %category, ?reason, "request held for verification");
                (
                    RequestStatus::PendingVerification,
                    assign_poc(&self.store, &district)?,
                )
            }
        };

        let mut request = self.store.insert_request(NewRequest {
            user_id: actor.id,
            user_name: actor.name.clone(),
            user_type: actor.kind,
            address: input.address,
            landmark: input.landmark,
            district,
            state: input.state,
            coordinates: input.coordinates,
            category,
            specific_resource,
            quantity,
            unit: input.unit.unwrap_or_else(|| DEFAULT_UNIT.to_string()),
            urgency,
            needed_by,
            delivery_preference: input.delivery_preference.unwrap_or_default(),
            people_affected: input.people_affected,
            special_requirements: input.special_requirements,
            pinged_organizations: pinged,
            notified_poc: assigned_poc.is_none(),
            assigned_poc,
            status,
            created_at: now,
        })?;
        tracing::info!(
            request_id = %request.id,
            status = ?request.status,
            quantity = %request.quantity,
            "request created"
        );

        for org in &request.pinged_organizations {
            self.notifier().ping(*org, &actor.name);
        }

        if let Some(poc) = request.assigned_poc.clone() {
            if self.notifier().review_needed(poc.id, &request) {
                request.notified_poc = true;
                if let Err(err) = self.store.save_request(&request) {
                    tracing::warn!(
                        request_id = %request.id,
                        error = %err,
                        "could not record POC notice"
                    );
                }
            }
        }

        if request.is_active() {
            self.reverse_allocate(&request, now);
        }

        Ok(self.store.get_request(request.id)?.unwrap_or(request))
    }

    /// Each pinged id must be a registered organization; duplicates collapse
    fn validate_pings(&self, ids: Vec<UserId>) -> ServiceResult<Vec<UserId>> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if !seen.insert(id) {
                continue;
            }
            match self.store.get_user(id)? {
                Some(user) if user.is_organization() => out.push(id),
                _ => return Err(ValidationError::NotAnOrganization(id.get()).into()),
            }
        }
        Ok(out)
    }

    fn require_poc(actor: &User) -> ServiceResult<()> {
        if actor.is_poc() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("POC"))
        }
    }

    fn require_organization(actor: &User) -> ServiceResult<()> {
        if actor.is_organization() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("organization"))
        }
    }

    fn load_request(&self, id: RequestId) -> ServiceResult<Request> {
        self.store
            .get_request(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("request {id}")))
    }

    /// POC releases a held request
    pub fn approve_request(
        &self,
        actor: &User,
        id: RequestId,
        now: DateTime<Utc>,
    ) -> ServiceResult<Request> {
        Self::require_poc(actor)?;
        let mut request = self.load_request(id)?;
        if request.status != RequestStatus::PendingVerification {
            return Err(ServiceError::InvalidTransition {
                action: "approve",
                status: request.status,
            });
        }

        request.status = RequestStatus::Active;
        request.notified_poc = true;
        request.verified_by = Some(Reviewer::from(actor));
        request.verified_at = Some(now);
        request.updated_at = now;
        self.store.save_request(&request)?;
        tracing::info!(request_id = %id, poc_id = %actor.id, "request approved");

        if self.rematch_on_approval {
            self.reverse_allocate(&request, now);
            return Ok(self.store.get_request(id)?.unwrap_or(request));
        }
        Ok(request)
    }

    /// POC turns down a held or live request
    pub fn reject_request(
        &self,
        actor: &User,
        id: RequestId,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> ServiceResult<Request> {
        Self::require_poc(actor)?;
        let mut request = self.load_request(id)?;
        if !matches!(
            request.status,
            RequestStatus::PendingVerification | RequestStatus::Active
        ) {
            return Err(ServiceError::InvalidTransition {
                action: "reject",
                status: request.status,
            });
        }

        request.status = RequestStatus::Rejected;
        if let Some(reason) = reason.filter(|r| !r.trim().is_empty()) {
            request.rejection_reason = Some(reason);
        }
        request.verified_by = Some(Reviewer::from(actor));
        request.verified_at = Some(now);
        request.updated_at = now;
        self.store.save_request(&request)?;
        tracing::info!(request_id = %id, poc_id = %actor.id, "request rejected");
        Ok(request)
    }

    /// Donor gives straight to one request, bypassing both allocators
    pub fn donate_to_request(
        &self,
        actor: &User,
        id: RequestId,
        input: DirectDonationInput,
        now: DateTime<Utc>,
    ) -> ServiceResult<DirectDonation> {
        let request = self.load_request(id)?;
        let quantity = input::positive_quantity(input.quantity.as_ref())?;
        let location = PickupLocation {
            pickup_address: input.pickup_address,
            district: input
                .district
                .or_else(|| actor.district.clone())
                .unwrap_or_default(),
            state: input.state.or_else(|| actor.state.clone()),
        };

        let plan = self.engine.plan_direct(&request, actor, quantity, location, now);
        let committed = self
            .commit_plan(plan)?
            .ok_or_else(|| ServiceError::from(ValidationError::BadQuantity))?;

        let donation = self
            .store
            .match_records_for_request(id)?
            .into_iter()
            .find(|m| committed.match_ids.first() == Some(&m.id))
            .ok_or_else(|| ServiceError::NotFound("match record".to_string()))?;
        let request = self.load_request(id)?;
        Ok(DirectDonation { donation, request })
    }

    /// Every request, or those owned by or pinging `organization`.
    ///
    /// Without an organization filter the viewer's own requests are left out.
    pub fn list_requests(
        &self,
        viewer: Option<&User>,
        organization: Option<UserId>,
    ) -> ServiceResult<Vec<Request>> {
        let all = self.store.find_requests(&RequestQuery::default())?;
        Ok(match (organization, viewer) {
            (Some(org), _) => all
                .into_iter()
                .filter(|r| r.user_id == org || r.pinged_organizations.contains(&org))
                .collect(),
            (None, Some(viewer)) => all.into_iter().filter(|r| r.user_id != viewer.id).collect(),
            (None, None) => all,
        })
    }

    pub fn my_requests(&self, actor: &User) -> ServiceResult<Vec<Request>> {
        Ok(self.store.find_requests(&RequestQuery {
            owner: Some(actor.id),
            ..RequestQuery::default()
        })?)
    }

    /// Active requests that pinged the calling organization, newest first
    pub fn pinged_requests(&self, actor: &User) -> ServiceResult<Vec<Request>> {
        Self::require_organization(actor)?;
        let mut out = self.store.find_requests(&RequestQuery {
            pinged: Some(actor.id),
            status: Some(RequestStatus::Active),
            ..RequestQuery::default()
        })?;
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(out)
    }

    /// Requests the calling organization has given to, most recently updated first
    pub fn helped_requests(&self, actor: &User) -> ServiceResult<Vec<Request>> {
        Self::require_organization(actor)?;
        let ids: BTreeSet<RequestId> = self
            .store
            .match_records_by_donor(actor.id)?
            .into_iter()
            .map(|m| m.request_id)
            .collect();

        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(request) = self.store.get_request(id)? {
                out.push(request);
            }
        }
        out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(out)
    }

    /// Match records credited to a request, newest first
    pub fn request_donations(&self, id: RequestId) -> ServiceResult<Vec<Donation>> {
        self.load_request(id)?;
        let mut records = self.store.match_records_for_request(id)?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records.into_iter().map(Donation::Match).collect())
    }

    // ========================================================================
    // Donations
    // ========================================================================

    /// Validate and store a pool donation, then forward-allocate it.
    pub fn create_donation(
        &self,
        actor: &User,
        input: DonationInput,
        now: DateTime<Utc>,
    ) -> ServiceResult<PoolDonation> {
        let category = input::required(input.category.as_deref(), "category")?;
        let specific_resource =
            input::required(input.specific_resource.as_deref(), "specificResource")?;
        if input.quantity.is_none() {
            return Err(ValidationError::MissingField("quantity").into());
        }
        let quantity = input::positive_quantity(input.quantity.as_ref())?;
        let expiry_date = input::optional_date(input.expiry_date.as_deref(), "expiryDate")?;
        let available_until =
            input::optional_date(input.available_until.as_deref(), "availableUntil")?;

        let donation = self.store.insert_donation(NewPoolDonation {
            donor: actor.as_donor(),
            resource: ResourceSpec {
                category,
                specific_resource,
                unit: input.unit.unwrap_or_else(|| DEFAULT_UNIT.to_string()),
            },
            quantity,
            condition: input.condition.unwrap_or_default(),
            expiry_date,
            available_until,
            location: PickupLocation {
                pickup_address: input.pickup_address,
                district: input
                    .district
                    .or_else(|| actor.district.clone())
                    .unwrap_or_default(),
                state: input.state.or_else(|| actor.state.clone()),
            },
            can_deliver: input.can_deliver.unwrap_or(false),
            can_pickup: input.can_pickup.unwrap_or(false),
            delivery_radius: input
                .delivery_radius
                .filter(|r| *r > 0)
                .unwrap_or(DEFAULT_DELIVERY_RADIUS),
            created_at: now,
        })?;
        tracing::info!(
            donation_id = %donation.id,
            quantity = %donation.quantity,
            district = %donation.location.district,
            "pool donation listed"
        );

        self.forward_allocate(&donation, now);

        Ok(self.store.get_donation(donation.id)?.unwrap_or(donation))
    }

    /// Pools with something left, newest first
    pub fn available_donations(&self) -> ServiceResult<Vec<PoolDonation>> {
        let mut out = self.store.find_donations(&DonationQuery::available())?;
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(out)
    }

    // ========================================================================
    // Allocation
    // ========================================================================

    /// Run the reverse allocator for `request`, committing the result.
    ///
    /// Returns `Ok(None)` when there was nothing to allocate.
    pub fn try_reverse_allocate(
        &self,
        request: &Request,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<CommittedBatch>> {
        let supply = self
            .store
            .find_donations(&DonationQuery::supply(&request.category, &request.district))?;
        let plan = self.engine.plan_reverse(request, supply, now);
        self.commit_plan(plan)
    }

    /// Run the forward allocator for `donation`, committing the result.
    pub fn try_forward_allocate(
        &self,
        donation: &PoolDonation,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<CommittedBatch>> {
        let demand = self.store.find_requests(&RequestQuery::demand(
            &donation.resource.category,
            &donation.location.district,
        ))?;
        let plan = self.engine.plan_forward(donation, demand, now);
        self.commit_plan(plan)
    }

    fn reverse_allocate(&self, request: &Request, now: DateTime<Utc>) {
        if let Err(err) = self.try_reverse_allocate(request, now) {
            tracing::error!(request_id = %request.id, error = %err, "reverse allocation failed");
        }
    }

    fn forward_allocate(&self, donation: &PoolDonation, now: DateTime<Utc>) {
        if let Err(err) = self.try_forward_allocate(donation, now) {
            tracing::error!(donation_id = %donation.id, error = %err, "forward allocation failed");
        }
    }

    fn commit_plan(&self, plan: AllocationPlan) -> StoreResult<Option<CommittedBatch>> {
        if plan.is_empty() {
            return Ok(None);
        }
        let AllocationPlan { batch, events } = plan;
        let committed = self.store.commit(batch)?;

        let receipt = &committed.receipt;
        tracing::info!(
            batch_id = receipt.batch_id,
            direction = ?receipt.direction,
            fills = receipt.fills,
            total = %receipt.total_allocated,
            digest = %receipt.digest_hex(),
            "allocation committed"
        );

        let delivered = self.notifier().deliver(&events);
        tracing::debug!(delivered, expected = events.len(), "allocation notifications sent");
        Ok(Some(committed))
    }

    // ========================================================================
    // Stats
    // ========================================================================

    /// Active requests per urgency; the four selectable levels are always present
    pub fn urgency_stats(&self) -> ServiceResult<BTreeMap<String, usize>> {
        let mut counts: BTreeMap<String, usize> = Urgency::SELECTABLE
            .iter()
            .map(|u| (u.as_str().to_string(), 0))
            .collect();
        for request in self.active_requests()? {
            *counts.entry(request.urgency.as_str().to_string()).or_default() += 1;
        }
        Ok(counts)
    }

    /// Active requests per category
    pub fn category_stats(&self) -> ServiceResult<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        for request in self.active_requests()? {
            *counts.entry(request.category).or_default() += 1;
        }
        Ok(counts)
    }

    fn active_requests(&self) -> StoreResult<Vec<Request>> {
        self.store.find_requests(&RequestQuery {
            status: Some(RequestStatus::Active),
            ..RequestQuery::default()
        })
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    pub fn notifications(&self, actor: &User) -> ServiceResult<Vec<Notification>> {
        Ok(self
            .store
            .notifications_for(actor.id, self.notification_limit)?)
    }

    /// Mark one of the caller's notifications read; false if it is not theirs
    pub fn mark_notification_read(&self, actor: &User, id: NotificationId) -> ServiceResult<bool> {
        Ok(self.store.mark_read(id, actor.id)?)
    }

    /// Store an arbitrary system notification for a user
    pub fn notify(&self, notification: NewNotification) -> bool {
        self.notifier().send(notification)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
