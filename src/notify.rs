//! Turns allocation events and review actions into stored notifications.
//!
//! Delivery is best effort. A failed write is logged and skipped so one bad
//! notification never stops the rest, and never rolls back the allocation
//! that caused it.

use crate::engine::AllocationEvent;
use crate::store::NotificationStore;
use crate::types::quantity::format_quantity;
use crate::types::{NewNotification, NotificationKind, Request, UserId};

/// Render the alert for one allocation event
pub fn render(event: &AllocationEvent) -> NewNotification {
    match event {
        AllocationEvent::SupplyMatched {
            donor_id,
            resource,
            quantity,
            unit,
        } => NewNotification::to_dashboard(
            *donor_id,
            NotificationKind::Donation,
            "Your donation was matched!",
            format!(
                "Your available supply of {resource} was auto-matched to a new request \
                 for {} {unit}.",
                format_quantity(*quantity)
            ),
        ),

        AllocationEvent::RequestInstantlyMatched {
            requester_id,
            supplies,
            ..
        } => NewNotification::to_dashboard(
            *requester_id,
            NotificationKind::Fulfillment,
            "Request instantly matched!",
            format!(
                "We found {supplies} available supplies that match your request. \
                 Check your dashboard."
            ),
        ),

        AllocationEvent::RequestAutoMatched {
            requester_id,
            resource,
            quantity,
            unit,
            donor_name,
            ..
        } => NewNotification::to_dashboard(
            *requester_id,
            NotificationKind::Fulfillment,
            "Your request was auto-matched!",
            format!(
                "An auto-allocation matched {} {unit} of {resource} to your request \
                 from {donor_name}.",
                format_quantity(*quantity)
            ),
        ),

        AllocationEvent::DirectDonationReceived {
            requester_id,
            resource,
            requested,
            unit,
            fulfilled: true,
            ..
        } => NewNotification::to_dashboard(
            *requester_id,
            NotificationKind::Fulfillment,
            "Request Fulfilled!",
            format!(
                "Your request for {} {unit} of {resource} has been fully matched!",
                format_quantity(*requested)
            ),
        ),

        AllocationEvent::DirectDonationReceived {
            requester_id,
            resource,
            donated,
            unit,
            fulfilled: false,
            ..
        } => NewNotification::to_dashboard(
            *requester_id,
            NotificationKind::Donation,
            "New Donation Received",
            format!(
                "Someone donated {} {unit} towards your request for {resource}.",
                format_quantity(*donated)
            ),
        ),
    }
}

/// Writes notifications through a [`NotificationStore`].
pub struct Notifier<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: NotificationStore + ?Sized> Notifier<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Store one notification; false (and a warning) if the write failed
    pub fn send(&self, notification: NewNotification) -> bool {
        let user_id = notification.user_id;
        match self.store.create_notification(notification) {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(user_id = %user_id, error = %err, "notification dropped");
                false
            }
        }
    }

    /// Announce committed allocation events; returns how many were stored
    pub fn deliver(&self, events: &[AllocationEvent]) -> usize {
        events.iter().filter(|e| self.send(render(e))).count()
    }

    /// Tell an organization a requester asked for it by name
    pub fn ping(&self, organization: UserId, requester_name: &str) -> bool {
        self.send(NewNotification::to_dashboard(
            organization,
            NotificationKind::Ping,
            "New Help Request Ping!",
            format!("{requester_name} has specifically requested help from your organization."),
        ))
    }

    /// Ask the assigned POC to review a held request
    pub fn review_needed(&self, poc: UserId, request: &Request) -> bool {
        self.send(NewNotification::to_dashboard(
            poc,
            NotificationKind::Urgency,
            "Request awaiting verification",
            format!(
                "{} asked for {} {} of {} in {}. Please review it on your dashboard.",
                request.user_name,
                format_quantity(request.quantity),
                request.unit,
                request.specific_resource,
                request.district
            ),
        ))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError, StoreResult};
    use crate::types::{Notification, NotificationId, RequestId, DASHBOARD_LINK};
    use rust_decimal::Decimal;

    #[test]
    fn test_render_supply_matched() {
        let n = render(&AllocationEvent::SupplyMatched {
            donor_id: UserId(4),
            resource: "Rice".into(),
            quantity: Decimal::new(400, 1),
            unit: "kg".into(),
        });

        assert_eq!(n.user_id, UserId(4));
        assert_eq!(n.kind, NotificationKind::Donation);
        assert_eq!(n.title, "Your donation was matched!");
        assert_eq!(
            n.message,
            "Your available supply of Rice was auto-matched to a new request for 40 kg."
        );
        assert_eq!(n.link.as_deref(), Some(DASHBOARD_LINK));
    }

    #[test]
    fn test_render_direct_donation_variants() {
        let partial = render(&AllocationEvent::DirectDonationReceived {
            requester_id: UserId(2),
            request_id: RequestId(1),
            resource: "Blankets".into(),
            donated: Decimal::from(3),
            requested: Decimal::from(10),
            unit: "pcs".into(),
            fulfilled: false,
        });
        assert_eq!(partial.title, "New Donation Received");
        assert_eq!(partial.kind, NotificationKind::Donation);
        assert_eq!(partial.message, "Someone donated 3 pcs towards your request for Blankets.");

        let full = render(&AllocationEvent::DirectDonationReceived {
            requester_id: UserId(2),
            request_id: RequestId(1),
            resource: "Blankets".into(),
            donated: Decimal::from(10),
            requested: Decimal::from(10),
            unit: "pcs".into(),
            fulfilled: true,
        });
        assert_eq!(full.title, "Request Fulfilled!");
        assert_eq!(full.kind, NotificationKind::Fulfillment);
        assert_eq!(full.message, "Your request for 10 pcs of Blankets has been fully matched!");
    }

    /// Store whose writes always fail
    struct Broken;

    impl NotificationStore for Broken {
        fn create_notification(&self, _: NewNotification) -> StoreResult<Notification> {
            Err(StoreError::Unavailable("down".into()))
        }
        fn notifications_for(&self, _: UserId, _: usize) -> StoreResult<Vec<Notification>> {
            Ok(Vec::new())
        }
        fn mark_read(&self, _: NotificationId, _: UserId) -> StoreResult<bool> {
            Ok(false)
        }
    }

    #[test]
    fn test_deliver_counts_and_survives_failures() {
        let events = vec![
            AllocationEvent::RequestInstantlyMatched {
                requester_id: UserId(1),
                request_id: RequestId(1),
                supplies: 2,
            },
            AllocationEvent::RequestInstantlyMatched {
                requester_id: UserId(2),
                request_id: RequestId(2),
                supplies: 1,
            },
        ];

        assert_eq!(Notifier::new(&Broken).deliver(&events), 0);

        let store = MemoryStore::new();
        assert_eq!(Notifier::new(&store).deliver(&events), 2);
        let stored = store.notifications_for(UserId(1), 20).unwrap();
        assert_eq!(
            stored[0].message,
            "We found 2 available supplies that match your request. Check your dashboard."
        );
    }

    #[test]
    fn test_ping_text() {
        let store = MemoryStore::new();
        assert!(Notifier::new(&store).ping(UserId(7), "Ravi"));

        let stored = store.notifications_for(UserId(7), 20).unwrap();
        assert_eq!(stored[0].title, "New Help Request Ping!");
        assert_eq!(
            stored[0].message,
            "Ravi has specifically requested help from your organization."
        );
        assert_eq!(stored[0].kind, NotificationKind::Ping);
    }
}
