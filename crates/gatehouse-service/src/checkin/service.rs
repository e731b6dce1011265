//! The check-in orchestrator.
//!
//! Converts "visitor X has arrived" into a safe, idempotent, ordered
//! sequence of effects. The ledger transition is the only effect that must
//! be durable; everything downstream is best-effort and must never fail or
//! block the caller's response.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use gatehouse_core::result::AppResult;
use gatehouse_core::traits::notifier::NotificationGateway;
use gatehouse_core::types::facility_time::FacilityClock;
use gatehouse_database::ledger::InviteLedger;
use gatehouse_database::queue::TaskQueue;
use gatehouse_entity::job::CreateJob;
use gatehouse_entity::visitor::Visitor;
use gatehouse_realtime::{BroadcastDispatcher, CardKind, DashboardCard};

/// Definitive status reported to the arrival caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrivalStatus {
    /// Identity resolved and the visitor is (or already was) checked in.
    Matched,
    /// Identity resolved but no invite exists for today.
    NotInvited,
    /// Identity could not be resolved from the biometric gallery.
    NotRegistered,
}

/// Outcome of one arrival event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrivalOutcome {
    /// Definitive status, always present even when side effects failed.
    pub status: ArrivalStatus,
    /// Visitor display name when identity was resolved.
    pub name: Option<String>,
}

impl ArrivalOutcome {
    /// An arrival whose identity could not be resolved.
    pub fn not_registered() -> Self {
        Self {
            status: ArrivalStatus::NotRegistered,
            name: None,
        }
    }
}

/// Orchestrates the per-(email, date) check-in state machine.
pub struct CheckInService {
    ledger: Arc<dyn InviteLedger>,
    notifier: Arc<dyn NotificationGateway>,
    dispatcher: BroadcastDispatcher,
    tasks: Arc<dyn TaskQueue>,
    clock: FacilityClock,
    feedback_max_attempts: i32,
}

impl CheckInService {
    /// Create a new check-in orchestrator.
    pub fn new(
        ledger: Arc<dyn InviteLedger>,
        notifier: Arc<dyn NotificationGateway>,
        dispatcher: BroadcastDispatcher,
        tasks: Arc<dyn TaskQueue>,
        clock: FacilityClock,
        feedback_max_attempts: i32,
    ) -> Self {
        Self {
            ledger,
            notifier,
            dispatcher,
            tasks,
            clock,
            feedback_max_attempts,
        }
    }

    /// Process a resolved arrival.
    ///
    /// The caller guarantees the biometric match already occurred and met
    /// its confidence threshold. Re-arrival for an already-checked-in
    /// invite is a no-op: it reports `Matched` again without re-triggering
    /// any side effect.
    pub async fn process_arrival(
        &self,
        visitor: &Visitor,
        now: DateTime<Utc>,
    ) -> AppResult<ArrivalOutcome> {
        let local_date = self.clock.local_date(now);

        let Some(invite) = self.ledger.find_for_date(&visitor.email, local_date).await? else {
            info!(email = %visitor.email, date = %local_date, "Arrival without invite for today");
            return Ok(ArrivalOutcome {
                status: ArrivalStatus::NotInvited,
                name: Some(visitor.name.clone()),
            });
        };

        if !invite.is_pending() {
            info!(invite_id = %invite.id, "Repeat arrival for checked-in invite, no-op");
            return Ok(self.matched(visitor));
        }

        // The uniqueness lookup above and this transition act as one logical
        // unit through the ledger's conditional update: of any concurrent
        // arrivals for the same invite, exactly one lands here as the winner.
        match self.ledger.mark_checked_in(invite.id, now).await {
            Ok(()) => {}
            Err(e) if e.is_already_checked_in() => {
                info!(invite_id = %invite.id, "Lost check-in race, treating as repeat arrival");
                return Ok(self.matched(visitor));
            }
            Err(e) => return Err(e),
        }

        info!(
            invite_id = %invite.id,
            email = %visitor.email,
            date = %local_date,
            "Visitor checked in"
        );

        // Side effects run off the request task, in order, each isolated:
        // a failure in one is logged and the next still runs.
        let effects = SideEffects {
            notifier: Arc::clone(&self.notifier),
            dispatcher: self.dispatcher.clone(),
            tasks: Arc::clone(&self.tasks),
            visitor: visitor.clone(),
            checkin_time: now,
            feedback_max_attempts: self.feedback_max_attempts,
        };
        tokio::spawn(effects.run());

        Ok(self.matched(visitor))
    }

    fn matched(&self, visitor: &Visitor) -> ArrivalOutcome {
        ArrivalOutcome {
            status: ArrivalStatus::Matched,
            name: Some(visitor.name.clone()),
        }
    }
}

/// The ordered post-transition side effects of a won check-in.
struct SideEffects {
    notifier: Arc<dyn NotificationGateway>,
    dispatcher: BroadcastDispatcher,
    tasks: Arc<dyn TaskQueue>,
    visitor: Visitor,
    checkin_time: DateTime<Utc>,
    feedback_max_attempts: i32,
}

impl SideEffects {
    async fn run(self) {
        // (a) operator notification
        let message = format!(
            "Your visitor {} has arrived at the facility for their appointment",
            self.visitor.name
        );
        if let Err(e) = self.notifier.notify_operator(&message).await {
            warn!(error = %e, "Operator notification failed");
        }

        // (b) dashboard card
        let card = DashboardCard::new(
            CardKind::VisitorCheckin,
            serde_json::json!({
                "visitor_name": self.visitor.name,
                "checkin_time": self.checkin_time,
            }),
        );
        if let Err(e) = self.dispatcher.publish(&card, self.checkin_time).await {
            warn!(error = %e, "Check-in card broadcast failed");
        }

        // (c) deferred feedback invitation
        let job = CreateJob {
            job_type: "feedback_invitation".to_string(),
            payload: serde_json::json!({
                "visitor_id": self.visitor.id,
                "email": self.visitor.email,
                "name": self.visitor.name,
            }),
            max_attempts: self.feedback_max_attempts,
            scheduled_at: None,
        };
        if let Err(e) = self.tasks.enqueue(&job).await {
            warn!(error = %e, "Failed to enqueue feedback invitation");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate, NaiveTime};
    use gatehouse_core::AppError;
    use gatehouse_core::traits::notifier::EmailMessage;
    use gatehouse_core::traits::transport::{CardTransport, DeliveryOutcome};
    use gatehouse_core::types::id::ConnectionId;
    use gatehouse_entity::invite::{CreateInvite, Invite, InviteStatus};
    use gatehouse_entity::job::Job;
    use gatehouse_realtime::ConnectionRegistry;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;
    use uuid::Uuid;

    /// In-memory ledger with the same CAS contract as the repository.
    #[derive(Default)]
    struct MemoryLedger {
        invites: Mutex<HashMap<Uuid, Invite>>,
    }

    impl MemoryLedger {
        fn seed(&self, email: &str, date: NaiveDate) -> Uuid {
            let id = Uuid::new_v4();
            let invite = Invite {
                id,
                visitor_name: "Amira Haddad".to_string(),
                email: email.to_string(),
                visit_date: date,
                visit_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                status: InviteStatus::Invited,
                checkin_time: None,
                created_at: Utc::now(),
            };
            self.invites.lock().unwrap().insert(id, invite);
            id
        }

        fn status_of(&self, id: Uuid) -> InviteStatus {
            self.invites.lock().unwrap()[&id].status
        }
    }

    #[async_trait]
    impl InviteLedger for MemoryLedger {
        async fn insert(&self, invite: &CreateInvite) -> AppResult<Invite> {
            let mut invites = self.invites.lock().unwrap();
            if invites
                .values()
                .any(|i| i.email == invite.email && i.visit_date == invite.visit_date)
            {
                return Err(AppError::duplicate_invite("duplicate"));
            }
            let stored = Invite {
                id: Uuid::new_v4(),
                visitor_name: invite.visitor_name.clone(),
                email: invite.email.clone(),
                visit_date: invite.visit_date,
                visit_time: invite.visit_time,
                status: InviteStatus::Invited,
                checkin_time: None,
                created_at: Utc::now(),
            };
            invites.insert(stored.id, stored.clone());
            Ok(stored)
        }

        async fn find_for_date(&self, email: &str, date: NaiveDate) -> AppResult<Option<Invite>> {
            Ok(self
                .invites
                .lock()
                .unwrap()
                .values()
                .find(|i| i.email == email && i.visit_date == date)
                .cloned())
        }

        async fn mark_checked_in(&self, invite_id: Uuid, time: DateTime<Utc>) -> AppResult<()> {
            let mut invites = self.invites.lock().unwrap();
            let invite = invites
                .get_mut(&invite_id)
                .ok_or_else(|| AppError::not_found("invite"))?;
            if invite.status != InviteStatus::Invited {
                return Err(AppError::already_checked_in("not pending"));
            }
            invite.status = InviteStatus::CheckedIn;
            invite.checkin_time = Some(time);
            Ok(())
        }

        async fn count_for_date(&self, date: NaiveDate) -> AppResult<i64> {
            Ok(self
                .invites
                .lock()
                .unwrap()
                .values()
                .filter(|i| i.visit_date == date)
                .count() as i64)
        }

        async fn recent_checkins(&self, _limit: i64) -> AppResult<Vec<Invite>> {
            Ok(Vec::new())
        }
    }

    /// Gateway fake that counts operator notifications.
    #[derive(Default)]
    struct CountingGateway {
        notifications: AtomicUsize,
    }

    #[async_trait]
    impl NotificationGateway for CountingGateway {
        async fn notify_operator(&self, _message: &str) -> AppResult<()> {
            self.notifications.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn send_email(&self, _message: &EmailMessage) -> AppResult<()> {
            Ok(())
        }
    }

    /// Transport fake counting deliveries.
    #[derive(Default)]
    struct CountingTransport {
        deliveries: AtomicUsize,
    }

    #[async_trait]
    impl CardTransport for CountingTransport {
        async fn deliver(&self, _id: ConnectionId, _payload: &str) -> DeliveryOutcome {
            self.deliveries.fetch_add(1, Ordering::SeqCst);
            DeliveryOutcome::Delivered
        }
    }

    /// Queue fake that signals each enqueue. The feedback enqueue is the
    /// last side effect, so receiving the signal means (a) and (b) are done.
    struct SignallingQueue {
        enqueued: AtomicUsize,
        tx: mpsc::UnboundedSender<String>,
    }

    #[async_trait]
    impl TaskQueue for SignallingQueue {
        async fn enqueue(&self, job: &CreateJob) -> AppResult<Job> {
            self.enqueued.fetch_add(1, Ordering::SeqCst);
            let _ = self.tx.send(job.job_type.clone());
            Ok(Job {
                id: Uuid::new_v4(),
                job_type: job.job_type.clone(),
                payload: job.payload.clone(),
                status: gatehouse_entity::job::JobStatus::Pending,
                attempts: 0,
                max_attempts: job.max_attempts,
                scheduled_at: job.scheduled_at,
                last_error: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        }
    }

    struct Harness {
        service: CheckInService,
        ledger: Arc<MemoryLedger>,
        gateway: Arc<CountingGateway>,
        transport: Arc<CountingTransport>,
        queue: Arc<SignallingQueue>,
        effects_rx: mpsc::UnboundedReceiver<String>,
        registry: Arc<ConnectionRegistry>,
    }

    fn harness() -> Harness {
        let ledger = Arc::new(MemoryLedger::default());
        let gateway = Arc::new(CountingGateway::default());
        let transport = Arc::new(CountingTransport::default());
        let registry = Arc::new(ConnectionRegistry::new());
        let dispatcher = BroadcastDispatcher::new(registry.clone(), transport.clone());
        let (tx, effects_rx) = mpsc::unbounded_channel();
        let queue = Arc::new(SignallingQueue {
            enqueued: AtomicUsize::new(0),
            tx,
        });

        let service = CheckInService::new(
            ledger.clone(),
            gateway.clone(),
            dispatcher,
            queue.clone(),
            FacilityClock::from_offset_hours(3),
            3,
        );

        Harness {
            service,
            ledger,
            gateway,
            transport,
            queue,
            effects_rx,
            registry,
        }
    }

    fn visitor(email: &str) -> Visitor {
        Visitor {
            id: Uuid::new_v4(),
            name: "Amira Haddad".to_string(),
            email: email.to_string(),
            face_template_id: Some("tmpl-1".to_string()),
            passed_registration: true,
            registered_at: Utc::now(),
        }
    }

    fn arrival_time() -> DateTime<Utc> {
        "2025-06-01T09:00:00Z".parse().unwrap()
    }

    async fn await_effects(h: &mut Harness) {
        let job_type = tokio::time::timeout(std::time::Duration::from_secs(1), h.effects_rx.recv())
            .await
            .expect("side effects did not finish")
            .expect("queue channel closed");
        assert_eq!(job_type, "feedback_invitation");
    }

    async fn assert_no_more_effects(h: &mut Harness) {
        let extra =
            tokio::time::timeout(std::time::Duration::from_millis(100), h.effects_rx.recv()).await;
        assert!(extra.is_err(), "unexpected extra side effects");
    }

    #[tokio::test]
    async fn test_checkin_transitions_and_fires_effects_once() {
        let mut h = harness();
        let v = visitor("a@x.com");
        let now = arrival_time();
        let local_date = FacilityClock::from_offset_hours(3).local_date(now);
        let invite_id = h.ledger.seed(&v.email, local_date);

        // Live dashboard connection to receive the card.
        let (tx, _rx) = mpsc::channel(8);
        h.registry
            .add(ConnectionId::new(), tx, now, Duration::seconds(600));

        let outcome = h.service.process_arrival(&v, now).await.unwrap();

        assert_eq!(outcome.status, ArrivalStatus::Matched);
        assert_eq!(outcome.name.as_deref(), Some("Amira Haddad"));
        assert_eq!(h.ledger.status_of(invite_id), InviteStatus::CheckedIn);

        await_effects(&mut h).await;
        assert_eq!(h.gateway.notifications.load(Ordering::SeqCst), 1);
        assert_eq!(h.transport.deliveries.load(Ordering::SeqCst), 1);
        assert_eq!(h.queue.enqueued.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_repeat_arrival_is_idempotent() {
        let mut h = harness();
        let v = visitor("a@x.com");
        let now = arrival_time();
        let local_date = FacilityClock::from_offset_hours(3).local_date(now);
        h.ledger.seed(&v.email, local_date);

        let first = h.service.process_arrival(&v, now).await.unwrap();
        assert_eq!(first.status, ArrivalStatus::Matched);
        await_effects(&mut h).await;

        let second = h.service.process_arrival(&v, now).await.unwrap();
        assert_eq!(second.status, ArrivalStatus::Matched);
        assert_no_more_effects(&mut h).await;

        assert_eq!(h.gateway.notifications.load(Ordering::SeqCst), 1);
        assert_eq!(h.queue.enqueued.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_invite_today_reports_not_invited() {
        let mut h = harness();
        let v = visitor("a@x.com");
        let now = arrival_time();

        // Invite exists, but for a different date.
        h.ledger
            .seed(&v.email, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());

        let outcome = h.service.process_arrival(&v, now).await.unwrap();
        assert_eq!(outcome.status, ArrivalStatus::NotInvited);
        assert_no_more_effects(&mut h).await;
        assert_eq!(h.gateway.notifications.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrent_arrivals_transition_once() {
        let mut h = harness();
        let v = visitor("a@x.com");
        let now = arrival_time();
        let local_date = FacilityClock::from_offset_hours(3).local_date(now);
        h.ledger.seed(&v.email, local_date);

        let service = Arc::new(h.service);
        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = Arc::clone(&service);
            let v = v.clone();
            handles.push(tokio::spawn(
                async move { service.process_arrival(&v, now).await },
            ));
        }

        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            assert_eq!(outcome.status, ArrivalStatus::Matched);
        }

        h.effects_rx.recv().await.expect("winner side effects");
        let extra =
            tokio::time::timeout(std::time::Duration::from_millis(100), h.effects_rx.recv()).await;
        assert!(extra.is_err(), "more than one arrival won the transition");
        assert_eq!(h.queue.enqueued.load(Ordering::SeqCst), 1);
        assert_eq!(h.gateway.notifications.load(Ordering::SeqCst), 1);
    }
}
