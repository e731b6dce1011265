//! Individual and bulk invite registration.
//!
//! The bulk path takes already-decoded rows; file parsing belongs to the
//! upload boundary, not here. Uniqueness of (email, visit date) is enforced
//! by the ledger insert, so concurrent duplicate attempts resolve to exactly
//! one success.

use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use gatehouse_core::result::AppResult;
use gatehouse_core::traits::notifier::{EmailMessage, NotificationGateway};
use gatehouse_core::types::facility_time::FacilityClock;
use gatehouse_database::ledger::InviteLedger;
use gatehouse_entity::invite::{CreateInvite, Invite};

/// One invite registration request row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInviteRequest {
    /// Invited person's display name.
    pub name: String,
    /// Invited person's email address.
    pub email: String,
    /// Facility-local visit date.
    pub visit_date: NaiveDate,
    /// Scheduled visit time.
    pub visit_time: NaiveTime,
}

/// Per-row outcome of a bulk registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkRegistrationReport {
    /// Rows stored and invited.
    pub registered: usize,
    /// Row-indexed failures (1-based, matching the uploaded file).
    pub failures: Vec<BulkRowFailure>,
}

/// A single failed bulk row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkRowFailure {
    /// 1-based row number.
    pub row: usize,
    /// What went wrong.
    pub error: String,
}

/// Registers invites and sends invitation emails.
pub struct InviteService {
    ledger: Arc<dyn InviteLedger>,
    notifier: Arc<dyn NotificationGateway>,
    clock: FacilityClock,
}

impl InviteService {
    /// Create a new invite service.
    pub fn new(
        ledger: Arc<dyn InviteLedger>,
        notifier: Arc<dyn NotificationGateway>,
        clock: FacilityClock,
    ) -> Self {
        Self {
            ledger,
            notifier,
            clock,
        }
    }

    /// Register a single invite and send the invitation email.
    ///
    /// Fails with `DuplicateInvite` when the person is already expected on
    /// that date. The email is best-effort; a send failure does not undo
    /// the registration.
    pub async fn register(
        &self,
        request: &RegisterInviteRequest,
        now: DateTime<Utc>,
    ) -> AppResult<Invite> {
        self.validate(request, now)?;

        let invite = self
            .ledger
            .insert(&CreateInvite {
                visitor_name: request.name.trim().to_string(),
                email: request.email.trim().to_lowercase(),
                visit_date: request.visit_date,
                visit_time: request.visit_time,
            })
            .await?;

        info!(
            invite_id = %invite.id,
            email = %invite.email,
            date = %invite.visit_date,
            "Invite registered"
        );

        if let Err(e) = self.notifier.send_email(&invitation_email(&invite)).await {
            warn!(invite_id = %invite.id, error = %e, "Invitation email failed");
        }

        Ok(invite)
    }

    /// Register a batch of rows, reporting per-row failures.
    ///
    /// Rows are independent: a duplicate or invalid row does not stop the
    /// rest of the batch.
    pub async fn register_bulk(
        &self,
        rows: &[RegisterInviteRequest],
        now: DateTime<Utc>,
    ) -> AppResult<BulkRegistrationReport> {
        let mut report = BulkRegistrationReport {
            registered: 0,
            failures: Vec::new(),
        };

        for (index, row) in rows.iter().enumerate() {
            match self.register(row, now).await {
                Ok(_) => report.registered += 1,
                Err(e) => report.failures.push(BulkRowFailure {
                    row: index + 1,
                    error: e.message,
                }),
            }
        }

        Ok(report)
    }

    fn validate(&self, request: &RegisterInviteRequest, now: DateTime<Utc>) -> AppResult<()> {
        if request.name.trim().is_empty() {
            return Err(gatehouse_core::AppError::validation("Name is required"));
        }
        if !is_plausible_email(request.email.trim()) {
            return Err(gatehouse_core::AppError::validation(format!(
                "Invalid email address: '{}'",
                request.email
            )));
        }
        if request.visit_date < self.clock.local_date(now) {
            return Err(gatehouse_core::AppError::validation(
                "Visit date cannot be in the past",
            ));
        }
        Ok(())
    }
}

/// Minimal shape check: something@something.tld.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

fn invitation_email(invite: &Invite) -> EmailMessage {
    let formatted = format!(
        "{}, {} {}, {} at {}",
        invite.visit_date.format("%A"),
        invite.visit_date.format("%B"),
        invite.visit_date.day(),
        invite.visit_date.year(),
        invite.visit_time.format("%I:%M %p"),
    );

    EmailMessage {
        to: invite.email.clone(),
        subject: "Your facility visit invitation".to_string(),
        body_html: format!(
            "<html><body>\
             <p>Dear {},</p>\
             <p>We are pleased to invite you on <strong>{}</strong>.</p>\
             <p>Our visitor platform will match you at the entrance kiosk and \
             check you in without paperwork.</p>\
             <p>If you did not intend to visit or received this email in \
             error, please disregard this message.</p>\
             </body></html>",
            invite.visitor_name, formatted
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gatehouse_core::AppError;
    use gatehouse_core::error::ErrorKind;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    #[derive(Default)]
    struct SetLedger {
        keys: Mutex<HashSet<(String, NaiveDate)>>,
    }

    #[async_trait]
    impl InviteLedger for SetLedger {
        async fn insert(&self, invite: &CreateInvite) -> AppResult<Invite> {
            let mut keys = self.keys.lock().unwrap();
            if !keys.insert((invite.email.clone(), invite.visit_date)) {
                return Err(AppError::duplicate_invite(format!(
                    "An invite for {} on {} already exists",
                    invite.email, invite.visit_date
                )));
            }
            Ok(Invite {
                id: Uuid::new_v4(),
                visitor_name: invite.visitor_name.clone(),
                email: invite.email.clone(),
                visit_date: invite.visit_date,
                visit_time: invite.visit_time,
                status: gatehouse_entity::invite::InviteStatus::Invited,
                checkin_time: None,
                created_at: Utc::now(),
            })
        }

        async fn find_for_date(
            &self,
            _email: &str,
            _date: NaiveDate,
        ) -> AppResult<Option<Invite>> {
            Ok(None)
        }

        async fn mark_checked_in(
            &self,
            _invite_id: Uuid,
            _time: DateTime<Utc>,
        ) -> AppResult<()> {
            Ok(())
        }

        async fn count_for_date(&self, _date: NaiveDate) -> AppResult<i64> {
            Ok(0)
        }

        async fn recent_checkins(&self, _limit: i64) -> AppResult<Vec<Invite>> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct CountingGateway {
        emails: AtomicUsize,
    }

    #[async_trait]
    impl NotificationGateway for CountingGateway {
        async fn notify_operator(&self, _message: &str) -> AppResult<()> {
            Ok(())
        }

        async fn send_email(&self, _message: &EmailMessage) -> AppResult<()> {
            self.emails.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn service() -> (InviteService, Arc<CountingGateway>) {
        let gateway = Arc::new(CountingGateway::default());
        (
            InviteService::new(
                Arc::new(SetLedger::default()),
                gateway.clone(),
                FacilityClock::from_offset_hours(3),
            ),
            gateway,
        )
    }

    fn request(email: &str, date: &str) -> RegisterInviteRequest {
        RegisterInviteRequest {
            name: "Amira Haddad".to_string(),
            email: email.to_string(),
            visit_date: date.parse().unwrap(),
            visit_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
        }
    }

    fn now() -> DateTime<Utc> {
        "2025-06-01T06:00:00Z".parse().unwrap()
    }

    #[tokio::test]
    async fn test_register_sends_invitation() {
        let (service, gateway) = service();
        let invite = service
            .register(&request("a@x.com", "2025-06-02"), now())
            .await
            .unwrap();
        assert_eq!(invite.email, "a@x.com");
        assert!(invite.is_pending());
        assert_eq!(gateway.emails.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_duplicate_date_rejected() {
        let (service, _) = service();
        service
            .register(&request("a@x.com", "2025-06-02"), now())
            .await
            .unwrap();

        let err = service
            .register(&request("a@x.com", "2025-06-02"), now())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateInvite);

        // A different date for the same person is fine.
        service
            .register(&request("a@x.com", "2025-06-03"), now())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_email_normalized_before_uniqueness() {
        let (service, _) = service();
        service
            .register(&request("A@X.com", "2025-06-02"), now())
            .await
            .unwrap();
        let err = service
            .register(&request("a@x.com", "2025-06-02"), now())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateInvite);
    }

    #[tokio::test]
    async fn test_past_date_rejected() {
        let (service, _) = service();
        let err = service
            .register(&request("a@x.com", "2025-05-31"), now())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let (service, _) = service();
        let err = service
            .register(&request("not-an-email", "2025-06-02"), now())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_concurrent_duplicates_admit_exactly_one() {
        let (service, _) = service();
        let service = Arc::new(service);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service.register(&request("a@x.com", "2025-06-02"), now()).await
            }));
        }

        let mut succeeded = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(e) => assert_eq!(e.kind, ErrorKind::DuplicateInvite),
            }
        }
        assert_eq!(succeeded, 1);
    }

    #[tokio::test]
    async fn test_bulk_reports_per_row_failures() {
        let (service, _) = service();
        let rows = vec![
            request("a@x.com", "2025-06-02"),
            request("a@x.com", "2025-06-02"),
            request("b@x.com", "2025-06-02"),
        ];

        let report = service.register_bulk(&rows, now()).await.unwrap();
        assert_eq!(report.registered, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].row, 2);
    }
}
