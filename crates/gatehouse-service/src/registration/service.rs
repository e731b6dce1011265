//! Visitor pre-registration: profile storage plus gallery enrollment.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::traits::matcher::FaceMatcher;
use gatehouse_database::repositories::visitor::VisitorRepository;
use gatehouse_entity::visitor::{CreateVisitor, Visitor};

/// Registers visitors and keeps their biometric gallery entry current.
pub struct RegistrationService {
    visitors: Arc<VisitorRepository>,
    matcher: Arc<dyn FaceMatcher>,
}

impl RegistrationService {
    /// Create a new registration service.
    pub fn new(visitors: Arc<VisitorRepository>, matcher: Arc<dyn FaceMatcher>) -> Self {
        Self { visitors, matcher }
    }

    /// Register a visitor from their profile and portrait image.
    ///
    /// The face is enrolled first so a rejected image (no detectable face)
    /// never leaves a profile without a template. Re-registration replaces
    /// the existing template rather than creating a second profile.
    pub async fn register(&self, name: &str, email: &str, image: &[u8]) -> AppResult<Visitor> {
        if name.trim().is_empty() || email.trim().is_empty() {
            return Err(AppError::validation("Name and email are required"));
        }

        let template_id = self.matcher.enroll(image).await?;

        if let Some(existing) = self.visitors.find_by_email(email).await? {
            if let Some(old_template) = &existing.face_template_id {
                // Old gallery entry must not keep matching after replacement.
                self.matcher.remove(old_template).await?;
            }
            self.visitors
                .replace_face_template(existing.id, &template_id)
                .await?;

            info!(visitor_id = %existing.id, "Visitor re-registered with new face template");
            return self
                .visitors
                .find_by_id(existing.id)
                .await?
                .ok_or_else(|| AppError::internal("Visitor vanished during re-registration"));
        }

        let visitor = self
            .visitors
            .create(&CreateVisitor {
                name: name.trim().to_string(),
                email: email.trim().to_lowercase(),
                face_template_id: template_id,
            })
            .await?;

        info!(visitor_id = %visitor.id, "Visitor registered");
        Ok(visitor)
    }

    /// Look up a visitor by ID.
    pub async fn get(&self, id: Uuid) -> AppResult<Visitor> {
        self.visitors
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Visitor {id} not found")))
    }

    /// Resolve an arrival image to a registered visitor.
    ///
    /// Returns `None` both when the gallery has no confident match and when
    /// the matched template has no visitor row; the caller reports both as
    /// "not registered".
    pub async fn resolve_arrival(&self, image: &[u8]) -> AppResult<Option<Visitor>> {
        let Some(candidate) = self.matcher.search(image).await? else {
            return Ok(None);
        };

        let visitor = self
            .visitors
            .find_by_face_template(&candidate.face_template_id)
            .await?;

        if let Some(v) = &visitor {
            if !v.passed_registration {
                self.visitors.mark_passed_registration(v.id).await?;
            }
        }

        Ok(visitor)
    }
}
