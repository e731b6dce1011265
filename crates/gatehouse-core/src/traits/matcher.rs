//! Biometric matcher boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// A gallery match returned by the biometric matcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceMatch {
    /// Opaque handle into the biometric gallery.
    pub face_template_id: String,
    /// Match confidence in percent.
    pub confidence: f32,
}

/// External face detection/matching capability.
///
/// The matching algorithm itself is out of scope; implementations talk to a
/// remote service. Callers treat "no match" and "below threshold" the same
/// way, so `search` only returns candidates that already cleared the
/// configured confidence threshold.
#[async_trait]
pub trait FaceMatcher: Send + Sync {
    /// Search the gallery for the face in `image`.
    ///
    /// Returns `None` when no face matches with sufficient confidence.
    /// Fails with a validation error when no face is detectable at all.
    async fn search(&self, image: &[u8]) -> AppResult<Option<FaceMatch>>;

    /// Index the face in `image` into the gallery and return its template
    /// handle. Fails with a validation error when no face is detectable.
    async fn enroll(&self, image: &[u8]) -> AppResult<String>;

    /// Remove a previously enrolled template (re-registration replaces it).
    async fn remove(&self, face_template_id: &str) -> AppResult<()>;
}
