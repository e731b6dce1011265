//! HTTP client for the external biometric matcher service.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use gatehouse_core::config::checkin::CheckinConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::traits::matcher::{FaceMatch, FaceMatcher};

#[derive(Debug, Serialize)]
struct ImageRequest {
    image_data: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    face_detected: bool,
    #[serde(default)]
    matches: Vec<MatchEntry>,
}

#[derive(Debug, Deserialize)]
struct MatchEntry {
    template_id: String,
    confidence: f32,
}

#[derive(Debug, Deserialize)]
struct EnrollResponse {
    face_detected: bool,
    template_id: Option<String>,
}

/// Matcher client talking to the remote gallery service.
///
/// Every call carries a deadline so a slow matcher cannot stall the
/// arrival pipeline.
#[derive(Debug, Clone)]
pub struct HttpFaceMatcher {
    client: reqwest::Client,
    base_url: String,
    confidence_threshold: f32,
}

impl HttpFaceMatcher {
    /// Build a matcher client from configuration.
    pub fn new(config: &CheckinConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.matcher_timeout_seconds))
            .build()
            .map_err(|e| AppError::configuration(format!("Matcher client build failed: {e}")))?;

        Ok(Self {
            client,
            base_url: config.matcher_url.trim_end_matches('/').to_string(),
            confidence_threshold: config.match_confidence_threshold,
        })
    }

    fn encode(image: &[u8]) -> ImageRequest {
        ImageRequest {
            image_data: BASE64.encode(image),
        }
    }
}

#[async_trait]
impl FaceMatcher for HttpFaceMatcher {
    async fn search(&self, image: &[u8]) -> AppResult<Option<FaceMatch>> {
        let response: SearchResponse = self
            .client
            .post(format!("{}/gallery/search", self.base_url))
            .json(&Self::encode(image))
            .send()
            .await
            .map_err(|e| AppError::external_service(format!("Matcher search failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::external_service(format!("Matcher search rejected: {e}")))?
            .json()
            .await
            .map_err(|e| AppError::external_service(format!("Matcher search response: {e}")))?;

        if !response.face_detected {
            return Err(AppError::validation(
                "No face detected. Please retake the photo.",
            ));
        }

        // "No match" and "below threshold" are the same outcome to callers.
        Ok(response
            .matches
            .into_iter()
            .find(|m| m.confidence >= self.confidence_threshold)
            .map(|m| FaceMatch {
                face_template_id: m.template_id,
                confidence: m.confidence,
            }))
    }

    async fn enroll(&self, image: &[u8]) -> AppResult<String> {
        let response: EnrollResponse = self
            .client
            .post(format!("{}/gallery/templates", self.base_url))
            .json(&Self::encode(image))
            .send()
            .await
            .map_err(|e| AppError::external_service(format!("Matcher enroll failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::external_service(format!("Matcher enroll rejected: {e}")))?
            .json()
            .await
            .map_err(|e| AppError::external_service(format!("Matcher enroll response: {e}")))?;

        if !response.face_detected {
            return Err(AppError::validation(
                "No face detected. Please upload another image.",
            ));
        }

        response.template_id.ok_or_else(|| {
            AppError::validation("Face could not be indexed. Please upload another image.")
        })
    }

    async fn remove(&self, face_template_id: &str) -> AppResult<()> {
        self.client
            .delete(format!(
                "{}/gallery/templates/{}",
                self.base_url, face_template_id
            ))
            .send()
            .await
            .map_err(|e| AppError::external_service(format!("Matcher remove failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::external_service(format!("Matcher remove rejected: {e}")))?;
        Ok(())
    }
}
