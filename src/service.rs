use crate::error::Result;
use crate::replacements::build_replacement_map;
use crate::requests::{reset_requests, update_requests};
use crate::slides::SlidesApi;
use log::{debug, info};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub status: Status,
    pub message: &'static str,
}

impl Outcome {
    fn success(message: &'static str) -> Self {
        Self {
            status: Status::Success,
            message,
        }
    }

    fn warning(message: &'static str) -> Self {
        Self {
            status: Status::Warning,
            message,
        }
    }
}

/// Keeps one presentation in sync with the weekly payloads.
pub struct SlideSync {
    api: Arc<dyn SlidesApi>,
    presentation_id: String,
}

impl SlideSync {
    pub fn new(api: Arc<dyn SlidesApi>, presentation_id: impl Into<String>) -> Self {
        Self {
            api,
            presentation_id: presentation_id.into(),
        }
    }

    /// Writes the payload's values into every shape whose alt text names a placeholder.
    pub async fn update(&self, data: &Value) -> Result<Outcome> {
        let map = build_replacement_map(data);
        debug!("replacement keys: {}", map.len());

        let presentation = self.api.get_presentation(&self.presentation_id).await?;
        debug!(
            "snapshot {}: {} slides",
            presentation.presentation_id,
            presentation.slides.len()
        );
        let requests = update_requests(&presentation, &map);
        if requests.is_empty() {
            info!("no placeholders matched in {}", self.presentation_id);
            return Ok(Outcome::warning("No matching alt text found in slides."));
        }

        self.api
            .batch_update(&self.presentation_id, &requests)
            .await?;
        info!(
            "updated {} placeholders in {}",
            requests.len() / 2,
            self.presentation_id
        );
        Ok(Outcome::success("Slides updated successfully!"))
    }

    /// Submits the static reset batch for every known placeholder key.
    pub async fn reset(&self) -> Result<Outcome> {
        let requests = reset_requests();
        self.api
            .batch_update(&self.presentation_id, &requests)
            .await?;
        info!(
            "reset {} placeholders in {}",
            requests.len(),
            self.presentation_id
        );
        Ok(Outcome::success("Template placeholders reset successfully!"))
    }
}
