use crate::auth::TokenSource;
use crate::error::{Error, Result};
use crate::requests::{Presentation, Request};
use async_trait::async_trait;
use log::debug;
use serde::Serialize;

pub const DEFAULT_ENDPOINT: &str = "https://slides.googleapis.com";

/// Limits the snapshot to what the request translator reads.
const SNAPSHOT_FIELDS: &str =
    "presentationId,slides(objectId,pageElements(objectId,description,shape(shapeType)))";

/// The remote presentation service.
#[async_trait]
pub trait SlidesApi: Send + Sync {
    async fn get_presentation(&self, presentation_id: &str) -> Result<Presentation>;

    /// Applies `requests` in order as one atomic batch.
    async fn batch_update(&self, presentation_id: &str, requests: &[Request]) -> Result<()>;
}

#[derive(Serialize)]
struct BatchUpdateBody<'a> {
    requests: &'a [Request],
}

pub struct SlidesClient {
    endpoint: String,
    http: reqwest::Client,
    tokens: TokenSource,
}

impl SlidesClient {
    pub fn new(endpoint: &str, http: reqwest::Client, tokens: TokenSource) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http,
            tokens,
        }
    }

    fn presentation_url(&self, presentation_id: &str) -> String {
        format!("{}/v1/presentations/{presentation_id}", self.endpoint)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Api { status, body });
    }
    Ok(response)
}

#[async_trait]
impl SlidesApi for SlidesClient {
    async fn get_presentation(&self, presentation_id: &str) -> Result<Presentation> {
        let token = self.tokens.access_token().await?;

        let start = std::time::Instant::now();
        let response = self
            .http
            .get(self.presentation_url(presentation_id))
            .query(&[("fields", SNAPSHOT_FIELDS)])
            .bearer_auth(token)
            .send()
            .await?;
        debug!("get_presentation: {:?}", start.elapsed());

        Ok(check_status(response).await?.json().await?)
    }

    async fn batch_update(&self, presentation_id: &str, requests: &[Request]) -> Result<()> {
        let token = self.tokens.access_token().await?;

        let start = std::time::Instant::now();
        let response = self
            .http
            .post(format!("{}:batchUpdate", self.presentation_url(presentation_id)))
            .bearer_auth(token)
            .json(&BatchUpdateBody { requests })
            .send()
            .await?;
        debug!(
            "batch_update: {} requests in {:?}",
            requests.len(),
            start.elapsed()
        );

        check_status(response).await?;
        Ok(())
    }
}

/// In-memory stand-in that records submitted batches.
#[cfg(test)]
pub mod fake {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    pub struct FakeSlides {
        pub presentation: Presentation,
        pub fail_batch: Option<String>,
        pub fail_get: Option<String>,
        pub gets: AtomicUsize,
        pub batches: Mutex<Vec<(String, Vec<Request>)>>,
    }

    impl FakeSlides {
        pub fn with_presentation(presentation: Presentation) -> Self {
            Self {
                presentation,
                ..Default::default()
            }
        }

        pub fn get_count(&self) -> usize {
            self.gets.load(Ordering::SeqCst)
        }

        pub fn submitted(&self) -> Vec<(String, Vec<Request>)> {
            self.batches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SlidesApi for FakeSlides {
        async fn get_presentation(&self, _presentation_id: &str) -> Result<Presentation> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            if let Some(body) = &self.fail_get {
                return Err(Error::Api {
                    status: 503,
                    body: body.clone(),
                });
            }
            Ok(self.presentation.clone())
        }

        async fn batch_update(&self, presentation_id: &str, requests: &[Request]) -> Result<()> {
            if let Some(body) = &self.fail_batch {
                return Err(Error::Api {
                    status: 400,
                    body: body.clone(),
                });
            }
            self.batches
                .lock()
                .unwrap()
                .push((presentation_id.to_string(), requests.to_vec()));
            Ok(())
        }
    }
}
