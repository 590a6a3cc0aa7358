//! Service-account OAuth: signs a JWT assertion and trades it for an access token.

use crate::error::{Error, Result};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

pub const SLIDES_SCOPE: &str = "https://www.googleapis.com/auth/presentations";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// The fields of a service-account key file that token minting needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(default)]
    pub client_email: String,
    #[serde(default)]
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Parses a key file. The private key is test-signed so an unusable key
    /// fails here rather than on the first request.
    pub fn from_json(json: &str) -> Result<Self> {
        let key: ServiceAccountKey =
            serde_json::from_str(json).map_err(|e| Error::Credentials(e.to_string()))?;
        if key.client_email.is_empty() {
            return Err(Error::Credentials("missing client_email".into()));
        }
        if key.private_key.is_empty() {
            return Err(Error::Credentials("missing private_key".into()));
        }
        key.sign(&key.claims(SLIDES_SCOPE, 0))
            .map_err(|e| Error::Credentials(format!("unusable private_key: {e}")))?;
        Ok(key)
    }

    fn claims<'a>(&'a self, scope: &'a str, now: u64) -> Claims<'a> {
        Claims {
            iss: &self.client_email,
            scope,
            aud: &self.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        }
    }

    fn sign(&self, claims: &Claims<'_>) -> Result<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        Ok(jsonwebtoken::encode(&header, claims, &key)?)
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

pub struct TokenSource {
    key: ServiceAccountKey,
    scope: String,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(key: ServiceAccountKey, http: reqwest::Client) -> Self {
        Self {
            key,
            scope: SLIDES_SCOPE.to_string(),
            http,
            cached: Mutex::new(None),
        }
    }

    /// Returns a bearer token, minting a new one when the held token is near expiry.
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if is_fresh(token.expires_at, Instant::now()) {
                return Ok(token.value.clone());
            }
        }

        let token = self.fetch_token().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn fetch_token(&self) -> Result<CachedToken> {
        let assertion = self.sign_assertion(unix_now())?;

        let start = Instant::now();
        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        debug!("token_exchange: {:?}", start.elapsed());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api { status, body });
        }

        let token: TokenResponse = response.json().await?;
        Ok(CachedToken {
            value: token.access_token,
            expires_at: start + Duration::from_secs(token.expires_in),
        })
    }

    fn sign_assertion(&self, now: u64) -> Result<String> {
        self.key.sign(&self.key.claims(&self.scope, now))
    }
}

/// A held token is reused until it is within `EXPIRY_MARGIN` of expiring.
fn is_fresh(expires_at: Instant, now: Instant) -> bool {
    expires_at > now + EXPIRY_MARGIN
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
