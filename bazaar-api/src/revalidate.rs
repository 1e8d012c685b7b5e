//! View revalidation after mutations.
//!
//! A successful mutation marks rendered view paths stale so the frontend
//! re-renders them. Revalidation never fails the mutation that triggered it.

use crate::config::ApiConfig;
use crate::constants::{
    DEFAULT_REVALIDATE_CHANNEL_CAPACITY, DEFAULT_REVALIDATE_TIMEOUT_SECS, REVALIDATE_SECRET_HEADER,
    REVALIDATE_SIGNATURE_HEADER,
};
use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use bazaar_core::{OrderId, Timestamp};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

// ============================================================================
// PATHS
// ============================================================================

/// Orders list view.
pub const ORDERS_PATH: &str = "/orders";

/// Admin dashboard view.
pub const ADMIN_PATH: &str = "/admin";

/// Detail view of one order.
pub fn order_path(order_id: OrderId) -> String {
    format!("{ORDERS_PATH}/{order_id}")
}

// ============================================================================
// TRAIT
// ============================================================================

#[async_trait]
pub trait Revalidator: Send + Sync {
    /// Mark the given view paths stale.
    async fn revalidate(&self, paths: &[String]);
}

/// Revalidator that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRevalidator;

#[async_trait]
impl Revalidator for NoopRevalidator {
    async fn revalidate(&self, _paths: &[String]) {}
}

// ============================================================================
// BROADCAST
// ============================================================================

/// Notification that a rendered view is stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaleView {
    pub path: String,
    pub at: Timestamp,
}

/// Publishes [`StaleView`] events to in-process subscribers.
#[derive(Debug, Clone)]
pub struct BroadcastRevalidator {
    tx: broadcast::Sender<StaleView>,
}

impl BroadcastRevalidator {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StaleView> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastRevalidator {
    fn default() -> Self {
        Self::new(DEFAULT_REVALIDATE_CHANNEL_CAPACITY)
    }
}

#[async_trait]
impl Revalidator for BroadcastRevalidator {
    async fn revalidate(&self, paths: &[String]) {
        let at = chrono::Utc::now();
        for path in paths {
            // Err only means there are no receivers.
            let _ = self.tx.send(StaleView {
                path: path.clone(),
                at,
            });
        }
        tracing::debug!(paths = ?paths, receivers = self.tx.receiver_count(), "Views marked stale");
    }
}

// ============================================================================
// WEBHOOK
// ============================================================================

#[derive(Debug, Serialize)]
struct RevalidatePayload<'a> {
    paths: &'a [String],
}

/// HMAC-SHA256 of a webhook body, hex encoded.
pub fn sign_payload(payload: &[u8], secret: &str) -> ApiResult<String> {
    type HmacSha256 = Hmac<Sha256>;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ApiError::internal_error(format!("Failed to initialize HMAC: {}", e)))?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// POSTs `{ "paths": [...] }` to the frontend's revalidation endpoint.
///
/// Delivery runs on a spawned task; `revalidate` returns without waiting
/// for the frontend to answer.
#[derive(Clone)]
pub struct WebhookRevalidator {
    target: Arc<WebhookTarget>,
}

struct WebhookTarget {
    client: reqwest::Client,
    url: String,
    secret: SecretString,
}

impl std::fmt::Debug for WebhookRevalidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookRevalidator")
            .field("url", &self.target.url)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl WebhookRevalidator {
    pub fn new(url: impl Into<String>, secret: SecretString, timeout: Duration) -> ApiResult<Self> {
        let url = url.into();
        reqwest::Url::parse(&url)
            .map_err(|e| ApiError::invalid_input(format!("Invalid revalidate URL: {}", e)))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::internal_error(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            target: Arc::new(WebhookTarget {
                client,
                url,
                secret,
            }),
        })
    }
}

impl WebhookTarget {
    async fn deliver(&self, paths: &[String]) -> Result<(), String> {
        let body = serde_json::to_vec(&RevalidatePayload { paths }).map_err(|e| e.to_string())?;
        let signature = sign_payload(&body, self.secret.expose_secret()).map_err(|e| e.message)?;

        let response = self
            .client
            .post(&self.url)
            .header("content-type", "application/json")
            .header(REVALIDATE_SECRET_HEADER, self.secret.expose_secret())
            .header(REVALIDATE_SIGNATURE_HEADER, format!("sha256={}", signature))
            .body(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("status {}", response.status()))
        }
    }
}

#[async_trait]
impl Revalidator for WebhookRevalidator {
    async fn revalidate(&self, paths: &[String]) {
        if paths.is_empty() {
            return;
        }
        let target = self.target.clone();
        let paths = paths.to_vec();
        tokio::spawn(async move {
            match target.deliver(&paths).await {
                Ok(()) => tracing::debug!(paths = ?paths, "Revalidation webhook delivered"),
                Err(error) => tracing::warn!(
                    paths = ?paths,
                    url = %target.url,
                    error = %error,
                    "Revalidation webhook failed"
                ),
            }
        });
    }
}

// ============================================================================
// COMPOSITE
// ============================================================================

/// Fans out to several revalidators in order.
#[derive(Default)]
pub struct CompositeRevalidator {
    targets: Vec<Arc<dyn Revalidator>>,
}

impl CompositeRevalidator {
    pub fn new(targets: Vec<Arc<dyn Revalidator>>) -> Self {
        Self { targets }
    }

    pub fn push(&mut self, target: Arc<dyn Revalidator>) {
        self.targets.push(target);
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[async_trait]
impl Revalidator for CompositeRevalidator {
    async fn revalidate(&self, paths: &[String]) {
        for target in &self.targets {
            target.revalidate(paths).await;
        }
    }
}

/// Build the revalidation fan-out for a server.
///
/// Always includes the given broadcast channel; adds the webhook when
/// `revalidate_url` is configured.
pub fn build_revalidator(
    config: &ApiConfig,
    broadcast: Arc<BroadcastRevalidator>,
) -> ApiResult<CompositeRevalidator> {
    let mut composite = CompositeRevalidator::new(vec![broadcast]);

    if let Some(url) = config.revalidate_url.as_deref() {
        let secret = config
            .revalidate_secret
            .clone()
            .unwrap_or_else(|| SecretString::new(String::new().into()));
        let webhook = WebhookRevalidator::new(
            url,
            secret,
            Duration::from_secs(DEFAULT_REVALIDATE_TIMEOUT_SECS),
        )?;
        tracing::info!(url, "Revalidation webhook enabled");
        composite.push(Arc::new(webhook));
    }

    Ok(composite)
}
