//! REST client for the Bazaar API.

use crate::config::BazaarClientConfig;
use crate::error::{ClientError, ClientResult};
use bazaar_api::types::{BeatReason, HeartbeatResponse, RoleSyncResponse, SubmitReviewRequest};
use bazaar_api::ApiError as ApiServerError;
use bazaar_core::{OrderId, Profile, Review, RoleSyncOutcome};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<SecretString>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("has_session", &self.has_session())
            .finish()
    }
}

impl ApiClient {
    pub fn new(config: &BazaarClientConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.bearer_token.clone(),
        })
    }

    /// True when a bearer token is configured.
    pub fn has_session(&self) -> bool {
        self.token.is_some()
    }

    /// Promote the signed-in user if the server's allow-list names them.
    ///
    /// Returns `None` without contacting the server when there is no session.
    pub async fn sync_admin_role(&self) -> ClientResult<Option<RoleSyncOutcome>> {
        if !self.has_session() {
            tracing::debug!("Role sync skipped: no session");
            return Ok(None);
        }
        let response: RoleSyncResponse = self.post_json("/api/v1/admin/role-sync", None::<&()>).await?;
        Ok(Some(response.outcome))
    }

    /// Record that the signed-in user is active.
    pub async fn heartbeat(&self, reason: BeatReason) -> ClientResult<HeartbeatResponse> {
        let path = format!("/api/v1/presence/heartbeat?reason={}", reason.as_str());
        self.post_json(&path, None::<&()>).await
    }

    pub async fn me(&self) -> ClientResult<Profile> {
        self.get_json("/api/v1/me").await
    }

    pub async fn submit_review(
        &self,
        order_id: OrderId,
        rating: i64,
        comment: &str,
    ) -> ClientResult<Review> {
        let body = SubmitReviewRequest {
            rating,
            comment: comment.to_string(),
        };
        let path = format!("/api/v1/orders/{}/reviews", order_id);
        self.post_json(&path, Some(&body)).await
    }

    fn auth_headers(&self) -> ClientResult<HeaderMap> {
        let token = self.token.as_ref().ok_or(ClientError::NoSession)?;
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|_| ClientError::InvalidResponse("bearer token is not a valid header".to_string()))?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    async fn get_json<T>(&self, path: &str) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(url)
            .headers(self.auth_headers()?)
            .send()
            .await?;
        parse_response(response).await
    }

    async fn post_json<T, B>(&self, path: &str, body: Option<&B>) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.post(url).headers(self.auth_headers()?);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        parse_response(response).await
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let text = response.text().await?;
    if let Ok(api_error) = serde_json::from_str::<ApiServerError>(&text) {
        return Err(ClientError::Api {
            status: status.as_u16(),
            code: api_error.code,
            message: api_error.message,
        });
    }
    Err(ClientError::InvalidResponse(format!(
        "HTTP {}: {}",
        status.as_u16(),
        text
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: Option<&str>) -> BazaarClientConfig {
        BazaarClientConfig {
            api_base_url: "http://127.0.0.1:1/".to_string(),
            bearer_token: token.map(|t| SecretString::new(t.into())),
            request_timeout_ms: 500,
            heartbeat_interval_secs: 60,
        }
    }

    #[tokio::test]
    async fn test_role_sync_without_session_is_noop() {
        let client = ApiClient::new(&config(None)).unwrap();
        assert!(!client.has_session());
        // Port 1 is closed; a request would fail rather than return None.
        assert_eq!(client.sync_admin_role().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_heartbeat_without_session_fails_locally() {
        let client = ApiClient::new(&config(None)).unwrap();
        let result = client.heartbeat(BeatReason::Interval).await;
        assert!(matches!(result, Err(ClientError::NoSession)));
    }

    #[test]
    fn test_debug_hides_token() {
        let client = ApiClient::new(&config(Some("secret-token"))).unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("has_session: true"));
        assert_eq!(client.base_url, "http://127.0.0.1:1");
    }
}
