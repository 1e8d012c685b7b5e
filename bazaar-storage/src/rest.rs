//! Store backed by the remote service's REST surface.
//!
//! Every request carries `apikey: <anon key>` and `Authorization: Bearer
//! <token>`, where the token is the session's access token or, for
//! anonymous stores, the anon key itself.

use crate::query::{
    parse_content_range_total, TableQuery, GAME_REQUEST_SELECT, LISTING_SELECT,
    LISTING_SELECT_BY_CATEGORY,
};
use crate::store::{ListingQuery, MarketplaceStore, StoreFactory, StoreResult};
use ::async_trait::async_trait;
use bazaar_core::{
    Category, ConfigError, EntityIdType, EntityType, GameRequest, GameRequestStatus,
    ListingDetail, ListingId, NewReview, Order, OrderId, OrderParty, Profile, ProfileId, Review,
    Role, StoreError, Timestamp,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Remote error code for a uniqueness violation.
pub const UNIQUE_VIOLATION_CODE: &str = "23505";

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Connection settings for the remote data service.
#[derive(Clone)]
pub struct RemoteConfig {
    /// Service root, without trailing slash
    pub url: String,
    /// Public anonymous key
    pub anon_key: SecretString,
    /// Per-request timeout
    pub timeout: Duration,
}

impl RemoteConfig {
    pub const URL_VARS: [&'static str; 2] = ["BAZAAR_REMOTE_URL", "NEXT_PUBLIC_SUPABASE_URL"];
    pub const ANON_KEY_VARS: [&'static str; 2] =
        ["BAZAAR_REMOTE_ANON_KEY", "NEXT_PUBLIC_SUPABASE_ANON_KEY"];
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: SecretString::new(anon_key.into().into()),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Read from the process environment. URL and anon key are required.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary lookup; the first non-empty variable wins.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| {
            keys.iter()
                .filter_map(|k| lookup(k))
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty())
        };

        let url = first(&Self::URL_VARS).ok_or_else(|| ConfigError::MissingRequired {
            field: Self::URL_VARS[0].to_string(),
        })?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: Self::URL_VARS[0].to_string(),
                value: url,
                reason: "must be an http(s) URL".to_string(),
            });
        }
        let anon_key = first(&Self::ANON_KEY_VARS).ok_or_else(|| ConfigError::MissingRequired {
            field: Self::ANON_KEY_VARS[0].to_string(),
        })?;

        let timeout_secs = match lookup("BAZAAR_REMOTE_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    field: "BAZAAR_REMOTE_TIMEOUT_SECS".to_string(),
                    value: raw.clone(),
                    reason: "must be a positive integer".to_string(),
                })?,
            None => Self::DEFAULT_TIMEOUT_SECS,
        };

        let mut config = Self::new(url, anon_key);
        config.timeout = Duration::from_secs(timeout_secs);
        Ok(config)
    }
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("url", &self.url)
            .field("anon_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ============================================================================
// CLIENT
// ============================================================================

/// Remote error body: `{ code, message, details, hint }`.
#[derive(Debug, Clone, Default, Deserialize)]
struct RemoteErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// Shared HTTP client. Cloning is cheap.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    anon_key: SecretString,
}

impl RestClient {
    pub fn new(config: &RemoteConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Unavailable {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            http,
            base_url: Arc::from(config.url.as_str()),
            anon_key: config.anon_key.clone(),
        })
    }

    /// Store that authenticates as the given session, or anonymously.
    pub fn store(&self, access_token: Option<&str>) -> RestStore {
        RestStore {
            client: self.clone(),
            bearer: access_token.map(|t| SecretString::new(t.to_string().into())),
        }
    }
}

impl StoreFactory for RestClient {
    fn for_session(&self, access_token: Option<&str>) -> Arc<dyn MarketplaceStore> {
        Arc::new(self.store(access_token))
    }
}

// ============================================================================
// STORE
// ============================================================================

/// Session-scoped REST store.
#[derive(Clone)]
pub struct RestStore {
    client: RestClient,
    bearer: Option<SecretString>,
}

impl RestStore {
    fn headers(&self) -> Result<HeaderMap, StoreError> {
        let anon = self.client.anon_key.expose_secret();
        let token = self
            .bearer
            .as_ref()
            .map(|t| t.expose_secret())
            .unwrap_or(anon);

        let invalid = |what: &str| StoreError::Unavailable {
            reason: format!("{what} is not a valid header value"),
        };
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(anon).map_err(|_| invalid("anon key"))?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| invalid("access token"))?,
        );
        Ok(headers)
    }

    fn request(&self, method: Method, query: &TableQuery) -> Result<RequestBuilder, StoreError> {
        let url = format!("{}{}", self.client.base_url, query.path());
        Ok(self.client.http.request(method, url).headers(self.headers()?))
    }

    async fn send(&self, query: &TableQuery, builder: RequestBuilder) -> StoreResult<Response> {
        let response = builder.send().await.map_err(|e| transport_error(query, e))?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(remote_error(query, response).await)
    }

    async fn select<T: DeserializeOwned>(&self, query: &TableQuery) -> StoreResult<Vec<T>> {
        let builder = self.request(Method::GET, query)?.query(&query.params());
        let response = self.send(query, builder).await?;
        decode(query, response).await
    }

    async fn select_one<T: DeserializeOwned>(&self, query: TableQuery) -> StoreResult<Option<T>> {
        let query = query.limit(1);
        Ok(self.select(&query).await?.into_iter().next())
    }

    async fn insert<B, T>(&self, query: &TableQuery, body: &B) -> StoreResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let builder = self
            .request(Method::POST, query)?
            .header("Prefer", "return=representation")
            .json(body);
        let response = self.send(query, builder).await?;
        let rows: Vec<T> = decode(query, response).await?;
        rows.into_iter().next().ok_or_else(|| StoreError::Decode {
            table: query.table().to_string(),
            reason: "insert returned no representation".to_string(),
        })
    }

    async fn update<B, T>(&self, query: &TableQuery, body: &B) -> StoreResult<Vec<T>>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let builder = self
            .request(Method::PATCH, query)?
            .query(query.filter_params())
            .header("Prefer", "return=representation")
            .json(body);
        let response = self.send(query, builder).await?;
        decode(query, response).await
    }

    async fn count_rows(&self, query: TableQuery) -> StoreResult<u64> {
        let query = query.select("id").limit(1);
        let builder = self
            .request(Method::GET, &query)?
            .query(&query.params())
            .header("Prefer", "count=exact");
        let response = self.send(&query, builder).await?;
        response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| StoreError::Decode {
                table: query.table().to_string(),
                reason: "missing or malformed Content-Range".to_string(),
            })
    }
}

#[derive(Serialize)]
struct RolePatch {
    role: Role,
}

#[derive(Serialize)]
struct LastSeenPatch {
    last_seen: Timestamp,
}

#[async_trait]
impl MarketplaceStore for RestStore {
    async fn profile_get(&self, id: ProfileId) -> StoreResult<Option<Profile>> {
        self.select_one(TableQuery::new(EntityType::Profile).eq("id", id))
            .await
    }

    async fn profile_set_role(&self, id: ProfileId, role: Role) -> StoreResult<Profile> {
        let query = TableQuery::new(EntityType::Profile).eq("id", id);
        let rows: Vec<Profile> = self.update(&query, &RolePatch { role }).await?;
        rows.into_iter().next().ok_or(StoreError::NotFound {
            entity_type: EntityType::Profile,
            id: id.as_uuid(),
        })
    }

    async fn profile_touch_last_seen(&self, id: ProfileId, at: Timestamp) -> StoreResult<()> {
        let query = TableQuery::new(EntityType::Profile).eq("id", id);
        let rows: Vec<serde_json::Value> =
            self.update(&query, &LastSeenPatch { last_seen: at }).await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound {
                entity_type: EntityType::Profile,
                id: id.as_uuid(),
            });
        }
        Ok(())
    }

    async fn profile_count_by_role(&self, role: Role) -> StoreResult<u64> {
        self.count_rows(TableQuery::new(EntityType::Profile).eq("role", role))
            .await
    }

    async fn order_get(&self, id: OrderId) -> StoreResult<Option<Order>> {
        self.select_one(TableQuery::new(EntityType::Order).eq("id", id))
            .await
    }

    async fn order_list_for(
        &self,
        profile: ProfileId,
        party: Option<OrderParty>,
    ) -> StoreResult<Vec<Order>> {
        let query = TableQuery::new(EntityType::Order);
        let query = match party {
            Some(party) => query.eq(party.column(), profile),
            None => query.or_eq(&[
                (OrderParty::Buyer.column(), profile.to_string()),
                (OrderParty::Seller.column(), profile.to_string()),
            ]),
        };
        self.select(&query.order("created_at", false)).await
    }

    async fn review_find_by_order(&self, order: OrderId) -> StoreResult<Option<Review>> {
        self.select_one(TableQuery::new(EntityType::Review).eq("order_id", order))
            .await
    }

    async fn review_insert(&self, review: &NewReview) -> StoreResult<Review> {
        self.insert(&TableQuery::new(EntityType::Review), review)
            .await
    }

    async fn review_list_by_seller(&self, seller: ProfileId) -> StoreResult<Vec<Review>> {
        let query = TableQuery::new(EntityType::Review)
            .eq("seller_id", seller)
            .order("created_at", false);
        self.select(&query).await
    }

    async fn listing_list(&self, filter: &ListingQuery) -> StoreResult<Vec<ListingDetail>> {
        let mut query = TableQuery::new(EntityType::Listing);
        query = match &filter.category_slug {
            Some(slug) => query
                .select(LISTING_SELECT_BY_CATEGORY)
                .eq("category.slug", slug),
            None => query.select(LISTING_SELECT),
        };
        if let Some(status) = filter.status {
            query = query.eq("status", status);
        }
        let query = query
            .order("created_at", false)
            .limit(filter.limit.min(ListingQuery::MAX_LIMIT))
            .offset(filter.offset);
        let rows: Vec<ListingDetail> = self.select(&query).await?;
        Ok(rows.into_iter().map(ListingDetail::with_sorted_media).collect())
    }

    async fn listing_get(&self, id: ListingId) -> StoreResult<Option<ListingDetail>> {
        let query = TableQuery::new(EntityType::Listing)
            .select(LISTING_SELECT)
            .eq("id", id);
        let row: Option<ListingDetail> = self.select_one(query).await?;
        Ok(row.map(ListingDetail::with_sorted_media))
    }

    async fn category_list(&self) -> StoreResult<Vec<Category>> {
        self.select(&TableQuery::new(EntityType::Category).order("name", true))
            .await
    }

    async fn game_request_list(
        &self,
        status: Option<GameRequestStatus>,
        limit: Option<u32>,
    ) -> StoreResult<Vec<GameRequest>> {
        let mut query = TableQuery::new(EntityType::GameRequest).select(GAME_REQUEST_SELECT);
        if let Some(status) = status {
            query = query.eq("status", status);
        }
        query = query.order("created_at", false);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        self.select(&query).await
    }

    async fn count(&self, entity: EntityType) -> StoreResult<u64> {
        self.count_rows(TableQuery::new(entity)).await
    }

    async fn ping(&self) -> StoreResult<()> {
        let query = TableQuery::new(EntityType::Category).select("id").limit(1);
        let _: Vec<serde_json::Value> = self.select(&query).await?;
        Ok(())
    }
}

// ============================================================================
// RESPONSE HANDLING
// ============================================================================

async fn decode<T: DeserializeOwned>(query: &TableQuery, response: Response) -> StoreResult<T> {
    let bytes = response.bytes().await.map_err(|e| StoreError::Decode {
        table: query.table().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode {
        table: query.table().to_string(),
        reason: e.to_string(),
    })
}

fn transport_error(query: &TableQuery, err: reqwest::Error) -> StoreError {
    tracing::debug!(table = query.table(), error = %err, "Remote request failed");
    if err.is_timeout() {
        StoreError::Timeout {
            reason: format!("{}: {err}", query.table()),
        }
    } else {
        StoreError::Unavailable {
            reason: format!("{}: {err}", query.table()),
        }
    }
}

async fn remote_error(query: &TableQuery, response: Response) -> StoreError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let body: RemoteErrorBody = serde_json::from_str(&text).unwrap_or_default();
    classify_remote_error(query, status, body, text)
}

fn classify_remote_error(
    query: &TableQuery,
    status: StatusCode,
    body: RemoteErrorBody,
    raw: String,
) -> StoreError {
    let message = body
        .message
        .clone()
        .unwrap_or_else(|| if raw.is_empty() { status.to_string() } else { raw });

    if body.code.as_deref() == Some(UNIQUE_VIOLATION_CODE) {
        return StoreError::UniqueViolation {
            entity_type: query.entity(),
            reason: body.details.unwrap_or(message),
        };
    }

    match status {
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE => StoreError::Unavailable {
            reason: format!("{}: {message}", query.table()),
        },
        StatusCode::GATEWAY_TIMEOUT => StoreError::Timeout {
            reason: format!("{}: {message}", query.table()),
        },
        _ => StoreError::Remote {
            table: query.table().to_string(),
            status: status.as_u16(),
            code: body.code,
            message,
        },
    }
}
