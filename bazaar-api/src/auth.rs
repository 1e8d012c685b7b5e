//! Authentication Module
//!
//! Access tokens are issued by the remote data service's auth surface as
//! HS256 JWTs. They are verified locally with the shared secret: signature
//! first, then `exp` against an injectable clock with skew leeway, then
//! `sub` as a [`ProfileId`].

use crate::constants::{
    DEFAULT_JWT_CLOCK_SKEW_SECS, DEFAULT_JWT_EXPIRATION_SECS, INSECURE_DEFAULT_JWT_SECRET,
    MIN_JWT_SECRET_LENGTH,
};
use crate::error::{ApiError, ApiResult};
use bazaar_core::{BazaarError, ConfigError, ProfileId};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// CLOCK ABSTRACTION
// ============================================================================

/// Clock used for token time checks.
///
/// Time validation is done here rather than inside `jsonwebtoken` so tests
/// can pin the clock.
pub trait JwtClock: Send + Sync {
    /// Current time as Unix epoch seconds.
    fn now_epoch_secs(&self) -> i64;
}

/// Production clock using system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl JwtClock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Fixed clock for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl JwtClock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}

// ============================================================================
// JWT SECRET
// ============================================================================

/// JWT secret that never shows up in logs.
#[derive(Clone)]
pub struct JwtSecret(SecretString);

impl JwtSecret {
    pub fn new(secret: String) -> Result<Self, BazaarError> {
        if secret.is_empty() {
            return Err(BazaarError::Config(ConfigError::MissingRequired {
                field: "BAZAAR_JWT_SECRET".to_string(),
            }));
        }
        Ok(Self(SecretString::new(secret.into())))
    }

    /// Expose the secret value for signing and verification only.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn len(&self) -> usize {
        self.0.expose_secret().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }

    pub fn is_insecure_default(&self) -> bool {
        self.0.expose_secret() == INSECURE_DEFAULT_JWT_SECRET
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JwtSecret([REDACTED, {} chars])", self.len())
    }
}

fn build_jwt_secret(raw: Option<String>) -> JwtSecret {
    let raw = raw
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| INSECURE_DEFAULT_JWT_SECRET.to_string());
    JwtSecret::new(raw)
        .unwrap_or_else(|_| JwtSecret(SecretString::new(INSECURE_DEFAULT_JWT_SECRET.into())))
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Authentication configuration.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: JwtSecret,

    /// Expected `aud` claim; audience is not checked when `None`
    pub jwt_audience: Option<String>,

    /// Lifetime of tokens minted by [`generate_jwt_token`]
    pub jwt_expiration_secs: i64,

    /// Tolerated clock drift in seconds
    pub jwt_clock_skew_secs: i64,

    pub clock: Arc<dyn JwtClock>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret)
            .field("jwt_audience", &self.jwt_audience)
            .field("jwt_expiration_secs", &self.jwt_expiration_secs)
            .field("jwt_clock_skew_secs", &self.jwt_clock_skew_secs)
            .field("clock", &"<JwtClock>")
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: build_jwt_secret(None),
            jwt_audience: None,
            jwt_expiration_secs: DEFAULT_JWT_EXPIRATION_SECS,
            jwt_clock_skew_secs: DEFAULT_JWT_CLOCK_SKEW_SECS,
            clock: Arc::new(SystemClock),
        }
    }
}

impl AuthConfig {
    /// Create authentication configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `BAZAAR_JWT_SECRET`: shared secret of the remote auth service
    /// - `BAZAAR_JWT_AUDIENCE`: expected audience (optional)
    /// - `BAZAAR_JWT_CLOCK_SKEW_SECS`: clock skew tolerance (default: 60)
    pub fn from_env() -> Self {
        Self {
            jwt_secret: build_jwt_secret(std::env::var("BAZAAR_JWT_SECRET").ok()),
            jwt_audience: std::env::var("BAZAAR_JWT_AUDIENCE")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            jwt_expiration_secs: DEFAULT_JWT_EXPIRATION_SECS,
            jwt_clock_skew_secs: std::env::var("BAZAAR_JWT_CLOCK_SKEW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_JWT_CLOCK_SKEW_SECS),
            clock: Arc::new(SystemClock),
        }
    }

    /// Test configuration with a known secret and a pinned clock.
    pub fn with_secret(secret: &str, clock: Arc<dyn JwtClock>) -> Self {
        Self {
            jwt_secret: build_jwt_secret(Some(secret.to_string())),
            clock,
            ..Self::default()
        }
    }

    /// Refuse insecure secrets in production; warn elsewhere.
    pub fn validate_for_production(&self, is_production: bool) -> ApiResult<()> {
        if self.jwt_secret.is_insecure_default() {
            if is_production {
                return Err(ApiError::invalid_input(
                    "Cannot start server in production with insecure JWT secret. \
                     Set BAZAAR_JWT_SECRET to the remote auth service's JWT secret.",
                ));
            }
            tracing::warn!(
                "SECURITY WARNING: Using insecure default JWT secret. Tokens issued by the \
                 remote auth service will not verify. Set BAZAAR_JWT_SECRET."
            );
        } else if self.jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            if is_production {
                return Err(ApiError::invalid_input(format!(
                    "JWT secret is too short for production use ({} chars). \
                     It must be at least {} characters long.",
                    self.jwt_secret.len(),
                    MIN_JWT_SECRET_LENGTH
                )));
            }
            tracing::warn!(
                length = self.jwt_secret.len(),
                "SECURITY WARNING: JWT secret is short"
            );
        }
        Ok(())
    }
}

// ============================================================================
// JWT CLAIMS
// ============================================================================

/// Claims of a remote-service access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Auth user id, equal to the profile id
    pub sub: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    pub iat: i64,

    pub exp: i64,

    /// Database role of the session, e.g. `authenticated`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

impl Claims {
    pub fn new(user_id: ProfileId, email: Option<String>, expiration_secs: i64, clock: &dyn JwtClock) -> Self {
        let now = clock.now_epoch_secs();
        Self {
            sub: user_id.to_string(),
            email,
            iat: now,
            exp: now + expiration_secs,
            role: Some("authenticated".to_string()),
            aud: Some("authenticated".to_string()),
        }
    }

    pub fn is_expired(&self, clock: &dyn JwtClock) -> bool {
        self.exp < clock.now_epoch_secs()
    }
}

// ============================================================================
// AUTHENTICATION CONTEXT
// ============================================================================

/// Authenticated caller, injected into request extensions by the middleware.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: ProfileId,

    pub email: Option<String>,

    /// Raw access token, forwarded to the remote service so its row-level
    /// policies see the caller.
    pub access_token: SecretString,
}

impl AuthContext {
    pub fn new(user_id: ProfileId, email: Option<String>, access_token: &str) -> Self {
        Self {
            user_id,
            email,
            access_token: SecretString::new(access_token.into()),
        }
    }

    pub fn token(&self) -> &str {
        self.access_token.expose_secret()
    }
}

// ============================================================================
// AUTHENTICATION FUNCTIONS
// ============================================================================

fn validate_claim_times(now: i64, exp: i64, leeway_secs: i64) -> ApiResult<()> {
    if exp < now - leeway_secs {
        return Err(ApiError::token_expired());
    }
    Ok(())
}

/// Verify the signature and times of a token and return its claims.
pub fn validate_jwt_token(config: &AuthConfig, token: &str) -> ApiResult<Claims> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.expose().as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.required_spec_claims = std::collections::HashSet::from(["exp".to_string()]);
    match &config.jwt_audience {
        Some(aud) => validation.set_audience(&[aud]),
        None => validation.validate_aud = false,
    }

    let token_data =
        decode::<Claims>(token, &decoding_key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                ApiError::invalid_token("Token signature is invalid")
            }
            jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                ApiError::invalid_token("Token audience is invalid")
            }
            _ => ApiError::invalid_token("Token is invalid"),
        })?;

    let claims = token_data.claims;
    let now = config.clock.now_epoch_secs();
    if now < 0 {
        tracing::error!(timestamp = now, "System clock returned pre-epoch time");
        return Err(ApiError::internal_error("Server time configuration error"));
    }
    validate_claim_times(now, claims.exp, config.jwt_clock_skew_secs)?;

    Ok(claims)
}

/// Authenticate a bearer token and build the caller's context.
pub fn authenticate_jwt(config: &AuthConfig, token: &str) -> ApiResult<AuthContext> {
    let claims = validate_jwt_token(config, token)?;
    let user_id: ProfileId = claims
        .sub
        .parse()
        .map_err(|_| ApiError::invalid_token("Token subject is not a user id"))?;
    Ok(AuthContext::new(user_id, claims.email, token))
}

/// Authenticate the value of an `Authorization` header.
pub fn authenticate(config: &AuthConfig, auth_header: &str) -> ApiResult<AuthContext> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::invalid_token("Authorization header must use Bearer scheme"))?;
    authenticate_jwt(config, token)
}

/// Mint a token the way the remote auth service does. Used by tests and
/// local tooling.
pub fn generate_jwt_token(
    config: &AuthConfig,
    user_id: ProfileId,
    email: Option<String>,
) -> ApiResult<String> {
    let claims = Claims::new(user_id, email, config.jwt_expiration_secs, &*config.clock);
    let encoding_key = EncodingKey::from_secret(config.jwt_secret.expose().as_bytes());
    encode(&Header::new(Algorithm::HS256), &claims, &encoding_key)
        .map_err(|e| ApiError::internal_error(format!("Failed to generate token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use bazaar_core::EntityIdType;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

    fn config_at(now: i64) -> AuthConfig {
        AuthConfig::with_secret(SECRET, Arc::new(FixedClock(now)))
    }

    #[test]
    fn test_roundtrip_token() {
        let config = config_at(1_704_067_200);
        let user = ProfileId::now_v7();
        let token = generate_jwt_token(&config, user, Some("a@b.c".to_string())).unwrap();

        let ctx = authenticate(&config, &format!("Bearer {token}")).unwrap();
        assert_eq!(ctx.user_id, user);
        assert_eq!(ctx.email.as_deref(), Some("a@b.c"));
        assert_eq!(ctx.token(), token);
    }

    #[test]
    fn test_expired_token_rejected_after_leeway() {
        let issued = config_at(1_704_067_200);
        let token = generate_jwt_token(&issued, ProfileId::now_v7(), None).unwrap();

        let within_leeway = config_at(1_704_067_200 + DEFAULT_JWT_EXPIRATION_SECS + 30);
        assert!(validate_jwt_token(&within_leeway, &token).is_ok());

        let later = config_at(1_704_067_200 + DEFAULT_JWT_EXPIRATION_SECS + 3600);
        let err = validate_jwt_token(&later, &token).unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenExpired);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let config = config_at(1_704_067_200);
        let token = generate_jwt_token(&config, ProfileId::now_v7(), None).unwrap();

        let other = AuthConfig::with_secret(
            "another-secret-that-is-long-enough-too",
            Arc::new(FixedClock(1_704_067_200)),
        );
        let err = validate_jwt_token(&other, &token).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidToken);
    }

    #[test]
    fn test_non_bearer_header_rejected() {
        let config = config_at(1_704_067_200);
        let err = authenticate(&config, "Basic abc").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidToken);
        let err = authenticate(&config, "Bearer ").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidToken);
    }

    #[test]
    fn test_audience_enforced_when_configured() {
        let mut config = config_at(1_704_067_200);
        let token = generate_jwt_token(&config, ProfileId::now_v7(), None).unwrap();
        config.jwt_audience = Some("authenticated".to_string());
        assert!(validate_jwt_token(&config, &token).is_ok());
        config.jwt_audience = Some("service_role".to_string());
        assert!(validate_jwt_token(&config, &token).is_err());
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let config = config_at(0);
        assert!(!format!("{config:?}").contains(SECRET));
    }

    #[test]
    fn test_production_rejects_default_secret() {
        let config = AuthConfig::default();
        assert!(config.validate_for_production(true).is_err());
        assert!(config.validate_for_production(false).is_ok());
    }
}
