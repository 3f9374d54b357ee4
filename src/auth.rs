use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    models::Role,
    repository::RepositoryState,
};

/// Claims
///
/// The payload structure expected inside a JSON Web Token. Claims are signed
/// with the server's secret and validated on every authenticated request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the UUID of the user, used to resolve the current record
    /// and role from the `users` table.
    pub sub: Uuid,
    /// Expiration time (exp): timestamp after which the JWT must not be accepted.
    pub exp: usize,
    /// Issued at (iat): timestamp when the JWT was issued.
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity of an authenticated request, as the access policy
/// sees it. Ephemeral: lives for exactly one request and is never persisted.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

/// AuthUser Extractor
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a
/// function argument in any authenticated handler and keeping identity
/// resolution out of the business logic entirely.
///
/// The flow:
/// 1. Env::Local bypass via the `x-user-id` header (verified against storage).
/// 2. Bearer token extraction and JWT decoding.
/// 3. Storage lookup so a deleted user's still-valid token stops working and
///    the role reflects the record, not the token.
///
/// Rejection: 401 on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // Local development bypass: a known user id in 'x-user-id' stands in
        // for a signed token, but only when running in Env::Local and only if
        // the id resolves to a real record.
        if config.env == Env::Local {
            if let Some(user_id_header) = parts.headers.get("x-user-id") {
                if let Ok(id_str) = user_id_header.to_str() {
                    if let Ok(user_id) = Uuid::parse_str(id_str) {
                        if let Ok(Some(user)) = repo.get_user(user_id).await {
                            return Ok(AuthUser {
                                id: user.id,
                                role: user.role,
                            });
                        }
                    }
                }
            }
        }
        // Otherwise fall through to standard JWT validation.

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|_| StatusCode::UNAUTHORIZED)?;

        // Final verification against storage: the token may outlive the user.
        let user = repo
            .get_user(token_data.claims.sub)
            .await
            .map_err(|_| StatusCode::UNAUTHORIZED)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(AuthUser {
            id: user.id,
            role: user.role,
        })
    }
}

/// Optional AuthUser Extractor
///
/// POST /users accepts anonymous callers (self-registration) as well as
/// authenticated ones (a super-admin provisioning elevated accounts), so the
/// create handler takes `Option<AuthUser>`. A request carrying no credential
/// at all resolves to `None`; a credential that is present but fails to
/// resolve (expired token, unknown user) still rejects with 401, so a stale
/// super-admin session gets a credential error rather than being silently
/// downgraded to anonymous.
impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        let config = AppConfig::from_ref(state);
        let has_bypass = config.env == Env::Local && parts.headers.contains_key("x-user-id");
        if !has_bypass && !parts.headers.contains_key(header::AUTHORIZATION) {
            return Ok(None);
        }

        <AuthUser as FromRequestParts<S>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}
