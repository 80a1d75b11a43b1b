use std::env;
use std::future::{Ready, ready};

use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header,
};
use chrono::{Duration, Utc};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::utils::error::ApiError;

pub const TOKEN_EXPIRY_HOURS: i64 = 1;

fn jwt_secret() -> String {
    env::var("JWT_SECRET").unwrap_or_else(|_| "somesupersecrettoken".to_string())
}

/// Token payload: user identity, email and expiry.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
    pub exp: usize,
}

/// Identity attached to every request by [`AuthGate`]. Anonymous requests
/// carry `None` fields; downstream resolvers decide whether that is fatal.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    pub user_id: Option<String>,
    pub email: Option<String>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user_id: String, email: String) -> Self {
        Self {
            user_id: Some(user_id),
            email: Some(email),
        }
    }

    pub fn is_auth(&self) -> bool {
        self.user_id.is_some()
    }

    /// The authenticated user id, or an `Unauthorized` failure.
    pub fn require_user_id(&self) -> Result<&str, ApiError> {
        self.user_id
            .as_deref()
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated!".to_string()))
    }
}

/// Create a signed token embedding the user identity and email.
pub fn issue_token(user_id: &str, email: &str) -> Result<String, ApiError> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_EXPIRY_HOURS))
        .ok_or_else(|| ApiError::Internal("Invalid expiry timestamp".to_string()))?
        .timestamp() as usize;

    let claims = Claims {
        user_id: user_id.to_owned(),
        email: email.to_owned(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret().as_bytes()),
    )
    .map_err(|_| ApiError::Internal("Token generation failed".to_string()))
}

/// Verify signature and expiry. Any failure yields `None`; the gate treats
/// the request as anonymous instead of rejecting it.
pub fn verify_token(token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret().as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Authentication gate: inspects the `Authorization` header and attaches an
/// [`AuthContext`] to the request. Never rejects; a missing or invalid token
/// marks the request anonymous and lets it continue.
pub struct AuthGate;

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGateMiddleware { service }))
    }
}

pub struct AuthGateMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let auth = match bearer_token(&req).and_then(verify_token) {
            Some(claims) => AuthContext::authenticated(claims.user_id, claims.email),
            None => AuthContext::anonymous(),
        };
        req.extensions_mut().insert(auth);

        let fut = self.service.call(req);
        Box::pin(async move { fut.await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_back_to_claims() {
        let token = issue_token("64f000000000000000000001", "reader@example.com").unwrap();
        let claims = verify_token(&token).expect("fresh token should verify");
        assert_eq!(claims.user_id, "64f000000000000000000001");
        assert_eq!(claims.email, "reader@example.com");
        assert!(claims.exp > Utc::now().timestamp() as usize);
    }

    #[test]
    fn tampered_token_is_anonymous() {
        let token = issue_token("64f000000000000000000001", "reader@example.com").unwrap();
        let mut tampered = token;
        tampered.push('x');
        assert!(verify_token(&tampered).is_none());
        assert!(verify_token("not-a-token").is_none());
    }

    #[test]
    fn expired_token_is_anonymous() {
        let claims = Claims {
            user_id: "64f000000000000000000001".to_string(),
            email: "reader@example.com".to_string(),
            exp: (Utc::now() - Duration::hours(2)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(jwt_secret().as_bytes()),
        )
        .unwrap();
        assert!(verify_token(&token).is_none());
    }

    #[test]
    fn anonymous_context_requires_nothing() {
        let anon = AuthContext::anonymous();
        assert!(!anon.is_auth());
        assert!(anon.require_user_id().is_err());

        let auth =
            AuthContext::authenticated("64f000000000000000000001".into(), "r@example.com".into());
        assert_eq!(auth.require_user_id().unwrap(), "64f000000000000000000001");
    }
}
