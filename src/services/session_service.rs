use std::future::{ready, Ready};

use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

use crate::config::MAX_SESSION_TTL_HOURS;
use crate::models::{ApiError, SessionClaims, User};

pub const SESSION_COOKIE: &str = "reviewhub_session";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session token is malformed")]
    Malformed,
    #[error("Session token signature is invalid")]
    BadSignature,
    #[error("Session token has expired")]
    Expired,
    #[error("Failed to encode session claims: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Session expiry is out of range")]
    ExpiryOutOfRange,
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Encode(e) => ApiError::InternalError(e.to_string()),
            SessionError::ExpiryOutOfRange => ApiError::InternalError("Session expiry is out of range".to_string()),
            _ => ApiError::Unauthorized,
        }
    }
}

/// Issues and checks stateless session tokens of the form
/// `base64url(claims).base64url(ed25519 signature)`.
pub struct SessionService {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
    ttl: Duration,
    secure_cookie: bool,
}

impl SessionService {
    pub fn new(signing_key: SigningKey, ttl_hours: i64, secure_cookie: bool) -> Self {
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
            ttl: Duration::hours(ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS)),
            secure_cookie,
        }
    }

    pub fn claims_for(&self, user: &User) -> Result<SessionClaims, SessionError> {
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or(SessionError::ExpiryOutOfRange)?;
        Ok(SessionClaims {
            id: user.id.to_hex(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            exp: expires_at.timestamp(),
        })
    }

    pub fn sign(&self, claims: &SessionClaims) -> Result<String, SessionError> {
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
        let signature = self.signing_key.sign(payload.as_bytes());
        Ok(format!("{}.{}", payload, URL_SAFE_NO_PAD.encode(signature.to_bytes())))
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let (payload, signature) = token.split_once('.').ok_or(SessionError::Malformed)?;

        let signature_bytes: [u8; 64] = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| SessionError::Malformed)?
            .try_into()
            .map_err(|_| SessionError::Malformed)?;
        self.verifying_key
            .verify(payload.as_bytes(), &Signature::from_bytes(&signature_bytes))
            .map_err(|_| SessionError::BadSignature)?;

        let claims_json = URL_SAFE_NO_PAD.decode(payload).map_err(|_| SessionError::Malformed)?;
        let claims: SessionClaims = serde_json::from_slice(&claims_json).map_err(|_| SessionError::Malformed)?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(SessionError::Expired);
        }
        Ok(claims)
    }

    pub fn cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, token)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie)
            .max_age(time::Duration::seconds(self.ttl.num_seconds()))
            .finish()
    }

    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE, "")
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie)
            .finish();
        cookie.make_removal();
        cookie
    }
}

/// The authenticated caller, resolved from the session cookie or a bearer token.
/// Handlers that take this as a parameter reject unauthenticated requests with 401.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: ObjectId,
    pub claims: SessionClaims,
}

fn token_from_request(req: &HttpRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());

    bearer.or_else(|| req.cookie(SESSION_COOKIE).map(|c| c.value().to_string()))
}

fn authenticate(req: &HttpRequest) -> Result<AuthContext, ApiError> {
    let sessions = req
        .app_data::<web::Data<SessionService>>()
        .ok_or_else(|| ApiError::InternalError("Session service is not registered".to_string()))?;

    let token = token_from_request(req).ok_or(ApiError::Unauthorized)?;
    let claims = sessions.verify(&token).map_err(|e| {
        log::warn!("Rejected session on {}: {}", req.path(), e);
        ApiError::from(e)
    })?;
    let user_id = ObjectId::parse_str(&claims.id).map_err(|_| ApiError::Unauthorized)?;

    Ok(AuthContext { user_id, claims })
}

impl FromRequest for AuthContext {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
