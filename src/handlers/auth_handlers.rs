use actix_web::{web, HttpResponse};
use log::{info, warn};
use serde_json::json;

use crate::models::{
    normalize_email, ApiError, FieldError, LoginRequest, LoginResponse, RegisterRequest, SessionResponse, User, UserView,
};
use crate::services::password::{hash_password_blocking, verify_password_blocking};
use crate::services::{AuthContext, SessionService};
use crate::traits::Store;

pub const MIN_PASSWORD_LEN: usize = 8;

fn validate_registration(request: &RegisterRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();

    let email = normalize_email(&request.email);
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
        _ => errors.push(FieldError::new("email", "Please enter a valid email address.")),
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new("password", "Password must be at least 8 characters long."));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::ValidationError(errors))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub async fn register(
    store: web::Data<dyn Store>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    info!("Registering account for {}", normalize_email(&request.email));
    validate_registration(&request)?;

    let password_hash = hash_password_blocking(request.password).await?;
    let user = User::new(
        &request.email,
        non_blank(request.username),
        non_blank(request.full_name),
        password_hash,
    );
    let user = store.create_user(user).await?;

    info!("Registered user {}", user.id);
    Ok(HttpResponse::Created().json(UserView::from(&user)))
}

pub async fn login(
    store: web::Data<dyn Store>,
    sessions: web::Data<SessionService>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    let email = normalize_email(&request.email);
    info!("Login attempt for {}", email);

    let user = match store.find_user_by_email(&email).await? {
        Some(user) => user,
        None => {
            warn!("Login failed for {}: no such account", email);
            return Err(ApiError::Unauthorized);
        }
    };
    if !verify_password_blocking(request.password, user.password_hash.clone()).await? {
        warn!("Login failed for {}: wrong password", email);
        return Err(ApiError::Unauthorized);
    }

    let claims = sessions.claims_for(&user)?;
    let token = sessions.sign(&claims)?;
    info!("User {} logged in", user.id);

    Ok(HttpResponse::Ok()
        .cookie(sessions.cookie(token.clone()))
        .json(LoginResponse { user: claims, token }))
}

pub async fn logout(sessions: web::Data<SessionService>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(sessions.removal_cookie())
        .json(json!({ "success": true }))
}

pub async fn session(auth: AuthContext) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(SessionResponse { user: auth.claims }))
}
