// POST /api/auth/register and POST /api/auth/login - token acquisition

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::{self, cookies};
use crate::database::models::UserProfile;
use crate::database::{users, StoreError};
use crate::error::ApiError;
use crate::handlers::bad_json;
use crate::middleware::ApiResponse;
use crate::state::AppState;
use crate::validation;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub use_cookies: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub use_cookies: bool,
}

/// Token and user payload; the token moves into an HTTP-only cookie instead
/// of the body when the client asks for cookies.
#[derive(Debug, Serialize)]
struct AuthData {
    user: UserProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload.map_err(bad_json)?;

    let mut errors = Vec::new();
    validation::name(&mut errors, "name", &body.name);
    validation::email(&mut errors, "email", &body.email);
    validation::password(&mut errors, "password", &body.password);
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    if users::exists_by_email(&state.pool, &body.email).await? {
        return Err(ApiError::bad_request("User already exists with this email"));
    }

    let password_hash = bcrypt::hash(&body.password, bcrypt::DEFAULT_COST).map_err(|e| {
        tracing::error!("password hashing failed: {}", e);
        ApiError::internal("Failed to secure password")
    })?;

    let user = users::create(&state.pool, body.name.trim(), &body.email, &password_hash)
        .await
        .map_err(|e| match e {
            // registration raced another request for the same address
            StoreError::Duplicate => ApiError::bad_request("User already exists with this email"),
            other => other.into(),
        })?;

    let token = issue_token(&state, user.id)?;

    Ok(token_response(
        &state,
        axum::http::StatusCode::CREATED,
        "User registered successfully",
        user.profile(),
        token,
        body.use_cookies,
    ))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload.map_err(bad_json)?;

    let mut errors = Vec::new();
    validation::email(&mut errors, "email", &body.email);
    if body.password.is_empty() {
        errors.push(crate::error::FieldError::new("password", "Password cannot be empty"));
    }
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let user = users::find_by_email(&state.pool, &body.email)
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid email or password"))?;

    let matches = bcrypt::verify(&body.password, &user.password_hash).map_err(|e| {
        tracing::error!("password verification failed: {}", e);
        ApiError::internal("An error occurred while processing your request")
    })?;
    if !matches {
        return Err(ApiError::bad_request("Invalid email or password"));
    }

    let token = issue_token(&state, user.id)?;

    Ok(token_response(
        &state,
        axum::http::StatusCode::OK,
        "Login successful",
        user.profile(),
        token,
        body.use_cookies,
    ))
}

fn issue_token(state: &AppState, user_id: uuid::Uuid) -> Result<String, ApiError> {
    auth::generate_token(user_id, &state.config.security).map_err(|e| {
        tracing::error!("token generation failed: {}", e);
        ApiError::internal("Failed to issue token")
    })
}

fn token_response(
    state: &AppState,
    status: axum::http::StatusCode,
    message: &str,
    user: UserProfile,
    token: String,
    use_cookies: bool,
) -> Response {
    let security = &state.config.security;

    let data = AuthData {
        user,
        token: if use_cookies { None } else { Some(token.clone()) },
    };

    let mut response = ApiResponse {
        status,
        message: message.to_string(),
        data: Some(data),
    }
    .into_response();

    if use_cookies {
        let cookie = cookies::set_token_cookie(
            &token,
            (security.jwt_expiry_hours * 3600) as i64,
            security.secure_cookies,
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }

    response
}
