use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    extract::AppJson,
    handlers::response::message,
    models::auth::AuthUser,
    services::auth as auth_service,
    state::AppState,
    validation::auth::{validate_password, validate_payload},
};

/// The request payload for user registration.
#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 8, max = 128))]
    pub password: String,
}

/// The request payload for user login.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The request payload for changing a user's password.
#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// The response payload for a successful login.
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// The response payload of the profile endpoint.
#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub email: String,
    pub total_items: i64,
    pub total_categories: i64,
}

/// Handles user registration.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<Response> {
    tracing::info!("📝 Register attempt for: {}", payload.email);
    validate_payload(&payload)?;

    let user = auth_service::register_user(&state, &payload.email, payload.password).await?;
    tracing::info!("✅ User registered: {}", user.id);

    Ok((StatusCode::CREATED, message("User created successfully")).into_response())
}

/// Handles user login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Response> {
    tracing::info!("🔐 Login attempt for: {}", payload.email);

    let issued = auth_service::login(&state, &payload.email, payload.password).await?;

    let response = TokenResponse {
        access_token: issued.token,
        token_type: "bearer",
        expires_in: issued.expires_in_seconds,
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Returns the caller's profile.
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response> {
    let profile = auth_service::profile(&state, user.user_id).await?;

    let response = ProfileResponse {
        id: profile.id.to_string(),
        email: profile.email,
        total_items: profile.total_items,
        total_categories: profile.total_categories,
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Handles changing a user's password.
#[axum::debug_handler]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> Result<Response> {
    tracing::info!("🔑 Change password for user: {}", user.user_id);

    validate_password(&payload.new_password)?;

    auth_service::change_password(
        &state,
        user.user_id,
        payload.current_password,
        payload.new_password,
    )
    .await?;

    Ok((StatusCode::OK, message("Password updated successfully")).into_response())
}

/// Deletes the caller's account and everything it owns.
#[axum::debug_handler]
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response> {
    tracing::info!("👋 Account deletion for user: {} ({})", user.user_id, user.email);

    auth_service::delete_account(&state, user.user_id).await?;

    Ok((
        StatusCode::OK,
        message("Account and all associated data were removed"),
    )
        .into_response())
}
