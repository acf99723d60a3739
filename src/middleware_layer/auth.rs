use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    error::AppError,
    models::auth::AuthUser,
    repositories::user as user_repo,
    state::AppState,
};

/// Extracts the bearer token from the `Authorization` header.
///
/// # Arguments
///
/// * `request` - The incoming request.
///
/// # Returns
///
/// An `Option` containing the token if found.
fn extract_bearer_token(request: &Request<Body>) -> Option<&str> {
    let value = request.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn unauthorized(message: &str) -> Response {
    let mut response = AppError::Authentication(message.to_string()).into_response();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, header::HeaderValue::from_static("Bearer"));
    response
}

/// A middleware that requires a valid access token.
///
/// The token's user must still exist; deleted accounts are rejected even
/// while their tokens have not expired.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    tracing::debug!("🔐 Checking authentication...");

    let Some(token) = extract_bearer_token(&request) else {
        tracing::warn!("❌ No bearer token found");
        return unauthorized("Missing bearer token");
    };

    let claims = match state.jwt.verify(token) {
        Ok(claims) => claims,
        Err(_) => return unauthorized("Invalid credentials or expired token"),
    };

    let user_id = match claims.user_id() {
        Ok(id) => id,
        Err(_) => return unauthorized("Invalid credentials or expired token"),
    };

    let user = match user_repo::find_by_id(&state.db, &user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!("❌ Token for unknown user: {}", user_id);
            return unauthorized("Invalid credentials or expired token");
        }
        Err(e) => return e.into_response(),
    };

    tracing::debug!("✅ User authenticated: {}", user.id);

    request.extensions_mut().insert(AuthUser {
        user_id: user.id,
        email: user.email,
    });

    next.run(request).await
}
