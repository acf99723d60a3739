use chrono::Utc;
use uuid::Uuid;

use crate::crypto::jwt::IssuedToken;
use crate::crypto::password::{hash_password_blocking, verify_password_blocking};
use crate::error::{AppError, Result};
use crate::models::user::{Profile, User};
use crate::repositories::user as user_repo;
use crate::state::AppState;
use crate::validation::auth::normalize_email;

const INVALID_CREDENTIALS: &str = "Incorrect email or password";

/// Creates a new user.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `email` - The user's email, already validated.
/// * `password` - The user's password, already validated.
///
/// # Returns
///
/// A `Result` containing the created `User`.
pub async fn register_user(state: &AppState, email: &str, password: String) -> Result<User> {
    let email = normalize_email(email);
    tracing::debug!("🔐 Creating user: {}", email);

    if user_repo::find_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::Conflict("This email is already registered".to_string()));
    }

    let password_hash = hash_password_blocking(password).await?;
    let user = user_repo::create_user(&state.db, Uuid::new_v4(), &email, &password_hash).await?;

    tracing::info!("✅ User created with ID: {}", user.id);
    Ok(user)
}

/// Checks credentials and issues an access token.
///
/// Unknown email and wrong password produce the same error.
pub async fn login(state: &AppState, email: &str, password: String) -> Result<IssuedToken> {
    let email = normalize_email(email);
    tracing::debug!("🔐 Authenticating user: {}", email);

    let user = user_repo::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| AppError::Authentication(INVALID_CREDENTIALS.to_string()))?;

    if !verify_password_blocking(password, user.password_hash.clone()).await? {
        return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
    }

    let token = state.jwt.issue(user.id, &user.email, Utc::now())?;
    tracing::info!("✅ User authenticated: {}", user.id);
    Ok(token)
}

/// Changes a user's password after checking the current one.
pub async fn change_password(
    state: &AppState,
    user_id: Uuid,
    current_password: String,
    new_password: String,
) -> Result<()> {
    tracing::info!("🔑 Changing password for user: {}", user_id);

    let user = user_repo::find_by_id(&state.db, &user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !verify_password_blocking(current_password, user.password_hash).await? {
        return Err(AppError::Authentication("Invalid current password".to_string()));
    }

    let new_hash = hash_password_blocking(new_password).await?;
    user_repo::update_password(&state.db, &user_id, &new_hash).await?;

    tracing::info!("✅ Password changed for user: {}", user_id);
    Ok(())
}

/// Returns the caller's profile summary.
pub async fn profile(state: &AppState, user_id: Uuid) -> Result<Profile> {
    user_repo::get_profile(&state.db, &user_id).await
}

/// Deletes the account together with all its items and categories.
pub async fn delete_account(state: &AppState, user_id: Uuid) -> Result<()> {
    user_repo::delete_user(&state.db, &user_id).await?;
    tracing::info!("🗑️ Account deleted: {}", user_id);
    Ok(())
}
