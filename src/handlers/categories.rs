use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, Result},
    extract::{AppJson, AppPath},
    handlers::response::message,
    models::auth::AuthUser,
    services::categories as category_service,
    state::AppState,
};

/// The request payload for creating a category.
#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Result<Response> {
    let body = sonic_rs::to_string(value)
        .map_err(|e| AppError::Internal(format!("Response serialization failed: {}", e)))?;
    Ok((status, [(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Creates a new category.
#[axum::debug_handler]
pub async fn create_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppJson(req): AppJson<CreateCategoryRequest>,
) -> Result<Response> {
    let category = category_service::create_category(&state, user.user_id, &req.name).await?;

    json_response(
        StatusCode::CREATED,
        &sonic_rs::json!({
            "id": category.id.to_string(),
            "name": category.name,
            "created_at": category.created_at.to_rfc3339()
        }),
    )
}

/// Lists the caller's categories.
#[axum::debug_handler]
pub async fn list_categories(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response> {
    let categories = category_service::list_categories(&state, user.user_id).await?;

    let categories_json: Vec<_> = categories
        .into_iter()
        .map(|c| {
            sonic_rs::json!({
                "id": c.id.to_string(),
                "name": c.name,
                "created_at": c.created_at.to_rfc3339()
            })
        })
        .collect();

    json_response(StatusCode::OK, &categories_json)
}

/// Deletes a category.
#[axum::debug_handler]
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppPath(category_id): AppPath<Uuid>,
) -> Result<Response> {
    category_service::delete_category(&state, user.user_id, category_id).await?;
    Ok((StatusCode::OK, message("Category removed")).into_response())
}
