use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
    Json,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    extract::{AppJson, AppPath, AppQuery},
    handlers::response::message,
    models::{auth::AuthUser, item::ControlType},
    services::items::{self as item_service, CreateItem},
    state::AppState,
};

/// The request payload for creating an item.
#[derive(Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub control_type: String,
    #[serde(default)]
    pub period_days: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_instant")]
    pub fixed_expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
}

/// Parses an instant given as RFC 3339, as a naive date-time, or as a bare
/// date. Naive forms are read as UTC, and a bare date as UTC midnight.
fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn deserialize_instant<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };

    parse_instant(&raw).map(Some).ok_or_else(|| {
        de::Error::custom(format!(
            "invalid fixed_expiry '{}': expected RFC 3339, YYYY-MM-DDTHH:MM:SS or YYYY-MM-DD",
            raw
        ))
    })
}

/// The query parameters of the urgent listing.
#[derive(Deserialize)]
pub struct UrgentQuery {
    #[serde(default)]
    pub margin_days: Option<i64>,
}

#[derive(Serialize)]
pub struct CreatedItemResponse {
    pub status: &'static str,
    pub item_id: Uuid,
}

/// Creates a new item.
#[axum::debug_handler]
pub async fn create_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppJson(req): AppJson<CreateItemRequest>,
) -> Result<Response> {
    let control_type = req
        .control_type
        .parse::<ControlType>()
        .map_err(|_| AppError::Validation("'control_type' must be PRAZO or VALIDADE".to_string()))?;

    let item_id = item_service::create_item(
        &state,
        user.user_id,
        CreateItem {
            name: req.name,
            control_type,
            period_days: req.period_days,
            fixed_expiry: req.fixed_expiry,
            category_id: req.category_id,
        },
    )
    .await?;

    let response = CreatedItemResponse {
        status: "created",
        item_id,
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Lists every item of the caller, soonest expiry first.
#[axum::debug_handler]
pub async fn list_items(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response> {
    let items = item_service::list_items(&state, user.user_id).await?;
    Ok((StatusCode::OK, Json(items)).into_response())
}

/// Lists expired items and items expiring within the margin.
#[axum::debug_handler]
pub async fn list_urgent_items(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppQuery(query): AppQuery<UrgentQuery>,
) -> Result<Response> {
    let margin_days = query
        .margin_days
        .unwrap_or(state.config.urgent_margin_days);

    let items = item_service::list_urgent(&state, user.user_id, margin_days).await?;
    Ok((StatusCode::OK, Json(items)).into_response())
}

/// Restarts the cycle of a PRAZO item.
#[axum::debug_handler]
pub async fn renew_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppPath(item_id): AppPath<Uuid>,
) -> Result<Response> {
    item_service::renew_item(&state, user.user_id, item_id).await?;
    Ok((StatusCode::OK, message("Cycle renewed")).into_response())
}

/// Deletes an item.
#[axum::debug_handler]
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppPath(item_id): AppPath<Uuid>,
) -> Result<Response> {
    item_service::delete_item(&state, user.user_id, item_id).await?;
    Ok((StatusCode::OK, message("Item removed")).into_response())
}
