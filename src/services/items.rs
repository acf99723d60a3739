use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    expiry::{self, ItemView},
    models::item::ControlType,
    repositories::{category as category_repo, item as item_repo},
    state::AppState,
    validation::items::validate_new_item,
};

/// Fields of an item creation request.
pub struct CreateItem {
    pub name: String,
    pub control_type: ControlType,
    pub period_days: Option<i32>,
    pub fixed_expiry: Option<DateTime<Utc>>,
    pub category_id: Option<Uuid>,
}

/// Validates and stores a new item.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `user_id` - The ID of the owner.
/// * `request` - The requested fields.
///
/// # Returns
///
/// A `Result` containing the new item's ID.
pub async fn create_item(state: &AppState, user_id: Uuid, request: CreateItem) -> Result<Uuid> {
    let now = Utc::now();
    let new_item = validate_new_item(
        &request.name,
        request.control_type,
        request.period_days,
        request.fixed_expiry,
        request.category_id,
        now,
    )?;

    if let Some(category_id) = new_item.category_id {
        if !category_repo::exists_for_user(&state.db, category_id, user_id).await? {
            return Err(AppError::Validation(
                "Category not found or not owned by you".to_string(),
            ));
        }
    }

    let item_id = item_repo::create_item(&state.db, Uuid::new_v4(), user_id, &new_item, now).await?;
    tracing::info!(
        "📦 Item {} ({}) created for user {}",
        item_id,
        new_item.control.control_type(),
        user_id
    );
    Ok(item_id)
}

/// Full listing, soonest expiry first.
pub async fn list_items(state: &AppState, user_id: Uuid) -> Result<Vec<ItemView>> {
    let items = item_repo::list_items(&state.db, user_id).await?;
    Ok(expiry::list_all(&items, Utc::now())?)
}

/// Items that are expired or expire within `margin_days`.
pub async fn list_urgent(state: &AppState, user_id: Uuid, margin_days: i64) -> Result<Vec<ItemView>> {
    let items = item_repo::list_items(&state.db, user_id).await?;
    let urgent = expiry::list_urgent(&items, Utc::now(), margin_days)?;
    tracing::debug!(
        "⏰ {} of {} items urgent for user {} (margin {}d)",
        urgent.len(),
        items.len(),
        user_id,
        margin_days
    );
    Ok(urgent)
}

/// Restarts the cycle of a `PRAZO` item at the current instant.
pub async fn renew_item(state: &AppState, user_id: Uuid, item_id: Uuid) -> Result<()> {
    let mut item = item_repo::find_item(&state.db, item_id, user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    expiry::renew(&mut item, Utc::now())?;
    item_repo::update_start_date(&state.db, item.id, user_id, item.start_date).await?;

    tracing::info!("🔄 Item {} renewed for user {}", item_id, user_id);
    Ok(())
}

/// Deletes one of the user's items.
pub async fn delete_item(state: &AppState, user_id: Uuid, item_id: Uuid) -> Result<()> {
    item_repo::delete_item(&state.db, item_id, user_id).await?;
    tracing::info!("🗑️ Item {} deleted for user {}", item_id, user_id);
    Ok(())
}
