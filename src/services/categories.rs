use uuid::Uuid;
use crate::{
    error::Result,
    models::category::Category,
    repositories::category as category_repo,
    state::AppState,
    validation::items::validate_name,
};

/// Creates a new category.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `user_id` - The ID of the user who owns the category.
/// * `name` - The name of the category.
///
/// # Returns
///
/// A `Result` containing the created `Category`.
pub async fn create_category(state: &AppState, user_id: Uuid, name: &str) -> Result<Category> {
    let name = validate_name("Category name", name)?;
    let category = category_repo::create_category(&state.db, Uuid::new_v4(), user_id, &name).await?;
    tracing::info!("📁 Category {} created for user {}", category.id, user_id);
    Ok(category)
}

/// Lists the user's categories.
pub async fn list_categories(state: &AppState, user_id: Uuid) -> Result<Vec<Category>> {
    category_repo::list_categories(&state.db, user_id).await
}

/// Deletes a category that no item references.
pub async fn delete_category(state: &AppState, user_id: Uuid, category_id: Uuid) -> Result<()> {
    category_repo::delete_category(&state.db, category_id, user_id).await?;
    tracing::info!("🗑️ Category {} deleted for user {}", category_id, user_id);
    Ok(())
}
