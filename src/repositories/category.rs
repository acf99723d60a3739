use deadpool_postgres::Pool;
use uuid::Uuid;
use crate::{
    db,
    error::{AppError, Result},
    models::category::Category,
};

const IN_USE_MESSAGE: &str = "Cannot delete a category that still has items";

/// Creates a new category.
pub async fn create_category(pool: &Pool, id: Uuid, user_id: Uuid, name: &str) -> Result<Category> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO categories (id, user_id, name)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, name, created_at
            "#,
            &[&id, &user_id, &name],
        )
        .await?;
    Ok(Category::try_from(&row)?)
}

/// Lists a user's categories, oldest first.
pub async fn list_categories(pool: &Pool, user_id: Uuid) -> Result<Vec<Category>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT id, user_id, name, created_at
            FROM categories
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
            &[&user_id],
        )
        .await?;

    rows.iter()
        .map(|row| Category::try_from(row).map_err(AppError::from))
        .collect()
}

/// Returns true when the category exists and belongs to the user.
pub async fn exists_for_user(pool: &Pool, category_id: Uuid, user_id: Uuid) -> Result<bool> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            "SELECT 1 FROM categories WHERE id = $1 AND user_id = $2",
            &[&category_id, &user_id],
        )
        .await?;
    Ok(row.is_some())
}

/// Deletes a category owned by the user.
///
/// Rejected with `Conflict` while any item still references it.
pub async fn delete_category(pool: &Pool, category_id: Uuid, user_id: Uuid) -> Result<()> {
    let mut client = pool.get().await?;
    let tx = client.transaction().await?;

    let found = tx
        .query_opt(
            "SELECT id FROM categories WHERE id = $1 AND user_id = $2 FOR UPDATE",
            &[&category_id, &user_id],
        )
        .await?;
    if found.is_none() {
        return Err(AppError::NotFound);
    }

    let referenced: i64 = tx
        .query_one(
            "SELECT COUNT(*) FROM items WHERE category_id = $1",
            &[&category_id],
        )
        .await?
        .try_get(0)?;
    if referenced > 0 {
        return Err(AppError::Conflict(IN_USE_MESSAGE.to_string()));
    }

    tx.execute(
        "DELETE FROM categories WHERE id = $1 AND user_id = $2",
        &[&category_id, &user_id],
    )
    .await
    .map_err(|e| {
        if db::is_foreign_key_violation(&e) {
            AppError::Conflict(IN_USE_MESSAGE.to_string())
        } else {
            AppError::Database(e)
        }
    })?;

    tx.commit().await?;
    Ok(())
}
