use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::item::{Item, NewItem},
};

const ITEM_COLUMNS: &str = r#"
    i.id, i.user_id, i.category_id, c.name AS category_name, i.name,
    i.control_type, i.start_date, i.period_days, i.fixed_expiry, i.created_at
"#;

/// Inserts a validated item. `start_date` is the creation instant.
pub async fn create_item(
    pool: &Pool,
    id: Uuid,
    user_id: Uuid,
    item: &NewItem,
    now: DateTime<Utc>,
) -> Result<Uuid> {
    let client = pool.get().await?;
    let control_type = item.control.control_type().as_str();
    let period_days = item.control.period_days();
    let fixed_expiry = item.control.fixed_expiry();

    let row = client
        .query_one(
            r#"
            INSERT INTO items
                (id, user_id, category_id, name, control_type, start_date,
                 period_days, fixed_expiry, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $6)
            RETURNING id
            "#,
            &[
                &id,
                &user_id,
                &item.category_id,
                &item.name,
                &control_type,
                &now,
                &period_days,
                &fixed_expiry,
            ],
        )
        .await?;
    Ok(row.try_get("id")?)
}

/// Lists every item of a user in retrieval order (creation order).
pub async fn list_items(pool: &Pool, user_id: Uuid) -> Result<Vec<Item>> {
    let client = pool.get().await?;
    let query = format!(
        r#"
        SELECT {}
        FROM items i
        LEFT JOIN categories c ON c.id = i.category_id
        WHERE i.user_id = $1
        ORDER BY i.created_at ASC, i.id ASC
        "#,
        ITEM_COLUMNS
    );
    let rows = client.query(&query, &[&user_id]).await?;

    rows.iter().map(Item::try_from).collect()
}

/// Finds one item owned by the user.
pub async fn find_item(pool: &Pool, item_id: Uuid, user_id: Uuid) -> Result<Option<Item>> {
    let client = pool.get().await?;
    let query = format!(
        r#"
        SELECT {}
        FROM items i
        LEFT JOIN categories c ON c.id = i.category_id
        WHERE i.id = $1 AND i.user_id = $2
        "#,
        ITEM_COLUMNS
    );
    let row = client.query_opt(&query, &[&item_id, &user_id]).await?;

    row.as_ref().map(Item::try_from).transpose()
}

/// Persists a new cycle start for an item.
pub async fn update_start_date(
    pool: &Pool,
    item_id: Uuid,
    user_id: Uuid,
    start_date: DateTime<Utc>,
) -> Result<()> {
    let client = pool.get().await?;
    let updated = client
        .execute(
            "UPDATE items SET start_date = $1 WHERE id = $2 AND user_id = $3",
            &[&start_date, &item_id, &user_id],
        )
        .await?;

    if updated == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Deletes one item owned by the user.
pub async fn delete_item(pool: &Pool, item_id: Uuid, user_id: Uuid) -> Result<()> {
    let client = pool.get().await?;
    let deleted = client
        .execute(
            "DELETE FROM items WHERE id = $1 AND user_id = $2",
            &[&item_id, &user_id],
        )
        .await?;

    if deleted == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}
