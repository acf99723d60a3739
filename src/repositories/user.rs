use deadpool_postgres::Pool;
use uuid::Uuid;
use crate::{
    db,
    error::{AppError, Result},
    models::user::{Profile, User},
};

/// Creates a new user in the database.
///
/// Fails with `Conflict` when the email is already registered.
pub async fn create_user(
    pool: &Pool,
    id: Uuid,
    email: &str,
    password_hash: &str,
) -> Result<User> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO users (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash
            "#,
            &[&id, &email, &password_hash],
        )
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e) {
                AppError::Conflict("This email is already registered".to_string())
            } else {
                AppError::Database(e)
            }
        })?;
    Ok(User::try_from(&row)?)
}

/// Finds a user by their email address.
pub async fn find_by_email(pool: &Pool, email: &str) -> Result<Option<User>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, email, password_hash
            FROM users
            WHERE email = $1
            "#,
            &[&email],
        )
        .await?;
    Ok(row.as_ref().map(User::try_from).transpose()?)
}

/// Finds a user by their ID.
pub async fn find_by_id(pool: &Pool, user_id: &Uuid) -> Result<Option<User>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, email, password_hash
            FROM users
            WHERE id = $1
            "#,
            &[user_id],
        )
        .await?;
    Ok(row.as_ref().map(User::try_from).transpose()?)
}

/// Updates a user's password hash.
pub async fn update_password(pool: &Pool, user_id: &Uuid, password_hash: &str) -> Result<()> {
    let client = pool.get().await?;
    let updated = client
        .execute(
            "UPDATE users SET password_hash = $1 WHERE id = $2",
            &[&password_hash, user_id],
        )
        .await?;

    if updated == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Deletes a user. Items and categories go with it through `ON DELETE CASCADE`.
pub async fn delete_user(pool: &Pool, user_id: &Uuid) -> Result<()> {
    let client = pool.get().await?;
    let deleted = client
        .execute("DELETE FROM users WHERE id = $1", &[user_id])
        .await?;

    if deleted == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Loads the profile summary of a user.
pub async fn get_profile(pool: &Pool, user_id: &Uuid) -> Result<Profile> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT
                u.id,
                u.email,
                (SELECT COUNT(*) FROM items i WHERE i.user_id = u.id) AS total_items,
                (SELECT COUNT(*) FROM categories c WHERE c.user_id = u.id) AS total_categories
            FROM users u
            WHERE u.id = $1
            "#,
            &[user_id],
        )
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Profile {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        total_items: row.try_get("total_items")?,
        total_categories: row.try_get("total_categories")?,
    })
}
