use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

/// Represents a category in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// The unique identifier for the category.
    pub id: Uuid,
    /// The ID of the user who owns the category.
    pub user_id: Uuid,
    /// The name of the category.
    pub name: String,
    /// The timestamp when the category was created.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<&Row> for Category {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
