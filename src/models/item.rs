use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::error::AppError;

/// How an item's expiry is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlType {
    /// Rolling deadline: `period_days` counted from `start_date`.
    #[serde(rename = "PRAZO")]
    Prazo,
    /// Fixed expiry date.
    #[serde(rename = "VALIDADE")]
    Validade,
}

impl ControlType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlType::Prazo => "PRAZO",
            ControlType::Validade => "VALIDADE",
        }
    }
}

impl fmt::Display for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PRAZO" => Ok(ControlType::Prazo),
            "VALIDADE" => Ok(ControlType::Validade),
            other => Err(format!("unknown control type '{}'", other)),
        }
    }
}

/// The temporal parameters of an item. Only the fields relevant to its
/// control type exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Prazo { period_days: i32 },
    Validade { fixed_expiry: DateTime<Utc> },
}

impl Control {
    pub fn control_type(&self) -> ControlType {
        match self {
            Control::Prazo { .. } => ControlType::Prazo,
            Control::Validade { .. } => ControlType::Validade,
        }
    }

    pub fn period_days(&self) -> Option<i32> {
        match self {
            Control::Prazo { period_days } => Some(*period_days),
            Control::Validade { .. } => None,
        }
    }

    pub fn fixed_expiry(&self) -> Option<DateTime<Utc>> {
        match self {
            Control::Prazo { .. } => None,
            Control::Validade { fixed_expiry } => Some(*fixed_expiry),
        }
    }
}

/// Represents a tracked item.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// The unique identifier for the item.
    pub id: Uuid,
    /// The ID of the user who owns the item.
    pub user_id: Uuid,
    /// The category the item is filed under, if any.
    pub category_id: Option<Uuid>,
    /// The category's display name, joined in when listing.
    pub category_name: Option<String>,
    /// The item's display name.
    pub name: String,
    /// Control type and its parameters.
    pub control: Control,
    /// Start of the current cycle. Only meaningful for `PRAZO`.
    pub start_date: DateTime<Utc>,
    /// The timestamp when the item was created.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<&Row> for Item {
    type Error = AppError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        let id: Uuid = row.try_get("id")?;
        let raw_type: String = row.try_get("control_type")?;

        let control_type = raw_type
            .parse::<ControlType>()
            .map_err(|e| AppError::DataIntegrity(format!("item {}: {}", id, e)))?;

        let control = match control_type {
            ControlType::Prazo => {
                let period_days: Option<i32> = row.try_get("period_days")?;
                Control::Prazo {
                    period_days: period_days.ok_or_else(|| {
                        AppError::DataIntegrity(format!("item {}: PRAZO without period_days", id))
                    })?,
                }
            }
            ControlType::Validade => {
                let fixed_expiry: Option<DateTime<Utc>> = row.try_get("fixed_expiry")?;
                Control::Validade {
                    fixed_expiry: fixed_expiry.ok_or_else(|| {
                        AppError::DataIntegrity(format!("item {}: VALIDADE without fixed_expiry", id))
                    })?,
                }
            }
        };

        Ok(Self {
            id,
            user_id: row.try_get("user_id")?,
            category_id: row.try_get("category_id")?,
            category_name: row.try_get("category_name")?,
            name: row.try_get("name")?,
            control,
            start_date: row.try_get("start_date")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// A validated item ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub category_id: Option<Uuid>,
    pub control: Control,
}
