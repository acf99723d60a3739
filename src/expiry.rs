//! Expiry computation, urgency classification and ordering.
//!
//! Everything here is pure: callers pass the already-loaded items of one user
//! and the reference instant, and get back display rows or a typed rejection.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::item::{Control, Item};

/// Items expiring within this many days show up in the urgent listing.
pub const DEFAULT_URGENT_MARGIN_DAYS: i64 = 3;

/// Label shown for items without a category.
pub const NO_CATEGORY_LABEL: &str = "Sem Categoria";

const MICROS_PER_DAY: i64 = 86_400 * 1_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpiryError {
    #[error("Only PRAZO items can be renewed")]
    WrongControlType,

    #[error("{0}")]
    DataIntegrity(String),
}

/// Status label attached to each listed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    /// Full listing: nothing left, replace the item.
    #[serde(rename = "VENCIDO/TROCAR")]
    Replace,
    /// Urgent listing: already past its expiry.
    #[serde(rename = "VENCIDO")]
    Expired,
    /// Urgent listing: within the margin but not yet expired.
    #[serde(rename = "URGENTE")]
    Urgent,
}

/// Signed remaining days plus the status derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub days_remaining_raw: i64,
    pub status: Status,
}

impl Classification {
    /// The number shown to users. Never negative.
    pub fn days_remaining(&self) -> i64 {
        self.days_remaining_raw.max(0)
    }
}

/// A listing row.
#[derive(Debug, Clone, Serialize)]
pub struct ItemView {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    /// `DD/MM/YYYY`
    pub expires_on: String,
    pub days_remaining: i64,
    pub status: Status,
    #[serde(skip)]
    pub expiry: DateTime<Utc>,
}

impl ItemView {
    fn new(item: &Item, expiry: DateTime<Utc>, classification: Classification) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            category: item
                .category_name
                .clone()
                .unwrap_or_else(|| NO_CATEGORY_LABEL.to_string()),
            expires_on: expiry.format("%d/%m/%Y").to_string(),
            days_remaining: classification.days_remaining(),
            status: classification.status,
            expiry,
        }
    }
}

/// Returns the instant an item expires.
pub fn compute_expiry(item: &Item) -> Result<DateTime<Utc>, ExpiryError> {
    match item.control {
        Control::Prazo { period_days } => item
            .start_date
            .checked_add_signed(Duration::days(i64::from(period_days)))
            .ok_or_else(|| {
                ExpiryError::DataIntegrity(format!(
                    "item {}: start_date + {} days overflows",
                    item.id, period_days
                ))
            }),
        Control::Validade { fixed_expiry } => Ok(fixed_expiry),
    }
}

/// Whole days between `now` and `expiry`, rounded toward negative infinity.
///
/// Thirty hours overdue is `-2`, not `-1`.
pub fn days_remaining_raw(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let delta = expiry.signed_duration_since(now);
    let micros = delta
        .num_microseconds()
        .unwrap_or_else(|| delta.num_milliseconds().saturating_mul(1_000));
    micros.div_euclid(MICROS_PER_DAY)
}

/// Classification used by the full listing.
pub fn classify(expiry: DateTime<Utc>, now: DateTime<Utc>) -> Classification {
    let raw = days_remaining_raw(expiry, now);
    Classification {
        days_remaining_raw: raw,
        status: if raw > 0 { Status::Ok } else { Status::Replace },
    }
}

/// Classification used by the urgent listing. `None` when the item is
/// further away than `margin_days`.
pub fn classify_urgent(
    expiry: DateTime<Utc>,
    now: DateTime<Utc>,
    margin_days: i64,
) -> Option<Classification> {
    let raw = days_remaining_raw(expiry, now);
    if raw > margin_days {
        return None;
    }

    Some(Classification {
        days_remaining_raw: raw,
        status: if raw < 0 { Status::Expired } else { Status::Urgent },
    })
}

/// Stable ascending sort by the true expiry instant.
pub fn order_by_expiry(views: &mut [ItemView]) {
    views.sort_by_key(|v| v.expiry);
}

/// Builds the full listing, soonest expiry first.
pub fn list_all(items: &[Item], now: DateTime<Utc>) -> Result<Vec<ItemView>, ExpiryError> {
    let mut views = items
        .iter()
        .map(|item| {
            let expiry = compute_expiry(item)?;
            Ok(ItemView::new(item, expiry, classify(expiry, now)))
        })
        .collect::<Result<Vec<_>, ExpiryError>>()?;

    order_by_expiry(&mut views);
    Ok(views)
}

/// Builds the urgent listing: only items at most `margin_days` away, soonest first.
pub fn list_urgent(
    items: &[Item],
    now: DateTime<Utc>,
    margin_days: i64,
) -> Result<Vec<ItemView>, ExpiryError> {
    let mut views = Vec::new();
    for item in items {
        let expiry = compute_expiry(item)?;
        if let Some(classification) = classify_urgent(expiry, now, margin_days) {
            views.push(ItemView::new(item, expiry, classification));
        }
    }

    order_by_expiry(&mut views);
    Ok(views)
}

/// Restarts a rolling deadline at `now`.
pub fn renew(item: &mut Item, now: DateTime<Utc>) -> Result<(), ExpiryError> {
    match item.control {
        Control::Prazo { .. } => {
            item.start_date = now;
            Ok(())
        }
        Control::Validade { .. } => Err(ExpiryError::WrongControlType),
    }
}
