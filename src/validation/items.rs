use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::item::{Control, ControlType, NewItem};

/// Longest accepted item or category name, in characters.
pub const MAX_NAME_CHARS: usize = 200;
/// Longest accepted rolling deadline (about a century).
pub const MAX_PERIOD_DAYS: i32 = 36_500;

/// Validates a display name and returns it trimmed.
pub fn validate_name(field: &str, name: &str) -> Result<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(AppError::Validation(format!("{} cannot be empty", field)));
    }

    if name.chars().count() > MAX_NAME_CHARS {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, MAX_NAME_CHARS
        )));
    }

    Ok(name.to_string())
}

/// Checks the creation rules of an item and builds its control parameters.
///
/// `PRAZO` needs `period_days`, `VALIDADE` needs a `fixed_expiry` that is not
/// before `now`. The parameter belonging to the other type must be absent.
pub fn validate_new_item(
    name: &str,
    control_type: ControlType,
    period_days: Option<i32>,
    fixed_expiry: Option<DateTime<Utc>>,
    category_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<NewItem> {
    let name = validate_name("Item name", name)?;

    let control = match control_type {
        ControlType::Prazo => {
            if fixed_expiry.is_some() {
                return Err(AppError::Validation(
                    "PRAZO items do not take 'fixed_expiry'".to_string(),
                ));
            }
            let period_days = period_days
                .ok_or_else(|| AppError::Validation("Provide 'period_days'".to_string()))?;
            if !(1..=MAX_PERIOD_DAYS).contains(&period_days) {
                return Err(AppError::Validation(format!(
                    "'period_days' must be between 1 and {} (server limit)",
                    MAX_PERIOD_DAYS
                )));
            }
            Control::Prazo { period_days }
        }
        ControlType::Validade => {
            if period_days.is_some() {
                return Err(AppError::Validation(
                    "VALIDADE items do not take 'period_days'".to_string(),
                ));
            }
            let fixed_expiry = fixed_expiry
                .ok_or_else(|| AppError::Validation("Provide 'fixed_expiry'".to_string()))?;
            if fixed_expiry < now {
                return Err(AppError::Validation(
                    "'fixed_expiry' cannot be in the past".to_string(),
                ));
            }
            Control::Validade { fixed_expiry }
        }
    };

    Ok(NewItem {
        name,
        category_id,
        control,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        "2024-01-10T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn prazo_requires_period_days() {
        let err = validate_new_item("Filtro", ControlType::Prazo, None, None, None, now());
        assert!(matches!(err, Err(AppError::Validation(_))));

        let item = validate_new_item("Filtro", ControlType::Prazo, Some(30), None, None, now()).unwrap();
        assert_eq!(item.control, Control::Prazo { period_days: 30 });
    }

    #[test]
    fn prazo_period_must_be_positive_and_bounded() {
        for bad in [0, -5, MAX_PERIOD_DAYS + 1] {
            assert!(validate_new_item("x", ControlType::Prazo, Some(bad), None, None, now()).is_err());
        }
    }

    #[test]
    fn period_bound_reads_as_a_server_limit() {
        let err = validate_new_item("x", ControlType::Prazo, Some(MAX_PERIOD_DAYS + 1), None, None, now())
            .unwrap_err();
        match err {
            AppError::Validation(message) => {
                assert_eq!(message, "'period_days' must be between 1 and 36500 (server limit)")
            }
            other => panic!("expected a validation error, got {:?}", other),
        }

        assert!(validate_new_item("x", ControlType::Prazo, Some(MAX_PERIOD_DAYS), None, None, now()).is_ok());
    }

    #[test]
    fn validade_requires_future_or_present_date() {
        assert!(validate_new_item("Leite", ControlType::Validade, None, None, None, now()).is_err());

        let past = now() - Duration::minutes(1);
        assert!(validate_new_item("Leite", ControlType::Validade, None, Some(past), None, now()).is_err());

        let future = now() + Duration::days(5);
        let item = validate_new_item("Leite", ControlType::Validade, None, Some(future), None, now()).unwrap();
        assert_eq!(item.control, Control::Validade { fixed_expiry: future });

        assert!(validate_new_item("Leite", ControlType::Validade, None, Some(now()), None, now()).is_ok());
    }

    #[test]
    fn parameter_of_the_other_type_is_rejected() {
        let future = now() + Duration::days(5);
        assert!(validate_new_item("x", ControlType::Prazo, Some(3), Some(future), None, now()).is_err());
        assert!(validate_new_item("x", ControlType::Validade, Some(3), Some(future), None, now()).is_err());
    }

    #[test]
    fn names_are_trimmed_and_bounded() {
        let category = Uuid::new_v4();
        let item =
            validate_new_item("  Filtro de água ", ControlType::Prazo, Some(1), None, Some(category), now())
                .unwrap();
        assert_eq!(item.name, "Filtro de água");
        assert_eq!(item.category_id, Some(category));

        assert!(validate_name("Category name", "   ").is_err());
        assert!(validate_name("Category name", &"a".repeat(MAX_NAME_CHARS + 1)).is_err());
        assert!(validate_name("Category name", &"ç".repeat(MAX_NAME_CHARS)).is_ok());
    }
}
