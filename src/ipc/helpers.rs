use chrono::NaiveDate;
use serde_json::Value;

use crate::error::AppError;

/// Trimmed, non-empty string param.
pub fn required_str(params: &Value, key: &str) -> Result<String, AppError> {
    optional_str(params, key).ok_or_else(|| AppError::bad_params(format!("missing {}", key)))
}

/// Trimmed string param; blank counts as absent.
pub fn optional_str(params: &Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Strict `YYYY-MM-DD`.
pub fn parse_date_param(raw: &str, key: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::bad_params(format!("{} must be YYYY-MM-DD", key)))
}

pub fn optional_date(params: &Value, key: &str) -> Result<Option<NaiveDate>, AppError> {
    optional_str(params, key)
        .map(|raw| parse_date_param(&raw, key))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_strings_are_missing() {
        let params = json!({ "name": "   ", "other": " Ana " });
        assert!(matches!(
            required_str(&params, "name"),
            Err(AppError::BadParams(_))
        ));
        assert_eq!(required_str(&params, "other").expect("other"), "Ana");
        assert_eq!(optional_str(&params, "absent"), None);
    }

    #[test]
    fn dates_are_strict() {
        let params = json!({ "asOf": "2025-03-31", "bad": "31/03/2025" });
        assert_eq!(
            optional_date(&params, "asOf").expect("asOf"),
            NaiveDate::from_ymd_opt(2025, 3, 31)
        );
        assert!(optional_date(&params, "bad").is_err());
        assert_eq!(optional_date(&params, "none").expect("none"), None);
    }
}
