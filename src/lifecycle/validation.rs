//! Pure validation helpers for intake and impact-evaluation payloads.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// RFC-light email check. Rejects empty and whitespace-containing values.
pub fn validate_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// French phone-number check.
///
/// Accepts `0XXXXXXXXX` and the `+33` / `0033` international prefixes, with
/// spaces, dots or dashes between digit groups. The separator characters are
/// stripped before the digit count is checked.
pub fn validate_phone(value: &str) -> bool {
    let stripped: String = value
        .chars()
        .filter(|c| !matches!(c, ' ' | '.' | '-'))
        .collect();

    if let Some(rest) = stripped.strip_prefix("+33").or_else(|| stripped.strip_prefix("0033")) {
        return rest.len() == 9 && rest.chars().all(|c| c.is_ascii_digit());
    }

    stripped.len() == 10
        && stripped.starts_with('0')
        && stripped.chars().all(|c| c.is_ascii_digit())
}

/// Outcome of an impact-evaluation validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub message: Option<String>,
}

impl ValidationOutcome {
    fn ok() -> Self {
        Self {
            is_valid: true,
            message: None,
        }
    }

    fn fail(message: String) -> Self {
        Self {
            is_valid: false,
            message: Some(message),
        }
    }
}

/// Requires `satisfaction_impact` to be present and within `1..=scale_max`
/// (bounds inclusive).
pub fn validate_impact_evaluation(
    satisfaction_impact: Option<i32>,
    scale_max: i32,
) -> ValidationOutcome {
    match satisfaction_impact {
        None => ValidationOutcome::fail("la note de satisfaction est requise".to_string()),
        Some(value) if value < 1 || value > scale_max => ValidationOutcome::fail(format!(
            "la note de satisfaction doit être comprise entre 1 et {}",
            scale_max
        )),
        Some(_) => ValidationOutcome::ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_accepts_common_shapes() {
        assert!(validate_email("a@b.c"));
        assert!(validate_email("user.name+tag@domain.co.uk"));
    }

    #[test]
    fn email_rejects_malformed() {
        assert!(!validate_email(""));
        assert!(!validate_email("   "));
        assert!(!validate_email("user@"));
        assert!(!validate_email("user name@domain.com"));
        assert!(!validate_email("user@domain"));
    }

    #[test]
    fn phone_accepts_french_formats() {
        assert!(validate_phone("0123456789"));
        assert!(validate_phone("+33123456789"));
        assert!(validate_phone("0033123456789"));
        assert!(validate_phone("01 23 45 67 89"));
        assert!(validate_phone("01.23.45.67.89"));
        assert!(validate_phone("01-23-45-67-89"));
    }

    #[test]
    fn phone_rejects_wrong_lengths_and_characters() {
        assert!(!validate_phone("123456789")); // 9 digits, no leading zero
        assert!(!validate_phone("01234567890")); // 11 digits
        assert!(!validate_phone("+3312345678")); // 8 digits after prefix
        assert!(!validate_phone("01234abcde"));
        assert!(!validate_phone(""));
    }

    #[test]
    fn satisfaction_bounds_are_inclusive() {
        assert!(!validate_impact_evaluation(Some(0), 10).is_valid);
        assert!(validate_impact_evaluation(Some(1), 10).is_valid);
        assert!(validate_impact_evaluation(Some(10), 10).is_valid);
        assert!(!validate_impact_evaluation(Some(11), 10).is_valid);
    }

    #[test]
    fn satisfaction_is_required() {
        let outcome = validate_impact_evaluation(None, 10);
        assert!(!outcome.is_valid);
        assert!(outcome.message.is_some());
    }

    #[test]
    fn satisfaction_respects_configured_scale() {
        assert!(validate_impact_evaluation(Some(5), 5).is_valid);
        assert!(!validate_impact_evaluation(Some(6), 5).is_valid);
    }
}
