//! Field-level validation for submitted forms. Runs before any API call.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// First rule a password breaks, if any.
pub(crate) fn password_problem(password: &str) -> Option<&'static str> {
    if password.chars().count() < 8 {
        Some("Password must be at least 8 characters long")
    } else if !password.chars().any(char::is_uppercase) {
        Some("Password must contain at least one uppercase letter")
    } else if !password.chars().any(char::is_lowercase) {
        Some("Password must contain at least one lowercase letter")
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        Some("Password must contain at least one digit")
    } else {
        None
    }
}

/// Accepted range of a numeric field. `suffix` follows the bound in messages
/// ("Minimum 20g protein").
#[derive(Debug, Clone, Copy)]
pub struct NumberRule {
    pub label: &'static str,
    pub min: f64,
    pub max: Option<f64>,
    pub suffix: &'static str,
}

impl NumberRule {
    pub const fn between(label: &'static str, min: f64, max: f64, suffix: &'static str) -> Self {
        Self {
            label,
            min,
            max: Some(max),
            suffix,
        }
    }

    pub const fn at_least(label: &'static str, min: f64) -> Self {
        Self {
            label,
            min,
            max: None,
            suffix: "",
        }
    }

    fn problem(&self, value: f64) -> Option<String> {
        if !value.is_finite() {
            return Some(format!("{} must be a number", self.label));
        }
        if value < self.min {
            return Some(match self.max {
                Some(_) => format!("Minimum {}{}", self.min, self.suffix),
                None => format!("{} must be at least {}", self.label, self.min),
            });
        }
        match self.max {
            Some(max) if value > max => Some(format!("Maximum {}{}", max, self.suffix)),
            _ => None,
        }
    }
}

/// Per-field messages, keyed by the form field name.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Trimmed text, or `message` recorded when blank.
    pub fn required(&mut self, field: &'static str, raw: &str, message: &str) -> Option<String> {
        let value = raw.trim();
        if value.is_empty() {
            self.add(field, message);
            None
        } else {
            Some(value.to_string())
        }
    }

    /// Number within `rule`; blank input is an error.
    pub fn number(&mut self, field: &'static str, raw: &str, rule: NumberRule) -> Option<f64> {
        if raw.trim().is_empty() {
            self.add(field, format!("{} is required", rule.label));
            return None;
        }
        self.optional_number(field, raw, rule)
    }

    /// Number within `rule`; blank input means "not set".
    pub fn optional_number(&mut self, field: &'static str, raw: &str, rule: NumberRule) -> Option<f64> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let Ok(value) = raw.parse::<f64>() else {
            self.add(field, format!("{} must be a number", rule.label));
            return None;
        };
        match rule.problem(value) {
            Some(message) => {
                self.add(field, message);
                None
            }
            None => Some(value),
        }
    }

    /// Optional whole number within `rule` (ages).
    pub fn optional_whole(&mut self, field: &'static str, raw: &str, rule: NumberRule) -> Option<u32> {
        let value = self.optional_number(field, raw, rule)?;
        if value.fract() != 0.0 {
            self.add(field, format!("{} must be a whole number", rule.label));
            return None;
        }
        Some(value as u32)
    }

    /// Parses an optional choice from a fixed set; blank means "not set".
    pub fn optional_choice<T: std::str::FromStr>(
        &mut self,
        field: &'static str,
        raw: &str,
        label: &str,
    ) -> Option<T> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                self.add(field, format!("Unknown {label}"));
                None
            }
        }
    }

    pub fn email(&mut self, field: &'static str, raw: &str) -> Option<String> {
        let email = raw.trim().to_lowercase();
        if email.is_empty() {
            self.add(field, "Email is required");
            None
        } else if !is_valid_email(&email) {
            self.add(field, "Invalid email address");
            None
        } else {
            Some(email)
        }
    }

    pub fn new_password(&mut self, field: &'static str, raw: &str) -> Option<String> {
        match password_problem(raw) {
            Some(problem) => {
                self.add(field, problem);
                None
            }
            None => Some(raw.to_string()),
        }
    }
}

/// Blank form values become `None`.
pub(crate) fn non_blank(raw: &str) -> Option<String> {
    let value = raw.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod forms_tests {
    use super::*;

    const PROTEIN: NumberRule = NumberRule::between("Protein goal", 20.0, 500.0, "g protein");

    #[test]
    fn email_shape() {
        assert!(is_valid_email("ana@example.com"));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("ana example@x.io"));
    }

    #[test]
    fn password_rules_report_first_problem() {
        assert_eq!(password_problem("Ab1"), Some("Password must be at least 8 characters long"));
        assert_eq!(
            password_problem("lowercase1"),
            Some("Password must contain at least one uppercase letter")
        );
        assert_eq!(
            password_problem("UPPERCASE1"),
            Some("Password must contain at least one lowercase letter")
        );
        assert_eq!(password_problem("NoDigitsHere"), Some("Password must contain at least one digit"));
        assert_eq!(password_problem("Secret123"), None);
    }

    #[test]
    fn number_ranges_use_bound_messages() {
        let mut errors = FieldErrors::default();
        assert_eq!(errors.number("protein", "150", PROTEIN), Some(150.0));
        assert_eq!(errors.number("low", "10", PROTEIN), None);
        assert_eq!(errors.number("high", "501", PROTEIN), None);
        assert_eq!(errors.number("blank", "  ", PROTEIN), None);
        assert_eq!(errors.number("junk", "lots", PROTEIN), None);

        assert_eq!(errors.get("protein"), None);
        assert_eq!(errors.get("low"), Some("Minimum 20g protein"));
        assert_eq!(errors.get("high"), Some("Maximum 500g protein"));
        assert_eq!(errors.get("blank"), Some("Protein goal is required"));
        assert_eq!(errors.get("junk"), Some("Protein goal must be a number"));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn optional_fields_accept_blank() {
        let mut errors = FieldErrors::default();
        let weight = NumberRule::between("Weight", 20.0, 300.0, "kg");
        assert_eq!(errors.optional_number("weight_kg", "", weight), None);
        assert_eq!(
            errors.optional_whole("age", "30", NumberRule::between("Age", 1.0, 120.0, "")),
            Some(30)
        );
        assert!(errors.is_empty());
        assert_eq!(
            errors.optional_whole("age", "30.5", NumberRule::between("Age", 1.0, 120.0, "")),
            None
        );
        assert_eq!(errors.get("age"), Some("Age must be a whole number"));
    }

    #[test]
    fn first_message_per_field_wins() {
        let mut errors = FieldErrors::default();
        errors.add("quantity", "Quantity is required");
        errors.add("quantity", "Quantity must be at least 0.1");
        assert_eq!(errors.get("quantity"), Some("Quantity is required"));
    }

    #[test]
    fn at_least_rule_has_no_upper_bound() {
        let mut errors = FieldErrors::default();
        let quantity = NumberRule::at_least("Quantity", 0.1);
        assert_eq!(errors.number("quantity", "2500", quantity), Some(2500.0));
        assert_eq!(errors.number("quantity", "0", quantity), None);
        assert_eq!(errors.get("quantity"), Some("Quantity must be at least 0.1"));
    }
}
