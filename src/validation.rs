//! Field-level validation rules for form input.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

/// Key used for errors that belong to the whole form rather than one field.
pub const FORM: &str = "_";

/// Field name → messages, in the order they were raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Records `required` when empty. Returns whether later rules should run.
pub fn required(errors: &mut FieldErrors, field: &str, value: &str, message: &str) -> bool {
    if value.is_empty() {
        errors.add(field, message);
        false
    } else {
        true
    }
}

pub fn email(errors: &mut FieldErrors, field: &str, value: &str, message: &str) {
    if !is_valid_email(value) {
        errors.add(field, message);
    }
}

/// Length is counted in characters, not bytes.
pub fn min_chars(errors: &mut FieldErrors, field: &str, value: &str, min: usize, message: &str) {
    if value.chars().count() < min {
        errors.add(field, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(is_valid_email("a@example.com"));
        assert!(is_valid_email("Name.Surname@Example.co"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@example.com"));
    }

    #[test]
    fn required_short_circuits_on_empty() {
        let mut errors = FieldErrors::new();
        assert!(!required(&mut errors, "email", "", "email is required"));
        assert_eq!(errors.get("email"), ["email is required".to_string()]);
        assert!(required(&mut errors, "password", "x", "password is required"));
        assert!(errors.get("password").is_empty());
    }

    #[test]
    fn min_chars_counts_characters() {
        let mut errors = FieldErrors::new();
        min_chars(&mut errors, "password", "äöüäöüäö", 8, "too short");
        assert!(errors.is_empty());
        min_chars(&mut errors, "password", "1234567", 8, "too short");
        assert_eq!(errors.get("password").len(), 1);
    }

    #[test]
    fn into_result_reports_fields() {
        assert!(FieldErrors::new().into_result().is_ok());
        let err = FieldErrors::single(FORM, "boom").into_result().unwrap_err();
        assert_eq!(err.get(FORM), ["boom".to_string()]);
    }
}
