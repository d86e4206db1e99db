use serde::Deserialize;

use crate::validation::{self, FieldErrors};

pub const MIN_PASSWORD_CHARS: usize = 8;

/// Body of `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if validation::required(&mut errors, "email", &self.email, "Email is required") {
            validation::email(&mut errors, "email", &self.email, "Enter a valid email address");
        }
        validation::required(&mut errors, "password", &self.password, "Password is required");
        errors.into_result()
    }
}

impl RegisterForm {
    /// Shape rules first; the password match is only checked once they pass.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if validation::required(&mut errors, "email", &self.email, "Email is required") {
            validation::email(&mut errors, "email", &self.email, "Enter a valid email address");
        }
        if validation::required(&mut errors, "password", &self.password, "Password is required") {
            validation::min_chars(
                &mut errors,
                "password",
                &self.password,
                MIN_PASSWORD_CHARS,
                "Password must be at least 8 characters",
            );
        }
        validation::required(
            &mut errors,
            "confirm_password",
            &self.confirm_password,
            "Please confirm your password",
        );
        errors.into_result()?;

        if self.password != self.confirm_password {
            return Err(FieldErrors::single("confirm_password", "Passwords do not match"));
        }
        Ok(())
    }
}

/// Trims surrounding whitespace; case is preserved.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_string()
}
