use url::Url;

use crate::error::{ApiError, ApiResult, FieldError};

/// Accumulator for the field-level validation pass. Violations are
/// collected rather than short-circuited, so a 400 response names every
/// bad field in one round trip.
#[derive(Default)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: &str, msg: impl Into<String>) {
        self.errors.push(FieldError::new(path, msg));
    }

    pub fn require_non_empty(&mut self, path: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(path, format!("{path} must not be empty"));
        }
    }

    pub fn require_min_len(&mut self, path: &str, value: &str, min: usize) {
        if value.trim().chars().count() < min {
            self.push(path, format!("{path} must be at least {min} characters"));
        }
    }

    pub fn require_email(&mut self, path: &str, value: &str) {
        if !is_email(value) {
            self.push(path, format!("{path} must be a valid email address"));
        }
    }

    pub fn optional_email(&mut self, path: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.require_email(path, value);
        }
    }

    pub fn require_positive(&mut self, path: &str, value: f64) {
        if !(value.is_finite() && value > 0.0) {
            self.push(path, format!("{path} must be a positive number"));
        }
    }

    pub fn require_url(&mut self, path: &str, value: &str) {
        if Url::parse(value.trim()).is_err() {
            self.push(path, format!("{path} must be a valid URL"));
        }
    }

    /// Terminates the validation pass: `Err` carries every collected
    /// violation as a single 400.
    pub fn finish(self) -> ApiResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(self.errors))
        }
    }
}

fn is_email(value: &str) -> bool {
    let trimmed = value.trim();
    let Some((local, domain)) = trimmed.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || trimmed.contains(char::is_whitespace) {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty()
}
