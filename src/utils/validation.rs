use crate::utils::error::{IbError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(IbError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(IbError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(IbError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(IbError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(IbError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(IbError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(IbError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// A mean-pressure period is either absent or a `first,last` pair of years.
pub fn validate_year_span(field_name: &str, years: &[i32]) -> Result<()> {
    match years {
        [] => Ok(()),
        [first, last] => {
            if first > last {
                return Err(IbError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: format!("{},{}", first, last),
                    reason: "First year must not be after last year".to_string(),
                });
            }
            validate_range(field_name, *first, 1900, 2100)?;
            validate_range(field_name, *last, 1900, 2100)
        }
        other => Err(IbError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format!("{:?}", other),
            reason: "Expected exactly two years: first,last".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("endpoint", "https://example.com").is_ok());
        assert!(validate_url("endpoint", "http://example.com").is_ok());
        assert!(validate_url("endpoint", "").is_err());
        assert!(validate_url("endpoint", "invalid-url").is_err());
        assert!(validate_url("endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("density", 1030.0, 900.0, 1100.0).is_ok());
        assert!(validate_range("density", 0.0, 900.0, 1100.0).is_err());
        assert!(validate_range("density", 2000.0, 900.0, 1100.0).is_err());
    }

    #[test]
    fn test_validate_year_span() {
        assert!(validate_year_span("mean", &[]).is_ok());
        assert!(validate_year_span("mean", &[2000, 2020]).is_ok());
        assert!(validate_year_span("mean", &[2020, 2000]).is_err());
        assert!(validate_year_span("mean", &[2000]).is_err());
        assert!(validate_year_span("mean", &[1200, 2020]).is_err());
    }
}
