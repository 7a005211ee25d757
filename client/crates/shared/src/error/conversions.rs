//! Error conversions - From implementations for common error types
//!
//! Provides automatic conversion from JSON decoding errors to [`AppError`].
//! Transport errors are classified by the session crate, which knows the
//! request path.

use super::app_error::AppError;
use super::kind::ErrorKind;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_data() || err.is_eof() {
            AppError::new(
                ErrorKind::BadGateway,
                format!("Unexpected response body: {}", err),
            )
            .with_source(err)
        } else {
            AppError::internal("JSON serialization error").with_source(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let app_err: AppError = json_err.into();
        assert_eq!(app_err.kind(), ErrorKind::BadGateway);
        assert!(app_err.is_transient());
    }
}
