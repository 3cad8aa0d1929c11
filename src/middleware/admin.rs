use axum::http::HeaderMap;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::AdminCaller;

/// Equality check of a caller-supplied secret against the configured one
pub fn authorize(configured_key: &str, supplied: &str) -> bool {
    supplied == configured_key
}

/// Admin gate used by mutation and admin-only handlers.
///
/// Checks the X-Api-Key header against the configured admin key and hands
/// back a truncated caller identity for audit attribution.
pub fn verify_admin_api_key(config: &Config, headers: &HeaderMap) -> Result<AdminCaller> {
    let supplied = headers.get("x-api-key").and_then(|h| h.to_str().ok());

    match supplied {
        Some(key) if authorize(&config.admin.api_key, key) => Ok(AdminCaller::from_key(key)),
        _ => Err(AppError::Unauthorized(
            "Invalid or missing API key".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn test_config(key: &str) -> Config {
        let mut config = Config::default();
        config.admin.api_key = key.to_string();
        config
    }

    #[test]
    fn accepts_exact_key_only() {
        assert!(authorize("sekret", "sekret"));
        assert!(!authorize("sekret", "sekret2"));
        assert!(!authorize("sekret", ""));
    }

    #[test]
    fn header_gate_yields_truncated_caller_label() {
        let config = test_config("sekret");

        let headers = HeaderMap::new();
        assert!(matches!(
            verify_admin_api_key(&config, &headers),
            Err(AppError::Unauthorized(_))
        ));

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("wrong"));
        assert!(matches!(
            verify_admin_api_key(&config, &headers),
            Err(AppError::Unauthorized(_))
        ));

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("sekret"));
        let caller = verify_admin_api_key(&config, &headers).unwrap();
        assert_eq!(caller.label, "admin_api:sekr...");
    }
}
