//! Session configuration types.

use serde::{Deserialize, Serialize};

/// Session configuration.
///
/// The `Secure` cookie flag is not configured here; it follows
/// `service.in_production`.
///
/// # Example
///
/// ```toml
/// [session]
/// cookie_name = "session"
/// expiry_secs = 86400
/// same_site = "lax"
/// secret = "at least 64 bytes of random data ..."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session cookie name.
    ///
    /// Default: `"session"`
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Session lifetime in seconds.
    ///
    /// - `0`: Session cookie (expires when browser closes)
    /// - `> 0`: Persistent cookie that survives browser restarts
    ///
    /// Default: `86400` (24 hours)
    #[serde(default = "default_expiry_secs")]
    pub expiry_secs: u64,

    /// Cookie path.
    ///
    /// Default: `"/"`
    #[serde(default = "default_cookie_path")]
    pub cookie_path: String,

    /// HttpOnly cookie flag.
    ///
    /// Default: `true`
    #[serde(default = "default_http_only")]
    pub http_only: bool,

    /// SameSite cookie policy (`"strict"`, `"lax"` or `"none"`).
    ///
    /// Default: `"lax"`
    #[serde(default = "default_same_site")]
    pub same_site: String,

    /// Key used to sign the session cookie. Must be at least 64 bytes.
    ///
    /// When unset a random key is generated at startup, which invalidates
    /// every session on restart.
    #[serde(default)]
    pub secret: Option<String>,

    /// CSRF protection configuration.
    #[serde(default)]
    pub csrf: CsrfConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            expiry_secs: default_expiry_secs(),
            cookie_path: default_cookie_path(),
            http_only: default_http_only(),
            same_site: default_same_site(),
            secret: None,
            csrf: CsrfConfig::default(),
        }
    }
}

/// CSRF protection configuration.
///
/// # Example
///
/// ```toml
/// [session.csrf]
/// enabled = true
/// token_length = 32
/// header_name = "X-CSRF-Token"
/// form_field_name = "csrf_token"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrfConfig {
    /// Enable CSRF validation.
    ///
    /// When enabled, non-safe HTTP methods require a valid CSRF token.
    /// Tokens are still issued to templates when disabled.
    ///
    /// Default: `true`
    #[serde(default = "default_csrf_enabled")]
    pub enabled: bool,

    /// CSRF token length in characters.
    ///
    /// Default: `32`
    #[serde(default = "default_token_length")]
    pub token_length: usize,

    /// HTTP header name for CSRF token.
    ///
    /// Default: `"X-CSRF-Token"`
    #[serde(default = "default_header_name")]
    pub header_name: String,

    /// Form field name for CSRF token.
    ///
    /// Default: `"csrf_token"`
    #[serde(default = "default_form_field_name")]
    pub form_field_name: String,

    /// HTTP methods that skip CSRF validation.
    ///
    /// Default: `["GET", "HEAD", "OPTIONS", "TRACE"]`
    #[serde(default = "default_safe_methods")]
    pub safe_methods: Vec<String>,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            enabled: default_csrf_enabled(),
            token_length: default_token_length(),
            header_name: default_header_name(),
            form_field_name: default_form_field_name(),
            safe_methods: default_safe_methods(),
        }
    }
}

// Default value functions
fn default_cookie_name() -> String {
    "session".to_string()
}

fn default_expiry_secs() -> u64 {
    86400 // 24 hours
}

fn default_cookie_path() -> String {
    "/".to_string()
}

fn default_http_only() -> bool {
    true
}

fn default_same_site() -> String {
    "lax".to_string()
}

fn default_csrf_enabled() -> bool {
    true
}

fn default_token_length() -> usize {
    32
}

fn default_header_name() -> String {
    "X-CSRF-Token".to_string()
}

fn default_form_field_name() -> String {
    "csrf_token".to_string()
}

fn default_safe_methods() -> Vec<String> {
    vec![
        "GET".to_string(),
        "HEAD".to_string(),
        "OPTIONS".to_string(),
        "TRACE".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.cookie_name, "session");
        assert_eq!(config.expiry_secs, 86400);
        assert!(config.http_only);
        assert_eq!(config.same_site, "lax");
        assert!(config.secret.is_none());
    }

    #[test]
    fn test_csrf_config_defaults() {
        let config = CsrfConfig::default();
        assert!(config.enabled);
        assert_eq!(config.token_length, 32);
        assert_eq!(config.header_name, "X-CSRF-Token");
        assert_eq!(config.form_field_name, "csrf_token");
        assert!(config.safe_methods.contains(&"GET".to_string()));
        assert!(!config.safe_methods.contains(&"POST".to_string()));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SessionConfig = serde_json::from_str(r#"{"cookie_name": "bk"}"#).unwrap();
        assert_eq!(config.cookie_name, "bk");
        assert_eq!(config.expiry_secs, 86400);
        assert_eq!(config.csrf.form_field_name, "csrf_token");
    }
}
