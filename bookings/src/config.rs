//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: BOOKINGS_, nested keys separated by `__`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/bookings/config.toml
//! 4. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;
use crate::session::SessionConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,

    /// Template discovery and caching
    #[serde(default)]
    pub templates: TemplatesConfig,

    /// Static asset serving
    #[serde(default)]
    pub static_files: StaticFilesConfig,

    /// Session cookie and CSRF configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Middleware configuration
    #[serde(default)]
    pub middleware: MiddlewareConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Production switch
    ///
    /// Controls the session cookie `Secure` flag and the log format.
    #[serde(default)]
    pub in_production: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            port: default_port(),
            log_level: default_log_level(),
            timeout_secs: default_timeout(),
            in_production: false,
        }
    }
}

impl ServiceConfig {
    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Template configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatesConfig {
    /// Directory holding `*.page.tmpl` and `*.layout.tmpl` files
    #[serde(default = "default_templates_dir")]
    pub dir: PathBuf,

    /// Reuse the cache built at startup instead of rebuilding on every render
    ///
    /// Leave off during development so template edits show up without a restart.
    #[serde(default)]
    pub use_cache: bool,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: default_templates_dir(),
            use_cache: false,
        }
    }
}

/// Static file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticFilesConfig {
    /// Directory served verbatim
    #[serde(default = "default_static_dir")]
    pub dir: PathBuf,

    /// URL prefix the directory is mounted under
    #[serde(default = "default_static_prefix")]
    pub url_prefix: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            dir: default_static_dir(),
            url_prefix: default_static_prefix(),
        }
    }
}

/// Middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Maximum request body size in megabytes
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,

    /// Response security headers
    #[serde(default)]
    pub security_headers: SecurityHeadersConfig,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            body_limit_mb: default_body_limit_mb(),
            security_headers: SecurityHeadersConfig::default(),
        }
    }
}

/// Security header configuration
///
/// HSTS is only sent when `service.in_production` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityHeadersConfig {
    /// Master switch
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Send `X-Content-Type-Options: nosniff`
    #[serde(default = "default_true")]
    pub x_content_type_options: bool,

    /// `X-Frame-Options` value; empty disables the header
    #[serde(default = "default_frame_options")]
    pub x_frame_options: String,

    /// `Referrer-Policy` value; empty disables the header
    #[serde(default = "default_referrer_policy")]
    pub referrer_policy: String,

    /// Send `Strict-Transport-Security` in production
    #[serde(default = "default_true")]
    pub hsts: bool,

    /// HSTS `max-age` in seconds
    #[serde(default = "default_hsts_max_age")]
    pub hsts_max_age_secs: u64,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            x_content_type_options: true,
            x_frame_options: default_frame_options(),
            referrer_policy: default_referrer_policy(),
            hsts: true,
            hsts_max_age_secs: default_hsts_max_age(),
        }
    }
}

impl MiddlewareConfig {
    /// Body limit in bytes
    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_mb * 1024 * 1024
    }
}

fn default_service_name() -> String {
    "bookings".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("./templates")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("./static")
}

fn default_static_prefix() -> String {
    "/static".to_string()
}

fn default_body_limit_mb() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_frame_options() -> String {
    "DENY".to_string()
}

fn default_referrer_policy() -> String {
    "strict-origin-when-cross-origin".to_string()
}

fn default_hsts_max_age() -> u64 {
    31_536_000
}

impl Config {
    /// Load configuration from the default locations
    pub fn load() -> Result<Self> {
        let mut figment = Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Config::default()));

        // Merge config files lowest priority first
        for path in Self::find_config_paths().iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        // Environment variables have highest priority
        figment = figment.merge(Env::prefixed("BOOKINGS_").split("__"));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &str) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("BOOKINGS_").split("__"))
            .extract()?;

        Ok(config)
    }

    /// Config file paths in priority order (highest first)
    fn find_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix("bookings");
        if let Some(path) = xdg_dirs.find_config_file("config.toml") {
            paths.push(path);
        }

        paths
    }
}
