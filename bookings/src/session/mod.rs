//! HTTP session management.
//!
//! Cookie-identified sessions backed by an in-process store. The cookie is
//! signed, persists across browser restarts, and expires
//! `session.expiry_secs` (24 hours by default) after the session was first
//! written. Later writes do not extend it.
//!
//! # Features
//!
//! - **Typed access**: [`SessionExt`] reads values back as concrete types
//! - **Flash messages**: [`FlashMessages`] pops one-shot `flash`/`warning`/`error` strings
//! - **CSRF protection**: [`CsrfLayer`] validates [`CsrfToken`]s on unsafe methods
//!
//! ```toml
//! # config.toml
//! [session]
//! cookie_name = "session"
//! expiry_secs = 86400
//! same_site = "lax"
//! ```

mod config;
mod csrf;
mod flash;
mod lifetime;
mod store;

pub use config::{CsrfConfig, SessionConfig};
pub use csrf::{CsrfLayer, CsrfMiddleware, CsrfToken};
pub use flash::{FlashKind, FlashMessages};
pub use lifetime::enforce_lifetime;
pub use store::SessionExt;

// Re-export tower-sessions types for convenience
pub use tower_sessions::{Expiry, Session};
pub use tower_sessions_memory_store::MemoryStore;

use axum::{middleware, Router};
use time::Duration;
use tower_sessions::{
    cookie::{Key, SameSite},
    SessionManagerLayer,
};

use crate::error::{Error, Result};

/// Wrap `router` in the CSRF check, the lifetime check and the session manager.
///
/// The session manager is the outer layer so the inner layers can see the
/// loaded session. `secure` should be the production switch.
///
/// # Errors
///
/// Returns an error if `config.secret` is shorter than 64 bytes.
pub fn apply_session_layers(router: Router, config: &SessionConfig, secure: bool) -> Result<Router> {
    let key = signing_key(config)?;
    let store = MemoryStore::default();

    let lifetime = (config.expiry_secs > 0).then(|| Duration::seconds(config.expiry_secs as i64));
    // Replaced per request by `enforce_lifetime` when a lifetime is set
    let expiry = match lifetime {
        Some(lifetime) => Expiry::OnInactivity(lifetime),
        None => Expiry::OnSessionEnd,
    };

    let same_site = match config.same_site.to_lowercase().as_str() {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ => SameSite::Lax,
    };

    // Clone strings to satisfy 'static lifetime requirements
    let cookie_name = config.cookie_name.clone();
    let cookie_path = config.cookie_path.clone();

    let session_layer = SessionManagerLayer::new(store)
        .with_name(cookie_name)
        .with_expiry(expiry)
        .with_secure(secure)
        .with_http_only(config.http_only)
        .with_same_site(same_site)
        .with_path(cookie_path)
        .with_signed(key);

    tracing::debug!(
        cookie = %config.cookie_name,
        expiry_secs = config.expiry_secs,
        secure,
        csrf = config.csrf.enabled,
        "Session layers configured"
    );

    let router = router.layer(CsrfLayer::new(config.csrf.clone()));
    let router = match lifetime {
        Some(lifetime) => router.layer(middleware::from_fn(
            move |session: Session, request: axum::extract::Request, next: middleware::Next| {
                enforce_lifetime(lifetime, session, request, next)
            },
        )),
        None => router,
    };

    Ok(router.layer(session_layer))
}

fn signing_key(config: &SessionConfig) -> Result<Key> {
    match &config.secret {
        Some(secret) => Key::try_from(secret.as_bytes()).map_err(|e| {
            Error::Internal(format!("Invalid session secret (need at least 64 bytes): {e}"))
        }),
        None => {
            tracing::warn!("No session secret configured, sessions will not survive a restart");
            Ok(Key::generate())
        }
    }
}
