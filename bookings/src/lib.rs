//! # bookings
//!
//! Server-rendered booking site for a small bed-and-breakfast.
//!
//! ## Features
//!
//! - **Pages**: minijinja templates compiled into a per-page cache, shared at
//!   runtime or rebuilt on every render during development
//! - **Reservations**: a post/redirect/get flow that hands the reservation to
//!   the summary page through the session, exactly once
//! - **Forms**: accumulating validator with per-field messages
//! - **Sessions**: signed cookie, flash/warning/error messages, CSRF protection
//! - **Middleware stack**: request ids, tracing, panic recovery, body limits,
//!   timeouts, compression, security headers
//! - **Graceful shutdown**: SIGTERM and SIGINT
//!
//! ## Example
//!
//! ```rust,no_run
//! use bookings::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let state = AppState::new(config.clone())?;
//!     let app = router(state)?;
//!
//!     Server::new(config).serve(app).await
//! }
//! ```

pub mod config;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
pub mod server;
pub mod session;
pub mod state;
pub mod templates;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, SecurityHeadersConfig};
    pub use crate::error::{Error, Result};
    pub use crate::forms::{Errors, Form, FormValues};
    pub use crate::models::Reservation;
    pub use crate::observability::init_tracing;
    pub use crate::routes::router;
    pub use crate::server::Server;
    pub use crate::session::{
        CsrfConfig, CsrfLayer, CsrfToken, FlashKind, FlashMessages, Session, SessionConfig,
        SessionExt,
    };
    pub use crate::state::AppState;
    pub use crate::templates::{build_template_cache, Renderer, TemplateCache, TemplateData};

    // Re-export commonly used external types
    pub use axum::{
        extract::State,
        response::{Html, IntoResponse, Redirect, Response},
        routing::{get, post},
        Router,
    };
    pub use serde::{Deserialize, Serialize};
}
