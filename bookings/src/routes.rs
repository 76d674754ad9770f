//! Route table

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::{
    error::Result,
    handlers,
    middleware::apply_security_headers,
    session::apply_session_layers,
    state::AppState,
};

/// Build the application router with sessions, CSRF and security headers.
///
/// Server-wide layers (tracing, timeouts, request ids) are added by
/// [`Server`](crate::server::Server).
pub fn router(state: AppState) -> Result<Router> {
    let config = state.config().clone();

    let app = Router::new()
        .route("/", get(handlers::home))
        .route("/about", get(handlers::about))
        .route("/generals-quarters", get(handlers::generals))
        .route("/majors-suite", get(handlers::majors))
        .route(
            "/search-availability",
            get(handlers::search_availability).post(handlers::post_availability),
        )
        .route("/search-availability-json", post(handlers::availability_json))
        .route(
            "/make-reservation",
            get(handlers::make_reservation).post(handlers::post_reservation),
        )
        .route("/reservation-summary", get(handlers::reservation_summary))
        .route("/contact", get(handlers::contact))
        .nest_service(
            &config.static_files.url_prefix,
            ServeDir::new(&config.static_files.dir),
        )
        .with_state(state);

    let app = apply_session_layers(app, &config.session, config.service.in_production)?;

    Ok(apply_security_headers(
        app,
        &config.middleware.security_headers,
        config.service.in_production,
    ))
}
