//! Absolute session lifetime.
//!
//! tower-sessions recomputes an `OnInactivity` expiry on every save, so a
//! session written on each visit would never expire. Instead the deadline is
//! fixed when the session is first written and stored in the session under
//! `_expires_at` (unix seconds). Every later request re-applies that same
//! deadline as [`Expiry::AtDateTime`].

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use time::{Duration, OffsetDateTime};
use tower_sessions::{Expiry, Session};

use super::store::SessionExt;
use crate::error::{Error, Result};

pub(crate) const EXPIRES_AT_KEY: &str = "_expires_at";

/// Middleware pinning the session to `lifetime` from its first write.
///
/// Must run inside the session manager layer.
pub async fn enforce_lifetime(
    lifetime: Duration,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    let pending = match apply_deadline(&session, lifetime).await {
        Ok(pending) => pending,
        Err(e) => {
            tracing::error!("Failed to apply session deadline: {}", e);
            return e.into_response();
        }
    };

    let response = next.run(request).await;

    if let Err(e) = record_deadline(&session, pending).await {
        tracing::error!("Failed to record session deadline: {}", e);
        return e.into_response();
    }
    response
}

/// Set the session's expiry from the stored deadline.
///
/// A session without one gets `now + lifetime`; the returned timestamp still
/// has to be stored by [`record_deadline`] once the request is handled.
async fn apply_deadline(session: &Session, lifetime: Duration) -> Result<Option<i64>> {
    if let Some(stored) = session.get_as::<i64>(EXPIRES_AT_KEY).await? {
        session.set_expiry(Some(Expiry::AtDateTime(from_timestamp(stored)?)));
        return Ok(None);
    }

    let deadline = OffsetDateTime::now_utc().saturating_add(lifetime).unix_timestamp();
    session.set_expiry(Some(Expiry::AtDateTime(from_timestamp(deadline)?)));
    Ok(Some(deadline))
}

/// Store a new deadline, but only for sessions the request actually wrote to.
async fn record_deadline(session: &Session, pending: Option<i64>) -> Result<()> {
    let Some(deadline) = pending else {
        return Ok(());
    };
    if session.is_empty().await {
        return Ok(());
    }
    tracing::debug!(expires_at = deadline, "Session deadline fixed");
    session.put(EXPIRES_AT_KEY, &deadline).await
}

fn from_timestamp(seconds: i64) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(seconds)
        .map_err(|e| Error::Session(format!("Invalid session deadline {seconds}: {e}")))
}
