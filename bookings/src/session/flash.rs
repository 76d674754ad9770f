//! One-shot flash, warning and error messages.
//!
//! Messages are plain strings stored in the session under the keys `flash`,
//! `warning` and `error`. They are set before a redirect and consumed by the
//! next render (post-redirect-get).
//!
//! # Example
//!
//! ```rust,ignore
//! use bookings::session::{FlashKind, FlashMessages};
//!
//! async fn cancel(session: Session) -> Result<Redirect> {
//!     FlashMessages::put(&session, FlashKind::Warning, "Reservation cancelled").await?;
//!     Ok(Redirect::to("/"))
//! }
//! ```

use tower_sessions::Session;

use super::store::SessionExt;
use crate::error::Result;

/// Which one-shot message slot to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    /// General notice (e.g., "Reservation saved")
    Flash,
    /// Warning (e.g., "Dates are close to full")
    Warning,
    /// Error (e.g., "Can't get reservation from session")
    Error,
}

impl FlashKind {
    /// All kinds, in the order they are popped.
    pub const ALL: [FlashKind; 3] = [FlashKind::Flash, FlashKind::Error, FlashKind::Warning];

    /// Session key the message is stored under.
    #[must_use]
    pub fn session_key(&self) -> &'static str {
        match self {
            Self::Flash => "flash",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// The messages popped for a single render.
///
/// Each field is empty when nothing was set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlashMessages {
    /// General notice
    pub flash: String,
    /// Warning message
    pub warning: String,
    /// Error message
    pub error: String,
}

impl FlashMessages {
    /// Store a message for the next render, replacing any pending message of the same kind.
    pub async fn put(session: &Session, kind: FlashKind, message: impl Into<String>) -> Result<()> {
        let message: String = message.into();
        session.put(kind.session_key(), &message).await
    }

    /// Pop every message kind from the session.
    ///
    /// A second call without an intervening `put` returns empty messages.
    pub async fn take(session: &Session) -> Result<Self> {
        let messages = Self::peek(session).await?;
        Self::clear(session).await?;
        Ok(messages)
    }

    /// Read every message kind without removing it.
    pub async fn peek(session: &Session) -> Result<Self> {
        let mut messages = Self::default();
        for kind in FlashKind::ALL {
            let value = session
                .get_as::<String>(kind.session_key())
                .await?
                .unwrap_or_default();
            match kind {
                FlashKind::Flash => messages.flash = value,
                FlashKind::Warning => messages.warning = value,
                FlashKind::Error => messages.error = value,
            }
        }
        Ok(messages)
    }

    /// Remove every pending message.
    pub async fn clear(session: &Session) -> Result<()> {
        for kind in FlashKind::ALL {
            session.remove_key(kind.session_key()).await?;
        }
        Ok(())
    }

    /// Check if there are any messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flash.is_empty() && self.warning.is_empty() && self.error.is_empty()
    }
}
