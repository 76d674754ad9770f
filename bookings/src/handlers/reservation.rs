//! The reservation flow.
//!
//! ```text
//! GET  /make-reservation      form
//! POST /make-reservation      invalid -> form again with errors
//!                             valid   -> reservation into session, 303 to summary
//! GET  /reservation-summary   reservation popped from session and shown once
//! ```
//!
//! The summary consumes the stored reservation, so reloading it sends the
//! visitor home with an error message.

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::{
    error::{Error, Result},
    forms::{Form, FormValues},
    models::Reservation,
    session::{FlashKind, FlashMessages, SessionExt},
    state::AppState,
    templates::TemplateData,
};

pub const FORM_PAGE: &str = "make-reservation.page.tmpl";
pub const SUMMARY_PAGE: &str = "reservation-summary.page.tmpl";

/// `GET /make-reservation`
pub async fn make_reservation(State(state): State<AppState>, session: Session) -> Result<Response> {
    let data = TemplateData::new()
        .with_data("reservation", &Reservation::default())
        .with_form(Form::new(FormValues::default()));

    let page = state.renderer().render(&session, FORM_PAGE, data).await?;
    Ok(page.into_response())
}

/// `POST /make-reservation`
pub async fn post_reservation(
    State(state): State<AppState>,
    session: Session,
    body: Bytes,
) -> Result<Response> {
    let mut form = Form::new(FormValues::parse(&body));
    let reservation = Reservation::from_form(&form);

    form.required(&["first_name", "last_name", "email"]);
    form.min_length("first_name", 3);
    form.is_email("email");

    if !form.valid() {
        tracing::debug!(
            fields = ?form.errors().fields().collect::<Vec<_>>(),
            "Reservation rejected"
        );
        let data = TemplateData::new()
            .with_data("reservation", &reservation)
            .with_form(form);
        let page = state.renderer().render(&session, FORM_PAGE, data).await?;
        return Ok(page.into_response());
    }

    session.put(Reservation::SESSION_KEY, &reservation).await?;
    tracing::debug!(key = Reservation::SESSION_KEY, "Reservation stored in session");

    Ok(Redirect::to("/reservation-summary").into_response())
}

/// `GET /reservation-summary`
pub async fn reservation_summary(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response> {
    let reservation = match take_reservation(&session).await {
        Ok(reservation) => reservation,
        Err(e @ (Error::SessionValueAbsent(_) | Error::Session(_))) => {
            tracing::warn!(key = Reservation::SESSION_KEY, "Cannot show summary: {}", e);
            FlashMessages::put(&session, FlashKind::Error, "Can't get reservation from session")
                .await?;
            return Ok(Redirect::temporary("/").into_response());
        }
        Err(e) => return Err(e),
    };

    let data = TemplateData::new().with_data("reservation", &reservation);
    let page = state.renderer().render(&session, SUMMARY_PAGE, data).await?;
    Ok(page.into_response())
}

/// Pop the pending reservation; absence is [`Error::SessionValueAbsent`].
async fn take_reservation(session: &Session) -> Result<Reservation> {
    session
        .pop(Reservation::SESSION_KEY)
        .await?
        .ok_or_else(|| Error::SessionValueAbsent(Reservation::SESSION_KEY.to_string()))
}
