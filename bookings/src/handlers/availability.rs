//! Availability search
//!
//! Both endpoints are placeholders: no inventory is consulted.

use axum::{
    body::Bytes,
    http::header,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    forms::FormValues,
};

/// Body of `POST /search-availability-json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub ok: bool,
    pub message: String,
}

/// `POST /search-availability`: echo the requested dates.
pub async fn post_availability(body: Bytes) -> String {
    let values = FormValues::parse(&body);
    format!(
        "start date is {} and end date is {}",
        values.get("start"),
        values.get("end")
    )
}

/// `POST /search-availability-json`
pub async fn availability_json() -> Result<Response> {
    let response = AvailabilityResponse {
        ok: false,
        message: "Available!".to_string(),
    };

    let body = serde_json::to_string_pretty(&response)
        .map_err(|e| Error::Internal(format!("Failed to encode availability: {e}")))?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
