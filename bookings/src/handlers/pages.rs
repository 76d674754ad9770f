//! Informational pages

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts, State},
    http::request::Parts,
    response::Html,
};
use tower_sessions::Session;

use crate::{
    error::Result,
    session::SessionExt,
    state::AppState,
    templates::TemplateData,
};

/// Session key holding the address the visitor first arrived from
pub const REMOTE_IP_KEY: &str = "remote_ip";

pub const HOME_PAGE: &str = "home.page.tmpl";
pub const ABOUT_PAGE: &str = "about.page.tmpl";
pub const GENERALS_PAGE: &str = "generals.page.tmpl";
pub const MAJORS_PAGE: &str = "majors.page.tmpl";
pub const SEARCH_PAGE: &str = "search-availability.page.tmpl";
pub const CONTACT_PAGE: &str = "contact.page.tmpl";

/// The client's IP address, or `"unknown"` when the server was not started
/// with connect info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Ok(Self(ip))
    }
}

/// `GET /`: remember where the visitor came from.
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    ClientIp(ip): ClientIp,
) -> Result<Html<String>> {
    session.put(REMOTE_IP_KEY, &ip).await?;

    state
        .renderer()
        .render(&session, HOME_PAGE, TemplateData::new())
        .await
}

/// `GET /about`
pub async fn about(State(state): State<AppState>, session: Session) -> Result<Html<String>> {
    let remote_ip: String = session.get_as(REMOTE_IP_KEY).await?.unwrap_or_default();

    let data = TemplateData::new()
        .with_string("test", "Hello, again.")
        .with_string(REMOTE_IP_KEY, remote_ip);

    state.renderer().render(&session, ABOUT_PAGE, data).await
}

/// `GET /generals-quarters`
pub async fn generals(State(state): State<AppState>, session: Session) -> Result<Html<String>> {
    state
        .renderer()
        .render(&session, GENERALS_PAGE, TemplateData::new())
        .await
}

/// `GET /majors-suite`
pub async fn majors(State(state): State<AppState>, session: Session) -> Result<Html<String>> {
    state
        .renderer()
        .render(&session, MAJORS_PAGE, TemplateData::new())
        .await
}

/// `GET /search-availability`
pub async fn search_availability(
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>> {
    state
        .renderer()
        .render(&session, SEARCH_PAGE, TemplateData::new())
        .await
}

/// `GET /contact`
pub async fn contact(State(state): State<AppState>, session: Session) -> Result<Html<String>> {
    state
        .renderer()
        .render(&session, CONTACT_PAGE, TemplateData::new())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};

    #[tokio::test]
    async fn test_client_ip_from_connect_info() {
        let mut request = Request::get("/").body(Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 7], 51234))));
        let (mut parts, _) = request.into_parts();

        let ClientIp(ip) = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ip, "10.0.0.7");
    }

    #[tokio::test]
    async fn test_client_ip_unknown_without_connect_info() {
        let (mut parts, _) = Request::get("/").body(Body::empty()).unwrap().into_parts();

        let ClientIp(ip) = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ip, "unknown");
    }
}
