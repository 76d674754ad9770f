//! Request handlers
//!
//! Pages render through the shared [`Renderer`](crate::templates::Renderer);
//! the reservation flow hands its data between requests through the session.

pub mod availability;
pub mod pages;
pub mod reservation;

pub use availability::{availability_json, post_availability, AvailabilityResponse};
pub use pages::{
    about, contact, generals, home, majors, search_availability, ClientIp, REMOTE_IP_KEY,
};
pub use reservation::{make_reservation, post_reservation, reservation_summary};

/// Every page a route renders. A production cache must hold all of them.
pub const PAGES: &[&str] = &[
    pages::HOME_PAGE,
    pages::ABOUT_PAGE,
    pages::GENERALS_PAGE,
    pages::MAJORS_PAGE,
    pages::SEARCH_PAGE,
    pages::CONTACT_PAGE,
    reservation::FORM_PAGE,
    reservation::SUMMARY_PAGE,
];
