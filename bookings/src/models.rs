//! Domain types carried between requests.

use serde::{Deserialize, Serialize};

use crate::forms::Form;

/// A guest's reservation request.
///
/// Only ever lives in the session between the form post and the summary page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl Reservation {
    /// Session key the pending reservation is stored under.
    pub const SESSION_KEY: &'static str = "reservation";

    /// Copy the reservation fields out of a submitted form.
    #[must_use]
    pub fn from_form(form: &Form) -> Self {
        Self {
            first_name: form.get("first_name").to_string(),
            last_name: form.get("last_name").to_string(),
            email: form.get("email").to_string(),
            phone: form.get("phone").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::FormValues;

    #[test]
    fn test_from_form() {
        let values = FormValues::parse(b"first_name=John&last_name=Smith&email=j%40s.com&extra=1");
        let reservation = Reservation::from_form(&Form::new(values));

        assert_eq!(reservation.first_name, "John");
        assert_eq!(reservation.last_name, "Smith");
        assert_eq!(reservation.email, "j@s.com");
        assert_eq!(reservation.phone, "");
    }
}
