//! Form parsing and validation.
//!
//! A [`Form`] wraps the submitted fields together with an [`Errors`]
//! accumulator. Each rule appends to the accumulator instead of failing fast,
//! so one pass reports every problem and the form can be re-rendered with the
//! user's input intact.
//!
//! ```rust
//! use bookings::forms::{Form, FormValues};
//!
//! let values = FormValues::parse(b"first_name=Jo&email=jo%40example.com");
//! let mut form = Form::new(values);
//! form.required(&["first_name", "last_name", "email"]);
//! form.min_length("first_name", 3);
//! form.is_email("email");
//!
//! assert!(!form.valid());
//! assert_eq!(form.errors().get("last_name"), Some("This field cannot be blank"));
//! assert!(form.errors().get("email").is_none());
//! ```

mod errors;

pub use errors::Errors;

use std::sync::LazyLock;

use regex::Regex;
use serde::{ser::SerializeMap, Serialize, Serializer};

const BLANK: &str = "This field cannot be blank";
const INVALID_EMAIL: &str = "Invalid email address";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$"#,
    )
    .expect("email pattern is valid")
});

/// Submitted form fields, in submission order.
///
/// A field may carry several values; accessors return the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues(Vec<(String, Vec<String>)>);

impl FormValues {
    /// Decode an `application/x-www-form-urlencoded` body.
    #[must_use]
    pub fn parse(body: &[u8]) -> Self {
        let mut values = Self::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            values.add(&key, value.into_owned());
        }
        values
    }

    /// Append a value for `field`.
    pub fn add(&mut self, field: &str, value: impl Into<String>) {
        match self.0.iter_mut().find(|(name, _)| name == field) {
            Some((_, values)) => values.push(value.into()),
            None => self.0.push((field.to_string(), vec![value.into()])),
        }
    }

    /// First value for `field`, or `""` when it was not submitted.
    #[must_use]
    pub fn get(&self, field: &str) -> &str {
        self.all(field).first().map(String::as_str).unwrap_or("")
    }

    /// Every value submitted for `field`.
    #[must_use]
    pub fn all(&self, field: &str) -> &[String] {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::default();
        for (key, value) in iter {
            values.add(&key.into(), value);
        }
        values
    }
}

// Templates only ever need the first value, so expose a flat field -> value map.
impl Serialize for FormValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, values) in &self.0 {
            map.serialize_entry(name, values.first().map(String::as_str).unwrap_or(""))?;
        }
        map.end()
    }
}

/// A submission under validation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Form {
    values: FormValues,
    errors: Errors,
}

impl Form {
    /// Start validating `values` with no errors recorded.
    #[must_use]
    pub fn new(values: FormValues) -> Self {
        Self {
            values,
            errors: Errors::default(),
        }
    }

    /// First submitted value for `field`, or `""`.
    #[must_use]
    pub fn get(&self, field: &str) -> &str {
        self.values.get(field)
    }

    #[must_use]
    pub fn values(&self) -> &FormValues {
        &self.values
    }

    #[must_use]
    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    /// True iff no rule has failed.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Flag each field whose trimmed value is empty.
    pub fn required(&mut self, fields: &[&str]) {
        for field in fields {
            if self.values.get(field).trim().is_empty() {
                self.errors.add(field, BLANK);
            }
        }
    }

    /// Whether `field` has a non-empty value. Records a blank error when it does not.
    pub fn has(&mut self, field: &str) -> bool {
        if self.values.get(field).is_empty() {
            self.errors.add(field, BLANK);
            return false;
        }
        true
    }

    /// Whether `field` is at least `minimum` characters long.
    ///
    /// Counts `char`s, so multi-byte input is not penalised.
    pub fn min_length(&mut self, field: &str, minimum: usize) -> bool {
        if self.values.get(field).chars().count() < minimum {
            self.errors.add(
                field,
                format!("This field must be at least {minimum} characters long"),
            );
            return false;
        }
        true
    }

    /// Whether `field` looks like `local@domain.tld`.
    pub fn is_email(&mut self, field: &str) -> bool {
        if !EMAIL_RE.is_match(self.values.get(field)) {
            self.errors.add(field, INVALID_EMAIL);
            return false;
        }
        true
    }
}
