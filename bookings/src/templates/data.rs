//! Per-render template payload.

use std::collections::HashMap;

use minijinja::Value;
use serde::Serialize;

use crate::forms::Form;
use crate::session::FlashMessages;

/// Everything a page template can read.
///
/// Handlers fill the typed maps and `data`; the renderer fills `csrf_token`
/// and the one-shot messages just before execution.
///
/// ```rust
/// use bookings::templates::TemplateData;
///
/// let data = TemplateData::new()
///     .with_string("test", "Hello, again.")
///     .with_int("rooms", 2);
///
/// assert_eq!(data.string_map["test"], "Hello, again.");
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateData {
    pub string_map: HashMap<String, String>,
    pub int_map: HashMap<String, i64>,
    pub float_map: HashMap<String, f64>,
    /// Arbitrary structured values, e.g. the reservation being edited.
    pub data: HashMap<String, Value>,
    pub csrf_token: String,
    pub flash: String,
    pub warning: String,
    pub error: String,
    pub form: Option<Form>,
}

impl TemplateData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.string_map.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_int(mut self, key: impl Into<String>, value: i64) -> Self {
        self.int_map.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn with_float(mut self, key: impl Into<String>, value: f64) -> Self {
        self.float_map.insert(key.into(), value);
        self
    }

    /// Add any serializable value under `data.<key>`.
    #[must_use]
    pub fn with_data<T: Serialize>(mut self, key: impl Into<String>, value: &T) -> Self {
        self.data.insert(key.into(), Value::from_serialize(value));
        self
    }

    #[must_use]
    pub fn with_form(mut self, form: Form) -> Self {
        self.form = Some(form);
        self
    }

    /// Overwrite the reserved message fields with what was popped from the session.
    pub fn set_messages(&mut self, messages: FlashMessages) {
        self.flash = messages.flash;
        self.warning = messages.warning;
        self.error = messages.error;
    }

    pub fn set_csrf_token(&mut self, token: impl Into<String>) {
        self.csrf_token = token.into();
    }
}
