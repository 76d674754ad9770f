//! Runtime template engine for the server-rendered pages.
//!
//! Templates are minijinja files read from the templates directory:
//!
//! - `*.page.tmpl`: one per page, keyed by file name (`home.page.tmpl`)
//! - `*.layout.tmpl`: shared chrome every page may extend
//!
//! ```html
//! <!-- templates/base.layout.tmpl -->
//! <!DOCTYPE html>
//! <html>
//!   <body>
//!     {% if flash %}<div class="alert alert-success">{{ flash }}</div>{% endif %}
//!     {% if error %}<div class="alert alert-danger">{{ error }}</div>{% endif %}
//!     {% block content %}{% endblock %}
//!   </body>
//! </html>
//! ```
//!
//! ```html
//! <!-- templates/about.page.tmpl -->
//! {% extends "base.layout.tmpl" %}
//! {% block content %}<p>{{ string_map.test }}</p>{% endblock %}
//! ```
//!
//! Handlers build a [`TemplateData`] and hand it to [`Renderer::render`],
//! which adds the pending flash messages and the CSRF token.

mod cache;
mod data;
mod helpers;
mod render;

pub use cache::{build_template_cache, CompiledTemplate, TemplateCache};
pub use data::TemplateData;
pub use helpers::{pluralize, register_filters, truncate};
pub use render::Renderer;
