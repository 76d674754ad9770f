//! Page rendering.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use axum::response::Html;
use tower_sessions::Session;

use super::cache::{build_template_cache, TemplateCache};
use super::data::TemplateData;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::session::{CsrfToken, FlashMessages};

/// Renders pages from a template cache.
///
/// With `use_cache` the cache built at startup is shared by every request.
/// Without it the templates directory is re-read on each render, so edits show
/// up without a restart.
#[derive(Debug, Clone)]
pub struct Renderer {
    dir: PathBuf,
    use_cache: bool,
    cache: Arc<TemplateCache>,
    csrf_token_length: usize,
}

impl Renderer {
    #[must_use]
    pub fn new(
        dir: impl Into<PathBuf>,
        use_cache: bool,
        cache: TemplateCache,
        csrf_token_length: usize,
    ) -> Self {
        Self {
            dir: dir.into(),
            use_cache,
            cache: Arc::new(cache),
            csrf_token_length,
        }
    }

    /// Build the startup cache from `config.templates` and wrap it.
    ///
    /// The cache is built even when `use_cache` is off so broken templates
    /// fail at boot.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = build_template_cache(&config.templates.dir)?;
        tracing::info!(
            dir = %config.templates.dir.display(),
            pages = cache.len(),
            use_cache = config.templates.use_cache,
            "Templates loaded"
        );

        Ok(Self::new(
            config.templates.dir.clone(),
            config.templates.use_cache,
            cache,
            config.session.csrf.token_length,
        ))
    }

    #[must_use]
    pub fn use_cache(&self) -> bool {
        self.use_cache
    }

    /// Names of the pages in the startup cache.
    pub fn pages(&self) -> impl Iterator<Item = &str> {
        self.cache.keys().map(String::as_str)
    }

    /// Fail with [`Error::TemplateNotFound`] for the first of `pages` missing
    /// from the startup cache.
    pub fn require(&self, pages: &[&str]) -> Result<()> {
        match pages.iter().find(|name| !self.cache.contains_key(**name)) {
            Some(name) => {
                tracing::error!(
                    template = %name,
                    dir = %self.dir.display(),
                    "Required template missing"
                );
                Err(Error::TemplateNotFound((*name).to_string()))
            }
            None => Ok(()),
        }
    }

    /// Render `name` with `data` into an HTML body.
    pub async fn render(&self, session: &Session, name: &str, data: TemplateData) -> Result<Html<String>> {
        self.execute(session, name, data).await.map(Html)
    }

    /// Render `name` with `data` and write the result to `out`.
    ///
    /// Nothing is written unless execution succeeds. A failed write is
    /// reported as [`Error::OutputWrite`].
    pub async fn render_to<W: Write>(
        &self,
        out: &mut W,
        session: &Session,
        name: &str,
        data: TemplateData,
    ) -> Result<()> {
        let body = self.execute(session, name, data).await?;
        out.write_all(body.as_bytes()).map_err(|e| {
            tracing::warn!(template = %name, "Failed to write rendered page: {}", e);
            Error::OutputWrite(e)
        })
    }

    async fn execute(&self, session: &Session, name: &str, mut data: TemplateData) -> Result<String> {
        let fresh;
        let cache = if self.use_cache {
            self.cache.as_ref()
        } else {
            fresh = self.rebuild().await?;
            &fresh
        };

        // Look up before touching the session so a bad name leaves messages pending.
        let Some(template) = cache.get(name) else {
            tracing::error!(template = %name, cached = self.use_cache, "Template not found");
            return Err(Error::TemplateNotFound(name.to_string()));
        };

        self.add_default_data(&mut data, session).await?;

        tracing::debug!(template = %name, cached = self.use_cache, "Rendering template");
        let body = template.render(&data)?;

        // Messages are consumed only once a page showing them exists.
        FlashMessages::clear(session).await?;
        Ok(body)
    }

    async fn rebuild(&self) -> Result<TemplateCache> {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || build_template_cache(dir))
            .await
            .map_err(|e| Error::Internal(format!("Template rebuild task failed: {e}")))?
    }

    /// Attach the pending one-shot messages and the session's CSRF token.
    async fn add_default_data(&self, data: &mut TemplateData, session: &Session) -> Result<()> {
        data.set_messages(FlashMessages::peek(session).await?);
        let token = CsrfToken::get_or_create(session, self.csrf_token_length).await?;
        data.set_csrf_token(token.into_inner());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{FlashKind, MemoryStore};
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("base.layout.tmpl"),
            "[{{ flash }}|{{ error }}]{% block content %}{% endblock %}",
        )
        .unwrap();
        fs::write(
            dir.path().join("home.page.tmpl"),
            r#"{% extends "base.layout.tmpl" %}{% block content %}{{ string_map.test }}:{{ csrf_token }}{% endblock %}"#,
        )
        .unwrap();
        dir
    }

    fn renderer(dir: &TempDir, use_cache: bool) -> Renderer {
        let cache = build_template_cache(dir.path()).unwrap();
        Renderer::new(dir.path(), use_cache, cache, 8)
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "client went away"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_require_reports_first_missing_page() {
        let dir = site();
        let renderer = renderer(&dir, true);

        assert!(renderer.require(&["home.page.tmpl"]).is_ok());
        assert!(matches!(
            renderer.require(&["home.page.tmpl", "contact.page.tmpl", "about.page.tmpl"]),
            Err(Error::TemplateNotFound(name)) if name == "contact.page.tmpl"
        ));
    }

    #[tokio::test]
    async fn test_render_injects_defaults() {
        let dir = site();
        let renderer = renderer(&dir, true);
        let session = session();
        FlashMessages::put(&session, FlashKind::Flash, "saved").await.unwrap();

        let data = TemplateData::new().with_string("test", "hello");
        let Html(body) = renderer.render(&session, "home.page.tmpl", data).await.unwrap();

        let token = CsrfToken::get_or_create(&session, 8).await.unwrap();
        assert_eq!(body, format!("[saved|]hello:{}", token.token()));
    }

    #[tokio::test]
    async fn test_flash_shown_once() {
        let dir = site();
        let renderer = renderer(&dir, true);
        let session = session();
        FlashMessages::put(&session, FlashKind::Error, "nope").await.unwrap();

        let Html(first) = renderer
            .render(&session, "home.page.tmpl", TemplateData::new())
            .await
            .unwrap();
        assert!(first.starts_with("[|nope]"));

        let Html(second) = renderer
            .render(&session, "home.page.tmpl", TemplateData::new())
            .await
            .unwrap();
        assert!(second.starts_with("[|]"));
    }

    #[tokio::test]
    async fn test_unknown_template_writes_nothing() {
        let dir = site();
        let renderer = renderer(&dir, true);
        let session = session();
        FlashMessages::put(&session, FlashKind::Flash, "pending").await.unwrap();

        let mut out = Vec::new();
        let result = renderer
            .render_to(&mut out, &session, "missing.page.tmpl", TemplateData::new())
            .await;

        assert!(matches!(result, Err(Error::TemplateNotFound(name)) if name == "missing.page.tmpl"));
        assert!(out.is_empty());

        let messages = FlashMessages::take(&session).await.unwrap();
        assert_eq!(messages.flash, "pending");
    }

    #[tokio::test]
    async fn test_failed_render_keeps_messages() {
        let dir = site();
        fs::write(
            dir.path().join("broken.page.tmpl"),
            "{{ flash }}{{ no_such_function() }}",
        )
        .unwrap();
        let renderer = renderer(&dir, true);
        let session = session();
        FlashMessages::put(&session, FlashKind::Flash, "pending").await.unwrap();

        let result = renderer
            .render(&session, "broken.page.tmpl", TemplateData::new())
            .await;
        assert!(matches!(result, Err(Error::TemplateRender { .. })));

        let Html(body) = renderer
            .render(&session, "home.page.tmpl", TemplateData::new())
            .await
            .unwrap();
        assert!(body.starts_with("[pending|]"));
    }

    #[tokio::test]
    async fn test_render_to_writer() {
        let dir = site();
        let renderer = renderer(&dir, true);

        let mut out = Vec::new();
        renderer
            .render_to(&mut out, &session(), "home.page.tmpl", TemplateData::new())
            .await
            .unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("[|]:"));
    }

    #[tokio::test]
    async fn test_failed_write_is_output_error() {
        let dir = site();
        let renderer = renderer(&dir, true);

        let result = renderer
            .render_to(&mut BrokenPipe, &session(), "home.page.tmpl", TemplateData::new())
            .await;
        assert!(matches!(result, Err(Error::OutputWrite(_))));
    }

    #[tokio::test]
    async fn test_cached_mode_ignores_new_files() {
        let dir = site();
        let renderer = renderer(&dir, true);
        fs::write(dir.path().join("late.page.tmpl"), "late").unwrap();

        let result = renderer
            .render(&session(), "late.page.tmpl", TemplateData::new())
            .await;
        assert!(matches!(result, Err(Error::TemplateNotFound(_))));
    }

    #[tokio::test]
    async fn test_uncached_mode_picks_up_edits() {
        let dir = site();
        let renderer = renderer(&dir, false);
        fs::write(dir.path().join("late.page.tmpl"), "late {{ int_map.n }}").unwrap();

        let Html(body) = renderer
            .render(&session(), "late.page.tmpl", TemplateData::new().with_int("n", 4))
            .await
            .unwrap();
        assert_eq!(body, "late 4");
    }
}
