//! Application state management

use std::sync::Arc;

use crate::{config::Config, error::Result, handlers::PAGES, templates::Renderer};

/// Application state shared across handlers
///
/// Built once at startup. Cloning is cheap; everything sits behind `Arc`.
#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<Config>,
    renderer: Arc<Renderer>,
}

impl AppState {
    /// Load the templates named by `config` and build the state around them
    ///
    /// With `templates.use_cache` every page a route renders must already be
    /// in the cache, otherwise this fails with `TemplateNotFound`.
    pub fn new(config: Config) -> Result<Self> {
        let renderer = Renderer::from_config(&config)?;
        if renderer.use_cache() {
            renderer.require(PAGES)?;
        }
        Ok(Self::with_renderer(config, renderer))
    }

    /// Build state around an already constructed renderer
    pub fn with_renderer(config: Config, renderer: Renderer) -> Self {
        Self {
            config: Arc::new(config),
            renderer: Arc::new(renderer),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the page renderer
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_new_fails_without_templates_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.templates.dir = dir.path().join("nope");

        assert!(matches!(AppState::new(config), Err(Error::Io(_))));
    }

    fn config_for(dir: &tempfile::TempDir, use_cache: bool) -> Config {
        let mut config = Config::default();
        config.templates.dir = dir.path().to_path_buf();
        config.templates.use_cache = use_cache;
        config
    }

    #[test]
    fn test_new_loads_templates() {
        let dir = tempfile::TempDir::new().unwrap();
        for page in PAGES {
            std::fs::write(dir.path().join(page), *page).unwrap();
        }

        let state = AppState::new(config_for(&dir, true)).unwrap();
        assert!(state.renderer().use_cache());
        assert_eq!(state.renderer().pages().count(), PAGES.len());
    }

    #[test]
    fn test_cached_startup_fails_on_missing_page() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("home.page.tmpl"), "home").unwrap();

        let mut config = config_for(&dir, true);
        config.service.in_production = true;

        assert!(matches!(
            AppState::new(config),
            Err(Error::TemplateNotFound(name)) if name == "about.page.tmpl"
        ));
    }

    #[test]
    fn test_uncached_startup_allows_missing_pages() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("home.page.tmpl"), "home").unwrap();

        let state = AppState::new(config_for(&dir, false)).unwrap();
        assert_eq!(state.renderer().pages().collect::<Vec<_>>(), ["home.page.tmpl"]);
    }
}
