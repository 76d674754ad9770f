//! Template cache construction.
//!
//! Pages are `*.page.tmpl` files and layouts are `*.layout.tmpl` files, both
//! directly inside the templates directory. Every page is compiled into its
//! own environment together with every layout, so a page can
//! `{% extends "base.layout.tmpl" %}` any of them.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment};
use serde::Serialize;

use super::helpers::register_filters;
use crate::error::{Error, Result};

const PAGE_SUFFIX: &str = ".page.tmpl";
const LAYOUT_SUFFIX: &str = ".layout.tmpl";

/// Page file name → compiled page.
pub type TemplateCache = HashMap<String, CompiledTemplate>;

/// A page compiled together with the full layout set.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    name: String,
    layouts: Vec<String>,
    env: Environment<'static>,
}

impl CompiledTemplate {
    /// The page's file name, e.g. `home.page.tmpl`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Layout file names merged into this page.
    #[must_use]
    pub fn layouts(&self) -> &[String] {
        &self.layouts
    }

    /// Execute the page against `ctx`.
    pub fn render<S: Serialize>(&self, ctx: S) -> Result<String> {
        self.env
            .get_template(&self.name)
            .and_then(|template| template.render(ctx))
            .map_err(|e| Error::template_render(&self.name, e))
    }
}

struct Source {
    name: String,
    path: PathBuf,
    text: String,
}

/// Compile every page in `dir` with every layout applied.
///
/// # Errors
///
/// [`Error::Io`] if the directory or a file cannot be read, and
/// [`Error::TemplateCompile`] if any page or layout fails to parse.
pub fn build_template_cache(dir: impl AsRef<Path>) -> Result<TemplateCache> {
    let dir = dir.as_ref();
    let pages = read_sources(dir, PAGE_SUFFIX)?;
    let layouts = read_sources(dir, LAYOUT_SUFFIX)?;
    let layout_names: Vec<String> = layouts.iter().map(|l| l.name.clone()).collect();

    let mut cache = TemplateCache::with_capacity(pages.len());
    for page in pages {
        let mut env = new_environment();

        env.add_template_owned(page.name.clone(), page.text)
            .map_err(|e| Error::template_compile(&page.path, e))?;

        for layout in &layouts {
            env.add_template_owned(layout.name.clone(), layout.text.clone())
                .map_err(|e| Error::template_compile(&layout.path, e))?;
        }

        cache.insert(
            page.name.clone(),
            CompiledTemplate {
                name: page.name,
                layouts: layout_names.clone(),
                env,
            },
        );
    }

    tracing::debug!(
        dir = %dir.display(),
        pages = cache.len(),
        layouts = layout_names.len(),
        "Template cache built"
    );

    Ok(cache)
}

fn new_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|name| {
        if name.ends_with(".tmpl") {
            AutoEscape::Html
        } else {
            AutoEscape::None
        }
    });
    register_filters(&mut env);
    env
}

/// Read every file in `dir` whose name ends with `suffix`, sorted by name.
fn read_sources(dir: &Path, suffix: &str) -> Result<Vec<Source>> {
    let mut sources = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.ends_with(suffix) {
            continue;
        }

        let name = name.to_string();
        let text = fs::read_to_string(&path)?;
        sources.push(Source { name, path, text });
    }

    sources.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(sources)
}
