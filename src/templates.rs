//! Template rendering with minijinja.
//!
//! Templates are site content, not code: every file in the template
//! directory matching `paths.template_glob` is loaded at startup under its
//! file name, so templates can `{% include %}` or `{% extends %}` each other.
//!
//! ## Pages
//!
//! | Template | Context | Output |
//! |---|---|---|
//! | `index.html` | empty | `index.html` |
//! | `blog.html` | `articles` | `blog.html` |
//! | `photos.html` | `photos` | `photos.html` |
//! | `article.html` | the article's fields | `blog/{slug}.html` |
//!
//! Output is not auto-escaped (article bodies are already HTML), and
//! referencing an undefined variable is an error rather than an empty string.
//!
//! ## Helpers
//!
//! `embed_svg(source)` inlines an SVG as a `data:` URI, e.g. for a favicon
//! `<link rel="icon" href="{{ embed_svg("assets/favicon.svg") }}">`. Local
//! sources are relative to the project root; `http(s)://` sources are
//! fetched and must answer `200 OK`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior};
use serde::Serialize;
use thiserror::Error;

use crate::listing::file_name;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid template pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("Template listing error: {0}")]
    Glob(#[from] glob::GlobError),
    #[error("No templates match {pattern}")]
    NoTemplates { pattern: String },
    #[error("Template error: {0:#}")]
    Template(#[from] minijinja::Error),
    #[error("Fetching {url} failed: {source}")]
    Fetch { url: String, source: reqwest::Error },
    #[error("Fetching {url} returned HTTP {status}")]
    FetchStatus { url: String, status: u16 },
}

/// Wrap SVG markup into a `data:` URI usable in `src`/`href` attributes.
///
/// Newlines are removed and `#` is percent-encoded; everything else is kept
/// verbatim.
pub fn svg_data_uri(svg: &str) -> String {
    let inline = svg.replace('\n', "").replace('#', "%23");
    format!("data:image/svg+xml;charset=utf-8,{inline}")
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

fn fetch_svg(url: &str) -> Result<String, TemplateError> {
    let fetch_err = |source| TemplateError::Fetch {
        url: url.to_string(),
        source,
    };
    let response = reqwest::blocking::get(url).map_err(fetch_err)?;
    if response.status() != reqwest::StatusCode::OK {
        return Err(TemplateError::FetchStatus {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }
    response.text().map_err(fetch_err)
}

/// Read an SVG from disk (relative to `root`) or over HTTP.
pub fn load_svg(source: &str, root: &Path) -> Result<String, TemplateError> {
    if is_remote(source) {
        log::debug!("fetching svg {source}");
        fetch_svg(source)
    } else {
        Ok(fs::read_to_string(root.join(source))?)
    }
}

/// The loaded template set.
pub struct Templates {
    env: Environment<'static>,
    names: Vec<String>,
}

impl std::fmt::Debug for Templates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Templates")
            .field("names", &self.names)
            .finish()
    }
}

impl Templates {
    /// Load every file in `dir` matching `pattern`.
    ///
    /// `svg_root` is the directory `embed_svg` resolves local paths against.
    pub fn load(dir: &Path, pattern: &str, svg_root: &Path) -> Result<Self, TemplateError> {
        let full_pattern = dir.join(pattern);
        let full_pattern = full_pattern.to_string_lossy();

        let mut sources = Vec::new();
        for path in glob::glob(&full_pattern)? {
            let path = path?;
            if path.is_file() {
                let source = fs::read_to_string(&path)?;
                sources.push((file_name(&path), source));
            }
        }
        if sources.is_empty() {
            return Err(TemplateError::NoTemplates {
                pattern: full_pattern.into_owned(),
            });
        }
        Self::from_sources(sources, svg_root.to_path_buf())
    }

    /// Build from in-memory `(name, source)` pairs.
    pub fn from_sources(
        sources: Vec<(String, String)>,
        svg_root: PathBuf,
    ) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_function("embed_svg", move |source: String| {
            load_svg(&source, &svg_root)
                .map(|svg| svg_data_uri(&svg))
                .map_err(|e| minijinja::Error::new(ErrorKind::InvalidOperation, e.to_string()))
        });

        let mut names = Vec::with_capacity(sources.len());
        for (name, source) in sources {
            env.add_template_owned(name.clone(), source)?;
            names.push(name);
        }
        log::debug!("loaded templates: {names:?}");
        Ok(Self { env, names })
    }

    /// Names of the loaded templates, in load order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Render `name` against `ctx` into a string.
    pub fn render_to_string<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, TemplateError> {
        Ok(self.env.get_template(name)?.render(ctx)?)
    }

    /// Render `name` against `ctx` into the file `dest`, replacing it.
    pub fn render<S: Serialize>(&self, name: &str, ctx: S, dest: &Path) -> Result<(), TemplateError> {
        let template = self.env.get_template(name)?;
        let mut writer = BufWriter::new(File::create(dest)?);
        template.render_to_write(ctx, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
