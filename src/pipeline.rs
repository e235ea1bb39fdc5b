//! Build orchestration.
//!
//! A build runs these stages in order and stops at the first error:
//!
//! ```text
//! 1. Read inputs      entries/*, photos/*, templates/*.html
//! 2. Prepare output   clear build/ (keeping thumbnails/ when skipped)
//! 3. Thumbnails       build/thumbnails/{name}, parallel, joined
//! 4. Pages            build/index.html, blog.html, photos.html
//! 5. Articles         build/blog/{slug}.html
//! 6. Sitemap          build/sitemap.xml
//! 7. Assets           favicon, robots.txt, photos/, assets/
//! ```
//!
//! Every input is read and validated before anything is written, so a bad
//! entry or photo leaves the previous build untouched. Failures after that
//! point leave partial output on disk; the next run clears it.
//!
//! Progress is reported as [`BuildEvent`]s on an optional channel. The CLI
//! prints them; tests collect them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use minijinja::context;
use thiserror::Error;
use walkdir::WalkDir;

use crate::articles::{self, ArticleError};
use crate::config::{ConfigError, ResolvedPaths, SiteConfig};
use crate::imaging::{ImageBackend, RustBackend};
use crate::markdown::MarkdownOptions;
use crate::photos::{self, PhotoError, PhotoOptions};
use crate::sitemap::build_sitemap;
use crate::templates::{TemplateError, Templates};
use crate::thumbnails::{self, ThumbnailError, ThumbnailSettings};
use crate::types::{Article, Photo};

/// Output subdirectory holding thumbnails.
pub const THUMBNAILS_DIR: &str = "thumbnails";
/// Output subdirectory holding article pages.
pub const BLOG_DIR: &str = "blog";
/// Output subdirectory the photo originals are copied to.
pub const PHOTOS_DIR: &str = "photos";
/// Output subdirectory the static assets are copied to.
pub const ASSETS_DIR: &str = "assets";
pub const SITEMAP_FILE: &str = "sitemap.xml";

/// Top-level pages, rendered in this order.
const LISTING_PAGES: [&str; 3] = ["blog.html", "photos.html", "index.html"];
const ARTICLE_TEMPLATE: &str = "article.html";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Article error: {0}")]
    Article(#[from] ArticleError),
    #[error("Photo error: {0}")]
    Photo(#[from] PhotoError),
    #[error("{0}")]
    Template(#[from] TemplateError),
    #[error("{0}")]
    Thumbnail(#[from] ThumbnailError),
    #[error("Favicon not found: {}", .0.display())]
    MissingFavicon(PathBuf),
}

/// Per-run switches from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Leave `thumbnails/` as it is instead of regenerating it.
    pub skip_thumbnails: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ReadInputs,
    PrepareOutput,
    Thumbnails,
    Pages,
    Articles,
    Sitemap,
    Assets,
}

/// Progress reported while a build runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    StageStarted(Stage),
    InputsRead {
        articles: usize,
        photos: usize,
        templates: Vec<String>,
    },
    OutputPrepared {
        output: PathBuf,
        kept_thumbnails: bool,
    },
    ThumbnailWritten {
        name: String,
        width: u32,
        height: u32,
    },
    ThumbnailsSkipped,
    /// `path` is relative to the output directory.
    PageWritten {
        template: String,
        path: String,
    },
    SitemapWritten {
        urls: usize,
    },
    /// `dest` is relative to the output directory; directories end in `/`.
    AssetCopied {
        source: PathBuf,
        dest: String,
        files: usize,
    },
}

/// Everything a build reads before writing.
#[derive(Debug)]
pub struct Inputs {
    pub articles: Vec<Article>,
    pub photos: Vec<Photo>,
    pub templates: Templates,
}

/// Counts reported at the end of a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub output: PathBuf,
    pub articles: usize,
    pub photos: usize,
    /// `None` when thumbnails were skipped.
    pub thumbnails: Option<usize>,
    pub pages: usize,
    pub sitemap_urls: usize,
}

fn emit(events: Option<&Sender<BuildEvent>>, event: BuildEvent) {
    if let Some(tx) = events {
        tx.send(event).ok();
    }
}

/// Every page the build renders must have a template.
fn require_page_templates(templates: &Templates) -> Result<(), TemplateError> {
    for page in LISTING_PAGES.iter().chain(std::iter::once(&ARTICLE_TEMPLATE)) {
        if !templates.names().iter().any(|n| n == page) {
            return Err(TemplateError::Template(minijinja::Error::new(
                minijinja::ErrorKind::TemplateNotFound,
                format!("template {page:?} does not exist"),
            )));
        }
    }
    Ok(())
}

/// Read and validate every input. Writes nothing.
pub fn read_inputs(paths: &ResolvedPaths, config: &SiteConfig) -> Result<Inputs, BuildError> {
    let articles = articles::read_articles(&paths.entries, &MarkdownOptions::from(&config.markdown))?;
    let photos = photos::read_photos(&paths.photos, &PhotoOptions::from(&config.photos))?;
    let templates = Templates::load(&paths.templates, &paths.template_glob, &paths.root)?;
    require_page_templates(&templates)?;
    if !paths.favicon.is_file() {
        return Err(BuildError::MissingFavicon(paths.favicon.clone()));
    }
    log::info!(
        "read {} articles, {} photos, {} templates",
        articles.len(),
        photos.len(),
        templates.names().len()
    );
    Ok(Inputs {
        articles,
        photos,
        templates,
    })
}

/// Empty `output`, or create it. With `keep_thumbnails`, an existing
/// `thumbnails/` subdirectory survives. Returns whether one was kept.
pub fn prepare_output_dir(output: &Path, keep_thumbnails: bool) -> io::Result<bool> {
    if !output.exists() {
        fs::create_dir_all(output)?;
        return Ok(false);
    }

    let mut kept = false;
    for entry in fs::read_dir(output)? {
        let entry = entry?;
        if keep_thumbnails && entry.file_name() == THUMBNAILS_DIR && entry.file_type()?.is_dir() {
            kept = true;
            continue;
        }
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(kept)
}

/// Recursively copy `src` into `dst`. Returns the number of files copied.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<usize, BuildError> {
    let mut files = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        let rel = entry.path().strip_prefix(src).map_err(io::Error::other)?;
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            files += 1;
        }
    }
    Ok(files)
}

/// Copy one file into the output root under its own name.
fn copy_to_root(
    file: &Path,
    output: &Path,
    events: Option<&Sender<BuildEvent>>,
) -> Result<(), BuildError> {
    let name = crate::listing::file_name(file);
    fs::copy(file, output.join(&name))?;
    emit(
        events,
        BuildEvent::AssetCopied {
            source: file.to_path_buf(),
            dest: name,
            files: 1,
        },
    );
    Ok(())
}

/// Build the site under `root` with the pure Rust image backend.
pub fn build(
    root: &Path,
    config: &SiteConfig,
    options: &BuildOptions,
    events: Option<Sender<BuildEvent>>,
) -> Result<BuildSummary, BuildError> {
    build_with_backend(&RustBackend::new(), root, config, options, events)
}

/// Build with a specific image backend (allows testing with mock).
pub fn build_with_backend(
    backend: &impl ImageBackend,
    root: &Path,
    config: &SiteConfig,
    options: &BuildOptions,
    events: Option<Sender<BuildEvent>>,
) -> Result<BuildSummary, BuildError> {
    let events = events.as_ref();
    let paths = config.paths.resolve(root);
    let output = paths.output.as_path();

    // 1. Inputs
    emit(events, BuildEvent::StageStarted(Stage::ReadInputs));
    let inputs = read_inputs(&paths, config)?;
    emit(
        events,
        BuildEvent::InputsRead {
            articles: inputs.articles.len(),
            photos: inputs.photos.len(),
            templates: inputs.templates.names().to_vec(),
        },
    );

    // 2. Output directory
    emit(events, BuildEvent::StageStarted(Stage::PrepareOutput));
    let kept_thumbnails = prepare_output_dir(output, options.skip_thumbnails)?;
    emit(
        events,
        BuildEvent::OutputPrepared {
            output: output.to_path_buf(),
            kept_thumbnails,
        },
    );

    // 3. Thumbnails
    let thumbnails = if options.skip_thumbnails {
        emit(events, BuildEvent::ThumbnailsSkipped);
        None
    } else {
        emit(events, BuildEvent::StageStarted(Stage::Thumbnails));
        let thumbs_dir = output.join(THUMBNAILS_DIR);
        fs::create_dir_all(&thumbs_dir)?;
        let settings = ThumbnailSettings::from_config(&config.thumbnails, &config.processing);
        let written = thumbnails::generate_thumbnails(
            backend,
            &inputs.photos,
            &paths.photos,
            &thumbs_dir,
            &settings,
            events,
        )?;
        Some(written.len())
    };

    // 4. Listing pages
    emit(events, BuildEvent::StageStarted(Stage::Pages));
    let listing_contexts = [
        context! { articles => &inputs.articles },
        context! { photos => &inputs.photos },
        context! {},
    ];
    for (page, ctx) in LISTING_PAGES.into_iter().zip(listing_contexts) {
        inputs.templates.render(page, ctx, &output.join(page))?;
        emit(
            events,
            BuildEvent::PageWritten {
                template: page.to_string(),
                path: page.to_string(),
            },
        );
    }

    // 5. Article pages
    emit(events, BuildEvent::StageStarted(Stage::Articles));
    let blog_dir = output.join(BLOG_DIR);
    fs::create_dir_all(&blog_dir)?;
    for article in &inputs.articles {
        let file = format!("{}.html", article.slug);
        inputs
            .templates
            .render(ARTICLE_TEMPLATE, article, &blog_dir.join(&file))?;
        emit(
            events,
            BuildEvent::PageWritten {
                template: ARTICLE_TEMPLATE.to_string(),
                path: format!("{BLOG_DIR}/{file}"),
            },
        );
    }

    // 6. Sitemap
    emit(events, BuildEvent::StageStarted(Stage::Sitemap));
    let sitemap = build_sitemap(
        &config.host,
        &inputs.articles,
        &inputs.photos,
        config.sitemap.image_entries,
    );
    fs::write(output.join(SITEMAP_FILE), sitemap.to_xml())?;
    emit(
        events,
        BuildEvent::SitemapWritten {
            urls: sitemap.urls.len(),
        },
    );

    // 7. Static files
    emit(events, BuildEvent::StageStarted(Stage::Assets));
    copy_to_root(&paths.favicon, output, events)?;
    if paths.robots.is_file() {
        copy_to_root(&paths.robots, output, events)?;
    } else {
        log::debug!("no robots file at {}", paths.robots.display());
    }
    for (source, dest) in [(&paths.photos, PHOTOS_DIR), (&paths.assets, ASSETS_DIR)] {
        let files = copy_dir(source, &output.join(dest))?;
        emit(
            events,
            BuildEvent::AssetCopied {
                source: source.clone(),
                dest: format!("{dest}/"),
                files,
            },
        );
    }

    Ok(BuildSummary {
        output: output.to_path_buf(),
        articles: inputs.articles.len(),
        photos: inputs.photos.len(),
        thumbnails,
        pages: LISTING_PAGES.len() + inputs.articles.len(),
        sitemap_urls: sitemap.urls.len(),
    })
}

/// Read and validate everything a build would, without writing.
pub fn check(root: &Path, config: &SiteConfig) -> Result<Inputs, BuildError> {
    read_inputs(&config.paths.resolve(root), config)
}
