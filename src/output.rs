//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Entities (articles, photos) lead with their positional index and
//! identity; file paths and details follow as indented context lines.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! ==> Reading inputs
//!     2 articles, 3 photos, 4 templates
//! ==> Preparing output
//!     build (kept thumbnails/)
//! ==> Generating thumbnails
//!     a.jpg → thumbnails/a.jpg (200x150)
//! ==> Rendering pages
//!     blog.html → blog.html
//! ==> Rendering articles
//!     article.html → blog/2023-01-01-post.html
//! ==> Writing sitemap
//!     sitemap.xml (7 urls)
//! ==> Copying static files
//!     favicon.svg (1 file)
//!     photos/ (3 files)
//!
//! Built 2 articles, 3 photos, 3 thumbnails, 5 pages → build
//! ```
//!
//! ## Check
//!
//! ```text
//! Articles
//! 001 Hello world
//!     URL: /blog/2023-01-01-hello
//!     Date: 2023-01-01
//!     Tags: misc, travel
//!
//! Photos
//! 001 beach.jpg
//!     Tags: actually good
//!     Location: 40.500000, -3.750000
//!
//! Templates
//!     article.html
//!     blog.html
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::pipeline::{BuildEvent, BuildSummary, Inputs, Stage};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + title.
///
/// ```text
/// 001 Hello world
/// ```
fn entity_header(index: usize, title: &str) -> String {
    format!("{} {}", format_index(index), title)
}

/// Pluralize a count: `1 file`, `3 files`.
fn count(n: usize, singular: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {singular}s")
    }
}

// ============================================================================
// Build output
// ============================================================================

fn stage_title(stage: Stage) -> &'static str {
    match stage {
        Stage::ReadInputs => "Reading inputs",
        Stage::PrepareOutput => "Preparing output",
        Stage::Thumbnails => "Generating thumbnails",
        Stage::Pages => "Rendering pages",
        Stage::Articles => "Rendering articles",
        Stage::Sitemap => "Writing sitemap",
        Stage::Assets => "Copying static files",
    }
}

/// Format a single build progress event as display lines.
pub fn format_build_event(event: &BuildEvent) -> Vec<String> {
    match event {
        BuildEvent::StageStarted(stage) => vec![format!("==> {}", stage_title(*stage))],
        BuildEvent::InputsRead {
            articles,
            photos,
            templates,
        } => vec![format!(
            "{}{}, {}, {}",
            indent(1),
            count(*articles, "article"),
            count(*photos, "photo"),
            count(templates.len(), "template")
        )],
        BuildEvent::OutputPrepared {
            output,
            kept_thumbnails,
        } => {
            let note = if *kept_thumbnails {
                " (kept thumbnails/)"
            } else {
                ""
            };
            vec![format!("{}{}{}", indent(1), output.display(), note)]
        }
        BuildEvent::ThumbnailWritten {
            name,
            width,
            height,
        } => vec![format!(
            "{}{} → thumbnails/{} ({}x{})",
            indent(1),
            name,
            name,
            width,
            height
        )],
        BuildEvent::ThumbnailsSkipped => vec!["==> Skipping thumbnails".to_string()],
        BuildEvent::PageWritten { template, path } => {
            vec![format!("{}{} → {}", indent(1), template, path)]
        }
        BuildEvent::SitemapWritten { urls } => {
            vec![format!("{}sitemap.xml ({})", indent(1), count(*urls, "url"))]
        }
        BuildEvent::AssetCopied { dest, files, .. } => {
            vec![format!("{}{} ({})", indent(1), dest, count(*files, "file"))]
        }
    }
}

/// Format the closing summary of a build.
pub fn format_summary(summary: &BuildSummary) -> Vec<String> {
    let thumbnails = match summary.thumbnails {
        Some(n) => count(n, "thumbnail"),
        None => "thumbnails skipped".to_string(),
    };
    vec![
        String::new(),
        format!(
            "Built {}, {}, {}, {} → {}",
            count(summary.articles, "article"),
            count(summary.photos, "photo"),
            thumbnails,
            count(summary.pages, "page"),
            summary.output.display()
        ),
    ]
}

pub fn print_summary(summary: &BuildSummary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format the inventory of everything a build would read.
pub fn format_check_output(inputs: &Inputs) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Articles".to_string());
    for (i, article) in inputs.articles.iter().enumerate() {
        lines.push(entity_header(i + 1, &article.title));
        lines.push(format!("{}URL: /blog/{}", indent(1), article.slug));
        lines.push(format!("{}Date: {}", indent(1), article.date));
        if !article.tags.is_empty() {
            lines.push(format!("{}Tags: {}", indent(1), article.tags.join(", ")));
        }
    }

    lines.push(String::new());
    lines.push("Photos".to_string());
    for (i, photo) in inputs.photos.iter().enumerate() {
        lines.push(entity_header(i + 1, &photo.name));
        if !photo.tags.is_empty() {
            lines.push(format!("{}Tags: {}", indent(1), photo.tags.join(", ")));
        }
        if photo.has_location() {
            lines.push(format!(
                "{}Location: {:.6}, {:.6}",
                indent(1),
                photo.latitude,
                photo.longitude
            ));
        }
    }

    lines.push(String::new());
    lines.push("Templates".to_string());
    for name in inputs.templates.names() {
        lines.push(format!("{}{}", indent(1), name));
    }

    lines
}

pub fn print_check_output(inputs: &Inputs) {
    for line in format_check_output(inputs) {
        println!("{}", line);
    }
}
