//! Blog entry reader.
//!
//! Every regular file in the entries directory is one article. The file
//! starts with a YAML front matter block, followed by the markdown body:
//!
//! ```text
//! ---
//! title: "Hello"
//! summary: "First post"
//! date: "2023-01-01"
//! tags: ["misc"]
//! ---
//! Body in **markdown**.
//! ```
//!
//! All four fields are required. Every problem in a file's front matter is
//! reported in one error so a broken entry can be fixed in one pass.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use thiserror::Error;

use crate::listing::{file_name, list_files};
use crate::markdown::{self, MarkdownOptions};
use crate::types::Article;

#[derive(Error, Debug)]
pub enum ArticleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{}: {reason}", .path.display())]
    FrontMatterBlock { path: PathBuf, reason: &'static str },
    #[error("{}: front matter is not valid YAML: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("{}: invalid front matter: {}", .path.display(), .problems.join("; "))]
    InvalidFrontMatter { path: PathBuf, problems: Vec<String> },
}

/// Required metadata of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: String,
    pub summary: String,
    pub date: String,
    pub tags: Vec<String>,
}

impl FrontMatter {
    /// Validate parsed YAML, collecting every problem instead of stopping at
    /// the first.
    pub fn from_value(value: &Value) -> Result<Self, Vec<String>> {
        let Value::Mapping(_) = value else {
            return Err(vec!["front matter must be a mapping of fields".to_string()]);
        };

        let mut problems = Vec::new();
        let title = string_field(value, "title", &mut problems);
        let summary = string_field(value, "summary", &mut problems);
        let date = string_field(value, "date", &mut problems);
        let tags = tags_field(value, &mut problems);

        if !problems.is_empty() {
            return Err(problems);
        }
        Ok(Self {
            title,
            summary,
            date,
            tags,
        })
    }
}

fn string_field(value: &Value, key: &str, problems: &mut Vec<String>) -> String {
    match value.get(key) {
        None | Some(Value::Null) => problems.push(format!("missing field `{key}`")),
        Some(Value::String(s)) => return s.clone(),
        Some(_) => problems.push(format!("field `{key}` must be a string")),
    }
    String::new()
}

fn tags_field(value: &Value, problems: &mut Vec<String>) -> Vec<String> {
    let items = match value.get("tags") {
        None | Some(Value::Null) => {
            problems.push("missing field `tags`".to_string());
            return Vec::new();
        }
        Some(Value::Sequence(items)) => items,
        Some(_) => {
            problems.push("field `tags` must be a list of strings".to_string());
            return Vec::new();
        }
    };
    let tags: Option<Vec<String>> = items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect();
    tags.unwrap_or_else(|| {
        problems.push("field `tags` must be a list of strings".to_string());
        Vec::new()
    })
}

/// Split a file into its front matter text and markdown body.
///
/// The first line must be `---`; the block ends at the next line that is
/// exactly `---`.
pub fn split_front_matter(content: &str) -> Result<(&str, &str), &'static str> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let Some(first_line_end) = content.find('\n') else {
        return Err("missing front matter block (expected a leading `---` line)");
    };
    if content[..first_line_end].trim_end() != "---" {
        return Err("missing front matter block (expected a leading `---` line)");
    }

    let block_start = first_line_end + 1;
    let mut offset = block_start;
    for line in content[block_start..].split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &content[block_start..offset];
            let body = &content[offset + line.len()..];
            return Ok((yaml, body));
        }
        offset += line.len();
    }
    Err("front matter block is never closed with `---`")
}

/// Slug of an entry: the file name with its extension removed.
///
/// ```
/// # use photoblog::articles::slug_from_file_name;
/// assert_eq!(slug_from_file_name("2023-01-01-post.md"), "2023-01-01-post");
/// ```
pub fn slug_from_file_name(name: &str) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => name[..dot].to_string(),
        _ => name.to_string(),
    }
}

/// Parse one entry file's contents into an [`Article`].
pub fn parse_article(
    path: &Path,
    content: &str,
    options: &MarkdownOptions,
) -> Result<Article, ArticleError> {
    let (yaml, body) =
        split_front_matter(content).map_err(|reason| ArticleError::FrontMatterBlock {
            path: path.to_path_buf(),
            reason,
        })?;
    let value: Value = serde_yaml::from_str(yaml).map_err(|source| ArticleError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    let front = FrontMatter::from_value(&value).map_err(|problems| {
        ArticleError::InvalidFrontMatter {
            path: path.to_path_buf(),
            problems,
        }
    })?;

    Ok(Article {
        slug: slug_from_file_name(&file_name(path)),
        tags: front.tags,
        title: front.title,
        summary: front.summary,
        date: front.date,
        html_body: markdown::render(body, options),
    })
}

/// Read every entry in `dir`, in file name order.
///
/// Stops at the first file that cannot be read or parsed.
pub fn read_articles(dir: &Path, options: &MarkdownOptions) -> Result<Vec<Article>, ArticleError> {
    let mut articles = Vec::new();
    for path in list_files(dir)? {
        let content = fs::read_to_string(&path)?;
        let article = parse_article(&path, &content, options)?;
        log::debug!("read article {} ({})", article.slug, path.display());
        articles.push(article);
    }
    Ok(articles)
}
