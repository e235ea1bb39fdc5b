//! # photoblog
//!
//! A small static site generator for a personal site made of a markdown blog
//! and a photo gallery. The project directory is the data source: markdown
//! entries become article pages, photos become a gallery with thumbnails, and
//! user templates shape every page.
//!
//! # Architecture: One Sequential Build
//!
//! ```text
//! entries/*.md   ─┐
//! photos/*       ─┼─ read + validate ─→ thumbnails ─→ pages ─→ sitemap ─→ assets
//! templates/*    ─┘   (nothing written      (parallel,
//!                      until all pass)        joined)
//! ```
//!
//! All inputs are read and validated before the output directory is touched.
//! Thumbnail generation is the only parallel step; it joins before any page
//! is rendered.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Orchestrates the build stages and reports progress events |
//! | [`articles`] | Front matter validation and entry → [`types::Article`] |
//! | [`markdown`] | CommonMark rendering with figure and emoji extensions |
//! | [`photos`] | Size limit, EXIF decoding and priority sort → [`types::Photo`] |
//! | [`metadata`] | EXIF helpers: GPS coordinates, `XPKeywords`, orientation |
//! | [`templates`] | minijinja template set with the `embed_svg` helper |
//! | [`thumbnails`] | Bounded parallel thumbnail jobs with collected failures |
//! | [`imaging`] | Pure-Rust pixel work behind the [`imaging::ImageBackend`] trait |
//! | [`sitemap`] | Deterministic sitemap XML |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation |
//! | [`types`] | Records shared by readers, templates and the sitemap |
//! | [`output`] | CLI output formatting for build progress and `check` |
//!
//! # Design Decisions
//!
//! ## Runtime Templates
//!
//! Pages are rendered with [minijinja](https://docs.rs/minijinja) from a
//! template directory that belongs to the site, not to the binary. Output is
//! not auto-escaped because article bodies are already HTML; undefined
//! variables are errors so a typo in a template fails the build instead of
//! rendering an empty string.
//!
//! ## Fail Fast, Except Thumbnails
//!
//! Any read or parse error ends the run. Thumbnail jobs are the exception in
//! one respect: every job finishes before the build decides, and all
//! failures are reported together.
//!
//! ## Deterministic Output
//!
//! Directory listings are sorted, the photo sort is stable, and the sitemap
//! carries no timestamps. Two builds of the same inputs produce the same
//! files.

pub mod articles;
pub mod config;
pub mod imaging;
mod listing;
pub mod markdown;
pub mod metadata;
pub mod output;
pub mod photos;
pub mod pipeline;
pub mod sitemap;
pub mod templates;
pub mod thumbnails;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
