//! Sitemap generation.
//!
//! One `<url>` per page the site serves, in a fixed order so that unchanged
//! inputs give a byte-identical file:
//!
//! 1. `/`, `/blog`, `/photos` (the photos page optionally lists every photo
//!    as a nested `image:image`)
//! 2. `/blog/{slug}` per article
//! 3. `/photos/{name}` per photo
//!
//! Locations are absolute, with slugs and file names percent-encoded as
//! path segments. No `lastmod` is written.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::types::{Article, Photo};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const IMAGE_NS: &str = "http://www.google.com/schemas/sitemap-image/1.1";

/// Characters escaped in a URL path segment (RFC 3986 `pchar` complement).
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

fn segment(s: &str) -> String {
    utf8_percent_encode(s, PATH_SEGMENT).to_string()
}

/// A sitemap URL entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapUrl {
    /// Absolute URL.
    pub loc: String,
    /// Absolute image URLs shown on this page.
    pub images: Vec<String>,
}

impl SitemapUrl {
    fn page(loc: String) -> Self {
        Self {
            loc,
            images: Vec::new(),
        }
    }
}

/// An ordered list of site URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sitemap {
    pub urls: Vec<SitemapUrl>,
}

/// Build the sitemap for a site served from `host`.
pub fn build_sitemap(
    host: &str,
    articles: &[Article],
    photos: &[Photo],
    image_entries: bool,
) -> Sitemap {
    let host = host.trim_end_matches('/');
    let url = |path: &str| format!("{host}{path}");

    let mut urls = Vec::with_capacity(3 + articles.len() + photos.len());
    urls.push(SitemapUrl::page(url("/")));
    urls.push(SitemapUrl::page(url("/blog")));
    urls.push(SitemapUrl {
        loc: url("/photos"),
        images: if image_entries {
            photos
                .iter()
                .map(|p| url(&format!("/photos/{}", segment(&p.name))))
                .collect()
        } else {
            Vec::new()
        },
    });
    urls.extend(
        articles
            .iter()
            .map(|a| SitemapUrl::page(url(&format!("/blog/{}", segment(&a.slug))))),
    );
    urls.extend(
        photos
            .iter()
            .map(|p| SitemapUrl::page(url(&format!("/photos/{}", segment(&p.name))))),
    );

    Sitemap { urls }
}

impl Sitemap {
    /// Serialize as sitemap XML.
    pub fn to_xml(&self) -> String {
        let with_images = self.urls.iter().any(|u| !u.images.is_empty());

        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}""#));
        if with_images {
            xml.push_str(&format!(r#" xmlns:image="{IMAGE_NS}""#));
        }
        xml.push_str(">\n");

        for url in &self.urls {
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&url.loc)));
            for image in &url.images {
                xml.push_str("    <image:image>\n");
                xml.push_str(&format!(
                    "      <image:loc>{}</image:loc>\n",
                    escape_xml(image)
                ));
                xml.push_str("    </image:image>\n");
            }
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }
}

/// Escape XML special characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NO_LOCATION;

    fn article(slug: &str) -> Article {
        Article {
            slug: slug.to_string(),
            tags: Vec::new(),
            title: slug.to_string(),
            summary: String::new(),
            date: String::new(),
            html_body: String::new(),
        }
    }

    fn photo(name: &str) -> Photo {
        Photo {
            name: name.to_string(),
            title: name.to_string(),
            tags: Vec::new(),
            longitude: NO_LOCATION,
            latitude: NO_LOCATION,
        }
    }

    fn locs(sitemap: &Sitemap) -> Vec<&str> {
        sitemap.urls.iter().map(|u| u.loc.as_str()).collect()
    }

    #[test]
    fn empty_site_has_three_pages() {
        let sitemap = build_sitemap("https://nifi.blog", &[], &[], true);
        assert_eq!(
            locs(&sitemap),
            vec![
                "https://nifi.blog/",
                "https://nifi.blog/blog",
                "https://nifi.blog/photos"
            ]
        );
        assert!(!sitemap.to_xml().contains("xmlns:image"));
    }

    #[test]
    fn order_is_static_articles_photos() {
        let sitemap = build_sitemap(
            "https://nifi.blog/",
            &[article("first"), article("second")],
            &[photo("a.jpg")],
            false,
        );
        assert_eq!(
            locs(&sitemap),
            vec![
                "https://nifi.blog/",
                "https://nifi.blog/blog",
                "https://nifi.blog/photos",
                "https://nifi.blog/blog/first",
                "https://nifi.blog/blog/second",
                "https://nifi.blog/photos/a.jpg",
            ]
        );
        assert!(sitemap.urls.iter().all(|u| u.images.is_empty()));
    }

    #[test]
    fn photos_page_lists_images() {
        let sitemap = build_sitemap("https://nifi.blog", &[], &[photo("a.jpg"), photo("b.jpg")], true);
        assert_eq!(
            sitemap.urls[2].images,
            vec![
                "https://nifi.blog/photos/a.jpg",
                "https://nifi.blog/photos/b.jpg"
            ]
        );

        let xml = sitemap.to_xml();
        assert!(xml.contains(r#"xmlns:image="http://www.google.com/schemas/sitemap-image/1.1""#));
        assert!(xml.contains(
            "    <image:image>\n      <image:loc>https://nifi.blog/photos/a.jpg</image:loc>\n    </image:image>\n"
        ));
    }

    #[test]
    fn xml_is_escaped() {
        let sitemap = build_sitemap("https://nifi.blog", &[], &[photo("fish&chips.jpg")], false);
        let xml = sitemap.to_xml();
        assert!(xml.contains("<loc>https://nifi.blog/photos/fish&amp;chips.jpg</loc>"));
        assert!(!xml.contains("fish&chips"));
    }

    #[test]
    fn locations_are_percent_encoded() {
        let sitemap = build_sitemap(
            "https://nifi.blog",
            &[article("día uno")],
            &[photo("IMG 0001 ü.jpg"), photo("a&b#1.jpg")],
            true,
        );
        let xml = sitemap.to_xml();
        assert!(xml.contains("<loc>https://nifi.blog/blog/d%C3%ADa%20uno</loc>"));
        assert!(xml.contains("<loc>https://nifi.blog/photos/IMG%200001%20%C3%BC.jpg</loc>"));
        assert!(xml.contains(
            "<image:loc>https://nifi.blog/photos/IMG%200001%20%C3%BC.jpg</image:loc>"
        ));
        // `&` is legal in a path but still escaped for XML.
        assert!(xml.contains("<loc>https://nifi.blog/photos/a&amp;b%231.jpg</loc>"));
        assert!(!xml.contains("IMG 0001"));
        assert!(!xml.contains('ü'));
    }

    #[test]
    fn xml_has_no_timestamps() {
        let xml = build_sitemap("https://nifi.blog", &[article("a")], &[], true).to_xml();
        assert!(!xml.contains("lastmod"));
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset"));
        assert!(xml.ends_with("</urlset>\n"));
    }
}
