//! Sitemap rendering.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/about-us</loc>
//!     <priority>0.5</priority>
//!   </url>
//! </urlset>
//! ```

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{Result, StructureError};
use crate::model::NodeId;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// One sitemap line, before the base URL is applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitemapEntry {
    pub node: NodeId,
    pub path: String,
    pub priority: f32,
}

pub struct Sitemap {
    urls: Vec<UrlEntry>,
}

struct UrlEntry {
    loc: String,
    priority: f32,
}

impl Sitemap {
    /// Resolve entry paths against `base_url`. Absolute custom URLs stay as they are.
    pub fn build(entries: &[SitemapEntry], base_url: Option<&str>) -> Self {
        let base = base_url.unwrap_or_default().trim_end_matches('/');
        let urls = entries
            .iter()
            .map(|entry| UrlEntry {
                loc: if entry.path.starts_with('/') {
                    format!("{base}{}", entry.path)
                } else {
                    entry.path.clone()
                },
                priority: entry.priority,
            })
            .collect();
        Self { urls }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn into_xml(self) -> String {
        let mut xml = String::with_capacity(4096);

        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<urlset xmlns=\"");
        xml.push_str(SITEMAP_NS);
        xml.push_str("\">\n");

        for entry in self.urls {
            xml.push_str("  <url>\n    <loc>");
            xml.push_str(&escape_xml(&entry.loc));
            xml.push_str("</loc>\n    <priority>");
            xml.push_str(&format!("{:.1}", entry.priority));
            xml.push_str("</priority>\n  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }

    pub fn write(self, path: &Path) -> Result<()> {
        fs::write(path, self.into_xml()).map_err(|err| StructureError::Io(path.to_path_buf(), err))
    }
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}
