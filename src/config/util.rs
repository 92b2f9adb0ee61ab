//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Normalize a site base URL for link prefixing.
///
/// Uses the `url` crate so ports, auth info and query strings are handled:
/// - `https://example.com/`          -> `https://example.com`
/// - `https://example.com/cms/?x=1`  -> `https://example.com/cms`
///
/// Returns `None` for invalid URLs or schemes other than http(s).
pub fn normalize_base_url(url_str: &str) -> Option<String> {
    let mut parsed = url::Url::parse(url_str).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    parsed.set_query(None);
    parsed.set_fragment(None);
    Some(parsed.as_str().trim_end_matches('/').to_string())
}

/// Find config file by searching upward from `start`.
///
/// ```text
/// /srv/site/data/cache/   ← start
/// /srv/site/structure.toml ← found!
/// ```
pub fn find_config_file(config_name: &Path, start: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.exists() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}

/// Expand `~` and resolve a relative path against `root`.
pub fn resolve_path(path: &Path, root: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let expanded = PathBuf::from(shellexpand::tilde(&raw).into_owned());
    if expanded.is_relative() {
        root.join(expanded)
    } else {
        expanded
    }
}

// ============================================================================
// tests
// ============================================================================
