//! Pluralization helpers for log lines.

/// `"s"` suffix for plural counts: `1 node`, `0 nodes`, `5 nodes`.
#[inline]
pub fn plural_s(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Format count with noun: `plural_count(3, "node")` -> `"3 nodes"`.
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    format!("{} {}{}", count, noun, plural_s(count))
}
