use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Origin used for root-relative paths when the caller does not supply one.
pub const DEFAULT_ORIGIN: &str = "https://www.instagram.com";

static ESCAPED_SLASH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\+/").unwrap());
static UNICODE_ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\\+u00(26|2f|3d|3f)").unwrap());
static SCHEME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:").unwrap());

/// Repair a URL pulled out of an untrusted document.
///
/// Total and idempotent: `normalize(normalize(x)) == normalize(x)`.
#[must_use]
pub fn normalize(url: &str) -> String {
    normalize_with_origin(url, DEFAULT_ORIGIN)
}

#[must_use]
pub fn normalize_with_origin(url: &str, origin: &str) -> String {
    let s = url.trim();
    if s.is_empty() {
        return String::new();
    }

    // 1. `\/` and `\\/`
    let s = ESCAPED_SLASH_RE.replace_all(s, "/");

    // 2. `\u0026` `\u002F` `\u003D` `\u003F`
    let s = UNICODE_ESCAPE_RE.replace_all(&s, |caps: &Captures<'_>| {
        match caps[1].to_ascii_lowercase().as_str() {
            "26" => "&",
            "2f" => "/",
            "3d" => "=",
            _ => "?",
        }
    });

    // 3. `&amp;` (also nested `&amp;amp;`)
    let mut s = s.into_owned();
    while s.contains("&amp;") {
        s = s.replace("&amp;", "&");
    }

    // 4. scheme
    if s.starts_with("//") {
        format!("https:{s}")
    } else if s.starts_with('/') {
        format!("{}{s}", origin.trim_end_matches('/'))
    } else if SCHEME_RE.is_match(&s) {
        s
    } else {
        format!("https://{s}")
    }
}
