//! Turns user input (post URLs, story URLs, profile URLs, `@handles`) into a
//! [`Reference`].

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ParseError;

/// Which page family a shortcode belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PostPath {
    Post,
    Reel,
    Tv,
    Story { username: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShortcodeRef {
    pub code: String,
    pub path: PostPath,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UsernameRef {
    pub username: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Reference {
    Shortcode(ShortcodeRef),
    Username(UsernameRef),
}

static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());
static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9._]{1,30}$").unwrap());
static SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").unwrap());

/// First path segments that are site sections, never account names.
const RESERVED: &[&str] = &[
    "p", "reel", "reels", "tv", "stories", "explore", "accounts", "direct", "about", "legal",
    "developer", "api", "graphql",
];

/// Shortcode-bearing sections, in match precedence order.
const SHORTCODE_SECTIONS: &[&str] = &["p", "reel", "reels", "tv"];

fn section_path(section: &str) -> PostPath {
    match section {
        "reel" | "reels" => PostPath::Reel,
        "tv" => PostPath::Tv,
        _ => PostPath::Post,
    }
}

/// Parse a user-supplied reference.
///
/// Shortcode patterns win over username patterns; query strings and
/// fragments are ignored.
pub fn parse(input: &str) -> Result<Reference, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::InvalidReference(input.to_string()));
    }
    let no_query = trimmed.split(['?', '#']).next().unwrap_or(trimmed);

    let reference = if looks_like_url(no_query) {
        parse_path(&path_segments(no_query))
    } else {
        bare_username(no_query)
    };
    reference.ok_or_else(|| ParseError::InvalidReference(input.to_string()))
}

fn looks_like_url(s: &str) -> bool {
    SCHEME_RE.is_match(s) || s.contains('/')
}

/// Path segments after the host, if there is one.
fn path_segments(s: &str) -> Vec<&str> {
    let path = if let Some(m) = SCHEME_RE.find(s) {
        s[m.end()..].split_once('/').map_or("", |(_, tail)| tail)
    } else {
        match s.split_once('/') {
            Some((host, tail)) if host.contains('.') => tail,
            _ => s,
        }
    };
    path.split('/').filter(|seg| !seg.is_empty()).collect()
}

fn parse_path(segments: &[&str]) -> Option<Reference> {
    // /p/{code}, /reel/{code}, /tv/{code}, optionally behind a /{username}/ prefix
    for section in SHORTCODE_SECTIONS {
        for at in 0..=1 {
            if segments.get(at) == Some(section)
                && let Some(code) = segments.get(at + 1)
                && CODE_RE.is_match(code)
            {
                return Some(Reference::Shortcode(ShortcodeRef {
                    code: (*code).to_string(),
                    path: section_path(section),
                }));
            }
        }
    }

    if segments.first() == Some(&"stories") {
        let user = segments.get(1).filter(|u| USERNAME_RE.is_match(u))?;
        let username = user.to_lowercase();
        return match segments.get(2) {
            Some(code) if CODE_RE.is_match(code) => Some(Reference::Shortcode(ShortcodeRef {
                code: (*code).to_string(),
                path: PostPath::Story { username },
            })),
            Some(_) => None,
            None => Some(Reference::Username(UsernameRef { username })),
        };
    }

    match segments {
        [user] => username_ref(user),
        _ => None,
    }
}

fn bare_username(s: &str) -> Option<Reference> {
    username_ref(s.strip_prefix('@').unwrap_or(s))
}

fn username_ref(raw: &str) -> Option<Reference> {
    if !USERNAME_RE.is_match(raw) || RESERVED.contains(&raw.to_lowercase().as_str()) {
        return None;
    }
    Some(Reference::Username(UsernameRef {
        username: raw.to_lowercase(),
    }))
}

impl Reference {
    /// Canonical page URL on `origin`; parsing it yields `self` again.
    #[must_use]
    pub fn canonical_url(&self, origin: &str) -> String {
        let origin = origin.trim_end_matches('/');
        match self {
            Self::Shortcode(ShortcodeRef { code, path }) => match path {
                PostPath::Post => format!("{origin}/p/{code}/"),
                PostPath::Reel => format!("{origin}/reel/{code}/"),
                PostPath::Tv => format!("{origin}/tv/{code}/"),
                PostPath::Story { username } => format!("{origin}/stories/{username}/{code}/"),
            },
            Self::Username(UsernameRef { username }) => format!("{origin}/{username}/"),
        }
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shortcode(s) => write!(f, "shortcode:{}", s.code),
            Self::Username(u) => write!(f, "@{}", u.username),
        }
    }
}
