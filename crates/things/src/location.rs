use html::Document;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static PROFILE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/(?:user|u)/([\w-]+)").expect("profile pattern"));
static SUBREDDIT_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/r/([\w+.-]+)").expect("subreddit pattern"));
static COMMENTS_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/(?:r/[\w+.-]+/)?comments/\w+").expect("comments pattern"));
static FIRST_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("integer pattern"));

fn base_url(doc: &Document) -> Option<Url> {
    doc.url().and_then(|u| Url::parse(u).ok())
}

/// Absolute form of `href`, resolved against the page URL when there is one.
pub fn resolve_href(doc: &Document, href: &str) -> String {
    match base_url(doc) {
        Some(base) => base
            .join(href)
            .map(String::from)
            .unwrap_or_else(|_| href.to_string()),
        None => href.to_string(),
    }
}

/// Path component of `href`, like `HTMLAnchorElement.pathname`.
pub(crate) fn pathname(doc: &Document, href: &str) -> String {
    let parsed = match base_url(doc) {
        Some(base) => base.join(href).ok(),
        None => Url::parse(href)
            .or_else(|_| Url::parse("https://localhost/").and_then(|b| b.join(href)))
            .ok(),
    };
    parsed.map(|u| u.path().to_string()).unwrap_or_default()
}

fn page_path(doc: &Document) -> Option<String> {
    base_url(doc).map(|u| u.path().to_string())
}

/// Subreddit named by the page URL (`/r/<name>/...`).
pub fn current_subreddit(doc: &Document) -> Option<String> {
    let path = page_path(doc)?;
    subreddit_from_path(&path)
}

pub fn is_comments_page(doc: &Document) -> bool {
    page_path(doc).is_some_and(|p| COMMENTS_PATH.is_match(&p))
}

pub(crate) fn profile_from_path(path: &str) -> Option<String> {
    PROFILE_PATH
        .captures(path)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

pub(crate) fn subreddit_from_path(path: &str) -> Option<String> {
    SUBREDDIT_PATH
        .captures(path)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

pub(crate) fn first_integer(text: &str) -> Option<u64> {
    FIRST_INTEGER.find(text).and_then(|m| m.as_str().parse().ok())
}

/// `parseInt` semantics: optional sign and leading digits after whitespace.
pub(crate) fn parse_leading_int(text: &str) -> Option<i64> {
    let t = text.trim_start();
    let (sign, digits) = match t.as_bytes().first() {
        Some(b'-') => (-1, &t[1..]),
        Some(b'+') => (1, &t[1..]),
        _ => (1, t),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}
