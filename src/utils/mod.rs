//! Utility functions and helpers.

pub mod console;
pub mod http;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Remote URL with the access token embedded as the user name.
pub fn with_token(remote: &str, token: &str) -> Option<String> {
    let mut url = Url::parse(remote).ok()?;
    url.set_username(token).ok()?;
    Some(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://tablet-pc.arukereso.hu/samsung/tab/#").unwrap();
        assert_eq!(
            resolve_url(&base, "/Jump.php?id=1"),
            "https://tablet-pc.arukereso.hu/Jump.php?id=1"
        );
        assert_eq!(
            resolve_url(&base, "https://other.com/x"),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_with_token() {
        assert_eq!(
            with_token("https://github.com/owner/repo.git", "secret").as_deref(),
            Some("https://secret@github.com/owner/repo.git")
        );
        assert_eq!(with_token("not a url", "secret"), None);
    }
}
