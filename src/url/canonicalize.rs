use crate::UrlError;
use url::Url;

/// Canonicalizes a URL into the crawl's identity key
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed or not http(s)
/// 2. Keep scheme and host as parsed
/// 3. Empty path becomes `/`
/// 4. Drop the query string when `ignore_querystrings` is set; otherwise keep it
///    verbatim (an empty `?` is removed)
/// 5. Always drop the fragment
///
/// The function is pure and idempotent: canonicalizing a canonical URL returns it
/// unchanged.
///
/// # Arguments
///
/// * `url_str` - The URL string to canonicalize
/// * `ignore_querystrings` - Whether query strings are part of the identity
///
/// # Examples
///
/// ```
/// use adsweep::url::canonicalize_url;
///
/// let url = canonicalize_url("https://example.com/page?x=1#section", false).unwrap();
/// assert_eq!(url, "https://example.com/page?x=1");
///
/// let url = canonicalize_url("https://example.com/page?x=1&y=2", true).unwrap();
/// assert_eq!(url, "https://example.com/page");
/// ```
pub fn canonicalize_url(url_str: &str, ignore_querystrings: bool) -> Result<String, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    Ok(canonicalize(url, ignore_querystrings)?.into())
}

/// Canonicalizes an already-parsed URL
pub fn canonicalize(mut url: Url, ignore_querystrings: bool) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    if url.path().is_empty() {
        url.set_path("/");
    }

    let drop_query = ignore_querystrings || matches!(url.query(), Some(""));
    if drop_query {
        url.set_query(None);
    }

    url.set_fragment(None);

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_fragment() {
        let url = "https://example.com/page?x=1#section";
        assert_eq!(
            canonicalize_url(url, false).unwrap(),
            "https://example.com/page?x=1"
        );
    }

    #[test]
    fn test_ignores_querystrings() {
        let url = "https://example.com/page?x=1&y=2";
        assert_eq!(
            canonicalize_url(url, true).unwrap(),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_keeps_query_verbatim() {
        let url = "https://example.com/search?b=2&a=1";
        assert_eq!(
            canonicalize_url(url, false).unwrap(),
            "https://example.com/search?b=2&a=1"
        );
    }

    #[test]
    fn test_empty_path_becomes_root() {
        assert_eq!(
            canonicalize_url("https://example.com", false).unwrap(),
            "https://example.com/"
        );
    }

    #[test]
    fn test_empty_query_removed() {
        assert_eq!(
            canonicalize_url("https://example.com/page?", false).unwrap(),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_trailing_slash_preserved() {
        assert_eq!(
            canonicalize_url("https://example.com/blog/", false).unwrap(),
            "https://example.com/blog/"
        );
    }

    #[test]
    fn test_fragment_and_query_variants_collapse() {
        let a = canonicalize_url("https://example.com/p?utm=1#top", true).unwrap();
        let b = canonicalize_url("https://example.com/p#bottom", true).unwrap();
        let c = canonicalize_url("https://example.com/p", true).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "https://example.com",
            "https://example.com/a/b?x=1#frag",
            "http://example.com:8080/path?",
            "https://example.com/search?q=rust+lang&page=2",
        ];

        for input in inputs {
            for ignore in [false, true] {
                let once = canonicalize_url(input, ignore).unwrap();
                let twice = canonicalize_url(&once, ignore).unwrap();
                assert_eq!(once, twice, "not idempotent for {} (ignore={})", input, ignore);
            }
        }
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        assert!(matches!(
            canonicalize_url("ftp://example.com/file", false),
            Err(UrlError::InvalidScheme(_))
        ));
        assert!(canonicalize_url("mailto:someone@example.com", false).is_err());
    }

    #[test]
    fn test_rejects_relative_url() {
        assert!(matches!(
            canonicalize_url("/relative/path", false),
            Err(UrlError::Parse(_))
        ));
    }
}
