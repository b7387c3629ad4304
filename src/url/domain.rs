use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use adsweep::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the rate-limiting key for a URL: host plus explicit port
///
/// Two servers on the same host but different ports are throttled independently.
pub fn host_key(url_str: &str) -> Option<String> {
    let url = Url::parse(url_str).ok()?;
    let host = extract_host(&url)?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Joins a root-relative path onto the site root
///
/// Used for the fixed probe locations (`/robots.txt`, `/ads.txt`, `/privacy`...).
pub fn site_path(site: &str, path: &str) -> Option<String> {
    let base = Url::parse(site).ok()?;
    base.join(path).ok().map(String::from)
}
