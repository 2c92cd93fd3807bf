use crate::UrlError;
use url::Url;

/// Normalizes a URL into the canonical identifier form
///
/// The string form of the returned URL is the key used for visited,
/// excluded and persisted page records alike, in every crawl mode.
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an `http` or `https` scheme
/// 3. Require a host (the parser lowercases it)
/// 4. Remove the fragment (everything after #)
///
/// Scheme, port, path and query are otherwise kept as given: two URLs that
/// differ in any of them are different remote resources.
///
/// # Examples
///
/// ```
/// use site_mirror::url::normalize_identifier;
///
/// let url = normalize_identifier("http://A.TEST/docs/readme#intro").unwrap();
/// assert_eq!(url.as_str(), "http://a.test/docs/readme");
/// ```
pub fn normalize_identifier(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(url)
}

/// Normalizes an already parsed URL (see [`normalize_identifier`])
pub fn normalize_parsed(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    Ok(url)
}
