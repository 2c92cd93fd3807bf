use url::Url;

/// Returns true if `link` should be traversed as a page when crawling from `seed`
///
/// A link is followed when its host and effective port match the seed's.
/// Links are resolved against the page they appear on before this check,
/// so relative links (with no host of their own) always pass.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_mirror::url::same_host;
///
/// let seed = Url::parse("http://a.test/").unwrap();
/// assert!(same_host(&seed, &Url::parse("http://a.test/docs").unwrap()));
/// assert!(!same_host(&seed, &Url::parse("http://b.test/x").unwrap()));
/// ```
pub fn same_host(seed: &Url, link: &Url) -> bool {
    match (seed.host_str(), link.host_str()) {
        (Some(seed_host), Some(link_host)) => {
            seed_host.eq_ignore_ascii_case(link_host)
                && seed.port_or_known_default() == link.port_or_known_default()
        }
        (_, None) => true,
        _ => false,
    }
}

/// Returns true if the URL path ends in a `.pdf` extension (case-insensitive)
pub fn is_pdf(url: &Url) -> bool {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|name| name.rsplit_once('.'))
        .is_some_and(|(stem, ext)| !stem.is_empty() && ext.eq_ignore_ascii_case("pdf"))
}
