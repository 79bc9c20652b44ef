use url::Url;

/// Network origin of a URL: scheme, host and effective port
///
/// Two URLs are same-origin when all three components match. The port is the
/// explicit port if present, otherwise the scheme's default, so
/// `http://example.com/` and `http://example.com:80/` share an origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
}

impl Origin {
    /// Extracts the origin of a URL
    ///
    /// Returns None for URLs without a host.
    pub fn of(url: &Url) -> Option<Self> {
        let host = url.host_str()?.to_lowercase();
        Some(Self {
            scheme: url.scheme().to_string(),
            host,
            port: url.port_or_known_default(),
        })
    }
}

/// Returns true if both URLs share scheme, host and port
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_mirror::url::same_origin;
///
/// let a = Url::parse("https://example.com/a").unwrap();
/// let b = Url::parse("https://EXAMPLE.com:443/b").unwrap();
/// assert!(same_origin(&a, &b));
/// ```
pub fn same_origin(a: &Url, b: &Url) -> bool {
    match (Origin::of(a), Origin::of(b)) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}
