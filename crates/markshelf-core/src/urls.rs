//! URL helpers used across analysis and reorganization.

use url::Url;

/// Host of a URL, lowercased with a leading `www.` removed.
///
/// A non-default port is kept (`example.com:8080`), so two services on
/// the same host stay distinct. Returns an empty string when the URL
/// cannot be parsed or has no host.
pub fn extract_domain(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };
    let Some(host) = parsed.host_str() else {
        return String::new();
    };

    let host = host.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

/// Domain with any port removed.
pub fn strip_port(domain: &str) -> &str {
    domain.split(':').next().unwrap_or(domain)
}

/// Dot-separated labels of a domain, port removed.
pub fn host_labels(domain: &str) -> impl Iterator<Item = &str> {
    strip_port(domain).split('.')
}

/// Last dot-separated label of a domain, when it has at least two labels.
pub fn top_level_label(domain: &str) -> Option<&str> {
    let mut labels = host_labels(domain);
    labels.next()?;
    labels.last().filter(|tld| !tld.is_empty())
}

/// First dot-separated label of a domain (`github.com` -> `github`).
pub fn base_name(domain: &str) -> &str {
    host_labels(domain).next().unwrap_or_default()
}

/// Lowercased path component of a URL, empty when unparsable.
pub fn lowercase_path(url: &str) -> String {
    Url::parse(url)
        .map(|parsed| parsed.path().to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_domain() {
        assert_eq!(extract_domain("https://WWW.GitHub.com/rust-lang"), "github.com");
        assert_eq!(extract_domain("http://localhost:8080/x"), "localhost:8080");
        assert_eq!(extract_domain("http://example.com:80/"), "example.com");
        assert_eq!(extract_domain("not a url"), "");
        assert_eq!(extract_domain("javascript:void(0)"), "");
    }

    #[test]
    fn test_labels() {
        assert_eq!(top_level_label("docs.python.org"), Some("org"));
        assert_eq!(top_level_label("localhost:3000"), None);
        assert_eq!(base_name("github.com"), "github");
        assert_eq!(base_name("localhost"), "localhost");
    }

    #[test]
    fn test_lowercase_path() {
        assert_eq!(lowercase_path("https://a.com/Docs/Intro?x=1"), "/docs/intro");
        assert_eq!(lowercase_path("::"), "");
    }
}
