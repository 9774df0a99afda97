// src/core/target.rs

use crate::core::error::ScanError;
use crate::core::models::ScanTarget;
use tracing::debug;
use url::Url;

/// Validates the user-supplied URL before any provider is contacted.
///
/// The input must be an absolute `http` or `https` URL with a host. The
/// original input is echoed back in the error so the caller can show it.
pub fn parse_target(input: &str) -> Result<ScanTarget, ScanError> {
    let trimmed = input.trim();
    let invalid = |reason: String| ScanError::InvalidInput { input: input.to_string(), reason };

    let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported protocol '{}'", url.scheme())));
    }

    let hostname = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| invalid("missing host".to_string()))?
        .to_string();

    debug!(url = %trimmed, hostname = %hostname, "Target validated.");
    Ok(ScanTarget { url: trimmed.to_string(), hostname })
}

/// Adds `https://` to bare domains typed into the TUI.
pub fn with_default_scheme(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https_urls() {
        let target = parse_target("https://example.com/login?next=/").unwrap();
        assert_eq!(target.hostname, "example.com");
        assert_eq!(target.url, "https://example.com/login?next=/");

        assert_eq!(parse_target(" http://sub.example.org ").unwrap().hostname, "sub.example.org");
    }

    #[test]
    fn rejects_malformed_input_and_echoes_it() {
        match parse_target("not a url") {
            Err(ScanError::InvalidInput { input, .. }) => assert_eq!(input, "not a url"),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn rejects_non_http_protocols() {
        match parse_target("ftp://example.com") {
            Err(ScanError::InvalidInput { reason, .. }) => assert!(reason.contains("ftp")),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
        assert!(parse_target("mailto:admin@example.com").is_err());
    }

    #[test]
    fn bare_domains_get_https() {
        assert_eq!(with_default_scheme("example.com"), "https://example.com");
        assert_eq!(with_default_scheme("http://example.com"), "http://example.com");
    }
}
