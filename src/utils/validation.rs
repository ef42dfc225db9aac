// Validation utilities
use crate::error::{Error, Result};
use std::net::IpAddr;
use tracing::warn;
use url::{Host, Url};

/// Check if an IP address is in a private range
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            let octets = ipv4.octets();
            // 10.0.0.0/8
            octets[0] == 10
                // 172.16.0.0/12
                || (octets[0] == 172 && octets[1] >= 16 && octets[1] <= 31)
                // 192.168.0.0/16
                || (octets[0] == 192 && octets[1] == 168)
                // 169.254.0.0/16 (link-local)
                || (octets[0] == 169 && octets[1] == 254)
                // 127.0.0.0/8 (loopback)
                || octets[0] == 127
        }
        IpAddr::V6(ipv6) => {
            // Check for IPv6 loopback (::1)
            ipv6.is_loopback()
                // Check for IPv6 link-local (fe80::/10)
                || (ipv6.segments()[0] & 0xffc0) == 0xfe80
                // Check for IPv6 unique local (fc00::/7)
                || (ipv6.segments()[0] & 0xfe00) == 0xfc00
        }
    }
}

/// Validate a URL is valid, uses http/https, and doesn't point at private
/// resources. Recipe source URLs come from the corpus file, which the
/// operator controls but may not have vetted host by host.
pub fn validate_fetch_url(url_str: &str) -> Result<Url> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        _ => {
            warn!(
                "Security: Blocked non-HTTP(S) URL scheme: {} in URL: {}",
                url.scheme(),
                url_str
            );
            return Err(Error::Validation(format!(
                "URL must use http or https scheme: {url_str}"
            )));
        }
    }

    match url.host() {
        Some(Host::Ipv4(ip)) if is_private_ip(&IpAddr::V4(ip)) => {
            warn!("Security: Blocked private IPv4 address in URL: {}", url_str);
            return Err(Error::Validation(format!(
                "URL must not point to a private address: {url_str}"
            )));
        }
        Some(Host::Ipv6(ip)) if is_private_ip(&IpAddr::V6(ip)) => {
            warn!("Security: Blocked private IPv6 address in URL: {}", url_str);
            return Err(Error::Validation(format!(
                "URL must not point to a private address: {url_str}"
            )));
        }
        Some(Host::Domain("localhost")) => {
            warn!("Security: Blocked localhost URL: {}", url_str);
            return Err(Error::Validation(format!(
                "URL must not point to localhost: {url_str}"
            )));
        }
        Some(_) => {}
        None => {
            return Err(Error::Validation(format!("URL has no host: {url_str}")));
        }
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_public_http_urls() {
        assert!(validate_fetch_url("https://example.com/recipe/123").is_ok());
        assert!(validate_fetch_url("http://example.com/").is_ok());
    }

    #[test]
    fn test_rejects_non_http_schemes() {
        assert!(validate_fetch_url("ftp://example.com/file").is_err());
        assert!(validate_fetch_url("file:///etc/passwd").is_err());
    }

    #[test]
    fn test_rejects_private_addresses() {
        assert!(validate_fetch_url("http://127.0.0.1/").is_err());
        assert!(validate_fetch_url("http://10.1.2.3/").is_err());
        assert!(validate_fetch_url("http://192.168.1.1/").is_err());
        assert!(validate_fetch_url("http://172.16.0.1/").is_err());
        assert!(validate_fetch_url("http://localhost:3000/").is_err());
        assert!(validate_fetch_url("http://[::1]/").is_err());
    }
}
