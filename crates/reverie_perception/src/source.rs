use anyhow::Result;
use async_trait::async_trait;
use std::net::IpAddr;
use url::Url;

/// Prefix carried by every observation that stands in for a failed fetch.
pub const ERROR_MARKER: &str = "[stimulus error]";

#[async_trait]
pub trait Stimulus: Send + Sync {
    /// Identifier used in logs and as the fragment source tag, e.g. "web:en.wikipedia.org"
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<String>;

    /// [`Stimulus::fetch`] with failures folded into the observation text.
    async fn observe(&self) -> String {
        match self.fetch().await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Stimulus {} failed: {:#}", self.name(), e);
                format!("{} {}: {}", ERROR_MARKER, self.name(), e)
            }
        }
    }
}

/// Validates that a URL is safe to fetch (HTTP/HTTPS only, no private IPs)
pub fn validate_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url)?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("Only HTTP/HTTPS schemes are allowed");
    }

    if let Some(host_str) = parsed.host_str() {
        if cfg!(test) && (host_str == "localhost" || host_str == "127.0.0.1") {
            return Ok(());
        }

        if let Ok(ip) = host_str.trim_matches(&['[', ']'][..]).parse::<IpAddr>() {
            if is_private_ip(ip) {
                anyhow::bail!("Private network addresses are not allowed");
            }
        } else if host_str == "localhost" {
            anyhow::bail!("Localhost is not allowed");
        }
    }

    Ok(())
}

fn is_private_ip(ip: IpAddr) -> bool {
    if ip.is_loopback() || ip.is_unspecified() {
        return true;
    }

    match ip {
        IpAddr::V4(ipv4) => ipv4.is_private() || ipv4.is_link_local(),
        // fc00::/7
        IpAddr::V6(ipv6) => (ipv6.octets()[0] & 0xFE) == 0xFC,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    #[async_trait]
    impl Stimulus for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        async fn fetch(&self) -> Result<String> {
            anyhow::bail!("sensor offline")
        }
    }

    #[tokio::test]
    async fn test_failure_becomes_observation() {
        let text = Broken.observe().await;
        assert!(text.starts_with(ERROR_MARKER));
        assert!(text.contains("sensor offline"));
    }

    #[test]
    fn test_url_validation() {
        assert!(validate_url("https://en.wikipedia.org/api/rest_v1/page/random/summary").is_ok());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("http://10.0.0.8/feed").is_err());
        assert!(validate_url("http://169.254.169.254/meta").is_err());
        assert!(validate_url("http://[fd00::1]/").is_err());
        assert!(validate_url("http://127.0.0.1:8080/").is_ok());
    }
}
