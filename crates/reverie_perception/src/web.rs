use crate::source::{validate_url, Stimulus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reverie_core::text::clip;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const MAX_EXTRACT_CHARS: usize = 240;

/// Page-summary endpoint in the shape of Wikipedia's REST `page/summary`.
pub struct WebLookup {
    url: String,
    name: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct Summary {
    #[serde(default)]
    title: String,
    extract: Option<String>,
}

impl WebLookup {
    pub fn new(url: &str) -> Result<Self> {
        validate_url(url)?;

        let parsed = Url::parse(url)?;
        let domain = parsed.host_str().unwrap_or("unknown");
        let name = format!("web:{}", domain);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("reverie/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            url: url.to_string(),
            name,
            client,
        })
    }
}

#[async_trait]
impl Stimulus for WebLookup {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<String> {
        let summary: Summary = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Failed to fetch summary")?
            .error_for_status()?
            .json()
            .await
            .context("Failed to decode summary")?;

        let extract = summary
            .extract
            .filter(|e| !e.trim().is_empty())
            .context("Summary has no extract")?;

        let text = if summary.title.is_empty() {
            clip(extract.trim(), MAX_EXTRACT_CHARS)
        } else {
            format!("{}: {}", summary.title, clip(extract.trim(), MAX_EXTRACT_CHARS))
        };
        tracing::debug!("Fetched {}", text);
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ERROR_MARKER;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_summary_extract() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/summary"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json_body(
                "Lighthouse",
                "A lighthouse is a tower that emits light.",
            )))
            .mount(&mock_server)
            .await;

        let lookup = WebLookup::new(&format!("{}/summary", mock_server.uri())).expect("Valid URL");
        let text = lookup.fetch().await.expect("Failed to fetch");
        assert_eq!(text, "Lighthouse: A lighthouse is a tower that emits light.");
    }

    #[tokio::test]
    async fn test_server_error_is_embedded() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let lookup = WebLookup::new(&mock_server.uri()).unwrap();
        let text = lookup.observe().await;
        assert!(text.starts_with(ERROR_MARKER), "{}", text);
    }

    #[tokio::test]
    async fn test_missing_extract_is_embedded() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"title\": \"Empty\"}"))
            .mount(&mock_server)
            .await;

        let lookup = WebLookup::new(&mock_server.uri()).unwrap();
        assert!(lookup.observe().await.contains("no extract"));
    }

    #[test]
    fn test_private_address_rejected() {
        assert!(WebLookup::new("http://192.168.1.1/summary").is_err());
        assert!(WebLookup::new("file:///etc/passwd").is_err());
    }

    fn serde_json_body(title: &str, extract: &str) -> serde_json::Value {
        serde_json::json!({ "title": title, "extract": extract })
    }
}
