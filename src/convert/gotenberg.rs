//! HTML to PDF through a Gotenberg-compatible rendering service.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use super::Capability;
use crate::config::{GotenbergConfig, PageSetup};
use crate::error::{Error, Result};

const CONVERT_PATH: &str = "/forms/chromium/convert/html";
const HEALTH_PATH: &str = "/health";

pub struct GotenbergClient {
    client: Client,
    base_url: String,
    health_timeout: Duration,
    convert_timeout: Duration,
    page: PageSetup,
}

impl GotenbergClient {
    pub fn new(config: &GotenbergConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            health_timeout: config.health_timeout(),
            convert_timeout: config.convert_timeout(),
            page: config.page.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Hit the health endpoint. Never cached.
    pub async fn probe(&self) -> Capability {
        let url = format!("{}{}", self.base_url, HEALTH_PATH);
        match self
            .client
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await
        {
            Ok(response) if response.status() == StatusCode::OK => Capability::Available,
            Ok(response) => {
                Capability::Unavailable(format!("health check returned {}", response.status()))
            }
            Err(e) if e.is_connect() || e.is_timeout() => {
                Capability::Unavailable(format!("renderer unreachable: {e}"))
            }
            Err(e) => Capability::Unknown(e.to_string()),
        }
    }

    /// Render `html` to PDF bytes.
    pub async fn html_to_pdf(&self, html: String) -> Result<Vec<u8>> {
        if let Some(reason) = self.probe().await.reason() {
            warn!("Gotenberg at {} is not available: {}", self.base_url, reason);
            return Err(Error::ConversionUnavailable(format!(
                "Gotenberg service is not available ({reason})"
            )));
        }

        let part = Part::bytes(html.into_bytes())
            .file_name("index.html")
            .mime_str("text/html")?;
        let form = page_fields(&self.page)
            .into_iter()
            .fold(Form::new().part("files", part), |form, (name, value)| {
                form.text(name, value)
            });

        let url = format!("{}{}", self.base_url, CONVERT_PATH);
        debug!("Posting HTML to {}", url);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(self.convert_timeout)
            .send()
            .await
            .map_err(|e| Error::Conversion(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Conversion(format!(
                "Gotenberg conversion failed: {} - {}",
                status.as_u16(),
                body
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Form fields sent with every conversion, values as decimal strings.
fn page_fields(page: &PageSetup) -> Vec<(&'static str, String)> {
    vec![
        ("paperWidth", page.paper_width.to_string()),
        ("paperHeight", page.paper_height.to_string()),
        ("marginTop", page.margin_top.to_string()),
        ("marginBottom", page.margin_bottom.to_string()),
        ("marginLeft", page.margin_left.to_string()),
        ("marginRight", page.margin_right.to_string()),
        ("printBackground", page.print_background.to_string()),
        ("preferCSSPageSize", page.prefer_css_page_size.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client_for(url: &str) -> GotenbergClient {
        let config = GotenbergConfig {
            url: url.to_string(),
            health_timeout_secs: 1,
            convert_timeout_secs: 5,
            ..Default::default()
        };
        GotenbergClient::new(&config).unwrap()
    }

    #[test]
    fn test_page_fields_use_plain_decimals() {
        let fields = page_fields(&PageSetup::default());
        assert_eq!(
            fields,
            vec![
                ("paperWidth", "8.5".to_string()),
                ("paperHeight", "11".to_string()),
                ("marginTop", "0.5".to_string()),
                ("marginBottom", "0.5".to_string()),
                ("marginLeft", "0.5".to_string()),
                ("marginRight", "0.5".to_string()),
                ("printBackground", "true".to_string()),
                ("preferCSSPageSize", "false".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_probe_available() {
        let mut server = Server::new_async().await;
        let health = server
            .mock("GET", "/health")
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&server.url());
        assert!(client.probe().await.is_available());
        health.assert_async().await;
    }

    #[tokio::test]
    async fn test_probe_is_not_cached() {
        let mut server = Server::new_async().await;
        let down = server
            .mock("GET", "/health")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server.url());
        assert!(matches!(client.probe().await, Capability::Unavailable(_)));
        down.assert_async().await;
        down.remove_async().await;

        server
            .mock("GET", "/health")
            .with_status(200)
            .create_async()
            .await;
        assert_eq!(client.probe().await, Capability::Available);
    }

    #[tokio::test]
    async fn test_unreachable_renderer_is_unavailable() {
        // Port 9 (discard) on localhost is closed in test environments.
        let client = client_for("http://127.0.0.1:9");
        assert!(matches!(client.probe().await, Capability::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_html_to_pdf_posts_form() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(200)
            .create_async()
            .await;
        let convert = server
            .mock("POST", CONVERT_PATH)
            .match_header(
                "content-type",
                Matcher::Regex("multipart/form-data".to_string()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"filename="index.html""#.to_string()),
                Matcher::Regex(r#"name="paperWidth"\r\n\r\n8\.5"#.to_string()),
                Matcher::Regex(r#"name="preferCSSPageSize"\r\n\r\nfalse"#.to_string()),
                Matcher::Regex("<h1>Push Day</h1>".to_string()),
            ]))
            .with_status(200)
            .with_body("%PDF-1.7 fake")
            .create_async()
            .await;

        let client = client_for(&server.url());
        let pdf = client
            .html_to_pdf("<h1>Push Day</h1>".to_string())
            .await
            .unwrap();

        assert_eq!(pdf, b"%PDF-1.7 fake");
        convert.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_200_is_conversion_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(200)
            .create_async()
            .await;
        server
            .mock("POST", CONVERT_PATH)
            .with_status(400)
            .with_body("invalid paper size")
            .create_async()
            .await;

        let client = client_for(&server.url());
        let err = client.html_to_pdf("<p/>".to_string()).await.unwrap_err();
        match err {
            Error::Conversion(msg) => {
                assert!(msg.contains("400"));
                assert!(msg.contains("invalid paper size"));
            }
            other => panic!("expected conversion failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_probe_is_conversion_unavailable() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(500)
            .create_async()
            .await;
        let convert = server
            .mock("POST", CONVERT_PATH)
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let err = client.html_to_pdf("<p/>".to_string()).await.unwrap_err();
        assert!(matches!(err, Error::ConversionUnavailable(_)));
        convert.assert_async().await;
    }
}
