//! Recipe image scraping.
//!
//! Given a recipe's source URL, fetch the page and look for an Open-Graph
//! image, a Twitter card image, or a recipe-image element, in that order.
//! Every failure along the way degrades to "no image"; a recipe card
//! renders fine without one.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use tracing::debug;

use crate::config::FetcherConfig;
use crate::error::{Error, Result};
use crate::utils::resolve_image_url;

static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\s[^>]*>").expect("static regex"));

static OG_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)property\s*=\s*["']og:image["']"#).expect("static regex")
});

static TWITTER_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)name\s*=\s*["']twitter:image["']"#).expect("static regex")
});

static CONTENT_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)content\s*=\s*["']([^"']+)["']"#).expect("static regex")
});

static IMG_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<img\s[^>]*>").expect("static regex"));

static RECIPE_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)class\s*=\s*["'][^"']*image[^"']*recipe[^"']*["']|class\s*=\s*["'][^"']*recipe[^"']*image[^"']*["']"#)
        .expect("static regex")
});

static SRC_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)src\s*=\s*["']([^"']+)["']"#).expect("static regex")
});

/// HTTP fetcher for recipe page images
pub struct ImageFetcher {
    client: Client,
    max_body_size: usize,
}

impl ImageFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            max_body_size: config.max_body_size,
        })
    }

    /// Fetch the page and extract an absolute image URL, or `None`.
    /// Network and parse failures are swallowed: the caller treats both
    /// as "this recipe has no image".
    pub async fn fetch_image(&self, page_url: &str) -> Option<String> {
        let html = match self.fetch_page(page_url).await {
            Ok(html) => html,
            Err(e) => {
                debug!("Image fetch failed for {}: {}", page_url, e);
                return None;
            }
        };

        let candidate = extract_image_url(&html)?;
        resolve_image_url(&candidate, page_url)
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(Error::Validation(format!("HTTP {}", response.status())));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_body_size as u64 {
                return Err(Error::Validation(format!(
                    "Page size {} exceeds maximum {}",
                    content_length, self.max_body_size
                )));
            }
        }

        let bytes = response.bytes().await?;
        if bytes.len() > self.max_body_size {
            return Err(Error::Validation(format!(
                "Page size {} exceeds maximum {}",
                bytes.len(),
                self.max_body_size
            )));
        }

        String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::Validation(format!("Invalid UTF-8 in page: {e}")))
    }
}

/// Scan HTML for an image URL: og:image meta, then twitter:image meta,
/// then an `<img>` whose class marks it as the recipe image.
fn extract_image_url(html: &str) -> Option<String> {
    for tag in META_TAG_RE.find_iter(html) {
        if OG_IMAGE_RE.is_match(tag.as_str()) {
            if let Some(content) = CONTENT_ATTR_RE.captures(tag.as_str()) {
                return Some(content[1].to_string());
            }
        }
    }

    for tag in META_TAG_RE.find_iter(html) {
        if TWITTER_IMAGE_RE.is_match(tag.as_str()) {
            if let Some(content) = CONTENT_ATTR_RE.captures(tag.as_str()) {
                return Some(content[1].to_string());
            }
        }
    }

    for tag in IMG_TAG_RE.find_iter(html) {
        if RECIPE_CLASS_RE.is_match(tag.as_str()) {
            if let Some(src) = SRC_ATTR_RE.captures(tag.as_str()) {
                return Some(src[1].to_string());
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetcherConfig;

    fn test_config() -> FetcherConfig {
        FetcherConfig {
            user_agent: "ChefmateTest/0.1".to_string(),
            timeout_seconds: 5,
            max_body_size: 1_048_576,
        }
    }

    #[test]
    fn test_extracts_og_image_first() {
        let html = r#"
            <html><head>
            <meta name="twitter:image" content="https://example.com/twitter.jpg">
            <meta property="og:image" content="https://example.com/og.jpg">
            </head></html>
        "#;
        assert_eq!(
            extract_image_url(html),
            Some("https://example.com/og.jpg".to_string())
        );
    }

    #[test]
    fn test_falls_back_to_twitter_then_img_tag() {
        let twitter_only = r#"<meta name="twitter:image" content="/card.jpg">"#;
        assert_eq!(extract_image_url(twitter_only), Some("/card.jpg".to_string()));

        let img_only = r#"
            <img class="universal-image__img recipe-photo" src="/photos/stew.jpg">
        "#;
        assert_eq!(extract_image_url(img_only), Some("/photos/stew.jpg".to_string()));
    }

    #[test]
    fn test_attribute_order_does_not_matter() {
        let html = r#"<meta content="https://example.com/og.jpg" property="og:image">"#;
        assert_eq!(
            extract_image_url(html),
            Some("https://example.com/og.jpg".to_string())
        );
    }

    #[test]
    fn test_no_image_yields_none() {
        assert_eq!(extract_image_url("<html><body>plain page</body></html>"), None);
        assert_eq!(
            extract_image_url(r#"<img class="site-logo" src="/logo.png">"#),
            None
        );
    }

    #[tokio::test]
    async fn test_fetch_image_from_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/recipe/42")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(r#"<html><head><meta property="og:image" content="//cdn.example.com/pie.jpg"></head></html>"#)
            .create_async()
            .await;

        let fetcher = ImageFetcher::new(&test_config()).unwrap();
        let url = format!("{}/recipe/42", server.url());
        let image = fetcher.fetch_image(&url).await;

        mock.assert_async().await;
        assert_eq!(image, Some("https://cdn.example.com/pie.jpg".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_no_image() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/recipe/404")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = ImageFetcher::new(&test_config()).unwrap();
        let url = format!("{}/recipe/404", server.url());
        assert_eq!(fetcher.fetch_image(&url).await, None);

        mock.assert_async().await;
    }
}
