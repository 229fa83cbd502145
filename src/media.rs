//! Stock-photo lookup across an ordered list of image providers.
//!
//! Providers are tried in a fixed priority order (Unsplash, Pexels,
//! Pixabay); the first usable image URL wins. Every provider call is
//! wrapped so that a non-200 response or a malformed payload means "this
//! provider failed" and the chain moves on. The fetcher itself can never
//! fail: if the whole chain comes up empty it constructs a placeholder URL
//! from the query instead.

use crate::config::AppConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// One image-search provider in the fallback chain.
///
/// `attempt` swallows its own errors: any failure is logged inside the
/// provider and surfaces as `None` so the chain can advance.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Human-readable provider name, used in log lines.
    fn name(&self) -> &str;

    /// Try to find one image URL for the query.
    async fn attempt(&self, query: &str) -> Option<String>;
}

/// Build the provider chain from configuration, in priority order.
/// Providers without a configured key are left out entirely.
pub fn build_image_providers(config: &AppConfig, client: &Client) -> Vec<Box<dyn ImageProvider>> {
    let mut providers: Vec<Box<dyn ImageProvider>> = Vec::new();
    if let Some(ref key) = config.unsplash_access_key {
        providers.push(Box::new(UnsplashProvider::new(client.clone(), key)));
    }
    if let Some(ref key) = config.pexels_api_key {
        providers.push(Box::new(PexelsProvider::new(client.clone(), key)));
    }
    if let Some(ref key) = config.pixabay_api_key {
        providers.push(Box::new(PixabayProvider::new(client.clone(), key)));
    }
    providers
}

/// Fetch exactly one image URL for the query.
///
/// Walks the chain first-to-last and stops at the first hit. With zero
/// configured providers, or when every provider fails, the returned URL is
/// a constructed placeholder embedding the URL-encoded query, so this
/// function never errors and never returns an empty string.
#[instrument(level = "info", skip_all, fields(query = %query))]
pub async fn fetch_image(providers: &[Box<dyn ImageProvider>], query: &str) -> String {
    for provider in providers {
        if let Some(url) = provider.attempt(query).await {
            info!(provider = provider.name(), %url, "Image found");
            return url;
        }
        debug!(provider = provider.name(), "No image from provider; trying next");
    }

    let url = placeholder_url(query);
    warn!(%url, "All image providers failed; using placeholder");
    url
}

/// Placeholder used when no provider produced an image.
pub fn placeholder_url(query: &str) -> String {
    format!(
        "https://placehold.co/1200x630?text={}",
        urlencoding::encode(query)
    )
}

/// Send a provider request and parse the body as JSON, logging any failure.
async fn get_json(provider: &str, request: reqwest::RequestBuilder) -> Option<Value> {
    let response = match request.send().await {
        Ok(r) => r,
        Err(e) => {
            warn!(provider, error = %e, "Image provider request failed");
            return None;
        }
    };
    let status = response.status();
    if !status.is_success() {
        warn!(provider, %status, "Image provider answered non-success");
        return None;
    }
    match response.json::<Value>().await {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(provider, error = %e, "Image provider payload was not JSON");
            None
        }
    }
}

/// Unsplash random-photo endpoint.
pub struct UnsplashProvider {
    client: Client,
    access_key: String,
}

impl UnsplashProvider {
    pub fn new(client: Client, access_key: &str) -> Self {
        Self {
            client,
            access_key: access_key.to_string(),
        }
    }
}

#[async_trait]
impl ImageProvider for UnsplashProvider {
    fn name(&self) -> &str {
        "unsplash"
    }

    async fn attempt(&self, query: &str) -> Option<String> {
        let url = format!(
            "https://api.unsplash.com/photos/random?query={}&client_id={}",
            urlencoding::encode(query),
            self.access_key
        );
        let payload = get_json(self.name(), self.client.get(&url)).await?;
        payload
            .get("urls")
            .and_then(|u| u.get("regular"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

/// Pexels search endpoint.
pub struct PexelsProvider {
    client: Client,
    api_key: String,
}

impl PexelsProvider {
    pub fn new(client: Client, api_key: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl ImageProvider for PexelsProvider {
    fn name(&self) -> &str {
        "pexels"
    }

    async fn attempt(&self, query: &str) -> Option<String> {
        let url = format!(
            "https://api.pexels.com/v1/search?query={}&per_page=1",
            urlencoding::encode(query)
        );
        let request = self.client.get(&url).header("Authorization", &self.api_key);
        let payload = get_json(self.name(), request).await?;
        payload
            .get("photos")
            .and_then(Value::as_array)
            .and_then(|photos| photos.first())
            .and_then(|p| p.get("src"))
            .and_then(|s| s.get("large"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

/// Pixabay search endpoint.
pub struct PixabayProvider {
    client: Client,
    api_key: String,
}

impl PixabayProvider {
    pub fn new(client: Client, api_key: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl ImageProvider for PixabayProvider {
    fn name(&self) -> &str {
        "pixabay"
    }

    async fn attempt(&self, query: &str) -> Option<String> {
        let url = format!(
            "https://pixabay.com/api/?key={}&q={}&image_type=photo&per_page=3",
            self.api_key,
            urlencoding::encode(query)
        );
        let payload = get_json(self.name(), self.client.get(&url)).await?;
        payload
            .get("hits")
            .and_then(Value::as_array)
            .and_then(|hits| hits.first())
            .and_then(|h| h.get("largeImageURL"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProvider {
        name: &'static str,
        url: Option<&'static str>,
    }

    #[async_trait]
    impl ImageProvider for FixedProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn attempt(&self, _query: &str) -> Option<String> {
            self.url.map(str::to_string)
        }
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let providers: Vec<Box<dyn ImageProvider>> = vec![
            Box::new(FixedProvider { name: "a", url: None }),
            Box::new(FixedProvider { name: "b", url: Some("https://img.example/b.jpg") }),
            Box::new(FixedProvider { name: "c", url: Some("https://img.example/c.jpg") }),
        ];
        assert_eq!(
            fetch_image(&providers, "seo").await,
            "https://img.example/b.jpg"
        );
    }

    #[tokio::test]
    async fn test_all_failed_yields_placeholder_with_query() {
        let providers: Vec<Box<dyn ImageProvider>> = vec![
            Box::new(FixedProvider { name: "a", url: None }),
            Box::new(FixedProvider { name: "b", url: None }),
        ];
        let url = fetch_image(&providers, "seo").await;
        assert!(!url.is_empty());
        assert!(url.contains("seo"));
        assert_eq!(url, placeholder_url("seo"));
    }

    #[tokio::test]
    async fn test_no_providers_yields_placeholder() {
        let url = fetch_image(&[], "keyword research").await;
        assert!(url.contains(&*urlencoding::encode("keyword research")));
    }

    #[tokio::test]
    async fn test_idempotent_under_identical_responses() {
        let providers: Vec<Box<dyn ImageProvider>> = vec![Box::new(FixedProvider {
            name: "a",
            url: Some("https://img.example/a.jpg"),
        })];
        let first = fetch_image(&providers, "seo").await;
        let second = fetch_image(&providers, "seo").await;
        assert_eq!(first, second);
    }

    #[test]
    fn test_placeholder_encodes_query() {
        let url = placeholder_url("ai tools & tips");
        assert!(url.starts_with("https://placehold.co/"));
        assert!(url.contains("ai%20tools%20%26%20tips"));
    }
}
