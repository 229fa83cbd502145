//! Topic selection backed by a trends-discovery endpoint.
//!
//! The selector queries the trends service once per fixed keyword group,
//! pools every "related query" suggestion it gets back, and picks one at
//! random. A throttled, erroring, or empty trends provider is an expected
//! condition: the selector substitutes a topic from a small hardcoded list
//! instead of retrying.
//!
//! The response shape differs between trends providers and versions, so the
//! payload is traversed defensively with [`serde_json::Value`] rather than
//! a fixed schema.

use async_trait::async_trait;
use itertools::Itertools;
use rand::{Rng, rng};
use reqwest::Client;
use serde_json::Value;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Keyword groups submitted to the trends provider, one query per group.
pub const KEYWORD_GROUPS: &[&[&str]] = &[
    &["SEO", "keyword research", "Google SEO", "ranking on Google"],
    &["YouTube SEO", "rank YouTube videos", "YouTube algorithm", "video SEO"],
    &["digital marketing", "social media marketing", "content marketing", "online marketing"],
    &["AI marketing", "automation marketing", "AI tools"],
    &["SEO tools", "online marketing tools reviews"],
    &["content marketing tips", "blogging tips"],
    &["eCommerce marketing", "affiliate marketing strategies"],
];

/// Topics substituted when the trends provider yields nothing usable.
pub const FALLBACK_TOPICS: &[&str] = &[
    "SEO Best Practices",
    "SEO strategies",
    "Google ranking tips",
    "Content marketing ideas",
];

/// At most this many pooled suggestions are kept as candidates.
const MAX_CANDIDATES: usize = 10;

/// A source of related-search-query suggestions.
#[async_trait]
pub trait TrendsSource: Send + Sync {
    /// Return related query suggestions for one keyword group.
    ///
    /// An `Err` or an empty `Vec` both mean "nothing usable from this
    /// group"; the caller never retries.
    async fn related_queries(
        &self,
        keywords: &[&str],
    ) -> Result<Vec<String>, Box<dyn Error + Send + Sync>>;
}

/// Trends source backed by an HTTP related-queries endpoint.
pub struct HttpTrendsSource {
    client: Client,
    base_url: String,
}

impl HttpTrendsSource {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl TrendsSource for HttpTrendsSource {
    #[instrument(level = "info", skip_all, fields(group = %keywords.join(",")))]
    async fn related_queries(
        &self,
        keywords: &[&str],
    ) -> Result<Vec<String>, Box<dyn Error + Send + Sync>> {
        // Trends providers throttle aggressively; pause between group queries.
        tokio::time::sleep(Duration::from_secs(2)).await;

        let url = format!(
            "{}/related_queries?keywords={}&timeframe={}&geo=US",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&keywords.join(",")),
            urlencoding::encode("now 7-d"),
        );
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("trends endpoint answered {status}").into());
        }

        let payload: Value = response.json().await?;
        let queries = parse_related_payload(&payload, keywords);
        debug!(count = queries.len(), "Parsed related queries");
        Ok(queries)
    }
}

/// Extract related query strings from a trends payload, tolerating the
/// shape variations seen across provider versions.
///
/// Recognized shapes:
/// - Per-keyword maps: `{"SEO": {"top": {"query": ["a", "b"]}}}`
/// - A flat list: `{"related_queries": ["a", "b"]}` (or `"related"`)
///
/// Anything missing or of the wrong type contributes nothing.
pub(crate) fn parse_related_payload(payload: &Value, keywords: &[&str]) -> Vec<String> {
    let mut queries = Vec::new();

    for kw in keywords {
        let top = payload.get(kw).and_then(|v| v.get("top"));
        if let Some(list) = top.and_then(|t| t.get("query")).and_then(Value::as_array) {
            queries.extend(list.iter().filter_map(Value::as_str).map(str::to_string));
        }
    }

    for key in ["related_queries", "related"] {
        if let Some(list) = payload.get(key).and_then(Value::as_array) {
            queries.extend(list.iter().filter_map(Value::as_str).map(str::to_string));
        }
    }

    queries
}

/// Select one topic for this pipeline run.
///
/// Pools suggestions across all keyword groups, dedupes, caps the pool at
/// ten candidates, and picks one at random. If the pool is empty the topic
/// comes from [`FALLBACK_TOPICS`] instead; this function always returns a
/// non-empty string.
#[instrument(level = "info", skip_all)]
pub async fn select_topic(source: &dyn TrendsSource) -> String {
    let mut pooled: Vec<String> = Vec::new();
    for group in KEYWORD_GROUPS {
        match source.related_queries(group).await {
            Ok(queries) => pooled.extend(queries),
            Err(e) => {
                warn!(group = %group.join(","), error = %e, "Trends query failed; skipping group");
            }
        }
    }

    let candidates: Vec<String> = pooled
        .into_iter()
        .filter(|q| !q.trim().is_empty())
        .unique()
        .take(MAX_CANDIDATES)
        .collect();

    if candidates.is_empty() {
        let pick = FALLBACK_TOPICS[rng().random_range(0..FALLBACK_TOPICS.len())].to_string();
        warn!(topic = %pick, "No usable trend suggestions; using fallback topic");
        pick
    } else {
        let pick = candidates[rng().random_range(0..candidates.len())].clone();
        info!(candidates = candidates.len(), topic = %pick, "Selected trending topic");
        pick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct StaticSource(Vec<String>);

    #[async_trait]
    impl TrendsSource for StaticSource {
        async fn related_queries(
            &self,
            _keywords: &[&str],
        ) -> Result<Vec<String>, Box<dyn Error + Send + Sync>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl TrendsSource for FailingSource {
        async fn related_queries(
            &self,
            _keywords: &[&str],
        ) -> Result<Vec<String>, Box<dyn Error + Send + Sync>> {
            Err("429 too many requests".into())
        }
    }

    #[tokio::test]
    async fn test_empty_trends_falls_back() {
        let topic = select_topic(&StaticSource(vec![])).await;
        assert!(FALLBACK_TOPICS.contains(&topic.as_str()));
    }

    #[tokio::test]
    async fn test_erroring_trends_falls_back() {
        let topic = select_topic(&FailingSource).await;
        assert!(FALLBACK_TOPICS.contains(&topic.as_str()));
    }

    #[tokio::test]
    async fn test_suggestion_is_used_when_available() {
        let topic = select_topic(&StaticSource(vec!["local seo checklist".to_string()])).await;
        assert_eq!(topic, "local seo checklist");
    }

    #[tokio::test]
    async fn test_blank_suggestions_are_ignored() {
        let topic = select_topic(&StaticSource(vec!["  ".to_string(), "".to_string()])).await;
        assert!(FALLBACK_TOPICS.contains(&topic.as_str()));
    }

    #[test]
    fn test_parse_per_keyword_shape() {
        let payload = json!({
            "SEO": {"top": {"query": ["seo audit", "seo for beginners"]}},
            "Google SEO": {"top": {"query": ["google ranking factors"]}},
        });
        let queries = parse_related_payload(&payload, &["SEO", "Google SEO", "missing"]);
        assert_eq!(
            queries,
            vec!["seo audit", "seo for beginners", "google ranking factors"]
        );
    }

    #[test]
    fn test_parse_flat_shape() {
        let payload = json!({"related_queries": ["a", "b"]});
        assert_eq!(parse_related_payload(&payload, &["SEO"]), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_malformed_shapes_yield_nothing() {
        // "top" holding a number, "query" holding an object, null keyword.
        let payload = json!({
            "SEO": {"top": 7},
            "video SEO": {"top": {"query": {"0": "not-a-list"}}},
            "AI tools": null,
        });
        let queries = parse_related_payload(&payload, &["SEO", "video SEO", "AI tools"]);
        assert!(queries.is_empty());
    }

    #[test]
    fn test_fallback_list_contains_expected_member() {
        assert!(FALLBACK_TOPICS.contains(&"SEO Best Practices"));
    }
}
