//! Article text generation with an ordered provider fallback chain.
//!
//! The generator holds a priority-ordered list of [`TextGenerator`]
//! implementations: an OpenAI-compatible chat completions provider first,
//! then a Gemini-style provider when a key is configured. Each article needs
//! two completions (summary and body); if either call against a provider
//! fails (auth, rate limit, connectivity, malformed payload) the SAME
//! prompts are replayed against the next provider in the chain. Only when
//! every provider has failed does the generator give up, and it gives up
//! with `None` rather than an error so the caller can skip the cycle.
//!
//! Hashtag generation rides the same chain but degrades further: total
//! failure yields an empty string, never an aborted run.

use crate::config::AppConfig;
use crate::utils::truncate_for_log;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use tracing::{info, instrument, warn};

/// Token budget for the 3-4 sentence summary completion.
const SUMMARY_MAX_TOKENS: u32 = 100;
/// Token budget for the full article body completion.
const BODY_MAX_TOKENS: u32 = 3000;
/// Token budget for the hashtag completion.
const HASHTAG_MAX_TOKENS: u32 = 50;

/// A prompt-in, text-out completion provider.
///
/// Implementations wrap one remote text-generation API. They are held as an
/// ordered `Vec<Box<dyn TextGenerator>>` and tried first-to-last; any error
/// from one provider simply advances the chain.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Human-readable provider name, used in log lines.
    fn name(&self) -> &str;

    /// Send one prompt and return the completion text.
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// The two generated text fields for one article.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedText {
    pub summary: String,
    pub body: String,
}

/// Build the provider chain from configuration.
///
/// The primary OpenAI-compatible provider is always present (its key is a
/// required variable); the Gemini fallback joins the chain only when its
/// key is configured.
pub fn build_text_providers(config: &AppConfig, client: &Client) -> Vec<Box<dyn TextGenerator>> {
    let mut providers: Vec<Box<dyn TextGenerator>> = vec![Box::new(OpenAiGenerator::new(
        client.clone(),
        &config.openai_base_url,
        &config.openai_api_key,
    ))];
    if let Some(ref key) = config.gemini_api_key {
        providers.push(Box::new(GeminiGenerator::new(
            client.clone(),
            &config.gemini_base_url,
            key,
        )));
    }
    providers
}

/// Generate the summary and body for a topic, or `None` if every provider
/// in the chain failed.
///
/// Both fields are guaranteed non-empty when `Some` is returned.
#[instrument(level = "info", skip_all, fields(topic = %topic))]
pub async fn generate_article(
    providers: &[Box<dyn TextGenerator>],
    topic: &str,
) -> Option<GeneratedText> {
    let summary_prompt =
        format!("Generate a 3-4 sentence summary of an article about '{topic}'.");
    let body_prompt = format!(
        "Write a 1500-2000 word engaging SEO-optimized article on '{topic}'. \
         Include a Table of Contents."
    );

    for provider in providers {
        match article_from(provider.as_ref(), &summary_prompt, &body_prompt).await {
            Ok(text) => {
                info!(provider = provider.name(), "Article generated");
                return Some(text);
            }
            Err(e) => {
                warn!(
                    provider = provider.name(),
                    error = %e,
                    "Text provider failed; trying next in chain"
                );
            }
        }
    }

    warn!("All text providers failed; skipping article generation");
    None
}

/// Run both article prompts against a single provider.
async fn article_from(
    provider: &dyn TextGenerator,
    summary_prompt: &str,
    body_prompt: &str,
) -> Result<GeneratedText, Box<dyn Error + Send + Sync>> {
    let summary = provider.complete(summary_prompt, SUMMARY_MAX_TOKENS).await?;
    let body = provider.complete(body_prompt, BODY_MAX_TOKENS).await?;
    if summary.trim().is_empty() || body.trim().is_empty() {
        return Err("provider returned empty text".into());
    }
    Ok(GeneratedText {
        summary: summary.trim().to_string(),
        body: body.trim().to_string(),
    })
}

/// Generate a hashtag line for the post footer.
///
/// Walks the same provider chain; if nothing succeeds the post simply goes
/// out without hashtags.
#[instrument(level = "info", skip_all, fields(topic = %topic))]
pub async fn generate_hashtags(providers: &[Box<dyn TextGenerator>], topic: &str) -> String {
    let prompt = format!("Generate 5 relevant hashtags for a blog post on '{topic}'.");
    for provider in providers {
        match provider.complete(&prompt, HASHTAG_MAX_TOKENS).await {
            Ok(text) if !text.trim().is_empty() => return text.trim().to_string(),
            Ok(_) => warn!(provider = provider.name(), "Empty hashtag completion"),
            Err(e) => warn!(provider = provider.name(), error = %e, "Hashtag generation failed"),
        }
    }
    String::new()
}

// ---------------- OpenAI-compatible provider ----------------

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// OpenAI-compatible chat completions provider (the primary).
pub struct OpenAiGenerator {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(client: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: "gpt-4-turbo".to_string(),
        }
    }
}

impl fmt::Debug for OpenAiGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiGenerator")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!(
                "chat completions answered {status}: {}",
                truncate_for_log(&body, 300)
            )
            .into());
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or("chat completions response had no choices")?;
        Ok(content)
    }
}

// ---------------- Gemini-style provider ----------------

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    max_output_tokens: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: String,
}

/// Gemini generateContent provider (the fallback).
pub struct GeminiGenerator {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiGenerator {
    pub fn new(client: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: "gemini-1.5-pro-latest".to_string(),
        }
    }
}

impl fmt::Debug for GeminiGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiGenerator")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                max_output_tokens: max_tokens,
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!(
                "generateContent answered {status}: {}",
                truncate_for_log(&body, 300)
            )
            .into());
        }

        let parsed: GeminiResponse = response.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or("generateContent response had no candidates")?;
        Ok(text)
    }
}
