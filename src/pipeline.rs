//! One end-to-end pipeline run: topic → article → image → publish.
//!
//! Control flows strictly forward through the four stages; nothing is
//! persisted between runs. Every stage failure degrades to a fallback or a
//! skipped cycle; once the process is past startup, no external failure
//! escalates past this module.

use crate::config::AppConfig;
use crate::generate::{self, TextGenerator};
use crate::media::{self, ImageProvider};
use crate::models::{ArticleDraft, PublishResult};
use crate::publisher;
use crate::topics::{self, TrendsSource};
use crate::utils::upcase;
use reqwest::Client;
use tracing::{info, instrument, warn};

/// The provider chains built once at startup and shared (immutably) by
/// every run.
pub struct Providers {
    pub trends: Box<dyn TrendsSource>,
    pub text: Vec<Box<dyn TextGenerator>>,
    pub images: Vec<Box<dyn ImageProvider>>,
}

/// Execute one pipeline tick.
///
/// Returns the publish outcome, or `None` when the cycle was abandoned
/// before submission (no article could be generated) or the submission
/// itself failed at the transport level. Either way the caller's loop
/// continues on its next tick.
#[instrument(level = "info", skip_all)]
pub async fn run_once(
    client: &Client,
    config: &AppConfig,
    providers: &Providers,
) -> Option<PublishResult> {
    // Stage 1: topic selection (always yields a topic).
    let topic = topics::select_topic(providers.trends.as_ref()).await;

    // Stage 2: article generation; total provider failure skips the cycle.
    let Some(text) = generate::generate_article(&providers.text, &topic).await else {
        warn!(%topic, "Article generation failed; skipping this cycle");
        return None;
    };
    let draft = ArticleDraft {
        title: upcase(&topic),
        summary: text.summary,
        body: text.body,
    };

    // Stage 3: media lookup (always yields a URL) plus the hashtag footer.
    let image_url = media::fetch_image(&providers.images, &topic).await;
    let hashtags = generate::generate_hashtags(&providers.text, &topic).await;

    // Stage 4: assemble and submit.
    let html = publisher::compose_post_html(
        &topic,
        &draft.summary,
        &draft.body,
        &image_url,
        &hashtags,
    );
    match publisher::post_to_wordpress(client, config, &draft.title, &html).await {
        Ok(result) => {
            info!(
                title = %draft.title,
                success = result.success,
                status = result.status,
                "Cycle finished"
            );
            Some(result)
        }
        Err(e) => {
            warn!(title = %draft.title, error = %e, "Publish transport failure; cycle lost");
            None
        }
    }
}
