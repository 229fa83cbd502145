//! # trendpress
//!
//! An autoblogging pipeline that periodically selects a trending topic,
//! drafts an article through a text-generation provider (with a fallback
//! provider), fetches a related stock photo, and publishes the result to a
//! WordPress site via its REST API.
//!
//! ## Usage
//!
//! ```sh
//! # Publish one post and exit
//! trendpress --runs 1
//!
//! # Publish every two hours until killed
//! trendpress --interval-secs 7200
//! ```
//!
//! ## Architecture
//!
//! Four sequential stages per tick:
//! 1. **Topic selection**: related-query suggestions from a trends endpoint,
//!    with a hardcoded fallback list
//! 2. **Generation**: summary + body from an OpenAI-compatible provider,
//!    falling back to Gemini
//! 3. **Media**: first usable image URL from Unsplash, Pexels, or Pixabay,
//!    falling back to a constructed placeholder
//! 4. **Publish**: HTML assembly and `POST /wp-json/wp/v2/posts`
//!
//! Once running, every external failure degrades to a fallback or a skipped
//! cycle; the only fatal errors are missing required environment variables
//! at startup.

use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod generate;
mod media;
mod models;
mod pipeline;
mod publisher;
mod topics;
mod utils;

use cli::Cli;
use config::AppConfig;
use pipeline::Providers;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("trendpress starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.runs, args.interval_secs, "Parsed CLI arguments");

    // Missing required variables are fatal here; nothing else ever is.
    let config = AppConfig::from_env()?;

    let client = reqwest::Client::new();
    let providers = Providers {
        trends: Box::new(topics::HttpTrendsSource::new(
            client.clone(),
            &config.trends_base_url,
        )),
        text: generate::build_text_providers(&config, &client),
        images: media::build_image_providers(&config, &client),
    };
    info!(
        text_providers = providers.text.len(),
        image_providers = providers.images.len(),
        "Provider chains built"
    );

    // ---- Driver loop ----
    let interval = Duration::from_secs(args.interval_secs);
    let mut completed: u64 = 0;
    let mut published: u64 = 0;
    loop {
        let tick_started = chrono::Local::now();
        info!(
            run = completed + 1,
            started = %tick_started.format("%Y-%m-%d %H:%M:%S"),
            "Pipeline tick starting"
        );

        let outcome = pipeline::run_once(&client, &config, &providers).await;
        completed += 1;
        if outcome.as_ref().is_some_and(|r| r.success) {
            published += 1;
        }
        info!(run = completed, published, "Pipeline tick finished");

        if let Some(max) = args.runs {
            if completed >= max {
                break;
            }
        }
        debug!(sleep_secs = interval.as_secs(), "Sleeping until next tick");
        tokio::time::sleep(interval).await;
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        runs = completed,
        published,
        "Execution complete"
    );

    Ok(())
}
