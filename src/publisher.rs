//! Post assembly and submission to the WordPress REST API.
//!
//! The publisher folds the generated fields into one HTML fragment
//! (summary heading, embedded image, article body, hashtag footer) and
//! submits it as a new post via `POST {base}/wp-json/wp/v2/posts` with
//! basic-auth credentials. The WordPress REST API answers `201 Created`
//! on success; any other status is logged with its response body and the
//! cycle's publish attempt is simply lost, with no retry.

use crate::config::AppConfig;
use crate::models::PublishResult;
use crate::utils::{escape_html, truncate_for_log};
use reqwest::Client;
use serde_json::json;
use std::error::Error;
use tracing::{error, info, instrument};

/// Assemble the post body HTML from the generated pieces.
///
/// The topic is escaped wherever it lands in markup; the generated article
/// body is inserted verbatim because it is expected to carry its own
/// formatting. An empty hashtag line leaves no footer behind.
pub fn compose_post_html(
    topic: &str,
    summary: &str,
    body: &str,
    image_url: &str,
    hashtags: &str,
) -> String {
    let alt = escape_html(topic);
    let mut html = format!(
        "<h2>Summary</h2>\n<p>{}</p>\n\
         <img src=\"{}\" alt=\"{}\" style=\"max-width:100%; height:auto;\"/>\n\
         {}\n",
        escape_html(summary),
        image_url,
        alt,
        body,
    );
    if !hashtags.trim().is_empty() {
        html.push_str(&format!("<p>{}</p>\n", escape_html(hashtags.trim())));
    }
    html
}

/// The posts endpoint for a WordPress site base URL.
pub fn posts_endpoint(base: &str) -> String {
    format!("{}/wp-json/wp/v2/posts", base.trim_end_matches('/'))
}

/// Submit a new post to WordPress.
///
/// Returns the [`PublishResult`] derived from the response status; only
/// `201 Created` counts as success. A non-201 status is NOT an `Err`: it is
/// logged here and reported through the result so the driver loop can carry
/// on. `Err` is reserved for transport-level failures (connection refused,
/// TLS, timeout), which the caller also treats as cycle-lost, not fatal.
#[instrument(level = "info", skip_all, fields(title = %title))]
pub async fn post_to_wordpress(
    client: &Client,
    config: &AppConfig,
    title: &str,
    content_html: &str,
) -> Result<PublishResult, Box<dyn Error + Send + Sync>> {
    let payload = json!({
        "title": title,
        "content": content_html,
        "status": "publish",
    });

    let response = client
        .post(posts_endpoint(&config.wp_url))
        .basic_auth(&config.wp_username, Some(&config.wp_app_password))
        .json(&payload)
        .send()
        .await?;

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let result = PublishResult::from_response_parts(status, body);

    if result.success {
        info!(status, "Post published");
    } else {
        error!(
            status,
            body = %truncate_for_log(&result.body, 300),
            "WordPress rejected the post"
        );
    }
    Ok(result)
}
