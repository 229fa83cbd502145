//! Data models for one pipeline run.
//!
//! Everything here is transient: a value is produced by one stage, consumed
//! by the next, and dropped at the end of the tick. Persistence lives in the
//! CMS, not in this process.
//!
//! - [`ArticleDraft`]: generated title, summary, and body text
//! - [`PublishResult`]: outcome of one WordPress submission

use serde::{Deserialize, Serialize};

/// A generated article awaiting publication.
///
/// Produced by the content generator, consumed by the publisher. The title
/// is derived from the selected topic; summary and body come straight from
/// the text-generation provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArticleDraft {
    /// Post title (the capitalized topic).
    pub title: String,
    /// A 3-4 sentence summary shown above the fold.
    pub summary: String,
    /// The full article body. May contain markup produced by the model.
    pub body: String,
}

/// Outcome of a single WordPress submission.
///
/// `success` is derived purely from the HTTP status code: the WordPress
/// REST API answers `201 Created` for a newly created post, and anything
/// else is a failure for this cycle. The status and body are kept so the
/// driver loop can log rejections verbatim.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublishResult {
    /// True iff the CMS answered 201.
    pub success: bool,
    /// The HTTP status code of the response.
    pub status: u16,
    /// The raw response body (JSON error detail on rejection).
    pub body: String,
}

impl PublishResult {
    /// Build a result from response parts. Success iff status 201.
    pub fn from_response_parts(status: u16, body: String) -> Self {
        Self {
            success: status == 201,
            status,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_draft_roundtrip() {
        let draft = ArticleDraft {
            title: "Seo strategies".to_string(),
            summary: "A short summary.".to_string(),
            body: "The full body.".to_string(),
        };

        let json = serde_json::to_string(&draft).unwrap();
        let back: ArticleDraft = serde_json::from_str(&json).unwrap();
        assert_eq!(back.title, "Seo strategies");
        assert_eq!(back.summary, "A short summary.");
    }

    #[test]
    fn test_publish_result_created() {
        let res = PublishResult::from_response_parts(201, "{\"id\":42}".to_string());
        assert!(res.success);
        assert_eq!(res.status, 201);
    }

    #[test]
    fn test_publish_result_forbidden() {
        let res = PublishResult::from_response_parts(403, "rest_cannot_create".to_string());
        assert!(!res.success);
        assert_eq!(res.status, 403);
        assert_eq!(res.body, "rest_cannot_create");
    }

    #[test]
    fn test_publish_result_other_2xx_is_failure() {
        // Only 201 counts; a 200 from a misconfigured endpoint is rejected.
        let res = PublishResult::from_response_parts(200, String::new());
        assert!(!res.success);
    }
}
