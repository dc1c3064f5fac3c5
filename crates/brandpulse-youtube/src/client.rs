//! HTTP client for the `YouTube` Data API v3.
//!
//! Wraps `reqwest` with key rotation, error-envelope classification, and
//! typed response deserialization. Nothing here retries: a quota or auth
//! failure is returned to the caller on the first attempt.

use std::time::Duration;

use brandpulse_core::{Comment, CommentPage, SearchHit, VideoStats};
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::YoutubeError;
use crate::key_pool::KeyPool;
use crate::types::{
    CommentThreadListResponse, ErrorEnvelope, SearchListResponse, VideoListResponse,
};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// `search.list` rejects `maxResults` above 50.
const MAX_SEARCH_PAGE: u32 = 50;

/// `commentThreads.list` page size.
const COMMENT_PAGE_SIZE: &str = "100";

const QUOTA_REASONS: &[&str] = &[
    "quotaExceeded",
    "dailyLimitExceeded",
    "rateLimitExceeded",
    "userRateLimitExceeded",
];

const AUTH_REASONS: &[&str] = &["keyInvalid", "keyExpired", "accessNotConfigured"];

/// Client for the `YouTube` Data API.
///
/// Use [`YoutubeClient::new`] for production or
/// [`YoutubeClient::with_base_url`] to point at a mock server in tests.
pub struct YoutubeClient {
    client: Client,
    keys: KeyPool,
    base_url: Url,
}

impl YoutubeClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(keys: KeyPool, timeout_secs: u64) -> Result<Self, YoutubeError> {
        Self::with_base_url(keys, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`YoutubeError::Api`] if `base_url` is not a
    /// valid URL.
    pub fn with_base_url(
        keys: KeyPool,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, YoutubeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("brandpulse/0.1 (comment-ingestion)")
            .build()
            .map_err(http_error)?;

        // Exactly one trailing slash; `build_url` appends endpoints to it.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| YoutubeError::Api {
            status: 0,
            message: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self {
            client,
            keys,
            base_url,
        })
    }

    /// Searches videos matching `query`, returning at most `max_results`
    /// (capped at 50) hits. Results without a video id are dropped.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::QuotaExceeded`], [`YoutubeError::Forbidden`],
    ///   [`YoutubeError::Unauthorized`] for quota and credential failures.
    /// - [`YoutubeError::Api`] for other non-2xx statuses.
    /// - [`YoutubeError::Http`] on network failure.
    /// - [`YoutubeError::Deserialize`] if the body has an unexpected shape.
    pub async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<SearchHit>, YoutubeError> {
        let max_results = max_results.clamp(1, MAX_SEARCH_PAGE).to_string();
        let url = self.build_url(
            "search",
            &[
                ("part", "id,snippet"),
                ("q", query),
                ("maxResults", &max_results),
                ("type", "video"),
            ],
        );
        let response: SearchListResponse = self.request_json(url, "search.list").await?;

        let hits = response
            .items
            .into_iter()
            .filter_map(|item| {
                let Some(video_id) = item.id.video_id else {
                    tracing::debug!(kind = %item.id.kind, "skipping search result without videoId");
                    return None;
                };
                Some(SearchHit {
                    video_id,
                    title: item.snippet.title,
                    description: item.snippet.description,
                })
            })
            .collect();
        Ok(hits)
    }

    /// Fetches statistics and the full description for one video.
    ///
    /// # Errors
    ///
    /// As [`YoutubeClient::search`], plus [`YoutubeError::VideoNotFound`] when
    /// the API answers with no items.
    pub async fn video_stats(&self, video_id: &str) -> Result<VideoStats, YoutubeError> {
        let url = self.build_url("videos", &[("part", "statistics,snippet"), ("id", video_id)]);
        let response: VideoListResponse = self
            .request_json(url, &format!("videos.list(id={video_id})"))
            .await?;

        let item = response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| YoutubeError::VideoNotFound(video_id.to_string()))?;

        Ok(VideoStats {
            likes: parse_count(item.statistics.like_count.as_deref()),
            views: parse_count(item.statistics.view_count.as_deref()),
            comment_count: parse_count(item.statistics.comment_count.as_deref()),
            published_at: item.snippet.published_at.as_deref().and_then(parse_timestamp),
            description: item.snippet.description,
        })
    }

    /// Fetches one page of top-level comments in plain-text format.
    ///
    /// Comments whose `publishedAt` is missing or unparseable are dropped.
    ///
    /// # Errors
    ///
    /// As [`YoutubeClient::search`]. Videos with comments disabled answer
    /// with [`YoutubeError::Forbidden`].
    pub async fn comment_page(
        &self,
        video_id: &str,
        page_token: Option<&str>,
    ) -> Result<CommentPage, YoutubeError> {
        let mut params = vec![
            ("part", "snippet"),
            ("videoId", video_id),
            ("maxResults", COMMENT_PAGE_SIZE),
            ("textFormat", "plainText"),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let url = self.build_url("commentThreads", &params);
        let response: CommentThreadListResponse = self
            .request_json(url, &format!("commentThreads.list(videoId={video_id})"))
            .await?;

        let comments = response
            .items
            .into_iter()
            .filter_map(|thread| {
                let top = thread.snippet.top_level_comment;
                let Some(published_at) = top.snippet.published_at.as_deref().and_then(parse_timestamp)
                else {
                    tracing::debug!(comment_id = %top.id, "dropping comment without a valid publishedAt");
                    return None;
                };
                Some(Comment {
                    id: top.id,
                    text: top.snippet.text_display,
                    author: top.snippet.author_display_name,
                    published_at,
                    like_count: top.snippet.like_count,
                })
            })
            .collect();

        Ok(CommentPage {
            comments,
            next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    /// Joins `endpoint` onto the base URL and appends the next pool key plus
    /// `params` as percent-encoded query pairs.
    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("{}{endpoint}", self.base_url.path()));
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", self.keys.next_key());
        }
        url
    }

    /// Sends a GET, maps non-2xx statuses through the API error envelope, and
    /// deserializes the body. `context` names the call without the key.
    async fn request_json<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<T, YoutubeError> {
        let response = self.client.get(url).send().await.map_err(http_error)?;
        let status = response.status();
        let body = response.text().await.map_err(http_error)?;

        if !status.is_success() {
            return Err(classify_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| YoutubeError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}

fn http_error(e: reqwest::Error) -> YoutubeError {
    YoutubeError::Http(e.without_url())
}

/// Maps an error response onto the quota/auth taxonomy.
fn classify_error(status: u16, body: &str) -> YoutubeError {
    let (message, reasons) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => (
            envelope.error.message,
            envelope
                .error
                .errors
                .into_iter()
                .map(|e| e.reason)
                .collect::<Vec<_>>(),
        ),
        Err(_) => (body.chars().take(200).collect(), Vec::new()),
    };
    let has_reason = |set: &[&str]| reasons.iter().any(|r| set.contains(&r.as_str()));

    match status {
        401 => YoutubeError::Unauthorized(message),
        403 if has_reason(QUOTA_REASONS) => YoutubeError::QuotaExceeded(message),
        403 if has_reason(AUTH_REASONS) => YoutubeError::Unauthorized(message),
        403 => YoutubeError::Forbidden(message),
        400 if has_reason(AUTH_REASONS) => YoutubeError::Unauthorized(message),
        429 => YoutubeError::QuotaExceeded(message),
        _ => YoutubeError::Api { status, message },
    }
}

fn parse_count(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.parse().ok())
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
