//! Video discovery: one search for the keyword set, keep the results whose
//! title and description mention enough of the keywords.

use std::sync::LazyLock;

use brandpulse_core::Video;
use regex::Regex;

use crate::error::PlatformError;
use crate::traits::VideoPlatform;

/// Keywords beyond this many are left out of the search query but still
/// count toward the match ratio.
pub const MAX_QUERY_KEYWORDS: usize = 5;

static HASHTAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\S+").expect("valid regex"));

/// OR-joins the first [`MAX_QUERY_KEYWORDS`] keywords into a search query.
#[must_use]
pub fn build_query(keywords: &[String]) -> String {
    keywords
        .iter()
        .take(MAX_QUERY_KEYWORDS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Number of keywords whose lowercase form occurs in `title` or
/// `description`.
#[must_use]
pub fn matched_keywords(keywords: &[String], title: &str, description: &str) -> usize {
    let haystack = format!("{title} {description}").to_lowercase();
    keywords
        .iter()
        .filter(|kw| haystack.contains(&kw.to_lowercase()))
        .count()
}

/// Every `#tag` in `description`, in order of appearance.
#[must_use]
pub fn extract_hashtags(description: &str) -> Vec<String> {
    HASHTAG_RE
        .find_iter(description)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[must_use]
pub fn video_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

#[allow(clippy::cast_precision_loss)]
fn is_accepted(hits: usize, total: usize, min_ratio: f64) -> bool {
    total > 0 && hits as f64 / total as f64 >= min_ratio
}

/// Searches for `keywords` and returns the accepted videos with their
/// statistics.
///
/// A failed statistics call drops that one video.
///
/// # Errors
///
/// Returns [`PlatformError`] if the search call itself fails.
pub async fn discover(
    platform: &dyn VideoPlatform,
    keywords: &[String],
    max_results: u32,
    min_ratio: f64,
) -> Result<Vec<Video>, PlatformError> {
    let query = build_query(keywords);
    let hits = platform.search(&query, max_results).await?;
    tracing::info!(query = %query, candidates = hits.len(), "search complete");

    let mut videos = Vec::new();
    for hit in hits {
        let keyword_hits = matched_keywords(keywords, &hit.title, &hit.description);
        if !is_accepted(keyword_hits, keywords.len(), min_ratio) {
            tracing::debug!(video_id = %hit.video_id, keyword_hits, "video rejected");
            continue;
        }

        let stats = match platform.video_stats(&hit.video_id).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(video_id = %hit.video_id, error = %e, "skipping video: stats unavailable");
                continue;
            }
        };

        let description = if stats.description.is_empty() {
            hit.description
        } else {
            stats.description.clone()
        };

        videos.push(Video {
            url: video_url(&hit.video_id),
            hashtags: extract_hashtags(&description),
            id: hit.video_id,
            title: hit.title,
            description,
            stats,
            keyword_hits,
        });
    }

    tracing::info!(accepted = videos.len(), "discovery complete");
    Ok(videos)
}
