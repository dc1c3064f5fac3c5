use std::collections::HashSet;

use brandpulse_core::Comment;

use crate::error::PlatformError;
use crate::traits::VideoPlatform;

/// Pages through a video's top-level comments until `max_comments` are
/// collected or the cursor runs out. An empty page or a cursor that was
/// already followed also ends the harvest.
///
/// # Errors
///
/// Any page failure abandons the whole video and returns the error; the
/// comments gathered so far are discarded.
pub async fn harvest_comments(
    platform: &dyn VideoPlatform,
    video_id: &str,
    max_comments: usize,
) -> Result<Vec<Comment>, PlatformError> {
    let mut comments = Vec::new();
    let mut page_token: Option<String> = None;
    let mut followed = HashSet::new();

    while comments.len() < max_comments {
        let page = platform
            .comment_page(video_id, page_token.as_deref())
            .await?;
        if page.comments.is_empty() {
            break;
        }

        let room = max_comments - comments.len();
        comments.extend(page.comments.into_iter().take(room));

        match page.next_page_token {
            Some(token) if followed.insert(token.clone()) => page_token = Some(token),
            Some(token) => {
                tracing::warn!(video_id, token = %token, "comment cursor repeated; stopping");
                break;
            }
            None => break,
        }
    }

    tracing::debug!(video_id, comments = comments.len(), "harvest complete");
    Ok(comments)
}
