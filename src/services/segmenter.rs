use crate::error::{BookAnalysisError, Result};
use crate::services::client::BookAnalysisBackend;
use crate::types::{
    clamp_to, SplitRequest, SplitResult, FALLBACK_GROUP_SIZE_BOUNDS, MIN_CHAPTER_LENGTH_BOUNDS,
};
use tracing::{info, warn};

pub struct ChapterSegmenter;

impl ChapterSegmenter {
    /// Validates the input locally. Nothing is sent for blank text.
    pub fn build_request(
        text: &str,
        min_chapter_length: usize,
        fallback_paragraph_group_size: Option<usize>,
    ) -> Result<SplitRequest> {
        if text.trim().is_empty() {
            return Err(BookAnalysisError::validation("empty input"));
        }

        Ok(SplitRequest {
            content: text.to_string(),
            min_chapter_length: clamp_to(min_chapter_length, &MIN_CHAPTER_LENGTH_BOUNDS),
            fallback_paragraph_group_size: fallback_paragraph_group_size
                .map(|size| clamp_to(size, &FALLBACK_GROUP_SIZE_BOUNDS)),
        })
    }

    pub async fn segment(
        backend: &dyn BookAnalysisBackend,
        request: &SplitRequest,
    ) -> Result<SplitResult> {
        let result = backend.split(request).await?;
        let result = Self::normalize(result);

        info!(
            "Segmentation found {} chapters{}",
            result.total_chapters,
            result
                .note
                .as_deref()
                .map(|n| format!(" ({})", n))
                .unwrap_or_default()
        );

        Ok(result)
    }

    /// Restores the ordering and count guarantees downstream stages rely on.
    pub fn normalize(mut result: SplitResult) -> SplitResult {
        result.chapters.sort_by_key(|chapter| chapter.index);

        if result.total_chapters != result.chapters.len() {
            warn!(
                "Backend reported {} chapters but returned {} previews",
                result.total_chapters,
                result.chapters.len()
            );
            result.total_chapters = result.chapters.len();
        }

        result
    }
}
