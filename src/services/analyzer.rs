use crate::error::{BookAnalysisError, Result};
use crate::services::client::BookAnalysisBackend;
use crate::types::{
    clamp_to, AnalysisRequestParams, AnalysisResult, AnalyzeRequest, EMBEDDING_CHUNK_SIZE_BOUNDS,
    FALLBACK_GROUP_SIZE_BOUNDS, MAX_CHARS_BOUNDS, MIN_CHAPTER_LENGTH_BOUNDS,
};
use tracing::{info, warn};

pub struct AnalysisOrchestrator;

impl AnalysisOrchestrator {
    /// Checks local preconditions and builds the wire request.
    ///
    /// Truncation is left to the backend: `max_chars` is forwarded and the
    /// text is sent whole.
    pub fn build_request(text: &str, params: &AnalysisRequestParams) -> Result<AnalyzeRequest> {
        if text.trim().is_empty() {
            return Err(BookAnalysisError::validation("empty input"));
        }

        let project_id = if params.embedding_enabled {
            match &params.embedding_target {
                Some(target) => Some(target.clone()),
                None => {
                    return Err(BookAnalysisError::validation(
                        "embedding is enabled but no target project was selected",
                    ))
                }
            }
        } else {
            None
        };

        if params.start_chapter > params.end_chapter {
            warn!(
                "Submitting inverted chapter range {}-{}",
                params.start_chapter, params.end_chapter
            );
        }

        Ok(AnalyzeRequest {
            content: text.to_string(),
            project_id,
            enable_embedding: params.embedding_enabled,
            start_chapter: params.start_chapter,
            end_chapter: params.end_chapter,
            min_chapter_length: clamp_to(params.min_chapter_length, &MIN_CHAPTER_LENGTH_BOUNDS),
            max_chars: clamp_to(params.max_chars, &MAX_CHARS_BOUNDS),
            embedding_chunk_size: params
                .embedding_chunk_size
                .filter(|_| params.embedding_enabled)
                .map(|size| clamp_to(size, &EMBEDDING_CHUNK_SIZE_BOUNDS)),
            fallback_paragraph_group_size: params
                .fallback_paragraph_group_size
                .map(|size| clamp_to(size, &FALLBACK_GROUP_SIZE_BOUNDS)),
        })
    }

    pub async fn analyze(
        backend: &dyn BookAnalysisBackend,
        request: &AnalyzeRequest,
    ) -> Result<AnalysisResult> {
        let result = backend.analyze(request).await?.normalized();

        if result.analyzed_chars > request.max_chars {
            warn!(
                "Backend analyzed {} chars, above the requested cap of {}",
                result.analyzed_chars, request.max_chars
            );
        }

        info!(
            "Analysis of chapters {} finished: {} chars, truncated: {}",
            result.analyzed_range, result.analyzed_chars, result.truncated
        );

        if let Some(error) = &result.embedding_error {
            warn!("Embedding write partially failed: {}", error);
        } else if let Some(saved) = result.embedding_saved_count {
            info!("Saved {} embedding records", saved);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock::MockBackend;

    fn novel(chapters: usize, body_len: usize) -> String {
        (1..=chapters)
            .map(|n| format!("Chapter {}\n{}\n", n, "x".repeat(body_len)))
            .collect()
    }

    #[test]
    fn test_blank_text_is_rejected() {
        let err =
            AnalysisOrchestrator::build_request("   ", &AnalysisRequestParams::default()).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_embedding_requires_target() {
        let params = AnalysisRequestParams::default().with_embedding(true, None);
        let err = AnalysisOrchestrator::build_request("Chapter 1\nbody", &params).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_project_only_sent_with_embedding() {
        let params = AnalysisRequestParams::default()
            .with_embedding(false, Some("p-1".to_string()))
            .with_embedding_chunk_size(Some(1800));
        let request = AnalysisOrchestrator::build_request("text", &params).unwrap();
        assert_eq!(request.project_id, None);
        assert_eq!(request.embedding_chunk_size, None);

        let params = params.with_embedding(true, Some("p-1".to_string()));
        let request = AnalysisOrchestrator::build_request("text", &params).unwrap();
        assert_eq!(request.project_id.as_deref(), Some("p-1"));
        assert_eq!(request.embedding_chunk_size, Some(1800));
    }

    #[test]
    fn test_out_of_bounds_params_are_clamped() {
        let params = AnalysisRequestParams {
            min_chapter_length: 5,
            max_chars: 100,
            embedding_target: Some("p-1".to_string()),
            embedding_enabled: true,
            embedding_chunk_size: Some(50_000),
            fallback_paragraph_group_size: Some(1),
            ..AnalysisRequestParams::default()
        };

        let request = AnalysisOrchestrator::build_request("text", &params).unwrap();
        assert_eq!(request.min_chapter_length, 20);
        assert_eq!(request.max_chars, 5000);
        assert_eq!(request.embedding_chunk_size, Some(4000));
        assert_eq!(request.fallback_paragraph_group_size, Some(5));
    }

    #[test]
    fn test_inverted_range_is_forwarded() {
        let params = AnalysisRequestParams {
            start_chapter: 5,
            end_chapter: 2,
            ..AnalysisRequestParams::default()
        };
        let request = AnalysisOrchestrator::build_request("text", &params).unwrap();
        assert_eq!((request.start_chapter, request.end_chapter), (5, 2));
    }

    #[tokio::test]
    async fn test_truncation_is_reported_by_backend() {
        let backend = MockBackend::new();
        let text = novel(2, 100_000);
        let params = AnalysisRequestParams {
            start_chapter: 1,
            end_chapter: 2,
            ..AnalysisRequestParams::default()
        };

        let request = AnalysisOrchestrator::build_request(&text, &params).unwrap();
        assert_eq!(request.content, text);

        let result = AnalysisOrchestrator::analyze(&backend, &request).await.unwrap();
        assert!(result.truncated);
        assert_eq!(result.analyzed_chars, 160_000);
        assert_eq!(result.embedding_saved_count, None);
    }

    #[tokio::test]
    async fn test_partial_embedding_failure_is_not_an_error() {
        let backend = MockBackend {
            embedding_error: Some("timeout".to_string()),
            ..MockBackend::default()
        };
        let params = AnalysisRequestParams::default().with_embedding(true, Some("p-1".to_string()));
        let request = AnalysisOrchestrator::build_request(&novel(1, 50), &params).unwrap();

        let result = AnalysisOrchestrator::analyze(&backend, &request).await.unwrap();
        assert!(!result.result_document.is_empty());
        assert_eq!(result.embedding_error.as_deref(), Some("timeout"));
        assert!(result.has_embedding_failure());
    }
}
