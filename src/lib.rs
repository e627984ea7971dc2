//! # Book Analysis Client
//!
//! Drives the staged book-analysis workflow against a remote backend:
//! decode an uploaded `.txt` novel, split it into chapters, pick a chapter
//! range, run the analysis and export the resulting markdown report.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use book_analysis::{BackendConfig, DocumentLoader, HttpBackend, WorkflowSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = HttpBackend::new(&BackendConfig::default())?;
//!     let mut session = WorkflowSession::new();
//!
//!     // Decode the upload and split it into chapters
//!     session.load_document(DocumentLoader::load("novel.txt").await?);
//!     session.segment(&backend).await?;
//!
//!     // Analyze the first ten chapters
//!     session.set_end_chapter(10);
//!     session.analyze(&backend).await?;
//!
//!     if let Some(report) = session.clipboard_text() {
//!         println!("{}", report);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod services;
pub mod session;
pub mod types;

// Re-export main types and services for easier usage
pub use error::{BookAnalysisError, Result};
pub use services::{
    AnalysisOrchestrator, BookAnalysisBackend, ChapterSegmenter, DocumentLoader, ErrorBoundary,
    HttpBackend, ProjectCatalog, RangeSelector, ResultExporter, StatusLevel, StatusReport,
    TextDecoder,
};
pub use session::{Completion, WorkflowSession};
pub use types::{
    AnalysisRequestParams, AnalysisResult, BackendConfig, ChapterPreview, Document, Project,
    SplitResult,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock::MockBackend;

    #[tokio::test]
    async fn test_basic_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("三体.TXT");
        let content = format!(
            "Chapter 1\n{}\nChapter 2\n{}\nChapter 3\n{}\n",
            "汪淼 ".repeat(60),
            "叶文洁 ".repeat(60),
            "红岸 ".repeat(60)
        );
        let (encoded, _, _) = encoding_rs::GBK.encode(&content);
        std::fs::write(&path, &encoded).unwrap();

        let backend = MockBackend {
            embedding_saved_count: 6,
            ..MockBackend::default()
        };
        let params = AnalysisRequestParams::default()
            .with_max_chars(5000)
            .with_embedding(true, Some("p-1".to_string()));
        let mut session = WorkflowSession::with_params(params);

        // Decode
        let document = DocumentLoader::load(path.to_str().unwrap()).await.unwrap();
        assert_eq!(document.text(), content);
        session.load_document(document);

        // Segment
        session.segment(&backend).await.unwrap();
        let split = session.split_result().unwrap();
        assert_eq!(split.total_chapters, 3);
        assert_eq!(StatusReport::for_split(split).level, StatusLevel::Success);

        // Narrow the range and analyze
        session.set_start_chapter(2);
        session.analyze(&backend).await.unwrap();

        let request = backend.last_analyze_request().unwrap();
        assert_eq!((request.start_chapter, request.end_chapter), (2, 3));
        assert_eq!(request.project_id.as_deref(), Some("p-1"));

        let result = session.analysis().unwrap();
        assert_eq!(result.analyzed_range, "2-3");
        assert_eq!(result.embedding_saved_count, Some(6));
        let report = StatusReport::for_analysis(result);
        assert_eq!(report.level, StatusLevel::Success);

        // Export
        let export = session.export_download().unwrap();
        let written = ResultExporter::write_to_dir(&export, &dir.path().join("out"))
            .await
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(written).unwrap(),
            session.clipboard_text().unwrap()
        );
    }

    #[test]
    fn test_rendering_inside_boundary() {
        let mut boundary = ErrorBoundary::new("BookAnalysis");
        let split = SplitResult {
            total_chapters: 1,
            chapters: vec![ChapterPreview {
                index: 1,
                chapter_number: 1,
                title: "序章".to_string(),
                word_count: 800,
                preview: "很久以前".to_string(),
            }],
            note: None,
            detected_by_heading: Some(true),
        };

        let rendered = boundary
            .render(|| Ok::<_, BookAnalysisError>(StatusReport::for_split(&split).to_string()))
            .unwrap();
        assert!(rendered.contains("Detected 1 chapters"));
    }
}
