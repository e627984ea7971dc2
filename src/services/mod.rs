pub mod analyzer;
pub mod boundary;
pub mod catalog;
pub mod client;
pub mod decoder;
pub mod exporter;
pub mod loader;
pub mod range;
pub mod report;
pub mod segmenter;

#[cfg(test)]
pub(crate) mod mock;

pub use analyzer::AnalysisOrchestrator;
pub use boundary::{ErrorBoundary, Fault};
pub use catalog::ProjectCatalog;
pub use client::{BookAnalysisBackend, HttpBackend};
pub use decoder::TextDecoder;
pub use exporter::{ExportedDocument, ResultExporter, MARKDOWN_CONTENT_TYPE};
pub use loader::DocumentLoader;
pub use range::RangeSelector;
pub use report::{render_chapter_table, StatusLevel, StatusReport};
pub use segmenter::ChapterSegmenter;
