use crate::error::{BookAnalysisError, Result};
use crate::types::AnalysisResult;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

pub const MARKDOWN_CONTENT_TYPE: &str = "text/markdown;charset=utf-8";

static EXPORT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub struct ResultExporter;

impl ResultExporter {
    pub fn to_clipboard_text(result: Option<&AnalysisResult>) -> Option<String> {
        result.map(|r| r.result_document.clone())
    }

    pub fn to_downloadable(
        result: Option<&AnalysisResult>,
        source_name: Option<&str>,
    ) -> Option<ExportedDocument> {
        let result = result?;

        Some(ExportedDocument {
            filename: Self::generate_filename(source_name),
            content_type: MARKDOWN_CONTENT_TYPE,
            bytes: result.result_document.as_bytes().to_vec(),
        })
    }

    /// `book-analysis_<stem>_<timestamp>_<seq>.md`, unique per call.
    pub fn generate_filename(source_name: Option<&str>) -> String {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S%3f");
        let sequence = EXPORT_SEQUENCE.fetch_add(1, Ordering::Relaxed);

        match source_name.and_then(Self::sanitize_stem) {
            Some(stem) => format!("book-analysis_{}_{}_{}.md", stem, timestamp, sequence),
            None => format!("book-analysis_{}_{}.md", timestamp, sequence),
        }
    }

    fn sanitize_stem(source_name: &str) -> Option<String> {
        static UNSAFE_CHARS: OnceLock<Regex> = OnceLock::new();
        let pattern = UNSAFE_CHARS
            .get_or_init(|| Regex::new(r"[^\w\-]+").expect("static pattern compiles"));

        let stem = Path::new(source_name).file_stem()?.to_str()?;
        let cleaned = pattern.replace_all(stem, "_");
        let cleaned = cleaned.trim_matches('_');

        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned.chars().take(60).collect())
        }
    }

    /// Writes the export into `output_dir`, refusing to replace an existing file.
    pub async fn write_to_dir(document: &ExportedDocument, output_dir: &Path) -> Result<PathBuf> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir).await.map_err(|e| BookAnalysisError::Export {
                reason: format!("Failed to create output directory: {}", e),
            })?;
            info!("Created output directory: {}", output_dir.display());
        }

        let path = output_dir.join(&document.filename);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| BookAnalysisError::Export {
                reason: format!("Failed to create {}: {}", path.display(), e),
            })?;

        file.write_all(&document.bytes).await?;
        file.flush().await?;

        info!("Exported analysis to {}", path.display());
        Ok(path)
    }
}
