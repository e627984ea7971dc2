use crate::error::{BookAnalysisError, Result};
use crate::services::decoder::TextDecoder;
use crate::types::Document;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};
use url::Url;
use walkdir::WalkDir;

pub const STDIN_SOURCE: &str = "-";

pub struct DocumentLoader;

impl DocumentLoader {
    pub async fn load(source: &str) -> Result<Document> {
        if source == STDIN_SOURCE {
            Self::load_from_stdin().await
        } else if Self::is_url(source) {
            Self::load_from_url(source).await
        } else {
            Self::load_from_file(source).await
        }
    }

    /// Only plain `.txt` uploads are accepted, compared case-insensitively.
    pub fn is_supported_name(name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("txt"))
            .unwrap_or(false)
    }

    fn ensure_supported(name: &str) -> Result<()> {
        if Self::is_supported_name(name) {
            Ok(())
        } else {
            warn!("Rejected '{}': only .txt files are accepted", name);
            Err(BookAnalysisError::UnsupportedFile {
                filename: name.to_string(),
            })
        }
    }

    async fn load_from_stdin() -> Result<Document> {
        info!("Reading pasted text from stdin");

        let mut bytes = Vec::new();
        tokio::io::stdin().read_to_end(&mut bytes).await?;
        let text = TextDecoder::decode(&bytes);

        Ok(Document::new("pasted.txt", bytes, text))
    }

    async fn load_from_url(url: &str) -> Result<Document> {
        let parsed_url = Url::parse(url)?;
        let filename = Self::extract_filename_from_url(&parsed_url);
        Self::ensure_supported(&filename)?;

        info!("Fetching document from URL: {}", url);
        let response = reqwest::get(parsed_url).await?;

        if !response.status().is_success() {
            return Err(BookAnalysisError::HttpStatus {
                status: response.status().as_u16(),
                detail: format!("failed to fetch {}", url),
            });
        }

        let bytes = response.bytes().await?.to_vec();
        let text = TextDecoder::decode(&bytes);

        Ok(Document::new(filename, bytes, text))
    }

    async fn load_from_file(file_path: &str) -> Result<Document> {
        let path = Path::new(file_path);
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(file_path)
            .to_string();
        Self::ensure_supported(&filename)?;

        if !path.is_file() {
            return Err(BookAnalysisError::FileNotFound {
                path: file_path.to_string(),
            });
        }

        info!("Reading file: {}", file_path);
        let bytes = fs::read(path).await?;
        let text = TextDecoder::decode(&bytes);

        Ok(Document::new(filename, bytes, text))
    }

    fn is_url(source: &str) -> bool {
        source.starts_with("http://") || source.starts_with("https://")
    }

    fn extract_filename_from_url(url: &Url) -> String {
        url.path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .unwrap_or("download")
            .to_string()
    }

    /// Expands directory sources into the `.txt` files beneath them.
    ///
    /// Returns the accepted sources and the names that were rejected.
    pub fn expand_sources(sources: &[String]) -> Result<(Vec<String>, Vec<String>)> {
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();

        for source in sources {
            let path = Path::new(source);
            if source == STDIN_SOURCE || Self::is_url(source) || !path.is_dir() {
                accepted.push(source.clone());
                continue;
            }

            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.map_err(|e| BookAnalysisError::Io(e.into()))?;
                if !entry.file_type().is_file() {
                    continue;
                }

                let entry_path = entry.path().to_string_lossy().to_string();
                if Self::is_supported_name(&entry_path) {
                    accepted.push(entry_path);
                } else {
                    rejected.push(entry_path);
                }
            }
        }

        Ok((accepted, rejected))
    }
}
