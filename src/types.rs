use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;

pub const MIN_CHAPTER_LENGTH_BOUNDS: RangeInclusive<usize> = 20..=5000;
pub const MAX_CHARS_BOUNDS: RangeInclusive<usize> = 5000..=400_000;
pub const EMBEDDING_CHUNK_SIZE_BOUNDS: RangeInclusive<usize> = 300..=4000;
pub const FALLBACK_GROUP_SIZE_BOUNDS: RangeInclusive<usize> = 5..=200;

pub const DEFAULT_MIN_CHAPTER_LENGTH: usize = 100;
pub const DEFAULT_MAX_CHARS: usize = 160_000;

pub(crate) fn clamp_to(value: usize, bounds: &RangeInclusive<usize>) -> usize {
    value.clamp(*bounds.start(), *bounds.end())
}

/// A decoded input document. Replaced wholesale, never edited in place.
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    bytes: Vec<u8>,
    text: String,
    loaded_at: String,
}

impl Document {
    pub fn new(source: impl Into<String>, bytes: Vec<u8>, text: String) -> Self {
        Self {
            source: source.into(),
            bytes,
            text,
            loaded_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Pasted text skips decoding; the bytes are its UTF-8 form.
    pub fn from_text(source: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(source, text.as_bytes().to_vec(), text)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn loaded_at(&self) -> &str {
        &self.loaded_at
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterPreview {
    pub index: usize,
    pub chapter_number: u64,
    pub title: String,
    pub word_count: usize,
    pub preview: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitResult {
    pub total_chapters: usize,
    pub chapters: Vec<ChapterPreview>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_by_heading: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(rename = "result_markdown", alias = "result_document")]
    pub result_document: String,
    pub analyzed_range: String,
    pub analyzed_chars: usize,
    pub truncated: bool,
    #[serde(default)]
    pub total_chapters: usize,
    #[serde(default)]
    pub chapters: Vec<ChapterPreview>,
    #[serde(default)]
    pub embedding_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_saved_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_error: Option<String>,
}

impl AnalysisResult {
    /// Embedding fields only carry meaning when embedding was enabled.
    pub fn normalized(mut self) -> Self {
        if self.embedding_enabled {
            self.embedding_saved_count.get_or_insert(0);
        } else {
            self.embedding_project_id = None;
            self.embedding_saved_count = None;
            self.embedding_error = None;
        }
        self
    }

    pub fn has_embedding_failure(&self) -> bool {
        self.embedding_enabled && self.embedding_error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequestParams {
    pub min_chapter_length: usize,
    pub start_chapter: usize,
    pub end_chapter: usize,
    pub max_chars: usize,
    pub embedding_target: Option<String>,
    pub embedding_enabled: bool,
    pub embedding_chunk_size: Option<usize>,
    pub fallback_paragraph_group_size: Option<usize>,
}

impl Default for AnalysisRequestParams {
    fn default() -> Self {
        Self {
            min_chapter_length: DEFAULT_MIN_CHAPTER_LENGTH,
            start_chapter: 1,
            end_chapter: 1,
            max_chars: DEFAULT_MAX_CHARS,
            embedding_target: None,
            embedding_enabled: false,
            embedding_chunk_size: None,
            fallback_paragraph_group_size: None,
        }
    }
}

impl AnalysisRequestParams {
    pub fn with_min_chapter_length(mut self, value: usize) -> Self {
        self.min_chapter_length = clamp_to(value, &MIN_CHAPTER_LENGTH_BOUNDS);
        self
    }

    pub fn with_max_chars(mut self, value: usize) -> Self {
        self.max_chars = clamp_to(value, &MAX_CHARS_BOUNDS);
        self
    }

    pub fn with_embedding_chunk_size(mut self, value: Option<usize>) -> Self {
        self.embedding_chunk_size = value.map(|v| clamp_to(v, &EMBEDDING_CHUNK_SIZE_BOUNDS));
        self
    }

    pub fn with_fallback_group_size(mut self, value: Option<usize>) -> Self {
        self.fallback_paragraph_group_size =
            value.map(|v| clamp_to(v, &FALLBACK_GROUP_SIZE_BOUNDS));
        self
    }

    pub fn with_embedding(mut self, enabled: bool, target: Option<String>) -> Self {
        self.embedding_enabled = enabled;
        self.embedding_target = target.filter(|t| !t.trim().is_empty());
        self
    }
}

/// Wire body for the segmentation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRequest {
    pub content: String,
    pub min_chapter_length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_paragraph_group_size: Option<usize>,
}

/// Wire body for the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub enable_embedding: bool,
    pub start_chapter: usize,
    pub end_chapter: usize,
    pub min_chapter_length: usize,
    pub max_chars: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_chunk_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_paragraph_group_size: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/".to_string(),
            token: None,
            timeout: Duration::from_secs(300),
        }
    }
}
