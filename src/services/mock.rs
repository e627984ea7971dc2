//! Scripted backend for tests.

use crate::error::{BookAnalysisError, Result};
use crate::services::client::BookAnalysisBackend;
use crate::types::{AnalysisResult, AnalyzeRequest, ChapterPreview, SplitRequest, SplitResult};
use async_trait::async_trait;
use regex::Regex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct MockBackend {
    pub fail_split: bool,
    pub fail_analyze: bool,
    pub fail_projects: bool,
    pub embedding_saved_count: u64,
    pub embedding_error: Option<String>,
    pub projects: serde_json::Value,
    pub split_calls: AtomicUsize,
    pub analyze_calls: AtomicUsize,
    pub project_calls: AtomicUsize,
    pub last_analyze: Mutex<Option<AnalyzeRequest>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn split_count(&self) -> usize {
        self.split_calls.load(Ordering::SeqCst)
    }

    pub fn analyze_count(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn project_count(&self) -> usize {
        self.project_calls.load(Ordering::SeqCst)
    }

    pub fn last_analyze_request(&self) -> Option<AnalyzeRequest> {
        self.last_analyze.lock().unwrap().clone()
    }

    fn server_error() -> BookAnalysisError {
        BookAnalysisError::HttpStatus {
            status: 500,
            detail: "internal error".to_string(),
        }
    }

    /// Splits on lines that start with `Chapter N`.
    pub fn chapters_of(content: &str) -> Vec<(ChapterPreview, String)> {
        let heading = Regex::new(r"^Chapter\s+(\d+)").unwrap();
        let mut chapters: Vec<(ChapterPreview, String)> = Vec::new();

        for line in content.lines() {
            if let Some(caps) = heading.captures(line.trim()) {
                let number = caps[1].parse().unwrap_or(0);
                chapters.push((
                    ChapterPreview {
                        index: chapters.len() + 1,
                        chapter_number: number,
                        title: line.trim().to_string(),
                        word_count: 0,
                        preview: String::new(),
                    },
                    String::new(),
                ));
            } else if let Some((preview, body)) = chapters.last_mut() {
                body.push_str(line);
                body.push('\n');
                preview.word_count = body.chars().filter(|c| !c.is_whitespace()).count();
                preview.preview = body.chars().take(20).collect();
            }
        }

        chapters
    }
}

#[async_trait]
impl BookAnalysisBackend for MockBackend {
    async fn split(&self, request: &SplitRequest) -> Result<SplitResult> {
        self.split_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_split {
            return Err(Self::server_error());
        }

        let chapters: Vec<ChapterPreview> = Self::chapters_of(&request.content)
            .into_iter()
            .map(|(preview, _)| preview)
            .collect();

        Ok(SplitResult {
            total_chapters: chapters.len(),
            chapters,
            note: None,
            detected_by_heading: Some(true),
        })
    }

    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisResult> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_analyze.lock().unwrap() = Some(request.clone());
        if self.fail_analyze {
            return Err(Self::server_error());
        }

        let chapters = Self::chapters_of(&request.content);
        let selected: Vec<(ChapterPreview, String)> = chapters
            .iter()
            .filter(|(p, _)| p.index >= request.start_chapter && p.index <= request.end_chapter)
            .cloned()
            .collect();
        let source_chars: usize = if selected.is_empty() {
            request.content.chars().count()
        } else {
            selected.iter().map(|(_, body)| body.chars().count()).sum()
        };
        let truncated = source_chars > request.max_chars;

        Ok(AnalysisResult {
            result_document: format!(
                "| range | chars |\n| {}-{} | {} |",
                request.start_chapter,
                request.end_chapter,
                source_chars.min(request.max_chars)
            ),
            analyzed_range: format!("{}-{}", request.start_chapter, request.end_chapter),
            analyzed_chars: source_chars.min(request.max_chars),
            truncated,
            total_chapters: chapters.len(),
            chapters: selected.into_iter().map(|(p, _)| p).collect(),
            embedding_enabled: request.enable_embedding,
            embedding_project_id: request.project_id.clone(),
            embedding_saved_count: Some(self.embedding_saved_count),
            embedding_error: self.embedding_error.clone(),
        })
    }

    async fn list_projects(&self) -> Result<serde_json::Value> {
        self.project_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_projects {
            return Err(Self::server_error());
        }
        Ok(self.projects.clone())
    }
}
