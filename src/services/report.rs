use crate::types::{AnalysisResult, ChapterPreview, SplitResult};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub level: StatusLevel,
    pub headline: String,
    pub details: Vec<String>,
}

impl StatusReport {
    pub fn for_split(split: &SplitResult) -> Self {
        let mut details = Vec::new();
        if let Some(note) = &split.note {
            details.push(note.clone());
        }
        if split.detected_by_heading == Some(false) {
            details.push("Chapters were grouped by paragraphs, not headings".to_string());
        }

        if split.total_chapters == 0 {
            return Self {
                level: StatusLevel::Warning,
                headline: "No chapters were detected".to_string(),
                details,
            };
        }

        Self {
            level: StatusLevel::Success,
            headline: format!("Detected {} chapters", split.total_chapters),
            details,
        }
    }

    /// Truncation or a failed embedding write downgrades the result to a
    /// warning; the analysis itself is still shown as complete.
    pub fn for_analysis(result: &AnalysisResult) -> Self {
        let mut details = vec![format!(
            "Analyzed chapters {} ({} characters)",
            result.analyzed_range, result.analyzed_chars
        )];

        if result.truncated {
            details.push(format!(
                "Input exceeded the character limit and was truncated to {} characters",
                result.analyzed_chars
            ));
        }

        if result.embedding_enabled {
            match &result.embedding_error {
                Some(error) => details.push(format!("Embedding write failed: {}", error)),
                None => {
                    let saved = result.embedding_saved_count.unwrap_or(0);
                    match &result.embedding_project_id {
                        Some(project) => details.push(format!(
                            "Saved {} embedding records to project {}",
                            saved, project
                        )),
                        None => details.push(format!("Saved {} embedding records", saved)),
                    }
                }
            }
        }

        let (level, headline) = match (result.truncated, result.has_embedding_failure()) {
            (false, false) => (StatusLevel::Success, "Analysis complete"),
            (true, false) => (StatusLevel::Warning, "Analysis complete (input truncated)"),
            (false, true) => (StatusLevel::Warning, "Analysis complete, embedding write failed"),
            (true, true) => (
                StatusLevel::Warning,
                "Analysis complete (input truncated), embedding write failed",
            ),
        };

        Self {
            level,
            headline: headline.to_string(),
            details,
        }
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.level {
            StatusLevel::Success => "✓",
            StatusLevel::Warning => "!",
        };
        writeln!(f, "{} {}", marker, self.headline)?;
        for detail in &self.details {
            writeln!(f, "  - {}", detail)?;
        }
        Ok(())
    }
}

pub fn render_chapter_table(chapters: &[ChapterPreview], detailed: bool) -> String {
    let mut out = String::new();

    for chapter in chapters {
        out.push_str(&format!(
            "  {:>4}. [#{}] {} ({} words)\n",
            chapter.index, chapter.chapter_number, chapter.title, chapter.word_count
        ));
        if detailed && !chapter.preview.is_empty() {
            out.push_str(&format!("        {}\n", chapter.preview));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> AnalysisResult {
        AnalysisResult {
            result_document: "| 章节 | 梗概 |".to_string(),
            analyzed_range: "1-12".to_string(),
            analyzed_chars: 48_000,
            truncated: false,
            total_chapters: 12,
            chapters: Vec::new(),
            embedding_enabled: false,
            embedding_project_id: None,
            embedding_saved_count: None,
            embedding_error: None,
        }
    }

    #[test]
    fn test_plain_success() {
        let report = StatusReport::for_analysis(&result());
        assert_eq!(report.level, StatusLevel::Success);
        assert_eq!(report.details.len(), 1);
    }

    #[test]
    fn test_truncation_is_a_warning() {
        let result = AnalysisResult {
            truncated: true,
            analyzed_chars: 160_000,
            ..result()
        };
        let report = StatusReport::for_analysis(&result);
        assert_eq!(report.level, StatusLevel::Warning);
        assert!(report.details.iter().any(|d| d.contains("160000")));
    }

    #[test]
    fn test_embedding_success_notice() {
        let result = AnalysisResult {
            embedding_enabled: true,
            embedding_saved_count: Some(42),
            ..result()
        };
        let report = StatusReport::for_analysis(&result);
        assert_eq!(report.level, StatusLevel::Success);
        assert!(report.details.iter().any(|d| d.contains("Saved 42 embedding records")));
    }

    #[test]
    fn test_embedding_failure_is_qualified_success() {
        let result = AnalysisResult {
            embedding_enabled: true,
            embedding_saved_count: Some(0),
            embedding_error: Some("timeout".to_string()),
            ..result()
        };
        let report = StatusReport::for_analysis(&result);
        assert_eq!(report.level, StatusLevel::Warning);
        assert!(report.headline.starts_with("Analysis complete"));
        assert!(report.details.iter().any(|d| d.contains("Analyzed chapters 1-12")));
        assert!(report.details.iter().any(|d| d.contains("timeout")));
    }

    #[test]
    fn test_split_report() {
        let split = SplitResult {
            total_chapters: 0,
            chapters: Vec::new(),
            note: Some("no stable headings".to_string()),
            detected_by_heading: Some(false),
        };
        let report = StatusReport::for_split(&split);
        assert_eq!(report.level, StatusLevel::Warning);
        assert_eq!(report.details.len(), 2);
        assert!(report.to_string().contains("no stable headings"));
    }

    #[test]
    fn test_chapter_table() {
        let chapters = vec![ChapterPreview {
            index: 1,
            chapter_number: 3,
            title: "第三章 夜雨".to_string(),
            word_count: 3200,
            preview: "雨下了一夜".to_string(),
        }];
        let table = render_chapter_table(&chapters, true);
        assert!(table.contains("[#3] 第三章 夜雨 (3200 words)"));
        assert!(table.contains("雨下了一夜"));
        assert!(!render_chapter_table(&chapters, false).contains("雨下了一夜"));
    }
}
