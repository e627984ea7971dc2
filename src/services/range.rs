use tracing::debug;

/// Inclusive chapter range picked for analysis.
///
/// Both ends are clamped to `[1, total]`, or `[1, 1]` before any
/// segmentation. A start past the end is kept as entered; the backend
/// decides whether it accepts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSelector {
    total_chapters: Option<usize>,
    start_chapter: usize,
    end_chapter: usize,
}

impl Default for RangeSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl RangeSelector {
    pub fn new() -> Self {
        Self {
            total_chapters: None,
            start_chapter: 1,
            end_chapter: 1,
        }
    }

    /// Re-derives bounds after a segmentation: start 1, end the last chapter.
    pub fn reset_for(&mut self, total_chapters: usize) {
        self.total_chapters = Some(total_chapters);
        self.start_chapter = 1;
        self.end_chapter = self.upper_bound();
        debug!(
            "Chapter range reset to {}-{}",
            self.start_chapter, self.end_chapter
        );
    }

    /// Forgets segmentation bounds, e.g. when the document changes.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn set_start(&mut self, chapter: usize) {
        self.start_chapter = self.clamp(chapter);
    }

    pub fn set_end(&mut self, chapter: usize) {
        self.end_chapter = self.clamp(chapter);
    }

    pub fn start(&self) -> usize {
        self.start_chapter
    }

    pub fn end(&self) -> usize {
        self.end_chapter
    }

    pub fn total_chapters(&self) -> Option<usize> {
        self.total_chapters
    }

    pub fn upper_bound(&self) -> usize {
        self.total_chapters.unwrap_or(1).max(1)
    }

    pub fn is_inverted(&self) -> bool {
        self.start_chapter > self.end_chapter
    }

    fn clamp(&self, chapter: usize) -> usize {
        chapter.clamp(1, self.upper_bound())
    }
}
