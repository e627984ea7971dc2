//! Workflow session: owns the document, segmentation and analysis state.
//!
//! Each remote stage is split into `begin_*` (validate, build the request,
//! stamp it with a generation) and `complete_*` (apply the response if it is
//! still the latest). The `segment` and `analyze` helpers run both halves
//! back to back for callers that await inline.

use crate::error::{BookAnalysisError, Result};
use crate::services::analyzer::AnalysisOrchestrator;
use crate::services::catalog::ProjectCatalog;
use crate::services::client::BookAnalysisBackend;
use crate::services::exporter::{ExportedDocument, ResultExporter};
use crate::services::range::RangeSelector;
use crate::services::segmenter::ChapterSegmenter;
use crate::types::{
    AnalysisRequestParams, AnalysisResult, AnalyzeRequest, Document, Project, SplitRequest,
    SplitResult,
};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct SegmentationTicket {
    pub generation: u64,
    pub request: SplitRequest,
}

#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    pub generation: u64,
    pub request: AnalyzeRequest,
}

/// Outcome of applying a remote response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

#[derive(Debug, Default)]
pub struct WorkflowSession {
    document: Option<Document>,
    split: Option<SplitResult>,
    analysis: Option<AnalysisResult>,
    range: RangeSelector,
    params: AnalysisRequestParams,
    catalog: ProjectCatalog,
    segment_generation: u64,
    analysis_generation: u64,
    segmenting: bool,
    /// Generation of the analysis call still awaiting its completion.
    analysis_in_flight: Option<u64>,
}

impl WorkflowSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: AnalysisRequestParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Replaces the document and discards everything derived from the old one.
    /// In-flight responses for the old text become stale.
    pub fn load_document(&mut self, document: Document) {
        info!(
            "Loaded '{}' ({} bytes, {} chars)",
            document.source(),
            document.bytes().len(),
            document.char_count()
        );

        self.document = Some(document);
        self.split = None;
        self.analysis = None;
        self.range.clear();
        self.segment_generation += 1;
        self.analysis_generation += 1;
        self.segmenting = false;
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn split_result(&self) -> Option<&SplitResult> {
        self.split.as_ref()
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn range(&self) -> &RangeSelector {
        &self.range
    }

    pub fn set_start_chapter(&mut self, chapter: usize) {
        self.range.set_start(chapter);
    }

    pub fn set_end_chapter(&mut self, chapter: usize) {
        self.range.set_end(chapter);
    }

    pub fn params(&self) -> &AnalysisRequestParams {
        &self.params
    }

    /// Settings other than the chapter range, which the range selector owns.
    pub fn set_params(&mut self, params: AnalysisRequestParams) {
        self.params = params;
    }

    /// The parameters the next analysis would be submitted with.
    pub fn request_params(&self) -> AnalysisRequestParams {
        AnalysisRequestParams {
            start_chapter: self.range.start(),
            end_chapter: self.range.end(),
            ..self.params.clone()
        }
    }

    pub fn is_segmenting(&self) -> bool {
        self.segmenting
    }

    pub fn is_analyzing(&self) -> bool {
        self.analysis_in_flight.is_some()
    }

    fn text(&self) -> &str {
        self.document.as_ref().map(Document::text).unwrap_or("")
    }

    pub fn begin_segmentation(&mut self) -> Result<SegmentationTicket> {
        let request = ChapterSegmenter::build_request(
            self.text(),
            self.params.min_chapter_length,
            self.params.fallback_paragraph_group_size,
        )?;

        self.segment_generation += 1;
        self.segmenting = true;
        debug!("Issued segmentation #{}", self.segment_generation);

        Ok(SegmentationTicket {
            generation: self.segment_generation,
            request,
        })
    }

    /// Applies a segmentation response. Stale responses are dropped whether
    /// they succeeded or not; a failure leaves earlier results in place.
    pub fn complete_segmentation(
        &mut self,
        generation: u64,
        outcome: Result<SplitResult>,
    ) -> Result<Completion> {
        if generation != self.segment_generation {
            debug!(
                "Discarding stale segmentation #{} (latest #{})",
                generation, self.segment_generation
            );
            return Ok(Completion::Stale);
        }
        self.segmenting = false;

        let split = outcome?;
        self.range.reset_for(split.total_chapters);
        self.analysis = None;
        self.analysis_generation += 1;
        self.split = Some(split);

        Ok(Completion::Applied)
    }

    pub async fn segment(&mut self, backend: &dyn BookAnalysisBackend) -> Result<Completion> {
        let ticket = self.begin_segmentation()?;
        let outcome = ChapterSegmenter::segment(backend, &ticket.request).await;
        self.complete_segmentation(ticket.generation, outcome)
    }

    /// Fails with `Busy` while an earlier analysis is still pending.
    pub fn begin_analysis(&mut self) -> Result<AnalysisTicket> {
        if self.analysis_in_flight.is_some() {
            return Err(BookAnalysisError::Busy {
                operation: "Analysis".to_string(),
            });
        }

        let request = AnalysisOrchestrator::build_request(self.text(), &self.request_params())?;

        self.analysis_generation += 1;
        self.analysis_in_flight = Some(self.analysis_generation);
        debug!("Issued analysis #{}", self.analysis_generation);

        Ok(AnalysisTicket {
            generation: self.analysis_generation,
            request,
        })
    }

    pub fn complete_analysis(
        &mut self,
        generation: u64,
        outcome: Result<AnalysisResult>,
    ) -> Result<Completion> {
        // The busy flag belongs to the call that set it, stale or not.
        if self.analysis_in_flight == Some(generation) {
            self.analysis_in_flight = None;
        }

        if generation != self.analysis_generation {
            debug!(
                "Discarding stale analysis #{} (latest #{})",
                generation, self.analysis_generation
            );
            return Ok(Completion::Stale);
        }

        self.analysis = Some(outcome?);
        Ok(Completion::Applied)
    }

    pub async fn analyze(&mut self, backend: &dyn BookAnalysisBackend) -> Result<Completion> {
        let ticket = self.begin_analysis()?;
        let outcome = AnalysisOrchestrator::analyze(backend, &ticket.request).await;
        self.complete_analysis(ticket.generation, outcome)
    }

    pub fn clipboard_text(&self) -> Option<String> {
        ResultExporter::to_clipboard_text(self.analysis.as_ref())
    }

    pub fn export_download(&self) -> Option<ExportedDocument> {
        ResultExporter::to_downloadable(
            self.analysis.as_ref(),
            self.document.as_ref().map(Document::source),
        )
    }

    pub async fn projects(&mut self, backend: &dyn BookAnalysisBackend) -> &[Project] {
        self.catalog.ensure_loaded(backend).await
    }

    pub async fn refresh_projects(&mut self, backend: &dyn BookAnalysisBackend) -> &[Project] {
        self.catalog.refresh(backend).await
    }

    pub fn catalog(&self) -> &ProjectCatalog {
        &self.catalog
    }
}
