use crate::services::client::BookAnalysisBackend;
use crate::types::Project;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

/// Session-scoped cache of the project list.
///
/// Fetched once on first use; [`ProjectCatalog::refresh`] refetches and
/// [`ProjectCatalog::invalidate`] drops the cached copy. A failed fetch
/// reads as an empty list and is retried on the next access.
#[derive(Debug, Default)]
pub struct ProjectCatalog {
    projects: Option<Vec<Project>>,
    fetched_at: Option<DateTime<Utc>>,
}

impl ProjectCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn ensure_loaded(&mut self, backend: &dyn BookAnalysisBackend) -> &[Project] {
        if self.projects.is_none() {
            self.fetch(backend).await;
        }
        self.projects.as_deref().unwrap_or_default()
    }

    pub async fn refresh(&mut self, backend: &dyn BookAnalysisBackend) -> &[Project] {
        self.fetch(backend).await;
        self.projects.as_deref().unwrap_or_default()
    }

    pub fn invalidate(&mut self) {
        self.projects = None;
        self.fetched_at = None;
    }

    pub fn cached(&self) -> Option<&[Project]> {
        self.projects.as_deref()
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub fn find(&self, id: &str) -> Option<&Project> {
        self.projects.as_ref()?.iter().find(|p| p.id == id)
    }

    async fn fetch(&mut self, backend: &dyn BookAnalysisBackend) {
        match backend.list_projects().await {
            Ok(payload) => {
                let projects = Self::normalize(payload);
                debug!("Project catalog holds {} projects", projects.len());
                self.projects = Some(projects);
                self.fetched_at = Some(Utc::now());
            }
            Err(e) => {
                // Left unloaded so the next access retries.
                warn!("Failed to load project list: {}", e);
                self.invalidate();
            }
        }
    }

    /// Accepts a bare array or an `{ "items": [...] }` envelope. Anything
    /// else, including malformed entries, yields no projects.
    pub fn normalize(payload: Value) -> Vec<Project> {
        let items = match payload {
            Value::Array(items) => items,
            Value::Object(mut envelope) => match envelope.remove("items") {
                Some(Value::Array(items)) => items,
                _ => {
                    warn!("Project list envelope has no items array");
                    return Vec::new();
                }
            },
            _ => {
                warn!("Unexpected project list payload");
                return Vec::new();
            }
        };

        items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<Project>(item).ok())
            .collect()
    }
}
