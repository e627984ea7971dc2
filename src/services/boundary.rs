use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub region: String,
    pub message: String,
    pub occurred_at: String,
}

/// Guards a rendering region.
///
/// The first error or panic from the region is recorded and the region is
/// not rendered again until [`ErrorBoundary::reset`]. Resetting clears only
/// the boundary's own fault; it does not touch workflow state.
#[derive(Debug)]
pub struct ErrorBoundary {
    name: String,
    fault: Option<Fault>,
}

impl ErrorBoundary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fault: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn render<T, E, F>(&mut self, region: F) -> Result<T, Fault>
    where
        E: Display,
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }

        let message = match panic::catch_unwind(AssertUnwindSafe(region)) {
            Ok(Ok(output)) => return Ok(output),
            Ok(Err(e)) => e.to_string(),
            Err(payload) => Self::panic_message(payload.as_ref()),
        };

        error!(region = %self.name, "Rendering failed: {}", message);
        let fault = Fault {
            region: self.name.clone(),
            message,
            occurred_at: chrono::Utc::now().to_rfc3339(),
        };
        self.fault = Some(fault.clone());
        Err(fault)
    }

    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    pub fn has_fault(&self) -> bool {
        self.fault.is_some()
    }

    /// Manual retry: clears the recorded fault so the region renders again.
    pub fn reset(&mut self) {
        self.fault = None;
    }

    fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
        if let Some(message) = payload.downcast_ref::<&str>() {
            message.to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "unknown panic".to_string()
        }
    }
}
