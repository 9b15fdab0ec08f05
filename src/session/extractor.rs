//! Lifecycle wrapper around a lazily loaded text extraction backend

use std::sync::Arc;

use crate::traits::{TextExtractor, TextExtractorLoader};
use crate::types::*;

/// Lifecycle of the text extraction backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractorState {
    Uninitialized,
    Loading,
    Ready,
    /// Loading failed; the reason is reported on every later request
    Failed(String),
}

/// Text extractor loaded on first use
///
/// A failed load is final: the loader is never retried for this instance.
pub struct ManagedTextExtractor {
    loader: Box<dyn TextExtractorLoader>,
    state: ExtractorState,
    extractor: Option<Arc<dyn TextExtractor>>,
}

impl ManagedTextExtractor {
    /// Create a new managed extractor; nothing is loaded yet
    pub fn new(loader: Box<dyn TextExtractorLoader>) -> Self {
        Self {
            loader,
            state: ExtractorState::Uninitialized,
            extractor: None,
        }
    }

    pub fn state(&self) -> &ExtractorState {
        &self.state
    }

    /// Load the backend if needed and return it
    pub async fn ensure_ready(&mut self) -> ReconciliationResult<Arc<dyn TextExtractor>> {
        if let (ExtractorState::Ready, Some(extractor)) = (&self.state, &self.extractor) {
            return Ok(Arc::clone(extractor));
        }

        if let ExtractorState::Failed(reason) = &self.state {
            return Err(load_error(reason));
        }

        self.state = ExtractorState::Loading;
        tracing::info!("Loading text extraction backend");

        match self.loader.load().await {
            Ok(extractor) => {
                self.extractor = Some(Arc::clone(&extractor));
                self.state = ExtractorState::Ready;
                tracing::info!("Text extraction backend ready");
                Ok(extractor)
            }
            Err(err) => {
                let reason = err.to_string();
                tracing::error!(error = %reason, "Text extraction backend failed to load");
                self.state = ExtractorState::Failed(reason.clone());
                Err(load_error(&reason))
            }
        }
    }

    /// Extract page texts, loading the backend on first use
    pub async fn extract_text(&mut self, file_bytes: &[u8]) -> ReconciliationResult<Vec<String>> {
        let extractor = self.ensure_ready().await?;
        extractor.extract_text(file_bytes).await
    }
}

fn load_error(reason: &str) -> ReconciliationError {
    ReconciliationError::Extraction(format!(
        "Text extraction backend is unavailable: {}",
        reason
    ))
}
