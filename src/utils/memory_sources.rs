//! In-memory document backends for testing

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::traits::*;
use crate::types::*;

/// Text "backend" reading UTF-8 bytes, one page per form feed (`\x0c`)
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticTextExtractor;

#[async_trait]
impl TextExtractor for StaticTextExtractor {
    async fn extract_text(&self, file_bytes: &[u8]) -> ReconciliationResult<Vec<String>> {
        let text = std::str::from_utf8(file_bytes).map_err(|err| {
            ReconciliationError::Extraction(format!("Document is not readable text: {}", err))
        })?;
        Ok(text.split('\x0c').map(str::to_string).collect())
    }
}

/// Shared count of loader invocations
#[derive(Debug, Clone, Default)]
pub struct LoadCounter(Arc<AtomicUsize>);

impl LoadCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn increment(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Loader handing out a [`StaticTextExtractor`], or failing on demand
#[derive(Debug, Clone, Default)]
pub struct StaticTextLoader {
    failure: Option<String>,
    loads: LoadCounter,
}

impl StaticTextLoader {
    /// Create a loader that always succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader that always fails with `reason`
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            loads: LoadCounter::default(),
        }
    }

    /// Counter of `load` calls, shared with clones of this loader
    pub fn load_counter(&self) -> LoadCounter {
        self.loads.clone()
    }
}

#[async_trait]
impl TextExtractorLoader for StaticTextLoader {
    async fn load(&self) -> ReconciliationResult<Arc<dyn TextExtractor>> {
        self.loads.increment();
        match &self.failure {
            Some(reason) => Err(ReconciliationError::Extraction(reason.clone())),
            None => Ok(Arc::new(StaticTextExtractor)),
        }
    }
}

/// Workbook reader for a plain-text workbook notation.
///
/// `## Name` starts a sheet, every other line is a row with cells separated
/// by `;`. Rows before the first `##` go to a sheet called `Sheet1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryTabularReader;

impl MemoryTabularReader {
    /// Parse the workbook notation
    pub fn parse_workbook(text: &str) -> Vec<Sheet> {
        let mut sheets: Vec<Sheet> = Vec::new();

        for line in text.lines() {
            if let Some(name) = line.strip_prefix("## ") {
                sheets.push(Sheet::new(name.trim(), Vec::new()));
                continue;
            }

            if sheets.is_empty() {
                sheets.push(Sheet::new("Sheet1", Vec::new()));
            }
            if let Some(sheet) = sheets.last_mut() {
                sheet
                    .rows
                    .push(line.split(';').map(|cell| cell.trim().to_string()).collect());
            }
        }

        sheets
    }
}

#[async_trait]
impl TabularReader for MemoryTabularReader {
    async fn read_sheets(&self, file_bytes: &[u8]) -> ReconciliationResult<Vec<Sheet>> {
        let text = std::str::from_utf8(file_bytes).map_err(|err| {
            ReconciliationError::Extraction(format!("Workbook is not readable: {}", err))
        })?;
        Ok(Self::parse_workbook(text))
    }
}
