//! Orchestration of document backends, extraction and matching
//!
//! The core never touches files or rendering libraries directly: a session
//! receives file bytes, hands them to the injected [`TextExtractor`](crate::TextExtractor)
//! or [`TabularReader`](crate::TabularReader), and feeds the resulting text or
//! rows to the extractors.

pub mod batch;
pub mod extractor;

pub use batch::*;
pub use extractor::*;
