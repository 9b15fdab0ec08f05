//! # Reconciliation Core
//!
//! A library for reconciling bank statements against supplier ledgers:
//! extracting structured records from page text or spreadsheet rows, and
//! matching bank movements to supplier invoices by amount and date.
//!
//! ## Features
//!
//! - **Amount and date normalization**: European and US notations, month names
//!   in Spanish/Catalan/English, spreadsheet serials
//! - **Statement extraction**: declarative formats with multi-line descriptions,
//!   header/footer filtering, fallback strategies and deduplication
//! - **Ledger extraction**: printed supplier listings and multi-sheet workbooks
//! - **Matching**: greedy one-to-one assignment with tiered date tie-breaking
//! - **Backend abstraction**: text extraction and spreadsheet reading are
//!   injected through traits
//!
//! ## Quick Start
//!
//! ```rust
//! use reconciliation_core::{
//!     parse_ledger, parse_statement, reconcile, LedgerFormat, MatchOptions, SourceInput,
//!     StatementFormat,
//! };
//!
//! let statement = "04/12/2025 05/12/2025 RECIBO ENDESA ENERGIA -148,29 € 1.141,71 €";
//! let ledger = "Pagada ENDESA ENERGIA SAU 400007 05/12/2025 REC-12 25/EN/99812 148,29 €";
//!
//! let bank = parse_statement(
//!     SourceInput::Text(statement),
//!     StatementFormat::DualDateEuro,
//!     "statement.pdf",
//! )?;
//! let suppliers = parse_ledger(
//!     SourceInput::Text(ledger),
//!     LedgerFormat::SupplierListing,
//!     "ledger.pdf",
//! )?;
//!
//! let outcome = reconcile(&bank, &suppliers, &MatchOptions::default());
//! assert_eq!(outcome.records[0].matched_document.as_deref(), Some("25/EN/99812"));
//! # Ok::<(), reconciliation_core::ReconciliationError>(())
//! ```

pub mod config;
pub mod extraction;
pub mod normalize;
pub mod reconciliation;
pub mod session;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use extraction::{
    parse_ledger, parse_statement, LedgerExtractor, LedgerFormat, RecordDeduplicator,
    SheetSelection, SourceInput, StatementExtractor, StatementFormat,
};
pub use normalize::{amounts_match, format_amount, parse_amount, DateNormalizer, DateOrder};
pub use reconciliation::{
    override_matched_document, reconcile, reconcile_checked, MatchingEngine,
};
pub use session::*;
pub use traits::*;
pub use types::*;
