//! Fail-fast batch processing of statement and ledger files

use std::sync::Arc;

use super::extractor::{ExtractorState, ManagedTextExtractor};
use crate::config::ReconciliationConfig;
use crate::extraction::{
    LedgerExtractor, LedgerFormat, SheetSelection, SourceInput, StatementExtractor,
    StatementFormat,
};
use crate::reconciliation::reconcile_checked;
use crate::traits::{TabularReader, TextExtractorLoader};
use crate::types::*;

/// A bank statement file handed to a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub format: StatementFormat,
}

impl StatementFile {
    pub fn new(
        name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
        format: StatementFormat,
    ) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            format,
        }
    }
}

/// A supplier ledger file handed to a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub format: LedgerFormat,
    /// Sheets (periods) to read from a workbook
    pub sheets: SheetSelection,
}

impl LedgerFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>, format: LedgerFormat) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            format,
            sheets: SheetSelection::All,
        }
    }

    /// Read only the given sheets
    pub fn with_sheets(mut self, sheets: SheetSelection) -> Self {
        self.sheets = sheets;
        self
    }
}

/// One reconciliation run over a batch of files
///
/// Files are processed in order and the first failing file aborts the batch,
/// with its name attached to the error.
pub struct ReconciliationSession {
    text: ManagedTextExtractor,
    tabular: Option<Arc<dyn TabularReader>>,
    config: ReconciliationConfig,
}

impl ReconciliationSession {
    /// Create a new session with a lazily loaded text backend
    pub fn new(loader: Box<dyn TextExtractorLoader>) -> Self {
        Self {
            text: ManagedTextExtractor::new(loader),
            tabular: None,
            config: ReconciliationConfig::default(),
        }
    }

    /// Enable tabular (spreadsheet) sources
    pub fn with_tabular_reader(mut self, reader: Arc<dyn TabularReader>) -> Self {
        self.tabular = Some(reader);
        self
    }

    pub fn with_config(mut self, config: ReconciliationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }

    /// Lifecycle state of the text backend
    pub fn extractor_state(&self) -> &ExtractorState {
        self.text.state()
    }

    /// Extract the bank records of every statement, in file order
    pub async fn extract_statements(
        &mut self,
        files: &[StatementFile],
    ) -> ReconciliationResult<Vec<BankRecord>> {
        self.config.validate()?;

        let mut records = Vec::new();
        for file in files {
            let extracted = self
                .extract_statement(file)
                .await
                .map_err(|err| file_failed(err, &file.name))?;
            records.extend(extracted);
        }

        Ok(records)
    }

    /// Extract the supplier records of every ledger, in file order
    pub async fn extract_ledgers(
        &mut self,
        files: &[LedgerFile],
    ) -> ReconciliationResult<Vec<SupplierRecord>> {
        self.config.validate()?;

        let mut records = Vec::new();
        for file in files {
            let extracted = self
                .extract_ledger(file)
                .await
                .map_err(|err| file_failed(err, &file.name))?;
            records.extend(extracted);
        }

        Ok(records)
    }

    /// Extract every file and reconcile the results
    pub async fn reconcile_files(
        &mut self,
        statements: &[StatementFile],
        ledgers: &[LedgerFile],
    ) -> ReconciliationResult<ReconciliationOutcome> {
        let bank_records = self.extract_statements(statements).await?;
        let supplier_records = self.extract_ledgers(ledgers).await?;

        tracing::info!(
            statements = statements.len(),
            ledgers = ledgers.len(),
            bank_records = bank_records.len(),
            supplier_records = supplier_records.len(),
            "Extraction finished"
        );

        reconcile_checked(&bank_records, &supplier_records, &self.config.matching)
    }

    async fn extract_statement(
        &mut self,
        file: &StatementFile,
    ) -> ReconciliationResult<Vec<BankRecord>> {
        let extractor =
            StatementExtractor::new(file.format).with_options(self.config.extraction.clone());

        if file.format.descriptor().is_tabular() {
            let sheets = self.read_sheets(&file.bytes).await?;
            extractor.extract(SourceInput::Sheets(&sheets), &file.name)
        } else {
            let text = self.read_text(&file.bytes).await?;
            extractor.extract(SourceInput::Text(&text), &file.name)
        }
    }

    async fn extract_ledger(
        &mut self,
        file: &LedgerFile,
    ) -> ReconciliationResult<Vec<SupplierRecord>> {
        let extractor = LedgerExtractor::new(file.format)
            .with_options(self.config.extraction.clone())
            .with_sheets(file.sheets.clone());

        if file.format.descriptor().is_tabular() {
            let sheets = self.read_sheets(&file.bytes).await?;
            extractor.extract(SourceInput::Sheets(&sheets), &file.name)
        } else {
            let text = self.read_text(&file.bytes).await?;
            extractor.extract(SourceInput::Text(&text), &file.name)
        }
    }

    async fn read_text(&mut self, bytes: &[u8]) -> ReconciliationResult<String> {
        let pages = self.text.extract_text(bytes).await?;
        Ok(pages.join("\n"))
    }

    async fn read_sheets(&self, bytes: &[u8]) -> ReconciliationResult<Vec<Sheet>> {
        let reader = self.tabular.as_ref().ok_or_else(|| {
            ReconciliationError::Extraction("No tabular reader configured".to_string())
        })?;
        reader.read_sheets(bytes).await
    }
}

fn file_failed(err: ReconciliationError, file_name: &str) -> ReconciliationError {
    tracing::warn!(file = file_name, error = %err, "File processing failed, aborting batch");
    err.in_file(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{MemoryTabularReader, StaticTextLoader};

    fn text_session() -> ReconciliationSession {
        ReconciliationSession::new(Box::new(StaticTextLoader::new()))
    }

    const STATEMENT: &str =
        "04/12/2025 05/12/2025 RECIBO ENDESA ENERGIA -148,29 € 1.141,71 €";
    const LEDGER: &str =
        "Pagada ENDESA ENERGIA SAU 400007 05/12/2025 REC-12 25/EN/99812 148,29 €";

    #[tokio::test]
    async fn test_reconcile_files() {
        let mut session = text_session();
        let outcome = session
            .reconcile_files(
                &[StatementFile::new("s.pdf", STATEMENT, StatementFormat::DualDateEuro)],
                &[LedgerFile::new("l.pdf", LEDGER, LedgerFormat::SupplierListing)],
            )
            .await
            .unwrap();

        assert_eq!(outcome.stats.matched_count, 1);
        assert_eq!(
            outcome.records[0].matched_document.as_deref(),
            Some("25/EN/99812")
        );
        assert_eq!(session.extractor_state(), &ExtractorState::Ready);
    }

    #[tokio::test]
    async fn test_fail_fast_names_the_file() {
        let mut session = text_session();
        let files = [
            StatementFile::new("good.pdf", STATEMENT, StatementFormat::DualDateEuro),
            StatementFile::new("scan.pdf", "\x0c \x0c", StatementFormat::DualDateEuro),
            StatementFile::new("never.pdf", "", StatementFormat::DualDateEuro),
        ];

        let err = session.extract_statements(&files).await.unwrap_err();
        assert_eq!(err.file_name(), Some("scan.pdf"));
        assert!(matches!(err.root(), ReconciliationError::Extraction(_)));
    }

    #[tokio::test]
    async fn test_empty_side_is_input_error() {
        let mut session = text_session();
        let err = session
            .reconcile_files(
                &[],
                &[LedgerFile::new("l.pdf", LEDGER, LedgerFormat::SupplierListing)],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ReconciliationError::ReconciliationInput(_)));
    }

    #[tokio::test]
    async fn test_tabular_needs_reader() {
        let mut session = text_session();
        let files = [LedgerFile::new("l.xlsx", "## Hoja1\n", LedgerFormat::Tabular)];

        let err = session.extract_ledgers(&files).await.unwrap_err();
        assert_eq!(err.file_name(), Some("l.xlsx"));

        let mut session = text_session().with_tabular_reader(Arc::new(MemoryTabularReader));
        let workbook = "\
## Desembre
Proveedor;Fecha;Factura;Importe
ACME SL;03/12/2025;2025/A/2;20,00";
        let files = [LedgerFile::new("l.xlsx", workbook, LedgerFormat::Tabular)];

        let records = session.extract_ledgers(&files).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].period.as_deref(), Some("Desembre"));
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let mut config = ReconciliationConfig::default();
        config.extraction.description_key_chars = 0;
        let mut session = text_session().with_config(config);

        let err = session.extract_statements(&[]).await.unwrap_err();
        assert!(matches!(err, ReconciliationError::Configuration(_)));
    }
}
