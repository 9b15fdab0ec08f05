//! Integration tests for reconciliation-core

use bigdecimal::BigDecimal;
use reconciliation_core::{
    override_matched_document, parse_amount, parse_ledger, parse_statement, reconcile,
    utils::{MemoryTabularReader, StaticTextLoader, StrictRecordValidator},
    ExtractorState, LedgerExtractor, LedgerFile, LedgerFormat, MatchOptions, MatchRule,
    MatchStatus, ReconciliationConfig, ReconciliationError, ReconciliationSession,
    ReconciliationStats, SheetSelection, SourceInput, StatementFile, StatementFormat,
};
use std::str::FromStr;
use std::sync::Arc;

const DECEMBER_STATEMENT: &str = "\
BANCO EJEMPLO - Extracto de cuenta
F. Operación F. Valor Concepto Importe Saldo
01/12/2025 01/12/2025 SALDO ANTERIOR 2.500,00 €
03/12/2025 03/12/2025 TRANSFERENCIA A FAVOR DE
SUMINISTROS GARCIA SL
FACTURA 2025/FV/118 -1.210,00 € 1.290,00 €
04/12/2025 05/12/2025 RECIBO ENDESA ENERGIA -148,29 € 1.141,71 €
\x0cBANCO EJEMPLO - Extracto de cuenta
Página 2 de 2
10/12/2025 10/12/2025 TRANSFERENCIA TRANSPORTES -350,00 € 791,71 €
12/12/2025 12/12/2025 COMISION MANTENIMIENTO -6,00 € 785,71 €";

const SUPPLIER_LISTING: &str = "\
LLISTAT DE FACTURES PENDENTS
Estado Proveedor Código Fecha Referencia Documento Importe
Pendiente SUMINISTROS GARCIA SL 400123 03/12/2025 ALB-5531 2025/FV/118 1.210,00 €
TRANSPORTES Y MONTAJES
DEL VALLÈS SL 400311 05/12/2025 REF-88 2025/A/0042 350,00 €
Pendiente TRANSPORTES Y MONTAJES SL 400311 28/12/2025 REF-91 2025/A/0051 350,00 €
Pagada ENDESA ENERGIA SAU 400007 05/12/2025 REC-12 25/EN/99812 148,29 €
Pendiente LIMPIEZAS NORTE SL 400450 15/12/2025 LN-3 2025/LN/7 99,00 €";

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

#[tokio::test]
async fn test_complete_reconciliation_workflow() {
    let mut session = ReconciliationSession::new(Box::new(StaticTextLoader::new()));
    assert_eq!(session.extractor_state(), &ExtractorState::Uninitialized);

    let outcome = session
        .reconcile_files(
            &[StatementFile::new(
                "december.pdf",
                DECEMBER_STATEMENT,
                StatementFormat::DualDateEuro,
            )],
            &[LedgerFile::new(
                "suppliers.pdf",
                SUPPLIER_LISTING,
                LedgerFormat::SupplierListing,
            )],
        )
        .await
        .unwrap();

    assert_eq!(session.extractor_state(), &ExtractorState::Ready);

    // Opening balance is filtered, every movement across both pages is kept
    let descriptions: Vec<&str> = outcome
        .records
        .iter()
        .map(|r| r.record.description.as_str())
        .collect();
    assert_eq!(
        descriptions,
        vec![
            "TRANSFERENCIA A FAVOR DE SUMINISTROS GARCIA SL FACTURA 2025/FV/118",
            "RECIBO ENDESA ENERGIA",
            "TRANSFERENCIA TRANSPORTES",
            "COMISION MANTENIMIENTO",
        ]
    );

    let garcia = &outcome.records[0];
    assert_eq!(garcia.matched_document.as_deref(), Some("2025/FV/118"));
    assert_eq!(garcia.matched_supplier_name.as_deref(), Some("SUMINISTROS GARCIA SL"));
    assert_eq!(garcia.rule, Some(MatchRule::UniqueAmount));

    let endesa = &outcome.records[1];
    assert_eq!(endesa.matched_document.as_deref(), Some("25/EN/99812"));

    // Two 350,00 invoices: the one dated in the same month, nearest to the value date
    let transport = &outcome.records[2];
    assert_eq!(transport.matched_document.as_deref(), Some("2025/A/0042"));
    assert_eq!(transport.rule, Some(MatchRule::SameMonthValueDate));
    assert_eq!(
        transport.matched_supplier_name.as_deref(),
        Some("TRANSPORTES Y MONTAJES DEL VALLÈS SL")
    );

    let fee = &outcome.records[3];
    assert_eq!(fee.status, MatchStatus::Unmatched);
    assert_eq!(fee.matched_document, None);

    assert_eq!(outcome.stats.bank_record_count, 4);
    assert_eq!(outcome.stats.supplier_record_count, 5);
    assert_eq!(outcome.stats.matched_count, 3);
    assert_eq!(outcome.stats.unmatched_count, 1);
    assert_eq!(outcome.stats.match_percentage, 75.0);

    let leftovers: Vec<&str> = outcome
        .unmatched_suppliers
        .iter()
        .map(|s| s.document_reference.as_str())
        .collect();
    assert_eq!(leftovers, vec!["2025/A/0051", "2025/LN/7"]);
}

#[tokio::test]
async fn test_manual_override_after_reconciliation() {
    let bank = parse_statement(
        SourceInput::Text(DECEMBER_STATEMENT),
        StatementFormat::DualDateEuro,
        "december.pdf",
    )
    .unwrap();
    let suppliers = parse_ledger(
        SourceInput::Text(SUPPLIER_LISTING),
        LedgerFormat::SupplierListing,
        "suppliers.pdf",
    )
    .unwrap();

    let outcome = reconcile(&bank, &suppliers, &MatchOptions::default());
    let fee_id = outcome.records[3].record.id.clone();

    let records = override_matched_document(&outcome.records, &fee_id, "BANK-FEES-12").unwrap();
    assert_eq!(records[3].matched_document.as_deref(), Some("BANK-FEES-12"));
    assert_eq!(records[3].rule, Some(MatchRule::Manual));

    let stats = ReconciliationStats::from_records(&records, suppliers.len());
    assert_eq!(stats.matched_count, 4);
    assert_eq!(stats.match_percentage, 100.0);

    let err = override_matched_document(&records, "missing-id", "X").unwrap_err();
    assert!(matches!(err, ReconciliationError::RecordNotFound(_)));
}

#[tokio::test]
async fn test_multi_sheet_ledger_session() {
    let workbook = "\
## Novembre
Estat;Client;Codi;Data;Referència;Document;Import
Pendent;SUMINISTROS GARCIA SL;400123.0;45994;ALB-5531;2025/FV/118;1210
;TOTAL;;;;;1210
## Desembre
Previsió pagaments desembre
Previsió;Data;Factura;Import
ENDESA ENERGIA SAU;05/12/2025;25/EN/99812;148,29";

    let mut session = ReconciliationSession::new(Box::new(StaticTextLoader::new()))
        .with_tabular_reader(Arc::new(MemoryTabularReader));

    let all = session
        .extract_ledgers(&[LedgerFile::new("ledger.xlsx", workbook, LedgerFormat::Tabular)])
        .await
        .unwrap();
    let periods: Vec<Option<&str>> = all.iter().map(|r| r.period.as_deref()).collect();
    assert_eq!(periods, vec![Some("Novembre"), Some("Desembre")]);

    let december = session
        .extract_ledgers(&[LedgerFile::new("ledger.xlsx", workbook, LedgerFormat::Tabular)
            .with_sheets(SheetSelection::Named(vec!["Desembre".to_string()]))])
        .await
        .unwrap();
    assert_eq!(december.len(), 1);
    assert_eq!(december[0].amount, dec("148.29"));

    // Text backend was never needed
    assert_eq!(session.extractor_state(), &ExtractorState::Uninitialized);
}

#[tokio::test]
async fn test_tabular_statement_session() {
    let workbook = "\
## Movimientos
Fecha;Fecha valor;Concepto;Importe;Saldo
45994;45994;TRANSFERENCIA SUMINISTROS GARCIA;-1.210,00;1.290,00
04/12/2025;05/12/2025;RECIBO ENDESA ENERGIA;-148,29;1.141,71
## Resumen
Total;-1.358,29";

    let mut session = ReconciliationSession::new(Box::new(StaticTextLoader::new()))
        .with_tabular_reader(Arc::new(MemoryTabularReader));

    let outcome = session
        .reconcile_files(
            &[StatementFile::new("export.xlsx", workbook, StatementFormat::Tabular)],
            &[LedgerFile::new(
                "suppliers.pdf",
                SUPPLIER_LISTING,
                LedgerFormat::SupplierListing,
            )],
        )
        .await
        .unwrap();

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.records[0].record.posting_date_text(), "03/12/2025");
    assert_eq!(
        outcome.records[0].matched_document.as_deref(),
        Some("2025/FV/118")
    );
    assert_eq!(
        outcome.records[1].matched_document.as_deref(),
        Some("25/EN/99812")
    );
}

#[tokio::test]
async fn test_batch_is_fail_fast() {
    let mut session = ReconciliationSession::new(Box::new(StaticTextLoader::new()));

    let err = session
        .reconcile_files(
            &[
                StatementFile::new(
                    "december.pdf",
                    DECEMBER_STATEMENT,
                    StatementFormat::DualDateEuro,
                ),
                StatementFile::new(
                    "letter.pdf",
                    "Dear customer,\nthank you.",
                    StatementFormat::DualDateEuro,
                ),
            ],
            &[LedgerFile::new(
                "suppliers.pdf",
                SUPPLIER_LISTING,
                LedgerFormat::SupplierListing,
            )],
        )
        .await
        .unwrap_err();

    assert_eq!(err.file_name(), Some("letter.pdf"));
    assert!(matches!(err.root(), ReconciliationError::FormatMismatch(_)));
}

#[tokio::test]
async fn test_failed_backend_stays_failed() {
    let mut session = ReconciliationSession::new(Box::new(StaticTextLoader::failing(
        "renderer worker not found",
    )));
    let files = [StatementFile::new(
        "december.pdf",
        DECEMBER_STATEMENT,
        StatementFormat::DualDateEuro,
    )];

    let first = session.extract_statements(&files).await.unwrap_err();
    assert!(matches!(first.root(), ReconciliationError::Extraction(_)));
    assert!(matches!(session.extractor_state(), ExtractorState::Failed(_)));

    let second = session.extract_statements(&files).await.unwrap_err();
    assert!(second.to_string().contains("renderer worker not found"));
}

#[tokio::test]
async fn test_config_from_json() {
    let config: ReconciliationConfig = serde_json::from_str(
        r#"{
            "matching": { "use_accounting_date": false, "max_date_distance_days": 10 },
            "extraction": { "extra_deny_tokens": ["comision"] }
        }"#,
    )
    .unwrap();

    let mut session =
        ReconciliationSession::new(Box::new(StaticTextLoader::new())).with_config(config);
    let outcome = session
        .reconcile_files(
            &[StatementFile::new(
                "december.pdf",
                DECEMBER_STATEMENT,
                StatementFormat::DualDateEuro,
            )],
            &[LedgerFile::new(
                "suppliers.pdf",
                SUPPLIER_LISTING,
                LedgerFormat::SupplierListing,
            )],
        )
        .await
        .unwrap();

    // The fee line is now treated as noise
    assert_eq!(outcome.records.len(), 3);
    assert!(session.config().matching.max_date_distance_days == Some(10));
}

#[test]
fn test_strict_validator_drops_rows() {
    let ledger = "\
Pendiente SUMINISTROS GARCIA SL 400123 03/12/2025 ALB-5531 2025/FV/118 1.210,00 €
Pendiente MEGA OBRAS SA 400999 04/12/2025 MO-1 2025/MO/1 2.500.000,00 €";

    let lenient =
        parse_ledger(SourceInput::Text(ledger), LedgerFormat::SupplierListing, "l.pdf").unwrap();
    assert_eq!(lenient.len(), 2);

    let strict = LedgerExtractor::new(LedgerFormat::SupplierListing)
        .with_validator(Box::new(StrictRecordValidator::default()))
        .extract(SourceInput::Text(ledger), "l.pdf")
        .unwrap();
    assert_eq!(strict.len(), 1);
    assert_eq!(strict[0].document_reference, "2025/FV/118");
}

#[test]
fn test_amount_notations() {
    assert_eq!(parse_amount("1.234,56"), dec("1234.56"));
    assert_eq!(parse_amount("1,234.56"), dec("1234.56"));
    assert_eq!(parse_amount(""), dec("0"));
    assert_eq!(parse_amount("- $14.05"), dec("-14.05"));
}
