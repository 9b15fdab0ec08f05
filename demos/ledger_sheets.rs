//! Multi-sheet ledger and tabular statement example

use std::sync::Arc;

use reconciliation_core::utils::{MemoryTabularReader, StaticTextLoader};
use reconciliation_core::{
    format_amount, LedgerFile, LedgerFormat, ReconciliationConfig, ReconciliationSession,
    SheetSelection, StatementFile, StatementFormat,
};

const LEDGER_WORKBOOK: &str = "\
## Novembre
Estat;Client;Codi;Data;Referència;Document;Import
Pendent;SUMINISTROS GARCIA SL;400123.0;45994;ALB-5531;2025/FV/118;1210
;TOTAL;;;;;1210
## Desembre
Previsió pagaments desembre
Previsió;Data;Factura;Import
ENDESA ENERGIA SAU;05/12/2025;25/EN/99812;148,29
LIMPIEZAS NORTE SL;15/12/2025;2025/LN/7;99";

const STATEMENT_WORKBOOK: &str = "\
## Movimientos
Fecha;Fecha valor;Concepto;Cargo;Abono;Saldo
45994;45994;TRANSFERENCIA SUMINISTROS GARCIA;1.210,00;;1.290,00
04/12/2025;05/12/2025;RECIBO ENDESA ENERGIA;148,29;;1.141,71
08/12/2025;08/12/2025;ABONO CLIENTE ALFA;;300,00;1.441,71";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("📚 Reconciliation Core - Ledger Sheets Example\n");

    let config: ReconciliationConfig = serde_json::from_str(
        r#"{ "matching": { "amount_tolerance": "0.05", "max_date_distance_days": 31 } }"#,
    )?;
    config.validate()?;

    let mut session = ReconciliationSession::new(Box::new(StaticTextLoader::new()))
        .with_tabular_reader(Arc::new(MemoryTabularReader))
        .with_config(config);

    // Every sheet is a reporting period
    let ledger = LedgerFile::new("ledger.xlsx", LEDGER_WORKBOOK, LedgerFormat::Tabular);
    let suppliers = session.extract_ledgers(&[ledger.clone()]).await?;

    println!("📒 Supplier entries by period:");
    for supplier in &suppliers {
        println!(
            "  [{}] {} {:<25} {:>10} {}",
            supplier.period.as_deref().unwrap_or("-"),
            supplier.date_text(),
            supplier.name,
            format_amount(&supplier.amount),
            supplier.document_reference
        );
    }
    println!();

    // Only the December forecast
    let december = ledger.with_sheets(SheetSelection::Named(vec!["Desembre".to_string()]));
    let outcome = session
        .reconcile_files(
            &[StatementFile::new(
                "movements.xlsx",
                STATEMENT_WORKBOOK,
                StatementFormat::Tabular,
            )],
            &[december],
        )
        .await?;

    println!("🔗 December reconciliation:");
    for matched in &outcome.records {
        println!(
            "  {:<35} {:>10} -> {} ({:?})",
            matched.record.description,
            format_amount(&matched.record.amount),
            matched.matched_document.as_deref().unwrap_or("(unmatched)"),
            matched.status
        );
    }
    println!(
        "\n  {} of {} matched ({:.1}%)",
        outcome.stats.matched_count, outcome.stats.bank_record_count, outcome.stats.match_percentage
    );

    Ok(())
}
