//! Statement against supplier listing reconciliation example

use reconciliation_core::utils::StaticTextLoader;
use reconciliation_core::{
    format_amount, LedgerFile, LedgerFormat, ReconciliationSession, StatementFile,
    StatementFormat,
};

const STATEMENT: &str = "\
BANCO EJEMPLO - Extracto de cuenta
F. Operación F. Valor Concepto Importe Saldo
01/12/2025 01/12/2025 SALDO ANTERIOR 2.500,00 €
03/12/2025 03/12/2025 TRANSFERENCIA A FAVOR DE
SUMINISTROS GARCIA SL
FACTURA 2025/FV/118 -1.210,00 € 1.290,00 €
04/12/2025 05/12/2025 RECIBO ENDESA ENERGIA -148,29 € 1.141,71 €
10/12/2025 10/12/2025 TRANSFERENCIA TRANSPORTES -350,00 € 791,71 €
12/12/2025 12/12/2025 COMISION MANTENIMIENTO -6,00 € 785,71 €";

const LEDGER: &str = "\
Estado Proveedor Código Fecha Referencia Documento Importe
Pendiente SUMINISTROS GARCIA SL 400123 03/12/2025 ALB-5531 2025/FV/118 1.210,00 €
TRANSPORTES Y MONTAJES
DEL VALLÈS SL 400311 05/12/2025 REF-88 2025/A/0042 350,00 €
Pendiente TRANSPORTES Y MONTAJES SL 400311 28/12/2025 REF-91 2025/A/0051 350,00 €
Pagada ENDESA ENERGIA SAU 400007 05/12/2025 REC-12 25/EN/99812 148,29 €";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🏦 Reconciliation Core - Statement Reconciliation Example\n");

    let mut session = ReconciliationSession::new(Box::new(StaticTextLoader::new()));

    let outcome = session
        .reconcile_files(
            &[StatementFile::new(
                "december.pdf",
                STATEMENT,
                StatementFormat::DualDateEuro,
            )],
            &[LedgerFile::new(
                "suppliers.pdf",
                LEDGER,
                LedgerFormat::SupplierListing,
            )],
        )
        .await?;

    println!("📄 Bank movements:");
    for matched in &outcome.records {
        let record = &matched.record;
        println!(
            "  {} {:>10}  {:<45} -> {}",
            record.value_date_text(),
            format_amount(&record.amount),
            record.description,
            matched.matched_document.as_deref().unwrap_or("(unmatched)")
        );
    }
    println!();

    println!("📊 Summary:");
    println!("  Bank records:     {}", outcome.stats.bank_record_count);
    println!("  Supplier records: {}", outcome.stats.supplier_record_count);
    println!("  Matched:          {}", outcome.stats.matched_count);
    println!("  Unmatched:        {}", outcome.stats.unmatched_count);
    println!("  Match rate:       {:.1}%", outcome.stats.match_percentage);
    println!();

    if !outcome.unmatched_suppliers.is_empty() {
        println!("⏳ Open supplier invoices:");
        for supplier in &outcome.unmatched_suppliers {
            println!(
                "  {} {:<35} {:>10}",
                supplier.document_reference,
                supplier.name,
                format_amount(&supplier.amount)
            );
        }
        println!();
    }

    // An operator books the bank fee manually
    if let Some(fee) = outcome.records.iter().find(|r| !r.is_matched()) {
        let corrected = outcome.with_override(&fee.record.id, "BANK-FEES-12")?;
        println!(
            "✏️  After manual override: {:.1}% matched",
            corrected.stats.match_percentage
        );
    }

    Ok(())
}
