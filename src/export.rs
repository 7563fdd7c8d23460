use crate::error::Result;
use crate::noise::{MessyBankRow, OcrDocument};
use crate::report::{ManyToOneCase, MissingItemRow};
use crate::schema::{
    BankTransaction, DatasetConfig, DocumentHeader, LineItem, ReconciliationLink,
};
use crate::ReconciliationDataset;
use log::info;
use schemars::schema_for;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

const INVOICE_HEADER_COLUMNS: &[&str] = &[
    "doc_id",
    "doc_type",
    "vendor_id",
    "vendor_name",
    "customer_id",
    "customer_name",
    "issue_date",
    "due_date",
    "currency",
    "subtotal",
    "tax_rate",
    "tax_amount",
    "shipping",
    "total_amount",
    "payment_terms",
    "po_number",
    "status",
];

const LINE_ITEM_COLUMNS: &[&str] = &[
    "doc_id",
    "line_no",
    "description",
    "quantity",
    "unit_price",
    "discount_pct",
    "line_amount",
];

const BANK_STATEMENT_COLUMNS: &[&str] = &[
    "bank_txn_id",
    "booking_date",
    "value_date",
    "amount",
    "currency",
    "counterparty_name",
    "counterparty_account",
    "description",
    "channel",
];

const LINK_COLUMNS: &[&str] = &["doc_id", "bank_txn_id", "link_type"];

/// Directory layout of one generated dataset under the configured root.
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn invoices_dir(&self) -> PathBuf {
        self.root.join("output").join("invoices")
    }

    pub fn ocr_dir(&self) -> PathBuf {
        self.invoices_dir().join("ocr_noise")
    }

    pub fn bank_dir(&self) -> PathBuf {
        self.root.join("output").join("bank")
    }

    pub fn reconciliation_dir(&self) -> PathBuf {
        self.root.join("output").join("reconciliation")
    }

    pub fn metadata_dir(&self) -> PathBuf {
        self.root.join("output").join("metadata")
    }

    pub fn ensure(&self) -> Result<()> {
        for dir in [
            self.ocr_dir(),
            self.bank_dir(),
            self.reconciliation_dir(),
            self.metadata_dir(),
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

fn write_csv<P: AsRef<Path>, S: Serialize>(path: P, rows: &[S]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes every artifact of the dataset. Any I/O failure aborts the run: the
/// reports are derived from the link table, so the outputs are only meaningful
/// as one consistent set.
pub fn write_dataset(dataset: &ReconciliationDataset, config: &DatasetConfig) -> Result<()> {
    let layout = OutputLayout::new(&config.root_output_dir);
    layout.ensure()?;

    let invoices = layout.invoices_dir();
    write_csv(invoices.join("invoices_header.csv"), &dataset.invoice_headers)?;
    write_csv(
        invoices.join("invoices_line_items.csv"),
        &dataset.invoice_lines,
    )?;
    write_csv(invoices.join("receipts_header.csv"), &dataset.receipt_headers)?;
    write_csv(
        invoices.join("receipts_line_items.csv"),
        &dataset.receipt_lines,
    )?;

    let bank = layout.bank_dir();
    write_csv(bank.join("bank_statement.csv"), &dataset.bank_transactions)?;
    write_csv(
        bank.join("bank_statement_messy.csv"),
        &dataset.messy_bank_rows,
    )?;

    let reconciliation = layout.reconciliation_dir();
    write_csv(reconciliation.join("ground_truth_links.csv"), &dataset.links)?;
    write_csv(
        reconciliation.join("missing_items_report.csv"),
        &dataset.missing_items,
    )?;
    write_csv(
        reconciliation.join("many_to_one_mapping_cases.csv"),
        &dataset.many_to_one_cases,
    )?;

    let ocr_dir = layout.ocr_dir();
    for doc in &dataset.ocr_documents {
        let file = File::create(ocr_dir.join(format!("{}.json", doc.meta.doc_id)))?;
        serde_json::to_writer_pretty(file, doc)?;
    }

    write_metadata(&layout)?;

    info!(
        "dataset written under {}",
        config.root_output_dir.display()
    );
    Ok(())
}

#[derive(Serialize)]
struct DataDictionaryRow<'a> {
    table: &'a str,
    column: &'a str,
    description: &'a str,
}

fn write_metadata(layout: &OutputLayout) -> Result<()> {
    let dir = layout.metadata_dir();

    let mut description = File::create(dir.join("schema_description.md"))?;
    writeln!(description, "# Schema Description")?;
    writeln!(description)?;
    writeln!(description, "## Invoices Header")?;
    writeln!(description, "{}", INVOICE_HEADER_COLUMNS.join(", "))?;
    writeln!(description)?;
    writeln!(description, "## Receipts Header")?;
    writeln!(description, "{}", INVOICE_HEADER_COLUMNS.join(", "))?;
    writeln!(description)?;
    writeln!(description, "## Line Items")?;
    writeln!(description, "{}", LINE_ITEM_COLUMNS.join(", "))?;
    writeln!(description)?;
    writeln!(description, "## Bank Statement")?;
    writeln!(description, "{}", BANK_STATEMENT_COLUMNS.join(", "))?;
    writeln!(description)?;
    writeln!(description, "## Ground Truth Links")?;
    writeln!(description, "{}", LINK_COLUMNS.join(", "))?;

    let schemas = serde_json::json!({
        "invoices_header": schema_for!(DocumentHeader),
        "line_items": schema_for!(LineItem),
        "bank_statement": schema_for!(BankTransaction),
        "bank_statement_messy": schema_for!(MessyBankRow),
        "ground_truth_links": schema_for!(ReconciliationLink),
        "missing_items_report": schema_for!(MissingItemRow),
        "many_to_one_mapping_cases": schema_for!(ManyToOneCase),
        "ocr_document": schema_for!(OcrDocument),
    });
    serde_json::to_writer_pretty(File::create(dir.join("table_schemas.json"))?, &schemas)?;

    let mut dictionary = Vec::new();
    for (table, columns) in [
        ("invoices_header", INVOICE_HEADER_COLUMNS),
        ("receipts_header", INVOICE_HEADER_COLUMNS),
        ("line_items", LINE_ITEM_COLUMNS),
        ("bank_statement", BANK_STATEMENT_COLUMNS),
        ("ground_truth_links", LINK_COLUMNS),
    ] {
        for &column in columns {
            dictionary.push(DataDictionaryRow {
                table,
                column,
                description: "See table_schemas.json.",
            });
        }
    }
    write_csv(dir.join("data_dictionary.csv"), &dictionary)?;

    let mut notes = File::create(dir.join("generation_notes.md"))?;
    writeln!(notes, "# Generation Notes")?;
    writeln!(notes)?;
    writeln!(
        notes,
        "- Synthetic invoices/receipts with log-normal unit prices and exponential quantities."
    )?;
    writeln!(
        notes,
        "- Bank transactions cover exact, partial, one-to-many, many-to-one, and missing patterns."
    )?;
    writeln!(
        notes,
        "- ground_truth_links.csv is the authoritative document-to-transaction mapping."
    )?;
    writeln!(
        notes,
        "- OCR JSON adds dropped fields, typos, and random bounding boxes per document."
    )?;
    writeln!(
        notes,
        "- The messy bank statement variant shuffles, duplicates, and blanks rows of the clean table."
    )?;

    Ok(())
}
