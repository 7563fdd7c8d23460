use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DatasetConfig {
    #[schemars(description = "Directory the output/ tree is written under")]
    pub root_output_dir: PathBuf,

    #[schemars(
        description = "Single seed driving every random source: numeric sampling, pattern allocation, and the content fuzzer. Identical configs produce identical datasets."
    )]
    pub seed: u64,

    pub n_vendors: usize,
    pub n_customers: usize,
    pub n_invoices: usize,
    pub n_receipts: usize,
    pub max_line_items_per_doc: usize,

    #[schemars(
        description = "Advisory sizing knob: the expected ratio of bank transactions to documents once splits and bank-only noise are applied. Recognized but not read by the generator; the actual volume follows the pattern rates."
    )]
    pub bank_txn_base_multiplier: f64,

    #[schemars(description = "Lookback window (days) document issue dates are drawn from")]
    pub date_range_days: i64,

    pub currency_list: Vec<String>,

    #[schemars(description = "Share of singleton documents that never appear in the bank statement")]
    pub missing_invoice_rate: f64,

    #[schemars(description = "Bank-only noise transactions as a share of the document count")]
    pub missing_bank_rate: f64,

    #[schemars(description = "Share of singleton documents paid with a skewed amount")]
    pub partial_match_rate: f64,

    #[schemars(description = "Share of all documents grouped into many-docs-to-one-payment patterns")]
    pub multi_to_one_rate: f64,

    #[schemars(
        description = "Share of the remaining documents split across several part payments"
    )]
    pub one_to_multi_rate: f64,

    #[schemars(
        description = "Advisory OCR knob kept for compatibility; dropout and typo rates below govern the OCR dump"
    )]
    pub ocr_noise_rate: f64,

    #[schemars(description = "Probability an OCR field is dropped entirely")]
    pub ocr_dropout_rate: f64,

    #[schemars(description = "Probability an OCR field value receives a character-level typo")]
    pub ocr_typo_rate: f64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            root_output_dir: PathBuf::from("data"),
            seed: 42,
            n_vendors: 10,
            n_customers: 100,
            n_invoices: 200,
            n_receipts: 150,
            max_line_items_per_doc: 8,
            bank_txn_base_multiplier: 1.4,
            date_range_days: 60,
            currency_list: vec![
                "USD".to_string(),
                "EUR".to_string(),
                "GBP".to_string(),
                "AED".to_string(),
            ],
            missing_invoice_rate: 0.08,
            missing_bank_rate: 0.05,
            partial_match_rate: 0.10,
            multi_to_one_rate: 0.06,
            one_to_multi_rate: 0.04,
            ocr_noise_rate: 0.15,
            ocr_dropout_rate: 0.05,
            ocr_typo_rate: 0.20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Invoice,
    Receipt,
}

impl DocType {
    pub fn id_prefix(&self) -> &'static str {
        match self {
            DocType::Invoice => "INV",
            DocType::Receipt => "RCT",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocType::Invoice => write!(f, "invoice"),
            DocType::Receipt => write!(f, "receipt"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum CustomerSegment {
    #[serde(rename = "SMB")]
    Smb,
    Enterprise,
    Individual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentTerms {
    Net7,
    Net14,
    Net30,
    Net45,
    DueOnReceipt,
}

impl fmt::Display for PaymentTerms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentTerms::Net7 => "NET7",
            PaymentTerms::Net14 => "NET14",
            PaymentTerms::Net30 => "NET30",
            PaymentTerms::Net45 => "NET45",
            PaymentTerms::DueOnReceipt => "DUE_ON_RECEIPT",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocStatus {
    Open,
    Paid,
    PartiallyPaid,
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    Wire,
    Ach,
    Card,
    Cash,
    Check,
    InternalTransfer,
}

/// How a document's value is realized (or not) in the bank transaction stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    Exact,
    PartialOrMismatch,
    MissingInBank,
    MultiToOne,
    OneToMulti,
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LinkType::Exact => "exact",
            LinkType::PartialOrMismatch => "partial_or_mismatch",
            LinkType::MissingInBank => "missing_in_bank",
            LinkType::MultiToOne => "multi_to_one",
            LinkType::OneToMulti => "one_to_multi",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Vendor {
    pub vendor_id: String,
    pub vendor_name: String,
    pub country: String,
    pub city: String,
    pub iban: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Customer {
    pub customer_id: String,
    pub customer_name: String,
    pub segment: CustomerSegment,
    pub country: String,
    pub city: String,
}

/// One line of a document. The sum of a document's line amounts is its subtotal.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LineItem {
    pub doc_id: String,
    pub line_no: u32,
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub discount_pct: u32,
    pub line_amount: f64,
}

/// Invoice or receipt header. Immutable once generated; `total_amount` is
/// subtotal + tax + shipping, each rounded at the point of computation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DocumentHeader {
    pub doc_id: String,
    pub doc_type: DocType,
    pub vendor_id: String,
    pub vendor_name: String,
    pub customer_id: String,
    pub customer_name: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub currency: String,
    pub subtotal: f64,
    pub tax_rate: u32,
    pub tax_amount: f64,
    pub shipping: f64,
    pub total_amount: f64,
    pub payment_terms: PaymentTerms,
    pub po_number: String,
    pub status: DocStatus,
}

/// A bank statement row. Never mutated after creation; the messy variant is a
/// derived copy.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BankTransaction {
    pub bank_txn_id: String,
    pub booking_date: NaiveDate,
    pub value_date: NaiveDate,
    pub amount: f64,
    pub currency: String,
    pub counterparty_name: String,
    pub counterparty_account: String,
    pub description: String,
    pub channel: Channel,
}

/// Ground-truth edge between a document and a bank transaction. The link table
/// is the sole source of truth for matching; transaction descriptions are
/// advisory noise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReconciliationLink {
    pub doc_id: String,
    pub bank_txn_id: Option<String>,
    pub link_type: LinkType,
}
