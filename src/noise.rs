use crate::population::Population;
use crate::schema::{BankTransaction, Channel, DatasetConfig, DocumentHeader, LineItem};
use crate::utils::{pick, round2, round_dp};
use chrono::NaiveDate;
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const MESSY_DUPLICATE_RATE: f64 = 0.03;
pub const MESSY_FIELD_NULL_RATE: f64 = 0.03;
const MESSY_DESC_MUTATION_RATE: f64 = 0.25;
const MESSY_DESC_TYPO_PROB: f64 = 0.3;

const PAGE_CHOICES: &[u32] = &[1, 1, 2];
const ROTATION_CHOICES: &[u32] = &[0, 0, 0, 90, 180, 270];
const DPI_CHOICES: &[u32] = &[200, 300, 300, 300];

/// Applies at most one OCR-style typo: swap adjacent characters, drop one, or
/// insert a random alphanumeric.
pub fn corrupt_string<R: Rng + ?Sized>(rng: &mut R, s: &str, typo_prob: f64) -> String {
    if s.is_empty() || rng.gen::<f64>() > typo_prob {
        return s.to_string();
    }

    let mut chars: Vec<char> = s.chars().collect();
    match rng.gen_range(0..3) {
        0 if chars.len() > 1 => {
            let idx = rng.gen_range(0..chars.len() - 1);
            chars.swap(idx, idx + 1);
        }
        1 if chars.len() > 1 => {
            let idx = rng.gen_range(0..chars.len());
            chars.remove(idx);
        }
        _ => {
            let idx = rng.gen_range(0..=chars.len());
            let ch = rng.sample(Alphanumeric) as char;
            chars.insert(idx, ch);
        }
    }
    chars.into_iter().collect()
}

pub fn maybe_dropout<R: Rng + ?Sized, T>(rng: &mut R, value: T, dropout_rate: f64) -> Option<T> {
    if rng.gen::<f64>() < dropout_rate {
        None
    } else {
        Some(value)
    }
}

/// Bounded multiplicative perturbation simulating partial payments, fees and
/// FX drift, rounded to the smallest currency unit.
pub fn amount_with_noise<R: Rng + ?Sized>(rng: &mut R, amount: f64, max_pct: f64) -> f64 {
    let delta = amount * rng.gen_range(-max_pct..max_pct);
    round2(amount + delta)
}

/// A bank statement row after the messy transform; the nullable fields are the
/// ones the transform may blank out.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MessyBankRow {
    pub bank_txn_id: String,
    pub booking_date: NaiveDate,
    pub value_date: NaiveDate,
    pub amount: f64,
    pub currency: String,
    pub counterparty_name: Option<String>,
    pub counterparty_account: String,
    pub description: Option<String>,
    pub channel: Option<Channel>,
}

impl From<&BankTransaction> for MessyBankRow {
    fn from(txn: &BankTransaction) -> Self {
        Self {
            bank_txn_id: txn.bank_txn_id.clone(),
            booking_date: txn.booking_date,
            value_date: txn.value_date,
            amount: txn.amount,
            currency: txn.currency.clone(),
            counterparty_name: Some(txn.counterparty_name.clone()),
            counterparty_account: txn.counterparty_account.clone(),
            description: Some(txn.description.clone()),
            channel: Some(txn.channel),
        }
    }
}

/// Derives the messy bank statement: shuffled order, ~3% duplicated rows, ~3%
/// nulled fields per nullable column, occasional description mutation. The
/// clean table is left untouched.
pub fn messy_bank_statement<R: Rng + ?Sized>(
    rng: &mut R,
    transactions: &[BankTransaction],
) -> Vec<MessyBankRow> {
    let mut rows: Vec<MessyBankRow> = transactions.iter().map(MessyBankRow::from).collect();
    rows.shuffle(rng);

    let n_duplicates = (MESSY_DUPLICATE_RATE * rows.len() as f64) as usize;
    let duplicates: Vec<MessyBankRow> = rows
        .choose_multiple(rng, n_duplicates)
        .cloned()
        .collect();
    rows.extend(duplicates);

    for row in &mut rows {
        if rng.gen::<f64>() < MESSY_FIELD_NULL_RATE {
            row.description = None;
        }
        if rng.gen::<f64>() < MESSY_FIELD_NULL_RATE {
            row.counterparty_name = None;
        }
        if rng.gen::<f64>() < MESSY_FIELD_NULL_RATE {
            row.channel = None;
        }
        if let Some(description) = row.description.take() {
            row.description = Some(if rng.gen::<f64>() < MESSY_DESC_MUTATION_RATE {
                corrupt_string(rng, &description, MESSY_DESC_TYPO_PROB)
            } else {
                description
            });
        }
    }

    rows.shuffle(rng);
    rows
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OcrBlock {
    pub text: String,
    pub field_hint: String,
    pub bbox: [f64; 4],
    pub page: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OcrMeta {
    pub doc_id: String,
    pub scanned_pages: u32,
    pub rotation_degrees: u32,
    pub dpi: u32,
}

/// OCR-like rendition of one document: noisy text blocks instead of structured
/// fields, plus scan metadata.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OcrDocument {
    pub meta: OcrMeta,
    pub blocks: Vec<OcrBlock>,
}

fn noisy_field<R: Rng + ?Sized>(
    rng: &mut R,
    value: &str,
    config: &DatasetConfig,
) -> Option<String> {
    let kept = maybe_dropout(rng, value, config.ocr_dropout_rate)?;
    Some(corrupt_string(rng, kept, config.ocr_typo_rate))
}

fn random_bbox<R: Rng + ?Sized>(rng: &mut R) -> [f64; 4] {
    [
        round_dp(rng.gen::<f64>(), 3),
        round_dp(rng.gen::<f64>(), 3),
        round_dp(rng.gen::<f64>(), 3),
        round_dp(rng.gen::<f64>(), 3),
    ]
}

/// Renders one document as OCR text blocks. Fields may be dropped or receive
/// typos per the configured rates.
pub fn ocr_document<R: Rng + ?Sized>(
    rng: &mut R,
    header: &DocumentHeader,
    lines: &[&LineItem],
    config: &DatasetConfig,
) -> OcrDocument {
    let header_fields: [(&str, String); 10] = [
        ("doc_id", header.doc_id.clone()),
        ("doc_type", header.doc_type.to_string()),
        ("vendor_name", header.vendor_name.clone()),
        ("customer_name", header.customer_name.clone()),
        ("issue_date", header.issue_date.to_string()),
        ("due_date", header.due_date.to_string()),
        ("currency", header.currency.clone()),
        ("total_amount", header.total_amount.to_string()),
        ("po_number", header.po_number.clone()),
        ("payment_terms", header.payment_terms.to_string()),
    ];

    let mut blocks = Vec::new();
    for (hint, value) in header_fields {
        if let Some(text) = noisy_field(rng, &value, config) {
            blocks.push(OcrBlock {
                text,
                field_hint: hint.to_string(),
                bbox: random_bbox(rng),
                page: 1,
            });
        }
    }

    for li in lines {
        let line_text = format!(
            "{} {} x {} = {}",
            li.description, li.quantity, li.unit_price, li.line_amount
        );
        if let Some(text) = noisy_field(rng, &line_text, config) {
            blocks.push(OcrBlock {
                text,
                field_hint: "line_item".to_string(),
                bbox: random_bbox(rng),
                page: *pick(rng, PAGE_CHOICES),
            });
        }
    }

    OcrDocument {
        meta: OcrMeta {
            doc_id: header.doc_id.clone(),
            scanned_pages: rng.gen_range(1..=3),
            rotation_degrees: *pick(rng, ROTATION_CHOICES),
            dpi: *pick(rng, DPI_CHOICES),
        },
        blocks,
    }
}

/// OCR dumps for the whole population, one per document.
pub fn ocr_documents<R: Rng + ?Sized>(
    rng: &mut R,
    population: &Population,
    config: &DatasetConfig,
) -> Vec<OcrDocument> {
    let mut lines_by_doc: HashMap<&str, Vec<&LineItem>> = HashMap::new();
    for li in population.all_line_items() {
        lines_by_doc.entry(li.doc_id.as_str()).or_default().push(li);
    }

    population
        .all_headers()
        .map(|header| {
            let lines = lines_by_doc
                .get(header.doc_id.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            ocr_document(rng, header, lines, config)
        })
        .collect()
}
