use crate::population::Population;
use crate::schema::{BankTransaction, DocumentHeader, LinkType, ReconciliationLink};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
    DocWithoutBank,
    PotentialMismatch,
    BankWithoutDoc,
}

/// One row of the accountant-facing discrepancy report. Both sides are
/// nullable because a row can originate from either the document or the bank
/// perspective.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MissingItemRow {
    pub issue: IssueKind,
    pub doc_id: Option<String>,
    pub bank_txn_id: Option<String>,
    pub doc_amount: Option<f64>,
    pub bank_amount: Option<f64>,
    pub currency: String,
    pub detail: String,
}

/// Debugging view of one many-documents-to-one-payment case: the sorted unique
/// document ids behind a single transaction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ManyToOneCase {
    pub bank_txn_id: String,
    pub doc_ids: String,
    pub n_docs: usize,
}

/// Derives the missing/mismatch report from the ground truth. Every non-exact
/// link produces a row; every transaction never referenced by a link produces
/// a `BANK_WITHOUT_DOC` row. Pure projection: nothing is written back.
pub fn build_missing_items_report(
    population: &Population,
    transactions: &[BankTransaction],
    links: &[ReconciliationLink],
) -> Vec<MissingItemRow> {
    let doc_lookup: HashMap<&str, &DocumentHeader> = population
        .all_headers()
        .map(|h| (h.doc_id.as_str(), h))
        .collect();
    let bank_lookup: HashMap<&str, &BankTransaction> = transactions
        .iter()
        .map(|t| (t.bank_txn_id.as_str(), t))
        .collect();

    let mut rows = Vec::new();

    for link in links {
        let Some(header) = doc_lookup.get(link.doc_id.as_str()).copied() else {
            continue;
        };
        match link.link_type {
            LinkType::MissingInBank => rows.push(MissingItemRow {
                issue: IssueKind::DocWithoutBank,
                doc_id: Some(header.doc_id.clone()),
                bank_txn_id: None,
                doc_amount: Some(header.total_amount),
                bank_amount: None,
                currency: header.currency.clone(),
                detail: "Document not found in bank statement (likely unpaid or missing)."
                    .to_string(),
            }),
            LinkType::PartialOrMismatch | LinkType::OneToMulti | LinkType::MultiToOne => {
                let bank_amount = link
                    .bank_txn_id
                    .as_deref()
                    .and_then(|id| bank_lookup.get(id))
                    .map(|t| t.amount);
                rows.push(MissingItemRow {
                    issue: IssueKind::PotentialMismatch,
                    doc_id: Some(header.doc_id.clone()),
                    bank_txn_id: link.bank_txn_id.clone(),
                    doc_amount: Some(header.total_amount),
                    bank_amount,
                    currency: header.currency.clone(),
                    detail: format!(
                        "Mismatched or complex mapping ({}). Requires manual review.",
                        link.link_type
                    ),
                });
            }
            LinkType::Exact => {}
        }
    }

    let linked_txn_ids: HashSet<&str> = links
        .iter()
        .filter_map(|link| link.bank_txn_id.as_deref())
        .collect();
    for txn in transactions {
        if !linked_txn_ids.contains(txn.bank_txn_id.as_str()) {
            rows.push(MissingItemRow {
                issue: IssueKind::BankWithoutDoc,
                doc_id: None,
                bank_txn_id: Some(txn.bank_txn_id.clone()),
                doc_amount: None,
                bank_amount: Some(txn.amount),
                currency: txn.currency.clone(),
                detail: "Bank transaction has no matching invoice/receipt.".to_string(),
            });
        }
    }

    rows
}

/// Groups links by transaction and keeps the groups covering more than one
/// distinct document. A restatement of multi-to-one information already in the
/// link table, ordered by transaction id.
pub fn build_many_to_one_cases(links: &[ReconciliationLink]) -> Vec<ManyToOneCase> {
    let mut docs_by_txn: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for link in links {
        if let Some(txn_id) = link.bank_txn_id.as_deref() {
            docs_by_txn
                .entry(txn_id)
                .or_default()
                .insert(link.doc_id.as_str());
        }
    }

    docs_by_txn
        .into_iter()
        .filter(|(_, docs)| docs.len() > 1)
        .map(|(txn_id, docs)| ManyToOneCase {
            bank_txn_id: txn_id.to_string(),
            n_docs: docs.len(),
            doc_ids: docs.into_iter().collect::<Vec<_>>().join(","),
        })
        .collect()
}
