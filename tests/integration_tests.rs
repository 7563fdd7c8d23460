use chrono::NaiveDate;
use recon_dataset_builder::*;
use std::collections::{HashMap, HashSet};

fn fixed_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

fn default_dataset() -> ReconciliationDataset {
    let config = DatasetConfig::default();
    DatasetGenerator::generate_as_of(&config, fixed_date()).unwrap()
}

fn doc_lookup(dataset: &ReconciliationDataset) -> HashMap<&str, &DocumentHeader> {
    dataset
        .invoice_headers
        .iter()
        .chain(dataset.receipt_headers.iter())
        .map(|h| (h.doc_id.as_str(), h))
        .collect()
}

#[test]
fn test_partition_totality() {
    let dataset = default_dataset();
    let docs = doc_lookup(&dataset);

    let linked: HashSet<&str> = dataset.links.iter().map(|l| l.doc_id.as_str()).collect();
    for doc_id in docs.keys() {
        assert!(linked.contains(doc_id), "{doc_id} missing from link table");
    }
    // Links never reference unknown documents either.
    for link in &dataset.links {
        assert!(docs.contains_key(link.doc_id.as_str()));
    }
}

#[test]
fn test_each_document_belongs_to_one_pattern() {
    let dataset = default_dataset();

    let mut by_doc: HashMap<&str, Vec<&ReconciliationLink>> = HashMap::new();
    for link in &dataset.links {
        by_doc.entry(link.doc_id.as_str()).or_default().push(link);
    }

    for (doc_id, links) in by_doc {
        let types: HashSet<LinkType> = links.iter().map(|l| l.link_type).collect();
        assert_eq!(types.len(), 1, "{doc_id} spans multiple patterns: {types:?}");

        match links[0].link_type {
            LinkType::OneToMulti => {
                assert!(
                    (2..=4).contains(&links.len()),
                    "{doc_id} split into {} parts",
                    links.len()
                );
            }
            _ => assert_eq!(links.len(), 1, "{doc_id} linked {} times", links.len()),
        }
    }
}

#[test]
fn test_multi_and_split_pools_are_disjoint() {
    let dataset = default_dataset();

    let multi_docs: HashSet<&str> = dataset
        .links
        .iter()
        .filter(|l| l.link_type == LinkType::MultiToOne)
        .map(|l| l.doc_id.as_str())
        .collect();
    let split_docs: HashSet<&str> = dataset
        .links
        .iter()
        .filter(|l| l.link_type == LinkType::OneToMulti)
        .map(|l| l.doc_id.as_str())
        .collect();

    assert!(!multi_docs.is_empty());
    assert!(!split_docs.is_empty());
    assert!(multi_docs.is_disjoint(&split_docs));
}

#[test]
fn test_multi_to_one_conservation() {
    let dataset = default_dataset();
    let docs = doc_lookup(&dataset);
    let txns: HashMap<&str, &BankTransaction> = dataset
        .bank_transactions
        .iter()
        .map(|t| (t.bank_txn_id.as_str(), t))
        .collect();

    let mut groups: HashMap<&str, Vec<&str>> = HashMap::new();
    for link in &dataset.links {
        if link.link_type == LinkType::MultiToOne {
            let txn_id = link.bank_txn_id.as_deref().expect("multi link without txn");
            groups.entry(txn_id).or_default().push(link.doc_id.as_str());
        }
    }

    assert!(!groups.is_empty());
    for (txn_id, members) in groups {
        assert!(members.len() >= 2, "{txn_id} covers only {members:?}");
        let group_total: f64 = members.iter().map(|id| docs[id].total_amount).sum();
        let bank_amount = txns[txn_id].amount;
        let drift = (bank_amount - group_total).abs() / group_total;
        assert!(
            drift <= 0.05 + 0.001,
            "{txn_id}: bank {bank_amount} vs group total {group_total}"
        );
    }
}

#[test]
fn test_exact_links_match_amounts_exactly() {
    let dataset = default_dataset();
    let docs = doc_lookup(&dataset);
    let txns: HashMap<&str, &BankTransaction> = dataset
        .bank_transactions
        .iter()
        .map(|t| (t.bank_txn_id.as_str(), t))
        .collect();

    let mut seen = 0;
    for link in &dataset.links {
        if link.link_type != LinkType::Exact {
            continue;
        }
        seen += 1;
        let txn_id = link.bank_txn_id.as_deref().expect("exact link without txn");
        assert_eq!(
            txns[txn_id].amount, docs[link.doc_id.as_str()].total_amount,
            "{txn_id} diverges from {}",
            link.doc_id
        );
    }
    assert!(seen > 0, "expected exact links at default rates");
}

#[test]
fn test_missing_links_have_no_transaction() {
    let dataset = default_dataset();
    let mut seen = 0;
    for link in &dataset.links {
        if link.link_type == LinkType::MissingInBank {
            seen += 1;
            assert!(link.bank_txn_id.is_none());
        } else {
            assert!(link.bank_txn_id.is_some());
        }
    }
    assert!(seen > 0, "expected missing links at default rates");
}

#[test]
fn test_bank_without_doc_report_is_exact_set_difference() {
    let dataset = default_dataset();

    let all_txn_ids: HashSet<&str> = dataset
        .bank_transactions
        .iter()
        .map(|t| t.bank_txn_id.as_str())
        .collect();
    let linked: HashSet<&str> = dataset
        .links
        .iter()
        .filter_map(|l| l.bank_txn_id.as_deref())
        .collect();
    let expected: HashSet<&str> = all_txn_ids.difference(&linked).copied().collect();

    let reported: HashSet<&str> = dataset
        .missing_items
        .iter()
        .filter(|row| row.issue == IssueKind::BankWithoutDoc)
        .filter_map(|row| row.bank_txn_id.as_deref())
        .collect();

    assert_eq!(reported, expected);
    assert!(!reported.is_empty(), "expected bank-only noise at default rates");
}

#[test]
fn test_report_covers_every_non_exact_link() {
    let dataset = default_dataset();

    let non_exact = dataset
        .links
        .iter()
        .filter(|l| l.link_type != LinkType::Exact)
        .count();
    let doc_side_rows = dataset
        .missing_items
        .iter()
        .filter(|row| row.issue != IssueKind::BankWithoutDoc)
        .count();
    assert_eq!(doc_side_rows, non_exact);
}

#[test]
fn test_many_to_one_report_matches_link_table() {
    let dataset = default_dataset();

    let mut expected: HashMap<&str, HashSet<&str>> = HashMap::new();
    for link in &dataset.links {
        if let Some(txn_id) = link.bank_txn_id.as_deref() {
            expected.entry(txn_id).or_default().insert(link.doc_id.as_str());
        }
    }
    expected.retain(|_, docs| docs.len() > 1);

    assert_eq!(dataset.many_to_one_cases.len(), expected.len());
    for case in &dataset.many_to_one_cases {
        let docs = &expected[case.bank_txn_id.as_str()];
        assert_eq!(case.n_docs, docs.len());
        let mut sorted: Vec<&str> = docs.iter().copied().collect();
        sorted.sort_unstable();
        assert_eq!(case.doc_ids, sorted.join(","));
    }
}

#[test]
fn test_messy_statement_size() {
    let dataset = default_dataset();
    let clean = dataset.bank_transactions.len();
    let expected_duplicates = (0.03 * clean as f64) as usize;
    assert_eq!(dataset.messy_bank_rows.len(), clean + expected_duplicates);
}

#[test]
fn test_ocr_dump_covers_every_document() {
    let dataset = default_dataset();
    let ocr_ids: HashSet<&str> = dataset
        .ocr_documents
        .iter()
        .map(|d| d.meta.doc_id.as_str())
        .collect();
    for header in dataset
        .invoice_headers
        .iter()
        .chain(dataset.receipt_headers.iter())
    {
        assert!(ocr_ids.contains(header.doc_id.as_str()));
    }
}

#[test]
fn test_same_seed_reproduces_dataset() {
    let config = DatasetConfig::default();
    let a = DatasetGenerator::generate_as_of(&config, fixed_date()).unwrap();
    let b = DatasetGenerator::generate_as_of(&config, fixed_date()).unwrap();

    assert_eq!(
        serde_json::to_string(&a.links).unwrap(),
        serde_json::to_string(&b.links).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&a.bank_transactions).unwrap(),
        serde_json::to_string(&b.bank_transactions).unwrap()
    );
    // Names come from the content fuzzer, which shares the configured seed.
    assert_eq!(
        serde_json::to_string(&a.vendors).unwrap(),
        serde_json::to_string(&b.vendors).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&a.messy_bank_rows).unwrap(),
        serde_json::to_string(&b.messy_bank_rows).unwrap()
    );
}

#[test]
fn test_different_seed_changes_dataset() {
    let a = DatasetGenerator::generate_as_of(&DatasetConfig::default(), fixed_date()).unwrap();
    let b = DatasetGenerator::generate_as_of(
        &DatasetConfig {
            seed: 43,
            ..DatasetConfig::default()
        },
        fixed_date(),
    )
    .unwrap();

    assert_ne!(
        serde_json::to_string(&a.bank_transactions).unwrap(),
        serde_json::to_string(&b.bank_transactions).unwrap()
    );
}

#[test]
fn test_forced_one_to_multi_scenario() {
    // A single document forced into the split pattern yields 2-4 transactions
    // all linked back to it.
    let config = DatasetConfig {
        n_invoices: 1,
        n_receipts: 0,
        multi_to_one_rate: 0.0,
        one_to_multi_rate: 1.0,
        missing_bank_rate: 0.0,
        ..DatasetConfig::default()
    };
    let dataset = DatasetGenerator::generate_as_of(&config, fixed_date()).unwrap();

    let doc_id = dataset.invoice_headers[0].doc_id.as_str();
    assert!((2..=4).contains(&dataset.bank_transactions.len()));
    assert_eq!(dataset.links.len(), dataset.bank_transactions.len());
    for link in &dataset.links {
        assert_eq!(link.link_type, LinkType::OneToMulti);
        assert_eq!(link.doc_id, doc_id);
    }

    let total = dataset.invoice_headers[0].total_amount;
    let paid: f64 = dataset.bank_transactions.iter().map(|t| t.amount).sum();
    let slack = total * 0.03 + 0.05;
    assert!(
        (paid - total).abs() <= slack,
        "parts sum {paid} vs total {total}"
    );
}

#[test]
fn test_forced_missing_scenario() {
    let config = DatasetConfig {
        n_invoices: 20,
        n_receipts: 0,
        multi_to_one_rate: 0.0,
        one_to_multi_rate: 0.0,
        missing_invoice_rate: 1.0,
        missing_bank_rate: 0.0,
        ..DatasetConfig::default()
    };
    let dataset = DatasetGenerator::generate_as_of(&config, fixed_date()).unwrap();

    assert!(dataset.bank_transactions.is_empty());
    assert_eq!(dataset.links.len(), 20);
    for link in &dataset.links {
        assert_eq!(link.link_type, LinkType::MissingInBank);
        assert!(link.bank_txn_id.is_none());
    }
    assert_eq!(dataset.missing_items.len(), 20);
    assert!(dataset
        .missing_items
        .iter()
        .all(|row| row.issue == IssueKind::DocWithoutBank));
}

#[test]
fn test_artifacts_written_to_disk() -> anyhow::Result<()> {
    let root = std::env::temp_dir().join(format!(
        "recon-dataset-builder-test-{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&root);
    let config = DatasetConfig {
        root_output_dir: root.clone(),
        n_invoices: 20,
        n_receipts: 10,
        ..DatasetConfig::default()
    };

    let dataset = run_pipeline(&config)?;

    for file in [
        "output/invoices/invoices_header.csv",
        "output/invoices/invoices_line_items.csv",
        "output/invoices/receipts_header.csv",
        "output/invoices/receipts_line_items.csv",
        "output/bank/bank_statement.csv",
        "output/bank/bank_statement_messy.csv",
        "output/reconciliation/ground_truth_links.csv",
        "output/reconciliation/missing_items_report.csv",
        "output/reconciliation/many_to_one_mapping_cases.csv",
        "output/metadata/schema_description.md",
        "output/metadata/table_schemas.json",
        "output/metadata/data_dictionary.csv",
        "output/metadata/generation_notes.md",
    ] {
        assert!(root.join(file).exists(), "missing artifact {file}");
    }

    // One OCR dump per document.
    let ocr_files = std::fs::read_dir(root.join("output/invoices/ocr_noise"))?.count();
    assert_eq!(ocr_files, 30);

    // The links CSV round-trips with the in-memory table.
    let mut reader =
        csv::Reader::from_path(root.join("output/reconciliation/ground_truth_links.csv"))?;
    let rows: Vec<ReconciliationLink> = reader
        .deserialize()
        .collect::<std::result::Result<_, _>>()?;
    assert_eq!(rows.len(), dataset.links.len());
    assert_eq!(rows, dataset.links);

    std::fs::remove_dir_all(&root)?;
    Ok(())
}
