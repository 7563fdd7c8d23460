use crate::fuzzer::ContentFuzzer;
use crate::schema::{
    Customer, CustomerSegment, DatasetConfig, DocStatus, DocType, DocumentHeader, LineItem,
    PaymentTerms, Vendor,
};
use crate::utils::{pick, random_date_within_days, round2};
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Exp, LogNormal};

const SEGMENTS: &[CustomerSegment] = &[
    CustomerSegment::Smb,
    CustomerSegment::Enterprise,
    CustomerSegment::Individual,
];

// Repeated entries weight the draw, matching the discrete sets the amounts
// are sampled from.
const DISCOUNT_CHOICES: &[u32] = &[0, 0, 0, 5, 10, 15];
const TAX_RATE_CHOICES: &[u32] = &[0, 5, 5, 10, 15];
const SHIPPING_CHOICES: &[f64] = &[0.0, 0.0, 5.0, 10.0, 20.0];
const DUE_DATE_OFFSETS: &[i64] = &[7, 14, 30, 45, 60];

const PAYMENT_TERMS_CHOICES: &[PaymentTerms] = &[
    PaymentTerms::Net7,
    PaymentTerms::Net14,
    PaymentTerms::Net30,
    PaymentTerms::Net45,
    PaymentTerms::DueOnReceipt,
];

const STATUS_CHOICES: &[DocStatus] = &[
    DocStatus::Open,
    DocStatus::Paid,
    DocStatus::PartiallyPaid,
    DocStatus::Void,
];

/// Quantity is exponential with this mean, floored, minimum 1.
const QUANTITY_MEAN: f64 = 2.0;
/// Unit price is log-normal with these parameters.
const UNIT_PRICE_MU: f64 = 2.5;
const UNIT_PRICE_SIGMA: f64 = 0.7;

/// The immutable base population every downstream stage reads from.
#[derive(Debug, Clone)]
pub struct Population {
    pub vendors: Vec<Vendor>,
    pub customers: Vec<Customer>,
    pub invoice_headers: Vec<DocumentHeader>,
    pub invoice_lines: Vec<LineItem>,
    pub receipt_headers: Vec<DocumentHeader>,
    pub receipt_lines: Vec<LineItem>,
}

impl Population {
    /// Invoice headers followed by receipt headers.
    pub fn all_headers(&self) -> impl Iterator<Item = &DocumentHeader> {
        self.invoice_headers.iter().chain(self.receipt_headers.iter())
    }

    pub fn all_line_items(&self) -> impl Iterator<Item = &LineItem> {
        self.invoice_lines.iter().chain(self.receipt_lines.iter())
    }

    pub fn document_count(&self) -> usize {
        self.invoice_headers.len() + self.receipt_headers.len()
    }
}

pub struct PopulationGenerator<'a> {
    config: &'a DatasetConfig,
    today: NaiveDate,
}

impl<'a> PopulationGenerator<'a> {
    pub fn new(config: &'a DatasetConfig, today: NaiveDate) -> Self {
        Self { config, today }
    }

    pub fn generate(&self, rng: &mut StdRng, fuzzer: &mut dyn ContentFuzzer) -> Population {
        let vendors = self.generate_vendors(fuzzer);
        let customers = self.generate_customers(rng, fuzzer);

        let (invoice_headers, invoice_lines) = self.generate_documents(
            DocType::Invoice,
            self.config.n_invoices,
            &vendors,
            &customers,
            rng,
            fuzzer,
        );
        let (receipt_headers, receipt_lines) = self.generate_documents(
            DocType::Receipt,
            self.config.n_receipts,
            &vendors,
            &customers,
            rng,
            fuzzer,
        );

        Population {
            vendors,
            customers,
            invoice_headers,
            invoice_lines,
            receipt_headers,
            receipt_lines,
        }
    }

    fn generate_vendors(&self, fuzzer: &mut dyn ContentFuzzer) -> Vec<Vendor> {
        (1..=self.config.n_vendors)
            .map(|id| Vendor {
                vendor_id: format!("V{id:05}"),
                vendor_name: fuzzer.company_name(),
                country: fuzzer.country(),
                city: fuzzer.city(),
                iban: fuzzer.iban(),
            })
            .collect()
    }

    fn generate_customers(
        &self,
        rng: &mut StdRng,
        fuzzer: &mut dyn ContentFuzzer,
    ) -> Vec<Customer> {
        (1..=self.config.n_customers)
            .map(|id| Customer {
                customer_id: format!("C{id:05}"),
                customer_name: fuzzer.person_name(),
                segment: *pick(rng, SEGMENTS),
                country: fuzzer.country(),
                city: fuzzer.city(),
            })
            .collect()
    }

    fn generate_line_items(
        &self,
        doc_id: &str,
        rng: &mut StdRng,
        fuzzer: &mut dyn ContentFuzzer,
    ) -> Vec<LineItem> {
        let quantity_dist = Exp::new(1.0 / QUANTITY_MEAN).unwrap();
        let price_dist = LogNormal::new(UNIT_PRICE_MU, UNIT_PRICE_SIGMA).unwrap();

        let n_items = rng.gen_range(1..=self.config.max_line_items_per_doc);
        (1..=n_items)
            .map(|line_no| {
                let quantity = (quantity_dist.sample(rng) as u32).max(1);
                let unit_price = round2(price_dist.sample(rng));
                let discount_pct = *pick(rng, DISCOUNT_CHOICES);
                let line_amount = round2(
                    quantity as f64 * unit_price * (1.0 - discount_pct as f64 / 100.0),
                );
                LineItem {
                    doc_id: doc_id.to_string(),
                    line_no: line_no as u32,
                    description: fuzzer.catch_phrase(),
                    quantity,
                    unit_price,
                    discount_pct,
                    line_amount,
                }
            })
            .collect()
    }

    fn generate_documents(
        &self,
        doc_type: DocType,
        count: usize,
        vendors: &[Vendor],
        customers: &[Customer],
        rng: &mut StdRng,
        fuzzer: &mut dyn ContentFuzzer,
    ) -> (Vec<DocumentHeader>, Vec<LineItem>) {
        let mut headers = Vec::with_capacity(count);
        let mut all_lines = Vec::new();

        for id in 1..=count {
            let doc_id = format!("{}-{:07}", doc_type.id_prefix(), id);
            let vendor = pick(rng, vendors);
            let customer = pick(rng, customers);

            let issue_date = random_date_within_days(rng, self.today, self.config.date_range_days);
            let due_date = issue_date + Duration::days(*pick(rng, DUE_DATE_OFFSETS));
            let currency = pick(rng, &self.config.currency_list).clone();

            let lines = self.generate_line_items(&doc_id, rng, fuzzer);

            let subtotal = round2(lines.iter().map(|li| li.line_amount).sum());
            let tax_rate = *pick(rng, TAX_RATE_CHOICES);
            let tax_amount = round2(subtotal * tax_rate as f64 / 100.0);
            let shipping = *pick(rng, SHIPPING_CHOICES);
            let total_amount = round2(subtotal + tax_amount + shipping);

            headers.push(DocumentHeader {
                doc_id,
                doc_type,
                vendor_id: vendor.vendor_id.clone(),
                vendor_name: vendor.vendor_name.clone(),
                customer_id: customer.customer_id.clone(),
                customer_name: customer.customer_name.clone(),
                issue_date,
                due_date,
                currency,
                subtotal,
                tax_rate,
                tax_amount,
                shipping,
                total_amount,
                payment_terms: *pick(rng, PAYMENT_TERMS_CHOICES),
                po_number: format!("PO-{}", rng.gen_range(100_000..=999_999)),
                status: *pick(rng, STATUS_CHOICES),
            });
            all_lines.extend(lines);
        }

        (headers, all_lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuzzer::WordlistFuzzer;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn generate_test_population(seed: u64) -> Population {
        let config = DatasetConfig {
            n_vendors: 5,
            n_customers: 10,
            n_invoices: 40,
            n_receipts: 25,
            ..DatasetConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(seed);
        let mut fuzzer = WordlistFuzzer::seeded(seed);
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        PopulationGenerator::new(&config, today).generate(&mut rng, &mut fuzzer)
    }

    #[test]
    fn test_population_counts_and_ids() {
        let population = generate_test_population(42);
        assert_eq!(population.vendors.len(), 5);
        assert_eq!(population.customers.len(), 10);
        assert_eq!(population.invoice_headers.len(), 40);
        assert_eq!(population.receipt_headers.len(), 25);
        assert_eq!(population.document_count(), 65);

        let ids: HashSet<&str> = population
            .all_headers()
            .map(|h| h.doc_id.as_str())
            .collect();
        assert_eq!(ids.len(), 65);
        assert!(ids.contains("INV-0000001"));
        assert!(ids.contains("RCT-0000025"));
    }

    #[test]
    fn test_line_amounts_sum_to_subtotal() {
        let population = generate_test_population(7);
        for header in population.all_headers() {
            let line_sum: f64 = population
                .all_line_items()
                .filter(|li| li.doc_id == header.doc_id)
                .map(|li| li.line_amount)
                .sum();
            assert!(
                (round2(line_sum) - header.subtotal).abs() < 0.005,
                "subtotal of {} is {} but lines sum to {}",
                header.doc_id,
                header.subtotal,
                line_sum
            );
        }
    }

    #[test]
    fn test_header_total_composition() {
        let population = generate_test_population(11);
        for header in population.all_headers() {
            let expected = round2(header.subtotal + header.tax_amount + header.shipping);
            assert_eq!(header.total_amount, expected, "doc {}", header.doc_id);
            let expected_tax = round2(header.subtotal * header.tax_rate as f64 / 100.0);
            assert_eq!(header.tax_amount, expected_tax, "doc {}", header.doc_id);
        }
    }

    #[test]
    fn test_line_item_ranges() {
        let population = generate_test_population(3);
        for li in population.all_line_items() {
            assert!(li.quantity >= 1);
            assert!(li.unit_price > 0.0);
            assert!([0, 5, 10, 15].contains(&li.discount_pct));
            let expected = round2(
                li.quantity as f64 * li.unit_price * (1.0 - li.discount_pct as f64 / 100.0),
            );
            assert_eq!(li.line_amount, expected);
        }
    }

    #[test]
    fn test_due_date_after_issue_date() {
        let population = generate_test_population(5);
        for header in population.all_headers() {
            assert!(header.due_date > header.issue_date);
            let offset = (header.due_date - header.issue_date).num_days();
            assert!([7, 14, 30, 45, 60].contains(&offset));
        }
    }

    #[test]
    fn test_vendor_and_customer_references_resolve() {
        let population = generate_test_population(13);
        let vendor_ids: HashSet<&str> = population
            .vendors
            .iter()
            .map(|v| v.vendor_id.as_str())
            .collect();
        let customer_ids: HashSet<&str> = population
            .customers
            .iter()
            .map(|c| c.customer_id.as_str())
            .collect();
        for header in population.all_headers() {
            assert!(vendor_ids.contains(header.vendor_id.as_str()));
            assert!(customer_ids.contains(header.customer_id.as_str()));
        }
    }
}
