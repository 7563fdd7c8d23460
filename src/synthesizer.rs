use crate::allocator::{DocumentSplit, MatchPlan, SingletonClass};
use crate::fuzzer::ContentFuzzer;
use crate::noise::amount_with_noise;
use crate::population::Population;
use crate::schema::{
    BankTransaction, Channel, DatasetConfig, DocumentHeader, LinkType, ReconciliationLink,
};
use crate::utils::{pick, random_date_within_days, round2};
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, LogNormal};
use std::collections::HashMap;

/// FX/fee drift on the aggregate payment of a multi-to-one group.
pub const MULTI_TO_ONE_NOISE: f64 = 0.05;
/// Per-part drift on one-to-multi part payments.
pub const ONE_TO_MULTI_NOISE: f64 = 0.03;
/// Drift on partial/mismatch singleton payments.
pub const PARTIAL_NOISE: f64 = 0.15;

const MULTI_TO_ONE_MAX_DATE_OFFSET: i64 = 45;
const SINGLETON_MAX_DATE_OFFSET: i64 = 60;
/// At most this many referenced document ids are embedded in a description.
const MAX_DESCRIPTION_REFS: usize = 3;

/// Bank-only amounts are log-normal with these parameters.
const BANK_ONLY_MU: f64 = 2.0;
const BANK_ONLY_SIGMA: f64 = 1.0;

const VALUE_DATE_OFFSETS: &[i64] = &[-1, 0, 1];

const CHANNEL_CHOICES: &[Channel] = &[
    Channel::Wire,
    Channel::Ach,
    Channel::Card,
    Channel::Cash,
    Channel::Check,
    Channel::InternalTransfer,
];

#[derive(Debug, Clone, Default)]
pub struct SynthesisOutput {
    pub transactions: Vec<BankTransaction>,
    pub links: Vec<ReconciliationLink>,
}

/// Splits `total` into `parts` positive amounts: the first `parts - 1` are a
/// bounded random fraction of the running remainder (floored at 1.0 currency
/// unit), the final part absorbs the remainder. Each part is rounded to 2
/// decimals at emission, so the rounded sum may drift from `total` by a cent
/// per part.
pub fn split_amount<R: Rng + ?Sized>(rng: &mut R, total: f64, parts: usize) -> Vec<f64> {
    let mut amounts = Vec::with_capacity(parts);
    let mut remaining = total;
    for index in 1..=parts {
        let part = if index == parts {
            remaining
        } else {
            let drawn = (remaining * rng.gen_range(0.10..0.70)).max(1.0);
            remaining -= drawn;
            drawn
        };
        amounts.push(round2(part));
    }
    amounts
}

/// Emits bank transactions and ground-truth links per allocator group. Owns
/// the monotonic transaction id counter; ids are assigned in emission order.
pub struct TransactionSynthesizer<'a> {
    config: &'a DatasetConfig,
    today: NaiveDate,
    next_txn_id: u64,
}

impl<'a> TransactionSynthesizer<'a> {
    pub fn new(config: &'a DatasetConfig, today: NaiveDate) -> Self {
        Self {
            config,
            today,
            next_txn_id: 1,
        }
    }

    pub fn synthesize(
        &mut self,
        population: &Population,
        plan: &MatchPlan,
        rng: &mut StdRng,
        fuzzer: &mut dyn ContentFuzzer,
    ) -> SynthesisOutput {
        let lookup: HashMap<&str, &DocumentHeader> = population
            .all_headers()
            .map(|h| (h.doc_id.as_str(), h))
            .collect();

        let mut out = SynthesisOutput::default();

        for group in &plan.multi_to_one_groups {
            self.emit_multi_to_one(group, &lookup, &mut out, rng, fuzzer);
        }
        for split in &plan.one_to_multi_splits {
            self.emit_one_to_multi(split, &lookup, &mut out, rng, fuzzer);
        }
        for (doc_id, class) in &plan.singletons {
            self.emit_singleton(doc_id, *class, &lookup, &mut out, rng, fuzzer);
        }
        self.emit_bank_only_noise(population.document_count(), &mut out, rng, fuzzer);

        out
    }

    fn next_id(&mut self) -> String {
        let id = format!("BTX-{:08}", self.next_txn_id);
        self.next_txn_id += 1;
        id
    }

    fn create_transaction(
        &mut self,
        amount: f64,
        booking_date: NaiveDate,
        currency: &str,
        referenced_docs: &[&str],
        rng: &mut StdRng,
        fuzzer: &mut dyn ContentFuzzer,
    ) -> BankTransaction {
        let mut refs: Vec<&str> = referenced_docs.to_vec();
        refs.shuffle(rng);
        refs.truncate(MAX_DESCRIPTION_REFS);

        let reference = fuzzer.payment_reference();
        let description = if refs.is_empty() {
            format!("PAYMENT REF {reference}")
        } else {
            format!("PAYMENT {} REF {reference}", refs.join(" "))
        };

        BankTransaction {
            bank_txn_id: self.next_id(),
            booking_date,
            value_date: booking_date + Duration::days(*pick(rng, VALUE_DATE_OFFSETS)),
            amount: round2(amount),
            currency: currency.to_string(),
            counterparty_name: fuzzer.company_name(),
            counterparty_account: fuzzer.iban(),
            description,
            channel: *pick(rng, CHANNEL_CHOICES),
        }
    }

    fn emit_multi_to_one(
        &mut self,
        group: &[String],
        lookup: &HashMap<&str, &DocumentHeader>,
        out: &mut SynthesisOutput,
        rng: &mut StdRng,
        fuzzer: &mut dyn ContentFuzzer,
    ) {
        let members: Vec<&DocumentHeader> = group
            .iter()
            .filter_map(|id| lookup.get(id.as_str()).copied())
            .collect();
        let Some(earliest) = members.iter().min_by_key(|h| h.issue_date).copied() else {
            return;
        };

        let total: f64 = members.iter().map(|h| h.total_amount).sum();
        let booking_date =
            earliest.issue_date + Duration::days(rng.gen_range(0..=MULTI_TO_ONE_MAX_DATE_OFFSET));
        let amount = amount_with_noise(rng, total, MULTI_TO_ONE_NOISE);

        let refs: Vec<&str> = members.iter().map(|h| h.doc_id.as_str()).collect();
        let txn = self.create_transaction(
            amount,
            booking_date,
            &earliest.currency,
            &refs,
            rng,
            fuzzer,
        );

        for member in &members {
            out.links.push(ReconciliationLink {
                doc_id: member.doc_id.clone(),
                bank_txn_id: Some(txn.bank_txn_id.clone()),
                link_type: LinkType::MultiToOne,
            });
        }
        out.transactions.push(txn);
    }

    fn emit_one_to_multi(
        &mut self,
        split: &DocumentSplit,
        lookup: &HashMap<&str, &DocumentHeader>,
        out: &mut SynthesisOutput,
        rng: &mut StdRng,
        fuzzer: &mut dyn ContentFuzzer,
    ) {
        let Some(header) = lookup.get(split.doc_id.as_str()).copied() else {
            return;
        };

        for part in split_amount(rng, header.total_amount, split.parts) {
            let booking_date =
                header.issue_date + Duration::days(rng.gen_range(0..=SINGLETON_MAX_DATE_OFFSET));
            let amount = amount_with_noise(rng, part, ONE_TO_MULTI_NOISE);
            let txn = self.create_transaction(
                amount,
                booking_date,
                &header.currency,
                &[header.doc_id.as_str()],
                rng,
                fuzzer,
            );
            out.links.push(ReconciliationLink {
                doc_id: header.doc_id.clone(),
                bank_txn_id: Some(txn.bank_txn_id.clone()),
                link_type: LinkType::OneToMulti,
            });
            out.transactions.push(txn);
        }
    }

    fn emit_singleton(
        &mut self,
        doc_id: &str,
        class: SingletonClass,
        lookup: &HashMap<&str, &DocumentHeader>,
        out: &mut SynthesisOutput,
        rng: &mut StdRng,
        fuzzer: &mut dyn ContentFuzzer,
    ) {
        let Some(header) = lookup.get(doc_id).copied() else {
            return;
        };

        if class == SingletonClass::MissingInBank {
            out.links.push(ReconciliationLink {
                doc_id: header.doc_id.clone(),
                bank_txn_id: None,
                link_type: LinkType::MissingInBank,
            });
            return;
        }

        let (amount, link_type) = if class == SingletonClass::Exact {
            (header.total_amount, LinkType::Exact)
        } else {
            (
                amount_with_noise(rng, header.total_amount, PARTIAL_NOISE),
                LinkType::PartialOrMismatch,
            )
        };

        let booking_date =
            header.issue_date + Duration::days(rng.gen_range(0..=SINGLETON_MAX_DATE_OFFSET));
        let txn = self.create_transaction(
            amount,
            booking_date,
            &header.currency,
            &[header.doc_id.as_str()],
            rng,
            fuzzer,
        );
        out.links.push(ReconciliationLink {
            doc_id: header.doc_id.clone(),
            bank_txn_id: Some(txn.bank_txn_id.clone()),
            link_type,
        });
        out.transactions.push(txn);
    }

    /// Unlinked transactions simulating fees and unrelated payments. These are
    /// identified downstream purely by absence from the link table.
    fn emit_bank_only_noise(
        &mut self,
        n_docs: usize,
        out: &mut SynthesisOutput,
        rng: &mut StdRng,
        fuzzer: &mut dyn ContentFuzzer,
    ) {
        let count = (self.config.missing_bank_rate * n_docs as f64).floor() as usize;
        let amount_dist = LogNormal::new(BANK_ONLY_MU, BANK_ONLY_SIGMA).unwrap();

        for _ in 0..count {
            let amount = round2(amount_dist.sample(rng));
            let booking_date =
                random_date_within_days(rng, self.today, self.config.date_range_days);
            let currency = pick(rng, &self.config.currency_list).clone();
            let txn = self.create_transaction(amount, booking_date, &currency, &[], rng, fuzzer);
            out.transactions.push(txn);
        }
    }
}
