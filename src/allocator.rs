use crate::population::Population;
use crate::schema::DatasetConfig;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

pub const MULTI_GROUP_MIN: usize = 2;
pub const MULTI_GROUP_MAX: usize = 5;
pub const SPLIT_PARTS_MIN: usize = 2;
pub const SPLIT_PARTS_MAX: usize = 4;

/// Classification of a document that is neither grouped nor split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingletonClass {
    Exact,
    PartialOrMismatch,
    MissingInBank,
}

/// One document paid across `parts` bank transactions.
#[derive(Debug, Clone)]
pub struct DocumentSplit {
    pub doc_id: String,
    pub parts: usize,
}

/// The authoritative allocation plan consumed by the transaction synthesizer.
/// Membership sets are disjoint and their union is the full document
/// population.
#[derive(Debug, Clone, Default)]
pub struct MatchPlan {
    pub multi_to_one_groups: Vec<Vec<String>>,
    pub one_to_multi_splits: Vec<DocumentSplit>,
    pub singletons: Vec<(String, SingletonClass)>,
}

impl MatchPlan {
    /// Total number of documents covered by the plan.
    pub fn planned_documents(&self) -> usize {
        let grouped: usize = self.multi_to_one_groups.iter().map(Vec::len).sum();
        grouped + self.one_to_multi_splits.len() + self.singletons.len()
    }
}

/// Partitions the document population into disjoint per-pattern subsets,
/// honoring the configured target rates.
pub struct PatternAllocator<'a> {
    config: &'a DatasetConfig,
}

impl<'a> PatternAllocator<'a> {
    pub fn new(config: &'a DatasetConfig) -> Self {
        Self { config }
    }

    pub fn allocate(&self, population: &Population, rng: &mut StdRng) -> MatchPlan {
        let mut pool: Vec<String> = population
            .all_headers()
            .map(|h| h.doc_id.clone())
            .collect();
        pool.shuffle(rng);

        // Shuffled pool: taking a prefix is sampling without replacement, and
        // the one-to-multi sample is drawn only from what the multi-to-one
        // sample left behind.
        let n_multi = floor_count(self.config.multi_to_one_rate, pool.len());
        let multi_pool: Vec<String> = pool.drain(..n_multi).collect();

        let n_splits = floor_count(self.config.one_to_multi_rate, pool.len());
        let split_pool: Vec<String> = pool.drain(..n_splits).collect();

        let (multi_to_one_groups, leftover) = self.chunk_multi_groups(multi_pool, rng);

        let one_to_multi_splits = split_pool
            .into_iter()
            .map(|doc_id| DocumentSplit {
                doc_id,
                parts: rng.gen_range(SPLIT_PARTS_MIN..=SPLIT_PARTS_MAX),
            })
            .collect();

        // An undersized tail from the grouping step rejoins the singleton
        // pool, keeping the partition total.
        pool.extend(leftover);
        let singletons = self.classify_singletons(pool, rng);

        MatchPlan {
            multi_to_one_groups,
            one_to_multi_splits,
            singletons,
        }
    }

    /// Chunks the multi-to-one pool into groups of random size in
    /// [MULTI_GROUP_MIN, MULTI_GROUP_MAX]. Returns the groups and any tail too
    /// small to form one.
    fn chunk_multi_groups(
        &self,
        multi_pool: Vec<String>,
        rng: &mut StdRng,
    ) -> (Vec<Vec<String>>, Vec<String>) {
        let mut groups = Vec::new();
        let mut leftover = Vec::new();

        let mut start = 0;
        while start < multi_pool.len() {
            let size = rng.gen_range(MULTI_GROUP_MIN..=MULTI_GROUP_MAX);
            let end = (start + size).min(multi_pool.len());
            let group = &multi_pool[start..end];
            if group.len() < MULTI_GROUP_MIN {
                leftover.extend_from_slice(group);
            } else {
                groups.push(group.to_vec());
            }
            start = end;
        }

        (groups, leftover)
    }

    /// Sequentially carves the remaining pool into exact bucket counts:
    /// `floor(missing_rate * n)` missing, then `floor(partial_rate * rest)`
    /// partial, the remainder exact. Sampling without replacement via a fresh
    /// shuffle.
    fn classify_singletons(
        &self,
        mut pool: Vec<String>,
        rng: &mut StdRng,
    ) -> Vec<(String, SingletonClass)> {
        pool.shuffle(rng);

        let n_missing = floor_count(self.config.missing_invoice_rate, pool.len());
        let n_partial = floor_count(self.config.partial_match_rate, pool.len() - n_missing);

        pool.into_iter()
            .enumerate()
            .map(|(idx, doc_id)| {
                let class = if idx < n_missing {
                    SingletonClass::MissingInBank
                } else if idx < n_missing + n_partial {
                    SingletonClass::PartialOrMismatch
                } else {
                    SingletonClass::Exact
                };
                (doc_id, class)
            })
            .collect()
    }
}

fn floor_count(rate: f64, population: usize) -> usize {
    (rate * population as f64).floor() as usize
}
