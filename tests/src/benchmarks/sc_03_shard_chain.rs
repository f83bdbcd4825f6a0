//! # SC-03 Shard Chain Benchmarks
//!
//! - Lazy score fill from a cold cache over deep chains
//! - Accepting a linear chain of empty collations
//! - Draining a fully orphaned chain delivered in reverse

use criterion::{black_box, BatchSize, BenchmarkId, Criterion, Throughput};
use sc_02_cross_shard_receipts::SharedReceiptLedger;
use sc_03_shard_chain::{
    score_of, tx_list_root, Collation, CollationHeader, InMemoryKVStore, InMemoryShardChain,
    InMemoryStateExecutor, ScoreLookup, ShardChain, StateExecutor,
};
use shared_crypto::word_from_u64;
use shared_types::{Hash, ProtocolConfig, GENESIS_HASH};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Parent links of a linear chain with only genesis scored.
struct ColdChain {
    parents: BTreeMap<Hash, Hash>,
    tip: Hash,
}

impl ColdChain {
    fn new(length: u64) -> Self {
        let mut parents = BTreeMap::new();
        let mut parent = GENESIS_HASH;
        for i in 1..=length {
            let hash = word_from_u64(i);
            parents.insert(hash, parent);
            parent = hash;
        }
        Self {
            parents,
            tip: parent,
        }
    }
}

impl ScoreLookup for ColdChain {
    fn cached_score(&self, hash: &Hash) -> Option<u64> {
        (*hash == GENESIS_HASH).then_some(0)
    }

    fn parent_of(&self, hash: &Hash) -> Option<Hash> {
        self.parents.get(hash).copied()
    }
}

fn new_chain(config: &ProtocolConfig) -> InMemoryShardChain {
    let receipts = Arc::new(SharedReceiptLedger::new(config.shard_count));
    let executor = InMemoryStateExecutor::new(0, config, receipts);
    ShardChain::new(0, config, InMemoryKVStore::new(), executor)
}

/// Linear chain of unsigned empty collations (the shard chain does not
/// check collator signatures).
fn linear_collations(config: &ProtocolConfig, length: u64) -> Vec<Collation> {
    let genesis_root = new_chain(config).executor().genesis_root();
    let mut parent = GENESIS_HASH;
    (1..=length)
        .map(|number| {
            let header = CollationHeader {
                shard_id: 0,
                expected_period_number: number,
                period_start_prevhash: word_from_u64(number),
                parent_collation_hash: parent,
                tx_list_root: tx_list_root(&[]),
                coinbase: [0xC0; 20],
                post_state_root: genesis_root,
                receipt_root: [0u8; 32],
                number,
                signature: vec![],
            };
            let collation = Collation::new(header, vec![]);
            parent = collation.hash();
            collation
        })
        .collect()
}

/// Score of the tip with a cold cache.
pub fn bench_score_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("sc-03-score-fill");
    group.measurement_time(Duration::from_secs(5));

    for length in [100u64, 1_000, 10_000] {
        let chain = ColdChain::new(length);
        group.throughput(Throughput::Elements(length));
        group.bench_with_input(BenchmarkId::new("cold_tip", length), &chain, |b, chain| {
            b.iter(|| black_box(score_of(chain, chain.tip)))
        });
    }
    group.finish();
}

/// Accept collations in order, then in reverse (all orphaned, one drain).
pub fn bench_add_collation(c: &mut Criterion) {
    let mut group = c.benchmark_group("sc-03-add-collation");
    group.measurement_time(Duration::from_secs(10));

    let config = ProtocolConfig {
        max_orphans_per_shard: 1_024,
        ..ProtocolConfig::for_testing()
    };

    for length in [50u64, 500] {
        let collations = linear_collations(&config, length);
        group.throughput(Throughput::Elements(length));

        group.bench_with_input(
            BenchmarkId::new("in_order", length),
            &collations,
            |b, collations| {
                b.iter_batched(
                    || (new_chain(&config), collations.clone()),
                    |(mut chain, collations)| {
                        for collation in collations {
                            let vantage = collation.header.period_start_prevhash;
                            black_box(chain.add_collation(collation, vantage).ok());
                        }
                    },
                    BatchSize::SmallInput,
                )
            },
        );

        group.bench_with_input(
            BenchmarkId::new("reverse_drain", length),
            &collations,
            |b, collations| {
                b.iter_batched(
                    || (new_chain(&config), collations.clone()),
                    |(mut chain, collations)| {
                        for collation in collations.into_iter().rev() {
                            let vantage = collation.header.period_start_prevhash;
                            black_box(chain.add_collation(collation, vantage).ok());
                        }
                    },
                    BatchSize::SmallInput,
                )
            },
        );
    }
    group.finish();
}

/// Register all shard-chain benchmarks.
pub fn register_benchmarks(c: &mut Criterion) {
    bench_score_fill(c);
    bench_add_collation(c);
}
