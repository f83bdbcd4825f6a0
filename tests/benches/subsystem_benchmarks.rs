//! # Shard-Chain Subsystem Benchmarks
//!
//! | Subsystem | Path | Expectation |
//! |-----------|------|-------------|
//! | sc-01 Validator Sampler | `sample` per shard | O(rounds) hashing, independent of registry size |
//! | sc-01 Validator Sampler | `derive_seeds` | Two block-hash lookups |
//! | sc-03 Shard Chain | Cold score fill | Linear in the unscored stretch, once |
//! | sc-03 Shard Chain | `add_collation` | Linear in chain length, in order or drained |

use criterion::{criterion_group, criterion_main, Criterion};
use sc_tests::benchmarks::{sc_01_sampler, sc_03_shard_chain};

fn sampler_benchmarks(c: &mut Criterion) {
    sc_01_sampler::register_benchmarks(c);
}

fn shard_chain_benchmarks(c: &mut Criterion) {
    sc_03_shard_chain::register_benchmarks(c);
}

criterion_group!(benches, sampler_benchmarks, shard_chain_benchmarks);
criterion_main!(benches);
