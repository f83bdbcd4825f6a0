//! # SC-01 Validator Sampler Benchmarks
//!
//! Sampling cost as the validator set grows, and under fragmentation where
//! most candidate slots are free.

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sc_01_validator_registry::{
    derive_seeds, sample, Registry, SamplerParams, SeedMaterial, SlotView,
};
use shared_crypto::word_from_u64;
use shared_types::{Address, BlockNumber, Hash, ProtocolConfig, SlotIndex};
use std::time::Duration;

fn fake_hash(number: BlockNumber) -> Hash {
    word_from_u64(number.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn address(i: u64) -> Address {
    let mut a = [0u8; 20];
    a[12..].copy_from_slice(&i.to_be_bytes());
    a
}

fn registry_with(config: &ProtocolConfig, validators: u64) -> Registry {
    let mut registry = Registry::new(config.deposit_size);
    for i in 0..validators {
        // Benchmarks never withdraw, so the codes need not be deployed
        let _ = registry.deposit(address(i), address(i), config.deposit_size);
    }
    registry
}

/// Slot space where only every `stride`-th slot is occupied.
struct SparseView {
    slots: Vec<Option<Address>>,
    occupied: u64,
}

impl SparseView {
    fn new(size: u64, stride: u64) -> Self {
        let slots: Vec<_> = (0..size)
            .map(|i| (i % stride == 0).then(|| address(i)))
            .collect();
        let occupied = slots.iter().filter(|s| s.is_some()).count() as u64;
        Self { slots, occupied }
    }
}

impl SlotView for SparseView {
    fn occupied_count(&self) -> u64 {
        self.occupied
    }

    fn max_slot_index(&self) -> u64 {
        self.slots.len() as u64
    }

    fn validation_code_at(&self, slot: SlotIndex) -> Option<Address> {
        self.slots.get(slot as usize).copied().flatten()
    }
}

/// Sample every shard once, for growing registries.
pub fn bench_sample_all_shards(c: &mut Criterion) {
    let mut group = c.benchmark_group("sc-01-sampler");
    group.measurement_time(Duration::from_secs(5));

    let config = ProtocolConfig::default();
    let params = SamplerParams::from_config(&config);
    let seeds = derive_seeds(12_345, &config, fake_hash);

    for validators in [10u64, 100, 1_000, 10_000] {
        let registry = registry_with(&config, validators);
        group.throughput(Throughput::Elements(u64::from(config.shard_count)));
        group.bench_with_input(
            BenchmarkId::new("sample_all_shards", validators),
            &registry,
            |b, registry| {
                b.iter(|| {
                    for shard_id in 0..config.shard_count {
                        black_box(sample(shard_id, &seeds, registry, &params));
                    }
                })
            },
        );
    }
    group.finish();
}

/// Seeds at random block numbers, so fragmented runs do not replay one
/// fixed candidate sequence.
fn random_seeds(config: &ProtocolConfig, count: usize) -> Vec<SeedMaterial> {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    (0..count)
        .map(|_| derive_seeds(rng.gen_range(0..1_000_000), config, fake_hash))
        .collect()
}

/// One sample against increasingly sparse slot spaces.
pub fn bench_sample_fragmented(c: &mut Criterion) {
    let mut group = c.benchmark_group("sc-01-sampler-fragmented");
    group.measurement_time(Duration::from_secs(5));

    let config = ProtocolConfig::default();
    let params = SamplerParams::from_config(&config);
    let seeds = random_seeds(&config, 64);

    for stride in [1u64, 10, 100] {
        let view = SparseView::new(10_000, stride);
        group.bench_with_input(BenchmarkId::new("stride", stride), &view, |b, view| {
            let mut round = seeds.iter().cycle();
            b.iter(|| {
                let seeds = round.next().unwrap_or(&seeds[0]);
                black_box(sample(black_box(7), seeds, view, &params))
            })
        });
    }
    group.finish();
}

/// Seed derivation alone.
pub fn bench_derive_seeds(c: &mut Criterion) {
    let config = ProtocolConfig::default();
    c.bench_function("sc-01-derive-seeds", |b| {
        b.iter(|| black_box(derive_seeds(black_box(123_456), &config, fake_hash)))
    });
}

/// Register all sampler benchmarks.
pub fn register_benchmarks(c: &mut Criterion) {
    bench_sample_all_shards(c);
    bench_sample_fragmented(c);
    bench_derive_seeds(c);
}
