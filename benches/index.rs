use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;

use phenomatch::{GenomicIndex, Interval};

const CHROMOSOMES: [&str; 4] = ["chr1", "chr2", "chr7", "chrX"];

fn intervals(rng: &mut StdRng, n: usize, max_len: i64, prefix: &str) -> Vec<Interval> {
    (0..n)
        .map(|i| {
            let chr = CHROMOSOMES[rng.gen_range(0..CHROMOSOMES.len())];
            let start = rng.gen_range(0..200_000_000i64);
            let end = start + rng.gen_range(0..max_len);
            Interval::new(chr, start, end, format!("{prefix}{i}")).unwrap()
        })
        .collect()
}

fn any_overlap(index: &GenomicIndex<Interval>, queries: &[Interval]) -> usize {
    queries
        .iter()
        .map(|query| index.find_any_overlap(query).len())
        .sum()
}

fn complete_overlap(index: &GenomicIndex<Interval>, queries: &[Interval]) -> usize {
    queries
        .iter()
        .map(|query| index.find_complete_overlap(query).len())
        .sum()
}

fn index_benchmark(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let queries = intervals(&mut rng, 1_000, 2_000_000, "cnv");

    let mut group = c.benchmark_group("overlap");
    for size in [10_000usize, 100_000] {
        let index: GenomicIndex<Interval> =
            intervals(&mut rng, size, 100_000, "gene").into_iter().collect();

        group.bench_with_input(BenchmarkId::new("any", size), &index, |b, index| {
            b.iter(|| any_overlap(black_box(index), black_box(&queries)))
        });
        group.bench_with_input(BenchmarkId::new("complete", size), &index, |b, index| {
            b.iter(|| complete_overlap(black_box(index), black_box(&queries)))
        });
    }
    group.finish();

    let records = intervals(&mut rng, 100_000, 100_000, "gene");
    c.bench_function("build 100000", |b| {
        b.iter(|| {
            black_box(&records)
                .iter()
                .cloned()
                .collect::<GenomicIndex<Interval>>()
        })
    });
}

criterion_group!(index, index_benchmark);
criterion_main!(index);
