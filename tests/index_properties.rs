use phenomatch::{GenomicIndex, Interval, PhenomatchError};
use rand::prelude::*;

const CHROMOSOMES: [&str; 3] = ["chr1", "chr2", "chrX"];

fn random_intervals(rng: &mut StdRng, n: usize, prefix: &str) -> Vec<Interval> {
    (0..n)
        .map(|i| {
            let chr = CHROMOSOMES[rng.gen_range(0..CHROMOSOMES.len())];
            let start = rng.gen_range(0..10_000i64);
            // some zero-length records mark breakpoints
            let len = if i % 10 == 0 { 0 } else { rng.gen_range(1..2_000i64) };
            Interval::new(chr, start, start + len, format!("{prefix}{i}")).unwrap()
        })
        .collect()
}

fn sorted(mut names: Vec<&str>) -> Vec<&str> {
    names.sort_unstable();
    names
}

#[test]
fn invalid_intervals_are_rejected() {
    assert!(matches!(
        Interval::new("chr1", -1, 10, "negative"),
        Err(PhenomatchError::InvalidInterval { .. })
    ));
    assert!(matches!(
        Interval::new("chr1", 11, 10, "reversed"),
        Err(PhenomatchError::InvalidInterval { .. })
    ));
    let empty = Interval::new("chr1", 10, 10, "breakpoint").unwrap();
    assert_eq!(empty.len(), 0);
}

#[test]
fn any_overlap_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(1);
    let records = random_intervals(&mut rng, 500, "r");
    let index: GenomicIndex<Interval> = records.iter().cloned().collect();

    for query in random_intervals(&mut rng, 200, "q") {
        let expected: Vec<&str> = records
            .iter()
            .filter(|r| r.chr() == query.chr() && r.start() < query.end() && query.start() < r.end())
            .map(|r| r.name())
            .collect();
        let found: Vec<&str> = index.find_any_overlap(&query).iter().map(|r| r.name()).collect();
        assert_eq!(sorted(found), sorted(expected), "{query}");
    }
}

#[test]
fn complete_overlap_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(2);
    let records = random_intervals(&mut rng, 500, "r");
    let index: GenomicIndex<Interval> = records.iter().cloned().collect();

    for query in random_intervals(&mut rng, 200, "q") {
        let expected: Vec<&str> = records
            .iter()
            .filter(|r| {
                r.chr() == query.chr() && query.start() <= r.start() && r.end() <= query.end()
            })
            .map(|r| r.name())
            .collect();
        let found: Vec<&str> = index
            .find_complete_overlap(&query)
            .iter()
            .map(|r| r.name())
            .collect();
        assert_eq!(sorted(found), sorted(expected), "{query}");
    }
}

#[test]
fn other_chromosomes_never_match() {
    let index: GenomicIndex<Interval> = vec![Interval::new("chr2", 0, 1_000_000, "huge").unwrap()]
        .into_iter()
        .collect();
    let query = Interval::new("chr1", 10, 20, "q").unwrap();
    assert!(index.find_any_overlap(&query).is_empty());
    assert!(index.find_complete_overlap(&query).is_empty());
    assert!(index.find_reciprocal_overlap(&query, 0.0).is_empty());
}

#[test]
fn reciprocal_overlap_is_symmetric_and_monotone() {
    let mut rng = StdRng::seed_from_u64(3);
    let a = random_intervals(&mut rng, 100, "a");
    let b = random_intervals(&mut rng, 100, "b");
    let fractions = [0.0, 0.1, 0.25, 0.5, 0.75, 0.9, 1.0];

    for x in &a {
        for y in &b {
            let mut previous = true;
            for fraction in fractions {
                let hit = x.reciprocal_overlap(y, fraction);
                assert_eq!(hit, y.reciprocal_overlap(x, fraction), "{x} {y} {fraction}");
                // raising the threshold never adds a pair
                assert!(previous || !hit, "{x} {y} {fraction}");
                previous = hit;
            }
        }
    }
}

#[test]
fn reciprocal_overlap_query_matches_predicate() {
    let mut rng = StdRng::seed_from_u64(4);
    let records = random_intervals(&mut rng, 300, "r");
    let index: GenomicIndex<Interval> = records.iter().cloned().collect();

    for query in random_intervals(&mut rng, 100, "q") {
        for fraction in [0.0, 0.5] {
            // no chromosome filter: the predicate itself rejects disjoint pairs
            let expected: Vec<&str> = records
                .iter()
                .filter(|r| query.reciprocal_overlap(r, fraction))
                .map(|r| r.name())
                .collect();
            let found: Vec<&str> = index
                .find_reciprocal_overlap(&query, fraction)
                .iter()
                .map(|r| r.name())
                .collect();
            assert_eq!(sorted(found), sorted(expected), "{query} {fraction}");
        }
    }
}
