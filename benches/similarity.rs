use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::prelude::*;
use rayon::prelude::*;

use phenomatch::{Ontology, TermGroup, TermId};

const BRANCHING: u32 = 4;
const DEPTH: u32 = 6;
const GENES: usize = 2_000;

/// A balanced tree with `BRANCHING` children per term; term `1` is the root
fn ontology() -> Ontology {
    let mut ontology = Ontology::default();
    let mut n_terms = 1u32;
    let mut level = 1u32;
    for _ in 0..DEPTH {
        level *= BRANCHING;
        n_terms += level;
    }
    for id in 1..=n_terms {
        ontology.insert_term(format!("Term {id}"), id);
    }
    for child in 2..=n_terms {
        let parent = (child - 2) / BRANCHING + 1;
        ontology.add_parent(parent, child).unwrap();
    }
    ontology.create_cache();

    let mut rng = StdRng::seed_from_u64(42);
    for gene in 0..GENES {
        let terms: Vec<TermId> = (0..rng.gen_range(1..8))
            .map(|_| TermId::from(rng.gen_range(2..=n_terms)))
            .collect();
        ontology.annotate_gene(&format!("gene{gene}"), terms).unwrap();
    }
    ontology.calculate_information_content().unwrap();
    ontology
}

fn resnik_sequential(ontology: &Ontology, times: usize) -> usize {
    let mut count = 0usize;
    for term1 in ontology.iter().skip(300).take(times) {
        for term2 in ontology.iter().skip(500).take(times) {
            let score = ontology.similarity(*term1.id(), *term2.id()).unwrap();
            if score > 0.7 {
                count += 1;
            }
        }
    }
    count
}

fn resnik_parallel(ontology: &Ontology, times: usize) -> usize {
    ontology
        .iter()
        .skip(800)
        .take(times)
        .par_bridge()
        .map(|term1| {
            let mut count = 0usize;
            for term2 in ontology.iter().skip(1000).take(times) {
                let score = ontology.similarity(*term1.id(), *term2.id()).unwrap();
                if score > 0.7 {
                    count += 1;
                }
            }
            count
        })
        .sum()
}

fn gene_matching(ontology: &Ontology, patient: &TermGroup) -> usize {
    ontology
        .gene_annotations()
        .map(|gene| {
            ontology
                .match_term_set(patient, gene.terms())
                .unwrap()
                .len()
        })
        .sum()
}

fn similarity_benchmark(c: &mut Criterion) {
    let ontology = ontology();
    let patient: TermGroup = [30u32, 400, 1500, 3000, 5000]
        .into_iter()
        .map(TermId::from)
        .collect();

    c.bench_function("resnik 300", |b| {
        b.iter(|| resnik_sequential(black_box(&ontology), black_box(300)))
    });

    c.bench_function("resnik-parallel 1000", |b| {
        b.iter(|| resnik_parallel(black_box(&ontology), black_box(1000)))
    });

    c.bench_function("match patient to all genes", |b| {
        b.iter(|| gene_matching(black_box(&ontology), black_box(&patient)))
    });
}

criterion_group!(similarity, similarity_benchmark);
criterion_main!(similarity);
