//! A small, fully known universe on `chr1`
//!
//! ```text
//! position   0    5    10   15   20   25   30
//!            |....|....|....|....|....|....|
//! domains     [D1--------)  [D2-------------)
//! boundary               [--)
//! genes         [C)     [B) [D)   [A-)
//! enhancers         e1                e2
//! cnv1                [---------)
//! cnv2         [---)
//! cnv3                          [--)
//! cnv4                        [)
//! ```
//!
//! Ontology:
//!
//! ```text
//!            root
//!          /      \
//!        T1        T2
//!      / | \        |
//!    T3  T4  T5     T6
//! ```
//!
//! Genes: A -> T5, B -> T3, C -> T6, D -> T4
#![allow(dead_code)]

use phenomatch::{
    Cnv, CnvType, GeneTemplates, GenomicIndex, Interval, Ontology, TermGroup, TermId, Universe,
};

pub const ROOT: u32 = 1;
pub const T1: u32 = 2;
pub const T2: u32 = 3;
pub const T3: u32 = 4;
pub const T4: u32 = 5;
pub const T5: u32 = 6;
pub const T6: u32 = 7;

pub fn iv(start: i64, end: i64, name: &str) -> Interval {
    Interval::new("chr1", start, end, name).unwrap()
}

pub fn terms(ids: &[u32]) -> TermGroup {
    ids.iter().map(|id| TermId::from(*id)).collect()
}

pub fn ontology() -> Ontology {
    let mut ontology = Ontology::default();
    for (id, name) in [
        (ROOT, "All"),
        (T1, "T1"),
        (T2, "T2"),
        (T3, "T3"),
        (T4, "T4"),
        (T5, "T5"),
        (T6, "T6"),
    ] {
        ontology.insert_term(name.to_string(), id);
    }
    for (parent, child) in [(ROOT, T1), (ROOT, T2), (T1, T3), (T1, T4), (T1, T5), (T2, T6)] {
        ontology.add_parent(parent, child).unwrap();
    }
    ontology.create_cache();
    for (gene, term) in [("A", T5), ("B", T3), ("C", T6), ("D", T4)] {
        ontology.annotate_gene(gene, [TermId::from(term)]).unwrap();
    }
    ontology.calculate_information_content().unwrap();
    ontology
}

pub fn gene_templates() -> GeneTemplates {
    GeneTemplates::new(vec![
        iv(21, 25, "A"),
        iv(10, 13, "B"),
        iv(3, 6, "C"),
        iv(16, 18, "D"),
    ])
    .with_symbols(
        [("A", "GENEA"), ("B", "GENEB"), ("C", "GENEC"), ("D", "GENED")]
            .into_iter()
            .map(|(name, symbol)| (name.to_string(), symbol.to_string()))
            .collect(),
    )
}

pub fn universe() -> Universe {
    Universe::from_source(ontology(), &gene_templates()).unwrap()
}

pub fn domains() -> GenomicIndex<Interval> {
    vec![iv(1, 12, "D1"), iv(15, 30, "D2")].into_iter().collect()
}

pub fn enhancers() -> GenomicIndex<Interval> {
    vec![iv(7, 8, "e1"), iv(26, 28, "e2")].into_iter().collect()
}

pub fn cnvs() -> GenomicIndex<Cnv> {
    vec![
        Cnv::new(iv(9, 19, "cnv1"), CnvType::Gain, terms(&[T5])),
        Cnv::new(iv(2, 6, "cnv2"), CnvType::Loss, terms(&[T6])),
        Cnv::new(iv(19, 22, "cnv3"), CnvType::Inversion, terms(&[T3])),
        Cnv::new(iv(14, 16, "cnv4"), CnvType::Gain, terms(&[T5])),
    ]
    .into_iter()
    .collect()
}

/// Names of all records, sorted alphabetically
pub fn names<T: phenomatch::GenomicRecord>(index: &GenomicIndex<T>) -> Vec<&str> {
    let mut names = index.keys();
    names.sort_unstable();
    names
}
