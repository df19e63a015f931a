//! Annotates a handful of CNVs on a small, made-up genome and estimates
//! empirical p-values by permuting the gene phenotypes
//!
//! ```text
//! cargo run --example toy_analysis [PERMUTATIONS] [SEED]
//! ```
//!
//! Set `RUST_LOG=debug` to follow the annotation stages.
use phenomatch::analysis::Analysis;
use phenomatch::output::GeneReport;
use phenomatch::{
    AnalysisConfig, Cnv, CnvType, GeneTemplates, GenomicIndex, GenomicRecord, Interval, Ontology,
    TermGroup, TermId,
};

/// A small phenotype ontology
///
/// ```text
///             All (1)
///           /        \
///     Eye (2)         Ear (3)
///    /   |    \          |
/// (4)   (5)   (6)       (7)
/// ```
fn ontology() -> Ontology {
    let mut ontology = Ontology::default();
    for (id, name) in [
        (1u32, "All"),
        (2, "Abnormality of the eye"),
        (3, "Abnormality of the ear"),
        (4, "Cataract"),
        (5, "Glaucoma"),
        (6, "Myopia"),
        (7, "Hearing impairment"),
    ] {
        ontology.insert_term(name.to_string(), id);
    }
    for (parent, child) in [(1u32, 2u32), (1, 3), (2, 4), (2, 5), (2, 6), (3, 7)] {
        ontology.add_parent(parent, child).unwrap();
    }
    ontology.create_cache();

    for (gene, term) in [("1001", 6u32), ("1002", 4), ("1003", 7), ("1004", 5)] {
        ontology.annotate_gene(gene, [TermId::from(term)]).unwrap();
    }
    ontology.calculate_information_content().unwrap();
    ontology
}

fn interval(start: i64, end: i64, name: &str) -> Interval {
    Interval::new("chr1", start, end, name).unwrap()
}

fn genes() -> GeneTemplates {
    GeneTemplates::new(vec![
        interval(2100, 2500, "1001"),
        interval(1000, 1300, "1002"),
        interval(300, 600, "1003"),
        interval(1600, 1800, "1004"),
    ])
    .with_symbols(
        [
            ("1001", "OPN1"),
            ("1002", "CRYA"),
            ("1003", "OTO2"),
            ("1004", "MYO7"),
        ]
        .into_iter()
        .map(|(id, symbol)| (id.to_string(), symbol.to_string()))
        .collect(),
    )
}

fn domains() -> GenomicIndex<Interval> {
    vec![interval(100, 1200, "tad1"), interval(1500, 3000, "tad2")]
        .into_iter()
        .collect()
}

fn enhancers() -> GenomicIndex<Interval> {
    vec![interval(700, 800, "enh1"), interval(2600, 2800, "enh2")]
        .into_iter()
        .collect()
}

fn terms(ids: &[u32]) -> TermGroup {
    ids.iter().map(|id| TermId::from(*id)).collect()
}

fn cnvs() -> GenomicIndex<Cnv> {
    vec![
        Cnv::new(interval(900, 1900, "patient1"), CnvType::Gain, terms(&[6])),
        Cnv::new(interval(200, 600, "patient2"), CnvType::Loss, terms(&[7])),
        Cnv::new(interval(1900, 2200, "patient3"), CnvType::Inversion, terms(&[4])),
        Cnv::new(interval(1400, 1600, "patient4"), CnvType::Gain, terms(&[6])),
    ]
    .into_iter()
    .collect()
}

fn main() {
    simple_logger::SimpleLogger::new().env().init().unwrap();

    let mut args = std::env::args().skip(1);
    let permutations: usize = args.next().map_or(100, |arg| arg.parse().unwrap());
    let seed: u64 = args.next().map_or(42, |arg| arg.parse().unwrap());

    let ontology = ontology();
    let genes = genes();
    let domains = domains();
    let enhancers = enhancers();

    let config = AnalysisConfig::new("toy")
        .with_permutations(permutations)
        .with_seed(seed);
    let result = Analysis::new(config, &ontology, &genes)
        .with_domains(&domains)
        .with_enhancers(&enhancers)
        .run(cnvs())
        .unwrap();

    for report in GeneReport::ALL {
        if let Some((path, lines)) = result.report(report) {
            println!("==> {path} <==");
            for line in lines {
                println!("{line}");
            }
            println!();
        }
    }

    println!("CNV\tmaxScore\tnullMean\tp");
    for cnv in result.cnvs().values() {
        let name = cnv.name();
        let score = result.max_gene_score(name).unwrap().unwrap_or_default();
        let mean = result
            .null_distribution(name)
            .and_then(|null| null.mean())
            .map_or_else(|| ".".to_string(), |mean| format!("{mean:.4}"));
        let p = result
            .empirical_p_value(name)
            .unwrap()
            .map_or_else(|| ".".to_string(), |p| format!("{p:.4}"));
        println!("{name}\t{score:.4}\t{mean}\t{p}");
    }
}
