//! Tab-separated gene reports of annotated CNVs
//!
//! Each report lists one row per CNV and matching gene. Writing the rows
//! to disk is left to the caller, this module only assembles the lines
//! and the file names.
use std::fmt::Display;

use crate::genomic::{Cnv, Gene, GenomicIndex, GenomicRecord};
use crate::similarity::TermPair;
use crate::{Ontology, PhenomatchResult};

/// Column names of a gene report
pub const HEADER: [&str; 15] = [
    "chr",
    "start",
    "end",
    "name",
    "phenotypes",
    "gene_symbol",
    "phenoMatchScore",
    "maxPhenoMatchScore",
    "maxPatientMatchTerm",
    "maxGeneMatchTerm",
    "maxCommonTerm",
    "allPatientMatchTerm",
    "allGeneMatchTerm",
    "allCommonTerm",
    "allMatchScore",
];

const MISSING: &str = ".";

/// The header line of a gene report, starting with `#`
///
/// ```
/// use phenomatch::output::header_line;
///
/// assert!(header_line().starts_with("#chr\tstart\tend\tname\tphenotypes"));
/// ```
pub fn header_line() -> String {
    format!("#{}", HEADER.join("\t"))
}

/// Formats a score with at most 4 decimals and without trailing zeros
///
/// ```
/// use phenomatch::output::format_score;
///
/// assert_eq!(format_score(0.0), "0");
/// assert_eq!(format_score(0.287682), "0.2877");
/// assert_eq!(format_score(1.5), "1.5");
/// assert_eq!(format_score(3.0), "3");
/// ```
pub fn format_score(score: f32) -> String {
    let formatted = format!("{score:.4}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-0" => "0".to_string(),
        _ => trimmed.to_string(),
    }
}

/// The gene sets of a [`Cnv`] that are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneReport {
    /// Genes overlapping the CNV
    OverlappedGenes,
    /// All genes in the domains overlapping the CNV
    GenesInOverlappedTads,
}

impl GeneReport {
    /// Both reports
    pub const ALL: [GeneReport; 2] = [
        GeneReport::OverlappedGenes,
        GeneReport::GenesInOverlappedTads,
    ];

    /// The file name suffix of the report
    pub fn suffix(&self) -> &'static str {
        match self {
            GeneReport::OverlappedGenes => "overlapped_genes.txt",
            GeneReport::GenesInOverlappedTads => "genes_in_overlapped_TADs.txt",
        }
    }

    /// The reported genes of `cnv`
    pub fn genes<'c>(&self, cnv: &'c Cnv) -> &'c GenomicIndex<Gene> {
        match self {
            GeneReport::OverlappedGenes => cnv.genes_in_overlap(),
            GeneReport::GenesInOverlappedTads => cnv.genes_in_overlap_tads(),
        }
    }
}

impl Display for GeneReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneReport::OverlappedGenes => write!(f, "overlapped genes"),
            GeneReport::GenesInOverlappedTads => write!(f, "genes in overlapped TADs"),
        }
    }
}

fn join_pairs<F: Fn(&TermPair) -> String>(pairs: &[TermPair], column: F) -> String {
    pairs.iter().map(column).collect::<Vec<String>>().join(";")
}

/// Returns one row for each gene in `genes` that matches the phenotypes of `cnv`
///
/// Genes without any phenotype match are skipped. If no gene matches,
/// a single row with `0` scores and `.` in all term columns is returned,
/// so that every CNV appears in the report.
///
/// # Errors
///
/// Returns [`crate::PhenomatchError::TermNotFound`] if a term is not
/// part of the ontology
pub fn cnv_gene_rows(
    cnv: &Cnv,
    genes: &GenomicIndex<Gene>,
    ontology: &Ontology,
) -> PhenomatchResult<Vec<String>> {
    let location = format!("{}\t{}\t{}\t{}", cnv.chr(), cnv.start(), cnv.end(), cnv.name());
    let phenotypes = if cnv.phenotypes().is_empty() {
        MISSING.to_string()
    } else {
        cnv.phenotypes().join(";")
    };

    let mut rows = Vec::new();
    for gene in genes.values() {
        let score = ontology.gene_score(cnv.phenotypes(), gene)?;
        let Some(best) = score.best_pair() else {
            continue;
        };
        let pairs = score.pairs();
        let columns = [
            phenotypes.clone(),
            gene.symbol().to_string(),
            format_score(score.sum()),
            format_score(score.max()),
            best.patient_term().to_string(),
            best.gene_term().to_string(),
            best.lca().to_string(),
            join_pairs(pairs, |p| p.patient_term().to_string()),
            join_pairs(pairs, |p| p.gene_term().to_string()),
            join_pairs(pairs, |p| p.lca().to_string()),
            join_pairs(pairs, |p| format_score(p.score())),
        ];
        rows.push(format!("{location}\t{}", columns.join("\t")));
    }

    if rows.is_empty() {
        let columns = [
            phenotypes.as_str(),
            MISSING,
            "0",
            "0",
            MISSING,
            MISSING,
            MISSING,
            MISSING,
            MISSING,
            MISSING,
            "0",
        ];
        rows.push(format!("{location}\t{}", columns.join("\t")));
    }
    Ok(rows)
}

/// Returns the rows of `report` for all CNVs in natural order, without header
///
/// # Errors
///
/// Returns [`crate::PhenomatchError::TermNotFound`] if a term is not
/// part of the ontology
pub fn report_rows(
    cnvs: &GenomicIndex<Cnv>,
    ontology: &Ontology,
    report: GeneReport,
) -> PhenomatchResult<Vec<String>> {
    let mut rows = Vec::with_capacity(cnvs.len());
    for cnv in cnvs.values() {
        rows.extend(cnv_gene_rows(cnv, report.genes(cnv), ontology)?);
    }
    Ok(rows)
}

/// Returns all lines of `report`, starting with the [`header_line`]
///
/// # Errors
///
/// Returns [`crate::PhenomatchError::TermNotFound`] if a term is not
/// part of the ontology
pub fn report_lines(
    cnvs: &GenomicIndex<Cnv>,
    ontology: &Ontology,
    report: GeneReport,
) -> PhenomatchResult<Vec<String>> {
    let mut lines = vec![header_line()];
    lines.extend(report_rows(cnvs, ontology, report)?);
    Ok(lines)
}

/// File names of the gene reports
///
/// ```
/// use phenomatch::output::{GeneReport, OutputFiles};
///
/// let files = OutputFiles::new("out/sample");
/// assert_eq!(files.path(GeneReport::OverlappedGenes), "out/sample.overlapped_genes.txt");
///
/// let files = OutputFiles::permutation("out/sample", 100);
/// assert_eq!(
///     files.path(GeneReport::GenesInOverlappedTads),
///     "out/sample.permutGenePT_100.genes_in_overlapped_TADs.txt"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    prefix: String,
}

impl OutputFiles {
    /// The reports of a regular analysis
    pub fn new<S: Into<String>>(prefix: S) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The reports of `permutations` permutation iterations
    pub fn permutation<S: AsRef<str>>(prefix: S, permutations: usize) -> Self {
        Self {
            prefix: format!("{}.permutGenePT_{permutations}", prefix.as_ref()),
        }
    }

    /// The path of the given report
    pub fn path(&self, report: GeneReport) -> String {
        format!("{}.{}", self.prefix, report.suffix())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{CnvType, Interval, TermGroup, TermId};

    fn ontology() -> Ontology {
        let mut ont = Ontology::default();
        for n in 1..=4u32 {
            ont.insert_term(format!("Term {n}"), n);
        }
        ont.add_parent(1u32, 2u32).unwrap();
        ont.add_parent(2u32, 3u32).unwrap();
        ont.add_parent(1u32, 4u32).unwrap();
        ont.create_cache();
        ont.annotate_gene("g1", [TermId::from(3u32)]).unwrap();
        ont.annotate_gene("g2", [TermId::from(4u32)]).unwrap();
        ont.annotate_gene("g3", [TermId::from(2u32)]).unwrap();
        ont.calculate_information_content().unwrap();
        ont
    }

    fn gene(name: &str, start: i64, terms: Vec<u32>) -> Gene {
        Gene::new(
            Interval::new("chr1", start, start + 5, name).unwrap(),
            terms.into_iter().map(TermId::from).collect(),
        )
        .with_symbol(format!("SYM_{name}"))
    }

    fn cnv(phenotypes: Vec<u32>) -> Cnv {
        Cnv::new(
            Interval::new("chr1", 0, 100, "cnv1").unwrap(),
            CnvType::Loss,
            phenotypes.into_iter().map(TermId::from).collect::<TermGroup>(),
        )
    }

    #[test]
    fn header_has_all_columns() {
        assert_eq!(header_line().split('\t').count(), HEADER.len());
    }

    #[test]
    fn matching_gene_row() {
        let ont = ontology();
        let genes: GenomicIndex<Gene> = vec![gene("g1", 10, vec![3]), gene("g2", 30, vec![4])]
            .into_iter()
            .collect();
        let rows = cnv_gene_rows(&cnv(vec![3]), &genes, &ont).unwrap();
        assert_eq!(rows.len(), 1);
        let columns: Vec<&str> = rows[0].split('\t').collect();
        assert_eq!(columns.len(), HEADER.len());
        assert_eq!(&columns[..6], &["chr1", "0", "100", "cnv1", "HP:0000003", "SYM_g1"]);
        // IC(3) = ln(3)
        assert_eq!(columns[6], "1.0986");
        assert_eq!(columns[7], "1.0986");
        assert_eq!(&columns[8..11], &["HP:0000003", "HP:0000003", "HP:0000003"]);
        assert_eq!(columns[14], "1.0986");
    }

    #[test]
    fn all_columns_are_aligned() {
        let ont = ontology();
        let genes: GenomicIndex<Gene> = vec![gene("g1", 10, vec![3])].into_iter().collect();
        let rows = cnv_gene_rows(&cnv(vec![2, 3]), &genes, &ont).unwrap();
        let columns: Vec<&str> = rows[0].split('\t').collect();
        assert_eq!(columns[4], "HP:0000002;HP:0000003");
        assert_eq!(columns[11], "HP:0000002;HP:0000003");
        assert_eq!(columns[12], "HP:0000003;HP:0000003");
        assert_eq!(columns[13], "HP:0000002;HP:0000003");
        assert_eq!(columns[14], "0.4055;1.0986");
        assert_eq!(columns[6], "1.5041");
        assert_eq!(columns[7], "1.0986");
        assert_eq!(columns[8], "HP:0000003");
    }

    #[test]
    fn placeholder_row() {
        let ont = ontology();
        let genes: GenomicIndex<Gene> = vec![gene("g2", 30, vec![4])].into_iter().collect();
        let rows = cnv_gene_rows(&cnv(vec![3]), &genes, &ont).unwrap();
        assert_eq!(
            rows,
            vec!["chr1\t0\t100\tcnv1\tHP:0000003\t.\t0\t0\t.\t.\t.\t.\t.\t.\t0".to_string()]
        );

        let rows = cnv_gene_rows(&cnv(vec![]), &GenomicIndex::new(), &ont).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].starts_with("chr1\t0\t100\tcnv1\t.\t.\t0"));
    }

    #[test]
    fn unknown_terms_fail() {
        let ont = ontology();
        let genes: GenomicIndex<Gene> = vec![gene("g1", 10, vec![3])].into_iter().collect();
        assert!(cnv_gene_rows(&cnv(vec![99]), &genes, &ont).is_err());
    }
}
