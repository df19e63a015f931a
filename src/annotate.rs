//! Annotation of [`Cnv`]s with overlapping genes, domains, boundaries and
//! enhancers and with phenotype match scores
//!
//! Every function in this module is one [`Stage`]. Stages mutate the CNVs
//! in place and record their completion on each CNV. A stage that reads
//! the output of another stage checks that its prerequisites completed on
//! **all** CNVs before it changes anything and otherwise returns
//! [`crate::PhenomatchError::MissingStage`].
//!
//! [`AnnotationPipeline`] runs all stages in a valid order.
//!
//! # Examples
//!
//! ```
//! use phenomatch::annotate;
//! use phenomatch::{Cnv, CnvType, GenomicIndex, Interval, TermGroup};
//!
//! let mut cnvs: GenomicIndex<Cnv> = vec![Cnv::new(
//!     Interval::new("chr1", 10, 30, "cnv1").unwrap(),
//!     CnvType::Gain,
//!     TermGroup::new(),
//! )]
//! .into_iter()
//! .collect();
//!
//! let domains: GenomicIndex<Interval> = vec![
//!     Interval::new("chr1", 0, 20, "tad1").unwrap(),
//!     Interval::new("chr1", 25, 50, "tad2").unwrap(),
//! ]
//! .into_iter()
//! .collect();
//! let boundaries = annotate::boundaries_from_domains(&domains);
//!
//! // the domain regions need the boundary overlap first
//! assert!(annotate::define_overlapped_domain_regions(&mut cnvs, &domains).is_err());
//!
//! annotate::boundary_overlap(&mut cnvs, &boundaries);
//! annotate::define_overlapped_domain_regions(&mut cnvs, &domains).unwrap();
//!
//! let cnv = cnvs.get("cnv1").unwrap();
//! assert_eq!(cnv.boundary_overlap().len(), 1);
//! assert_eq!(cnv.left_overlapped_domain_region().unwrap().end(), 20);
//! assert_eq!(cnv.right_overlapped_domain_region().unwrap().start(), 25);
//! ```
use tracing::debug;

use crate::genomic::{Cnv, Gene, GenomicIndex, GenomicRecord, Interval};
use crate::similarity::PhenogramPolicy;
use crate::{Ontology, PhenomatchResult};

mod pipeline;
mod regions;
mod stage;

pub use pipeline::AnnotationPipeline;
pub use regions::{
    add_gene_symbols, annotate_adjacent_genes, boundaries_from_domains,
    define_adjacent_regions_by_distance, define_adjacent_regions_by_domains, domains_overlap,
    filter_by_reciprocal_overlap,
};
pub use stage::{Stage, Stages};

pub(crate) const LEFT_OVERLAPPED: &str = "leftOverlapped";
pub(crate) const RIGHT_OVERLAPPED: &str = "rightOverlapped";

/// Checks that all prerequisites of `stage` completed on every CNV
fn check_prerequisites(cnvs: &GenomicIndex<Cnv>, stage: Stage) -> PhenomatchResult<()> {
    for cnv in cnvs.values() {
        for required in stage.requires() {
            cnv.require(stage, *required)?;
        }
    }
    Ok(())
}

/// Sets the boundaries that lie completely within each CNV
pub fn boundary_overlap(cnvs: &mut GenomicIndex<Cnv>, boundaries: &GenomicIndex<Interval>) {
    debug!("Annotating boundary overlap of {} CNVs", cnvs.len());
    for cnv in cnvs.values_mut() {
        let overlap = boundaries.complete_overlap(cnv.interval());
        cnv.set_boundary_overlap(overlap);
    }
}

/// Sets the genes that overlap each CNV by at least one base
pub fn annotate_overlapped_genes(cnvs: &mut GenomicIndex<Cnv>, genes: &GenomicIndex<Gene>) {
    debug!("Annotating overlapped genes of {} CNVs", cnvs.len());
    for cnv in cnvs.values_mut() {
        let overlap = genes.any_overlap(cnv.interval());
        cnv.set_genes_in_overlap(overlap);
    }
}

/// Sets all genes of all domains that are touched by each CNV
///
/// This is a superset of the overlapped genes, used to estimate effects
/// on the level of regulatory domains.
pub fn annotate_genes_in_overlap_tads(
    cnvs: &mut GenomicIndex<Cnv>,
    domains: &GenomicIndex<Interval>,
    genes: &GenomicIndex<Gene>,
) {
    debug!("Annotating genes in overlapped TADs of {} CNVs", cnvs.len());
    for cnv in cnvs.values_mut() {
        let mut tad_genes = GenomicIndex::new();
        for tad in domains.find_any_overlap(cnv.interval()) {
            for gene in genes.find_any_overlap(tad) {
                // genes spanning two domains are found twice
                if !tad_genes.contains_key(gene.name()) {
                    tad_genes.insert(gene.clone());
                }
            }
        }
        cnv.set_genes_in_overlap_tads(tad_genes);
    }
}

/// Sets the phenogram score of the carrier phenotypes and the overlapped genes
///
/// # Errors
///
/// - [`crate::PhenomatchError::MissingStage`] unless
///   [`annotate_overlapped_genes`] ran before
/// - [`crate::PhenomatchError::TermNotFound`] if a phenotype is not part
///   of the ontology
pub fn overlap_phenogram_score(
    cnvs: &mut GenomicIndex<Cnv>,
    ontology: &Ontology,
    policy: PhenogramPolicy,
) -> PhenomatchResult<()> {
    check_prerequisites(cnvs, Stage::OverlapPhenogramScore)?;
    debug!("Scoring overlapped genes of {} CNVs ({policy})", cnvs.len());
    for cnv in cnvs.values_mut() {
        let score = ontology.pheno_gram_score(cnv.phenotypes(), cnv.genes_in_overlap(), policy)?;
        cnv.set_overlap_phenogram_score(score);
    }
    Ok(())
}

/// Sets the phenogram scores of the carrier phenotypes and the genes in
/// the left and right adjacent regions
///
/// # Errors
///
/// - [`crate::PhenomatchError::MissingStage`] unless
///   [`annotate_adjacent_genes`] ran before
/// - [`crate::PhenomatchError::TermNotFound`] if a phenotype is not part
///   of the ontology
pub fn adjacent_phenogram_score(
    cnvs: &mut GenomicIndex<Cnv>,
    ontology: &Ontology,
    policy: PhenogramPolicy,
) -> PhenomatchResult<()> {
    check_prerequisites(cnvs, Stage::AdjacentPhenogramScore)?;
    debug!("Scoring adjacent genes of {} CNVs ({policy})", cnvs.len());
    for cnv in cnvs.values_mut() {
        let left =
            ontology.pheno_gram_score(cnv.phenotypes(), cnv.genes_in_left_region(), policy)?;
        let right =
            ontology.pheno_gram_score(cnv.phenotypes(), cnv.genes_in_right_region(), policy)?;
        cnv.set_adjacent_phenogram_scores(left, right);
    }
    Ok(())
}

/// Sets the enhancers that lie completely within the left and right
/// adjacent regions
///
/// # Errors
///
/// [`crate::PhenomatchError::MissingStage`] unless the adjacent regions
/// were defined before
pub fn annotate_adjacent_enhancers(
    cnvs: &mut GenomicIndex<Cnv>,
    enhancers: &GenomicIndex<Interval>,
) -> PhenomatchResult<()> {
    check_prerequisites(cnvs, Stage::AdjacentEnhancers)?;
    debug!("Annotating adjacent enhancers of {} CNVs", cnvs.len());
    for cnv in cnvs.values_mut() {
        let (left, right) = match (cnv.left_adjacent_region(), cnv.right_adjacent_region()) {
            (Some(left), Some(right)) => (
                enhancers.complete_overlap(left),
                enhancers.complete_overlap(right),
            ),
            _ => (GenomicIndex::new(), GenomicIndex::new()),
        };
        cnv.set_adjacent_enhancers(left, right);
    }
    Ok(())
}

/// Defines the domain material between each CNV breakpoint and the
/// boundaries swallowed by the CNV
///
/// ```text
/// Domains:          /'''''''''\   /'''\  /''''''''''''\
/// Boundaries:                  ---     --
/// CNV:                    ======================
/// Overlapped regions:     *****          *******
/// ```
///
/// For each breakpoint a 1-base flank just outside the CNV is checked
/// for domains. The left region spans from the CNV start to the end of
/// the domain at the start, the right region from the start of the
/// domain at the end to the CNV end. A breakpoint outside of any domain,
/// or a CNV without any boundary overlap, results in a zero-length
/// region at the breakpoint.
///
/// The regions are named `leftOverlapped` and `rightOverlapped`.
///
/// # Errors
///
/// [`crate::PhenomatchError::MissingStage`] unless [`boundary_overlap`]
/// ran before
pub fn define_overlapped_domain_regions(
    cnvs: &mut GenomicIndex<Cnv>,
    domains: &GenomicIndex<Interval>,
) -> PhenomatchResult<()> {
    check_prerequisites(cnvs, Stage::OverlappedDomainRegions)?;
    debug!("Defining overlapped domain regions of {} CNVs", cnvs.len());
    for cnv in cnvs.values_mut() {
        let chr = cnv.chr().to_string();
        let (start, end) = (cnv.start(), cnv.end());

        let mut left_end = start;
        let mut right_start = end;

        if cnv.has_boundary_overlap() {
            if let Some(flank_start) = start.checked_sub(1) {
                let flank = Interval::from_parts(chr.as_str(), flank_start, start, "cnvStart");
                let hits = domains.find_any_overlap(&flank);
                if let Some(domain_end) = hits.iter().map(|d| d.end()).max() {
                    left_end = domain_end;
                }
            }
            if let Some(flank_end) = end.checked_add(1) {
                let flank = Interval::from_parts(chr.as_str(), end, flank_end, "cnvEnd");
                let hits = domains.find_any_overlap(&flank);
                if let Some(domain_start) = hits.iter().map(|d| d.start()).min() {
                    right_start = domain_start;
                }
            }
        }

        let left = Interval::from_parts(chr.as_str(), start, left_end, LEFT_OVERLAPPED);
        let right = Interval::from_parts(chr, right_start, end, RIGHT_OVERLAPPED);
        cnv.set_overlapped_domain_regions(left, right);
    }
    Ok(())
}
