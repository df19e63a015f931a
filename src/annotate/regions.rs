use std::collections::HashMap;

use tracing::{debug, warn};

use crate::annotate::{check_prerequisites, Stage};
use crate::genomic::{Cnv, Gene, GenomicIndex, GenomicRecord, Interval};
use crate::PhenomatchResult;

pub(crate) const LEFT_ADJACENT: &str = "leftAdjacent";
pub(crate) const RIGHT_ADJACENT: &str = "rightAdjacent";

/// Returns `true` if any domain overlaps another domain
pub fn domains_overlap(domains: &GenomicIndex<Interval>) -> bool {
    domains
        .values()
        .any(|domain| domains.find_any_overlap(domain).len() > 1)
}

/// Computes the boundaries between consecutive domains
///
/// A boundary is the gap `[previous.end, next.start)` between two
/// consecutive domains on the same chromosome. Directly adjacent domains
/// result in a zero-length boundary. Boundaries are named `boundary_<n>`,
/// counting from `1` in natural order.
///
/// Boundaries are only defined for non-overlapping domains. If any domain
/// overlaps another one, a warning is logged and no boundaries are
/// returned.
///
/// # Examples
///
/// ```
/// use phenomatch::annotate::boundaries_from_domains;
/// use phenomatch::{GenomicIndex, Interval};
///
/// let domains: GenomicIndex<Interval> = vec![
///     Interval::new("chr1", 1, 12, "tad1").unwrap(),
///     Interval::new("chr1", 15, 30, "tad2").unwrap(),
///     Interval::new("chr2", 0, 10, "tad3").unwrap(),
/// ]
/// .into_iter()
/// .collect();
///
/// let boundaries = boundaries_from_domains(&domains);
/// assert_eq!(boundaries.len(), 1);
/// let boundary = boundaries.get("boundary_1").unwrap();
/// assert_eq!((boundary.start(), boundary.end()), (12, 15));
/// ```
pub fn boundaries_from_domains(domains: &GenomicIndex<Interval>) -> GenomicIndex<Interval> {
    let mut boundaries = GenomicIndex::new();
    if domains_overlap(domains) {
        warn!("Domains are overlapping, no boundaries are defined");
        return boundaries;
    }

    let mut previous: Option<&Interval> = None;
    for domain in domains.values() {
        if let Some(prev) = previous.filter(|prev| prev.chr() == domain.chr()) {
            let name = format!("boundary_{}", boundaries.len() + 1);
            boundaries.insert(Interval::from_parts(
                domain.chr(),
                prev.end(),
                domain.start(),
                name,
            ));
        }
        previous = Some(domain);
    }
    debug!(
        "Defined {} boundaries between {} domains",
        boundaries.len(),
        domains.len()
    );
    boundaries
}

/// Defines the adjacent regions as fixed-size windows next to the CNV
///
/// The left region is `[start - size, start)`, clipped at `0`, the right
/// region is `[end, end + size)`. The regions are named `leftAdjacent`
/// and `rightAdjacent`.
pub fn define_adjacent_regions_by_distance(cnvs: &mut GenomicIndex<Cnv>, size: u32) {
    debug!("Defining adjacent regions of {size} bp for {} CNVs", cnvs.len());
    for cnv in cnvs.values_mut() {
        let left = Interval::from_parts(
            cnv.chr(),
            cnv.start().saturating_sub(size),
            cnv.start(),
            LEFT_ADJACENT,
        );
        let right = Interval::from_parts(
            cnv.chr(),
            cnv.end(),
            cnv.end().saturating_add(size),
            RIGHT_ADJACENT,
        );
        cnv.set_adjacent_regions(left, right);
    }
}

/// Defines the adjacent regions by the domains at the CNV breakpoints
///
/// The left region spans from the start of the domain just left of the
/// CNV start up to the CNV start, the right region from the CNV end to
/// the end of the domain just right of the CNV end. A breakpoint outside
/// of any domain results in a zero-length region at the breakpoint.
pub fn define_adjacent_regions_by_domains(
    cnvs: &mut GenomicIndex<Cnv>,
    domains: &GenomicIndex<Interval>,
) {
    debug!("Defining adjacent regions by domains for {} CNVs", cnvs.len());
    for cnv in cnvs.values_mut() {
        let (start, end) = (cnv.start(), cnv.end());

        let left_start = start
            .checked_sub(1)
            .map(|flank| Interval::from_parts(cnv.chr(), flank, start, "cnvStart"))
            .and_then(|flank| domains.find_any_overlap(&flank).iter().map(|d| d.start()).min())
            .unwrap_or(start);

        let right_end = end
            .checked_add(1)
            .map(|flank| Interval::from_parts(cnv.chr(), end, flank, "cnvEnd"))
            .and_then(|flank| domains.find_any_overlap(&flank).iter().map(|d| d.end()).max())
            .unwrap_or(end);

        let left = Interval::from_parts(cnv.chr(), left_start, start, LEFT_ADJACENT);
        let right = Interval::from_parts(cnv.chr(), end, right_end, RIGHT_ADJACENT);
        cnv.set_adjacent_regions(left, right);
    }
}

/// Sets the genes overlapping the left and right adjacent regions
///
/// Zero-length regions contain no genes.
///
/// # Errors
///
/// [`crate::PhenomatchError::MissingStage`] unless the adjacent regions
/// were defined before
pub fn annotate_adjacent_genes(
    cnvs: &mut GenomicIndex<Cnv>,
    genes: &GenomicIndex<Gene>,
) -> PhenomatchResult<()> {
    check_prerequisites(cnvs, Stage::AdjacentGenes)?;
    debug!("Annotating adjacent genes of {} CNVs", cnvs.len());
    let genes_in = |region: Option<&Interval>| match region {
        Some(region) if !region.is_empty() => genes.any_overlap(region),
        _ => GenomicIndex::new(),
    };
    for cnv in cnvs.values_mut() {
        let left = genes_in(cnv.left_adjacent_region());
        let right = genes_in(cnv.right_adjacent_region());
        cnv.set_adjacent_genes(left, right);
    }
    Ok(())
}

/// Removes all CNVs that reciprocally overlap any control by at least `fraction`
///
/// Returns the number of removed CNVs.
pub fn filter_by_reciprocal_overlap<T: GenomicRecord>(
    cnvs: &mut GenomicIndex<Cnv>,
    controls: &GenomicIndex<T>,
    fraction: f64,
) -> usize {
    let before = cnvs.len();
    cnvs.retain(|cnv| {
        controls
            .find_reciprocal_overlap(cnv.interval(), fraction)
            .is_empty()
    });
    let removed = before - cnvs.len();
    debug!("Removed {removed} of {before} CNVs overlapping controls");
    removed
}

/// Replaces the symbol of each gene by its entry in `symbols`
///
/// `symbols` maps the gene name (e.g. the Entrez ID) to the symbol. Genes
/// without an entry keep their current symbol.
pub fn add_gene_symbols(genes: &mut GenomicIndex<Gene>, symbols: &HashMap<String, String>) {
    for gene in genes.values_mut() {
        if let Some(symbol) = symbols.get(gene.name()) {
            gene.set_symbol(symbol.as_str());
        }
    }
}
