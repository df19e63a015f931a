use tracing::debug;

use crate::annotate::{self, regions};
use crate::genomic::{Cnv, GenomicIndex, Interval};
use crate::similarity::PhenogramPolicy;
use crate::{PhenomatchResult, Universe};

/// Runs all annotation stages on a set of CNVs in dependency order
///
/// The pipeline holds the inputs that stay the same for every run: the
/// domains with their boundaries, the enhancers and the way adjacent
/// regions are defined. The phenotype [`Universe`] is passed to
/// [`AnnotationPipeline::run`], so the same pipeline can annotate CNVs
/// against many permuted universes.
///
/// Stages that lack their input are skipped:
///
/// - without domains, there are no boundaries and no genes in overlapped TADs
/// - adjacent regions come from the domains if present, otherwise from a
///   fixed distance, otherwise they are not defined at all
/// - enhancers are only annotated when provided
///
/// Running the pipeline again on annotated CNVs recomputes every stage.
/// Rerunning a single stage by hand resets the stages that depend on it.
///
/// # Examples
///
/// ```
/// use phenomatch::annotate::AnnotationPipeline;
/// use phenomatch::{Cnv, CnvType, GenomicIndex, Interval, Ontology, Stage, TermGroup, Universe};
///
/// let domains: GenomicIndex<Interval> = vec![
///     Interval::new("chr1", 0, 20, "tad1").unwrap(),
///     Interval::new("chr1", 25, 50, "tad2").unwrap(),
/// ]
/// .into_iter()
/// .collect();
///
/// let mut cnvs: GenomicIndex<Cnv> = vec![Cnv::new(
///     Interval::new("chr1", 10, 30, "cnv1").unwrap(),
///     CnvType::Loss,
///     TermGroup::new(),
/// )]
/// .into_iter()
/// .collect();
///
/// let universe = Universe::new(Ontology::default(), GenomicIndex::new());
/// let pipeline = AnnotationPipeline::new().with_domains(&domains);
/// pipeline.run(&mut cnvs, &universe).unwrap();
///
/// let cnv = cnvs.get("cnv1").unwrap();
/// assert!(cnv.completed(Stage::AdjacentPhenogramScore));
/// assert_eq!(cnv.left_adjacent_region().unwrap().start(), 0);
/// assert_eq!(cnv.right_adjacent_region().unwrap().end(), 50);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AnnotationPipeline<'a> {
    domains: Option<&'a GenomicIndex<Interval>>,
    boundaries: GenomicIndex<Interval>,
    enhancers: Option<&'a GenomicIndex<Interval>>,
    adjacent_region_size: Option<u32>,
    policy: PhenogramPolicy,
}

impl<'a> AnnotationPipeline<'a> {
    /// Constructs a pipeline without domains and enhancers
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `domains` and the boundaries between them
    ///
    /// Overlapping domains result in an empty set of boundaries, see
    /// [`annotate::boundaries_from_domains`].
    #[must_use]
    pub fn with_domains(mut self, domains: &'a GenomicIndex<Interval>) -> Self {
        self.boundaries = regions::boundaries_from_domains(domains);
        self.domains = Some(domains);
        self
    }

    /// Annotates the enhancers in the adjacent regions
    #[must_use]
    pub fn with_enhancers(mut self, enhancers: &'a GenomicIndex<Interval>) -> Self {
        self.enhancers = Some(enhancers);
        self
    }

    /// Defines adjacent regions by distance when no domains are given
    #[must_use]
    pub fn with_adjacent_region_size(mut self, size: u32) -> Self {
        self.adjacent_region_size = Some(size);
        self
    }

    /// Sets the rule to combine gene scores into phenogram scores
    #[must_use]
    pub fn with_policy(mut self, policy: PhenogramPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The boundaries between the domains
    pub fn boundaries(&self) -> &GenomicIndex<Interval> {
        &self.boundaries
    }

    /// The phenogram aggregation rule
    pub fn policy(&self) -> PhenogramPolicy {
        self.policy
    }

    /// Annotates all `cnvs` against `universe`
    ///
    /// # Errors
    ///
    /// Returns [`crate::PhenomatchError::TermNotFound`] if a carrier
    /// phenotype is not part of the ontology of the universe
    pub fn run(&self, cnvs: &mut GenomicIndex<Cnv>, universe: &Universe) -> PhenomatchResult<()> {
        let genes = universe.genes();
        let no_domains = GenomicIndex::new();
        let domains = self.domains.unwrap_or(&no_domains);
        debug!(
            "Running annotation pipeline on {} CNVs with {} genes and {} domains",
            cnvs.len(),
            genes.len(),
            domains.len()
        );

        annotate::boundary_overlap(cnvs, &self.boundaries);
        annotate::annotate_overlapped_genes(cnvs, genes);
        annotate::annotate_genes_in_overlap_tads(cnvs, domains, genes);
        annotate::define_overlapped_domain_regions(cnvs, domains)?;

        let has_adjacent_regions = match (self.domains, self.adjacent_region_size) {
            (Some(domains), _) => {
                regions::define_adjacent_regions_by_domains(cnvs, domains);
                true
            }
            (None, Some(size)) => {
                regions::define_adjacent_regions_by_distance(cnvs, size);
                true
            }
            (None, None) => false,
        };

        if has_adjacent_regions {
            regions::annotate_adjacent_genes(cnvs, genes)?;
            if let Some(enhancers) = self.enhancers {
                annotate::annotate_adjacent_enhancers(cnvs, enhancers)?;
            }
            annotate::adjacent_phenogram_score(cnvs, universe.ontology(), self.policy)?;
        }

        annotate::overlap_phenogram_score(cnvs, universe.ontology(), self.policy)
    }
}
