use std::fmt::Display;
use std::str::FromStr;

use crate::annotate::{Stage, Stages};
use crate::genomic::{GenomicIndex, GenomicRecord, Interval};
use crate::term::{TermGroup, TermId};
use crate::{PhenomatchError, PhenomatchResult};

/// A gene with its location, associated phenotype terms and symbol
///
/// The symbol defaults to the name of the gene (usually an Entrez ID)
/// until it is resolved via [`crate::annotate::add_gene_symbols`].
#[derive(Debug, Clone, PartialEq)]
pub struct Gene {
    interval: Interval,
    terms: TermGroup,
    symbol: String,
}

impl Gene {
    /// Constructs a new [`Gene`]
    ///
    /// # Examples
    ///
    /// ```
    /// use phenomatch::{Gene, GenomicRecord, Interval, TermGroup};
    ///
    /// let gene = Gene::new(
    ///     Interval::new("chr1", 10, 20, "7157").unwrap(),
    ///     TermGroup::from(vec![118u32.into()]),
    /// );
    /// assert_eq!(gene.name(), "7157");
    /// assert_eq!(gene.symbol(), "7157");
    /// ```
    pub fn new(interval: Interval, terms: TermGroup) -> Self {
        let symbol = interval.name().to_string();
        Self {
            interval,
            terms,
            symbol,
        }
    }

    /// Sets the symbol and returns the gene
    #[must_use]
    pub fn with_symbol<S: Into<String>>(mut self, symbol: S) -> Self {
        self.symbol = symbol.into();
        self
    }

    /// Replaces the symbol of the gene
    pub fn set_symbol<S: Into<String>>(&mut self, symbol: S) {
        self.symbol = symbol.into();
    }

    /// The human readable gene symbol, e.g. `TP53`
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The phenotype terms associated with the gene
    pub fn terms(&self) -> &TermGroup {
        &self.terms
    }
}

impl GenomicRecord for Gene {
    fn interval(&self) -> &Interval {
        &self.interval
    }
}

/// The kind of copy-number change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CnvType {
    /// Deletion
    Loss,
    /// Duplication
    Gain,
    /// Inversion
    Inversion,
}

impl FromStr for CnvType {
    type Err = PhenomatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "loss" | "del" | "deletion" => Ok(CnvType::Loss),
            "gain" | "dup" | "duplication" => Ok(CnvType::Gain),
            "inversion" | "inv" => Ok(CnvType::Inversion),
            _ => Err(PhenomatchError::InvalidCnvType(s.to_string())),
        }
    }
}

impl Display for CnvType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            CnvType::Loss => "loss",
            CnvType::Gain => "gain",
            CnvType::Inversion => "inversion",
        };
        write!(f, "{kind}")
    }
}

/// A copy-number variant of a carrier, together with its annotations
///
/// A new `Cnv` carries only its location, type and the carrier phenotypes.
/// All other fields are filled by the stages in [`crate::annotate`] and
/// start out empty (sets), `None` (regions) or `0.0` (scores).
///
/// Every stage records its completion, so that dependent stages can
/// verify their prerequisites, see [`Cnv::completed`].
#[derive(Debug, Clone)]
pub struct Cnv {
    interval: Interval,
    kind: CnvType,
    phenotypes: TermGroup,
    target_term: Option<TermId>,

    boundary_overlap: GenomicIndex<Interval>,
    genes_in_overlap: GenomicIndex<Gene>,
    genes_in_overlap_tads: GenomicIndex<Gene>,

    left_adjacent_region: Option<Interval>,
    right_adjacent_region: Option<Interval>,
    genes_in_left_region: GenomicIndex<Gene>,
    genes_in_right_region: GenomicIndex<Gene>,
    enhancers_in_left_region: GenomicIndex<Interval>,
    enhancers_in_right_region: GenomicIndex<Interval>,

    left_overlapped_domain_region: Option<Interval>,
    right_overlapped_domain_region: Option<Interval>,

    overlap_phenogram_score: f32,
    left_adjacent_phenogram_score: f32,
    right_adjacent_phenogram_score: f32,

    stages: Stages,
}

impl Cnv {
    /// Constructs a new, unannotated [`Cnv`]
    ///
    /// # Examples
    ///
    /// ```
    /// use phenomatch::{Cnv, CnvType, GenomicRecord, Interval, TermGroup};
    ///
    /// let cnv = Cnv::new(
    ///     Interval::new("chr1", 9, 19, "cnv1").unwrap(),
    ///     CnvType::Loss,
    ///     TermGroup::from(vec![5u32.into()]),
    /// );
    /// assert_eq!(cnv.name(), "cnv1");
    /// assert!(cnv.genes_in_overlap().is_empty());
    /// assert_eq!(cnv.overlap_phenogram_score(), 0.0);
    /// ```
    pub fn new(interval: Interval, kind: CnvType, phenotypes: TermGroup) -> Self {
        Self {
            interval,
            kind,
            phenotypes,
            target_term: None,
            boundary_overlap: GenomicIndex::new(),
            genes_in_overlap: GenomicIndex::new(),
            genes_in_overlap_tads: GenomicIndex::new(),
            left_adjacent_region: None,
            right_adjacent_region: None,
            genes_in_left_region: GenomicIndex::new(),
            genes_in_right_region: GenomicIndex::new(),
            enhancers_in_left_region: GenomicIndex::new(),
            enhancers_in_right_region: GenomicIndex::new(),
            left_overlapped_domain_region: None,
            right_overlapped_domain_region: None,
            overlap_phenogram_score: 0.0,
            left_adjacent_phenogram_score: 0.0,
            right_adjacent_phenogram_score: 0.0,
            stages: Stages::default(),
        }
    }

    /// Sets the target term (phenotype category) of the carrier
    #[must_use]
    pub fn with_target_term(mut self, term: TermId) -> Self {
        self.target_term = Some(term);
        self
    }

    /// Returns a copy of the CNV with all annotations removed
    #[must_use]
    pub fn unannotated(&self) -> Self {
        let cnv = Self::new(self.interval.clone(), self.kind, self.phenotypes.clone());
        Self {
            target_term: self.target_term,
            ..cnv
        }
    }

    /// The type of the CNV
    pub fn kind(&self) -> CnvType {
        self.kind
    }

    /// Phenotype terms observed in the carrier
    pub fn phenotypes(&self) -> &TermGroup {
        &self.phenotypes
    }

    /// The target term (phenotype category), if any
    pub fn target_term(&self) -> Option<TermId> {
        self.target_term
    }

    /// Returns `true` if the annotation stage has run on this CNV
    pub fn completed(&self, stage: Stage) -> bool {
        self.stages.contains(stage)
    }

    /// All annotation stages that ran on this CNV
    pub fn stages(&self) -> Stages {
        self.stages
    }

    /// Boundaries that lie completely within the CNV
    pub fn boundary_overlap(&self) -> &GenomicIndex<Interval> {
        &self.boundary_overlap
    }

    /// Returns `true` if the CNV swallows at least one boundary
    pub fn has_boundary_overlap(&self) -> bool {
        !self.boundary_overlap.is_empty()
    }

    /// Genes with any overlap with the CNV
    pub fn genes_in_overlap(&self) -> &GenomicIndex<Gene> {
        &self.genes_in_overlap
    }

    /// Genes in all domains touched by the CNV
    pub fn genes_in_overlap_tads(&self) -> &GenomicIndex<Gene> {
        &self.genes_in_overlap_tads
    }

    /// Region left of the CNV start
    pub fn left_adjacent_region(&self) -> Option<&Interval> {
        self.left_adjacent_region.as_ref()
    }

    /// Region right of the CNV end
    pub fn right_adjacent_region(&self) -> Option<&Interval> {
        self.right_adjacent_region.as_ref()
    }

    /// Genes overlapping the left adjacent region
    pub fn genes_in_left_region(&self) -> &GenomicIndex<Gene> {
        &self.genes_in_left_region
    }

    /// Genes overlapping the right adjacent region
    pub fn genes_in_right_region(&self) -> &GenomicIndex<Gene> {
        &self.genes_in_right_region
    }

    /// Enhancers completely within the left adjacent region
    pub fn enhancers_in_left_region(&self) -> &GenomicIndex<Interval> {
        &self.enhancers_in_left_region
    }

    /// Enhancers completely within the right adjacent region
    pub fn enhancers_in_right_region(&self) -> &GenomicIndex<Interval> {
        &self.enhancers_in_right_region
    }

    /// Part of the domain at the CNV start that is covered by the CNV
    pub fn left_overlapped_domain_region(&self) -> Option<&Interval> {
        self.left_overlapped_domain_region.as_ref()
    }

    /// Part of the domain at the CNV end that is covered by the CNV
    pub fn right_overlapped_domain_region(&self) -> Option<&Interval> {
        self.right_overlapped_domain_region.as_ref()
    }

    /// Phenogram score of the carrier phenotypes and the overlapped genes
    pub fn overlap_phenogram_score(&self) -> f32 {
        self.overlap_phenogram_score
    }

    /// Phenogram score of the carrier phenotypes and the genes left of the CNV
    pub fn left_adjacent_phenogram_score(&self) -> f32 {
        self.left_adjacent_phenogram_score
    }

    /// Phenogram score of the carrier phenotypes and the genes right of the CNV
    pub fn right_adjacent_phenogram_score(&self) -> f32 {
        self.right_adjacent_phenogram_score
    }
}

/// Setters used by the annotation stages
///
/// Each setter marks its stage as completed. Stages that depend on it are
/// reset, their output would be stale.
impl Cnv {
    fn complete(&mut self, stage: Stage) {
        for dependent in stage.dependents() {
            if self.stages.contains(dependent) {
                self.reset(dependent);
            }
        }
        self.stages.insert(stage);
    }

    /// Clears the output of a stage and its completion mark
    fn reset(&mut self, stage: Stage) {
        match stage {
            Stage::BoundaryOverlap => self.boundary_overlap = GenomicIndex::new(),
            Stage::OverlappedGenes => self.genes_in_overlap = GenomicIndex::new(),
            Stage::GenesInOverlapTads => self.genes_in_overlap_tads = GenomicIndex::new(),
            Stage::AdjacentRegions => {
                self.left_adjacent_region = None;
                self.right_adjacent_region = None;
            }
            Stage::AdjacentGenes => {
                self.genes_in_left_region = GenomicIndex::new();
                self.genes_in_right_region = GenomicIndex::new();
            }
            Stage::AdjacentEnhancers => {
                self.enhancers_in_left_region = GenomicIndex::new();
                self.enhancers_in_right_region = GenomicIndex::new();
            }
            Stage::OverlappedDomainRegions => {
                self.left_overlapped_domain_region = None;
                self.right_overlapped_domain_region = None;
            }
            Stage::OverlapPhenogramScore => self.overlap_phenogram_score = 0.0,
            Stage::AdjacentPhenogramScore => {
                self.left_adjacent_phenogram_score = 0.0;
                self.right_adjacent_phenogram_score = 0.0;
            }
        }
        self.stages.remove(stage);
    }

    /// Returns an error unless `required` has completed
    pub(crate) fn require(&self, stage: Stage, required: Stage) -> PhenomatchResult<()> {
        if self.completed(required) {
            Ok(())
        } else {
            Err(PhenomatchError::MissingStage { stage, required })
        }
    }

    pub(crate) fn set_boundary_overlap(&mut self, boundaries: GenomicIndex<Interval>) {
        self.boundary_overlap = boundaries;
        self.complete(Stage::BoundaryOverlap);
    }

    pub(crate) fn set_genes_in_overlap(&mut self, genes: GenomicIndex<Gene>) {
        self.genes_in_overlap = genes;
        self.complete(Stage::OverlappedGenes);
    }

    pub(crate) fn set_genes_in_overlap_tads(&mut self, genes: GenomicIndex<Gene>) {
        self.genes_in_overlap_tads = genes;
        self.complete(Stage::GenesInOverlapTads);
    }

    pub(crate) fn set_adjacent_regions(&mut self, left: Interval, right: Interval) {
        self.left_adjacent_region = Some(left);
        self.right_adjacent_region = Some(right);
        self.complete(Stage::AdjacentRegions);
    }

    pub(crate) fn set_adjacent_genes(
        &mut self,
        left: GenomicIndex<Gene>,
        right: GenomicIndex<Gene>,
    ) {
        self.genes_in_left_region = left;
        self.genes_in_right_region = right;
        self.complete(Stage::AdjacentGenes);
    }

    pub(crate) fn set_adjacent_enhancers(
        &mut self,
        left: GenomicIndex<Interval>,
        right: GenomicIndex<Interval>,
    ) {
        self.enhancers_in_left_region = left;
        self.enhancers_in_right_region = right;
        self.complete(Stage::AdjacentEnhancers);
    }

    pub(crate) fn set_overlapped_domain_regions(&mut self, left: Interval, right: Interval) {
        self.left_overlapped_domain_region = Some(left);
        self.right_overlapped_domain_region = Some(right);
        self.complete(Stage::OverlappedDomainRegions);
    }

    pub(crate) fn set_overlap_phenogram_score(&mut self, score: f32) {
        self.overlap_phenogram_score = score;
        self.complete(Stage::OverlapPhenogramScore);
    }

    pub(crate) fn set_adjacent_phenogram_scores(&mut self, left: f32, right: f32) {
        self.left_adjacent_phenogram_score = left;
        self.right_adjacent_phenogram_score = right;
        self.complete(Stage::AdjacentPhenogramScore);
    }
}

impl GenomicRecord for Cnv {
    fn interval(&self) -> &Interval {
        &self.interval
    }
}
