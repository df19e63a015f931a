//! `phenomatch` interprets copy-number variants (CNVs) by the genes and
//! topologically associating domains (TADs) they touch and by how well the
//! phenotypes of those genes match the phenotypes of the CNV carrier.
//!
//! The crate has two cores:
//!
//! - [`GenomicIndex`]: a chromosome-partitioned interval index with
//!   any-overlap, complete-overlap and reciprocal-overlap queries
//! - [`Ontology`]: a phenotype ontology with information content per term,
//!   used for Resnik-style similarity between carrier and gene phenotypes
//!
//! [`annotate`] combines both to annotate CNVs stage by stage and
//! [`permutation`] reruns the annotation on randomly permuted gene phenotypes
//! to build empirical null distributions.
//!
//! # Workflow
//!
//! 1. Build the [`Ontology`]: insert terms, connect them, cache the
//!    ancestors, annotate genes and calculate the information content.
//! 2. Describe where the genes are with [`GeneTemplates`] (or any other
//!    [`GeneSource`]). Genes take their phenotypes from the ontology.
//! 3. Collect the CNVs, domains and enhancers in [`GenomicIndex`]es.
//! 4. Run an [`analysis::Analysis`] with an [`AnalysisConfig`], or the
//!    stages of [`annotate`] one by one.
//! 5. Read the annotated CNVs and the report lines of [`output`] from the
//!    [`analysis::AnalysisResult`]. Writing files is up to the caller.
//!
//! Stages that read the output of other stages check that those ran first
//! and return [`PhenomatchError::MissingStage`] otherwise. Running a stage
//! again resets the stages that depend on it.
//!
//! # Examples
//!
//! ```
//! use phenomatch::annotate::AnnotationPipeline;
//! use phenomatch::{Cnv, CnvType, GeneTemplates, GenomicIndex, Interval, Ontology, TermGroup, TermId, Universe};
//!
//! let mut ontology = Ontology::default();
//! for (id, name) in [(1u32, "All"), (2, "Eye"), (3, "Cataract"), (4, "Ear")] {
//!     ontology.insert_term(name.to_string(), id);
//! }
//! ontology.add_parent(1u32, 2u32).unwrap();
//! ontology.add_parent(2u32, 3u32).unwrap();
//! ontology.add_parent(1u32, 4u32).unwrap();
//! ontology.create_cache();
//! ontology.annotate_gene("CRYAA", [TermId::from(3u32)]).unwrap();
//! ontology.annotate_gene("OTOF", [TermId::from(4u32)]).unwrap();
//! ontology.calculate_information_content().unwrap();
//!
//! let genes = GeneTemplates::new(vec![
//!     Interval::new("chr21", 100, 200, "CRYAA").unwrap(),
//!     Interval::new("chr21", 900, 1000, "OTOF").unwrap(),
//! ]);
//! let universe = Universe::from_source(ontology, &genes).unwrap();
//!
//! let mut cnvs: GenomicIndex<Cnv> = vec![Cnv::new(
//!     Interval::new("chr21", 50, 500, "patient").unwrap(),
//!     CnvType::Loss,
//!     TermGroup::from(vec![TermId::from(3u32)]),
//! )]
//! .into_iter()
//! .collect();
//!
//! AnnotationPipeline::new()
//!     .with_adjacent_region_size(1000)
//!     .run(&mut cnvs, &universe)
//!     .unwrap();
//!
//! let cnv = cnvs.get("patient").unwrap();
//! assert_eq!(cnv.genes_in_overlap().keys(), vec!["CRYAA"]);
//! assert_eq!(cnv.genes_in_right_region().keys(), vec!["OTOF"]);
//! assert!(cnv.overlap_phenogram_score() > 0.69);
//! ```
//!
//! # Logging
//!
//! Progress and warnings (duplicate record names, overlapping domains) are
//! emitted with `tracing`. Without a `tracing` subscriber the events are
//! forwarded to the `log` facade, so any logger works, see
//! `demos/toy_analysis.rs`.
//!
//! # Reproducibility
//!
//! Permutation iterations derive their random number generator from one
//! base seed and the iteration number. The same seed gives identical rows,
//! independent of whether the iterations run in sequence or in parallel.
use core::fmt::Debug;
use std::num::{ParseIntError, TryFromIntError};
use thiserror::Error;

pub mod analysis;
pub mod annotate;
pub mod annotations;
pub mod config;
pub mod genomic;
mod ontology;
pub mod output;
pub mod permutation;
pub mod similarity;
pub mod stats;
pub mod term;
mod universe;

pub use annotate::Stage;
pub use config::AnalysisConfig;
pub use genomic::{Cnv, CnvType, Gene, GenomicIndex, GenomicRecord, Interval};
pub use ontology::Ontology;
pub use similarity::{PhenogramPolicy, TermPair};
pub use term::{PhenotypeTerm, TermGroup, TermId};
pub use universe::{GeneSource, GeneTemplates, Universe};

const DEFAULT_NUM_PARENTS: usize = 10;
const DEFAULT_NUM_ALL_PARENTS: usize = 30;
const DEFAULT_NUM_GENES: usize = 50;

/// Main Error type for this crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PhenomatchError {
    /// Interval coordinates are negative or `start > end`
    #[error("invalid interval {chr}:[{start},{end})")]
    InvalidInterval {
        /// Chromosome of the rejected interval
        chr: String,
        /// Start coordinate as provided
        start: i64,
        /// End coordinate as provided
        end: i64,
    },
    /// Unknown CNV type, expected `loss`, `gain` or `inversion`
    #[error("invalid CNV type {0}")]
    InvalidCnvType(String),
    /// The term is not part of the ontology
    #[error("term {0} does not exist in the ontology")]
    TermNotFound(TermId),
    /// Any other entity (gene annotation, record) does not exist
    #[error("does not exist")]
    DoesNotExist,
    /// Failed to parse an integer, e.g. the numerical part of a term ID
    #[error("unable to parse Integer")]
    ParseIntError,
    /// Failed to convert an integer to a smaller type
    #[error("integer does not fit into the target type")]
    TryFromIntError,
    /// An annotation stage ran before one of its prerequisites
    #[error("annotation stage {stage} requires {required} to run first")]
    MissingStage {
        /// The stage that was invoked
        stage: Stage,
        /// The stage that should have run before
        required: Stage,
    },
    /// A single permutation iteration failed to rebuild its universe
    #[error("permutation iteration {iteration} failed")]
    Permutation {
        /// 1-based iteration number
        iteration: usize,
        /// The underlying failure
        #[source]
        source: Box<PhenomatchError>,
    },
    /// The external gene collaborator failed to provide genes
    #[error("unable to build genes: {0}")]
    GeneSource(String),
}

impl From<ParseIntError> for PhenomatchError {
    fn from(_: ParseIntError) -> Self {
        PhenomatchError::ParseIntError
    }
}

impl From<TryFromIntError> for PhenomatchError {
    fn from(_: TryFromIntError) -> Self {
        PhenomatchError::TryFromIntError
    }
}

/// Shortcut for `Result<T, PhenomatchError>`
pub type PhenomatchResult<T> = Result<T, PhenomatchError>;

/// Converts a count into `f64` without silently truncating it
///
/// # Errors
///
/// Returns [`PhenomatchError::TryFromIntError`] if the count exceeds `u32::MAX`
fn f64_from_usize(n: usize) -> PhenomatchResult<f64> {
    Ok(f64::from(u32::try_from(n)?))
}
