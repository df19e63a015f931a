//! Null model by permutation of gene phenotypes
//!
//! Every iteration shuffles which phenotype term set belongs to which
//! gene, builds a new [`Universe`] from the shuffled annotations and
//! annotates a fresh copy of the CNVs against it. The set of term sets
//! stays the same, only the pairing of genes and term sets is random.
//!
//! Each iteration draws from its own random number generator, seeded from
//! the base seed and the iteration number. Iterations are independent of
//! each other and yield the same result whether they run in sequence or in
//! parallel.
use rand::prelude::*;
use tracing::{debug, info};

use crate::annotate::AnnotationPipeline;
use crate::genomic::{Cnv, GenomicIndex, GenomicRecord};
use crate::output::{self, GeneReport};
use crate::stats::NullDistribution;
use crate::term::TermGroup;
use crate::{GeneSource, Ontology, PhenomatchError, PhenomatchResult, Universe};

/// Returns a copy of `ontology` with randomly reassigned gene annotations
///
/// The term graph is kept. Every gene receives the directly annotated
/// terms of a random gene, each term set is used exactly once. The
/// information content is recalculated from the new annotations.
///
/// # Errors
///
/// Returns [`PhenomatchError::TryFromIntError`] if there are more than
/// `u32::MAX` genes
///
/// # Examples
///
/// ```
/// use phenomatch::permutation::permute_gene_phenotypes;
/// use phenomatch::{Ontology, TermId};
/// use rand::prelude::*;
///
/// let mut ontology = Ontology::default();
/// for (id, name) in [(1u32, "All"), (2, "Eye"), (3, "Ear")] {
///     ontology.insert_term(name.to_string(), id);
/// }
/// ontology.add_parent(1u32, 2u32).unwrap();
/// ontology.add_parent(1u32, 3u32).unwrap();
/// ontology.create_cache();
/// ontology.annotate_gene("a", [TermId::from(2u32)]).unwrap();
/// ontology.annotate_gene("b", [TermId::from(3u32)]).unwrap();
/// ontology.calculate_information_content().unwrap();
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let permuted = permute_gene_phenotypes(&ontology, &mut rng).unwrap();
/// assert_eq!(permuted.gene_count(), 2);
/// assert_eq!(permuted.gene_terms("a").unwrap().len(), 1);
/// ```
pub fn permute_gene_phenotypes<R: Rng + ?Sized>(
    ontology: &Ontology,
    rng: &mut R,
) -> PhenomatchResult<Ontology> {
    let mut term_sets: Vec<&TermGroup> = ontology
        .gene_annotations()
        .map(|gene| gene.terms())
        .collect();
    term_sets.shuffle(rng);

    let mut permuted = ontology.without_annotations();
    for (gene, terms) in ontology.gene_annotations().zip(term_sets) {
        permuted.annotate_gene(gene.name(), terms)?;
    }
    permuted.calculate_information_content()?;
    Ok(permuted)
}

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// splitmix64 finalizer over the base seed and the iteration
fn mix_seed(seed: u64, iteration: u64) -> u64 {
    let mut z = (seed ^ iteration.wrapping_mul(GOLDEN_GAMMA)).wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// The highest best-match score of any gene overlapped by `cnv`
pub(crate) fn max_overlapped_gene_score(ontology: &Ontology, cnv: &Cnv) -> PhenomatchResult<f32> {
    let mut max = 0.0f32;
    for gene in cnv.genes_in_overlap().values() {
        max = max.max(ontology.gene_score(cnv.phenotypes(), gene)?.max());
    }
    Ok(max)
}

/// The annotated CNVs and gene report rows of one permutation iteration
#[derive(Debug, Clone)]
pub struct IterationResult {
    iteration: usize,
    cnvs: GenomicIndex<Cnv>,
    max_gene_scores: Vec<(String, f32)>,
    overlapped_gene_rows: Vec<String>,
    tad_gene_rows: Vec<String>,
}

impl IterationResult {
    /// The 1-based iteration number
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// The CNVs, annotated against the permuted universe
    pub fn cnvs(&self) -> &GenomicIndex<Cnv> {
        &self.cnvs
    }

    /// The highest score of any overlapped gene, per CNV in natural order
    pub fn max_gene_scores(&self) -> &[(String, f32)] {
        &self.max_gene_scores
    }

    /// The highest score of any gene overlapped by the given CNV
    pub fn max_gene_score(&self, cnv: &str) -> Option<f32> {
        self.max_gene_scores
            .iter()
            .find(|(name, _)| name == cnv)
            .map(|(_, score)| *score)
    }

    /// The rows of the given report
    pub fn rows(&self, report: GeneReport) -> &[String] {
        match report {
            GeneReport::OverlappedGenes => &self.overlapped_gene_rows,
            GeneReport::GenesInOverlappedTads => &self.tad_gene_rows,
        }
    }
}

/// Runs the annotation against permuted gene phenotypes
///
/// The engine borrows all inputs. The CNVs are copied without their
/// annotations for every iteration, so the same engine can run any number
/// of iterations, also from several threads.
///
/// # Examples
///
/// ```
/// use phenomatch::annotate::AnnotationPipeline;
/// use phenomatch::permutation::PermutationEngine;
/// use phenomatch::{Cnv, CnvType, GeneTemplates, GenomicIndex, Interval, Ontology, TermGroup, TermId};
///
/// let mut ontology = Ontology::default();
/// for (id, name) in [(1u32, "All"), (2, "Eye"), (3, "Ear")] {
///     ontology.insert_term(name.to_string(), id);
/// }
/// ontology.add_parent(1u32, 2u32).unwrap();
/// ontology.add_parent(1u32, 3u32).unwrap();
/// ontology.create_cache();
/// ontology.annotate_gene("a", [TermId::from(2u32)]).unwrap();
/// ontology.annotate_gene("b", [TermId::from(3u32)]).unwrap();
/// ontology.calculate_information_content().unwrap();
///
/// let genes = GeneTemplates::new(vec![
///     Interval::new("chr1", 10, 20, "a").unwrap(),
///     Interval::new("chr1", 50, 60, "b").unwrap(),
/// ]);
/// let cnvs: GenomicIndex<Cnv> = vec![Cnv::new(
///     Interval::new("chr1", 0, 30, "cnv1").unwrap(),
///     CnvType::Loss,
///     TermGroup::from(vec![TermId::from(2u32)]),
/// )]
/// .into_iter()
/// .collect();
///
/// let pipeline = AnnotationPipeline::new();
/// let engine = PermutationEngine::new(&ontology, &genes, &cnvs, &pipeline).with_seed(7);
/// let runs = engine.run(10).unwrap();
/// assert_eq!(runs.len(), 10);
///
/// // gene `a` carries `Eye` in about half of the permutations
/// let null = runs.null_distribution("cnv1");
/// assert_eq!(null.len(), 10);
/// assert!(null.scores().iter().all(|s| *s == 0.0 || (*s - 0.6931).abs() < 0.001));
/// ```
#[derive(Debug)]
pub struct PermutationEngine<'a, S: ?Sized> {
    ontology: &'a Ontology,
    source: &'a S,
    cnvs: &'a GenomicIndex<Cnv>,
    pipeline: &'a AnnotationPipeline<'a>,
    seed: u64,
}

impl<'a, S: GeneSource + ?Sized> PermutationEngine<'a, S> {
    /// Constructs an engine with seed `0`
    ///
    /// `ontology` holds the original gene annotations, `source` builds the
    /// genes for every permuted ontology.
    pub fn new(
        ontology: &'a Ontology,
        source: &'a S,
        cnvs: &'a GenomicIndex<Cnv>,
        pipeline: &'a AnnotationPipeline<'a>,
    ) -> Self {
        Self {
            ontology,
            source,
            cnvs,
            pipeline,
            seed: 0,
        }
    }

    /// Sets the base seed of all iterations
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// The base seed
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The seed of the random number generator of one iteration
    ///
    /// Base seed and iteration are mixed, so runs with neighbouring base
    /// seeds do not share iterations.
    pub fn iteration_seed(&self, iteration: usize) -> u64 {
        mix_seed(self.seed, iteration as u64)
    }

    /// Builds the permuted universe of one iteration
    ///
    /// # Errors
    ///
    /// Returns the error of the [`GeneSource`] or of the permutation
    pub fn universe(&self, iteration: usize) -> PhenomatchResult<Universe> {
        let mut rng = StdRng::seed_from_u64(self.iteration_seed(iteration));
        let permuted = permute_gene_phenotypes(self.ontology, &mut rng)?;
        Universe::from_source(permuted, self.source)
    }

    /// Runs a single iteration
    ///
    /// # Errors
    ///
    /// Returns [`PhenomatchError::Permutation`] with the iteration number
    /// and the underlying error if the iteration fails
    pub fn run_iteration(&self, iteration: usize) -> PhenomatchResult<IterationResult> {
        self.try_iteration(iteration)
            .map_err(|err| PhenomatchError::Permutation {
                iteration,
                source: Box::new(err),
            })
    }

    fn try_iteration(&self, iteration: usize) -> PhenomatchResult<IterationResult> {
        debug!("Permutation iteration {iteration}");
        let universe = self.universe(iteration)?;
        let mut cnvs: GenomicIndex<Cnv> = self.cnvs.values().map(Cnv::unannotated).collect();
        self.pipeline.run(&mut cnvs, &universe)?;

        let ontology = universe.ontology();
        let max_gene_scores = cnvs
            .values()
            .map(|cnv| Ok((cnv.name().to_string(), max_overlapped_gene_score(ontology, cnv)?)))
            .collect::<PhenomatchResult<Vec<(String, f32)>>>()?;

        Ok(IterationResult {
            iteration,
            overlapped_gene_rows: output::report_rows(
                &cnvs,
                ontology,
                GeneReport::OverlappedGenes,
            )?,
            tad_gene_rows: output::report_rows(&cnvs, ontology, GeneReport::GenesInOverlappedTads)?,
            max_gene_scores,
            cnvs,
        })
    }

    /// Runs the iterations `1..=iterations` one after another
    ///
    /// Stops at the first failing iteration.
    ///
    /// # Errors
    ///
    /// Returns [`PhenomatchError::Permutation`] of the first failing iteration
    pub fn run(&self, iterations: usize) -> PhenomatchResult<PermutationRuns> {
        info!("Running {iterations} permutations of gene phenotypes (seed {})", self.seed);
        let runs = (1..=iterations)
            .map(|iteration| self.run_iteration(iteration))
            .collect::<PhenomatchResult<PermutationRuns>>()?;
        info!("Finished {} permutations", runs.len());
        Ok(runs)
    }
}

/// The results of all permutation iterations, ordered by iteration
#[derive(Debug, Clone, Default)]
pub struct PermutationRuns {
    iterations: Vec<IterationResult>,
}

impl PermutationRuns {
    /// The number of iterations
    pub fn len(&self) -> usize {
        self.iterations.len()
    }

    /// Returns `true` if no iteration ran
    pub fn is_empty(&self) -> bool {
        self.iterations.is_empty()
    }

    /// Iterates the results of all iterations
    pub fn iter(&self) -> std::slice::Iter<'_, IterationResult> {
        self.iterations.iter()
    }

    /// The rows of the given report of all iterations, concatenated in
    /// order of the iterations
    ///
    /// The lines have no header.
    pub fn lines(&self, report: GeneReport) -> Vec<&str> {
        self.iterations
            .iter()
            .flat_map(|result| result.rows(report).iter().map(String::as_str))
            .collect()
    }

    /// The maximum overlapped gene score of the CNV across all iterations
    pub fn null_distribution(&self, cnv: &str) -> NullDistribution {
        self.iterations
            .iter()
            .filter_map(|result| result.max_gene_score(cnv))
            .collect()
    }
}

impl FromIterator<IterationResult> for PermutationRuns {
    fn from_iter<I: IntoIterator<Item = IterationResult>>(iter: I) -> Self {
        let mut iterations: Vec<IterationResult> = iter.into_iter().collect();
        iterations.sort_by_key(IterationResult::iteration);
        Self { iterations }
    }
}

impl<'a> IntoIterator for &'a PermutationRuns {
    type Item = &'a IterationResult;
    type IntoIter = std::slice::Iter<'a, IterationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::TermId;

    fn ontology() -> Ontology {
        let mut ont = Ontology::default();
        for n in 1..=6u32 {
            ont.insert_term(format!("Term {n}"), n);
        }
        ont.add_parent(1u32, 2u32).unwrap();
        ont.add_parent(1u32, 3u32).unwrap();
        ont.add_parent(2u32, 4u32).unwrap();
        ont.add_parent(2u32, 5u32).unwrap();
        ont.add_parent(3u32, 6u32).unwrap();
        ont.create_cache();
        for (gene, term) in [("a", 4u32), ("b", 5), ("c", 6), ("d", 4)] {
            ont.annotate_gene(gene, [TermId::from(term)]).unwrap();
        }
        ont.annotate_gene("e", [TermId::from(5u32), TermId::from(6u32)]).unwrap();
        ont.calculate_information_content().unwrap();
        ont
    }

    fn term_sets(ont: &Ontology) -> Vec<TermGroup> {
        let mut sets: Vec<TermGroup> = ont.gene_annotations().map(|g| g.terms().clone()).collect();
        sets.sort_by_key(|set| set.iter().map(|id| id.as_u32()).collect::<Vec<u32>>());
        sets
    }

    #[test]
    fn permutation_keeps_term_sets() {
        let ont = ontology();
        let mut rng = StdRng::seed_from_u64(1);
        let permuted = permute_gene_phenotypes(&ont, &mut rng).unwrap();
        assert_eq!(permuted.gene_count(), ont.gene_count());
        assert_eq!(term_sets(&permuted), term_sets(&ont));
        assert_eq!(permuted.len(), ont.len());
        for name in ["a", "b", "c", "d", "e"] {
            assert!(permuted.gene_annotation(name).is_some());
        }
    }

    #[test]
    fn information_content_is_recalculated() {
        let ont = ontology();
        let mut rng = StdRng::seed_from_u64(1);
        let permuted = permute_gene_phenotypes(&ont, &mut rng).unwrap();
        // the marginal term frequencies do not change
        for term in &ont {
            let other = permuted.term(*term.id()).unwrap();
            assert_eq!(term.gene_count(), other.gene_count());
            assert_eq!(term.information_content(), other.information_content());
        }
    }

    #[test]
    fn neighbouring_seeds_do_not_share_iterations() {
        let seeds: Vec<u64> = (0..64u64)
            .flat_map(|seed| (1..=64u64).map(move |iteration| mix_seed(seed, iteration)))
            .collect();
        let mut unique = seeds.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), seeds.len());
        assert_ne!(mix_seed(7, 2), mix_seed(8, 1));
    }

    #[test]
    fn same_seed_same_permutation() {
        let ont = ontology();
        let a = permute_gene_phenotypes(&ont, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = permute_gene_phenotypes(&ont, &mut StdRng::seed_from_u64(99)).unwrap();
        for gene in ont.gene_annotations() {
            assert_eq!(a.gene_terms(gene.name()), b.gene_terms(gene.name()));
        }
    }
}
