//! Semantic similarity between phenotype terms and sets of terms
//!
//! Single terms are compared with a [`Similarity`] algorithm, by default
//! [`Resnik`]: the information content of the most informative common
//! ancestor. Sets of terms are compared by a best-match strategy: every
//! carrier phenotype is matched to its most similar gene phenotype,
//! resulting in one [`TermPair`] per carrier phenotype.
//!
//! Scores of several genes (e.g. all genes overlapped by a CNV) are
//! combined into a single phenogram score by a [`PhenogramPolicy`].
use std::fmt::Display;

use crate::genomic::{Gene, GenomicIndex};
use crate::{f64_from_usize, Ontology, PhenomatchResult, PhenotypeTerm, TermGroup, TermId};

/// Trait for similarity score calculation between 2 [`PhenotypeTerm`]s
pub trait Similarity {
    /// calculates the actual similarity between term a and term b
    fn calculate(&self, a: &PhenotypeTerm, b: &PhenotypeTerm) -> f32;
}

/// Similarity score from Resnik
///
/// The similarity is the information content of the lowest common
/// ancestor, or `0` if the terms have no common ancestor.
///
/// For a detailed description see [Resnik P, Proceedings of the 14th IJCAI, (1995)](https://www.ijcai.org/Proceedings/95-1/Papers/059.pdf)
#[derive(Debug, Default, Clone, Copy)]
pub struct Resnik;

impl Similarity for Resnik {
    fn calculate(&self, a: &PhenotypeTerm, b: &PhenotypeTerm) -> f32 {
        a.lowest_common_ancestor(b)
            .map_or(0.0, |lca| lca.information_content().gene())
    }
}

/// One matched pair of a carrier phenotype and a gene phenotype
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermPair {
    patient_term: TermId,
    gene_term: TermId,
    lca: TermId,
    score: f32,
}

impl TermPair {
    /// The phenotype of the carrier
    pub fn patient_term(&self) -> TermId {
        self.patient_term
    }

    /// The best matching phenotype of the gene
    pub fn gene_term(&self) -> TermId {
        self.gene_term
    }

    /// The lowest common ancestor of both terms
    pub fn lca(&self) -> TermId {
        self.lca
    }

    /// The similarity score of both terms
    pub fn score(&self) -> f32 {
        self.score
    }
}

/// The aggregated match of a set of carrier phenotypes to one gene
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneScore {
    pairs: Vec<TermPair>,
    sum: f32,
    max: f32,
}

impl GeneScore {
    fn new(pairs: Vec<TermPair>) -> Self {
        let sum = pairs.iter().map(TermPair::score).sum();
        let max = pairs.iter().map(TermPair::score).fold(0.0, f32::max);
        Self { pairs, sum, max }
    }

    /// Sum of all best-match scores, the overall score of the gene
    pub fn sum(&self) -> f32 {
        self.sum
    }

    /// The highest best-match score
    pub fn max(&self) -> f32 {
        self.max
    }

    /// All matched pairs, ordered by carrier phenotype
    pub fn pairs(&self) -> &[TermPair] {
        &self.pairs
    }

    /// The pair with the highest score
    ///
    /// Ties are resolved by carrier phenotype order.
    pub fn best_pair(&self) -> Option<&TermPair> {
        self.pairs.iter().fold(None, |best: Option<&TermPair>, pair| match best {
            Some(b) if b.score >= pair.score => Some(b),
            _ => Some(pair),
        })
    }
}

/// Rule to combine the scores of several genes into one phenogram score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PhenogramPolicy {
    /// The highest gene score
    #[default]
    Max,
    /// The sum of all gene scores
    Sum,
    /// The average gene score
    Mean,
}

impl PhenogramPolicy {
    /// Aggregates the gene scores according to the policy
    ///
    /// An empty set of scores results in `0`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PhenomatchError::TryFromIntError`] if more than
    /// `u32::MAX` scores are averaged
    ///
    /// # Examples
    ///
    /// ```
    /// use phenomatch::PhenogramPolicy;
    ///
    /// let scores = [0.5, 1.5, 1.0];
    /// assert_eq!(PhenogramPolicy::Max.aggregate(scores).unwrap(), 1.5);
    /// assert_eq!(PhenogramPolicy::Sum.aggregate(scores).unwrap(), 3.0);
    /// assert_eq!(PhenogramPolicy::Mean.aggregate(scores).unwrap(), 1.0);
    /// assert_eq!(PhenogramPolicy::Mean.aggregate(Vec::new()).unwrap(), 0.0);
    /// ```
    #[allow(clippy::cast_possible_truncation)]
    pub fn aggregate<I: IntoIterator<Item = f32>>(&self, scores: I) -> PhenomatchResult<f32> {
        let scores = scores.into_iter();
        match self {
            PhenogramPolicy::Max => Ok(scores.fold(0.0, f32::max)),
            PhenogramPolicy::Sum => Ok(scores.sum()),
            PhenogramPolicy::Mean => {
                let (count, total) = scores.fold((0usize, 0.0f32), |(n, sum), s| (n + 1, sum + s));
                if count == 0 {
                    return Ok(0.0);
                }
                Ok(total / f64_from_usize(count)? as f32)
            }
        }
    }
}

impl Display for PhenogramPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PhenogramPolicy::Max => "max",
            PhenogramPolicy::Sum => "sum",
            PhenogramPolicy::Mean => "mean",
        };
        write!(f, "{name}")
    }
}

/// Similarity calculations on the Ontology
impl Ontology {
    /// Returns the [`Resnik`] similarity of two terms
    ///
    /// # Errors
    ///
    /// Returns [`crate::PhenomatchError::TermNotFound`] if a term is not
    /// part of the ontology
    pub fn similarity(&self, a: TermId, b: TermId) -> PhenomatchResult<f32> {
        let a = self.try_term(a)?;
        let b = self.try_term(b)?;
        Ok(a.similarity_score(&b, &Resnik))
    }

    /// Matches each carrier phenotype to its most similar gene phenotype
    ///
    /// Returns one [`TermPair`] per carrier phenotype, in order of the
    /// carrier phenotypes. If several gene phenotypes match equally well,
    /// the one with the lowest [`TermId`] is used. Carrier phenotypes
    /// without any similarity to the gene (score `0`) are omitted, so an
    /// empty set on either side results in an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PhenomatchError::TermNotFound`] if a term is not
    /// part of the ontology
    ///
    /// # Examples
    ///
    /// ```
    /// use phenomatch::{Ontology, TermGroup, TermId};
    ///
    /// let mut ontology = Ontology::default();
    /// for (id, name) in [(1u32, "All"), (2, "Eye"), (3, "Cataract"), (4, "Glaucoma"), (5, "Ear")] {
    ///     ontology.insert_term(name.to_string(), id);
    /// }
    /// ontology.add_parent(1u32, 2u32).unwrap();
    /// ontology.add_parent(2u32, 3u32).unwrap();
    /// ontology.add_parent(2u32, 4u32).unwrap();
    /// ontology.add_parent(1u32, 5u32).unwrap();
    /// ontology.create_cache();
    /// ontology.annotate_gene("g1", [TermId::from(3u32)]).unwrap();
    /// ontology.annotate_gene("g2", [TermId::from(5u32)]).unwrap();
    /// ontology.calculate_information_content().unwrap();
    ///
    /// let patient = TermGroup::from(vec![TermId::from(4u32), TermId::from(5u32)]);
    /// let gene = TermGroup::from(vec![TermId::from(3u32)]);
    ///
    /// let pairs = ontology.match_term_set(&patient, &gene).unwrap();
    /// // `Ear` has nothing in common with `Cataract` except the root
    /// assert_eq!(pairs.len(), 1);
    /// assert_eq!(pairs[0].patient_term(), TermId::from(4u32));
    /// assert_eq!(pairs[0].lca(), TermId::from(2u32));
    /// ```
    pub fn match_term_set(
        &self,
        patient_terms: &TermGroup,
        gene_terms: &TermGroup,
    ) -> PhenomatchResult<Vec<TermPair>> {
        let gene_terms = gene_terms
            .iter()
            .map(|id| self.try_term(id))
            .collect::<PhenomatchResult<Vec<PhenotypeTerm>>>()?;

        let mut pairs = Vec::with_capacity(patient_terms.len());
        for patient_id in patient_terms {
            let patient_term = self.try_term(patient_id)?;
            let mut best: Option<(f32, &PhenotypeTerm, PhenotypeTerm)> = None;
            for gene_term in &gene_terms {
                let Some(lca) = patient_term.lowest_common_ancestor(gene_term) else {
                    continue;
                };
                let score = lca.information_content().gene();
                if best.as_ref().map_or(true, |(s, _, _)| score > *s) {
                    best = Some((score, gene_term, lca));
                }
            }
            match best {
                Some((score, gene_term, lca)) if score > 0.0 => pairs.push(TermPair {
                    patient_term: patient_id,
                    gene_term: *gene_term.id(),
                    lca: *lca.id(),
                    score,
                }),
                _ => {}
            }
        }
        Ok(pairs)
    }

    /// Matches the carrier phenotypes to the phenotypes of a gene
    ///
    /// See [`Ontology::match_term_set`]
    ///
    /// # Errors
    ///
    /// Returns [`crate::PhenomatchError::TermNotFound`] if a term is not
    /// part of the ontology
    pub fn match_term_set_to_gene(
        &self,
        patient_terms: &TermGroup,
        gene: &Gene,
    ) -> PhenomatchResult<Vec<TermPair>> {
        self.match_term_set(patient_terms, gene.terms())
    }

    /// Returns the aggregated match of the carrier phenotypes to a gene
    ///
    /// # Errors
    ///
    /// Returns [`crate::PhenomatchError::TermNotFound`] if a term is not
    /// part of the ontology
    pub fn gene_score(
        &self,
        patient_terms: &TermGroup,
        gene: &Gene,
    ) -> PhenomatchResult<GeneScore> {
        Ok(GeneScore::new(
            self.match_term_set_to_gene(patient_terms, gene)?,
        ))
    }

    /// Combines the scores ([`GeneScore::sum`]) of all genes into one phenogram score
    ///
    /// # Errors
    ///
    /// Returns [`crate::PhenomatchError::TermNotFound`] if a term is not
    /// part of the ontology
    pub fn pheno_gram_score(
        &self,
        patient_terms: &TermGroup,
        genes: &GenomicIndex<Gene>,
        policy: PhenogramPolicy,
    ) -> PhenomatchResult<f32> {
        let scores = genes
            .values()
            .map(|gene| Ok(self.gene_score(patient_terms, gene)?.sum()))
            .collect::<PhenomatchResult<Vec<f32>>>()?;
        policy.aggregate(scores)
    }
}
