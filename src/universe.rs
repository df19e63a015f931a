use std::collections::HashMap;

use tracing::debug;

use crate::genomic::{Gene, GenomicIndex, Interval};
use crate::{Ontology, PhenomatchResult};

/// Provides the genes of an analysis for a given ontology
///
/// The phenotype terms of a gene come from the gene annotations of the
/// ontology. When the annotations are permuted, the genes must be rebuilt
/// from the permuted ontology, which is why the genes are not a fixed
/// input but produced on demand.
///
/// Every closure `Fn(&Ontology) -> PhenomatchResult<GenomicIndex<Gene>>`
/// is a `GeneSource`.
pub trait GeneSource {
    /// Builds the gene index for `ontology`
    ///
    /// # Errors
    ///
    /// Implementations return [`crate::PhenomatchError::GeneSource`] or
    /// any other error if the genes cannot be built
    fn genes(&self, ontology: &Ontology) -> PhenomatchResult<GenomicIndex<Gene>>;
}

impl<F> GeneSource for F
where
    F: Fn(&Ontology) -> PhenomatchResult<GenomicIndex<Gene>>,
{
    fn genes(&self, ontology: &Ontology) -> PhenomatchResult<GenomicIndex<Gene>> {
        self(ontology)
    }
}

/// In-memory [`GeneSource`]: gene locations and symbols without phenotypes
///
/// The name of each location is the gene name used in the gene
/// annotations of the ontology. Genes without annotation get an empty
/// term set.
///
/// # Examples
///
/// ```
/// use phenomatch::{GeneSource, GeneTemplates, Interval, Ontology, TermId};
///
/// let mut ontology = Ontology::default();
/// ontology.insert_term("All".to_string(), 1u32);
/// ontology.insert_term("Eye".to_string(), 2u32);
/// ontology.add_parent(1u32, 2u32).unwrap();
/// ontology.create_cache();
/// ontology.annotate_gene("7157", [TermId::from(2u32)]).unwrap();
///
/// let templates = GeneTemplates::new(vec![
///     Interval::new("chr17", 100, 200, "7157").unwrap(),
///     Interval::new("chr17", 300, 400, "42").unwrap(),
/// ])
/// .with_symbols([("7157".to_string(), "TP53".to_string())].into());
///
/// let genes = templates.genes(&ontology).unwrap();
/// let tp53 = genes.get("7157").unwrap();
/// assert_eq!(tp53.symbol(), "TP53");
/// assert_eq!(tp53.terms().len(), 1);
/// assert!(genes.get("42").unwrap().terms().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct GeneTemplates {
    locations: Vec<Interval>,
    symbols: HashMap<String, String>,
}

impl GeneTemplates {
    /// Constructs templates from the gene locations
    pub fn new(locations: Vec<Interval>) -> Self {
        Self {
            locations,
            symbols: HashMap::new(),
        }
    }

    /// Sets the gene name to symbol mapping
    #[must_use]
    pub fn with_symbols(mut self, symbols: HashMap<String, String>) -> Self {
        self.symbols = symbols;
        self
    }

    /// The number of gene locations
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Returns `true` if there are no gene locations
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl GeneSource for GeneTemplates {
    fn genes(&self, ontology: &Ontology) -> PhenomatchResult<GenomicIndex<Gene>> {
        let genes: GenomicIndex<Gene> = self
            .locations
            .iter()
            .map(|location| {
                let terms = ontology
                    .gene_terms(location.name())
                    .cloned()
                    .unwrap_or_default();
                let gene = Gene::new(location.clone(), terms);
                match self.symbols.get(location.name()) {
                    Some(symbol) => gene.with_symbol(symbol.as_str()),
                    None => gene,
                }
            })
            .collect();
        debug!("Built {} genes from templates", genes.len());
        Ok(genes)
    }
}

impl FromIterator<Interval> for GeneTemplates {
    fn from_iter<I: IntoIterator<Item = Interval>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// The phenotype universe of one analysis: an ontology and the genes
/// annotated from it
///
/// A `Universe` is never modified. Permutations build a new universe for
/// every iteration instead.
#[derive(Debug, Clone)]
pub struct Universe {
    ontology: Ontology,
    genes: GenomicIndex<Gene>,
}

impl Universe {
    /// Constructs a universe from an ontology and already built genes
    pub fn new(ontology: Ontology, genes: GenomicIndex<Gene>) -> Self {
        Self { ontology, genes }
    }

    /// Constructs a universe with the genes provided by `source`
    ///
    /// # Errors
    ///
    /// Returns the error of the [`GeneSource`]
    pub fn from_source<S: GeneSource + ?Sized>(
        ontology: Ontology,
        source: &S,
    ) -> PhenomatchResult<Self> {
        let genes = source.genes(&ontology)?;
        Ok(Self { ontology, genes })
    }

    /// The ontology with (possibly permuted) gene annotations
    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    /// The genes with their phenotype terms
    pub fn genes(&self) -> &GenomicIndex<Gene> {
        &self.genes
    }

    /// Returns the gene with the given name
    pub fn gene(&self, name: &str) -> Option<&Gene> {
        self.genes.get(name)
    }

    /// Returns `true` if any gene carries at least one phenotype term
    pub fn has_phenotypes(&self) -> bool {
        self.genes.values().any(|gene| !gene.terms().is_empty())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{PhenomatchError, TermId};

    fn ontology() -> Ontology {
        let mut ont = Ontology::default();
        ont.insert_term("All".to_string(), 1u32);
        ont.insert_term("Eye".to_string(), 2u32);
        ont.add_parent(1u32, 2u32).unwrap();
        ont.create_cache();
        ont.annotate_gene("a", [TermId::from(2u32)]).unwrap();
        ont.calculate_information_content().unwrap();
        ont
    }

    #[test]
    fn templates_resolve_terms() {
        let templates: GeneTemplates = vec![
            Interval::new("chr1", 0, 10, "a").unwrap(),
            Interval::new("chr1", 20, 30, "b").unwrap(),
        ]
        .into_iter()
        .collect();
        assert_eq!(templates.len(), 2);

        let universe = Universe::from_source(ontology(), &templates).unwrap();
        assert_eq!(universe.genes().len(), 2);
        assert!(universe.gene("a").unwrap().terms().contains(&TermId::from(2u32)));
        assert!(universe.gene("b").unwrap().terms().is_empty());
        assert!(universe.has_phenotypes());
    }

    #[test]
    fn closures_are_sources() {
        let failing =
            |_: &Ontology| -> PhenomatchResult<GenomicIndex<Gene>> {
                Err(PhenomatchError::GeneSource("no genes".to_string()))
            };
        assert!(matches!(
            Universe::from_source(ontology(), &failing),
            Err(PhenomatchError::GeneSource(_))
        ));

        let empty =
            |_: &Ontology| -> PhenomatchResult<GenomicIndex<Gene>> { Ok(GenomicIndex::new()) };
        let universe = Universe::from_source(ontology(), &empty).unwrap();
        assert!(!universe.has_phenotypes());
    }
}
