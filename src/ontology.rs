use core::fmt::Debug;
use std::collections::HashMap;

use tracing::debug;

use crate::annotations::{GeneAnnotation, GeneId};
use crate::term::internal::TermInternal;
use crate::term::{PhenotypeTerm, TermGroup};
use crate::{PhenomatchError, PhenomatchResult, TermId};

mod termarena;
use termarena::Arena;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// The phenotype ontology: a DAG of [`PhenotypeTerm`]s with gene annotations
///
/// The [`Ontology`] holds all terms, their `is_a` relationships and the
/// genes annotated to them. From the gene annotations it derives the
/// information content of every term, which drives all similarity
/// calculations (see [`crate::similarity`]).
///
/// # Construction
///
/// Parsing ontology files is not part of this crate. Loaders build the
/// ontology by hand:
///
/// 1. Add all terms [`Ontology::insert_term`]
/// 2. Connect terms to their parents [`Ontology::add_parent`]
/// 3. Cache all ancestor connections [`Ontology::create_cache`]
/// 4. Register genes and their terms [`Ontology::annotate_gene`]
///     (this will automatically take care of "inheriting" the connection to all
///     ancestor terms)
/// 5. Calculate the information content [`Ontology::calculate_information_content`]
///
/// # Layout
///
/// ```mermaid
/// erDiagram
///     ONTOLOGY ||--|{ TERM : contains
///     ONTOLOGY ||--o{ GENE_ANNOTATION : contains
///     TERM ||--|{ TERM : is_a
///     TERM }|--o{ GENE_ANNOTATION : phenotype_of
///     TERM {
///         TermId id
///         str name
///         TermGroup parents
///         TermGroup all_parents
///         InformationContent ic
///     }
///     GENE_ANNOTATION {
///         GeneId id
///         str name
///         TermGroup terms
///     }
/// ```
///
/// # Examples
///
/// ```
/// use phenomatch::{Ontology, TermId};
///
/// let mut ontology = Ontology::default();
/// ontology.insert_term("All".to_string(), 1u32);
/// ontology.insert_term("Abnormality of the eye".to_string(), 2u32);
/// ontology.insert_term("Abnormality of the ear".to_string(), 3u32);
/// ontology.add_parent(1u32, 2u32).unwrap();
/// ontology.add_parent(1u32, 3u32).unwrap();
/// ontology.create_cache();
///
/// ontology.annotate_gene("1", [TermId::from(2u32)]).unwrap();
/// ontology.annotate_gene("2", [TermId::from(3u32)]).unwrap();
/// ontology.calculate_information_content().unwrap();
///
/// let eye = ontology.term(2u32).unwrap();
/// assert_eq!(eye.name(), "Abnormality of the eye");
/// assert!((eye.information_content().gene() - 0.6931).abs() < 0.001);
///
/// // the root is annotated with all genes
/// assert_eq!(ontology.term(1u32).unwrap().information_content().gene(), 0.0);
/// ```
#[derive(Default, Clone)]
pub struct Ontology {
    terms: Arena,
    genes: Vec<GeneAnnotation>,
    gene_ids: HashMap<String, GeneId>,
}

impl Debug for Ontology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ontology with {} terms and {} genes",
            self.terms.len(),
            self.genes.len()
        )
    }
}

/// Public API of the Ontology
impl Ontology {
    /// Returns the number of terms in the Ontology
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns `true` if the Ontology does not contain any terms
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the [`PhenotypeTerm`] of the provided [`TermId`]
    ///
    /// If no such term is present in the Ontology, `None` is returned
    pub fn term<I: Into<TermId>>(&self, term_id: I) -> Option<PhenotypeTerm<'_>> {
        PhenotypeTerm::try_new(self, term_id.into()).ok()
    }

    /// Returns the [`PhenotypeTerm`] of the provided [`TermId`]
    ///
    /// # Errors
    ///
    /// Returns [`PhenomatchError::TermNotFound`] if the term is not present
    pub fn try_term<I: Into<TermId>>(&self, term_id: I) -> PhenomatchResult<PhenotypeTerm<'_>> {
        PhenotypeTerm::try_new(self, term_id.into())
    }

    /// Returns an Iterator of all [`PhenotypeTerm`]s, ordered by [`TermId`]
    pub fn iter(&self) -> Iter<'_> {
        self.into_iter()
    }

    /// Returns the number of annotated genes
    pub fn gene_count(&self) -> usize {
        self.genes.len()
    }

    /// Returns the annotation of the gene with the given name
    pub fn gene_annotation(&self, name: &str) -> Option<&GeneAnnotation> {
        self.gene_ids
            .get(name)
            .and_then(|id| self.genes.get(id.as_usize()))
    }

    /// Returns the directly annotated terms of the gene with the given name
    ///
    /// Genes without annotation have no terms, this method returns `None`
    /// for them.
    pub fn gene_terms(&self, name: &str) -> Option<&TermGroup> {
        self.gene_annotation(name).map(GeneAnnotation::terms)
    }

    /// Iterates all gene annotations in order of their [`GeneId`]
    pub fn gene_annotations(&self) -> std::slice::Iter<'_, GeneAnnotation> {
        self.genes.iter()
    }
}

/// Methods to build the Ontology
///
/// These methods are used by loaders. They must be called in the order
/// described in [`Ontology`].
impl Ontology {
    /// Adds a new term to the ontology
    ///
    /// An existing term with the same ID is replaced.
    pub fn insert_term<I: Into<TermId>>(&mut self, name: String, id: I) {
        let term = TermInternal::new(name, id.into());
        self.terms.insert(term);
    }

    /// Adds an `is_a` connection from `child_id` to `parent_id`
    ///
    /// # Errors
    ///
    /// Returns [`PhenomatchError::TermNotFound`] if either term does not exist
    pub fn add_parent<I: Into<TermId> + Copy, J: Into<TermId> + Copy>(
        &mut self,
        parent_id: I,
        child_id: J,
    ) -> PhenomatchResult<()> {
        let parent_id: TermId = parent_id.into();
        let child_id: TermId = child_id.into();
        if self.get(child_id).is_none() {
            return Err(PhenomatchError::TermNotFound(child_id));
        }

        self.get_mut(parent_id)
            .ok_or(PhenomatchError::TermNotFound(parent_id))?
            .add_child(child_id);

        self.get_mut(child_id)
            .ok_or(PhenomatchError::TermNotFound(child_id))?
            .add_parent(parent_id);
        Ok(())
    }

    /// Caches the transitive ancestors of every term
    ///
    /// This method must be called after all terms and connections have
    /// been added and before any genes are annotated.
    pub fn create_cache(&mut self) {
        for id in self.terms.keys() {
            self.create_cache_of_grandparents(id);
        }
    }

    /// Registers a gene and links it to the given terms and all their ancestors
    ///
    /// If the gene was registered before, the terms are added to its
    /// existing annotation.
    ///
    /// # Errors
    ///
    /// - Returns [`PhenomatchError::TermNotFound`] if a term does not exist
    /// - Returns [`PhenomatchError::TryFromIntError`] if more than
    ///   `u32::MAX` genes are registered
    pub fn annotate_gene<T: IntoIterator<Item = TermId>>(
        &mut self,
        name: &str,
        terms: T,
    ) -> PhenomatchResult<GeneId> {
        let terms: Vec<TermId> = terms.into_iter().collect();
        if let Some(missing) = terms.iter().find(|id| self.get(**id).is_none()) {
            return Err(PhenomatchError::TermNotFound(*missing));
        }

        let gene_id = self.add_gene(name)?;
        for term_id in terms {
            self.link_gene_term(term_id, gene_id)?;
            self.genes
                .get_mut(gene_id.as_usize())
                .ok_or(PhenomatchError::DoesNotExist)?
                .add_term(term_id);
        }
        Ok(gene_id)
    }

    /// Calculates the [`crate::term::InformationContent`] of every term
    ///
    /// # Errors
    ///
    /// Returns [`PhenomatchError::TryFromIntError`] if the number of genes
    /// exceeds `u32::MAX`
    pub fn calculate_information_content(&mut self) -> PhenomatchResult<()> {
        let n_genes = self.genes.len();
        for term in self.terms.values_mut() {
            let current_genes = term.genes().len();
            term.information_content_mut()
                .set_gene(n_genes, current_genes)?;
        }
        debug!("Calculated information content for {} genes", n_genes);
        Ok(())
    }
}

/// Crate-only functions for setting up and building the Ontology
impl Ontology {
    pub(crate) fn get<I: Into<TermId>>(&self, term_id: I) -> Option<&TermInternal> {
        self.terms.get(term_id.into())
    }

    fn get_mut<I: Into<TermId>>(&mut self, term_id: I) -> Option<&mut TermInternal> {
        self.terms.get_mut(term_id.into())
    }

    /// Returns a copy of the term graph without any gene annotations
    pub(crate) fn without_annotations(&self) -> Ontology {
        let mut terms = Arena::default();
        for term in self.terms.values() {
            terms.insert(term.without_genes());
        }
        Ontology {
            terms,
            genes: Vec::with_capacity(self.genes.len()),
            gene_ids: HashMap::with_capacity(self.genes.len()),
        }
    }

    fn add_gene(&mut self, name: &str) -> PhenomatchResult<GeneId> {
        if let Some(id) = self.gene_ids.get(name) {
            return Ok(*id);
        }
        let id = GeneId::from(u32::try_from(self.genes.len())?);
        self.genes.push(GeneAnnotation::new(id, name));
        self.gene_ids.insert(name.to_string(), id);
        Ok(id)
    }

    fn link_gene_term(&mut self, term_id: TermId, gene_id: GeneId) -> PhenomatchResult<()> {
        let term = self
            .get_mut(term_id)
            .ok_or(PhenomatchError::TermNotFound(term_id))?;

        if term.add_gene(gene_id) {
            // If the gene is already associated to the term, this branch will
            // be skipped. That is desired, because by definition
            // all parent terms are already linked as well
            let parents = term.all_parents().clone();
            for parent in &parents {
                self.link_gene_term(parent, gene_id)?;
            }
        }
        Ok(())
    }

    fn all_grandparents(&mut self, term_id: TermId) -> TermGroup {
        match self.get(term_id) {
            Some(term) if term.parents_cached() => term.all_parents().clone(),
            Some(_) => self.create_cache_of_grandparents(term_id),
            None => TermGroup::default(),
        }
    }

    fn create_cache_of_grandparents(&mut self, term_id: TermId) -> TermGroup {
        let parents = match self.get(term_id) {
            Some(term) => term.parents().clone(),
            None => return TermGroup::default(),
        };
        let mut res = TermGroup::default();
        for parent in &parents {
            for gp in &self.all_grandparents(parent) {
                res.insert(gp);
            }
        }
        let all_parents = &res | &parents;
        if let Some(term) = self.get_mut(term_id) {
            *term.all_parents_mut() = all_parents.clone();
        }
        all_parents
    }
}

/// Iterates the Ontology and yields [`PhenotypeTerm`]s
pub struct Iter<'a> {
    ids: std::vec::IntoIter<TermId>,
    ontology: &'a Ontology,
}

impl<'a> Iterator for Iter<'a> {
    type Item = PhenotypeTerm<'a>;
    fn next(&mut self) -> Option<Self::Item> {
        for id in self.ids.by_ref() {
            if let Some(term) = self.ontology.term(id) {
                return Some(term);
            }
        }
        None
    }
}

impl<'a> IntoIterator for &'a Ontology {
    type Item = PhenotypeTerm<'a>;
    type IntoIter = Iter<'a>;
    fn into_iter(self) -> Self::IntoIter {
        Iter {
            ids: self.terms.keys().into_iter(),
            ontology: self,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn id(n: u32) -> TermId {
        TermId::from(n)
    }

    /// ```text
    ///        1
    ///      /   \
    ///     2     3
    ///    / \   /
    ///   4   5 /
    ///        6 (child of 5 and 3)
    /// ```
    fn ontology() -> Ontology {
        let mut ont = Ontology::default();
        for n in 1..=6u32 {
            ont.insert_term(format!("Term {n}"), n);
        }
        ont.add_parent(1u32, 2u32).unwrap();
        ont.add_parent(1u32, 3u32).unwrap();
        ont.add_parent(2u32, 4u32).unwrap();
        ont.add_parent(2u32, 5u32).unwrap();
        ont.add_parent(5u32, 6u32).unwrap();
        ont.add_parent(3u32, 6u32).unwrap();
        ont.create_cache();
        ont
    }

    #[test]
    fn ancestor_closure() {
        let ont = ontology();
        let six = ont.term(6u32).unwrap();
        assert_eq!(
            six.all_parent_ids().iter().collect::<Vec<TermId>>(),
            vec![id(1), id(2), id(3), id(5)]
        );
        assert!(ont.term(1u32).unwrap().all_parent_ids().is_empty());
        assert!(six.child_of(&ont.term(2u32).unwrap()));
        assert!(ont.term(3u32).unwrap().parent_of(&six));
    }

    #[test]
    fn add_parent_requires_terms() {
        let mut ont = ontology();
        assert!(matches!(
            ont.add_parent(1u32, 99u32),
            Err(PhenomatchError::TermNotFound(_))
        ));
        assert!(matches!(
            ont.add_parent(99u32, 1u32),
            Err(PhenomatchError::TermNotFound(_))
        ));
        assert!(ont.term(1u32).unwrap().parent_ids().is_empty());
    }

    #[test]
    fn genes_are_inherited_by_ancestors() {
        let mut ont = ontology();
        ont.annotate_gene("g1", [id(6)]).unwrap();
        ont.annotate_gene("g2", [id(4)]).unwrap();
        ont.calculate_information_content().unwrap();

        assert_eq!(ont.term(1u32).unwrap().gene_count(), 2);
        assert_eq!(ont.term(2u32).unwrap().gene_count(), 2);
        assert_eq!(ont.term(3u32).unwrap().gene_count(), 1);
        assert_eq!(ont.term(4u32).unwrap().gene_count(), 1);

        let ic3 = ont.term(3u32).unwrap().information_content().gene();
        assert!((ic3 - 2f32.ln()).abs() < 1e-6);
        assert_eq!(ont.term(2u32).unwrap().information_content().gene(), 0.0);
    }

    #[test]
    fn annotate_gene_twice_extends_terms() {
        let mut ont = ontology();
        let first = ont.annotate_gene("g1", [id(4)]).unwrap();
        let second = ont.annotate_gene("g1", [id(6)]).unwrap();
        assert_eq!(first, second);
        assert_eq!(ont.gene_count(), 1);
        assert_eq!(ont.gene_terms("g1").unwrap().len(), 2);
        assert!(ont.gene_terms("unknown").is_none());
    }

    #[test]
    fn unknown_term_annotation_fails() {
        let mut ont = ontology();
        assert!(matches!(
            ont.annotate_gene("g1", [id(42)]),
            Err(PhenomatchError::TermNotFound(t)) if t == id(42)
        ));
    }

    #[test]
    fn without_annotations_keeps_graph() {
        let mut ont = ontology();
        ont.annotate_gene("g1", [id(6)]).unwrap();
        ont.calculate_information_content().unwrap();

        let empty = ont.without_annotations();
        assert_eq!(empty.len(), 6);
        assert_eq!(empty.gene_count(), 0);
        assert_eq!(empty.term(6u32).unwrap().all_parent_ids().len(), 4);
        assert_eq!(empty.term(1u32).unwrap().gene_count(), 0);
    }

    #[test]
    fn iterates_in_id_order() {
        let ont = ontology();
        let ids: Vec<TermId> = ont.iter().map(|t| *t.id()).collect();
        assert_eq!(ids, (1..=6u32).map(id).collect::<Vec<TermId>>());
    }
}
