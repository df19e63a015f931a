use crate::annotations::Genes;
use crate::similarity::Similarity;
use crate::term::internal::TermInternal;
use crate::term::{InformationContent, TermGroup, TermId, TermIds};
use crate::{Ontology, PhenomatchError, PhenomatchResult};

/// A single term of the phenotype [`Ontology`]
///
/// The term is a lightweight view into the ontology. It holds all
/// relationship data and provides the functionality for ancestor
/// traversal and similarity calculations.
#[derive(Debug, Clone, Copy)]
pub struct PhenotypeTerm<'a> {
    id: &'a TermId,
    name: &'a str,
    parents: &'a TermGroup,
    all_parents: &'a TermGroup,
    children: &'a TermGroup,
    genes: &'a Genes,
    information_content: &'a InformationContent,
    ontology: &'a Ontology,
}

impl<'a> PhenotypeTerm<'a> {
    /// Constructs a new [`PhenotypeTerm`]
    ///
    /// # Errors
    ///
    /// Returns [`PhenomatchError::TermNotFound`] if the ontology does not
    /// contain the term
    pub fn try_new(ontology: &'a Ontology, term: TermId) -> PhenomatchResult<PhenotypeTerm<'a>> {
        let internal = ontology
            .get(term)
            .ok_or(PhenomatchError::TermNotFound(term))?;
        Ok(PhenotypeTerm::new(ontology, internal))
    }

    pub(crate) fn new(ontology: &'a Ontology, term: &'a TermInternal) -> PhenotypeTerm<'a> {
        PhenotypeTerm {
            id: term.id(),
            name: term.name(),
            parents: term.parents(),
            all_parents: term.all_parents(),
            children: term.children(),
            genes: term.genes(),
            information_content: term.information_content(),
            ontology,
        }
    }

    /// Returns the [`TermId`] of the term
    ///
    /// e.g.: `HP:0012345`
    pub fn id(&self) -> &TermId {
        self.id
    }

    /// Returns the name of the term
    ///
    /// e.g.: `Abnormality of the nervous system`
    pub fn name(&self) -> &str {
        self.name
    }

    /// Returns an iterator of the direct parents of the term
    pub fn parents(&self) -> Terms<'a> {
        Terms::new(self.parents.iter(), self.ontology)
    }

    /// Returns the [`TermId`]s of the direct parents
    pub fn parent_ids(&self) -> &TermGroup {
        self.parents
    }

    /// Returns the [`TermId`]s of all direct and indirect parents
    pub fn all_parent_ids(&self) -> &TermGroup {
        self.all_parents
    }

    /// Returns the [`TermId`]s of the direct children
    pub fn children_ids(&self) -> &TermGroup {
        self.children
    }

    /// Returns the number of genes annotated to the term or its descendants
    pub fn gene_count(&self) -> usize {
        self.genes.len()
    }

    /// Returns the [`InformationContent`] of the term
    pub fn information_content(&self) -> &InformationContent {
        self.information_content
    }

    /// Returns the [`TermId`]s that are ancestors of both `self` **and** `other`
    ///
    /// Each term counts as its own ancestor, so if one term is an ancestor
    /// of the other (or both are identical), it is part of the result.
    pub fn common_ancestor_ids(&self, other: &PhenotypeTerm) -> TermGroup {
        let mut own = self.all_parents.clone();
        own.insert(*self.id);
        let mut others = other.all_parents.clone();
        others.insert(*other.id);
        &own & &others
    }

    /// Returns the common ancestor with the highest information content
    ///
    /// If several ancestors share the highest information content, the
    /// most specific one (with the most ancestors itself) is returned and
    /// remaining ties go to the lowest [`TermId`]. Terms of disconnected
    /// subgraphs have no common ancestor.
    ///
    /// # Examples
    ///
    /// ```
    /// use phenomatch::{Ontology, TermId};
    ///
    /// let mut ontology = Ontology::default();
    /// ontology.insert_term("All".into(), 1u32);
    /// ontology.insert_term("Head".into(), 2u32);
    /// ontology.insert_term("Eye".into(), 3u32);
    /// ontology.add_parent(1u32, 2u32).unwrap();
    /// ontology.add_parent(2u32, 3u32).unwrap();
    /// ontology.create_cache();
    ///
    /// let eye = ontology.term(3u32).unwrap();
    /// let head = ontology.term(2u32).unwrap();
    /// assert_eq!(eye.lowest_common_ancestor(&head).unwrap().name(), "Head");
    /// ```
    pub fn lowest_common_ancestor(&self, other: &PhenotypeTerm) -> Option<PhenotypeTerm<'a>> {
        self.common_ancestor_ids(other)
            .iter()
            .filter_map(|id| self.ontology.term(id))
            .max_by(|a, b| {
                a.information_content()
                    .gene()
                    .total_cmp(&b.information_content().gene())
                    .then_with(|| a.all_parents.len().cmp(&b.all_parents.len()))
                    .then_with(|| b.id().cmp(a.id()))
            })
    }

    /// Calculates the similarity of `self` and `other` using the provided `Similarity` algorithm
    pub fn similarity_score(&self, other: &PhenotypeTerm, similarity: &impl Similarity) -> f32 {
        similarity.calculate(self, other)
    }

    /// Returns `true` if `self` is a child (direct or indirect) of `other`
    pub fn child_of(&self, other: &PhenotypeTerm) -> bool {
        self.all_parents.contains(other.id())
    }

    /// Returns `true` if `self` is a parent (direct or indirect) of `other`
    pub fn parent_of(&self, other: &PhenotypeTerm) -> bool {
        other.child_of(self)
    }
}

impl PartialEq for PhenotypeTerm<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PhenotypeTerm<'_> {}

/// Iterates [`PhenotypeTerm`]s of a [`TermGroup`]
pub struct Terms<'a> {
    ids: TermIds<'a>,
    ontology: &'a Ontology,
}

impl<'a> Terms<'a> {
    fn new(ids: TermIds<'a>, ontology: &'a Ontology) -> Self {
        Self { ids, ontology }
    }
}

impl<'a> Iterator for Terms<'a> {
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
