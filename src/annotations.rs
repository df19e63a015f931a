//! Gene to phenotype annotations of the [`crate::Ontology`]
//!
//! Every annotated gene is registered once in the ontology, receives a
//! [`GeneId`] and holds the [`TermId`]s it was annotated with. The
//! ontology links each gene to all ancestors of its terms, which is the
//! basis for the information content.

use std::collections::HashSet;
use std::fmt::Display;

use crate::term::{TermGroup, TermId};

/// A set of genes
///
/// The set does not contain [`GeneAnnotation`]s itself, but only their [`GeneId`]s.
pub type Genes = HashSet<GeneId>;

/// Identifier of a [`GeneAnnotation`] within one [`crate::Ontology`]
///
/// IDs are assigned in order of registration.
#[derive(Clone, Copy, Default, Debug, Hash, PartialEq, PartialOrd, Eq, Ord)]
pub struct GeneId {
    inner: u32,
}

impl GeneId {
    /// Returns the integer representation of the ID
    pub fn as_u32(&self) -> u32 {
        self.inner
    }

    pub(crate) fn as_usize(self) -> usize {
        self.inner as usize
    }
}

impl From<u32> for GeneId {
    fn from(inner: u32) -> Self {
        GeneId { inner }
    }
}

impl Display for GeneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GeneId:{}", self.inner)
    }
}

/// The phenotype terms of a single gene
///
/// The `name` is the identifier used by the genomic gene records,
/// usually the Entrez gene ID.
#[derive(Default, Debug, Clone)]
pub struct GeneAnnotation {
    id: GeneId,
    name: String,
    terms: TermGroup,
}

impl GeneAnnotation {
    pub(crate) fn new(id: GeneId, name: &str) -> GeneAnnotation {
        GeneAnnotation {
            id,
            name: name.to_string(),
            terms: TermGroup::default(),
        }
    }

    /// The [`GeneId`] of the annotation
    pub fn id(&self) -> &GeneId {
        &self.id
    }

    /// The name of the gene
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The directly annotated [`TermId`]s
    pub fn terms(&self) -> &TermGroup {
        &self.terms
    }

    pub(crate) fn add_term(&mut self, term_id: TermId) -> bool {
        self.terms.insert(term_id)
    }
}

impl PartialEq for GeneAnnotation {
    fn eq(&self, other: &GeneAnnotation) -> bool {
        self.id == other.id
    }
}

impl Eq for GeneAnnotation {}
