use crate::annotations::{GeneId, Genes};
use crate::term::{InformationContent, TermGroup, TermId};
use crate::{DEFAULT_NUM_ALL_PARENTS, DEFAULT_NUM_GENES, DEFAULT_NUM_PARENTS};

#[derive(Debug, Clone)]
pub(crate) struct TermInternal {
    id: TermId,
    name: String,
    parents: TermGroup,
    all_parents: TermGroup,
    children: TermGroup,
    genes: Genes,
    ic: InformationContent,
}

impl TermInternal {
    pub fn new(name: String, id: TermId) -> TermInternal {
        TermInternal {
            id,
            name,
            parents: TermGroup::with_capacity(DEFAULT_NUM_PARENTS),
            all_parents: TermGroup::with_capacity(DEFAULT_NUM_ALL_PARENTS),
            children: TermGroup::with_capacity(DEFAULT_NUM_PARENTS),
            genes: Genes::with_capacity(DEFAULT_NUM_GENES),
            ic: InformationContent::default(),
        }
    }

    /// Copy of the term and its relations, without genes
    pub fn without_genes(&self) -> TermInternal {
        TermInternal {
            id: self.id,
            name: self.name.clone(),
            parents: self.parents.clone(),
            all_parents: self.all_parents.clone(),
            children: self.children.clone(),
            genes: Genes::with_capacity(DEFAULT_NUM_GENES),
            ic: InformationContent::default(),
        }
    }

    pub fn id(&self) -> &TermId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parents(&self) -> &TermGroup {
        &self.parents
    }

    pub fn children(&self) -> &TermGroup {
        &self.children
    }

    pub fn all_parents(&self) -> &TermGroup {
        &self.all_parents
    }

    pub fn all_parents_mut(&mut self) -> &mut TermGroup {
        &mut self.all_parents
    }

    pub fn genes(&self) -> &Genes {
        &self.genes
    }

    pub fn parents_cached(&self) -> bool {
        if self.parents.is_empty() {
            true
        } else {
            !self.all_parents.is_empty()
        }
    }

    pub fn add_parent(&mut self, parent_id: TermId) {
        self.parents.insert(parent_id);
    }

    pub fn add_child(&mut self, child_id: TermId) {
        self.children.insert(child_id);
    }

    pub fn add_gene(&mut self, gene_id: GeneId) -> bool {
        self.genes.insert(gene_id)
    }

    pub fn information_content(&self) -> &InformationContent {
        &self.ic
    }

    pub fn information_content_mut(&mut self) -> &mut InformationContent {
        &mut self.ic
    }
}

impl PartialEq for TermInternal {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TermInternal {}
