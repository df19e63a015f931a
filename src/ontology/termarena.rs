use std::collections::hash_map::{Values, ValuesMut};
use std::collections::HashMap;

use crate::term::internal::TermInternal;
use crate::TermId;

#[derive(Clone, Default)]
pub(crate) struct Arena {
    terms: HashMap<TermId, TermInternal>,
}

impl Arena {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn insert(&mut self, term: TermInternal) {
        let id = term.id();
        self.terms.insert(*id, term);
    }

    pub fn get(&self, id: TermId) -> Option<&TermInternal> {
        self.terms.get(&id)
    }

    pub fn get_mut(&mut self, id: TermId) -> Option<&mut TermInternal> {
        self.terms.get_mut(&id)
    }

    pub fn values(&self) -> Values<'_, TermId, TermInternal> {
        self.terms.values()
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, TermId, TermInternal> {
        self.terms.values_mut()
    }

    /// All term IDs in ascending order
    pub fn keys(&self) -> Vec<TermId> {
        let mut keys: Vec<TermId> = self.terms.keys().copied().collect();
        keys.sort_unstable();
        keys
    }
}
