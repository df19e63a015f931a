use std::ops::{BitAnd, BitOr};

use smallvec::SmallVec;

use crate::TermId;

type Ids = SmallVec<[TermId; 8]>;

/// A set of [`TermId`]s, e.g. the phenotypes of a carrier or a gene
///
/// Each term can occur only once in the group. The IDs are kept sorted,
/// so iteration order is deterministic.
///
/// # Examples
///
/// ```
/// use phenomatch::{TermGroup, TermId};
///
/// let a: TermGroup = vec![TermId::from(1u32), TermId::from(3u32)].into();
/// let b: TermGroup = vec![TermId::from(3u32), TermId::from(2u32)].into();
///
/// assert_eq!((&a | &b).len(), 3);
/// assert_eq!((&a & &b).iter().collect::<Vec<TermId>>(), vec![TermId::from(3u32)]);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct TermGroup {
    ids: Ids,
}

impl TermGroup {
    /// Constructs a new, empty [`TermGroup`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a new, empty [`TermGroup`] with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Ids::with_capacity(capacity),
        }
    }

    /// Returns `true` if the group contains no [`TermId`]s
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of [`TermId`]s in the group
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Adds a new [`TermId`] to the group
    ///
    /// Returns whether the `TermId` was newly inserted.
    pub fn insert(&mut self, id: TermId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(idx) => {
                self.ids.insert(idx, id);
                true
            }
        }
    }

    /// Returns `true` if the group contains the [`TermId`]
    pub fn contains(&self, id: &TermId) -> bool {
        self.ids.binary_search(id).is_ok()
    }

    /// Returns an Iterator of the [`TermId`]s inside the group
    pub fn iter(&self) -> TermIds {
        TermIds::new(self.ids.iter())
    }

    /// Joins the displayed IDs with `sep`, e.g. `HP:0000001;HP:0000118`
    pub fn join(&self, sep: &str) -> String {
        self.iter()
            .map(|id| id.to_string())
            .collect::<Vec<String>>()
            .join(sep)
    }
}

impl FromIterator<TermId> for TermGroup {
    fn from_iter<T: IntoIterator<Item = TermId>>(iter: T) -> Self {
        let mut group = TermGroup::new();
        for id in iter {
            group.insert(id);
        }
        group
    }
}

impl From<Vec<TermId>> for TermGroup {
    fn from(ids: Vec<TermId>) -> Self {
        ids.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a TermGroup {
    type Item = TermId;
    type IntoIter = TermIds<'a>;

    fn into_iter(self) -> TermIds<'a> {
        TermIds::new(self.ids.iter())
    }
}

/// An iterator over [`TermId`]s
pub struct TermIds<'a> {
    inner: std::slice::Iter<'a, TermId>,
}

impl<'a> TermIds<'a> {
    fn new(inner: std::slice::Iter<'a, TermId>) -> Self {
        Self { inner }
    }
}

impl Iterator for TermIds<'_> {
    type Item = TermId;
    fn next(&mut self) -> Option<TermId> {
        self.inner.next().copied()
    }
}

impl BitOr for &TermGroup {
    type Output = TermGroup;

    fn bitor(self, rhs: &TermGroup) -> TermGroup {
        let mut ids = Ids::with_capacity(self.len() + rhs.len());
        let mut left = self.ids.iter().peekable();
        let mut right = rhs.ids.iter().peekable();
        loop {
            let next = match (left.peek(), right.peek()) {
                (Some(l), Some(r)) if l < r => left.next(),
                (Some(l), Some(r)) if r < l => right.next(),
                (Some(_), Some(_)) => {
                    right.next();
                    left.next()
                }
                (Some(_), None) => left.next(),
                (None, Some(_)) => right.next(),
                (None, None) => break,
            };
            if let Some(id) = next {
                ids.push(*id);
            }
        }
        TermGroup { ids }
    }
}

impl BitAnd for &TermGroup {
    type Output = TermGroup;

    fn bitand(self, rhs: &TermGroup) -> TermGroup {
        let (large, small) = if self.len() > rhs.len() {
            (self, rhs)
        } else {
            (rhs, self)
        };
        TermGroup {
            ids: small
                .ids
                .iter()
                .filter(|id| large.contains(id))
                .copied()
                .collect(),
        }
    }
}
