use core::fmt::Debug;
use std::fmt::Display;

use crate::{PhenomatchError, PhenomatchResult};

/// Unique identifier of a [`crate::PhenotypeTerm`]
///
/// The ID is stored as the numerical part of the ontology identifier and
/// displayed with the `HP:` prefix and zero-padding.
///
/// # Examples
///
/// ```
/// use phenomatch::TermId;
///
/// let id = TermId::try_from("HP:0000118").unwrap();
/// assert_eq!(id, TermId::from(118u32));
/// assert_eq!(id.to_string(), "HP:0000118");
///
/// assert!(TermId::try_from("HP:abc").is_err());
/// ```
#[derive(Copy, Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TermId {
    inner: u32,
}

impl TermId {
    /// Returns the numerical part of the ID
    pub fn as_u32(&self) -> u32 {
        self.inner
    }
}

impl TryFrom<&str> for TermId {
    type Error = PhenomatchError;
    /// Parses IDs with or without prefix, `HP:0000118` or `118`
    fn try_from(s: &str) -> PhenomatchResult<Self> {
        let digits = s.rsplit(':').next().unwrap_or(s);
        Ok(TermId {
            inner: digits.parse::<u32>()?,
        })
    }
}

impl From<u32> for TermId {
    fn from(inner: u32) -> Self {
        Self { inner }
    }
}

impl Debug for TermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TermId({self})")
    }
}

impl Display for TermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HP:{:07}", self.inner)
    }
}
