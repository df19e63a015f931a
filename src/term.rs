//! [`PhenotypeTerm`]s are the nodes of the phenotype [`crate::Ontology`]
//!
//! Terms are identified by their [`TermId`], e.g. `HP:0000118`, and are
//! connected to each other by directed `is_a` relationships.
//! Sets of terms are handled as [`TermGroup`]s.

mod group;
mod information_content;
pub(crate) mod internal;
mod phenotype_term;
mod termid;

pub use group::{TermGroup, TermIds};
pub use information_content::InformationContent;
pub use phenotype_term::{PhenotypeTerm, Terms};
pub use termid::TermId;
