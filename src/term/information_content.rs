use crate::{f64_from_usize, PhenomatchResult};

/// The information content of a [`crate::PhenotypeTerm`]
///
/// The information content is derived from how many genes are annotated
/// with a term (directly or through one of its descendants):
/// `IC = -ln(genes of term / all genes)`. Rare terms have a high
/// information content, the root term has `0`.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct InformationContent {
    gene: f32,
}

impl InformationContent {
    /// The gene-based information content
    pub fn gene(&self) -> f32 {
        self.gene
    }

    /// Calculates and sets the gene-based information content
    ///
    /// Terms without genes, or an ontology without genes, have an
    /// information content of `0`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PhenomatchError::TryFromIntError`] if a count
    /// exceeds `u32::MAX`
    pub fn set_gene(&mut self, total: usize, current: usize) -> PhenomatchResult<()> {
        self.gene = Self::calculate(total, current)?;
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn calculate(total: usize, current: usize) -> PhenomatchResult<f32> {
        if total == 0 || current == 0 {
            return Ok(0.0);
        }
        let fraction = f64_from_usize(current)? / f64_from_usize(total)?;
        Ok((-fraction.ln()) as f32)
    }
}
