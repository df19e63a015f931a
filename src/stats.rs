//! Empirical null distributions from permutation runs
//!
//! Permuting the gene phenotypes and annotating the CNVs again results in
//! scores that arise by chance. A [`NullDistribution`] collects those
//! scores for one CNV and summarizes them. There is no parametric test,
//! the p-value is the empirical upper tail.
use statrs::statistics::{Data, OrderStatistics, Statistics};

use crate::{f64_from_usize, PhenomatchResult};

/// Scores of one CNV across all permutation iterations
///
/// # Examples
///
/// ```
/// use phenomatch::stats::NullDistribution;
///
/// let null: NullDistribution = [0.0f32, 0.5, 1.0, 1.5].into_iter().collect();
/// assert_eq!(null.len(), 4);
/// assert!((null.mean().unwrap() - 0.75).abs() < 1e-9);
///
/// // one permutation scored at least as high as the observed 1.2
/// assert!((null.empirical_p_value(1.2).unwrap() - 0.4).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NullDistribution {
    scores: Vec<f64>,
}

impl NullDistribution {
    /// Constructs a distribution from the scores of all iterations
    pub fn new(scores: Vec<f64>) -> Self {
        Self { scores }
    }

    /// Adds the score of one more iteration
    pub fn push(&mut self, score: f64) {
        self.scores.push(score);
    }

    /// The number of iterations
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Returns `true` if there are no scores
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// All scores in order of the iterations
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// The mean score, `None` if there are no scores
    pub fn mean(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.scores.iter().mean())
    }

    /// The sample standard deviation, `None` for fewer than 2 scores
    pub fn std_dev(&self) -> Option<f64> {
        if self.len() < 2 {
            return None;
        }
        Some(self.scores.iter().std_dev())
    }

    /// The `tau` quantile of the scores, `None` if there are no scores
    pub fn quantile(&self, tau: f64) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(Data::new(self.scores.clone()).quantile(tau))
    }

    /// The empirical upper-tail p-value of `observed`
    ///
    /// `(1 + #{score >= observed}) / (1 + n)`, which is never `0`. An
    /// empty distribution results in `1`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PhenomatchError::TryFromIntError`] if there are
    /// more than `u32::MAX` scores
    pub fn empirical_p_value(&self, observed: f64) -> PhenomatchResult<f64> {
        let at_least = self.scores.iter().filter(|score| **score >= observed).count();
        Ok(f64_from_usize(at_least + 1)? / f64_from_usize(self.len() + 1)?)
    }
}

impl FromIterator<f32> for NullDistribution {
    fn from_iter<I: IntoIterator<Item = f32>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(f64::from).collect())
    }
}

impl FromIterator<f64> for NullDistribution {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_distribution() {
        let null = NullDistribution::default();
        assert!(null.mean().is_none());
        assert!(null.std_dev().is_none());
        assert!(null.quantile(0.5).is_none());
        assert_eq!(null.empirical_p_value(0.0).unwrap(), 1.0);
    }

    #[test]
    fn summaries() {
        let mut null = NullDistribution::new(vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0]);
        null.push(9.0);
        assert!((null.mean().unwrap() - 5.0).abs() < 1e-9);
        // sample standard deviation
        assert!((null.std_dev().unwrap() - 2.138_089_935).abs() < 1e-6);
        assert!(null.quantile(0.0).unwrap() <= null.quantile(1.0).unwrap());
    }

    #[test]
    fn p_value_is_inclusive() {
        let null = NullDistribution::new(vec![0.0, 1.0, 1.0, 3.0]);
        assert!((null.empirical_p_value(1.0).unwrap() - 0.8).abs() < 1e-9);
        assert!((null.empirical_p_value(5.0).unwrap() - 0.2).abs() < 1e-9);
        assert!((null.empirical_p_value(0.0).unwrap() - 1.0).abs() < 1e-9);
    }
}
