use crate::similarity::PhenogramPolicy;

/// Default reciprocal overlap for removing CNVs that are common in controls
pub const DEFAULT_CONTROL_OVERLAP: f64 = 0.5;

/// Settings of an [`crate::analysis::Analysis`]
///
/// All settings have defaults, so only the relevant ones must be changed.
///
/// # Examples
///
/// ```
/// use phenomatch::{AnalysisConfig, PhenogramPolicy};
///
/// let config = AnalysisConfig::new("out/sample")
///     .with_permutations(100)
///     .with_seed(42)
///     .with_policy(PhenogramPolicy::Sum);
///
/// assert_eq!(config.output_prefix(), "out/sample");
/// assert_eq!(config.permutations(), 100);
/// assert_eq!(config.adjacent_region_size(), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    output_prefix: String,
    adjacent_region_size: Option<u32>,
    permutations: usize,
    seed: u64,
    policy: PhenogramPolicy,
    control_overlap: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            output_prefix: "phenomatch".to_string(),
            adjacent_region_size: None,
            permutations: 0,
            seed: 0,
            policy: PhenogramPolicy::default(),
            control_overlap: DEFAULT_CONTROL_OVERLAP,
        }
    }
}

impl AnalysisConfig {
    /// Constructs the default settings with the given output prefix
    pub fn new<S: Into<String>>(output_prefix: S) -> Self {
        Self {
            output_prefix: output_prefix.into(),
            ..Default::default()
        }
    }

    /// Defines adjacent regions by this distance when no domains are given
    #[must_use]
    pub fn with_adjacent_region_size(mut self, size: u32) -> Self {
        self.adjacent_region_size = Some(size);
        self
    }

    /// Sets the number of gene phenotype permutations, `0` disables them
    #[must_use]
    pub fn with_permutations(mut self, permutations: usize) -> Self {
        self.permutations = permutations;
        self
    }

    /// Sets the base seed of the permutations
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the rule to combine gene scores into phenogram scores
    #[must_use]
    pub fn with_policy(mut self, policy: PhenogramPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the minimum reciprocal overlap with a control to remove a CNV
    #[must_use]
    pub fn with_control_overlap(mut self, fraction: f64) -> Self {
        self.control_overlap = fraction;
        self
    }

    /// Prefix of all report files
    pub fn output_prefix(&self) -> &str {
        &self.output_prefix
    }

    /// Size of adjacent regions if they are defined by distance
    pub fn adjacent_region_size(&self) -> Option<u32> {
        self.adjacent_region_size
    }

    /// Number of gene phenotype permutations
    pub fn permutations(&self) -> usize {
        self.permutations
    }

    /// Base seed of the permutations
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Rule to combine gene scores into phenogram scores
    pub fn policy(&self) -> PhenogramPolicy {
        self.policy
    }

    /// Minimum reciprocal overlap with a control to remove a CNV
    pub fn control_overlap(&self) -> f64 {
        self.control_overlap
    }
}
