use std::fmt::Display;

/// A single annotation step that fills some fields of a [`crate::Cnv`]
///
/// Some stages read the output of earlier stages. Those dependencies are
/// declared by [`Stage::requires`] and checked at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Boundaries completely within the CNV
    BoundaryOverlap,
    /// Genes with any overlap with the CNV
    OverlappedGenes,
    /// Genes in all domains touched by the CNV
    GenesInOverlapTads,
    /// Regions left and right of the CNV
    AdjacentRegions,
    /// Genes in the adjacent regions
    AdjacentGenes,
    /// Enhancers in the adjacent regions
    AdjacentEnhancers,
    /// Domain material between each breakpoint and the next swallowed boundary
    OverlappedDomainRegions,
    /// Phenogram score of the overlapped genes
    OverlapPhenogramScore,
    /// Phenogram scores of the genes in the adjacent regions
    AdjacentPhenogramScore,
}

impl Stage {
    /// All stages, in an order that satisfies all dependencies
    pub const ALL: [Stage; 9] = [
        Stage::BoundaryOverlap,
        Stage::OverlappedGenes,
        Stage::GenesInOverlapTads,
        Stage::OverlappedDomainRegions,
        Stage::AdjacentRegions,
        Stage::AdjacentGenes,
        Stage::AdjacentEnhancers,
        Stage::AdjacentPhenogramScore,
        Stage::OverlapPhenogramScore,
    ];

    /// The stages that must complete before this stage can run
    pub fn requires(&self) -> &'static [Stage] {
        match self {
            Stage::BoundaryOverlap
            | Stage::OverlappedGenes
            | Stage::GenesInOverlapTads
            | Stage::AdjacentRegions => &[],
            Stage::AdjacentGenes | Stage::AdjacentEnhancers => &[Stage::AdjacentRegions],
            Stage::OverlappedDomainRegions => &[Stage::BoundaryOverlap],
            Stage::OverlapPhenogramScore => &[Stage::OverlappedGenes],
            Stage::AdjacentPhenogramScore => &[Stage::AdjacentGenes],
        }
    }

    /// The stages that read the output of this stage, directly or through
    /// other stages, in the order of [`Stage::ALL`]
    pub fn dependents(&self) -> Vec<Stage> {
        let mut affected = vec![*self];
        for stage in Stage::ALL {
            if !affected.contains(&stage)
                && stage.requires().iter().any(|r| affected.contains(r))
            {
                affected.push(stage);
            }
        }
        affected.remove(0);
        affected
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::BoundaryOverlap => "boundary overlap",
            Stage::OverlappedGenes => "overlapped genes",
            Stage::GenesInOverlapTads => "genes in overlapped TADs",
            Stage::AdjacentRegions => "adjacent regions",
            Stage::AdjacentGenes => "adjacent genes",
            Stage::AdjacentEnhancers => "adjacent enhancers",
            Stage::OverlappedDomainRegions => "overlapped domain regions",
            Stage::OverlapPhenogramScore => "overlap phenogram score",
            Stage::AdjacentPhenogramScore => "adjacent phenogram score",
        };
        write!(f, "{name}")
    }
}

/// The set of [`Stage`]s that completed on a [`crate::Cnv`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Stages {
    bits: u16,
}

impl Stages {
    /// Returns `true` if the stage completed
    pub fn contains(&self, stage: Stage) -> bool {
        self.bits & stage.bit() != 0
    }

    /// Returns `true` if no stage completed
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Iterates the completed stages
    pub fn iter(&self) -> impl Iterator<Item = Stage> + '_ {
        Stage::ALL.into_iter().filter(|stage| self.contains(*stage))
    }

    pub(crate) fn insert(&mut self, stage: Stage) {
        self.bits |= stage.bit();
    }

    pub(crate) fn remove(&mut self, stage: Stage) {
        self.bits &= !stage.bit();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn all_stages_are_ordered_by_dependencies() {
        let mut done = Stages::default();
        for stage in Stage::ALL {
            for required in stage.requires() {
                assert!(done.contains(*required), "{stage} before {required}");
            }
            done.insert(stage);
        }
        assert_eq!(done.iter().count(), Stage::ALL.len());
    }

    #[test]
    fn transitive_dependents() {
        assert_eq!(
            Stage::BoundaryOverlap.dependents(),
            vec![Stage::OverlappedDomainRegions]
        );
        assert_eq!(
            Stage::AdjacentRegions.dependents(),
            vec![
                Stage::AdjacentGenes,
                Stage::AdjacentEnhancers,
                Stage::AdjacentPhenogramScore
            ]
        );
        assert!(Stage::OverlapPhenogramScore.dependents().is_empty());
    }

    #[test]
    fn stages_are_distinct() {
        let mut stages = Stages::default();
        assert!(stages.is_empty());
        stages.insert(Stage::AdjacentGenes);
        assert!(stages.contains(Stage::AdjacentGenes));
        assert!(!stages.contains(Stage::AdjacentRegions));
        assert_eq!(stages.iter().collect::<Vec<Stage>>(), vec![Stage::AdjacentGenes]);
    }
}
