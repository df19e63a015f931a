//! A complete analysis: control filtering, annotation, reports and
//! permutations
//!
//! [`Analysis`] wires the inputs of the external loaders into the
//! [`AnnotationPipeline`] according to an [`AnalysisConfig`]. The result
//! holds the annotated CNVs and all report lines with their file names.
//! Writing the files is left to the caller.
use tracing::info;

use crate::annotate::{self, AnnotationPipeline};
use crate::genomic::{Cnv, GenomicIndex, Interval};
use crate::output::{self, GeneReport, OutputFiles};
use crate::permutation::{max_overlapped_gene_score, PermutationEngine, PermutationRuns};
use crate::stats::NullDistribution;
use crate::{AnalysisConfig, GeneSource, Ontology, PhenomatchResult, Universe};

/// Inputs and settings of one analysis
///
/// # Examples
///
/// ```
/// use phenomatch::analysis::Analysis;
/// use phenomatch::output::GeneReport;
/// use phenomatch::{AnalysisConfig, Cnv, CnvType, GeneTemplates, GenomicIndex, Interval, Ontology, TermGroup, TermId};
///
/// let mut ontology = Ontology::default();
/// for (id, name) in [(1u32, "All"), (2, "Eye"), (3, "Ear")] {
///     ontology.insert_term(name.to_string(), id);
/// }
/// ontology.add_parent(1u32, 2u32).unwrap();
/// ontology.add_parent(1u32, 3u32).unwrap();
/// ontology.create_cache();
/// ontology.annotate_gene("a", [TermId::from(2u32)]).unwrap();
/// ontology.annotate_gene("b", [TermId::from(3u32)]).unwrap();
/// ontology.calculate_information_content().unwrap();
///
/// let genes = GeneTemplates::new(vec![
///     Interval::new("chr1", 10, 20, "a").unwrap(),
///     Interval::new("chr1", 50, 60, "b").unwrap(),
/// ]);
/// let cnvs: GenomicIndex<Cnv> = vec![Cnv::new(
///     Interval::new("chr1", 0, 30, "cnv1").unwrap(),
///     CnvType::Loss,
///     TermGroup::from(vec![TermId::from(2u32)]),
/// )]
/// .into_iter()
/// .collect();
///
/// let config = AnalysisConfig::new("sample").with_permutations(5);
/// let result = Analysis::new(config, &ontology, &genes).run(cnvs).unwrap();
///
/// let (path, lines) = result.report(GeneReport::OverlappedGenes).unwrap();
/// assert_eq!(path, "sample.overlapped_genes.txt");
/// assert_eq!(lines.len(), 2);
/// assert!(lines[1].starts_with("chr1\t0\t30\tcnv1\tHP:0000002\ta\t0.6931"));
///
/// assert_eq!(result.permutations().unwrap().len(), 5);
/// ```
#[derive(Debug)]
pub struct Analysis<'a, S: ?Sized> {
    config: AnalysisConfig,
    ontology: &'a Ontology,
    source: &'a S,
    domains: Option<&'a GenomicIndex<Interval>>,
    enhancers: Option<&'a GenomicIndex<Interval>>,
    controls: Option<&'a GenomicIndex<Cnv>>,
}

impl<'a, S: GeneSource + ?Sized> Analysis<'a, S> {
    /// Constructs an analysis of the genes from `source`
    pub fn new(config: AnalysisConfig, ontology: &'a Ontology, source: &'a S) -> Self {
        Self {
            config,
            ontology,
            source,
            domains: None,
            enhancers: None,
            controls: None,
        }
    }

    /// Uses topologically associating domains and their boundaries
    #[must_use]
    pub fn with_domains(mut self, domains: &'a GenomicIndex<Interval>) -> Self {
        self.domains = Some(domains);
        self
    }

    /// Annotates enhancers in the adjacent regions
    #[must_use]
    pub fn with_enhancers(mut self, enhancers: &'a GenomicIndex<Interval>) -> Self {
        self.enhancers = Some(enhancers);
        self
    }

    /// Removes CNVs that reciprocally overlap any of the `controls`
    #[must_use]
    pub fn with_controls(mut self, controls: &'a GenomicIndex<Cnv>) -> Self {
        self.controls = Some(controls);
        self
    }

    /// The settings
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// The annotation pipeline for the inputs and settings
    pub fn pipeline(&self) -> AnnotationPipeline<'a> {
        let mut pipeline = AnnotationPipeline::new().with_policy(self.config.policy());
        if let Some(domains) = self.domains {
            pipeline = pipeline.with_domains(domains);
        }
        if let Some(enhancers) = self.enhancers {
            pipeline = pipeline.with_enhancers(enhancers);
        }
        if let Some(size) = self.config.adjacent_region_size() {
            pipeline = pipeline.with_adjacent_region_size(size);
        }
        pipeline
    }

    /// Runs the analysis on `cnvs`
    ///
    /// # Errors
    ///
    /// - Returns the error of the [`GeneSource`]
    /// - Returns [`crate::PhenomatchError::TermNotFound`] if a carrier
    ///   phenotype is not part of the ontology
    /// - Returns [`crate::PhenomatchError::Permutation`] if a permutation
    ///   iteration fails
    pub fn run(&self, mut cnvs: GenomicIndex<Cnv>) -> PhenomatchResult<AnalysisResult> {
        if let Some(controls) = self.controls {
            let removed = annotate::filter_by_reciprocal_overlap(
                &mut cnvs,
                controls,
                self.config.control_overlap(),
            );
            info!("Removed {removed} CNVs that are common in controls");
        }

        let pipeline = self.pipeline();
        let universe = Universe::from_source(self.ontology.clone(), self.source)?;
        pipeline.run(&mut cnvs, &universe)?;
        info!("Annotated {} CNVs", cnvs.len());

        let mut reports = Vec::with_capacity(GeneReport::ALL.len());
        let files = OutputFiles::new(self.config.output_prefix());
        for report in GeneReport::ALL {
            let lines = output::report_lines(&cnvs, universe.ontology(), report)?;
            reports.push((report, files.path(report), lines));
        }

        let permutations = match self.config.permutations() {
            0 => None,
            n => {
                let engine = PermutationEngine::new(self.ontology, self.source, &cnvs, &pipeline)
                    .with_seed(self.config.seed());
                Some(engine.run(n)?)
            }
        };

        Ok(AnalysisResult {
            config: self.config.clone(),
            universe,
            cnvs,
            reports,
            permutations,
        })
    }
}

/// The annotated CNVs and report lines of an [`Analysis`]
#[derive(Debug)]
pub struct AnalysisResult {
    config: AnalysisConfig,
    universe: Universe,
    cnvs: GenomicIndex<Cnv>,
    reports: Vec<(GeneReport, String, Vec<String>)>,
    permutations: Option<PermutationRuns>,
}

impl AnalysisResult {
    /// The annotated CNVs
    pub fn cnvs(&self) -> &GenomicIndex<Cnv> {
        &self.cnvs
    }

    /// The universe the CNVs were annotated against
    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// The file name and lines (with header) of a report
    pub fn report(&self, report: GeneReport) -> Option<(&str, &[String])> {
        self.reports
            .iter()
            .find(|(kind, _, _)| *kind == report)
            .map(|(_, path, lines)| (path.as_str(), lines.as_slice()))
    }

    /// The permutation results, `None` if no permutations were configured
    pub fn permutations(&self) -> Option<&PermutationRuns> {
        self.permutations.as_ref()
    }

    /// The file name and lines (without header) of a permutation report
    pub fn permutation_report(&self, report: GeneReport) -> Option<(String, Vec<&str>)> {
        let runs = self.permutations.as_ref()?;
        let files = OutputFiles::permutation(self.config.output_prefix(), runs.len());
        Some((files.path(report), runs.lines(report)))
    }

    /// The null distribution of the maximum overlapped gene score of a CNV
    pub fn null_distribution(&self, cnv: &str) -> Option<NullDistribution> {
        self.permutations
            .as_ref()
            .map(|runs| runs.null_distribution(cnv))
    }

    /// The empirical p-value of the maximum overlapped gene score of a CNV
    ///
    /// `None` if no permutations ran or the CNV is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PhenomatchError::TermNotFound`] if a carrier
    /// phenotype is not part of the ontology
    pub fn empirical_p_value(&self, cnv: &str) -> PhenomatchResult<Option<f64>> {
        let (Some(null), Some(observed)) =
            (self.null_distribution(cnv), self.max_gene_score(cnv)?)
        else {
            return Ok(None);
        };
        null.empirical_p_value(f64::from(observed)).map(Some)
    }

    /// The highest score of any gene overlapped by the CNV
    ///
    /// # Errors
    ///
    /// Returns [`crate::PhenomatchError::TermNotFound`] if a carrier
    /// phenotype is not part of the ontology
    pub fn max_gene_score(&self, cnv: &str) -> PhenomatchResult<Option<f32>> {
        self.cnvs
            .get(cnv)
            .map(|cnv| max_overlapped_gene_score(self.universe.ontology(), cnv))
            .transpose()
    }
}
