use super::aggregator::aggregate;
use super::calculator::compute_adherence;
use super::domain::{EnrollmentRecord, StatusVocabulary};
use super::report::{assemble, AdherenceReport, AssemblyError};
use super::translator::StatusTranslator;
use crate::workflows::enrollments::{RecordSource, SourceError};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

/// Turns an enrollment snapshot into an [`AdherenceReport`].
#[derive(Debug, Clone, Default)]
pub struct AdherencePipeline {
    translator: StatusTranslator,
}

impl AdherencePipeline {
    pub fn new(vocabulary: StatusVocabulary) -> Self {
        Self {
            translator: StatusTranslator::new(vocabulary),
        }
    }

    pub fn translator(&self) -> &StatusTranslator {
        &self.translator
    }

    /// Reads the source once and builds the report. Source failures are
    /// returned as-is and nothing is aggregated.
    pub fn run<S>(&self, source: &S) -> Result<AdherenceReport, PipelineError>
    where
        S: RecordSource + ?Sized,
    {
        let records = source.read()?;
        info!(records = records.len(), "loaded enrollment records");
        Ok(self.build(&records)?)
    }

    pub fn build(&self, records: &[EnrollmentRecord]) -> Result<AdherenceReport, AssemblyError> {
        let matrix = aggregate(&self.translator, records);

        let completed_label = self.translator.completed_label();
        if !matrix.is_empty() && !matrix.labels().iter().any(|label| label == completed_label) {
            warn!(
                label = completed_label,
                "no completed enrollments in batch; every course reports 0% adherence"
            );
        }

        let adherence = compute_adherence(&self.translator, &matrix);
        let report = assemble(&matrix, &adherence)?;
        info!(
            courses = report.len(),
            labels = report.labels().len(),
            "assembled adherence report"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct MissingSource;

    impl RecordSource for MissingSource {
        fn read(&self) -> Result<Vec<EnrollmentRecord>, SourceError> {
            Err(SourceError::Unavailable {
                path: PathBuf::from("missing.csv"),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            })
        }
    }

    #[test]
    fn run_propagates_source_failures() {
        let error = AdherencePipeline::default()
            .run(&MissingSource)
            .expect_err("source failure surfaces");
        assert!(matches!(
            error,
            PipelineError::Source(SourceError::Unavailable { .. })
        ));
    }

    #[test]
    fn run_reads_in_memory_snapshots() {
        let records = vec![
            EnrollmentRecord::new("A", "COMPLETED"),
            EnrollmentRecord::new("B", "NOT_STARTED"),
        ];
        let report = AdherencePipeline::default()
            .run(&records)
            .expect("report builds");
        assert_eq!(report.len(), 2);
        assert_eq!(report.rows()[0].course_name, "A");
        assert_eq!(report.rows()[0].adherence_pct, 100.0);
    }

    #[test]
    fn custom_vocabulary_drives_labels_and_completion() {
        let pipeline = AdherencePipeline::new(StatusVocabulary::from_pairs([
            ("COMPLETED", "Done"),
            ("IN_PROGRESS", "Started"),
        ]));
        let records = vec![
            EnrollmentRecord::new("A", "IN_PROGRESS"),
            EnrollmentRecord::new("A", "COMPLETED"),
        ];

        let report = pipeline.build(&records).expect("report builds");
        assert_eq!(report.labels(), &["Done", "Started"]);
        assert_eq!(report.rows()[0].adherence_pct, 50.0);
    }
}
