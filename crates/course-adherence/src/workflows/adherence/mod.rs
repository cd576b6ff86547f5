mod aggregator;
mod calculator;
pub mod domain;
mod pipeline;
pub mod report;
mod router;
mod translator;

pub use aggregator::aggregate;
pub use calculator::{compute_adherence, round_percentage, AdherenceByCourse};
pub use domain::{
    CountMatrix, CourseCounts, EnrollmentRecord, StatusVocabulary, COMPLETED_CODE,
};
pub use pipeline::{AdherencePipeline, PipelineError};
pub use report::{AdherenceReport, AssemblyError, CourseSummaryRow, LabelCount};
pub use router::{adherence_router, AdherenceReportRequest, AdherenceReportResponse};
pub use translator::{StatusTranslator, Translation};
