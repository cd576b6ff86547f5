use std::io::Cursor;
use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use super::pipeline::AdherencePipeline;
use super::report::render::{render_html_table, TableHeadings};
use super::report::CourseSummaryRow;
use crate::error::AppError;
use crate::workflows::enrollments::{ColumnMapping, EnrollmentImporter};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdherenceReportRequest {
    pub enrollments_csv: String,
    #[serde(default)]
    pub include_html: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdherenceReportResponse {
    pub labels: Vec<String>,
    pub rows: Vec<CourseSummaryRow>,
    pub course_count: usize,
    pub record_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct AdherenceService {
    pipeline: AdherencePipeline,
    importer: EnrollmentImporter,
    headings: TableHeadings,
}

/// Router exposing report generation over HTTP.
pub fn adherence_router(pipeline: AdherencePipeline, columns: ColumnMapping) -> Router {
    let service = Arc::new(AdherenceService {
        pipeline,
        importer: EnrollmentImporter::new(columns),
        headings: TableHeadings::default(),
    });

    Router::new()
        .route("/api/v1/adherence/report", post(report_handler))
        .with_state(service)
}

pub(crate) async fn report_handler(
    State(service): State<Arc<AdherenceService>>,
    Json(request): Json<AdherenceReportRequest>,
) -> Result<Json<AdherenceReportResponse>, AppError> {
    let records = service
        .importer
        .import_reader(Cursor::new(request.enrollments_csv.into_bytes()))?;
    let report = service.pipeline.build(&records)?;

    let html = request
        .include_html
        .then(|| render_html_table(&report, &service.headings));
    let record_count = report.record_count();
    let course_count = report.len();
    let (labels, rows) = report.into_parts();

    Ok(Json(AdherenceReportResponse {
        labels,
        rows,
        course_count,
        record_count,
        html,
    }))
}
