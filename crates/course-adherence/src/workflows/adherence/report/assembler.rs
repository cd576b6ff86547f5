use super::super::calculator::AdherenceByCourse;
use super::super::domain::CountMatrix;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: u64,
}

/// One course line of the adherence report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseSummaryRow {
    pub course_name: String,
    /// Counts in report column order, one entry per report label.
    pub counts: Vec<LabelCount>,
    pub adherence_pct: f64,
}

impl CourseSummaryRow {
    pub fn count(&self, label: &str) -> Option<u64> {
        self.counts
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.count)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|entry| entry.count).sum()
    }
}

/// Per-course adherence rows ordered by adherence, highest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdherenceReport {
    labels: Vec<String>,
    rows: Vec<CourseSummaryRow>,
}

impl AdherenceReport {
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn rows(&self) -> &[CourseSummaryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn record_count(&self) -> u64 {
        self.rows.iter().map(CourseSummaryRow::total).sum()
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<CourseSummaryRow>) {
        (self.labels, self.rows)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("internal consistency failure: course '{course}' has counts but no adherence value")]
    InternalConsistency { course: String },
}

/// Joins counts and adherence into report rows.
///
/// Rows are ordered by adherence descending with a stable sort, so courses
/// with equal adherence stay in first-seen order.
pub fn assemble(
    matrix: &CountMatrix,
    adherence: &AdherenceByCourse,
) -> Result<AdherenceReport, AssemblyError> {
    let labels = matrix.labels().to_vec();
    let mut rows = Vec::with_capacity(matrix.len());

    for course in matrix.courses() {
        let adherence_pct = adherence.get(course.course_name()).ok_or_else(|| {
            AssemblyError::InternalConsistency {
                course: course.course_name().to_string(),
            }
        })?;

        let counts = labels
            .iter()
            .map(|label| LabelCount {
                label: label.clone(),
                count: course.count(label),
            })
            .collect();

        rows.push(CourseSummaryRow {
            course_name: course.course_name().to_string(),
            counts,
            adherence_pct,
        });
    }

    // `sort_by` is a stable merge sort.
    rows.sort_by(|a, b| b.adherence_pct.total_cmp(&a.adherence_pct));

    Ok(AdherenceReport { labels, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::adherence::{compute_adherence, StatusTranslator};

    fn matrix_from(rows: &[(&str, &str)]) -> CountMatrix {
        let mut matrix = CountMatrix::new();
        for (course, label) in rows {
            matrix.increment(course, label);
        }
        matrix.densify();
        matrix
    }

    #[test]
    fn sorts_by_adherence_descending() {
        let matrix = matrix_from(&[
            ("Low", "Em Andamento"),
            ("High", "Concluído"),
            ("Mid", "Concluído"),
            ("Mid", "Em Andamento"),
        ]);
        let adherence = compute_adherence(&StatusTranslator::default(), &matrix);

        let report = assemble(&matrix, &adherence).expect("report assembles");
        let order: Vec<_> = report.rows().iter().map(|r| r.course_name.as_str()).collect();
        assert_eq!(order, vec!["High", "Mid", "Low"]);
    }

    #[test]
    fn equal_adherence_keeps_first_seen_order() {
        let matrix = matrix_from(&[
            ("Charlie", "Concluído"),
            ("Alpha", "Em Andamento"),
            ("Bravo", "Concluído"),
            ("Delta", "Em Andamento"),
        ]);
        let adherence = compute_adherence(&StatusTranslator::default(), &matrix);

        let report = assemble(&matrix, &adherence).expect("report assembles");
        let order: Vec<_> = report.rows().iter().map(|r| r.course_name.as_str()).collect();
        assert_eq!(order, vec!["Charlie", "Bravo", "Alpha", "Delta"]);
    }

    #[test]
    fn every_row_lists_every_label() {
        let matrix = matrix_from(&[("A", "Concluído"), ("B", "EXPIRED")]);
        let adherence = compute_adherence(&StatusTranslator::default(), &matrix);

        let report = assemble(&matrix, &adherence).expect("report assembles");
        for row in report.rows() {
            let labels: Vec<_> = row.counts.iter().map(|c| c.label.as_str()).collect();
            assert_eq!(labels, report.labels());
        }
        assert_eq!(report.record_count(), 2);
    }

    #[test]
    fn missing_adherence_is_an_internal_consistency_error() {
        let matrix = matrix_from(&[("A", "Concluído")]);

        let error = assemble(&matrix, &AdherenceByCourse::default()).expect_err("must fail");
        match error {
            AssemblyError::InternalConsistency { course } => assert_eq!(course, "A"),
        }
    }

    #[test]
    fn empty_matrix_gives_empty_report() {
        let report = assemble(&CountMatrix::new(), &AdherenceByCourse::default())
            .expect("report assembles");
        assert!(report.is_empty());
        assert!(report.labels().is_empty());
    }
}
