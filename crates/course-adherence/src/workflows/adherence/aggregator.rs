use super::domain::{CountMatrix, EnrollmentRecord};
use super::translator::StatusTranslator;
use std::collections::HashSet;
use tracing::debug;

/// Groups enrollments by course and translated status.
///
/// The returned matrix is dense: every course carries an entry for every
/// label observed in the batch, so downstream lookups never miss.
pub fn aggregate(translator: &StatusTranslator, records: &[EnrollmentRecord]) -> CountMatrix {
    let mut matrix = CountMatrix::new();
    let mut passed_through: HashSet<&str> = HashSet::new();

    for record in records {
        let translation = translator.classify(&record.status_code);
        if translation.is_pass_through() && passed_through.insert(translation.as_str()) {
            debug!(
                status_code = %record.status_code,
                "status code not in vocabulary; keeping it as its own column"
            );
        }

        matrix.increment(&record.course_name, translation.as_str());
    }

    matrix.densify();
    matrix.order_labels(translator.vocabulary());

    debug!(
        records = records.len(),
        courses = matrix.len(),
        labels = matrix.labels().len(),
        "aggregated enrollment records"
    );

    matrix
}
