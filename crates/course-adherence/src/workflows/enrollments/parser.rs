use super::normalizer::clean_field;
use super::{ColumnMapping, SourceError};
use crate::workflows::adherence::EnrollmentRecord;
use csv::StringRecord;
use std::io::Read;
use tracing::warn;

pub(crate) fn parse_records<R: Read>(
    reader: R,
    columns: &ColumnMapping,
) -> Result<Vec<EnrollmentRecord>, SourceError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let course_index = column_index(&headers, &columns.course_column)?;
    let status_index = column_index(&headers, &columns.status_column)?;

    let mut records = Vec::new();
    for (position, row) in csv_reader.records().enumerate() {
        let row = row?;
        let course_name = clean_field(row.get(course_index).unwrap_or_default());
        let status_code = clean_field(row.get(status_index).unwrap_or_default());

        if course_name.is_empty() || status_code.is_empty() {
            // Header is line 1.
            warn!(
                line = position + 2,
                "skipping enrollment row without a course name or status"
            );
            continue;
        }

        records.push(EnrollmentRecord {
            course_name,
            status_code,
        });
    }

    Ok(records)
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize, SourceError> {
    let wanted = clean_field(name);
    headers
        .iter()
        .position(|header| clean_field(header) == wanted)
        .ok_or_else(|| SourceError::MissingColumn {
            column: name.to_string(),
        })
}
