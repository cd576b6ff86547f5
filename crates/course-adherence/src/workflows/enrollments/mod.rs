mod normalizer;
mod parser;

use crate::workflows::adherence::EnrollmentRecord;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

pub const DEFAULT_COURSE_COLUMN: &str = "Mission Definitions Name";
pub const DEFAULT_STATUS_COLUMN: &str = "Mission Enrollments Status";

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("enrollment export unavailable at {}: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("enrollment export is missing the '{column}' column")]
    MissingColumn { column: String },
    #[error("invalid enrollment CSV data: {0}")]
    Malformed(#[from] csv::Error),
}

/// Supplies the enrollment snapshot a report is built from.
pub trait RecordSource {
    fn read(&self) -> Result<Vec<EnrollmentRecord>, SourceError>;
}

impl RecordSource for Vec<EnrollmentRecord> {
    fn read(&self) -> Result<Vec<EnrollmentRecord>, SourceError> {
        Ok(self.clone())
    }
}

/// Header names of the course and status columns in an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub course_column: String,
    pub status_column: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            course_column: DEFAULT_COURSE_COLUMN.to_string(),
            status_column: DEFAULT_STATUS_COLUMN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnrollmentImporter {
    columns: ColumnMapping,
}

impl EnrollmentImporter {
    pub fn new(columns: ColumnMapping) -> Self {
        Self { columns }
    }

    pub fn import_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<Vec<EnrollmentRecord>, SourceError> {
        let path = path.as_ref();
        let unavailable = |source: io::Error| SourceError::Unavailable {
            path: path.to_path_buf(),
            source,
        };

        let metadata = std::fs::metadata(path).map_err(unavailable)?;
        if !metadata.is_file() {
            return Err(unavailable(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }

        let file = std::fs::File::open(path).map_err(unavailable)?;
        self.import_reader(file).map_err(|error| read_failure_at(error, path))
    }

    pub fn import_reader<R: Read>(
        &self,
        reader: R,
    ) -> Result<Vec<EnrollmentRecord>, SourceError> {
        parser::parse_records(reader, &self.columns)
    }
}

/// Reports I/O failures hit while reading a file as an unavailable source
/// rather than as malformed CSV.
fn read_failure_at(error: SourceError, path: &Path) -> SourceError {
    match error {
        SourceError::Malformed(error) if error.is_io_error() => {
            let source = match error.into_kind() {
                csv::ErrorKind::Io(source) => source,
                other => io::Error::other(format!("{other:?}")),
            };
            SourceError::Unavailable {
                path: path.to_path_buf(),
                source,
            }
        }
        other => other,
    }
}

/// CSV export on disk, re-read on every call to [`RecordSource::read`].
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    path: PathBuf,
    importer: EnrollmentImporter,
}

impl CsvRecordSource {
    pub fn new(path: impl Into<PathBuf>, columns: ColumnMapping) -> Self {
        Self {
            path: path.into(),
            importer: EnrollmentImporter::new(columns),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for CsvRecordSource {
    fn read(&self) -> Result<Vec<EnrollmentRecord>, SourceError> {
        self.importer.import_path(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_default_columns() {
        let csv = "Learner,Mission Definitions Name,Mission Enrollments Status\n\
ana,Segurança,COMPLETED\n\
bruno,Segurança,IN_PROGRESS\n\
carla,Ética,NOT_STARTED\n";
        let records = EnrollmentImporter::default()
            .import_reader(Cursor::new(csv))
            .expect("import succeeds");

        assert_eq!(
            records,
            vec![
                EnrollmentRecord::new("Segurança", "COMPLETED"),
                EnrollmentRecord::new("Segurança", "IN_PROGRESS"),
                EnrollmentRecord::new("Ética", "NOT_STARTED"),
            ]
        );
    }

    #[test]
    fn honours_custom_column_names() {
        let csv = "course,status\nRust,COMPLETED\n";
        let importer = EnrollmentImporter::new(ColumnMapping {
            course_column: "course".to_string(),
            status_column: "status".to_string(),
        });
        let records = importer.import_reader(Cursor::new(csv)).expect("import");
        assert_eq!(records, vec![EnrollmentRecord::new("Rust", "COMPLETED")]);
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let csv = "Mission Definitions Name,State\nRust,COMPLETED\n";
        let error = EnrollmentImporter::default()
            .import_reader(Cursor::new(csv))
            .expect_err("status column missing");
        match error {
            SourceError::MissingColumn { column } => {
                assert_eq!(column, DEFAULT_STATUS_COLUMN);
            }
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_unavailable() {
        let source = CsvRecordSource::new("./does-not-exist.csv", ColumnMapping::default());
        match source.read().expect_err("file is missing") {
            SourceError::Unavailable { path, .. } => {
                assert_eq!(path, PathBuf::from("./does-not-exist.csv"));
            }
            other => panic!("expected unavailable source, got {other:?}"),
        }
    }

    #[test]
    fn directory_is_unavailable_not_malformed() {
        let dir = std::env::temp_dir();
        let source = CsvRecordSource::new(&dir, ColumnMapping::default());
        match source.read().expect_err("directories cannot be read as exports") {
            SourceError::Unavailable { path, .. } => assert_eq!(path, dir),
            other => panic!("expected unavailable source, got {other:?}"),
        }
    }

    struct BrokenDisk;

    impl Read for BrokenDisk {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("input/output error"))
        }
    }

    #[test]
    fn read_errors_after_open_are_unavailable() {
        let error = EnrollmentImporter::default()
            .import_reader(BrokenDisk)
            .expect_err("reader fails");
        assert!(matches!(error, SourceError::Malformed(_)));

        match read_failure_at(error, Path::new("exports/maio.csv")) {
            SourceError::Unavailable { path, source } => {
                assert_eq!(path, PathBuf::from("exports/maio.csv"));
                assert_eq!(source.to_string(), "input/output error");
            }
            other => panic!("expected unavailable source, got {other:?}"),
        }
    }

    #[test]
    fn csv_syntax_errors_stay_malformed() {
        let error = EnrollmentImporter::default()
            .import_reader(Cursor::new(vec![0xff, 0xfe, b'\n']))
            .expect_err("invalid utf-8 header");
        assert!(matches!(
            read_failure_at(error, Path::new("x.csv")),
            SourceError::Malformed(_)
        ));
    }

    #[test]
    fn header_only_export_yields_no_records() {
        let csv = "Mission Definitions Name,Mission Enrollments Status\n";
        let records = EnrollmentImporter::default()
            .import_reader(Cursor::new(csv))
            .expect("import");
        assert!(records.is_empty());
    }
}
