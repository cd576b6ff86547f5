use super::{DispatchError, OutgoingMessage};
use crate::workflows::adherence::report::render::{render_email_html, EmailContext, TableHeadings};
use crate::workflows::adherence::AdherenceReport;
use chrono::NaiveDate;
use std::path::Path;

/// Builds the adherence email from a finished report.
#[derive(Debug, Clone, Default)]
pub struct AdherenceMailer {
    headings: TableHeadings,
}

impl AdherenceMailer {
    pub fn new(headings: TableHeadings) -> Self {
        Self { headings }
    }

    pub fn compose(
        &self,
        report: &AdherenceReport,
        source_path: &Path,
        recipient: &str,
        generated_on: NaiveDate,
    ) -> Result<OutgoingMessage, DispatchError> {
        validate_recipient(recipient)?;

        let context = EmailContext {
            generated_on,
            attachment_name: source_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
        };
        let attachment =
            std::fs::canonicalize(source_path).unwrap_or_else(|_| source_path.to_path_buf());

        Ok(OutgoingMessage {
            recipient: recipient.trim().to_string(),
            subject: subject_for(source_path),
            content_type: mime::TEXT_HTML_UTF_8.to_string(),
            html_body: render_email_html(report, &self.headings, &context),
            attachments: vec![attachment],
        })
    }
}

pub fn subject_for(source_path: &Path) -> String {
    let stem = source_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("📊 KPI: Aderência dos Cursos - {stem}")
}

/// Accepts `local@domain` with exactly one `@` and no whitespace.
pub fn validate_recipient(recipient: &str) -> Result<(), DispatchError> {
    let trimmed = recipient.trim();
    let valid = match trimmed.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !trimmed.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(DispatchError::InvalidRecipient(recipient.to_string()))
    }
}
