use crate::infra::InMemoryDispatcher;
use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use course_adherence::config::{AppConfig, ConfigError, ReportConfig};
use course_adherence::error::AppError;
use course_adherence::telemetry;
use course_adherence::workflows::adherence::report::render::{
    render_html_table, render_text, TableHeadings,
};
use course_adherence::workflows::adherence::{AdherencePipeline, AdherenceReport};
use course_adherence::workflows::dispatch::{
    AdherenceMailer, DispatchReceipt, Dispatcher, OutboxDispatcher,
};
use course_adherence::workflows::enrollments::CsvRecordSource;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Html,
    Json,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Enrollment export (CSV). Defaults to ADHERENCE_SOURCE_PATH
    #[arg(long)]
    pub(crate) source: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
    /// Write the rendered report to this file instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct SendArgs {
    /// Enrollment export (CSV). Defaults to ADHERENCE_SOURCE_PATH
    #[arg(long)]
    pub(crate) source: Option<PathBuf>,
    /// Recipient address. Defaults to ADHERENCE_RECIPIENT
    #[arg(long)]
    pub(crate) to: Option<String>,
    /// Outbox directory for spooled messages. Defaults to ADHERENCE_OUTBOX_DIR
    #[arg(long)]
    pub(crate) outbox: Option<PathBuf>,
    /// Report date shown in the email (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Compose the message without spooling it
    #[arg(long)]
    pub(crate) dry_run: bool,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        source,
        format,
        output,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let source_path = resolve_source(source, &config.report)?;
    let report = build_report(&config.report, &source_path)?;
    let rendered = render_report(&report, format)?;

    match output {
        Some(path) => {
            std::fs::write(&path, rendered)?;
            info!(path = %path.display(), "wrote adherence report");
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

pub(crate) fn run_send(args: SendArgs) -> Result<(), AppError> {
    let SendArgs {
        source,
        to,
        outbox,
        today,
        dry_run,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let source_path = resolve_source(source, &config.report)?;
    let recipient = to
        .or_else(|| config.report.recipient.clone())
        .ok_or(ConfigError::MissingSetting {
            name: "ADHERENCE_RECIPIENT",
        })?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    info!(source = %source_path.display(), "processing enrollment export");
    let report = build_report(&config.report, &source_path)?;

    if dry_run {
        let dispatcher = InMemoryDispatcher::default();
        deliver_report(&report, &source_path, &recipient, today, &dispatcher)?;
        for message in dispatcher.messages() {
            println!("Dry run: message for {} not queued", message.recipient);
            println!("Subject: {}", message.subject);
            println!("Courses: {}", report.len());
        }
        return Ok(());
    }

    let dispatcher = OutboxDispatcher::new(outbox.unwrap_or(config.report.outbox_dir));
    let receipt = deliver_report(&report, &source_path, &recipient, today, &dispatcher)?;
    let location = receipt
        .location
        .as_deref()
        .map(|path| path.display().to_string())
        .unwrap_or_default();
    println!("Adherence report queued for {recipient}: {location}");

    Ok(())
}

fn resolve_source(source: Option<PathBuf>, config: &ReportConfig) -> Result<PathBuf, AppError> {
    source
        .or_else(|| config.source_path.clone())
        .ok_or_else(|| {
            ConfigError::MissingSetting {
                name: "ADHERENCE_SOURCE_PATH",
            }
            .into()
        })
}

pub(crate) fn build_report(
    config: &ReportConfig,
    source_path: &Path,
) -> Result<AdherenceReport, AppError> {
    let source = CsvRecordSource::new(source_path, config.columns.clone());
    let pipeline = AdherencePipeline::new(config.vocabulary.clone());
    Ok(pipeline.run(&source)?)
}

pub(crate) fn render_report(
    report: &AdherenceReport,
    format: OutputFormat,
) -> Result<String, AppError> {
    let headings = TableHeadings::default();
    let rendered = match format {
        OutputFormat::Text => render_text(report, &headings),
        OutputFormat::Html => {
            let mut html = render_html_table(report, &headings);
            html.push('\n');
            html
        }
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(report).map_err(std::io::Error::from)?;
            json.push('\n');
            json
        }
    };

    Ok(rendered)
}

pub(crate) fn deliver_report(
    report: &AdherenceReport,
    source_path: &Path,
    recipient: &str,
    today: NaiveDate,
    dispatcher: &dyn Dispatcher,
) -> Result<DispatchReceipt, AppError> {
    let message = AdherenceMailer::default().compose(report, source_path, recipient, today)?;
    Ok(dispatcher.dispatch(&message)?)
}
