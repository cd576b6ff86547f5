use crate::commands::{run_report, run_send, ReportArgs, SendArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use course_adherence::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Course Adherence Reporter",
    about = "Build per-course training adherence reports and deliver them by email",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Render the adherence report for an enrollment export
    Report(ReportArgs),
    /// Build the report and queue it as an email
    Send(SendArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args),
        Command::Send(args) => run_send(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::OutputFormat;

    #[test]
    fn report_subcommand_parses_format_and_source() {
        let cli = Cli::try_parse_from([
            "course-adherence",
            "report",
            "--source",
            "enrollments.csv",
            "--format",
            "html",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Report(args)) => {
                assert_eq!(args.format, OutputFormat::Html);
                assert_eq!(
                    args.source.as_deref(),
                    Some(std::path::Path::new("enrollments.csv"))
                );
            }
            other => panic!("expected report command, got {other:?}"),
        }
    }

    #[test]
    fn send_subcommand_accepts_dry_run() {
        let cli = Cli::try_parse_from(["course-adherence", "send", "--to", "a@b.com", "--dry-run"])
            .expect("arguments parse");

        match cli.command {
            Some(Command::Send(args)) => {
                assert!(args.dry_run);
                assert_eq!(args.to.as_deref(), Some("a@b.com"));
            }
            other => panic!("expected send command, got {other:?}"),
        }
    }

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::try_parse_from(["course-adherence"]).expect("arguments parse");
        assert!(cli.command.is_none());
    }
}
