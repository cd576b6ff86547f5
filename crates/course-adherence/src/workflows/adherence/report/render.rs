use super::assembler::AdherenceReport;
use chrono::{Datelike, NaiveDate};
use std::fmt::Write as _;

const EMPTY_REPORT_NOTE: &str = "Nenhuma matrícula encontrada.";

/// Column captions used by the text and HTML renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHeadings {
    pub course: String,
    pub status_group: String,
    pub adherence: String,
}

impl Default for TableHeadings {
    fn default() -> Self {
        Self {
            course: "Nome do Curso".to_string(),
            status_group: "Status de Conclusão".to_string(),
            adherence: "Aderência (%)".to_string(),
        }
    }
}

/// Details shown around the table in the email body.
#[derive(Debug, Clone)]
pub struct EmailContext {
    pub generated_on: NaiveDate,
    pub attachment_name: Option<String>,
}

pub fn format_percentage(value: f64) -> String {
    format!("{value:.2}")
}

pub fn render_text(report: &AdherenceReport, headings: &TableHeadings) -> String {
    let mut header = vec![headings.course.clone()];
    header.extend(report.labels().iter().cloned());
    header.push(headings.adherence.clone());

    let body: Vec<Vec<String>> = report
        .rows()
        .iter()
        .map(|row| {
            let mut cells = vec![row.course_name.clone()];
            cells.extend(row.counts.iter().map(|entry| entry.count.to_string()));
            cells.push(format_percentage(row.adherence_pct));
            cells
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|cell| cell.chars().count()).collect();
    for cells in &body {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    push_text_line(&mut output, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    push_text_line(&mut output, &rule, &widths);

    if body.is_empty() {
        let _ = writeln!(output, "{EMPTY_REPORT_NOTE}");
    }
    for cells in &body {
        push_text_line(&mut output, cells, &widths);
    }

    output
}

fn push_text_line(output: &mut String, cells: &[String], widths: &[usize]) {
    let last = cells.len().saturating_sub(1);
    for (position, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if position == 0 {
            let _ = write!(output, "{cell:<width$}");
        } else {
            let _ = write!(output, "  {cell:>width$}");
        }
        if position == last {
            output.push('\n');
        }
    }
}

/// `<table class="kpi-table">` with one column per status label followed by
/// the adherence column, rows in report order.
pub fn render_html_table(report: &AdherenceReport, headings: &TableHeadings) -> String {
    let mut html = String::from("<table class=\"kpi-table\">\n  <thead>\n");
    let labels = report.labels();

    if labels.is_empty() {
        let _ = writeln!(
            html,
            "    <tr><th>{}</th><th>{}</th></tr>",
            html_escape(&headings.course),
            html_escape(&headings.adherence)
        );
    } else {
        let _ = writeln!(
            html,
            "    <tr><th rowspan=\"2\">{}</th><th colspan=\"{}\">{}</th><th rowspan=\"2\">{}</th></tr>",
            html_escape(&headings.course),
            labels.len(),
            html_escape(&headings.status_group),
            html_escape(&headings.adherence)
        );
        html.push_str("    <tr>");
        for label in labels {
            let _ = write!(html, "<th>{}</th>", html_escape(label));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("  </thead>\n  <tbody>\n");

    if report.is_empty() {
        let _ = writeln!(
            html,
            "    <tr><td colspan=\"2\">{EMPTY_REPORT_NOTE}</td></tr>"
        );
    }

    for row in report.rows() {
        let _ = write!(html, "    <tr><th>{}</th>", html_escape(&row.course_name));
        for entry in &row.counts {
            let _ = write!(html, "<td>{}</td>", entry.count);
        }
        let _ = writeln!(
            html,
            "<td>{}</td></tr>",
            format_percentage(row.adherence_pct)
        );
    }

    html.push_str("  </tbody>\n</table>");
    html
}

pub fn render_email_html(
    report: &AdherenceReport,
    headings: &TableHeadings,
    context: &EmailContext,
) -> String {
    let table = render_html_table(report, headings);
    let attachment_note = match &context.attachment_name {
        Some(name) => format!(
            "<p class=\"note\">* O ficheiro detalhado original ({}) foi anexado para consulta de dados individuais.</p>",
            html_escape(name)
        ),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="pt">
<head>
    <meta charset="UTF-8">
    <style>{css}</style>
</head>
<body class="email-body">
    <div class="card">
        <div class="brand-bar"></div>
        <div class="header">
            <h2>Dashboard de Aderência dos Cursos</h2>
            <p class="subtitle">Monitoramento dos Cursos | {date}</p>
        </div>
        <div class="content">
            <p>Olá,</p>
            <p>Os indicadores dos <span class="highlight">Cursos</span> foram atualizados. Abaixo, encontra o resumo consolidado por matéria:</p>
            <div class="table-wrap">
{table}
            </div>
            {attachment_note}
        </div>
        <div class="footer">
            <p>Automated Reporting System | <strong>{year}</strong></p>
        </div>
    </div>
</body>
</html>
"#,
        css = EMAIL_CSS,
        date = context.generated_on.format("%d/%m/%Y"),
        table = table,
        attachment_note = attachment_note,
        year = context.generated_on.year(),
    )
}

const EMAIL_CSS: &str = r#"
.email-body { background-color: #f0f2f5; padding: 20px; font-family: 'Segoe UI', Helvetica, Arial, sans-serif; }
.card { max-width: 650px; margin: 0 auto; background: #ffffff; border-radius: 12px; border: 1px solid #e1e4e8; overflow: hidden; }
.brand-bar { background: #0078d4; height: 6px; }
.header { padding: 30px; text-align: center; color: #1a1a1a; }
.header h2 { margin: 0; }
.subtitle { margin: 5px 0 0; color: #666; font-size: 14px; }
.content { padding: 0 30px 30px 30px; color: #444; line-height: 1.6; }
.table-wrap { overflow-x: auto; }
.kpi-table { width: 100%; border-collapse: collapse; margin-top: 20px; }
.kpi-table th { background-color: #f8f9fa; color: #0078d4; text-align: left; padding: 12px; border-bottom: 2px solid #0078d4; font-size: 11px; text-transform: uppercase; }
.kpi-table td { padding: 10px 12px; border-bottom: 1px solid #eee; font-size: 13px; }
.note { margin-top: 25px; font-size: 12px; color: #777; }
.footer { background: #f8f9fa; padding: 15px; text-align: center; font-size: 11px; color: #888; border-top: 1px solid #eee; }
.highlight { font-weight: bold; color: #0078d4; }
"#;

fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
