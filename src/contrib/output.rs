use super::pivot::{ReportTable, TableRow};
use crate::model::{DateWindow, ReportMode, SCHEMA_VERSION};
use crate::util::format_number;
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use console::{measure_text_width, pad_str, style, Alignment};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct ReportOutput<'a> {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository_path: String,
    pub since: NaiveDate,
    pub days: u32,
    pub report: ReportMode,
    pub table: &'a ReportTable,
}

pub fn output_json(
    table: &ReportTable,
    repo_path: &Path,
    window: &DateWindow,
    mode: ReportMode,
) -> Result<()> {
    let output = ReportOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        repository_path: repo_path.to_string_lossy().to_string(),
        since: window.start(),
        days: window.days(),
        report: mode,
        table,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn output_table(table: &ReportTable, max_width: Option<usize>) -> Result<()> {
    if table.rows.is_empty() {
        println!("No contributions found in the selected range");
        return Ok(());
    }
    print!("{}", render_table(table, max_width));
    Ok(())
}

fn cells(row: &TableRow) -> Vec<String> {
    std::iter::once(row.label.clone())
        .chain(row.values.iter().map(|v| format_number(*v)))
        .chain(row.trend.clone())
        .collect()
}

/// Draw `table` with box characters. Value columns that would overflow
/// `max_width` are dropped from the right; the label column always stays.
pub fn render_table(table: &ReportTable, max_width: Option<usize>) -> String {
    let body: Vec<Vec<String>> = table.rows.iter().map(cells).collect();
    let footer = table.footer.as_ref().map(cells);

    let mut widths: Vec<usize> = table.headers.iter().map(|h| measure_text_width(h)).collect();
    for row in body.iter().chain(footer.iter()) {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(measure_text_width(cell));
        }
    }

    let columns = visible_columns(&widths, max_width);
    let widths = &widths[..columns];

    let mut out = String::new();
    out.push_str(&format!("{}\n", style(&table.title).bold()));
    out.push_str(&rule(widths, '┌', '┬', '┐'));
    out.push_str(&line(&table.headers, widths, true));
    out.push_str(&rule(widths, '├', '┼', '┤'));
    for row in &body {
        out.push_str(&line(row, widths, false));
    }
    if let Some(footer) = &footer {
        out.push_str(&rule(widths, '├', '┼', '┤'));
        out.push_str(&line(footer, widths, true));
    }
    out.push_str(&rule(widths, '└', '┴', '┘'));
    out
}

fn visible_columns(widths: &[usize], max_width: Option<usize>) -> usize {
    let Some(max) = max_width else {
        return widths.len();
    };
    // each column takes its width plus a leading "│ " and a trailing space
    let mut used = 1;
    let mut count = 0;
    for width in widths {
        used += width + 3;
        if used > max && count >= 2 {
            break;
        }
        count += 1;
    }
    count.min(widths.len())
}

fn rule(widths: &[usize], left: char, mid: char, right: char) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{left}{}{right}\n", segments.join(&mid.to_string()))
}

/// Rows shorter than `widths` (a footer has no trend) get blank cells.
fn line(cells: &[String], widths: &[usize], emphasize: bool) -> String {
    let mut out = String::from("│");
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map_or("", String::as_str);
        let align = if i == 0 { Alignment::Left } else { Alignment::Right };
        let padded = pad_str(cell, *width, align, None);
        if emphasize {
            out.push_str(&format!(" {} │", style(padded).bold()));
        } else {
            out.push_str(&format!(" {padded} │"));
        }
    }
    out.push('\n');
    out
}
