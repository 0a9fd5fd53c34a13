use crate::config::locale::LabelSet;
use crate::domain::model::{CustomerSummary, InputTable, Report};

const MAX_CELL_WIDTH: usize = 32;

fn clip(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_WIDTH {
        text.to_string()
    } else {
        let mut clipped: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
        clipped.push('…');
        clipped
    }
}

/// Lays out `header` and `rows` as a fixed-width text table.
pub fn render_table(header: &[String], rows: &[Vec<String>], empty_note: &str) -> String {
    let columns = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);

    let header: Vec<String> = header.iter().map(|h| clip(h)).collect();
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.iter().map(|c| clip(c)).collect())
        .collect();

    let mut widths = vec![0usize; columns];
    for line in std::iter::once(&header).chain(rows.iter()) {
        for (i, cell) in line.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let format_line = |line: &[String]| -> String {
        let cells: Vec<String> = (0..columns)
            .map(|i| {
                let cell = line.get(i).map(String::as_str).unwrap_or("");
                format!("{:<width$}", cell, width = widths[i])
            })
            .collect();
        cells.join(" | ").trim_end().to_string()
    };

    let mut out = format_line(header.as_slice());
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');
    if rows.is_empty() {
        out.push_str(empty_note);
        out.push('\n');
    }
    for row in &rows {
        out.push_str(&format_line(row.as_slice()));
        out.push('\n');
    }
    out
}

/// First `limit` rows of the uploaded file, missing cells shown blank.
pub fn render_input_preview(table: &InputTable, limit: usize, labels: &LabelSet) -> String {
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .take(limit)
        .map(|row| {
            (0..table.column_count())
                .map(|i| row.cell(i).unwrap_or("").to_string())
                .collect()
        })
        .collect();
    render_table(&table.headers, &rows, labels.empty_table)
}

fn summary_strings(summary: &CustomerSummary) -> Vec<String> {
    vec![
        summary.customer_number.clone(),
        summary.packages.to_string(),
        summary.rows.to_string(),
        format!("{:.2}", summary.total_cost),
        format!("{:.2}", summary.energy_surcharge),
        format!("{:.2}", summary.season_peak_surcharge),
        format!("{:.2}", summary.climate_protection_surcharge),
        format!("{:.2}", summary.total_with_surcharges),
        summary
            .average_per_package
            .map(|v| format!("{:.2}", v))
            .unwrap_or_default(),
    ]
}

pub fn render_report_preview(report: &Report, limit: usize, labels: &LabelSet) -> String {
    let header: Vec<String> = labels.columns.iter().map(|c| c.to_string()).collect();
    let rows: Vec<Vec<String>> = report
        .summaries
        .iter()
        .take(limit)
        .map(summary_strings)
        .collect();
    render_table(&header, &rows, labels.empty_table)
}
