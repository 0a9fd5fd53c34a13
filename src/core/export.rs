use crate::config::locale::LabelSet;
use crate::core::xlsx::{write_workbook, SheetCell, Worksheet};
use crate::domain::model::{CustomerSummary, Report};
use crate::utils::error::{ReportError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

fn summary_cells(summary: &CustomerSummary) -> Vec<SheetCell> {
    vec![
        SheetCell::Text(summary.customer_number.clone()),
        SheetCell::Integer(summary.packages as u64),
        SheetCell::Integer(summary.rows as u64),
        SheetCell::Decimal(summary.total_cost),
        SheetCell::Decimal(summary.energy_surcharge),
        SheetCell::Decimal(summary.season_peak_surcharge),
        SheetCell::Decimal(summary.climate_protection_surcharge),
        SheetCell::Decimal(summary.total_with_surcharges),
        summary
            .average_per_package
            .map(SheetCell::Decimal)
            .unwrap_or(SheetCell::Empty),
    ]
}

pub fn report_worksheet(report: &Report, labels: &LabelSet) -> Worksheet {
    let header = labels.columns.iter().map(|c| c.to_string()).collect();
    let mut sheet = Worksheet::new(labels.sheet_name, header);
    for summary in &report.summaries {
        sheet.push_row(summary_cells(summary));
    }
    sheet
}

pub fn report_to_xlsx(report: &Report, labels: &LabelSet, created: DateTime<Utc>) -> Result<Vec<u8>> {
    write_workbook(&report_worksheet(report, labels), created)
}

/// `;`-separated text with localized headers and full-precision numbers.
pub fn report_to_csv(report: &Report, labels: &LabelSet) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());

    writer.write_record(labels.columns)?;
    for summary in &report.summaries {
        writer.write_record([
            summary.customer_number.clone(),
            summary.packages.to_string(),
            summary.rows.to_string(),
            summary.total_cost.to_string(),
            summary.energy_surcharge.to_string(),
            summary.season_peak_surcharge.to_string(),
            summary.climate_protection_surcharge.to_string(),
            summary.total_with_surcharges.to_string(),
            summary
                .average_per_package
                .map(|v| v.to_string())
                .unwrap_or_default(),
        ])?;
    }

    writer.into_inner().map_err(|e| ReportError::ProcessingError {
        message: format!("failed to flush CSV output: {}", e),
    })
}

#[derive(Serialize)]
struct JsonReport<'a> {
    customers: &'a [CustomerSummary],
    included_rows: usize,
    excluded_rows: usize,
    generated_at: String,
}

pub fn report_to_json(report: &Report, created: DateTime<Utc>) -> Result<Vec<u8>> {
    let document = JsonReport {
        customers: &report.summaries,
        included_rows: report.included_rows,
        excluded_rows: report.excluded_rows,
        generated_at: created.to_rfc3339(),
    };
    Ok(serde_json::to_vec_pretty(&document)?)
}
