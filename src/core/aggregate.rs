use crate::core::amount::normalize_amount;
use crate::core::identifier::extract_customer_number;
use crate::domain::model::{CustomerSummary, InputTable, Report};
use crate::domain::ports::RowOrdering;
use crate::utils::error::{ReportError, Result};
use std::collections::{HashMap, HashSet};

/// Column D holds the package number.
pub const PACKAGE_COLUMN: usize = 3;
/// Column G holds the shipping cost.
pub const AMOUNT_COLUMN: usize = 6;
/// Column J holds the path carrying the customer number.
pub const PATH_COLUMN: usize = 9;

pub const ENERGY_SURCHARGE_RATE: f64 = 0.235;
pub const SEASON_PEAK_SURCHARGE_RATE: f64 = 0.01;
pub const CLIMATE_PROTECTION_SURCHARGE_RATE: f64 = 0.02;

/// Spreadsheet letter of a zero-based column position (0 -> A, 26 -> AA).
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

#[derive(Default)]
struct CustomerGroup<'a> {
    packages: HashSet<&'a str>,
    rows: usize,
    total_cost: f64,
}

impl CustomerGroup<'_> {
    fn into_summary(self, customer_number: String) -> CustomerSummary {
        let energy_surcharge = self.total_cost * ENERGY_SURCHARGE_RATE;
        let season_peak_surcharge = self.total_cost * SEASON_PEAK_SURCHARGE_RATE;
        let climate_protection_surcharge = self.total_cost * CLIMATE_PROTECTION_SURCHARGE_RATE;
        let total_with_surcharges = self.total_cost
            + energy_surcharge
            + season_peak_surcharge
            + climate_protection_surcharge;

        let packages = self.packages.len();
        let average_per_package = if packages == 0 {
            tracing::warn!(
                "Customer '{}' has no package numbers, average per package left empty",
                customer_number
            );
            None
        } else {
            Some(total_with_surcharges / packages as f64)
        };

        CustomerSummary {
            customer_number,
            packages,
            rows: self.rows,
            total_cost: self.total_cost,
            energy_surcharge,
            season_peak_surcharge,
            climate_protection_surcharge,
            total_with_surcharges,
            average_per_package,
        }
    }
}

/// Groups the rows of `table` by customer number and builds one summary per customer.
///
/// Rows without a customer number are skipped. Fails when the header does not
/// reach the path column.
pub fn compute_report(table: &InputTable, ordering: RowOrdering) -> Result<Report> {
    let required = PACKAGE_COLUMN.max(AMOUNT_COLUMN).max(PATH_COLUMN);
    if table.column_count() <= required {
        return Err(ReportError::MissingColumn {
            index: required,
            letter: column_letter(required),
            available: table.column_count(),
        });
    }

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, CustomerGroup> = HashMap::new();
    let mut excluded_rows = 0;

    for row in &table.rows {
        let Some(customer_number) = extract_customer_number(row.cell(PATH_COLUMN)) else {
            excluded_rows += 1;
            continue;
        };

        let amount = normalize_amount(row.cell(AMOUNT_COLUMN));
        if !groups.contains_key(&customer_number) {
            order.push(customer_number.clone());
        }
        let group = groups.entry(customer_number).or_default();

        group.rows += 1;
        group.total_cost += amount;
        if let Some(package) = row.cell(PACKAGE_COLUMN) {
            group.packages.insert(package);
        }
    }

    if ordering == RowOrdering::Sorted {
        order.sort();
    }

    let included_rows = table.rows.len() - excluded_rows;
    let summaries: Vec<CustomerSummary> = order
        .into_iter()
        .filter_map(|customer_number| {
            groups
                .remove(&customer_number)
                .map(|group| group.into_summary(customer_number))
        })
        .collect();

    tracing::debug!(
        "Aggregated {} rows into {} customers ({} rows without customer number)",
        included_rows,
        summaries.len(),
        excluded_rows
    );

    Ok(Report {
        summaries,
        included_rows,
        excluded_rows,
    })
}
