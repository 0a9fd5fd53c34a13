use serde::{Deserialize, Serialize};

/// One data line of the uploaded export. Empty cells are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputRow {
    pub cells: Vec<Option<String>>,
}

impl InputRow {
    pub fn new(cells: Vec<Option<String>>) -> Self {
        Self { cells }
    }

    /// Positions past the end of a short row read as missing.
    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells.get(index).and_then(|c| c.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    Latin1,
    Utf8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputTable {
    pub headers: Vec<String>,
    pub rows: Vec<InputRow>,
    pub delimiter: u8,
    pub encoding: TextEncoding,
}

impl InputTable {
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub customer_number: String,
    pub packages: usize,
    pub rows: usize,
    pub total_cost: f64,
    pub energy_surcharge: f64,
    pub season_peak_surcharge: f64,
    pub climate_protection_surcharge: f64,
    pub total_with_surcharges: f64,
    /// `None` when the group has no package numbers to divide by.
    pub average_per_package: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub summaries: Vec<CustomerSummary>,
    pub included_rows: usize,
    pub excluded_rows: usize,
}

impl Report {
    pub fn customer_count(&self) -> usize {
        self.summaries.len()
    }
}
