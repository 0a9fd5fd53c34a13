use crate::config::locale::Locale;
use crate::domain::model::{InputTable, Report};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Xlsx,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" => Ok(OutputFormat::Xlsx),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "unsupported output format '{}', expected one of: xlsx, csv, json",
                other
            )),
        }
    }
}

/// Order of the summary rows in the written report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RowOrdering {
    #[default]
    FirstSeen,
    Sorted,
}

impl std::str::FromStr for RowOrdering {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first-seen" | "first_seen" => Ok(RowOrdering::FirstSeen),
            "sorted" => Ok(RowOrdering::Sorted),
            other => Err(format!(
                "unsupported ordering '{}', expected 'first-seen' or 'sorted'",
                other
            )),
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn locale(&self) -> Locale;
    fn output_formats(&self) -> &[OutputFormat];
    fn preview_rows(&self) -> usize;
    fn ordering(&self) -> RowOrdering;
    /// Forces a delimiter and disables the `;` then `,` fallback.
    fn delimiter(&self) -> Option<u8> {
        None
    }
    fn file_stem(&self) -> &str {
        self.locale().labels().file_stem
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<InputTable>;
    async fn transform(&self, table: &InputTable) -> Result<Report>;
    async fn load(&self, report: &Report) -> Result<Vec<String>>;
    fn locale(&self) -> Locale;
}
