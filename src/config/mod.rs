pub mod cli;
pub mod locale;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::config::locale::{LabelSet, Locale};
#[cfg(feature = "cli")]
use crate::config::toml_config::ReportConfig;
#[cfg(feature = "cli")]
use crate::core::{OutputFormat, RowOrdering};
#[cfg(feature = "cli")]
use clap::Parser;

/// Command line flags. Every flag that is given overrides the config file.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "customer-report")]
#[command(about = "Aggregates shipping cost exports into a per-customer spreadsheet report")]
pub struct CliConfig {
    /// CSV export to analyse
    #[arg(short, long)]
    pub input: Option<String>,

    /// Directory the report is written to
    #[arg(short, long)]
    pub output_path: Option<String>,

    /// Label language: en or de
    #[arg(short, long)]
    pub locale: Option<Locale>,

    /// Output formats, comma separated: xlsx, csv, json
    #[arg(long, value_delimiter = ',')]
    pub formats: Vec<OutputFormat>,

    /// Rows shown in the input and result previews
    #[arg(long)]
    pub preview_rows: Option<usize>,

    /// Row order of the report: first-seen or sorted
    #[arg(long)]
    pub order: Option<RowOrdering>,

    /// Fixed input delimiter, disables the ';' then ',' detection
    #[arg(long)]
    pub delimiter: Option<String>,

    /// Base name of the written files
    #[arg(long)]
    pub file_stem: Option<String>,

    /// TOML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Show the input preview only, without analysing or writing
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Log as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the config file named by `--config` (or defaults) and applies the flags.
    pub fn resolve(&self) -> crate::utils::error::Result<ReportConfig> {
        let mut config = match &self.config {
            Some(path) => ReportConfig::from_file(path)?,
            None => ReportConfig::default(),
        };
        self.apply_to(&mut config);
        Ok(config)
    }

    /// Labels for messages printed before a config file could be loaded.
    pub fn labels(&self) -> &'static LabelSet {
        self.locale.unwrap_or_default().labels()
    }

    pub fn apply_to(&self, config: &mut ReportConfig) {
        if let Some(input) = &self.input {
            config.input.path = Some(input.clone());
        }
        if let Some(delimiter) = &self.delimiter {
            config.input.delimiter = Some(delimiter.clone());
        }
        if let Some(locale) = self.locale {
            config.report.locale = locale;
        }
        if let Some(order) = self.order {
            config.report.ordering = order;
        }
        if let Some(preview_rows) = self.preview_rows {
            config.report.preview_rows = preview_rows;
        }
        if let Some(output_path) = &self.output_path {
            config.output.path = output_path.clone();
        }
        if !self.formats.is_empty() {
            config.output.formats = self.formats.clone();
        }
        if let Some(file_stem) = &self.file_stem {
            config.output.file_stem = Some(file_stem.clone());
        }
    }
}
