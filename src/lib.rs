pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::pipelines::report_pipeline::ReportPipeline;
pub use config::{cli::LocalStorage, locale::Locale, toml_config::ReportConfig};
pub use core::etl::{ReportEngine, RunSummary};
pub use utils::error::{ReportError, Result};
