use crate::config::locale::Locale;
use crate::core::{ConfigProvider, OutputFormat, RowOrdering};
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{
    validate_delimiter, validate_file_extension, validate_non_empty_string, validate_path,
    validate_range, validate_required_field, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

pub const DEFAULT_OUTPUT_PATH: &str = "./output";
pub const DEFAULT_PREVIEW_ROWS: usize = 5;
pub const MAX_PREVIEW_ROWS: usize = 1000;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub input: InputConfig,
    pub report: ReportOptions,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub path: Option<String>,
    /// Fixed delimiter; unset means `;` with a `,` fallback.
    pub delimiter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    pub locale: Locale,
    pub ordering: RowOrdering,
    pub preview_rows: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            ordering: RowOrdering::default(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
    pub formats: Vec<OutputFormat>,
    pub file_stem: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_OUTPUT_PATH.to_string(),
            formats: vec![OutputFormat::Xlsx],
            file_stem: None,
        }
    }
}

impl ReportConfig {
    /// Loads a config file. A missing or unreadable file is a configuration error.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| ReportError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ReportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        let input = validate_required_field("input.path", &self.input.path)?;
        validate_path("input.path", input)?;
        validate_file_extension("input.path", input, &["csv", "txt"])?;

        if let Some(delimiter) = &self.input.delimiter {
            validate_delimiter("input.delimiter", delimiter)?;
        }

        validate_path("output.path", &self.output.path)?;
        if self.output.formats.is_empty() {
            return Err(ReportError::InvalidConfigValueError {
                field: "output.formats".to_string(),
                value: String::new(),
                reason: "At least one output format is required (xlsx, csv, json)".to_string(),
            });
        }
        if let Some(stem) = &self.output.file_stem {
            validate_non_empty_string("output.file_stem", stem)?;
            if stem.contains(&['/', '\\'][..]) {
                return Err(ReportError::InvalidConfigValueError {
                    field: "output.file_stem".to_string(),
                    value: stem.clone(),
                    reason: "File stem cannot contain path separators".to_string(),
                });
            }
        }

        validate_range("report.preview_rows", self.report.preview_rows, 0, MAX_PREVIEW_ROWS)?;
        Ok(())
    }
}

impl ConfigProvider for ReportConfig {
    fn input_path(&self) -> &str {
        self.input.path.as_deref().unwrap_or("")
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn locale(&self) -> Locale {
        self.report.locale
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.output.formats
    }

    fn preview_rows(&self) -> usize {
        self.report.preview_rows
    }

    fn ordering(&self) -> RowOrdering {
        self.report.ordering
    }

    fn delimiter(&self) -> Option<u8> {
        self.input
            .delimiter
            .as_deref()
            .and_then(|d| validate_delimiter("input.delimiter", d).ok())
    }

    fn file_stem(&self) -> &str {
        self.output
            .file_stem
            .as_deref()
            .unwrap_or(self.report.locale.labels().file_stem)
    }
}

impl Validate for ReportConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[input]
path = "exports/march.csv"
delimiter = ";"

[report]
locale = "de"
ordering = "sorted"
preview_rows = 10

[output]
path = "./reports"
formats = ["xlsx", "csv"]
file_stem = "maerz"
"#;

        let config = ReportConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.input_path(), "exports/march.csv");
        assert_eq!(config.delimiter(), Some(b';'));
        assert_eq!(config.locale(), Locale::De);
        assert_eq!(config.ordering(), RowOrdering::Sorted);
        assert_eq!(config.preview_rows(), 10);
        assert_eq!(config.output_formats(), &[OutputFormat::Xlsx, OutputFormat::Csv]);
        assert_eq!(config.file_stem(), "maerz");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_for_missing_sections() {
        let config = ReportConfig::from_toml_str("[input]\npath = \"a.csv\"\n").unwrap();

        assert_eq!(config.locale(), Locale::En);
        assert_eq!(config.ordering(), RowOrdering::FirstSeen);
        assert_eq!(config.preview_rows(), DEFAULT_PREVIEW_ROWS);
        assert_eq!(config.output_path(), DEFAULT_OUTPUT_PATH);
        assert_eq!(config.output_formats(), &[OutputFormat::Xlsx]);
        assert_eq!(config.file_stem(), "report_per_customer");
        assert_eq!(config.delimiter(), None);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CUSTOMER_REPORT_TEST_OUT", "/tmp/reports");

        let config = ReportConfig::from_toml_str(
            "[input]\npath = \"a.csv\"\n[output]\npath = \"${CUSTOMER_REPORT_TEST_OUT}\"\n",
        )
        .unwrap();
        assert_eq!(config.output_path(), "/tmp/reports");

        std::env::remove_var("CUSTOMER_REPORT_TEST_OUT");
    }

    #[test]
    fn test_validation_failures() {
        let missing_input = ReportConfig::default();
        assert!(matches!(
            missing_input.validate(),
            Err(ReportError::MissingConfigError { .. })
        ));

        let mut config = ReportConfig::default();
        config.input.path = Some("export.xlsx".to_string());
        assert!(config.validate().is_err());

        config.input.path = Some("export.csv".to_string());
        config.output.formats.clear();
        assert!(config.validate().is_err());

        config.output.formats = vec![OutputFormat::Json];
        config.report.preview_rows = MAX_PREVIEW_ROWS + 1;
        assert!(config.validate().is_err());

        config.report.preview_rows = 3;
        config.output.file_stem = Some("../escape/me".to_string());
        assert!(config.validate().is_err());

        config.output.file_stem = None;
        config.input.delimiter = Some("ab".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_locale_is_rejected() {
        let err = ReportConfig::from_toml_str("[report]\nlocale = \"fr\"\n").unwrap_err();
        assert!(matches!(err, ReportError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[input]\npath = \"from-file.csv\"\n")
            .unwrap();

        let config = ReportConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.input_path(), "from-file.csv");
    }

    #[test]
    fn test_missing_config_file() {
        let err = ReportConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ReportError::ConfigError { .. }));
    }
}
