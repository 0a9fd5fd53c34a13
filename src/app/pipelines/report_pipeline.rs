use crate::config::locale::Locale;
use crate::core::aggregate::compute_report;
use crate::core::decode::{decode_table, decode_table_with_delimiter};
use crate::core::export::{report_to_csv, report_to_json, report_to_xlsx};
use crate::core::{ConfigProvider, InputTable, OutputFormat, Pipeline, Report, Storage};
use crate::utils::error::Result;

/// Reads one export, aggregates it per customer and writes the configured formats.
pub struct ReportPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) input: S,
    pub(crate) output: S,
    pub(crate) config: C,
}

impl<S: Storage, C: ConfigProvider> ReportPipeline<S, C> {
    pub fn new(input: S, output: S, config: C) -> Self {
        Self {
            input,
            output,
            config,
        }
    }

    /// Removes files written earlier in a failed `load`, so a run leaves all formats or none.
    async fn discard(&self, names: &[String]) {
        for name in names {
            match self.output.remove_file(name).await {
                Ok(()) => tracing::warn!("🧹 Removed partial output {}", name),
                Err(e) => tracing::error!("Could not remove partial output {}: {}", name, e),
            }
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ReportPipeline<S, C> {
    async fn extract(&self) -> Result<InputTable> {
        tracing::debug!("Reading input file: {}", self.config.input_path());
        let bytes = self.input.read_file(self.config.input_path()).await?;
        tracing::debug!("Read {} bytes", bytes.len());

        match self.config.delimiter() {
            Some(delimiter) => decode_table_with_delimiter(&bytes, delimiter),
            None => decode_table(&bytes),
        }
    }

    async fn transform(&self, table: &InputTable) -> Result<Report> {
        compute_report(table, self.config.ordering())
    }

    async fn load(&self, report: &Report) -> Result<Vec<String>> {
        let labels = self.config.locale().labels();
        let created = chrono::Utc::now();
        let stem = self.config.file_stem();

        // Encode every format before writing anything.
        let mut documents = Vec::new();
        for format in self.config.output_formats() {
            let bytes = match format {
                OutputFormat::Xlsx => report_to_xlsx(report, labels, created)?,
                OutputFormat::Csv => report_to_csv(report, labels)?,
                OutputFormat::Json => report_to_json(report, created)?,
            };
            documents.push((format!("{}.{}", stem, format.extension()), bytes));
        }

        let mut names = Vec::with_capacity(documents.len());
        let mut written = Vec::with_capacity(documents.len());
        for (name, bytes) in documents {
            tracing::debug!("Writing {} ({} bytes)", name, bytes.len());
            match self.output.write_file(&name, &bytes).await {
                Ok(path) => {
                    written.push(path);
                    names.push(name);
                }
                Err(e) => {
                    self.discard(&names).await;
                    return Err(e);
                }
            }
        }
        Ok(written)
    }

    fn locale(&self) -> Locale {
        self.config.locale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RowOrdering;
    use crate::utils::error::ReportError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        fail_on_write: Option<String>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
                fail_on_write: None,
            }
        }

        fn failing_on(path: &str) -> Self {
            Self {
                fail_on_write: Some(path.to_string()),
                ..Self::new()
            }
        }

        async fn put_file(&self, path: &str, data: &[u8]) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                ReportError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
            if self.fail_on_write.as_deref() == Some(path) {
                return Err(ReportError::IoError(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("No space left for {}", path),
                )));
            }
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(path.to_string())
        }

        async fn remove_file(&self, path: &str) -> Result<()> {
            let mut files = self.files.lock().await;
            files.remove(path);
            Ok(())
        }
    }

    struct MockConfig {
        formats: Vec<OutputFormat>,
        locale: Locale,
        delimiter: Option<u8>,
    }

    impl MockConfig {
        fn new(formats: Vec<OutputFormat>) -> Self {
            Self {
                formats,
                locale: Locale::En,
                delimiter: None,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_path(&self) -> &str {
            "export.csv"
        }

        fn output_path(&self) -> &str {
            "out"
        }

        fn locale(&self) -> Locale {
            self.locale
        }

        fn output_formats(&self) -> &[OutputFormat] {
            &self.formats
        }

        fn preview_rows(&self) -> usize {
            5
        }

        fn ordering(&self) -> RowOrdering {
            RowOrdering::FirstSeen
        }

        fn delimiter(&self) -> Option<u8> {
            self.delimiter
        }
    }

    const EXPORT: &str = "\
Datum;Auftrag;Art;Paket;Gewicht;Zone;Betrag;Land;Name;Pfad
01.03.2024;A1;Std;P1;1,2;1;100,00;DE;Meier;/srv/FF/1001/pkgA/l.pdf
01.03.2024;A2;Std;P2;0,8;1;50,00;DE;Meier;/srv/FF/1001/pkgA/l.pdf
02.03.2024;A3;Exp;P3;3,0;2;20,00;AT;Huber;/srv/archive/l.pdf
";

    #[tokio::test]
    async fn test_extract_and_transform() {
        let storage = MockStorage::new();
        storage.put_file("export.csv", EXPORT.as_bytes()).await;
        let pipeline = ReportPipeline::new(
            storage.clone(),
            storage,
            MockConfig::new(vec![OutputFormat::Xlsx]),
        );

        let table = pipeline.extract().await.unwrap();
        assert_eq!(table.len(), 3);

        let report = pipeline.transform(&table).await.unwrap();
        assert_eq!(report.summaries.len(), 1);
        assert_eq!(report.summaries[0].customer_number, "1001");
        assert_eq!(report.excluded_rows, 1);
        assert!((report.summaries[0].total_with_surcharges - 189.75).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_load_writes_every_format() {
        let storage = MockStorage::new();
        storage.put_file("export.csv", EXPORT.as_bytes()).await;
        let mut config = MockConfig::new(vec![OutputFormat::Xlsx, OutputFormat::Csv, OutputFormat::Json]);
        config.locale = Locale::De;
        let pipeline = ReportPipeline::new(storage.clone(), storage.clone(), config);

        let table = pipeline.extract().await.unwrap();
        let report = pipeline.transform(&table).await.unwrap();
        let written = pipeline.load(&report).await.unwrap();

        assert_eq!(
            written,
            vec![
                "bericht_pro_kunde.xlsx".to_string(),
                "bericht_pro_kunde.csv".to_string(),
                "bericht_pro_kunde.json".to_string(),
            ]
        );
        let csv = storage.get_file("bericht_pro_kunde.csv").await.unwrap();
        assert!(String::from_utf8(csv).unwrap().starts_with("Kundennummer;Pakete"));
    }

    #[tokio::test]
    async fn test_failed_write_removes_earlier_outputs() {
        let input = MockStorage::new();
        input.put_file("export.csv", EXPORT.as_bytes()).await;
        let output = MockStorage::failing_on("report_per_customer.csv");
        let pipeline = ReportPipeline::new(
            input,
            output.clone(),
            MockConfig::new(vec![OutputFormat::Xlsx, OutputFormat::Csv, OutputFormat::Json]),
        );

        let table = pipeline.extract().await.unwrap();
        let report = pipeline.transform(&table).await.unwrap();
        let err = pipeline.load(&report).await.unwrap_err();

        assert!(matches!(err, ReportError::IoError(_)));
        assert!(output.get_file("report_per_customer.xlsx").await.is_none());
        assert!(output.get_file("report_per_customer.json").await.is_none());
        assert!(output.files.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_input_file() {
        let storage = MockStorage::new();
        let pipeline = ReportPipeline::new(
            storage.clone(),
            storage,
            MockConfig::new(vec![OutputFormat::Xlsx]),
        );

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, ReportError::IoError(_)));
    }

    #[tokio::test]
    async fn test_forced_delimiter() {
        let storage = MockStorage::new();
        storage
            .put_file("export.csv", EXPORT.replace(';', "\t").as_bytes())
            .await;
        let mut config = MockConfig::new(vec![OutputFormat::Json]);
        config.delimiter = Some(b'\t');
        let pipeline = ReportPipeline::new(storage.clone(), storage, config);

        let table = pipeline.extract().await.unwrap();
        assert_eq!(table.delimiter, b'\t');
        assert_eq!(table.column_count(), 10);
    }
}
