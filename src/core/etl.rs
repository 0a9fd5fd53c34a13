use crate::core::preview::{render_input_preview, render_report_preview};
use crate::core::Pipeline;
use crate::utils::error::Result;

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub input_rows: usize,
    pub input_preview: String,
    pub result_preview: Option<String>,
    pub customers: usize,
    pub excluded_rows: usize,
    pub output_paths: Vec<String>,
}

pub struct ReportEngine<P: Pipeline> {
    pipeline: P,
    preview_rows: usize,
}

impl<P: Pipeline> ReportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            preview_rows: 5,
        }
    }

    pub fn with_preview_rows(mut self, preview_rows: usize) -> Self {
        self.preview_rows = preview_rows;
        self
    }

    /// Reads the input and renders its preview without analysing it.
    pub async fn preview_only(&self) -> Result<RunSummary> {
        let labels = self.pipeline.locale().labels();
        let table = self.pipeline.extract().await?;
        tracing::info!("📥 Read {} rows, {} columns", table.len(), table.column_count());

        Ok(RunSummary {
            input_rows: table.len(),
            input_preview: render_input_preview(&table, self.preview_rows, labels),
            ..RunSummary::default()
        })
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let labels = self.pipeline.locale().labels();
        tracing::info!("🚀 Starting customer report");

        tracing::info!("📥 Reading input...");
        let table = self.pipeline.extract().await?;
        tracing::info!("📥 Read {} rows, {} columns", table.len(), table.column_count());
        let input_preview = render_input_preview(&table, self.preview_rows, labels);

        tracing::info!("🔧 Aggregating per customer...");
        let report = self.pipeline.transform(&table).await?;
        tracing::info!(
            "🔧 {} customers from {} rows ({} rows without customer number)",
            report.customer_count(),
            report.included_rows,
            report.excluded_rows
        );
        let result_preview = render_report_preview(&report, self.preview_rows, labels);

        tracing::info!("💾 Writing report...");
        let output_paths = self.pipeline.load(&report).await?;
        for path in &output_paths {
            tracing::info!("📁 Output saved to: {}", path);
        }

        Ok(RunSummary {
            input_rows: table.len(),
            input_preview,
            result_preview: Some(result_preview),
            customers: report.customer_count(),
            excluded_rows: report.excluded_rows,
            output_paths,
        })
    }
}
