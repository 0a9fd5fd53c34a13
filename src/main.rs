use clap::Parser;
use customer_report::core::ConfigProvider;
use customer_report::utils::{logger, validation::Validate};
use customer_report::{CliConfig, LocalStorage, ReportEngine, ReportError, ReportPipeline};

fn fail(e: &ReportError, prefix: &str, suggestion: &str) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}: {}", prefix, e.user_friendly_message());
    eprintln!("💡 {}: {}", suggestion, e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI flags: {:?}", cli);

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            let labels = cli.labels();
            fail(&e, labels.analysis_failed, labels.suggestion)
        }
    };
    let labels = config.locale().labels();

    if let Err(e) = config.validate() {
        fail(&e, labels.analysis_failed, labels.suggestion);
    }
    tracing::info!(
        "✅ Configuration loaded: input={}, output={}, locale={}, formats={:?}",
        config.input_path(),
        config.output_path(),
        config.locale(),
        config.output_formats()
    );

    let preview_rows = config.preview_rows();
    let input = LocalStorage::working_dir();
    let output = LocalStorage::new(config.output_path().to_string());
    let pipeline = ReportPipeline::new(input, output, config);
    let engine = ReportEngine::new(pipeline).with_preview_rows(preview_rows);

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be analysed or written");
        match engine.preview_only().await {
            Ok(summary) => {
                println!("{}", labels.input_preview_title);
                println!("{}", summary.input_preview);
            }
            Err(e) => fail(&e, labels.analysis_failed, labels.suggestion),
        }
        return Ok(());
    }

    match engine.run().await {
        Ok(summary) => {
            println!("{}", labels.input_preview_title);
            println!("{}", summary.input_preview);
            println!("✅ {}", labels.analysis_completed);
            if let Some(result_preview) = &summary.result_preview {
                println!("{}", labels.result_preview_title);
                println!("{}", result_preview);
            }
            for path in &summary.output_paths {
                println!("📁 {}: {}", labels.saved_to, path);
            }
        }
        Err(e) => fail(&e, labels.analysis_failed, labels.suggestion),
    }

    Ok(())
}
