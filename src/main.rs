use anyhow::Context;
use clap::Parser;
use jobmatch_etl::config::toml_config::FileConfig;
use jobmatch_etl::utils::{logger, validation::Validate};
use jobmatch_etl::{AggregateArgs, AggregatePipeline, EtlEngine, LocalStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = AggregateArgs::parse();

    logger::init(args.verbose, args.log_json);
    tracing::info!("Starting jobmatch-etl");

    let file_config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            Some(FileConfig::from_file(path).with_context(|| format!("loading {}", path))?)
        }
        None => None,
    };

    let config = args.resolve(file_config.as_ref());
    tracing::debug!("Aggregate config: {:?}", config);

    let validation = match &file_config {
        Some(file) => file.validate().and_then(|_| config.validate()),
        None => config.validate(),
    };
    if let Err(e) = validation {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code().max(1));
    }

    let monitor_enabled = config.monitor;
    let data = LocalStorage::new(config.data_dir.clone());
    let output = LocalStorage::new(config.output_dir.clone());
    let pipeline = AggregatePipeline::new(data, output, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Aggregation completed successfully!");
            println!("✅ Aggregation completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Aggregation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
