use anyhow::Context;
use clap::Parser;
use jobmatch_etl::config::toml_config::FileConfig;
use jobmatch_etl::utils::monitor::SystemMonitor;
use jobmatch_etl::utils::{logger, validation::Validate};
use jobmatch_etl::{HarvestArgs, LocalStorage, MmaRegistrySource, PageFetchScheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = HarvestArgs::parse();

    logger::init(args.verbose, args.log_json);

    let file_config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            Some(FileConfig::from_file(path).with_context(|| format!("loading {}", path))?)
        }
        None => None,
    };

    let config = args.resolve(file_config.as_ref());

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

    tracing::info!(
        "[Scheduler] Starting registry harvest with {} concurrent pages for max {} pages",
        config.concurrency,
        config.pages
    );

    let source = MmaRegistrySource::new(config.source_config())
        .context("building HTTP client for the registry")?;
    let storage = LocalStorage::new(config.data_dir.clone());
    let scheduler = PageFetchScheduler::new(source, storage, config.scheduler_config())
        .with_monitor(SystemMonitor::new(config.monitor));

    match scheduler.run().await {
        Ok(result) => {
            println!(
                "✅ Saved {} companies to {}/{}",
                result.companies.len(),
                config.data_dir,
                config.output_file
            );
            if result.failed_pages > 0 {
                println!("⚠️ {} page(s) failed and were skipped", result.failed_pages);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Harvest failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code().max(1));
        }
    }

    Ok(())
}
