use clap::Parser;
use toggl_rounder::utils::{logger, validation::Validate};
use toggl_rounder::{
    CliConfig, CsvPipeline, LocalStorage, RoundingEngine, Settings, TogglClient, TogglPipeline,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::info!("Starting toggl-rounder");

    let settings = match Settings::resolve(cli) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Failed to resolve configuration: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    if settings.verbose {
        tracing::debug!("Resolved settings: {:?}", settings);
    }

    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let result = match settings.input.clone() {
        Some(input) => {
            let storage = LocalStorage::new(".".to_string());
            let pipeline = CsvPipeline::new(storage, settings, input);
            RoundingEngine::new(pipeline).run().await
        }
        None => {
            let client = match TogglClient::from_env(&settings.api_endpoint) {
                Ok(client) => client,
                Err(e) => {
                    tracing::error!("❌ {}", e);
                    eprintln!("❌ {}", e.user_friendly_message());
                    std::process::exit(1);
                }
            };
            let pipeline = TogglPipeline::new(client, settings);
            RoundingEngine::new(pipeline).run().await
        }
    };

    match result {
        Ok(summary) => {
            tracing::info!("✅ Rounding completed successfully: {}", summary);
            println!("✅ Rounding completed successfully!");
            println!("📁 {}", summary);
        }
        Err(e) => {
            tracing::error!("❌ Rounding failed: {}", e);
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    }

    Ok(())
}
