use atl06_ib::config::toml_config::RunConfig;
use atl06_ib::utils::{logger, validation::Validate};
use atl06_ib::{Atl06Pipeline, IbEngine, LocalStorage};
use clap::Parser;

#[derive(Parser)]
#[command(name = "toml-ib")]
#[command(about = "Inverse-barometer correction tool with TOML configuration support")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "ib-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the clobber setting from config
    #[arg(long)]
    clobber: Option<bool>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based correction tool");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match RunConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Some(clobber) = args.clobber {
        config.run.clobber = Some(clobber);
        tracing::info!("🔧 Clobber overridden to: {}", clobber);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config);

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.data.directory.clone());
    let pipeline = Atl06Pipeline::new(storage, config);

    let engine = IbEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Correction completed successfully!");
            tracing::info!("📁 Output saved to: {}", output_path);
            println!("✅ Correction completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Correction failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                atl06_ib::utils::error::ErrorSeverity::Low => 0,
                atl06_ib::utils::error::ErrorSeverity::Medium => 2,
                atl06_ib::utils::error::ErrorSeverity::High => 1,
                atl06_ib::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &RunConfig) {
    use atl06_ib::domain::ports::ConfigProvider;

    println!("📋 Configuration Summary:");
    println!("  Granule: {}", config.granule());
    println!("  Data directory: {}", config.data_directory());
    println!("  Reanalysis: {}", config.reanalysis());
    println!("  Density: {} kg/m³", config.density());

    if let Some((first, last)) = config.mean_range() {
        println!("  Mean period: {}-{}", first, last);
    }
    if let Some(endpoint) = config.endpoint() {
        println!("  Endpoint: {}", endpoint);
    }

    println!();
}
