use anyhow::Context;
use clap::Parser;
use webhook_solver::adapters::{
    build_client, HttpRegistrationClient, HttpSubmissionClient, JsonlSolutionStore,
    MemorySolutionStore,
};
use webhook_solver::config::StorageBackend;
use webhook_solver::core::{Orchestrator, RunReport, RunSettings};
use webhook_solver::domain::ports::SolutionStore;
use webhook_solver::utils::{logger, validation::Validate};
use webhook_solver::{CliConfig, ConfigError, SolverConfig};

fn load_config(path: &str) -> Result<SolverConfig, ConfigError> {
    let config = SolverConfig::from_file(path)?;
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting webhook-solver");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration error: {}", e);
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            std::process::exit(2);
        }
    };

    tracing::info!("✅ Configuration loaded and validated successfully");
    let settings = RunSettings::from(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no network or storage calls will be made");
        perform_dry_run(&config, &settings);
        return Ok(());
    }

    let client = build_client(config.request_timeout(), config.user_agent())
        .context("failed to build HTTP client")?;
    let registrar = HttpRegistrationClient::new(client.clone(), config.registration_url());
    tracing::info!("📡 Registration endpoint: {}", registrar.endpoint());
    let submitter = HttpSubmissionClient::new(client);

    let report = match config.storage_backend() {
        StorageBackend::File => {
            let store = JsonlSolutionStore::new(config.storage_path());
            run(settings, registrar, submitter, store).await
        }
        StorageBackend::Memory => {
            tracing::warn!("⚠️ Memory storage selected; saved solutions are lost on exit");
            run(settings, registrar, submitter, MemorySolutionStore::new()).await
        }
    };

    println!("{}", report.summary());

    // 提交失敗不影響結束碼，只有中止才算失敗
    if report.is_aborted() {
        std::process::exit(1);
    }

    Ok(())
}

async fn run<St: SolutionStore>(
    settings: RunSettings,
    registrar: HttpRegistrationClient,
    submitter: HttpSubmissionClient,
    store: St,
) -> RunReport {
    Orchestrator::new(settings, registrar, submitter, store)
        .run()
        .await
}

fn perform_dry_run(config: &SolverConfig, settings: &RunSettings) {
    println!("🔍 Dry Run Analysis:");
    println!("  Registrant: {} <{}>", settings.request.name, settings.request.email);
    println!("  Identifier: {}", settings.identifier());
    println!("  Registration URL: {}", config.registration_url());

    match config.storage_backend() {
        StorageBackend::File => println!("  Storage: {}", config.storage_path()),
        StorageBackend::Memory => println!("  Storage: in-memory"),
    }

    if let Some(timeout) = config.request_timeout() {
        println!("  Request timeout: {:?}", timeout);
    }

    println!();
    match settings.plan() {
        Ok(plan) => {
            println!("  Parity: {}", plan.parity);
            println!("  Final query: {}", plan.final_query);
            println!();
            println!("✅ Ready to run.");
        }
        Err(e) => {
            println!("  ❌ {}", e);
            println!("  💡 Set queries.odd / queries.even before running for real.");
        }
    }
}
