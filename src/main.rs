//! fetchpulse CLI entry point

use anyhow::{Context, Result};
use fetchpulse::config::{cli, cli::Cli, validator, RunConfig};
use fetchpulse::controller::{RunOutcome, StopController};
use fetchpulse::executor::RequestExecutor;
use fetchpulse::output;
use fetchpulse::sink::{self, ResultSink};
use fetchpulse::stats::RunSummary;
use fetchpulse::target::TargetQueue;
use fetchpulse::transport::{HttpTransport, Transport};
use fetchpulse::worker::pool::WorkerPool;
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);

    println!("fetchpulse v{}", env!("CARGO_PKG_VERSION"));
    println!("Concurrent HTTP retrieval load generator");
    println!();

    // Resolve and validate configuration before anything runs
    let config = cli.run_config()?;
    validator::validate_config(&config).context("Configuration validation failed")?;

    let raw_targets = cli::load_targets(&cli.targets)?;
    let queue = TargetQueue::load(raw_targets).materialize(config.randomize);
    validator::validate_targets(queue.targets()).context("Target validation failed")?;

    println!("Configuration: {}", config);
    println!("Targets:       {} URI(s) from {}", queue.len(), cli.targets.display());
    println!("Result sink:   {}", cli.sink.display());

    if cli.dry_run {
        println!();
        println!("Dry run mode - configuration validated successfully");
        return Ok(());
    }

    println!();
    println!("Starting run...");
    println!();

    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    let (summary, outcome) = runtime.block_on(run(&cli, config, queue))?;

    output::text::print_summary(&summary, &outcome);
    if let Some(path) = &cli.csv_output {
        output::csv::write_summary(path, &summary)?;
        println!();
        println!("CSV summary written to {}", path.display());
    }
    if let Some(path) = &cli.json_output {
        output::json::write_summary(path, &summary)?;
        println!("JSON summary written to {}", path.display());
    }

    Ok(())
}

/// Execute one supervised run and aggregate its results.
async fn run(cli: &Cli, config: RunConfig, queue: TargetQueue) -> Result<(RunSummary, RunOutcome)> {
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(cli.token.clone())?);
    let sink = Arc::new(ResultSink::create(&cli.sink)?);
    let executor = Arc::new(RequestExecutor::new(transport, &config));

    let pool = WorkerPool::start(
        config.parallelism,
        Arc::new(queue),
        executor,
        Arc::clone(&sink),
    );
    let controller = StopController::new(&config).with_live(!cli.no_live);
    let outcome = controller.supervise(pool, &sink).await;

    tracing::info!(
        visits = outcome.visits,
        elapsed_secs = outcome.elapsed.as_secs_f64(),
        "run complete, aggregating results"
    );

    let records = sink::read_records(&cli.sink)?;
    let summary = RunSummary::from_records(&records, outcome.elapsed)
        .context("Failed to summarize run results")?;

    Ok((summary, outcome))
}

fn init_tracing(debug: bool) {
    use tracing_subscriber::EnvFilter;

    let default_filter = if debug { "fetchpulse=debug" } else { "fetchpulse=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}
