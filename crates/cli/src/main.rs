mod config;
mod serve;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use storewatch_detect::DetectorOptions;
use storewatch_notify::{Composer, DeliveryError, DeliverySink, SlackWebhookSink, StdoutSink};
use storewatch_scheduler::{Scheduler, SchedulerConfig, SchedulerError};
use storewatch_source::ConfigurationError;
use storewatch_storage::{FileStateStore, StateStore, StorageError};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Watches App Store Connect and Google Play for release status changes
/// and posts them to Slack.
#[derive(Parser)]
#[command(
    name = "storewatch",
    version,
    about = "Watches App Store and Play Store releases and posts status changes to Slack"
)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(long)]
    debug: bool,

    /// Print notifications to stdout instead of posting them
    #[arg(long)]
    dry_run: bool,

    /// State file path (overrides STOREWATCH_STATE_FILE)
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Serve /health and /status on this port
    #[arg(long)]
    status_port: Option<u16>,
}

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigurationError),

    #[error("invalid Slack webhook: {0}")]
    Webhook(#[from] DeliveryError),

    #[error("cannot open state file: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("cannot bind status port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot start runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => exit_with(StartupError::Runtime(e)),
    };
    if let Err(e) = runtime.block_on(run(cli)) {
        exit_with(e);
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_with(error: StartupError) -> ! {
    tracing::error!(error = %error, "startup failed");
    eprintln!("error: {error}");
    process::exit(1);
}

async fn run(cli: Cli) -> Result<(), StartupError> {
    let mut config = Config::from_env()?;
    if let Some(path) = cli.state_file {
        config.state_file = path;
    }

    let sink: Arc<dyn DeliverySink> = if cli.dry_run {
        tracing::info!("dry run: notifications go to stdout");
        Arc::new(StdoutSink)
    } else {
        let url = config
            .slack_webhook_url
            .clone()
            .ok_or_else(|| ConfigurationError::Missing {
                name: "SLACK_WEBHOOK_URL".to_string(),
            })?;
        let slack = SlackWebhookSink::new(url, config.slack_channel.clone());
        slack.validate_url()?;
        Arc::new(slack)
    };

    let store: Arc<dyn StateStore> = Arc::new(FileStateStore::open(&config.state_file).await?);
    tracing::info!(path = %config.state_file.display(), "state store opened");

    let mut composer = Composer::new();
    if let Some(channel) = &config.slack_channel {
        composer = composer.with_channel(channel.clone());
    }

    let mut builder = Scheduler::builder(store, sink)
        .composer(composer)
        .detector_options(DetectorOptions {
            number_of_builds: config.number_of_builds,
            app_name_override: config.app_name.clone(),
        })
        .config(SchedulerConfig {
            poll_interval: config.poll_interval,
            ..SchedulerConfig::default()
        });
    for platform in &config.platforms {
        builder = builder.source(platform.build_source());
    }
    let scheduler = builder.build()?;
    scheduler.start().await?;
    tracing::info!(
        platforms = ?config.enabled_platforms(),
        interval_secs = config.poll_interval.as_secs(),
        "storewatch started"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let server = match cli.status_port {
        Some(port) => {
            let listener = match serve::bind(port).await {
                Ok(listener) => listener,
                Err(source) => {
                    scheduler.stop().await;
                    return Err(StartupError::Bind { port, source });
                }
            };
            let scheduler = scheduler.clone();
            Some(tokio::spawn(async move {
                if let Err(e) = serve::serve(listener, scheduler, shutdown_rx).await {
                    tracing::error!(error = %e, "status endpoint failed");
                }
            }))
        }
        None => None,
    };

    wait_for_shutdown(&scheduler).await;

    scheduler.stop().await;
    let _ = shutdown_tx.send(true);
    if let Some(handle) = server {
        let _ = handle.await;
    }
    tracing::info!("storewatch stopped");
    Ok(())
}

/// Block until SIGINT or SIGTERM. SIGUSR2 logs a health report and keeps going.
#[cfg(unix)]
async fn wait_for_shutdown(scheduler: &Scheduler) {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut term, mut usr2) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::user_defined2()),
    ) {
        (Ok(term), Ok(usr2)) => (term, usr2),
        _ => {
            tracing::warn!("signal handlers unavailable, waiting for ctrl-c only");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = term.recv() => break,
            _ = usr2.recv() => log_health(scheduler).await,
        }
    }
    tracing::info!("shutdown signal received");
}

#[cfg(not(unix))]
async fn wait_for_shutdown(_scheduler: &Scheduler) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

#[cfg(unix)]
async fn log_health(scheduler: &Scheduler) {
    let report = scheduler.health().await;
    match serde_json::to_string(&report) {
        Ok(json) => tracing::info!(healthy = report.healthy, report = %json, "health check"),
        Err(e) => tracing::warn!(error = %e, "cannot encode health report"),
    }
}
