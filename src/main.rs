use clap::Parser;
use slotwise::cli::Cli;
use slotwise::config::{AppConfig, LoggingConfig};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config)?;
    if let Err(errors) = config.validate() {
        anyhow::bail!("invalid configuration:\n  {}", errors.join("\n  "));
    }

    let _log_guard = if cli.json {
        init_logging_simple();
        None
    } else {
        init_logging(&config.logging)
    };
    debug!("Loaded config from {}", cli.config.display());

    cli.run(&config)
}

/// Console logging to stderr, plus a daily rolling file when `SLOTWISE_LOG_DIR` is set.
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,slotwise={}", logging.level)));

    // `rolling::daily` panics if it cannot create the first file, so check writability first.
    let log_dir = std::env::var("SLOTWISE_LOG_DIR").ok();
    let mut guard = None;
    let file_layer = log_dir.as_deref().and_then(|dir| {
        let write_check = std::path::Path::new(dir).join(".slotwise_write_test");
        let writable = std::fs::create_dir_all(dir).is_ok()
            && std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&write_check)
                .is_ok();
        if !writable {
            eprintln!("Warning: Could not write to log directory {dir}, file logging disabled");
            return None;
        }
        let _ = std::fs::remove_file(&write_check);

        let file_appender = tracing_appender::rolling::daily(dir, "slotwise.log");
        let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(file_guard);

        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
    });

    let plain_layer = (!logging.json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
    });
    let json_layer = logging.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(plain_layer)
        .with(json_layer)
        .with(file_layer)
        .init();

    guard
}

fn init_logging_simple() {
    // Keep stdout clean for machine-readable output
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .try_init();
}
