use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use localscreen_core::config::Config;
use localscreen_host::{serve, Dispatcher, FramedChannel};
use localscreen_model::load_oracle;
use localscreen_text::Normalizer;

/// Native-messaging host: reads length-prefixed JSON requests on stdin and
/// answers each one on stdout.
#[derive(Parser, Debug)]
#[command(name = "localscreen-host", version)]
struct Cli {
    /// Explicit config file (defaults to config.toml + config.<env>.toml in the working directory).
    #[arg(long, env = "LOCALSCREEN_CONFIG")]
    config: Option<PathBuf>,
    /// Override log level (e.g. info, debug, trace).
    #[arg(long)]
    log_level: Option<String>,
    /// Arguments supplied by the browser (caller origin, window handle). Logged, never interpreted.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    caller: Vec<String>,
}

fn init_tracing(level: &str) {
    // stdout carries frames; logs must stay on stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_ansi(false).init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let settings = config.settings()?;
    init_tracing(cli.log_level.as_deref().unwrap_or(&settings.logging.level));
    info!(env = config.env_name(), caller = ?cli.caller, "starting localscreen host");

    let normalizer = Normalizer::from_settings(&settings.normalizer, config.base_dir())?;
    let oracle = load_oracle(&settings, config.base_dir())?;
    let dispatcher = Dispatcher::from_settings(&settings, normalizer, oracle);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut channel =
        FramedChannel::with_max_frame_bytes(stdin.lock(), stdout.lock(), settings.transport.max_frame_bytes);
    let stats = serve(&mut channel, &dispatcher)?;
    info!(requests = stats.requests, failures = stats.failures, "host exiting");
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        // The subscriber may not be installed if config loading failed.
        error!(error = %e, "host failed");
        eprintln!("localscreen-host: {:#}", e);
        std::process::exit(1);
    }
}
