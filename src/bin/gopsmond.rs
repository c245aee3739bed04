//! gopsmond - Go runtime metrics forwarder.
//!
//! Polls `gops memstats` and `gops stats` for one Go process at a fixed
//! interval and writes the values to InfluxDB. Exits with status 0 once the
//! process is gone, and with status 2 on an unexpected collection failure.

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(not(target_os = "linux"))]
use gopsmon::collector::PsLiveness;
use gopsmon::collector::{Collector, GopsCli};
#[cfg(target_os = "linux")]
use gopsmon::collector::{ProcfsLiveness, RealFs};
use gopsmon::config::{
    Config, DEFAULT_INTERVAL, DEFAULT_WRITE_TIMEOUT, SinkTarget, format_interval, parse_interval,
    parse_pid,
};
use gopsmon::daemon::{CollectionLoop, DaemonError, LoopSummary};
use gopsmon::sink::{InfluxSink, LogSink, Sink};
use gopsmon::util::local_hostname;

/// Exit status for fatal errors.
const EXIT_FAILURE: u8 = 2;

/// Go runtime metrics forwarder.
#[derive(Parser, Debug)]
#[command(
    name = "gopsmond",
    about = "Forwards gops memstats/stats of a Go process to InfluxDB",
    version
)]
struct Args {
    /// Target Go process id.
    #[arg(short, long, value_parser = parse_pid)]
    pid: u32,

    /// InfluxDB server address (host:port).
    #[arg(long, required_unless_present = "dry_run")]
    host: Option<String>,

    /// InfluxDB database name.
    #[arg(long, required_unless_present = "dry_run")]
    db: Option<String>,

    /// Poll interval (e.g. "1s", "500ms", "1m").
    #[arg(short, long, default_value = DEFAULT_INTERVAL, value_parser = parse_interval)]
    interval: Duration,

    /// Timeout for one InfluxDB write.
    #[arg(long, default_value = DEFAULT_WRITE_TIMEOUT, value_parser = parse_interval)]
    write_timeout: Duration,

    /// gops executable name or path.
    #[arg(long, default_value = "gops")]
    gops_bin: String,

    /// Log points instead of writing them to InfluxDB.
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn into_config(self) -> Config {
        let sink = match (self.dry_run, self.host, self.db) {
            (false, Some(host), Some(database)) => SinkTarget::Influx { host, database },
            // clap enforces host and db unless --dry-run is given
            _ => SinkTarget::Log,
        };
        Config {
            pid: self.pid,
            sink,
            interval: self.interval,
            write_timeout: self.write_timeout,
            gops_bin: self.gops_bin,
        }
    }
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["gopsmond", "gopsmon"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Builds the collector for the configured process and runs the loop.
fn run<K: Sink>(
    config: &Config,
    hostname: &str,
    sink: K,
    running: Arc<AtomicBool>,
) -> Result<LoopSummary, DaemonError> {
    let collector = Collector::new(GopsCli::new(&config.gops_bin), config.pid, hostname);

    #[cfg(target_os = "linux")]
    let liveness = ProcfsLiveness::new(RealFs::new(), "/proc");
    #[cfg(not(target_os = "linux"))]
    let liveness = PsLiveness;

    CollectionLoop::new(collector, liveness, sink, config.interval)
        .with_shutdown_flag(running)
        .run()
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);
    let config = args.into_config();

    info!("gopsmond {} starting", env!("CARGO_PKG_VERSION"));
    let hostname = local_hostname();
    if hostname.is_empty() {
        warn!("Could not resolve host name, points will have no host tag");
    }
    info!(
        "Config: pid={}, interval={}, gops={}, host_tag={}",
        config.pid,
        format_interval(config.interval),
        config.gops_bin,
        hostname
    );

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let result = match &config.sink {
        SinkTarget::Influx { host, database } => {
            match InfluxSink::new(host, database, config.write_timeout) {
                Ok(sink) => {
                    info!("Writing to {} (db={})", sink.url(), database);
                    run(&config, &hostname, sink, running)
                }
                Err(e) => {
                    error!("Failed to create InfluxDB client: {}", e);
                    return ExitCode::from(EXIT_FAILURE);
                }
            }
        }
        SinkTarget::Log => {
            info!("Dry run: points are logged, not written");
            run(&config, &hostname, LogSink::new(), running)
        }
    };

    match result {
        Ok(_) => {
            info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
