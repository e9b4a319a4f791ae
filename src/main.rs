use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use config::{Config, Environment, File};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use netpulse::{App, FileSource, ProbeSource, StreamSource, Thresholds};

#[derive(Parser, Debug)]
#[command(name = "netpulse")]
#[command(about = "Latency monitor and incident detector for network health probes")]
struct Args {
    /// Path to a JSON-lines file of latency samples to tail
    #[arg(short, long, default_value = "samples.jsonl", conflicts_with = "stdin")]
    file: PathBuf,

    /// Read newline-delimited JSON samples from stdin instead of a file
    #[arg(long)]
    stdin: bool,

    /// Issue threshold in milliseconds (latency strictly above is bad)
    #[arg(long)]
    issue_threshold: Option<f64>,

    /// Outage threshold in milliseconds (latency at or above marks the
    /// opening issue record as an outage)
    #[arg(long)]
    outage_threshold: Option<f64>,

    /// Optional config file with threshold settings (issue_ms, outage_ms)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Poll interval in seconds (file mode)
    #[arg(short, long, default_value = "1")]
    refresh: u64,

    /// Drain the source once, print a JSON report to stdout, and exit
    #[arg(long)]
    once: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let thresholds = load_thresholds(&args)?;

    if args.stdin {
        // The reader task lives on this runtime; keep it alive for the
        // whole session.
        let rt = tokio::runtime::Runtime::new()?;
        let source = rt.block_on(async {
            Box::new(StreamSource::spawn(tokio::io::stdin(), "stdin")) as Box<dyn ProbeSource>
        });
        // A stream has an explicit end, so once mode waits for it.
        run(source, thresholds, Duration::from_millis(100), args.once, true)
    } else {
        let source = Box::new(FileSource::new(&args.file));
        run(
            source,
            thresholds,
            Duration::from_secs(args.refresh),
            args.once,
            false,
        )
    }
}

/// Assemble thresholds from defaults, an optional config file, NETPULSE_*
/// environment variables, and CLI flags. Later layers win.
fn load_thresholds(args: &Args) -> Result<Thresholds> {
    let mut thresholds = Thresholds::default();

    let mut builder = Config::builder();
    if let Some(path) = &args.config {
        builder = builder.add_source(File::from(path.as_path()));
    }
    let cfg = builder
        .add_source(Environment::with_prefix("NETPULSE"))
        .build()?;

    if let Ok(value) = cfg.get_float("issue_ms") {
        thresholds.issue_ms = value;
    }
    if let Ok(value) = cfg.get_float("outage_ms") {
        thresholds.outage_ms = value;
    }

    if let Some(value) = args.issue_threshold {
        thresholds.issue_ms = value;
    }
    if let Some(value) = args.outage_threshold {
        thresholds.outage_ms = value;
    }

    Ok(thresholds)
}

/// Poll the source until it is exhausted (once mode) or goes away.
fn run(
    source: Box<dyn ProbeSource>,
    thresholds: Thresholds,
    refresh: Duration,
    once: bool,
    wait_for_end: bool,
) -> Result<()> {
    let mut app = App::new(source, thresholds);
    info!(source = app.source_description(), "monitoring latency");

    if once {
        loop {
            let ingested = app.reload_data()?;
            if ingested == 0 {
                // File sources have no end marker; an empty poll means
                // everything currently written has been read. Streams end
                // explicitly, so wait for them to say so.
                if !wait_for_end || app.load_error.is_some() {
                    break;
                }
                std::thread::sleep(Duration::from_millis(10));
            }
        }
        return print_report(&app);
    }

    while app.running {
        let ingested = app.reload_data()?;

        if ingested == 0 {
            if let Some(err) = &app.load_error {
                error!(source = app.source_description(), "{}", err);
                break;
            }
        }

        std::thread::sleep(refresh);
    }

    Ok(())
}

/// Print current monitor state as JSON on stdout.
fn print_report(app: &App) -> Result<()> {
    let monitor = &app.monitor;
    let report = serde_json::json!({
        "status": monitor.status(),
        "incidents": monitor.incident_log(),
        "history": monitor.history().iter().collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
