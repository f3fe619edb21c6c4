use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

use feedgather::{Config, FallbackTime, FeedReader};

#[derive(Parser, Debug)]
#[command(name = "feedgather", about = "Fetch RSS feeds concurrently and print their items as JSON lines")]
struct Args {
    /// Feed URLs to fetch
    #[arg(required = true, value_name = "URL")]
    urls: Vec<String>,

    /// TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Drop items without a publish date instead of stamping them with the current time
    #[arg(long)]
    no_fallback: bool,

    /// Print per-feed failures to stderr
    #[arg(long)]
    report: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    let mut reader = FeedReader::new(config);
    if !args.no_fallback {
        reader = reader.with_fallback_time(FallbackTime::now());
    }

    let reports = reader.parse_detailed(&args.urls).await;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut total = 0usize;
    for report in reports {
        match report.result {
            Ok(items) => {
                for item in &items {
                    serde_json::to_writer(&mut out, item).context("Failed to encode item")?;
                    writeln!(out).context("Failed to write output")?;
                }
                total += items.len();
            }
            Err(e) => {
                tracing::debug!(url = %report.url, error = %e, "Feed contributed no items");
                if args.report {
                    eprintln!("{}: {}", report.url, e);
                }
            }
        }
    }

    tracing::info!(feeds = args.urls.len(), items = total, "Done");
    Ok(())
}
