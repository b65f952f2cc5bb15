use chrono::Local;
use clap::Parser;
use jaundice_rate::cli::{Cli, Command};
use jaundice_rate::config::AnalyzerConfig;
use jaundice_rate::fetch::HttpFetcher;
use jaundice_rate::models::RunReport;
use jaundice_rate::outputs::json;
use jaundice_rate::server::{AppState, start_server};
use jaundice_rate::utils::ensure_writable_dir;
use jaundice_rate::{Analyzer, Error, Timeouts};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = dotenvy::dotenv();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => return Err(e.into()),
    }

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = AnalyzerConfig::load(args.config.as_deref())?;
    let fetcher = Arc::new(HttpFetcher::with_defaults()?);
    let analyzer = Analyzer::from_config(&config, &args.charged_words_path, fetcher).await?;
    let timeouts = args.timeouts();

    match args.command {
        Command::Serve {
            server_host,
            server_port,
        } => {
            let state = AppState {
                analyzer,
                timeouts,
                max_urls: config.max_urls_per_request,
            };
            start_server(state, SocketAddr::new(server_host, server_port)).await?;
        }
        Command::Batch {
            urls,
            json_output_dir,
        } => {
            let urls = if urls.is_empty() { config.urls } else { urls };
            run_batch(&analyzer, &urls, timeouts, json_output_dir.as_deref()).await?;
        }
    }
    Ok(())
}

#[instrument(level = "info", skip_all, fields(urls = urls.len()))]
async fn run_batch(
    analyzer: &Analyzer,
    urls: &[String],
    timeouts: Timeouts,
    json_output_dir: Option<&str>,
) -> Result<(), Error> {
    if urls.is_empty() {
        return Err(Error::NoUrls);
    }

    // Fail before any network work if the report cannot be written.
    if let Some(dir) = json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "JSON output directory is not writable");
            return Err(e);
        }
    }

    let results = analyzer.process(urls, timeouts).await;

    for result in &results {
        println!("\n{result}");
        info!(
            url = %result.url(),
            "Analysis finished in {:.2} sec",
            result.analysis_duration().as_secs_f64()
        );
    }

    if let Some(dir) = json_output_dir {
        let report = RunReport::new(results, Local::now());
        json::write_report(&report, dir).await?;
    }
    Ok(())
}
