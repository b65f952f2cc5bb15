//! Command-line interface definitions.
//!
//! Every setting can come from a flag or an environment variable (a `.env`
//! file in the working directory is loaded first); a flag wins over the
//! environment. Flags accept both spellings, e.g. `--fetch_timeout` and
//! `--FETCH_TIMEOUT`.

use crate::worker::Timeouts;
use clap::{Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments shared by both entry points.
///
/// # Examples
///
/// ```sh
/// # Analyze two articles and print the results
/// jaundice_rate batch https://inosmi.ru/a.html https://inosmi.ru/b.html
///
/// # Tighter deadlines, JSON report on disk
/// jaundice_rate --fetch_timeout 5 --analysis_timeout 1 batch -j ./reports https://inosmi.ru/a.html
///
/// # Serve on port 8000
/// SERVER_PORT=8000 jaundice_rate serve
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Deadline for downloading one article, in seconds
    #[arg(
        long = "fetch_timeout",
        alias = "FETCH_TIMEOUT",
        env = "FETCH_TIMEOUT",
        default_value = "10",
        value_parser = parse_seconds,
        global = true
    )]
    pub fetch_timeout: Duration,

    /// Deadline for scoring one article, in seconds
    #[arg(
        long = "analysis_timeout",
        alias = "ANALYSIS_TIMEOUT",
        env = "ANALYSIS_TIMEOUT",
        default_value = "3",
        value_parser = parse_seconds,
        global = true
    )]
    pub analysis_timeout: Duration,

    /// Path to the charged-words dictionary
    #[arg(
        long = "charged_words_path",
        alias = "CHARGED_WORDS_PATH",
        env = "CHARGED_WORDS_PATH",
        default_value = "./dicts/negative_words.txt",
        global = true
    )]
    pub charged_words_path: PathBuf,

    /// Optional path to an analyzer config YAML file
    #[arg(short, long, env = "ANALYZER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a list of articles once and print the results
    Batch {
        /// Article URLs; falls back to `urls` from the config file
        urls: Vec<String>,

        /// Output directory for a JSON report of the run
        #[arg(short, long)]
        json_output_dir: Option<String>,
    },

    /// Serve article analysis over HTTP
    Serve {
        /// Address to bind
        #[arg(
            long = "server_host",
            alias = "SERVER_HOST",
            env = "SERVER_HOST",
            default_value = "0.0.0.0"
        )]
        server_host: IpAddr,

        /// Port to bind
        #[arg(
            long = "server_port",
            alias = "SERVER_PORT",
            env = "SERVER_PORT",
            default_value_t = 8080
        )]
        server_port: u16,
    },
}

impl Cli {
    pub fn timeouts(&self) -> Timeouts {
        Timeouts::new(self.fetch_timeout, self.analysis_timeout)
    }
}

/// Parse a non-negative, finite number of seconds.
fn parse_seconds(raw: &str) -> Result<Duration, String> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("`{raw}` is not a number of seconds: {e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("`{raw}` is not a valid duration: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_defaults() {
        let cli = Cli::try_parse_from(["jaundice_rate", "batch", "https://inosmi.ru/a.html"]).unwrap();
        // Defaults apply unless the environment sets them.
        if std::env::var_os("FETCH_TIMEOUT").is_none() {
            assert_eq!(cli.fetch_timeout, Duration::from_secs(10));
        }
        if std::env::var_os("ANALYSIS_TIMEOUT").is_none() {
            assert_eq!(cli.analysis_timeout, Duration::from_secs(3));
        }
        match cli.command {
            Command::Batch { urls, json_output_dir } => {
                assert_eq!(urls, vec!["https://inosmi.ru/a.html"]);
                assert_eq!(json_output_dir, None);
            }
            Command::Serve { .. } => panic!("expected batch"),
        }
    }

    #[test]
    fn test_both_flag_spellings() {
        let cli = Cli::try_parse_from([
            "jaundice_rate",
            "--fetch_timeout",
            "0",
            "--ANALYSIS_TIMEOUT",
            "1.5",
            "--CHARGED_WORDS_PATH",
            "/tmp/words.txt",
            "batch",
        ])
        .unwrap();
        assert_eq!(cli.fetch_timeout, Duration::ZERO);
        assert_eq!(cli.analysis_timeout, Duration::from_millis(1500));
        assert_eq!(cli.charged_words_path, PathBuf::from("/tmp/words.txt"));
        assert_eq!(cli.timeouts(), Timeouts::new(Duration::ZERO, Duration::from_millis(1500)));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["jaundice_rate", "batch", "--fetch_timeout", "2", "u"]).unwrap();
        assert_eq!(cli.fetch_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_serve_address() {
        let cli = Cli::try_parse_from([
            "jaundice_rate",
            "serve",
            "--server_host",
            "127.0.0.1",
            "--SERVER_PORT",
            "8000",
        ])
        .unwrap();
        match cli.command {
            Command::Serve {
                server_host,
                server_port,
            } => {
                assert_eq!(server_host, "127.0.0.1".parse::<IpAddr>().unwrap());
                assert_eq!(server_port, 8000);
            }
            Command::Batch { .. } => panic!("expected serve"),
        }
    }

    #[test]
    fn test_rejects_negative_timeout() {
        assert!(Cli::try_parse_from(["jaundice_rate", "--fetch_timeout", "-1", "batch"]).is_err());
        assert!(Cli::try_parse_from(["jaundice_rate", "--analysis_timeout", "soon", "batch"]).is_err());
    }

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("3"), Ok(Duration::from_secs(3)));
        assert_eq!(parse_seconds("0.25"), Ok(Duration::from_millis(250)));
        assert!(parse_seconds("NaN").is_err());
    }
}
