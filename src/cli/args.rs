//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

/// Content-select chapter downloader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "content-select-downloader",
    version,
    about = "Download content-select books as single PDF files",
    long_about = "Queues one job per URL, downloads every chapter of the book(s) found there,\n\
                  and merges the chapters into one PDF per book.\n\n\
                  A URL may point at a book viewer page or at a listing that links to books."
)]
pub struct Args {
    /// Book or listing URL(s) to download.
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,

    /// Output file name for the URL in the same position.
    /// Defaults to the last segment of the URL.
    #[arg(short, long = "name", value_name = "NAME")]
    pub names: Vec<String>,

    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Directory merged PDFs are written to.
    #[arg(short = 'd', long = "directory", env = "CONTENT_SELECT_DIRECTORY")]
    pub download_directory: Option<PathBuf>,

    /// Working directory for chapter fragments.
    #[arg(long = "temp-dir")]
    pub temp_directory: Option<PathBuf>,

    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Browser user agent string.
    #[arg(short = 'a', long = "user-agent", env = "CONTENT_SELECT_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Base URL chapter fragments are fetched from.
    #[arg(long = "fragment-base", env = "CONTENT_SELECT_FRAGMENT_BASE")]
    pub fragment_base_url: Option<String>,

    /// Print status events as JSON lines instead of console text.
    #[arg(long)]
    pub json: bool,

    /// Only print the final summary.
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(dir) = &self.download_directory {
            config.options.download_directory = Some(dir.clone());
        }

        if let Some(dir) = &self.temp_directory {
            config.options.temp_directory = Some(dir.clone());
        }

        if let Some(timeout) = self.timeout {
            config.http.timeout_seconds = timeout;
        }

        if let Some(user_agent) = &self.user_agent {
            config.http.user_agent = user_agent.clone();
        }

        if let Some(base) = &self.fragment_base_url {
            config.http.fragment_base_url = base.clone();
        }
    }

    /// URLs paired with their output names, in submission order.
    ///
    /// URLs without a matching `--name` get an empty name, which the queue
    /// replaces with a default.
    pub fn jobs(&self) -> Vec<(String, String)> {
        self.urls
            .iter()
            .enumerate()
            .map(|(i, url)| (url.clone(), self.names.get(i).cloned().unwrap_or_default()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_pair_by_position() {
        let args = Args::try_parse_from([
            "content-select-downloader",
            "https://example.com/a",
            "https://example.com/b",
            "-n",
            "first",
        ])
        .unwrap();

        assert_eq!(
            args.jobs(),
            vec![
                ("https://example.com/a".to_string(), "first".to_string()),
                ("https://example.com/b".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_merge_overrides_only_given_values() {
        let args = Args::try_parse_from([
            "content-select-downloader",
            "--timeout",
            "5",
            "--temp-dir",
            "/scratch",
            "--fragment-base",
            "http://localhost:9000/display",
        ])
        .unwrap();

        let mut config = Config::default();
        let user_agent = config.http.user_agent.clone();
        args.merge_into_config(&mut config);

        assert_eq!(config.http.timeout_seconds, 5);
        assert_eq!(config.options.temp_directory, Some(PathBuf::from("/scratch")));
        assert_eq!(config.http.fragment_base_url, "http://localhost:9000/display");
        assert_eq!(config.http.user_agent, user_agent);
        assert_eq!(config.http.connect_timeout_seconds, 15);
    }

    #[test]
    fn test_flags_default_off() {
        let args = Args::try_parse_from(["content-select-downloader"]).unwrap();
        assert!(args.urls.is_empty());
        assert!(!args.json && !args.quiet && !args.debug);
        assert_eq!(args.config, PathBuf::from("config.toml"));
    }
}
