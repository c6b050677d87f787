//! Content-Select Downloader - CLI entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use indicatif::ProgressBar;
use tracing_subscriber::{fmt, EnvFilter};

use content_select_downloader::{
    api::SiteClient,
    cli::Args,
    config::{validate_config, validate_source_url, Config},
    download::DownloadPipeline,
    error::{exit_codes, Error, ErrorKind, Result},
    fs::ensure_dir,
    output::{
        create_spinner, format_job_line, print_banner, print_config_summary, print_error,
        print_info, print_job_line, print_summary, print_warning,
    },
    queue::{QueueManager, StatusEvent},
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e.kind() {
                ErrorKind::Config => ExitCode::from(exit_codes::CONFIG_ERROR as u8),
                ErrorKind::Connectivity => ExitCode::from(exit_codes::CONNECTION_ERROR as u8),
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

/// How status events are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventDisplay {
    Pretty,
    Quiet,
    Json,
}

async fn run() -> Result<i32> {
    // Parse CLI arguments
    let args = Args::parse();

    let display = if args.json {
        EventDisplay::Json
    } else if args.quiet {
        EventDisplay::Quiet
    } else {
        EventDisplay::Pretty
    };

    // Set up logging; stdout is left to the event display
    let log_level = match (args.debug, display) {
        (true, _) => "debug",
        (false, EventDisplay::Pretty) => "info",
        (false, _) => "warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if display == EventDisplay::Pretty {
        print_banner();
    }

    // Load configuration
    let mut config = if args.config.exists() {
        Config::load(&args.config)?
    } else {
        if display == EventDisplay::Pretty {
            print_info(&format!(
                "No configuration file at {}, using defaults",
                args.config.display()
            ));
        }
        Config::default()
    };

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    // Validate configuration and inputs
    validate_config(&config)?;

    if args.urls.is_empty() {
        return Err(Error::Config("No URLs given".into()));
    }
    if args.names.len() > args.urls.len() {
        print_warning(&format!(
            "{} name(s) given for {} URL(s); extra names are ignored",
            args.names.len(),
            args.urls.len()
        ));
    }

    let mut jobs = Vec::with_capacity(args.urls.len());
    for (url, name) in args.jobs() {
        jobs.push((validate_source_url(&url)?, name));
    }

    let download_dir = config.download_directory();
    let temp_dir = config.temp_directory();
    ensure_dir(&download_dir).await?;
    ensure_dir(&temp_dir).await?;

    if display == EventDisplay::Pretty {
        print_config_summary(jobs.len(), &download_dir, &temp_dir);
    }

    // Build the pipeline and queue
    let client = SiteClient::new(&config.http)?;
    let pipeline = DownloadPipeline::new(client, &config);
    let (queue, mut events) =
        QueueManager::new(Arc::new(pipeline), config.queue.clone(), download_dir);

    for (url, name) in &jobs {
        queue.submit(url.as_str(), name);
    }

    // Drain status events until every job is done or the user interrupts
    let mut spinner: Option<ProgressBar> = None;
    let mut interrupted = false;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                show_event(&event, display, &mut spinner);
                if queue.is_idle() {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                interrupted = true;
                if let Some(spinner) = spinner.take() {
                    spinner.finish_and_clear();
                }
                print_warning("Interrupted, waiting for the current job to finish...");
                break;
            }
        }
    }

    if !queue.stop().await {
        print_warning("The current job did not finish in time and was abandoned");
    }

    // Drain anything reported while stopping
    while let Ok(event) = events.try_recv() {
        show_event(&event, display, &mut spinner);
    }
    if let Some(spinner) = spinner.take() {
        spinner.finish_and_clear();
    }

    // Print statistics
    let counts = queue.counts();
    match display {
        EventDisplay::Json => {
            let summary = serde_json::json!({ "event": "summary", "counts": counts });
            println!("{}", summary);
        }
        _ => print_summary(&queue.jobs(), &counts),
    }

    if interrupted {
        Ok(exit_codes::ABORT)
    } else if counts.failed > 0 {
        Ok(exit_codes::SOME_JOBS_FAILED)
    } else {
        Ok(exit_codes::SUCCESS)
    }
}

/// Render one status event.
fn show_event(event: &StatusEvent, display: EventDisplay, spinner: &mut Option<ProgressBar>) {
    match display {
        EventDisplay::Json => match serde_json::to_string(event) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::warn!("Could not serialize status event: {}", e),
        },
        EventDisplay::Quiet => {}
        EventDisplay::Pretty => match event {
            StatusEvent::Submitted(job) => print_info(&format!("Queued {}", format_job_line(job))),
            StatusEvent::Claimed(job) => {
                *spinner = Some(create_spinner(&format!("{} {}", job.id, job.source_url)));
            }
            StatusEvent::Progress { job_id, message } => {
                if let Some(spinner) = spinner {
                    spinner.set_message(format!("{} {}", job_id, message));
                }
            }
            StatusEvent::Finished(job) => {
                if let Some(spinner) = spinner.take() {
                    spinner.finish_and_clear();
                }
                print_job_line(job);
            }
            StatusEvent::Removed { job_id } => print_info(&format!("Removed {}", job_id)),
            StatusEvent::WorkerStopped => tracing::debug!("Worker stopped"),
        },
    }
}
