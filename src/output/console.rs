//! Console output utilities.

use std::path::Path;

use console::style;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a warning message.
///
/// Goes to stderr with errors, so stdout carries only event output.
pub fn print_warning(message: &str) {
    eprintln!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     Content-Select Downloader                         ║
║     Chapter PDFs in, one book out                     ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print configuration summary.
pub fn print_config_summary(job_count: usize, download_dir: &Path, temp_dir: &Path) {
    println!();
    println!("{}", style("Configuration:").bold());
    println!("  Jobs: {}", job_count);
    println!("  Directory: {}", download_dir.display());
    println!("  Fragments: {}", temp_dir.display());
    println!();
}
