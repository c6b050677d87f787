//! Job lines and the end-of-run summary.

use console::style;

use crate::job::{Job, JobStatus};
use crate::queue::StatusCounts;

/// One-line rendering of a job: icon, id, output name, and message.
pub fn format_job_line(job: &Job) -> String {
    let mut line = format!("{} {} {}", job.status.icon(), job.id, job.output_name());
    if !job.message.is_empty() {
        line.push_str(" - ");
        line.push_str(&job.message);
    }
    line
}

/// Print a job line, colored by status.
pub fn print_job_line(job: &Job) {
    let line = format_job_line(job);
    match job.status {
        JobStatus::Completed => println!("{}", style(line).green()),
        JobStatus::Failed => println!("{}", style(line).red()),
        JobStatus::InProgress => println!("{}", style(line).cyan()),
        JobStatus::Pending => println!("{}", style(line).dim()),
    }
}

/// Print statistics for every job of the run.
pub fn print_summary(jobs: &[Job], counts: &StatusCounts) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Summary:").bold());
    for job in jobs {
        println!("  {}", format_job_line(job));
    }
    println!();
    println!("  Completed: {}", style(counts.completed).green());
    if counts.failed > 0 {
        println!("  Failed:    {}", style(counts.failed).red());
    }
    if counts.pending + counts.active > 0 {
        println!("  Unfinished: {}", style(counts.pending + counts.active).yellow());
    }
    println!("{}", style("═".repeat(50)).dim());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobId;
    use std::path::Path;

    #[test]
    fn test_job_line() {
        let mut job = Job::new(JobId(3), "https://example.com/my-book", "", Path::new("/out"));
        assert!(format_job_line(&job).ends_with("#3 my_book.pdf"));

        job.fail("Error: no fragments found");
        let line = format_job_line(&job);
        assert!(line.starts_with(JobStatus::Failed.icon()));
        assert!(line.ends_with("my_book.pdf - Error: no fragments found"));
    }
}
