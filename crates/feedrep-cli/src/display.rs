//! Terminal output for the feedrep CLI

use console::style;
use feedrep_engine::ReplicationReport;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a replication runs
pub fn create_spinner(quiet: bool, message: &str) -> Option<ProgressBar> {
    if quiet {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Print a summary of a finished run
pub fn print_report(report: &ReplicationReport) {
    let stats = &report.stats;

    println!();
    println!(
        "{} {}",
        style("Replication").bold().underlined(),
        style(report.run_id).dim()
    );
    println!("  Storage type: {}", style(report.storage_type).cyan());
    println!("  Files copied: {}", style(stats.files_copied).green());
    println!("  Files skipped: {}", style(stats.files_skipped).yellow());
    println!(
        "  Directories created: {}",
        style(stats.directories_created).green()
    );
    println!(
        "  Bytes copied: {}",
        style(format_bytes(stats.bytes_copied)).green()
    );
    println!(
        "  Duration: {}",
        style(format_duration(stats.duration)).blue()
    );
    println!(
        "  Transfer rate: {}/s",
        style(format_bytes(stats.transfer_rate() as u64)).blue()
    );

    match &report.completion {
        Some(completion) if completion.used_final_path() => println!(
            "  Marker: {} {}",
            style(completion.final_path.display()).cyan(),
            style("(no matching directories)").dim()
        ),
        Some(completion) => {
            println!("  Markers: {}", style(completion.markers.len()).green());
            for marker in &completion.markers {
                println!("    {}", style(marker.display()).dim());
            }
        }
        None => println!("  Markers: {}", style("skipped for this storage type").dim()),
    }
}

/// Human readable byte count
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// Human readable duration
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{:.2}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "0.00 B")]
    #[case(1536, "1.50 KB")]
    #[case(5 * 1024 * 1024, "5.00 MB")]
    fn test_format_bytes(#[case] bytes: u64, #[case] expected: &str) {
        assert_eq!(format_bytes(bytes), expected);
    }

    #[rstest]
    #[case(Duration::from_millis(1500), "1.50s")]
    #[case(Duration::from_secs(125), "2m 5s")]
    #[case(Duration::from_secs(3725), "1h 2m 5s")]
    fn test_format_duration(#[case] duration: Duration, #[case] expected: &str) {
        assert_eq!(format_duration(duration), expected);
    }

    #[test]
    fn test_quiet_has_no_spinner() {
        assert!(create_spinner(true, "copying").is_none());
    }
}
