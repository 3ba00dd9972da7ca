//! Output formatting and progress bars for CLI

use indicatif::{ProgressBar, ProgressStyle};

use crate::analysis::SeriesPoint;

/// Create a progress bar counting finished trials
pub fn create_trial_progress(total_trials: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_trials);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} trials")
        .map(|style| style.progress_chars("=>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Render a learning curve as a fixed-width table
///
/// `period` converts snapshot indices to trained episodes or steps.
pub fn format_series_table(series: &[SeriesPoint], period: usize, unit: &str) -> String {
    let mut out = format!(
        "{:>6} {:>10} {:>12} {:>12} {:>12}\n",
        "index", unit, "mean", "variance", "± half"
    );
    for point in series {
        out.push_str(&format!(
            "{:>6} {:>10} {:>12.3} {:>12.3} {:>12.3}\n",
            point.index,
            format_number(point.index * period),
            point.mean,
            point.variance,
            point.half_width
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn test_series_table_rows() {
        let series = [SeriesPoint {
            index: 20,
            mean: 12.5,
            variance: 1.0,
            half_width: 0.25,
        }];
        let table = format_series_table(&series, 50, "episodes");
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("episodes"));
        assert!(lines[1].contains("1,000"));
        assert!(lines[1].contains("12.500"));
    }
}
