//! CLI output formatting utilities.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a tool call with truncated arguments.
    pub fn tool_call(name: &str, arguments: &str) {
        println!(
            "  {} {}{}",
            style("*").cyan(),
            style(name).bold(),
            style(truncate(arguments, 60)).dim()
        );
    }

    /// Print one table from a database exploration.
    pub fn table_info(name: &str, columns: &[(String, String)], row_count: i64) {
        println!("\n  {}:", style(name.to_uppercase()).bold());
        for (col_name, col_type) in columns {
            println!("    - {} ({})", col_name, style(col_type).dim());
        }
        println!("    Total records: {}", row_count);
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Truncate content with ellipsis. The cut must land on a char boundary;
/// tool arguments are model-produced and can contain multibyte text.
fn truncate(content: &str, max_len: usize) -> String {
    if content.len() <= max_len {
        return content.to_string();
    }
    let mut end = max_len.saturating_sub(3);
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &content[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 60), "short");
        let long = "x".repeat(100);
        let truncated = truncate(&long, 60);
        assert_eq!(truncated.len(), 60);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_truncate_multibyte_at_cut_point() {
        // A two-byte char straddling the cut offset must not split
        let content = format!("{}ééé", "x".repeat(56));
        assert!(content.len() > 60);
        let truncated = truncate(&content, 60);
        assert_eq!(truncated, format!("{}...", "x".repeat(56)));
    }
}
