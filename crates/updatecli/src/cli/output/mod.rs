//! Output formatting utilities

use console::{style, StyledObject};
use updatecli_core::types::StepStatus;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    println!("{} {}", style("!").yellow().bold(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", style("→").blue(), message);
}

/// Create a styled header
pub fn header(text: &str) -> String {
    style(text).bold().to_string()
}

/// Create a styled key-value line
pub fn key_value(key: &str, value: &str) -> String {
    format!("  {}: {}", style(key).dim(), value)
}

/// Symbol and colour of a step status
pub fn status(status: StepStatus) -> StyledObject<&'static str> {
    match status {
        StepStatus::Success => style("✔").green().bold(),
        StepStatus::Failure => style("✗").red().bold(),
        StepStatus::Attention => style("⚠").yellow().bold(),
        StepStatus::Skipped => style("-").dim(),
        StepStatus::Unmatched => style("?").magenta().bold(),
    }
}

/// Print a JSON document
pub fn json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
