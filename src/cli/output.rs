//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the sage CLI.

use owo_colors::OwoColorize;
use std::io::{self, Write};

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the banner shown when the chat session starts
    pub fn banner(&self) {
        if self.colored {
            println!(
                "\n  {} {}",
                "sage".bright_cyan().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
            );
            println!("  {}\n", "company policy assistant".bright_white());
        } else {
            println!(
                "\n  sage v{}\n  company policy assistant\n",
                env!("CARGO_PKG_VERSION")
            );
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a list item
    pub fn list_item(&self, item: &str) {
        if self.colored {
            println!("    {} {}", "•".blue(), item);
        } else {
            println!("    - {}", item);
        }
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print the assistant's answer block
    pub fn answer(&self, text: &str) {
        if self.colored {
            println!("\n{}", "--- Response ---".cyan().bold());
            println!("{}", text);
            println!("{}\n", "----------------".cyan().bold());
        } else {
            println!("\n--- Response ---\n{}\n----------------\n", text);
        }
    }

    /// Print the question prompt without a trailing newline
    pub fn prompt(&self) {
        if self.colored {
            print!("{} ", "policy question (or 'exit'):".bright_yellow());
        } else {
            print!("policy question (or 'exit'): ");
        }
        io::stdout().flush().ok();
    }

    /// Prompt for confirmation (returns true if user confirms)
    pub fn confirm(&self, message: &str) -> bool {
        if self.colored {
            print!(
                "  {} {} [y/N]: ",
                "?".bright_yellow().bold(),
                message.bright_white()
            );
        } else {
            print!("  [?] {} [y/N]: ", message);
        }

        io::stdout().flush().ok();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_ok() {
            let input = input.trim().to_lowercase();
            input == "y" || input == "yes"
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_new() {
        let output = Output::new();
        assert!(output.colored);
    }

    #[test]
    fn test_output_no_color() {
        let output = Output::no_color();
        assert!(!output.colored);
    }

    #[test]
    fn test_output_methods_no_panic() {
        // Smoke test over both color modes
        for output in [Output::new(), Output::no_color()] {
            output.banner();
            output.success("test success");
            output.info("test info");
            output.warning("test warning");
            output.error("test error");
            output.kv("key", "value");
            output.list_item("item");
            output.header("Test Header");
            output.answer("answer text");
        }
    }
}
