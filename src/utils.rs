//! Utility functions for wishlist operations.

use crate::error::{Result, WishlistError};
use colored::*;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Characters tolerated in typed or stored amounts but not part of the number:
    /// whitespace, grouping separators and any currency symbol.
    static ref AMOUNT_NOISE: Regex = Regex::new(r"[\s,_]|\p{Sc}").unwrap();
}

/// Parse a user-typed or legacy stored amount such as `"1,000"` or `"฿ 12.50"`.
///
/// Returns `None` for empty or non-numeric text and for NaN/infinity.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned = AMOUNT_NOISE.replace_all(text.trim(), "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format an amount with the currency prefix and two decimals.
pub fn format_money(currency: &str, amount: f64) -> String {
    format!("{currency}{amount:.2}")
}

/// Render a fixed-width textual progress bar.
pub fn progress_bar(percentage: f64, width: usize) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Resolve a 1-based position typed by the user into a 0-based index.
pub fn parse_position(text: &str) -> Result<usize> {
    match text.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(WishlistError::Other(format!(
            "Invalid position '{}': expected a number starting at 1",
            text.trim()
        ))),
        Ok(n) => Ok(n - 1),
    }
}

/// Print an error message and exit.
pub fn error_exit(message: &str, code: i32) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), message);
    std::process::exit(code);
}

/// Print a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print a warning message.
pub fn warning(message: &str) {
    println!("{} {}", "Warning:".yellow(), message);
}

/// Clear the terminal screen.
pub fn clear_screen() {
    print!("\x1B[2J\x1B[1;1H");
    use std::io::{self, Write};
    let _ = io::stdout().flush();
}

/// Whether both stdin and stdout are attached to a terminal.
pub fn is_interactive_terminal() -> bool {
    atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1000"), Some(1000.0));
        assert_eq!(parse_amount(" 12.50 "), Some(12.5));
        assert_eq!(parse_amount("฿1,000"), Some(1000.0));
        assert_eq!(parse_amount("$ 3"), Some(3.0));
        assert_eq!(parse_amount("-4"), Some(-4.0));

        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("฿"), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("inf"), None);
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money("฿", 1000.0), "฿1000.00");
        assert_eq!(format_money("$", 0.5), "$0.50");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0, 4), "░░░░");
        assert_eq!(progress_bar(50.0, 4), "██░░");
        assert_eq!(progress_bar(100.0, 4), "████");
        assert_eq!(progress_bar(250.0, 4), "████");
    }

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("1").unwrap(), 0);
        assert_eq!(parse_position(" 3 ").unwrap(), 2);
        assert!(parse_position("0").is_err());
        assert!(parse_position("x").is_err());
    }
}
