//! Status messages for the CLI
//!
//! Colored one-line messages for interactive commands. Nothing here is used
//! by `rv proxy`, whose stdout carries relayed bytes.

use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

/// Print a success message (green checkmark)
pub fn print_success(msg: &str) {
    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an error message to stderr (red X)
pub fn print_error(msg: &str) {
    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning message to stderr (yellow)
pub fn print_warning(msg: &str) {
    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Yellow),
        Print("⚠ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an informational message to stderr (cyan)
pub fn print_info(msg: &str) {
    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}
