//! Output formatting utilities for the CLI
//!
//! Colored status lines for lifecycle events and a summary table of the
//! windows a probe run opened.

use tabled::{settings::Style, Table, Tabled};

use cw_console::{Notification, Severity, StatusView, WindowController};

/// Format open windows as an ASCII table
///
/// Returns "No console windows" if there are none.
pub fn format_windows<'a>(windows: impl IntoIterator<Item = &'a WindowController>) -> String {
    #[derive(Tabled)]
    struct WindowRow {
        #[tabled(rename = "WIN")]
        win: u32,
        #[tabled(rename = "CONNECTION")]
        connection: String,
        #[tabled(rename = "STATE")]
        state: String,
        #[tabled(rename = "ATTEMPTS")]
        attempts: u32,
        #[tabled(rename = "DISPLAY")]
        display: String,
        #[tabled(rename = "SCALE")]
        scale: String,
        #[tabled(rename = "GEOMETRY")]
        geometry: String,
    }

    let rows: Vec<WindowRow> = windows
        .into_iter()
        .map(|w| {
            let g = w.geometry();
            WindowRow {
                win: w.win_number(),
                connection: truncate(w.id().as_str(), 24),
                state: w.connection_state().to_string(),
                attempts: w.attempts(),
                display: w
                    .display()
                    .map(|d| format!("{}x{}", d.width, d.height))
                    .unwrap_or_else(|| "-".to_string()),
                scale: w
                    .scale()
                    .map(|s| format!("{:.3}", s))
                    .unwrap_or_else(|| "-".to_string()),
                geometry: format!(
                    "{:.0}x{:.0}+{:.0}+{:.0}{}",
                    g.size.width,
                    g.size.height,
                    g.position.x,
                    g.position.y,
                    if g.is_maximized { " (max)" } else { "" }
                ),
            }
        })
        .collect();

    if rows.is_empty() {
        return "No console windows".to_string();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

/// One-line rendering of the connection chrome
pub fn format_status(status: &StatusView) -> String {
    status.lines.join(" - ")
}

/// Print a notification with the color of its severity
pub fn print_notification(notification: &Notification) {
    print_severity(notification.severity, &notification.message);
}

/// Print `msg` with the color of `severity`
pub fn print_severity(severity: Severity, msg: &str) {
    match severity {
        Severity::Info => print_info(msg),
        Severity::Success => print_success(msg),
        Severity::Warning => print_warning(msg),
        Severity::Error => print_error(msg),
    }
}

/// Truncate a string with ellipsis if too long
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

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

/// Print an error message in red with an X prefix to stderr
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

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

/// Print a warning message in yellow to stderr
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

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

/// Print an informational message in cyan
pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}
