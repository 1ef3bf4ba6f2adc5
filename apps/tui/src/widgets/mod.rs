//! Reusable TUI widgets.

use cdp_assistant_shared::PlatformFilter;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Bottom status bar with the active platform filter on the left.
pub(crate) fn status_bar(filter: PlatformFilter, msg: &str) -> Paragraph<'static> {
    let line = Line::from(vec![
        Span::styled(
            format!(" platform: {filter} "),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
        Span::raw(format!(" {msg}")),
    ]);
    Paragraph::new(line).style(Style::default().bg(Color::DarkGray).fg(Color::White))
}
