//! "Browse Docs" screen — lists loaded documents for the active platform.

use cdp_assistant_shared::{DocumentEntry, PlatformFilter};
use cdp_assistant_store::DocumentStore;
use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

pub(crate) struct BrowseScreen {
    selected: usize,
}

impl BrowseScreen {
    pub(crate) fn new() -> Self {
        Self { selected: 0 }
    }

    /// Back to the top of the list, e.g. after the platform changes.
    pub(crate) fn reset(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect, store: &DocumentStore, filter: PlatformFilter) {
        let docs: Vec<&DocumentEntry> = store.by_platform(filter).collect();

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .margin(1)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);

        if docs.is_empty() {
            let empty = Paragraph::new(format!(
                "No documents loaded for {filter}.\n\nRun `cdp-assistant scrape` to fetch them."
            ))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Documents "));
            f.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = docs
            .iter()
            .enumerate()
            .map(|(i, doc)| {
                let style = if i == self.selected {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let prefix = if i == self.selected { "▸ " } else { "  " };
                ListItem::new(format!("{prefix}{}  [{}]", doc.title, doc.platform)).style(style)
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Documents ({}) ", docs.len())),
        );
        f.render_widget(list, chunks[0]);

        if let Some(doc) = docs.get(self.selected) {
            let detail = Paragraph::new(vec![
                Line::from(doc.title.as_str()).style(Style::default().add_modifier(Modifier::BOLD)),
                Line::from(Span::styled(doc.url.as_str(), Style::default().fg(Color::Blue))),
                Line::from(""),
                Line::from(doc.content.as_str()),
            ])
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Content "));
            f.render_widget(detail, chunks[1]);
        }
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, len: usize) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < len {
                    self.selected += 1;
                }
            }
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = len.saturating_sub(1),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_stays_in_bounds() {
        let mut screen = BrowseScreen::new();
        screen.handle_key(KeyCode::Up, 3);
        assert_eq!(screen.selected, 0);
        for _ in 0..5 {
            screen.handle_key(KeyCode::Down, 3);
        }
        assert_eq!(screen.selected, 2);
        screen.reset();
        assert_eq!(screen.selected, 0);
        screen.handle_key(KeyCode::End, 0);
        assert_eq!(screen.selected, 0);
    }
}
