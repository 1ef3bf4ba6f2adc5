//! "Chat" screen: message history, question input and related documents.

use std::panic::{self, AssertUnwindSafe};

use cdp_assistant_core::Assistant;
use cdp_assistant_core::respond::{error_message, select_result, welcome_message};
use cdp_assistant_shared::{Message, PlatformFilter, Role, SearchResult};
use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

pub(crate) struct ChatScreen {
    messages: Vec<Message>,
    input: String,
    editing: bool,
    /// Related documents of the last answer.
    results: Vec<SearchResult>,
    selected: usize,
    /// Lines scrolled up from the bottom of the history.
    scroll_back: u16,
}

impl ChatScreen {
    pub(crate) fn new() -> Self {
        Self {
            messages: vec![welcome_message()],
            input: String::new(),
            editing: true,
            results: Vec::new(),
            selected: 0,
            scroll_back: 0,
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    /// Handle a key; returns a status message when something happened.
    pub(crate) fn handle_key(
        &mut self,
        code: KeyCode,
        assistant: &Assistant,
        filter: PlatformFilter,
    ) -> Option<String> {
        if self.editing {
            match code {
                KeyCode::Enter => return self.submit(assistant, filter),
                KeyCode::Esc => self.editing = false,
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Char(c) => self.input.push(c),
                _ => {}
            }
            return None;
        }

        match code {
            KeyCode::Char('i') | KeyCode::Char('/') => self.editing = true,
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.results.len() {
                    self.selected += 1;
                }
            }
            KeyCode::PageUp => self.scroll_back = self.scroll_back.saturating_add(5),
            KeyCode::PageDown => self.scroll_back = self.scroll_back.saturating_sub(5),
            KeyCode::Enter => {
                let result = self.results.get(self.selected)?;
                self.messages.push(select_result(result));
                self.scroll_back = 0;
                return Some(format!("Showing: {}", result.title));
            }
            _ => {}
        }
        None
    }

    /// Ask the current input and append the exchange to the history.
    fn submit(&mut self, assistant: &Assistant, filter: PlatformFilter) -> Option<String> {
        let question = self.input.trim().to_string();
        if question.is_empty() {
            return None;
        }
        self.input.clear();
        self.messages.push(Message::user(question.as_str()));
        self.scroll_back = 0;

        // A panic mid-answer must not leave the terminal in raw mode.
        let reply = panic::catch_unwind(AssertUnwindSafe(|| {
            assistant.generate_response(&question, filter)
        }));

        match reply {
            Ok(reply) => {
                self.messages.push(reply.message);
                self.results = reply.results;
                self.selected = 0;
                Some(format!("{} related document(s)", self.results.len()))
            }
            Err(_) => {
                self.messages.push(error_message());
                self.results.clear();
                Some("Failed to answer".to_string())
            }
        }
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(area);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // History
                Constraint::Length(3), // Input
            ])
            .split(columns[0]);

        self.draw_history(f, left[0]);

        let input_style = if self.editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let input_title = if self.editing {
            " Ask (Enter to send · Esc to stop typing) "
        } else {
            " Ask (i to type) "
        };
        let input = Paragraph::new(self.input.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(input_title)
                .border_style(input_style),
        );
        f.render_widget(input, left[1]);

        self.draw_results(f, columns[1]);
    }

    fn draw_history(&self, f: &mut Frame, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        for msg in &self.messages {
            let (label, color) = match msg.role {
                Role::User => ("You", Color::Green),
                Role::Assistant => ("Assistant", Color::Cyan),
            };
            lines.push(Line::from(Span::styled(
                format!("{label} · {}", msg.timestamp.format("%H:%M")),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            lines.extend(msg.content.lines().map(|l| Line::from(l.to_string())));
            lines.push(Line::from(""));
        }

        let history = Paragraph::new(lines).wrap(Wrap { trim: false });

        // Rows after word wrapping, measured without the border.
        let inner_width = area.width.saturating_sub(2).max(1);
        let inner_height = area.height.saturating_sub(2);
        let total = u16::try_from(history.line_count(inner_width)).unwrap_or(u16::MAX);
        let bottom = total.saturating_sub(inner_height);
        let scroll = bottom.saturating_sub(self.scroll_back);

        let history = history
            .scroll((scroll, 0))
            .block(Block::default().borders(Borders::ALL).title(" Conversation "));
        f.render_widget(history, area);
    }

    fn draw_results(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Related Documentation ({}) ", self.results.len()));

        if self.results.is_empty() {
            let empty = Paragraph::new("Related documents for the last answer appear here.")
                .style(Style::default().fg(Color::DarkGray))
                .wrap(Wrap { trim: true })
                .block(block);
            f.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = self
            .results
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let style = if i == self.selected && !self.editing {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let prefix = if i == self.selected { "▸ " } else { "  " };
                ListItem::new(vec![
                    Line::from(format!("{prefix}{}", r.title)),
                    Line::from(Span::styled(
                        format!("    [{}]", r.platform.capitalized()),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
                .style(style)
            })
            .collect();

        f.render_widget(List::new(items).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdp_assistant_shared::SearchConfig;

    fn assistant() -> Assistant {
        let missing = std::env::temp_dir().join("cdp-tui-no-such-data-dir");
        cdp_assistant_core::load_assistant(&missing, &SearchConfig::default())
            .unwrap()
            .0
    }

    fn type_str(screen: &mut ChatScreen, assistant: &Assistant, text: &str) {
        for c in text.chars() {
            screen.handle_key(KeyCode::Char(c), assistant, PlatformFilter::All);
        }
    }

    #[test]
    fn starts_with_welcome_and_input_focused() {
        let screen = ChatScreen::new();
        assert_eq!(screen.messages.len(), 1);
        assert_eq!(screen.messages[0].role, Role::Assistant);
        assert!(screen.is_editing());
    }

    #[test]
    fn submitting_appends_question_and_answer() {
        let assistant = assistant();
        let mut screen = ChatScreen::new();
        type_str(&mut screen, &assistant, "How do I create an audience in Lytics?");
        screen.handle_key(KeyCode::Enter, &assistant, PlatformFilter::All);

        assert!(screen.input.is_empty());
        assert_eq!(screen.messages.len(), 3);
        assert_eq!(screen.messages[1].role, Role::User);
        assert_eq!(screen.messages[2].role, Role::Assistant);
        assert!(!screen.results.is_empty());
    }

    #[test]
    fn blank_input_is_ignored() {
        let assistant = assistant();
        let mut screen = ChatScreen::new();
        type_str(&mut screen, &assistant, "   ");
        assert!(screen.handle_key(KeyCode::Enter, &assistant, PlatformFilter::All).is_none());
        assert_eq!(screen.messages.len(), 1);
    }

    #[test]
    fn newest_reply_ends_inside_the_history_pane() {
        use ratatui::Terminal;
        use ratatui::backend::TestBackend;

        let mut screen = ChatScreen::new();
        // Uneven word lengths wrap onto more rows than a character count predicts.
        let long = "a configure destinations abcdefghijklmnopqrstuv x ".repeat(30);
        screen.messages.push(Message::assistant(format!("{long}FINALWORD")));

        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|f| screen.draw(f, f.area())).unwrap();

        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("FINALWORD"));
    }

    #[test]
    fn selecting_result_posts_it() {
        let assistant = assistant();
        let mut screen = ChatScreen::new();
        type_str(&mut screen, &assistant, "How do I configure a destination?");
        screen.handle_key(KeyCode::Enter, &assistant, PlatformFilter::All);
        screen.handle_key(KeyCode::Esc, &assistant, PlatformFilter::All);

        let before = screen.messages.len();
        let title = screen.results[0].title.clone();
        screen.handle_key(KeyCode::Enter, &assistant, PlatformFilter::All);

        assert_eq!(screen.messages.len(), before + 1);
        let posted = screen.messages.last().unwrap();
        assert_eq!(posted.role, Role::Assistant);
        assert!(posted.content.contains(&format!("Source: [{title}]")));
    }
}
