//! Core TUI application state and event loop.

use std::io;
use std::time::Duration;

use cdp_assistant_core::Assistant;
use cdp_assistant_shared::PlatformFilter;
use cdp_assistant_store::DocumentStore;
use color_eyre::eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};

use crate::screens::{BrowseScreen, ChatScreen, ScreenId};
use crate::widgets::status_bar;

/// Application state.
pub(crate) struct App {
    assistant: Assistant,
    store: DocumentStore,
    /// Currently active screen tab.
    active: ScreenId,
    /// Platform applied to questions and to the browse list.
    filter: PlatformFilter,
    chat: ChatScreen,
    browse: BrowseScreen,
    /// Whether the app should quit.
    should_quit: bool,
    /// Status message shown in bottom bar.
    status: String,
    /// Whether help overlay is visible.
    show_help: bool,
}

impl App {
    pub(crate) fn new(assistant: Assistant, store: DocumentStore) -> Self {
        let status = format!("{} documents loaded · press ? for help", store.len());
        Self {
            assistant,
            store,
            active: ScreenId::Chat,
            filter: PlatformFilter::All,
            chat: ChatScreen::new(),
            browse: BrowseScreen::new(),
            should_quit: false,
            status,
            show_help: false,
        }
    }

    fn is_editing(&self) -> bool {
        self.active == ScreenId::Chat && self.chat.is_editing()
    }

    fn switch_to(&mut self, screen: ScreenId) {
        self.active = screen;
        self.status = screen.to_string();
    }

    fn cycle_platform(&mut self) {
        self.filter = self.filter.next();
        self.browse.reset();
        self.status = format!("Platform: {}", self.filter);
    }
}

/// Set up the terminal, run the event loop, then restore the terminal.
pub(crate) fn run(assistant: Assistant, store: DocumentStore) -> Result<()> {
    // Setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, App::new(assistant, store));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, &app))?;

        // Poll for events with 100ms timeout for responsive UI
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(&mut app, key.code, key.modifiers);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);

    // Global keybindings (always active)
    match code {
        KeyCode::Char('q') | KeyCode::Char('c') if ctrl => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('p') if ctrl => {
            app.cycle_platform();
            return;
        }
        KeyCode::Char('q') if !app.is_editing() => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('p') if !app.is_editing() => {
            app.cycle_platform();
            return;
        }
        KeyCode::Char('?') if !app.is_editing() => {
            app.show_help = !app.show_help;
            return;
        }
        KeyCode::Esc if app.show_help => {
            app.show_help = false;
            return;
        }
        KeyCode::Char(c @ '1'..='2') if !app.is_editing() => {
            let idx = (c as usize) - ('1' as usize);
            app.switch_to(ScreenId::ALL[idx]);
            return;
        }
        KeyCode::Tab | KeyCode::BackTab if !app.is_editing() => {
            let next = ScreenId::ALL[(app.active.index() + 1) % ScreenId::ALL.len()];
            app.switch_to(next);
            return;
        }
        _ => {}
    }

    // If help is showing, consume any key to dismiss
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Delegate to current screen
    match app.active {
        ScreenId::Chat => {
            if let Some(status) = app.chat.handle_key(code, &app.assistant, app.filter) {
                app.status = status;
            }
        }
        ScreenId::Browse => {
            let len = app.store.by_platform(app.filter).count();
            app.browse.handle_key(code, len);
        }
    }
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    // Tab bar
    let tab_titles: Vec<Line> = ScreenId::ALL
        .iter()
        .map(|s| Line::from(format!("{s}")))
        .collect();

    let tabs = Tabs::new(tab_titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" CDP Support Assistant "),
        )
        .select(app.active.index())
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" │ ");

    f.render_widget(tabs, chunks[0]);

    // Content area
    match app.active {
        ScreenId::Chat => app.chat.draw(f, chunks[1]),
        ScreenId::Browse => app.browse.draw(f, chunks[1], &app.store, app.filter),
    }

    // Status bar
    f.render_widget(status_bar(app.filter, &app.status), chunks[2]);

    // Help overlay
    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(60, 60, f.area());

    let help_text = vec![
        Line::from("Keybindings").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from("  1-2          Switch to screen"),
        Line::from("  Tab          Next screen"),
        Line::from("  p / Ctrl-P   Cycle platform (all → segment → … → zeotap)"),
        Line::from("  ?            Toggle this help"),
        Line::from("  q / Ctrl-C   Quit"),
        Line::from(""),
        Line::from("Chat:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  i            Type a question"),
        Line::from("  Enter        Send question / show selected document"),
        Line::from("  Esc          Stop typing"),
        Line::from("  ↑/↓          Select related document"),
        Line::from("  PgUp/PgDn    Scroll conversation"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help (any key closes) ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    // Clear background
    f.render_widget(ratatui::widgets::Clear, area);
    f.render_widget(help, area);
}

/// Create a centered rectangle with percentage width and height.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdp_assistant_shared::{Platform, SearchConfig};

    fn app() -> App {
        let missing = std::env::temp_dir().join("cdp-tui-no-such-data-dir");
        let (assistant, store) =
            cdp_assistant_core::load_assistant(&missing, &SearchConfig::default()).unwrap();
        App::new(assistant, store)
    }

    #[test]
    fn ctrl_p_cycles_platform_while_typing() {
        let mut app = app();
        assert!(app.is_editing());
        handle_key(&mut app, KeyCode::Char('p'), KeyModifiers::CONTROL);
        assert_eq!(app.filter, PlatformFilter::Only(Platform::Segment));
    }

    #[test]
    fn q_types_while_editing_and_quits_otherwise() {
        let mut app = app();
        handle_key(&mut app, KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(!app.should_quit);

        handle_key(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        handle_key(&mut app, KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(app.should_quit);
    }

    #[test]
    fn number_keys_switch_screens() {
        let mut app = app();
        handle_key(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        handle_key(&mut app, KeyCode::Char('2'), KeyModifiers::NONE);
        assert_eq!(app.active, ScreenId::Browse);
        handle_key(&mut app, KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(app.active, ScreenId::Chat);
    }
}
