use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    DefaultTerminal, Frame,
};

use super::{Choice, Chooser};

/// Theme colors
pub struct Theme {
    pub fg: Color,
    pub accent: Color,
    pub dim: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: Color::Rgb(220, 220, 220),
            accent: Color::Rgb(217, 119, 87),
            dim: Color::Rgb(100, 100, 100),
        }
    }
}

/// Built-in full-screen picker for terminals without dialog/whiptail
#[derive(Default)]
pub struct Picker {
    theme: Theme,
}

impl Picker {
    pub fn new() -> Self {
        Self::default()
    }

    fn run(
        &self,
        terminal: &mut DefaultTerminal,
        state: &mut PickerState<'_>,
    ) -> Result<Option<String>> {
        loop {
            terminal.draw(|f| self.render(f, state))?;

            if let Event::Key(key) = event::read().context("Failed to read terminal event")? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(outcome) = state.handle_key(key) {
                    return Ok(outcome);
                }
            }
        }
    }

    fn render(&self, frame: &mut Frame, state: &mut PickerState<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Prompt
                Constraint::Min(0),    // Choices
                Constraint::Length(3), // Help
            ])
            .split(frame.area());

        self.render_prompt(frame, chunks[0], state.prompt);
        self.render_list(frame, chunks[1], state);
        self.render_footer(frame, chunks[2]);
    }

    fn render_prompt(&self, frame: &mut Frame, area: Rect, prompt: &str) {
        let title = Paragraph::new(Line::from(vec![
            Span::styled(
                " tmux-hop ",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("│ {}", prompt), Style::default().fg(self.theme.dim)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.dim)),
        );
        frame.render_widget(title, area);
    }

    fn render_list(&self, frame: &mut Frame, area: Rect, state: &mut PickerState<'_>) {
        let items: Vec<ListItem> = state
            .choices
            .iter()
            .map(|choice| {
                let mut spans = vec![Span::styled(
                    choice.value.clone(),
                    Style::default().fg(self.theme.fg),
                )];
                if !choice.label.is_empty() {
                    spans.push(Span::styled(
                        format!("  {}", choice.label),
                        Style::default().fg(self.theme.dim),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.dim)),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::Rgb(50, 50, 50))
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(list, area, &mut state.list_state);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let footer = Paragraph::new(Line::from(Span::styled(
            " j/k: Navigate │ Enter: Select │ Esc/q: Cancel ",
            Style::default().fg(self.theme.dim),
        )))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.dim)),
        );
        frame.render_widget(footer, area);
    }
}

impl Chooser for Picker {
    fn choose(&self, prompt: &str, choices: &[Choice]) -> Result<Option<String>> {
        if choices.is_empty() {
            return Ok(None);
        }

        let mut state = PickerState::new(prompt, choices);
        let mut terminal = ratatui::try_init().context("Failed to open terminal")?;
        let result = self.run(&mut terminal, &mut state);
        ratatui::restore();
        result
    }
}

/// Selection state, kept apart from drawing
struct PickerState<'a> {
    prompt: &'a str,
    choices: &'a [Choice],
    list_state: ListState,
}

impl<'a> PickerState<'a> {
    fn new(prompt: &'a str, choices: &'a [Choice]) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            prompt,
            choices,
            list_state,
        }
    }

    /// `Some(outcome)` once the user has decided
    fn handle_key(&mut self, key: KeyEvent) -> Option<Option<String>> {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(None),
            KeyCode::Esc | KeyCode::Char('q') => Some(None),
            KeyCode::Char('j') | KeyCode::Down => {
                self.next();
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.previous();
                None
            }
            KeyCode::Enter => Some(
                self.list_state
                    .selected()
                    .and_then(|i| self.choices.get(i))
                    .map(|choice| choice.value.clone()),
            ),
            _ => None,
        }
    }

    fn next(&mut self) {
        if self.choices.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.choices.len() => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    fn previous(&mut self) {
        if self.choices.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.choices.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }
}
