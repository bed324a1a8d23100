//! # Console Interface Module
//!
//! Interactive terminal front-end for a [`Board`]: probe readings on the left,
//! controls on the right, a status line at the bottom.
//!
//! ## Keys
//! - `space` / `t`: tick the clock
//! - `up` / `down`: select a control
//! - `enter`: run the selected control's default action
//! - `0`-`9`: toggle that bit of the selected DIP switch
//! - `h`: help, `q` / `esc`: quit

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{debug, warn};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use serde::{Deserialize, Serialize};
use std::io::{self, Stdout};
use std::time::Duration;

use crate::board::{Board, Control};
use crate::error::SimError;
use crate::simulator::SettleReport;

/// Console configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub refresh_rate_ms: u64,
    pub show_probes: bool,
    pub show_controls: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: 100,
            show_probes: true,
            show_controls: true,
        }
    }
}

/// Console UI application state
pub struct ConsoleApp {
    board: Board,
    config: ConsoleConfig,
    running: bool,
    show_help: bool,
    selected: usize,
    ticks: u64,
    status: String,
    failed: bool,
}

impl ConsoleApp {
    pub fn new(board: Board, config: ConsoleConfig) -> Self {
        Self {
            board,
            config,
            running: true,
            show_help: false,
            selected: 0,
            ticks: 0,
            status: "ready".to_string(),
            failed: false,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        enable_raw_mode().map_err(|e| format!("Failed to enable raw mode: {}", e))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)
            .map_err(|e| format!("Failed to enter alternate screen: {}", e))?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode().map_err(|e| format!("Failed to disable raw mode: {}", e))?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .map_err(|e| format!("Failed to leave alternate screen: {}", e))?;
        terminal
            .show_cursor()
            .map_err(|e| format!("Failed to show cursor: {}", e))?;

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let refresh = Duration::from_millis(self.config.refresh_rate_ms);
        while self.running {
            terminal.draw(|f| self.draw_ui(f))?;
            if event::poll(refresh)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key.code);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn handle_key_event(&mut self, key: KeyCode) {
        if self.show_help {
            self.show_help = false;
            return;
        }

        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('h') | KeyCode::Char('H') => self.show_help = true,
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected + 1 < self.board.controls().len() {
                    self.selected += 1;
                }
            }
            // the simulator is left alone after a failed settle
            _ if self.failed => {}
            KeyCode::Char(' ') | KeyCode::Char('t') | KeyCode::Char('T') => {
                let result = self.board.tick_clock(1);
                if result.is_ok() {
                    self.ticks += 1;
                }
                self.report("tick", result);
            }
            KeyCode::Enter => {
                let Some(name) = self.selected_name() else {
                    self.status = "no controls".to_string();
                    return;
                };
                let result = self.board.act(&name);
                if result.is_ok() && matches!(self.board.control(&name), Ok(Control::Clock(_))) {
                    self.ticks += 1;
                }
                self.report(&name, result);
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let Some(name) = self.selected_name() else {
                    return;
                };
                let bit = c.to_digit(10).unwrap_or(0);
                let result = self.board.toggle_switch(&name, bit);
                self.report(&format!("{name}[{bit}]"), result);
            }
            _ => {}
        }
    }

    fn selected_name(&self) -> Option<String> {
        self.board
            .controls()
            .get(self.selected)
            .map(|(name, _)| name.clone())
    }

    fn report(&mut self, action: &str, result: Result<SettleReport, SimError>) {
        match result {
            Ok(report) => {
                debug!("{action}: settled after {} pass(es)", report.passes);
                self.status = format!("{action}: settled in {} pass(es)", report.passes);
            }
            // rejected before anything was driven
            Err(
                e @ (SimError::NoSuchControl(_)
                | SimError::WrongControl { .. }
                | SimError::InvalidSlice { .. }),
            ) => {
                self.status = e.to_string();
            }
            Err(e) => {
                warn!("{action} failed: {e}");
                self.status = format!("error: {e}");
                self.failed = true;
            }
        }
    }

    fn draw_ui(&self, f: &mut Frame) {
        let size = f.size();

        if self.show_help {
            self.draw_help_screen(f);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(size);

        let title_text = vec![
            Line::from(vec![Span::styled(
                format!("{} ({} ticks)", self.board.name(), self.ticks),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )]),
            Line::from(vec![Span::raw(self.board.description().to_string())]),
        ];
        let title = Paragraph::new(title_text)
            .block(Block::default().borders(Borders::ALL).title("Board"))
            .wrap(Wrap { trim: true });
        f.render_widget(title, chunks[0]);

        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(chunks[1]);

        if self.config.show_probes {
            self.draw_probes(f, content_chunks[0]);
        }
        if self.config.show_controls {
            self.draw_controls(f, content_chunks[1]);
        }

        let style = if self.failed {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::White)
        };
        let status_bar = Paragraph::new(self.status.as_str())
            .style(style)
            .block(Block::default().borders(Borders::ALL).title("Status"));
        f.render_widget(status_bar, chunks[2]);
    }

    fn draw_help_screen(&self, f: &mut Frame) {
        let size = f.size();
        let key = |k: &'static str, what: &'static str| {
            Line::from(vec![
                Span::styled(k, Style::default().fg(Color::Yellow)),
                Span::raw(what),
            ])
        };
        let help_text = vec![
            Line::from(vec![Span::styled(
                "Keys",
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            key("  space, t", " - tick the clock"),
            key("  up, down", " - select a control"),
            key("  enter", " - act on the selected control"),
            key("  0-9", " - toggle a bit of the selected switch"),
            key("  q, esc", " - quit"),
            Line::from(""),
            Line::from(vec![Span::raw("Press any key to return...")]),
        ];

        let help = Paragraph::new(help_text)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Help"));
        f.render_widget(help, size);
    }

    fn draw_probes(&self, f: &mut Frame, area: Rect) {
        let mut lines = Vec::new();
        for probe in self.board.probes() {
            let text = probe.render();
            let mut rows = text.lines();
            let first = rows.next().unwrap_or_default().to_string();
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{:>8} ", probe.label()),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(first),
            ]));
            for row in rows {
                lines.push(Line::from(vec![Span::raw(format!("{:>9}{row}", ""))]));
            }
        }

        let widget = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Probes"))
            .wrap(Wrap { trim: false });
        f.render_widget(widget, area);
    }

    fn draw_controls(&self, f: &mut Frame, area: Rect) {
        let lines: Vec<Line> = self
            .board
            .controls()
            .iter()
            .enumerate()
            .map(|(i, (name, control))| {
                let marker = if i == self.selected { "> " } else { "  " };
                let style = if i == self.selected {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                };
                Line::from(vec![Span::styled(
                    format!("{marker}{name} ({}, {} bit)", control.kind(), control.width()),
                    style,
                )])
            })
            .collect();

        let widget = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Controls"));
        f.render_widget(widget, area);
    }
}

/// Public interface for launching the console
pub fn run_console(board: Board, config: ConsoleConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = ConsoleApp::new(board, config);
    app.run()
}
