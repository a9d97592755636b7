//! The interactive terminal session.
//!
//! Single event loop owning the session controller. The remote call runs in
//! a spawned task and reports back over an unbounded channel, so the loop
//! keeps drawing (and the waiting indicator keeps showing) while an exchange
//! is in flight.

use std::error::Error;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::{
    backend::CrosstermBackend,
    crossterm::{
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind},
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    },
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use unicode_width::UnicodeWidthStr;

use crate::core::concierge::{ArixConcierge, Concierge, ConciergeError};
use crate::core::config::RuntimeSettings;
use crate::core::constants::WELCOME_GREETING;
use crate::core::session::{PendingExchange, SessionController};
use crate::core::tuning::{SystemTuningSource, VisualTuning};
use crate::utils::logging::LoggingState;

const GOLD: Color = Color::Rgb(212, 175, 55);

/// A finished remote call travelling back into the event loop.
struct ExchangeOutcome {
    exchange: PendingExchange,
    result: Result<String, ConciergeError>,
}

struct ChatUi {
    session: SessionController,
    logging: LoggingState,
    input: String,
    scroll_offset: u16,
    auto_scroll: bool,
}

impl ChatUi {
    fn new(settings: &RuntimeSettings) -> Result<Self, Box<dyn Error>> {
        let tuning = VisualTuning::initial(&settings.accent_color, settings.ornament_density);
        Ok(Self {
            session: SessionController::new(tuning, Box::new(SystemTuningSource::new())),
            logging: LoggingState::new(settings.log_file.clone())?,
            input: String::new(),
            scroll_offset: 0,
            auto_scroll: true,
        })
    }

    fn build_display_lines(&self) -> Vec<Line<'_>> {
        let mut lines = Vec::new();

        if self.session.transcript().is_empty() {
            lines.push(Line::from(Span::styled(
                format!("\"{WELCOME_GREETING}\""),
                Style::default().fg(GOLD).add_modifier(Modifier::ITALIC),
            )));
            lines.push(Line::from(""));
        }

        for msg in self.session.transcript() {
            if msg.is_user() {
                lines.push(Line::from(vec![
                    Span::styled(
                        "You: ",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(msg.content.as_str(), Style::default().fg(Color::Cyan)),
                ]));
                lines.push(Line::from(""));
            } else {
                for content_line in msg.content.lines() {
                    if content_line.trim().is_empty() {
                        lines.push(Line::from(""));
                    } else {
                        lines.push(Line::from(Span::styled(
                            content_line,
                            Style::default().fg(Color::White),
                        )));
                    }
                }
                lines.push(Line::from(""));
            }
        }

        if self.session.is_pending() {
            lines.push(Line::from(Span::styled(
                "The concierge is listening…",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        lines
    }

    fn max_scroll_offset(&self, available_height: u16) -> u16 {
        let total_lines = self.build_display_lines().len() as u16;
        total_lines.saturating_sub(available_height)
    }

    fn scroll_up(&mut self, amount: u16) {
        self.auto_scroll = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    fn scroll_down(&mut self, amount: u16, available_height: u16) {
        let max_scroll = self.max_scroll_offset(available_height);
        self.scroll_offset = self.scroll_offset.saturating_add(amount).min(max_scroll);
        if self.scroll_offset >= max_scroll {
            self.auto_scroll = true;
        }
    }

    fn stick_to_bottom(&mut self, available_height: u16) {
        if self.auto_scroll {
            self.scroll_offset = self.max_scroll_offset(available_height);
        }
    }
}

fn header_line(ui: &ChatUi) -> Line<'_> {
    let morph = ui.session.morph();
    let tuning = ui.session.tuning();
    Line::from(vec![
        Span::styled(
            " ARIX SIGNATURE ",
            Style::default().fg(GOLD).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("· estate: {} ", morph.label()),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!(
                "· glow {:.2} · spin {:.2} · {} ×{} ",
                tuning.brightness, tuning.spin_rate, tuning.accent_color, tuning.density
            ),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("· log: {} ", ui.logging.get_status_string()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("· Ctrl+T: {}", morph.toggle_hint()),
            Style::default().fg(GOLD),
        ),
    ])
}

fn draw(f: &mut Frame, ui: &ChatUi) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    f.render_widget(Paragraph::new(header_line(ui)), chunks[0]);

    let lines = ui.build_display_lines();
    let available_height = chunks[1].height;
    let total_lines = lines.len() as u16;
    let max_offset = total_lines.saturating_sub(available_height);
    let scroll_offset = ui.scroll_offset.min(max_offset);

    let transcript = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .scroll((scroll_offset, 0));
    f.render_widget(transcript, chunks[1]);

    let input_title = if ui.session.is_pending() {
        "Awaiting the concierge…"
    } else {
        "Manifest your holiday desire (Enter to send, Ctrl+C to quit)"
    };
    let input = Paragraph::new(ui.input.as_str())
        .style(Style::default().fg(GOLD))
        .block(Block::default().borders(Borders::ALL).title(input_title))
        .wrap(Wrap { trim: true });
    f.render_widget(input, chunks[2]);

    f.set_cursor_position((
        chunks[2].x + ui.input.as_str().width() as u16 + 1,
        chunks[2].y + 1,
    ));
}

/// Height of the transcript area given the full terminal height: one header
/// line on top, three input lines below.
fn transcript_height(terminal_height: u16) -> u16 {
    terminal_height.saturating_sub(4)
}

pub async fn run_chat(settings: RuntimeSettings) -> Result<(), Box<dyn Error>> {
    let concierge = Arc::new(ArixConcierge::new(
        settings.base_url.clone(),
        settings.api_key.clone(),
        settings.model.clone(),
        settings.temperature,
        settings.max_tokens,
    ));
    let mut ui = ChatUi::new(&settings)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<ExchangeOutcome>();

    let result = run_event_loop(&mut terminal, &mut ui, concierge, tx, &mut rx).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ui: &mut ChatUi,
    concierge: Arc<ArixConcierge>,
    tx: mpsc::UnboundedSender<ExchangeOutcome>,
    rx: &mut mpsc::UnboundedReceiver<ExchangeOutcome>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| draw(f, ui))?;

        let terminal_height = terminal.size().map(|s| s.height).unwrap_or_default();
        let available_height = transcript_height(terminal_height);

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(());
                    }
                    KeyCode::Char('t') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        ui.session.toggle_morph();
                    }
                    KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        // Status feedback lives in the header; an error here
                        // just means no log file was configured.
                        let _ = ui.logging.toggle_logging();
                    }
                    KeyCode::Enter => {
                        // One exchange at a time; the controller itself
                        // tolerates interleaving, the UI chooses not to.
                        if ui.session.is_pending() || ui.input.trim().is_empty() {
                            continue;
                        }
                        let raw = std::mem::take(&mut ui.input);
                        if let Some(exchange) = ui.session.begin_exchange(&raw) {
                            if let Err(e) = ui.logging.log_message(&format!("You: {}", exchange.input)) {
                                tracing::warn!("failed to log user turn: {e}");
                            }
                            ui.stick_to_bottom(available_height);
                            spawn_exchange(&concierge, &tx, exchange);
                        }
                    }
                    KeyCode::Char(c) => {
                        ui.input.push(c);
                    }
                    KeyCode::Backspace => {
                        ui.input.pop();
                    }
                    KeyCode::Up => {
                        ui.scroll_up(1);
                    }
                    KeyCode::Down => {
                        ui.scroll_down(1, available_height);
                    }
                    _ => {}
                },
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => {
                        ui.scroll_up(3);
                    }
                    MouseEventKind::ScrollDown => {
                        ui.scroll_down(3, available_height);
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        while let Ok(outcome) = rx.try_recv() {
            ui.session
                .resolve_exchange(&outcome.exchange, outcome.result);
            if let Some(reply) = ui.session.transcript().last().filter(|m| m.is_assistant()) {
                if let Err(e) = ui.logging.log_message(&reply.content) {
                    tracing::warn!("failed to log assistant turn: {e}");
                }
            }
            ui.stick_to_bottom(available_height);
        }
    }
}

fn spawn_exchange(
    concierge: &Arc<ArixConcierge>,
    tx: &mpsc::UnboundedSender<ExchangeOutcome>,
    exchange: PendingExchange,
) {
    let concierge = Arc::clone(concierge);
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = concierge.reply(&exchange.input, &exchange.history).await;
        let _ = tx.send(ExchangeOutcome { exchange, result });
    });
}
