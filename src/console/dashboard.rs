use super::LogBuffer;
use crate::session::{Session, SessionStatus, SharedRegistry, StatusSummary};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

pub const MIN_WIDTH: u16 = 40;
pub const MIN_HEIGHT: u16 = 10;

const ERROR_PANE_HEIGHT: u16 = 3;
const INPUT_POLL: Duration = Duration::from_millis(100);

/// Row colour for a session status
pub fn status_color(status: SessionStatus) -> Color {
    match status {
        SessionStatus::Live => Color::Green,
        SessionStatus::Connecting => Color::Yellow,
        SessionStatus::Error => Color::Red,
        SessionStatus::Stopped => Color::Gray,
    }
}

/// Widths of the id, status and source columns; target takes the rest
pub fn column_widths(width: u16) -> [u16; 3] {
    if width >= 80 {
        [12, 12, 20]
    } else if width >= 60 {
        [10, 10, 15]
    } else {
        [8, 8, 12]
    }
}

fn log_pane_height(height: u16) -> u16 {
    let rows = if height >= 30 {
        height * 3 / 10
    } else if height >= 20 {
        (height / 4).max(5)
    } else {
        (height / 5).max(3)
    };
    rows.max(3)
}

/// Run the dashboard on the calling thread until `cancel` fires
///
/// Blocks, so call it from `spawn_blocking`. Quitting with `q` or Ctrl-C,
/// or leaving the dashboard on an error, cancels `cancel`.
pub fn run_threaded(
    registry: SharedRegistry,
    logs: LogBuffer,
    refresh: Duration,
    cancel: CancellationToken,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let res = Terminal::new(CrosstermBackend::new(stdout))
        .context("create terminal")
        .and_then(|mut terminal| {
            terminal.hide_cursor().ok();
            terminal.clear().ok();
            let res = event_loop(&mut terminal, &registry, &logs, refresh, &cancel);
            terminal.show_cursor().ok();
            res
        });

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    cancel.cancel();
    res
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    registry: &SharedRegistry,
    logs: &LogBuffer,
    refresh: Duration,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut last_draw: Option<Instant> = None;

    while !cancel.is_cancelled() {
        if last_draw.map_or(true, |at| at.elapsed() >= refresh) {
            let sessions = registry.blocking_read().list().to_vec();
            let height = terminal.size().map(|size| size.height).unwrap_or(MIN_HEIGHT);
            let lines = logs.recent(height as usize);

            terminal
                .draw(|f| draw(f, &sessions, &lines))
                .context("draw dashboard")?;
            last_draw = Some(Instant::now());
        }

        if !event::poll(INPUT_POLL).context("poll terminal events")? {
            continue;
        }
        match event::read().context("read terminal event")? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match (key.modifiers, key.code) {
                (_, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                    cancel.cancel();
                }
                _ => {}
            },
            // Redraw at the new size straight away
            Event::Resize(_, _) => last_draw = None,
            _ => {}
        }
    }

    Ok(())
}

/// Draw one dashboard frame: log pane, encoder status grid, error pane
pub fn draw(f: &mut Frame, sessions: &[Session], logs: &[String]) {
    let area = f.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let text = vec![
            Line::styled(
                format!(
                    "Terminal too small! Min: {}x{}, Current: {}x{}",
                    MIN_WIDTH, MIN_HEIGHT, area.width, area.height
                ),
                Style::default().fg(Color::Red),
            ),
            Line::styled(
                "Resize the terminal or run without --console",
                Style::default().fg(Color::Yellow),
            ),
        ];
        f.render_widget(Paragraph::new(text), area);
        return;
    }

    let summary = StatusSummary::from_sessions(sessions);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(log_pane_height(area.height)),
            Constraint::Min(5),
            Constraint::Length(ERROR_PANE_HEIGHT),
        ])
        .split(area);

    draw_logs(f, chunks[0], logs);
    draw_status(f, chunks[1], sessions, &summary);
    draw_errors(f, chunks[2], &summary);
}

fn log_style(line: &str) -> Style {
    let color = if line.contains("ERROR") {
        Color::Red
    } else if line.contains("WARN") {
        Color::Yellow
    } else if line.contains("DEBUG") || line.contains("TRACE") {
        Color::DarkGray
    } else {
        Color::White
    };
    Style::default().fg(color)
}

fn draw_logs(f: &mut Frame, area: Rect, logs: &[String]) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Logs ")
        .border_style(Style::default().fg(Color::Blue));

    let visible = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = logs
        .iter()
        .skip(logs.len().saturating_sub(visible))
        .map(|line| Line::styled(line.as_str(), log_style(line)))
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_status(f: &mut Frame, area: Rect, sessions: &[Session], summary: &StatusSummary) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Encoder Status ")
        .border_style(Style::default().fg(Color::Green));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    if sessions.is_empty() {
        f.render_widget(
            Paragraph::new(Line::styled(
                "No encoders configured",
                Style::default().fg(Color::Gray),
            )),
            parts[0],
        );
    } else {
        let [id_width, status_width, source_width] = column_widths(inner.width);
        let header = Row::new(["ID", "Status", "Source", "Target"]).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

        let rows = sessions.iter().map(|session| {
            let source = if session.config.capture_device.is_empty() {
                "N/A"
            } else {
                session.config.capture_device.as_str()
            };
            let relay = &session.config.relay;

            Row::new(vec![
                Cell::from(session.id.as_str()).style(Style::default().fg(Color::White)),
                Cell::from(session.status.label())
                    .style(Style::default().fg(status_color(session.status))),
                Cell::from(source).style(Style::default().fg(Color::Cyan)),
                Cell::from(format!("{}:{}", relay.server, relay.mount))
                    .style(Style::default().fg(Color::Magenta)),
            ])
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(id_width),
                Constraint::Length(status_width),
                Constraint::Length(source_width),
                Constraint::Min(10),
            ],
        )
        .header(header);

        f.render_widget(table, parts[0]);
    }

    f.render_widget(
        Paragraph::new(Line::styled(
            summary.line(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        parts[1],
    );
}

fn draw_errors(f: &mut Frame, area: Rect, summary: &StatusSummary) {
    let (color, text) = if summary.error_ids.is_empty() {
        (Color::Green, "No errors detected".to_string())
    } else {
        (
            Color::Red,
            format!("Error encoders: {}", summary.error_ids.join(", ")),
        )
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Errors ")
        .border_style(Style::default().fg(color));

    f.render_widget(
        Paragraph::new(Line::styled(text, Style::default().fg(color))).block(block),
        area,
    );
}
