//! Console status surfaces
//!
//! `--console` takes over the terminal with a ratatui dashboard (log pane,
//! colour-coded encoder grid, error list). Without it a one-line summary is
//! logged whenever the counts change. [`render_table`] is the plain-text
//! form of the same data.

mod dashboard;
mod log_buffer;

pub use dashboard::{column_widths, draw, run_threaded, status_color, MIN_HEIGHT, MIN_WIDTH};
pub use log_buffer::{LogBuffer, LogWriter};

use crate::session::{Session, SharedRegistry, StatusSummary};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

const ID_WIDTH: usize = 14;
const STATUS_WIDTH: usize = 12;
const SOURCE_WIDTH: usize = 20;

fn cell(text: &str, width: usize) -> String {
    let clipped: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{clipped:<width$}")
}

/// Plain-text status table followed by the summary and error list
pub fn render_table(sessions: &[Session]) -> String {
    let summary = StatusSummary::from_sessions(sessions);
    let mut out = String::new();

    if sessions.is_empty() {
        out.push_str("No encoders configured\n");
    } else {
        let header = format!(
            "{}{}{}{}",
            cell("ID", ID_WIDTH),
            cell("Status", STATUS_WIDTH),
            cell("Source", SOURCE_WIDTH),
            "Target"
        );
        out.push_str(&header);
        out.push('\n');
        out.push_str(&"-".repeat(header.chars().count()));
        out.push('\n');

        for session in sessions {
            let relay = &session.config.relay;
            let source = if session.config.capture_device.is_empty() {
                "N/A"
            } else {
                session.config.capture_device.as_str()
            };
            out.push_str(&format!(
                "{}{}{}{}:{}\n",
                cell(&session.id, ID_WIDTH),
                cell(session.status.label(), STATUS_WIDTH),
                cell(source, SOURCE_WIDTH),
                relay.server,
                relay.mount
            ));
        }
    }

    out.push('\n');
    out.push_str(&summary.line());
    out.push('\n');

    if summary.error_ids.is_empty() {
        out.push_str("No errors detected\n");
    } else {
        out.push_str(&format!("Error encoders: {}\n", summary.error_ids.join(", ")));
    }

    out
}

/// Log the summary line whenever it changes; stops when `cancel` fires
pub fn spawn_summary(
    registry: SharedRegistry,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        let mut last_line = String::new();

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = cancel.cancelled() => break,
            }

            let line = registry.read().await.summary().line();
            if line != last_line {
                info!("{}", line);
                last_line = line;
            }
        }
    })
}
