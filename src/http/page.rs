//! HTML status page

use crate::session::{Session, SessionStatus, StatusSummary};
use chrono::Local;
use std::fmt::Write;

const STYLE: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background: #f5f5f5; color: #333; }
.header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 20px; border-radius: 8px; margin-bottom: 20px; }
.header h1 { margin: 0 0 10px 0; font-size: 24px; }
.summary { display: flex; gap: 20px; margin-bottom: 20px; flex-wrap: wrap; }
.summary-card { background: white; padding: 15px 20px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); min-width: 120px; }
.summary-card h3 { margin: 0 0 5px 0; font-size: 14px; color: #666; text-transform: uppercase; }
.summary-card .number { font-size: 24px; font-weight: bold; margin: 0; }
.live { color: #28a745; } .error { color: #dc3545; } .stopped { color: #6c757d; } .connecting { color: #b8860b; }
.config-cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(280px, 1fr)); gap: 15px; margin-bottom: 20px; }
.config-card { background: white; border: 1px solid #e9ecef; border-radius: 6px; padding: 15px; }
.config-card h3 { margin: 0 0 10px 0; font-size: 16px; border-bottom: 1px solid #dee2e6; padding-bottom: 8px; }
.config-item { display: flex; justify-content: space-between; margin-bottom: 6px; font-size: 14px; }
.config-value { font-family: monospace; background: #e9ecef; padding: 2px 6px; border-radius: 3px; }
table { width: 100%; border-collapse: collapse; background: white; border-radius: 8px; }
th, td { padding: 12px 15px; text-align: left; border-bottom: 1px solid #eee; }
th { background: #f8f9fa; }
.status-live { background: #d4edda; } .status-error { background: #f8d7da; }
.status-connecting { background: #fff3cd; } .status-stopped { background: #e2e3e5; }
.last-updated { text-align: center; margin-top: 20px; color: #666; font-size: 14px; }
"#;

/// Table order: problems first, healthy sessions last, then by id
fn display_rank(status: SessionStatus) -> u8 {
    match status {
        SessionStatus::Error => 0,
        SessionStatus::Connecting => 1,
        SessionStatus::Stopped => 2,
        SessionStatus::Live => 3,
    }
}

fn icon(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Live => "✅",
        SessionStatus::Connecting => "🔄",
        SessionStatus::Error => "❌",
        SessionStatus::Stopped => "⏹️",
    }
}

/// Minimal HTML escaping for text and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Sessions sorted the way the status table shows them
pub fn display_order(sessions: &[Session]) -> Vec<&Session> {
    let mut sorted: Vec<&Session> = sessions.iter().collect();
    sorted.sort_by(|a, b| {
        display_rank(a.status)
            .cmp(&display_rank(b.status))
            .then_with(|| a.id.cmp(&b.id))
    });
    sorted
}

pub fn render(service_name: &str, sessions: &[Session]) -> String {
    let summary = StatusSummary::from_sessions(sessions);
    let title = format!("{} Status", escape(service_name));

    let mut html = String::with_capacity(8 * 1024);
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<meta http-equiv="refresh" content="5">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
<div class="header"><h1>{title}</h1><p>Real-time monitoring of audio stream encoders</p></div>
"#
    );

    render_summary(&mut html, &summary);
    render_config_cards(&mut html, sessions);
    render_table(&mut html, sessions);

    let _ = write!(
        html,
        r#"<div class="last-updated">Last updated: {} | auto-refresh every 5s</div>
</body>
</html>
"#,
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    html
}

fn render_summary(html: &mut String, summary: &StatusSummary) {
    let cards = [
        ("Live Streams", "live", summary.live),
        ("Connecting", "connecting", summary.connecting),
        ("Errors", "error", summary.error),
        ("Stopped", "stopped", summary.stopped),
        ("Total", "", summary.total),
    ];

    html.push_str("<div class=\"summary\">\n");
    for (label, class, count) in cards {
        let _ = writeln!(
            html,
            r#"<div class="summary-card"><h3>{label}</h3><p class="number {class}">{count}</p></div>"#
        );
    }
    html.push_str("</div>\n");

    if !summary.error_ids.is_empty() {
        let _ = writeln!(
            html,
            r#"<p class="error">Error encoders: {}</p>"#,
            escape(&summary.error_ids.join(", "))
        );
    }
}

fn render_config_cards(html: &mut String, sessions: &[Session]) {
    html.push_str("<h2>Configuration</h2>\n<div class=\"config-cards\">\n");

    for session in sessions {
        let enc = session.config.summary();
        let _ = write!(
            html,
            r#"<div class="config-card"><h3>{}</h3>
<div class="config-item"><span>Audio Card:</span><span class="config-value">{}</span></div>
<div class="config-item"><span>Format:</span><span class="config-value">{}</span></div>
<div class="config-item"><span>Bitrate:</span><span class="config-value">{} kbps</span></div>
<div class="config-item"><span>Channels / Rate:</span><span class="config-value">{} / {} Hz</span></div>
"#,
            escape(&session.id),
            escape(&enc.capture_device),
            escape(&enc.format),
            enc.bitrate,
            enc.channels,
            enc.sample_rate,
        );
        if let Some(filter) = &enc.audio_filter {
            let _ = writeln!(
                html,
                r#"<div class="config-item"><span>Audio Filter:</span><span class="config-value">{}</span></div>"#,
                escape(filter)
            );
        }
        html.push_str("</div>\n");
    }

    html.push_str("</div>\n");
}

fn render_table(html: &mut String, sessions: &[Session]) {
    html.push_str(
        "<table>\n<thead><tr><th>Stream ID</th><th>Status</th><th>Bitrate</th>\
         <th>Format</th><th>Mount</th><th>Server</th></tr></thead>\n<tbody>\n",
    );

    if sessions.is_empty() {
        html.push_str(
            "<tr><td colspan=\"6\" style=\"text-align: center; color: #666; padding: 40px;\">\
             No streams configured</td></tr>\n",
        );
    }

    for session in display_order(sessions) {
        let status = session.status;
        let relay = &session.config.relay;
        let _ = writeln!(
            html,
            r#"<tr class="status-{}"><td>{}</td><td>{} {}</td><td>{} kbps</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
            status.as_str(),
            escape(&session.id),
            icon(status),
            status.label(),
            session.config.bitrate,
            escape(&session.config.format),
            escape(&relay.mount),
            escape(&relay.server),
        );
    }

    html.push_str("</tbody>\n</table>\n");
}
