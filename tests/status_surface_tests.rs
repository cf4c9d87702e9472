// Tests for the console table and the HTML page renderer

mod common;

use common::encoder;
use stream_encoder::console::render_table;
use stream_encoder::http::page;
use stream_encoder::{Session, SessionStatus};

fn sessions() -> Vec<Session> {
    let mut live = Session::new(encoder("zeta"));
    live.status = SessionStatus::Live;
    let mut failed = Session::new(encoder("alpha"));
    failed.status = SessionStatus::Error;
    let stopped = Session::new(encoder("mid"));
    vec![live, failed, stopped]
}

#[test]
fn test_console_table_rows_and_summary() {
    let table = render_table(&sessions());

    assert!(table.starts_with("ID"));
    assert!(table.contains("zeta"));
    assert!(table.contains("relay.local:8000:zeta"));
    assert!(table.contains("Active: 1 | Connecting: 0 | Error: 1 | Stopped: 1 | Total: 3"));
    assert!(table.contains("Error encoders: alpha"));
}

#[test]
fn test_console_table_empty() {
    let table = render_table(&[]);

    assert!(table.contains("No encoders configured"));
    assert!(table.contains("Total: 0"));
    assert!(table.contains("No errors detected"));
}

#[test]
fn test_page_orders_problems_first() {
    let all = sessions();
    let ordered: Vec<&str> = page::display_order(&all)
        .iter()
        .map(|s| s.id.as_str())
        .collect();

    assert_eq!(ordered, vec!["alpha", "mid", "zeta"]);
}

#[test]
fn test_page_escapes_html() {
    let mut hostile = Session::new(encoder("<script>"));
    hostile.config.relay.mount = "a&b".to_string();

    let html = page::render("svc", &[hostile]);

    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
    assert!(html.contains("a&amp;b"));
}

#[test]
fn test_page_shows_counts() {
    let html = page::render("svc", &sessions());

    assert!(html.contains("<h3>Live Streams</h3><p class=\"number live\">1</p>"));
    assert!(html.contains("<h3>Total</h3><p class=\"number \">3</p>"));
    assert!(html.contains("Error encoders: alpha"));
}
