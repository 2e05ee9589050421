//! Plain-text rendering of presence state for the terminal.

use lookout_presence::{ConnectionStatus, Visitor, VisitorStatus};

fn status_label(status: VisitorStatus) -> &'static str {
    match status {
        VisitorStatus::Active => "active",
        VisitorStatus::VideoInvited => "invited",
        VisitorStatus::InCall => "in call",
        VisitorStatus::Unknown => "?",
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

/// One line per visitor.
pub fn visitor_line(visitor: &Visitor) -> String {
    let mut line = format!(
        "{:<12} {:<8} {:<24} {:<20} views={:<4} last={}",
        visitor.visitor_id,
        status_label(visitor.status),
        or_dash(&visitor.company),
        or_dash(&visitor.location),
        visitor.page_views,
        or_dash(&visitor.last_activity),
    );
    if let Some(url) = &visitor.guest_url {
        line.push_str(&format!(" guest={url}"));
    }
    line
}

pub fn visitor_table(visitors: &[Visitor]) -> String {
    if visitors.is_empty() {
        return "  (no visitors)".to_string();
    }
    visitors
        .iter()
        .map(|v| format!("  {}", visitor_line(v)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn status_line(status: ConnectionStatus) -> String {
    format!("[{status}]")
}
