//! Dashboard view: service status and recent activity.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::application::{Lifecycle, Phase, StatusOrchestrator};
use crate::domain::{BatchSummary, PredictionResult, ServiceStatus};
use crate::tui::styles::MedicalTheme;

use super::render_header;

/// What the dashboard shows besides service status.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overview<'a> {
    pub endpoint: &'a str,
    pub last_prediction: Option<&'a PredictionResult>,
    pub last_batch: Option<BatchSummary>,
}

/// Render the main dashboard view.
pub fn render_dashboard(f: &mut Frame, area: Rect, status: &StatusOrchestrator, overview: Overview<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
        ])
        .split(area);

    render_header(f, chunks[0], "GlucoTrack", "Diabetes Risk Prediction");

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40), // Status panels
            Constraint::Percentage(60), // Recent activity
        ])
        .split(chunks[1]);

    render_status_panels(f, body[0], status, overview.endpoint);
    render_recent(f, body[1], overview);
}

fn render_status_panels(f: &mut Frame, area: Rect, status: &StatusOrchestrator, endpoint: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Service status
            Constraint::Min(0),    // Quick actions
        ])
        .margin(1)
        .split(area);

    let mut items = vec![
        probe_line("Health", status.health()),
        probe_line("Ready", status.ready()),
    ];
    if let Some(ready) = status.ready().value() {
        items.push(format_status_item("Model loaded", ready.model_loaded));
        items.push(format_status_item("Scaler loaded", ready.scaler_loaded));
    }
    items.push(Line::from(vec![
        Span::styled("  API: ", MedicalTheme::text_secondary()),
        Span::styled(endpoint.to_string(), MedicalTheme::text_muted()),
    ]));

    let status_block = Block::default()
        .title(Span::styled(" Service Status ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(if status.is_ready() {
            MedicalTheme::border()
        } else {
            MedicalTheme::warning()
        });
    f.render_widget(Paragraph::new(items).block(status_block), chunks[0]);

    let actions = vec![
        action("P", "Single Prediction"),
        action("B", "Batch Prediction (CSV)"),
        action("M", "Model Information"),
        action("R", "Recheck Service"),
        action("Q", "Quit"),
    ];
    let actions_block = Block::default()
        .title(Span::styled(" Quick Actions ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());
    f.render_widget(Paragraph::new(actions).block(actions_block), chunks[1]);
}

fn action(key: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("[{key}] "), MedicalTheme::key_hint()),
        Span::styled(desc.to_string(), MedicalTheme::key_desc()),
    ])
}

fn probe_line(label: &str, probe: &Lifecycle<ServiceStatus>) -> Line<'static> {
    let (text, style) = match probe.phase() {
        Phase::Idle | Phase::Validating => ("not checked".to_string(), MedicalTheme::text_muted()),
        Phase::Loading => ("checking...".to_string(), MedicalTheme::focused()),
        Phase::Success(status) => (status.summary(), MedicalTheme::success()),
        Phase::Error(message) => (message.clone(), MedicalTheme::danger()),
    };
    Line::from(vec![
        Span::styled(format!("  {label}: "), MedicalTheme::text_secondary()),
        Span::styled(text, style),
    ])
}

fn format_status_item(label: &str, flag: Option<bool>) -> Line<'static> {
    let (icon, style) = match flag {
        Some(true) => ("OK", MedicalTheme::success()),
        Some(false) => ("FAIL", MedicalTheme::danger()),
        None => ("?", MedicalTheme::text_muted()),
    };

    Line::from(vec![
        Span::styled(format!("  {icon} "), style),
        Span::styled(label.to_string(), MedicalTheme::text()),
    ])
}

fn render_recent(f: &mut Frame, area: Rect, overview: Overview<'_>) {
    let block = Block::default()
        .title(Span::styled(" Recent Activity ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    if overview.last_prediction.is_none() && overview.last_batch.is_none() {
        let empty_msg = Paragraph::new(Line::from(vec![Span::styled(
            "No predictions yet. Press [P] or [B] to start.",
            MedicalTheme::text_muted(),
        )]))
        .block(block);
        f.render_widget(empty_msg, area);
        return;
    }

    let mut lines = Vec::new();
    if let Some(result) = overview.last_prediction {
        lines.push(Line::from(Span::styled("Last prediction", MedicalTheme::text_secondary())));
        lines.push(Line::from(vec![
            Span::styled(format!("  {} ", result.risk_label()), MedicalTheme::risk_banner(result.is_high_risk())),
            Span::styled(
                format!("  {}", result.probability_percent()),
                MedicalTheme::risk_level(result.risk_level()),
            ),
        ]));
        lines.push(Line::from(""));
    }
    if let Some(summary) = overview.last_batch {
        lines.push(Line::from(Span::styled("Last batch", MedicalTheme::text_secondary())));
        lines.push(Line::from(vec![
            Span::styled("  Total: ", MedicalTheme::text_secondary()),
            Span::styled(summary.total.to_string(), MedicalTheme::text()),
            Span::styled("  High: ", MedicalTheme::text_secondary()),
            Span::styled(summary.high_risk.to_string(), MedicalTheme::danger()),
            Span::styled("  Low: ", MedicalTheme::text_secondary()),
            Span::styled(summary.low_risk.to_string(), MedicalTheme::success()),
        ]));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}
