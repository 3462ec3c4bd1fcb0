//! Model screen: metadata, evaluation metrics and the feature catalog.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::application::{Lifecycle, ModelOrchestrator, Phase};
use crate::domain::{FeatureCatalog, ModelInfo, ModelMetrics};
use crate::tui::styles::MedicalTheme;

use super::{key_hints, render_error, render_footer, render_header, render_loading};

pub fn render_model(f: &mut Frame, area: Rect, model: &ModelOrchestrator) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Panels
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(f, chunks[0], "Model", "Metadata and evaluation");

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Info
            Constraint::Min(0),    // Metrics
        ])
        .split(columns[0]);

    panel(f, left[0], "Model Info", model.info(), render_info);
    panel(f, left[1], "Metrics", model.metrics(), render_metrics);
    panel(f, columns[1], "Features", model.features(), render_features);

    let mut footer = key_hints(&[("R", "Reload model"), ("F", "Refresh"), ("Esc", "Back")]);
    footer.spans.extend(reload_status(model));
    render_footer(f, chunks[2], footer);
}

/// Each panel has its own loading and error state.
fn panel<T>(
    f: &mut Frame,
    area: Rect,
    title: &str,
    state: &Lifecycle<T>,
    render: fn(&mut Frame, Rect, &T),
) {
    match state.phase() {
        Phase::Idle | Phase::Validating => {
            let content = Paragraph::new(Line::from(Span::styled(
                "Not loaded. Press [F] to fetch.",
                MedicalTheme::text_muted(),
            )))
            .block(block(title));
            f.render_widget(content, area);
        }
        Phase::Loading => render_loading(f, area, title, "Loading..."),
        Phase::Error(message) => render_error(f, area, title, message),
        Phase::Success(value) => {
            let outer = block(title);
            let inner = outer.inner(area);
            f.render_widget(outer, area);
            render(f, inner, value);
        }
    }
}

fn block(title: &str) -> Block<'static> {
    Block::default()
        .title(Span::styled(format!(" {title} "), MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border())
}

fn pair(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {label}: "), MedicalTheme::text_secondary()),
        Span::styled(value, MedicalTheme::text()),
    ])
}

fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| "N/A".to_string())
}

fn render_info(f: &mut Frame, area: Rect, info: &ModelInfo) {
    let lines = vec![
        pair("Algorithm", or_na(info.algorithm.clone())),
        pair("Version", or_na(info.version.clone())),
        pair(
            "Trained",
            or_na(
                info.trained_on()
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .or_else(|| info.trained_at.clone()),
            ),
        ),
        pair("ROC-AUC", or_na(info.roc_auc.map(|v| format!("{v:.3}")))),
        pair("Features", or_na(info.features.map(|n| n.to_string()))),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn render_metrics(f: &mut Frame, area: Rect, metrics: &ModelMetrics) {
    let mut lines: Vec<Line> = metrics
        .scalars()
        .into_iter()
        .map(|(name, value)| pair(name, format!("{value:.3}")))
        .collect();

    if let Some(matrix) = &metrics.confusion_matrix {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " Confusion matrix (rows: actual, cols: predicted)",
            MedicalTheme::text_secondary(),
        )));
        lines.extend(matrix.iter().map(|row| {
            let cells = row
                .iter()
                .map(|n| format!("{n:>8}"))
                .collect::<Vec<_>>()
                .join("");
            Line::from(Span::styled(cells, MedicalTheme::text()))
        }));
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            " No metrics reported",
            MedicalTheme::text_muted(),
        )));
    }
    f.render_widget(Paragraph::new(lines), area);
}

fn render_features(f: &mut Frame, area: Rect, catalog: &FeatureCatalog) {
    let header = Row::new(vec!["Name", "Type", "Required", "Domain"]).style(MedicalTheme::header());
    let rows = catalog.features.iter().map(|feature| {
        Row::new(vec![
            Cell::from(feature.name.clone()),
            Cell::from(format!("{:?}", feature.kind).to_lowercase()),
            Cell::from(match feature.required {
                Some(true) => "yes",
                Some(false) => "no",
                None => "-",
            }),
            Cell::from(feature.domain()),
        ])
        .style(MedicalTheme::text())
    });

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(30),
            Constraint::Percentage(15),
            Constraint::Percentage(12),
            Constraint::Percentage(43),
        ],
    )
    .header(header);
    f.render_widget(table, area);
}

fn reload_status(model: &ModelOrchestrator) -> Vec<Span<'static>> {
    match model.reload().phase() {
        Phase::Loading => vec![Span::styled("  Reloading...", MedicalTheme::focused())],
        Phase::Error(message) => vec![Span::styled(format!("  {message}"), MedicalTheme::danger())],
        Phase::Success(status) => vec![Span::styled(
            format!(
                "  Reloaded{}",
                status
                    .version
                    .as_ref()
                    .map(|v| format!(" ({v})"))
                    .unwrap_or_default()
            ),
            MedicalTheme::success(),
        )],
        Phase::Idle | Phase::Validating => Vec::new(),
    }
}
