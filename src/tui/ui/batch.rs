//! Batch prediction view: CSV path input, loaded-file status, results table.

use std::path::PathBuf;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};
use serde_json::Value;

use crate::application::{BatchOrchestrator, Phase, ScreeningOrchestrator};
use crate::domain::{risk_flag, row_probability, BatchResult, ResultRow};
use crate::tui::styles::MedicalTheme;

use super::{key_hints, render_error, render_footer, render_header, render_loading};

/// Rejected cells listed under the file status before truncating.
const REJECTED_SHOWN: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct BatchView {
    pub path: String,
    /// Transient confirmation, e.g. where the export was written.
    pub notice: Option<String>,
    pub batch: BatchOrchestrator,
    pub screening: ScreeningOrchestrator,
}

impl BatchView {
    pub fn input_char(&mut self, c: char) {
        if !c.is_control() {
            self.path.push(c);
        }
    }

    pub fn delete_char(&mut self) {
        self.path.pop();
    }

    #[must_use]
    pub fn path(&self) -> Option<PathBuf> {
        let trimmed = self.path.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    }

    /// Load the file named by the path buffer.
    pub fn load(&mut self) -> bool {
        let Some(path) = self.path() else {
            return false;
        };
        self.notice = None;
        self.screening.reset();
        let loaded = self.batch.load_csv(&path);
        if loaded {
            tracing::info!("Loaded {} records from CSV", self.batch.records().len());
        }
        loaded
    }

    /// Clear the loaded file, results and any error. The path is kept.
    pub fn reset(&mut self) {
        self.batch.reset();
        self.screening.reset();
        self.notice = None;
    }
}

pub fn render_batch(f: &mut Frame, area: Rect, view: &BatchView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Path input
            Constraint::Length(6), // File status
            Constraint::Min(0),    // Results
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(f, chunks[0], "Batch Prediction", "CSV upload");
    render_path_input(f, chunks[1], view);
    render_file_status(f, chunks[2], view);
    render_results(f, chunks[3], view);

    render_footer(
        f,
        chunks[4],
        key_hints(&[
            ("Enter", "Load"),
            ("^P", "Predict"),
            ("^V", "Validate"),
            ("^E", "Export"),
            ("^R", "Reset"),
            ("^D", "Dismiss"),
            ("Esc", "Back"),
        ]),
    );
}

fn render_path_input(f: &mut Frame, area: Rect, view: &BatchView) {
    let mut spans = vec![Span::raw(" ")];
    if view.path.is_empty() {
        spans.push(Span::styled("path/to/patients.csv", MedicalTheme::text_muted()));
    } else {
        spans.push(Span::styled(view.path.clone(), MedicalTheme::text()));
    }
    spans.push(Span::styled("▌", MedicalTheme::cursor()));

    let block = Block::default()
        .title(Span::styled(" CSV File ", MedicalTheme::focused()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_file_status(f: &mut Frame, area: Rect, view: &BatchView) {
    let batch = &view.batch;
    let mut lines = Vec::new();

    if let Some(message) = batch.parse_error() {
        lines.push(Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(message.to_string(), MedicalTheme::danger()),
        ]));
    } else if batch.records().is_empty() {
        lines.push(Line::from(Span::styled(
            "No file loaded. Type a path and press [Enter].",
            MedicalTheme::text_muted(),
        )));
    } else {
        lines.push(Line::from(vec![
            Span::styled("Records loaded: ", MedicalTheme::text_secondary()),
            Span::styled(batch.records().len().to_string(), MedicalTheme::text()),
        ]));
    }

    let rejected = batch.rejected();
    if !rejected.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("{} row(s) skipped:", rejected.len()),
            MedicalTheme::warning(),
        )));
        lines.extend(rejected.iter().take(REJECTED_SHOWN).map(|e| {
            Line::from(Span::styled(format!("  {e}"), MedicalTheme::text_muted()))
        }));
    }

    match view.screening.batch().phase() {
        Phase::Loading => lines.push(Line::from(Span::styled(
            "Validating records...",
            MedicalTheme::focused(),
        ))),
        Phase::Error(message) => lines.push(Line::from(Span::styled(
            message.clone(),
            MedicalTheme::danger(),
        ))),
        _ => {}
    }
    if let Some(invalid) = view.screening.invalid_count() {
        let style = if invalid == 0 {
            MedicalTheme::success()
        } else {
            MedicalTheme::warning()
        };
        lines.push(Line::from(Span::styled(
            format!("Server validation: {invalid} invalid record(s)"),
            style,
        )));
    }

    if let Some(notice) = &view.notice {
        lines.push(Line::from(Span::styled(notice.clone(), MedicalTheme::info())));
    }

    let block = Block::default()
        .title(Span::styled(" File ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(if batch.parse_error().is_some() {
            MedicalTheme::danger()
        } else {
            MedicalTheme::border()
        });
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn render_results(f: &mut Frame, area: Rect, view: &BatchView) {
    match view.batch.phase() {
        Phase::Idle | Phase::Validating => {
            let content = Paragraph::new(Line::from(Span::styled(
                "Results appear here after [^P]",
                MedicalTheme::text_muted(),
            )))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title(Span::styled(" Results ", MedicalTheme::subtitle()))
                    .borders(Borders::ALL)
                    .border_style(MedicalTheme::border()),
            );
            f.render_widget(content, area);
        }
        Phase::Loading => render_loading(
            f,
            area,
            "Results",
            &format!("Predicting {} records...", view.batch.records().len()),
        ),
        Phase::Error(message) => render_error(f, area, "Results", message),
        Phase::Success(result) => render_result_table(f, area, &view.batch, result),
    }
}

fn render_result_table(f: &mut Frame, area: Rect, batch: &BatchOrchestrator, result: &BatchResult) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Summary
            Constraint::Min(0),    // Table
            Constraint::Length(1), // Preview note
        ])
        .split(area);

    let summary = BatchOrchestrator::summarize(result);
    let summary_lines = vec![
        Line::from(vec![
            Span::styled("Total: ", MedicalTheme::text_secondary()),
            Span::styled(summary.total.to_string(), MedicalTheme::text()),
            Span::styled("  High risk: ", MedicalTheme::text_secondary()),
            Span::styled(summary.high_risk.to_string(), MedicalTheme::danger()),
            Span::styled("  Low risk: ", MedicalTheme::text_secondary()),
            Span::styled(summary.low_risk.to_string(), MedicalTheme::success()),
        ]),
        Line::from(vec![
            Span::styled("Processing time: ", MedicalTheme::text_secondary()),
            Span::styled(result.processing_time_label(), MedicalTheme::text()),
            Span::styled("  Batch: ", MedicalTheme::text_secondary()),
            Span::styled(
                result.batch_id.clone().unwrap_or_else(|| "N/A".to_string()),
                MedicalTheme::text_muted(),
            ),
        ]),
    ];
    f.render_widget(
        Paragraph::new(summary_lines).block(
            Block::default()
                .title(Span::styled(" Summary ", MedicalTheme::subtitle()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border_focused()),
        ),
        chunks[0],
    );

    let preview = batch.preview_rows();
    let columns = preview_columns(preview);

    let header = Row::new(
        columns
            .iter()
            .map(|c| Cell::from(c.clone()))
            .collect::<Vec<_>>(),
    )
    .style(MedicalTheme::header());

    let rows = preview.iter().map(|row| {
        let style = match risk_flag(row) {
            Some(1) => MedicalTheme::danger(),
            _ => MedicalTheme::text(),
        };
        Row::new(
            columns
                .iter()
                .map(|c| Cell::from(display_cell(row, c)))
                .collect::<Vec<_>>(),
        )
        .style(style)
    });

    let widths = vec![Constraint::Fill(1); columns.len().max(1)];
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(Span::styled(" Predictions ", MedicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(table, chunks[1]);

    if let Some(note) = batch.preview_note() {
        f.render_widget(
            Paragraph::new(Span::styled(note, MedicalTheme::text_muted())).alignment(Alignment::Right),
            chunks[2],
        );
    }
}

/// Union of keys across the preview rows, in first-seen order.
fn preview_columns(rows: &[ResultRow]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn display_cell(row: &ResultRow, column: &str) -> String {
    if column == "probability" {
        if let Some(p) = row_probability(row) {
            return format!("{:.1}%", p * 100.0);
        }
    }
    match row.get(column) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
