//! Single-patient prediction: input form and result panel.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};
use zeroize::Zeroize;

use crate::application::{Phase, PredictionOrchestrator, ScreeningOrchestrator};
use crate::domain::{Field, FieldErrors, PatientRecord, PredictionResult};
use crate::tui::styles::MedicalTheme;

use super::{key_hints, render_error, render_footer, render_header, render_loading};

#[derive(Debug, Clone)]
pub struct FormField {
    pub field: Field,
    pub hint: &'static str,
    pub value: String,
}

fn hint(field: Field) -> &'static str {
    match field {
        Field::Gender => "←/→ to choose",
        Field::Age => "years (1-120)",
        Field::Hypertension | Field::HeartDisease => "0=no, 1=yes",
        Field::SmokingHistory => "←/→ to choose",
        Field::Bmi => "kg/m² (10-80)",
        Field::Hba1cLevel => "% (3.5-15)",
        Field::BloodGlucoseLevel => "mg/dL (50-400)",
    }
}

/// Editable form buffers plus the errors shown next to each field.
#[derive(Debug, Clone)]
pub struct PredictFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub errors: FieldErrors,
}

impl Default for PredictFormState {
    fn default() -> Self {
        Self {
            fields: Field::ALL
                .iter()
                .map(|&field| FormField {
                    field,
                    hint: hint(field),
                    value: String::new(),
                })
                .collect(),
            selected_field: 0,
            errors: FieldErrors::default(),
        }
    }
}

impl PredictFormState {
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    fn current(&mut self) -> &mut FormField {
        &mut self.fields[self.selected_field]
    }

    /// Type into a numeric field. Categorical fields ignore typing.
    pub fn input_char(&mut self, c: char) {
        let field = self.current();
        if field.field.is_numeric() && (c.is_ascii_digit() || c == '.' || c == '-') {
            field.value.push(c);
            let key = field.field;
            self.clear_error(key);
        }
    }

    pub fn delete_char(&mut self) {
        self.current().value.pop();
    }

    pub fn clear_field(&mut self) {
        self.current().value.clear();
    }

    /// Step through the allowed terms of a categorical field.
    pub fn cycle_choice(&mut self, forward: bool) {
        let field = self.current();
        let Some(choices) = field.field.choices() else {
            return;
        };
        let next = match choices.iter().position(|c| *c == field.value) {
            Some(i) if forward => (i + 1) % choices.len(),
            Some(i) => (i + choices.len() - 1) % choices.len(),
            None if forward => 0,
            None => choices.len() - 1,
        };
        field.value = choices[next].to_string();
        let key = field.field;
        self.clear_error(key);
    }

    fn clear_error(&mut self, field: Field) {
        let mut remaining = FieldErrors::default();
        for (f, message) in self.errors.iter().filter(|(f, _)| *f != field) {
            remaining.insert(f, message);
        }
        self.errors = remaining;
    }

    /// Build the raw record. Empty buffers stay missing; text that is not a
    /// number is reported against its field.
    ///
    /// # Errors
    /// Returns the fields whose text does not parse.
    pub fn to_record(&self) -> Result<PatientRecord, FieldErrors> {
        let mut record = PatientRecord::default();
        let mut errors = FieldErrors::default();

        for input in &self.fields {
            let text = input.value.trim();
            if text.is_empty() {
                continue;
            }
            if input.field.is_numeric() {
                match text.parse::<f64>() {
                    Ok(v) if v.is_finite() => record.set_number(input.field, v),
                    _ => errors.insert(input.field, format!("{} must be a number", input.field)),
                }
            } else {
                record.set_text(input.field, text);
            }
        }

        if errors.is_empty() {
            Ok(record)
        } else {
            Err(errors)
        }
    }

    /// Wipe every buffer from memory and return to the first field.
    pub fn clear_sensitive(&mut self) {
        for field in &mut self.fields {
            field.value.zeroize();
        }
        self.errors = FieldErrors::default();
        self.selected_field = 0;
    }

    pub fn load_sample_data(&mut self) {
        let sample = ["Male", "30", "0", "0", "never", "25", "5.5", "110"];
        for (input, value) in self.fields.iter_mut().zip(sample) {
            input.value = value.to_string();
        }
        self.errors = FieldErrors::default();
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|f| f.value.is_empty())
    }
}

/// Everything the prediction screen owns.
#[derive(Debug, Clone, Default)]
pub struct PredictView {
    pub form: PredictFormState,
    pub prediction: PredictionOrchestrator,
    pub screening: ScreeningOrchestrator,
}

impl PredictView {
    /// Clear the result, any error and every form value.
    pub fn reset(&mut self) {
        self.prediction.reset();
        self.screening.reset();
        self.form.clear_sensitive();
    }
}

pub fn render_predict(f: &mut Frame, area: Rect, view: &PredictView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form + result
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(f, chunks[0], "Risk Prediction", "Single patient");

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    render_form_fields(f, body[0], &view.form);
    render_result_panel(f, body[1], view);

    render_footer(
        f,
        chunks[2],
        key_hints(&[
            ("↑↓", "Navigate"),
            ("←→", "Choose"),
            ("Enter", "Predict"),
            ("V", "Validate"),
            ("S", "Sample"),
            ("R", "Reset"),
            ("Esc", "Back"),
        ]),
    );
}

fn render_form_fields(f: &mut Frame, area: Rect, form: &PredictFormState) {
    let constraints: Vec<Constraint> = form
        .fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .margin(1)
        .split(area);

    for (i, input) in form.fields.iter().enumerate() {
        let is_selected = i == form.selected_field;
        let error = form.errors.get(input.field);

        let border_style = match (error, is_selected) {
            (Some(_), _) => MedicalTheme::danger(),
            (None, true) => MedicalTheme::border_focused(),
            (None, false) => MedicalTheme::border(),
        };
        let title_style = if is_selected {
            MedicalTheme::focused()
        } else {
            MedicalTheme::text_secondary()
        };

        let mut spans = vec![Span::raw(" ")];
        if input.value.is_empty() {
            spans.push(Span::styled(input.hint, MedicalTheme::text_muted()));
        } else {
            spans.push(Span::styled(input.value.clone(), MedicalTheme::text()));
        }
        if is_selected {
            spans.push(Span::styled("▌", MedicalTheme::cursor()));
        }
        if let Some(message) = error {
            spans.push(Span::styled(format!("  {message}"), MedicalTheme::danger()));
        }

        let block = Block::default()
            .title(Span::styled(format!(" {} ", input.field.label()), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), chunks[i]);
    }
}

fn render_result_panel(f: &mut Frame, area: Rect, view: &PredictView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(5)])
        .split(area);

    match view.prediction.phase() {
        Phase::Idle | Phase::Validating => {
            let content = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Enter patient data and press [Enter]",
                    MedicalTheme::text_muted(),
                )),
            ])
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title(Span::styled(" Result ", MedicalTheme::subtitle()))
                    .borders(Borders::ALL)
                    .border_style(MedicalTheme::border()),
            );
            f.render_widget(content, chunks[0]);
        }
        Phase::Loading => render_loading(f, chunks[0], "Result", "Predicting..."),
        Phase::Success(result) => render_result(f, chunks[0], result),
        Phase::Error(message) => render_error(f, chunks[0], "Result", message),
    }

    render_screening(f, chunks[1], &view.screening);
}

fn render_result(f: &mut Frame, area: Rect, result: &PredictionResult) {
    let block = Block::default()
        .title(Span::styled(" Result ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Banner
            Constraint::Length(3), // Probability
            Constraint::Length(4), // Details
            Constraint::Min(0),    // Recommendations
        ])
        .margin(1)
        .split(inner);

    let banner = Paragraph::new(Line::from(Span::styled(
        format!(" {} ", result.risk_label()),
        MedicalTheme::risk_banner(result.is_high_risk()),
    )))
    .alignment(Alignment::Center);
    f.render_widget(banner, chunks[0]);

    let band = result.risk_level();
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(" Probability ", MedicalTheme::text_secondary()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .gauge_style(MedicalTheme::risk_level(band))
        .ratio(result.probability.clamp(0.0, 1.0))
        .label(result.probability_percent());
    f.render_widget(gauge, chunks[1]);

    let details = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Band: ", MedicalTheme::text_secondary()),
            Span::styled(
                band.to_string(),
                MedicalTheme::risk_level(band).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", band.description()), MedicalTheme::text_muted()),
        ]),
        Line::from(vec![
            Span::styled("Confidence: ", MedicalTheme::text_secondary()),
            Span::styled(result.confidence_percent(), MedicalTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("Model: ", MedicalTheme::text_secondary()),
            Span::styled(
                result.model_version.clone().unwrap_or_else(|| "N/A".to_string()),
                MedicalTheme::text(),
            ),
        ]),
        Line::from(vec![
            Span::styled("At: ", MedicalTheme::text_secondary()),
            Span::styled(result.timestamp.clone().unwrap_or_default(), MedicalTheme::text_muted()),
        ]),
    ]);
    f.render_widget(details, chunks[2]);

    let recommendations: Vec<Line> = std::iter::once(Line::from(Span::styled(
        "Recommendations",
        MedicalTheme::subtitle(),
    )))
    .chain(result.recommendations().iter().map(|r| {
        Line::from(vec![
            Span::styled("• ", MedicalTheme::info()),
            Span::styled(*r, MedicalTheme::text()),
        ])
    }))
    .collect();
    f.render_widget(
        Paragraph::new(recommendations).wrap(Wrap { trim: true }),
        chunks[3],
    );
}

fn render_screening(f: &mut Frame, area: Rect, screening: &ScreeningOrchestrator) {
    let lines = match screening.single().phase() {
        Phase::Idle | Phase::Validating => vec![Line::from(Span::styled(
            "Press [V] to check the record with the server",
            MedicalTheme::text_muted(),
        ))],
        Phase::Loading => vec![Line::from(Span::styled("Validating...", MedicalTheme::focused()))],
        Phase::Error(message) => vec![Line::from(Span::styled(message.clone(), MedicalTheme::danger()))],
        Phase::Success(report) => {
            let mut lines = vec![if report.valid {
                Line::from(Span::styled("Record accepted by server", MedicalTheme::success()))
            } else {
                Line::from(Span::styled("Record rejected by server", MedicalTheme::danger()))
            }];
            lines.extend(
                report
                    .errors
                    .iter()
                    .map(|e| Line::from(Span::styled(format!("• {e}"), MedicalTheme::danger()))),
            );
            lines.extend(
                report
                    .warnings
                    .iter()
                    .map(|w| Line::from(Span::styled(format!("• {w}"), MedicalTheme::warning()))),
            );
            lines
        }
    };

    let block = Block::default()
        .title(Span::styled(" Server Validation ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fake::ScriptedApi;

    fn form_at(field: Field) -> PredictFormState {
        let mut form = PredictFormState::default();
        form.selected_field = Field::ALL.iter().position(|f| *f == field).unwrap_or(0);
        form
    }

    #[test]
    fn test_sample_data_builds_valid_record() {
        let mut form = PredictFormState::default();
        form.load_sample_data();
        let record = form.to_record().expect("parses");
        assert!(record.validate().is_ok());
        assert_eq!(record.hba1c_level, Some(5.5));
    }

    #[test]
    fn test_numeric_fields_reject_letters() {
        let mut form = form_at(Field::Age);
        form.input_char('4');
        form.input_char('x');
        form.input_char('2');
        assert_eq!(form.fields[1].value, "42");
    }

    #[test]
    fn test_unparsable_number_reported_on_field() {
        let mut form = form_at(Field::Bmi);
        form.input_char('2');
        form.input_char('.');
        form.input_char('.');
        let errors = form.to_record().expect_err("invalid");
        assert_eq!(errors.get(Field::Bmi), Some("BMI must be a number"));
    }

    #[test]
    fn test_cycle_choice_wraps() {
        let mut form = form_at(Field::Gender);
        form.cycle_choice(true);
        assert_eq!(form.fields[0].value, "Male");
        form.cycle_choice(true);
        assert_eq!(form.fields[0].value, "Female");
        form.cycle_choice(true);
        assert_eq!(form.fields[0].value, "Male");
        form.cycle_choice(false);
        assert_eq!(form.fields[0].value, "Female");
    }

    #[test]
    fn test_typing_clears_field_error() {
        let mut form = form_at(Field::Age);
        form.errors.insert(Field::Age, "Age is required");
        form.errors.insert(Field::Bmi, "BMI is required");
        form.input_char('5');
        assert!(form.errors.get(Field::Age).is_none());
        assert!(form.errors.get(Field::Bmi).is_some());
    }

    #[test]
    fn test_reset_after_success_clears_result_and_form() {
        let api = ScriptedApi {
            predict: Some(Ok(PredictionResult {
                prediction: 1,
                probability: 0.87,
                confidence: None,
                model_version: None,
                timestamp: None,
                prediction_id: None,
            })),
            ..Default::default()
        };
        let mut view = PredictView::default();
        view.form.load_sample_data();
        let record = view.form.to_record().expect("parses");
        view.prediction.predict_with(&api, &record);
        assert!(view.prediction.result().is_some());

        view.reset();
        assert!(view.prediction.result().is_none());
        assert!(view.form.is_blank());
        assert_eq!(view.prediction.phase(), &Phase::Idle);
    }
}
