//! Rendering of the form as a pure function of its state.

use std::fmt;

use serde_json::Value;

use crate::base::types::TriageResult;

use super::{Submission, TriageForm};

/// Placeholder for a missing severity or onset.
pub const PLACEHOLDER: &str = "-";

pub const TITLE: &str = "Triage Virtual — Demo";
pub const IDLE_LABEL: &str = "Analizar";
pub const LOADING_LABEL: &str = "Analizando...";
pub const NEGATED_MARKER: &str = "(negado)";

/// The submit control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub label: &'static str,
    pub enabled: bool,
}

/// One rendered symptom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomRow {
    pub name: String,
    pub negated: bool,
    pub confidence: String,
    pub severity: String,
    pub onset: String,
}

/// The rendered result block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub recommended_action: String,
    pub overall_urgency: String,
    pub symptoms: Vec<SymptomRow>,
}

/// Everything the terminal shows for one state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub control: Control,
    pub error: Option<String>,
    pub result: Option<ResultView>,
}

impl View {
    pub fn new(submission: &Submission) -> Self {
        let control = if submission.is_loading() {
            Control { label: LOADING_LABEL, enabled: false }
        } else {
            Control { label: IDLE_LABEL, enabled: true }
        };

        Self {
            control,
            error: submission.error().map(str::to_string),
            result: submission.result().map(ResultView::new),
        }
    }

    pub fn from_form(form: &TriageForm) -> Self {
        Self::new(form.submission())
    }
}

impl ResultView {
    pub fn new(result: &TriageResult) -> Self {
        let symptoms = result
            .symptoms
            .iter()
            .map(|symptom| SymptomRow {
                name: symptom.name.clone(),
                negated: symptom.negated,
                confidence: render_value(&symptom.confidence),
                severity: result.priority_of(&symptom.name).filter(|v| is_truthy(v)).map(render_value).unwrap_or_else(|| PLACEHOLDER.to_string()),
                onset: symptom.onset.clone().filter(|o| !o.is_empty()).unwrap_or_else(|| PLACEHOLDER.to_string()),
            })
            .collect();

        Self {
            recommended_action: result.recommended_action.clone(),
            overall_urgency: render_value(&result.overall_urgency),
            symptoms,
        }
    }
}

/// Renders an opaque value verbatim: strings unquoted, `null` empty, everything else as JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{TITLE}")?;

        if self.control.enabled {
            writeln!(f, "[ {} ]", self.control.label)?;
        } else {
            writeln!(f, "[ {} ] (deshabilitado)", self.control.label)?;
        }

        if let Some(error) = &self.error {
            writeln!(f)?;
            writeln!(f, "{error}")?;
        }

        if let Some(result) = &self.result {
            writeln!(f)?;
            writeln!(f, "Resultado")?;
            writeln!(f, "Recomendación: {} (Urgencia {})", result.recommended_action, result.overall_urgency)?;
            writeln!(f)?;
            writeln!(f, "Síntomas detectados")?;

            for row in &result.symptoms {
                if row.negated {
                    writeln!(f, "  * {} {}", row.name, NEGATED_MARKER)?;
                } else {
                    writeln!(f, "  * {}", row.name)?;
                }
                writeln!(f, "    Conf: {} • Sev: {} • Onset: {}", row.confidence, row.severity, row.onset)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fever_result() -> TriageResult {
        serde_json::from_value(json!({
            "overall_urgency": "high",
            "recommended_action": "ER now",
            "symptoms": [{ "name": "fever", "negated": false, "confidence": 0.9, "onset": "2d" }],
            "priorities": { "fever": "high" }
        }))
        .unwrap()
    }

    #[test]
    fn idle_view_has_enabled_control_and_nothing_else() {
        let view = View::new(&Submission::Idle);

        assert_eq!(view.control, Control { label: IDLE_LABEL, enabled: true });
        assert!(view.error.is_none());
        assert!(view.result.is_none());
    }

    #[test]
    fn loading_view_disables_control() {
        let view = View::new(&Submission::Loading { previous: None });

        assert_eq!(view.control, Control { label: LOADING_LABEL, enabled: false });
        assert!(view.to_string().contains("[ Analizando... ] (deshabilitado)"));
    }

    #[test]
    fn succeeded_view_shows_result_fields() {
        let view = View::new(&Submission::Succeeded(fever_result()));
        let result = view.result.as_ref().unwrap();

        assert_eq!(result.recommended_action, "ER now");
        assert_eq!(result.overall_urgency, "high");
        assert_eq!(
            result.symptoms,
            vec![SymptomRow {
                name: "fever".to_string(),
                negated: false,
                confidence: "0.9".to_string(),
                severity: "high".to_string(),
                onset: "2d".to_string(),
            }]
        );

        let text = view.to_string();
        assert!(text.contains("Recomendación: ER now (Urgencia high)"));
        assert!(text.contains("Conf: 0.9 • Sev: high • Onset: 2d"));
    }

    #[test]
    fn missing_priority_and_onset_use_placeholder() {
        let result: TriageResult = serde_json::from_value(json!({
            "overall_urgency": 1,
            "recommended_action": "Reposo y observacion.",
            "symptoms": [
                { "name": "tos", "negated": true, "confidence": 0.4 },
                { "name": "fiebre", "negated": false, "confidence": 0.8, "onset": "" }
            ],
            "priorities": { "fiebre": 0 }
        }))
        .unwrap();

        let view = ResultView::new(&result);

        assert_eq!(view.symptoms[0].severity, PLACEHOLDER);
        assert_eq!(view.symptoms[0].onset, PLACEHOLDER);
        assert_eq!(view.symptoms[1].severity, PLACEHOLDER);
        assert_eq!(view.symptoms[1].onset, PLACEHOLDER);
    }

    #[test]
    fn absent_priorities_map_uses_placeholder() {
        let mut result = fever_result();
        result.priorities = None;

        let view = ResultView::new(&result);

        assert_eq!(view.symptoms[0].severity, PLACEHOLDER);
    }

    #[test]
    fn negated_symptom_is_marked() {
        let mut result = fever_result();
        result.symptoms[0].negated = true;

        let text = View::new(&Submission::Succeeded(result)).to_string();

        assert!(text.contains("* fever (negado)"));
    }

    #[test]
    fn failed_view_keeps_stale_result_and_shows_message_verbatim() {
        let view = View::new(&Submission::Failed {
            message: "Error HTTP 500: server error".to_string(),
            previous: Some(fever_result()),
        });

        assert_eq!(view.error.as_deref(), Some("Error HTTP 500: server error"));
        assert!(view.result.is_some());
        assert!(view.control.enabled);
    }

    #[test]
    fn opaque_values_render_verbatim() {
        assert_eq!(render_value(&json!("alta")), "alta");
        assert_eq!(render_value(&json!(3)), "3");
        assert_eq!(render_value(&json!(0.75)), "0.75");
        assert_eq!(render_value(&json!(true)), "true");
        assert_eq!(render_value(&Value::Null), "");
    }
}
