use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Request body sent to `POST {API_BASE}/triage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageRequest {
    pub texto_paciente: String,
}

impl TriageRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { texto_paciente: text.into() }
    }
}

/// Decodes a missing or `null` field as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single symptom mention detected by the triage service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symptom {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub negated: bool,
    #[serde(default)]
    pub confidence: Value,
    #[serde(default)]
    pub onset: Option<String>,
}

/// The structured result returned by a successful triage call.
///
/// `overall_urgency`, `confidence` and the priority values are opaque: they are
/// rendered verbatim and never interpreted by the client. Any field may be
/// missing or `null`; it then renders empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageResult {
    #[serde(default)]
    pub overall_urgency: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recommended_action: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub symptoms: Vec<Symptom>,
    #[serde(default)]
    pub priorities: Option<HashMap<String, Value>>,
}

impl TriageResult {
    /// Looks up the severity of a symptom by name.
    pub fn priority_of(&self, name: &str) -> Option<&Value> {
        self.priorities.as_ref().and_then(|p| p.get(name))
    }
}

/// Response of `GET {API_BASE}/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub sintomas_registrados: Option<u64>,
    #[serde(default)]
    pub ml_enabled: Option<bool>,
    #[serde(default)]
    pub ml_min_sintomas: Option<u64>,
}
