use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request body as read off the form: numbers already coerced, nothing checked yet.
///
/// `None` marks a numeric field that was empty or did not parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    #[serde(default)]
    pub capacity: Option<f64>,
    #[serde(default)]
    pub entries: Vec<RequestEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub expected_gain: Option<f64>,
}

impl RequestEntry {
    pub fn new(name: impl Into<String>, cost: f64, expected_gain: f64) -> Self {
        Self {
            name: name.into(),
            cost: Some(cost),
            expected_gain: Some(expected_gain),
        }
    }
}

impl OptimizationRequest {
    /// Payload used when the service cannot hand out its own examples.
    pub fn local_example() -> Self {
        Self {
            capacity: Some(10_000.0),
            entries: vec![
                RequestEntry::new("Fondo_A", 2_000.0, 1_500.0),
                RequestEntry::new("Fondo_B", 4_000.0, 3_500.0),
                RequestEntry::new("Fondo_C", 5_000.0, 4_000.0),
                RequestEntry::new("Fondo_D", 3_000.0, 2_500.0),
                RequestEntry::new("Fondo_E", 1_500.0, 1_800.0),
            ],
        }
    }
}

/// A project that passed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectEntry {
    pub name: String,
    pub cost: f64,
    pub expected_gain: f64,
}

/// The only request shape the dispatcher will send.
///
/// Obtainable through [`OptimizationRequest::into_validated`] alone, so an
/// unchecked form can never reach the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedRequest {
    capacity: f64,
    entries: Vec<ProjectEntry>,
}

impl ValidatedRequest {
    pub(crate) fn from_checked(capacity: f64, entries: Vec<ProjectEntry>) -> Self {
        Self { capacity, entries }
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn entries(&self) -> &[ProjectEntry] {
        &self.entries
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSummary {
    pub selected: Vec<String>,
    #[serde(default)]
    pub total_gain: f64,
    #[serde(default)]
    pub total_cost: f64,
    /// Percentage of the capacity consumed by the selection.
    #[serde(default)]
    pub capacity_used: f64,
    /// Gain per unit of cost across the selection.
    #[serde(default)]
    pub efficiency: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionStatistics {
    pub total_entries: u64,
    pub selected_entries: u64,
    pub selection_percentage: f64,
    pub total_gain_available: f64,
    pub gain_obtained: f64,
    pub gain_obtained_percentage: f64,
    pub total_cost_available: f64,
    pub cost_used: f64,
    pub cost_used_percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyRecord {
    pub name: String,
    #[serde(default)]
    pub efficiency: f64,
    #[serde(default)]
    pub gain: f64,
    #[serde(default)]
    pub cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Performance {
    pub execution_time_ms: f64,
    /// Unix seconds as reported by the service.
    pub timestamp: f64,
}

impl Performance {
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        unix_seconds(self.timestamp)
    }
}

/// Response of `POST /optimize/detailed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailedOptimization {
    pub optimization_result: OptimizationSummary,
    #[serde(default)]
    pub statistics: SelectionStatistics,
    #[serde(default)]
    pub efficiencies: Vec<EfficiencyRecord>,
    #[serde(default)]
    pub performance: Option<Performance>,
}

impl DetailedOptimization {
    pub fn efficiency_of(&self, name: &str) -> Option<&EfficiencyRecord> {
        self.efficiencies.iter().find(|record| record.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleCase {
    #[serde(default)]
    pub description: String,
    pub input: OptimizationRequest,
    #[serde(default)]
    pub expected_output: Option<OptimizationSummary>,
}

/// Response of `GET /examples`, keyed by case name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExampleCatalog {
    #[serde(default)]
    pub examples: BTreeMap<String, ExampleCase>,
}

impl ExampleCatalog {
    /// The preferred case when present, otherwise the first case by key.
    pub fn pick(&self, preferred: &str) -> Option<(&str, &ExampleCase)> {
        self.examples
            .get_key_value(preferred)
            .or_else(|| self.examples.iter().next())
            .map(|(key, case)| (key.as_str(), case))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub service: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(
            self.status.to_ascii_lowercase().as_str(),
            "healthy" | "ok" | "up"
        )
    }

    pub fn checked_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.and_then(unix_seconds)
    }
}

fn unix_seconds(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    let secs = value.trunc() as i64;
    let nanos = ((value.fract()) * 1_000_000_000.0).round() as u32;
    DateTime::from_timestamp(secs, nanos.min(999_999_999))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{DetailedOptimization, ExampleCatalog, HealthStatus, OptimizationRequest};

    #[test]
    fn detailed_response_tolerates_missing_sections() {
        let payload = json!({
            "optimization_result": { "selected": ["Fondo_B"] }
        });
        let parsed: DetailedOptimization =
            serde_json::from_value(payload).expect("failed to decode partial result");
        assert_eq!(parsed.optimization_result.selected, vec!["Fondo_B"]);
        assert!(parsed.efficiencies.is_empty());
        assert_eq!(parsed.statistics.total_entries, 0);
        assert!(parsed.performance.is_none());
    }

    #[test]
    fn catalog_prefers_named_case_then_falls_back_to_first() {
        let payload = json!({
            "examples": {
                "case_2": { "description": "tight", "input": { "capacity": 8000, "entries": [] } },
                "case_1": { "description": "full", "input": { "capacity": 10000, "entries": [] } }
            }
        });
        let catalog: ExampleCatalog =
            serde_json::from_value(payload).expect("failed to decode catalog");
        let (key, case) = catalog.pick("case_1").expect("missing case");
        assert_eq!(key, "case_1");
        assert_eq!(case.input.capacity, Some(10_000.0));

        let (key, _) = catalog.pick("case_9").expect("missing fallback case");
        assert_eq!(key, "case_1");
        assert!(ExampleCatalog::default().pick("case_1").is_none());
    }

    #[test]
    fn request_serializes_wire_field_names() {
        let value = serde_json::to_value(OptimizationRequest::local_example())
            .expect("failed to encode request");
        assert_eq!(value["capacity"], json!(10000.0));
        assert_eq!(value["entries"][4]["name"], json!("Fondo_E"));
        assert_eq!(value["entries"][4]["expected_gain"], json!(1800.0));
    }

    #[test]
    fn health_timestamp_converts_to_utc() {
        let status = HealthStatus {
            status: "healthy".to_string(),
            timestamp: Some(1_700_000_000.5),
            service: Some("portfolio-optimizer".to_string()),
        };
        assert!(status.is_healthy());
        let at = status.checked_at().expect("missing timestamp");
        assert_eq!(at.timestamp(), 1_700_000_000);
        assert!(HealthStatus::default().checked_at().is_none());
    }
}
