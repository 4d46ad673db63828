use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use serde::Serialize;
use thiserror::Error;

use crate::model::{OptimizationRequest, ProjectEntry, RequestEntry, ValidatedRequest};

/// How an error message points at an entry: by name, or by 1-based position
/// when the name is blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryRef {
    Named(String),
    Position(usize),
}

impl EntryRef {
    fn for_entry(entry: &RequestEntry, position: usize) -> Self {
        let name = entry.name.trim();
        if name.is_empty() {
            Self::Position(position)
        } else {
            Self::Named(name.to_string())
        }
    }
}

impl Display for EntryRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::Position(position) => write!(f, "{position}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    #[error("Capacity must be greater than 0")]
    Capacity,
    #[error("At least one project is required")]
    NoEntries,
    #[error("Project names must be unique")]
    DuplicateNames,
    #[error("Project {position} must have a name")]
    MissingName { position: usize },
    #[error("Project {entry} must have a cost greater than 0")]
    InvalidCost { entry: EntryRef },
    #[error("Project {entry} must have an expected gain")]
    MissingGain { entry: EntryRef },
    #[error("Project {entry} cannot have a negative expected gain")]
    NegativeGain { entry: EntryRef },
}

/// Every issue found on one pass, shown as one consolidated message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(Vec<ValidationIssue>);

impl ValidationErrors {
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.messages().join("\n"))
    }
}

impl std::error::Error for ValidationErrors {}

/// Checks a request against every rule and never stops at the first failure.
///
/// Order: capacity, empty set, name uniqueness, then per entry name, cost and
/// gain. Duplicates are reported once however many there are; blank names are
/// left to the per-entry check.
pub fn validate(request: &OptimizationRequest) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if !request.capacity.is_some_and(|capacity| capacity > 0.0) {
        issues.push(ValidationIssue::Capacity);
    }
    if request.entries.is_empty() {
        issues.push(ValidationIssue::NoEntries);
    }
    if has_duplicate_names(&request.entries) {
        issues.push(ValidationIssue::DuplicateNames);
    }

    for (index, entry) in request.entries.iter().enumerate() {
        let position = index + 1;
        if entry.name.trim().is_empty() {
            issues.push(ValidationIssue::MissingName { position });
        }
        if !entry.cost.is_some_and(|cost| cost > 0.0) {
            issues.push(ValidationIssue::InvalidCost {
                entry: EntryRef::for_entry(entry, position),
            });
        }
        match entry.expected_gain {
            None => issues.push(ValidationIssue::MissingGain {
                entry: EntryRef::for_entry(entry, position),
            }),
            Some(gain) if gain < 0.0 => issues.push(ValidationIssue::NegativeGain {
                entry: EntryRef::for_entry(entry, position),
            }),
            Some(_) => {}
        }
    }

    issues
}

fn has_duplicate_names(entries: &[RequestEntry]) -> bool {
    let mut seen = HashSet::new();
    entries
        .iter()
        .map(|entry| entry.name.trim())
        .filter(|name| !name.is_empty())
        .any(|name| !seen.insert(name))
}

impl OptimizationRequest {
    pub fn validate(&self) -> Vec<ValidationIssue> {
        validate(self)
    }

    pub fn into_validated(self) -> Result<ValidatedRequest, ValidationErrors> {
        let issues = validate(&self);
        if !issues.is_empty() {
            return Err(ValidationErrors(issues));
        }
        let mut entries = Vec::with_capacity(self.entries.len());
        for entry in self.entries {
            let (Some(cost), Some(expected_gain)) = (entry.cost, entry.expected_gain) else {
                unreachable!("validate rejects entries without cost or gain");
            };
            entries.push(ProjectEntry {
                name: entry.name.trim().to_string(),
                cost,
                expected_gain,
            });
        }
        let capacity = self.capacity.unwrap_or_default();
        Ok(ValidatedRequest::from_checked(capacity, entries))
    }
}

#[cfg(test)]
mod tests {
    use super::{validate, EntryRef, ValidationIssue};
    use crate::form::FormModel;
    use crate::model::{OptimizationRequest, RequestEntry};

    fn entry(name: &str, cost: Option<f64>, gain: Option<f64>) -> RequestEntry {
        RequestEntry {
            name: name.to_string(),
            cost,
            expected_gain: gain,
        }
    }

    #[test]
    fn local_example_is_valid_after_form_round_trip() {
        let mut form = FormModel::new();
        form.populate(&OptimizationRequest::local_example());
        let request = form.build_request();
        assert!(validate(&request).is_empty());

        let validated = request.into_validated().expect("example should validate");
        assert_eq!(validated.capacity(), 10_000.0);
        assert_eq!(validated.entries().len(), 5);
    }

    #[test]
    fn non_positive_capacity_only_adds_the_capacity_issue() {
        for capacity in [Some(0.0), Some(-5.0), None] {
            let request = OptimizationRequest {
                capacity,
                entries: vec![entry("Fondo_A", Some(10.0), Some(1.0))],
            };
            assert_eq!(validate(&request), vec![ValidationIssue::Capacity]);
        }
    }

    #[test]
    fn duplicates_are_flagged_exactly_once() {
        let entries = (0..6)
            .map(|_| entry("Fondo_A", Some(10.0), Some(1.0)))
            .collect::<Vec<_>>();
        let request = OptimizationRequest {
            capacity: Some(100.0),
            entries,
        };
        let issues = validate(&request);
        let duplicates = issues
            .iter()
            .filter(|issue| **issue == ValidationIssue::DuplicateNames)
            .count();
        assert_eq!(duplicates, 1);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn name_comparison_is_case_sensitive() {
        let request = OptimizationRequest {
            capacity: Some(100.0),
            entries: vec![
                entry("fondo", Some(10.0), Some(1.0)),
                entry("Fondo", Some(10.0), Some(1.0)),
            ],
        };
        assert!(validate(&request).is_empty());
    }

    #[test]
    fn bad_cost_is_reported_by_name_or_position() {
        let request = OptimizationRequest {
            capacity: Some(100.0),
            entries: vec![
                entry("Fondo_A", Some(0.0), Some(1.0)),
                entry("   ", None, Some(1.0)),
                entry("Fondo_C", Some(-3.0), Some(0.0)),
            ],
        };
        assert_eq!(
            validate(&request),
            vec![
                ValidationIssue::InvalidCost {
                    entry: EntryRef::Named("Fondo_A".to_string())
                },
                ValidationIssue::MissingName { position: 2 },
                ValidationIssue::InvalidCost {
                    entry: EntryRef::Position(2)
                },
                ValidationIssue::InvalidCost {
                    entry: EntryRef::Named("Fondo_C".to_string())
                },
            ]
        );
    }

    #[test]
    fn gain_may_be_zero_but_not_negative_or_missing() {
        let request = OptimizationRequest {
            capacity: Some(100.0),
            entries: vec![
                entry("Zero", Some(10.0), Some(0.0)),
                entry("Negative", Some(10.0), Some(-1.0)),
                entry("Missing", Some(10.0), None),
            ],
        };
        let messages = validate(&request)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        assert_eq!(
            messages,
            vec![
                "Project Negative cannot have a negative expected gain",
                "Project Missing must have an expected gain",
            ]
        );
    }

    #[test]
    fn every_violation_is_collected_in_order() {
        let request = OptimizationRequest {
            capacity: None,
            entries: Vec::new(),
        };
        assert_eq!(
            validate(&request),
            vec![ValidationIssue::Capacity, ValidationIssue::NoEntries]
        );

        let errors = request
            .into_validated()
            .expect_err("empty request must not validate");
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.to_string(),
            "Capacity must be greater than 0\nAt least one project is required"
        );
    }

    #[test]
    fn validated_request_trims_names() {
        let request = OptimizationRequest {
            capacity: Some(50.0),
            entries: vec![entry(" Fondo_A ", Some(10.0), Some(2.0))],
        };
        let validated = request.into_validated().expect("should validate");
        assert_eq!(validated.entries()[0].name, "Fondo_A");
    }
}
