pub mod validation;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{OptimizationRequest, RequestEntry};

pub use validation::{validate, EntryRef, ValidationErrors, ValidationIssue};

/// Identity of one entry within a [`FormModel`]. Restarts at 1 on clear.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u32);

impl EntryId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(Self)
    }
}

/// One row of the form, holding the text exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftEntry {
    pub id: EntryId,
    pub name: String,
    pub cost: String,
    pub expected_gain: String,
}

impl DraftEntry {
    fn empty(id: EntryId) -> Self {
        Self {
            id,
            name: String::new(),
            cost: String::new(),
            expected_gain: String::new(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
            && self.cost.trim().is_empty()
            && self.expected_gain.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Cost,
    ExpectedGain,
}

/// Editable capacity plus candidate projects.
#[derive(Debug, Clone)]
pub struct FormModel {
    capacity: String,
    entries: Vec<DraftEntry>,
    last_id: u32,
}

impl Default for FormModel {
    fn default() -> Self {
        Self::new()
    }
}

impl FormModel {
    /// A fresh form always starts with one empty entry.
    pub fn new() -> Self {
        let mut form = Self {
            capacity: String::new(),
            entries: Vec::new(),
            last_id: 0,
        };
        form.add_entry();
        form
    }

    pub fn add_entry(&mut self) -> EntryId {
        self.last_id += 1;
        let id = EntryId(self.last_id);
        self.entries.push(DraftEntry::empty(id));
        id
    }

    /// Returns whether an entry was removed. Absent ids are a no-op.
    pub fn remove_entry(&mut self, id: EntryId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn set_capacity(&mut self, text: impl Into<String>) {
        self.capacity = text.into();
    }

    pub fn set_name(&mut self, id: EntryId, text: impl Into<String>) -> bool {
        self.set_field(id, Field::Name, text.into())
    }

    pub fn set_cost(&mut self, id: EntryId, text: impl Into<String>) -> bool {
        self.set_field(id, Field::Cost, text.into())
    }

    pub fn set_expected_gain(&mut self, id: EntryId, text: impl Into<String>) -> bool {
        self.set_field(id, Field::ExpectedGain, text.into())
    }

    fn set_field(&mut self, id: EntryId, field: Field, text: String) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) else {
            return false;
        };
        match field {
            Field::Name => entry.name = text,
            Field::Cost => entry.cost = text,
            Field::ExpectedGain => entry.expected_gain = text,
        }
        true
    }

    pub fn capacity_text(&self) -> &str {
        &self.capacity
    }

    pub fn entries(&self) -> &[DraftEntry] {
        &self.entries
    }

    pub fn entry(&self, id: EntryId) -> Option<&DraftEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Coerces every entry into a request without checking it.
    pub fn build_request(&self) -> OptimizationRequest {
        OptimizationRequest {
            capacity: parse_number(&self.capacity),
            entries: self
                .entries
                .iter()
                .map(|entry| RequestEntry {
                    name: entry.name.trim().to_string(),
                    cost: parse_number(&entry.cost),
                    expected_gain: parse_number(&entry.expected_gain),
                })
                .collect(),
        }
    }

    pub fn clear(&mut self) {
        self.capacity.clear();
        self.entries.clear();
        self.last_id = 0;
        self.add_entry();
    }

    /// Replaces the whole form with `payload`, one entry per payload item.
    pub fn populate(&mut self, payload: &OptimizationRequest) {
        self.clear();
        self.capacity = payload.capacity.map(format_number).unwrap_or_default();
        for (index, item) in payload.entries.iter().enumerate() {
            let id = if index == 0 {
                self.entries[0].id
            } else {
                self.add_entry()
            };
            self.set_name(id, item.name.clone());
            self.set_cost(id, item.cost.map(format_number).unwrap_or_default());
            self.set_expected_gain(id, item.expected_gain.map(format_number).unwrap_or_default());
        }
    }
}

/// Empty, unparsable and non-finite text all count as missing.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn format_number(value: f64) -> String {
    format!("{value}")
}
