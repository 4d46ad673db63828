use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Cost distribution over the selected entries.
    Investment,
    /// Gain/cost ratio over every candidate.
    Efficiency,
}

impl ChartKind {
    pub const ALL: [ChartKind; 2] = [ChartKind::Investment, ChartKind::Efficiency];

    pub fn title(self) -> &'static str {
        match self {
            Self::Investment => "Investment distribution",
            Self::Efficiency => "Efficiency (gain/cost)",
        }
    }
}

impl Display for ChartKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Investment => "investment",
            Self::Efficiency => "efficiency",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    /// Percentage of the series total; set for distribution charts only.
    pub share: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub kind: ChartKind,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn total(&self) -> f64 {
        self.points.iter().map(|point| point.value).sum()
    }

    pub fn max_value(&self) -> f64 {
        self.points
            .iter()
            .map(|point| point.value)
            .fold(0.0, f64::max)
    }
}

/// A drawn chart. `generation` counts renders within the owning renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartHandle {
    pub generation: u64,
    pub series: ChartSeries,
}

/// Current chart per name. Installing a chart destroys its predecessor.
#[derive(Debug, Clone, Default)]
pub struct ChartRegistry {
    charts: BTreeMap<ChartKind, ChartHandle>,
}

impl ChartRegistry {
    /// Returns the replaced handle, if any.
    pub fn install(&mut self, generation: u64, series: ChartSeries) -> Option<ChartHandle> {
        self.charts
            .insert(series.kind, ChartHandle { generation, series })
    }

    pub fn get(&self, kind: ChartKind) -> Option<&ChartHandle> {
        self.charts.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn clear(&mut self) {
        self.charts.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChartKind, &ChartHandle)> {
        self.charts.iter()
    }
}
