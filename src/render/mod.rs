//! Projects an optimization result into what the user sees: summary cards,
//! the selected-entries table, the detailed analysis block and two charts.
//!
//! Selected names without an efficiency record are skipped, never fatal.

pub mod charts;
pub mod format;

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::model::{DetailedOptimization, Performance};

pub use charts::{ChartHandle, ChartKind, ChartPoint, ChartRegistry, ChartSeries};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCards {
    pub selected_count: usize,
    pub total_gain: f64,
    pub total_cost: f64,
    pub capacity_used: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedRow {
    pub name: String,
    pub cost: f64,
    pub gain: f64,
    pub efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedAnalysis {
    pub portfolio_efficiency: f64,
    pub total_entries: u64,
    pub selection_percentage: f64,
    pub potential_gain: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub summary: SummaryCards,
    pub rows: Vec<SelectedRow>,
    pub analysis: DetailedAnalysis,
    pub cost_distribution: ChartSeries,
    pub efficiency: ChartSeries,
    pub performance: Option<Performance>,
}

/// Pure projection of a result; see [`ResultRenderer`] for the chart lifecycle.
pub fn project_result(result: &DetailedOptimization) -> ResultView {
    let outcome = &result.optimization_result;

    let rows = outcome
        .selected
        .iter()
        .filter_map(|name| {
            let Some(record) = result.efficiency_of(name) else {
                debug!("no efficiency record for selected entry {name}, skipping row");
                return None;
            };
            Some(SelectedRow {
                name: name.clone(),
                cost: record.cost,
                gain: record.gain,
                efficiency: record.efficiency,
            })
        })
        .collect();

    ResultView {
        summary: SummaryCards {
            selected_count: outcome.selected.len(),
            total_gain: outcome.total_gain,
            total_cost: outcome.total_cost,
            capacity_used: outcome.capacity_used,
        },
        rows,
        analysis: DetailedAnalysis {
            portfolio_efficiency: outcome.efficiency,
            total_entries: result.statistics.total_entries,
            selection_percentage: result.statistics.selection_percentage,
            potential_gain: result.statistics.total_gain_available,
        },
        cost_distribution: cost_distribution(result),
        efficiency: efficiency_series(result),
        performance: result.performance.clone(),
    }
}

/// Selected entries in efficiency-record order, each with its share of the total cost.
fn cost_distribution(result: &DetailedOptimization) -> ChartSeries {
    let selected: HashSet<&str> = result
        .optimization_result
        .selected
        .iter()
        .map(String::as_str)
        .collect();
    let picked = result
        .efficiencies
        .iter()
        .filter(|record| selected.contains(record.name.as_str()))
        .collect::<Vec<_>>();
    let total: f64 = picked.iter().map(|record| record.cost).sum();

    ChartSeries {
        kind: ChartKind::Investment,
        points: picked
            .into_iter()
            .map(|record| ChartPoint {
                label: record.name.clone(),
                value: record.cost,
                share: Some(if total > 0.0 {
                    record.cost / total * 100.0
                } else {
                    0.0
                }),
            })
            .collect(),
    }
}

fn efficiency_series(result: &DetailedOptimization) -> ChartSeries {
    ChartSeries {
        kind: ChartKind::Efficiency,
        points: result
            .efficiencies
            .iter()
            .map(|record| ChartPoint {
                label: record.name.clone(),
                value: record.efficiency,
                share: None,
            })
            .collect(),
    }
}

/// Owns the charts for one session and the last rendered view.
#[derive(Debug, Clone, Default)]
pub struct ResultRenderer {
    charts: ChartRegistry,
    last_view: Option<ResultView>,
    generation: u64,
}

impl ResultRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, result: &DetailedOptimization) -> ResultView {
        let view = project_result(result);
        self.generation += 1;
        for series in [view.cost_distribution.clone(), view.efficiency.clone()] {
            let kind = series.kind;
            if let Some(previous) = self.charts.install(self.generation, series) {
                debug!(
                    "replaced {kind} chart from render {} with render {}",
                    previous.generation, self.generation
                );
            }
        }
        self.last_view = Some(view.clone());
        view
    }

    /// Drops every chart and the last view, as when the form is cleared.
    pub fn reset(&mut self) {
        self.charts.clear();
        self.last_view = None;
    }

    pub fn charts(&self) -> &ChartRegistry {
        &self.charts
    }

    pub fn chart(&self, kind: ChartKind) -> Option<&ChartHandle> {
        self.charts.get(kind)
    }

    pub fn last_view(&self) -> Option<&ResultView> {
        self.last_view.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::{project_result, ChartKind, ResultRenderer};
    use crate::model::{
        DetailedOptimization, EfficiencyRecord, OptimizationSummary, SelectionStatistics,
    };

    fn record(name: &str, cost: f64, gain: f64) -> EfficiencyRecord {
        EfficiencyRecord {
            name: name.to_string(),
            efficiency: ((gain / cost) * 10_000.0).round() / 10_000.0,
            gain,
            cost,
        }
    }

    /// Efficiency records sorted by ratio, as the service returns them.
    fn funds_result(selected: &[&str]) -> DetailedOptimization {
        DetailedOptimization {
            optimization_result: OptimizationSummary {
                selected: selected.iter().map(|s| s.to_string()).collect(),
                total_gain: 7_500.0,
                total_cost: 9_000.0,
                capacity_used: 90.0,
                efficiency: 0.8333,
            },
            statistics: SelectionStatistics {
                total_entries: 5,
                selected_entries: selected.len() as u64,
                selection_percentage: 40.0,
                total_gain_available: 13_300.0,
                ..SelectionStatistics::default()
            },
            efficiencies: vec![
                record("Fondo_E", 1_500.0, 1_800.0),
                record("Fondo_B", 4_000.0, 3_500.0),
                record("Fondo_D", 3_000.0, 2_500.0),
                record("Fondo_C", 5_000.0, 4_000.0),
                record("Fondo_A", 2_000.0, 1_500.0),
            ],
            performance: None,
        }
    }

    #[test]
    fn rows_follow_selection_order() {
        let view = project_result(&funds_result(&["Fondo_B", "Fondo_C"]));
        let names = view.rows.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Fondo_B", "Fondo_C"]);
        assert_eq!(view.rows[1].cost, 5_000.0);
        assert_eq!(view.rows[1].efficiency, 0.8);
        assert_eq!(view.summary.selected_count, 2);
        assert_eq!(view.analysis.total_entries, 5);
        assert_eq!(view.analysis.potential_gain, 13_300.0);
    }

    #[test]
    fn unknown_selected_name_drops_one_row() {
        let view = project_result(&funds_result(&["Fondo_B", "Fondo_Z", "Fondo_C"]));
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.summary.selected_count, 3);
    }

    #[test]
    fn charts_cover_selection_and_all_candidates() {
        let view = project_result(&funds_result(&["Fondo_C", "Fondo_B"]));
        let labels = view
            .cost_distribution
            .points
            .iter()
            .map(|p| p.label.as_str())
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["Fondo_B", "Fondo_C"]);
        assert_eq!(view.cost_distribution.total(), 9_000.0);
        let share = view.cost_distribution.points[1].share.expect("missing share");
        assert!((share - 55.5556).abs() < 1e-3);

        assert_eq!(view.efficiency.points.len(), 5);
        assert_eq!(view.efficiency.points[0].label, "Fondo_E");
        assert!(view.efficiency.points.iter().all(|p| p.share.is_none()));
    }

    #[test]
    fn rerender_replaces_both_charts() {
        let mut renderer = ResultRenderer::new();
        renderer.render(&funds_result(&["Fondo_B"]));
        renderer.render(&funds_result(&["Fondo_B", "Fondo_C"]));

        assert_eq!(renderer.charts().len(), 2);
        for kind in ChartKind::ALL {
            let handle = renderer.chart(kind).expect("missing chart");
            assert_eq!(handle.generation, 2);
        }
        let investment = renderer
            .chart(ChartKind::Investment)
            .expect("missing investment chart");
        assert_eq!(investment.series.points.len(), 2);
        assert_eq!(
            renderer.last_view().map(|view| view.rows.len()),
            Some(2)
        );

        renderer.reset();
        assert!(renderer.charts().is_empty());
        assert!(renderer.last_view().is_none());
    }

    #[test]
    fn empty_selection_renders_without_shares_blowing_up() {
        let view = project_result(&funds_result(&[]));
        assert!(view.rows.is_empty());
        assert!(view.cost_distribution.points.is_empty());
        assert_eq!(view.summary.selected_count, 0);
    }
}
