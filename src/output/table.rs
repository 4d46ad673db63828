use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Row, Table};

use crate::config::DisplayConfig;
use crate::form::FormModel;
use crate::model::{HealthStatus, OptimizationSummary};
use crate::render::format::{format_currency, format_efficiency, format_percent};
use crate::render::{ChartKind, ChartSeries, ResultView, SelectedRow};

const BAR_WIDTH: usize = 30;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn right(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn or_dash(text: &str) -> String {
    if text.trim().is_empty() {
        "-".to_string()
    } else {
        text.to_string()
    }
}

pub fn render_form_table(form: &FormModel) -> String {
    let mut table = new_table();
    table.set_header(vec!["#", "Project", "Cost", "Expected gain"]);
    for entry in form.entries() {
        table.add_row(vec![
            entry.id.to_string(),
            or_dash(&entry.name),
            or_dash(&entry.cost),
            or_dash(&entry.expected_gain),
        ]);
    }
    format!("Capacity: {}\n{table}", or_dash(form.capacity_text()))
}

pub fn render_summary_table(view: &ResultView, display: &DisplayConfig) -> String {
    let symbol = display.currency_symbol.as_str();
    let mut table = new_table();
    table.set_header(vec![
        "Selected",
        "Total gain",
        "Total cost",
        "Capacity used",
    ]);
    table.add_row(Row::from(vec![
        right(view.summary.selected_count.to_string()),
        right(format_currency(view.summary.total_gain, symbol)).fg(Color::Green),
        right(format_currency(view.summary.total_cost, symbol)),
        right(format_percent(view.summary.capacity_used)),
    ]));
    table.to_string()
}

pub fn render_selected_table(rows: &[SelectedRow], display: &DisplayConfig) -> String {
    let symbol = display.currency_symbol.as_str();
    let mut table = new_table();
    table.set_header(vec!["Project", "Cost", "Expected gain", "Efficiency"]);
    for row in rows {
        table.add_row(Row::from(vec![
            Cell::new(&row.name),
            right(format_currency(row.cost, symbol)),
            right(format_currency(row.gain, symbol)),
            right(format_efficiency(row.efficiency, display.efficiency_precision)),
        ]));
    }
    table.to_string()
}

pub fn render_analysis_table(view: &ResultView, display: &DisplayConfig) -> String {
    let analysis = &view.analysis;
    let mut table = new_table();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![
        "Portfolio efficiency".to_string(),
        format_efficiency(analysis.portfolio_efficiency, display.efficiency_precision),
    ]);
    table.add_row(vec![
        "Candidate projects".to_string(),
        analysis.total_entries.to_string(),
    ]);
    table.add_row(vec![
        "Selection".to_string(),
        format_percent(analysis.selection_percentage),
    ]);
    table.add_row(vec![
        "Potential gain".to_string(),
        format_currency(analysis.potential_gain, &display.currency_symbol),
    ]);
    if let Some(performance) = &view.performance {
        table.add_row(vec![
            "Service time".to_string(),
            format!("{:.2} ms", performance.execution_time_ms),
        ]);
        if let Some(at) = performance.recorded_at() {
            table.add_row(vec!["Computed at".to_string(), at.to_rfc3339()]);
        }
    }
    table.to_string()
}

/// Horizontal bars scaled to the largest point.
pub fn render_chart_table(series: &ChartSeries, display: &DisplayConfig) -> String {
    let max = series.max_value();
    let mut table = new_table();
    table.set_header(vec!["Project", "Value", "", ""]);
    for point in &series.points {
        let value = match series.kind {
            ChartKind::Investment => format_currency(point.value, &display.currency_symbol),
            ChartKind::Efficiency => format_efficiency(point.value, display.efficiency_precision),
        };
        let share = point
            .share
            .map(|share| format!("{share:.1}%"))
            .unwrap_or_default();
        let width = if max > 0.0 {
            ((point.value / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        table.add_row(Row::from(vec![
            Cell::new(&point.label),
            right(value),
            right(share),
            Cell::new("█".repeat(width)).fg(Color::Cyan),
        ]));
    }
    format!("{}\n{table}", series.kind.title())
}

pub fn render_result(view: &ResultView, display: &DisplayConfig) -> String {
    [
        render_summary_table(view, display),
        format!(
            "Selected projects\n{}",
            render_selected_table(&view.rows, display)
        ),
        format!("Analysis\n{}", render_analysis_table(view, display)),
        render_chart_table(&view.cost_distribution, display),
        render_chart_table(&view.efficiency, display),
    ]
    .join("\n\n")
}

pub fn render_optimization_summary(
    summary: &OptimizationSummary,
    display: &DisplayConfig,
) -> String {
    let symbol = display.currency_symbol.as_str();
    let mut table = new_table();
    table.set_header(vec![
        "Selected",
        "Total gain",
        "Total cost",
        "Capacity used",
        "Efficiency",
    ]);
    table.add_row(Row::from(vec![
        Cell::new(summary.selected.join(", ")),
        right(format_currency(summary.total_gain, symbol)),
        right(format_currency(summary.total_cost, symbol)),
        right(format_percent(summary.capacity_used)),
        right(format_efficiency(summary.efficiency, display.efficiency_precision)),
    ]));
    table.to_string()
}

pub fn render_health(status: &HealthStatus) -> String {
    let mut table = new_table();
    table.set_header(vec!["Service", "Status", "Checked at"]);
    let status_cell = if status.is_healthy() {
        Cell::new(&status.status).fg(Color::Green)
    } else {
        Cell::new(&status.status).fg(Color::Red)
    };
    table.add_row(Row::from(vec![
        Cell::new(status.service.as_deref().unwrap_or("-")),
        status_cell,
        Cell::new(
            status
                .checked_at()
                .map(|at| at.to_rfc3339())
                .unwrap_or_else(|| "-".to_string()),
        ),
    ]));
    table.to_string()
}
