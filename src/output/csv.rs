use anyhow::Result;

use crate::render::{ChartSeries, ResultView};

pub fn selected_to_csv(view: &ResultView) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["name", "cost", "expected_gain", "efficiency"])?;
    for row in &view.rows {
        writer.write_record([
            row.name.clone(),
            format!("{:.2}", row.cost),
            format!("{:.2}", row.gain),
            format!("{:.4}", row.efficiency),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn series_to_csv(series: &ChartSeries) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["chart", "label", "value", "share_pct"])?;
    for point in &series.points {
        writer.write_record([
            series.kind.to_string(),
            point.label.clone(),
            format!("{:.4}", point.value),
            point.share.map(|s| format!("{s:.2}")).unwrap_or_default(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}
