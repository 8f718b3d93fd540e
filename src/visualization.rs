//! Visualization module - temperature trend chart

use plotters::prelude::*;

use crate::history::HistoryEntry;

/// Draw the recent temperature series (newest-first input) as a line
/// chart. Empty input produces no file.
pub fn render_temperature_chart(
    entries: &[HistoryEntry<f64>],
    path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if entries.is_empty() {
        return Ok(());
    }

    let mut values: Vec<f64> = entries.iter().map(|e| e.value).collect();
    values.reverse();

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min) - 0.5;
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max) + 0.5;

    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Temperature (\u{b0}C)", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..values.len() as f64, min..max)?;

    chart.configure_mesh().x_desc("Sample").y_desc("\u{b0}C").draw()?;

    chart.draw_series(LineSeries::new(
        values.iter().enumerate().map(|(i, v)| (i as f64, *v)),
        &RED,
    ))?;
    root.present()?;
    Ok(())
}
