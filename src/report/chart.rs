// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! SVG bar chart of scores

use plotters::prelude::*;
use std::path::Path;
use tracing::info;

use super::{require_file_name, require_scores};
use crate::scores::{AnalyzeResult, SortOrder};
use crate::{PerspectiveError, Result};

pub const DEFAULT_TITLE: &str = "Perspective API result";

const SIZE: (u32, u32) = (1200, 480);

fn chart_error<E: std::fmt::Display>(e: E) -> PerspectiveError {
    PerspectiveError::Chart(e.to_string())
}

/// Draw a horizontal bar chart, lowest score at the bottom, and write it to
/// `path` as SVG
pub fn save_chart(scores: &AnalyzeResult, path: &Path, title: Option<&str>, grid_lines: bool) -> Result<()> {
    require_file_name(path)?;
    require_scores(scores)?;

    let rows = scores.sorted(SortOrder::Ascending);
    let names: Vec<String> = rows.iter().map(|s| s.attribute.display_name()).collect();
    let title = title.filter(|t| !t.trim().is_empty()).unwrap_or(DEFAULT_TITLE);
    let label_width = names.iter().map(|n| n.len()).max().unwrap_or(0) as u32 * 8 + 20;

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 26))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(label_width)
        .build_cartesian_2d(0f64..100f64, (0..rows.len() as i32).into_segmented())
        .map_err(chart_error)?;

    let label_for = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(i) => names.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    };

    let mut mesh = chart.configure_mesh();
    mesh.x_desc("Score values %")
        .y_desc("Attributes")
        .x_labels(11)
        .y_labels(rows.len())
        .y_label_formatter(&label_for);
    if !grid_lines {
        mesh.disable_mesh();
    }
    mesh.draw().map_err(chart_error)?;

    chart
        .draw_series(rows.iter().enumerate().map(|(i, s)| {
            let i = i as i32;
            let mut bar = Rectangle::new(
                [(0.0, SegmentValue::Exact(i)), (s.value, SegmentValue::Exact(i + 1))],
                BLUE.mix(0.7).filled(),
            );
            bar.set_margin(4, 4, 0, 0);
            bar
        }))
        .map_err(chart_error)?;

    chart
        .draw_series(rows.iter().enumerate().map(|(i, s)| {
            Text::new(
                format!("{:.1}", s.value),
                (s.value + 0.5, SegmentValue::CenterOf(i as i32)),
                ("sans-serif", 14.0).into_font(),
            )
        }))
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    info!("Chart saved to {}", path.display());
    Ok(())
}
