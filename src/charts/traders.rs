use std::path::Path;

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::{viridis, DrawResult, FONT};
use crate::error::{AppError, Result};
use crate::types::TraderClass;

/// Log-scale trader count per class. Counts span orders of magnitude
/// (retail dwarfs everything), hence the log axis.
pub fn draw_trader_histogram(path: &Path, counts: &[(TraderClass, u64)]) -> Result<()> {
    histogram(path, counts).map_err(AppError::chart)
}

fn histogram(path: &Path, counts: &[(TraderClass, u64)]) -> DrawResult {
    let n = counts.len();
    let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(0) as f64;
    let y_top = (max * 3.0).max(10.0);

    let root = BitMapBackend::new(path, (1200, 700)).into_drawing_area();
    root.fill(&WHITE)?;

    let label_of = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => counts
            .get(*i)
            .map(|(class, _)| class.label().to_string())
            .unwrap_or_default(),
        _ => String::new(),
    };

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Trader Classification (Based on real Fills)",
            (FONT, 28).into_font().style(FontStyle::Bold),
        )
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d((0..n).into_segmented(), (0.5_f64..y_top).log_scale())?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&label_of)
        .y_label_formatter(&|v: &f64| format!("{v:.0}"))
        .x_desc("Category")
        .y_desc("Number of Traders (Log Scale)")
        .axis_desc_style((FONT, 16))
        .draw()?;

    let nonzero = || counts.iter().enumerate().filter(|(_, (_, c))| *c > 0);

    chart.draw_series(nonzero().map(|(i, (_, c))| {
        let mut bar = Rectangle::new(
            [(SegmentValue::Exact(i), 0.5), (SegmentValue::Exact(i + 1), *c as f64)],
            viridis(i, n).filled(),
        );
        bar.set_margin(0, 0, 20, 20);
        bar
    }))?;

    let count_style = TextStyle::from((FONT, 16).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(nonzero().map(|(i, (_, c))| {
        Text::new(
            c.to_string(),
            (SegmentValue::CenterOf(i), *c as f64 * 1.08),
            count_style.clone(),
        )
    }))?;

    root.present()?;
    Ok(())
}
