use std::path::Path;

use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::{thousands, viridis, DrawResult, FONT, PASTEL};
use crate::error::{AppError, Result};
use crate::report::domains::sorted_by;
use crate::types::DomainStats;

/// Two donuts side by side: where rewards go, and where the volume is.
pub fn draw_market_share(path: &Path, stats: &[DomainStats]) -> Result<()> {
    market_share(path, stats).map_err(AppError::chart)
}

/// Horizontal bars of the estimated spread revenue per domain, biggest on top.
pub fn draw_spread_revenue(path: &Path, stats: &[DomainStats]) -> Result<()> {
    spread_revenue(path, stats).map_err(AppError::chart)
}

fn market_share(path: &Path, stats: &[DomainStats]) -> DrawResult {
    let root = BitMapBackend::new(path, (1600, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((1, 2));

    let by_reward = sorted_by(stats, |s| s.daily_reward);
    donut(
        &panels[0],
        "Market Share (Salaries / Rewards)",
        &by_reward,
        |s| s.daily_reward,
    )?;
    let by_volume = sorted_by(stats, |s| s.total_volume);
    donut(
        &panels[1],
        "Volume Share (Total Activity)",
        &by_volume,
        |s| s.total_volume,
    )?;

    root.present()?;
    Ok(())
}

fn donut(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    title: &str,
    stats: &[DomainStats],
    value: fn(&DomainStats) -> f64,
) -> DrawResult {
    let area = area.titled(title, (FONT, 26).into_font().style(FontStyle::Bold))?;
    let (w, h) = area.dim_in_pixel();
    let center = ((w / 2) as i32, (h / 2) as i32);

    let slices: Vec<&DomainStats> = stats.iter().filter(|s| value(s) > 0.0).collect();
    let total: f64 = slices.iter().map(|s| value(s)).sum();
    if slices.is_empty() || total <= 0.0 {
        area.draw(&Text::new(
            "no data",
            center,
            TextStyle::from((FONT, 20).into_font()).pos(Pos::new(HPos::Center, VPos::Center)),
        ))?;
        return Ok(());
    }

    let radius = f64::from(w.min(h)) * 0.32;
    let sizes: Vec<f64> = slices.iter().map(|s| value(s)).collect();
    let colors: Vec<RGBColor> = (0..slices.len()).map(|i| PASTEL[i % PASTEL.len()]).collect();
    let labels: Vec<String> = slices
        .iter()
        .map(|s| format!("{} {:.1}%", s.domain.label(), value(s) / total * 100.0))
        .collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(140.0);
    pie.label_style((FONT, 16).into_font().color(&BLACK));
    area.draw(&pie)?;

    // Punch the hole after the slices so it reads as a ring.
    area.draw(&Circle::new(center, (radius * 0.70) as i32, WHITE.filled()))?;
    Ok(())
}

fn spread_revenue(path: &Path, stats: &[DomainStats]) -> DrawResult {
    let ranked = sorted_by(stats, |s| s.est_spread_revenue);
    let n = ranked.len();

    let root = BitMapBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    if n == 0 {
        root.present()?;
        return Ok(());
    }

    let max = ranked
        .iter()
        .map(|s| s.est_spread_revenue)
        .fold(0.0_f64, f64::max);
    let x_max = if max > 0.0 { max * 1.25 } else { 1.0 };

    // Row 0 is drawn at the bottom, so the biggest domain takes the last row.
    let row = |rank: usize| n - 1 - rank;
    let label_of = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(r) if *r < n => ranked[n - 1 - *r].domain.label().to_string(),
        _ => String::new(),
    };

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Estimated Spread Revenue by Domain ($/day)",
            (FONT, 28).into_font().style(FontStyle::Bold),
        )
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(150)
        .build_cartesian_2d(0.0..x_max, (0..n).into_segmented())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n)
        .y_label_formatter(&label_of)
        .x_label_formatter(&|v: &f64| format!("${}", thousands(*v)))
        .x_desc("Estimated Daily Revenue (USDC)")
        .y_desc("Domain")
        .axis_desc_style((FONT, 16))
        .draw()?;

    chart.draw_series(ranked.iter().enumerate().map(|(rank, s)| {
        let mut bar = Rectangle::new(
            [
                (0.0, SegmentValue::Exact(row(rank))),
                (s.est_spread_revenue, SegmentValue::Exact(row(rank) + 1)),
            ],
            viridis(rank, n).filled(),
        );
        bar.set_margin(6, 6, 0, 0);
        bar
    }))?;

    let value_style = TextStyle::from((FONT, 16).into_font().style(FontStyle::Bold))
        .pos(Pos::new(HPos::Left, VPos::Center));
    chart.draw_series(ranked.iter().enumerate().map(|(rank, s)| {
        Text::new(
            format!(" ${}", thousands(s.est_spread_revenue)),
            (
                s.est_spread_revenue * 1.01,
                SegmentValue::CenterOf(row(rank)),
            ),
            value_style.clone(),
        )
    }))?;

    root.present()?;
    Ok(())
}
