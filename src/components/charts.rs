//! Gauges and the DQ score line chart

use crate::components::theme::Palette;
use crate::model::profiling::DqScorePoint;
use crate::model::timestamp;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, GraphType},
    Frame,
};

/// Clamp a percentage into the gauge range
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Percentage gauge. `None` renders an empty gauge labelled `N/A`.
pub fn draw_gauge(frame: &mut Frame, area: Rect, title: &str, value: Option<f64>, palette: &Palette) {
    let (ratio, label) = match value {
        Some(v) => {
            let pct = clamp_percent(v);
            (pct / 100.0, format!("{:.1}%", pct))
        }
        None => (0.0, "N/A".to_string()),
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.border(false))
                .title(format!(" {} ", title))
                .title_style(palette.header()),
        )
        .gauge_style(Style::default().fg(palette.accent))
        .ratio(ratio)
        .label(Span::styled(
            label,
            Style::default().fg(palette.text).add_modifier(Modifier::BOLD),
        ));

    frame.render_widget(gauge, area);
}

/// Chart coordinates: x is seconds since the first point
pub fn chart_points(series: &[DqScorePoint]) -> Vec<(f64, f64)> {
    let Some(first) = series.first() else {
        return Vec::new();
    };
    series
        .iter()
        .map(|p| ((p.time - first.time).num_seconds() as f64, p.percent))
        .collect()
}

/// Line chart of a DQ score series. Callers only pass series with at least
/// two points.
pub fn draw_dq_trend(frame: &mut Frame, area: Rect, series: &[DqScorePoint], palette: &Palette) {
    let points = chart_points(series);
    let x_max = points.last().map(|(x, _)| *x).unwrap_or(0.0).max(1.0);

    let first_label = series
        .first()
        .map(|p| timestamp::format_short(&p.time))
        .unwrap_or_default();
    let last_label = series
        .last()
        .map(|p| timestamp::format_short(&p.time))
        .unwrap_or_default();

    let dataset = Dataset::default()
        .name("DQ Score")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(palette.accent))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.border(false))
                .title(" DQ Score Trend ")
                .title_style(palette.title()),
        )
        .x_axis(
            Axis::default()
                .style(palette.muted())
                .bounds([0.0, x_max])
                .labels(vec![Span::raw(first_label), Span::raw(last_label)]),
        )
        .y_axis(
            Axis::default()
                .style(palette.muted())
                .bounds([0.0, 100.0])
                .labels(vec![Span::raw("0"), Span::raw("50"), Span::raw("100")]),
        );

    frame.render_widget(chart, area);
}
