//! Time-series charts with a fixed scale and a limit line.

use ratatui::{
    layout::Rect,
    style::Style,
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use sumpwatch_core::TimeSeries;

use super::Theme;

/// Axis range and limit line for one kind of series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartScale {
    pub title: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    /// Level drawn as a horizontal warning line.
    pub redline: f64,
}

pub const DEPTH_SCALE: ChartScale = ChartScale {
    title: "Water depth",
    unit: "mm",
    min: 100.0,
    max: 225.0,
    redline: 200.0,
};

pub const VOLUME_SCALE: ChartScale = ChartScale {
    title: "Sump volume",
    unit: "L",
    min: 14.0,
    max: 30.0,
    redline: 28.0,
};

pub const FLOW_SCALE: ChartScale = ChartScale {
    title: "Inflow rate",
    unit: "L/h",
    min: 0.0,
    max: 50.0,
    redline: 45.0,
};

pub const TREND_SCALE: ChartScale = ChartScale {
    title: "Average inflow per pump cycle",
    ..FLOW_SCALE
};

impl ChartScale {
    /// Y bounds, widened to fit any data outside the nominal range.
    pub fn bounds(&self, data: Option<(f64, f64)>) -> [f64; 2] {
        match data {
            Some((lo, hi)) => [self.min.min(lo), self.max.max(hi)],
            None => [self.min, self.max],
        }
    }
}

/// Points as (minutes before the newest sample, value).
pub fn relative_points(series: &TimeSeries) -> Vec<(f64, f64)> {
    let Some(newest) = series.latest().map(|s| s.time) else {
        return Vec::new();
    };
    series.iter().map(|s| ((s.time - newest) / 60.0, s.value)).collect()
}

/// Render `series` as a line chart on `scale`.
pub fn render_series(
    frame: &mut Frame,
    theme: &Theme,
    series: &TimeSeries,
    scale: &ChartScale,
    area: Rect,
) {
    let block = Block::default()
        .title(format!(" {} ({}) ", scale.title, scale.unit))
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border));

    let points = relative_points(series);
    if points.len() < 2 {
        let waiting = Paragraph::new(Span::styled(
            " Waiting for data...",
            Style::default().fg(theme.border),
        ))
        .block(block);
        frame.render_widget(waiting, area);
        return;
    }

    let span = points.first().map(|p| p.0).unwrap_or(-1.0).min(-1.0 / 60.0);
    let redline = [(span, scale.redline), (0.0, scale.redline)];
    let [y_min, y_max] = scale.bounds(series.value_range());

    let datasets = vec![
        Dataset::default()
            .name(series.name())
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme.series))
            .data(&points),
        Dataset::default()
            .name(format!("limit {:.0}", scale.redline))
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme.redline_style())
            .data(&redline),
    ];

    let x_labels = vec![
        Span::raw(format_minutes(span)),
        Span::raw(format_minutes(span / 2.0)),
        Span::raw("now"),
    ];
    let y_labels = vec![
        Span::raw(format!("{y_min:.0}")),
        Span::raw(format!("{:.0}", (y_min + y_max) / 2.0)),
        Span::raw(format!("{y_max:.0}")),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(theme.border))
                .bounds([span, 0.0])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(theme.border))
                .bounds([y_min, y_max])
                .labels(y_labels),
        );

    frame.render_widget(chart, area);
}

fn format_minutes(m: f64) -> String {
    let m = m.abs();
    if m >= 120.0 {
        format!("-{:.1}h", m / 60.0)
    } else {
        format!("-{m:.0}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use sumpwatch_core::Sample;

    fn series(values: &[(f64, f64)]) -> TimeSeries {
        let mut s = TimeSeries::new("depth", 100);
        for (t, v) in values {
            s.append(Sample::new(*t, *v)).unwrap();
        }
        s
    }

    #[test]
    fn points_are_minutes_before_newest() {
        let s = series(&[(0.0, 1.0), (60.0, 2.0), (120.0, 3.0)]);
        assert_eq!(relative_points(&s), vec![(-2.0, 1.0), (-1.0, 2.0), (0.0, 3.0)]);
        assert!(relative_points(&TimeSeries::new("empty", 4)).is_empty());
    }

    #[test]
    fn bounds_widen_for_outliers() {
        assert_eq!(DEPTH_SCALE.bounds(None), [100.0, 225.0]);
        assert_eq!(DEPTH_SCALE.bounds(Some((120.0, 180.0))), [100.0, 225.0]);
        assert_eq!(DEPTH_SCALE.bounds(Some((40.0, 260.0))), [40.0, 260.0]);
    }

    #[test]
    fn trend_shares_flow_axis() {
        assert_eq!(TREND_SCALE.max, 50.0);
        assert_eq!(TREND_SCALE.redline, 45.0);
        assert_ne!(TREND_SCALE.title, FLOW_SCALE.title);
    }

    #[test]
    fn minute_labels() {
        assert_eq!(format_minutes(-30.0), "-30m");
        assert_eq!(format_minutes(-180.0), "-3.0h");
    }

    #[test]
    fn renders_title_and_placeholder() {
        let theme = Theme::dark();
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();

        let empty = TimeSeries::new("depth", 10);
        terminal
            .draw(|f| {
                let area = f.area();
                render_series(f, &theme, &empty, &DEPTH_SCALE, area)
            })
            .unwrap();
        let text: String = terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Water depth (mm)"));
        assert!(text.contains("Waiting for data"));

        let full = series(&[(0.0, 150.0), (60.0, 160.0), (120.0, 170.0)]);
        terminal
            .draw(|f| {
                let area = f.area();
                render_series(f, &theme, &full, &DEPTH_SCALE, area)
            })
            .unwrap();
        let text: String = terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("now"));
    }
}
