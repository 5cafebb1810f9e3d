//! Summary view rendering.
//!
//! Current depth, volume and inflow in large labels, the pump and alarm
//! state, and below them the per-cycle inflow trend.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::chart::{self, TREND_SCALE};

/// Format a reading for the value labels.
pub fn format_value(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v:.1} {unit}"),
        None => format!("--- {unit}"),
    }
}

/// Render the Summary view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([Constraint::Length(7), Constraint::Min(6)]).split(area);

    render_values(frame, app, chunks[0]);
    chart::render_series(
        frame,
        &app.theme,
        app.monitor().trend_series(),
        &TREND_SCALE,
        chunks[1],
    );
}

fn render_values(frame: &mut Frame, app: &App, area: Rect) {
    let monitor = app.monitor();
    let values = monitor.last_values();
    let label = Style::default().add_modifier(Modifier::DIM);
    let big = Style::default().add_modifier(Modifier::BOLD);

    let pump = monitor.pump_state();
    let alarm_text = match (monitor.is_alarming(), app.silenced) {
        (false, _) => "OK",
        (true, true) => "LEAK (silenced)",
        (true, false) => "LEAK",
    };

    let last_cycle = monitor
        .trend_series()
        .latest()
        .map(|s| format!("{:.1} L/h", s.value))
        .unwrap_or_else(|| "-".to_string());

    let lines = vec![
        Line::from(vec![
            Span::styled(" Depth    ", label),
            Span::styled(format_value(values.map(|v| v.depth), "mm"), big),
        ]),
        Line::from(vec![
            Span::styled(" Volume   ", label),
            Span::styled(format_value(values.map(|v| v.volume), "L"), big),
        ]),
        Line::from(vec![
            Span::styled(" Inflow   ", label),
            Span::styled(format_value(values.map(|v| v.flow), "L/h"), big),
        ]),
        Line::from(vec![
            Span::styled(" Pump     ", label),
            Span::styled(pump.label(), app.theme.pump_style(pump)),
            Span::styled("   Alarm ", label),
            Span::styled(
                alarm_text,
                app.theme.alarm_style(monitor.is_alarming(), app.silenced),
            ),
        ]),
        Line::from(vec![
            Span::styled(" Cycles   ", label),
            Span::raw(format!("{}", monitor.trend_series().len())),
            Span::styled("   last ", label),
            Span::raw(last_cycle),
        ]),
    ];

    let block = Block::default()
        .title(" Sump ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use ratatui::{backend::TestBackend, Terminal};
    use sumpwatch_core::Reading;

    #[test]
    fn values_use_one_decimal() {
        assert_eq!(format_value(Some(123.456), "mm"), "123.5 mm");
        assert_eq!(format_value(None, "L"), "--- L");
    }

    #[test]
    fn shows_latest_values_and_alarm() {
        let (mut app, shared, _sink) = test_app();
        shared.publish(Reading::new(120.0, 30, 1.0));
        app.tick();

        let mut terminal = Terminal::new(TestBackend::new(70, 20)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                render(f, &app, area)
            })
            .unwrap();
        let text: String = terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect();

        assert!(text.contains("120.0 mm"));
        assert!(text.contains("16.2 L"));
        assert!(text.contains("LEAK"));
        assert!(text.contains("running"));
    }
}
