//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::duration::format_duration;

/// Render the header bar with alarm and pump state.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let monitor = app.monitor();
    let alarming = monitor.is_alarming();
    let alarm_style = app.theme.alarm_style(alarming, app.silenced);
    let alarm_text = match (alarming, app.silenced) {
        (false, _) => "no leak",
        (true, true) => "LEAK (silenced)",
        (true, false) => "LEAK ALARM",
    };

    let pump = monitor.pump_state();
    let inflow = monitor
        .last_values()
        .map(|v| format!("{:.1} L/h", v.flow))
        .unwrap_or_else(|| "-".to_string());

    let line = Line::from(vec![
        Span::styled(" ● ", alarm_style),
        Span::styled("SUMPWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(alarm_text, alarm_style),
        Span::raw(" │ pump "),
        Span::styled(pump.label(), app.theme.pump_style(pump)),
        Span::raw(" │ inflow "),
        Span::raw(inflow),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, v)| Line::from(format!(" {}:{} ", i + 1, v.label())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.current_view.index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the sensor source, time since the last reading and the controls.
/// Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let reading = match app.reading_age() {
        Some(age) => format!("Reading {} ago", format_duration(age)),
        None => "Waiting for sensors...".to_string(),
    };

    let status = format!(
        " {} | {} | {} | s:silence Tab:switch ?:help q:quit",
        app.current_view.label(),
        app.source_description(),
        reading,
    );

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Views",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  1-4         Summary/Depth/Volume/Flow"),
        Line::from("  Tab ←/→     Next/previous view"),
        Line::from("  Esc         Back to summary"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Alarm",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  s           Silence alarm"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ?           Toggle help"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 19u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use ratatui::{backend::TestBackend, Terminal};
    use sumpwatch_core::Reading;

    fn draw(app: &App, f: impl Fn(&mut Frame, &App, Rect)) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                f(frame, app, area)
            })
            .unwrap();
        terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn header_reflects_alarm_state() {
        let (mut app, shared, _sink) = test_app();
        assert!(draw(&app, render_header).contains("no leak"));

        shared.publish(Reading::new(120.0, 40, 1.0));
        app.tick();
        assert!(draw(&app, render_header).contains("LEAK ALARM"));

        app.silence_alarm();
        assert!(draw(&app, render_header).contains("LEAK (silenced)"));
    }

    #[test]
    fn tabs_list_every_view() {
        let (app, _shared, _sink) = test_app();
        let text = draw(&app, render_tabs);
        for view in View::ALL {
            assert!(text.contains(view.label()));
        }
    }

    #[test]
    fn status_bar_shows_source() {
        let (app, _shared, _sink) = test_app();
        let text = draw(&app, render_status_bar);
        assert!(text.contains("scripted"));
        assert!(text.contains("Waiting for sensors"));
    }
}
