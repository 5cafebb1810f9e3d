//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use sumpwatch_core::PumpState;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for a silenced alarm and for stale readings.
    pub warning: Color,
    /// Color for an active alarm and chart redlines.
    pub critical: Color,
    /// Color for the all-clear state.
    pub healthy: Color,
    /// Color for plotted series.
    pub series: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            series: Color::Cyan,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            series: Color::Blue,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for the alarm indicator.
    pub fn alarm_style(&self, alarming: bool, silenced: bool) -> Style {
        match (alarming, silenced) {
            (false, _) => Style::default().fg(self.healthy),
            (true, true) => Style::default().fg(self.warning),
            (true, false) => Style::default()
                .fg(self.critical)
                .add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK),
        }
    }

    /// Style for the pump indicator.
    pub fn pump_style(&self, state: PumpState) -> Style {
        match state {
            PumpState::Running => Style::default().fg(self.highlight),
            PumpState::Stopped => Style::default().fg(self.healthy),
        }
    }

    /// Style for the horizontal limit line on charts.
    pub fn redline_style(&self) -> Style {
        Style::default().fg(self.critical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alarm_style_tracks_silence() {
        let theme = Theme::dark();
        assert_eq!(theme.alarm_style(false, false).fg, Some(Color::Green));
        assert_eq!(theme.alarm_style(true, true).fg, Some(Color::Yellow));
        let active = theme.alarm_style(true, false);
        assert_eq!(active.fg, Some(Color::Red));
        assert!(active.add_modifier.contains(Modifier::BOLD));
    }
}
