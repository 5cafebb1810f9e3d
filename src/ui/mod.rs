//! Terminal UI rendering using ratatui.
//!
//! This module contains all the view-specific rendering logic for the TUI.
//! Each view is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`summary`]: Current values, pump and alarm state, per-cycle trend
//! - [`chart`]: Line charts for the depth, volume and flow series
//! - [`common`]: Shared components (header, tabs, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ View Content                         │
//! │ (summary::render / chart::render_*)  │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlay rendered on top:
//!    - common::render_help
//! ```

pub mod chart;
pub mod common;
pub mod summary;
pub mod theme;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    Frame,
};

pub use theme::Theme;

use crate::app::{App, View};

/// Minimum terminal size for usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 12;

/// Draw the whole screen for the current view.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = ratatui::widgets::Paragraph::new(msg)
            .alignment(ratatui::layout::Alignment::Center)
            .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
        let centered = Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5)
            .intersection(area);
        frame.render_widget(paragraph, centered);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(1), // Tabs
        Constraint::Min(8),    // Content
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    common::render_tabs(frame, app, chunks[1]);

    let monitor = app.monitor();
    match app.current_view {
        View::Summary => summary::render(frame, app, chunks[2]),
        View::Depth => chart::render_series(
            frame,
            &app.theme,
            monitor.depth_series(),
            &chart::DEPTH_SCALE,
            chunks[2],
        ),
        View::Volume => chart::render_series(
            frame,
            &app.theme,
            monitor.volume_series(),
            &chart::VOLUME_SCALE,
            chunks[2],
        ),
        View::Flow => chart::render_series(
            frame,
            &app.theme,
            monitor.flow_series(),
            &chart::FLOW_SCALE,
            chunks[2],
        ),
    }

    common::render_status_bar(frame, app, chunks[3]);

    if app.show_help {
        common::render_help(frame, app, area);
    }
}
