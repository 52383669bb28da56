//! Layout calculations for the UI

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Frame-level areas shared by both screens
pub struct ScreenLayout {
    pub tabs: Rect,
    pub body: Rect,
    pub status: Option<Rect>,
    pub help: Rect,
}

/// Dashboard screen: run list on the left, run detail (tables + detail) on the right
pub struct DashboardLayout {
    pub runs: Rect,
    pub tables: Rect,
    pub detail: Rect,
}

/// Calculate centered popup area
pub fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let popup_x = area.x + (area.width.saturating_sub(width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect::new(
        popup_x,
        popup_y,
        width.min(area.width),
        height.min(area.height),
    )
}

/// Full-screen overlay inset by `margin` on every side
pub fn inset(area: Rect, margin: u16) -> Rect {
    Rect::new(
        area.x + margin.min(area.width / 2),
        area.y + margin.min(area.height / 2),
        area.width.saturating_sub(margin * 2),
        area.height.saturating_sub(margin * 2),
    )
}

pub fn calculate_screen_layout(area: Rect, has_status: bool) -> ScreenLayout {
    let chunks = if has_status {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area)
    };

    let (status, help) = if has_status {
        (Some(chunks[2]), chunks[3])
    } else {
        (None, chunks[2])
    };

    ScreenLayout {
        tabs: chunks[0],
        body: chunks[1],
        status,
        help,
    }
}

pub fn calculate_dashboard_layout(body: Rect) -> DashboardLayout {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(42), Constraint::Percentage(58)])
        .split(body);

    let detail_columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(0)])
        .split(columns[1]);

    DashboardLayout {
        runs: columns[0],
        tables: detail_columns[0],
        detail: detail_columns[1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_popup_fits_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_popup(area, 60, 10);
        assert_eq!(popup, Rect::new(20, 15, 60, 10));

        let small = centered_popup(Rect::new(0, 0, 30, 5), 60, 10);
        assert_eq!(small.width, 30);
        assert_eq!(small.height, 5);
    }

    #[test]
    fn test_screen_layout_reserves_status_line() {
        let area = Rect::new(0, 0, 120, 40);
        let with_status = calculate_screen_layout(area, true);
        assert!(with_status.status.is_some());
        assert_eq!(with_status.help.height, 1);
        assert_eq!(with_status.body.height, 40 - 3 - 1 - 1);

        let without = calculate_screen_layout(area, false);
        assert!(without.status.is_none());
        assert_eq!(without.body.height, 40 - 3 - 1);
    }

    #[test]
    fn test_dashboard_layout_splits_body() {
        let layout = calculate_dashboard_layout(Rect::new(0, 3, 120, 30));
        assert_eq!(layout.runs.x, 0);
        assert_eq!(layout.tables.width, 28);
        assert_eq!(layout.detail.x, layout.tables.x + 28);
    }
}
