use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, Copy)]
pub struct UiAreas {
    pub size: Rect,
    pub header: Rect,
    pub main: Rect,
    pub content: Rect,
    pub transactions: Rect,
    pub footer: Rect,
    pub error_line: Rect,
    pub status_line: Rect,
    pub command_line: Rect,
}

pub fn areas(size: Rect) -> UiAreas {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(size);

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(8)])
        .split(vertical[1]);

    let footer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(vertical[2]);

    UiAreas {
        size,
        header: vertical[0],
        main: vertical[1],
        content: main_chunks[0],
        transactions: main_chunks[1],
        footer: vertical[2],
        error_line: footer_chunks[0],
        status_line: footer_chunks[1],
        command_line: footer_chunks[2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_areas_fit_terminal() {
        let size = Rect::new(0, 0, 100, 40);
        let areas = areas(size);
        assert_eq!(areas.header.height, 3);
        assert_eq!(areas.transactions.height, 8);
        assert_eq!(areas.command_line.y, 39);
        assert_eq!(
            areas.header.height + areas.main.height + areas.footer.height,
            size.height
        );
    }
}
