use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, Copy)]
pub struct UiAreas {
    pub size: Rect,
    pub header: Rect,
    pub contract: Rect,
    pub functions: Rect,
    /// Zero-height unless `setGreeting` is selected
    pub greeting: Rect,
    pub hint: Rect,
    pub button: Rect,
    pub outcome: Rect,
    pub preview: Rect,
    pub history: Rect,
    pub status_line: Rect,
    pub key_hints: Rect,
}

pub fn areas(size: Rect, show_greeting: bool) -> UiAreas {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(size);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(vertical[1]);

    let form_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Length(if show_greeting { 3 } else { 0 }),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(4),
        ])
        .split(main_chunks[0]);

    let side_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(main_chunks[1]);

    let footer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(vertical[2]);

    UiAreas {
        size,
        header: vertical[0],
        contract: form_chunks[0],
        functions: form_chunks[1],
        greeting: form_chunks[2],
        hint: form_chunks[3],
        button: form_chunks[4],
        outcome: form_chunks[5],
        preview: side_chunks[0],
        history: side_chunks[1],
        status_line: footer_chunks[0],
        key_hints: footer_chunks[1],
    }
}
