use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

pub mod layout;

use crate::app::{App, Focus, InputMode, StatusLevel, WalletStatus};
use crate::domain::contract::FunctionKind;
use crate::domain::submission::SubmissionPhase;

pub fn draw(f: &mut Frame, app: &App) {
    let areas = layout::areas(f.size(), app.show_greeting());

    draw_header(f, areas.header, app);
    draw_contract_input(f, areas.contract, app);
    draw_function_list(f, areas.functions, app);
    if app.show_greeting() {
        draw_greeting_input(f, areas.greeting, app);
    }
    draw_hint(f, areas.hint, app);
    draw_button(f, areas.button, app);
    draw_outcome(f, areas.outcome, app);
    draw_preview(f, areas.preview, app);
    draw_history(f, areas.history, app);
    draw_status_line(f, areas.status_line, app);
    f.render_widget(Paragraph::new(action_hints(app)), areas.key_hints);

    if app.awaiting_approval() {
        draw_signature_popup(f, areas.size, app);
    }
    if app.help_open {
        draw_help_popup(f, areas.size);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let title = Line::from(vec![
        Span::styled(
            "GM ARC Faucet",
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Network", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(" {}", app.network.display())),
    ]);
    let left = Paragraph::new(title)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    let wallet_style = match app.wallet {
        WalletStatus::Disconnected => Style::default().fg(Color::Yellow),
        WalletStatus::Connecting => Style::default().fg(Color::DarkGray),
        WalletStatus::Connected { .. } => Style::default().fg(Color::Green),
    };
    let mut spans = vec![Span::styled(app.wallet_label(), wallet_style)];
    if !app.connector.is_empty() {
        spans.push(Span::styled(
            format!("  {}", app.connector),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let right = Paragraph::new(Line::from(spans))
        .block(Block::default().title("Wallet").borders(Borders::ALL))
        .alignment(Alignment::Right);

    f.render_widget(left, chunks[0]);
    f.render_widget(right, chunks[1]);
}

fn focus_border(app: &App, focus: Focus) -> Style {
    if app.focus != focus {
        Style::default().fg(Color::DarkGray)
    } else if app.input_mode == InputMode::Editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::LightCyan)
    }
}

fn draw_text_input(f: &mut Frame, area: Rect, app: &App, focus: Focus, title: &str, value: &str, placeholder: &str) {
    let content = if value.is_empty() {
        Span::styled(placeholder.to_string(), Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(value.to_string())
    };
    let paragraph = Paragraph::new(Line::from(content)).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(focus_border(app, focus)),
    );
    f.render_widget(paragraph, area);

    if app.focus == focus && app.input_mode == InputMode::Editing {
        f.set_cursor(cursor_x(area, value), area.y.saturating_add(1));
    }
}

/// Column after the last typed char, pinned inside the right border
fn cursor_x(area: Rect, value: &str) -> u16 {
    let typed = u16::try_from(value.chars().count()).unwrap_or(u16::MAX);
    let max_x = area.x.saturating_add(area.width.saturating_sub(2));
    area.x.saturating_add(1).saturating_add(typed).min(max_x)
}

fn draw_contract_input(f: &mut Frame, area: Rect, app: &App) {
    draw_text_input(f, area, app, Focus::Contract, "Contract address", &app.contract_input, "0x...");
}

fn draw_greeting_input(f: &mut Frame, area: Rect, app: &App) {
    draw_text_input(f, area, app, Focus::Greeting, "New greeting", &app.argument_input, "");
}

fn draw_function_list(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = FunctionKind::ALL
        .iter()
        .map(|kind| ListItem::new(kind.label()))
        .collect();
    let selected = FunctionKind::ALL.iter().position(|kind| *kind == app.function);

    let list = List::new(items)
        .block(
            Block::default()
                .title("Function")
                .borders(Borders::ALL)
                .border_style(focus_border(app, Focus::Function)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(selected);
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_hint(f: &mut Frame, area: Rect, app: &App) {
    let paragraph = Paragraph::new(Span::styled(
        format!(" {}", app.hint()),
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(paragraph, area);
}

fn draw_button(f: &mut Frame, area: Rect, app: &App) {
    let style = if app.can_submit() {
        Style::default()
            .fg(Color::Black)
            .bg(Color::LightGreen)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let paragraph = Paragraph::new(Span::styled(format!(" {} ", app.submit_label()), style))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn draw_outcome(f: &mut Frame, area: Rect, app: &App) {
    let mut lines: Vec<Line> = app
        .status_lines()
        .into_iter()
        .map(|text| {
            let style = if text.starts_with("Error:") {
                Style::default().fg(Color::Red)
            } else if text == "Transaction confirmed" {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            Line::from(Span::styled(text, style))
        })
        .collect();

    let phase = app.submission.phase();
    if phase.is_busy() {
        lines.insert(
            0,
            Line::from(Span::styled(
                phase.label().to_string(),
                Style::default().fg(Color::Yellow),
            )),
        );
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Status").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn draw_preview(f: &mut Frame, area: Rect, app: &App) {
    let descriptor = app.descriptor();
    let label = Style::default().fg(Color::DarkGray);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Signature ", label),
            Span::raw(descriptor.signature()),
        ]),
        Line::from(vec![
            Span::styled("Selector  ", label),
            Span::raw(descriptor.selector_hex()),
        ]),
        Line::from(vec![
            Span::styled("Call      ", label),
            Span::raw(app.selector().to_string()),
        ]),
        Line::from(""),
    ];
    lines.extend(descriptor.abi_json().lines().map(|line| Line::from(line.to_string())));

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Call preview").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn draw_history(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .history
        .iter()
        .map(|entry| {
            let phase = entry.state.phase();
            let phase_style = match phase {
                SubmissionPhase::Confirmed => Style::default().fg(Color::Green),
                SubmissionPhase::Failed => Style::default().fg(Color::Red),
                _ => Style::default().fg(Color::Yellow),
            };
            let hash = entry
                .state
                .transaction_id()
                .map(|hash| short_hash(&hash.to_string()))
                .unwrap_or_else(|| "--".to_string());
            ListItem::new(Line::from(vec![
                Span::styled(
                    entry.submitted_at.format("%H:%M:%S ").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(format!("{:<24} ", truncate_str(&entry.call, 24))),
                Span::styled(format!("{:<10} ", phase.label()), phase_style),
                Span::raw(hash),
            ]))
        })
        .collect();

    let title = format!("History ({})", app.history.len());
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let selected = (!app.history.is_empty()).then_some(app.selected_history);
    let mut state = ListState::default().with_selected(selected);
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled("Chain ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", app.network.id)),
        Span::styled("Phase ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", app.submission.phase().label())),
    ];
    if let Some((text, level)) = app.status_text() {
        let color = match level {
            StatusLevel::Info => Color::Green,
            StatusLevel::Warn => Color::Yellow,
            StatusLevel::Error => Color::Red,
        };
        spans.push(Span::styled(text.to_string(), Style::default().fg(color)));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}

fn action_hints(app: &App) -> Line<'static> {
    let key = Style::default().fg(Color::LightCyan);
    let text = Style::default().fg(Color::DarkGray);
    let pairs: &[(&str, &str)] = if app.input_mode == InputMode::Editing {
        &[("Esc", "done"), ("Enter", "done")]
    } else if app.is_connected() {
        &[
            ("Tab", "focus"),
            ("j/k", "function"),
            ("i", "edit"),
            ("s", "send"),
            ("d", "disconnect"),
            ("y", "copy hash"),
            ("e", "export"),
            ("?", "help"),
            ("q", "quit"),
        ]
    } else {
        &[
            ("c", "connect"),
            ("Tab", "focus"),
            ("j/k", "function"),
            ("i", "edit"),
            ("?", "help"),
            ("q", "quit"),
        ]
    };

    let mut spans = Vec::new();
    for (k, label) in pairs {
        spans.push(Span::styled(k.to_string(), key));
        spans.push(Span::styled(format!(" {}  ", label), text));
    }
    Line::from(spans)
}

fn draw_signature_popup(f: &mut Frame, area: Rect, app: &App) {
    let popup_area = centered_rect(60, 30, area);
    f.render_widget(Clear, popup_area);

    let from = app
        .account()
        .map(|account| account.to_string())
        .unwrap_or_else(|| "--".to_string());
    let lines = vec![
        Line::from(Span::styled(
            "Sign transaction?",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("From      {from}")),
        Line::from(format!("To        {}", app.contract_input.trim())),
        Line::from(format!("Call      {}", app.selector())),
        Line::from(format!("Network   {}", app.network.display())),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(Color::LightGreen)),
            Span::raw(" sign   "),
            Span::styled("n / Esc", Style::default().fg(Color::Red)),
            Span::raw(" reject"),
        ]),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title("Wallet")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, popup_area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from("Form"),
        Line::from("  Tab / S-Tab Cycle focus"),
        Line::from("  Enter / i   Edit text field"),
        Line::from("  Esc         Stop editing"),
        Line::from("  j / k       Pick function"),
        Line::from(""),
        Line::from("Wallet"),
        Line::from("  c           Connect"),
        Line::from("  d           Disconnect"),
        Line::from("  r           Refresh balance"),
        Line::from("  Enter / s   Send transaction"),
        Line::from("  y / n       Sign / reject (prompt)"),
        Line::from(""),
        Line::from("History"),
        Line::from("  [ / ]       Select entry"),
        Line::from("  y           Copy tx hash"),
        Line::from("  e           Export CSV + JSON"),
        Line::from(""),
        Line::from("  ?           Toggle help"),
        Line::from("  q           Quit"),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Help").borders(Borders::ALL))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, popup_area);
}

fn short_hash(value: &str) -> String {
    if value.len() <= 14 {
        return value.to_string();
    }
    format!("{}…{}", &value[..8], &value[value.len() - 4..])
}

fn truncate_str(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        let mut out: String = value.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn test_cursor_stays_inside_field() {
        let area = Rect::new(4, 2, 30, 3);
        assert_eq!(cursor_x(area, ""), 5);
        assert_eq!(cursor_x(area, "0xAB"), 9);
        assert_eq!(cursor_x(area, &"a".repeat(40)), 32);
        assert_eq!(cursor_x(area, &"a".repeat(70_000)), 32);
    }

    fn render(app: &App) -> String {
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_renders_disconnected_form() {
        let app = App::new(&Config::default());
        let screen = render(&app);
        assert!(screen.contains("GM ARC Faucet"));
        assert!(screen.contains("Connect Wallet"));
        assert!(screen.contains("setGreeting(string)"));
        assert!(screen.contains("Call preview"));
        assert!(!screen.contains("New greeting"));
    }

    #[test]
    fn test_greeting_field_only_for_set_greeting() {
        let mut app = App::new(&Config::default());
        app.function = FunctionKind::SetGreeting;
        let screen = render(&app);
        assert!(screen.contains("New greeting"));
        assert!(screen.contains("Set greeting"));
    }

    #[test]
    fn test_truncate_and_short_hash() {
        assert_eq!(truncate_str("abc", 5), "abc");
        assert_eq!(truncate_str("abcdef", 4), "abc…");
        assert_eq!(short_hash("0x1234"), "0x1234");
        assert_eq!(short_hash(&format!("0x{}", "ab".repeat(32))), "0xababab…abab");
    }
}
