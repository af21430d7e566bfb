use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

pub mod layout;

use crate::app::{App, Focus, InputMode, LoginField, Screen, StatusLevel};
use crate::infrastructure::ethereum::same_address;
use crate::state::TxStatus;

pub fn draw(f: &mut Frame, app: &App) {
    let areas = layout::areas(f.size());

    draw_header(f, areas.header, app);
    match app.screen {
        Screen::Login => draw_login(f, areas.main, app),
        Screen::Wallet => {
            draw_wallet(f, areas.content, app);
            draw_transactions(f, areas.transactions, app);
        }
        Screen::Watchlist => {
            draw_watchlist(f, areas.content, app);
            draw_transactions(f, areas.transactions, app);
        }
        Screen::Details => {
            draw_details(f, areas.content, app);
            draw_transactions(f, areas.transactions, app);
        }
    }
    draw_error_line(f, areas.error_line, app);
    draw_status_line(f, areas.status_line, app);
    draw_command_line(f, areas.command_line, app);

    if app.help_open {
        draw_help_popup(f, areas.size, app);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let node = if app.state.session.is_logged_in() {
        app.state.session.node_url().to_string()
    } else {
        "--".to_string()
    };
    let title = Line::from(vec![
        Span::styled(
            "tokenwatch",
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Node", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(" {} ", node)),
        Span::styled("Screen", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(" {}", app.screen.title())),
    ]);
    let left = Paragraph::new(title)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    let primary = app
        .primary_account
        .as_deref()
        .map(short_addr)
        .unwrap_or_else(|| "none".to_string());
    let right_line = Line::from(vec![
        Span::styled("Primary ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", primary)),
        Span::styled("Events ", Style::default().fg(Color::DarkGray)),
        Span::raw(app.state.chain_events.value().to_string()),
    ]);
    let right = Paragraph::new(right_line)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    f.render_widget(left, chunks[0]);
    f.render_widget(right, chunks[1]);
}

fn draw_login(f: &mut Frame, area: Rect, app: &App) {
    let form_area = centered_rect(60, 60, area);
    let form = &app.login;

    let field = |label: &'static str, value: String, field: LoginField| {
        let style = if form.focus == field {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::styled(format!("{label:<10}"), Style::default().fg(Color::DarkGray)),
            Span::styled(value, style),
        ])
    };

    let mut lines = vec![
        Line::from("Unlock your wallet"),
        Line::from(""),
        field("Node URL", form.node_url.clone(), LoginField::NodeUrl),
        field("Password", "*".repeat(form.secret.chars().count()), LoginField::Secret),
        field(
            "Reset",
            (if form.reset { "[x] new empty wallet" } else { "[ ] keep wallet" }).to_string(),
            LoginField::Reset,
        ),
        Line::from(""),
        Line::from(Span::styled(
            "Tab next field  Space toggle reset  Enter log in",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    if form.reset {
        lines.push(Line::from(Span::styled(
            "Reset deletes every stored account",
            Style::default().fg(Color::LightYellow),
        )));
    }
    if let Some(error) = form.error.as_deref() {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::LightRed),
        )));
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Login")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, form_area);
}

fn draw_wallet(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .accounts
        .iter()
        .map(|account| {
            let is_primary = app
                .primary_account
                .as_deref()
                .is_some_and(|primary| same_address(primary, account));
            let mut spans = vec![Span::raw(account.clone())];
            if is_primary {
                spans.push(Span::styled(
                    "  primary",
                    Style::default().fg(Color::LightGreen),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = format!("Accounts ({})", app.accounts.len());
    render_list(
        f,
        area,
        items,
        title,
        app.focus == Focus::List,
        app.selected_account,
        "No accounts. Press i to import a private key.",
    );
}

fn draw_watchlist(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .state
        .watchlist
        .tokens()
        .iter()
        .map(|token| {
            let owner = if token.owner.is_empty() {
                "--".to_string()
            } else {
                short_addr(&token.owner)
            };
            let owned = app
                .primary_account
                .as_deref()
                .is_some_and(|primary| same_address(primary, &token.owner));
            let owner_style = if owned {
                Style::default().fg(Color::LightGreen)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(vec![
                Span::styled(short_addr(&token.contract_address), Style::default().fg(Color::LightCyan)),
                Span::raw(format!("  #{:<8} ", truncate_str(&token.token_id, 8))),
                Span::styled("owner ", Style::default().fg(Color::DarkGray)),
                Span::styled(owner, owner_style),
            ]))
        })
        .collect();

    let title = format!("Watchlist ({})", app.state.watchlist.len());
    render_list(
        f,
        area,
        items,
        title,
        app.focus == Focus::List,
        app.selected_token,
        "Nothing watched yet. Press a to add a token.",
    );
}

fn draw_details(f: &mut Frame, area: Rect, app: &App) {
    let Some(details) = app.details.as_ref() else {
        let paragraph = Paragraph::new("No token selected")
            .block(Block::default().borders(Borders::ALL).title("Token"));
        f.render_widget(paragraph, area);
        return;
    };

    let row = |label: &'static str, value: &str| {
        Line::from(vec![
            Span::styled(format!("{label:<14}"), Style::default().fg(Color::DarkGray)),
            Span::raw(if value.is_empty() { "--".to_string() } else { value.to_string() }),
        ])
    };

    let mut lines = vec![
        row("Contract", &details.key.contract),
        row("Token ID", &details.key.token_id),
        row("Name", &details.name),
        row("Description", &details.description),
        row("Image URL", &details.image),
        row("Current owner", &details.owner),
        Line::from(""),
        row("Send to", &details.to_address),
    ];
    match app.sell_blocker() {
        Some(blocker) => lines.push(Line::from(Span::styled(
            blocker.reason(),
            Style::default().fg(Color::LightYellow),
        ))),
        None => lines.push(Line::from(Span::styled(
            "Press s to sell",
            Style::default().fg(Color::LightGreen),
        ))),
    }

    let border_style = if app.focus == Focus::List {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Token {}", details.key))
                .border_style(border_style),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn draw_transactions(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .state
        .transactions
        .items()
        .iter()
        .map(|tx| {
            let color = match tx.status {
                TxStatus::Pending => Color::LightYellow,
                TxStatus::Mined => Color::LightGreen,
                TxStatus::Error => Color::LightRed,
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<8}", tx.status.as_str()), Style::default().fg(color)),
                Span::raw(format!("{} ", short_hash(&tx.hash, 18))),
                Span::styled(
                    tx.submitted_at.format("%H:%M:%S ").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(tx.label.clone()),
            ]))
        })
        .collect();

    let title = format!("Transactions ({})", app.state.transactions.len());
    render_list(
        f,
        area,
        items,
        title,
        app.focus == Focus::Transactions,
        app.selected_tx,
        "No transactions this session",
    );
}

fn render_list(
    f: &mut Frame,
    area: Rect,
    items: Vec<ListItem>,
    title: String,
    focused: bool,
    selected: usize,
    empty: &'static str,
) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style);

    if items.is_empty() {
        let paragraph = Paragraph::new(Span::styled(empty, Style::default().fg(Color::DarkGray)))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let highlight_style = if focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style)
        .highlight_symbol(">> ");

    let mut state = ListState::default();
    state.select(Some(selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_error_line(f: &mut Frame, area: Rect, app: &App) {
    if app.state.error.is_empty() {
        return;
    }
    let line = Line::from(vec![
        Span::styled(
            "error: ",
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.state.error.current(), Style::default().fg(Color::LightRed)),
        Span::styled("  (Esc to dismiss)", Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let pending = app
        .state
        .transactions
        .items()
        .iter()
        .filter(|tx| tx.status == TxStatus::Pending)
        .count();
    let spans = vec![
        Span::styled("Accounts ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", app.accounts.len())),
        Span::styled("Watched ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", app.state.watchlist.len())),
        Span::styled("Pending ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", pending)),
        Span::styled("Focus ", Style::default().fg(Color::DarkGray)),
        Span::raw(match app.focus {
            Focus::List => "list",
            Focus::Transactions => "transactions",
        }),
    ];
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn command_hint(input: &str) -> Option<&'static str> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    let commands = [
        ("wallet", "Show wallet accounts"),
        ("watchlist", "Show watched tokens"),
        ("details", "details <contract> <tokenID>"),
        ("add", "add <contract> <tokenID>"),
        ("remove", "remove <contract> <tokenID>"),
        ("import", "import <privateKey>"),
        ("primary", "primary <address>"),
        ("send", "send <toAddress>"),
        ("clear", "Dismiss the error"),
        ("help", "Show key bindings"),
        ("quit", "Exit"),
    ];

    for (cmd, desc) in commands {
        if cmd.starts_with(&input) || input.starts_with(cmd) {
            return Some(desc);
        }
    }
    None
}

fn draw_command_line(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.input_mode {
        InputMode::Command => {
            let hint = command_hint(&app.command.input);
            let hint_text = hint.unwrap_or("wallet | watchlist | add | import | send | help");
            Line::from(vec![
                Span::styled(": ", Style::default().fg(Color::Yellow)),
                Span::raw(app.command.input.clone()),
                Span::styled(
                    format!("  {}", hint_text),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
        InputMode::Prompt(kind) => {
            let shown = if kind.is_masked() {
                "*".repeat(app.command.input.chars().count())
            } else {
                app.command.input.clone()
            };
            let context = app
                .prompt_context
                .as_deref()
                .filter(|ctx| !ctx.is_empty())
                .map(|ctx| format!("{}, ", short_addr(ctx)))
                .unwrap_or_default();
            Line::from(vec![
                Span::styled(format!("> {} ", kind.label()), Style::default().fg(Color::LightCyan)),
                Span::raw(shown),
                Span::styled(
                    format!("  ({context}Enter=ok Esc=cancel)"),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
        InputMode::Normal => {
            if let Some((text, level)) = app.status_text() {
                let color = match level {
                    StatusLevel::Info => Color::LightGreen,
                    StatusLevel::Warn => Color::LightYellow,
                    StatusLevel::Error => Color::LightRed,
                };
                Line::from(vec![
                    Span::styled("msg: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(text.to_string(), Style::default().fg(color)),
                ])
            } else {
                action_hints(app)
            }
        }
    };

    let paragraph = Paragraph::new(content).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

fn action_hints(app: &App) -> Line<'static> {
    let hints: &[(&str, &str)] = match (app.screen, app.focus) {
        (Screen::Login, _) => &[("Enter", "log in"), ("Tab", "next field"), ("Ctrl-c", "quit")],
        (_, Focus::Transactions) => &[("d", "remove tx"), ("Tab", "back"), (":", "command")],
        (Screen::Wallet, _) => &[
            ("i", "import"),
            ("p", "set primary"),
            ("d", "remove"),
            ("2", "watchlist"),
            (":", "command"),
        ],
        (Screen::Watchlist, _) => &[
            ("a", "add"),
            ("d", "remove"),
            ("Enter", "details"),
            ("1", "wallet"),
            (":", "command"),
        ],
        (Screen::Details, _) => &[
            ("t", "to address"),
            ("s", "sell"),
            ("Esc", "back"),
            (":", "command"),
        ],
    };

    let mut spans = Vec::new();
    for (key, desc) in hints {
        spans.push(Span::styled(
            key.to_string(),
            Style::default().fg(Color::LightCyan),
        ));
        spans.push(Span::styled(
            format!(" {}  ", desc),
            Style::default().fg(Color::DarkGray),
        ));
    }
    spans.push(Span::styled("?", Style::default().fg(Color::LightCyan)));
    spans.push(Span::styled(" help", Style::default().fg(Color::DarkGray)));
    Line::from(spans)
}

fn draw_help_popup(f: &mut Frame, area: Rect, app: &App) {
    let popup_area = centered_rect(72, 70, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from("Navigation"),
        Line::from("  1 / 2 / 3  Wallet / Watchlist / Token"),
        Line::from("  Tab        Toggle list / transactions"),
        Line::from("  j / k      Move selection (vim)"),
        Line::from("  Enter      Open token / set primary"),
        Line::from("  Esc        Back / dismiss error"),
        Line::from(""),
        Line::from("Wallet"),
        Line::from("  i          Import private key"),
        Line::from("  p          Set primary account"),
        Line::from("  d          Remove account (asks y/n)"),
        Line::from(""),
        Line::from("Watchlist"),
        Line::from("  a          Add token"),
        Line::from("  d          Remove token"),
        Line::from(""),
        Line::from("Token"),
        Line::from("  t          Enter destination address"),
        Line::from("  s          Sell (transfer) to destination"),
        Line::from(""),
        Line::from("Commands (:)"),
        Line::from("  add <contract> <id>   remove <contract> <id>"),
        Line::from("  details <contract> <id>   import <key>"),
        Line::from("  primary <address>   send <address>   clear"),
        Line::from(""),
        Line::from("  ?          Toggle help"),
        Line::from("  q          Quit"),
        Line::from(""),
        Line::from(format!("Screen: {}", app.screen.title())),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Help").borders(Borders::ALL))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

fn short_addr(value: &str) -> String {
    if value.len() <= 10 {
        return value.to_string();
    }
    let start: String = value.chars().take(6).collect();
    let end: String = value
        .chars()
        .rev()
        .take(4)
        .collect::<String>()
        .chars()
        .rev()
        .collect();
    format!("{}..{}", start, end)
}

fn short_hash(value: &str, len: usize) -> String {
    if value.len() <= len {
        return value.to_string();
    }
    value.chars().take(len).collect::<String>() + "…"
}

fn truncate_str(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    value.chars().take(max).collect::<String>() + "…"
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

    #[test]
    fn test_short_addr() {
        assert_eq!(
            short_addr("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"),
            "0x5aAe..eAed"
        );
        assert_eq!(short_addr("0xabc"), "0xabc");
    }

    #[test]
    fn test_command_hint_matches_prefix_and_args() {
        assert_eq!(command_hint("wal"), Some("Show wallet accounts"));
        assert_eq!(command_hint("add 0xabc"), Some("add <contract> <tokenID>"));
        assert_eq!(command_hint("zzz"), None);
    }
}
