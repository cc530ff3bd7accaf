use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{block::Title, Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{EventKind, EventOutcome, RenderContext};

use crate::action::Action;
use crate::battle::{Outcome, MAX_ROSTER_SIZE};
use crate::creature::Creature;
use crate::roster::Roster;
use crate::state::{AppState, Screen, SetupField};

const BG_BASE: Color = Color::Rgb(24, 36, 26);
const BG_PANEL: Color = Color::Rgb(34, 58, 38);
const BG_PANEL_ALT: Color = Color::Rgb(28, 48, 32);
const TEXT_MAIN: Color = Color::Rgb(228, 236, 214);
const TEXT_DIM: Color = Color::Rgb(172, 186, 160);
const ACCENT_GREEN: Color = Color::Rgb(104, 204, 120);
const ACCENT_GOLD: Color = Color::Rgb(222, 196, 120);
const ACCENT_RED: Color = Color::Rgb(220, 96, 96);
const BORDER_ACCENT: Color = Color::Rgb(74, 98, 82);

pub fn render(frame: &mut Frame, area: Rect, state: &AppState, _ctx: RenderContext) {
    frame.render_widget(Block::default().style(Style::default().bg(BG_BASE)), area);
    match state.screen {
        Screen::Loading => render_notice(frame, area, "Looking for a saved match..."),
        Screen::Setup => render_setup(frame, area, state),
        Screen::Acquiring => render_notice(frame, area, "Gathering creatures from the catalog..."),
        Screen::Battle => render_battle(frame, area, state),
        Screen::Finished => render_finished(frame, area, state),
    }
}

pub fn handle_event(event: &EventKind, state: &AppState) -> EventOutcome<Action> {
    match event {
        EventKind::Resize(width, height) => {
            EventOutcome::action(Action::UiTerminalResize(*width, *height)).with_render()
        }
        EventKind::Key(key) => handle_key(*key, state),
        _ => EventOutcome::ignored(),
    }
}

fn handle_key(key: KeyEvent, state: &AppState) -> EventOutcome<Action> {
    if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
        return EventOutcome::action(Action::Quit);
    }
    match state.screen {
        Screen::Setup => handle_setup_key(key, state),
        Screen::Battle => handle_battle_key(key, state),
        Screen::Finished => match key.code {
            KeyCode::Enter | KeyCode::Char('z') | KeyCode::Char('r') => {
                EventOutcome::action(Action::MatchRestart)
            }
            _ => EventOutcome::ignored(),
        },
        Screen::Loading | Screen::Acquiring => EventOutcome::ignored(),
    }
}

fn handle_setup_key(key: KeyEvent, state: &AppState) -> EventOutcome<Action> {
    match key.code {
        KeyCode::Up | KeyCode::Char('w') => EventOutcome::action(Action::SetupFieldChange(-1)),
        KeyCode::Down | KeyCode::Char('s') => EventOutcome::action(Action::SetupFieldChange(1)),
        KeyCode::Left | KeyCode::Char('a') => EventOutcome::action(Action::SetupCountChange(-1)),
        KeyCode::Right | KeyCode::Char('d') => EventOutcome::action(Action::SetupCountChange(1)),
        KeyCode::Enter | KeyCode::Char('z') => match state.setup.field {
            SetupField::Start => EventOutcome::action(Action::MatchStart(state.setup.sizes)),
            SetupField::Player | SetupField::Cpu => {
                EventOutcome::action(Action::SetupFieldChange(1))
            }
        },
        _ => EventOutcome::ignored(),
    }
}

fn handle_battle_key(key: KeyEvent, state: &AppState) -> EventOutcome<Action> {
    let slots = state.move_slots().len();
    if slots == 0 {
        return EventOutcome::ignored();
    }
    // Moves sit in a two-column grid.
    let current = state.move_index.min(slots - 1);
    let target = match key.code {
        KeyCode::Left | KeyCode::Char('a') => current.checked_sub(1),
        KeyCode::Right | KeyCode::Char('d') => Some(current + 1),
        KeyCode::Up | KeyCode::Char('w') => current.checked_sub(2),
        KeyCode::Down | KeyCode::Char('s') => Some(current + 2),
        KeyCode::Enter | KeyCode::Char('z') => {
            return match state.selected_move() {
                Some(name) => EventOutcome::action(Action::MoveUse(name)),
                None => EventOutcome::ignored(),
            };
        }
        KeyCode::Char('r') => return EventOutcome::action(Action::MatchRestart),
        _ => return EventOutcome::ignored(),
    };
    match target {
        Some(index) if index < slots => EventOutcome::action(Action::MoveSelect(index)),
        _ => EventOutcome::ignored(),
    }
}

fn render_notice(frame: &mut Frame, area: Rect, text: &str) {
    let block = panel_block(" POKEDUEL ", BG_PANEL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let content = centered(inner, 44, 3);
    let paragraph = Paragraph::new(Text::from(vec![
        Line::from(""),
        Line::from(Span::styled(text.to_string(), Style::default().fg(TEXT_DIM))),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(paragraph, content);
}

fn render_setup(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block(" POKEDUEL ", BG_PANEL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let content = centered(inner, 40, 12);
    let setup = &state.setup;
    let mut lines = vec![
        Line::from(Span::styled(
            "POKEDUEL",
            Style::default()
                .fg(ACCENT_GREEN)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Pick the size of each roster",
            Style::default().fg(TEXT_DIM),
        )),
        Line::from(""),
        count_line("Your creatures", setup.sizes.player, setup.field == SetupField::Player),
        count_line("CPU creatures", setup.sizes.cpu, setup.field == SetupField::Cpu),
        Line::from(""),
        menu_line("START BATTLE", setup.field == SetupField::Start),
        Line::from(""),
    ];
    if let Some(message) = state.message.as_ref() {
        lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(ACCENT_RED),
        )));
    }
    lines.push(Line::from(Span::styled(
        "W/S: Move  A/D: Change  Enter: Next/Start  Q: Quit",
        Style::default().fg(TEXT_DIM),
    )));

    let paragraph = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, content);
}

fn render_battle(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(battle) = state.battle.as_ref() else {
        return;
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(10)])
        .split(area);
    let panels = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout[0]);

    render_side(frame, panels[0], "CPU", &battle.cpu);
    render_side(frame, panels[1], "YOU", &battle.player);
    render_commands(frame, layout[1], state);
}

fn render_side(frame: &mut Frame, area: Rect, owner: &str, roster: &Roster) {
    let title = match roster.current() {
        Some(creature) => format!(" {owner}: {} ", creature.display_name().to_ascii_uppercase()),
        None => format!(" {owner} "),
    };
    let block = panel_block(title, BG_PANEL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    if let Some(creature) = roster.current() {
        lines.push(hp_line(creature));
        lines.push(Line::from(Span::styled(
            creature
                .sprite_url
                .clone()
                .unwrap_or_else(|| "[no sprite]".to_string()),
            Style::default().fg(TEXT_DIM),
        )));
    }
    lines.push(roster_line(roster));
    frame.render_widget(
        Paragraph::new(Text::from(lines)).style(Style::default().fg(TEXT_MAIN)),
        inner,
    );
}

fn render_commands(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block(" COMMAND ", BG_PANEL_ALT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(20)])
        .split(inner);

    let slots = state.move_slots();
    let mut move_lines: Vec<Line> = slots
        .chunks(2)
        .enumerate()
        .map(|(row, pair)| {
            let spans = pair
                .iter()
                .enumerate()
                .flat_map(|(col, name)| {
                    let index = row * 2 + col;
                    let label = format!("{:<16}", crate::creature::format_name(name));
                    let style = if index == state.move_index {
                        Style::default()
                            .fg(ACCENT_GREEN)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(TEXT_MAIN)
                    };
                    let marker = if index == state.move_index { ">" } else { " " };
                    vec![Span::styled(marker, style), Span::styled(label, style)]
                })
                .collect::<Vec<_>>();
            Line::from(spans)
        })
        .collect();
    move_lines.push(Line::from(""));
    move_lines.push(Line::from(Span::styled(
        "Enter: Attack  R: Restart  Q: Quit",
        Style::default().fg(TEXT_DIM),
    )));
    frame.render_widget(Paragraph::new(Text::from(move_lines)), layout[0]);

    let mut log_lines: Vec<Line> = state.log.iter().map(|l| Line::from(l.clone())).collect();
    if let Some(message) = state.message.as_ref() {
        log_lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(ACCENT_RED),
        )));
    }
    frame.render_widget(
        Paragraph::new(Text::from(log_lines))
            .style(Style::default().fg(TEXT_MAIN))
            .wrap(Wrap { trim: true }),
        layout[1],
    );
}

fn render_finished(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block(" POKEDUEL ", BG_PANEL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (headline, color) = match state.outcome() {
        Some(Outcome::PlayerWon) => ("You Win!", ACCENT_GREEN),
        _ => ("You Lose!", ACCENT_RED),
    };
    let content = centered(inner, 48, 14);
    let mut lines = vec![
        Line::from(Span::styled(
            headline,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    lines.extend(state.log.iter().map(|l| {
        Line::from(Span::styled(l.clone(), Style::default().fg(TEXT_DIM)))
    }));
    lines.push(Line::from(""));
    lines.push(menu_line("REPLAY", true));
    lines.push(Line::from(Span::styled(
        "Enter: New match  Q: Quit",
        Style::default().fg(TEXT_DIM),
    )));
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        content,
    );
}

fn hp_line(creature: &Creature) -> Line<'static> {
    let width: usize = 20;
    let max = creature.max_hit_points.max(1);
    let ratio = creature.hit_points as f32 / max as f32;
    let filled = ((ratio * width as f32).round() as usize).min(width);
    let empty = width.saturating_sub(filled);
    let color = if ratio > 0.5 {
        ACCENT_GREEN
    } else if ratio > 0.2 {
        ACCENT_GOLD
    } else {
        ACCENT_RED
    };
    Line::from(vec![
        Span::raw("HP "),
        Span::styled(
            "█".repeat(filled),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled("░".repeat(empty), Style::default().fg(TEXT_DIM)),
        Span::raw(format!(" {}/{}", creature.hit_points, creature.max_hit_points)),
    ])
}

fn roster_line(roster: &Roster) -> Line<'static> {
    let pips = roster
        .members()
        .iter()
        .enumerate()
        .map(|(index, member)| {
            let (symbol, color) = if member.is_fainted() {
                ("x", ACCENT_RED)
            } else if index == roster.active_index() {
                ("●", ACCENT_GREEN)
            } else {
                ("o", TEXT_MAIN)
            };
            Span::styled(format!("{symbol} "), Style::default().fg(color))
        })
        .collect::<Vec<_>>();
    let mut spans = vec![Span::styled("Team ", Style::default().fg(TEXT_DIM))];
    spans.extend(pips);
    spans.push(Span::styled(
        format!("{}/{} left", roster.remaining(), roster.len()),
        Style::default().fg(TEXT_DIM),
    ));
    Line::from(spans)
}

fn count_line(label: &str, count: usize, selected: bool) -> Line<'static> {
    let style = if selected {
        Style::default()
            .fg(ACCENT_GREEN)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_MAIN)
    };
    let left = if selected && count > 1 { "<" } else { " " };
    let right = if selected && count < MAX_ROSTER_SIZE { ">" } else { " " };
    Line::from(Span::styled(
        format!("{label:<16}{left} {count} {right}"),
        style,
    ))
}

fn menu_line(label: &str, selected: bool) -> Line<'static> {
    if selected {
        Line::from(Span::styled(
            format!("> {label} <"),
            Style::default()
                .fg(ACCENT_GREEN)
                .add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled(
            format!("  {label}  "),
            Style::default().fg(TEXT_MAIN),
        ))
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

fn panel_block<'a, T>(title: T, bg: Color) -> Block<'a>
where
    T: Into<Title<'a>>,
{
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .style(Style::default().bg(bg).fg(TEXT_MAIN))
        .border_style(Style::default().fg(BORDER_ACCENT))
}
