use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_dispatch::{Component, DataResource, EventKind, EventOutcome};
use tui_dispatch_components::{SelectList, SelectListBehavior, SelectListProps};

use super::{hp_line, list_style, panel_block, render_line, type_spans, PAGE_JUMP};
use crate::action::Action;
use crate::battle::{BattlePhase, Side, MAX_HEALTH};
use crate::palette::Palette;
use crate::pokemon::{format_id, format_name};
use crate::state::AppState;

pub(super) fn handle_key(
    key: KeyEvent,
    event: &EventKind,
    state: &AppState,
    roster: &mut SelectList,
) -> EventOutcome<Action> {
    match key.code {
        KeyCode::Tab | KeyCode::BackTab => EventOutcome::action(Action::ArenaSwitchSide),
        KeyCode::PageUp => EventOutcome::action(Action::ArenaPickMove(-PAGE_JUMP)),
        KeyCode::PageDown => EventOutcome::action(Action::ArenaPickMove(PAGE_JUMP)),
        KeyCode::Enter => match state.arena.battle.phase() {
            BattlePhase::Resolved { .. } => EventOutcome::action(Action::BattleReset),
            _ => EventOutcome::action(Action::ArenaConfirmPick),
        },
        KeyCode::Char('r') => EventOutcome::action(Action::ArenaRandom(state.arena.focus)),
        KeyCode::Char('R') => EventOutcome::action(Action::ArenaRandomBoth),
        KeyCode::Char(' ') | KeyCode::Char('f') => EventOutcome::action(Action::BattleStart),
        KeyCode::Char('x') => EventOutcome::action(Action::BattleReset),
        _ => {
            let palette = Palette::for_theme(state.theme);
            let items = roster_items(state, &palette);
            let props = roster_props(&items, state, &palette);
            EventOutcome::from_actions(roster.handle_event(event, props))
        }
    }
}

pub(super) fn render(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    palette: &Palette,
    roster: &mut SelectList,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),
            Constraint::Length(1),
            Constraint::Min(4),
        ])
        .split(area);

    let fighters = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    render_fighter(frame, fighters[0], state, Side::Left, palette);
    render_fighter(frame, fighters[1], state, Side::Right, palette);

    render_banner(frame, rows[1], state, palette);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[2]);
    render_roster(frame, bottom[0], state, palette, roster);
    render_log(frame, bottom[1], state, palette);
}

fn render_fighter(frame: &mut Frame, area: Rect, state: &AppState, side: Side, palette: &Palette) {
    let arena = &state.arena;
    let focused = arena.focus == side && !arena.battle.is_fighting();
    let title = if focused {
        format!(" ▸ {} ", side.label())
    } else {
        format!(" {} ", side.label())
    };
    let bg = if arena.is_flashing(side) {
        palette.highlight_bg
    } else {
        palette.panel
    };
    let mut block = panel_block(title, bg, palette);
    if focused {
        block = block.border_style(Style::default().fg(palette.accent));
    }
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let dim = Style::default().fg(palette.text_dim);
    let mut lines = Vec::new();
    match arena.battle.fighter(side) {
        Some(fighter) => {
            let mut name = Line::from(vec![
                Span::styled(format!("{} ", format_id(fighter.id())), dim),
                Span::styled(
                    format_name(fighter.name()),
                    Style::default()
                        .fg(palette.text)
                        .add_modifier(Modifier::BOLD),
                ),
            ]);
            if fighter.is_knocked_out() {
                name.spans.push(Span::styled(
                    "  fainted",
                    Style::default().fg(palette.accent),
                ));
            }
            lines.push(name);
            if let Some(info) = arena.info(side) {
                lines.push(Line::from(type_spans(&info.types)));
            }
            lines.push(Line::from(vec![
                Span::styled("ATK ", dim),
                Span::styled(
                    fighter.attack().to_string(),
                    Style::default().fg(palette.text),
                ),
                Span::styled("  DEF ", dim),
                Span::styled(
                    fighter.defense().to_string(),
                    Style::default().fg(palette.text),
                ),
            ]));
            lines.push(hp_line(fighter.health(), MAX_HEALTH, palette));
        }
        None => lines.push(Line::from(Span::styled("No fighter yet", dim))),
    }
    if arena.is_loading(side) {
        lines.push(Line::from(Span::styled("Loading…", dim)));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_banner(frame: &mut Frame, area: Rect, state: &AppState, palette: &Palette) {
    let battle = &state.arena.battle;
    let (text, style) = match battle.phase() {
        BattlePhase::Idle if battle.is_ready() => (
            "Ready! Press Space to fight".to_string(),
            Style::default().fg(palette.accent),
        ),
        BattlePhase::Idle => (
            "Pick two fighters".to_string(),
            Style::default().fg(palette.text_dim),
        ),
        BattlePhase::Fighting => (
            format!("Turn {}", battle.turn() + 1),
            Style::default().fg(palette.text),
        ),
        BattlePhase::Resolved { .. } => {
            let name = battle
                .winner_fighter()
                .map(|fighter| format_name(fighter.name()))
                .unwrap_or_default();
            (
                format!("{name} wins! Enter or x for a rematch"),
                Style::default()
                    .fg(palette.gold)
                    .add_modifier(Modifier::BOLD),
            )
        }
    };
    frame.render_widget(
        Paragraph::new(Span::styled(text, style)).alignment(Alignment::Center),
        area,
    );
}

fn roster_items(state: &AppState, palette: &Palette) -> Vec<Line<'static>> {
    let Some(roster) = state.arena.roster.data() else {
        return Vec::new();
    };
    roster
        .iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    format!("{} ", format_id(entry.id)),
                    Style::default().fg(palette.text_dim),
                ),
                Span::raw(format_name(&entry.name)),
            ])
        })
        .collect()
}

fn roster_props<'a>(
    items: &'a [Line<'static>],
    state: &AppState,
    palette: &Palette,
) -> SelectListProps<'a, Line<'static>, Action> {
    SelectListProps {
        items,
        count: items.len(),
        selected: state.arena.pick(state.arena.focus),
        is_focused: !state.arena.battle.is_fighting(),
        style: list_style(palette.panel_alt, palette),
        behavior: SelectListBehavior {
            show_scrollbar: true,
            wrap_navigation: false,
        },
        on_select: Action::ArenaPickSelect,
        render_item: &render_line,
    }
}

fn render_roster(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    palette: &Palette,
    roster: &mut SelectList,
) {
    let arena = &state.arena;
    let block = panel_block(
        format!(" Roster · {} ", arena.focus.label()),
        palette.panel_alt,
        palette,
    );
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let message = match &arena.roster {
        DataResource::Loaded(_) => {
            let items = roster_items(state, palette);
            roster.render(frame, inner, roster_props(&items, state, palette));
            return;
        }
        DataResource::Failed(error) => Span::styled(
            format!("Roster unavailable: {error}"),
            Style::default().fg(palette.accent),
        ),
        DataResource::Loading | DataResource::Empty => {
            Span::styled("Loading roster…", Style::default().fg(palette.text_dim))
        }
    };
    frame.render_widget(Paragraph::new(Line::from(message)), inner);
}

fn render_log(frame: &mut Frame, area: Rect, state: &AppState, palette: &Palette) {
    let block = panel_block(" Battle log ", palette.panel, palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let log = state.arena.battle.log();
    let lines: Vec<Line> = if log.is_empty() {
        vec![Line::from(Span::styled(
            "No moves yet",
            Style::default().fg(palette.text_dim),
        ))]
    } else {
        log.iter()
            .enumerate()
            .map(|(index, event)| {
                let style = if index == 0 {
                    Style::default()
                        .fg(palette.text)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(palette.text_dim)
                };
                Line::from(Span::styled(event.text.clone(), style))
            })
            .collect()
    };

    frame.render_widget(Paragraph::new(lines), inner);
}
