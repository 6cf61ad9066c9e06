use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{Component, DataResource, EventKind, EventOutcome};
use tui_dispatch_components::{SelectList, SelectListBehavior, SelectListProps};

use super::{list_style, meter_line, panel_block, render_line, type_spans};
use crate::action::Action;
use crate::battle::Side;
use crate::palette::{stat_color, Palette};
use crate::pokemon::{format_id, format_stat_name};
use crate::state::{AppState, Screen, HOME_ITEMS};

pub(super) fn handle_key(
    key: KeyEvent,
    event: &EventKind,
    state: &AppState,
    menu: &mut SelectList,
) -> EventOutcome<Action> {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => {
            EventOutcome::action(Action::HomeSelect(state.home.selected.saturating_sub(1)))
        }
        KeyCode::Right | KeyCode::Char('l') => {
            EventOutcome::action(Action::HomeSelect(state.home.selected + 1))
        }
        KeyCode::Enter => EventOutcome::action(Action::HomeConfirm),
        KeyCode::Char('1') => EventOutcome::action(Action::NavigateTo(Screen::Pokedex)),
        KeyCode::Char('2') => EventOutcome::action(Action::NavigateTo(Screen::Arena)),
        _ => {
            let palette = Palette::for_theme(state.theme);
            let items = menu_items(&palette);
            let props = menu_props(&items, state, &palette);
            EventOutcome::from_actions(menu.handle_event(event, props))
        }
    }
}

fn menu_items(palette: &Palette) -> Vec<Line<'static>> {
    HOME_ITEMS
        .iter()
        .map(|label| {
            Line::from(Span::styled(
                format!("  {label}  "),
                Style::default().fg(palette.text),
            ))
            .alignment(Alignment::Center)
        })
        .collect()
}

fn menu_props<'a>(
    items: &'a [Line<'static>],
    state: &AppState,
    palette: &Palette,
) -> SelectListProps<'a, Line<'static>, Action> {
    SelectListProps {
        items,
        count: items.len(),
        selected: state.home.selected,
        is_focused: true,
        style: list_style(palette.panel_alt, palette),
        behavior: SelectListBehavior {
            show_scrollbar: false,
            wrap_navigation: true,
        },
        on_select: Action::HomeSelect,
        render_item: &render_line,
    }
}

pub(super) fn render(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    palette: &Palette,
    menu: &mut SelectList,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(30),
            Constraint::Percentage(35),
        ])
        .split(area);

    render_showcase(frame, columns[0], state, Side::Left, palette);
    render_menu(frame, columns[1], state, palette, menu);
    render_showcase(frame, columns[2], state, Side::Right, palette);
}

fn render_menu(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    palette: &Palette,
    menu: &mut SelectList,
) {
    let block = panel_block(" Welcome ", palette.panel_alt, palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(HOME_ITEMS.len() as u16),
            Constraint::Min(1),
        ])
        .split(inner);

    let intro = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Gotta browse 'em all",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Explore the Pokédex or send two Pokémon into the arena.",
            Style::default().fg(palette.text_dim),
        )),
    ];
    frame.render_widget(
        Paragraph::new(intro)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        rows[0],
    );

    let items = menu_items(palette);
    menu.render(frame, rows[1], menu_props(&items, state, palette));

    frame.render_widget(
        Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                lookup_status(state),
                Style::default().fg(palette.text_dim),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true }),
        rows[2],
    );
}

fn lookup_status(state: &AppState) -> String {
    let models = match &state.models {
        DataResource::Loaded(catalog) => format!("{} 3D models", catalog.len()),
        DataResource::Loading => "3D models loading…".to_string(),
        DataResource::Failed(_) => "3D models unavailable".to_string(),
        DataResource::Empty => String::new(),
    };
    let names = match &state.names {
        DataResource::Loaded(index) => format!("{} {} names", index.len(), index.lang()),
        DataResource::Loading => "names loading…".to_string(),
        DataResource::Failed(_) => "names unavailable".to_string(),
        DataResource::Empty => String::new(),
    };
    [models, names]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" · ")
}

fn render_showcase(frame: &mut Frame, area: Rect, state: &AppState, side: Side, palette: &Palette) {
    let block = panel_block(" Showcase ", palette.panel, palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = match state.home.showcase(side) {
        DataResource::Loaded(pokemon) => {
            let mut lines = vec![
                Line::from(vec![
                    Span::styled(
                        format!("{} ", format_id(pokemon.id)),
                        Style::default().fg(palette.text_dim),
                    ),
                    Span::styled(
                        pokemon.display_name(),
                        Style::default()
                            .fg(palette.text)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(type_spans(&pokemon.types)),
                Line::from(""),
            ];
            for stat in &pokemon.stats {
                lines.push(meter_line(
                    &format_stat_name(&stat.name),
                    stat.value,
                    255,
                    stat_color(stat.value),
                    palette,
                ));
            }
            lines.push(Line::from(""));
            let model = match &state.models {
                DataResource::Loaded(_) => match state.model_url(pokemon.id) {
                    Some(_) => "3D model available",
                    None => "no 3D model",
                },
                DataResource::Loading => "checking 3D models…",
                _ => "3D models unavailable",
            };
            lines.push(Line::from(Span::styled(
                model,
                Style::default().fg(palette.text_dim),
            )));
            lines
        }
        DataResource::Failed(error) => vec![Line::from(Span::styled(
            format!("Could not load: {error}"),
            Style::default().fg(palette.accent),
        ))],
        DataResource::Loading | DataResource::Empty => vec![Line::from(Span::styled(
            "Loading…",
            Style::default().fg(palette.text_dim),
        ))],
    };

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
