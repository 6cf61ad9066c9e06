use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{Component, DataResource, EventKind, EventOutcome};
use tui_dispatch_components::{
    centered_rect, Modal, ModalBehavior, ModalProps, SelectList, SelectListBehavior,
    SelectListProps,
};

use super::{list_style, meter_line, modal_style, render_line, type_spans};
use crate::action::Action;
use crate::evolution::is_displayable;
use crate::palette::{darken_hex, hex_color, stat_color, type_hex, Palette};
use crate::pokemon::{
    ability_label, format_height, format_id, format_name, format_stat_name, format_weight,
    PokemonSummary,
};
use crate::state::{AppState, DetailState};

const FOREIGN_LANGS: [&str; 4] = ["fr", "de", "es", "ja"];
const HEADER_DARKEN: u8 = 20;

pub(super) fn handle_key(
    key: KeyEvent,
    event: &EventKind,
    state: &AppState,
    evolution: &mut SelectList,
) -> EventOutcome<Action> {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => EventOutcome::action(Action::EvolutionMove(-1)),
        KeyCode::Right | KeyCode::Char('l') => EventOutcome::action(Action::EvolutionMove(1)),
        KeyCode::Enter => EventOutcome::action(Action::EvolutionOpen),
        KeyCode::Backspace => EventOutcome::action(Action::DetailClose),
        _ => {
            let Some(detail) = &state.detail else {
                return EventOutcome::ignored();
            };
            let palette = Palette::for_theme(state.theme);
            let items = stage_items(detail, &palette);
            let props = stage_props(&items, detail, &palette);
            EventOutcome::from_actions(evolution.handle_event(event, props))
        }
    }
}

pub(super) fn render(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    detail: &DetailState,
    palette: &Palette,
    modal: &mut Modal,
    evolution: &mut SelectList,
) {
    let width = area.width.saturating_sub(4).min(76);
    let height = area.height.saturating_sub(2).min(26);
    let modal_area = centered_rect(width, height, area);

    let mut render_content = |frame: &mut Frame, inner: Rect| match &detail.pokemon {
        DataResource::Loaded(pokemon) => {
            render_body(frame, inner, state, detail, pokemon, palette, evolution)
        }
        DataResource::Failed(error) => {
            render_message(frame, inner, &format!("Could not load: {error}"), palette)
        }
        DataResource::Loading | DataResource::Empty => {
            render_message(frame, inner, "Loading…", palette)
        }
    };

    modal.render(
        frame,
        area,
        ModalProps {
            is_open: true,
            is_focused: true,
            area: modal_area,
            style: modal_style(palette),
            behavior: ModalBehavior {
                close_on_esc: true,
                close_on_backdrop: false,
            },
            on_close: || Action::DetailClose,
            render_content: &mut render_content,
        },
    );
}

fn render_body(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    detail: &DetailState,
    pokemon: &PokemonSummary,
    palette: &Palette,
    evolution: &mut SelectList,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(1),
            Constraint::Length(5),
        ])
        .split(area);

    render_header(frame, rows[0], state, pokemon, palette);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);
    render_stats(frame, columns[0], pokemon, palette);
    render_profile(frame, columns[1], state, detail, pokemon, palette);

    frame.render_widget(
        Paragraph::new(Span::styled(
            "Evolution",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )),
        rows[2],
    );
    render_evolution(frame, rows[3], detail, palette, evolution);
}

/// Title bar tinted with a darker shade of the primary type.
fn render_header(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    pokemon: &PokemonSummary,
    palette: &Palette,
) {
    let bg = pokemon
        .primary_type()
        .and_then(|type_name| darken_hex(type_hex(type_name), HEADER_DARKEN))
        .map(|hex| hex_color(&hex))
        .unwrap_or(palette.header);
    let style = Style::default().fg(Color::Rgb(255, 255, 255)).bg(bg);

    let mut title = format!(" {} {}", format_id(pokemon.id), pokemon.display_name());
    if let Some(localized) = state.localized_name(pokemon.id) {
        if !localized.eq_ignore_ascii_case(&pokemon.name) {
            title.push_str(&format!(" · {localized}"));
        }
    }
    frame.render_widget(
        Paragraph::new(Span::styled(title, style.add_modifier(Modifier::BOLD))).style(style),
        area,
    );
}

fn render_message(frame: &mut Frame, area: Rect, message: &str, palette: &Palette) {
    frame.render_widget(
        Paragraph::new(Span::styled(
            message.to_string(),
            Style::default().fg(palette.text_dim),
        ))
        .wrap(Wrap { trim: true }),
        area,
    );
}

fn render_stats(frame: &mut Frame, area: Rect, pokemon: &PokemonSummary, palette: &Palette) {
    let mut lines = vec![Line::from(type_spans(&pokemon.types)), Line::from("")];
    for stat in &pokemon.stats {
        lines.push(meter_line(
            &format_stat_name(&stat.name),
            stat.value,
            255,
            stat_color(stat.value),
            palette,
        ));
    }
    let total: u32 = pokemon.stats.iter().map(|stat| u32::from(stat.value)).sum();
    lines.push(Line::from(Span::styled(
        format!("Total   {total}"),
        Style::default()
            .fg(palette.text)
            .add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_profile(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    detail: &DetailState,
    pokemon: &PokemonSummary,
    palette: &Palette,
) {
    let dim = Style::default().fg(palette.text_dim);
    let text = Style::default().fg(palette.text);
    let mut lines = Vec::new();

    match &detail.species {
        DataResource::Loaded(species) => {
            if let Some(genus) = &species.genus {
                lines.push(Line::from(Span::styled(
                    genus.clone(),
                    text.add_modifier(Modifier::ITALIC),
                )));
            }
        }
        DataResource::Loading => lines.push(Line::from(Span::styled("Loading species…", dim))),
        _ => {}
    }

    lines.push(Line::from(vec![
        Span::styled("Height  ", dim),
        Span::styled(format_height(pokemon.height), text),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Weight  ", dim),
        Span::styled(format_weight(pokemon.weight), text),
    ]));
    if let Some(experience) = pokemon.base_experience {
        lines.push(Line::from(vec![
            Span::styled("Base XP ", dim),
            Span::styled(experience.to_string(), text),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Abilities", dim)));
    for ability in &pokemon.abilities {
        lines.push(Line::from(Span::styled(
            format!("  {}", ability_label(ability)),
            text,
        )));
    }

    if let DataResource::Loaded(species) = &detail.species {
        let names: Vec<String> = FOREIGN_LANGS
            .iter()
            .filter_map(|lang| species.name_in(lang).map(|name| format!("{lang}: {name}")))
            .collect();
        if !names.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(names.join("  "), dim)));
        }
    }

    lines.push(Line::from(""));
    let model = match &state.models {
        DataResource::Loaded(_) => match state.model_url(pokemon.id) {
            Some(url) => Span::styled(format!("3D model: {url}"), text),
            None => Span::styled("No 3D model", dim),
        },
        DataResource::Loading => Span::styled("Checking 3D models…", dim),
        _ => Span::styled("3D models unavailable", dim),
    };
    lines.push(Line::from(model));

    lines.push(Line::from(vec![
        Span::styled("Artwork ", dim),
        Span::styled(pokemon.artwork(), text),
    ]));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn stage_items(detail: &DetailState, palette: &Palette) -> Vec<Line<'static>> {
    let stages = detail.stages();
    if !is_displayable(stages) {
        return Vec::new();
    }
    stages
        .iter()
        .enumerate()
        .map(|(index, stage)| {
            let arrow = if index == 0 { "  " } else { "→ " };
            let mut name = Style::default().fg(palette.text);
            if stage.id == detail.id {
                name = name.add_modifier(Modifier::BOLD);
            }
            Line::from(vec![
                Span::styled(arrow, Style::default().fg(palette.text_dim)),
                Span::styled(
                    format!("{} ", format_id(stage.id)),
                    Style::default().fg(palette.text_dim),
                ),
                Span::styled(format_name(&stage.name), name),
            ])
        })
        .collect()
}

fn stage_props<'a>(
    items: &'a [Line<'static>],
    detail: &DetailState,
    palette: &Palette,
) -> SelectListProps<'a, Line<'static>, Action> {
    SelectListProps {
        items,
        count: items.len(),
        selected: detail.evolution_selected,
        is_focused: true,
        style: list_style(palette.panel, palette),
        behavior: SelectListBehavior {
            show_scrollbar: true,
            wrap_navigation: false,
        },
        on_select: Action::EvolutionSelect,
        render_item: &render_line,
    }
}

fn render_evolution(
    frame: &mut Frame,
    area: Rect,
    detail: &DetailState,
    palette: &Palette,
    evolution: &mut SelectList,
) {
    let dim = Style::default().fg(palette.text_dim);
    let message = match &detail.evolution {
        DataResource::Loaded(stages) if is_displayable(stages) => None,
        DataResource::Loaded(_) => Some("Does not evolve".to_string()),
        DataResource::Failed(error) => Some(format!("Evolution unavailable: {error}")),
        DataResource::Loading | DataResource::Empty => {
            Some("Loading evolution chain…".to_string())
        }
    };
    if let Some(message) = message {
        frame.render_widget(
            Paragraph::new(Span::styled(message, dim)).wrap(Wrap { trim: true }),
            area,
        );
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let items = stage_items(detail, palette);
    evolution.render(frame, columns[0], stage_props(&items, detail, palette));

    if let Some(stage) = detail.stages().get(detail.evolution_selected) {
        let lines = vec![
            Line::from(Span::styled(
                format_name(&stage.name),
                Style::default()
                    .fg(palette.text)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(stage.image.clone(), dim)),
            Line::from(Span::styled("Enter to open", dim)),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), columns[1]);
    }
}
