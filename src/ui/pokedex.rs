use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{Component, EventKind, EventOutcome};
use tui_dispatch_components::{
    centered_rect, highlight_substring, BaseStyle, Modal, ModalBehavior, ModalProps, Padding,
    SelectList, SelectListBehavior, SelectListProps, TextInput, TextInputProps, TextInputStyle,
};

use super::{
    list_style, meter_line, modal_style, panel_block, render_line, type_spans, ui_render,
    PAGE_JUMP,
};
use crate::action::Action;
use crate::lookup::MIN_QUERY_LEN;
use crate::palette::{stat_color, type_color, Palette};
use crate::pokemon::{format_height, format_id, format_stat_name, format_weight, PokemonSummary};
use crate::state::AppState;

const SEARCH_PLACEHOLDER: &str = "Name, number or localized name";

pub(super) fn handle_key(
    key: KeyEvent,
    event: &EventKind,
    state: &AppState,
    list: &mut SelectList,
) -> EventOutcome<Action> {
    match key.code {
        KeyCode::PageUp => EventOutcome::action(Action::PokedexMove(-PAGE_JUMP)),
        KeyCode::PageDown => EventOutcome::action(Action::PokedexMove(PAGE_JUMP)),
        KeyCode::Enter => EventOutcome::action(Action::PokedexOpen),
        KeyCode::Char('/') => EventOutcome::action(Action::SearchOpen),
        KeyCode::Char('[') => EventOutcome::action(Action::PokedexTypePrev),
        KeyCode::Char(']') => EventOutcome::action(Action::PokedexTypeNext),
        KeyCode::Char('0') => EventOutcome::action(Action::PokedexTypeClear),
        KeyCode::Char('m') => EventOutcome::action(Action::PokedexLoadMore),
        _ => {
            let palette = Palette::for_theme(state.theme);
            let items = dex_items(state, &palette);
            let props = dex_props(&items, state, &palette);
            EventOutcome::from_actions(list.handle_event(event, props))
        }
    }
}

pub(super) fn render(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    palette: &Palette,
    list: &mut SelectList,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    render_list(frame, columns[0], state, palette, list);
    render_preview(frame, columns[1], state, palette);
}

fn dex_items(state: &AppState, palette: &Palette) -> Vec<Line<'static>> {
    state
        .pokedex
        .visible()
        .into_iter()
        .map(|entry| dex_row(entry, palette))
        .collect()
}

fn dex_props<'a>(
    items: &'a [Line<'static>],
    state: &AppState,
    palette: &Palette,
) -> SelectListProps<'a, Line<'static>, Action> {
    SelectListProps {
        items,
        count: items.len(),
        selected: state.pokedex.selected,
        is_focused: !state.pokedex.search.active,
        style: list_style(palette.panel, palette),
        behavior: SelectListBehavior {
            show_scrollbar: true,
            wrap_navigation: false,
        },
        on_select: Action::PokedexSelect,
        render_item: &render_line,
    }
}

fn dex_row(entry: &PokemonSummary, palette: &Palette) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            format!("{} ", format_id(entry.id)),
            Style::default().fg(palette.text_dim),
        ),
        Span::raw(format!("{:<14}", entry.display_name())),
    ];
    for type_name in &entry.types {
        spans.push(Span::styled("●", Style::default().fg(type_color(type_name))));
    }
    Line::from(spans)
}

fn render_list(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    palette: &Palette,
    list: &mut SelectList,
) {
    let pokedex = &state.pokedex;
    let title = format!(
        " Pokédex · {} ",
        pokedex.type_filter.as_deref().unwrap_or("all types")
    );
    let block = panel_block(title, palette.panel, palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if pokedex.loading && pokedex.entries.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Loading Pokédex…",
                Style::default().fg(palette.text_dim),
            )),
            inner,
        );
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let items = dex_items(state, palette);
    if items.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No Pokémon of this type loaded yet",
                Style::default().fg(palette.text_dim),
            )),
            rows[0],
        );
    } else {
        list.render(frame, rows[0], dex_props(&items, state, palette));
    }

    let dim = Style::default().fg(palette.text_dim);
    let status = if let Some(error) = &pokedex.error {
        Span::styled(
            format!("Error: {error}"),
            Style::default().fg(palette.accent),
        )
    } else if pokedex.loading_more {
        Span::styled("Loading more…", dim)
    } else if pokedex.can_load_more() {
        Span::styled(
            format!("{} loaded · m for more", pokedex.entries.len()),
            dim,
        )
    } else {
        Span::styled(format!("{} loaded", pokedex.entries.len()), dim)
    };
    frame.render_widget(Paragraph::new(Line::from(status)), rows[1]);
}

fn render_preview(frame: &mut Frame, area: Rect, state: &AppState, palette: &Palette) {
    let block = panel_block(" Preview ", palette.panel_alt, palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(pokemon) = state.pokedex.selected_entry() else {
        return;
    };

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
        Line::from(Span::styled(
            format!(
                "{} · {}",
                format_height(pokemon.height),
                format_weight(pokemon.weight)
            ),
            Style::default().fg(palette.text_dim),
        )),
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
    lines.push(Line::from(Span::styled(
        "Enter for details",
        Style::default().fg(palette.text_dim),
    )));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

/// Query input over the hit list, drawn as a modal above the Pokédex.
pub(super) struct SearchOverlay {
    input: TextInput,
    list: SelectList,
    modal: Modal,
    was_open: bool,
}

impl SearchOverlay {
    pub(super) fn new() -> Self {
        Self {
            input: TextInput::new(),
            list: SelectList::new(),
            modal: Modal::new(),
            was_open: false,
        }
    }

    /// Fresh cursor and scroll each time the overlay opens.
    pub(super) fn set_open(&mut self, is_open: bool) {
        if is_open && !self.was_open {
            self.input = TextInput::new();
            self.list = SelectList::new();
        }
        self.was_open = is_open;
    }

    pub(super) fn handle_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> EventOutcome<Action> {
        let EventKind::Key(key) = event else {
            return EventOutcome::ignored();
        };
        let search = &state.pokedex.search;

        match key.code {
            KeyCode::Esc => EventOutcome::action(Action::SearchClose),
            KeyCode::Enter if search.hits.is_empty() => EventOutcome::ignored(),
            KeyCode::Enter => EventOutcome::action(Action::SearchConfirm),
            KeyCode::Up | KeyCode::Down => {
                if search.hits.is_empty() {
                    return EventOutcome::ignored();
                }
                let palette = Palette::for_theme(state.theme);
                let items = hit_items(state, &palette);
                let props = hit_props(&items, state, &palette);
                EventOutcome::from_actions(self.list.handle_event(event, props))
            }
            _ => {
                let palette = Palette::for_theme(state.theme);
                let props = input_props(state, &palette);
                EventOutcome::from_actions(self.input.handle_event(event, props))
            }
        }
    }

    pub(super) fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        body: Rect,
        state: &AppState,
        palette: &Palette,
    ) {
        if body.width < 24 || body.height < 8 {
            return;
        }

        let SearchOverlay {
            input, list, modal, ..
        } = self;
        let modal_area = centered_rect(60, 16, body);
        let mut render_content = |frame: &mut Frame, content: Rect| {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Min(1),
                ])
                .split(content);

            frame.render_widget(
                Paragraph::new(Span::styled(
                    "Search Pokémon",
                    Style::default()
                        .fg(palette.accent)
                        .add_modifier(Modifier::BOLD),
                )),
                rows[0],
            );
            input.render(frame, rows[1], input_props(state, palette));

            let search = &state.pokedex.search;
            let hint = if search.query.trim().chars().count() < MIN_QUERY_LEN {
                format!("Type at least {MIN_QUERY_LEN} letters")
            } else if search.hits.is_empty() {
                "No match".to_string()
            } else {
                format!("{} hits", search.hits.len())
            };
            frame.render_widget(
                Paragraph::new(Span::styled(hint, Style::default().fg(palette.text_dim))),
                rows[2],
            );

            let items = hit_items(state, palette);
            if !items.is_empty() {
                list.render(frame, rows[3], hit_props(&items, state, palette));
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
                on_close: || Action::SearchClose,
                render_content: &mut render_content,
            },
        );
    }
}

fn input_props<'a>(state: &'a AppState, palette: &Palette) -> TextInputProps<'a, Action> {
    TextInputProps {
        value: &state.pokedex.search.query,
        placeholder: SEARCH_PLACEHOLDER,
        is_focused: true,
        style: TextInputStyle {
            base: BaseStyle {
                border: None,
                padding: Padding::xy(1, 0),
                bg: Some(palette.panel_alt),
                fg: Some(palette.text),
            },
            placeholder_style: Some(Style::default().fg(palette.text_dim)),
            cursor_style: None,
        },
        on_change: Action::SearchQueryChange,
        on_submit: |_| Action::SearchConfirm,
        on_cursor_move: Some(ui_render),
    }
}

fn hit_items(state: &AppState, palette: &Palette) -> Vec<Line<'static>> {
    let search = &state.pokedex.search;
    let query = search.query.trim();
    let base = Style::default().fg(palette.text);
    let dim = Style::default().fg(palette.text_dim);
    let highlight = Style::default()
        .fg(palette.gold)
        .add_modifier(Modifier::BOLD);

    search
        .hits
        .iter()
        .map(|hit| {
            let mut line = Line::from(Span::styled(format!("{} ", format_id(hit.id)), dim));
            line.spans
                .extend(highlight_substring(&hit.name, query, base, highlight).spans);
            if let Some(localized) = &hit.localized {
                line.spans.push(Span::raw("  "));
                line.spans
                    .extend(highlight_substring(localized, query, dim, highlight).spans);
            }
            line
        })
        .collect()
}

fn hit_props<'a>(
    items: &'a [Line<'static>],
    state: &AppState,
    palette: &Palette,
) -> SelectListProps<'a, Line<'static>, Action> {
    SelectListProps {
        items,
        count: items.len(),
        selected: state.pokedex.search.selected,
        is_focused: true,
        style: list_style(palette.panel, palette),
        behavior: SelectListBehavior {
            show_scrollbar: false,
            wrap_navigation: true,
        },
        on_select: Action::SearchSelect,
        render_item: &render_line,
    }
}
