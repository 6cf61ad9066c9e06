//! Terminal rendering and key handling.
//!
//! Lists, the search input, modals and the hint bar are stateful
//! `tui-dispatch-components` widgets owned by [`PokeArenaUi`]; the binary
//! keeps one instance for the lifetime of the app.

mod arena;
mod detail;
mod home;
mod pokedex;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{block::Title, Block, BorderType, Borders, Paragraph},
    Frame,
};
use tui_dispatch::{Component, EventKind, EventOutcome, RenderContext};
use tui_dispatch_components::{
    BaseStyle, BorderStyle, Modal, ModalStyle, Padding, SelectList, SelectListStyle,
    SelectionStyle, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps, StatusBarSection,
    StatusBarStyle,
};

use crate::action::Action;
use crate::palette::{hp_color, type_color, Palette};
use crate::state::{AppState, Screen};

pub const PAGE_JUMP: i16 = 10;
const BAR_WIDTH: usize = 20;

pub struct PokeArenaUi {
    home_menu: SelectList,
    dex_list: SelectList,
    search: pokedex::SearchOverlay,
    detail_modal: Modal,
    evolution_list: SelectList,
    roster_list: SelectList,
    status_bar: StatusBar,
}

impl Default for PokeArenaUi {
    fn default() -> Self {
        Self::new()
    }
}

impl PokeArenaUi {
    pub fn new() -> Self {
        Self {
            home_menu: SelectList::new(),
            dex_list: SelectList::new(),
            search: pokedex::SearchOverlay::new(),
            detail_modal: Modal::new(),
            evolution_list: SelectList::new(),
            roster_list: SelectList::new(),
            status_bar: StatusBar::new(),
        }
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        _ctx: RenderContext,
    ) {
        self.draw(frame, area, state);
    }

    /// Draws the whole app; split from `render` so tests need no render context.
    pub fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let palette = Palette::for_theme(state.theme);
        frame.render_widget(Block::default().style(Style::default().bg(palette.bg)), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(area);

        render_header(frame, chunks[0], state, &palette);
        match state.screen {
            Screen::Home => home::render(frame, chunks[1], state, &palette, &mut self.home_menu),
            Screen::Pokedex => {
                pokedex::render(frame, chunks[1], state, &palette, &mut self.dex_list)
            }
            Screen::Arena => {
                arena::render(frame, chunks[1], state, &palette, &mut self.roster_list)
            }
        }
        render_footer(frame, chunks[2], state, &palette, &mut self.status_bar);

        let searching = search_is_open(state);
        self.search.set_open(searching);
        if searching {
            self.search.render(frame, area, chunks[1], state, &palette);
        }

        if let Some(detail) = &state.detail {
            detail::render(
                frame,
                area,
                state,
                detail,
                &palette,
                &mut self.detail_modal,
                &mut self.evolution_list,
            );
        }
    }

    pub fn handle_event(&mut self, event: &EventKind, state: &AppState) -> EventOutcome<Action> {
        match event {
            EventKind::Resize(width, height) => {
                EventOutcome::action(Action::UiTerminalResize(*width, *height)).with_render()
            }
            EventKind::Key(key) => self.handle_key(*key, event, state),
            EventKind::Scroll { delta, .. } => {
                if *delta == 0 || state.detail.is_some() {
                    return EventOutcome::ignored();
                }
                let step = (*delta).signum() as i16;
                match state.screen {
                    Screen::Pokedex if !state.pokedex.search.active => {
                        EventOutcome::action(Action::PokedexMove(step * 3))
                    }
                    Screen::Arena => EventOutcome::action(Action::ArenaPickMove(step * 3)),
                    _ => EventOutcome::ignored(),
                }
            }
            _ => EventOutcome::ignored(),
        }
    }

    fn handle_key(
        &mut self,
        key: KeyEvent,
        event: &EventKind,
        state: &AppState,
    ) -> EventOutcome<Action> {
        if key.kind == KeyEventKind::Release {
            return EventOutcome::ignored();
        }

        // Search input swallows printable keys, including q and t.
        let searching = search_is_open(state);
        self.search.set_open(searching);
        if searching {
            return self.search.handle_event(event, state);
        }

        match key.code {
            KeyCode::Char('q') => return EventOutcome::action(Action::Quit),
            KeyCode::Char('t') => return EventOutcome::action(Action::ThemeToggle),
            KeyCode::Esc => return EventOutcome::action(Action::NavBack),
            _ => {}
        }

        if state.detail.is_some() {
            return detail::handle_key(key, event, state, &mut self.evolution_list);
        }

        match state.screen {
            Screen::Home => home::handle_key(key, event, state, &mut self.home_menu),
            Screen::Pokedex => pokedex::handle_key(key, event, state, &mut self.dex_list),
            Screen::Arena => arena::handle_key(key, event, state, &mut self.roster_list),
        }
    }
}

fn search_is_open(state: &AppState) -> bool {
    state.screen == Screen::Pokedex && state.pokedex.search.active && state.detail.is_none()
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState, palette: &Palette) {
    let mut spans = vec![Span::styled(
        " PokéArena ",
        Style::default()
            .fg(palette.highlight_text)
            .bg(palette.header)
            .add_modifier(Modifier::BOLD),
    )];
    for screen in [Screen::Home, Screen::Pokedex, Screen::Arena] {
        spans.push(Span::raw("  "));
        let style = if state.screen == screen {
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(palette.text_dim)
        };
        spans.push(Span::styled(screen.title(), style));
    }

    let block = panel_block(Line::from(""), palette.panel, palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(14)])
        .split(inner);
    frame.render_widget(Paragraph::new(Line::from(spans)), columns[0]);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!("theme: {}", state.theme.label()),
            Style::default().fg(palette.text_dim),
        )))
        .alignment(Alignment::Right),
        columns[1],
    );
}

fn render_footer(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    palette: &Palette,
    status_bar: &mut StatusBar,
) {
    let hints = status_hints(state);
    let message = state.message.as_deref().unwrap_or("");
    let message_items = [StatusBarItem::span(Span::styled(
        message,
        Style::default()
            .fg(palette.gold)
            .add_modifier(Modifier::BOLD),
    ))];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: Some(palette.bg),
            fg: Some(palette.text),
        },
        text: Style::default().fg(palette.text_dim),
        hint_key: Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(palette.text_dim),
        separator: Style::default().fg(palette.text_dim),
    };
    let props = StatusBarProps {
        left: StatusBarSection::hints(&hints).with_separator("  "),
        center: StatusBarSection::empty(),
        right: StatusBarSection::items(&message_items),
        style,
        is_focused: false,
    };
    <StatusBar as Component<Action>>::render(status_bar, frame, area, props);
}

fn status_hints(state: &AppState) -> Vec<StatusBarHint<'static>> {
    let hint = |key: &'static str, label: &'static str| StatusBarHint::new(key, label);
    if state.detail.is_some() {
        return vec![
            hint("←/→", "stage"),
            hint("Enter", "open"),
            hint("Esc", "close"),
            hint("t", "theme"),
            hint("q", "quit"),
        ];
    }
    match state.screen {
        Screen::Home => vec![
            hint("←/→", "choose"),
            hint("Enter", "go"),
            hint("1", "Pokédex"),
            hint("2", "Arena"),
            hint("t", "theme"),
            hint("q", "quit"),
        ],
        Screen::Pokedex if state.pokedex.search.active => vec![
            hint("type", "search"),
            hint("↑/↓", "pick"),
            hint("Enter", "open"),
            hint("Esc", "close"),
        ],
        Screen::Pokedex => vec![
            hint("↑/↓", "move"),
            hint("Enter", "open"),
            hint("/", "search"),
            hint("[ ]", "type"),
            hint("0", "all"),
            hint("m", "more"),
            hint("Esc", "back"),
        ],
        Screen::Arena => vec![
            hint("Tab", "side"),
            hint("↑/↓", "pick"),
            hint("Enter", "load"),
            hint("r/R", "random"),
            hint("Space", "fight"),
            hint("x", "reset"),
            hint("Esc", "back"),
        ],
    }
}

pub(crate) fn panel_block<'a, T>(title: T, bg: Color, palette: &Palette) -> Block<'a>
where
    T: Into<Title<'a>>,
{
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .style(Style::default().bg(bg).fg(palette.text))
        .border_style(Style::default().fg(palette.border))
}

pub(crate) fn list_style(bg: Color, palette: &Palette) -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: Some(bg),
            fg: Some(palette.text),
        },
        selection: SelectionStyle {
            style: Some(
                Style::default()
                    .bg(palette.highlight_bg)
                    .fg(palette.highlight_text)
                    .add_modifier(Modifier::BOLD),
            ),
            marker: None,
            disabled: false,
        },
        ..SelectListStyle::default()
    }
}

pub(crate) fn modal_style(palette: &Palette) -> ModalStyle {
    ModalStyle {
        dim_factor: 0.5,
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(palette.border),
                focused_style: Some(Style::default().fg(palette.accent)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(palette.panel),
            fg: Some(palette.text),
        },
    }
}

pub(crate) fn render_line(item: &Line<'static>) -> Line<'static> {
    item.clone()
}

pub(crate) fn ui_render(_: usize) -> Action {
    Action::UiRender
}

pub(crate) fn hp_line(health: u16, max: u16, palette: &Palette) -> Line<'static> {
    let max = max.max(1);
    let ratio = f32::from(health) / f32::from(max);
    let filled = ((ratio * BAR_WIDTH as f32).round() as usize).min(BAR_WIDTH);
    let empty = BAR_WIDTH.saturating_sub(filled);
    Line::from(vec![
        Span::styled("HP ", Style::default().fg(palette.text_dim)),
        Span::styled(
            "█".repeat(filled),
            Style::default()
                .fg(hp_color(health))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("░".repeat(empty), Style::default().fg(palette.bar_empty)),
        Span::styled(
            format!(" {health}/{max}"),
            Style::default().fg(palette.text),
        ),
    ])
}

pub(crate) fn meter_line(
    label: &str,
    value: u16,
    max: u16,
    color: Color,
    palette: &Palette,
) -> Line<'static> {
    let max = max.max(1);
    let ratio = f32::from(value.min(max)) / f32::from(max);
    let filled = ((ratio * BAR_WIDTH as f32).round() as usize).min(BAR_WIDTH);
    let empty = BAR_WIDTH.saturating_sub(filled);
    Line::from(vec![
        Span::styled(format!("{label:<8}"), Style::default().fg(palette.text_dim)),
        Span::styled(format!("{value:>3} "), Style::default().fg(palette.text)),
        Span::styled("█".repeat(filled), Style::default().fg(color)),
        Span::styled("░".repeat(empty), Style::default().fg(palette.bar_empty)),
    ])
}

pub(crate) fn type_spans(types: &[String]) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (index, type_name) in types.iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            format!(" {} ", type_name.to_uppercase()),
            Style::default()
                .fg(Color::Rgb(255, 255, 255))
                .bg(type_color(type_name))
                .add_modifier(Modifier::BOLD),
        ));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hp_bar_scales_with_health() {
        let palette = Palette::for_theme(crate::prefs::Theme::Light);
        let full: String = hp_line(100, 100, &palette)
            .spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect();
        assert_eq!(full.matches('█').count(), BAR_WIDTH);
        let half: String = hp_line(50, 100, &palette)
            .spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect();
        assert_eq!(half.matches('█').count(), BAR_WIDTH / 2);
        assert!(half.ends_with(" 50/100"));
    }
}
