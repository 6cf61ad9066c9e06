use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::battle::{Dice, Side};
use crate::catalog;
use crate::effect::Effect;
use crate::pokemon::{PokemonSummary, RosterEntry};
use crate::state::{
    AppState, DetailState, Flash, LoadTarget, Screen, FLASH_TICKS, HOME_ITEMS, SHOWCASE_LEFT,
    SHOWCASE_RIGHT,
};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => init(state),
        Action::UiTerminalResize(width, height) => {
            if state.terminal_size != (width, height) {
                state.terminal_size = (width, height);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }
        Action::UiRender => DispatchResult::changed(),
        Action::Tick => tick(state),

        Action::NavigateTo(screen) => navigate(state, screen),
        Action::NavBack => nav_back(state),
        Action::HomeSelect(index) => {
            let index = index.min(HOME_ITEMS.len() - 1);
            if state.home.selected == index {
                return DispatchResult::unchanged();
            }
            state.home.selected = index;
            DispatchResult::changed()
        }
        Action::HomeConfirm => {
            let screen = if state.home.selected == 0 {
                Screen::Pokedex
            } else {
                Screen::Arena
            };
            navigate(state, screen)
        }

        Action::ThemeToggle => {
            state.theme = state.theme.toggle();
            DispatchResult::changed_with(Effect::SavePrefs { theme: state.theme })
        }
        Action::PrefsDidSave => DispatchResult::unchanged(),
        Action::PrefsDidError(error) => {
            state.message = Some(format!("Could not save preferences: {error}"));
            DispatchResult::changed()
        }

        Action::ModelsDidLoad(catalog) => {
            state.models = DataResource::Loaded(catalog);
            DispatchResult::changed()
        }
        Action::ModelsDidError(error) => {
            state.models = DataResource::Failed(error);
            DispatchResult::changed()
        }
        Action::NamesDidLoad(index) => {
            state.names = DataResource::Loaded(index);
            refresh_search(state);
            DispatchResult::changed()
        }
        Action::NamesDidError(error) => {
            state.names = DataResource::Failed(error);
            DispatchResult::changed()
        }

        Action::PokemonDidLoad { target, pokemon } => pokemon_loaded(state, target, pokemon),
        Action::PokemonDidError { target, id, error } => pokemon_error(state, target, id, error),

        Action::PokedexDidLoad { offset, entries } => page_loaded(state, offset, entries),
        Action::PokedexDidError { offset, error } => {
            if offset == 0 {
                state.pokedex.loading = false;
            } else {
                state.pokedex.loading_more = false;
            }
            state.pokedex.error = Some(error);
            DispatchResult::changed()
        }
        Action::PokedexLoadMore => {
            if !state.pokedex.can_load_more() {
                return DispatchResult::unchanged();
            }
            state.pokedex.loading_more = true;
            state.pokedex.error = None;
            DispatchResult::changed_with(Effect::LoadPage {
                offset: state.pokedex.offset,
                limit: state.settings.page_size,
            })
        }
        Action::PokedexMove(delta) => {
            let len = state.pokedex.visible().len();
            move_index(&mut state.pokedex.selected, len, delta)
        }
        Action::PokedexSelect(index) => {
            let len = state.pokedex.visible().len();
            select_index(&mut state.pokedex.selected, len, index)
        }
        Action::PokedexTypeNext => {
            let next = catalog::cycle_type(state.pokedex.type_filter.as_deref(), true);
            set_type_filter(state, next)
        }
        Action::PokedexTypePrev => {
            let next = catalog::cycle_type(state.pokedex.type_filter.as_deref(), false);
            set_type_filter(state, next)
        }
        Action::PokedexTypeClear => set_type_filter(state, None),
        Action::PokedexOpen => {
            let selected = state.pokedex.selected_entry().map(|entry| entry.id);
            match selected {
                Some(id) => open_detail(state, id),
                None => DispatchResult::unchanged(),
            }
        }

        Action::SearchOpen => {
            state.pokedex.search.active = true;
            state.pokedex.search.query.clear();
            state.pokedex.search.hits.clear();
            state.pokedex.search.selected = 0;
            DispatchResult::changed()
        }
        Action::SearchClose => {
            if !state.pokedex.search.active {
                return DispatchResult::unchanged();
            }
            state.pokedex.search.active = false;
            DispatchResult::changed()
        }
        Action::SearchQueryChange(query) => {
            state.pokedex.search.query = query;
            state.pokedex.search.selected = 0;
            refresh_search(state);
            DispatchResult::changed()
        }
        Action::SearchSelect(index) => {
            let len = state.pokedex.search.hits.len();
            select_index(&mut state.pokedex.search.selected, len, index)
        }
        Action::SearchConfirm => {
            let search = &state.pokedex.search;
            let Some(hit) = search.hits.get(search.selected).cloned() else {
                return DispatchResult::unchanged();
            };
            state.pokedex.search.active = false;
            state.pokedex.search.query = hit.name.clone();
            open_detail(state, hit.id)
        }

        Action::DetailOpen(id) => open_detail(state, id),
        Action::DetailClose => {
            if state.detail.take().is_some() {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }
        Action::DetailSpeciesDidLoad { id, species } => {
            let Some(detail) = detail_for(state, id) else {
                return DispatchResult::unchanged();
            };
            let chain_url = species.evolution_chain_url.clone();
            detail.species = DataResource::Loaded(species);
            match chain_url {
                Some(url) => {
                    detail.evolution = DataResource::Loading;
                    DispatchResult::changed_with(Effect::LoadEvolution { id, url })
                }
                None => {
                    detail.evolution = DataResource::Loaded(Vec::new());
                    DispatchResult::changed()
                }
            }
        }
        Action::DetailSpeciesDidError { id, error } => {
            let Some(detail) = detail_for(state, id) else {
                return DispatchResult::unchanged();
            };
            detail.species = DataResource::Failed(error.clone());
            detail.evolution = DataResource::Failed(error);
            DispatchResult::changed()
        }
        Action::DetailEvolutionDidLoad { id, stages } => {
            let Some(detail) = detail_for(state, id) else {
                return DispatchResult::unchanged();
            };
            detail.evolution_selected = stages
                .iter()
                .position(|stage| stage.id == id)
                .unwrap_or(0);
            detail.evolution = DataResource::Loaded(stages);
            DispatchResult::changed()
        }
        Action::DetailEvolutionDidError { id, error } => {
            let Some(detail) = detail_for(state, id) else {
                return DispatchResult::unchanged();
            };
            detail.evolution = DataResource::Failed(error);
            DispatchResult::changed()
        }
        Action::EvolutionMove(delta) => {
            let Some(detail) = state.detail.as_mut() else {
                return DispatchResult::unchanged();
            };
            let len = detail.stages().len();
            move_index(&mut detail.evolution_selected, len, delta)
        }
        Action::EvolutionSelect(index) => {
            let Some(detail) = state.detail.as_mut() else {
                return DispatchResult::unchanged();
            };
            let len = detail.stages().len();
            select_index(&mut detail.evolution_selected, len, index)
        }
        Action::EvolutionOpen => {
            let target = state.detail.as_ref().and_then(|detail| {
                detail
                    .stages()
                    .get(detail.evolution_selected)
                    .map(|stage| stage.id)
                    .filter(|id| *id != detail.id)
            });
            match target {
                Some(id) => open_detail(state, id),
                None => DispatchResult::unchanged(),
            }
        }

        Action::RosterDidLoad(roster) => roster_loaded(state, roster),
        Action::RosterDidError(error) => {
            state.arena.roster = DataResource::Failed(error);
            DispatchResult::changed()
        }
        Action::ArenaSwitchSide => {
            state.arena.focus = state.arena.focus.opponent();
            DispatchResult::changed()
        }
        Action::ArenaPickMove(delta) => {
            let side = state.arena.focus;
            let len = state.arena.roster_len();
            let mut index = state.arena.pick(side);
            let result = move_index(&mut index, len, delta);
            state.arena.set_pick(side, index);
            result
        }
        Action::ArenaPickSelect(index) => {
            let side = state.arena.focus;
            let len = state.arena.roster_len();
            let mut pick = state.arena.pick(side);
            let result = select_index(&mut pick, len, index);
            state.arena.set_pick(side, pick);
            result
        }
        Action::ArenaConfirmPick => {
            let side = state.arena.focus;
            request_fighter(state, side)
        }
        Action::ArenaRandom(side) => random_fighters(state, &[side]),
        Action::ArenaRandomBoth => random_fighters(state, &[Side::Left, Side::Right]),

        Action::BattleStart => battle_start(state),
        Action::BattleTurn => battle_turn(state),
        Action::BattleReset => {
            if !state.arena.battle.reset() {
                return DispatchResult::unchanged();
            }
            state.arena.flash = None;
            state.message = None;
            DispatchResult::changed()
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn init(state: &mut AppState) -> DispatchResult<Effect> {
    let mut effects = vec![Effect::LoadModels];
    state.models = DataResource::Loading;

    if state.settings.name_index_enabled {
        state.names = DataResource::Loading;
        effects.push(Effect::LoadNameIndex {
            lang: state.settings.name_lang.clone(),
        });
    }

    state.pokedex.loading = true;
    state.pokedex.offset = 0;
    effects.push(Effect::LoadPage {
        offset: 0,
        limit: state.settings.page_size,
    });

    state.arena.roster = DataResource::Loading;
    effects.push(Effect::LoadRoster {
        size: state.settings.roster_size,
    });

    for (side, id) in [(Side::Left, SHOWCASE_LEFT), (Side::Right, SHOWCASE_RIGHT)] {
        *state.home.showcase_mut(side) = DataResource::Loading;
        effects.push(Effect::LoadPokemon {
            target: LoadTarget::Showcase(side),
            id,
        });
    }

    DispatchResult::changed_with_many(effects)
}

fn tick(state: &mut AppState) -> DispatchResult<Effect> {
    state.tick = state.tick.wrapping_add(1);
    let Some(flash) = state.arena.flash.as_mut() else {
        return DispatchResult::unchanged();
    };
    flash.ticks = flash.ticks.saturating_sub(1);
    if flash.ticks == 0 {
        state.arena.flash = None;
    }
    DispatchResult::changed()
}

fn navigate(state: &mut AppState, screen: Screen) -> DispatchResult<Effect> {
    if state.screen == screen && state.detail.is_none() {
        return DispatchResult::unchanged();
    }
    state.screen = screen;
    state.detail = None;
    state.pokedex.search.active = false;
    state.message = None;
    if let Some(index) = [Screen::Pokedex, Screen::Arena]
        .iter()
        .position(|item| *item == screen)
    {
        state.home.selected = index;
    }
    DispatchResult::changed()
}

fn nav_back(state: &mut AppState) -> DispatchResult<Effect> {
    if state.detail.take().is_some() {
        return DispatchResult::changed();
    }
    if state.pokedex.search.active {
        state.pokedex.search.active = false;
        return DispatchResult::changed();
    }
    if state.screen != Screen::Home {
        state.screen = Screen::Home;
        state.message = None;
        return DispatchResult::changed();
    }
    DispatchResult::unchanged()
}

fn move_index(index: &mut usize, len: usize, delta: i16) -> DispatchResult<Effect> {
    if len == 0 {
        return DispatchResult::unchanged();
    }
    let current = (*index).min(len - 1) as i64;
    let next = (current + i64::from(delta)).clamp(0, len as i64 - 1) as usize;
    if next == *index {
        return DispatchResult::unchanged();
    }
    *index = next;
    DispatchResult::changed()
}

fn select_index(index: &mut usize, len: usize, target: usize) -> DispatchResult<Effect> {
    if len == 0 {
        return DispatchResult::unchanged();
    }
    let next = target.min(len - 1);
    if next == *index {
        return DispatchResult::unchanged();
    }
    *index = next;
    DispatchResult::changed()
}

fn set_type_filter(state: &mut AppState, filter: Option<String>) -> DispatchResult<Effect> {
    if state.pokedex.type_filter == filter {
        return DispatchResult::unchanged();
    }
    state.pokedex.type_filter = filter;
    state.pokedex.selected = 0;
    DispatchResult::changed()
}

fn refresh_search(state: &mut AppState) {
    let search = &mut state.pokedex.search;
    search.hits = catalog::search(&state.pokedex.entries, state.names.data(), &search.query);
    if search.selected >= search.hits.len() {
        search.selected = 0;
    }
}

fn page_loaded(
    state: &mut AppState,
    offset: u16,
    entries: Vec<PokemonSummary>,
) -> DispatchResult<Effect> {
    if offset != state.pokedex.offset {
        tracing::debug!(offset, expected = state.pokedex.offset, "dropping stale page");
        return DispatchResult::unchanged();
    }
    if offset == 0 {
        state.pokedex.entries = entries;
        state.pokedex.selected = 0;
        state.pokedex.loading = false;
    } else {
        state.pokedex.entries.extend(entries);
        state.pokedex.loading_more = false;
    }
    state.pokedex.offset = offset.saturating_add(state.settings.page_size);
    state.pokedex.error = None;
    refresh_search(state);
    DispatchResult::changed()
}

fn detail_for(state: &mut AppState, id: u16) -> Option<&mut DetailState> {
    state.detail.as_mut().filter(|detail| detail.id == id)
}

fn open_detail(state: &mut AppState, id: u16) -> DispatchResult<Effect> {
    let mut detail = DetailState::new(id);
    let effect = match state.pokedex.find(id).cloned() {
        Some(pokemon) => {
            detail.pokemon = DataResource::Loaded(pokemon);
            detail.species = DataResource::Loading;
            Effect::LoadSpecies { id }
        }
        None => {
            detail.pokemon = DataResource::Loading;
            Effect::LoadPokemon {
                target: LoadTarget::Detail,
                id,
            }
        }
    };
    state.detail = Some(detail);
    DispatchResult::changed_with(effect)
}

fn pokemon_loaded(
    state: &mut AppState,
    target: LoadTarget,
    pokemon: PokemonSummary,
) -> DispatchResult<Effect> {
    match target {
        LoadTarget::Showcase(side) => {
            *state.home.showcase_mut(side) = DataResource::Loaded(pokemon);
            DispatchResult::changed()
        }
        LoadTarget::Detail => {
            let id = pokemon.id;
            let Some(detail) = detail_for(state, id) else {
                return DispatchResult::unchanged();
            };
            detail.pokemon = DataResource::Loaded(pokemon);
            detail.species = DataResource::Loading;
            DispatchResult::changed_with(Effect::LoadSpecies { id })
        }
        LoadTarget::Fighter(side) => {
            state.arena.set_loading(side, false);
            if !state.arena.battle.select(side, pokemon.to_fighter()) {
                tracing::debug!(side = side.label(), "fighter arrived mid-battle, ignored");
                return DispatchResult::changed();
            }
            state.arena.set_info(side, pokemon);
            state.arena.flash = None;
            state.message = None;
            DispatchResult::changed()
        }
    }
}

fn pokemon_error(
    state: &mut AppState,
    target: LoadTarget,
    id: u16,
    error: String,
) -> DispatchResult<Effect> {
    match target {
        LoadTarget::Showcase(side) => {
            *state.home.showcase_mut(side) = DataResource::Failed(error);
        }
        LoadTarget::Detail => {
            let Some(detail) = detail_for(state, id) else {
                return DispatchResult::unchanged();
            };
            detail.pokemon = DataResource::Failed(error);
        }
        LoadTarget::Fighter(side) => {
            state.arena.set_loading(side, false);
            state.message = Some(format!("Could not load fighter #{id}: {error}"));
        }
    }
    DispatchResult::changed()
}

fn roster_loaded(state: &mut AppState, roster: Vec<RosterEntry>) -> DispatchResult<Effect> {
    state.arena.roster = DataResource::Loaded(roster);
    if state.arena.battle.fighter(Side::Left).is_some()
        || state.arena.battle.fighter(Side::Right).is_some()
    {
        return DispatchResult::changed();
    }
    DispatchResult::changed_with_many(pick_random(state, &[Side::Left, Side::Right]))
}

fn request_fighter(state: &mut AppState, side: Side) -> DispatchResult<Effect> {
    if state.arena.battle.is_fighting() {
        return DispatchResult::unchanged();
    }
    let Some(id) = state.arena.picked_entry(side).map(|entry| entry.id) else {
        return DispatchResult::unchanged();
    };
    state.arena.set_loading(side, true);
    DispatchResult::changed_with(Effect::LoadPokemon {
        target: LoadTarget::Fighter(side),
        id,
    })
}

fn random_fighters(state: &mut AppState, sides: &[Side]) -> DispatchResult<Effect> {
    if state.arena.roster_len() == 0 || state.arena.battle.is_fighting() {
        return DispatchResult::unchanged();
    }
    DispatchResult::changed_with_many(pick_random(state, sides))
}

fn pick_random(state: &mut AppState, sides: &[Side]) -> Vec<Effect> {
    let len = state.arena.roster_len();
    if len == 0 {
        return Vec::new();
    }
    let mut effects = Vec::with_capacity(sides.len());
    for &side in sides {
        let index = state.dice.pick(len as u32) as usize;
        state.arena.set_pick(side, index);
        if let Some(id) = state.arena.picked_entry(side).map(|entry| entry.id) {
            state.arena.set_loading(side, true);
            effects.push(Effect::LoadPokemon {
                target: LoadTarget::Fighter(side),
                id,
            });
        }
    }
    effects
}

fn battle_start(state: &mut AppState) -> DispatchResult<Effect> {
    let arena = &mut state.arena;
    if arena.battle.is_fighting() {
        return DispatchResult::unchanged();
    }
    if !arena.battle.start() {
        state.message = Some("Pick two fighters first".to_string());
        return DispatchResult::changed();
    }
    arena.flash = None;
    state.message = None;
    DispatchResult::changed_with(Effect::ScheduleTurn {
        delay_ms: state.settings.turn_delay_ms,
    })
}

fn battle_turn(state: &mut AppState) -> DispatchResult<Effect> {
    let Some(event) = state.arena.battle.step(&mut state.dice) else {
        return DispatchResult::unchanged();
    };
    state.arena.flash = Some(Flash {
        side: event.side.opponent(),
        ticks: FLASH_TICKS,
    });

    if state.arena.battle.is_fighting() {
        return DispatchResult::changed_with(Effect::ScheduleTurn {
            delay_ms: state.settings.turn_delay_ms,
        });
    }
    if let Some(winner) = state.arena.battle.winner_fighter() {
        let name = winner.name().to_string();
        tracing::info!(winner = %name, turns = state.arena.battle.turn(), "battle finished");
        state.message = Some(format!("{name} wins!"));
    }
    DispatchResult::changed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::{BattlePhase, SeededDice};
    use crate::pokemon::StatEntry;
    use crate::prefs::Theme;
    use crate::state::Settings;

    fn summary(id: u16, name: &str, attack: u16, defense: u16) -> PokemonSummary {
        PokemonSummary {
            id,
            name: name.into(),
            types: vec!["normal".into()],
            stats: vec![
                StatEntry {
                    name: "attack".into(),
                    value: attack,
                },
                StatEntry {
                    name: "defense".into(),
                    value: defense,
                },
            ],
            abilities: vec![],
            height: 10,
            weight: 100,
            base_experience: None,
            artwork_url: None,
            species_url: None,
        }
    }

    fn state() -> AppState {
        AppState::new(Settings::default(), Theme::Light, SeededDice::new(11))
    }

    fn armed_state() -> AppState {
        let mut state = state();
        for (side, pokemon) in [
            (Side::Left, summary(1, "bulbasaur", 49, 49)),
            (Side::Right, summary(4, "charmander", 52, 43)),
        ] {
            reducer(
                &mut state,
                Action::PokemonDidLoad {
                    target: LoadTarget::Fighter(side),
                    pokemon,
                },
            );
        }
        state
    }

    #[test]
    fn init_requests_every_startup_resource() {
        let mut state = state();
        let result = reducer(&mut state, Action::Init);
        assert!(result.changed);
        assert_eq!(result.effects.len(), 6);
        assert!(result.effects.contains(&Effect::LoadModels));
        assert!(result.effects.contains(&Effect::LoadPage {
            offset: 0,
            limit: 50
        }));
        assert!(result.effects.contains(&Effect::LoadPokemon {
            target: LoadTarget::Showcase(Side::Left),
            id: 149
        }));
        assert!(state.models.is_loading());
        assert!(state.pokedex.loading);
    }

    #[test]
    fn init_skips_name_index_when_disabled() {
        let mut state = state();
        state.settings.name_index_enabled = false;
        let result = reducer(&mut state, Action::Init);
        assert!(!result
            .effects
            .iter()
            .any(|effect| matches!(effect, Effect::LoadNameIndex { .. })));
        assert!(state.names.is_empty());
    }

    #[test]
    fn theme_toggle_persists() {
        let mut state = state();
        let result = reducer(&mut state, Action::ThemeToggle);
        assert_eq!(state.theme, Theme::Dark);
        assert_eq!(result.effects, vec![Effect::SavePrefs { theme: Theme::Dark }]);
    }

    #[test]
    fn load_more_is_ignored_while_in_flight() {
        let mut state = state();
        reducer(&mut state, Action::Init);
        reducer(
            &mut state,
            Action::PokedexDidLoad {
                offset: 0,
                entries: vec![summary(1, "bulbasaur", 49, 49)],
            },
        );
        assert_eq!(state.pokedex.offset, 50);

        let first = reducer(&mut state, Action::PokedexLoadMore);
        assert_eq!(
            first.effects,
            vec![Effect::LoadPage {
                offset: 50,
                limit: 50
            }]
        );
        let second = reducer(&mut state, Action::PokedexLoadMore);
        assert!(!second.changed);
        assert!(second.effects.is_empty());
    }

    #[test]
    fn load_more_stops_at_offset_limit() {
        let mut state = state();
        state.pokedex.offset = 1010;
        assert!(!reducer(&mut state, Action::PokedexLoadMore).changed);
    }

    #[test]
    fn opening_unknown_pokemon_fetches_it_first() {
        let mut state = state();
        let result = reducer(&mut state, Action::DetailOpen(150));
        assert_eq!(
            result.effects,
            vec![Effect::LoadPokemon {
                target: LoadTarget::Detail,
                id: 150
            }]
        );

        let result = reducer(
            &mut state,
            Action::PokemonDidLoad {
                target: LoadTarget::Detail,
                pokemon: summary(150, "mewtwo", 110, 90),
            },
        );
        assert_eq!(result.effects, vec![Effect::LoadSpecies { id: 150 }]);
        assert!(state.detail.as_ref().is_some_and(|d| d.pokemon.is_loaded()));
    }

    #[test]
    fn stale_detail_responses_are_dropped() {
        let mut state = state();
        reducer(&mut state, Action::DetailOpen(150));
        let result = reducer(
            &mut state,
            Action::DetailEvolutionDidError {
                id: 25,
                error: "boom".into(),
            },
        );
        assert!(!result.changed);
    }

    #[test]
    fn roster_arrival_picks_both_fighters() {
        let mut state = state();
        let roster: Vec<RosterEntry> = (1..=151)
            .map(|id| RosterEntry {
                id,
                name: format!("mon-{id}"),
            })
            .collect();
        let result = reducer(&mut state, Action::RosterDidLoad(roster));
        assert_eq!(result.effects.len(), 2);
        assert!(state.arena.left_loading && state.arena.right_loading);
        assert!(result.effects.iter().all(|effect| matches!(
            effect,
            Effect::LoadPokemon {
                target: LoadTarget::Fighter(_),
                ..
            }
        )));
    }

    #[test]
    fn battle_runs_turn_by_turn_until_resolved() {
        let mut state = armed_state();
        let result = reducer(&mut state, Action::BattleStart);
        assert_eq!(result.effects, vec![Effect::ScheduleTurn { delay_ms: 800 }]);
        assert_eq!(state.arena.battle.phase(), BattlePhase::Fighting);

        let mut turns = 0;
        while state.arena.battle.is_fighting() {
            let result = reducer(&mut state, Action::BattleTurn);
            assert!(result.changed);
            turns += 1;
            assert!(turns <= 40);
        }
        assert!(state.arena.battle.winner().is_some());
        assert!(state.message.as_deref().is_some_and(|m| m.ends_with("wins!")));
        assert!(state.arena.flash.is_some());
        assert!(!reducer(&mut state, Action::BattleTurn).changed);
    }

    #[test]
    fn start_while_fighting_schedules_nothing() {
        let mut state = armed_state();
        reducer(&mut state, Action::BattleStart);
        let again = reducer(&mut state, Action::BattleStart);
        assert!(!again.changed);
        assert!(again.effects.is_empty());
    }

    #[test]
    fn start_without_fighters_explains_why() {
        let mut state = state();
        let result = reducer(&mut state, Action::BattleStart);
        assert!(result.effects.is_empty());
        assert_eq!(state.arena.battle.phase(), BattlePhase::Idle);
        assert!(state.message.is_some());
    }

    #[test]
    fn flash_fades_on_tick() {
        let mut state = armed_state();
        reducer(&mut state, Action::BattleStart);
        reducer(&mut state, Action::BattleTurn);
        assert_eq!(state.arena.flash.map(|f| f.side), Some(Side::Right));

        for _ in 0..FLASH_TICKS {
            assert!(reducer(&mut state, Action::Tick).changed);
        }
        assert_eq!(state.arena.flash, None);
        assert!(!reducer(&mut state, Action::Tick).changed);
    }

    #[test]
    fn reset_is_refused_mid_battle() {
        let mut state = armed_state();
        reducer(&mut state, Action::BattleStart);
        assert!(!reducer(&mut state, Action::BattleReset).changed);
        assert!(!reducer(&mut state, Action::ArenaRandom(Side::Left)).changed);
    }

    fn resolved_state() -> AppState {
        let mut state = armed_state();
        reducer(&mut state, Action::BattleStart);
        while state.arena.battle.is_fighting() {
            reducer(&mut state, Action::BattleTurn);
        }
        assert!(state.message.as_deref().is_some_and(|m| m.ends_with("wins!")));
        state
    }

    #[test]
    fn reset_dismisses_the_winner_announcement() {
        let mut state = resolved_state();
        assert!(reducer(&mut state, Action::BattleReset).changed);
        assert_eq!(state.arena.battle.phase(), BattlePhase::Idle);
        assert_eq!(state.message, None);
    }

    #[test]
    fn new_fighter_dismisses_the_winner_announcement() {
        let mut state = resolved_state();
        reducer(
            &mut state,
            Action::PokemonDidLoad {
                target: LoadTarget::Fighter(Side::Left),
                pokemon: summary(7, "squirtle", 48, 65),
            },
        );
        assert_eq!(state.arena.battle.phase(), BattlePhase::Idle);
        assert_eq!(state.message, None);
        assert_eq!(
            state.arena.battle.fighter(Side::Left).map(|f| f.name()),
            Some("squirtle")
        );
    }

    #[test]
    fn list_selection_is_clamped_to_the_list() {
        let mut state = state();
        state.pokedex.entries = vec![
            summary(1, "bulbasaur", 49, 49),
            summary(2, "ivysaur", 62, 63),
            summary(3, "venusaur", 82, 83),
        ];
        assert!(reducer(&mut state, Action::PokedexSelect(2)).changed);
        assert_eq!(state.pokedex.selected, 2);
        assert!(!reducer(&mut state, Action::PokedexSelect(99)).changed);
        assert_eq!(state.pokedex.selected, 2);
        assert!(!reducer(&mut state, Action::SearchSelect(1)).changed);
        assert!(!reducer(&mut state, Action::EvolutionSelect(1)).changed);
    }

    #[test]
    fn back_closes_innermost_layer_first() {
        let mut state = state();
        reducer(&mut state, Action::NavigateTo(Screen::Pokedex));
        reducer(&mut state, Action::SearchOpen);
        reducer(&mut state, Action::DetailOpen(1));

        reducer(&mut state, Action::NavBack);
        assert!(state.detail.is_none());
        assert!(state.pokedex.search.active);
        reducer(&mut state, Action::NavBack);
        assert!(!state.pokedex.search.active);
        reducer(&mut state, Action::NavBack);
        assert_eq!(state.screen, Screen::Home);
        assert!(!reducer(&mut state, Action::NavBack).changed);
    }
}
