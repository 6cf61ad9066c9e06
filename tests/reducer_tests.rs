//! Store flows driven through EffectStoreTestHarness.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pokearena::action::Action;
use pokearena::battle::{BattlePhase, SeededDice, Side};
use pokearena::effect::Effect;
use pokearena::evolution::EvolutionStage;
use pokearena::lookup::{LocalizedName, ModelCatalog, ModelEntry, ModelForm, NameIndex};
use pokearena::pokemon::{PokemonSummary, RosterEntry, SpeciesInfo, StatEntry};
use pokearena::prefs::Theme;
use pokearena::reducer::reducer;
use pokearena::state::{AppState, LoadTarget, Screen, Settings};
use pokearena::ui::PokeArenaUi;
use tui_dispatch::testing::*;
use tui_dispatch::EventKind;

fn pokemon(id: u16, name: &str, types: &[&str]) -> PokemonSummary {
    PokemonSummary {
        id,
        name: name.into(),
        types: types.iter().map(|t| t.to_string()).collect(),
        stats: vec![
            StatEntry {
                name: "attack".into(),
                value: 50 + id,
            },
            StatEntry {
                name: "defense".into(),
                value: 45,
            },
        ],
        abilities: vec![],
        height: 6,
        weight: 85,
        base_experience: None,
        artwork_url: None,
        species_url: None,
    }
}

fn first_page() -> Vec<PokemonSummary> {
    vec![
        pokemon(1, "bulbasaur", &["grass", "poison"]),
        pokemon(4, "charmander", &["fire"]),
        pokemon(5, "charmeleon", &["fire"]),
        pokemon(7, "squirtle", &["water"]),
    ]
}

fn stage(id: u16, name: &str) -> EvolutionStage {
    EvolutionStage {
        id,
        name: name.into(),
        image: format!("https://img.example/{id}.png"),
    }
}

fn fresh_state() -> AppState {
    AppState::new(Settings::default(), Theme::Light, SeededDice::new(42))
}

fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

#[test]
fn startup_loads_every_resource_in_parallel() {
    let mut harness = EffectStoreTestHarness::new(fresh_state(), reducer);

    harness.dispatch_collect(Action::Init);
    let effects = harness.drain_effects();
    effects.effects_count(6);
    effects.effects_first_matches(|e| matches!(e, Effect::LoadModels));
    assert!(effects.contains(&Effect::LoadNameIndex { lang: "fr".into() }));
    assert!(effects.contains(&Effect::LoadRoster { size: 151 }));
    assert!(effects.contains(&Effect::LoadPokemon {
        target: LoadTarget::Showcase(Side::Right),
        id: 6,
    }));

    harness.complete_action(Action::PokedexDidLoad {
        offset: 0,
        entries: first_page(),
    });
    harness.complete_action(Action::ModelsDidLoad(ModelCatalog::new(vec![ModelEntry {
        id: 4,
        forms: vec![ModelForm {
            name: Some("charmander".into()),
            form_name: None,
            model: Some("https://models.example/4.glb".into()),
        }],
    }])));
    harness.complete_action(Action::PokemonDidLoad {
        target: LoadTarget::Showcase(Side::Left),
        pokemon: pokemon(149, "dragonite", &["dragon", "flying"]),
    });
    let (changed, total) = harness.process_emitted();
    assert_eq!((changed, total), (3, 3));

    harness.assert_state(|s| s.pokedex.entries.len() == 4 && s.pokedex.offset == 50);
    harness.assert_state(|s| s.model_url(4) == Some("https://models.example/4.glb"));
    harness.assert_state(|s| s.model_url(1).is_none());
    harness.assert_state(|s| s.home.showcase_left.is_loaded());
    harness.assert_state(|s| s.home.showcase_right.is_loading());
}

#[test]
fn type_filter_narrows_the_visible_list() {
    let mut harness = EffectStoreTestHarness::new(fresh_state(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.dispatch_collect(Action::PokedexDidLoad {
        offset: 0,
        entries: first_page(),
    });

    harness.dispatch_collect(Action::PokedexTypeNext);
    harness.assert_state(|s| s.pokedex.type_filter.as_deref() == Some("fire"));
    harness.assert_state(|s| {
        s.pokedex.visible().iter().map(|p| p.id).collect::<Vec<_>>() == vec![4, 5]
    });

    // Cycling backwards from fire wraps to "all types", then to normal.
    harness.dispatch_collect(Action::PokedexTypePrev);
    harness.assert_state(|s| s.pokedex.type_filter.is_none());
    harness.dispatch_collect(Action::PokedexTypePrev);
    harness.assert_state(|s| s.pokedex.type_filter.as_deref() == Some("normal"));
    harness.assert_state(|s| s.pokedex.visible().is_empty());

    harness.dispatch_collect(Action::PokedexTypeClear);
    harness.assert_state(|s| s.pokedex.type_filter.is_none());
    harness.assert_state(|s| s.pokedex.visible().len() == 4);

    harness.dispatch_collect(Action::PokedexMove(10));
    harness.assert_state(|s| s.pokedex.selected == 3);
}

#[test]
fn stale_pages_are_ignored() {
    let mut harness = EffectStoreTestHarness::new(fresh_state(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.dispatch_collect(Action::PokedexDidLoad {
        offset: 0,
        entries: first_page(),
    });

    harness.complete_action(Action::PokedexDidLoad {
        offset: 0,
        entries: vec![pokemon(150, "mewtwo", &["psychic"])],
    });
    let (changed, _) = harness.process_emitted();
    assert_eq!(changed, 0);
    harness.assert_state(|s| s.pokedex.entries.len() == 4);
}

#[test]
fn search_opens_the_detail_and_walks_the_evolution_chain() {
    let mut harness = EffectStoreTestHarness::new(fresh_state(), reducer);
    harness.dispatch_collect(Action::NavigateTo(Screen::Pokedex));
    harness.dispatch_collect(Action::PokedexDidLoad {
        offset: 0,
        entries: first_page(),
    });

    harness.dispatch_collect(Action::SearchOpen);
    harness.dispatch_collect(Action::SearchQueryChange("c".into()));
    harness.assert_state(|s| s.pokedex.search.hits.is_empty());
    harness.dispatch_collect(Action::SearchQueryChange("char".into()));
    harness.assert_state(|s| {
        s.pokedex.search.hits.iter().map(|hit| hit.id).collect::<Vec<_>>() == vec![4, 5]
    });

    harness.dispatch_collect(Action::SearchConfirm);
    harness.assert_state(|s| !s.pokedex.search.active);
    harness.assert_state(|s| s.detail.as_ref().is_some_and(|d| d.id == 4));
    let effects = harness.drain_effects();
    assert_eq!(effects, vec![Effect::LoadSpecies { id: 4 }]);

    let chain_url = "https://pokeapi.co/api/v2/evolution-chain/2/".to_string();
    harness.dispatch_collect(Action::DetailSpeciesDidLoad {
        id: 4,
        species: SpeciesInfo {
            id: 4,
            genus: Some("Lizard Pokémon".into()),
            evolution_chain_url: Some(chain_url.clone()),
            names: vec![],
        },
    });
    let effects = harness.drain_effects();
    assert_eq!(
        effects,
        vec![Effect::LoadEvolution {
            id: 4,
            url: chain_url
        }]
    );

    harness.dispatch_collect(Action::DetailEvolutionDidLoad {
        id: 4,
        stages: vec![
            stage(4, "charmander"),
            stage(5, "charmeleon"),
            stage(6, "charizard"),
        ],
    });
    harness.assert_state(|s| s.detail.as_ref().is_some_and(|d| d.evolution_selected == 0));

    harness.dispatch_collect(Action::EvolutionMove(1));
    harness.dispatch_collect(Action::EvolutionOpen);
    harness.assert_state(|s| s.detail.as_ref().is_some_and(|d| d.id == 5));
    let effects = harness.drain_effects();
    assert_eq!(effects, vec![Effect::LoadSpecies { id: 5 }]);

    harness.dispatch_collect(Action::DetailEvolutionDidLoad {
        id: 5,
        stages: vec![
            stage(4, "charmander"),
            stage(5, "charmeleon"),
            stage(6, "charizard"),
        ],
    });
    harness.assert_state(|s| s.detail.as_ref().is_some_and(|d| d.evolution_selected == 1));

    // charizard is not in the loaded catalog, so the record is fetched first
    harness.dispatch_collect(Action::EvolutionMove(1));
    harness.dispatch_collect(Action::EvolutionOpen);
    let effects = harness.drain_effects();
    assert_eq!(
        effects,
        vec![Effect::LoadPokemon {
            target: LoadTarget::Detail,
            id: 6
        }]
    );
}

#[test]
fn localized_names_extend_search_hits() {
    let mut harness = EffectStoreTestHarness::new(fresh_state(), reducer);
    harness.dispatch_collect(Action::PokedexDidLoad {
        offset: 0,
        entries: first_page(),
    });
    harness.dispatch_collect(Action::SearchOpen);
    harness.dispatch_collect(Action::SearchQueryChange("salame".into()));
    harness.assert_state(|s| s.pokedex.search.hits.is_empty());

    // The index arriving later refreshes the open search.
    harness.complete_action(Action::NamesDidLoad(NameIndex::new(
        "fr",
        vec![
            LocalizedName {
                id: 4,
                localized: "Salamèche".into(),
                english: "charmander".into(),
            },
            LocalizedName {
                id: 6,
                localized: "Dracaufeu".into(),
                english: "charizard".into(),
            },
        ],
    )));
    harness.process_emitted();
    harness.assert_state(|s| {
        s.pokedex.search.hits.len() == 1
            && s.pokedex.search.hits[0].localized.as_deref() == Some("Salamèche")
    });
}

#[test]
fn arena_battle_plays_out_turn_by_turn() {
    let mut harness = EffectStoreTestHarness::new(fresh_state(), reducer);
    harness.dispatch_collect(Action::NavigateTo(Screen::Arena));

    let roster: Vec<RosterEntry> = (1..=151)
        .map(|id| RosterEntry {
            id,
            name: format!("mon-{id}"),
        })
        .collect();
    harness.dispatch_collect(Action::RosterDidLoad(roster));
    let effects = harness.drain_effects();
    effects.effects_count(2);
    effects.effects_all_match(|e| {
        matches!(
            e,
            Effect::LoadPokemon {
                target: LoadTarget::Fighter(_),
                ..
            }
        )
    });

    harness.complete_action(Action::PokemonDidLoad {
        target: LoadTarget::Fighter(Side::Left),
        pokemon: pokemon(4, "charmander", &["fire"]),
    });
    harness.complete_action(Action::PokemonDidLoad {
        target: LoadTarget::Fighter(Side::Right),
        pokemon: pokemon(7, "squirtle", &["water"]),
    });
    harness.process_emitted();
    harness.assert_state(|s| s.arena.battle.is_ready());
    harness.assert_state(|s| !s.arena.left_loading && !s.arena.right_loading);

    harness.dispatch_collect(Action::BattleStart);
    let effects = harness.drain_effects();
    assert_eq!(effects, vec![Effect::ScheduleTurn { delay_ms: 800 }]);

    // Picking a new fighter is refused mid-battle.
    harness.dispatch_collect(Action::ArenaConfirmPick);
    harness.drain_effects().effects_empty();

    for _ in 0..40 {
        harness.dispatch_collect(Action::BattleTurn);
    }
    harness.assert_state(|s| matches!(s.arena.battle.phase(), BattlePhase::Resolved { .. }));
    harness.assert_state(|s| s.arena.battle.log().len() == 5);
    harness.assert_state(|s| s.message.as_deref().is_some_and(|m| m.ends_with("wins!")));

    harness.dispatch_collect(Action::BattleReset);
    harness.assert_state(|s| s.arena.battle.phase() == BattlePhase::Idle);
    harness.assert_state(|s| s.arena.battle.log().is_empty());
}

#[test]
fn fighter_load_failure_is_reported() {
    let mut harness = EffectStoreTestHarness::new(fresh_state(), reducer);
    harness.complete_action(Action::PokemonDidError {
        target: LoadTarget::Fighter(Side::Right),
        id: 25,
        error: "timeout".into(),
    });
    harness.process_emitted();
    harness.assert_state(|s| s.message.as_deref() == Some("Could not load fighter #25: timeout"));
    harness.assert_state(|s| !s.arena.right_loading);
}

#[test]
fn theme_toggle_requests_a_save() {
    let mut harness = EffectStoreTestHarness::new(fresh_state(), reducer);
    harness.dispatch_collect(Action::ThemeToggle);
    harness.assert_state(|s| s.theme == Theme::Dark);
    let effects = harness.drain_effects();
    assert_eq!(effects, vec![Effect::SavePrefs { theme: Theme::Dark }]);

    harness.complete_action(Action::PrefsDidError("read-only".into()));
    harness.process_emitted();
    harness.assert_state(|s| s.message.is_some());
}

#[test]
fn global_keys_map_to_actions() {
    let state = fresh_state();
    let mut ui = PokeArenaUi::new();
    let quit = ui.handle_event(&EventKind::Key(key("q")), &state).actions;
    assert_eq!(quit, vec![Action::Quit]);
    let theme = ui.handle_event(&EventKind::Key(key("t")), &state).actions;
    assert_eq!(theme, vec![Action::ThemeToggle]);
    let pokedex = ui.handle_event(&EventKind::Key(key("1")), &state).actions;
    assert_eq!(pokedex, vec![Action::NavigateTo(Screen::Pokedex)]);
}

#[test]
fn search_input_swallows_letter_shortcuts() {
    let mut state = fresh_state();
    state.screen = Screen::Pokedex;
    state.pokedex.search.active = true;
    let mut ui = PokeArenaUi::new();

    let typed = ui.handle_event(&EventKind::Key(key("q")), &state).actions;
    assert_eq!(typed, vec![Action::SearchQueryChange("q".into())]);
    state.pokedex.search.query = "q".into();
    let erased = ui
        .handle_event(&EventKind::Key(press(KeyCode::Backspace)), &state)
        .actions;
    assert_eq!(erased, vec![Action::SearchQueryChange(String::new())]);
    let closed = ui
        .handle_event(&EventKind::Key(press(KeyCode::Esc)), &state)
        .actions;
    assert_eq!(closed, vec![Action::SearchClose]);
}

#[test]
fn arrow_keys_walk_the_pokedex_list() {
    let mut state = fresh_state();
    state.screen = Screen::Pokedex;
    state.pokedex.entries = first_page();
    let mut ui = PokeArenaUi::new();

    let down = ui
        .handle_event(&EventKind::Key(press(KeyCode::Down)), &state)
        .actions;
    assert_eq!(down, vec![Action::PokedexSelect(1)]);
    let last = ui
        .handle_event(&EventKind::Key(press(KeyCode::End)), &state)
        .actions;
    assert_eq!(last, vec![Action::PokedexSelect(3)]);
    let up = ui
        .handle_event(&EventKind::Key(press(KeyCode::Up)), &state)
        .actions;
    assert!(up.is_empty());

    let mut harness = EffectStoreTestHarness::new(state, reducer);
    harness.dispatch_collect(Action::PokedexSelect(3));
    harness.assert_state(|s| s.pokedex.selected_entry().map(|e| e.id) == Some(7));
}

#[test]
fn arena_keys_map_to_actions() {
    let mut state = fresh_state();
    state.screen = Screen::Arena;
    let mut ui = PokeArenaUi::new();
    let pick = ui
        .handle_event(&EventKind::Key(press(KeyCode::Enter)), &state)
        .actions;
    assert_eq!(pick, vec![Action::ArenaConfirmPick]);
    let random = ui.handle_event(&EventKind::Key(key("r")), &state).actions;
    assert_eq!(random, vec![Action::ArenaRandom(Side::Left)]);
    let fight = ui
        .handle_event(&EventKind::Key(press(KeyCode::Char(' '))), &state)
        .actions;
    assert_eq!(fight, vec![Action::BattleStart]);
}

#[test]
fn restored_battle_settles_back_to_idle() {
    let mut state = fresh_state();
    state.screen = Screen::Arena;
    state.arena.battle.select(Side::Left, pokemon(4, "charmander", &["fire"]).to_fighter());
    state.arena.battle.select(Side::Right, pokemon(7, "squirtle", &["water"]).to_fighter());
    state.arena.set_loading(Side::Right, true);

    let mut harness = EffectStoreTestHarness::new(state, reducer);
    harness.dispatch_collect(Action::BattleStart);
    harness.drain_effects();
    harness.assert_state(|s| s.arena.battle.phase() == BattlePhase::Fighting);

    // Snapshot taken mid-battle, as loaded from a state file.
    let mut restored = harness.state().clone();
    restored.settle();
    assert_eq!(restored.arena.battle.phase(), BattlePhase::Idle);
    assert!(restored.arena.battle.is_ready());
    assert!(!restored.arena.is_loading(Side::Right));

    let mut harness = EffectStoreTestHarness::new(restored, reducer);
    harness.dispatch_collect(Action::BattleStart);
    let effects = harness.drain_effects();
    assert_eq!(effects, vec![Effect::ScheduleTurn { delay_ms: 800 }]);
}
