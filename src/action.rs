use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::battle::Side;
use crate::evolution::EvolutionStage;
use crate::lookup::{ModelCatalog, NameIndex};
use crate::pokemon::{PokemonSummary, RosterEntry, SpeciesInfo};
use crate::state::{LoadTarget, Screen};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    Init,
    UiTerminalResize(u16, u16),
    UiRender,
    Tick,

    // Navigation
    NavigateTo(Screen),
    NavBack,
    HomeSelect(usize),
    HomeConfirm,

    // Preferences
    ThemeToggle,
    PrefsDidSave,
    PrefsDidError(String),

    // Lookup tables
    ModelsDidLoad(ModelCatalog),
    ModelsDidError(String),
    NamesDidLoad(NameIndex),
    NamesDidError(String),

    // Pokémon records, routed by target
    PokemonDidLoad {
        target: LoadTarget,
        pokemon: PokemonSummary,
    },
    PokemonDidError {
        target: LoadTarget,
        id: u16,
        error: String,
    },

    // Pokédex
    PokedexDidLoad {
        offset: u16,
        entries: Vec<PokemonSummary>,
    },
    PokedexDidError {
        offset: u16,
        error: String,
    },
    PokedexLoadMore,
    PokedexMove(i16),
    PokedexSelect(usize),
    PokedexTypeNext,
    PokedexTypePrev,
    PokedexTypeClear,
    PokedexOpen,

    // Pokédex search
    SearchOpen,
    SearchClose,
    SearchQueryChange(String),
    SearchSelect(usize),
    SearchConfirm,

    // Detail modal
    DetailOpen(u16),
    DetailClose,
    DetailSpeciesDidLoad {
        id: u16,
        species: SpeciesInfo,
    },
    DetailSpeciesDidError {
        id: u16,
        error: String,
    },
    DetailEvolutionDidLoad {
        id: u16,
        stages: Vec<EvolutionStage>,
    },
    DetailEvolutionDidError {
        id: u16,
        error: String,
    },
    EvolutionMove(i16),
    EvolutionSelect(usize),
    EvolutionOpen,

    // Arena
    RosterDidLoad(Vec<RosterEntry>),
    RosterDidError(String),
    ArenaSwitchSide,
    ArenaPickMove(i16),
    ArenaPickSelect(usize),
    ArenaConfirmPick,
    ArenaRandom(Side),
    ArenaRandomBoth,

    // Battle
    BattleStart,
    BattleTurn,
    BattleReset,

    Quit,
}
