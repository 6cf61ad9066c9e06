use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::battle::{Battle, SeededDice, Side};
use crate::catalog::{self, SearchHit, DEFAULT_PAGE_SIZE};
use crate::evolution::EvolutionStage;
use crate::lookup::{ModelCatalog, NameIndex};
use crate::pokemon::{PokemonSummary, RosterEntry, SpeciesInfo};
use crate::prefs::Theme;

pub const SHOWCASE_LEFT: u16 = 149;
pub const SHOWCASE_RIGHT: u16 = 6;
pub const HOME_ITEMS: [&str; 2] = ["Pokédex", "Battle Arena"];
pub const FLASH_TICKS: u8 = 4;
pub const DEFAULT_TURN_DELAY_MS: u64 = 800;
pub const DEFAULT_ROSTER_SIZE: u16 = 151;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Screen {
    #[default]
    Home,
    Pokedex,
    Arena,
}

impl Screen {
    pub fn title(self) -> &'static str {
        match self {
            Screen::Home => "Home",
            Screen::Pokedex => "Pokédex",
            Screen::Arena => "Battle Arena",
        }
    }
}

/// Where a fetched Pokémon record should land.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum LoadTarget {
    Showcase(Side),
    Detail,
    Fighter(Side),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Settings {
    pub turn_delay_ms: u64,
    pub page_size: u16,
    pub roster_size: u16,
    pub name_lang: String,
    pub name_index_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            turn_delay_ms: DEFAULT_TURN_DELAY_MS,
            page_size: DEFAULT_PAGE_SIZE,
            roster_size: DEFAULT_ROSTER_SIZE,
            name_lang: "fr".to_string(),
            name_index_enabled: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct HomeState {
    pub selected: usize,
    pub showcase_left: DataResource<PokemonSummary>,
    pub showcase_right: DataResource<PokemonSummary>,
}

impl Default for HomeState {
    fn default() -> Self {
        Self {
            selected: 0,
            showcase_left: DataResource::Empty,
            showcase_right: DataResource::Empty,
        }
    }
}

impl HomeState {
    pub fn showcase(&self, side: Side) -> &DataResource<PokemonSummary> {
        match side {
            Side::Left => &self.showcase_left,
            Side::Right => &self.showcase_right,
        }
    }

    pub fn showcase_mut(&mut self, side: Side) -> &mut DataResource<PokemonSummary> {
        match side {
            Side::Left => &mut self.showcase_left,
            Side::Right => &mut self.showcase_right,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchState {
    pub active: bool,
    pub query: String,
    pub hits: Vec<SearchHit>,
    pub selected: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PokedexState {
    pub entries: Vec<PokemonSummary>,
    /// Offset of the next page to request.
    pub offset: u16,
    pub loading: bool,
    pub loading_more: bool,
    pub error: Option<String>,
    pub type_filter: Option<String>,
    pub selected: usize,
    pub search: SearchState,
}

impl PokedexState {
    pub fn visible(&self) -> Vec<&PokemonSummary> {
        catalog::filter_by_type(&self.entries, self.type_filter.as_deref())
    }

    pub fn selected_entry(&self) -> Option<&PokemonSummary> {
        self.visible().get(self.selected).copied()
    }

    pub fn find(&self, id: u16) -> Option<&PokemonSummary> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn can_load_more(&self) -> bool {
        !self.loading && !self.loading_more && catalog::can_load_more(self.offset)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct DetailState {
    pub id: u16,
    pub pokemon: DataResource<PokemonSummary>,
    pub species: DataResource<SpeciesInfo>,
    pub evolution: DataResource<Vec<EvolutionStage>>,
    pub evolution_selected: usize,
}

impl DetailState {
    pub fn new(id: u16) -> Self {
        Self {
            id,
            pokemon: DataResource::Empty,
            species: DataResource::Empty,
            evolution: DataResource::Empty,
            evolution_selected: 0,
        }
    }

    pub fn stages(&self) -> &[EvolutionStage] {
        self.evolution.data().map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Defender highlight after a hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Flash {
    pub side: Side,
    pub ticks: u8,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct ArenaState {
    pub roster: DataResource<Vec<RosterEntry>>,
    pub focus: Side,
    pub left_pick: usize,
    pub right_pick: usize,
    pub left_loading: bool,
    pub right_loading: bool,
    pub left_info: Option<PokemonSummary>,
    pub right_info: Option<PokemonSummary>,
    pub battle: Battle,
    pub flash: Option<Flash>,
}

impl Default for ArenaState {
    fn default() -> Self {
        Self {
            roster: DataResource::Empty,
            focus: Side::Left,
            left_pick: 0,
            right_pick: 0,
            left_loading: false,
            right_loading: false,
            left_info: None,
            right_info: None,
            battle: Battle::new(),
            flash: None,
        }
    }
}

impl ArenaState {
    pub fn roster_len(&self) -> usize {
        self.roster.data().map(Vec::len).unwrap_or(0)
    }

    pub fn pick(&self, side: Side) -> usize {
        match side {
            Side::Left => self.left_pick,
            Side::Right => self.right_pick,
        }
    }

    pub fn set_pick(&mut self, side: Side, index: usize) {
        match side {
            Side::Left => self.left_pick = index,
            Side::Right => self.right_pick = index,
        }
    }

    pub fn picked_entry(&self, side: Side) -> Option<&RosterEntry> {
        self.roster.data()?.get(self.pick(side))
    }

    pub fn is_loading(&self, side: Side) -> bool {
        match side {
            Side::Left => self.left_loading,
            Side::Right => self.right_loading,
        }
    }

    pub fn set_loading(&mut self, side: Side, loading: bool) {
        match side {
            Side::Left => self.left_loading = loading,
            Side::Right => self.right_loading = loading,
        }
    }

    pub fn info(&self, side: Side) -> Option<&PokemonSummary> {
        match side {
            Side::Left => self.left_info.as_ref(),
            Side::Right => self.right_info.as_ref(),
        }
    }

    pub fn set_info(&mut self, side: Side, info: PokemonSummary) {
        match side {
            Side::Left => self.left_info = Some(info),
            Side::Right => self.right_info = Some(info),
        }
    }

    pub fn is_flashing(&self, side: Side) -> bool {
        self.flash.is_some_and(|flash| flash.side == side)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub screen: Screen,
    pub theme: Theme,
    pub settings: Settings,
    pub home: HomeState,
    pub models: DataResource<ModelCatalog>,
    pub names: DataResource<NameIndex>,
    pub pokedex: PokedexState,
    pub detail: Option<DetailState>,
    pub arena: ArenaState,
    pub message: Option<String>,
    pub tick: u64,
    pub dice: SeededDice,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Settings::default(), Theme::default(), SeededDice::from_time())
    }
}

impl AppState {
    pub fn new(settings: Settings, theme: Theme, dice: SeededDice) -> Self {
        Self {
            terminal_size: (80, 24),
            screen: Screen::Home,
            theme,
            settings,
            home: HomeState::default(),
            models: DataResource::Empty,
            names: DataResource::Empty,
            pokedex: PokedexState::default(),
            detail: None,
            arena: ArenaState::default(),
            message: None,
            tick: 0,
            dice,
        }
    }

    /// Drops in-flight work that no pending task will finish, such as a
    /// battle or fighter fetch captured in a restored snapshot.
    pub fn settle(&mut self) {
        if self.arena.battle.abort() {
            tracing::info!("restored a battle in progress, back to idle");
        }
        self.arena.flash = None;
        self.arena.set_loading(Side::Left, false);
        self.arena.set_loading(Side::Right, false);
    }

    pub fn localized_name(&self, id: u16) -> Option<&str> {
        self.names
            .data()?
            .get(id)
            .map(|name| name.localized.as_str())
    }

    pub fn model_url(&self, id: u16) -> Option<&str> {
        self.models
            .data()?
            .model_for(id)
            .and_then(|form| form.model.as_deref())
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        let mut sections = vec![
            DebugSection::new("App")
                .entry("screen", ron_string(&self.screen))
                .entry("theme", ron_string(&self.theme))
                .entry("message", ron_string(&self.message))
                .entry("models", ron_string(&self.models.data().map(ModelCatalog::len)))
                .entry("names", ron_string(&self.names.data().map(NameIndex::len))),
            DebugSection::new("Pokedex")
                .entry("entries", ron_string(&self.pokedex.entries.len()))
                .entry("offset", ron_string(&self.pokedex.offset))
                .entry("type_filter", ron_string(&self.pokedex.type_filter))
                .entry("search", ron_string(&self.pokedex.search.query)),
            DebugSection::new("Arena")
                .entry("phase", ron_string(&self.arena.battle.phase()))
                .entry("turn", ron_string(&self.arena.battle.turn()))
                .entry("focus", ron_string(&self.arena.focus))
                .entry("flash", ron_string(&self.arena.flash)),
        ];

        if let Some(detail) = &self.detail {
            sections.push(
                DebugSection::new("Detail")
                    .entry("id", ron_string(&detail.id))
                    .entry("evolution_selected", ron_string(&detail.evolution_selected)),
            );
        }

        sections
    }
}
