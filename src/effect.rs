use crate::prefs::Theme;
use crate::state::LoadTarget;

/// Side effects requested by the reducer.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadModels,
    LoadNameIndex { lang: String },
    LoadPage { offset: u16, limit: u16 },
    LoadRoster { size: u16 },
    LoadPokemon { target: LoadTarget, id: u16 },
    LoadSpecies { id: u16 },
    LoadEvolution { id: u16, url: String },
    /// Dispatch `BattleTurn` after the delay; replaces any pending turn.
    ScheduleTurn { delay_ms: u64 },
    SavePrefs { theme: Theme },
}
