//! Pokémon records as the app keeps them, plus display formatting.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::battle::Fighter;

const ARTWORK_BASE: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StatEntry {
    pub name: String,
    pub value: u16,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AbilityEntry {
    pub name: String,
    pub hidden: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PokemonSummary {
    pub id: u16,
    pub name: String,
    pub types: Vec<String>,
    pub stats: Vec<StatEntry>,
    pub abilities: Vec<AbilityEntry>,
    /// Decimetres.
    pub height: u16,
    /// Hectograms.
    pub weight: u16,
    pub base_experience: Option<u16>,
    pub artwork_url: Option<String>,
    pub species_url: Option<String>,
}

impl PokemonSummary {
    pub fn stat(&self, name: &str) -> Option<u16> {
        self.stats
            .iter()
            .find(|stat| stat.name == name)
            .map(|stat| stat.value)
    }

    pub fn has_type(&self, type_name: &str) -> bool {
        self.types.iter().any(|slot| slot == type_name)
    }

    pub fn primary_type(&self) -> Option<&str> {
        self.types.first().map(String::as_str)
    }

    pub fn display_name(&self) -> String {
        format_name(&self.name)
    }

    pub fn artwork(&self) -> String {
        self.artwork_url
            .clone()
            .unwrap_or_else(|| artwork_url(self.id))
    }

    pub fn to_fighter(&self) -> Fighter {
        Fighter::new(
            self.id,
            self.display_name(),
            self.stat("attack"),
            self.stat("defense"),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ForeignName {
    pub lang: String,
    pub name: String,
}

/// Species data shown in the detail modal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SpeciesInfo {
    pub id: u16,
    pub genus: Option<String>,
    pub evolution_chain_url: Option<String>,
    pub names: Vec<ForeignName>,
}

impl SpeciesInfo {
    pub fn name_in(&self, lang: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|name| name.lang == lang)
            .map(|name| name.name.as_str())
    }
}

/// Arena roster slot; ids follow the national dex order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RosterEntry {
    pub id: u16,
    pub name: String,
}

pub fn artwork_url(id: u16) -> String {
    format!("{ARTWORK_BASE}/{id}.png")
}

pub fn format_id(id: u16) -> String {
    format!("#{id:03}")
}

pub fn format_name(name: &str) -> String {
    name.split('-')
        .filter(|part| !part.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

pub fn format_stat_name(name: &str) -> String {
    match name {
        "hp" => "HP".to_string(),
        "attack" => "Attack".to_string(),
        "defense" => "Defense".to_string(),
        "special-attack" => "Sp. Atk".to_string(),
        "special-defense" => "Sp. Def".to_string(),
        "speed" => "Speed".to_string(),
        other => other.to_string(),
    }
}

pub fn ability_label(ability: &AbilityEntry) -> String {
    let name = ability.name.replacen('-', " ", 1);
    if ability.hidden {
        format!("{name} (hidden)")
    } else {
        name
    }
}

pub fn format_height(decimetres: u16) -> String {
    format!("{:.1} m", f64::from(decimetres) / 10.0)
}

pub fn format_weight(hectograms: u16) -> String {
    format!("{:.1} kg", f64::from(hectograms) / 10.0)
}
