//! Pokédex listing: paging, type filter and incremental search.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::lookup::{NameIndex, MIN_QUERY_LEN};
use crate::pokemon::PokemonSummary;

pub const DEFAULT_PAGE_SIZE: u16 = 50;
/// Paging stops once the offset reaches this value.
pub const OFFSET_LIMIT: u16 = 1010;
pub const CATALOG_HITS: usize = 8;
pub const MAX_SEARCH_HITS: usize = 10;

pub const TYPES: [&str; 18] = [
    "fire", "water", "grass", "electric", "ice", "fighting", "poison", "ground", "flying",
    "psychic", "bug", "rock", "ghost", "dragon", "dark", "steel", "fairy", "normal",
];

pub fn can_load_more(offset: u16) -> bool {
    offset < OFFSET_LIMIT
}

/// Next filter in `all -> fire -> ... -> normal -> all` order, or the reverse.
pub fn cycle_type(current: Option<&str>, forward: bool) -> Option<String> {
    let position = current.and_then(|name| TYPES.iter().position(|ty| *ty == name));
    let next = match (position, forward) {
        (None, true) => Some(0),
        (None, false) => Some(TYPES.len() - 1),
        (Some(index), true) if index + 1 < TYPES.len() => Some(index + 1),
        (Some(index), false) if index > 0 => Some(index - 1),
        _ => None,
    };
    next.map(|index| TYPES[index].to_string())
}

pub fn filter_by_type<'a>(
    entries: &'a [PokemonSummary],
    type_filter: Option<&str>,
) -> Vec<&'a PokemonSummary> {
    match type_filter {
        None => entries.iter().collect(),
        Some(type_name) => entries
            .iter()
            .filter(|entry| entry.has_type(type_name))
            .collect(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchHit {
    pub id: u16,
    pub name: String,
    /// Present when the hit came from the localized name index.
    pub localized: Option<String>,
}

/// Catalog matches first (name or id, at most eight), then localized name
/// matches not already listed, ten hits in total.
pub fn search(entries: &[PokemonSummary], names: Option<&NameIndex>, query: &str) -> Vec<SearchHit> {
    let query = query.trim().to_lowercase();
    if query.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }

    let mut hits: Vec<SearchHit> = entries
        .iter()
        .filter(|entry| {
            entry.name.to_lowercase().contains(&query) || entry.id.to_string().contains(&query)
        })
        .take(CATALOG_HITS)
        .map(|entry| SearchHit {
            id: entry.id,
            name: entry.name.clone(),
            localized: None,
        })
        .collect();

    if let Some(names) = names {
        for name in names.search(&query) {
            if hits.len() >= MAX_SEARCH_HITS {
                break;
            }
            if hits.iter().any(|hit| hit.id == name.id) {
                continue;
            }
            hits.push(SearchHit {
                id: name.id,
                name: name.english.clone(),
                localized: Some(name.localized.clone()),
            });
        }
    }
    hits
}
