use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::pokemon::artwork_url;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EvolutionStage {
    pub id: u16,
    pub name: String,
    pub image: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SpeciesRef {
    pub name: String,
    pub url: String,
}

/// One node of the provider's evolution tree.
#[derive(Clone, Debug, Deserialize)]
pub struct ChainLink {
    pub species: SpeciesRef,
    #[serde(default)]
    pub evolves_to: Vec<ChainLink>,
}

/// Pre-order walk: the node itself, then each branch in order.
pub fn flatten_chain(link: &ChainLink) -> Vec<EvolutionStage> {
    let mut stages = Vec::new();
    collect_stages(link, &mut stages);
    stages
}

fn collect_stages(link: &ChainLink, stages: &mut Vec<EvolutionStage>) {
    if let Some(id) = id_from_url(&link.species.url) {
        stages.push(EvolutionStage {
            id,
            name: link.species.name.clone(),
            image: artwork_url(id),
        });
    }
    for next in &link.evolves_to {
        collect_stages(next, stages);
    }
}

/// Last non-empty path segment of a resource URL, parsed as an id.
pub fn id_from_url(url: &str) -> Option<u16> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
}

pub fn is_displayable(stages: &[EvolutionStage]) -> bool {
    stages.len() > 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn link(name: &str, id: u16, evolves_to: Vec<ChainLink>) -> ChainLink {
        ChainLink {
            species: SpeciesRef {
                name: name.into(),
                url: format!("https://pokeapi.co/api/v2/pokemon-species/{id}/"),
            },
            evolves_to,
        }
    }

    #[test]
    fn branching_chain_is_walked_pre_order() {
        let chain = link(
            "eevee",
            133,
            vec![
                link("vaporeon", 134, vec![]),
                link("jolteon", 135, vec![]),
                link("flareon", 136, vec![]),
            ],
        );
        let names: Vec<String> = flatten_chain(&chain).into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["eevee", "vaporeon", "jolteon", "flareon"]);
    }

    #[test]
    fn nested_chain_keeps_depth_order() {
        let chain = link(
            "bulbasaur",
            1,
            vec![link("ivysaur", 2, vec![link("venusaur", 3, vec![])])],
        );
        let ids: Vec<u16> = flatten_chain(&chain).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(is_displayable(&flatten_chain(&chain)));
    }

    #[test]
    fn single_stage_chain_is_not_displayed() {
        let stages = flatten_chain(&link("tauros", 128, vec![]));
        assert_eq!(stages.len(), 1);
        assert!(!is_displayable(&stages));
    }

    #[test]
    fn ids_come_from_trailing_segment() {
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon-species/25/"), Some(25));
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon-species/25"), Some(25));
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon-species/"), None);
    }
}
