//! Lookup tables loaded once at startup and owned by the app state.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const MIN_QUERY_LEN: usize = 2;
pub const NAME_SEARCH_LIMIT: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModelForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub form_name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ModelEntry {
    pub id: u16,
    #[serde(default)]
    pub forms: Vec<ModelForm>,
}

/// Known 3D models, keyed by Pokémon id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ModelCatalog {
    entries: Vec<ModelEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModelPayload {
    Wrapped { pokemon: Vec<ModelEntry> },
    Bare(Vec<ModelEntry>),
}

impl ModelCatalog {
    pub fn new(entries: Vec<ModelEntry>) -> Self {
        Self { entries }
    }

    /// Accepts both `{ "pokemon": [...] }` and a bare array.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let entries = match serde_json::from_slice::<ModelPayload>(bytes)? {
            ModelPayload::Wrapped { pokemon } => pokemon,
            ModelPayload::Bare(entries) => entries,
        };
        Ok(Self::new(entries))
    }

    /// The `regular` form when present, otherwise the first form.
    pub fn model_for(&self, id: u16) -> Option<&ModelForm> {
        let entry = self.entries.iter().find(|entry| entry.id == id)?;
        entry
            .forms
            .iter()
            .find(|form| form.form_name.as_deref() == Some("regular"))
            .or_else(|| entry.forms.first())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LocalizedName {
    pub id: u16,
    pub localized: String,
    pub english: String,
}

/// Localized species names, sorted by id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NameIndex {
    lang: String,
    names: Vec<LocalizedName>,
}

impl NameIndex {
    pub fn new(lang: impl Into<String>, mut names: Vec<LocalizedName>) -> Self {
        names.sort_by_key(|name| name.id);
        Self {
            lang: lang.into(),
            names,
        }
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, id: u16) -> Option<&LocalizedName> {
        self.names
            .binary_search_by_key(&id, |name| name.id)
            .ok()
            .map(|index| &self.names[index])
    }

    /// Case- and accent-insensitive substring search on the localized name.
    pub fn search(&self, query: &str) -> Vec<&LocalizedName> {
        if query.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }
        let needle = fold(query);
        self.names
            .iter()
            .filter(|name| fold(&name.localized).contains(&needle))
            .take(NAME_SEARCH_LIMIT)
            .collect()
    }
}

/// Lowercases and strips Latin diacritics.
pub fn fold(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(strip_accent)
        .collect()
}

fn strip_accent(ch: char) -> char {
    match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'ī' => 'i',
        'ñ' | 'ń' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ō' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' => 'u',
        'ý' | 'ÿ' => 'y',
        'ß' => 's',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn index() -> NameIndex {
        let names = [
            (7, "Carapuce", "squirtle"),
            (4, "Salamèche", "charmander"),
            (5, "Reptincel", "charmeleon"),
            (25, "Pikachu", "pikachu"),
            (6, "Dracaufeu", "charizard"),
        ];
        NameIndex::new(
            "fr",
            names
                .into_iter()
                .map(|(id, localized, english)| LocalizedName {
                    id,
                    localized: localized.into(),
                    english: english.into(),
                })
                .collect(),
        )
    }

    #[test]
    fn search_ignores_case_and_accents() {
        let index = index();
        let hits: Vec<u16> = index.search("SALAME").iter().map(|n| n.id).collect();
        assert_eq!(hits, vec![4]);
        let hits: Vec<u16> = index.search("salamè").iter().map(|n| n.id).collect();
        assert_eq!(hits, vec![4]);
    }

    #[test]
    fn short_queries_return_nothing() {
        assert!(index().search("p").is_empty());
        assert!(index().search("").is_empty());
    }

    #[test]
    fn search_results_follow_id_order_and_cap() {
        let index = index();
        let hits: Vec<u16> = index.search("c").iter().map(|n| n.id).collect();
        assert!(hits.is_empty());
        let hits: Vec<u16> = index.search("ce").iter().map(|n| n.id).collect();
        assert_eq!(hits, vec![5, 7]);

        let many = NameIndex::new(
            "fr",
            (1..=30)
                .map(|id| LocalizedName {
                    id,
                    localized: format!("Nom{id}"),
                    english: format!("name{id}"),
                })
                .collect(),
        );
        assert_eq!(many.search("nom").len(), NAME_SEARCH_LIMIT);
        assert_eq!(many.get(12).map(|n| n.english.as_str()), Some("name12"));
    }

    #[test]
    fn model_lookup_prefers_regular_form() {
        let json = br#"{"pokemon":[{"id":6,"forms":[
            {"name":"Mega Charizard X","formName":"mega-x","model":"x.glb"},
            {"name":"Charizard","formName":"regular","model":"regular.glb"}
        ]},{"id":25,"forms":[{"name":"Pikachu","formName":"cap","model":"cap.glb"}]}]}"#;
        let catalog = ModelCatalog::from_json(json).expect("wrapped payload");

        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.model_for(6).and_then(|f| f.model.as_deref()),
            Some("regular.glb")
        );
        assert_eq!(
            catalog.model_for(25).and_then(|f| f.model.as_deref()),
            Some("cap.glb")
        );
        assert_eq!(catalog.model_for(150), None);
    }

    #[test]
    fn model_catalog_accepts_bare_array() {
        let json = br#"[{"id":1,"forms":[]}]"#;
        let catalog = ModelCatalog::from_json(json).expect("bare payload");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.model_for(1), None);
    }
}
