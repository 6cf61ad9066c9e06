use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::ApiError;
use crate::evolution::{flatten_chain, id_from_url, ChainLink, EvolutionStage};
use crate::lookup::{LocalizedName, ModelCatalog, NameIndex};
use crate::pokemon::{AbilityEntry, ForeignName, PokemonSummary, RosterEntry, SpeciesInfo, StatEntry};

const API_BASE: &str = "https://pokeapi.co/api/v2";
const MODELS_URL: &str = "https://pokemon-3d-api.onrender.com/v1/pokemon";
const SPECIES_LIST_LIMIT: u16 = 1500;
const FETCH_CONCURRENCY: usize = 12;

#[derive(Clone, Debug, Deserialize)]
struct NamedResource {
    name: String,
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct ListResponse {
    results: Vec<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonResponse {
    id: u16,
    name: String,
    #[serde(default)]
    height: u16,
    #[serde(default)]
    weight: u16,
    base_experience: Option<u16>,
    types: Vec<PokemonTypeSlot>,
    stats: Vec<PokemonStatSlot>,
    abilities: Vec<PokemonAbilitySlot>,
    #[serde(default)]
    sprites: serde_json::Value,
    species: Option<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonTypeSlot {
    #[serde(rename = "type")]
    type_info: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonStatSlot {
    base_stat: u16,
    stat: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonAbilitySlot {
    ability: NamedResource,
    #[serde(default)]
    is_hidden: bool,
}

#[derive(Clone, Debug, Deserialize)]
struct SpeciesResponse {
    id: u16,
    #[serde(default)]
    names: Vec<SpeciesName>,
    #[serde(default)]
    genera: Vec<GenusEntry>,
    evolution_chain: Option<ApiResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct SpeciesName {
    name: String,
    language: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct GenusEntry {
    genus: String,
    language: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct ApiResource {
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct EvolutionChainResponse {
    chain: ChainLink,
}

/// HTTP client with an on-disk response cache keyed by URL digest.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    cache_dir: PathBuf,
}

pub fn default_cache_dir() -> PathBuf {
    dirs_next::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("pokearena")
}

impl ApiClient {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            http: reqwest::Client::new(),
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub async fn list(&self, limit: u16, offset: u16) -> Result<Vec<(String, String)>, ApiError> {
        let url = format!("{API_BASE}/pokemon?limit={limit}&offset={offset}");
        let response: ListResponse = self.fetch_json_cached(&url).await?;
        Ok(response
            .results
            .into_iter()
            .map(|entry| (entry.name, entry.url))
            .collect())
    }

    /// `key` is a dex number or a lowercase name.
    pub async fn pokemon(&self, key: &str) -> Result<PokemonSummary, ApiError> {
        let url = format!("{API_BASE}/pokemon/{}", key.trim().to_lowercase());
        let response: PokemonResponse = self.fetch_json_cached(&url).await?;
        Ok(summary_from_response(response))
    }

    /// One catalog page with full records, in list order.
    pub async fn page(&self, limit: u16, offset: u16) -> Result<Vec<PokemonSummary>, ApiError> {
        let names: Vec<String> = self
            .list(limit, offset)
            .await?
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        let fetched = self
            .fetch_all(names, |client, name| async move { client.pokemon(&name).await })
            .await;

        let mut pokemon = Vec::with_capacity(fetched.len());
        for (index, result) in fetched {
            pokemon.push((index, result?));
        }
        pokemon.sort_by_key(|(index, _)| *index);
        tracing::debug!(offset, count = pokemon.len(), "loaded catalog page");
        Ok(pokemon.into_iter().map(|(_, entry)| entry).collect())
    }

    pub async fn species(&self, id: u16) -> Result<SpeciesInfo, ApiError> {
        let url = format!("{API_BASE}/pokemon-species/{id}");
        self.species_at(&url).await
    }

    async fn species_at(&self, url: &str) -> Result<SpeciesInfo, ApiError> {
        let response: SpeciesResponse = self.fetch_json_cached(url).await?;
        let genus = response
            .genera
            .iter()
            .find(|entry| entry.language.name == "en")
            .map(|entry| entry.genus.clone());
        Ok(SpeciesInfo {
            id: response.id,
            genus,
            evolution_chain_url: response.evolution_chain.map(|chain| chain.url),
            names: response
                .names
                .into_iter()
                .map(|name| ForeignName {
                    lang: name.language.name,
                    name: name.name,
                })
                .collect(),
        })
    }

    pub async fn evolution_chain(&self, url: &str) -> Result<Vec<EvolutionStage>, ApiError> {
        let response: EvolutionChainResponse = self.fetch_json_cached(url).await?;
        Ok(flatten_chain(&response.chain))
    }

    pub async fn models(&self) -> Result<ModelCatalog, ApiError> {
        let bytes = self.fetch_bytes_cached(MODELS_URL).await?;
        match ModelCatalog::from_json(&bytes) {
            Ok(catalog) => {
                tracing::info!(count = catalog.len(), "loaded 3d model catalog");
                Ok(catalog)
            }
            Err(err) => {
                self.evict(MODELS_URL).await;
                Err(err.into())
            }
        }
    }

    /// Localized names for every species; species that fail to load are skipped.
    pub async fn name_index(&self, lang: &str) -> Result<NameIndex, ApiError> {
        let url = format!("{API_BASE}/pokemon-species/?limit={SPECIES_LIST_LIMIT}");
        let response: ListResponse = self.fetch_json_cached(&url).await?;
        let species: Vec<(String, String)> = response
            .results
            .into_iter()
            .map(|entry| (entry.name, entry.url))
            .collect();

        let fetched = self
            .fetch_all(species, |client, (english, url)| async move {
                let info = client.species_at(&url).await?;
                Ok::<_, ApiError>((english, info))
            })
            .await;

        let mut names = Vec::with_capacity(fetched.len());
        let mut skipped = 0usize;
        for (_, result) in fetched {
            match result {
                Ok((english, info)) => {
                    let localized = info.name_in(lang).unwrap_or(&english).to_string();
                    names.push(LocalizedName {
                        id: info.id,
                        localized,
                        english,
                    });
                }
                Err(err) => {
                    skipped += 1;
                    tracing::debug!(%err, "skipping species in name index");
                }
            }
        }
        if names.is_empty() {
            return Err(ApiError::Empty("species name index".to_string()));
        }
        tracing::info!(lang, count = names.len(), skipped, "loaded name index");
        Ok(NameIndex::new(lang, names))
    }

    /// First `size` Pokémon; ids are list positions plus one.
    pub async fn roster(&self, size: u16) -> Result<Vec<RosterEntry>, ApiError> {
        let entries = self.list(size, 0).await?;
        Ok(entries
            .into_iter()
            .enumerate()
            .map(|(index, (name, url))| RosterEntry {
                id: id_from_url(&url).unwrap_or(index as u16 + 1),
                name,
            })
            .collect())
    }

    async fn fetch_all<I, F, Fut, T>(&self, items: Vec<I>, fetch: F) -> Vec<(usize, Result<T, ApiError>)>
    where
        I: Send + 'static,
        F: Fn(ApiClient, I) -> Fut,
        Fut: std::future::Future<Output = Result<T, ApiError>> + Send + 'static,
        T: Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(FETCH_CONCURRENCY));
        let mut join_set = JoinSet::new();
        for (index, item) in items.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            let task = fetch(self.clone(), item);
            join_set.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => task.await,
                    Err(err) => Err(ApiError::Task(err.to_string())),
                };
                (index, result)
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(err) => tracing::warn!(%err, "fetch task panicked"),
            }
        }
        results
    }

    async fn fetch_json_cached<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let bytes = self.fetch_bytes_cached(url).await?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.evict(url).await;
                Err(err.into())
            }
        }
    }

    async fn fetch_bytes_cached(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let cache_path = self.cache_path(url);
        if let Some(bytes) = read_cache(&cache_path).await {
            return Ok(bytes);
        }

        tracing::debug!(url, "fetching");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
            });
        }
        let bytes = response.bytes().await?.to_vec();
        write_cache(&cache_path, &bytes).await;
        Ok(bytes)
    }

    async fn evict(&self, url: &str) {
        tracing::warn!(url, "evicting corrupt cache entry");
        let _ = fs::remove_file(self.cache_path(url)).await;
    }

    fn cache_path(&self, url: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        let digest = hex::encode(hasher.finalize());
        self.cache_dir.join("http").join(digest)
    }
}

fn summary_from_response(response: PokemonResponse) -> PokemonSummary {
    let artwork_url = pointer_string(&response.sprites, "/other/official-artwork/front_default");
    PokemonSummary {
        id: response.id,
        name: response.name,
        types: response
            .types
            .into_iter()
            .map(|slot| slot.type_info.name)
            .collect(),
        stats: response
            .stats
            .into_iter()
            .map(|slot| StatEntry {
                name: slot.stat.name,
                value: slot.base_stat,
            })
            .collect(),
        abilities: response
            .abilities
            .into_iter()
            .map(|slot| AbilityEntry {
                name: slot.ability.name,
                hidden: slot.is_hidden,
            })
            .collect(),
        height: response.height,
        weight: response.weight,
        base_experience: response.base_experience,
        artwork_url,
        species_url: response.species.map(|species| species.url),
    }
}

fn pointer_string(value: &serde_json::Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}

async fn read_cache(path: &Path) -> Option<Vec<u8>> {
    fs::read(path).await.ok()
}

async fn write_cache(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent).await;
    }
    if let Err(err) = fs::write(path, bytes).await {
        tracing::debug!(path = %path.display(), %err, "cache write failed");
    }
}
