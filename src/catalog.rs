//! Creature catalog client (PokeAPI) with an on-disk response cache

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::creature::Creature;
use crate::error::CatalogError;

pub const DEFAULT_CATALOG_URL: &str = "https://pokeapi.co/api/v2";

/// Highest catalog id drawn for a roster slot.
pub const CATALOG_ID_MAX: u16 = 898;

#[derive(Clone, Debug, Deserialize)]
struct NamedResource {
    name: String,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonResponse {
    name: String,
    stats: Vec<PokemonStatSlot>,
    #[serde(default)]
    moves: Vec<PokemonMoveSlot>,
    sprites: serde_json::Value,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonStatSlot {
    base_stat: u16,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonMoveSlot {
    #[serde(rename = "move")]
    move_info: NamedResource,
}

#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn fetch_creature(&self, id: u16) -> Result<Creature, CatalogError>;
}

pub struct PokeApiCatalog {
    client: reqwest::Client,
    base_url: String,
    cache_root: Option<PathBuf>,
}

impl PokeApiCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            cache_root: None,
        }
    }

    pub fn with_cache(mut self, cache_root: PathBuf) -> Self {
        self.cache_root = Some(cache_root);
        self
    }

    fn creature_url(&self, id: u16) -> String {
        format!("{}/pokemon/{id}", self.base_url.trim_end_matches('/'))
    }

    async fn fetch_bytes_cached(&self, url: &str) -> Result<Vec<u8>, CatalogError> {
        let cache_path = self.cache_root.as_deref().map(|root| cache_path(root, url));
        if let Some(path) = cache_path.as_deref() {
            if let Some(bytes) = read_cache(path).await {
                debug!(url, "catalog cache hit");
                return Ok(bytes);
            }
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Request(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| CatalogError::Request(e.to_string()))?
            .to_vec();
        if let Some(path) = cache_path.as_deref() {
            write_cache(path, &bytes).await;
        }
        Ok(bytes)
    }
}

#[async_trait]
impl CatalogClient for PokeApiCatalog {
    async fn fetch_creature(&self, id: u16) -> Result<Creature, CatalogError> {
        let url = self.creature_url(id);
        let bytes = self.fetch_bytes_cached(&url).await?;
        match decode_creature(&bytes) {
            Ok(creature) => Ok(creature),
            Err(err) => {
                if let Some(root) = self.cache_root.as_deref() {
                    let _ = fs::remove_file(cache_path(root, &url)).await;
                }
                Err(err)
            }
        }
    }
}

/// Decodes a `/pokemon/{id}` body. The first stat is the hit-point stat.
pub fn decode_creature(bytes: &[u8]) -> Result<Creature, CatalogError> {
    let response: PokemonResponse =
        serde_json::from_slice(bytes).map_err(|e| CatalogError::Decode(e.to_string()))?;
    let hit_points = response
        .stats
        .first()
        .map(|slot| slot.base_stat)
        .ok_or_else(|| CatalogError::Decode(format!("{} has no stats", response.name)))?;
    if hit_points == 0 {
        return Err(CatalogError::Decode(format!(
            "{} has a zero hit-point stat",
            response.name
        )));
    }

    Ok(Creature {
        name: response.name,
        sprite_url: pointer_string(&response.sprites, "/front_default"),
        hit_points,
        max_hit_points: hit_points,
        moves: response
            .moves
            .into_iter()
            .map(|slot| slot.move_info.name)
            .collect(),
    })
}

pub fn draw_catalog_ids<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<u16> {
    (0..count)
        .map(|_| rng.random_range(1..=CATALOG_ID_MAX))
        .collect()
}

/// Fetches every id concurrently and returns the creatures in the order of
/// `ids`. The first failure wins; remaining requests are aborted when the
/// join set is dropped.
pub async fn fetch_all(
    catalog: Arc<dyn CatalogClient>,
    ids: Vec<u16>,
) -> Result<Vec<Creature>, CatalogError> {
    let mut join_set = JoinSet::new();
    for (slot, id) in ids.iter().copied().enumerate() {
        let catalog = catalog.clone();
        join_set.spawn(async move { (slot, id, catalog.fetch_creature(id).await) });
    }

    let mut creatures: Vec<Option<Creature>> = vec![None; ids.len()];
    while let Some(joined) = join_set.join_next().await {
        let (slot, id, result) =
            joined.map_err(|e| CatalogError::Request(format!("fetch task failed: {e}")))?;
        match result {
            Ok(creature) => creatures[slot] = Some(creature),
            Err(err) => {
                warn!(id, error = %err, "catalog fetch failed");
                return Err(err);
            }
        }
    }

    creatures
        .into_iter()
        .map(|creature| creature.ok_or_else(|| CatalogError::Request("missing creature".into())))
        .collect()
}

pub fn default_cache_root() -> PathBuf {
    let base = std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));
    base.join(".cache").join("pokeduel").join("http")
}

fn pointer_string(value: &serde_json::Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}

fn cache_path(root: &Path, url: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = hex::encode(hasher.finalize());
    root.join(digest)
}

async fn read_cache(path: &Path) -> Option<Vec<u8>> {
    fs::read(path).await.ok()
}

async fn write_cache(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent).await;
    }
    let _ = fs::write(path, bytes).await;
}
