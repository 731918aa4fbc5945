//! Background gameplay footage.
//!
//! The catalog (game -> source URLs) is read-only configuration. Local copies
//! are tracked in a separate [`FootageCache`] file mapping `<game>/<key>` to a
//! downloaded path, so resolving footage never rewrites configuration.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use shorts_models::BackgroundGame;

use crate::download::{download_to, DownloadOptions};
use crate::error::{MediaError, MediaResult};

/// One downloadable gameplay video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootageSource {
    pub key: String,
    pub url: String,
}

impl FootageSource {
    pub fn new(key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            url: url.into(),
        }
    }
}

/// Immutable mapping from game to its footage sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootageCatalog {
    games: BTreeMap<BackgroundGame, Vec<FootageSource>>,
}

impl Default for FootageCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FootageCatalog {
    /// The stock catalog.
    pub fn builtin() -> Self {
        let mut games = BTreeMap::new();
        games.insert(
            BackgroundGame::SubwaySurfers,
            vec![
                FootageSource::new("vid1", "https://www.youtube.com/watch?v=PtyvtyIs1So"),
                FootageSource::new("vid2", "https://www.youtube.com/watch?v=HTMDNZOlUq4"),
            ],
        );
        games.insert(
            BackgroundGame::TempleRun,
            vec![
                FootageSource::new("vid1", "https://www.youtube.com/watch?v=fuQf-iGCmKA"),
                FootageSource::new("vid2", "https://www.youtube.com/watch?v=m-ioG4KEVyc"),
            ],
        );
        games.insert(
            BackgroundGame::GeometryDash,
            vec![
                FootageSource::new("vid1", "https://www.youtube.com/watch?v=xu1wRfUHtKg"),
                FootageSource::new("vid2", "https://www.youtube.com/watch?v=PnKGb6MR9No"),
                FootageSource::new("vid3", "https://www.youtube.com/watch?v=gok5ShDXxg4"),
            ],
        );
        Self { games }
    }

    /// Load a catalog from a JSON file of the form
    /// `{"games": {"subway_surfers": [{"key": "...", "url": "..."}]}}`.
    pub async fn load(path: impl AsRef<Path>) -> MediaResult<Self> {
        let data = tokio::fs::read(path.as_ref()).await?;
        Ok(serde_json::from_slice(&data)?)
    }

    pub fn sources(&self, game: BackgroundGame) -> &[FootageSource] {
        self.games.get(&game).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Games with at least one source.
    pub fn games(&self) -> Vec<BackgroundGame> {
        self.games
            .iter()
            .filter(|(_, sources)| !sources.is_empty())
            .map(|(game, _)| *game)
            .collect()
    }

    /// Pick a random source, optionally restricted to one game.
    pub fn choose<R: Rng>(
        &self,
        game: Option<BackgroundGame>,
        rng: &mut R,
    ) -> MediaResult<(BackgroundGame, FootageSource)> {
        let game = match game {
            Some(game) => game,
            None => *self
                .games()
                .choose(rng)
                .ok_or_else(|| MediaError::footage_unavailable("catalog is empty"))?,
        };

        let source = self
            .sources(game)
            .choose(rng)
            .ok_or_else(|| MediaError::footage_unavailable(format!("no footage for game '{}'", game)))?;

        info!(
            game = %game,
            footage = %source.key,
            candidates = self.sources(game).len(),
            "Background footage selected"
        );
        Ok((game, source.clone()))
    }
}

/// Persistent `<game>/<key>` -> local path map.
#[derive(Debug, Clone, Default)]
pub struct FootageCache {
    path: PathBuf,
    entries: BTreeMap<String, PathBuf>,
}

fn cache_key(game: BackgroundGame, key: &str) -> String {
    format!("{}/{}", game, key)
}

impl FootageCache {
    /// Load the cache file. A missing file gives an empty cache; a corrupt
    /// one is logged and ignored.
    pub async fn load(path: impl Into<PathBuf>) -> MediaResult<Self> {
        let path = path.into();
        let entries = match tokio::fs::read(&path).await {
            Ok(data) => match serde_json::from_slice(&data) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Footage cache is corrupt, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, entries })
    }

    /// Write the cache back to its file.
    pub async fn save(&self) -> MediaResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(&self.entries)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Cached path, only if the file is still on disk.
    pub fn get(&self, game: BackgroundGame, key: &str) -> Option<&Path> {
        self.entries
            .get(&cache_key(game, key))
            .map(PathBuf::as_path)
            .filter(|p| p.is_file())
    }

    pub fn insert(&mut self, game: BackgroundGame, key: &str, path: impl Into<PathBuf>) {
        self.entries.insert(cache_key(game, key), path.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves catalog entries to local files, downloading on a cache miss.
pub struct FootageResolver {
    catalog: FootageCatalog,
    cache: FootageCache,
    footage_dir: PathBuf,
    download: DownloadOptions,
}

impl FootageResolver {
    pub fn new(catalog: FootageCatalog, cache: FootageCache, footage_dir: impl Into<PathBuf>) -> Self {
        Self {
            catalog,
            cache,
            footage_dir: footage_dir.into(),
            download: DownloadOptions::default(),
        }
    }

    pub fn with_download_options(mut self, options: DownloadOptions) -> Self {
        self.download = options;
        self
    }

    pub fn catalog(&self) -> &FootageCatalog {
        &self.catalog
    }

    /// Local path for a chosen source.
    pub async fn fetch(&mut self, game: BackgroundGame, source: &FootageSource) -> MediaResult<PathBuf> {
        if let Some(path) = self.cache.get(game, &source.key) {
            info!(game = %game, path = %path.display(), "Using cached footage");
            return Ok(path.to_path_buf());
        }

        let target = self
            .footage_dir
            .join(game.as_str())
            .join(format!("{}.mp4", source.key));
        info!(game = %game, url = %source.url, "Footage not cached, downloading");

        download_to(&source.url, &target, &self.download)
            .await
            .map_err(|e| MediaError::footage_unavailable(format!("{} ({})", source.url, e)))?;

        self.cache.insert(game, &source.key, &target);
        if let Err(e) = self.cache.save().await {
            warn!(error = %e, "Failed to persist footage cache");
        }
        Ok(target)
    }

    /// Choose and fetch footage in one call.
    pub async fn resolve<R: Rng>(&mut self, game: Option<BackgroundGame>, rng: &mut R) -> MediaResult<PathBuf> {
        let (game, source) = self.catalog.choose(game, rng)?;
        self.fetch(game, &source).await
    }
}
