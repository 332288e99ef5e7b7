//! Sprite catalog backed by a TOML manifest.
//!
//! The catalog is an explicitly owned cache: it is constructed once at
//! startup, passed by reference to the adapters that draw entities, and its
//! lifecycle ends with the owning context. The core never touches it; the
//! only I/O in this crate is reading the manifest file.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use thiserror::Error;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;
const ALL_SPRITE_KEYS: [SpriteKey; 3] = [
    SpriteKey::RunnerBody,
    SpriteKey::DrifterBody,
    SpriteKey::BoltFlash,
];

/// Logical identifiers for drawable resources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    /// The player-controlled runner.
    RunnerBody,
    /// An autonomous drifter.
    DrifterBody,
    /// The flash drawn at a bolt's impact point.
    BoltFlash,
}

/// Drawable resource resolved from the manifest.
///
/// Carries the source path and the footprint dimensions the simulation uses
/// for entities drawn with this sprite; decoding the image itself is the
/// backend's concern.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteAsset {
    /// Path to the image file, resolved relative to the manifest.
    pub path: PathBuf,
    /// Width of the sprite in world units.
    pub width: u32,
    /// Height of the sprite in world units.
    pub height: u32,
}

/// Failure to resolve a drawable resource for an entity.
///
/// Raised at entity construction time; an entity without a drawable
/// resource must fail fast rather than enter the simulation.
#[derive(Debug, Error, PartialEq)]
pub enum SpriteCatalogError {
    /// No asset registered under the requested key.
    #[error("no sprite registered for {key:?}")]
    MissingSprite {
        /// Key that failed to resolve.
        key: SpriteKey,
    },
}

/// Cache of sprite assets loaded from the manifest.
#[derive(Clone, Debug, Default)]
pub struct SpriteCatalog {
    assets: HashMap<SpriteKey, SpriteAsset>,
}

impl SpriteCatalog {
    /// Loads the default sprite manifest from disk.
    pub fn from_default_manifest() -> Result<Self> {
        Self::from_manifest_path(Self::default_manifest_path())
    }

    /// Loads sprite assets from the manifest located at the provided path.
    pub fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read sprite manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_manifest_contents(&contents, &base)
    }

    /// Parses manifest contents, resolving paths against `base`.
    pub fn from_manifest_contents(contents: &str, base: &Path) -> Result<Self> {
        let assets = parse_manifest(contents, base)?;
        Ok(Self { assets })
    }

    /// Builds a catalog directly from resolved assets.
    #[must_use]
    pub fn from_assets(assets: HashMap<SpriteKey, SpriteAsset>) -> Self {
        Self { assets }
    }

    /// Returns the default manifest path relative to the repository root.
    #[must_use]
    pub fn default_manifest_path() -> PathBuf {
        PathBuf::from("assets/manifest.toml")
    }

    /// Resolves the asset registered under `key`.
    pub fn sprite(&self, key: SpriteKey) -> Result<&SpriteAsset, SpriteCatalogError> {
        self.assets
            .get(&key)
            .ok_or(SpriteCatalogError::MissingSprite { key })
    }

    /// Reports whether the catalog contains the provided key.
    #[must_use]
    pub fn contains(&self, key: SpriteKey) -> bool {
        self.assets.contains_key(&key)
    }

    /// Number of assets stored in the catalog.
    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }
}

#[derive(Debug, Deserialize)]
struct Manifest {
    version: u32,
    sprites: HashMap<String, ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    path: String,
    width: u32,
    height: u32,
}

fn parse_manifest(contents: &str, base_path: &Path) -> Result<HashMap<SpriteKey, SpriteAsset>> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse sprite manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported sprite manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    let mut resolved = HashMap::new();
    for (name, entry) in manifest.sprites {
        let key = parse_sprite_key(&name)
            .with_context(|| format!("unknown sprite key `{name}` in manifest"))?;
        let asset = SpriteAsset {
            path: base_path.join(entry.path),
            width: entry.width,
            height: entry.height,
        };
        if resolved.insert(key, asset).is_some() {
            bail!("sprite manifest contains duplicate entry for {key:?}");
        }
    }

    for key in ALL_SPRITE_KEYS {
        if !resolved.contains_key(&key) {
            bail!("sprite manifest missing entry for {key:?}");
        }
    }

    Ok(resolved)
}

fn parse_sprite_key(name: &str) -> Result<SpriteKey> {
    match name {
        "RunnerBody" => Ok(SpriteKey::RunnerBody),
        "DrifterBody" => Ok(SpriteKey::DrifterBody),
        "BoltFlash" => Ok(SpriteKey::BoltFlash),
        _ => bail!("unknown sprite key `{name}`"),
    }
}
