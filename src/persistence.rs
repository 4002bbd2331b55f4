use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::assets::ImageStore;
use crate::scene::Scene;
use crate::sticker::{ImageKey, Sticker, StickerId, StickerKind};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to serialize scene: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("failed to access scene file: {0}")]
    Io(#[from] std::io::Error),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// One sticker as stored on disk. Builtin kinds reconstruct their image
/// from the kind alone; `Custom` carries the original encoded upload so
/// the scene is self-contained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSticker {
    pub id: StickerId,
    pub kind: StickerKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub scale: f32,
    pub rotation: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_bytes: Option<Vec<u8>>,
}

impl SavedSticker {
    pub fn from_sticker(sticker: &Sticker, images: &ImageStore) -> Self {
        let image_bytes = match sticker.image {
            ImageKey::Upload(id) => images.upload_bytes(id).map(<[u8]>::to_vec),
            ImageKey::Builtin(_) => None,
        };
        Self {
            id: sticker.id,
            kind: sticker.kind,
            x: sticker.x,
            y: sticker.y,
            width: sticker.width,
            height: sticker.height,
            scale: sticker.scale,
            rotation: sticker.rotation,
            image_bytes,
        }
    }

    pub fn to_sticker(&self) -> Sticker {
        let image = match self.kind {
            StickerKind::Custom => ImageKey::Upload(self.id),
            builtin => ImageKey::Builtin(builtin),
        };
        Sticker {
            id: self.id,
            kind: self.kind,
            image,
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            scale: self.scale,
            rotation: self.rotation,
        }
    }
}

/// On-disk shape of a saved scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub stickers: Vec<SavedSticker>,
    pub created_at: String,
    pub updated_at: String,
}

/// Reads and writes scene snapshots as pretty-printed JSON at a fixed
/// path. A missing file and an empty sticker list both mean "nothing to
/// load", not an error; `created_at` survives re-saves, `updated_at`
/// tracks the latest one.
#[derive(Debug, Clone)]
pub struct ScenePersistence {
    path: PathBuf,
}

impl ScenePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the saved sticker list, or `None` when there is nothing to
    /// load. The caller leaves the current scene untouched in that case.
    pub fn load(&self) -> PersistenceResult<Option<Vec<SavedSticker>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)?;
        let snapshot: SceneSnapshot = serde_json::from_str(&json)?;
        if snapshot.stickers.is_empty() {
            return Ok(None);
        }
        info!(
            "loaded {} stickers from {}",
            snapshot.stickers.len(),
            self.path.display()
        );
        Ok(Some(snapshot.stickers))
    }

    /// Saves the scene. Uploaded pixel bytes come along from the image
    /// store so a later load restores them.
    pub fn save(&self, scene: &Scene, images: &ImageStore) -> PersistenceResult<()> {
        let now = rfc3339_now();
        let created_at = self
            .existing_created_at()
            .unwrap_or_else(|| now.clone());
        let snapshot = SceneSnapshot {
            stickers: scene
                .stickers()
                .iter()
                .map(|sticker| SavedSticker::from_sticker(sticker, images))
                .collect(),
            created_at,
            updated_at: now,
        };
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&self.path, json)?;
        info!(
            "saved {} stickers to {}",
            snapshot.stickers.len(),
            self.path.display()
        );
        Ok(())
    }

    fn existing_created_at(&self) -> Option<String> {
        let json = fs::read_to_string(&self.path).ok()?;
        let snapshot: SceneSnapshot = serde_json::from_str(&json).ok()?;
        Some(snapshot.created_at)
    }
}

fn rfc3339_now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
