#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod assets;
pub mod engine;
pub mod export;
pub mod geometry;
pub mod history;
pub mod input;
pub mod layout;
pub mod persistence;
pub mod renderer;
pub mod scene;
pub mod sticker;

pub use app::StickerApp;
pub use assets::ImageStore;
pub use engine::{EditorEngine, EditorOptions, Effects, ReorderDirection, ResizeRule};
pub use export::export_file_name;
pub use history::{History, HistoryEntry};
pub use input::{PointerEvent, PointerPhase};
pub use layout::ArtworkLayout;
pub use persistence::{SavedSticker, ScenePersistence, SceneSnapshot};
pub use renderer::SceneRenderer;
pub use scene::Scene;
pub use sticker::{ImageKey, Sticker, StickerId, StickerKind};
