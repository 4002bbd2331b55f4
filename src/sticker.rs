use egui::{Pos2, Vec2, pos2, vec2};
use serde::{Deserialize, Serialize};

/// Smallest sticker edge, in unscaled canvas units. Resize drags clamp here.
pub const MIN_STICKER_SIZE: f32 = 20.0;

/// Edge length of a freshly placed sticker.
pub const DEFAULT_STICKER_SIZE: f32 = 50.0;

/// Monotonic sticker identifier, unique within an editor session and
/// within any scene loaded into it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct StickerId(pub u64);

impl std::fmt::Display for StickerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The four builtin motifs plus user-uploaded images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StickerKind {
    Sparkle,
    Stamp,
    Star,
    Text,
    Custom,
}

impl StickerKind {
    pub const BUILTINS: [StickerKind; 4] = [
        StickerKind::Sparkle,
        StickerKind::Stamp,
        StickerKind::Star,
        StickerKind::Text,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StickerKind::Sparkle => "Sparkle",
            StickerKind::Stamp => "Stamp",
            StickerKind::Star => "Star",
            StickerKind::Text => "Text",
            StickerKind::Custom => "Custom",
        }
    }
}

/// Which pixels a sticker draws with. Builtin kinds share one image per
/// kind; uploads are keyed by the owning sticker's id so their bytes
/// outlive deletion (undo can bring the sticker back).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKey {
    Builtin(StickerKind),
    Upload(StickerId),
}

/// One decorative layer on the canvas.
///
/// `x`/`y` are the pre-scale top-left corner; `width`/`height` are the
/// unscaled dimensions; `scale` is a uniform multiplier and `rotation` is
/// radians about the center. The scaled footprint is what the user sees:
/// its center sits at `(x + width*scale/2, y + height*scale/2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sticker {
    pub id: StickerId,
    pub kind: StickerKind,
    pub image: ImageKey,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub scale: f32,
    pub rotation: f32,
}

impl Sticker {
    /// New default-sized sticker whose scaled footprint is centered on
    /// `center`. Custom kinds reference their upload by id; everything
    /// else shares the builtin image for its kind.
    pub fn new(id: StickerId, kind: StickerKind, center: Pos2) -> Self {
        let image = match kind {
            StickerKind::Custom => ImageKey::Upload(id),
            builtin => ImageKey::Builtin(builtin),
        };
        Self {
            id,
            kind,
            image,
            x: center.x - DEFAULT_STICKER_SIZE / 2.0,
            y: center.y - DEFAULT_STICKER_SIZE / 2.0,
            width: DEFAULT_STICKER_SIZE,
            height: DEFAULT_STICKER_SIZE,
            scale: 1.0,
            rotation: 0.0,
        }
    }

    pub fn center(&self) -> Pos2 {
        pos2(
            self.x + self.width * self.scale / 2.0,
            self.y + self.height * self.scale / 2.0,
        )
    }

    /// On-canvas footprint before rotation.
    pub fn scaled_size(&self) -> Vec2 {
        vec2(self.width * self.scale, self.height * self.scale)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sticker_is_centered() {
        let sticker = Sticker::new(StickerId(1), StickerKind::Star, pos2(200.0, 150.0));
        assert!((sticker.center().x - 200.0).abs() < 0.001);
        assert!((sticker.center().y - 150.0).abs() < 0.001);
        assert_eq!(sticker.width, DEFAULT_STICKER_SIZE);
        assert_eq!(sticker.scale, 1.0);
        assert_eq!(sticker.rotation, 0.0);
    }

    #[test]
    fn center_accounts_for_scale() {
        let mut sticker = Sticker::new(StickerId(2), StickerKind::Sparkle, pos2(0.0, 0.0));
        sticker.x = 10.0;
        sticker.y = 20.0;
        sticker.scale = 2.0;
        let center = sticker.center();
        assert!((center.x - (10.0 + 50.0)).abs() < 0.001);
        assert!((center.y - (20.0 + 50.0)).abs() < 0.001);
    }

    #[test]
    fn image_key_follows_kind() {
        let builtin = Sticker::new(StickerId(3), StickerKind::Stamp, pos2(0.0, 0.0));
        assert_eq!(builtin.image, ImageKey::Builtin(StickerKind::Stamp));
        let custom = Sticker::new(StickerId(4), StickerKind::Custom, pos2(0.0, 0.0));
        assert_eq!(custom.image, ImageKey::Upload(StickerId(4)));
    }
}
