use egui::{Pos2, Vec2, pos2};

/// Placement of the background artwork after an aspect-preserving fit
/// into the canvas.
///
/// The artwork image itself is drawn centered at `origin`; `center` is
/// the visual center stickers gather around and the clip circle hangs
/// off, which in one editor profile is nudged right of the geometric
/// center by a fixed offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArtworkLayout {
    /// Scaled artwork size.
    pub size: Vec2,
    /// Top-left corner where the artwork is drawn.
    pub origin: Pos2,
    /// Visual center, including the profile's horizontal offset.
    pub center: Pos2,
    /// Radius of the circular clip region for stickers.
    pub clip_radius: f32,
}

impl ArtworkLayout {
    pub fn fit(canvas: Vec2, artwork: Vec2, x_offset: f32) -> Self {
        let scale = (canvas.x / artwork.x).min(canvas.y / artwork.y);
        let size = artwork * scale;
        let origin = pos2((canvas.x - size.x) / 2.0, (canvas.y - size.y) / 2.0);
        let center = pos2(origin.x + size.x / 2.0 + x_offset, origin.y + size.y / 2.0);
        let clip_radius = size.x.min(size.y) / 2.9 + 1.0;
        Self {
            size,
            origin,
            center,
            clip_radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use egui::vec2;

    use super::*;

    #[test]
    fn square_artwork_fills_square_canvas() {
        let layout = ArtworkLayout::fit(vec2(400.0, 400.0), vec2(512.0, 512.0), 0.0);
        assert!((layout.size.x - 400.0).abs() < 0.001);
        assert!((layout.size.y - 400.0).abs() < 0.001);
        assert!((layout.origin.x - 0.0).abs() < 0.001);
        assert!((layout.center.x - 200.0).abs() < 0.001);
        assert!((layout.center.y - 200.0).abs() < 0.001);
        assert!((layout.clip_radius - (400.0 / 2.9 + 1.0)).abs() < 0.001);
    }

    #[test]
    fn wide_artwork_letterboxes_vertically() {
        let layout = ArtworkLayout::fit(vec2(400.0, 400.0), vec2(800.0, 400.0), 0.0);
        assert!((layout.size.x - 400.0).abs() < 0.001);
        assert!((layout.size.y - 200.0).abs() < 0.001);
        assert!((layout.origin.y - 100.0).abs() < 0.001);
        // Clip radius follows the short side.
        assert!((layout.clip_radius - (200.0 / 2.9 + 1.0)).abs() < 0.001);
    }

    #[test]
    fn x_offset_shifts_only_the_center() {
        let plain = ArtworkLayout::fit(vec2(400.0, 400.0), vec2(512.0, 512.0), 0.0);
        let offset = ArtworkLayout::fit(vec2(400.0, 400.0), vec2(512.0, 512.0), 16.0);
        assert!((offset.center.x - plain.center.x - 16.0).abs() < 0.001);
        assert!((offset.center.y - plain.center.y).abs() < 0.001);
        assert_eq!(offset.origin, plain.origin);
    }
}
