use std::f32::consts::FRAC_PI_2;

use egui::{Pos2, Vec2, vec2};

use crate::sticker::Sticker;

/// Side of the square resize handle; also the half-width of its
/// rectangular hit window and the rotate handle's circular hit radius.
pub const HANDLE_SIZE: f32 = 14.0;

/// On-screen distance from the sticker's top edge to the rotate handle.
pub const ROTATE_HANDLE_OFFSET: f32 = 28.0;

/// Diameter of the delete button outside the top-right corner.
pub const DELETE_BUTTON_SIZE: f32 = 20.0;

/// Rotates `p` about the origin by `angle` radians.
pub fn rotate_point(p: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    vec2(p.x * cos - p.y * sin, p.x * sin + p.y * cos)
}

/// Maps a canvas point into the sticker's rotation-compensated local
/// frame, relative to its center. Units stay in canvas pixels.
pub fn to_local(pos: Pos2, sticker: &Sticker) -> Vec2 {
    rotate_point(pos - sticker.center(), -sticker.rotation)
}

/// Same mapping, but relative to the sticker's pre-scale top-left corner.
/// Resize drags read their target width/height straight from this frame.
pub fn resize_local(pos: Pos2, sticker: &Sticker) -> Vec2 {
    rotate_point(vec2(pos.x - sticker.x, pos.y - sticker.y), -sticker.rotation)
}

/// True when `pos` lies inside the sticker's rotated footprint. The check
/// runs against the unscaled half-extents in the local frame, so the
/// geometric center hits under every rotation.
pub fn hit_test(pos: Pos2, sticker: &Sticker) -> bool {
    let local = to_local(pos, sticker);
    local.x.abs() <= sticker.width / 2.0 && local.y.abs() <= sticker.height / 2.0
}

/// Angular offset between the pointer's grab angle and the sticker's
/// current rotation, captured once when a rotate gesture starts.
pub fn rotation_grip(pos: Pos2, sticker: &Sticker) -> f32 {
    let center = sticker.center();
    (pos.y - center.y).atan2(pos.x - center.x) - FRAC_PI_2 - sticker.rotation
}

/// Rotation that keeps the grab-time pointer angle as the zero reference.
pub fn rotation_toward(pos: Pos2, center: Pos2, grip: f32) -> f32 {
    (pos.y - center.y).atan2(pos.x - center.x) - FRAC_PI_2 - grip
}

/// Canvas-space hotspots of a selected sticker's handles.
///
/// Local offsets are rotated with the sticker and scaled back to canvas
/// space; offsets that must keep a constant on-screen distance (rotate
/// gap, delete gap) are divided by `scale` first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleLayout {
    pub center: Pos2,
    pub resize: Pos2,
    pub rotate: Pos2,
    pub delete: Option<Pos2>,
}

impl HandleLayout {
    pub fn of(sticker: &Sticker, with_delete: bool) -> Self {
        let center = sticker.center();
        let half_w = sticker.width / 2.0;
        let half_h = sticker.height / 2.0;
        let scale = sticker.scale;
        let place =
            |local: Vec2| center + rotate_point(local, sticker.rotation) * scale;
        Self {
            center,
            resize: place(vec2(half_w, half_h)),
            rotate: place(vec2(0.0, -half_h - ROTATE_HANDLE_OFFSET / scale)),
            delete: with_delete.then(|| {
                place(vec2(
                    half_w + DELETE_BUTTON_SIZE / 2.0 / scale,
                    -half_h - DELETE_BUTTON_SIZE / 2.0 / scale,
                ))
            }),
        }
    }

    /// Rectangular tolerance window around the resize handle.
    pub fn hits_resize(&self, pos: Pos2) -> bool {
        (pos.x - self.resize.x).abs() < HANDLE_SIZE
            && (pos.y - self.resize.y).abs() < HANDLE_SIZE
    }

    /// Circular tolerance around the rotate handle.
    pub fn hits_rotate(&self, pos: Pos2) -> bool {
        self.rotate.distance(pos) < HANDLE_SIZE
    }

    /// Circular tolerance around the delete button, when present.
    pub fn hits_delete(&self, pos: Pos2) -> bool {
        self.delete
            .is_some_and(|delete| delete.distance(pos) < DELETE_BUTTON_SIZE / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_3, PI};

    use egui::pos2;

    use super::*;
    use crate::sticker::{StickerId, StickerKind};

    fn sticker_at(center: Pos2, rotation: f32) -> Sticker {
        let mut sticker = Sticker::new(StickerId(1), StickerKind::Star, center);
        sticker.rotation = rotation;
        sticker
    }

    #[test]
    fn rotate_round_trips_to_identity() {
        let p = vec2(13.5, -42.25);
        for i in 0..16 {
            let angle = i as f32 * PI / 8.0;
            let back = rotate_point(rotate_point(p, angle), -angle);
            assert!((back.x - p.x).abs() < 0.001, "angle {angle}");
            assert!((back.y - p.y).abs() < 0.001, "angle {angle}");
        }
    }

    #[test]
    fn center_hits_under_any_rotation() {
        for i in 0..24 {
            let rotation = i as f32 * PI / 12.0;
            let sticker = sticker_at(pos2(120.0, 80.0), rotation);
            assert!(hit_test(sticker.center(), &sticker), "rotation {rotation}");
        }
    }

    #[test]
    fn hit_test_respects_rotation() {
        let mut sticker = sticker_at(pos2(100.0, 100.0), FRAC_PI_2);
        sticker.height = 20.0;
        sticker.y = 100.0 - 10.0;
        // A quarter turn points the long axis vertically: points below the
        // center now hit, points to the right no longer do.
        assert!(hit_test(pos2(100.0, 124.0), &sticker));
        assert!(!hit_test(pos2(124.0, 100.0), &sticker));
    }

    #[test]
    fn rotate_handle_keeps_screen_distance() {
        for scale in [0.5_f32, 1.0, 2.0] {
            let mut sticker = sticker_at(pos2(0.0, 0.0), 0.0);
            sticker.scale = scale;
            // Recenter so the scaled footprint stays centered at origin.
            sticker.x = -sticker.width * scale / 2.0;
            sticker.y = -sticker.height * scale / 2.0;
            let layout = HandleLayout::of(&sticker, false);
            let gap = sticker.center().y - sticker.height * scale / 2.0 - layout.rotate.y;
            assert!(
                (gap - ROTATE_HANDLE_OFFSET).abs() < 0.001,
                "scale {scale} gap {gap}"
            );
        }
    }

    #[test]
    fn resize_local_matches_corner_drag() {
        let sticker = sticker_at(pos2(100.0, 100.0), 0.0);
        // Pointer exactly on the bottom-right corner of the footprint.
        let local = resize_local(pos2(125.0, 125.0), &sticker);
        assert!((local.x - 50.0).abs() < 0.001);
        assert!((local.y - 50.0).abs() < 0.001);
    }

    #[test]
    fn handles_rotate_with_the_sticker() {
        let upright = HandleLayout::of(&sticker_at(pos2(0.0, 0.0), 0.0), true);
        let turned = HandleLayout::of(&sticker_at(pos2(0.0, 0.0), FRAC_PI_3), true);
        assert!(upright.rotate.distance(turned.rotate) > 1.0);
        // Distances from the center are rotation-invariant.
        let a = upright.center.distance(upright.resize);
        let b = turned.center.distance(turned.resize);
        assert!((a - b).abs() < 0.001);
        let a = upright.center.distance(upright.delete.unwrap());
        let b = turned.center.distance(turned.delete.unwrap());
        assert!((a - b).abs() < 0.001);
    }
}
