use egui::{Pos2, Vec2, pos2, vec2};
use image::{Rgba, RgbaImage, imageops, imageops::FilterType};

use crate::assets::ImageStore;
use crate::engine::EditorOptions;
use crate::geometry::{self, DELETE_BUTTON_SIZE, HANDLE_SIZE, ROTATE_HANDLE_OFFSET};
use crate::layout::ArtworkLayout;
use crate::scene::Scene;
use crate::sticker::Sticker;

const OUTLINE_COLOR: Rgba<u8> = Rgba([245, 158, 11, 255]);
const CHROME_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);
const DELETE_COLOR: Rgba<u8> = Rgba([239, 68, 68, 255]);
const DISC_TINT: Rgba<u8> = Rgba([136, 136, 136, 51]);
const CHROME_WIDTH: f32 = 2.0;

/// Circular region stickers and selection chrome are confined to.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ClipCircle {
    center: Pos2,
    radius: f32,
}

impl ClipCircle {
    fn contains(&self, p: Pos2) -> bool {
        self.center.distance(p) <= self.radius
    }
}

/// CPU compositor for the editor frame.
///
/// The same pass serves the interactive canvas (uploaded as a texture)
/// and export (chrome hidden): background artwork fitted and centered,
/// a translucent disc tint, stickers bottom-to-top inside the circular
/// clip, then the selection chrome. Stickers whose image is not ready
/// yet are skipped for the frame; until the background is ready there is
/// no clip region and stickers draw unconfined, exactly like the canvas
/// behaves before its artwork arrives.
pub struct SceneRenderer {
    canvas: Vec2,
    x_offset: f32,
    delete_handle: bool,
    scaled_background: Option<(ArtworkLayout, RgbaImage)>,
}

impl SceneRenderer {
    pub fn new(options: &EditorOptions) -> Self {
        Self {
            canvas: options.canvas_size,
            x_offset: options.artwork_x_offset,
            delete_handle: options.delete_handle,
            scaled_background: None,
        }
    }

    pub fn canvas_size(&self) -> Vec2 {
        self.canvas
    }

    /// Composes one frame of the scene.
    pub fn compose(
        &mut self,
        scene: &Scene,
        selected: Option<usize>,
        images: &ImageStore,
        hide_chrome: bool,
    ) -> RgbaImage {
        let mut frame = RgbaImage::new(self.canvas.x as u32, self.canvas.y as u32);
        let clip = self.draw_background(&mut frame, images);
        for (index, sticker) in scene.stickers().iter().enumerate() {
            let Some(pixels) = images.get(sticker.image) else {
                continue;
            };
            draw_sticker(&mut frame, pixels, sticker, clip.as_ref());
            if !hide_chrome && selected == Some(index) {
                self.draw_chrome(&mut frame, sticker, clip.as_ref());
            }
        }
        frame
    }

    fn draw_background(
        &mut self,
        frame: &mut RgbaImage,
        images: &ImageStore,
    ) -> Option<ClipCircle> {
        if self.scaled_background.is_none() {
            if let Some(artwork) = images.background() {
                let layout = ArtworkLayout::fit(
                    self.canvas,
                    vec2(artwork.width() as f32, artwork.height() as f32),
                    self.x_offset,
                );
                let scaled = imageops::resize(
                    artwork,
                    (layout.size.x.round() as u32).max(1),
                    (layout.size.y.round() as u32).max(1),
                    FilterType::Triangle,
                );
                self.scaled_background = Some((layout, scaled));
            }
        }
        let (layout, scaled) = self.scaled_background.as_ref()?;
        blit(frame, scaled, layout.origin);
        let clip = ClipCircle {
            center: layout.center,
            radius: layout.clip_radius,
        };
        fill_circle(frame, clip.center, clip.radius, DISC_TINT, None);
        Some(clip)
    }

    /// Selection chrome, painted in the sticker's rotated frame with
    /// unscaled extents the way both editors drew it: outline two pixels
    /// outside the bounds, white resize square at the bottom-right
    /// corner, rotate circle above the top edge with its guide line
    /// drawn last, and (per profile) the red delete button.
    fn draw_chrome(&self, frame: &mut RgbaImage, sticker: &Sticker, clip: Option<&ClipCircle>) {
        let center = sticker.center();
        let rotation = sticker.rotation;
        let at = |x: f32, y: f32| center + geometry::rotate_point(vec2(x, y), rotation);
        let half_w = sticker.width / 2.0;
        let half_h = sticker.height / 2.0;

        let outline = [
            at(-half_w - 2.0, -half_h - 2.0),
            at(half_w + 2.0, -half_h - 2.0),
            at(half_w + 2.0, half_h + 2.0),
            at(-half_w - 2.0, half_h + 2.0),
        ];
        stroke_polygon(frame, &outline, CHROME_WIDTH, OUTLINE_COLOR, clip);

        if self.delete_handle {
            let gap = DELETE_BUTTON_SIZE / 2.0;
            let button = at(half_w + gap, -half_h - gap);
            fill_circle(frame, button, gap, DELETE_COLOR, clip);
            stroke_circle(frame, button, gap, CHROME_WIDTH, CHROME_FILL, clip);
            stroke_line(
                frame,
                at(half_w + gap - 4.0, -half_h - gap - 4.0),
                at(half_w + gap + 4.0, -half_h - gap + 4.0),
                CHROME_WIDTH,
                CHROME_FILL,
                clip,
            );
            stroke_line(
                frame,
                at(half_w + gap + 4.0, -half_h - gap - 4.0),
                at(half_w + gap - 4.0, -half_h - gap + 4.0),
                CHROME_WIDTH,
                CHROME_FILL,
                clip,
            );
        }

        let handle = HANDLE_SIZE / 2.0;
        let resize = [
            at(half_w - handle, half_h - handle),
            at(half_w + handle, half_h - handle),
            at(half_w + handle, half_h + handle),
            at(half_w - handle, half_h + handle),
        ];
        fill_quad(frame, &resize, CHROME_FILL, clip);
        stroke_polygon(frame, &resize, CHROME_WIDTH, OUTLINE_COLOR, clip);

        let rotate = at(0.0, -half_h - ROTATE_HANDLE_OFFSET);
        fill_circle(frame, rotate, handle, CHROME_FILL, clip);
        stroke_circle(frame, rotate, handle, CHROME_WIDTH, OUTLINE_COLOR, clip);
        stroke_line(
            frame,
            at(0.0, -half_h),
            rotate,
            CHROME_WIDTH,
            OUTLINE_COLOR,
            clip,
        );
    }
}

/// Source-over blend of straight-alpha pixels.
fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = src[3] as f32 / 255.0;
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }
    for c in 0..3 {
        let s = src[c] as f32;
        let d = dst[c] as f32;
        dst[c] = ((s * sa + d * da * (1.0 - sa)) / out_a).round() as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

fn with_alpha(color: Rgba<u8>, alpha: f32) -> Rgba<u8> {
    let scaled = (color[3] as f32 * alpha.clamp(0.0, 1.0)) as u8;
    Rgba([color[0], color[1], color[2], scaled])
}

/// Pixel range `[min, max)` covering `center ± reach`, clamped to the
/// frame edge.
fn span(center: f32, reach: f32, limit: u32) -> (u32, u32) {
    let min = (center - reach).floor().max(0.0) as u32;
    let max = (((center + reach).ceil() as i64) + 1).clamp(0, limit as i64) as u32;
    (min.min(max), max)
}

fn blit(frame: &mut RgbaImage, src: &RgbaImage, origin: Pos2) {
    let ox = origin.x.round() as i64;
    let oy = origin.y.round() as i64;
    let (w, h) = (frame.width() as i64, frame.height() as i64);
    for (x, y, px) in src.enumerate_pixels() {
        let fx = ox + x as i64;
        let fy = oy + y as i64;
        if fx < 0 || fy < 0 || fx >= w || fy >= h {
            continue;
        }
        blend(frame.get_pixel_mut(fx as u32, fy as u32), *px);
    }
}

/// Rotated, scaled sticker blit: every covered frame pixel maps back
/// through the inverse transform and samples the source image.
fn draw_sticker(
    frame: &mut RgbaImage,
    pixels: &RgbaImage,
    sticker: &Sticker,
    clip: Option<&ClipCircle>,
) {
    let size = sticker.scaled_size();
    if size.x <= 0.0 || size.y <= 0.0 {
        return;
    }
    let center = sticker.center();
    let half = size / 2.0;
    let reach = half.length();
    let (min_x, max_x) = span(center.x, reach, frame.width());
    let (min_y, max_y) = span(center.y, reach, frame.height());
    let src_w = pixels.width() as f32;
    let src_h = pixels.height() as f32;
    for y in min_y..max_y {
        for x in min_x..max_x {
            let p = pos2(x as f32 + 0.5, y as f32 + 0.5);
            if clip.is_some_and(|c| !c.contains(p)) {
                continue;
            }
            let local = geometry::rotate_point(p - center, -sticker.rotation);
            if local.x.abs() > half.x || local.y.abs() > half.y {
                continue;
            }
            let u = ((local.x / size.x + 0.5) * src_w).clamp(0.0, src_w - 1.0) as u32;
            let v = ((local.y / size.y + 0.5) * src_h).clamp(0.0, src_h - 1.0) as u32;
            blend(frame.get_pixel_mut(x, y), *pixels.get_pixel(u, v));
        }
    }
}

fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= f32::EPSILON {
        return a.distance(p);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t).distance(p)
}

fn stroke_line(
    frame: &mut RgbaImage,
    a: Pos2,
    b: Pos2,
    width: f32,
    color: Rgba<u8>,
    clip: Option<&ClipCircle>,
) {
    let r = width / 2.0;
    let (min_x, max_x) = span((a.x + b.x) / 2.0, (a.x - b.x).abs() / 2.0 + r, frame.width());
    let (min_y, max_y) = span((a.y + b.y) / 2.0, (a.y - b.y).abs() / 2.0 + r, frame.height());
    for y in min_y..max_y {
        for x in min_x..max_x {
            let p = pos2(x as f32 + 0.5, y as f32 + 0.5);
            if clip.is_some_and(|c| !c.contains(p)) {
                continue;
            }
            let alpha = (r - distance_to_segment(p, a, b) + 0.5).clamp(0.0, 1.0);
            if alpha > 0.0 {
                blend(frame.get_pixel_mut(x, y), with_alpha(color, alpha));
            }
        }
    }
}

fn stroke_polygon(
    frame: &mut RgbaImage,
    corners: &[Pos2; 4],
    width: f32,
    color: Rgba<u8>,
    clip: Option<&ClipCircle>,
) {
    for i in 0..4 {
        stroke_line(frame, corners[i], corners[(i + 1) % 4], width, color, clip);
    }
}

/// Fills a convex quad by inverse-testing pixels in its bounding box.
fn fill_quad(frame: &mut RgbaImage, corners: &[Pos2; 4], color: Rgba<u8>, clip: Option<&ClipCircle>) {
    let cx = corners.iter().map(|c| c.x).sum::<f32>() / 4.0;
    let cy = corners.iter().map(|c| c.y).sum::<f32>() / 4.0;
    let reach = corners
        .iter()
        .map(|c| pos2(cx, cy).distance(*c))
        .fold(0.0_f32, f32::max);
    let (min_x, max_x) = span(cx, reach, frame.width());
    let (min_y, max_y) = span(cy, reach, frame.height());
    for y in min_y..max_y {
        for x in min_x..max_x {
            let p = pos2(x as f32 + 0.5, y as f32 + 0.5);
            if clip.is_some_and(|c| !c.contains(p)) {
                continue;
            }
            if inside_convex_quad(p, corners) {
                blend(frame.get_pixel_mut(x, y), color);
            }
        }
    }
}

fn inside_convex_quad(p: Pos2, corners: &[Pos2; 4]) -> bool {
    let mut sign = 0.0_f32;
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
        if cross.abs() <= f32::EPSILON {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}

fn fill_circle(
    frame: &mut RgbaImage,
    center: Pos2,
    radius: f32,
    color: Rgba<u8>,
    clip: Option<&ClipCircle>,
) {
    let (min_x, max_x) = span(center.x, radius, frame.width());
    let (min_y, max_y) = span(center.y, radius, frame.height());
    for y in min_y..max_y {
        for x in min_x..max_x {
            let p = pos2(x as f32 + 0.5, y as f32 + 0.5);
            if clip.is_some_and(|c| !c.contains(p)) {
                continue;
            }
            let alpha = (radius - center.distance(p) + 0.5).clamp(0.0, 1.0);
            if alpha > 0.0 {
                blend(frame.get_pixel_mut(x, y), with_alpha(color, alpha));
            }
        }
    }
}

fn stroke_circle(
    frame: &mut RgbaImage,
    center: Pos2,
    radius: f32,
    width: f32,
    color: Rgba<u8>,
    clip: Option<&ClipCircle>,
) {
    let r = width / 2.0;
    let (min_x, max_x) = span(center.x, radius + r, frame.width());
    let (min_y, max_y) = span(center.y, radius + r, frame.height());
    for y in min_y..max_y {
        for x in min_x..max_x {
            let p = pos2(x as f32 + 0.5, y as f32 + 0.5);
            if clip.is_some_and(|c| !c.contains(p)) {
                continue;
            }
            let alpha = (r - (center.distance(p) - radius).abs() + 0.5).clamp(0.0, 1.0);
            if alpha > 0.0 {
                blend(frame.get_pixel_mut(x, y), with_alpha(color, alpha));
            }
        }
    }
}
