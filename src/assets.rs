use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, PI};

use futures::channel::oneshot;
use image::{Rgba, RgbaImage};
use log::{info, warn};
use thiserror::Error;

use crate::sticker::{ImageKey, StickerId, StickerKind};

/// Edge length of the synthesized background artwork.
pub const BACKGROUND_SIZE: u32 = 512;

/// Edge length of the synthesized builtin sticker images.
const BUILTIN_SIZE: u32 = 128;

#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image job dropped before delivering pixels")]
    ChannelClosed,
}

type LoadResult = Result<RgbaImage, ImageLoadError>;

/// Which store slot a finished load job fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageSlot {
    Background,
    Sticker(ImageKey),
}

#[derive(Debug)]
enum LoadJob {
    Background,
    Builtin(StickerKind),
    Decode(Vec<u8>),
}

#[derive(Debug, Default)]
struct ImageEntry {
    pixels: Option<RgbaImage>,
    failed: bool,
}

struct PendingImage {
    slot: ImageSlot,
    rx: oneshot::Receiver<LoadResult>,
}

/// Owns every pixel source the renderer can draw: the background artwork,
/// the builtin sticker images, and uploaded custom images.
///
/// Every source loads through the same path: a job runs off the UI thread
/// (inline on the web target) and delivers through a one-shot channel.
/// Entries flip to ready exactly once, when [`poll`](Self::poll) drains
/// their channel; until then they draw as nothing. Upload entries are
/// never evicted, so undoing a deletion finds its pixels again.
pub struct ImageStore {
    background: ImageEntry,
    images: HashMap<ImageKey, ImageEntry>,
    uploads: HashMap<StickerId, Vec<u8>>,
    pending: Vec<PendingImage>,
}

impl ImageStore {
    /// Creates the store and queues the background plus the four builtin
    /// motifs.
    pub fn new() -> Self {
        let mut store = Self {
            background: ImageEntry::default(),
            images: HashMap::new(),
            uploads: HashMap::new(),
            pending: Vec::new(),
        };
        store.spawn(ImageSlot::Background, LoadJob::Background);
        for kind in StickerKind::BUILTINS {
            let key = ImageKey::Builtin(kind);
            store.images.insert(key, ImageEntry::default());
            store.spawn(ImageSlot::Sticker(key), LoadJob::Builtin(kind));
        }
        store
    }

    /// Queues decoding of uploaded bytes for the sticker owning `id`.
    /// The raw bytes are retained for persistence round-trips.
    pub fn load_upload(&mut self, id: StickerId, bytes: Vec<u8>) {
        let key = ImageKey::Upload(id);
        self.images.insert(key, ImageEntry::default());
        self.uploads.insert(id, bytes.clone());
        self.spawn(ImageSlot::Sticker(key), LoadJob::Decode(bytes));
    }

    pub fn background(&self) -> Option<&RgbaImage> {
        self.background.pixels.as_ref()
    }

    pub fn background_ready(&self) -> bool {
        self.background.pixels.is_some()
    }

    /// Ready pixels for `key`, or `None` while loading / after a failed
    /// decode / for keys never registered.
    pub fn get(&self, key: ImageKey) -> Option<&RgbaImage> {
        self.images.get(&key).and_then(|entry| entry.pixels.as_ref())
    }

    pub fn is_ready(&self, key: ImageKey) -> bool {
        self.get(key).is_some()
    }

    /// Did the entry's load job fail? Failed entries never become ready;
    /// stickers referencing them simply don't draw.
    pub fn load_failed(&self, key: ImageKey) -> bool {
        self.images.get(&key).is_some_and(|entry| entry.failed)
    }

    /// Original encoded bytes of an upload, for persistence.
    pub fn upload_bytes(&self, id: StickerId) -> Option<&[u8]> {
        self.uploads.get(&id).map(Vec::as_slice)
    }

    /// Any jobs still in flight? The UI keeps scheduling repaints while
    /// this is true so readiness lands without user input.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drains finished load jobs. Returns true when at least one entry
    /// became ready, i.e. the caller should recompose the frame once.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        let mut waiting = Vec::new();
        for mut pending in std::mem::take(&mut self.pending) {
            match pending.rx.try_recv() {
                Ok(Some(Ok(pixels))) => {
                    self.store(pending.slot, pixels);
                    changed = true;
                }
                Ok(Some(Err(err))) => self.fail(pending.slot, &err),
                Ok(None) => waiting.push(pending),
                Err(oneshot::Canceled) => {
                    self.fail(pending.slot, &ImageLoadError::ChannelClosed);
                }
            }
        }
        self.pending = waiting;
        changed
    }

    fn spawn(&mut self, slot: ImageSlot, job: LoadJob) {
        let (tx, rx) = oneshot::channel();
        run_job(job, tx);
        self.pending.push(PendingImage { slot, rx });
    }

    fn entry_mut(&mut self, slot: ImageSlot) -> &mut ImageEntry {
        match slot {
            ImageSlot::Background => &mut self.background,
            ImageSlot::Sticker(key) => self.images.entry(key).or_default(),
        }
    }

    fn store(&mut self, slot: ImageSlot, pixels: RgbaImage) {
        info!("image {slot:?} ready ({}x{})", pixels.width(), pixels.height());
        self.entry_mut(slot).pixels = Some(pixels);
    }

    fn fail(&mut self, slot: ImageSlot, err: &ImageLoadError) {
        warn!("image {slot:?} failed to load: {err}");
        self.entry_mut(slot).failed = true;
    }
}

impl Default for ImageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run_job(job: LoadJob, tx: oneshot::Sender<LoadResult>) {
    std::thread::spawn(move || {
        let _ = tx.send(execute_job(job));
    });
}

#[cfg(target_arch = "wasm32")]
fn run_job(job: LoadJob, tx: oneshot::Sender<LoadResult>) {
    // No threads on the web target; the jobs are small enough to run
    // inline and deliver immediately.
    let _ = tx.send(execute_job(job));
}

fn execute_job(job: LoadJob) -> LoadResult {
    match job {
        LoadJob::Background => Ok(background_artwork()),
        LoadJob::Builtin(kind) => Ok(builtin_sticker(kind)),
        LoadJob::Decode(bytes) => Ok(image::load_from_memory(&bytes)?.to_rgba8()),
    }
}

/// Fractional coverage of "inside a circle of `radius`" for a sample at
/// `dist` from its center, with a one-pixel feathered edge.
fn coverage(dist: f32, radius: f32) -> f32 {
    (radius - dist + 0.5).clamp(0.0, 1.0)
}

fn mix(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    std::array::from_fn(|i| (a[i] as f32 + (b[i] as f32 - a[i] as f32) * t) as u8)
}

fn shade(base: [u8; 3], delta: f32) -> [u8; 3] {
    std::array::from_fn(|i| (base[i] as f32 + delta).clamp(0.0, 255.0) as u8)
}

fn put(px: &mut Rgba<u8>, color: [u8; 3], alpha: f32) {
    *px = Rgba([color[0], color[1], color[2], (alpha.clamp(0.0, 1.0) * 255.0) as u8]);
}

/// A compact disc: silver grooved body, warm label ring, punched hub.
fn background_artwork() -> RgbaImage {
    let mut img = RgbaImage::new(BACKGROUND_SIZE, BACKGROUND_SIZE);
    let center = BACKGROUND_SIZE as f32 / 2.0;
    let radius = center - 4.0;
    let label = radius * 0.38;
    let hub = radius * 0.09;
    for (x, y, px) in img.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - center;
        let dy = y as f32 + 0.5 - center;
        let dist = (dx * dx + dy * dy).sqrt();
        let alpha = coverage(dist, radius) * (1.0 - coverage(dist, hub));
        if alpha <= 0.0 {
            continue;
        }
        let color = if dist < label {
            let ring = ((dist - hub) / (label - hub) * PI).sin() * 14.0;
            shade([233, 196, 126], ring)
        } else {
            let angle = dy.atan2(dx);
            let groove = (dist * 0.9).sin() * 5.0;
            let sheen = (angle * 2.0 + dist * 0.01).cos() * 11.0;
            let rim = if dist > radius - 10.0 { -18.0 } else { 0.0 };
            shade([199, 205, 215], groove + sheen + rim)
        };
        put(px, color, alpha);
    }
    img
}

fn builtin_sticker(kind: StickerKind) -> RgbaImage {
    match kind {
        StickerKind::Sparkle => sparkle_image(),
        StickerKind::Stamp => stamp_image(),
        StickerKind::Star => star_image(),
        StickerKind::Text => text_image(),
        // Custom stickers decode from uploads and never synthesize.
        StickerKind::Custom => RgbaImage::new(BUILTIN_SIZE, BUILTIN_SIZE),
    }
}

/// Four-pointed glint with a bright core.
fn sparkle_image() -> RgbaImage {
    let mut img = RgbaImage::new(BUILTIN_SIZE, BUILTIN_SIZE);
    let center = BUILTIN_SIZE as f32 / 2.0;
    let reach = center - 6.0;
    for (x, y, px) in img.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - center;
        let dy = y as f32 + 0.5 - center;
        let dist = (dx * dx + dy * dy).sqrt();
        let angle = dy.atan2(dx);
        let lobe = (angle * 2.0).cos().powi(4);
        let r = reach * (0.16 + 0.84 * lobe);
        let alpha = coverage(dist, r);
        if alpha <= 0.0 {
            continue;
        }
        let color = mix([255, 251, 235], [252, 211, 77], dist / reach + 0.25);
        put(px, color, alpha);
    }
    img
}

/// Postage-stamp: coral body, white inner frame.
fn stamp_image() -> RgbaImage {
    let mut img = RgbaImage::new(BUILTIN_SIZE, BUILTIN_SIZE);
    let center = BUILTIN_SIZE as f32 / 2.0;
    let half = center - 14.0;
    for (x, y, px) in img.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - center;
        let dy = y as f32 + 0.5 - center;
        let body = rounded_rect_distance(dx, dy, half, half, 12.0);
        let alpha = (0.5 - body).clamp(0.0, 1.0);
        if alpha <= 0.0 {
            continue;
        }
        let frame = rounded_rect_distance(dx, dy, half - 12.0, half - 12.0, 6.0);
        let color = if frame.abs() < 2.0 {
            [255, 255, 255]
        } else if frame < 0.0 {
            shade([244, 114, 94], (dy * 0.15).sin() * 6.0)
        } else {
            [234, 88, 76]
        };
        put(px, color, alpha);
    }
    img
}

/// Five-pointed star, tip up.
fn star_image() -> RgbaImage {
    let mut img = RgbaImage::new(BUILTIN_SIZE, BUILTIN_SIZE);
    let center = BUILTIN_SIZE as f32 / 2.0;
    let outer = center - 8.0;
    let inner = outer * 0.42;
    for (x, y, px) in img.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - center;
        let dy = y as f32 + 0.5 - center;
        let dist = (dx * dx + dy * dy).sqrt();
        let angle = dy.atan2(dx) + FRAC_PI_2;
        let phase = (angle / (2.0 * PI) * 5.0).rem_euclid(1.0);
        let spike = (phase - 0.5).abs() * 2.0;
        let r = inner + (outer - inner) * spike.powf(2.4);
        let alpha = coverage(dist, r);
        if alpha <= 0.0 {
            continue;
        }
        let color = mix([253, 230, 138], [245, 158, 11], dist / outer);
        put(px, color, alpha);
    }
    img
}

/// Speech-bubble label with an ellipsis.
fn text_image() -> RgbaImage {
    let mut img = RgbaImage::new(BUILTIN_SIZE, BUILTIN_SIZE);
    let center = BUILTIN_SIZE as f32 / 2.0;
    let dots = [-18.0_f32, 0.0, 18.0];
    for (x, y, px) in img.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - center;
        let dy = y as f32 + 0.5 - center;
        let body = rounded_rect_distance(dx, dy, 46.0, 32.0, 14.0);
        let alpha = (0.5 - body).clamp(0.0, 1.0);
        if alpha <= 0.0 {
            continue;
        }
        let mut color = [255, 255, 255];
        if body > -3.0 {
            color = [59, 130, 246];
        } else {
            for dot in dots {
                let d = ((dx - dot) * (dx - dot) + dy * dy).sqrt();
                if coverage(d, 5.0) > 0.0 {
                    color = [107, 114, 128];
                }
            }
        }
        put(px, color, alpha);
    }
    img
}

/// Signed distance to a rounded rectangle centered on the origin.
fn rounded_rect_distance(dx: f32, dy: f32, half_w: f32, half_h: f32, corner: f32) -> f32 {
    let qx = dx.abs() - half_w + corner;
    let qy = dy.abs() - half_h + corner;
    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    outside + qx.max(qy).min(0.0) - corner
}
