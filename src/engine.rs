use egui::{Pos2, Vec2, vec2};
use log::{debug, info};

use crate::geometry::{self, HandleLayout};
use crate::history::{History, HistoryEntry};
use crate::input::{PointerEvent, PointerPhase};
use crate::layout::ArtworkLayout;
use crate::scene::{Scene, clamp_to_canvas};
use crate::sticker::{MIN_STICKER_SIZE, Sticker, StickerId, StickerKind};

/// How a resize drag maps pointer motion to sticker dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeRule {
    /// Width and height follow the pointer independently; an aspect lock
    /// can be engaged to keep the ratio, driven by whichever local axis
    /// most exceeds the aspect line.
    FreeAspect,
    /// Uniform size from the dominant local axis; the ratio always holds.
    KeepAspect,
}

/// Z-direction for [`EditorEngine::reorder_step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderDirection {
    Raise,
    Lower,
}

/// Editor profile: canvas metrics plus the behavior switches that
/// distinguish the two shipped editors.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorOptions {
    pub canvas_size: Vec2,
    /// Horizontal nudge of the artwork's visual center.
    pub artwork_x_offset: f32,
    pub resize_rule: ResizeRule,
    /// Show a per-sticker delete button next to the selection?
    pub delete_handle: bool,
    /// Lift a sticker to the top of the z-order when it gets selected?
    pub raise_on_select: bool,
    /// File-name prefix for exported frames.
    pub export_prefix: String,
}

impl EditorOptions {
    /// The large editor: free-aspect resizing with an optional lock,
    /// explicit z-order buttons, no delete button.
    pub fn classic() -> Self {
        Self {
            canvas_size: vec2(400.0, 400.0),
            artwork_x_offset: 16.0,
            resize_rule: ResizeRule::FreeAspect,
            delete_handle: false,
            raise_on_select: false,
            export_prefix: "cd".to_owned(),
        }
    }

    /// The small editor: aspect-preserving resize, delete button on the
    /// selection, stickers rise to the top when selected.
    pub fn compact() -> Self {
        Self {
            canvas_size: vec2(300.0, 300.0),
            artwork_x_offset: 0.0,
            resize_rule: ResizeRule::KeepAspect,
            delete_handle: true,
            raise_on_select: true,
            export_prefix: "cd-v2".to_owned(),
        }
    }
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self::classic()
    }
}

/// What the embedding UI must do after an engine call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Effects {
    /// The scene's appearance changed; recompose the frame.
    pub repaint: bool,
}

impl Effects {
    pub const NONE: Effects = Effects { repaint: false };
    pub const REPAINT: Effects = Effects { repaint: true };
}

/// The active pointer gesture and its transient data. `before` is the
/// sticker snapshot taken at pointer-down; it becomes the undo side of
/// the single history entry written at release.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    Moving {
        index: usize,
        /// Pointer position in the sticker's rotation-compensated frame,
        /// relative to its center, captured at grab time.
        grab: Vec2,
        before: Sticker,
    },
    Resizing {
        index: usize,
        before: Sticker,
    },
    Rotating {
        index: usize,
        /// Angular offset between the grab angle and the rotation.
        grip: f32,
        before: Sticker,
    },
}

impl Gesture {
    fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }
}

/// Owns the whole editing state: sticker scene, selection, undo history,
/// and the in-flight gesture. All mutation funnels through here; the UI
/// feeds pointer input to [`dispatch`](Self::dispatch) and queries back
/// what to draw.
///
/// ```text
///            down on handle / body            up / cancel
///   Idle ────────────────────────▶ Moving   ──────────────▶ Idle
///                                  Resizing    (exactly one
///                                  Rotating     history entry)
/// ```
///
/// Pointer-down while a gesture runs is ignored, as are history and
/// structural operations, so the index a gesture captured stays valid for
/// its whole lifetime.
pub struct EditorEngine {
    options: EditorOptions,
    scene: Scene,
    history: History,
    gesture: Gesture,
    aspect_lock: bool,
    artwork_size: Option<Vec2>,
    next_id: u64,
}

impl EditorEngine {
    pub fn new(options: EditorOptions) -> Self {
        Self {
            options,
            scene: Scene::new(),
            history: History::new(),
            gesture: Gesture::Idle,
            aspect_lock: false,
            artwork_size: None,
            next_id: 1,
        }
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn gesture_active(&self) -> bool {
        !self.gesture.is_idle()
    }

    /// Engages or releases the aspect lock for free-aspect resizing. The
    /// UI drives this from the Shift key or its ratio toggle; it has no
    /// effect under [`ResizeRule::KeepAspect`].
    pub fn set_aspect_lock(&mut self, locked: bool) {
        self.aspect_lock = locked;
    }

    pub fn aspect_lock(&self) -> bool {
        self.aspect_lock
    }

    /// Tells the engine how large the background artwork is, once it has
    /// loaded. New stickers center on the fitted artwork from then on.
    pub fn set_artwork_size(&mut self, size: Vec2) {
        self.artwork_size = Some(size);
    }

    /// Where new stickers get centered: the fitted artwork's visual
    /// center, or the canvas center while the artwork is still loading.
    pub fn artwork_center(&self) -> Pos2 {
        let canvas = self.options.canvas_size;
        match self.artwork_size {
            Some(artwork) => {
                ArtworkLayout::fit(canvas, artwork, self.options.artwork_x_offset).center
            }
            None => (canvas / 2.0).to_pos2(),
        }
    }

    /// Places a new sticker of `kind` on top of the z-order, selects it,
    /// and records an `Add`. For [`StickerKind::Custom`] the caller is
    /// expected to register the uploaded bytes under the returned id.
    pub fn add_sticker(&mut self, kind: StickerKind) -> Option<StickerId> {
        if !self.gesture.is_idle() {
            return None;
        }
        let id = self.allocate_id();
        let sticker = Sticker::new(id, kind, self.artwork_center());
        let index = self.scene.push(sticker);
        self.scene.select(index);
        self.history.record(HistoryEntry::Add { sticker, index });
        info!("added {} sticker {id} at z {index}", kind.label());
        Some(id)
    }

    /// Deletes the selected sticker, recording a `Delete`.
    pub fn delete_selected(&mut self) -> bool {
        if !self.gesture.is_idle() {
            return false;
        }
        let Some(index) = self.scene.selected_index() else {
            return false;
        };
        self.delete_at(index);
        true
    }

    /// Deletes every sticker, topmost first, recording one `Delete` per
    /// sticker so the wipe unwinds step by step.
    pub fn clear_stickers(&mut self) -> bool {
        if !self.gesture.is_idle() || self.scene.is_empty() {
            return false;
        }
        while !self.scene.is_empty() {
            self.delete_at(self.scene.len() - 1);
        }
        info!("cleared all stickers");
        true
    }

    /// Swaps the sticker at `index` with its immediate z-neighbor,
    /// recording a `Reorder`. No-op at the z-order boundary. Selection
    /// stays on whichever sticker it pointed at.
    pub fn reorder_step(&mut self, index: usize, direction: ReorderDirection) -> bool {
        if !self.gesture.is_idle() || index >= self.scene.len() {
            return false;
        }
        let target = match direction {
            ReorderDirection::Raise => index + 1,
            ReorderDirection::Lower => index.wrapping_sub(1),
        };
        if target >= self.scene.len() {
            return false;
        }
        self.scene.shift(index, target);
        match self.scene.selected_index() {
            Some(selected) if selected == index => self.scene.select(target),
            Some(selected) if selected == target => self.scene.select(index),
            _ => {}
        }
        self.history.record(HistoryEntry::Reorder {
            index: target,
            previous: index,
        });
        debug!("reordered z {index} -> {target}");
        true
    }

    pub fn raise_selected(&mut self) -> bool {
        self.scene
            .selected_index()
            .is_some_and(|index| self.reorder_step(index, ReorderDirection::Raise))
    }

    pub fn lower_selected(&mut self) -> bool {
        self.scene
            .selected_index()
            .is_some_and(|index| self.reorder_step(index, ReorderDirection::Lower))
    }

    pub fn undo(&mut self) -> bool {
        if !self.gesture.is_idle() {
            return false;
        }
        self.history.undo(&mut self.scene)
    }

    pub fn redo(&mut self) -> bool {
        if !self.gesture.is_idle() {
            return false;
        }
        self.history.redo(&mut self.scene)
    }

    /// Replaces the scene wholesale (persistence restore). Selection and
    /// history reset; the id counter moves past every loaded id.
    pub fn load_scene(&mut self, stickers: Vec<Sticker>) {
        self.gesture = Gesture::Idle;
        if let Some(max) = stickers.iter().map(|s| s.id.0).max() {
            self.next_id = self.next_id.max(max + 1);
        }
        info!("loading scene with {} stickers", stickers.len());
        self.scene = Scene::from_stickers(stickers);
        self.history.clear();
    }

    /// Feeds one pointer event through the gesture state machine.
    pub fn dispatch(&mut self, event: PointerEvent) -> Effects {
        match event.phase {
            PointerPhase::Down => self.pointer_down(event.pos),
            PointerPhase::Move => self.pointer_move(event.pos),
            PointerPhase::Up | PointerPhase::Cancel => self.pointer_up(),
        }
    }

    fn allocate_id(&mut self) -> StickerId {
        let id = StickerId(self.next_id);
        self.next_id += 1;
        id
    }

    fn delete_at(&mut self, index: usize) {
        let sticker = self.scene.remove(index);
        self.scene.clear_selection();
        self.history.record(HistoryEntry::Delete { sticker, index });
        info!("deleted sticker {} from z {index}", sticker.id);
    }

    /// Pointer-down resolution order: the selected sticker's handles
    /// first (delete, resize, rotate), then a topmost-first body scan,
    /// and finally deselection on a miss.
    fn pointer_down(&mut self, pos: Pos2) -> Effects {
        if !self.gesture.is_idle() {
            return Effects::NONE;
        }

        if let Some(index) = self.scene.selected_index() {
            if let Some(&sticker) = self.scene.get(index) {
                let handles = HandleLayout::of(&sticker, self.options.delete_handle);
                if handles.hits_delete(pos) {
                    self.delete_at(index);
                    return Effects::REPAINT;
                }
                if handles.hits_resize(pos) {
                    self.gesture = Gesture::Resizing {
                        index,
                        before: sticker,
                    };
                    return Effects::NONE;
                }
                if handles.hits_rotate(pos) {
                    self.gesture = Gesture::Rotating {
                        index,
                        grip: geometry::rotation_grip(pos, &sticker),
                        before: sticker,
                    };
                    return Effects::NONE;
                }
            }
        }

        for i in (0..self.scene.len()).rev() {
            let sticker = self.scene.stickers()[i];
            if !geometry::hit_test(pos, &sticker) {
                continue;
            }
            let was_selected = self.scene.selected_index() == Some(i);
            let mut index = i;
            if self.options.raise_on_select {
                index = self.scene.move_to_top(i);
                if index != i {
                    self.history.record(HistoryEntry::Reorder { index, previous: i });
                }
            }
            self.scene.select(index);
            self.gesture = Gesture::Moving {
                index,
                grab: geometry::to_local(pos, &sticker),
                before: sticker,
            };
            return if was_selected && index == i {
                Effects::NONE
            } else {
                Effects::REPAINT
            };
        }

        let had_selection = self.scene.selected_index().is_some();
        self.scene.clear_selection();
        if had_selection {
            Effects::REPAINT
        } else {
            Effects::NONE
        }
    }

    fn pointer_move(&mut self, pos: Pos2) -> Effects {
        match self.gesture {
            Gesture::Idle => Effects::NONE,
            Gesture::Moving { index, grab, .. } => {
                let canvas = self.options.canvas_size;
                let Some(sticker) = self.scene.get_mut(index) else {
                    return Effects::NONE;
                };
                let offset = geometry::rotate_point(grab, sticker.rotation);
                let size = sticker.scaled_size();
                sticker.x = pos.x - offset.x - size.x / 2.0;
                sticker.y = pos.y - offset.y - size.y / 2.0;
                clamp_to_canvas(sticker, canvas);
                Effects::REPAINT
            }
            Gesture::Resizing { index, .. } => {
                let rule = self.options.resize_rule;
                let locked = self.aspect_lock;
                let Some(sticker) = self.scene.get_mut(index) else {
                    return Effects::NONE;
                };
                let local = geometry::resize_local(pos, sticker);
                let ratio = sticker.aspect_ratio();
                match rule {
                    ResizeRule::KeepAspect => {
                        let size = local.x.max(local.y).max(MIN_STICKER_SIZE);
                        sticker.width = size;
                        sticker.height = size / ratio;
                    }
                    ResizeRule::FreeAspect if locked => {
                        // Drive from whichever axis is ahead of the
                        // aspect line, derive the other from the ratio.
                        if local.x / local.y > ratio {
                            sticker.width = local.x.max(MIN_STICKER_SIZE);
                            sticker.height = (local.x / ratio).max(MIN_STICKER_SIZE);
                        } else {
                            sticker.height = local.y.max(MIN_STICKER_SIZE);
                            sticker.width = (local.y * ratio).max(MIN_STICKER_SIZE);
                        }
                    }
                    ResizeRule::FreeAspect => {
                        sticker.width = local.x.max(MIN_STICKER_SIZE);
                        sticker.height = local.y.max(MIN_STICKER_SIZE);
                    }
                }
                Effects::REPAINT
            }
            Gesture::Rotating { index, grip, .. } => {
                let Some(sticker) = self.scene.get_mut(index) else {
                    return Effects::NONE;
                };
                let center = sticker.center();
                sticker.rotation = geometry::rotation_toward(pos, center, grip);
                Effects::REPAINT
            }
        }
    }

    /// Commits the gesture: exactly one transform entry, `before` from
    /// pointer-down, `after` from right now, however many moves happened
    /// in between (including none).
    fn pointer_up(&mut self) -> Effects {
        let entry = match self.gesture {
            Gesture::Idle => None,
            Gesture::Moving { index, before, .. } => {
                self.scene.get(index).map(|after| HistoryEntry::Move {
                    index,
                    before,
                    after: *after,
                })
            }
            Gesture::Resizing { index, before } => {
                self.scene.get(index).map(|after| HistoryEntry::Resize {
                    index,
                    before,
                    after: *after,
                })
            }
            Gesture::Rotating { index, before, .. } => {
                self.scene.get(index).map(|after| HistoryEntry::Rotate {
                    index,
                    before,
                    after: *after,
                })
            }
        };
        self.gesture = Gesture::Idle;
        if let Some(entry) = entry {
            self.history.record(entry);
        }
        Effects::NONE
    }
}
