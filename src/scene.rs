use egui::Vec2;

use crate::sticker::Sticker;

/// Ordered sticker collection plus the selection.
///
/// Vector order is the z-order: index 0 draws first (bottommost) and the
/// last index draws last (topmost). Appending therefore places on top,
/// and hit testing walks the same order in reverse. Ids are unique within
/// the sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    stickers: Vec<Sticker>,
    selected: Option<usize>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_stickers(stickers: Vec<Sticker>) -> Self {
        Self {
            stickers,
            selected: None,
        }
    }

    pub fn stickers(&self) -> &[Sticker] {
        &self.stickers
    }

    pub fn len(&self) -> usize {
        self.stickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stickers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Sticker> {
        self.stickers.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Sticker> {
        self.stickers.get_mut(index)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Sticker> {
        self.selected.and_then(|index| self.stickers.get(index))
    }

    pub fn select(&mut self, index: usize) {
        debug_assert!(index < self.stickers.len());
        self.selected = Some(index);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Appends on top of the z-order and returns the new index.
    pub fn push(&mut self, sticker: Sticker) -> usize {
        self.stickers.push(sticker);
        self.stickers.len() - 1
    }

    /// Reinserts at a specific z-slot. The selection is left alone;
    /// history application sets it explicitly afterwards.
    pub fn insert(&mut self, index: usize, sticker: Sticker) {
        self.stickers.insert(index, sticker);
    }

    /// Deletes and compacts. Clears the selection if it pointed at or
    /// past the removed slot, so it never dangles.
    pub fn remove(&mut self, index: usize) -> Sticker {
        let sticker = self.stickers.remove(index);
        if self.selected.is_some_and(|selected| selected >= index) {
            self.selected = None;
        }
        sticker
    }

    /// Overwrites the sticker at `index` (history snapshot restore).
    pub fn replace(&mut self, index: usize, sticker: Sticker) {
        if let Some(slot) = self.stickers.get_mut(index) {
            *slot = sticker;
        }
    }

    /// Takes the sticker at `from` out and reinserts it at `to`, shifting
    /// everything between by one. Adjacent indices degenerate to a swap.
    /// Selection is the caller's business.
    pub fn shift(&mut self, from: usize, to: usize) {
        let sticker = self.stickers.remove(from);
        self.stickers.insert(to, sticker);
    }

    /// Re-appends the sticker at `index` at the top of the z-order and
    /// returns its new index.
    pub fn move_to_top(&mut self, index: usize) -> usize {
        let top = self.stickers.len() - 1;
        self.shift(index, top);
        top
    }
}

/// Clamps a sticker's top-left so its unrotated scaled bounds stay on the
/// canvas. Rotation is deliberately ignored, so corners of a rotated
/// sticker may poke past the edge; a sticker larger than the canvas pins
/// to the origin (the min bound wins).
pub fn clamp_to_canvas(sticker: &mut Sticker, canvas: Vec2) {
    let size = sticker.scaled_size();
    sticker.x = sticker.x.min(canvas.x - size.x).max(0.0);
    sticker.y = sticker.y.min(canvas.y - size.y).max(0.0);
}
