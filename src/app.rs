use egui::{Color32, Pos2, Rect, Sense, TextureHandle, TextureOptions, pos2, vec2};
use log::{info, warn};

use crate::assets::ImageStore;
use crate::engine::{EditorEngine, EditorOptions, ResizeRule};
use crate::input::PointerEvent;
use crate::persistence::{SavedSticker, ScenePersistence};
use crate::renderer::SceneRenderer;
use crate::sticker::StickerKind;

/// The editor application: owns the engine, the image store, the CPU
/// compositor, and the persistence collaborator, and translates egui
/// input into engine pointer events.
///
/// The composed frame lives in a texture that is only re-uploaded when
/// something marked it dirty: an engine effect, an image becoming ready,
/// or a structural operation from the toolbar.
pub struct StickerApp {
    engine: EditorEngine,
    images: ImageStore,
    renderer: SceneRenderer,
    persistence: ScenePersistence,
    texture: Option<TextureHandle>,
    frame_dirty: bool,
    pointer_down: bool,
    /// Persistent ratio toggle; OR-ed with the live Shift key.
    aspect_toggle: bool,
    artwork_announced: bool,
    status: Option<String>,
}

impl StickerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, options: EditorOptions) -> Self {
        let renderer = SceneRenderer::new(&options);
        Self {
            engine: EditorEngine::new(options),
            images: ImageStore::new(),
            renderer,
            persistence: ScenePersistence::new("sticker_scene.json"),
            texture: None,
            frame_dirty: true,
            pointer_down: false,
            aspect_toggle: false,
            artwork_announced: false,
            status: None,
        }
    }

    /// Drains finished image loads and tells the engine about the artwork
    /// once it is ready, so new stickers center on the fitted artwork.
    fn poll_images(&mut self) {
        if self.images.poll() {
            self.frame_dirty = true;
        }
        if !self.artwork_announced {
            if let Some(background) = self.images.background() {
                self.engine.set_artwork_size(vec2(
                    background.width() as f32,
                    background.height() as f32,
                ));
                self.artwork_announced = true;
                self.frame_dirty = true;
            }
        }
    }

    /// Turns each dropped image file into a custom sticker.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            let bytes = if let Some(bytes) = &file.bytes {
                Some(bytes.to_vec())
            } else if let Some(path) = &file.path {
                #[cfg(not(target_arch = "wasm32"))]
                {
                    match std::fs::read(path) {
                        Ok(bytes) => Some(bytes),
                        Err(err) => {
                            warn!("failed to read dropped file {}: {err}", path.display());
                            None
                        }
                    }
                }
                #[cfg(target_arch = "wasm32")]
                {
                    let _ = path;
                    None
                }
            } else {
                None
            };
            let Some(bytes) = bytes else { continue };
            if let Some(id) = self.engine.add_sticker(StickerKind::Custom) {
                info!("ingesting dropped image as sticker {id}");
                self.images.load_upload(id, bytes);
                self.frame_dirty = true;
            }
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.heading("Stickers");
        for kind in StickerKind::BUILTINS {
            if ui.button(kind.label()).clicked() && self.engine.add_sticker(kind).is_some() {
                self.frame_dirty = true;
            }
        }
        ui.separator();

        let has_selection = self.engine.scene().selected_index().is_some();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(has_selection, egui::Button::new("Raise"))
                .clicked()
                && self.engine.raise_selected()
            {
                self.frame_dirty = true;
            }
            if ui
                .add_enabled(has_selection, egui::Button::new("Lower"))
                .clicked()
                && self.engine.lower_selected()
            {
                self.frame_dirty = true;
            }
        });
        if ui
            .add_enabled(has_selection, egui::Button::new("Delete selected"))
            .clicked()
            && self.engine.delete_selected()
        {
            self.frame_dirty = true;
        }
        if ui
            .add_enabled(!self.engine.scene().is_empty(), egui::Button::new("Clear all"))
            .clicked()
            && self.engine.clear_stickers()
        {
            self.frame_dirty = true;
        }
        ui.separator();

        ui.horizontal(|ui| {
            if ui
                .add_enabled(self.engine.can_undo(), egui::Button::new("Undo"))
                .clicked()
                && self.engine.undo()
            {
                self.frame_dirty = true;
            }
            if ui
                .add_enabled(self.engine.can_redo(), egui::Button::new("Redo"))
                .clicked()
                && self.engine.redo()
            {
                self.frame_dirty = true;
            }
        });

        if self.engine.options().resize_rule == ResizeRule::FreeAspect {
            ui.checkbox(&mut self.aspect_toggle, "Lock aspect ratio");
        }
        ui.separator();

        if ui.button("Save scene").clicked() {
            match self.persistence.save(self.engine.scene(), &self.images) {
                Ok(()) => self.status = Some("scene saved".to_owned()),
                Err(err) => {
                    warn!("save failed: {err}");
                    self.status = Some(format!("save failed: {err}"));
                }
            }
        }
        if ui.button("Load scene").clicked() {
            self.load_scene();
        }
        #[cfg(not(target_arch = "wasm32"))]
        if ui.button("Export PNG").clicked() {
            self.export_png();
        }

        if let Some(status) = &self.status {
            ui.separator();
            ui.label(status.clone());
        }
    }

    fn load_scene(&mut self) {
        match self.persistence.load() {
            Ok(Some(records)) => {
                for record in &records {
                    if let Some(bytes) = &record.image_bytes {
                        self.images.load_upload(record.id, bytes.clone());
                    }
                }
                self.engine
                    .load_scene(records.iter().map(SavedSticker::to_sticker).collect());
                self.status = Some(format!("loaded {} stickers", records.len()));
                self.frame_dirty = true;
            }
            Ok(None) => self.status = Some("nothing to load".to_owned()),
            Err(err) => {
                warn!("load failed: {err}");
                self.status = Some(format!("load failed: {err}"));
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn export_png(&mut self) {
        let frame = self.renderer.compose(
            self.engine.scene(),
            self.engine.scene().selected_index(),
            &self.images,
            true,
        );
        match crate::export::export_png(
            &frame,
            &self.engine.options().export_prefix,
            std::path::Path::new("."),
        ) {
            Ok(path) => self.status = Some(format!("exported {}", path.display())),
            Err(err) => {
                warn!("export failed: {err}");
                self.status = Some(format!("export failed: {err}"));
            }
        }
    }

    /// Maps egui pointer state over the canvas rect onto the engine's
    /// event stream: press → Down, held → Move, release → Up, and the
    /// pointer leaving the canvas mid-gesture → Cancel.
    fn forward_pointer(&mut self, ctx: &egui::Context, response: &egui::Response, rect: Rect) {
        let to_canvas = |pos: Pos2| pos2(pos.x - rect.min.x, pos.y - rect.min.y);
        let pointer = ctx.input(|i| i.pointer.latest_pos());
        let down = ctx.input(|i| i.pointer.primary_down());

        let event = if !self.pointer_down {
            match pointer {
                Some(pos) if down && response.hovered() && rect.contains(pos) => {
                    self.pointer_down = true;
                    Some(PointerEvent::down(to_canvas(pos)))
                }
                _ => None,
            }
        } else if down {
            match pointer {
                Some(pos) if rect.contains(pos) => Some(PointerEvent::moved(to_canvas(pos))),
                Some(pos) => {
                    self.pointer_down = false;
                    Some(PointerEvent::cancel(to_canvas(pos)))
                }
                None => {
                    self.pointer_down = false;
                    Some(PointerEvent::cancel(to_canvas(rect.min)))
                }
            }
        } else {
            self.pointer_down = false;
            let pos = pointer.map(to_canvas).unwrap_or(pos2(0.0, 0.0));
            Some(PointerEvent::up(pos))
        };

        if let Some(event) = event {
            if self.engine.dispatch(event).repaint {
                self.frame_dirty = true;
            }
        }
    }

    fn canvas(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let size = self.renderer.canvas_size();
        let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());

        let shift = ctx.input(|i| i.modifiers.shift);
        self.engine.set_aspect_lock(shift || self.aspect_toggle);

        self.forward_pointer(ctx, &response, rect);

        if self.frame_dirty || self.texture.is_none() {
            let frame = self.renderer.compose(
                self.engine.scene(),
                self.engine.scene().selected_index(),
                &self.images,
                false,
            );
            let pixels = egui::ColorImage::from_rgba_unmultiplied(
                [frame.width() as usize, frame.height() as usize],
                frame.as_raw(),
            );
            match &mut self.texture {
                Some(texture) => texture.set(pixels, TextureOptions::LINEAR),
                None => {
                    self.texture = Some(ctx.load_texture("scene", pixels, TextureOptions::LINEAR));
                }
            }
            self.frame_dirty = false;
        }

        if let Some(texture) = &self.texture {
            ui.painter().image(
                texture.id(),
                rect,
                Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                Color32::WHITE,
            );
        }
    }
}

impl eframe::App for StickerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_images();
        self.handle_dropped_files(ctx);

        egui::SidePanel::left("toolbar")
            .resizable(false)
            .default_width(160.0)
            .show(ctx, |ui| self.toolbar(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                self.canvas(ctx, ui);
                if let Some(sticker) = self.engine.scene().selected() {
                    ui.label(format!(
                        "{} {} · {:.0}×{:.0} · {:.0}°",
                        sticker.kind.label(),
                        sticker.id,
                        sticker.width * sticker.scale,
                        sticker.height * sticker.scale,
                        sticker.rotation.to_degrees(),
                    ));
                }
            });
        });

        // Keep painting while image jobs are in flight so readiness lands
        // without waiting for user input.
        if self.images.has_pending() {
            ctx.request_repaint_after(std::time::Duration::from_millis(16));
        }
    }
}
