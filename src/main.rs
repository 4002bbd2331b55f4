#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use eframe_stickers::{EditorOptions, StickerApp};

#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    env_logger::init();

    let options = if std::env::args().any(|arg| arg == "--compact") {
        EditorOptions::compact()
    } else {
        EditorOptions::classic()
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 480.0])
            .with_title("Stickers"),
        ..Default::default()
    };
    eframe::run_native(
        "eframe_stickers",
        native_options,
        Box::new(|cc| Ok(Box::new(StickerApp::new(cc, options)))),
    )
}

#[cfg(target_arch = "wasm32")]
fn main() {
    use eframe::wasm_bindgen::JsCast as _;

    wasm_bindgen_futures::spawn_local(async {
        let document = web_sys::window()
            .expect("no window")
            .document()
            .expect("no document");
        let canvas = document
            .get_element_by_id("the_canvas_id")
            .expect("no element with id the_canvas_id")
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .expect("the_canvas_id is not a canvas");

        let result = eframe::WebRunner::new()
            .start(
                canvas,
                eframe::WebOptions::default(),
                Box::new(|cc| Ok(Box::new(StickerApp::new(cc, EditorOptions::classic())))),
            )
            .await;

        if let Err(err) = result {
            log::error!("failed to start eframe: {err:?}");
        }
    });
}
