use std::f32::consts::FRAC_PI_2;

use egui::{Pos2, pos2, vec2};

use eframe_stickers::geometry::HandleLayout;
use eframe_stickers::{
    EditorEngine, EditorOptions, HistoryEntry, PointerEvent, StickerKind,
};

const EPS: f32 = 0.001;

fn engine(options: EditorOptions) -> EditorEngine {
    let mut engine = EditorEngine::new(options);
    engine.set_artwork_size(vec2(512.0, 512.0));
    engine
}

fn drag(engine: &mut EditorEngine, from: Pos2, to: Pos2) {
    engine.dispatch(PointerEvent::down(from));
    engine.dispatch(PointerEvent::moved(to));
    engine.dispatch(PointerEvent::up(to));
}

fn selected_sticker(engine: &EditorEngine) -> eframe_stickers::Sticker {
    *engine.scene().selected().expect("a sticker is selected")
}

#[test]
fn click_selects_and_drag_moves_under_the_grab_point() {
    let mut engine = engine(EditorOptions::classic());
    engine.add_sticker(StickerKind::Star).unwrap();
    let center = selected_sticker(&engine).center();

    // Grab 10 right and 5 below the center; the grab point stays under
    // the pointer for the whole drag.
    let grab = pos2(center.x + 10.0, center.y + 5.0);
    let target = pos2(120.0, 140.0);
    drag(&mut engine, grab, target);

    let moved = selected_sticker(&engine);
    assert!((moved.center().x - (target.x - 10.0)).abs() < EPS);
    assert!((moved.center().y - (target.y - 5.0)).abs() < EPS);
}

#[test]
fn move_clamps_to_the_canvas() {
    let mut engine = engine(EditorOptions::classic());
    engine.add_sticker(StickerKind::Star).unwrap();
    let center = selected_sticker(&engine).center();

    drag(&mut engine, center, pos2(1000.0, -500.0));

    let sticker = selected_sticker(&engine);
    assert!((sticker.x - 350.0).abs() < EPS); // 400 - 50*1
    assert!((sticker.y - 0.0).abs() < EPS);
}

#[test]
fn one_gesture_writes_exactly_one_entry_with_the_start_snapshot() {
    let mut engine = engine(EditorOptions::classic());
    engine.add_sticker(StickerKind::Sparkle).unwrap();
    let before = selected_sticker(&engine);
    let center = before.center();

    engine.dispatch(PointerEvent::down(center));
    for step in 1..=20 {
        engine.dispatch(PointerEvent::moved(pos2(
            center.x + step as f32 * 3.0,
            center.y,
        )));
    }
    engine.dispatch(PointerEvent::up(pos2(center.x + 60.0, center.y)));

    let entries = engine.history().entries();
    assert_eq!(entries.len(), 2); // Add, then one Move
    match entries[1] {
        HistoryEntry::Move { before: b, after, .. } => {
            assert_eq!(b, before);
            assert_eq!(after, selected_sticker(&engine));
        }
        ref other => panic!("expected a Move entry, got {other:?}"),
    }
}

#[test]
fn cancel_commits_like_release() {
    let mut engine = engine(EditorOptions::classic());
    engine.add_sticker(StickerKind::Star).unwrap();
    let center = selected_sticker(&engine).center();

    engine.dispatch(PointerEvent::down(center));
    engine.dispatch(PointerEvent::moved(pos2(center.x + 30.0, center.y)));
    engine.dispatch(PointerEvent::cancel(pos2(center.x + 30.0, center.y)));

    assert!(!engine.gesture_active());
    assert_eq!(engine.history().entries().len(), 2);
    assert!((selected_sticker(&engine).center().x - (center.x + 30.0)).abs() < EPS);
}

#[test]
fn free_aspect_resize_follows_both_axes_with_a_floor() {
    let mut engine = engine(EditorOptions::classic());
    engine.add_sticker(StickerKind::Stamp).unwrap();
    let sticker = selected_sticker(&engine);
    let handles = HandleLayout::of(&sticker, false);

    // Drag the corner to local (85, 65) relative to the top-left.
    let target = pos2(sticker.x + 85.0, sticker.y + 65.0);
    drag(&mut engine, handles.resize, target);
    let resized = selected_sticker(&engine);
    assert!((resized.width - 85.0).abs() < EPS);
    assert!((resized.height - 65.0).abs() < EPS);

    // Collapsing the corner bottoms out at the size floor.
    let handles = HandleLayout::of(&resized, false);
    drag(
        &mut engine,
        handles.resize,
        pos2(resized.x - 40.0, resized.y - 40.0),
    );
    let floored = selected_sticker(&engine);
    assert!((floored.width - 20.0).abs() < EPS);
    assert!((floored.height - 20.0).abs() < EPS);
}

#[test]
fn aspect_lock_preserves_the_ratio() {
    let mut engine = engine(EditorOptions::classic());
    engine.add_sticker(StickerKind::Star).unwrap();
    engine.set_aspect_lock(true);
    let sticker = selected_sticker(&engine);
    let ratio = sticker.width / sticker.height;
    let handles = HandleLayout::of(&sticker, false);

    // Pull mostly along x; the lock derives the height.
    drag(
        &mut engine,
        handles.resize,
        pos2(sticker.x + 100.0, sticker.y + 40.0),
    );
    let resized = selected_sticker(&engine);
    assert!((resized.width - 100.0).abs() < EPS);
    assert!((resized.width / resized.height - ratio).abs() < EPS);
}

#[test]
fn keep_aspect_profile_resizes_uniformly() {
    let mut engine = engine(EditorOptions::compact());
    engine.add_sticker(StickerKind::Star).unwrap();
    let sticker = selected_sticker(&engine);
    let ratio = sticker.width / sticker.height;
    let handles = HandleLayout::of(&sticker, true);

    drag(
        &mut engine,
        handles.resize,
        pos2(sticker.x + 90.0, sticker.y + 40.0),
    );
    let resized = selected_sticker(&engine);
    // The dominant local axis drives the size.
    assert!((resized.width - 90.0).abs() < EPS);
    assert!((resized.width / resized.height - ratio).abs() < EPS);
    match engine.history().entries().last() {
        Some(HistoryEntry::Resize { .. }) => {}
        other => panic!("expected a Resize entry, got {other:?}"),
    }
}

#[test]
fn rotate_gesture_tracks_the_pointer_angle() {
    let mut engine = engine(EditorOptions::classic());
    engine.add_sticker(StickerKind::Text).unwrap();
    let sticker = selected_sticker(&engine);
    let center = sticker.center();
    let handles = HandleLayout::of(&sticker, false);

    engine.dispatch(PointerEvent::down(handles.rotate));
    // Swing the pointer from above the center to its right: a quarter
    // turn clockwise.
    engine.dispatch(PointerEvent::moved(pos2(center.x + 80.0, center.y)));
    engine.dispatch(PointerEvent::up(pos2(center.x + 80.0, center.y)));

    let rotated = selected_sticker(&engine);
    assert!((rotated.rotation - FRAC_PI_2).abs() < EPS);
    // Rotation is about the center, which stays put.
    assert!((rotated.center().x - center.x).abs() < EPS);
    assert!((rotated.center().y - center.y).abs() < EPS);
    match engine.history().entries().last() {
        Some(HistoryEntry::Rotate { .. }) => {}
        other => panic!("expected a Rotate entry, got {other:?}"),
    }
}

#[test]
fn grabbing_the_rotate_handle_preserves_the_current_angle() {
    let mut engine = engine(EditorOptions::classic());
    engine.add_sticker(StickerKind::Star).unwrap();
    let sticker = selected_sticker(&engine);
    let handles = HandleLayout::of(&sticker, false);

    // Press and release without moving: the rotation must not jump.
    engine.dispatch(PointerEvent::down(handles.rotate));
    engine.dispatch(PointerEvent::up(handles.rotate));
    assert!((selected_sticker(&engine).rotation - 0.0).abs() < EPS);
}

#[test]
fn delete_handle_removes_the_selection_immediately() {
    let mut engine = engine(EditorOptions::compact());
    engine.add_sticker(StickerKind::Sparkle).unwrap();
    let sticker = selected_sticker(&engine);
    let handles = HandleLayout::of(&sticker, true);
    let delete = handles.delete.expect("compact profile has a delete handle");

    engine.dispatch(PointerEvent::down(delete));
    assert!(!engine.gesture_active());
    assert!(engine.scene().is_empty());
    assert_eq!(engine.scene().selected_index(), None);
    match engine.history().entries().last() {
        Some(HistoryEntry::Delete { index: 0, .. }) => {}
        other => panic!("expected a Delete entry, got {other:?}"),
    }
}

#[test]
fn classic_profile_has_no_delete_handle() {
    let mut engine = engine(EditorOptions::classic());
    engine.add_sticker(StickerKind::Sparkle).unwrap();
    let sticker = selected_sticker(&engine);
    let compact_delete = HandleLayout::of(&sticker, true)
        .delete
        .expect("reference layout");

    // The same spot is empty canvas in the classic profile: the click
    // falls through and clears the selection instead.
    engine.dispatch(PointerEvent::down(compact_delete));
    engine.dispatch(PointerEvent::up(compact_delete));
    assert_eq!(engine.scene().len(), 1);
    assert_eq!(engine.scene().selected_index(), None);
}

#[test]
fn selecting_raises_to_top_only_when_the_index_changes() {
    let mut engine = engine(EditorOptions::compact());
    engine.add_sticker(StickerKind::Star).unwrap();
    let a = selected_sticker(&engine);
    // Park A off to the left so B doesn't cover it.
    drag(&mut engine, a.center(), pos2(60.0, 150.0));
    let a_center = selected_sticker(&engine).center();
    engine.add_sticker(StickerKind::Stamp).unwrap();

    let reorders = |engine: &EditorEngine| {
        engine
            .history()
            .entries()
            .iter()
            .filter(|e| matches!(e, HistoryEntry::Reorder { .. }))
            .count()
    };
    assert_eq!(reorders(&engine), 0);

    // Clicking A lifts it above B and records one Reorder.
    drag(&mut engine, a_center, a_center);
    assert_eq!(engine.scene().stickers()[1].id, a.id);
    assert_eq!(engine.scene().selected_index(), Some(1));
    assert_eq!(reorders(&engine), 1);

    // Clicking it again finds it already topmost: no second Reorder.
    drag(&mut engine, a_center, a_center);
    assert_eq!(reorders(&engine), 1);
}

#[test]
fn classic_profile_keeps_z_order_on_select() {
    let mut engine = engine(EditorOptions::classic());
    engine.add_sticker(StickerKind::Star).unwrap();
    let a = selected_sticker(&engine);
    drag(&mut engine, a.center(), pos2(80.0, 200.0));
    let a_center = selected_sticker(&engine).center();
    engine.add_sticker(StickerKind::Stamp).unwrap();

    drag(&mut engine, a_center, a_center);
    assert_eq!(engine.scene().stickers()[0].id, a.id);
    assert_eq!(engine.scene().selected_index(), Some(0));
    assert!(
        !engine
            .history()
            .entries()
            .iter()
            .any(|e| matches!(e, HistoryEntry::Reorder { .. }))
    );
}

#[test]
fn clicking_empty_canvas_deselects_without_history() {
    let mut engine = engine(EditorOptions::classic());
    engine.add_sticker(StickerKind::Star).unwrap();
    let recorded = engine.history().entries().len();

    engine.dispatch(PointerEvent::down(pos2(390.0, 390.0)));
    engine.dispatch(PointerEvent::up(pos2(390.0, 390.0)));

    assert_eq!(engine.scene().selected_index(), None);
    assert_eq!(engine.history().entries().len(), recorded);
}

#[test]
fn topmost_sticker_wins_the_body_scan() {
    let mut engine = engine(EditorOptions::classic());
    engine.add_sticker(StickerKind::Star).unwrap();
    let below = selected_sticker(&engine);
    engine.add_sticker(StickerKind::Stamp).unwrap();
    let above = selected_sticker(&engine);
    // Both share the artwork center; the later (topmost) one takes the
    // click.
    drag(&mut engine, below.center(), below.center());
    assert_eq!(selected_sticker(&engine).id, above.id);
}
