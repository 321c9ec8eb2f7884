//! End-to-end behaviour of the fence manager on the headless host.

mod common;

use common::Env;
use fences_lib::config::FenceColor;
use fences_lib::constants::COLLAPSED_HEIGHT;
use fences_lib::modules::fences::animation::RollState;
use fences_lib::modules::fences::state::{ItemsType, Monitor, Rect};
use fences_lib::modules::fences::{FenceEvent, FenceProperty, UpdateOutcome};
use pretty_assertions::assert_eq;
use serde_json::json;

fn loaded() -> (Env, String) {
    let mut env = Env::new();
    env.manager.load().unwrap();
    let id = env.manager.get_all_records()[0].id.clone();
    (env, id)
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < f64::EPSILON, "expected {expected}, got {actual}");
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_create_fence_and_add_file() {
    let (mut env, default_id) = loaded();
    assert!(env.manager.delete_fence(&default_id));

    let id = env.manager.create_fence(ItemsType::Data, 100.0, 100.0).unwrap();
    let file = env.dir.path().join("notes.txt");
    std::fs::write(&file, "hello").unwrap();
    env.manager.handle_event(&id, FenceEvent::FilesDropped(vec![file]));

    let document = env.read_document();
    let fences = document.as_array().unwrap();
    assert_eq!(fences.len(), 1);
    assert_eq!(fences[0]["Id"], json!(id));
    assert_eq!(fences[0]["X"], json!(100.0));
    assert_eq!(fences[0]["Y"], json!(100.0));

    let items = fences[0]["Items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["IsFolder"], json!(false));
    assert_eq!(items[0]["IsLink"], json!(false));
}

#[test]
fn test_lock_toggle_persists_and_blocks_drags() {
    let (mut env, id) = loaded();
    let before = env.manager.record(&id).unwrap().bounds();

    assert_eq!(env.manager.update_property(&id, FenceProperty::IsLocked(true)), UpdateOutcome::Applied);
    assert_eq!(env.read_document()[0]["IsLocked"], json!("true"));

    env.manager.handle_event(&id, FenceEvent::Dragged { x: 600.0, y: 400.0 });
    env.manager.handle_event(&id, FenceEvent::DragFinished);
    let record = env.manager.record(&id).unwrap();
    assert_close(record.x, before.x);
    assert_close(record.y, before.y);

    assert_eq!(env.manager.update_property(&id, FenceProperty::IsLocked(false)), UpdateOutcome::Applied);
    assert_eq!(env.read_document()[0]["IsLocked"], json!("false"));

    env.manager.handle_event(&id, FenceEvent::Dragged { x: 600.0, y: 400.0 });
    assert_close(env.manager.record(&id).unwrap().x, 600.0);
}

#[test]
fn test_roll_up_and_down_restores_height() {
    let (mut env, id) = loaded();
    env.manager.update_property(&id, FenceProperty::Height(200.0));

    assert_eq!(env.manager.update_property(&id, FenceProperty::IsRolled(true)), UpdateOutcome::Applied);
    env.manager.finish_animations();

    let record = env.manager.record(&id).unwrap();
    assert_eq!(record.unrolled_height, Some(200.0));
    assert_eq!(env.read_document()[0]["IsRolled"], json!("true"));
    assert_close(env.host.surface(&id).unwrap().bounds.height, COLLAPSED_HEIGHT);

    assert_eq!(env.manager.update_property(&id, FenceProperty::IsRolled(false)), UpdateOutcome::Applied);
    assert_close(env.manager.record(&id).unwrap().restore_height(), 200.0);
    env.manager.finish_animations();

    assert_close(env.host.surface(&id).unwrap().bounds.height, 200.0);
    assert!(!env.manager.is_transitioning(&id));
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_id_is_stable_across_edits_and_restarts() {
    let (mut env, id) = loaded();

    env.manager.handle_event(&id, FenceEvent::TitleDoubleClicked);
    env.manager.handle_event(&id, FenceEvent::TitleEditCommitted("Projects".to_string()));
    env.manager.handle_event(&id, FenceEvent::Dragged { x: 320.0, y: 240.0 });
    env.manager.update_property(&id, FenceProperty::CustomColor(Some(FenceColor::Blue)));
    env.manager.update_property(&id, FenceProperty::Width(410.0));

    let record = env.manager.record(&id).unwrap();
    assert_eq!(record.id, id);
    assert_eq!(record.title, "Projects");

    env.restart();
    let record = env.manager.record(&id).unwrap();
    assert_eq!(record.title, "Projects");
    assert_close(record.x, 320.0);
    assert_close(record.width, 410.0);
}

#[test]
fn test_unrolled_height_stays_valid() {
    let (mut env, id) = loaded();
    env.manager.update_property(&id, FenceProperty::Height(300.0));

    env.manager.update_property(&id, FenceProperty::IsRolled(true));
    env.manager.finish_animations();
    assert!(matches!(
        env.manager.update_property(&id, FenceProperty::UnrolledHeight(500.0)),
        UpdateOutcome::Rejected(_)
    ));
    env.manager.handle_event(&id, FenceEvent::SizeChanged { width: 300.0, height: COLLAPSED_HEIGHT });
    assert_eq!(env.manager.record(&id).unwrap().unrolled_height, Some(300.0));

    env.manager.update_property(&id, FenceProperty::IsRolled(false));
    env.manager.finish_animations();
    env.manager.handle_event(&id, FenceEvent::SizeChanged { width: 300.0, height: 20.0 });
    env.manager.handle_event(&id, FenceEvent::SizeChanged { width: 300.0, height: 250.0 });

    let record = env.manager.record(&id).unwrap();
    assert_eq!(record.unrolled_height, Some(250.0));
    assert!(record.unrolled_height.is_some_and(|h| h > COLLAPSED_HEIGHT));
}

#[test]
fn test_rolling_fence_only_accepts_roll_fields() {
    let (mut env, id) = loaded();
    let before = env.manager.record(&id).unwrap().clone();

    env.manager.update_property(&id, FenceProperty::IsRolled(true));
    assert!(env.manager.is_transitioning(&id));

    assert_eq!(env.manager.update_property(&id, FenceProperty::Width(500.0)), UpdateOutcome::Suppressed);
    assert_eq!(
        env.manager.update_property(&id, FenceProperty::CustomColor(Some(FenceColor::Red))),
        UpdateOutcome::Suppressed
    );
    let during = env.manager.record(&id).unwrap();
    assert_close(during.width, before.width);
    assert_eq!(during.custom_color, before.custom_color);

    assert_eq!(env.manager.update_property(&id, FenceProperty::IsRolled(false)), UpdateOutcome::Applied);
    env.manager.finish_animations();

    assert!(!env.manager.record(&id).unwrap().is_rolled());
    assert_eq!(env.manager.window(&id).unwrap().roll_state(), RollState::Expanded);
    let surface = env.host.surface(&id).unwrap();
    assert!(surface.content_visible);
    assert_close(surface.bounds.height, before.height);
    assert_eq!(env.read_document()[0]["IsRolled"], json!("false"));
}

#[test]
fn test_offscreen_fence_is_clamped_on_load() {
    let mut env = Env::with_document(
        r#"[{"Id":"edge","Title":"Edge","ItemsType":"Data","Items":[],"X":1900,"Y":1060,"Width":300,"Height":140}]"#,
    );
    env.manager.load().unwrap();

    let record = env.manager.record("edge").unwrap();
    assert!(record.bounds().right() <= 1920.0);
    assert!(record.bounds().bottom() <= 1080.0);
    assert_close(record.width, 300.0);
    assert_close(record.height, 140.0);
    assert_close(record.x, 1620.0);
    assert_close(record.y, 940.0);
}

#[test]
fn test_clamping_uses_monitor_scale() {
    let mut env = Env::with_monitors(vec![Monitor::new(0, Rect::new(0.0, 0.0, 2880.0, 1620.0), 1.5)]);
    env.manager.load().unwrap();
    let id = env.manager.create_fence(ItemsType::Data, 1800.0, 1000.0).unwrap();

    let record = env.manager.record(&id).unwrap();
    assert!(record.bounds().right() <= 1920.0);
    assert!(record.bounds().bottom() <= 1080.0);
}

#[test]
fn test_hidden_registry_follows_hide_and_show() {
    let (mut env, id) = loaded();

    env.manager.hide_fence(&id);
    assert_eq!(env.manager.hidden_fences().len(), 1);
    assert!(!env.host.surface(&id).unwrap().visible);

    env.restart();
    assert_eq!(env.manager.hidden_fences()[0].id, id);

    env.manager.show_fence(&id);
    assert!(env.manager.hidden_fences().is_empty());
    assert!(env.host.surface(&id).unwrap().visible);
}
