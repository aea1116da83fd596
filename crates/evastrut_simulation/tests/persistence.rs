//! Save/load integration test
//!
//! Strut загружается из save node → reconnection после settle тиков:
//! - id найден → Attached к той же part
//! - id нет / не найден / кривой → Detached
//! - save → load → та же связь

use bevy::prelude::*;
use evastrut_simulation::components::{
    ActiveVessel, CrewMember, EvaStrut, GameScene, LinkedStrut, StrutAffordances, StrutState,
    TargetRef, WorldReady,
};
use evastrut_simulation::spawn::{
    spawn_eva, spawn_loaded_strut, spawn_part, spawn_strut, spawn_vessel,
};
use evastrut_simulation::strut::{snapshot_struts, RECONNECT_SETTLE_TICKS};
use evastrut_simulation::{
    create_headless_app, InjectedProbe, SeverCause, SphereProbe, StrutAction, StrutAttached,
    StrutConfig, StrutSaveNode, StrutSevered,
};

const TARGET_CENTER: Vec3 = Vec3::new(0.0, 0.0, 6.0);

fn attached_node(target_id: &str) -> StrutSaveNode {
    StrutSaveNode {
        target_part_id: Some(target_id.to_string()),
        direction: [0.0, 0.0, 1.0],
        target_position: [0.0, 0.0, 5.0],
        ..default()
    }
}

/// Станция: загруженная strut (flight id 1) + target part (flight id 2)
fn setup_loaded(node: StrutSaveNode, scene: GameScene) -> (App, Entity, Entity) {
    let mut app = create_headless_app(7);
    app.insert_resource(scene);

    let (strut, target) = {
        let mut commands = app.world_mut().commands();
        let station = spawn_vessel(&mut commands, "Station", Vec3::ZERO);
        let strut = spawn_loaded_strut(
            &mut commands,
            station,
            1,
            Vec3::ZERO,
            StrutConfig::default(),
            node,
        );
        let target = spawn_part(&mut commands, station, 2, TARGET_CENTER);
        (strut, target)
    };

    let world = app.world_mut();
    world.flush();
    world.insert_resource(InjectedProbe::new(SphereProbe::default()));
    world.insert_resource(WorldReady(true));

    (app, strut, target)
}

fn strut(app: &App, entity: Entity) -> &EvaStrut {
    app.world().get::<EvaStrut>(entity).unwrap()
}

fn severed(app: &App) -> Vec<StrutSevered> {
    app.world()
        .resource::<Events<StrutSevered>>()
        .iter_current_update_events()
        .copied()
        .collect()
}

#[test]
fn test_reconnect_after_settle_ticks() {
    let (mut app, strut_entity, target) = setup_loaded(attached_node("2"), GameScene::Flight);

    // Первый кадр + settle: всё это время strut ждёт, не Attached
    for _ in 0..RECONNECT_SETTLE_TICKS {
        app.update();
        let waiting = strut(&app, strut_entity);
        assert_eq!(waiting.state, StrutState::Detached);
        assert_eq!(waiting.target, TargetRef::Pending(2));
        assert!(!waiting.loaded);
        assert!(waiting.is_consistent());
    }

    app.update();
    let reconnected = strut(&app, strut_entity);
    assert_eq!(reconnected.state, StrutState::Attached);
    assert_eq!(
        reconnected.target,
        TargetRef::Resolved { part: target, flight_id: 2 }
    );
    assert!(reconnected.loaded);
    assert!((reconnected.connection_distance - 5.0).abs() < 1e-4);
    assert!(app.world().get::<StrutAffordances>(strut_entity).unwrap().cut.active);
    assert_eq!(
        app.world().get::<LinkedStrut>(strut_entity).unwrap().target,
        Some(target)
    );

    let attached: Vec<_> = app
        .world()
        .resource::<Events<StrutAttached>>()
        .iter_current_update_events()
        .copied()
        .collect();
    assert!(attached.iter().any(|e| e.strut == strut_entity && e.target_id == 2));
}

#[test]
fn test_pickup_refused_while_reconnect_pending() {
    let (mut app, strut_entity, target) = setup_loaded(attached_node("2"), GameScene::Flight);
    app.update();
    assert_eq!(strut(&app, strut_entity).target, TargetRef::Pending(2));

    let eva = {
        let mut commands = app.world_mut().commands();
        spawn_eva(
            &mut commands,
            CrewMember::new("Bill", &["RepairSkill"], 2),
            Vec3::new(2.0, 0.0, 3.0),
        )
    };
    app.world_mut().flush();
    app.insert_resource(ActiveVessel(Some(eva)));

    app.world_mut().send_event(StrutAction::pickup(strut_entity));
    app.update();

    let waiting = strut(&app, strut_entity);
    assert_eq!(waiting.state, StrutState::Detached);
    assert_eq!(waiting.target, TargetRef::Pending(2));
    assert_eq!(waiting.eva, None);

    // Reconnection не сорван pickup'ом
    for _ in 0..RECONNECT_SETTLE_TICKS {
        app.update();
    }
    assert_eq!(
        strut(&app, strut_entity).target,
        TargetRef::Resolved { part: target, flight_id: 2 }
    );
}

#[test]
fn test_load_without_target_stays_detached() {
    let (mut app, strut_entity, _) = setup_loaded(StrutSaveNode::default(), GameScene::Flight);
    app.update();

    let loaded = strut(&app, strut_entity);
    assert_eq!(loaded.state, StrutState::Detached);
    assert_eq!(loaded.target, TargetRef::Unset);
    assert!(loaded.loaded);
    assert!(severed(&app)
        .iter()
        .any(|e| e.strut == strut_entity && e.cause == SeverCause::NotPersisted));
}

#[test]
fn test_target_not_found_severs_after_settle() {
    let (mut app, strut_entity, _) = setup_loaded(attached_node("999"), GameScene::Flight);

    for _ in 0..=RECONNECT_SETTLE_TICKS {
        app.update();
        assert_ne!(strut(&app, strut_entity).state, StrutState::Attached);
    }

    let lost = strut(&app, strut_entity);
    assert_eq!(lost.state, StrutState::Detached);
    assert_eq!(lost.target, TargetRef::Unset);
    assert!(lost.loaded);
    assert!(lost.geometry.is_zero());
    assert!(severed(&app)
        .iter()
        .any(|e| e.strut == strut_entity && e.cause == SeverCause::TargetNotFound));
}

#[test]
fn test_malformed_id_severs_immediately() {
    let (mut app, strut_entity, _) = setup_loaded(attached_node("part-two"), GameScene::Flight);
    app.update();

    let loaded = strut(&app, strut_entity);
    assert_eq!(loaded.state, StrutState::Detached);
    assert_eq!(loaded.target, TargetRef::Unset);
    assert!(severed(&app)
        .iter()
        .any(|e| e.strut == strut_entity && e.cause == SeverCause::MalformedId));
}

#[test]
fn test_load_outside_flight_is_ignored() {
    let (mut app, strut_entity, _) = setup_loaded(attached_node("2"), GameScene::Editor);

    for _ in 0..(RECONNECT_SETTLE_TICKS + 5) {
        app.update();
    }
    let loaded = strut(&app, strut_entity);
    assert_eq!(loaded.state, StrutState::Detached);
    assert_eq!(loaded.target, TargetRef::Unset);
}

#[test]
fn test_save_node_json_format() {
    let node = attached_node("2");
    let json = serde_json::to_value(&node).unwrap();
    assert_eq!(json["TargetPartID"], "2");
    assert_eq!(json["targetPosition"][2], 5.0);

    let detached = serde_json::to_value(StrutSaveNode::default()).unwrap();
    assert!(detached.get("TargetPartID").is_none());

    // Старый save без rotation → identity
    let parsed: StrutSaveNode =
        serde_json::from_str(r#"{"TargetPartID":"2","direction":[0,0,1],"targetPosition":[0,0,5]}"#)
            .unwrap();
    assert_eq!(parsed.target_id(), Ok(Some(2)));
    assert_eq!(parsed.target_rotation, Quat::IDENTITY.to_array());
}

#[test]
fn test_snapshot_then_reload_restores_connection() {
    let (mut app, strut_entity, _) = setup_loaded(attached_node("2"), GameScene::Flight);
    for _ in 0..=RECONNECT_SETTLE_TICKS {
        app.update();
    }
    assert_eq!(strut(&app, strut_entity).state, StrutState::Attached);

    let snapshot = snapshot_struts(app.world_mut());
    assert_eq!(snapshot.len(), 1);
    let (flight_id, node) = snapshot[0].clone();
    assert_eq!(flight_id, 1);
    assert_eq!(node.target_part_id.as_deref(), Some("2"));

    // Через json, как host пишет save
    let json = serde_json::to_string(&node).unwrap();
    let node: StrutSaveNode = serde_json::from_str(&json).unwrap();

    let (mut reloaded, strut_entity, target) = setup_loaded(node, GameScene::Flight);
    for _ in 0..=RECONNECT_SETTLE_TICKS {
        reloaded.update();
    }
    let restored = strut(&reloaded, strut_entity);
    assert_eq!(
        restored.target,
        TargetRef::Resolved { part: target, flight_id: 2 }
    );
    assert!((restored.geometry.target_position - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-4);
}

#[test]
fn test_detached_strut_snapshot_has_no_target() {
    let mut app = create_headless_app(7);
    {
        let mut commands = app.world_mut().commands();
        let station = spawn_vessel(&mut commands, "Station", Vec3::ZERO);
        spawn_strut(&mut commands, station, 3, Vec3::ZERO, StrutConfig::default());
    }
    app.world_mut().flush();
    app.update();

    let snapshot = snapshot_struts(app.world_mut());
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].0, 3);
    assert_eq!(snapshot[0].1.target_part_id, None);
}
