//! Headless симуляция EVA strut
//!
//! Сценарий: EVA инженер поднимает strut, целится в соседнюю part,
//! отпускает кнопку (attach), затем перерезает strut.

use bevy::prelude::*;
use rand::Rng;
use evastrut_simulation::components::{ActiveVessel, CrewMember, EvaStrut, WorldReady};
use evastrut_simulation::physics::LAYER_PARTS;
use evastrut_simulation::spawn::{spawn_eva, spawn_part, spawn_strut, spawn_vessel};
use evastrut_simulation::strut::snapshot_struts;
use evastrut_simulation::{
    create_headless_app, AimInput, DeterministicRng, InjectedProbe, SphereProbe, StrutAction,
    StrutConfig,
};

fn main() {
    let seed = 42;
    println!("Starting EVA strut headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);

    // Небольшой разброс точки прицеливания — детерминистично от seed
    let jitter = {
        let mut rng = app.world_mut().resource_mut::<DeterministicRng>();
        Vec3::new(rng.rng.gen_range(-0.2..0.2), rng.rng.gen_range(-0.2..0.2), 0.0)
    };

    let target_center = Vec3::new(0.0, 0.0, 6.0);
    let (strut, eva, target) = {
        let mut commands = app.world_mut().commands();
        let station = spawn_vessel(&mut commands, "Station", Vec3::ZERO);
        let strut = spawn_strut(&mut commands, station, 1, Vec3::ZERO, StrutConfig::default());
        let target = spawn_part(&mut commands, station, 2, target_center);
        let eva = spawn_eva(
            &mut commands,
            CrewMember::new("Bill", &["RepairSkill"], 2),
            Vec3::new(2.0, 0.0, 3.0),
        );
        (strut, eva, target)
    };

    let world = app.world_mut();
    world.flush();
    world.insert_resource(InjectedProbe::new(
        SphereProbe::default().with_sphere(target, target_center, 1.0, LAYER_PARTS),
    ));
    world.insert_resource(ActiveVessel(Some(eva)));
    world.insert_resource(WorldReady(true));
    println!("Spawned strut {:?}, EVA {:?}", strut, eva);

    app.world_mut().send_event(StrutAction::pickup(strut));
    let camera = Vec3::new(2.0, 1.0, 1.0);
    let aim_point = target_center + jitter - Vec3::Z * 0.5;

    for tick in 0..20 {
        let release = tick == 10;
        let mut input = AimInput::looking_at(camera, aim_point);
        input.released = release;
        app.world_mut().insert_resource(input);
        app.update();

        let state = app.world().get::<EvaStrut>(strut).map(|s| s.state);
        println!("Tick {}: strut state {:?}", tick, state);
    }

    for (flight_id, node) in snapshot_struts(app.world_mut()) {
        println!("Save node for part {}: {:?}", flight_id, node);
    }

    app.world_mut().send_event(StrutAction::cut(strut));
    app.update();
    let state = app.world().get::<EvaStrut>(strut).map(|s| s.state);
    println!("After cut: strut state {:?}", state);

    println!("Simulation complete!");
}
