use bevy::prelude::*;
use rand::{SeedableRng, rngs::StdRng};
use rhythm_shared::{
    Actor, LocomotionController, PhysicsSettings, PhysicsWorld, StagePhysics,
    rapier3d::prelude::{Real, Vector, vector},
};

use crate::PlaySet;

/// The session-wide simulation. Created once; stages add and remove bodies.
#[derive(Resource, Deref, DerefMut)]
pub struct Physics(pub PhysicsWorld);

/// Lifecycle of the current stage's bodies.
#[derive(Resource, Default, Deref, DerefMut)]
pub struct StageBodies(pub StagePhysics);

/// Intent, speed and body of the local player.
#[derive(Resource, Deref, DerefMut)]
pub struct Locomotion(pub LocomotionController);

#[derive(Resource, Deref, DerefMut)]
pub struct NpcRng(pub StdRng);

/// A wandering actor simulated alongside the player.
#[derive(Component, Deref, DerefMut)]
pub struct Npc(pub Actor);

pub(super) fn plugin(app: &mut App) {
    let world =
        PhysicsWorld::new(&PhysicsSettings::default()).expect("Default physics settings are valid.");
    app.insert_resource(Physics(world));
    app.init_resource::<StageBodies>();
    app.insert_resource(Locomotion(LocomotionController::new(Vector::zeros())));
    app.insert_resource(NpcRng(StdRng::from_os_rng()));

    app.add_systems(Update, drive_npcs.in_set(PlaySet::Drive));
    app.add_systems(Update, step_world.in_set(PlaySet::Simulate));
    app.add_systems(Update, sync_npcs.in_set(PlaySet::Present));
}

pub fn to_physics(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

pub fn to_render(v: Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn drive_npcs(mut physics: ResMut<Physics>, mut rng: ResMut<NpcRng>, npcs: Query<&Npc>) {
    for npc in &npcs {
        npc.apply_behavior(&mut physics, &mut rng.0);
    }
}

fn step_world(mut physics: ResMut<Physics>, time: Res<Time>) {
    physics.step(time.delta_secs());
}

fn sync_npcs(physics: Res<Physics>, mut npcs: Query<(&Npc, &mut Transform)>) {
    for (npc, mut transform) in &mut npcs {
        if let Some(position) = npc.position(&physics) {
            transform.translation = to_render(position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_conversions_agree() {
        let v = Vec3::new(1.5, -2.0, 0.25);
        assert_eq!(to_render(to_physics(v)), v);
    }
}
