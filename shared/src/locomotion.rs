//! Camera-relative locomotion for the player body.
//!
//! Per frame, in order:
//! 1. `step` turns the current [`MoveIntent`] into a horizontal velocity relative to where
//!    the camera looks and writes it onto the body, keeping the body's vertical velocity.
//! 2. The world is stepped.
//! 3. `update_player` reads the simulated position back so the caller can move the camera.
//!
//! There is no inertia: with no intent the body has zero horizontal velocity immediately.

use rapier3d::prelude::*;

use crate::{
    actor::{Actor, ActorSpec},
    constants::{DEFAULT_MOVE_SPEED, DIST_EPS},
    intent::{MoveIntent, MoveKey},
    world::PhysicsWorld,
};

/// Horizontal velocity for `intent` at `speed`, relative to `camera_forward`.
///
/// The camera direction is flattened onto the XZ plane. If the camera looks straight up or
/// down the forward direction is undefined and the result is zero.
pub fn planar_velocity(camera_forward: Vector<Real>, intent: MoveIntent, speed: f32) -> Vector<Real> {
    let flat = vector![camera_forward.x, 0.0, camera_forward.z];
    let Some(forward) = flat.try_normalize(DIST_EPS) else {
        return Vector::zeros();
    };
    let right = Vector::y().cross(&forward);

    forward * (f32::from(intent.forward) * speed) + right * (f32::from(intent.right) * speed)
}

pub struct LocomotionController {
    player: Actor,
    intent: MoveIntent,
    speed: f32,
}

impl LocomotionController {
    pub fn new(spawn: Vector<Real>) -> Self {
        Self::with_spec(ActorSpec::player(spawn))
    }

    pub fn with_spec(spec: ActorSpec) -> Self {
        Self {
            player: Actor::new(spec),
            intent: MoveIntent::NONE,
            speed: DEFAULT_MOVE_SPEED,
        }
    }

    pub fn player(&self) -> &Actor {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Actor {
        &mut self.player
    }

    pub fn intent(&self) -> MoveIntent {
        self.intent
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Per-stage speed multiplier. Negative values are treated as 0.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    /// Replace the player's spawn point. Takes effect the next time the body is built.
    pub fn set_spawn(&mut self, spawn: Vector<Real>) {
        self.player.spec.spawn = spawn;
    }

    pub fn set_move_intent(&mut self, forward: i8, right: i8) {
        self.intent = MoveIntent::new(forward, right);
    }

    pub fn press(&mut self, key: MoveKey) {
        self.intent.press(key);
    }

    pub fn release(&mut self, key: MoveKey) {
        self.intent.release(key);
    }

    /// Apply the intent as a horizontal velocity, preserving the body's vertical velocity.
    ///
    /// Does nothing while the player body is not in the world.
    pub fn step(&self, world: &mut PhysicsWorld, camera_forward: Vector<Real>) {
        let Some(handle) = self.player.handle() else {
            return;
        };
        let Some(current) = world.linvel(handle) else {
            log::debug!("locomotion step skipped: player body not in world");
            return;
        };

        let planar = planar_velocity(camera_forward, self.intent, self.speed);
        world.set_linvel(handle, vector![planar.x, current.y, planar.z]);
    }

    /// Simulated player position, to be copied onto the camera after the world step.
    pub fn update_player(&self, world: &PhysicsWorld) -> Option<Vector<Real>> {
        self.player.position(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{actor::CapsuleSpec, path::flat_plane, settings::PhysicsSettings};

    const EPS: f32 = 1.0e-5;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(&PhysicsSettings::default()).expect("default settings")
    }

    fn registered(world: &mut PhysicsWorld, spawn: Vector<Real>) -> LocomotionController {
        let mut controller = LocomotionController::new(spawn);
        controller.player_mut().register(world);
        controller
    }

    #[test]
    fn forward_along_plus_z_at_speed_two() {
        let mut w = world();
        let mut c = registered(&mut w, Vector::zeros());
        let handle = c.player().handle().expect("registered");
        w.set_linvel(handle, vector![0.0, -0.75, 0.0]);

        c.set_speed(2.0);
        c.set_move_intent(1, 0);
        c.step(&mut w, vector![0.0, 0.0, 1.0]);

        let v = w.linvel(handle).expect("registered");
        assert!(v.x.abs() < EPS);
        assert!((v.z - 2.0).abs() < EPS);
        assert!((v.y + 0.75).abs() < EPS);
    }

    #[test]
    fn idle_intent_zeroes_horizontal_and_keeps_vertical() {
        let mut w = world();
        let mut c = registered(&mut w, Vector::zeros());
        let handle = c.player().handle().expect("registered");

        c.set_speed(1.5);
        let sequences: [&[(i8, i8)]; 3] = [
            &[(1, 0), (0, 0)],
            &[(1, 1), (-1, 1), (0, -1), (0, 0)],
            &[(-1, -1), (0, 0), (1, 0), (0, 0)],
        ];

        for sequence in sequences {
            w.set_linvel(handle, vector![3.0, -1.25, -4.0]);
            for &(f, r) in sequence {
                c.set_move_intent(f, r);
            }
            c.step(&mut w, vector![0.3, -0.2, 0.9]);

            let v = w.linvel(handle).expect("registered");
            assert!(v.x.abs() < EPS && v.z.abs() < EPS);
            assert!((v.y + 1.25).abs() < EPS);
        }
    }

    #[test]
    fn zero_speed_yields_zero_velocity() {
        let v = planar_velocity(vector![0.0, 0.0, 1.0], MoveIntent::new(1, 1), 0.0);
        assert_eq!(v, Vector::zeros());
    }

    #[test]
    fn camera_pitch_does_not_change_planar_speed() {
        let level = planar_velocity(vector![0.0, 0.0, -1.0], MoveIntent::new(1, 0), 1.0);
        let pitched = planar_velocity(vector![0.0, -0.8, -0.6], MoveIntent::new(1, 0), 1.0);

        assert!((level - pitched).norm() < EPS);
        assert!((pitched.norm() - 1.0).abs() < EPS);
        assert_eq!(pitched.y, 0.0);
    }

    #[test]
    fn camera_looking_straight_down_gives_no_motion() {
        let v = planar_velocity(vector![0.0, -1.0, 0.0], MoveIntent::new(1, 1), 3.0);
        assert_eq!(v, Vector::zeros());
    }

    #[test]
    fn right_axis_points_to_camera_left() {
        // Facing +Z, up x forward = +X.
        let v = planar_velocity(vector![0.0, 0.0, 1.0], MoveIntent::new(0, 1), 1.0);
        assert!((v - vector![1.0, 0.0, 0.0]).norm() < EPS);
    }

    #[test]
    fn diagonal_is_the_sum_of_both_axes() {
        let v = planar_velocity(vector![1.0, 0.0, 0.0], MoveIntent::new(1, -1), 1.0);
        // forward = +X, right = Y x X = -Z, right_dir = -1 -> +Z.
        assert!((v - vector![1.0, 0.0, 1.0]).norm() < EPS);
    }

    #[test]
    fn step_without_body_is_a_no_op() {
        let mut w = world();
        let mut c = LocomotionController::new(Vector::zeros());
        c.set_move_intent(1, 0);
        c.step(&mut w, vector![0.0, 0.0, 1.0]);
        assert_eq!(w.body_count(), 0);
        assert!(c.update_player(&w).is_none());
    }

    #[test]
    fn negative_speed_is_clamped() {
        let mut c = LocomotionController::new(Vector::zeros());
        c.set_speed(-3.0);
        assert_eq!(c.speed(), 0.0);
    }

    #[test]
    fn player_settles_on_flat_path() {
        let mut w = world();
        let capsule = CapsuleSpec {
            radius: 0.25,
            half_height: 0.25,
        };
        let plane_y = 0.5;
        let floor = crate::path::path_collider(&flat_plane(20.0, plane_y)).expect("valid mesh");
        w.insert_body(crate::path::path_body(), [floor]);

        let mut c = LocomotionController::with_spec(
            ActorSpec::player(vector![0.0, plane_y + 1.5, 0.0]).with_capsule(capsule),
        );
        c.player_mut().register(&mut w);

        for _ in 0..300 {
            c.step(&mut w, vector![0.0, 0.0, 1.0]);
            w.step(1.0 / 60.0);
        }

        let pos = c.update_player(&w).expect("registered");
        let expected = plane_y + capsule.half_extent_y();
        assert!(
            (pos.y - expected).abs() < 0.02,
            "settled at {} expected {}",
            pos.y,
            expected
        );
        assert!(w.linvel(c.player().handle().expect("registered")).expect("body").y.abs() < 0.05);
    }

    #[test]
    fn default_capsule_settles_on_flat_path() {
        let mut w = world();
        let floor = crate::path::path_collider(&flat_plane(20.0, 0.0)).expect("valid mesh");
        w.insert_body(crate::path::path_body(), [floor]);

        let mut c = registered(&mut w, vector![0.0, 0.05, 0.0]);
        for _ in 0..300 {
            c.step(&mut w, vector![0.0, 0.0, 1.0]);
            w.step(1.0 / 60.0);
        }

        let pos = c.update_player(&w).expect("registered");
        let expected = CapsuleSpec::default().half_extent_y();
        assert!(
            (pos.y - expected).abs() < 0.005,
            "settled at {} expected {}",
            pos.y,
            expected
        );
    }

    #[test]
    fn walking_moves_the_camera_target() {
        let mut w = world();
        let capsule = CapsuleSpec {
            radius: 0.25,
            half_height: 0.25,
        };
        let floor = crate::path::path_collider(&flat_plane(50.0, 0.0)).expect("valid mesh");
        w.insert_body(crate::path::path_body(), [floor]);

        let mut c = LocomotionController::with_spec(
            ActorSpec::player(vector![0.0, capsule.half_extent_y(), 0.0]).with_capsule(capsule),
        );
        c.player_mut().register(&mut w);
        c.set_speed(1.0);
        c.press(MoveKey::Forward);

        for _ in 0..60 {
            c.step(&mut w, vector![0.0, 0.0, 1.0]);
            w.step(1.0 / 60.0);
        }

        let pos = c.update_player(&w).expect("registered");
        assert!((pos.z - 1.0).abs() < 0.05, "walked to z={}", pos.z);
        assert!(pos.x.abs() < 0.01);
    }
}
