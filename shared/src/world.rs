//! Session-wide Rapier simulation world.
//!
//! Owns every Rapier structure needed to step dynamics: body/collider sets, the BVH
//! broad-phase, the narrow-phase, islands, joints and the CCD solver. The world is built
//! once at startup; stages add and remove bodies as they load and unload.
//!
//! Design goals
//! - Single owner: nothing else holds Rapier sets, so "remove everything" really is
//!   everything (no orphaned shapes survive a stage change).
//! - Idempotent removal: removing a handle that is already gone is a no-op.
//! - Variable timestep: `step(dt)` uses the frame delta as-is.

use rapier3d::prelude::*;

use crate::{error::SettingsError, settings::PhysicsSettings};

pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl PhysicsWorld {
    /// Build an empty world from validated settings.
    pub fn new(settings: &PhysicsSettings) -> Result<Self, SettingsError> {
        let (gravity, _) = settings.validate()?;
        let integration_parameters = settings.integration_parameters()?;

        log::debug!(
            "physics world created: gravity={gravity:?} solver_iterations={}",
            settings.solver_iterations
        );

        Ok(Self {
            gravity,
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        })
    }

    /// Insert a body and attach its colliders.
    pub fn insert_body(
        &mut self,
        body: RigidBody,
        colliders: impl IntoIterator<Item = Collider>,
    ) -> RigidBodyHandle {
        let handle = self.bodies.insert(body);
        for collider in colliders {
            self.colliders
                .insert_with_parent(collider, handle, &mut self.bodies);
        }
        handle
    }

    /// Remove a body and its attached colliders.
    ///
    /// Returns `false` if the handle was not in the world.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> bool {
        self.bodies
            .remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    /// Remove every body and collider, including any that nothing tracks anymore.
    ///
    /// Returns the number of bodies removed.
    pub fn clear(&mut self) -> usize {
        let body_handles: Vec<RigidBodyHandle> = self.bodies.iter().map(|(h, _)| h).collect();
        let removed = body_handles
            .into_iter()
            .filter(|&h| self.remove_body(h))
            .count();

        // Parentless colliders are not removed with any body.
        let loose: Vec<ColliderHandle> = self.colliders.iter().map(|(h, _)| h).collect();
        for handle in loose {
            self.colliders
                .remove(handle, &mut self.islands, &mut self.bodies, false);
        }

        removed
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// `dt` is the wall-clock frame delta and is not clamped; a spike after the window was
    /// backgrounded produces one large step. Non-finite or non-positive deltas are skipped.
    pub fn step(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.integration_parameters.dt = dt;

        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }

    pub fn contains(&self, handle: RigidBodyHandle) -> bool {
        self.bodies.contains(handle)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of fixed (mass-zero) bodies, i.e. static colliders such as the path.
    pub fn fixed_body_count(&self) -> usize {
        self.bodies.iter().filter(|(_, b)| b.is_fixed()).count()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    pub fn translation(&self, handle: RigidBodyHandle) -> Option<Vector<Real>> {
        self.bodies.get(handle).map(|b| *b.translation())
    }

    pub fn linvel(&self, handle: RigidBodyHandle) -> Option<Vector<Real>> {
        self.bodies.get(handle).map(|b| *b.linvel())
    }

    /// Overwrite a body's linear velocity. Returns `false` if the body is missing.
    pub fn set_linvel(&mut self, handle: RigidBodyHandle, linvel: Vector<Real>) -> bool {
        match self.bodies.get_mut(handle) {
            Some(body) => {
                body.set_linvel(linvel, true);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(&PhysicsSettings::default()).expect("default settings")
    }

    fn ball_body(world: &mut PhysicsWorld, y: f32) -> RigidBodyHandle {
        world.insert_body(
            RigidBodyBuilder::dynamic().translation(vector![0.0, y, 0.0]).build(),
            [ColliderBuilder::ball(0.5).build()],
        )
    }

    #[test]
    fn new_world_is_empty() {
        let w = world();
        assert_eq!(w.body_count(), 0);
        assert_eq!(w.collider_count(), 0);
    }

    #[test]
    fn free_body_falls_under_gravity() {
        let mut w = world();
        let h = ball_body(&mut w, 10.0);

        for _ in 0..30 {
            w.step(1.0 / 60.0);
        }

        let y = w.translation(h).expect("body exists").y;
        let vy = w.linvel(h).expect("body exists").y;
        assert!(y < 10.0);
        assert!(vy < 0.0);
    }

    #[test]
    fn non_positive_dt_is_skipped() {
        let mut w = world();
        let h = ball_body(&mut w, 3.0);

        w.step(0.0);
        w.step(-1.0);
        w.step(f32::NAN);

        assert_eq!(w.translation(h).expect("body exists").y, 3.0);
    }

    #[test]
    fn remove_body_is_idempotent() {
        let mut w = world();
        let h = ball_body(&mut w, 0.0);

        assert!(w.remove_body(h));
        assert!(!w.remove_body(h));
        assert_eq!(w.body_count(), 0);
        assert_eq!(w.collider_count(), 0);
    }

    #[test]
    fn clear_removes_bodies_and_loose_colliders() {
        let mut w = world();
        ball_body(&mut w, 0.0);
        ball_body(&mut w, 2.0);
        w.colliders.insert(ColliderBuilder::cuboid(1.0, 1.0, 1.0).build());

        assert_eq!(w.clear(), 2);
        assert_eq!(w.body_count(), 0);
        assert_eq!(w.collider_count(), 0);

        // Clearing an empty world is harmless.
        assert_eq!(w.clear(), 0);
    }

    #[test]
    fn fixed_bodies_are_counted_separately() {
        let mut w = world();
        ball_body(&mut w, 0.0);
        w.insert_body(
            RigidBodyBuilder::fixed().build(),
            [ColliderBuilder::cuboid(5.0, 0.1, 5.0).build()],
        );

        assert_eq!(w.body_count(), 2);
        assert_eq!(w.fixed_body_count(), 1);
    }
}
