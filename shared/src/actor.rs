//! Kinematic actors: the player and wandering NPCs.
//!
//! Both share one body layout (a capsule approximated by a cylinder with a sphere at each
//! end) and differ only by data: [`ActorKind`] selects the per-frame behavior and carries
//! its parameters. An [`Actor`] remembers the handle of its body once registered so that
//! registration can be made idempotent by the lifecycle manager.

use rand::Rng;
use rapier3d::prelude::*;

use crate::{
    constants::{ACTOR_MASS, NPC_WANDER_FORCE, PLAYER_HALF_HEIGHT, PLAYER_RADIUS},
    world::PhysicsWorld,
};

/// Capsule dimensions (meters).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapsuleSpec {
    pub radius: f32,
    /// Half of the cylinder height; the sphere centers sit at `+-half_height`.
    pub half_height: f32,
}

impl Default for CapsuleSpec {
    fn default() -> Self {
        Self {
            radius: PLAYER_RADIUS,
            half_height: PLAYER_HALF_HEIGHT,
        }
    }
}

impl CapsuleSpec {
    /// Distance from the body center to the lowest point of the bottom sphere.
    pub fn half_extent_y(&self) -> f32 {
        self.half_height + self.radius
    }
}

/// What an actor does on its own each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActorKind {
    /// Driven by input through the locomotion controller; no autonomous behavior.
    Player,
    /// Pushed around by a random horizontal force every frame.
    Npc { wander_force: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorSpec {
    pub kind: ActorKind,
    pub capsule: CapsuleSpec,
    pub mass: f32,
    /// World-space spawn position of the body center.
    pub spawn: Vector<Real>,
}

impl ActorSpec {
    pub fn player(spawn: Vector<Real>) -> Self {
        Self {
            kind: ActorKind::Player,
            capsule: CapsuleSpec::default(),
            mass: ACTOR_MASS,
            spawn,
        }
    }

    pub fn npc(spawn: Vector<Real>) -> Self {
        Self {
            kind: ActorKind::Npc {
                wander_force: NPC_WANDER_FORCE,
            },
            capsule: CapsuleSpec::default(),
            mass: ACTOR_MASS,
            spawn,
        }
    }

    pub fn with_capsule(mut self, capsule: CapsuleSpec) -> Self {
        self.capsule = capsule;
        self
    }
}

#[derive(Clone, Debug)]
pub struct Actor {
    pub spec: ActorSpec,
    handle: Option<RigidBodyHandle>,
}

impl Actor {
    pub fn new(spec: ActorSpec) -> Self {
        Self { spec, handle: None }
    }

    pub fn handle(&self) -> Option<RigidBodyHandle> {
        self.handle
    }

    /// Whether this actor's body is currently present in `world`.
    pub fn is_registered(&self, world: &PhysicsWorld) -> bool {
        self.handle.is_some_and(|h| world.contains(h))
    }

    /// Insert a fresh body into `world`, or return the existing handle if it is already there.
    pub fn register(&mut self, world: &mut PhysicsWorld) -> RigidBodyHandle {
        if let Some(handle) = self.handle.filter(|&h| world.contains(h)) {
            return handle;
        }
        let (body, collider) = self.build_body();
        let handle = world.insert_body(body, [collider]);
        self.handle = Some(handle);
        handle
    }

    /// Remove the body from `world` (if present) and forget its handle.
    pub fn unregister(&mut self, world: &mut PhysicsWorld) -> bool {
        self.handle.take().is_some_and(|h| world.remove_body(h))
    }

    /// Forget the handle without touching the world, e.g. after the world was cleared.
    pub fn forget(&mut self) {
        self.handle = None;
    }

    /// Build a new dynamic body and its capsule-cluster collider at the spawn position.
    pub fn build_body(&self) -> (RigidBody, Collider) {
        let CapsuleSpec {
            radius,
            half_height,
        } = self.spec.capsule;

        let shapes = vec![
            (Isometry::identity(), SharedShape::cylinder(half_height, radius)),
            (
                Isometry::translation(0.0, half_height, 0.0),
                SharedShape::ball(radius),
            ),
            (
                Isometry::translation(0.0, -half_height, 0.0),
                SharedShape::ball(radius),
            ),
        ];

        let body = RigidBodyBuilder::dynamic()
            .translation(self.spec.spawn)
            .lock_rotations()
            .ccd_enabled(true)
            .build();
        let collider = ColliderBuilder::compound(shapes)
            .mass(self.spec.mass)
            .friction(0.0)
            .friction_combine_rule(CoefficientCombineRule::Min)
            .restitution(0.0)
            .build();

        (body, collider)
    }

    pub fn position(&self, world: &PhysicsWorld) -> Option<Vector<Real>> {
        self.handle.and_then(|h| world.translation(h))
    }

    /// Run this actor's autonomous behavior for one frame.
    pub fn apply_behavior(&self, world: &mut PhysicsWorld, rng: &mut impl Rng) {
        let ActorKind::Npc { wander_force } = self.spec.kind else {
            return;
        };
        let Some(body) = self.handle.and_then(|h| world.body_mut(h)) else {
            return;
        };

        let force = vector![
            rng.random_range(-0.5..0.5) * wander_force,
            0.0,
            rng.random_range(-0.5..0.5) * wander_force
        ];
        // Rapier keeps user forces across steps; each frame gets a fresh push.
        body.reset_forces(true);
        body.add_force(force, true);
    }
}
