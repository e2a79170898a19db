//! Per-stage physics resource lifecycle.
//!
//! A stage's bodies move through `Unloaded -> Loading -> Active -> Unloading -> Unloaded`.
//!
//! Rules
//! - The path collider can only be built while `Loading`; building again replaces the
//!   previous one, so two path colliders never coexist.
//! - Registering the player is idempotent.
//! - `clear_physics` removes every body in the world, tracked or not, and is a no-op from
//!   `Unloaded`. Tearing down while `Loading` abandons the load.

use rapier3d::prelude::*;

use crate::{
    actor::Actor,
    error::{LifecycleError, PhysicsError},
    path::{PathMesh, path_body, path_collider},
    world::PhysicsWorld,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StagePhase {
    #[default]
    Unloaded,
    Loading,
    Active,
    Unloading,
}

#[derive(Debug, Default)]
pub struct StagePhysics {
    phase: StagePhase,
    path_collider: Option<RigidBodyHandle>,
    player: Option<RigidBodyHandle>,
}

impl StagePhysics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> StagePhase {
        self.phase
    }

    pub fn path_collider(&self) -> Option<RigidBodyHandle> {
        self.path_collider
    }

    pub fn player(&self) -> Option<RigidBodyHandle> {
        self.player
    }

    /// `Unloaded -> Loading`.
    pub fn begin_loading(&mut self) -> Result<(), LifecycleError> {
        self.expect_phase(StagePhase::Unloaded, "begin loading")?;
        self.phase = StagePhase::Loading;
        Ok(())
    }

    /// Build the static trimesh body for `mesh` and register it.
    ///
    /// The mesh is validated first; on error the world is left untouched.
    pub fn build_path_collider(
        &mut self,
        world: &mut PhysicsWorld,
        mesh: &PathMesh,
    ) -> Result<RigidBodyHandle, PhysicsError> {
        self.expect_phase(StagePhase::Loading, "build the path collider")?;
        let collider = path_collider(mesh)?;

        if let Some(stale) = self.path_collider.take() {
            log::warn!("replacing an existing path collider");
            world.remove_body(stale);
        }

        let handle = world.insert_body(path_body(), [collider]);
        log::debug!(
            "path collider built: {} vertices, {} triangles",
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        self.path_collider = Some(handle);
        Ok(handle)
    }

    /// Add the player's body to the world. Calling this again for a registered actor is a
    /// no-op that returns the same handle.
    pub fn register_player_body(
        &mut self,
        world: &mut PhysicsWorld,
        actor: &mut Actor,
    ) -> Result<RigidBodyHandle, LifecycleError> {
        if !matches!(self.phase, StagePhase::Loading | StagePhase::Active) {
            return Err(LifecycleError::IllegalTransition {
                action: "register the player body",
                phase: self.phase,
            });
        }
        let handle = actor.register(world);
        self.player = Some(handle);
        Ok(handle)
    }

    /// `Loading -> Active`, once both the path collider and the player are present.
    pub fn activate(&mut self, world: &PhysicsWorld) -> Result<(), LifecycleError> {
        self.expect_phase(StagePhase::Loading, "activate")?;
        if !self.path_collider.is_some_and(|h| world.contains(h)) {
            return Err(LifecycleError::MissingBody("path collider"));
        }
        if !self.player.is_some_and(|h| world.contains(h)) {
            return Err(LifecycleError::MissingBody("player body"));
        }
        self.phase = StagePhase::Active;
        Ok(())
    }

    /// Remove every body from the world and return to `Unloaded`.
    ///
    /// Returns the number of bodies removed; 0 when already unloaded.
    pub fn clear_physics(&mut self, world: &mut PhysicsWorld) -> usize {
        if self.phase == StagePhase::Unloaded {
            return 0;
        }
        self.phase = StagePhase::Unloading;

        let removed = world.clear();
        log::debug!("stage physics cleared: {removed} bodies removed");

        self.path_collider = None;
        self.player = None;
        self.phase = StagePhase::Unloaded;
        removed
    }

    fn expect_phase(&self, phase: StagePhase, action: &'static str) -> Result<(), LifecycleError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(LifecycleError::IllegalTransition {
                action,
                phase: self.phase,
            })
        }
    }
}
