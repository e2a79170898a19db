//! Error types for the simulation core.
//!
//! Construction-time problems (bad meshes, bad settings, unknown tracks) are returned as
//! checked errors. Lifecycle misuse that is harmless (double registration, clearing an
//! empty world) is not an error at all; see `lifecycle`.

use thiserror::Error;

use crate::lifecycle::StagePhase;

/// Problems with a path mesh handed to the collider builder.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshError {
    #[error("path mesh has no index buffer")]
    MissingIndices,

    #[error("path mesh has no vertices")]
    Empty,

    #[error("position buffer length {0} is not a multiple of 3")]
    MalformedPositions(usize),

    #[error("index buffer length {0} is not a multiple of 3")]
    MalformedIndices(usize),

    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("path mesh contains non-finite vertex data")]
    NonFinite,

    #[error("trimesh construction failed: {0}")]
    Degenerate(String),
}

/// Invalid physics configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SettingsError {
    #[error("solver iteration count must be at least 1")]
    ZeroSolverIterations,

    #[error("gravity must be finite, got {0:?}")]
    NonFiniteGravity([f32; 3]),
}

/// Illegal transition of a stage's physics lifecycle.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("cannot {action} while stage physics is {phase:?}")]
    IllegalTransition {
        action: &'static str,
        phase: StagePhase,
    },

    #[error("cannot activate stage physics without a {0}")]
    MissingBody(&'static str),
}

/// Lookup failures in the stage table.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StageError {
    #[error("unknown track number {0}")]
    UnknownTrack(u32),
}

/// Umbrella error for operations that touch the physics world.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PhysicsError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}
