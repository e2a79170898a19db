pub mod actor;
pub mod barrier;
pub mod constants;
pub mod error;
pub mod intent;
pub mod lifecycle;
pub mod locomotion;
pub mod path;
pub mod playback;
pub mod settings;
pub mod stage;
pub mod world;

pub use rapier3d;

pub use actor::{Actor, ActorKind, ActorSpec, CapsuleSpec};
pub use barrier::{BarrierState, LoadBarrier};
pub use error::{LifecycleError, MeshError, PhysicsError, SettingsError, StageError};
pub use intent::{MoveIntent, MoveKey};
pub use lifecycle::{StagePhase, StagePhysics};
pub use locomotion::{LocomotionController, planar_velocity};
pub use path::{PathMesh, flat_plane, path_body, path_collider};
pub use playback::{FrameUniforms, PlaybackClock, transition_for};
pub use settings::PhysicsSettings;
pub use stage::{StageDef, all_stages, next_track, stage_count, stage_def};
pub use world::PhysicsWorld;
