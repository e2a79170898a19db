/// Gravity magnitude in meters per second squared (positive value).
/// The world integrates it as a downward (-Y) acceleration.
pub const GRAVITY_MPS2: f32 = 9.81;

/// Constraint solver iterations per world step.
///
/// Set generously: the frame budget is dominated by rendering, and a high count keeps the
/// small player capsule stable against the path trimesh.
pub const SOLVER_ITERATIONS: usize = 50;

/// Radius of the player's capsule cluster (meters).
pub const PLAYER_RADIUS: f32 = 0.01;

/// Half of the cylinder height between the two end spheres (meters).
pub const PLAYER_HALF_HEIGHT: f32 = 0.005;

/// Mass of every kinematic actor body (kilograms).
pub const ACTOR_MASS: f32 = 1.0;

/// Walking speed used when a stage does not override it (meters per second).
pub const DEFAULT_MOVE_SPEED: f32 = 0.1;

/// Spawn point shared by most stages, slightly above the start of the path.
pub const DEFAULT_SPAWN: [f32; 3] = [0.6, 0.01, -0.1];

/// Force magnitude applied by wandering NPCs each frame (newtons).
pub const NPC_WANDER_FORCE: f32 = 10.0;

/// Practical small distance for comparisons (meters).
pub const DIST_EPS: f32 = 1.0e-6;

/// Pixel size of the post-process pass before any transition is added.
pub const BASE_PIXEL_SIZE: f32 = 1.0;

/// Upper bound of the shader `transition` uniform (fully faded out).
pub const MAX_TRANSITION: f32 = 200.0;

/// Seconds at the start and end of a song over which `transition` ramps.
pub const TRANSITION_SECONDS: f32 = 1.5;
