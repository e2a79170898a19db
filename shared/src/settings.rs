/*!
Physics world configuration.

`PhysicsSettings` carries the handful of knobs the world exposes: the gravity vector
and the constraint solver iteration count. Defaults come from `constants`; callers may
override them and must pass the result through `validate()` (done by
`PhysicsWorld::new`) so a bad value fails at construction rather than mid-frame.

Notes
- Distances are in meters, time in seconds.
- The iteration count is fixed for the session, never adapted per frame.
*/

use std::num::NonZeroUsize;

use rapier3d::prelude::*;

use crate::{
    constants::{GRAVITY_MPS2, SOLVER_ITERATIONS},
    error::SettingsError,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsSettings {
    /// World-space gravity (m/s^2).
    pub gravity: [f32; 3],
    /// Constraint solver iterations per step.
    pub solver_iterations: usize,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: [0.0, -GRAVITY_MPS2, 0.0],
            solver_iterations: SOLVER_ITERATIONS,
        }
    }
}

impl PhysicsSettings {
    /// Check the settings and return the validated pieces Rapier needs.
    pub fn validate(&self) -> Result<(Vector<Real>, NonZeroUsize), SettingsError> {
        if self.gravity.iter().any(|g| !g.is_finite()) {
            return Err(SettingsError::NonFiniteGravity(self.gravity));
        }
        let iterations =
            NonZeroUsize::new(self.solver_iterations).ok_or(SettingsError::ZeroSolverIterations)?;

        let [x, y, z] = self.gravity;
        Ok((vector![x, y, z], iterations))
    }

    /// Build Rapier integration parameters with the configured solver iteration count.
    ///
    /// `dt` is overwritten on every step, so the default is left in place here.
    pub fn integration_parameters(&self) -> Result<IntegrationParameters, SettingsError> {
        let (_, iterations) = self.validate()?;
        Ok(IntegrationParameters {
            num_solver_iterations: iterations.get(),
            ..IntegrationParameters::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = PhysicsSettings::default();
        let (gravity, iterations) = settings.validate().expect("defaults validate");

        assert!((gravity.y + GRAVITY_MPS2).abs() < 1.0e-6);
        assert_eq!(gravity.x, 0.0);
        assert_eq!(iterations.get(), SOLVER_ITERATIONS);
    }

    #[test]
    fn zero_iterations_is_rejected() {
        let settings = PhysicsSettings {
            solver_iterations: 0,
            ..PhysicsSettings::default()
        };
        assert_eq!(
            settings.validate().unwrap_err(),
            SettingsError::ZeroSolverIterations
        );
    }

    #[test]
    fn non_finite_gravity_is_rejected() {
        let settings = PhysicsSettings {
            gravity: [0.0, f32::NAN, 0.0],
            ..PhysicsSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::NonFiniteGravity(_))
        ));
    }

    #[test]
    fn integration_parameters_carry_iteration_count() {
        let settings = PhysicsSettings {
            solver_iterations: 12,
            ..PhysicsSettings::default()
        };
        let params = settings.integration_parameters().expect("valid settings");
        assert_eq!(params.num_solver_iterations.get(), 12);
    }
}
