use std::f32::consts::PI;

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    EnvError,
    environment::{Environment, Step},
    space::{Action, ActionSpace, Observation},
};

const GRAVITY: f32 = 10.0;
const MASS: f32 = 1.0;
const LENGTH: f32 = 1.0;
const DT: f32 = 0.05;
const MAX_TORQUE: f32 = 2.0;
const MAX_SPEED: f32 = 8.0;

/// Torque-limited pendulum swing-up.
///
/// A pendulum hangs from a free pivot; the policy applies a bounded torque
/// each step and must swing the pendulum upright and hold it there. Reward is
/// the negated cost `angle² + 0.1·velocity² + 0.001·torque²`, so the best
/// achievable return is 0 and lazy policies score very negative. Episodes
/// never terminate on their own; the caller's step limit truncates them.
///
/// State is `(theta, theta_dot)` with `theta = 0` upright; the observation is
/// `[cos(theta), sin(theta), theta_dot]`.
#[derive(Debug, Clone)]
pub struct Pendulum {
    theta: f32,
    theta_dot: f32,
    started: bool,
}

impl Pendulum {
    pub const OBSERVATION_DIM: usize = 3;
    pub const ACTION_SPACE: ActionSpace = ActionSpace::Continuous {
        dim: 1,
        low: -MAX_TORQUE,
        high: MAX_TORQUE,
    };

    #[must_use]
    pub fn new() -> Self {
        Self {
            theta: 0.0,
            theta_dot: 0.0,
            started: false,
        }
    }

    fn observation(&self) -> Observation {
        [self.theta.cos(), self.theta.sin(), self.theta_dot]
            .into_iter()
            .collect()
    }

    fn torque(&self, action: &Action) -> Result<f32, EnvError> {
        match action {
            Action::Continuous(values) if values.len() == 1 => {
                Ok(values[0].clamp(-MAX_TORQUE, MAX_TORQUE))
            }
            _ => Err(EnvError::UnsupportedAction {
                action: action.clone(),
                space: Self::ACTION_SPACE,
            }),
        }
    }
}

impl Default for Pendulum {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for Pendulum {
    fn observation_dim(&self) -> usize {
        Self::OBSERVATION_DIM
    }

    fn action_space(&self) -> ActionSpace {
        Self::ACTION_SPACE
    }

    fn reset(&mut self, seed: u64) -> Result<Observation, EnvError> {
        let mut rng = Pcg32::seed_from_u64(seed);
        self.theta = rng.random_range(-PI..PI);
        self.theta_dot = rng.random_range(-1.0..1.0);
        self.started = true;
        Ok(self.observation())
    }

    fn step(&mut self, action: &Action) -> Result<Step, EnvError> {
        if !self.started {
            return Err(EnvError::EpisodeNotStarted);
        }
        let torque = self.torque(action)?;

        // Cost is charged on the state the torque was applied to.
        let angle = normalize_angle(self.theta);
        let cost = angle * angle + 0.1 * self.theta_dot * self.theta_dot + 0.001 * torque * torque;

        let accel = 3.0 * GRAVITY / (2.0 * LENGTH) * self.theta.sin()
            + 3.0 / (MASS * LENGTH * LENGTH) * torque;
        self.theta_dot = (self.theta_dot + accel * DT).clamp(-MAX_SPEED, MAX_SPEED);
        self.theta += self.theta_dot * DT;

        Ok(Step {
            observation: self.observation(),
            reward: -cost,
            terminated: false,
            truncated: false,
        })
    }
}

/// Wraps an angle into `[-pi, pi)`.
fn normalize_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(2.0 * PI) - PI
}
