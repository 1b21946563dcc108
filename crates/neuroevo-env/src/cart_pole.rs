use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    EnvError,
    environment::{Environment, Step},
    space::{Action, ActionSpace, Observation},
};

const GRAVITY: f32 = 9.8;
const MASS_CART: f32 = 1.0;
const MASS_POLE: f32 = 0.1;
const TOTAL_MASS: f32 = MASS_CART + MASS_POLE;
/// Distance from the pivot to the pole's center of mass.
const HALF_POLE_LENGTH: f32 = 0.5;
const POLE_MASS_LENGTH: f32 = MASS_POLE * HALF_POLE_LENGTH;
const FORCE_MAG: f32 = 10.0;
/// Integration time step in seconds.
const TAU: f32 = 0.02;
/// Episode ends when the pole tips past 12 degrees.
const THETA_THRESHOLD: f32 = 12.0 * 2.0 * std::f32::consts::PI / 360.0;
/// Episode ends when the cart leaves the track section.
const X_THRESHOLD: f32 = 2.4;
/// Initial state components are drawn uniformly from this half-open range.
const INIT_RANGE: f32 = 0.05;

/// Pole balancing on a sliding cart.
///
/// A pole is hinged to a cart on a frictionless track. Each step the policy
/// pushes the cart left or right with a fixed force; the episode terminates
/// when the pole tips past ±12° or the cart drifts past ±2.4. Reward is +1
/// per step, so fitness equals survival time.
///
/// State is `[x, x_dot, theta, theta_dot]`, exposed unchanged as the
/// observation. Dynamics use explicit Euler integration at 0.02 s steps.
#[derive(Debug, Clone)]
pub struct CartPole {
    state: [f32; 4],
    started: bool,
}

impl CartPole {
    pub const OBSERVATION_DIM: usize = 4;
    pub const ACTION_SPACE: ActionSpace = ActionSpace::Discrete { n: 2 };

    #[must_use]
    pub fn new() -> Self {
        Self {
            state: [0.0; 4],
            started: false,
        }
    }

    fn observation(&self) -> Observation {
        self.state.iter().copied().collect()
    }

    fn force(&self, action: &Action) -> Result<f32, EnvError> {
        match action {
            Action::Discrete(0) => Ok(-FORCE_MAG),
            Action::Discrete(1) => Ok(FORCE_MAG),
            _ => Err(EnvError::UnsupportedAction {
                action: action.clone(),
                space: Self::ACTION_SPACE,
            }),
        }
    }
}

impl Default for CartPole {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for CartPole {
    fn observation_dim(&self) -> usize {
        Self::OBSERVATION_DIM
    }

    fn action_space(&self) -> ActionSpace {
        Self::ACTION_SPACE
    }

    fn reset(&mut self, seed: u64) -> Result<Observation, EnvError> {
        let mut rng = Pcg32::seed_from_u64(seed);
        for value in &mut self.state {
            *value = rng.random_range(-INIT_RANGE..INIT_RANGE);
        }
        self.started = true;
        Ok(self.observation())
    }

    fn step(&mut self, action: &Action) -> Result<Step, EnvError> {
        if !self.started {
            return Err(EnvError::EpisodeNotStarted);
        }
        let force = self.force(action)?;
        let [x, x_dot, theta, theta_dot] = self.state;

        let cos_theta = theta.cos();
        let sin_theta = theta.sin();
        let temp = (force + POLE_MASS_LENGTH * theta_dot * theta_dot * sin_theta) / TOTAL_MASS;
        let theta_acc = (GRAVITY * sin_theta - cos_theta * temp)
            / (HALF_POLE_LENGTH * (4.0 / 3.0 - MASS_POLE * cos_theta * cos_theta / TOTAL_MASS));
        let x_acc = temp - POLE_MASS_LENGTH * theta_acc * cos_theta / TOTAL_MASS;

        self.state = [
            x + TAU * x_dot,
            x_dot + TAU * x_acc,
            theta + TAU * theta_dot,
            theta_dot + TAU * theta_acc,
        ];
        if self.state.iter().any(|v| !v.is_finite()) {
            return Err(EnvError::NonFiniteState);
        }

        let [x, _, theta, _] = self.state;
        let terminated = x.abs() > X_THRESHOLD || theta.abs() > THETA_THRESHOLD;
        Ok(Step {
            observation: self.observation(),
            reward: 1.0,
            terminated,
            truncated: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_samples_within_init_bounds() {
        let mut env = CartPole::new();
        let obs = env.reset(42).unwrap();
        assert_eq!(obs.len(), 4);
        assert!(obs.iter().all(|v| v.abs() < INIT_RANGE));
    }

    #[test]
    fn test_reset_is_seed_deterministic() {
        let mut a = CartPole::new();
        let mut b = CartPole::new();
        assert_eq!(a.reset(7).unwrap(), b.reset(7).unwrap());
        assert_ne!(a.reset(7).unwrap(), a.reset(8).unwrap());
    }

    #[test]
    fn test_trajectories_match_for_same_seed_and_actions() {
        let mut a = CartPole::new();
        let mut b = CartPole::new();
        a.reset(123).unwrap();
        b.reset(123).unwrap();
        for i in 0..50 {
            let action = Action::Discrete(i % 2);
            let step_a = a.step(&action).unwrap();
            let step_b = b.step(&action).unwrap();
            assert_eq!(step_a, step_b);
            if step_a.terminated {
                break;
            }
        }
    }

    #[test]
    fn test_push_right_accelerates_cart_right() {
        let mut env = CartPole::new();
        env.reset(0).unwrap();
        let x_dot_before = env.state[1];
        env.step(&Action::Discrete(1)).unwrap();
        assert!(env.state[1] > x_dot_before);
    }

    #[test]
    fn test_constant_push_terminates_episode() {
        let mut env = CartPole::new();
        env.reset(5).unwrap();
        let mut terminated = false;
        for _ in 0..500 {
            let step = env.step(&Action::Discrete(1)).unwrap();
            assert_eq!(step.reward, 1.0);
            if step.terminated {
                terminated = true;
                break;
            }
        }
        assert!(terminated, "one-sided pushing must tip the pole");
    }

    #[test]
    fn test_rejects_out_of_space_actions() {
        let mut env = CartPole::new();
        env.reset(0).unwrap();
        let err = env.step(&Action::Discrete(2)).unwrap_err();
        assert!(matches!(err, EnvError::UnsupportedAction { .. }));
    }

    #[test]
    fn test_step_before_reset_errors() {
        let mut env = CartPole::new();
        let err = env.step(&Action::Discrete(0)).unwrap_err();
        assert_eq!(err, EnvError::EpisodeNotStarted);
    }
}
