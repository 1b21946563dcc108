use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    EnvError,
    environment::{Environment, Step},
    space::{Action, ActionSpace, Observation},
};

const MIN_POSITION: f32 = -1.2;
const MAX_POSITION: f32 = 0.6;
const MAX_SPEED: f32 = 0.07;
const GOAL_POSITION: f32 = 0.5;
const FORCE: f32 = 0.001;
const GRAVITY: f32 = 0.0025;

/// Underpowered car in a valley.
///
/// The car starts near the bottom of a sinusoidal valley and must reach the
/// flag on the right hill, but its engine is too weak to climb directly; the
/// policy has to rock back and forth to build momentum. Actions are push
/// left, coast, push right. Reward is -1 per step, so fitness rewards
/// reaching the goal quickly.
///
/// State is `[position, velocity]`, exposed unchanged as the observation.
#[derive(Debug, Clone)]
pub struct MountainCar {
    state: [f32; 2],
    started: bool,
}

impl MountainCar {
    pub const OBSERVATION_DIM: usize = 2;
    pub const ACTION_SPACE: ActionSpace = ActionSpace::Discrete { n: 3 };

    #[must_use]
    pub fn new() -> Self {
        Self {
            state: [0.0; 2],
            started: false,
        }
    }

    fn observation(&self) -> Observation {
        self.state.iter().copied().collect()
    }

    fn thrust(&self, action: &Action) -> Result<f32, EnvError> {
        match action {
            Action::Discrete(0) => Ok(-FORCE),
            Action::Discrete(1) => Ok(0.0),
            Action::Discrete(2) => Ok(FORCE),
            _ => Err(EnvError::UnsupportedAction {
                action: action.clone(),
                space: Self::ACTION_SPACE,
            }),
        }
    }
}

impl Default for MountainCar {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for MountainCar {
    fn observation_dim(&self) -> usize {
        Self::OBSERVATION_DIM
    }

    fn action_space(&self) -> ActionSpace {
        Self::ACTION_SPACE
    }

    fn reset(&mut self, seed: u64) -> Result<Observation, EnvError> {
        let mut rng = Pcg32::seed_from_u64(seed);
        self.state = [rng.random_range(-0.6..-0.4), 0.0];
        self.started = true;
        Ok(self.observation())
    }

    fn step(&mut self, action: &Action) -> Result<Step, EnvError> {
        if !self.started {
            return Err(EnvError::EpisodeNotStarted);
        }
        let thrust = self.thrust(action)?;
        let [position, velocity] = self.state;

        let mut velocity =
            (velocity + thrust + (3.0 * position).cos() * -GRAVITY).clamp(-MAX_SPEED, MAX_SPEED);
        let position = (position + velocity).clamp(MIN_POSITION, MAX_POSITION);
        // The left wall is inelastic.
        if position <= MIN_POSITION && velocity < 0.0 {
            velocity = 0.0;
        }
        self.state = [position, velocity];

        let terminated = position >= GOAL_POSITION && velocity >= 0.0;
        Ok(Step {
            observation: self.observation(),
            reward: -1.0,
            terminated,
            truncated: false,
        })
    }
}
