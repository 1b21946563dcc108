use crate::{
    EnvError,
    space::{Action, ActionSpace, Observation},
};

/// An episodic control task.
///
/// Implementations are deterministic given the reset seed: two instances
/// reset with the same seed and stepped with the same action sequence produce
/// identical trajectories. All randomness in an episode derives from the seed
/// passed to [`reset`](Self::reset).
pub trait Environment {
    /// Number of values in an observation vector.
    fn observation_dim(&self) -> usize;

    /// The space actions must belong to.
    fn action_space(&self) -> ActionSpace;

    /// Starts a new episode and returns the initial observation.
    fn reset(&mut self, seed: u64) -> Result<Observation, EnvError>;

    /// Advances the episode by one action.
    ///
    /// Must not be called before [`reset`](Self::reset); behavior after a
    /// step reported `terminated` or `truncated` is unspecified.
    fn step(&mut self, action: &Action) -> Result<Step, EnvError>;
}

/// An owned environment behind a trait object, movable across threads.
pub type BoxedEnv = Box<dyn Environment + Send>;

/// The result of advancing an environment by one action.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Observation after the transition.
    pub observation: Observation,
    /// Scalar reward for the transition.
    pub reward: f32,
    /// The episode reached a terminal state.
    pub terminated: bool,
    /// The episode was cut short without reaching a terminal state.
    pub truncated: bool,
}
