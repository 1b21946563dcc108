//! Simulated control environments for neuroevolution.
//!
//! Each environment is an episodic task: [`Environment::reset`] starts an
//! episode from a seeded random initial state, and [`Environment::step`]
//! advances it one action at a time until the episode terminates or is
//! truncated. Given the same reset seed and the same action sequence, an
//! environment always produces the same trajectory.
//!
//! # Modules
//!
//! - [`environment`]: The [`Environment`] trait and step outcome type
//! - [`space`]: Observation and action representations
//! - [`kind`]: The [`EnvKind`] registry of built-in environments
//! - [`cart_pole`], [`mountain_car`], [`pendulum`]: The built-in tasks
//!
//! # Example
//!
//! ```
//! use neuroevo_env::{Action, EnvKind, Environment as _};
//!
//! let mut env = EnvKind::CartPole.build();
//! let observation = env.reset(7).unwrap();
//! assert_eq!(observation.len(), env.observation_dim());
//!
//! let step = env.step(&Action::Discrete(0)).unwrap();
//! assert_eq!(step.reward, 1.0);
//! ```

pub use self::{
    cart_pole::*, environment::*, kind::*, mountain_car::*, pendulum::*, space::*,
};

pub mod cart_pole;
pub mod environment;
pub mod kind;
pub mod mountain_car;
pub mod pendulum;
pub mod space;

/// Errors raised while interacting with an environment.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum EnvError {
    /// The action does not belong to the environment's action space.
    #[display("action {action} does not fit action space {space}")]
    UnsupportedAction {
        /// The offending action.
        action: Action,
        /// The space the environment accepts.
        space: space::ActionSpace,
    },
    /// `step` was called before `reset` started an episode.
    #[display("step called before reset started an episode")]
    EpisodeNotStarted,
    /// The environment state stopped being finite.
    #[display("environment state diverged to a non-finite value")]
    NonFiniteState,
}
