//! Genome-driven policy networks and their fitness evaluation.
//!
//! A policy is a fixed-topology feedforward network whose parameters come
//! from a flat [`Genome`]. This crate covers the full path from gene vector
//! to fitness value:
//!
//! 1. **Codec** ([`codec`]) - Maps a genome onto dense layer parameters, and
//!    back. The mapping is a pure bijection; a genome of the wrong length is
//!    rejected with [`ShapeMismatchError`].
//! 2. **Forward pass** ([`network`]) - Runs observations through decoded
//!    layers and turns raw outputs into environment actions.
//! 3. **Rollout** ([`rollout`]) - Plays episodes in a fresh environment
//!    instance and reduces the episode returns to one fitness value. Rollout
//!    failures never escape: they are logged and mapped to a sentinel
//!    fitness so one bad individual cannot abort a training run.
//!
//! The network architecture itself lives in [`NetworkSpec`] ([`spec`]),
//! validated on construction so the rest of the crate can assume it is
//! consistent.
//!
//! # Example
//!
//! ```
//! use neuroevo_env::EnvKind;
//! use neuroevo_policy::{
//!     genome::Genome,
//!     rollout::{EvalConfig, GenomeEvaluator as _, RolloutEvaluator},
//!     spec::{Activation, NetworkSpec},
//! };
//!
//! let kind = EnvKind::CartPole;
//! let spec = NetworkSpec::for_env(
//!     kind.observation_dim(),
//!     &[8],
//!     kind.action_space(),
//!     Activation::Tanh,
//! )
//! .unwrap();
//!
//! let genome = Genome::new(vec![0.1; spec.param_count()]);
//! let evaluator = RolloutEvaluator::new(spec, move || kind.build(), EvalConfig::default());
//! let evaluation = evaluator.evaluate(&genome, 42);
//! assert_eq!(evaluation.returns.len(), 5);
//! ```

pub use self::{codec::*, genome::*, network::*, rollout::*, spec::*};

pub mod codec;
pub mod genome;
pub mod network;
pub mod rollout;
pub mod spec;
