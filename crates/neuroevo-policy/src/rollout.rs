//! Fitness evaluation by environment rollouts.
//!
//! A [`RolloutEvaluator`] turns a genome into a fitness value: decode the
//! genome, build a fresh environment, play a fixed number of episodes with
//! derived reset seeds, and reduce the episode returns to one number.
//!
//! Evaluation is total: environment errors and non-finite returns are logged
//! and mapped to a sentinel fitness instead of propagating, so a single
//! pathological individual cannot abort a training run. Configuration
//! problems are caught earlier, at setup time.

use log::{debug, warn};
use neuroevo_env::{BoxedEnv, EnvError, Environment};
use serde::{Deserialize, Serialize};

use crate::{
    codec::{self, LayerParams},
    genome::Genome,
    network,
    spec::NetworkSpec,
};

/// Fitness assigned when an evaluation fails, unless configured otherwise.
///
/// Low enough that failed individuals lose every selection tournament, yet
/// finite so sorting and statistics stay well-defined.
pub const DEFAULT_FAILURE_FITNESS: f32 = -1.0e6;

/// How per-episode returns reduce to a single fitness value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitnessReduction {
    /// Mean return across episodes.
    #[default]
    Mean,
    /// Worst return across episodes, favoring robust policies.
    Min,
}

impl FitnessReduction {
    #[expect(clippy::cast_precision_loss)]
    fn reduce(self, returns: &[f32]) -> f32 {
        match self {
            Self::Mean => returns.iter().sum::<f32>() / returns.len() as f32,
            Self::Min => returns.iter().copied().fold(f32::INFINITY, f32::min),
        }
    }
}

/// Rollout settings for one fitness evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalConfig {
    /// Episodes played per evaluation.
    pub episodes: usize,
    /// Step cap per episode; reaching it truncates the episode.
    pub max_steps: usize,
    /// Reduction from per-episode returns to fitness.
    pub reduction: FitnessReduction,
    /// Fitness substituted when the evaluation fails.
    pub failure_fitness: f32,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            episodes: 5,
            max_steps: 500,
            reduction: FitnessReduction::default(),
            failure_fitness: DEFAULT_FAILURE_FITNESS,
        }
    }
}

/// The outcome of evaluating one genome.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Reduced fitness value.
    pub fitness: f32,
    /// Return of each completed episode.
    pub returns: Vec<f32>,
    /// Length of each completed episode, in steps.
    pub lengths: Vec<usize>,
    /// Whether the sentinel was substituted for a failed evaluation.
    pub failed: bool,
}

impl Evaluation {
    fn failure(fitness: f32) -> Self {
        Self {
            fitness,
            returns: Vec::new(),
            lengths: Vec::new(),
            failed: true,
        }
    }
}

/// Computes fitness for genomes.
///
/// The genetic algorithm shares one evaluator across worker threads, so
/// implementations must be `Sync`, and evaluation must be pure given the
/// genome and seed.
pub trait GenomeEvaluator: Sync {
    /// Evaluates one genome.
    ///
    /// Never fails: implementations map internal errors to sentinel fitness
    /// rather than propagating them.
    fn evaluate(&self, genome: &Genome, seed: u64) -> Evaluation;
}

/// Evaluates genomes by decoding them into a policy network and playing
/// episodes in a fresh environment instance.
///
/// Episode `i` resets the environment with `seed + i`, so one evaluation
/// seed pins down the whole evaluation.
pub struct RolloutEvaluator<F> {
    spec: NetworkSpec,
    make_env: F,
    config: EvalConfig,
}

impl<F> RolloutEvaluator<F>
where
    F: Fn() -> BoxedEnv + Sync,
{
    /// Creates an evaluator from a network spec, an environment factory, and
    /// rollout settings.
    pub fn new(spec: NetworkSpec, make_env: F, config: EvalConfig) -> Self {
        Self {
            spec,
            make_env,
            config,
        }
    }

    /// The network spec genomes are decoded against.
    #[must_use]
    pub fn spec(&self) -> &NetworkSpec {
        &self.spec
    }

    fn rollout(
        &self,
        env: &mut dyn Environment,
        layers: &[LayerParams],
        seed: u64,
    ) -> Result<(f32, usize), EnvError> {
        let mut observation = env.reset(seed)?;
        let mut episode_return = 0.0;
        let mut length = 0;
        while length < self.config.max_steps {
            let action = network::act(&observation, layers, &self.spec);
            let step = env.step(&action)?;
            episode_return += step.reward;
            length += 1;
            if step.terminated || step.truncated {
                break;
            }
            observation = step.observation;
        }
        Ok((episode_return, length))
    }
}

impl<F> GenomeEvaluator for RolloutEvaluator<F>
where
    F: Fn() -> BoxedEnv + Sync,
{
    #[expect(clippy::cast_precision_loss)]
    fn evaluate(&self, genome: &Genome, seed: u64) -> Evaluation {
        let layers = match codec::decode(genome, &self.spec) {
            Ok(layers) => layers,
            Err(err) => {
                warn!("genome rejected: {err}");
                return Evaluation::failure(self.config.failure_fitness);
            }
        };

        let mut env = (self.make_env)();
        let mut returns = Vec::with_capacity(self.config.episodes);
        let mut lengths = Vec::with_capacity(self.config.episodes);
        for episode in 0..self.config.episodes {
            let episode_seed = seed.wrapping_add(episode as u64);
            match self.rollout(env.as_mut(), &layers, episode_seed) {
                Ok((episode_return, length)) => {
                    returns.push(episode_return);
                    lengths.push(length);
                }
                Err(err) => {
                    warn!("episode {episode} (seed {episode_seed}) failed: {err}");
                    return Evaluation::failure(self.config.failure_fitness);
                }
            }
        }

        let fitness = self.config.reduction.reduce(&returns);
        if !fitness.is_finite() {
            warn!("non-finite fitness replaced by sentinel");
            return Evaluation::failure(self.config.failure_fitness);
        }
        let mean_length = lengths.iter().sum::<usize>() as f32 / lengths.len() as f32;
        debug!("evaluation (seed {seed}): fitness {fitness:.3}, mean length {mean_length:.1}");
        Evaluation {
            fitness,
            returns,
            lengths,
            failed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use neuroevo_env::{Action, ActionSpace, EnvKind, Observation, Step};

    use crate::spec::Activation;

    use super::*;

    fn cart_pole_evaluator(config: EvalConfig) -> RolloutEvaluator<impl Fn() -> BoxedEnv + Sync> {
        let kind = EnvKind::CartPole;
        let spec = NetworkSpec::for_env(
            kind.observation_dim(),
            &[8],
            kind.action_space(),
            Activation::Tanh,
        )
        .unwrap();
        RolloutEvaluator::new(spec, move || kind.build(), config)
    }

    fn test_genome(len: usize) -> Genome {
        (0..len).map(|i| ((i % 7) as f32 - 3.0) * 0.1).collect()
    }

    #[test]
    fn test_evaluate_runs_configured_episode_count() {
        let evaluator = cart_pole_evaluator(EvalConfig::default());
        let genome = test_genome(evaluator.spec().param_count());
        let evaluation = evaluator.evaluate(&genome, 17);

        assert!(!evaluation.failed);
        assert_eq!(evaluation.returns.len(), 5);
        assert_eq!(evaluation.lengths.len(), 5);
        assert!(evaluation.lengths.iter().all(|&len| (1..=500).contains(&len)));
    }

    #[test]
    fn test_evaluate_is_seed_deterministic() {
        let evaluator = cart_pole_evaluator(EvalConfig::default());
        let genome = test_genome(evaluator.spec().param_count());
        let first = evaluator.evaluate(&genome, 42);
        let second = evaluator.evaluate(&genome, 42);
        assert_eq!(first, second);
    }

    #[test]
    fn test_mean_reduction_averages_returns() {
        let evaluator = cart_pole_evaluator(EvalConfig::default());
        let genome = test_genome(evaluator.spec().param_count());
        let evaluation = evaluator.evaluate(&genome, 3);
        let mean = evaluation.returns.iter().sum::<f32>() / 5.0;
        assert!((evaluation.fitness - mean).abs() < 1e-4);
    }

    #[test]
    fn test_min_reduction_takes_worst_episode() {
        let config = EvalConfig {
            reduction: FitnessReduction::Min,
            ..EvalConfig::default()
        };
        let evaluator = cart_pole_evaluator(config);
        let genome = test_genome(evaluator.spec().param_count());
        let evaluation = evaluator.evaluate(&genome, 3);
        let worst = evaluation
            .returns
            .iter()
            .copied()
            .fold(f32::INFINITY, f32::min);
        assert_eq!(evaluation.fitness, worst);
    }

    #[test]
    fn test_max_steps_truncates_episodes() {
        let config = EvalConfig {
            max_steps: 5,
            ..EvalConfig::default()
        };
        let evaluator = cart_pole_evaluator(config);
        let genome = Genome::new(vec![0.0; evaluator.spec().param_count()]);
        let evaluation = evaluator.evaluate(&genome, 11);
        assert!(evaluation.lengths.iter().all(|&len| len == 5));
    }

    #[test]
    fn test_wrong_genome_length_yields_sentinel() {
        let evaluator = cart_pole_evaluator(EvalConfig::default());
        let evaluation = evaluator.evaluate(&Genome::new(vec![0.0; 3]), 0);
        assert!(evaluation.failed);
        assert_eq!(evaluation.fitness, DEFAULT_FAILURE_FITNESS);
        assert!(evaluation.returns.is_empty());
    }

    /// Environment that fails a fixed number of steps after reset.
    #[derive(Debug)]
    struct CrashingEnv {
        steps_until_crash: usize,
    }

    impl Environment for CrashingEnv {
        fn observation_dim(&self) -> usize {
            1
        }

        fn action_space(&self) -> ActionSpace {
            ActionSpace::Discrete { n: 2 }
        }

        fn reset(&mut self, _seed: u64) -> Result<Observation, EnvError> {
            Ok([0.0].into_iter().collect())
        }

        fn step(&mut self, _action: &Action) -> Result<Step, EnvError> {
            if self.steps_until_crash == 0 {
                return Err(EnvError::NonFiniteState);
            }
            self.steps_until_crash -= 1;
            Ok(Step {
                observation: [0.0].into_iter().collect(),
                reward: 1.0,
                terminated: false,
                truncated: false,
            })
        }
    }

    #[test]
    fn test_environment_failure_yields_sentinel() {
        let spec = NetworkSpec::for_env(
            1,
            &[],
            ActionSpace::Discrete { n: 2 },
            Activation::Identity,
        )
        .unwrap();
        let config = EvalConfig {
            failure_fitness: -123.0,
            ..EvalConfig::default()
        };
        let evaluator = RolloutEvaluator::new(
            spec,
            || Box::new(CrashingEnv { steps_until_crash: 2 }) as BoxedEnv,
            config,
        );
        let genome = Genome::new(vec![0.0; evaluator.spec().param_count()]);
        let evaluation = evaluator.evaluate(&genome, 0);

        assert!(evaluation.failed);
        assert_eq!(evaluation.fitness, -123.0);
    }
}
