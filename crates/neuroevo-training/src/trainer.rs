//! Training run orchestration.
//!
//! [`run`] drives one complete training run: it validates the
//! configuration, wires a [`RolloutEvaluator`] to a [`GeneticAlgorithm`],
//! and loops evaluate, record, select, breed until the generation budget is
//! spent or the solved threshold is reached. One [`GenerationRecord`] goes
//! to the sink per generation, and the returned [`RunSummary`] carries the
//! best individual seen across the whole run.
//!
//! # Failure Isolation
//!
//! Within a run, individual evaluation never fails (bad genomes get
//! sentinel fitness, see [`RolloutEvaluator`]). A run itself fails only on
//! an invalid configuration or a sink write error, reported as a
//! [`RunFailure`] naming the environment and seed. [`run_batch`] keeps
//! going when a run fails, so one broken experiment cannot take down a
//! batch that runs for hours.

use std::io;

use log::{debug, info, warn};
use neuroevo_env::EnvKind;
use neuroevo_policy::{Activation, EvalConfig, Genome, NetworkSpec, RolloutEvaluator, SpecError};

use crate::{
    genetic::{ConfigError, GaConfig, GeneticAlgorithm},
    record::{GenerationRecord, RecordSink},
};

/// Everything one training run needs: the environment, the seed, the policy
/// network shape, and the evolution and rollout settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Environment to train on.
    pub env: EnvKind,
    /// Run seed; fixes every stochastic decision of the run.
    pub seed: u64,
    /// Hidden layer widths of the policy network.
    pub hidden_layers: Vec<usize>,
    /// Activation applied to hidden layers.
    pub hidden_activation: Activation,
    /// Generation budget.
    pub generations: usize,
    /// Stop early once the best fitness of a generation reaches this value.
    pub solved_threshold: Option<f32>,
    /// Evolution hyperparameters.
    pub ga: GaConfig,
    /// Rollout settings for fitness evaluation.
    pub eval: EvalConfig,
}

impl RunConfig {
    /// Creates a config with default hyperparameters: one hidden layer of 8
    /// tanh units, 100 generations, no solved threshold.
    #[must_use]
    pub fn new(env: EnvKind, seed: u64) -> Self {
        Self {
            env,
            seed,
            hidden_layers: vec![8],
            hidden_activation: Activation::Tanh,
            generations: 100,
            solved_threshold: None,
            ga: GaConfig::default(),
            eval: EvalConfig::default(),
        }
    }

    /// The policy network spec this config implies.
    pub fn network_spec(&self) -> Result<NetworkSpec, SpecError> {
        NetworkSpec::for_env(
            self.env.observation_dim(),
            &self.hidden_layers,
            self.env.action_space(),
            self.hidden_activation,
        )
    }

    /// Validates the whole configuration, hyperparameters and network shape.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ga.validate()?;
        if self.eval.episodes == 0 {
            return Err(ConfigError::ZeroEpisodes);
        }
        if self.eval.max_steps == 0 {
            return Err(ConfigError::ZeroMaxSteps);
        }
        if self.generations == 0 {
            return Err(ConfigError::ZeroGenerations);
        }
        self.network_spec()
            .map_err(|source| ConfigError::Network { source })?;
        Ok(())
    }
}

/// Result of a completed training run.
///
/// `best_fitness` and `best_genome` are the best-ever pair: the highest
/// per-generation best fitness observed during the run and the genome that
/// scored it. With noisy evaluation the final generation's best can score
/// below an earlier one; the summary never loses the earlier one.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Environment trained on.
    pub env: EnvKind,
    /// Run seed.
    pub seed: u64,
    /// Generations actually evaluated.
    pub generations_run: usize,
    /// Whether the solved threshold stopped the run early.
    pub solved: bool,
    /// Best fitness observed across all generations.
    pub best_fitness: f32,
    /// Genome that scored `best_fitness`.
    pub best_genome: Genome,
}

/// A failed training run, tagged with the environment and seed so batch
/// output stays attributable.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("{env} run with seed {seed} failed")]
pub struct RunFailure {
    /// Environment the failed run was training on.
    pub env: EnvKind,
    /// Seed of the failed run.
    pub seed: u64,
    /// What went wrong.
    pub source: RunError,
}

/// Ways a training run can fail.
///
/// Deliberately short: evaluation failures never abort a run, they produce
/// sentinel fitness instead.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum RunError {
    /// The configuration was rejected before any evaluation.
    #[display("invalid run configuration")]
    Config { source: ConfigError },
    /// The record sink could not be created.
    #[display("could not open the record sink")]
    SinkOpen { source: io::Error },
    /// Writing a generation record failed.
    #[display("could not record generation {generation}")]
    Record { generation: usize, source: io::Error },
}

/// Runs one training run to completion.
///
/// Appends one record per evaluated generation to `sink`. Two calls with
/// the same config produce identical record sequences and summaries.
pub fn run<S>(config: &RunConfig, sink: &mut S) -> Result<RunSummary, RunFailure>
where
    S: RecordSink + ?Sized,
{
    run_inner(config, sink).map_err(|source| RunFailure {
        env: config.env,
        seed: config.seed,
        source,
    })
}

fn run_inner<S>(config: &RunConfig, sink: &mut S) -> Result<RunSummary, RunError>
where
    S: RecordSink + ?Sized,
{
    config.validate().map_err(|source| RunError::Config { source })?;
    let spec = config
        .network_spec()
        .map_err(|source| RunError::Config {
            source: ConfigError::Network { source },
        })?;

    let env = config.env;
    let genome_len = spec.param_count();
    let evaluator = RolloutEvaluator::new(spec, move || env.build(), config.eval.clone());
    let mut ga = GeneticAlgorithm::new(config.ga.clone(), genome_len, config.seed)
        .map_err(|source| RunError::Config { source })?;

    info!(
        "{env}: starting run (seed {seed}, population {population}, genome length {genome_len})",
        seed = config.seed,
        population = config.ga.population_size,
    );

    let mut best_ever_fitness = f32::NEG_INFINITY;
    let mut best_ever_genome = None;
    let mut solved = false;

    for generation in 0..config.generations {
        ga.evaluate_population(&evaluator);

        let stats = ga.fitness_stats();
        let best = ga.best().expect("population was just evaluated");
        let record = GenerationRecord {
            generation: ga.generation(),
            best_fitness: stats.max,
            mean_fitness: stats.mean,
            std_fitness: stats.std_dev,
            best_genome: best.genome().clone(),
        };
        if record.best_fitness > best_ever_fitness {
            best_ever_fitness = record.best_fitness;
            best_ever_genome = Some(record.best_genome.clone());
        }
        sink.append(&record).map_err(|source| RunError::Record {
            generation: record.generation,
            source,
        })?;
        debug!(
            "{env}: generation {generation}: best {best:.3}, mean {mean:.3}, std {std:.3}",
            generation = record.generation,
            best = record.best_fitness,
            mean = record.mean_fitness,
            std = record.std_fitness,
        );

        if config
            .solved_threshold
            .is_some_and(|threshold| record.best_fitness >= threshold)
        {
            solved = true;
            break;
        }
        if generation + 1 < config.generations {
            ga.select();
            ga.breed();
        }
    }

    let generations_run = ga.generation() + 1;
    ga.terminate();
    info!(
        "{env}: run finished after {generations_run} generations, \
         best fitness {best_ever_fitness:.3}{suffix}",
        suffix = if solved { " (solved)" } else { "" },
    );

    Ok(RunSummary {
        env: config.env,
        seed: config.seed,
        generations_run,
        solved,
        best_fitness: best_ever_fitness,
        best_genome: best_ever_genome.expect("at least one generation was evaluated"),
    })
}

/// Runs every config in order, isolating failures.
///
/// `make_sink` opens the record sink for each run (the command line maps a
/// config to a CSV path here). A failed run is logged and reported in its
/// slot of the returned vector; the remaining runs still execute.
pub fn run_batch<S, F>(
    configs: &[RunConfig],
    mut make_sink: F,
) -> Vec<Result<RunSummary, RunFailure>>
where
    S: RecordSink,
    F: FnMut(&RunConfig) -> io::Result<S>,
{
    configs
        .iter()
        .map(|config| {
            let mut sink = make_sink(config).map_err(|source| RunFailure {
                env: config.env,
                seed: config.seed,
                source: RunError::SinkOpen { source },
            })?;
            run(config, &mut sink)
        })
        .inspect(|result| {
            if let Err(failure) = result {
                warn!("{failure}: {source}", source = failure.source);
            }
        })
        .collect()
}
