//! Genetic algorithm over genome populations.
//!
//! This module implements the evolutionary core: a population of genomes
//! advancing through a fixed generation cycle. The algorithm uses tournament
//! selection, uniform crossover, Gaussian mutation, and elitism.
//!
//! # Generation Cycle
//!
//! Each generation moves through explicit phases:
//!
//! 1. **Initialized** - A fresh population exists, fitness unknown
//! 2. **Evaluated** ([`GeneticAlgorithm::evaluate_population`]) - Every
//!    individual carries a fitness value; the population is sorted best first
//! 3. **Selected** ([`GeneticAlgorithm::select`]) - A breeding plan of parent
//!    pairs has been drawn by tournament
//! 4. back to **Initialized** ([`GeneticAlgorithm::breed`]) - Elites carried
//!    over unchanged, every other slot refilled by crossover and mutation
//!
//! [`GeneticAlgorithm::terminate`] ends the cycle; calling a phase method
//! out of order is a caller bug and panics.
//!
//! # Determinism
//!
//! All variation randomness comes from one PCG stream seeded from the run
//! seed ([`seed::variation_stream`]), and each individual's evaluation seed
//! is derived from its generation and pre-sort index
//! ([`seed::evaluation_seed`]). Fitness evaluation runs on scoped threads,
//! one per individual, but no random state crosses threads, so results never
//! depend on scheduling.
//!
//! # Parallelization
//!
//! Fitness evaluation is parallelized using threads - each individual
//! evaluates independently against the shared evaluator.

use std::thread;

use neuroevo_policy::{Evaluation, Genome, GenomeEvaluator, SpecError};
use neuroevo_stats::descriptive::DescriptiveStats;
use rand::{Rng, SeedableRng as _, seq::index};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{ops, seed};

/// A single individual in the population: a genome plus, once evaluated,
/// its fitness.
#[derive(Debug, Clone)]
pub struct Individual {
    genome: Genome,
    evaluation: Option<Evaluation>,
}

impl Individual {
    fn new(genome: Genome) -> Self {
        Self {
            genome,
            evaluation: None,
        }
    }

    /// The genome this individual carries.
    #[must_use]
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    /// Fitness from the most recent evaluation, `None` before evaluation.
    #[must_use]
    pub fn fitness(&self) -> Option<f32> {
        self.evaluation.as_ref().map(|evaluation| evaluation.fitness)
    }

    /// Full evaluation details, when evaluated.
    #[must_use]
    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }
}

/// Hyperparameters controlling evolution.
///
/// Deserializes with per-field defaults, so a config file only names the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Individuals per generation.
    pub population_size: usize,
    /// Fraction of the population carried over unchanged each generation.
    /// Any positive fraction keeps at least one elite.
    pub elite_fraction: f32,
    /// Individuals drawn per selection tournament. Larger tournaments mean
    /// stronger selection pressure.
    pub tournament_size: usize,
    /// Probability that breeding crosses two parents instead of cloning the
    /// first.
    pub crossover_rate: f32,
    /// Per-gene mutation probability.
    pub mutation_rate: f32,
    /// Standard deviation of mutation noise at generation 0.
    pub mutation_sigma: f32,
    /// Multiplicative per-generation decay of the mutation sigma. 1.0 keeps
    /// the sigma constant.
    pub sigma_decay: f32,
    /// Initial genes are drawn uniformly from `[-init_range, init_range]`.
    pub init_range: f32,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            elite_fraction: 0.05,
            tournament_size: 3,
            crossover_rate: 0.9,
            mutation_rate: 0.05,
            mutation_sigma: 0.1,
            sigma_decay: 1.0,
            init_range: 1.0,
        }
    }
}

impl GaConfig {
    /// Validates hyperparameter ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size < 2 {
            return Err(ConfigError::PopulationTooSmall {
                size: self.population_size,
            });
        }
        if self.tournament_size == 0 || self.tournament_size > self.population_size {
            return Err(ConfigError::TournamentSize {
                size: self.tournament_size,
                population: self.population_size,
            });
        }
        for (name, value) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RateOutOfRange { name, value });
            }
        }
        if !self.mutation_sigma.is_finite() || self.mutation_sigma < 0.0 {
            return Err(ConfigError::InvalidSigma {
                value: self.mutation_sigma,
            });
        }
        if !self.sigma_decay.is_finite() || self.sigma_decay <= 0.0 || self.sigma_decay > 1.0 {
            return Err(ConfigError::InvalidSigmaDecay {
                value: self.sigma_decay,
            });
        }
        if !self.init_range.is_finite() || self.init_range <= 0.0 {
            return Err(ConfigError::InvalidInitRange {
                value: self.init_range,
            });
        }
        if !self.elite_fraction.is_finite() || !(0.0..1.0).contains(&self.elite_fraction) {
            return Err(ConfigError::EliteFraction {
                value: self.elite_fraction,
            });
        }
        Ok(())
    }

    /// Number of elites preserved per generation.
    ///
    /// Zero only when `elite_fraction` is zero; any positive fraction keeps
    /// at least one.
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn elite_count(&self) -> usize {
        if self.elite_fraction <= 0.0 {
            return 0;
        }
        (((self.elite_fraction * self.population_size as f32).floor() as usize).max(1))
            .min(self.population_size)
    }
}

/// An invalid configuration, rejected before any run starts.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("population size must be at least 2, got {size}")]
    PopulationTooSmall { size: usize },
    #[display("tournament size {size} must be between 1 and the population size {population}")]
    TournamentSize { size: usize, population: usize },
    #[display("{name} must lie in [0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: f32 },
    #[display("mutation sigma must be finite and non-negative, got {value}")]
    InvalidSigma { value: f32 },
    #[display("sigma decay must lie in (0, 1], got {value}")]
    InvalidSigmaDecay { value: f32 },
    #[display("gene init range must be positive and finite, got {value}")]
    InvalidInitRange { value: f32 },
    #[display("elite fraction must lie in [0, 1), got {value}")]
    EliteFraction { value: f32 },
    #[display("episodes per evaluation must be positive")]
    ZeroEpisodes,
    #[display("max steps per episode must be positive")]
    ZeroMaxSteps,
    #[display("generation budget must be positive")]
    ZeroGenerations,
    /// The policy network shape is invalid for the chosen environment.
    #[display("invalid policy network")]
    Network { source: SpecError },
}

/// Lifecycle phase of the algorithm's current generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Phase {
    /// A fresh population exists; nothing is evaluated yet.
    Initialized,
    /// Every individual carries a fitness value; the population is sorted.
    Evaluated,
    /// A breeding plan has been drawn.
    Selected,
    /// The run is over; no further transitions are valid.
    Terminated,
}

/// Population state machine for one training run.
pub struct GeneticAlgorithm {
    config: GaConfig,
    rng: Pcg32,
    run_seed: u64,
    generation: usize,
    phase: Phase,
    individuals: Vec<Individual>,
    /// Parent index pairs drawn by the last selection.
    parents: Vec<(usize, usize)>,
}

impl GeneticAlgorithm {
    /// Creates a run-seeded algorithm with a random initial population.
    ///
    /// `genome_len` fixes the gene count for every individual. Every
    /// stochastic decision the algorithm will ever make derives from
    /// `run_seed`.
    pub fn new(config: GaConfig, genome_len: usize, run_seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed::variation_stream(run_seed));
        let individuals = (0..config.population_size)
            .map(|_| Individual::new(ops::random_genome(&mut rng, genome_len, config.init_range)))
            .collect();
        Ok(Self {
            config,
            rng,
            run_seed,
            generation: 0,
            phase: Phase::Initialized,
            individuals,
            parents: Vec::new(),
        })
    }

    /// The hyperparameters in force.
    #[must_use]
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Current generation index, starting at 0.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// All individuals. Sorted by fitness, best first, once evaluated.
    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// The best individual of the current generation, once evaluated.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.first().filter(|ind| ind.fitness().is_some())
    }

    /// Mutation sigma in effect for the current generation.
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    #[must_use]
    pub fn current_sigma(&self) -> f32 {
        self.config.mutation_sigma * self.config.sigma_decay.powi(self.generation as i32)
    }

    /// Fitness statistics of the evaluated population.
    ///
    /// # Panics
    ///
    /// Panics if no individual has been evaluated yet.
    #[must_use]
    pub fn fitness_stats(&self) -> DescriptiveStats {
        DescriptiveStats::new(self.individuals.iter().filter_map(Individual::fitness)).unwrap()
    }

    /// Evaluates every individual in parallel, then sorts the population by
    /// fitness, best first.
    ///
    /// One scoped thread per individual; each gets an evaluation seed
    /// derived from the run seed, the generation, and its pre-sort index, so
    /// the outcome is identical to evaluating sequentially. The sort is
    /// stable: equal fitness keeps submission order.
    ///
    /// # Panics
    ///
    /// Panics unless the population is freshly initialized.
    pub fn evaluate_population<E>(&mut self, evaluator: &E)
    where
        E: GenomeEvaluator + ?Sized,
    {
        assert!(
            self.phase.is_initialized(),
            "evaluate_population requires a fresh population"
        );
        let run_seed = self.run_seed;
        let generation = self.generation;
        thread::scope(|s| {
            for (index, ind) in self.individuals.iter_mut().enumerate() {
                let eval_seed = seed::evaluation_seed(run_seed, generation, index);
                s.spawn(move || {
                    ind.evaluation = Some(evaluator.evaluate(&ind.genome, eval_seed));
                });
            }
        });

        // sort by fitness descending; all individuals are evaluated and
        // fitness values are finite, so the comparison cannot fail
        self.individuals
            .sort_by(|a, b| b.fitness().partial_cmp(&a.fitness()).unwrap());
        self.phase = Phase::Evaluated;
    }

    /// Draws the breeding plan for the next generation.
    ///
    /// Two tournaments per open slot, each sampling `tournament_size`
    /// distinct individuals and keeping the fittest; ties go to the better
    /// ranked individual.
    ///
    /// # Panics
    ///
    /// Panics unless the population was just evaluated.
    pub fn select(&mut self) {
        assert!(
            self.phase.is_evaluated(),
            "select requires an evaluated population"
        );
        let slots = self.config.population_size - self.config.elite_count();
        let mut parents = Vec::with_capacity(slots);
        for _ in 0..slots {
            let first =
                tournament_select(&self.individuals, self.config.tournament_size, &mut self.rng);
            let second =
                tournament_select(&self.individuals, self.config.tournament_size, &mut self.rng);
            parents.push((first, second));
        }
        self.parents = parents;
        self.phase = Phase::Selected;
    }

    /// Breeds the next generation from the selection plan.
    ///
    /// The top `elite_count` genomes are carried over untouched (their
    /// fitness is cleared; elites are re-evaluated next generation like
    /// everyone else). Every other slot breeds from its selected parent
    /// pair: uniform crossover with probability `crossover_rate`, otherwise
    /// a clone of the first parent, then Gaussian mutation with the decayed
    /// sigma.
    ///
    /// # Panics
    ///
    /// Panics unless a breeding plan exists.
    pub fn breed(&mut self) {
        assert!(self.phase.is_selected(), "breed requires a selection plan");
        let sigma = self.current_sigma();
        let elite_count = self.config.elite_count();

        let mut next = Vec::with_capacity(self.config.population_size);
        next.extend(
            self.individuals[..elite_count]
                .iter()
                .map(|ind| Individual::new(ind.genome.clone())),
        );

        let parents = std::mem::take(&mut self.parents);
        for &(first, second) in &parents {
            let p1 = self.individuals[first].genome();
            let p2 = self.individuals[second].genome();
            let child = if self.rng.random_bool(self.config.crossover_rate.into()) {
                ops::uniform_crossover(p1, p2, &mut self.rng)
            } else {
                p1.clone()
            };
            let child =
                ops::gaussian_mutation(&child, self.config.mutation_rate, sigma, &mut self.rng);
            next.push(Individual::new(child));
        }

        self.individuals = next;
        self.generation += 1;
        self.phase = Phase::Initialized;
    }

    /// Ends the run. Terminal: no phase method may be called afterwards.
    pub fn terminate(&mut self) {
        self.phase = Phase::Terminated;
    }
}

/// Selects one parent index by tournament.
///
/// Samples `tournament_size` distinct indices; the population is sorted best
/// first, so the lowest sampled index wins the tournament and ties resolve
/// to the better rank automatically.
fn tournament_select<R>(individuals: &[Individual], tournament_size: usize, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    assert!(tournament_size > 0);
    debug_assert!(individuals.is_sorted_by(|a, b| a.fitness() >= b.fitness()));
    index::sample(rng, individuals.len(), tournament_size)
        .iter()
        .min()
        .unwrap()
}
