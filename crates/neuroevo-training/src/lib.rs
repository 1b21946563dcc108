//! Training system for evolving policy network genomes with a genetic
//! algorithm.
//!
//! This crate implements the optimization side of neuroevolution: it evolves
//! populations of flat genomes to maximize the fitness computed by
//! `neuroevo-policy` rollouts. No gradients are involved; selection pressure
//! plus variation does all the work.
//!
//! # How Training Works
//!
//! 1. **Initialize** - Create a population of random genomes
//! 2. **Evaluate** - Each genome plays episodes and receives a fitness score
//! 3. **Select** - Choose parents by tournament, preserving top elites
//! 4. **Breed** - Create the next generation through crossover and mutation
//! 5. **Repeat** - Continue until the generation budget or a solved threshold
//!
//! # Architecture
//!
//! ```text
//! trainer (run over generations, records, early stop)
//!     ↓ drives
//! genetic (population state machine, selection plan)
//!     ↓ uses
//! ops (crossover, mutation, initialization)  +  seed (derived seed streams)
//! ```
//!
//! # Determinism
//!
//! A run is fully determined by its configuration and one `u64` run seed.
//! The algorithm draws variation decisions from a run-seeded PCG stream, and
//! every fitness evaluation receives a seed derived from (run seed,
//! generation, individual index) - see [`seed`]. Fitness evaluation runs on
//! scoped threads, but since no random state is shared across them, thread
//! scheduling cannot change any result.
//!
//! # Example
//!
//! ```
//! use neuroevo_env::EnvKind;
//! use neuroevo_training::{
//!     genetic::GaConfig,
//!     record::MemorySink,
//!     trainer::{self, RunConfig},
//! };
//!
//! let mut config = RunConfig::new(EnvKind::CartPole, 7);
//! config.generations = 2;
//! config.eval.episodes = 2;
//! config.eval.max_steps = 50;
//! config.ga = GaConfig {
//!     population_size: 8,
//!     ..GaConfig::default()
//! };
//!
//! let mut sink = MemorySink::new();
//! let summary = trainer::run(&config, &mut sink).unwrap();
//! assert_eq!(sink.records().len(), 2);
//! assert_eq!(summary.generations_run, 2);
//! ```

pub mod genetic;
pub mod ops;
pub mod record;
pub mod seed;
pub mod trainer;
