//! Trained policy artifact schema.
//!
//! An artifact is the durable result of one training run: enough to rebuild
//! the policy network and roll it out again, plus provenance (seed, time,
//! fitness). Written as JSON next to the run records.

use chrono::{DateTime, Utc};
use neuroevo_env::EnvKind;
use neuroevo_policy::{Activation, Genome, NetworkSpec, SpecError};
use neuroevo_training::trainer::{RunConfig, RunSummary};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyArtifact {
    pub env: EnvKind,
    pub seed: u64,
    pub hidden_layers: Vec<usize>,
    pub hidden_activation: Activation,
    pub trained_at: DateTime<Utc>,
    pub fitness: f32,
    pub genome: Genome,
}

impl PolicyArtifact {
    /// Captures the best policy of a finished run.
    pub fn from_run(config: &RunConfig, summary: &RunSummary) -> Self {
        Self {
            env: summary.env,
            seed: summary.seed,
            hidden_layers: config.hidden_layers.clone(),
            hidden_activation: config.hidden_activation,
            trained_at: Utc::now(),
            fitness: summary.best_fitness,
            genome: summary.best_genome.clone(),
        }
    }

    /// Rebuilds the network spec this policy was trained for.
    pub fn network_spec(&self) -> Result<NetworkSpec, SpecError> {
        NetworkSpec::for_env(
            self.env.observation_dim(),
            &self.hidden_layers,
            self.env.action_space(),
            self.hidden_activation,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_as_json() {
        let artifact = PolicyArtifact {
            env: EnvKind::CartPole,
            seed: 42,
            hidden_layers: vec![8],
            hidden_activation: Activation::Tanh,
            trained_at: "2024-06-01T12:00:00Z".parse().unwrap(),
            fitness: 500.0,
            genome: Genome::new(vec![0.25; 58]),
        };

        let json = serde_json::to_string(&artifact).unwrap();
        let back: PolicyArtifact = serde_json::from_str(&json).unwrap();

        assert_eq!(back.env, artifact.env);
        assert_eq!(back.seed, artifact.seed);
        assert_eq!(back.trained_at, artifact.trained_at);
        assert_eq!(back.genome, artifact.genome);
    }

    #[test]
    fn test_network_spec_matches_genome_length() {
        let artifact = PolicyArtifact {
            env: EnvKind::CartPole,
            seed: 0,
            hidden_layers: vec![8],
            hidden_activation: Activation::Tanh,
            trained_at: Utc::now(),
            fitness: 0.0,
            genome: Genome::new(vec![0.0; 58]),
        };

        let spec = artifact.network_spec().unwrap();
        assert_eq!(spec.param_count(), artifact.genome.len());
    }
}
