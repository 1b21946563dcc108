//! Experiments file schema.
//!
//! The experiments file is JSON with two top-level keys: an optional
//! `defaults` object and the `experiments` array. Each entry is deep-merged
//! over `defaults` (entry values win, nested objects merge key by key) and
//! then deserialized, so shared settings are written once:
//!
//! ```json
//! {
//!   "defaults": { "generations": 150, "ga": { "population_size": 60 } },
//!   "experiments": [
//!     { "env": "cart-pole", "seeds": [0, 1, 2], "solved_threshold": 475.0 },
//!     { "env": "pendulum", "seeds": [0, 1], "ga": { "mutation_sigma": 0.2 } }
//!   ]
//! }
//! ```
//!
//! Only `env` and `seeds` are required; every other field falls back to the
//! built-in defaults.

use anyhow::Context as _;
use neuroevo_env::EnvKind;
use neuroevo_policy::{Activation, EvalConfig, FitnessReduction};
use neuroevo_training::{genetic::GaConfig, trainer::RunConfig};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct ExperimentsFile {
    #[serde(default)]
    defaults: Value,
    experiments: Vec<Value>,
}

impl ExperimentsFile {
    /// Resolves every experiment entry against the defaults block.
    pub fn resolve(&self) -> anyhow::Result<Vec<ExperimentSpec>> {
        self.experiments
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                serde_json::from_value(deep_merge(&self.defaults, entry))
                    .with_context(|| format!("experiment entry #{index} is invalid"))
            })
            .collect()
    }
}

/// One experiment: an environment and the seeds to train it with.
#[derive(Debug, Clone, Deserialize)]
pub struct ExperimentSpec {
    pub env: EnvKind,
    pub seeds: Vec<u64>,
    #[serde(default = "default_hidden_layers")]
    pub hidden_layers: Vec<usize>,
    #[serde(default)]
    pub activation: Activation,
    #[serde(default = "default_generations")]
    pub generations: usize,
    #[serde(default)]
    pub solved_threshold: Option<f32>,
    #[serde(default)]
    pub ga: GaConfig,
    #[serde(default = "default_episodes")]
    pub episodes: usize,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    #[serde(default)]
    pub reduction: FitnessReduction,
}

fn default_hidden_layers() -> Vec<usize> {
    vec![8]
}

fn default_generations() -> usize {
    100
}

fn default_episodes() -> usize {
    5
}

fn default_max_steps() -> usize {
    500
}

impl ExperimentSpec {
    /// Expands to one run config per seed.
    pub fn run_configs(&self) -> Vec<RunConfig> {
        self.seeds
            .iter()
            .map(|&seed| RunConfig {
                env: self.env,
                seed,
                hidden_layers: self.hidden_layers.clone(),
                hidden_activation: self.activation,
                generations: self.generations,
                solved_threshold: self.solved_threshold,
                ga: self.ga.clone(),
                eval: EvalConfig {
                    episodes: self.episodes,
                    max_steps: self.max_steps,
                    reduction: self.reduction,
                    ..EvalConfig::default()
                },
            })
            .collect()
    }
}

/// Recursively merges `over` onto `base`. Objects merge key by key; any
/// other kind of value from `over` replaces the base value wholesale.
fn deep_merge(base: &Value, over: &Value) -> Value {
    match (base, over) {
        (Value::Object(base_map), Value::Object(over_map)) => {
            let mut merged = base_map.clone();
            for (key, over_value) in over_map {
                let value = match base_map.get(key) {
                    Some(base_value) => deep_merge(base_value, over_value),
                    None => over_value.clone(),
                };
                merged.insert(key.clone(), value);
            }
            Value::Object(merged)
        }
        _ => over.clone(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_defaults_merge_under_entries() {
        let file: ExperimentsFile = serde_json::from_value(json!({
            "defaults": {
                "generations": 30,
                "ga": { "population_size": 12 }
            },
            "experiments": [
                { "env": "cart-pole", "seeds": [1, 2], "ga": { "mutation_rate": 0.2 } }
            ]
        }))
        .unwrap();

        let specs = file.resolve().unwrap();
        assert_eq!(specs.len(), 1);
        let spec = &specs[0];
        assert_eq!(spec.env, EnvKind::CartPole);
        assert_eq!(spec.generations, 30);
        assert_eq!(spec.ga.population_size, 12);
        assert_eq!(spec.ga.mutation_rate, 0.2);
        assert_eq!(spec.ga.tournament_size, 3);
        assert_eq!(spec.episodes, 5);

        let configs = spec.run_configs();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].seed, 1);
        assert_eq!(configs[1].seed, 2);
        assert_eq!(configs[0].generations, 30);
    }

    #[test]
    fn test_entry_wins_over_defaults() {
        let file: ExperimentsFile = serde_json::from_value(json!({
            "defaults": { "episodes": 3, "seeds": [0, 1] },
            "experiments": [
                { "env": "pendulum", "seeds": [9], "episodes": 7 }
            ]
        }))
        .unwrap();

        let specs = file.resolve().unwrap();
        assert_eq!(specs[0].episodes, 7);
        // Arrays replace, they do not concatenate.
        assert_eq!(specs[0].seeds, [9]);
    }

    #[test]
    fn test_entry_without_env_is_rejected() {
        let file: ExperimentsFile = serde_json::from_value(json!({
            "experiments": [ { "seeds": [0] } ]
        }))
        .unwrap();

        let err = file.resolve().unwrap_err();
        assert!(err.to_string().contains("entry #0"));
    }

    #[test]
    fn test_defaults_may_be_absent() {
        let file: ExperimentsFile = serde_json::from_value(json!({
            "experiments": [ { "env": "mountain-car", "seeds": [0] } ]
        }))
        .unwrap();

        let specs = file.resolve().unwrap();
        assert_eq!(specs[0].env, EnvKind::MountainCar);
        assert_eq!(specs[0].hidden_layers, [8]);
        assert_eq!(specs[0].ga, GaConfig::default());
    }
}
