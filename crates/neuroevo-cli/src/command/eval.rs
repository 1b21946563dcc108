use std::path::PathBuf;

use anyhow::Context as _;
use neuroevo_env::EnvKind;
use neuroevo_policy::{EvalConfig, GenomeEvaluator as _, RolloutEvaluator, codec};
use rand::Rng as _;
use serde::Serialize;

use crate::{
    model::artifact::PolicyArtifact,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvalArg {
    /// Trained policy artifact (JSON)
    #[arg(long)]
    artifact: PathBuf,
    /// Episodes to play
    #[arg(long, default_value_t = 10)]
    episodes: usize,
    /// Step cap per episode
    #[arg(long, default_value_t = 500)]
    max_steps: usize,
    /// Evaluation seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Where to write the JSON report (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

/// JSON report of one artifact evaluation.
#[derive(Debug, Serialize)]
struct EvalReport {
    env: EnvKind,
    seed: u64,
    episodes: usize,
    max_steps: usize,
    returns: Vec<f32>,
    lengths: Vec<usize>,
    mean_return: f32,
}

pub(crate) fn run(arg: &EvalArg) -> anyhow::Result<()> {
    let artifact: PolicyArtifact = util::read_json_file("policy artifact", &arg.artifact)?;
    let spec = artifact
        .network_spec()
        .context("artifact names an invalid network")?;
    codec::decode(&artifact.genome, &spec).context("artifact genome does not fit its network")?;

    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    let env = artifact.env;
    let config = EvalConfig {
        episodes: arg.episodes,
        max_steps: arg.max_steps,
        ..EvalConfig::default()
    };
    let evaluator = RolloutEvaluator::new(spec, move || env.build(), config);

    eprintln!(
        "Evaluating {env} policy from {path} ({episodes} episodes, seed {seed})",
        path = arg.artifact.display(),
        episodes = arg.episodes,
    );
    let evaluation = evaluator.evaluate(&artifact.genome, seed);
    anyhow::ensure!(!evaluation.failed, "evaluation failed, see the log output");

    for (episode, (episode_return, length)) in
        evaluation.returns.iter().zip(&evaluation.lengths).enumerate()
    {
        eprintln!("  episode {episode:2}: return {episode_return:9.2}  ({length} steps)");
    }
    eprintln!("  mean return: {:.2}", evaluation.fitness);

    let report = EvalReport {
        env,
        seed,
        episodes: arg.episodes,
        max_steps: arg.max_steps,
        returns: evaluation.returns,
        lengths: evaluation.lengths,
        mean_return: evaluation.fitness,
    };
    Output::save_json(&report, arg.output.clone())?;
    Ok(())
}
