use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use neuroevo_env::EnvKind;
use neuroevo_training::{
    record::{GenerationRecord, RecordSink},
    trainer,
};

use crate::{
    csv::CsvRecordSink,
    model::{artifact::PolicyArtifact, experiments::ExperimentsFile},
    util::{self, Output},
};

/// Echo a progress line every this many generations.
const ECHO_EVERY: usize = 10;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Experiments config file
    #[arg(long, default_value = "experiments.json")]
    config: PathBuf,
    /// Only train these environments (default: all in the config)
    #[arg(long = "env", value_name = "ENV")]
    envs: Vec<EnvKind>,
    /// Directory for per-run record CSVs
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
    /// Directory for trained policy artifacts
    #[arg(long, default_value = "artifacts")]
    artifact_dir: PathBuf,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let file: ExperimentsFile = util::read_json_file("experiments", &arg.config)?;
    let specs = file.resolve()?;

    let mut configs = Vec::new();
    for spec in &specs {
        if arg.envs.is_empty() || arg.envs.contains(&spec.env) {
            configs.extend(spec.run_configs());
        }
    }
    anyhow::ensure!(
        !configs.is_empty(),
        "no experiments match the requested environments"
    );

    eprintln!(
        "Training {} runs from {}",
        configs.len(),
        arg.config.display()
    );
    let results = trainer::run_batch(&configs, |config| {
        let path = record_path(&arg.log_dir, config.env, config.seed);
        let sink = CsvRecordSink::create(&path)?;
        Ok(EchoSink {
            inner: sink,
            env: config.env,
            seed: config.seed,
        })
    });

    let mut failed = 0_usize;
    for (config, result) in configs.iter().zip(results) {
        match result {
            Ok(summary) => {
                let artifact = PolicyArtifact::from_run(config, &summary);
                let path = artifact_path(&arg.artifact_dir, summary.env, summary.seed);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create artifact directory: {}", parent.display())
                    })?;
                }
                Output::save_json(&artifact, Some(path.clone()))?;
                eprintln!(
                    "{env}  seed={seed}  best={best:.1}  ({generations} generations{solved}) -> {path}",
                    env = summary.env,
                    seed = summary.seed,
                    best = summary.best_fitness,
                    generations = summary.generations_run,
                    solved = if summary.solved { ", solved" } else { "" },
                    path = path.display(),
                );
            }
            Err(failure) => {
                failed += 1;
                eprintln!("  failed: {:#}", anyhow::Error::new(failure));
            }
        }
    }

    let total = configs.len();
    eprintln!(
        "Training complete: {} of {total} runs succeeded.",
        total - failed
    );
    anyhow::ensure!(failed == 0, "{failed} of {total} runs failed");
    Ok(())
}

fn record_path(log_dir: &Path, env: EnvKind, seed: u64) -> PathBuf {
    log_dir.join(env.to_string()).join(format!("seed-{seed}.csv"))
}

fn artifact_path(artifact_dir: &Path, env: EnvKind, seed: u64) -> PathBuf {
    artifact_dir
        .join(env.to_string())
        .join(format!("seed-{seed}.json"))
}

/// CSV sink that also echoes a progress line every few generations.
struct EchoSink {
    inner: CsvRecordSink,
    env: EnvKind,
    seed: u64,
}

impl RecordSink for EchoSink {
    fn append(&mut self, record: &GenerationRecord) -> io::Result<()> {
        self.inner.append(record)?;
        if record.generation % ECHO_EVERY == 0 {
            eprintln!(
                "{env}  seed={seed}  gen={generation:3}  best={best:.1}",
                env = self.env,
                seed = self.seed,
                generation = record.generation,
                best = record.best_fitness,
            );
        }
        Ok(())
    }
}
