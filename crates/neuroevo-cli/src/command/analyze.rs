use std::{
    fs::{self, File},
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use neuroevo_env::EnvKind;
use neuroevo_stats::aggregate::{self, GenerationAggregate};

use crate::csv;

const SUMMARY_HEADER: &str = "generation,runs,mean_best_fitness,std_best_fitness";

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AnalyzeArg {
    /// Directory containing per-environment record subdirectories
    #[arg(long, default_value = "logs")]
    input_dir: PathBuf,
    /// Directory for per-environment summary CSVs
    #[arg(long, default_value = "results")]
    output_dir: PathBuf,
    /// Only analyze these environments (default: every one found)
    #[arg(long = "env", value_name = "ENV")]
    envs: Vec<EnvKind>,
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let mut analyzed = 0_usize;
    for env in discover_envs(&arg.input_dir)? {
        if !(arg.envs.is_empty() || arg.envs.contains(&env)) {
            continue;
        }
        let series = read_series(&arg.input_dir.join(env.to_string()))?;
        if series.is_empty() {
            eprintln!("{env}: no readable record files, skipping");
            continue;
        }

        let aggregates = aggregate::aggregate_by_generation(&series);
        let summary_path = arg.output_dir.join(env.to_string()).join("summary.csv");
        write_summary(&summary_path, &aggregates)?;

        eprintln!("{env}: {} runs, {} generations", series.len(), aggregates.len());
        if let Some(last) = aggregates.last() {
            let peak = aggregates
                .iter()
                .map(|aggregate| aggregate.mean)
                .fold(f32::NEG_INFINITY, f32::max);
            eprintln!(
                "  final best fitness: {:.2} ± {:.2} (peak mean {peak:.2})",
                last.mean, last.std_dev,
            );
        }
        eprintln!("  summary -> {}", summary_path.display());
        analyzed += 1;
    }
    anyhow::ensure!(
        analyzed > 0,
        "no record files found under {}",
        arg.input_dir.display()
    );
    eprintln!("Analysis complete.");
    Ok(())
}

/// Environments present as subdirectories of the input directory.
fn discover_envs(input_dir: &Path) -> anyhow::Result<Vec<EnvKind>> {
    let entries = fs::read_dir(input_dir)
        .with_context(|| format!("failed to read input directory: {}", input_dir.display()))?;
    let mut envs: Vec<EnvKind> = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(env) = entry.file_name().to_str().and_then(|name| name.parse().ok()) {
            envs.push(env);
        }
    }
    envs.sort_by_key(ToString::to_string);
    Ok(envs)
}

/// Reads every record CSV of one environment into (generation, best fitness)
/// series, skipping files that fail to parse.
fn read_series(env_dir: &Path) -> anyhow::Result<Vec<Vec<(usize, f32)>>> {
    let entries = fs::read_dir(env_dir)
        .with_context(|| format!("failed to read record directory: {}", env_dir.display()))?;
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "csv") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut series = Vec::new();
    for path in paths {
        match csv::read_records(&path) {
            Ok(records) => series.push(
                records
                    .iter()
                    .map(|record| (record.generation, record.best_fitness))
                    .collect(),
            ),
            Err(err) => eprintln!("  skipping {}: {err:#}", path.display()),
        }
    }
    Ok(series)
}

fn write_summary(path: &Path, aggregates: &[GenerationAggregate]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory: {}", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("failed to create summary file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{SUMMARY_HEADER}")?;
    for aggregate in aggregates {
        writeln!(
            writer,
            "{},{},{},{}",
            aggregate.generation, aggregate.runs, aggregate.mean, aggregate.std_dev,
        )?;
    }
    writer.flush()?;
    Ok(())
}
