use std::collections::BTreeMap;

use crate::descriptive::DescriptiveStats;

/// Summary of a metric at one generation, aggregated across runs.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationAggregate {
    /// The generation index.
    pub generation: usize,
    /// How many runs contributed a value at this generation.
    pub runs: usize,
    /// Mean of the metric across contributing runs.
    pub mean: f32,
    /// Standard deviation of the metric across contributing runs.
    pub std_dev: f32,
}

/// Aggregates per-generation series from independent runs.
///
/// Each series is a list of `(generation, value)` pairs, one per recorded
/// generation of one run. Series need not have equal length: a run that
/// stopped early (for example on reaching a solved threshold) simply stops
/// contributing to later generations.
///
/// Returns one [`GenerationAggregate`] per generation present in any series,
/// in ascending generation order.
#[must_use]
pub fn aggregate_by_generation(series: &[Vec<(usize, f32)>]) -> Vec<GenerationAggregate> {
    let mut by_generation = BTreeMap::<usize, Vec<f32>>::new();
    for run in series {
        for &(generation, value) in run {
            by_generation.entry(generation).or_default().push(value);
        }
    }

    by_generation
        .into_iter()
        .filter_map(|(generation, values)| {
            let runs = values.len();
            let stats = DescriptiveStats::new(values)?;
            Some(GenerationAggregate {
                generation,
                runs,
                mean: stats.mean,
                std_dev: stats.std_dev,
            })
        })
        .collect()
}
