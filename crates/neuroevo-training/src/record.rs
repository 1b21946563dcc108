//! Per-generation training records and where they go.
//!
//! The trainer emits one [`GenerationRecord`] after each evaluation and
//! hands it to a [`RecordSink`]. The sink decides what persistence means:
//! tests buffer records in memory, the command line writes CSV files.

use std::io;

use neuroevo_policy::Genome;
use serde::{Deserialize, Serialize};

/// Snapshot of one evaluated generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Generation index, starting at 0.
    pub generation: usize,
    /// Fitness of the best individual.
    pub best_fitness: f32,
    /// Mean fitness across the population.
    pub mean_fitness: f32,
    /// Population fitness standard deviation.
    pub std_fitness: f32,
    /// Genome of the best individual.
    pub best_genome: Genome,
}

/// Receives generation records as training progresses.
///
/// `append` is called once per generation, in order. Implementations that
/// persist records should make each one durable before returning, so an
/// interrupted run keeps everything already reported.
pub trait RecordSink {
    /// Records one generation.
    fn append(&mut self, record: &GenerationRecord) -> io::Result<()>;
}

/// Sink that buffers records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<GenerationRecord>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All records appended so far, in generation order.
    #[must_use]
    pub fn records(&self) -> &[GenerationRecord] {
        &self.records
    }
}

impl RecordSink for MemorySink {
    fn append(&mut self, record: &GenerationRecord) -> io::Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(generation: usize) -> GenerationRecord {
        GenerationRecord {
            generation,
            best_fitness: 10.0,
            mean_fitness: 4.5,
            std_fitness: 1.25,
            best_genome: Genome::new(vec![0.5, -0.5]),
        }
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let mut sink = MemorySink::new();
        sink.append(&record(0)).unwrap();
        sink.append(&record(1)).unwrap();

        let generations = sink
            .records()
            .iter()
            .map(|r| r.generation)
            .collect::<Vec<_>>();
        assert_eq!(generations, [0, 1]);
    }

    #[test]
    fn test_record_serializes_transparent_genome() {
        let json = serde_json::to_value(record(3)).unwrap();
        assert_eq!(json["generation"], 3);
        assert_eq!(json["best_genome"], serde_json::json!([0.5, -0.5]));
    }
}
