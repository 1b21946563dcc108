//! CSV persistence for generation records.
//!
//! One file per (environment, seed) run. The genome column is
//! space-separated gene values, so no field ever contains a comma and rows
//! parse with a plain split. Floats are written with `Display`, which
//! round-trips `f32` exactly.

use std::{
    fs::{self, File},
    io::{self, BufRead as _, BufReader, BufWriter, Write as _},
    path::Path,
};

use anyhow::{Context as _, bail};
use neuroevo_policy::Genome;
use neuroevo_training::record::{GenerationRecord, RecordSink};

pub const HEADER: &str = "generation,best_fitness,mean_fitness,std_fitness,best_genome";

/// Record sink writing one CSV row per generation.
///
/// Every row is flushed as it arrives, so an interrupted run keeps all the
/// generations it already reported.
#[derive(Debug)]
pub struct CsvRecordSink {
    writer: BufWriter<File>,
}

impl CsvRecordSink {
    /// Creates the file, and any missing parent directories, and writes the
    /// header row.
    pub fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "{HEADER}")?;
        writer.flush()?;
        Ok(Self { writer })
    }
}

impl RecordSink for CsvRecordSink {
    fn append(&mut self, record: &GenerationRecord) -> io::Result<()> {
        writeln!(
            self.writer,
            "{},{},{},{},{}",
            record.generation,
            record.best_fitness,
            record.mean_fitness,
            record.std_fitness,
            format_genome(&record.best_genome),
        )?;
        self.writer.flush()
    }
}

fn format_genome(genome: &Genome) -> String {
    genome
        .genes()
        .iter()
        .map(f32::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_genome(field: &str) -> Result<Genome, std::num::ParseFloatError> {
    field.split_whitespace().map(str::parse).collect()
}

/// Reads a record file produced by [`CsvRecordSink`].
pub fn read_records(path: &Path) -> anyhow::Result<Vec<GenerationRecord>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open record file: {}", path.display()))?;
    let mut lines = BufReader::new(file).lines();
    let header = lines
        .next()
        .transpose()?
        .with_context(|| format!("record file is empty: {}", path.display()))?;
    if header != HEADER {
        bail!("unexpected header in {}: {header:?}", path.display());
    }

    let mut records = Vec::new();
    for (index, line) in lines.enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let record = parse_row(&line)
            .with_context(|| format!("bad record row {} in {}", index + 2, path.display()))?;
        records.push(record);
    }
    Ok(records)
}

fn parse_row(line: &str) -> anyhow::Result<GenerationRecord> {
    let mut fields = line.splitn(5, ',');
    let mut next = || fields.next().context("missing column");
    Ok(GenerationRecord {
        generation: next()?.parse()?,
        best_fitness: next()?.parse()?,
        mean_fitness: next()?.parse()?,
        std_fitness: next()?.parse()?,
        best_genome: parse_genome(next()?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(generation: usize) -> GenerationRecord {
        GenerationRecord {
            generation,
            best_fitness: 199.25,
            mean_fitness: -3.5,
            std_fitness: 0.125,
            best_genome: Genome::new(vec![0.5, -1.0e6, 0.0078125]),
        }
    }

    #[test]
    fn test_round_trips_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart-pole").join("seed-7.csv");

        let mut sink = CsvRecordSink::create(&path).unwrap();
        sink.append(&record(0)).unwrap();
        sink.append(&record(1)).unwrap();
        drop(sink);

        let records = read_records(&path).unwrap();
        assert_eq!(records, vec![record(0), record(1)]);
    }

    #[test]
    fn test_rejects_unexpected_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "generation,fitness\n0,1.0\n").unwrap();

        let err = read_records(&path).unwrap_err();
        assert!(err.to_string().contains("unexpected header"));
    }

    #[test]
    fn test_reports_row_number_on_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, format!("{HEADER}\n0,1.0,0.5,0.1,0.0\nnot-a-number,1,1,1,1\n")).unwrap();

        let err = read_records(&path).unwrap_err();
        assert!(err.to_string().contains("row 3"));
    }
}
