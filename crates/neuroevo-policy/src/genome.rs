use serde::{Deserialize, Serialize};

/// A flat vector of evolvable parameters.
///
/// The genome is the unit the genetic algorithm manipulates: a plain `f32`
/// vector with no internal structure. The [`codec`](crate::codec) gives it
/// meaning by mapping it onto network layers; the variation operators treat
/// it as an opaque gene sequence. Genomes are immutable once created, so
/// operators build new ones instead of editing in place.
///
/// Serializes transparently as a flat number array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genome(Vec<f32>);

impl Genome {
    /// Wraps a gene vector.
    #[must_use]
    pub fn new(genes: Vec<f32>) -> Self {
        Self(genes)
    }

    /// The raw gene sequence.
    #[must_use]
    pub fn genes(&self) -> &[f32] {
        &self.0
    }

    /// Number of genes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f32>> for Genome {
    fn from(genes: Vec<f32>) -> Self {
        Self::new(genes)
    }
}

impl FromIterator<f32> for Genome {
    fn from_iter<I: IntoIterator<Item = f32>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
