//! Translation between flat genomes and per-layer network parameters.
//!
//! The codec fixes the gene layout: layers are consumed from input to
//! output, and within a layer the weights come first (one row per output
//! unit), then the biases. [`encode`] is the exact inverse of [`decode`], so
//! a genome survives a round trip bit for bit.

use crate::{genome::Genome, spec::NetworkSpec};

/// Dense parameters for one weight layer.
///
/// Weights are stored row-major by output unit: the weight from input `i` to
/// output `j` lives at `weights[j * fan_in + i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerParams {
    fan_in: usize,
    fan_out: usize,
    weights: Vec<f32>,
    biases: Vec<f32>,
}

impl LayerParams {
    fn from_genes(fan_in: usize, fan_out: usize, genes: &[f32]) -> Self {
        let (weights, biases) = genes.split_at(fan_in * fan_out);
        Self {
            fan_in,
            fan_out,
            weights: weights.to_vec(),
            biases: biases.to_vec(),
        }
    }

    /// Input width of this layer.
    #[must_use]
    pub fn fan_in(&self) -> usize {
        self.fan_in
    }

    /// Output width of this layer.
    #[must_use]
    pub fn fan_out(&self) -> usize {
        self.fan_out
    }

    /// All weights, row-major by output unit.
    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Bias of each output unit.
    #[must_use]
    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    /// The weight row feeding output unit `unit`.
    #[must_use]
    pub fn row(&self, unit: usize) -> &[f32] {
        &self.weights[unit * self.fan_in..(unit + 1) * self.fan_in]
    }
}

/// A genome does not provide exactly the parameters a network needs.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
#[display("genome supplies {actual} genes but the network needs exactly {expected}")]
pub struct ShapeMismatchError {
    /// Parameter count the spec requires.
    pub expected: usize,
    /// Gene count actually supplied.
    pub actual: usize,
}

/// Decodes a flat genome into per-layer parameters.
///
/// Fails unless the genome length equals [`NetworkSpec::param_count`]; no
/// padding or silent reshaping.
pub fn decode(genome: &Genome, spec: &NetworkSpec) -> Result<Vec<LayerParams>, ShapeMismatchError> {
    let expected = spec.param_count();
    if genome.len() != expected {
        return Err(ShapeMismatchError {
            expected,
            actual: genome.len(),
        });
    }

    let mut genes = genome.genes();
    let mut layers = Vec::with_capacity(spec.activations().len());
    for (fan_in, fan_out) in spec.layer_shapes() {
        let (layer_genes, rest) = genes.split_at(fan_in * fan_out + fan_out);
        layers.push(LayerParams::from_genes(fan_in, fan_out, layer_genes));
        genes = rest;
    }
    Ok(layers)
}

/// Re-flattens layer parameters into a genome, inverting [`decode`].
///
/// Fails if the layers do not line up with the spec's shapes (for example
/// when they were decoded with a different spec).
pub fn encode(layers: &[LayerParams], spec: &NetworkSpec) -> Result<Genome, ShapeMismatchError> {
    let expected = spec.param_count();
    let shapes_match = layers.len() == spec.activations().len()
        && layers
            .iter()
            .zip(spec.layer_shapes())
            .all(|(layer, (fan_in, fan_out))| layer.fan_in == fan_in && layer.fan_out == fan_out);
    if !shapes_match {
        let actual = layers
            .iter()
            .map(|layer| layer.weights.len() + layer.biases.len())
            .sum();
        return Err(ShapeMismatchError { expected, actual });
    }

    let mut genes = Vec::with_capacity(expected);
    for layer in layers {
        genes.extend_from_slice(&layer.weights);
        genes.extend_from_slice(&layer.biases);
    }
    Ok(Genome::new(genes))
}
