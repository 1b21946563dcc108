//! Forward pass for decoded policy networks.

use arrayvec::ArrayVec;
use neuroevo_env::{Action, MAX_ACTION_DIM};

use crate::{
    codec::LayerParams,
    spec::{NetworkSpec, OutputTransform},
};

/// Runs one observation through the network and picks an action.
///
/// The pass is stateless; policies carry no memory between steps, so the
/// same observation and parameters always produce the same action.
///
/// `layers` must come from [`decode`](crate::codec::decode) with the same
/// spec; width mismatches are a caller bug and only checked in debug builds.
#[must_use]
pub fn act(observation: &[f32], layers: &[LayerParams], spec: &NetworkSpec) -> Action {
    debug_assert_eq!(observation.len(), spec.input_dim());
    debug_assert_eq!(layers.len(), spec.activations().len());

    let mut values = observation.to_vec();
    let mut next = Vec::new();
    for (layer, activation) in layers.iter().zip(spec.activations()) {
        next.clear();
        for unit in 0..layer.fan_out() {
            let mut sum = layer.biases()[unit];
            for (weight, value) in layer.row(unit).iter().zip(&values) {
                sum += weight * value;
            }
            next.push(activation.apply(sum));
        }
        std::mem::swap(&mut values, &mut next);
    }

    match spec.output() {
        OutputTransform::Argmax => Action::Discrete(argmax(&values)),
        OutputTransform::Continuous { clip } => {
            let mut components = ArrayVec::<f32, MAX_ACTION_DIM>::new();
            for &value in &values {
                components.push(match clip {
                    Some((low, high)) => value.clamp(low, high),
                    None => value,
                });
            }
            Action::Continuous(components)
        }
    }
}

/// Index of the largest value; the first wins on ties.
fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (index, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] {
            best = index;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use crate::{
        codec::decode,
        genome::Genome,
        spec::{Activation, OutputTransform},
    };

    use super::*;

    fn linear_spec(layer_sizes: Vec<usize>, output: OutputTransform) -> NetworkSpec {
        let activations = vec![Activation::Identity; layer_sizes.len() - 1];
        NetworkSpec::new(layer_sizes, activations, output).unwrap()
    }

    #[test]
    fn test_identity_network_passes_observation_through() {
        let spec = linear_spec(vec![2, 2], OutputTransform::Argmax);
        // Identity weight matrix, zero biases.
        let genome = Genome::new(vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        let layers = decode(&genome, &spec).unwrap();

        assert_eq!(act(&[0.3, 0.7], &layers, &spec), Action::Discrete(1));
        assert_eq!(act(&[0.7, 0.3], &layers, &spec), Action::Discrete(0));
    }

    #[test]
    fn test_bias_positions_follow_weight_rows() {
        // One input, two outputs: unit 0 doubles the input, unit 1 is a
        // constant 5. The layouts only agree if biases trail the weights.
        let spec = linear_spec(vec![1, 2], OutputTransform::Argmax);
        let genome = Genome::new(vec![2.0, 0.0, 0.0, 5.0]);
        let layers = decode(&genome, &spec).unwrap();

        assert_eq!(act(&[3.0], &layers, &spec), Action::Discrete(0));
        assert_eq!(act(&[2.0], &layers, &spec), Action::Discrete(1));
    }

    #[test]
    fn test_layers_compose_in_order() {
        let spec = linear_spec(
            vec![1, 1, 1],
            OutputTransform::Continuous { clip: None },
        );
        // First layer: x -> 2x + 1. Second: h -> 3h.
        let genome = Genome::new(vec![2.0, 1.0, 3.0, 0.0]);
        let layers = decode(&genome, &spec).unwrap();

        let action = act(&[1.0], &layers, &spec);
        assert_eq!(action, Action::Continuous([9.0].into_iter().collect()));
    }

    #[test]
    fn test_argmax_breaks_ties_low() {
        let spec = linear_spec(vec![1, 3], OutputTransform::Argmax);
        let genome = Genome::new(vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0]);
        let layers = decode(&genome, &spec).unwrap();
        assert_eq!(act(&[9.0], &layers, &spec), Action::Discrete(0));
    }

    #[test]
    fn test_continuous_output_is_clipped() {
        let spec = linear_spec(
            vec![1, 1],
            OutputTransform::Continuous {
                clip: Some((-2.0, 2.0)),
            },
        );
        let genome = Genome::new(vec![10.0, 0.0]);
        let layers = decode(&genome, &spec).unwrap();

        let action = act(&[1.0], &layers, &spec);
        assert_eq!(action, Action::Continuous([2.0].into_iter().collect()));
    }

    #[test]
    fn test_hidden_activation_is_applied() {
        let spec = NetworkSpec::new(
            vec![1, 1, 1],
            vec![Activation::Relu, Activation::Identity],
            OutputTransform::Continuous { clip: None },
        )
        .unwrap();
        // Hidden unit computes -3x; relu zeroes it for positive input.
        let genome = Genome::new(vec![-3.0, 0.0, 1.0, 0.5]);
        let layers = decode(&genome, &spec).unwrap();

        assert_eq!(
            act(&[2.0], &layers, &spec),
            Action::Continuous([0.5].into_iter().collect())
        );
        assert_eq!(
            act(&[-2.0], &layers, &spec),
            Action::Continuous([6.5].into_iter().collect())
        );
    }
}
