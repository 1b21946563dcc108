use neuroevo_env::{ActionSpace, MAX_ACTION_DIM};
use serde::{Deserialize, Serialize};

/// Element-wise activation applied after a layer's affine transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Activation {
    /// Pass values through unchanged.
    Identity,
    /// Hyperbolic tangent, squashing into `(-1, 1)`.
    #[default]
    Tanh,
    /// Rectified linear unit, `max(0, x)`.
    Relu,
    /// Logistic sigmoid, squashing into `(0, 1)`.
    Sigmoid,
}

impl Activation {
    /// Applies the activation to one value.
    #[must_use]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Self::Identity => x,
            Self::Tanh => x.tanh(),
            Self::Relu => x.max(0.0),
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
        }
    }
}

/// How raw output-layer values become an environment action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputTransform {
    /// Pick the index of the largest output (discrete action spaces).
    /// Ties go to the lowest index.
    Argmax,
    /// Emit the outputs as an action vector, optionally clipped to
    /// `[low, high]` (continuous action spaces).
    Continuous { clip: Option<(f32, f32)> },
}

/// Architecture of a fixed-topology feedforward policy network.
///
/// `layer_sizes` lists neuron counts from input to output; `activations`
/// holds one entry per weight layer (the transform between two consecutive
/// sizes). A spec is validated on construction, so the codec and the forward
/// pass can assume it is internally consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSpec {
    layer_sizes: Vec<usize>,
    activations: Vec<Activation>,
    output: OutputTransform,
}

impl NetworkSpec {
    /// Creates a validated network spec.
    pub fn new(
        layer_sizes: Vec<usize>,
        activations: Vec<Activation>,
        output: OutputTransform,
    ) -> Result<Self, SpecError> {
        if layer_sizes.len() < 2 {
            return Err(SpecError::TooFewLayers {
                count: layer_sizes.len(),
            });
        }
        if let Some(index) = layer_sizes.iter().position(|&size| size == 0) {
            return Err(SpecError::EmptyLayer { index });
        }
        if activations.len() != layer_sizes.len() - 1 {
            return Err(SpecError::ActivationCount {
                expected: layer_sizes.len() - 1,
                got: activations.len(),
            });
        }
        let output_dim = layer_sizes[layer_sizes.len() - 1];
        if let OutputTransform::Continuous { clip } = output {
            if output_dim > MAX_ACTION_DIM {
                return Err(SpecError::OutputTooWide {
                    size: output_dim,
                    max: MAX_ACTION_DIM,
                });
            }
            if let Some((low, high)) = clip {
                if !low.is_finite() || !high.is_finite() || low >= high {
                    return Err(SpecError::InvalidClipRange { low, high });
                }
            }
        }
        Ok(Self {
            layer_sizes,
            activations,
            output,
        })
    }

    /// Builds a spec sized for an environment interface.
    ///
    /// The input layer matches the observation width and the output layer
    /// matches the action space: argmax over one output per choice for
    /// discrete spaces, a clipped linear vector for continuous ones. Hidden
    /// layers use `hidden_activation`; the output layer is linear.
    pub fn for_env(
        observation_dim: usize,
        hidden: &[usize],
        action_space: ActionSpace,
        hidden_activation: Activation,
    ) -> Result<Self, SpecError> {
        let mut layer_sizes = Vec::with_capacity(hidden.len() + 2);
        layer_sizes.push(observation_dim);
        layer_sizes.extend_from_slice(hidden);
        layer_sizes.push(action_space.policy_outputs());

        let mut activations = vec![hidden_activation; hidden.len()];
        activations.push(Activation::Identity);

        let output = match action_space {
            ActionSpace::Discrete { .. } => OutputTransform::Argmax,
            ActionSpace::Continuous { low, high, .. } => OutputTransform::Continuous {
                clip: Some((low, high)),
            },
        };
        Self::new(layer_sizes, activations, output)
    }

    /// Neuron counts from input to output.
    #[must_use]
    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    /// Activations, one per weight layer.
    #[must_use]
    pub fn activations(&self) -> &[Activation] {
        &self.activations
    }

    /// The output transform.
    #[must_use]
    pub fn output(&self) -> OutputTransform {
        self.output
    }

    /// Width of the input layer.
    #[must_use]
    pub fn input_dim(&self) -> usize {
        self.layer_sizes[0]
    }

    /// Width of the output layer.
    #[must_use]
    pub fn output_dim(&self) -> usize {
        self.layer_sizes[self.layer_sizes.len() - 1]
    }

    /// Shapes of the weight layers as `(fan_in, fan_out)` pairs.
    pub fn layer_shapes(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.layer_sizes.windows(2).map(|pair| (pair[0], pair[1]))
    }

    /// Total number of parameters a genome must supply: for each weight
    /// layer, `fan_in * fan_out` weights plus `fan_out` biases.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.layer_shapes()
            .map(|(fan_in, fan_out)| fan_in * fan_out + fan_out)
            .sum()
    }

    /// Checks that the network's ends match an environment interface.
    pub fn check_env(
        &self,
        observation_dim: usize,
        action_space: ActionSpace,
    ) -> Result<(), SpecError> {
        let expected_out = action_space.policy_outputs();
        if self.input_dim() != observation_dim || self.output_dim() != expected_out {
            return Err(SpecError::EnvMismatch {
                expected_in: observation_dim,
                expected_out,
                got_in: self.input_dim(),
                got_out: self.output_dim(),
            });
        }
        Ok(())
    }
}

/// Errors from constructing an invalid [`NetworkSpec`].
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum SpecError {
    /// Fewer than two layer sizes were given.
    #[display("a network needs at least an input and an output layer, got {count} sizes")]
    TooFewLayers { count: usize },
    /// A layer has zero width.
    #[display("layer {index} has zero width")]
    EmptyLayer { index: usize },
    /// Activation count does not match the number of weight layers.
    #[display("expected {expected} activations (one per weight layer), got {got}")]
    ActivationCount { expected: usize, got: usize },
    /// The clip bounds do not form a valid interval.
    #[display("clip range [{low}, {high}] is not a valid interval")]
    InvalidClipRange { low: f32, high: f32 },
    /// A continuous output layer is wider than actions can carry.
    #[display("continuous output width {size} exceeds the supported maximum {max}")]
    OutputTooWide { size: usize, max: usize },
    /// The network does not fit the environment's interface.
    #[display(
        "environment interface is {expected_in} observations to {expected_out} outputs, \
         network is {got_in} to {got_out}"
    )]
    EnvMismatch {
        expected_in: usize,
        expected_out: usize,
        got_in: usize,
        got_out: usize,
    },
}

#[cfg(test)]
mod tests {
    use neuroevo_env::EnvKind;

    use super::*;

    fn tanh_net(layer_sizes: Vec<usize>) -> Result<NetworkSpec, SpecError> {
        let activations = vec![Activation::Tanh; layer_sizes.len().saturating_sub(1)];
        NetworkSpec::new(layer_sizes, activations, OutputTransform::Argmax)
    }

    #[test]
    fn test_param_count_counts_weights_and_biases() {
        let spec = tanh_net(vec![4, 8, 2]).unwrap();
        assert_eq!(spec.param_count(), 58);

        let spec = tanh_net(vec![3, 1]).unwrap();
        assert_eq!(spec.param_count(), 4);
    }

    #[test]
    fn test_layer_shapes_walk_consecutive_pairs() {
        let spec = tanh_net(vec![4, 8, 2]).unwrap();
        let shapes = spec.layer_shapes().collect::<Vec<_>>();
        assert_eq!(shapes, vec![(4, 8), (8, 2)]);
        assert_eq!(spec.input_dim(), 4);
        assert_eq!(spec.output_dim(), 2);
    }

    #[test]
    fn test_new_rejects_inconsistent_specs() {
        assert!(matches!(
            tanh_net(vec![4]),
            Err(SpecError::TooFewLayers { count: 1 })
        ));
        assert!(matches!(
            tanh_net(vec![4, 0, 2]),
            Err(SpecError::EmptyLayer { index: 1 })
        ));
        assert!(matches!(
            NetworkSpec::new(vec![4, 2], vec![], OutputTransform::Argmax),
            Err(SpecError::ActivationCount {
                expected: 1,
                got: 0
            })
        ));
        assert!(matches!(
            NetworkSpec::new(
                vec![3, 1],
                vec![Activation::Identity],
                OutputTransform::Continuous {
                    clip: Some((2.0, -2.0)),
                },
            ),
            Err(SpecError::InvalidClipRange { .. })
        ));
    }

    #[test]
    fn test_for_env_matches_environment_interface() {
        let kind = EnvKind::CartPole;
        let spec = NetworkSpec::for_env(
            kind.observation_dim(),
            &[8],
            kind.action_space(),
            Activation::Tanh,
        )
        .unwrap();
        assert_eq!(spec.layer_sizes(), &[4, 8, 2]);
        assert_eq!(
            spec.activations(),
            &[Activation::Tanh, Activation::Identity]
        );
        assert_eq!(spec.output(), OutputTransform::Argmax);
        assert!(spec.check_env(kind.observation_dim(), kind.action_space()).is_ok());

        let kind = EnvKind::Pendulum;
        let spec = NetworkSpec::for_env(
            kind.observation_dim(),
            &[6, 6],
            kind.action_space(),
            Activation::Relu,
        )
        .unwrap();
        assert_eq!(spec.layer_sizes(), &[3, 6, 6, 1]);
        assert_eq!(
            spec.output(),
            OutputTransform::Continuous {
                clip: Some((-2.0, 2.0)),
            }
        );
    }

    #[test]
    fn test_check_env_flags_mismatch() {
        let spec = tanh_net(vec![4, 8, 2]).unwrap();
        let err = spec
            .check_env(
                EnvKind::MountainCar.observation_dim(),
                EnvKind::MountainCar.action_space(),
            )
            .unwrap_err();
        assert!(matches!(err, SpecError::EnvMismatch { .. }));
    }

    #[test]
    fn test_activation_values() {
        assert_eq!(Activation::Identity.apply(-1.5), -1.5);
        assert_eq!(Activation::Relu.apply(-1.5), 0.0);
        assert_eq!(Activation::Relu.apply(2.0), 2.0);
        assert!((Activation::Tanh.apply(0.0)).abs() < 1e-6);
        assert!((Activation::Sigmoid.apply(0.0) - 0.5).abs() < 1e-6);
    }
}
