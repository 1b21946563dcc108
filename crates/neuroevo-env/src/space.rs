use arrayvec::ArrayVec;

/// Widest observation vector any supported environment produces.
pub const MAX_OBS_DIM: usize = 8;

/// Widest action vector any supported continuous action space accepts.
pub const MAX_ACTION_DIM: usize = 4;

/// A dense observation vector, stored inline.
pub type Observation = ArrayVec<f32, MAX_OBS_DIM>;

/// An action chosen by a policy.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::IsVariant)]
pub enum Action {
    /// One of a finite set of choices, identified by index.
    #[display("discrete({_0})")]
    Discrete(usize),
    /// A real-valued action vector.
    #[display("continuous({_0:?})")]
    Continuous(ArrayVec<f32, MAX_ACTION_DIM>),
}

/// The set of actions an environment accepts.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display)]
pub enum ActionSpace {
    /// A finite set of `n` choices.
    #[display("discrete({n})")]
    Discrete { n: usize },
    /// A `dim`-dimensional box with every component in `[low, high]`.
    #[display("continuous({dim}d in [{low}, {high}])")]
    Continuous { dim: usize, low: f32, high: f32 },
}

impl ActionSpace {
    /// Number of outputs a policy network needs to drive this space.
    ///
    /// Discrete spaces take one output per choice (the policy picks the
    /// largest); continuous spaces take one output per component.
    #[must_use]
    pub fn policy_outputs(&self) -> usize {
        match self {
            Self::Discrete { n } => *n,
            Self::Continuous { dim, .. } => *dim,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_outputs() {
        assert_eq!(ActionSpace::Discrete { n: 3 }.policy_outputs(), 3);
        let space = ActionSpace::Continuous {
            dim: 2,
            low: -1.0,
            high: 1.0,
        };
        assert_eq!(space.policy_outputs(), 2);
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::Discrete(1).to_string(), "discrete(1)");
        assert!(Action::Discrete(0).is_discrete());
    }
}
