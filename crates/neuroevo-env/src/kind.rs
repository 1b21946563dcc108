use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    cart_pole::CartPole,
    environment::BoxedEnv,
    mountain_car::MountainCar,
    pendulum::Pendulum,
    space::ActionSpace,
};

/// Identifier for a built-in environment.
///
/// The string form, used in config files, CLI filters, and log directory
/// names, is the kebab-case id: `cart-pole`, `mountain-car`, `pendulum`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum EnvKind {
    /// [`CartPole`]: balance a pole on a sliding cart.
    #[display("cart-pole")]
    CartPole,
    /// [`MountainCar`]: drive an underpowered car out of a valley.
    #[display("mountain-car")]
    MountainCar,
    /// [`Pendulum`]: swing a pendulum upright with bounded torque.
    #[display("pendulum")]
    Pendulum,
}

impl EnvKind {
    /// Observation width of this environment.
    #[must_use]
    pub fn observation_dim(self) -> usize {
        match self {
            Self::CartPole => CartPole::OBSERVATION_DIM,
            Self::MountainCar => MountainCar::OBSERVATION_DIM,
            Self::Pendulum => Pendulum::OBSERVATION_DIM,
        }
    }

    /// Action space of this environment.
    #[must_use]
    pub fn action_space(self) -> ActionSpace {
        match self {
            Self::CartPole => CartPole::ACTION_SPACE,
            Self::MountainCar => MountainCar::ACTION_SPACE,
            Self::Pendulum => Pendulum::ACTION_SPACE,
        }
    }

    /// Builds a fresh, unstarted instance of this environment.
    #[must_use]
    pub fn build(self) -> BoxedEnv {
        match self {
            Self::CartPole => Box::new(CartPole::new()),
            Self::MountainCar => Box::new(MountainCar::new()),
            Self::Pendulum => Box::new(Pendulum::new()),
        }
    }
}

/// Error returned when a string is not a known environment id.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("unknown environment id `{id}`, expected one of: cart-pole, mountain-car, pendulum")]
pub struct ParseEnvKindError {
    pub id: String,
}

impl FromStr for EnvKind {
    type Err = ParseEnvKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cart-pole" => Ok(Self::CartPole),
            "mountain-car" => Ok(Self::MountainCar),
            "pendulum" => Ok(Self::Pendulum),
            _ => Err(ParseEnvKindError { id: s.to_owned() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_from_str_round_trip() {
        for kind in [EnvKind::CartPole, EnvKind::MountainCar, EnvKind::Pendulum] {
            assert_eq!(kind.to_string().parse::<EnvKind>().unwrap(), kind);
        }
        assert!("cartpole".parse::<EnvKind>().is_err());
    }

    #[test]
    fn test_serde_uses_kebab_case_ids() {
        let json = serde_json::to_string(&EnvKind::MountainCar).unwrap();
        assert_eq!(json, "\"mountain-car\"");
        let kind: EnvKind = serde_json::from_str("\"cart-pole\"").unwrap();
        assert_eq!(kind, EnvKind::CartPole);
    }

    #[test]
    fn test_descriptors_match_built_instances() {
        for kind in [EnvKind::CartPole, EnvKind::MountainCar, EnvKind::Pendulum] {
            let env = kind.build();
            assert_eq!(env.observation_dim(), kind.observation_dim());
            assert_eq!(env.action_space(), kind.action_space());
        }
    }
}
