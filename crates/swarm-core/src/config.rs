use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Species-wide parameters shared by every particle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Species {
    /// Per-axis velocity cap.
    pub v_max: f64,
    /// Exponential velocity decay base, applied as `v_decay ^ timestep`.
    pub v_decay: f64,
    /// Per-axis acceleration cap.
    pub a_max: f64,
    /// Sight distance for the cohesion urgency.
    pub d_max: f64,
    /// Urgency magnitude that maps onto `a_max`.
    pub u_max: f64,
    /// Strength of the cohesion urgency.
    pub u1_p: f64,
    /// Strength of the separation urgency.
    pub u2_p: f64,
    /// Distance at which separation stops acting.
    pub u2_dopt: f64,
    /// Strength of the predator avoidance urgency.
    pub u3_p: f64,
    /// Distance at which predators stop triggering an escape.
    pub u3_dmax: f64,
}

impl Default for Species {
    fn default() -> Self {
        Self {
            v_max: 2.0,
            v_decay: 0.5,
            a_max: 1.0,
            d_max: 10.0,
            u_max: 10.0,
            u1_p: 1.0,
            u2_p: 5.0,
            u2_dopt: 1.0,
            u3_p: 10.0,
            u3_dmax: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpeciesError {
    NonFinite { field: &'static str },
    NonPositive { field: &'static str },
    Negative { field: &'static str },
}

impl std::fmt::Display for SpeciesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpeciesError::NonFinite { field } => write!(f, "{field} must be finite"),
            SpeciesError::NonPositive { field } => write!(f, "{field} must be positive"),
            SpeciesError::Negative { field } => write!(f, "{field} must be non-negative"),
        }
    }
}

impl std::error::Error for SpeciesError {}

impl Species {
    /// Sanity-check parameters loaded from a scenario file.
    ///
    /// The engine itself never calls this; it only validates shapes.
    pub fn validate(&self) -> Result<(), SpeciesError> {
        let fields = [
            ("v_max", self.v_max),
            ("v_decay", self.v_decay),
            ("a_max", self.a_max),
            ("d_max", self.d_max),
            ("u_max", self.u_max),
            ("u1_p", self.u1_p),
            ("u2_p", self.u2_p),
            ("u2_dopt", self.u2_dopt),
            ("u3_p", self.u3_p),
            ("u3_dmax", self.u3_dmax),
        ];
        if let Some((field, _)) = fields.into_iter().find(|(_, value)| !value.is_finite()) {
            return Err(SpeciesError::NonFinite { field });
        }
        for (field, value) in [
            ("v_max", self.v_max),
            ("a_max", self.a_max),
            ("u_max", self.u_max),
        ] {
            if value <= 0.0 {
                return Err(SpeciesError::NonPositive { field });
            }
        }
        for (field, value) in [
            ("v_decay", self.v_decay),
            ("d_max", self.d_max),
            ("u2_dopt", self.u2_dopt),
            ("u3_dmax", self.u3_dmax),
        ] {
            if value < 0.0 {
                return Err(SpeciesError::Negative { field });
            }
        }
        Ok(())
    }
}

/// Immutable per-run configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub species: Species,
    /// `(n, 3)` non-negative weights: one row per particle, one column per
    /// urgency component (cohesion, separation, avoidance).
    pub uw: Array2<f64>,
}

impl Config {
    pub fn new(species: Species, uw: Array2<f64>) -> Self {
        Self { species, uw }
    }

    /// Every particle weighs every urgency component equally.
    pub fn uniform(species: Species, particles: usize) -> Self {
        Self::new(
            species,
            Array2::ones((particles, crate::constants::URGENCY_COUNT)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_species_json_deserializes_with_defaults() {
        let json = r#"{ "v_max": 3.0, "u3_dmax": 8.0 }"#;
        let species: Species = serde_json::from_str(json).expect("partial species should parse");
        assert_eq!(species.v_max, 3.0);
        assert_eq!(species.u3_dmax, 8.0);
        assert_eq!(species.a_max, Species::default().a_max);
    }

    #[test]
    fn default_species_is_valid() {
        assert_eq!(Species::default().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_non_finite() {
        let species = Species {
            u2_p: f64::NAN,
            ..Species::default()
        };
        assert_eq!(
            species.validate(),
            Err(SpeciesError::NonFinite { field: "u2_p" })
        );
    }

    #[test]
    fn validate_rejects_zero_u_max() {
        let species = Species {
            u_max: 0.0,
            ..Species::default()
        };
        assert_eq!(
            species.validate(),
            Err(SpeciesError::NonPositive { field: "u_max" })
        );
    }

    #[test]
    fn validate_rejects_negative_range() {
        let species = Species {
            d_max: -1.0,
            ..Species::default()
        };
        assert_eq!(
            species.validate(),
            Err(SpeciesError::Negative { field: "d_max" })
        );
    }

    #[test]
    fn uniform_config_has_one_row_per_particle() {
        let config = Config::uniform(Species::default(), 4);
        assert_eq!(config.uw.dim(), (4, 3));
        assert!(config.uw.iter().all(|&w| w == 1.0));
    }
}
