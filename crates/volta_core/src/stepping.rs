pub mod explicit;
pub mod implicit;
pub mod reaction;
pub mod tridiag;

pub use explicit::ExplicitScheme;
pub use implicit::{DoubleLayer, DoubleLayerParams, ImplicitScheme};
pub use reaction::ReactionStepper;
pub use tridiag::Tridiagonal;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::boundary::{ButlerVolmer, Kinetics};
use crate::error::{Result, SimulationError};
use crate::field::ConcentrationFields;
use crate::grid::SpaceGrid;
use crate::species::{ElectroactiveSpecies, HomogeneousSpecies, Mechanism};
use crate::traits::DiffusionScheme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Explicit,
    Implicit,
}

impl FromStr for Scheme {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "explicit" => Ok(Scheme::Explicit),
            "implicit" => Ok(Scheme::Implicit),
            other => Err(SimulationError::invalid(
                "scheme",
                format!("expected `explicit` or `implicit`, got `{other}`"),
            )),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Scheme::Explicit => "explicit",
            Scheme::Implicit => "implicit",
        })
    }
}

/// Everything a scheme needs to be assembled for one run.
pub struct StepperSetup<'a> {
    pub mechanism: Mechanism,
    pub kinetics: Kinetics,
    pub grid: &'a SpaceGrid,
    pub d_t: f64,
    pub couple: &'a ElectroactiveSpecies,
    pub homogeneous: Option<&'a HomogeneousSpecies>,
    pub double_layer: Option<DoubleLayerParams>,
    /// Applied potential at `t[0]`, the resting electrode potential.
    pub initial_potential: f64,
}

impl Scheme {
    pub fn build(self, setup: &StepperSetup<'_>) -> Result<Stepper> {
        let surface = setup
            .mechanism
            .has_electron_transfer()
            .then(|| ButlerVolmer::new(setup.kinetics, setup.couple, setup.grid.d_x));

        match self {
            Scheme::Explicit => {
                if setup.double_layer.is_some() {
                    return Err(SimulationError::UnsupportedCombination(
                        "double-layer charging requires the implicit scheme".into(),
                    ));
                }
                let reaction = if setup.mechanism.has_homogeneous_step() {
                    let product = setup.homogeneous.ok_or_else(|| {
                        SimulationError::UnsupportedCombination(format!(
                            "mechanism {} needs a homogeneous species",
                            setup.mechanism
                        ))
                    })?;
                    Some(ReactionStepper::new(
                        setup.grid.n_x,
                        setup.d_t,
                        setup.grid.lambda,
                        setup.couple.dor,
                        product.dpr,
                        product.kc_norm,
                    )?)
                } else {
                    None
                };
                let scheme =
                    ExplicitScheme::new(setup.grid.lambda, setup.couple.dor, surface, reaction)?;
                Ok(Stepper::Explicit(scheme))
            }
            Scheme::Implicit => {
                let surface = match (setup.mechanism, surface) {
                    (Mechanism::E, Some(surface)) => surface,
                    _ => {
                        return Err(SimulationError::UnsupportedCombination(format!(
                            "the implicit scheme supports mechanism E only, got {}",
                            setup.mechanism
                        )))
                    }
                };
                let double_layer = setup
                    .double_layer
                    .map(|params| DoubleLayer::new(params, setup.initial_potential))
                    .transpose()?;
                Ok(Stepper::Implicit(ImplicitScheme::new(
                    setup.grid.n_x,
                    setup.grid.lambda,
                    surface,
                    double_layer,
                )))
            }
        }
    }
}

pub enum Stepper {
    Explicit(ExplicitScheme),
    Implicit(ImplicitScheme),
}

impl DiffusionScheme for Stepper {
    fn name(&self) -> &'static str {
        match self {
            Stepper::Explicit(s) => s.name(),
            Stepper::Implicit(s) => s.name(),
        }
    }

    fn advance(&mut self, fields: &mut ConcentrationFields, k: usize, eps: f64) -> Result<()> {
        match self {
            Stepper::Explicit(s) => s.advance(fields, k, eps),
            Stepper::Implicit(s) => s.advance(fields, k, eps),
        }
    }

    fn electrode_potential(&self, applied: f64) -> f64 {
        match self {
            Stepper::Explicit(s) => s.electrode_potential(applied),
            Stepper::Implicit(s) => s.electrode_potential(applied),
        }
    }

    fn measured_current(&mut self, applied: f64, faradaic: f64, dt: Option<f64>) -> f64 {
        match self {
            Stepper::Explicit(s) => s.measured_current(applied, faradaic, dt),
            Stepper::Implicit(s) => s.measured_current(applied, faradaic, dt),
        }
    }
}
