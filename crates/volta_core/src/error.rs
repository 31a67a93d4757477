//! Error taxonomy for the simulation kernel.
//!
//! Every failure is either a configuration mistake, an input-contract
//! violation by the waveform supplier, or a numerical divergence detected
//! after a time step. None of them are retried.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Exactly one bulk concentration must be positive (cOb = {c_ob}, cRb = {c_rb}).")]
    BulkConcentration { c_ob: f64, c_rb: f64 },

    #[error("Unknown kinetic regime `{0}`; expected one of QR, RO, OR.")]
    UnknownKinetics(String),

    #[error("Unknown mechanism `{0}`; expected one of E, EC, C.")]
    UnknownMechanism(String),

    #[error("Grid is unstable for explicit stepping: effective lambda {lambda:.4} for {species} must be below {limit}.")]
    UnstableGrid {
        species: &'static str,
        lambda: f64,
        limit: f64,
    },

    #[error("RK4 reaction-diffusion step is unstable: dT times the spectral radius for {species} is {spectral:.4}, which must be below {limit}. Refine the time grid or lower kc.")]
    UnstableReaction {
        species: &'static str,
        spectral: f64,
        limit: f64,
    },

    #[error("Grid too coarse: {nx} distance nodes, at least 3 are needed to resolve the current.")]
    GridTooCoarse { nx: usize },

    #[error("Unsupported configuration: {0}")]
    UnsupportedCombination(String),

    #[error("Invalid waveform: {0}")]
    InvalidWaveform(String),

    #[error("Non-finite value in {field} at time step {step}; the run was aborted.")]
    Divergence { field: &'static str, step: usize },

    #[error("Tridiagonal system is singular (zero pivot at row {row}).")]
    SingularTridiagonal { row: usize },
}

impl SimulationError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SimulationError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// True for mistakes in the supplied parameters or settings.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SimulationError::InvalidParameter { .. }
                | SimulationError::BulkConcentration { .. }
                | SimulationError::UnknownKinetics(_)
                | SimulationError::UnknownMechanism(_)
                | SimulationError::UnstableGrid { .. }
                | SimulationError::UnstableReaction { .. }
                | SimulationError::GridTooCoarse { .. }
                | SimulationError::UnsupportedCombination(_)
        )
    }

    /// True when the arithmetic of a run broke down.
    pub fn is_numerical(&self) -> bool {
        matches!(
            self,
            SimulationError::Divergence { .. } | SimulationError::SingularTridiagonal { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
