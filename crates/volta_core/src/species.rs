//! Species parameters and their dimensionless derived quantities.
//!
//! Distances are normalized by `delta = sqrt(DR·t_end)`, so the reduced form
//! of the electroactive couple is the reference species: its diffusion ratio
//! is 1, the oxidized form diffuses with `DOR = DO/DR` and the homogeneous
//! product with `DP/DR`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{f_over_rt, DEFAULT_TEMPERATURE};
use crate::error::{Result, SimulationError};

/// Parameters of an electroactive couple `O + n e ⇌ R`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectroactiveParams {
    /// Electrons transferred.
    pub n: u32,
    /// Diffusion coefficient of O, cm²/s.
    pub d_o: f64,
    /// Diffusion coefficient of R, cm²/s.
    pub d_r: f64,
    /// Bulk concentration of O, mol/cm³.
    pub c_ob: f64,
    /// Bulk concentration of R, mol/cm³.
    pub c_rb: f64,
    /// Standard potential, V.
    pub e0: f64,
    /// Standard heterogeneous rate constant, cm/s.
    pub k0: f64,
    /// Transfer coefficient.
    pub alpha: f64,
    /// Temperature, K.
    pub temperature: f64,
}

impl Default for ElectroactiveParams {
    fn default() -> Self {
        Self {
            n: 1,
            d_o: 1e-5,
            d_r: 1e-5,
            c_ob: 0.0,
            c_rb: 1e-6,
            e0: 0.0,
            k0: 1e8,
            alpha: 0.5,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Parameters of the species formed by the homogeneous step `O → P`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomogeneousParams {
    /// Diffusion coefficient of P, cm²/s.
    pub d_p: f64,
    /// Bulk concentration of P, mol/cm³.
    pub c_pb: f64,
    /// First-order rate constant of the homogeneous step.
    pub kc: f64,
}

impl Default for HomogeneousParams {
    fn default() -> Self {
        Self {
            d_p: 1e-5,
            c_pb: 0.0,
            kc: 1e-2,
        }
    }
}

/// Closed set of species kinds a run can be assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Species {
    Electroactive(ElectroactiveParams),
    Homogeneous(HomogeneousParams),
}

/// Which side of the couple is present in the bulk solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulkSpecies {
    Oxidized,
    Reduced,
}

/// Reaction scheme being simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mechanism {
    /// Electron transfer only.
    #[default]
    E,
    /// Electron transfer followed by `O → P` in solution.
    EC,
    /// `O → P` in solution with no electron transfer at the electrode.
    C,
}

impl Mechanism {
    pub fn has_electron_transfer(self) -> bool {
        matches!(self, Mechanism::E | Mechanism::EC)
    }

    pub fn has_homogeneous_step(self) -> bool {
        matches!(self, Mechanism::EC | Mechanism::C)
    }
}

impl FromStr for Mechanism {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "E" => Ok(Mechanism::E),
            "EC" => Ok(Mechanism::EC),
            "C" => Ok(Mechanism::C),
            other => Err(SimulationError::UnknownMechanism(other.to_string())),
        }
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Mechanism::E => "E",
            Mechanism::EC => "EC",
            Mechanism::C => "C",
        };
        f.write_str(label)
    }
}

fn require_positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::invalid(
            name,
            format!("must be positive and finite, got {value}"),
        ))
    }
}

fn require_non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimulationError::invalid(
            name,
            format!("must be non-negative and finite, got {value}"),
        ))
    }
}

/// Electroactive couple with its normalized quantities for one run.
#[derive(Debug, Clone, Serialize)]
pub struct ElectroactiveSpecies {
    pub params: ElectroactiveParams,
    /// `DO/DR`.
    pub dor: f64,
    /// Diffusion-layer thickness `sqrt(DR·t_end)`, cm.
    pub delta: f64,
    /// Normalized standard rate constant `k0·delta/DR`.
    pub k0_norm: f64,
    pub bulk: BulkSpecies,
    /// `n·F/(R·T)`, 1/V.
    pub nf_rt: f64,
}

impl ElectroactiveSpecies {
    pub fn new(params: ElectroactiveParams, t_end: f64) -> Result<Self> {
        if params.n == 0 {
            return Err(SimulationError::invalid("n", "must be at least 1"));
        }
        require_positive("d_o", params.d_o)?;
        require_positive("d_r", params.d_r)?;
        require_positive("k0", params.k0)?;
        require_positive("temperature", params.temperature)?;
        if !(params.alpha > 0.0 && params.alpha < 1.0) {
            return Err(SimulationError::invalid(
                "alpha",
                format!("must lie strictly between 0 and 1, got {}", params.alpha),
            ));
        }
        if !params.e0.is_finite() {
            return Err(SimulationError::invalid("e0", "must be finite"));
        }
        require_non_negative("c_ob", params.c_ob)?;
        require_non_negative("c_rb", params.c_rb)?;
        let bulk = match (params.c_ob > 0.0, params.c_rb > 0.0) {
            (true, false) => BulkSpecies::Oxidized,
            (false, true) => BulkSpecies::Reduced,
            _ => {
                return Err(SimulationError::BulkConcentration {
                    c_ob: params.c_ob,
                    c_rb: params.c_rb,
                })
            }
        };
        require_positive("t_end", t_end)?;

        let delta = (params.d_r * t_end).sqrt();
        Ok(Self {
            params,
            dor: params.d_o / params.d_r,
            delta,
            k0_norm: params.k0 * delta / params.d_r,
            bulk,
            nf_rt: params.n as f64 * f_over_rt(params.temperature),
        })
    }

    /// Concentration every field is normalized by, mol/cm³.
    pub fn reference_concentration(&self) -> f64 {
        match self.bulk {
            BulkSpecies::Oxidized => self.params.c_ob,
            BulkSpecies::Reduced => self.params.c_rb,
        }
    }

    /// Diffusion coefficient of the bulk species, cm²/s.
    pub fn bulk_diffusion(&self) -> f64 {
        match self.bulk {
            BulkSpecies::Oxidized => self.params.d_o,
            BulkSpecies::Reduced => self.params.d_r,
        }
    }

    /// Initial normalized `(CO, CR)`.
    pub fn initial_concentrations(&self) -> (f64, f64) {
        let c_ref = self.reference_concentration();
        (self.params.c_ob / c_ref, self.params.c_rb / c_ref)
    }

    /// Dimensionless overpotential `(E - E0)·n·F/(R·T)`.
    pub fn overpotential(&self, potential: f64) -> f64 {
        (potential - self.params.e0) * self.nf_rt
    }

    /// Overpotential of every waveform point; rejects non-finite results.
    pub fn overpotentials(&self, potentials: &[f64]) -> Result<Vec<f64>> {
        let eps: Vec<f64> = potentials.iter().map(|&e| self.overpotential(e)).collect();
        if let Some(idx) = eps.iter().position(|v| !v.is_finite()) {
            return Err(SimulationError::InvalidWaveform(format!(
                "overpotential at index {idx} is not finite"
            )));
        }
        Ok(eps)
    }
}

/// Homogeneous product species bound to an electroactive couple.
#[derive(Debug, Clone, Serialize)]
pub struct HomogeneousSpecies {
    pub params: HomogeneousParams,
    /// Normalized rate constant `kc·delta/DR`.
    pub kc_norm: f64,
    /// `DP/DR`.
    pub dpr: f64,
    /// Initial normalized `CP`.
    pub initial: f64,
}

impl HomogeneousSpecies {
    pub fn new(params: HomogeneousParams, couple: &ElectroactiveSpecies) -> Result<Self> {
        require_positive("d_p", params.d_p)?;
        require_positive("kc", params.kc)?;
        require_non_negative("c_pb", params.c_pb)?;
        let d_r = couple.params.d_r;
        Ok(Self {
            params,
            kc_norm: params.kc * couple.delta / d_r,
            dpr: params.d_p / d_r,
            initial: params.c_pb / couple.reference_concentration(),
        })
    }
}
