//! Butler–Volmer boundary condition at the electrode surface.
//!
//! Discretizing the surface flux with a first-order difference makes the
//! boundary condition linear in the unknown surface concentration, so every
//! regime has a closed form. Each regime solves for one "leading" species,
//!
//! ```text
//! C0 = g0·C1 + b0
//! ```
//!
//! and the partner follows from the flux balance
//! `(CR1 - CR0) + DOR·(CO1 - CO0) = 0`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::species::ElectroactiveSpecies;

/// Kinetic regime at the electrode, chosen once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Kinetics {
    /// Forward and backward electron transfer (`O ⇌ R`).
    #[default]
    #[serde(rename = "QR")]
    QuasiReversible,
    /// Only the reduced form reacts (`R → O`).
    #[serde(rename = "RO")]
    ReductionOnly,
    /// Only the oxidized form reacts (`O → R`).
    #[serde(rename = "OR")]
    OxidationOnly,
}

impl FromStr for Kinetics {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "QR" => Ok(Kinetics::QuasiReversible),
            "RO" => Ok(Kinetics::ReductionOnly),
            "OR" => Ok(Kinetics::OxidationOnly),
            other => Err(SimulationError::UnknownKinetics(other.to_string())),
        }
    }
}

impl fmt::Display for Kinetics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Kinetics::QuasiReversible => "QR",
            Kinetics::ReductionOnly => "RO",
            Kinetics::OxidationOnly => "OR",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leading {
    Reduced,
    Oxidized,
}

/// Linear surface relation `C0 - g0·C1 = b0` for the leading species.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobinRow {
    pub leading: Leading,
    pub g0: f64,
    pub b0: f64,
}

/// Normalized surface concentrations written to index 0 of row `k`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub co: f64,
    pub cr: f64,
}

/// `1/(1 + exp(ln_k))` without overflowing for large `ln_k`.
fn attenuation(ln_k: f64) -> f64 {
    if ln_k > 0.0 {
        let tail = (-ln_k).exp();
        tail / (1.0 + tail)
    } else {
        1.0 / (1.0 + ln_k.exp())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ButlerVolmer {
    pub kinetics: Kinetics,
    /// `dX·K0`.
    rate: f64,
    alpha: f64,
    dor: f64,
}

impl ButlerVolmer {
    pub fn new(kinetics: Kinetics, species: &ElectroactiveSpecies, d_x: f64) -> Self {
        Self {
            kinetics,
            rate: d_x * species.k0_norm,
            alpha: species.params.alpha,
            dor: species.dor,
        }
    }

    pub fn dor(&self) -> f64 {
        self.dor
    }

    /// Surface relation for overpotential `eps`. `co1` and `cr1` are the
    /// concentrations one node off the surface; only the quasi-reversible
    /// regime needs them.
    ///
    /// The rate terms are carried as logarithms and scaled by the largest
    /// one, so `g0` and `b0` stay finite for any finite `eps`.
    pub fn robin_row(&self, eps: f64, co1: f64, cr1: f64) -> RobinRow {
        let ln_rate = self.rate.ln();
        let ln_anodic = ln_rate + (1.0 - self.alpha) * eps;
        let ln_cathodic = ln_rate - self.alpha * eps - self.dor.ln();
        match self.kinetics {
            Kinetics::QuasiReversible => {
                let top = ln_anodic.max(ln_cathodic).max(0.0);
                let unit = (-top).exp();
                let cathodic = (ln_cathodic - top).exp();
                let den = unit + (ln_anodic - top).exp() + cathodic;
                RobinRow {
                    leading: Leading::Reduced,
                    g0: unit / den,
                    b0: cathodic * (self.dor * co1 + cr1) / den,
                }
            }
            Kinetics::ReductionOnly => RobinRow {
                leading: Leading::Reduced,
                g0: attenuation(ln_anodic),
                b0: 0.0,
            },
            Kinetics::OxidationOnly => RobinRow {
                leading: Leading::Oxidized,
                g0: attenuation(ln_cathodic),
                b0: 0.0,
            },
        }
    }

    /// Partner surface value from the flux balance, given the leading
    /// species' new surface value `lead0` and both node-1 values.
    pub fn partner(&self, leading: Leading, lead0: f64, co1: f64, cr1: f64) -> f64 {
        match leading {
            Leading::Reduced => co1 + (cr1 - lead0) / self.dor,
            Leading::Oxidized => cr1 + self.dor * (co1 - lead0),
        }
    }

    /// Closed-form surface concentrations from the previous row's node 1.
    pub fn surface(&self, co_prev: f64, cr_prev: f64, eps: f64) -> Surface {
        let row = self.robin_row(eps, co_prev, cr_prev);
        match row.leading {
            Leading::Reduced => {
                let cr = row.g0 * cr_prev + row.b0;
                Surface {
                    co: self.partner(Leading::Reduced, cr, co_prev, cr_prev),
                    cr,
                }
            }
            Leading::Oxidized => {
                let co = row.g0 * co_prev + row.b0;
                Surface {
                    co,
                    cr: self.partner(Leading::Oxidized, co, co_prev, cr_prev),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::{ElectroactiveParams, ElectroactiveSpecies};

    fn couple(k0: f64, d_o: f64) -> ElectroactiveSpecies {
        let params = ElectroactiveParams {
            k0,
            d_o,
            ..ElectroactiveParams::default()
        };
        ElectroactiveSpecies::new(params, 1.0).expect("valid couple")
    }

    #[test]
    fn quasi_reversible_matches_closed_form() {
        let species = couple(1e-3, 1.3e-5);
        let d_x = 0.05;
        let bv = ButlerVolmer::new(Kinetics::QuasiReversible, &species, d_x);
        let (co1, cr1, eps) = (0.3, 0.6, 1.7);

        let k0 = species.k0_norm;
        let a = species.params.alpha;
        let dor = species.dor;
        let cr = (cr1 + d_x * k0 * (-a * eps).exp() * (co1 + cr1 / dor))
            / (1.0 + d_x * k0 * (((1.0 - a) * eps).exp() + (-a * eps).exp() / dor));
        let co = co1 + (cr1 - cr) / dor;

        let surface = bv.surface(co1, cr1, eps);
        assert!((surface.cr - cr).abs() < 1e-14);
        assert!((surface.co - co).abs() < 1e-14);
    }

    #[test]
    fn reduction_only_matches_closed_form() {
        let species = couple(1e-2, 1e-5);
        let d_x = 0.1;
        let bv = ButlerVolmer::new(Kinetics::ReductionOnly, &species, d_x);
        let (co1, cr1, eps) = (0.2, 0.8, 0.4);
        let cr = cr1 / (1.0 + d_x * species.k0_norm * (0.5f64 * eps).exp());
        let surface = bv.surface(co1, cr1, eps);
        assert!((surface.cr - cr).abs() < 1e-14);
        assert!((surface.co - (co1 + (cr1 - cr))).abs() < 1e-14);
    }

    #[test]
    fn oxidation_only_mirrors_reduction_only() {
        let species = couple(1e-2, 1e-5);
        let ro = ButlerVolmer::new(Kinetics::ReductionOnly, &species, 0.1);
        let or = ButlerVolmer::new(Kinetics::OxidationOnly, &species, 0.1);
        // alpha = 0.5 makes the two regimes exact mirrors under eps -> -eps.
        let a = ro.surface(0.25, 0.75, 0.9);
        let b = or.surface(0.75, 0.25, -0.9);
        assert!((a.cr - b.co).abs() < 1e-14);
        assert!((a.co - b.cr).abs() < 1e-14);
    }

    #[test]
    fn flux_balance_holds_for_every_regime() {
        let species = couple(5e-3, 2e-5);
        for kinetics in [
            Kinetics::QuasiReversible,
            Kinetics::ReductionOnly,
            Kinetics::OxidationOnly,
        ] {
            let bv = ButlerVolmer::new(kinetics, &species, 0.08);
            let (co1, cr1) = (0.4, 0.55);
            let s = bv.surface(co1, cr1, -0.7);
            let balance = (cr1 - s.cr) + species.dor * (co1 - s.co);
            assert!(balance.abs() < 1e-14, "{kinetics}: {balance}");
        }
    }

    #[test]
    fn reversible_limit_reaches_nernst_ratio() {
        let species = couple(1e10, 1e-5);
        let bv = ButlerVolmer::new(Kinetics::QuasiReversible, &species, 0.1);
        for eps in [-3.0, -0.5, 0.0, 0.8, 2.5] {
            let s = bv.surface(0.5, 0.5, eps);
            let ratio = s.co / s.cr;
            assert!(
                (ratio / f64::exp(eps) - 1.0).abs() < 1e-6,
                "eps = {eps}: ratio {ratio}"
            );
        }
    }

    #[test]
    fn irreversible_regimes_agree_with_nernst_far_from_e0() {
        let species = couple(1e10, 1e-5);
        let qr = ButlerVolmer::new(Kinetics::QuasiReversible, &species, 0.1);
        let ro = ButlerVolmer::new(Kinetics::ReductionOnly, &species, 0.1);
        let or = ButlerVolmer::new(Kinetics::OxidationOnly, &species, 0.1);

        let oxidizing = 12.0;
        let a = qr.surface(0.0, 1.0, oxidizing);
        let b = ro.surface(0.0, 1.0, oxidizing);
        assert!((a.cr - b.cr).abs() < 1e-4);
        assert!((a.co - b.co).abs() < 1e-4);

        let reducing = -12.0;
        let a = qr.surface(1.0, 0.0, reducing);
        let b = or.surface(1.0, 0.0, reducing);
        assert!((a.cr - b.cr).abs() < 1e-4);
        assert!((a.co - b.co).abs() < 1e-4);
    }

    #[test]
    fn extreme_overpotentials_reach_diffusion_limit() {
        let species = couple(1e-3, 2e-5);
        let dor = species.dor;
        let (co1, cr1) = (0.4, 0.3);
        for kinetics in [
            Kinetics::QuasiReversible,
            Kinetics::ReductionOnly,
            Kinetics::OxidationOnly,
        ] {
            let bv = ButlerVolmer::new(kinetics, &species, 0.05);
            for eps in [-2000.0, -800.0, 800.0, 2000.0] {
                let row = bv.robin_row(eps, co1, cr1);
                assert!(row.g0.is_finite() && row.b0.is_finite(), "{kinetics} at {eps}");
                let s = bv.surface(co1, cr1, eps);
                assert!(s.co.is_finite() && s.cr.is_finite(), "{kinetics} at {eps}");
            }
        }

        let qr = ButlerVolmer::new(Kinetics::QuasiReversible, &species, 0.05);
        let reducing = qr.surface(co1, cr1, -2000.0);
        assert!(reducing.co.abs() < 1e-12);
        assert!((reducing.cr - (cr1 + dor * co1)).abs() < 1e-12);
        let oxidizing = qr.surface(co1, cr1, 2000.0);
        assert!(oxidizing.cr.abs() < 1e-12);
        assert!((oxidizing.co - (co1 + cr1 / dor)).abs() < 1e-12);

        let ro = ButlerVolmer::new(Kinetics::ReductionOnly, &species, 0.05);
        assert_eq!(ro.robin_row(2000.0, co1, cr1).g0, 0.0);
        assert_eq!(ro.robin_row(-2000.0, co1, cr1).g0, 1.0);
        let or = ButlerVolmer::new(Kinetics::OxidationOnly, &species, 0.05);
        assert_eq!(or.robin_row(-2000.0, co1, cr1).g0, 0.0);
        assert_eq!(or.robin_row(2000.0, co1, cr1).g0, 1.0);
    }

    #[test]
    fn oxidation_only_scales_rate_and_flux_by_diffusivity_ratio() {
        let species = couple(1e-2, 5e-6);
        assert!((species.dor - 0.5).abs() < 1e-15);
        // Unit dX·K0 so the expected values below depend on eps and DOR only.
        let bv = ButlerVolmer::new(Kinetics::OxidationOnly, &species, 1.0 / species.k0_norm);
        let (co1, cr1, eps) = (0.9, 0.1, -2.0);

        let g0 = 1.0 / (1.0 + (0.5 * 2.0f64).exp() / 0.5);
        let row = bv.robin_row(eps, co1, cr1);
        assert_eq!(row.leading, Leading::Oxidized);
        assert!((row.g0 - g0).abs() < 1e-12);
        assert!((row.g0 - 0.155_362_403_497).abs() < 1e-9);

        let s = bv.surface(co1, cr1, eps);
        assert!((s.co - 0.139_826_163_147).abs() < 1e-9, "co = {}", s.co);
        assert!((s.cr - 0.480_086_918_426).abs() < 1e-9, "cr = {}", s.cr);
        assert!(((cr1 - s.cr) + species.dor * (co1 - s.co)).abs() < 1e-14);
    }

    #[test]
    fn selectors_round_trip_through_display() {
        for label in ["QR", "RO", "OR"] {
            let kinetics: Kinetics = label.parse().expect("known selector");
            assert_eq!(kinetics.to_string(), label);
        }
        let err = "BV".parse::<Kinetics>().expect_err("unknown selector");
        assert!(err.is_configuration());
    }
}
