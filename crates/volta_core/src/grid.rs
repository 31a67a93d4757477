//! Dimensionless time/space discretization.
//!
//! Time is scaled by the run duration so that `dT = 1/nT`; distance is scaled
//! by the diffusion-layer thickness of the reference species. The space step
//! follows from the requested stability ratio `lamb = dT/dX²`, and the domain
//! extends `6·sqrt(nT·lamb)` in `X`, which is effectively infinite for
//! diffusion over the whole run.

use serde::Serialize;

use crate::constants::DOMAIN_WIDTH;
use crate::error::{Result, SimulationError};
use crate::waveform::Waveform;

#[derive(Debug, Clone, Serialize)]
pub struct TimeGrid {
    pub n_t: usize,
    /// Dimensionless time step, `1/nT`.
    pub d_t: f64,
    /// Final physical time (s).
    pub t_end: f64,
    /// Physical step lengths; `steps[k]` spans `t[k]..t[k+1]`.
    pub steps: Vec<f64>,
}

impl TimeGrid {
    pub fn new(waveform: &Waveform) -> Result<Self> {
        let t = waveform.times();
        let steps: Vec<f64> = t.windows(2).map(|w| w[1] - w[0]).collect();
        if let Some(idx) = steps.iter().position(|dt| !(*dt > 0.0)) {
            return Err(SimulationError::InvalidWaveform(format!(
                "time step {idx} is not positive ({})",
                steps[idx]
            )));
        }
        let n_t = t.len();
        Ok(Self {
            n_t,
            d_t: 1.0 / n_t as f64,
            t_end: waveform.t_end(),
            steps,
        })
    }

    /// Physical length of the step that leaves row `k`, if there is one.
    pub fn step_after(&self, k: usize) -> Option<f64> {
        self.steps.get(k).copied()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SpaceGrid {
    pub n_x: usize,
    pub d_x: f64,
    pub x_max: f64,
    /// Stability ratio `dT/dX²`.
    pub lambda: f64,
    /// Dimensionless node positions, `linspace(0, x_max, n_x)`.
    pub x: Vec<f64>,
}

impl SpaceGrid {
    pub fn build(n_t: usize, lambda: f64) -> Result<Self> {
        if n_t == 0 {
            return Err(SimulationError::GridTooCoarse { nx: 0 });
        }
        if !(lambda > 0.0) || !lambda.is_finite() {
            return Err(SimulationError::invalid(
                "stability_ratio",
                format!("must be positive and finite, got {lambda}"),
            ));
        }
        let d_t = 1.0 / n_t as f64;
        let x_max = DOMAIN_WIDTH * (n_t as f64 * lambda).sqrt();
        let d_x = (d_t / lambda).sqrt();
        let n_x = (x_max / d_x).floor() as usize;
        if n_x < 3 {
            return Err(SimulationError::GridTooCoarse { nx: n_x });
        }

        let spacing = x_max / (n_x - 1) as f64;
        let x = (0..n_x).map(|j| j as f64 * spacing).collect();

        log::debug!(
            "space grid: nX = {}, dX = {:.4e}, Xmax = {:.3}, lambda = {}",
            n_x,
            d_x,
            x_max,
            lambda
        );

        Ok(Self {
            n_x,
            d_x,
            x_max,
            lambda,
            x,
        })
    }
}
