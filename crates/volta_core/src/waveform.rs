//! Validated time/potential input supplied by the waveform generator.

use crate::error::{Result, SimulationError};

/// Applied potential `e[k]` (V) at time `t[k]` (s).
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    t: Vec<f64>,
    e: Vec<f64>,
}

impl Waveform {
    pub fn new(t: Vec<f64>, e: Vec<f64>) -> Result<Self> {
        if t.len() < 2 {
            return Err(SimulationError::InvalidWaveform(format!(
                "at least 2 time points are required, got {}.",
                t.len()
            )));
        }
        if t.len() != e.len() {
            return Err(SimulationError::InvalidWaveform(format!(
                "t and E must have the same length; got {} and {}.",
                t.len(),
                e.len()
            )));
        }
        if let Some(idx) = t.iter().position(|v| !v.is_finite()) {
            return Err(SimulationError::InvalidWaveform(format!(
                "t must contain only finite values (index {idx})."
            )));
        }
        if let Some(idx) = e.iter().position(|v| !v.is_finite()) {
            return Err(SimulationError::InvalidWaveform(format!(
                "E must contain only finite values (index {idx})."
            )));
        }
        if let Some(idx) = t.windows(2).position(|w| w[1] <= w[0]) {
            return Err(SimulationError::InvalidWaveform(format!(
                "t must be strictly increasing (t[{}] = {} >= t[{}] = {}).",
                idx,
                t[idx],
                idx + 1,
                t[idx + 1]
            )));
        }
        let t_end = t[t.len() - 1];
        if t_end <= 0.0 {
            return Err(SimulationError::InvalidWaveform(format!(
                "final time must be positive, got {t_end}."
            )));
        }
        Ok(Self { t, e })
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.t
    }

    pub fn potentials(&self) -> &[f64] {
        &self.e
    }

    pub fn t_end(&self) -> f64 {
        self.t[self.t.len() - 1]
    }
}
