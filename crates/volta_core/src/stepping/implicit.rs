//! Backward-Euler stepping solved with the Thomas algorithm, with an
//! optional double-layer charging / ohmic-drop coupling.
//!
//! Each species has a constant operator `[-lambda_s, 1 + 2·lambda_s,
//! -lambda_s]`. Per step, row 0 is overwritten with the Butler–Volmer
//! surface relation `C0 - g0·C1 = b0` and the last row pins the bulk value.
//! The leading species of the kinetic regime is solved first; its partner
//! then gets the flux-balance row `C0 - C1 = b0` built from the fresh
//! leading profile.

use serde::{Deserialize, Serialize};

use crate::boundary::{ButlerVolmer, Leading};
use crate::error::{Result, SimulationError};
use crate::field::{ConcentrationFields, Field};
use crate::stepping::tridiag::Tridiagonal;
use crate::traits::DiffusionScheme;

/// Double-layer capacitance and uncompensated solution resistance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoubleLayerParams {
    /// Double-layer capacitance, F.
    pub cdl: f64,
    /// Solution resistance, Ω.
    pub ru: f64,
}

impl DoubleLayerParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.cdl.is_finite() && self.cdl > 0.0) {
            return Err(SimulationError::invalid(
                "cdl",
                format!("must be positive when charging is enabled, got {}", self.cdl),
            ));
        }
        if !(self.ru.is_finite() && self.ru > 0.0) {
            return Err(SimulationError::invalid(
                "ru",
                format!("must be positive when charging is enabled, got {}", self.ru),
            ));
        }
        Ok(())
    }
}

/// Electrode potential `V` behind the solution resistance.
#[derive(Debug, Clone)]
pub struct DoubleLayer {
    cdl: f64,
    ru: f64,
    potential: f64,
}

impl DoubleLayer {
    /// Starts at rest: `V[0] = E[0]`, no current flowing.
    pub fn new(params: DoubleLayerParams, applied: f64) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            cdl: params.cdl,
            ru: params.ru,
            potential: applied,
        })
    }

    pub fn potential(&self) -> f64 {
        self.potential
    }

    /// Returns the measured current `(E - V)/Ru` at the present row and, if
    /// `dt` is given, moves `V` to the next row with
    /// `V' = (V + (dt/Cdl)·(E/Ru - iF)) / (1 + dt/(Cdl·Ru))`.
    pub fn couple(&mut self, applied: f64, faradaic: f64, dt: Option<f64>) -> f64 {
        let current = (applied - self.potential) / self.ru;
        if let Some(dt) = dt {
            let gain = dt / self.cdl;
            self.potential =
                (self.potential + gain * (applied / self.ru - faradaic)) / (1.0 + gain / self.ru);
        }
        current
    }
}

pub struct ImplicitScheme {
    surface: ButlerVolmer,
    reduced_op: Tridiagonal,
    oxidized_op: Tridiagonal,
    rhs: Vec<f64>,
    double_layer: Option<DoubleLayer>,
}

fn pin_outer_row(op: &mut Tridiagonal) {
    let last = op.len() - 1;
    op.lower[last] = 0.0;
    op.diag[last] = 1.0;
    op.upper[last] = 0.0;
}

/// Solves row `k` of `field` with surface relation `C0 - g0·C1 = b0`.
fn solve_row(
    op: &mut Tridiagonal,
    rhs: &mut [f64],
    field: &mut Field,
    k: usize,
    g0: f64,
    b0: f64,
) -> Result<()> {
    let (prev, cur) = field.rows_mut(k);
    rhs.copy_from_slice(prev);
    rhs[0] = b0;
    op.diag[0] = 1.0;
    op.upper[0] = -g0;
    op.solve(rhs, cur)
}

impl ImplicitScheme {
    pub fn new(
        n_x: usize,
        lambda: f64,
        surface: ButlerVolmer,
        double_layer: Option<DoubleLayer>,
    ) -> Self {
        let mut reduced_op = Tridiagonal::implicit_diffusion(n_x, lambda);
        let mut oxidized_op = Tridiagonal::implicit_diffusion(n_x, lambda * surface.dor());
        pin_outer_row(&mut reduced_op);
        pin_outer_row(&mut oxidized_op);
        Self {
            surface,
            reduced_op,
            oxidized_op,
            rhs: vec![0.0; n_x],
            double_layer,
        }
    }
}

impl DiffusionScheme for ImplicitScheme {
    fn name(&self) -> &'static str {
        "implicit"
    }

    fn advance(&mut self, fields: &mut ConcentrationFields, k: usize, eps: f64) -> Result<()> {
        let co1 = fields.oxidized.row(k - 1)[1];
        let cr1 = fields.reduced.row(k - 1)[1];
        let row = self.surface.robin_row(eps, co1, cr1);
        let dor = self.surface.dor();

        match row.leading {
            Leading::Reduced => {
                solve_row(
                    &mut self.reduced_op,
                    &mut self.rhs,
                    &mut fields.reduced,
                    k,
                    row.g0,
                    row.b0,
                )?;
                let cr = fields.reduced.row(k);
                let b0 = (cr[1] - cr[0]) / dor;
                solve_row(
                    &mut self.oxidized_op,
                    &mut self.rhs,
                    &mut fields.oxidized,
                    k,
                    1.0,
                    b0,
                )
            }
            Leading::Oxidized => {
                solve_row(
                    &mut self.oxidized_op,
                    &mut self.rhs,
                    &mut fields.oxidized,
                    k,
                    row.g0,
                    row.b0,
                )?;
                let co = fields.oxidized.row(k);
                let b0 = dor * (co[1] - co[0]);
                solve_row(
                    &mut self.reduced_op,
                    &mut self.rhs,
                    &mut fields.reduced,
                    k,
                    1.0,
                    b0,
                )
            }
        }
    }

    fn electrode_potential(&self, applied: f64) -> f64 {
        self.double_layer
            .as_ref()
            .map_or(applied, DoubleLayer::potential)
    }

    fn measured_current(&mut self, applied: f64, faradaic: f64, dt: Option<f64>) -> f64 {
        match self.double_layer.as_mut() {
            Some(layer) => layer.couple(applied, faradaic, dt),
            None => faradaic,
        }
    }
}
