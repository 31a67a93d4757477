//! Forward-time centred-space stepping.

use crate::boundary::{ButlerVolmer, Surface};
use crate::constants::EXPLICIT_LAMBDA_LIMIT;
use crate::error::{Result, SimulationError};
use crate::field::ConcentrationFields;
use crate::stepping::reaction::ReactionStepper;
use crate::traits::DiffusionScheme;

/// One FTCS update of the interior of `cur` from `prev`; the outer node
/// keeps its bulk value and the surface node is left to the caller.
pub fn ftcs(prev: &[f64], cur: &mut [f64], lambda: f64) {
    let n = prev.len();
    for j in 1..n - 1 {
        cur[j] = prev[j] + lambda * (prev[j + 1] - 2.0 * prev[j] + prev[j - 1]);
    }
    cur[n - 1] = prev[n - 1];
}

fn check_stability(species: &'static str, lambda: f64) -> Result<()> {
    if lambda < EXPLICIT_LAMBDA_LIMIT {
        Ok(())
    } else {
        Err(SimulationError::UnstableGrid {
            species,
            lambda,
            limit: EXPLICIT_LAMBDA_LIMIT,
        })
    }
}

pub struct ExplicitScheme {
    lambda_r: f64,
    lambda_o: f64,
    /// `None` switches electron transfer off (zero-flux surface).
    surface: Option<ButlerVolmer>,
    /// Present when O decays into P in solution.
    reaction: Option<ReactionStepper>,
}

impl ExplicitScheme {
    /// `lambda` is `dT/dX²` for the reference species R and `dor` is
    /// `DO/DR`. Construction fails for any ratio FTCS cannot integrate.
    pub fn new(
        lambda: f64,
        dor: f64,
        surface: Option<ButlerVolmer>,
        reaction: Option<ReactionStepper>,
    ) -> Result<Self> {
        check_stability("R", lambda)?;
        let lambda_o = lambda * dor;
        if reaction.is_none() {
            check_stability("O", lambda_o)?;
        }
        Ok(Self {
            lambda_r: lambda,
            lambda_o,
            surface,
            reaction,
        })
    }
}

impl DiffusionScheme for ExplicitScheme {
    fn name(&self) -> &'static str {
        "explicit"
    }

    fn advance(&mut self, fields: &mut ConcentrationFields, k: usize, eps: f64) -> Result<()> {
        let ConcentrationFields {
            reduced,
            oxidized,
            product,
        } = fields;

        let co1 = oxidized.row(k - 1)[1];
        let cr1 = reduced.row(k - 1)[1];
        let surface = match &self.surface {
            Some(bv) => bv.surface(co1, cr1, eps),
            None => Surface { co: co1, cr: cr1 },
        };

        {
            let (prev, cur) = reduced.rows_mut(k);
            ftcs(prev, cur, self.lambda_r);
            cur[0] = surface.cr;
        }

        match self.reaction.as_mut() {
            None => {
                let (prev, cur) = oxidized.rows_mut(k);
                ftcs(prev, cur, self.lambda_o);
                cur[0] = surface.co;
            }
            Some(stepper) => {
                let product = product.as_mut().ok_or_else(|| {
                    SimulationError::UnsupportedCombination(
                        "homogeneous step requires a product field".into(),
                    )
                })?;
                stepper.advance(oxidized, product, k)?;
                oxidized.row_mut(k)[0] = surface.co;
                // P is not electroactive: zero flux at the surface.
                let carried = product.row(k - 1)[1];
                product.row_mut(k)[0] = carried;
            }
        }
        Ok(())
    }
}
