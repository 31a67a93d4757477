//! Homogeneous first-order step `O → P` coupled to diffusion.
//!
//! The interiors of `CO` and `CP` are advanced together as one
//! method-of-lines system
//!
//! ```text
//! dCO/dT = L_O·CO - Kc·CO
//! dCP/dT = L_P·CP + Kc·CO
//! ```
//!
//! with classical RK4. `L_s` is the sparse second-difference operator scaled
//! by `D_s/DR/dX²`; its boundary rows are empty, so surface and outer nodes
//! are held during the step and set by the caller.

use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::error::{Result, SimulationError};
use crate::field::Field;
use crate::solvers::RK4;
use crate::traits::{DynamicalSystem, Steppable};

/// Real-axis stability bound of classical RK4, `|h·λ| ≤ 2.785`, rounded down.
pub const RK4_STABILITY_LIMIT: f64 = 2.78;

/// Second-difference operator `scale·[1, -2, 1]` on interior rows.
pub fn discrete_laplacian(n: usize, scale: f64) -> CsrMatrix<f64> {
    let mut coo = CooMatrix::new(n, n);
    for j in 1..n.saturating_sub(1) {
        coo.push(j, j - 1, scale);
        coo.push(j, j, -2.0 * scale);
        coo.push(j, j + 1, scale);
    }
    CsrMatrix::from(&coo)
}

fn multiply(matrix: &CsrMatrix<f64>, x: &[f64], out: &mut [f64]) {
    for (row, y) in matrix.row_iter().zip(out.iter_mut()) {
        *y = row
            .col_indices()
            .iter()
            .zip(row.values())
            .map(|(&j, &v)| v * x[j])
            .sum();
    }
}

/// Right-hand side of the coupled O/P system; state is `[CO | CP]`.
pub struct ReactionDiffusion {
    n_x: usize,
    laplacian_o: CsrMatrix<f64>,
    laplacian_p: CsrMatrix<f64>,
    kc: f64,
}

impl ReactionDiffusion {
    pub fn new(n_x: usize, d_x: f64, ratio_o: f64, ratio_p: f64, kc: f64) -> Self {
        let inv_dx2 = 1.0 / (d_x * d_x);
        Self {
            n_x,
            laplacian_o: discrete_laplacian(n_x, ratio_o * inv_dx2),
            laplacian_p: discrete_laplacian(n_x, ratio_p * inv_dx2),
            kc,
        }
    }
}

impl DynamicalSystem<f64> for ReactionDiffusion {
    fn dimension(&self) -> usize {
        2 * self.n_x
    }

    fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
        let n = self.n_x;
        let (co, cp) = x.split_at(n);
        let (d_co, d_cp) = out.split_at_mut(n);
        multiply(&self.laplacian_o, co, d_co);
        multiply(&self.laplacian_p, cp, d_cp);
        for j in 1..n - 1 {
            let rate = self.kc * co[j];
            d_co[j] -= rate;
            d_cp[j] += rate;
        }
    }
}

pub struct ReactionStepper {
    system: ReactionDiffusion,
    solver: RK4<f64>,
    state: Vec<f64>,
    d_t: f64,
}

impl ReactionStepper {
    /// `lambda` is the base ratio `dT/dX²`; `ratio_o`, `ratio_p` are the
    /// diffusion coefficients of O and P relative to R.
    pub fn new(
        n_x: usize,
        d_t: f64,
        lambda: f64,
        ratio_o: f64,
        ratio_p: f64,
        kc: f64,
    ) -> Result<Self> {
        let d_x = (d_t / lambda).sqrt();
        let spectral_o = 4.0 * lambda * ratio_o + d_t * kc;
        if spectral_o >= RK4_STABILITY_LIMIT {
            return Err(SimulationError::UnstableReaction {
                species: "O",
                spectral: spectral_o,
                limit: RK4_STABILITY_LIMIT,
            });
        }
        let spectral_p = 4.0 * lambda * ratio_p;
        if spectral_p >= RK4_STABILITY_LIMIT {
            return Err(SimulationError::UnstableReaction {
                species: "P",
                spectral: spectral_p,
                limit: RK4_STABILITY_LIMIT,
            });
        }
        let system = ReactionDiffusion::new(n_x, d_x, ratio_o, ratio_p, kc);
        let dim = system.dimension();
        Ok(Self {
            system,
            solver: RK4::new(dim),
            state: vec![0.0; dim],
            d_t,
        })
    }

    /// Fills the interiors of row `k` of `oxidized` and `product` from row
    /// `k - 1`. Boundary nodes are copied from the previous row.
    pub fn advance(&mut self, oxidized: &mut Field, product: &mut Field, k: usize) -> Result<()> {
        let n = self.system.n_x;
        if oxidized.n_x() != n || product.n_x() != n {
            return Err(SimulationError::UnsupportedCombination(format!(
                "reaction stepper built for {n} nodes, fields have {} and {}",
                oxidized.n_x(),
                product.n_x()
            )));
        }

        self.state[..n].copy_from_slice(oxidized.row(k - 1));
        self.state[n..].copy_from_slice(product.row(k - 1));

        let mut t = (k - 1) as f64 * self.d_t;
        self.solver
            .step(&self.system, &mut t, &mut self.state, self.d_t);

        oxidized.row_mut(k).copy_from_slice(&self.state[..n]);
        product.row_mut(k).copy_from_slice(&self.state[n..]);
        Ok(())
    }
}
