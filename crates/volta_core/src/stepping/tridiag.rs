//! Thomas algorithm for tridiagonal systems.

use crate::error::{Result, SimulationError};

/// Tridiagonal matrix stored by diagonals.
///
/// `lower[0]` and `upper[n - 1]` are unused.
#[derive(Debug, Clone)]
pub struct Tridiagonal {
    pub lower: Vec<f64>,
    pub diag: Vec<f64>,
    pub upper: Vec<f64>,
    c_prime: Vec<f64>,
    d_prime: Vec<f64>,
}

impl Tridiagonal {
    /// Constant-coefficient operator `[-lambda, 1 + 2·lambda, -lambda]`.
    pub fn implicit_diffusion(n: usize, lambda: f64) -> Self {
        Self::new(
            vec![-lambda; n],
            vec![1.0 + 2.0 * lambda; n],
            vec![-lambda; n],
        )
    }

    pub fn new(lower: Vec<f64>, diag: Vec<f64>, upper: Vec<f64>) -> Self {
        let n = diag.len();
        debug_assert_eq!(lower.len(), n);
        debug_assert_eq!(upper.len(), n);
        Self {
            lower,
            diag,
            upper,
            c_prime: vec![0.0; n],
            d_prime: vec![0.0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.diag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }

    /// Solves `A·x = rhs` into `x` in O(n).
    pub fn solve(&mut self, rhs: &[f64], x: &mut [f64]) -> Result<()> {
        let n = self.diag.len();
        debug_assert_eq!(rhs.len(), n);
        debug_assert_eq!(x.len(), n);
        if n == 0 {
            return Ok(());
        }

        if self.diag[0] == 0.0 {
            return Err(SimulationError::SingularTridiagonal { row: 0 });
        }
        self.c_prime[0] = self.upper[0] / self.diag[0];
        self.d_prime[0] = rhs[0] / self.diag[0];

        for i in 1..n {
            let den = self.diag[i] - self.lower[i] * self.c_prime[i - 1];
            if den == 0.0 || !den.is_finite() {
                return Err(SimulationError::SingularTridiagonal { row: i });
            }
            self.c_prime[i] = if i < n - 1 { self.upper[i] / den } else { 0.0 };
            self.d_prime[i] = (rhs[i] - self.lower[i] * self.d_prime[i - 1]) / den;
        }

        x[n - 1] = self.d_prime[n - 1];
        for i in (0..n - 1).rev() {
            x[i] = self.d_prime[i] - self.c_prime[i] * x[i + 1];
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{DMatrix, DVector};

    fn dense(system: &Tridiagonal) -> DMatrix<f64> {
        let n = system.len();
        DMatrix::from_fn(n, n, |i, j| {
            if i == j {
                system.diag[i]
            } else if j + 1 == i {
                system.lower[i]
            } else if i + 1 == j {
                system.upper[i]
            } else {
                0.0
            }
        })
    }

    #[test]
    fn identity_returns_rhs() {
        let mut system = Tridiagonal::new(vec![0.0; 4], vec![1.0; 4], vec![0.0; 4]);
        let rhs = [1.0, 2.0, 3.0, 4.0];
        let mut x = [0.0; 4];
        system.solve(&rhs, &mut x).expect("solve");
        assert_eq!(x, rhs);
    }

    #[test]
    fn matches_dense_lu_for_diffusion_operator() {
        let mut system = Tridiagonal::implicit_diffusion(12, 0.45);
        // Robin surface row and fixed outer row, as the implicit scheme uses.
        system.diag[0] = 1.0;
        system.upper[0] = -0.7;
        system.lower[11] = 0.0;
        system.diag[11] = 1.0;

        let rhs: Vec<f64> = (0..12).map(|i| 0.1 * i as f64).collect();
        let mut x = vec![0.0; 12];
        system.solve(&rhs, &mut x).expect("solve");

        let expected = dense(&system)
            .lu()
            .solve(&DVector::from_column_slice(&rhs))
            .expect("dense solve");
        for i in 0..12 {
            assert!((x[i] - expected[i]).abs() < 1e-12, "x[{i}]");
        }
    }

    #[test]
    fn zero_pivot_is_reported() {
        let mut system = Tridiagonal::new(vec![0.0, 1.0], vec![1.0, 1.0], vec![1.0, 0.0]);
        let mut x = [0.0; 2];
        let err = system.solve(&[1.0, 1.0], &mut x).expect_err("singular");
        assert_eq!(err, SimulationError::SingularTridiagonal { row: 1 });
    }
}
