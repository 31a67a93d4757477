use crate::traits::{DynamicalSystem, Scalar, Steppable};

/// Classic fourth-order Runge–Kutta with preallocated stage buffers.
pub struct RK4<T: Scalar> {
    k1: Vec<T>,
    k2: Vec<T>,
    k3: Vec<T>,
    k4: Vec<T>,
    tmp: Vec<T>,
}

impl<T: Scalar> RK4<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            k1: vec![T::zero(); dim],
            k2: vec![T::zero(); dim],
            k3: vec![T::zero(); dim],
            k4: vec![T::zero(); dim],
            tmp: vec![T::zero(); dim],
        }
    }

    pub fn dimension(&self) -> usize {
        self.tmp.len()
    }
}

/// `out = y + h·k`
fn offset<T: Scalar>(out: &mut [T], y: &[T], k: &[T], h: T) {
    for ((o, &y), &k) in out.iter_mut().zip(y).zip(k) {
        *o = y + h * k;
    }
}

impl<T: Scalar> Steppable<T> for RK4<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        debug_assert_eq!(state.len(), self.tmp.len());
        let two = T::one() + T::one();
        let half_dt = dt / two;
        let sixth_dt = dt / (two * (two + T::one()));
        let t0 = *t;

        system.apply(t0, state, &mut self.k1);

        offset(&mut self.tmp, state, &self.k1, half_dt);
        system.apply(t0 + half_dt, &self.tmp, &mut self.k2);

        offset(&mut self.tmp, state, &self.k2, half_dt);
        system.apply(t0 + half_dt, &self.tmp, &mut self.k3);

        offset(&mut self.tmp, state, &self.k3, dt);
        system.apply(t0 + dt, &self.tmp, &mut self.k4);

        for i in 0..state.len() {
            state[i] = state[i]
                + sixth_dt * (self.k1[i] + two * self.k2[i] + two * self.k3[i] + self.k4[i]);
        }

        *t = t0 + dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Decay {
        rate: f64,
    }

    impl DynamicalSystem<f64> for Decay {
        fn dimension(&self) -> usize {
            1
        }

        fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
            out[0] = -self.rate * x[0];
        }
    }

    struct Oscillator;

    impl DynamicalSystem<f32> for Oscillator {
        fn dimension(&self) -> usize {
            2
        }

        fn apply(&self, _t: f32, x: &[f32], out: &mut [f32]) {
            out[0] = x[1];
            out[1] = -x[0];
        }
    }

    #[test]
    fn rk4_tracks_exponential_decay() {
        let system = Decay { rate: 2.0 };
        let mut solver = RK4::new(system.dimension());
        let mut state = vec![1.0];
        let mut t = 0.0;
        for _ in 0..100 {
            solver.step(&system, &mut t, &mut state, 0.01);
        }
        assert!((t - 1.0f64).abs() < 1e-12);
        assert!((state[0] - (-2.0f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn rk4_is_fourth_order() {
        let system = Decay { rate: 1.0 };
        let error = |steps: usize| {
            let mut solver = RK4::new(1);
            let mut state = vec![1.0];
            let mut t = 0.0;
            let dt = 1.0 / steps as f64;
            for _ in 0..steps {
                solver.step(&system, &mut t, &mut state, dt);
            }
            (state[0] - (-1.0f64).exp()).abs()
        };
        let ratio = error(10) / error(20);
        assert!(ratio > 14.0 && ratio < 18.0, "ratio = {ratio}");
    }

    #[test]
    fn rk4_works_in_single_precision() {
        let mut solver = RK4::<f32>::new(2);
        let mut state = vec![1.0f32, 0.0];
        let mut t = 0.0f32;
        for _ in 0..628 {
            solver.step(&Oscillator, &mut t, &mut state, 0.01);
        }
        assert!((state[0] - 1.0).abs() < 1e-3);
        assert!(state[1].abs() < 1e-2);
    }
}
