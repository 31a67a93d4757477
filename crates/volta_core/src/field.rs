//! Flat row-major concentration buffers indexed by `(time, space)`.
//!
//! A field either keeps its whole history (`nT × nX`, needed to report
//! concentration profiles) or only the two rows the steppers touch, in which
//! case row `k` lives in slot `k % 2`.

#[derive(Debug, Clone)]
pub struct Field {
    name: &'static str,
    n_x: usize,
    n_t: usize,
    history: bool,
    data: Vec<f64>,
}

impl Field {
    /// Creates a field whose every row starts as `initial`.
    pub fn new(name: &'static str, n_t: usize, initial: &[f64], history: bool) -> Self {
        let n_x = initial.len();
        let slots = if history { n_t } else { 2 };
        let mut data = Vec::with_capacity(slots * n_x);
        for _ in 0..slots {
            data.extend_from_slice(initial);
        }
        Self {
            name,
            n_x,
            n_t,
            history,
            data,
        }
    }

    /// Field filled with one uniform value.
    pub fn uniform(name: &'static str, n_t: usize, n_x: usize, value: f64, history: bool) -> Self {
        Self::new(name, n_t, &vec![value; n_x], history)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn n_x(&self) -> usize {
        self.n_x
    }

    pub fn n_t(&self) -> usize {
        self.n_t
    }

    pub fn keeps_history(&self) -> bool {
        self.history
    }

    fn slot(&self, k: usize) -> usize {
        debug_assert!(k < self.n_t, "row {k} out of range for {}", self.name);
        if self.history {
            k
        } else {
            k % 2
        }
    }

    pub fn row(&self, k: usize) -> &[f64] {
        let start = self.slot(k) * self.n_x;
        &self.data[start..start + self.n_x]
    }

    pub fn row_mut(&mut self, k: usize) -> &mut [f64] {
        let start = self.slot(k) * self.n_x;
        &mut self.data[start..start + self.n_x]
    }

    /// Row `k - 1` for reading alongside row `k` for writing.
    pub fn rows_mut(&mut self, k: usize) -> (&[f64], &mut [f64]) {
        debug_assert!(k >= 1);
        let n_x = self.n_x;
        let prev = self.slot(k - 1);
        let cur = self.slot(k);
        if prev < cur {
            let (head, tail) = self.data.split_at_mut(cur * n_x);
            (&head[prev * n_x..(prev + 1) * n_x], &mut tail[..n_x])
        } else {
            let (head, tail) = self.data.split_at_mut(prev * n_x);
            (&tail[..n_x], &mut head[cur * n_x..(cur + 1) * n_x])
        }
    }

    pub fn row_is_finite(&self, k: usize) -> bool {
        self.row(k).iter().all(|v| v.is_finite())
    }

    /// Whole history scaled by `factor`, row-major. `None` for rolling fields.
    pub fn scaled_history(&self, factor: f64) -> Option<Vec<f64>> {
        if !self.history {
            return None;
        }
        Some(self.data.iter().map(|v| v * factor).collect())
    }
}

/// The concentration fields of one run.
#[derive(Debug, Clone)]
pub struct ConcentrationFields {
    /// `CR`, reduced form of the electroactive couple.
    pub reduced: Field,
    /// `CO`, oxidized form of the electroactive couple.
    pub oxidized: Field,
    /// `CP`, product of the homogeneous step, when there is one.
    pub product: Option<Field>,
}

impl ConcentrationFields {
    /// Name of the first field with a non-finite entry in row `k`.
    pub fn first_non_finite(&self, k: usize) -> Option<&'static str> {
        std::iter::once(&self.reduced)
            .chain(std::iter::once(&self.oxidized))
            .chain(self.product.iter())
            .find(|field| !field.row_is_finite(k))
            .map(Field::name)
    }
}
