//! Dimensional current and denormalized profiles.

use serde::Serialize;

use crate::constants::FARADAY;
use crate::field::ConcentrationFields;
use crate::species::{BulkSpecies, ElectroactiveSpecies};

/// Turns the near-electrode gradient of the bulk species into a current.
#[derive(Debug, Clone, Copy)]
pub struct CurrentExtractor {
    bulk: BulkSpecies,
    /// `n·F·A·D·c_ref/(2·dX·delta)`, A.
    scale: f64,
}

impl CurrentExtractor {
    pub fn new(couple: &ElectroactiveSpecies, area: f64, d_x: f64) -> Self {
        let scale = couple.params.n as f64
            * FARADAY
            * area
            * couple.bulk_diffusion()
            * couple.reference_concentration()
            / (2.0 * d_x * couple.delta);
        Self {
            bulk: couple.bulk,
            scale,
        }
    }

    /// Second-order one-sided difference at the surface, signed so that
    /// oxidation is positive.
    pub fn gradient(&self, fields: &ConcentrationFields, k: usize) -> f64 {
        match self.bulk {
            BulkSpecies::Reduced => {
                let c = fields.reduced.row(k);
                -c[2] + 4.0 * c[1] - 3.0 * c[0]
            }
            BulkSpecies::Oxidized => {
                let c = fields.oxidized.row(k);
                c[2] - 4.0 * c[1] + 3.0 * c[0]
            }
        }
    }

    /// Faradaic current at row `k`, A.
    pub fn current(&self, fields: &ConcentrationFields, k: usize) -> f64 {
        self.scale * self.gradient(fields, k)
    }
}

/// Concentration histories in mol/cm³, row-major `n_t × n_x`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcentrationProfiles {
    pub n_t: usize,
    pub n_x: usize,
    pub c_o: Vec<f64>,
    pub c_r: Vec<f64>,
    pub c_p: Option<Vec<f64>>,
}

impl ConcentrationProfiles {
    /// Scales every kept field by `c_ref`. `None` when the run kept only
    /// rolling rows.
    pub fn denormalize(fields: &ConcentrationFields, c_ref: f64) -> Option<Self> {
        let reduced = &fields.reduced;
        let c_r = reduced.scaled_history(c_ref)?;
        let c_o = fields.oxidized.scaled_history(c_ref)?;
        let c_p = match &fields.product {
            Some(product) => Some(product.scaled_history(c_ref)?),
            None => None,
        };
        Some(Self {
            n_t: reduced.n_t(),
            n_x: reduced.n_x(),
            c_o,
            c_r,
            c_p,
        })
    }

    /// Profile of `c_o` at row `k`.
    pub fn oxidized_at(&self, k: usize) -> &[f64] {
        &self.c_o[k * self.n_x..(k + 1) * self.n_x]
    }

    /// Profile of `c_r` at row `k`.
    pub fn reduced_at(&self, k: usize) -> &[f64] {
        &self.c_r[k * self.n_x..(k + 1) * self.n_x]
    }

    /// Profile of `c_p` at row `k`, if the run had a product species.
    pub fn product_at(&self, k: usize) -> Option<&[f64]> {
        self.c_p
            .as_deref()
            .map(|c_p| &c_p[k * self.n_x..(k + 1) * self.n_x])
    }
}

/// Physical distance from the electrode, cm.
pub fn distance_axis(x: &[f64], delta: f64) -> Vec<f64> {
    x.iter().map(|&xi| xi * delta).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::species::ElectroactiveParams;

    fn fields_with(reduced: &[f64], oxidized: &[f64]) -> ConcentrationFields {
        ConcentrationFields {
            reduced: Field::new("CR", 1, reduced, true),
            oxidized: Field::new("CO", 1, oxidized, true),
            product: None,
        }
    }

    #[test]
    fn gradient_is_exact_for_quadratic_profiles() {
        let couple =
            ElectroactiveSpecies::new(ElectroactiveParams::default(), 1.0).expect("couple");
        let extractor = CurrentExtractor::new(&couple, 1.0, 0.5);
        // C = 1 + 2x + x² sampled at x = 0, 1, 2: dC/dx(0) = 2, so the
        // one-sided stencil gives 2·h·2 = 4 with h = 1.
        let fields = fields_with(&[1.0, 4.0, 9.0], &[0.0; 3]);
        assert!((extractor.gradient(&fields, 0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn current_sign_follows_bulk_species() {
        let reduced_bulk =
            ElectroactiveSpecies::new(ElectroactiveParams::default(), 1.0).expect("couple");
        let oxidation = fields_with(&[0.2, 0.6, 0.9], &[0.8, 0.4, 0.1]);
        let i = CurrentExtractor::new(&reduced_bulk, 1.0, 0.1).current(&oxidation, 0);
        assert!(i > 0.0);

        let params = ElectroactiveParams {
            c_ob: 1e-6,
            c_rb: 0.0,
            ..ElectroactiveParams::default()
        };
        let oxidized_bulk = ElectroactiveSpecies::new(params, 1.0).expect("couple");
        let reduction = fields_with(&[0.8, 0.4, 0.1], &[0.2, 0.6, 0.9]);
        let i = CurrentExtractor::new(&oxidized_bulk, 1.0, 0.1).current(&reduction, 0);
        assert!(i < 0.0);
    }

    #[test]
    fn current_scale_is_dimensional() {
        let couple =
            ElectroactiveSpecies::new(ElectroactiveParams::default(), 4.0).expect("couple");
        let d_x = 0.2;
        let extractor = CurrentExtractor::new(&couple, 2.0, d_x);
        let fields = fields_with(&[0.0, 0.5, 0.75], &[1.0, 0.5, 0.25]);
        let flux = -0.75 + 2.0;
        let expected = FARADAY * 2.0 * 1e-5 * 1e-6 * flux / (2.0 * d_x * couple.delta);
        assert!((extractor.current(&fields, 0) - expected).abs() < 1e-15);
    }

    #[test]
    fn profiles_are_scaled_by_reference_concentration() {
        let mut fields = fields_with(&[1.0, 0.5], &[0.0, 0.5]);
        fields.product = Some(Field::new("CP", 1, &[0.25, 0.0], true));
        let profiles = ConcentrationProfiles::denormalize(&fields, 2e-6).expect("history kept");
        assert_eq!(profiles.reduced_at(0), &[2e-6, 1e-6]);
        assert_eq!(profiles.oxidized_at(0), &[0.0, 1e-6]);
        assert_eq!(profiles.product_at(0), Some(&[5e-7, 0.0][..]));

        fields.reduced = Field::new("CR", 3, &[1.0, 0.5], false);
        assert!(ConcentrationProfiles::denormalize(&fields, 2e-6).is_none());
    }

    #[test]
    fn distance_axis_scales_by_layer_thickness() {
        assert_eq!(distance_axis(&[0.0, 1.0, 2.0], 0.01), vec![0.0, 0.01, 0.02]);
    }
}
