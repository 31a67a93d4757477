//! Run orchestration: grid construction, species setup, the time loop and
//! current extraction.

use serde::{Deserialize, Serialize};

use crate::boundary::Kinetics;
use crate::constants::DEFAULT_LAMBDA;
use crate::error::{Result, SimulationError};
use crate::field::{ConcentrationFields, Field};
use crate::grid::{SpaceGrid, TimeGrid};
use crate::postprocess::{distance_axis, ConcentrationProfiles, CurrentExtractor};
use crate::species::{
    ElectroactiveParams, ElectroactiveSpecies, HomogeneousParams, HomogeneousSpecies, Mechanism,
    Species,
};
use crate::stepping::{DoubleLayerParams, Scheme, StepperSetup};
use crate::traits::DiffusionScheme;
use crate::waveform::Waveform;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub mechanism: Mechanism,
    pub kinetics: Kinetics,
    pub scheme: Scheme,
    /// Electrode area, cm².
    pub area: f64,
    /// Requested `dT/dX²`.
    pub stability_ratio: f64,
    /// Enables charging and ohmic drop; implicit scheme only.
    pub double_layer: Option<DoubleLayerParams>,
    /// Keep every row of every field for the result's profiles.
    pub keep_profiles: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            mechanism: Mechanism::E,
            kinetics: Kinetics::QuasiReversible,
            scheme: Scheme::Explicit,
            area: 1.0,
            stability_ratio: DEFAULT_LAMBDA,
            double_layer: None,
            keep_profiles: true,
        }
    }
}

/// Serializable description of a run, minus the waveform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub electroactive: ElectroactiveParams,
    pub homogeneous: Option<HomogeneousParams>,
    pub settings: SimulationSettings,
}

impl SimulationConfig {
    pub fn species(&self) -> Vec<Species> {
        let mut species = vec![Species::Electroactive(self.electroactive)];
        species.extend(self.homogeneous.map(Species::Homogeneous));
        species
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    /// Time, s.
    pub time: Vec<f64>,
    /// Applied potential, V.
    pub potential: Vec<f64>,
    /// Measured current, A. Positive for oxidation.
    pub current: Vec<f64>,
    /// Distance from the electrode, cm.
    pub x: Vec<f64>,
    /// Potential behind the solution resistance, when charging is modelled.
    pub electrode_potential: Option<Vec<f64>>,
    pub profiles: Option<ConcentrationProfiles>,
}

impl SimulationResult {
    /// Index and value of the current with the largest magnitude.
    pub fn peak(&self) -> Option<(usize, f64)> {
        self.current
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, i)| i.is_finite())
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
    }
}

pub struct Simulation {
    waveform: Waveform,
    time: TimeGrid,
    space: SpaceGrid,
    couple: ElectroactiveSpecies,
    homogeneous: Option<HomogeneousSpecies>,
    settings: SimulationSettings,
    eps: Vec<f64>,
}

fn split_species(
    species: &[Species],
) -> Result<(ElectroactiveParams, Option<HomogeneousParams>)> {
    let mut electroactive = None;
    let mut homogeneous = None;
    for entry in species {
        match *entry {
            Species::Electroactive(params) => {
                if electroactive.replace(params).is_some() {
                    return Err(SimulationError::UnsupportedCombination(
                        "only one electroactive couple is supported".into(),
                    ));
                }
            }
            Species::Homogeneous(params) => {
                if homogeneous.replace(params).is_some() {
                    return Err(SimulationError::UnsupportedCombination(
                        "only one homogeneous species is supported".into(),
                    ));
                }
            }
        }
    }
    let electroactive = electroactive.ok_or_else(|| {
        SimulationError::UnsupportedCombination("an electroactive species is required".into())
    })?;
    Ok((electroactive, homogeneous))
}

impl Simulation {
    pub fn new(
        waveform: Waveform,
        species: &[Species],
        settings: SimulationSettings,
    ) -> Result<Self> {
        if !(settings.area.is_finite() && settings.area > 0.0) {
            return Err(SimulationError::invalid(
                "area",
                format!("must be positive and finite, got {}", settings.area),
            ));
        }
        if let Some(params) = settings.double_layer {
            params.validate()?;
        }

        let (electroactive, homogeneous) = split_species(species)?;
        let time = TimeGrid::new(&waveform)?;
        let space = SpaceGrid::build(time.n_t, settings.stability_ratio)?;
        let couple = ElectroactiveSpecies::new(electroactive, time.t_end)?;

        let homogeneous = match (settings.mechanism.has_homogeneous_step(), homogeneous) {
            (true, Some(params)) => Some(HomogeneousSpecies::new(params, &couple)?),
            (true, None) => {
                return Err(SimulationError::UnsupportedCombination(format!(
                    "mechanism {} needs a homogeneous species",
                    settings.mechanism
                )))
            }
            (false, Some(_)) => {
                log::warn!(
                    "Ignoring homogeneous species: mechanism {} has no chemical step.",
                    settings.mechanism
                );
                None
            }
            (false, None) => None,
        };

        let eps = couple.overpotentials(waveform.potentials())?;

        let simulation = Self {
            waveform,
            time,
            space,
            couple,
            homogeneous,
            settings,
            eps,
        };
        // Surface unsupported scheme/mechanism combinations before any run.
        simulation.settings.scheme.build(&simulation.stepper_setup())?;

        log::debug!(
            "Grid: nT = {}, nX = {}, dX = {:.4e}, lambda = {}",
            simulation.time.n_t,
            simulation.space.n_x,
            simulation.space.d_x,
            simulation.space.lambda
        );
        Ok(simulation)
    }

    pub fn from_config(waveform: Waveform, config: &SimulationConfig) -> Result<Self> {
        Self::new(waveform, &config.species(), config.settings)
    }

    pub fn time_grid(&self) -> &TimeGrid {
        &self.time
    }

    pub fn space_grid(&self) -> &SpaceGrid {
        &self.space
    }

    pub fn couple(&self) -> &ElectroactiveSpecies {
        &self.couple
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    fn stepper_setup(&self) -> StepperSetup<'_> {
        StepperSetup {
            mechanism: self.settings.mechanism,
            kinetics: self.settings.kinetics,
            grid: &self.space,
            d_t: self.time.d_t,
            couple: &self.couple,
            homogeneous: self.homogeneous.as_ref(),
            double_layer: self.settings.double_layer,
            initial_potential: self.waveform.potentials()[0],
        }
    }

    fn initial_fields(&self) -> ConcentrationFields {
        let n_t = self.time.n_t;
        let n_x = self.space.n_x;
        let keep = self.settings.keep_profiles;
        let (co, cr) = self.couple.initial_concentrations();
        ConcentrationFields {
            reduced: Field::uniform("CR", n_t, n_x, cr, keep),
            oxidized: Field::uniform("CO", n_t, n_x, co, keep),
            product: self
                .homogeneous
                .as_ref()
                .map(|product| Field::uniform("CP", n_t, n_x, product.initial, keep)),
        }
    }

    pub fn run(&self) -> Result<SimulationResult> {
        let n_t = self.time.n_t;
        let mut stepper = self.settings.scheme.build(&self.stepper_setup())?;
        let mut fields = self.initial_fields();
        let extractor = CurrentExtractor::new(&self.couple, self.settings.area, self.space.d_x);
        let applied = self.waveform.potentials();
        let electron_transfer = self.settings.mechanism.has_electron_transfer();
        let charging = self.settings.double_layer.is_some();

        log::info!(
            "Running {} scheme: mechanism {}, kinetics {}, nT = {}, nX = {}",
            stepper.name(),
            self.settings.mechanism,
            self.settings.kinetics,
            n_t,
            self.space.n_x
        );

        let mut current = Vec::with_capacity(n_t);
        let mut electrode = charging.then(|| Vec::with_capacity(n_t));

        for k in 0..n_t {
            if k > 0 {
                let eps = if charging {
                    self.couple
                        .overpotential(stepper.electrode_potential(applied[k]))
                } else {
                    self.eps[k]
                };
                if !eps.is_finite() {
                    return Err(SimulationError::Divergence {
                        field: "V",
                        step: k,
                    });
                }
                stepper.advance(&mut fields, k, eps)?;
                if let Some(field) = fields.first_non_finite(k) {
                    return Err(SimulationError::Divergence { field, step: k });
                }
            }

            if let Some(trace) = electrode.as_mut() {
                trace.push(stepper.electrode_potential(applied[k]));
            }
            let faradaic = if electron_transfer {
                extractor.current(&fields, k)
            } else {
                0.0
            };
            let measured = stepper.measured_current(applied[k], faradaic, self.time.step_after(k));
            if !measured.is_finite() {
                return Err(SimulationError::Divergence {
                    field: "current",
                    step: k,
                });
            }
            current.push(measured);
        }

        let profiles =
            ConcentrationProfiles::denormalize(&fields, self.couple.reference_concentration());
        log::debug!("Run finished after {n_t} rows.");

        Ok(SimulationResult {
            time: self.waveform.times().to_vec(),
            potential: applied.to_vec(),
            current,
            x: distance_axis(&self.space.x, self.couple.delta),
            electrode_potential: electrode,
            profiles,
        })
    }
}
