//! Browser-facing wrapper around [`volta_core::simulation::Simulation`].

use anyhow::{Context, Result};
use js_sys::Float64Array;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use volta_core::simulation::{Simulation, SimulationConfig, SimulationResult};
use volta_core::waveform::Waveform;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmSimulation {
    simulation: Simulation,
    result: Option<SimulationResult>,
}

/// Largest-magnitude point of a voltammogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakSummary {
    pub index: usize,
    pub time: f64,
    pub potential: f64,
    pub current: f64,
}

pub(crate) fn build_simulation(
    time: Vec<f64>,
    potential: Vec<f64>,
    config: &SimulationConfig,
) -> Result<Simulation> {
    let waveform = Waveform::new(time, potential).context("Invalid waveform")?;
    Simulation::from_config(waveform, config).context("Failed to set up simulation")
}

pub(crate) fn peak_summary(result: &SimulationResult) -> Option<PeakSummary> {
    result.peak().map(|(index, current)| PeakSummary {
        index,
        time: result.time[index],
        potential: result.potential[index],
        current,
    })
}

fn to_js_error(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{err:#}"))
}

impl WasmSimulation {
    fn ensure_result(&mut self) -> Result<&SimulationResult, JsValue> {
        let result = match self.result.take() {
            Some(result) => result,
            None => self
                .simulation
                .run()
                .context("Simulation failed")
                .map_err(to_js_error)?,
        };
        Ok(&*self.result.insert(result))
    }
}

#[wasm_bindgen]
impl WasmSimulation {
    #[wasm_bindgen(constructor)]
    pub fn new(
        time: Vec<f64>,
        potential: Vec<f64>,
        config_val: JsValue,
    ) -> Result<WasmSimulation, JsValue> {
        console_error_panic_hook::set_once();

        let config: SimulationConfig = from_value(config_val)
            .map_err(|e| JsValue::from_str(&format!("Invalid simulation config: {}", e)))?;
        let simulation = build_simulation(time, potential, &config).map_err(to_js_error)?;
        Ok(WasmSimulation {
            simulation,
            result: None,
        })
    }

    /// Runs the simulation (once) and returns the serialized result.
    pub fn run(&mut self) -> Result<JsValue, JsValue> {
        let result = self.ensure_result()?;
        to_value(result).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn current(&mut self) -> Result<Float64Array, JsValue> {
        let result = self.ensure_result()?;
        Ok(Float64Array::from(result.current.as_slice()))
    }

    /// Distance from the electrode, cm.
    pub fn distance(&mut self) -> Result<Float64Array, JsValue> {
        let result = self.ensure_result()?;
        Ok(Float64Array::from(result.x.as_slice()))
    }

    pub fn peak(&mut self) -> Result<JsValue, JsValue> {
        let result = self.ensure_result()?;
        let summary = peak_summary(result);
        to_value(&summary).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::WasmSimulation;
    use serde_wasm_bindgen::to_value;
    use volta_core::simulation::SimulationConfig;
    use wasm_bindgen_test::wasm_bindgen_test;

    fn config_value() -> wasm_bindgen::JsValue {
        to_value(&SimulationConfig::default()).expect("config")
    }

    #[wasm_bindgen_test]
    fn runs_and_exposes_current() {
        let time: Vec<f64> = (0..40).map(|k| k as f64 * 0.05).collect();
        let potential: Vec<f64> = (0..40).map(|k| -0.3 + k as f64 * 0.015).collect();
        let mut simulation =
            WasmSimulation::new(time, potential, config_value()).expect("simulation");
        let current = simulation.current().expect("current");
        assert_eq!(current.length(), 40);
        assert!(simulation.run().is_ok());
        assert!(simulation.distance().expect("distance").length() > 3);
    }

    #[wasm_bindgen_test]
    fn rejects_mismatched_waveform() {
        let result = WasmSimulation::new(vec![0.0, 1.0, 2.0], vec![0.0, 0.1], config_value());
        let message = result
            .err()
            .and_then(|err| err.as_string())
            .unwrap_or_default();
        assert!(message.contains("Invalid waveform"));
    }
}
