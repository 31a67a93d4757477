//! WASM bridge for the Volta simulation kernel.

mod simulation;

pub use simulation::WasmSimulation;
