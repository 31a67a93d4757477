pub mod boundary;
pub mod constants;
pub mod error;
pub mod field;
pub mod grid;
pub mod postprocess;
pub mod simulation;
pub mod solvers;
pub mod species;
pub mod stepping;
/// The `volta_core` crate is the numerical engine of the Volta voltammetry
/// simulator: 1-D diffusion of an electroactive couple towards a planar
/// electrode, optionally followed by a first-order chemical step.
///
/// Key components:
/// - **Traits**: `Scalar`, `DynamicalSystem`, `Steppable` (method-of-lines integration) and `DiffusionScheme` (one time step of the concentration fields).
/// - **Boundary**: closed-form Butler–Volmer surface concentrations for the QR, RO and OR regimes.
/// - **Stepping**: explicit FTCS and implicit Thomas schemes, RK4 for the homogeneous reaction, double-layer charging.
/// - **Simulation**: grid construction, the time loop and current extraction.
pub mod traits;
pub mod waveform;
