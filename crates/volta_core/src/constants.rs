/// Faraday constant, C/mol.
pub const FARADAY: f64 = 96485.0;

/// Gas constant, J/(mol K).
pub const GAS_CONSTANT: f64 = 8.315;

/// Default cell temperature, K.
pub const DEFAULT_TEMPERATURE: f64 = 298.0;

/// Default stability ratio `lamb = dT/dX²`.
pub const DEFAULT_LAMBDA: f64 = 0.45;

/// Upper bound on `lamb` for forward-time centred-space stepping.
pub const EXPLICIT_LAMBDA_LIMIT: f64 = 0.5;

/// Width of the simulated domain, in units of `sqrt(nT·lamb)` diffusion
/// lengths; far enough that the outer node behaves as bulk solution.
pub const DOMAIN_WIDTH: f64 = 6.0;

/// `F/(R·T)` at the given temperature.
pub fn f_over_rt(temperature: f64) -> f64 {
    FARADAY / (GAS_CONSTANT * temperature)
}
