use serde::{Deserialize, Serialize};

/// Simulated run length the bundled traces were produced with.
pub const DEFAULT_SIMULATION_TIME_SECONDS: f64 = 20.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Duration every run in the batch was simulated for; rates are averaged over it.
    pub simulation_time_seconds: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            simulation_time_seconds: DEFAULT_SIMULATION_TIME_SECONDS,
        }
    }
}

impl AnalysisConfig {
    /// Rates divide by the simulation time, so it has to be a positive finite number.
    pub fn has_valid_time(&self) -> bool {
        self.simulation_time_seconds.is_finite() && self.simulation_time_seconds > 0.0
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct AnalysisConfigOverride {
    pub simulation_time_seconds: Option<f64>,
}

impl AnalysisConfigOverride {
    pub fn apply_to(&self, config: &mut AnalysisConfig) {
        if let Some(v) = self.simulation_time_seconds {
            config.simulation_time_seconds = v;
        }
    }
}
