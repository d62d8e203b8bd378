pub mod engine;
pub mod state;


pub use engine::{EngineSettings, ReconciliationEngine};
pub use state::{CycleOutcome, CycleReport, Phase, ReconcilerState};

use crate::config::Config;

/// Wire the configured source tracker and trigger into an engine.
pub fn build_engine(config: &Config) -> ReconciliationEngine {
    ReconciliationEngine::new(
        crate::source::create_source_tracker(config),
        crate::execution::create_execution_trigger(config),
        EngineSettings::from_config(config),
    )
}
