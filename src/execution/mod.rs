pub mod ansible;
pub mod traits;
pub mod verify;

pub use ansible::AnsibleTrigger;
pub use traits::{ExecutionFuture, ExecutionTrigger};
pub use verify::ArtifactVerifier;

use crate::config::Config;

/// Factory: the trigger for the configured automation.
pub fn create_execution_trigger(config: &Config) -> Box<dyn ExecutionTrigger> {
    Box::new(AnsibleTrigger::new(config.execution.clone()))
}
