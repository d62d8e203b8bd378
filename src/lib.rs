#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod app;
pub mod cli;
pub mod config;
#[doc(hidden)]
pub mod diagnostics;
pub mod error;
pub mod execution;
#[doc(hidden)]
pub mod platform;
pub mod reconciler;
pub(crate) mod runtime;
pub mod source;

pub use cli::commands::{Cli, Commands};
pub use config::Config;
pub use error::{ErrorKind, GitopsError, Result};
pub use reconciler::{CycleOutcome, CycleReport, ReconciliationEngine};
