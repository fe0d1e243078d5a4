//! CLI command implementations.

mod config;
mod doctor;
mod run;
mod tools;

pub use config::run_config;
pub use doctor::run_doctor;
pub use run::run_assistant;
pub use tools::{run_call, run_tools};
