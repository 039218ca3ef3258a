//! CLI command implementations.

mod coach;
mod config;
mod doctor;
mod roles;
mod serve;

pub use coach::{run_coach, CoachCommand};
pub use config::run_config;
pub use doctor::run_doctor;
pub use roles::run_roles;
pub use serve::run_serve;
