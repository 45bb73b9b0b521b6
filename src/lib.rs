#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use
)]

pub mod config;
pub mod error;
pub mod gateway;
pub mod generate;
pub mod report;

pub use config::Config;
pub use error::{ConfigError, EventDeskError, GenerateError};
