#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use
)]

pub mod config;
pub mod core;
pub mod error;
pub mod storage;

pub use config::Config;
pub use crate::core::{PolicyConfig, Retention, RetentionResult, Tier};
pub use error::{ConfigError, PruneError, RetentionError};
