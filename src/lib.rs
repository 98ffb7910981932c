pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::Cli;

pub use crate::config::ProbeConfig;
pub use crate::core::{
    check_health,
    context::{CancelReason, ExecutionContext},
    probe::HttpProbe,
    report::Report,
    runner::ProbeRunner,
};
pub use crate::utils::error::{ProbeError, Result};
