//! Cohort Pathways
//!
//! Builds directed, time-sliced transition graphs from longitudinal student
//! records, for Sankey-style views of what a graduating class does after
//! high school.
//!
//! This library provides functionality for:
//! - Reading student observation records (CSV export, mock data)
//! - Labeling records with a time bucket and a normalized enrollment state
//! - Collapsing concurrent states and filling gaps between observations
//! - Aggregating per-student transitions into weighted edges
//! - Exporting the graph as node-link JSON, DOT or a text table

pub mod cli;
pub mod config;
pub mod data_source;
pub mod error;
pub mod pathway;

pub use config::Config;
pub use error::{Error, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize logging with the given log level
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
