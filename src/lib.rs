pub mod adapters;
pub mod compute;
pub mod config;
pub mod core;
pub mod domain;
pub mod granule;
pub mod reanalysis;
pub mod utils;

pub use adapters::LocalStorage;
pub use config::CliConfig;
pub use core::{engine::IbEngine, pipeline::Atl06Pipeline};
pub use reanalysis::Reanalysis;
pub use utils::error::{IbError, Result};
