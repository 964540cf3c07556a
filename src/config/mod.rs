pub mod toml_config;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::compute::ib::DEFAULT_SEAWATER_DENSITY;
use crate::domain::ports::ConfigProvider;
use crate::reanalysis::Reanalysis;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, validate_year_span,
    Validate,
};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "atl06-ib")]
#[command(about = "Interpolate inverse-barometer corrections onto ATL06 land-ice segments")]
pub struct CliConfig {
    /// Input ATL06 granule, relative to the data directory unless absolute
    pub granule: String,

    /// Directory holding reanalysis fields and receiving the output granule
    #[arg(short = 'D', long, default_value = ".")]
    pub directory: String,

    /// Reanalysis product: era5, era-interim or merra2
    #[arg(short = 'R', long, default_value = "era5")]
    pub reanalysis: Reanalysis,

    /// First and last year of the long-term mean pressure field
    #[arg(long, value_delimiter = ',', num_args = 1, value_name = "FIRST,LAST")]
    pub mean: Vec<i32>,

    /// Seawater density in kg/m³
    #[arg(short = 'd', long, default_value_t = DEFAULT_SEAWATER_DENSITY)]
    pub density: f64,

    /// Base URL for fetching missing reanalysis files
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Overwrite an existing output granule
    #[arg(short = 'C', long)]
    pub clobber: bool,

    #[arg(short = 'V', long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log system resource usage between phases")]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn granule(&self) -> &str {
        &self.granule
    }

    fn data_directory(&self) -> &str {
        &self.directory
    }

    fn reanalysis(&self) -> Reanalysis {
        self.reanalysis
    }

    fn density(&self) -> f64 {
        self.density
    }

    fn mean_range(&self) -> Option<(i32, i32)> {
        match self.mean.as_slice() {
            [first, last] => Some((*first, *last)),
            _ => None,
        }
    }

    fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    fn clobber(&self) -> bool {
        self.clobber
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("granule", &self.granule)?;
        validate_path("directory", &self.directory)?;
        validate_range("density", self.density, 900.0, 1100.0)?;
        validate_year_span("mean", &self.mean)?;
        if let Some(endpoint) = &self.endpoint {
            validate_url("endpoint", endpoint)?;
        }
        Ok(())
    }
}
