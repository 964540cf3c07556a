use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::compute::ib::DEFAULT_SEAWATER_DENSITY;
use crate::domain::ports::ConfigProvider;
use crate::reanalysis::Reanalysis;
use crate::utils::error::{IbError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, validate_year_span,
    Validate,
};

/// Run configuration loaded from a TOML file, the batch-friendly
/// alternative to command-line flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub run: RunSection,
    pub data: DataSection,
    pub reanalysis: Option<ReanalysisSection>,
    pub correction: Option<CorrectionSection>,
    pub monitoring: Option<MonitoringSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSection {
    pub granule: String,
    pub verbose: Option<bool>,
    pub clobber: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSection {
    pub directory: String,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReanalysisSection {
    pub product: Option<String>,
    /// First and last year of the long-term mean pressure field.
    pub mean: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionSection {
    /// Seawater density in kg/m³.
    pub density: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringSection {
    pub enabled: bool,
}

impl RunConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(IbError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| IbError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` placeholders with environment values,
    /// leaving unset variables in place.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("run.granule", &self.run.granule)?;
        validate_path("data.directory", &self.data.directory)?;

        if let Some(endpoint) = &self.data.endpoint {
            validate_url("data.endpoint", endpoint)?;
        }
        if let Some(section) = &self.reanalysis {
            if let Some(product) = &section.product {
                product.parse::<Reanalysis>()?;
            }
            if let Some(mean) = &section.mean {
                validate_year_span("reanalysis.mean", mean)?;
            }
        }
        if let Some(section) = &self.correction {
            if let Some(density) = section.density {
                validate_range("correction.density", density, 900.0, 1100.0)?;
            }
        }

        Ok(())
    }

    pub fn verbose(&self) -> bool {
        self.run.verbose.unwrap_or(false)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for RunConfig {
    fn granule(&self) -> &str {
        &self.run.granule
    }

    fn data_directory(&self) -> &str {
        &self.data.directory
    }

    fn reanalysis(&self) -> Reanalysis {
        self.reanalysis
            .as_ref()
            .and_then(|s| s.product.as_deref())
            .and_then(|p| p.parse().ok())
            .unwrap_or_default()
    }

    fn density(&self) -> f64 {
        self.correction
            .as_ref()
            .and_then(|s| s.density)
            .unwrap_or(DEFAULT_SEAWATER_DENSITY)
    }

    fn mean_range(&self) -> Option<(i32, i32)> {
        match self.reanalysis.as_ref()?.mean.as_deref() {
            Some([first, last]) => Some((*first, *last)),
            _ => None,
        }
    }

    fn endpoint(&self) -> Option<&str> {
        self.data.endpoint.as_deref()
    }

    fn clobber(&self) -> bool {
        self.run.clobber.unwrap_or(false)
    }
}

impl Validate for RunConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
