pub mod catalog;
pub mod field;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::IbError;

/// Supported atmospheric reanalysis products.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reanalysis {
    #[default]
    Era5,
    EraInterim,
    Merra2,
}

impl Reanalysis {
    /// Product label used in filenames and output attributes.
    pub fn label(&self) -> &'static str {
        match self {
            Reanalysis::Era5 => "ERA5",
            Reanalysis::EraInterim => "ERA-Interim",
            Reanalysis::Merra2 => "MERRA2",
        }
    }

    /// Name of the product's sea-level-pressure variable.
    pub fn variable(&self) -> &'static str {
        match self {
            Reanalysis::Era5 | Reanalysis::EraInterim => "msl",
            Reanalysis::Merra2 => "slp",
        }
    }

    /// Filename of one monthly pressure file.
    pub fn monthly_file(&self, year: i32, month: u32) -> String {
        format!(
            "{}_{}_{:04}_{:02}.json",
            self.label(),
            self.variable().to_uppercase(),
            year,
            month
        )
    }

    /// Filename of the long-term mean pressure file for a span of years.
    pub fn mean_file(&self, first: i32, last: i32) -> String {
        format!("{}_MEAN_{}-{}.json", self.label(), first, last)
    }
}

impl fmt::Display for Reanalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Reanalysis {
    type Err = IbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "era5" => Ok(Reanalysis::Era5),
            "era-interim" | "erainterim" => Ok(Reanalysis::EraInterim),
            "merra2" | "merra-2" => Ok(Reanalysis::Merra2),
            other => Err(IbError::InvalidConfigValueError {
                field: "reanalysis".to_string(),
                value: other.to_string(),
                reason: "Expected one of: era5, era-interim, merra2".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("ERA5".parse::<Reanalysis>().unwrap(), Reanalysis::Era5);
        assert_eq!(
            "era-interim".parse::<Reanalysis>().unwrap(),
            Reanalysis::EraInterim
        );
        assert_eq!(
            "ERAInterim".parse::<Reanalysis>().unwrap(),
            Reanalysis::EraInterim
        );
        assert_eq!("merra-2".parse::<Reanalysis>().unwrap(), Reanalysis::Merra2);
        assert!("ncep".parse::<Reanalysis>().is_err());
    }

    #[test]
    fn test_monthly_file_patterns() {
        assert_eq!(
            Reanalysis::Era5.monthly_file(2018, 1),
            "ERA5_MSL_2018_01.json"
        );
        assert_eq!(
            Reanalysis::EraInterim.monthly_file(2015, 12),
            "ERA-Interim_MSL_2015_12.json"
        );
        assert_eq!(
            Reanalysis::Merra2.monthly_file(2020, 7),
            "MERRA2_SLP_2020_07.json"
        );
    }

    #[test]
    fn test_mean_file_pattern() {
        assert_eq!(
            Reanalysis::Era5.mean_file(2000, 2020),
            "ERA5_MEAN_2000-2020.json"
        );
    }
}
