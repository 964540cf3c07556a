use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::utils::error::{IbError, Result};

static NAME_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(processed_)?(ATL\d{2})_(\d{4})(\d{2})(\d{2})(\d{2})(\d{2})(\d{2})_(\d{4})(\d{2})(\d{2})_(\d{3})_(\d{2})(.*?)\.zip$",
    )
    .expect("granule filename regex")
});

/// Components of an ATL06 granule filename,
/// `ATL06_yyyymmddHHMMSS_ttttccss_rrr_vv.zip` with an optional
/// `processed_` prefix and free-form auxiliary suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GranuleInfo {
    pub processed: bool,
    pub product: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// Reference ground track, four digits.
    pub track: String,
    /// Orbital cycle, two digits.
    pub cycle: String,
    /// Granule region, two digits.
    pub region: String,
    pub release: String,
    pub version: String,
    pub suffix: String,
}

impl GranuleInfo {
    pub fn parse(name: &str) -> Result<Self> {
        let caps = NAME_RX
            .captures(name)
            .ok_or_else(|| IbError::GranuleNameError {
                name: name.to_string(),
            })?;

        let field = |i: usize| caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default();
        let digits = |i: usize| -> u32 { caps[i].parse().unwrap_or(0) };

        let info = Self {
            processed: caps.get(1).is_some(),
            product: field(2),
            year: caps[3].parse().unwrap_or(0),
            month: digits(4),
            day: digits(5),
            hour: digits(6),
            minute: digits(7),
            second: digits(8),
            track: field(9),
            cycle: field(10),
            region: field(11),
            release: field(12),
            version: field(13),
            suffix: field(14),
        };

        // the date portion must be a real calendar date and time
        if NaiveDate::from_ymd_opt(info.year, info.month, info.day)
            .and_then(|d| d.and_hms_opt(info.hour, info.minute, info.second))
            .is_none()
        {
            return Err(IbError::GranuleNameError {
                name: name.to_string(),
            });
        }

        Ok(info)
    }

    /// The original filename these components were parsed from.
    pub fn file_name(&self) -> String {
        format!(
            "{}{}_{:04}{:02}{:02}{:02}{:02}{:02}_{}{}{}_{}_{}{}.zip",
            if self.processed { "processed_" } else { "" },
            self.product,
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.track,
            self.cycle,
            self.region,
            self.release,
            self.version,
            self.suffix,
        )
    }

    /// Filename of the corrected output product, labelled with the
    /// reanalysis used (e.g. `ATL06_IB_ERA5_..._006_02.zip`).
    pub fn output_name(&self, label: &str) -> String {
        format!(
            "{}_IB_{}_{:04}{:02}{:02}{:02}{:02}{:02}_{}{}{}_{}_{}{}.zip",
            self.product,
            label,
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.track,
            self.cycle,
            self.region,
            self.release,
            self.version,
            self.suffix,
        )
    }
}
