use std::path::Path;

use crate::domain::model::{FieldSeries, MeanField, PressureField};
use crate::utils::error::{IbError, Result};

fn strictly_monotonic(axis: &[f64]) -> bool {
    if axis.len() < 2 {
        return false;
    }
    let ascending = axis[1] > axis[0];
    axis.windows(2)
        .all(|w| if ascending { w[1] > w[0] } else { w[1] < w[0] })
}

fn field_error(file: &Path, message: impl Into<String>) -> IbError {
    IbError::FieldError {
        file: file.display().to_string(),
        message: message.into(),
    }
}

impl PressureField {
    pub fn validate(&self, file: &Path) -> Result<()> {
        if self.units != "Pa" {
            return Err(field_error(
                file,
                format!("pressure units must be Pa, found '{}'", self.units),
            ));
        }
        if !strictly_monotonic(&self.latitude) {
            return Err(field_error(file, "latitude axis is not strictly monotonic"));
        }
        if !strictly_monotonic(&self.longitude) {
            return Err(field_error(file, "longitude axis is not strictly monotonic"));
        }
        if self.time.is_empty() {
            return Err(field_error(file, "time axis is empty"));
        }
        if self.time.windows(2).any(|w| w[1] <= w[0]) {
            return Err(field_error(file, "time axis is not strictly increasing"));
        }
        if self.pressure.len() != self.time.len() {
            return Err(field_error(
                file,
                format!(
                    "expected {} pressure levels, found {}",
                    self.time.len(),
                    self.pressure.len()
                ),
            ));
        }
        let expected = self.latitude.len() * self.longitude.len();
        for (k, level) in self.pressure.iter().enumerate() {
            if level.len() != expected {
                return Err(field_error(
                    file,
                    format!(
                        "level {} has {} values, expected nlat*nlon = {}",
                        k,
                        level.len(),
                        expected
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// Reads and validates one pressure field file.
pub fn read_field(path: &Path) -> Result<PressureField> {
    let content = std::fs::read_to_string(path)?;
    let field: PressureField =
        serde_json::from_str(&content).map_err(|e| field_error(path, e.to_string()))?;
    field.validate(path)?;
    Ok(field)
}

/// Stacks monthly fields into one time-ordered series. All fields must
/// share their grid axes, and the concatenated time axis must remain
/// strictly increasing.
pub fn stack_fields(mut fields: Vec<PressureField>) -> Result<FieldSeries> {
    if fields.is_empty() {
        return Err(IbError::ProcessingError {
            message: "no pressure fields to stack".to_string(),
        });
    }

    fields.sort_by(|a, b| {
        a.time[0]
            .partial_cmp(&b.time[0])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let latitude = fields[0].latitude.clone();
    let longitude = fields[0].longitude.clone();

    let mut time = Vec::new();
    let mut levels = Vec::new();
    for field in fields {
        if field.latitude != latitude || field.longitude != longitude {
            return Err(IbError::ProcessingError {
                message: "pressure fields disagree on grid axes".to_string(),
            });
        }
        if let (Some(&last), Some(&first)) = (time.last(), field.time.first()) {
            if first <= last {
                return Err(IbError::ProcessingError {
                    message: "pressure fields overlap in time".to_string(),
                });
            }
        }
        time.extend(field.time);
        levels.extend(field.pressure);
    }

    Ok(FieldSeries {
        latitude,
        longitude,
        time,
        levels,
    })
}

/// Reads a long-term mean field file (a single time level).
pub fn read_mean_field(path: &Path) -> Result<MeanField> {
    let field = read_field(path)?;
    if field.time.len() != 1 {
        return Err(field_error(
            path,
            format!("mean field must have one time level, found {}", field.time.len()),
        ));
    }
    let mut pressure = field.pressure;
    Ok(MeanField {
        latitude: field.latitude,
        longitude: field.longitude,
        values: pressure.remove(0),
    })
}

/// Time-mean of a stacked series, the fallback reference state when no
/// long-term mean file is available.
pub fn mean_of_series(series: &FieldSeries) -> MeanField {
    let n = series.levels.len() as f64;
    let mut values = vec![0.0; series.latitude.len() * series.longitude.len()];
    for level in &series.levels {
        for (acc, v) in values.iter_mut().zip(level) {
            *acc += v;
        }
    }
    for acc in &mut values {
        *acc /= n;
    }
    MeanField {
        latitude: series.latitude.clone(),
        longitude: series.longitude.clone(),
        values,
    }
}
