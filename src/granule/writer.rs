use std::io::{Cursor, Write};
use zip::write::{FileOptions, ZipWriter};

use crate::domain::model::CorrectionResult;
use crate::utils::error::{IbError, Result};

const SEGMENT_HEADER: [&str; 6] = [
    "segment_id",
    "delta_time",
    "latitude",
    "longitude",
    "h_li",
    "ib",
];

/// Serializes the corrected granule: one beam CSV per input beam (empty
/// beams keep their header) plus `metadata.json` with global attributes.
pub fn write_granule(result: &CorrectionResult) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for beam in &result.beams {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(SEGMENT_HEADER)?;
        for row in &beam.rows {
            writer.write_record(&[
                row.segment_id.to_string(),
                row.delta_time.to_string(),
                row.latitude.to_string(),
                row.longitude.to_string(),
                row.h_li.to_string(),
                row.ib.map(|v| v.to_string()).unwrap_or_default(),
            ])?;
        }
        let content = writer.into_inner().map_err(|e| IbError::ProcessingError {
            message: format!("failed to flush beam CSV: {}", e),
        })?;

        zip.start_file::<_, ()>(
            format!("{}/land_ice_segments.csv", beam.id),
            FileOptions::default(),
        )?;
        zip.write_all(&content)?;
    }

    zip.start_file::<_, ()>("metadata.json", FileOptions::default())?;
    let metadata = serde_json::to_string_pretty(&result.metadata)?;
    zip.write_all(metadata.as_bytes())?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
