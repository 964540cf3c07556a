use regex::Regex;
use std::io::{Cursor, Read};
use std::sync::LazyLock;
use zip::ZipArchive;

use crate::domain::model::{AncillaryData, BeamData, BeamId, GranuleData, SegmentRecord};
use crate::utils::error::{IbError, Result};

static BEAM_ENTRY_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(gt[123][lr])/land_ice_segments\.csv$").expect("beam entry regex")
});

/// Reads a granule archive: `ancillary_data.json` plus one
/// `gtXY/land_ice_segments.csv` per beam present.
pub fn read_granule(data: &[u8]) -> Result<GranuleData> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;

    let names: Vec<String> = (0..archive.len())
        .filter_map(|i| archive.by_index(i).ok().map(|f| f.name().to_string()))
        .collect();

    if !names.iter().any(|n| n == "ancillary_data.json") {
        return Err(IbError::GranuleError {
            message: "granule is missing ancillary_data.json".to_string(),
        });
    }

    let ancillary: AncillaryData = {
        let mut entry = archive.by_name("ancillary_data.json")?;
        let mut content = String::new();
        entry.read_to_string(&mut content)?;
        serde_json::from_str(&content)?
    };

    let mut beams = Vec::new();
    for name in &names {
        let Some(caps) = BEAM_ENTRY_RX.captures(name) else {
            continue;
        };
        let Some(id) = BeamId::parse(&caps[1]) else {
            continue;
        };

        let mut entry = archive.by_name(name)?;
        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;

        let mut segments = Vec::new();
        let mut reader = csv::Reader::from_reader(content.as_slice());
        for row in reader.deserialize::<SegmentRecord>() {
            segments.push(row?);
        }

        beams.push(BeamData { id, segments });
    }

    if beams.is_empty() {
        return Err(IbError::GranuleError {
            message: "granule contains no beam groups".to_string(),
        });
    }
    beams.sort_by_key(|b| b.id);

    Ok(GranuleData { ancillary, beams })
}
