use serde::{Deserialize, Serialize};
use std::fmt;

use crate::granule::name::GranuleInfo;

/// The six ATLAS ground tracks carried by an ATL06 granule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BeamId {
    Gt1l,
    Gt1r,
    Gt2l,
    Gt2r,
    Gt3l,
    Gt3r,
}

impl BeamId {
    pub const ALL: [BeamId; 6] = [
        BeamId::Gt1l,
        BeamId::Gt1r,
        BeamId::Gt2l,
        BeamId::Gt2r,
        BeamId::Gt3l,
        BeamId::Gt3r,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BeamId::Gt1l => "gt1l",
            BeamId::Gt1r => "gt1r",
            BeamId::Gt2l => "gt2l",
            BeamId::Gt2r => "gt2r",
            BeamId::Gt3l => "gt3l",
            BeamId::Gt3r => "gt3r",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.as_str() == s)
    }
}

impl fmt::Display for BeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Granule-level ancillary values, from `ancillary_data.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AncillaryData {
    /// GPS seconds between the GPS epoch and the ATLAS SDP epoch.
    pub atlas_sdp_gps_epoch: f64,
}

/// One land-ice segment as read from a beam CSV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub segment_id: u64,
    /// Seconds since the ATLAS SDP epoch.
    pub delta_time: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// Land-ice height in meters.
    pub h_li: f64,
}

#[derive(Debug, Clone)]
pub struct BeamData {
    pub id: BeamId,
    pub segments: Vec<SegmentRecord>,
}

#[derive(Debug, Clone)]
pub struct GranuleData {
    pub ancillary: AncillaryData,
    pub beams: Vec<BeamData>,
}

/// One monthly reanalysis pressure file: a regular lat/lon grid with a
/// time axis, pressure levels stored row-major `nlat * nlon`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PressureField {
    pub product: String,
    pub units: String,
    pub latitude: Vec<f64>,
    pub longitude: Vec<f64>,
    /// Epoch seconds UTC, strictly increasing.
    pub time: Vec<f64>,
    pub pressure: Vec<Vec<f64>>,
}

/// Time-ordered pressure levels stacked from one or more monthly files.
#[derive(Debug, Clone)]
pub struct FieldSeries {
    pub latitude: Vec<f64>,
    pub longitude: Vec<f64>,
    pub time: Vec<f64>,
    pub levels: Vec<Vec<f64>>,
}

/// Long-term mean sea-level pressure, the IB reference state.
#[derive(Debug, Clone)]
pub struct MeanField {
    pub latitude: Vec<f64>,
    pub longitude: Vec<f64>,
    pub values: Vec<f64>,
}

/// Everything the transform phase needs, assembled during extraction.
#[derive(Debug, Clone)]
pub struct ExtractBundle {
    pub info: GranuleInfo,
    pub granule: GranuleData,
    pub series: FieldSeries,
    pub mean: MeanField,
}

/// An input segment with its interpolated correction; `ib` is empty when
/// the segment fell outside the field extent or time span.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectedSegment {
    pub segment_id: u64,
    pub delta_time: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub h_li: f64,
    /// Inverse-barometer response in meters.
    pub ib: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct CorrectedBeam {
    pub id: BeamId,
    pub rows: Vec<CorrectedSegment>,
}

#[derive(Debug, Clone)]
pub struct BeamSummary {
    pub beam: BeamId,
    pub total: usize,
    pub corrected: usize,
    pub out_of_bounds: usize,
}

/// Global attributes written to `metadata.json` in the output granule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalMetadata {
    pub title: String,
    pub summary: String,
    pub source_granule: String,
    pub reanalysis: String,
    /// Seawater density used for the correction, kg/m³.
    pub density: f64,
    pub geospatial_lat_min: f64,
    pub geospatial_lat_max: f64,
    pub geospatial_lon_min: f64,
    pub geospatial_lon_max: f64,
    pub time_coverage_start: String,
    pub time_coverage_end: String,
    pub references: String,
    pub date_created: String,
}

#[derive(Debug, Clone)]
pub struct CorrectionResult {
    pub info: GranuleInfo,
    pub beams: Vec<CorrectedBeam>,
    pub summaries: Vec<BeamSummary>,
    pub metadata: GlobalMetadata,
}
