use async_trait::async_trait;
use chrono::Utc;
use std::path::Path;

use crate::compute::ib::ib_response;
use crate::compute::interp::{pressure_at, reference_at};
use crate::compute::time::{delta_time_to_utc, epoch_seconds};
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{
    BeamSummary, CorrectedBeam, CorrectedSegment, CorrectionResult, ExtractBundle, GlobalMetadata,
    GranuleData,
};
use crate::granule::name::GranuleInfo;
use crate::granule::{reader, writer};
use crate::reanalysis::catalog::FieldCatalog;
use crate::reanalysis::field::{mean_of_series, read_field, read_mean_field, stack_fields};
use crate::utils::error::{IbError, Result};

const REFERENCES: &str =
    "Wunsch and Stammer (1997), doi:10.1029/96RG03037; Hofmann-Wellenhof and Moritz (2006)";

pub struct Atl06Pipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: reqwest::Client,
}

impl<S: Storage, C: ConfigProvider> Atl06Pipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Delta-time extrema over every segment of every beam.
    fn time_span(granule: &GranuleData) -> Result<(f64, f64)> {
        let mut tmin = f64::INFINITY;
        let mut tmax = f64::NEG_INFINITY;
        for beam in &granule.beams {
            for segment in &beam.segments {
                if segment.delta_time.is_finite() {
                    tmin = tmin.min(segment.delta_time);
                    tmax = tmax.max(segment.delta_time);
                }
            }
        }
        if tmin > tmax {
            return Err(IbError::ProcessingError {
                message: "granule contains no land-ice segments".to_string(),
            });
        }
        Ok((tmin, tmax))
    }
}

#[async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for Atl06Pipeline<S, C> {
    async fn extract(&self) -> Result<ExtractBundle> {
        let granule_path = self.config.granule();
        let file_name = Path::new(granule_path)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| IbError::GranuleNameError {
                name: granule_path.to_string(),
            })?;
        let info = GranuleInfo::parse(file_name)?;
        tracing::debug!(
            "Granule {}: track {}, cycle {}, region {}",
            info.product,
            info.track,
            info.cycle,
            info.region
        );

        let bytes = self.storage.read_file(granule_path).await?;
        let granule = reader::read_granule(&bytes)?;

        let sdp_epoch = granule.ancillary.atlas_sdp_gps_epoch;
        let (tmin, tmax) = Self::time_span(&granule)?;
        let start = delta_time_to_utc(tmin, sdp_epoch).ok_or_else(|| IbError::ProcessingError {
            message: format!("delta time {} is not a valid timestamp", tmin),
        })?;
        let end = delta_time_to_utc(tmax, sdp_epoch).ok_or_else(|| IbError::ProcessingError {
            message: format!("delta time {} is not a valid timestamp", tmax),
        })?;
        tracing::debug!("Granule time span: {} to {}", start, end);

        let catalog = FieldCatalog::new(
            self.config.reanalysis(),
            self.config.data_directory(),
            self.config.endpoint().map(str::to_string),
        );
        let paths = catalog.resolve(&self.client, start, end).await?;
        tracing::debug!("Reading {} pressure files", paths.len());

        let mut fields = Vec::new();
        for path in &paths {
            fields.push(read_field(path)?);
        }
        let series = stack_fields(fields)?;

        let mean = match self.config.mean_range() {
            Some((first, last)) => match catalog.resolve_mean(&self.client, first, last).await? {
                Some(path) => {
                    let mean = read_mean_field(&path)?;
                    if mean.latitude != series.latitude || mean.longitude != series.longitude {
                        return Err(IbError::FieldError {
                            file: path.display().to_string(),
                            message: "mean field grid does not match the pressure fields"
                                .to_string(),
                        });
                    }
                    mean
                }
                None => {
                    tracing::warn!(
                        "Mean file {} not found, falling back to the time-mean of loaded fields",
                        self.config.reanalysis().mean_file(first, last)
                    );
                    mean_of_series(&series)
                }
            },
            None => {
                tracing::debug!("No mean period configured, using time-mean of loaded fields");
                mean_of_series(&series)
            }
        };

        Ok(ExtractBundle {
            info,
            granule,
            series,
            mean,
        })
    }

    async fn transform(&self, bundle: ExtractBundle) -> Result<CorrectionResult> {
        let sdp_epoch = bundle.granule.ancillary.atlas_sdp_gps_epoch;
        let density = self.config.density();

        let mut beams = Vec::new();
        let mut summaries = Vec::new();
        let mut any_segments = false;

        for beam in &bundle.granule.beams {
            if beam.segments.is_empty() {
                tracing::warn!("Beam {} has no land-ice segments, skipping", beam.id);
                beams.push(CorrectedBeam {
                    id: beam.id,
                    rows: vec![],
                });
                summaries.push(BeamSummary {
                    beam: beam.id,
                    total: 0,
                    corrected: 0,
                    out_of_bounds: 0,
                });
                continue;
            }
            any_segments = true;

            let mut rows = Vec::with_capacity(beam.segments.len());
            let mut corrected = 0;
            for segment in &beam.segments {
                let ib = delta_time_to_utc(segment.delta_time, sdp_epoch).and_then(|utc| {
                    let t = epoch_seconds(&utc);
                    let pressure =
                        pressure_at(&bundle.series, t, segment.latitude, segment.longitude)?;
                    let reference =
                        reference_at(&bundle.mean, segment.latitude, segment.longitude)?;
                    Some(ib_response(pressure, reference, density))
                });
                if ib.is_some() {
                    corrected += 1;
                }
                rows.push(CorrectedSegment {
                    segment_id: segment.segment_id,
                    delta_time: segment.delta_time,
                    latitude: segment.latitude,
                    longitude: segment.longitude,
                    h_li: segment.h_li,
                    ib,
                });
            }

            let total = rows.len();
            summaries.push(BeamSummary {
                beam: beam.id,
                total,
                corrected,
                out_of_bounds: total - corrected,
            });
            beams.push(CorrectedBeam { id: beam.id, rows });
        }

        if !any_segments {
            return Err(IbError::ProcessingError {
                message: "every beam in the granule is empty".to_string(),
            });
        }

        // geospatial and temporal coverage over all segments
        let (mut lat_min, mut lat_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut lon_min, mut lon_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for beam in &beams {
            for row in &beam.rows {
                lat_min = lat_min.min(row.latitude);
                lat_max = lat_max.max(row.latitude);
                lon_min = lon_min.min(row.longitude);
                lon_max = lon_max.max(row.longitude);
            }
        }
        let (tmin, tmax) = Self::time_span(&bundle.granule)?;
        let coverage = |delta: f64| -> String {
            delta_time_to_utc(delta, sdp_epoch)
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_default()
        };

        let metadata = GlobalMetadata {
            title: "ATLAS/ICESat-2 L3A Land Ice Height".to_string(),
            summary: format!(
                "Inverse-barometer responses interpolated from {} sea-level pressure \
                 onto ATL06 land-ice segments",
                self.config.reanalysis()
            ),
            source_granule: bundle.info.file_name(),
            reanalysis: self.config.reanalysis().label().to_string(),
            density,
            geospatial_lat_min: lat_min,
            geospatial_lat_max: lat_max,
            geospatial_lon_min: lon_min,
            geospatial_lon_max: lon_max,
            time_coverage_start: coverage(tmin),
            time_coverage_end: coverage(tmax),
            references: REFERENCES.to_string(),
            date_created: Utc::now().to_rfc3339(),
        };

        Ok(CorrectionResult {
            info: bundle.info,
            beams,
            summaries,
            metadata,
        })
    }

    async fn load(&self, result: CorrectionResult) -> Result<String> {
        let output_name = result.info.output_name(self.config.reanalysis().label());

        if self.storage.file_exists(&output_name).await? && !self.config.clobber() {
            return Err(IbError::OutputExistsError { path: output_name });
        }

        for summary in &result.summaries {
            tracing::info!(
                "{}: {} corrected, {} out of bounds",
                summary.beam,
                summary.corrected,
                summary.out_of_bounds
            );
        }

        let data = writer::write_granule(&result)?;
        tracing::debug!("Writing {} ({} bytes)", output_name, data.len());
        self.storage.write_file(&output_name, &data).await?;

        Ok(format!("{}/{}", self.config.data_directory(), output_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        AncillaryData, BeamData, BeamId, FieldSeries, MeanField, PressureField, SegmentRecord,
    };
    use crate::reanalysis::Reanalysis;
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use zip::write::{FileOptions, ZipWriter};

    const SDP_EPOCH: f64 = 1_198_800_018.0;
    // 2018-01-15T00:00:00Z as delta time and epoch seconds
    const MID_JANUARY_DELTA: f64 = 14.0 * 86400.0;
    const EXPECTED_IB: f64 = -1000.0 / (1030.0 * 9.80665);

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn insert(&self, path: &str, data: Vec<u8>) {
            self.files.lock().await.insert(path.to_string(), data);
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                IbError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        async fn file_exists(&self, path: &str) -> Result<bool> {
            Ok(self.files.lock().await.contains_key(path))
        }
    }

    struct MockConfig {
        granule: String,
        data_directory: String,
        mean_range: Option<(i32, i32)>,
        clobber: bool,
    }

    impl MockConfig {
        fn new(granule: &str, data_directory: &str) -> Self {
            Self {
                granule: granule.to_string(),
                data_directory: data_directory.to_string(),
                mean_range: None,
                clobber: false,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn granule(&self) -> &str {
            &self.granule
        }

        fn data_directory(&self) -> &str {
            &self.data_directory
        }

        fn reanalysis(&self) -> Reanalysis {
            Reanalysis::Era5
        }

        fn density(&self) -> f64 {
            1030.0
        }

        fn mean_range(&self) -> Option<(i32, i32)> {
            self.mean_range
        }

        fn endpoint(&self) -> Option<&str> {
            None
        }

        fn clobber(&self) -> bool {
            self.clobber
        }
    }

    fn segment(id: u64, delta_time: f64, lat: f64, lon: f64) -> SegmentRecord {
        SegmentRecord {
            segment_id: id,
            delta_time,
            latitude: lat,
            longitude: lon,
            h_li: 1500.0,
        }
    }

    fn granule_zip(beams: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        zip.start_file::<_, ()>("ancillary_data.json", FileOptions::default())
            .unwrap();
        zip.write_all(br#"{"atlas_sdp_gps_epoch": 1198800018.0}"#)
            .unwrap();
        for (beam, rows) in beams {
            zip.start_file::<_, ()>(
                format!("{}/land_ice_segments.csv", beam),
                FileOptions::default(),
            )
            .unwrap();
            zip.write_all(b"segment_id,delta_time,latitude,longitude,h_li\n")
                .unwrap();
            zip.write_all(rows.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    /// Two-level field over mid January 2018, constant 1000 Pa anomaly
    /// against a 101325 Pa reference.
    fn january_field() -> PressureField {
        PressureField {
            product: "ERA5".to_string(),
            units: "Pa".to_string(),
            latitude: vec![-80.0, -70.0],
            longitude: vec![60.0, 70.0],
            time: vec![1_515_952_800.0, 1_515_996_000.0],
            pressure: vec![vec![102_325.0; 4], vec![102_325.0; 4]],
        }
    }

    fn january_bundle(granule: GranuleData) -> ExtractBundle {
        let field = january_field();
        ExtractBundle {
            info: GranuleInfo::parse("ATL06_20180115000000_05630110_006_02.zip").unwrap(),
            granule,
            series: FieldSeries {
                latitude: field.latitude.clone(),
                longitude: field.longitude.clone(),
                time: field.time.clone(),
                levels: field.pressure.clone(),
            },
            mean: MeanField {
                latitude: field.latitude,
                longitude: field.longitude,
                values: vec![101_325.0; 4],
            },
        }
    }

    #[tokio::test]
    async fn test_extract_assembles_bundle() {
        let dir = tempfile::TempDir::new().unwrap();
        let field_json = serde_json::to_string(&january_field()).unwrap();
        std::fs::write(dir.path().join("ERA5_MSL_2018_01.json"), field_json).unwrap();

        let storage = MockStorage::new();
        storage
            .insert(
                "ATL06_20180115000000_05630110_006_02.zip",
                granule_zip(&[("gt1l", "100,1209600.0,-75.0,65.0,1500.0\n")]),
            )
            .await;

        let config = MockConfig::new(
            "ATL06_20180115000000_05630110_006_02.zip",
            dir.path().to_str().unwrap(),
        );
        let pipeline = Atl06Pipeline::new(storage, config);

        let bundle = pipeline.extract().await.unwrap();
        assert_eq!(bundle.granule.beams.len(), 1);
        assert_eq!(bundle.series.levels.len(), 2);
        // no mean file configured: reference is the series time-mean
        assert!(bundle.mean.values.iter().all(|&v| v == 102_325.0));
    }

    #[tokio::test]
    async fn test_extract_uses_mean_file_when_configured() {
        let dir = tempfile::TempDir::new().unwrap();
        let field_json = serde_json::to_string(&january_field()).unwrap();
        std::fs::write(dir.path().join("ERA5_MSL_2018_01.json"), field_json).unwrap();

        let mut mean = january_field();
        mean.time = vec![0.0];
        mean.pressure = vec![vec![101_325.0; 4]];
        let mean_json = serde_json::to_string(&mean).unwrap();
        std::fs::write(dir.path().join("ERA5_MEAN_2000-2020.json"), mean_json).unwrap();

        let storage = MockStorage::new();
        storage
            .insert(
                "ATL06_20180115000000_05630110_006_02.zip",
                granule_zip(&[("gt1l", "100,1209600.0,-75.0,65.0,1500.0\n")]),
            )
            .await;

        let mut config = MockConfig::new(
            "ATL06_20180115000000_05630110_006_02.zip",
            dir.path().to_str().unwrap(),
        );
        config.mean_range = Some((2000, 2020));
        let pipeline = Atl06Pipeline::new(storage, config);

        let bundle = pipeline.extract().await.unwrap();
        assert!(bundle.mean.values.iter().all(|&v| v == 101_325.0));
    }

    #[tokio::test]
    async fn test_extract_missing_field_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = MockStorage::new();
        storage
            .insert(
                "ATL06_20180115000000_05630110_006_02.zip",
                granule_zip(&[("gt1l", "100,1209600.0,-75.0,65.0,1500.0\n")]),
            )
            .await;

        let config = MockConfig::new(
            "ATL06_20180115000000_05630110_006_02.zip",
            dir.path().to_str().unwrap(),
        );
        let pipeline = Atl06Pipeline::new(storage, config);

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, IbError::MissingFieldError { .. }));
    }

    #[tokio::test]
    async fn test_extract_rejects_bad_granule_name() {
        let storage = MockStorage::new();
        let config = MockConfig::new("not_a_granule.zip", ".");
        let pipeline = Atl06Pipeline::new(storage, config);

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, IbError::GranuleNameError { .. }));
    }

    #[tokio::test]
    async fn test_transform_computes_expected_response() {
        let granule = GranuleData {
            ancillary: AncillaryData {
                atlas_sdp_gps_epoch: SDP_EPOCH,
            },
            beams: vec![BeamData {
                id: BeamId::Gt1l,
                segments: vec![segment(100, MID_JANUARY_DELTA, -75.0, 65.0)],
            }],
        };

        let storage = MockStorage::new();
        let config = MockConfig::new("ATL06_20180115000000_05630110_006_02.zip", ".");
        let pipeline = Atl06Pipeline::new(storage, config);

        let result = pipeline.transform(january_bundle(granule)).await.unwrap();
        assert_eq!(result.beams.len(), 1);
        let ib = result.beams[0].rows[0].ib.unwrap();
        assert!((ib - EXPECTED_IB).abs() < 1e-12);
        assert_eq!(result.summaries[0].corrected, 1);
        assert_eq!(result.summaries[0].out_of_bounds, 0);
    }

    #[tokio::test]
    async fn test_transform_counts_out_of_bounds_segments() {
        let granule = GranuleData {
            ancillary: AncillaryData {
                atlas_sdp_gps_epoch: SDP_EPOCH,
            },
            beams: vec![BeamData {
                id: BeamId::Gt2r,
                segments: vec![
                    segment(100, MID_JANUARY_DELTA, -75.0, 65.0),
                    // north of the grid
                    segment(101, MID_JANUARY_DELTA, -60.0, 65.0),
                    // outside the field time span
                    segment(102, 200.0 * 86400.0, -75.0, 65.0),
                ],
            }],
        };

        let storage = MockStorage::new();
        let config = MockConfig::new("ATL06_20180115000000_05630110_006_02.zip", ".");
        let pipeline = Atl06Pipeline::new(storage, config);

        let result = pipeline.transform(january_bundle(granule)).await.unwrap();
        let rows = &result.beams[0].rows;
        assert!(rows[0].ib.is_some());
        assert!(rows[1].ib.is_none());
        assert!(rows[2].ib.is_none());
        assert_eq!(result.summaries[0].corrected, 1);
        assert_eq!(result.summaries[0].out_of_bounds, 2);
    }

    #[tokio::test]
    async fn test_transform_skips_empty_beam() {
        let granule = GranuleData {
            ancillary: AncillaryData {
                atlas_sdp_gps_epoch: SDP_EPOCH,
            },
            beams: vec![
                BeamData {
                    id: BeamId::Gt1l,
                    segments: vec![],
                },
                BeamData {
                    id: BeamId::Gt1r,
                    segments: vec![segment(100, MID_JANUARY_DELTA, -75.0, 65.0)],
                },
            ],
        };

        let storage = MockStorage::new();
        let config = MockConfig::new("ATL06_20180115000000_05630110_006_02.zip", ".");
        let pipeline = Atl06Pipeline::new(storage, config);

        let result = pipeline.transform(january_bundle(granule)).await.unwrap();
        assert_eq!(result.beams.len(), 2);
        assert!(result.beams[0].rows.is_empty());
        assert_eq!(result.summaries[0].total, 0);
        assert_eq!(result.summaries[1].corrected, 1);
    }

    #[tokio::test]
    async fn test_transform_rejects_all_empty_granule() {
        let granule = GranuleData {
            ancillary: AncillaryData {
                atlas_sdp_gps_epoch: SDP_EPOCH,
            },
            beams: vec![BeamData {
                id: BeamId::Gt1l,
                segments: vec![],
            }],
        };

        let storage = MockStorage::new();
        let config = MockConfig::new("ATL06_20180115000000_05630110_006_02.zip", ".");
        let pipeline = Atl06Pipeline::new(storage, config);

        let err = pipeline.transform(january_bundle(granule)).await.unwrap_err();
        assert!(matches!(err, IbError::ProcessingError { .. }));
    }

    #[tokio::test]
    async fn test_transform_metadata_coverage() {
        let granule = GranuleData {
            ancillary: AncillaryData {
                atlas_sdp_gps_epoch: SDP_EPOCH,
            },
            beams: vec![BeamData {
                id: BeamId::Gt1l,
                segments: vec![
                    segment(100, MID_JANUARY_DELTA, -75.5, 64.0),
                    segment(101, MID_JANUARY_DELTA + 3600.0, -74.5, 66.0),
                ],
            }],
        };

        let storage = MockStorage::new();
        let config = MockConfig::new("ATL06_20180115000000_05630110_006_02.zip", ".");
        let pipeline = Atl06Pipeline::new(storage, config);

        let result = pipeline.transform(january_bundle(granule)).await.unwrap();
        let meta = &result.metadata;
        assert_eq!(meta.geospatial_lat_min, -75.5);
        assert_eq!(meta.geospatial_lat_max, -74.5);
        assert_eq!(meta.geospatial_lon_min, 64.0);
        assert_eq!(meta.geospatial_lon_max, 66.0);
        assert_eq!(meta.time_coverage_start, "2018-01-15T00:00:00+00:00");
        assert_eq!(meta.time_coverage_end, "2018-01-15T01:00:00+00:00");
        assert_eq!(meta.reanalysis, "ERA5");
        assert_eq!(
            meta.source_granule,
            "ATL06_20180115000000_05630110_006_02.zip"
        );
    }

    #[tokio::test]
    async fn test_load_writes_output_granule() {
        let granule = GranuleData {
            ancillary: AncillaryData {
                atlas_sdp_gps_epoch: SDP_EPOCH,
            },
            beams: vec![BeamData {
                id: BeamId::Gt1l,
                segments: vec![segment(100, MID_JANUARY_DELTA, -75.0, 65.0)],
            }],
        };

        let storage = MockStorage::new();
        let config = MockConfig::new("ATL06_20180115000000_05630110_006_02.zip", "data");
        let pipeline = Atl06Pipeline::new(storage.clone(), config);

        let result = pipeline.transform(january_bundle(granule)).await.unwrap();
        let path = pipeline.load(result).await.unwrap();
        assert_eq!(path, "data/ATL06_IB_ERA5_20180115000000_05630110_006_02.zip");

        let data = storage
            .get_file("ATL06_IB_ERA5_20180115000000_05630110_006_02.zip")
            .await
            .unwrap();
        assert!(!data.is_empty());
    }

    #[tokio::test]
    async fn test_load_refuses_to_clobber() {
        let granule = GranuleData {
            ancillary: AncillaryData {
                atlas_sdp_gps_epoch: SDP_EPOCH,
            },
            beams: vec![BeamData {
                id: BeamId::Gt1l,
                segments: vec![segment(100, MID_JANUARY_DELTA, -75.0, 65.0)],
            }],
        };

        let storage = MockStorage::new();
        storage
            .insert("ATL06_IB_ERA5_20180115000000_05630110_006_02.zip", vec![1])
            .await;

        let config = MockConfig::new("ATL06_20180115000000_05630110_006_02.zip", ".");
        let pipeline = Atl06Pipeline::new(storage.clone(), config);
        let result = pipeline
            .transform(january_bundle(granule.clone()))
            .await
            .unwrap();
        let err = pipeline.load(result).await.unwrap_err();
        assert!(matches!(err, IbError::OutputExistsError { .. }));

        // clobber replaces the stale file
        let mut config = MockConfig::new("ATL06_20180115000000_05630110_006_02.zip", ".");
        config.clobber = true;
        let pipeline = Atl06Pipeline::new(storage.clone(), config);
        let result = pipeline.transform(january_bundle(granule)).await.unwrap();
        pipeline.load(result).await.unwrap();
        let data = storage
            .get_file("ATL06_IB_ERA5_20180115000000_05630110_006_02.zip")
            .await
            .unwrap();
        assert!(data.len() > 1);
    }
}
