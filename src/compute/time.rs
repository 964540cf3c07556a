use chrono::{DateTime, TimeZone, Utc};

/// Unix timestamp of the GPS epoch, 1980-01-06T00:00:00Z.
pub const GPS_EPOCH_UNIX: i64 = 315_964_800;

/// GPS seconds at which each leap second since the GPS epoch took effect
/// (1981-07-01 through 2017-01-01).
const LEAP_SECOND_EPOCHS: [f64; 18] = [
    46_828_800.0,
    78_364_801.0,
    109_900_802.0,
    173_059_203.0,
    252_028_804.0,
    315_187_205.0,
    346_723_206.0,
    393_984_007.0,
    425_520_008.0,
    457_056_009.0,
    504_489_610.0,
    551_750_411.0,
    599_184_012.0,
    820_108_813.0,
    914_803_214.0,
    1_025_136_015.0,
    1_119_744_016.0,
    1_167_264_017.0,
];

/// Number of leap seconds to subtract from a GPS timestamp to reach UTC.
pub fn count_leap_seconds(gps_seconds: f64) -> f64 {
    LEAP_SECOND_EPOCHS
        .iter()
        .filter(|&&epoch| gps_seconds >= epoch)
        .count() as f64
}

/// Converts seconds since the GPS epoch to a UTC datetime.
pub fn gps_to_utc(gps_seconds: f64) -> Option<DateTime<Utc>> {
    if !gps_seconds.is_finite() {
        return None;
    }
    let unix = GPS_EPOCH_UNIX as f64 + gps_seconds - count_leap_seconds(gps_seconds);
    let mut secs = unix.floor() as i64;
    let mut nanos = ((unix - secs as f64) * 1e9).round() as u32;
    if nanos >= 1_000_000_000 {
        secs += 1;
        nanos = 0;
    }
    Utc.timestamp_opt(secs, nanos).single()
}

/// Converts an ATLAS delta time (seconds since the SDP epoch) to UTC.
///
/// `sdp_epoch` is the granule's `atlas_sdp_gps_epoch` ancillary value, the
/// GPS seconds between the GPS epoch and the ATLAS SDP epoch.
pub fn delta_time_to_utc(delta_time: f64, sdp_epoch: f64) -> Option<DateTime<Utc>> {
    gps_to_utc(sdp_epoch + delta_time)
}

/// Fractional Unix seconds of a UTC datetime, the time coordinate used by
/// the reanalysis field files.
pub fn epoch_seconds(dt: &DateTime<Utc>) -> f64 {
    dt.timestamp() as f64 + dt.timestamp_subsec_nanos() as f64 * 1e-9
}
