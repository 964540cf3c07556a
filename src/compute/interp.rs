use crate::domain::model::{FieldSeries, MeanField};

/// Finds the interval of `axis` containing `value` and the fractional
/// position within it. Supports ascending and descending axes; returns
/// `None` when the value falls outside the axis or is not finite.
fn bracket(axis: &[f64], value: f64) -> Option<(usize, f64)> {
    for i in 0..axis.len().saturating_sub(1) {
        let (a, b) = (axis[i], axis[i + 1]);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        if value >= lo && value <= hi {
            let w = (value - a) / (b - a);
            return Some((i, w));
        }
    }
    None
}

/// Shifts a longitude by ±360° when the grid uses the other convention
/// (0..360 grids versus signed granule longitudes).
fn normalize_longitude(lons: &[f64], lon: f64) -> f64 {
    let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &l in lons {
        min = min.min(l);
        max = max.max(l);
    }
    if lon < min && lon + 360.0 <= max {
        lon + 360.0
    } else if lon > max && lon - 360.0 >= min {
        lon - 360.0
    } else {
        lon
    }
}

/// Column pair and fractional position for a longitude, wrapping across
/// the seam cell of a global grid (the gap between the last column and
/// the first plus 360°). Non-global grids never wrap.
fn lon_bracket(lons: &[f64], lon: f64) -> Option<(usize, usize, f64)> {
    if let Some((j, w)) = bracket(lons, lon) {
        return Some((j, j + 1, w));
    }

    let n = lons.len();
    if n < 2 || !lon.is_finite() {
        return None;
    }
    let (first, last) = (lons[0], lons[n - 1]);
    if last <= first {
        return None;
    }
    let span = last - first;
    let gap = 360.0 - span;
    let step = span / (n - 1) as f64;
    if gap <= 0.0 || gap > 1.5 * step {
        return None;
    }

    let x = last + (lon - last).rem_euclid(360.0);
    if x > first + 360.0 {
        return None;
    }
    Some((n - 1, 0, (x - last) / gap))
}

/// Bilinear interpolation of one row-major `nlat x nlon` level.
fn bilinear(lats: &[f64], lons: &[f64], level: &[f64], lat: f64, lon: f64) -> Option<f64> {
    let lon = normalize_longitude(lons, lon);
    let (i, wy) = bracket(lats, lat)?;
    let (j0, j1, wx) = lon_bracket(lons, lon)?;
    let nlon = lons.len();
    let v00 = level[i * nlon + j0];
    let v01 = level[i * nlon + j1];
    let v10 = level[(i + 1) * nlon + j0];
    let v11 = level[(i + 1) * nlon + j1];
    Some((1.0 - wy) * ((1.0 - wx) * v00 + wx * v01) + wy * ((1.0 - wx) * v10 + wx * v11))
}

/// Space-time interpolation of a pressure series: bilinear within the two
/// field levels bracketing `t` (epoch seconds), then linear between them.
pub fn pressure_at(series: &FieldSeries, t: f64, lat: f64, lon: f64) -> Option<f64> {
    let (k, wt) = bracket(&series.time, t)?;
    let p0 = bilinear(
        &series.latitude,
        &series.longitude,
        &series.levels[k],
        lat,
        lon,
    )?;
    let p1 = bilinear(
        &series.latitude,
        &series.longitude,
        &series.levels[k + 1],
        lat,
        lon,
    )?;
    Some((1.0 - wt) * p0 + wt * p1)
}

/// Bilinear interpolation of the long-term mean pressure field.
pub fn reference_at(mean: &MeanField, lat: f64, lon: f64) -> Option<f64> {
    bilinear(&mean.latitude, &mean.longitude, &mean.values, lat, lon)
}
