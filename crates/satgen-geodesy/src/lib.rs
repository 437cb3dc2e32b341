//! Geometry layer: WGS72 geodetic↔ECEF conversion, and the three distance
//! measures the rest of the workspace needs — satellite-satellite,
//! satellite-ground, and ground-ground (geodesic and straight-line).
//!
//! Constants and formulas here follow the WGS72 reference ellipsoid
//! (equatorial radius 6,378,135 m, flattening 1/298.26), not WGS84 — this
//! matches the reference distance/coordinate tooling this crate is modeled
//! on, which uses WGS72 throughout for ground-station geometry.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// WGS72 equatorial radius, meters.
pub const WGS72_EQUATORIAL_RADIUS_M: f64 = 6_378_135.0;
/// WGS72 flattening.
pub const WGS72_FLATTENING: f64 = 1.0 / 298.26;

#[derive(Error, Debug)]
pub enum GeodesyError {
    #[error("latitude {0} out of range [-90, 90]")]
    InvalidLatitude(f64),
    #[error("longitude {0} out of range [-180, 180]")]
    InvalidLongitude(f64),
}

pub type Result<T> = std::result::Result<T, GeodesyError>;

/// A ground station: immutable once constructed (spec §3).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GroundStation {
    pub id: u32,
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub elevation_m: f64,
    pub ecef_xyz_m: [f64; 3],
}

impl GroundStation {
    /// Construct from geodetic coordinates, deriving `ecef_xyz_m` via WGS72.
    pub fn from_geodetic(id: u32, lat_deg: f64, lon_deg: f64, elevation_m: f64) -> Result<Self> {
        let ecef_xyz_m = geodetic_to_ecef(lat_deg, lon_deg, elevation_m)?;
        Ok(Self {
            id,
            lat_deg,
            lon_deg,
            elevation_m,
            ecef_xyz_m,
        })
    }

    /// Construct from an already-known ECEF triple, trusting it without
    /// cross-checking against `lat_deg`/`lon_deg` (spec §9 open question 3:
    /// "the core trusts whichever was used by the parser").
    pub fn from_parsed_fields(
        id: u32,
        lat_deg: f64,
        lon_deg: f64,
        elevation_m: f64,
        ecef_xyz_m: [f64; 3],
    ) -> Self {
        Self {
            id,
            lat_deg,
            lon_deg,
            elevation_m,
            ecef_xyz_m,
        }
    }
}

/// WGS72 geodetic (degrees, degrees, meters) → ECEF Cartesian (meters).
pub fn geodetic_to_ecef(lat_deg: f64, lon_deg: f64, elevation_m: f64) -> Result<[f64; 3]> {
    if !(-90.0..=90.0).contains(&lat_deg) {
        return Err(GeodesyError::InvalidLatitude(lat_deg));
    }
    if !(-180.0..=180.0).contains(&lon_deg) {
        return Err(GeodesyError::InvalidLongitude(lon_deg));
    }

    let a = WGS72_EQUATORIAL_RADIUS_M;
    let f = WGS72_FLATTENING;
    let e_sq = 2.0 * f - f * f;

    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();

    let n = a / (1.0 - e_sq * lat.sin().powi(2)).sqrt();

    let x = (n + elevation_m) * lat.cos() * lon.cos();
    let y = (n + elevation_m) * lat.cos() * lon.sin();
    let z = (n * (1.0 - e_sq) + elevation_m) * lat.sin();

    Ok([x, y, z])
}

/// Euclidean (straight-line, through-the-Earth) distance between two ECEF
/// points, meters. Used for satellite-satellite and satellite-ground
/// distances, where the straight line is the physical signal path.
pub fn euclidean_distance_m(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Great-circle (geodesic) distance between two ground stations along
/// Earth's surface, using the WGS72 equatorial radius as a spherical
/// approximation (spec §4.5). Symmetric; zero for identical endpoints
/// (invariant 6).
pub fn geodesic_distance_m(a: &GroundStation, b: &GroundStation) -> f64 {
    let lat1 = a.lat_deg.to_radians();
    let lat2 = b.lat_deg.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.lon_deg - a.lon_deg).to_radians();

    let sin_dlat_2 = (dlat / 2.0).sin();
    let sin_dlon_2 = (dlon / 2.0).sin();
    let h = sin_dlat_2 * sin_dlat_2 + lat1.cos() * lat2.cos() * sin_dlon_2 * sin_dlon_2;
    let central_angle = 2.0 * h.sqrt().clamp(0.0, 1.0).asin();

    WGS72_EQUATORIAL_RADIUS_M * central_angle
}

/// Straight-line chord distance corresponding to a geodesic arc length,
/// `2 * R * sin(arc / (2 * R))` (spec §4.5).
pub fn straight_distance_from_geodesic_m(geodesic_m: f64) -> f64 {
    let r = WGS72_EQUATORIAL_RADIUS_M;
    2.0 * r * (geodesic_m / (2.0 * r)).sin()
}

/// Straight-line (chord) distance between two ground stations, derived from
/// their geodesic distance.
pub fn straight_distance_m(a: &GroundStation, b: &GroundStation) -> f64 {
    straight_distance_from_geodesic_m(geodesic_distance_m(a, b))
}

/// Julian date (UT1-approximated-as-UTC) for a `DateTime<Utc>`, via the
/// standard civil-calendar formula.
fn julian_date(t: DateTime<Utc>) -> f64 {
    let year = t.year() as i64;
    let month = t.month() as i64;
    let day = t.day() as i64;

    let (y, m) = if month <= 2 {
        (year - 1, month + 12)
    } else {
        (year, month)
    };
    let a = y.div_euclid(100);
    let b = 2 - a + a.div_euclid(4);

    let jd_at_midnight = (365.25 * (y as f64 + 4716.0)).floor()
        + (30.6001 * (m as f64 + 1.0)).floor()
        + day as f64
        + b as f64
        - 1524.5;

    let seconds_into_day = t.hour() as f64 * 3600.0
        + t.minute() as f64 * 60.0
        + t.second() as f64
        + t.nanosecond() as f64 / 1e9;

    jd_at_midnight + seconds_into_day / 86_400.0
}

/// Greenwich Mean Sidereal Time, in degrees `[0, 360)`, via Vallado's
/// formula (IAU-82 GMST, seconds of time referenced to UT1 and treated here
/// as UTC — adequate for ISL/GSL geometry at SGP4's own accuracy bound).
fn gmst_degrees(t: DateTime<Utc>) -> f64 {
    let jd = julian_date(t);
    let t_ut1 = (jd - 2_451_545.0) / 36_525.0;

    let gmst_seconds = 67_310.54841
        + (876_600.0 * 3600.0 + 8_640_184.812_866) * t_ut1
        + 0.093_104 * t_ut1 * t_ut1
        - 6.2e-6 * t_ut1 * t_ut1 * t_ut1;

    // gmst_seconds is in seconds of time-of-day scaled by 240 (time seconds
    // to degrees, since 24h * 3600s = 86400s maps to 360deg => 1s = 1/240 deg).
    let degrees = (gmst_seconds / 240.0).rem_euclid(360.0);
    if degrees < 0.0 {
        degrees + 360.0
    } else {
        degrees
    }
}

/// Rotate a TEME/ECI position (meters) into ECEF (meters) at absolute time
/// `t_abs`, via a Z-axis rotation by Greenwich Mean Sidereal Time.
///
/// Satellite-satellite distances are invariant under this rotation (both
/// points share the same rigid transform), so only satellite-to-ground
/// comparisons against a ground station's fixed ECEF coordinates need it.
pub fn teme_to_ecef(position_eci_m: [f64; 3], t_abs: DateTime<Utc>) -> [f64; 3] {
    let theta = gmst_degrees(t_abs).to_radians();
    let (sin_t, cos_t) = theta.sin_cos();
    [
        cos_t * position_eci_m[0] + sin_t * position_eci_m[1],
        -sin_t * position_eci_m[0] + cos_t * position_eci_m[1],
        position_eci_m[2],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equator_prime_meridian_lies_on_x_axis() {
        let xyz = geodetic_to_ecef(0.0, 0.0, 0.0).unwrap();
        assert!((xyz[0] - WGS72_EQUATORIAL_RADIUS_M).abs() < 1e-6);
        assert!(xyz[1].abs() < 1e-6);
        assert!(xyz[2].abs() < 1e-6);
    }

    #[test]
    fn north_pole_lies_on_z_axis_inside_equatorial_radius() {
        let xyz = geodetic_to_ecef(90.0, 0.0, 0.0).unwrap();
        assert!(xyz[0].abs() < 1e-6);
        assert!(xyz[1].abs() < 1e-6);
        // Polar radius is smaller than equatorial under WGS72 oblateness.
        assert!(xyz[2] > 0.0 && xyz[2] < WGS72_EQUATORIAL_RADIUS_M);
    }

    #[test]
    fn geodesic_distance_is_symmetric_and_zero_for_identical_points() {
        let a = GroundStation::from_geodetic(0, 40.7128, -74.0060, 10.0).unwrap();
        let b = GroundStation::from_geodetic(1, 35.6762, 139.6503, 40.0).unwrap();
        assert_eq!(geodesic_distance_m(&a, &a), 0.0);
        assert!((geodesic_distance_m(&a, &b) - geodesic_distance_m(&b, &a)).abs() < 1e-6);
    }

    #[test]
    fn new_york_to_tokyo_geodesic_is_plausible() {
        let a = GroundStation::from_geodetic(0, 40.7128, -74.0060, 10.0).unwrap();
        let b = GroundStation::from_geodetic(1, 35.6762, 139.6503, 40.0).unwrap();
        let d_km = geodesic_distance_m(&a, &b) / 1000.0;
        // Real-world great-circle distance is ~10,850 km.
        assert!(d_km > 10_000.0 && d_km < 11_500.0, "got {d_km} km");
    }

    #[test]
    fn straight_distance_never_exceeds_geodesic() {
        let a = GroundStation::from_geodetic(0, 10.0, 10.0, 0.0).unwrap();
        let b = GroundStation::from_geodetic(1, -10.0, 100.0, 0.0).unwrap();
        let geodesic = geodesic_distance_m(&a, &b);
        let straight = straight_distance_m(&a, &b);
        assert!(straight <= geodesic + 1e-6);
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        assert!(geodetic_to_ecef(120.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn teme_to_ecef_preserves_radius_and_z() {
        let t = chrono::DateTime::parse_from_rfc3339("2024-03-15T12:34:56Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        let eci = [7000_000.0, 1000_000.0, 2_000_000.0];
        let ecef = teme_to_ecef(eci, t);
        let r_eci = (eci[0] * eci[0] + eci[1] * eci[1] + eci[2] * eci[2]).sqrt();
        let r_ecef = (ecef[0] * ecef[0] + ecef[1] * ecef[1] + ecef[2] * ecef[2]).sqrt();
        assert!((r_eci - r_ecef).abs() < 1e-6);
        assert!((ecef[2] - eci[2]).abs() < 1e-6);
    }

    #[test]
    fn gmst_is_periodic_over_one_sidereal_day() {
        let t0 = chrono::DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        let g0 = gmst_degrees(t0);
        // One solar day later, GMST has advanced by slightly more than 360
        // degrees (the sidereal/solar day mismatch), so it should not have
        // returned to exactly g0.
        let t1 = t0 + chrono::Duration::days(1);
        let g1 = gmst_degrees(t1);
        assert!((g1 - g0).abs() > 0.5, "expected sidereal drift, got {g0} vs {g1}");
    }
}
