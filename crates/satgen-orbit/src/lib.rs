//! Orbital propagation: SGP4 wrapping and TLE-from-elements generation.
//!
//! `propagation` advances a satellite from its TLE epoch to an absolute
//! time and returns an ECI state vector. `walker` builds TLE line pairs for
//! a synthetic Walker-style constellation when no TLE catalog is available.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, trace};

#[derive(Error, Debug)]
pub enum OrbitError {
    #[error("invalid TLE for satellite {sat_id}: {reason}")]
    InvalidTle { sat_id: u32, reason: String },
    #[error("propagation failed for satellite {sat_id} at t={time}: {reason}")]
    PropagationFailed {
        sat_id: u32,
        time: DateTime<Utc>,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, OrbitError>;

/// A satellite as the rest of the workspace sees it: a dense `SatId`, a
/// display name, and the TLE line pair it was built from. `epoch` is kept
/// alongside the lines for convenience — it must agree with what
/// `sgp4::Elements::from_tle` derives from `tle_line2`, which the TLE reader
/// in `satgen-core` checks against the shared-epoch invariant (spec §3) at
/// load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Satellite {
    pub id: u32,
    pub name: String,
    pub tle_line1: String,
    pub tle_line2: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StateVector {
    /// ECI position in meters.
    pub position_m: [f64; 3],
    /// ECI velocity in meters/second.
    pub velocity_m_s: [f64; 3],
}

impl Satellite {
    /// Pure function of `(self, t_abs)`: propagate to absolute time `t_abs`
    /// and return the ECI position/velocity (spec §4.1 contract).
    pub fn position(&self, t_abs: DateTime<Utc>) -> Result<StateVector> {
        propagation::sgp4_propagate(self.id, &self.tle_line1, &self.tle_line2, t_abs)
    }
}

pub mod propagation {
    use super::*;

    /// Propagate from a TLE line pair to absolute time `t_abs`. The `sgp4`
    /// crate returns kilometers/kilometers-per-second; the rest of this
    /// workspace works in meters throughout (spec §4.3 "distances are f64
    /// meters"), so the conversion happens once, here.
    pub fn sgp4_propagate(
        sat_id: u32,
        tle_line1: &str,
        tle_line2: &str,
        t_abs: DateTime<Utc>,
    ) -> Result<StateVector> {
        let elements =
            sgp4::Elements::from_tle(None, tle_line1.as_bytes(), tle_line2.as_bytes())
                .map_err(|e| {
                    error!(sat_id, ?t_abs, reason = ?e, "invalid TLE");
                    OrbitError::InvalidTle {
                        sat_id,
                        reason: format!("{:?}", e),
                    }
                })?;
        propagate_from_elements(sat_id, &elements, t_abs)
    }

    /// Propagate from orbital elements constructed programmatically
    /// (spec §4.1: "also accept orbital elements constructed
    /// programmatically with matching semantics").
    pub fn propagate_from_elements(
        sat_id: u32,
        elements: &sgp4::Elements,
        t_abs: DateTime<Utc>,
    ) -> Result<StateVector> {
        let constants = sgp4::Constants::from_elements(elements).map_err(|e| {
            error!(sat_id, ?t_abs, reason = ?e, "SGP4 propagation failed");
            OrbitError::PropagationFailed {
                sat_id,
                time: t_abs,
                reason: format!("{:?}", e),
            }
        })?;

        let epoch_utc = DateTime::<Utc>::from_naive_utc_and_offset(elements.datetime, Utc);
        let minutes_since_epoch = (t_abs - epoch_utc).num_milliseconds() as f64 / 60_000.0;

        let prediction = constants.propagate(minutes_since_epoch).map_err(|e| {
            error!(sat_id, ?t_abs, reason = ?e, "SGP4 propagation failed");
            OrbitError::PropagationFailed {
                sat_id,
                time: t_abs,
                reason: format!("{:?}", e),
            }
        })?;

        const KM_TO_M: f64 = 1000.0;
        Ok(StateVector {
            position_m: [
                prediction.position[0] * KM_TO_M,
                prediction.position[1] * KM_TO_M,
                prediction.position[2] * KM_TO_M,
            ],
            velocity_m_s: [
                prediction.velocity[0] * KM_TO_M,
                prediction.velocity[1] * KM_TO_M,
                prediction.velocity[2] * KM_TO_M,
            ],
        })
    }
}

/// Parameters for generating a synthetic Walker-style constellation's TLEs
/// from scratch (spec §4.1), rather than reading a catalog.
#[derive(Debug, Clone, Copy)]
pub struct WalkerParams {
    pub num_orbits: u32,
    pub sats_per_orbit: u32,
    pub inclination_deg: f64,
    pub eccentricity: f64,
    pub arg_of_perigee_deg: f64,
    pub mean_motion_rev_per_day: f64,
    pub phase_diff: bool,
}

pub mod walker {
    use super::*;
    use satgen_time::Epoch;

    /// Generate `(num_orbits * sats_per_orbit)` TLE line pairs for a
    /// synthetic Walker constellation, per spec §4.1's exact RAAN/mean
    /// anomaly formulas, at the fixed synthetic epoch (year 2000, day 1.0).
    ///
    /// Satellite `sid` in orbit `o`, slot `i` (`sid = o * sats_per_orbit +
    /// i`, both 0-indexed) gets:
    /// - `raan = o * 360 / num_orbits`
    /// - `mean_anomaly = (o is odd and phase_diff ? 360 / (2*sats_per_orbit) : 0)
    ///   + i * 360 / sats_per_orbit`
    pub fn generate_tles(params: &WalkerParams, first_norad_id: u32) -> Vec<Satellite> {
        let epoch = Epoch::synthetic_2000_day1();
        let epoch_field = epoch.to_tle_epoch_string();

        let mut out = Vec::with_capacity((params.num_orbits * params.sats_per_orbit) as usize);
        for o in 0..params.num_orbits {
            let raan = o as f64 * 360.0 / params.num_orbits as f64;
            let phase_offset = if o % 2 == 1 && params.phase_diff {
                360.0 / (2.0 * params.sats_per_orbit as f64)
            } else {
                0.0
            };
            for i in 0..params.sats_per_orbit {
                let sid = o * params.sats_per_orbit + i;
                let norad_id = first_norad_id + sid;
                let mean_anomaly = phase_offset + i as f64 * 360.0 / params.sats_per_orbit as f64;

                let line1 = format_tle_line1(norad_id, &epoch_field);
                let line2 = format_tle_line2(
                    norad_id,
                    params.inclination_deg,
                    raan,
                    params.eccentricity,
                    params.arg_of_perigee_deg,
                    mean_anomaly % 360.0,
                    params.mean_motion_rev_per_day,
                );

                trace!(sid, orbit = o, slot = i, norad_id, "generated synthetic TLE");
                out.push(Satellite {
                    id: sid,
                    name: format!("SAT{}", sid),
                    tle_line1: line1,
                    tle_line2: line2,
                });
            }
        }
        out
    }

    /// Standard TLE checksum: sum of digits 0-9 (each `-` counts as 1, all
    /// other characters as 0) over the first 68 columns, mod 10.
    pub fn tle_checksum(line: &str) -> u8 {
        (line
            .bytes()
            .take(68)
            .map(|b| {
                if b.is_ascii_digit() {
                    (b - b'0') as u16
                } else if b == b'-' {
                    1u16
                } else {
                    0u16
                }
            })
            .sum::<u16>()
            % 10) as u8
    }

    fn format_tle_line1(norad_id: u32, epoch_field: &str) -> String {
        let line = format!(
            "1 {:05}U 00000ABC {} .00000000  00000-0  00000-0 0    1",
            norad_id, epoch_field
        );
        format!("{}{}", line, tle_checksum(&line))
    }

    fn format_tle_line2(
        norad_id: u32,
        inc_deg: f64,
        raan_deg: f64,
        eccentricity: f64,
        arg_perigee_deg: f64,
        mean_anomaly_deg: f64,
        mean_motion_rev_per_day: f64,
    ) -> String {
        let ecc_field = (eccentricity * 10_000_000.0).round() as u64;
        let line = format!(
            "2 {:05} {:>8.4} {:>8.4} {:07} {:>8.4} {:>8.4} {:>11.8}{:05}",
            norad_id, inc_deg, raan_deg, ecc_field, arg_perigee_deg, mean_anomaly_deg,
            mean_motion_rev_per_day, 1u32,
        );
        format!("{}{}", line, tle_checksum(&line))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn scratch_params() -> WalkerParams {
            WalkerParams {
                num_orbits: 3,
                sats_per_orbit: 4,
                inclination_deg: 53.0,
                eccentricity: 0.001,
                arg_of_perigee_deg: 0.0,
                mean_motion_rev_per_day: 15.0,
                phase_diff: true,
            }
        }

        #[test]
        fn generates_one_satellite_per_slot() {
            let sats = generate_tles(&scratch_params(), 70000);
            assert_eq!(sats.len(), 12);
            assert!(sats.iter().all(|s| s.tle_line1.len() == 69));
            assert!(sats.iter().all(|s| s.tle_line2.len() == 69));
        }

        #[test]
        fn generated_tles_parse_and_propagate() {
            let sats = generate_tles(&scratch_params(), 70000);
            let now = chrono::Utc::now();
            for sat in &sats {
                let state = sat.position(now).expect("propagation should succeed");
                let r = (state.position_m[0].powi(2)
                    + state.position_m[1].powi(2)
                    + state.position_m[2].powi(2))
                .sqrt();
                assert!(r > 6_378_135.0, "satellite must be above Earth's surface");
            }
        }

        #[test]
        fn raan_spacing_matches_spec_formula() {
            let sats = generate_tles(&scratch_params(), 1);
            // Orbit 1 (second orbit, 0-indexed) RAAN should be 360/3 = 120 deg,
            // i.e. TLE line 2 columns 18-25.
            let sat_in_orbit1 = &sats[4];
            let raan_field = &sat_in_orbit1.tle_line2[17..25];
            let raan: f64 = raan_field.trim().parse().unwrap();
            assert!((raan - 120.0).abs() < 1e-3);
        }

        #[test]
        fn checksum_counts_minus_as_one() {
            assert_eq!(tle_checksum("-1"), 2);
            assert_eq!(tle_checksum("123456789"), 45 % 10);
        }
    }
}
