//! Absolute time (epoch) and nanosecond-resolution offsets.
//!
//! The rest of the workspace treats time as two things: a single absolute
//! `Epoch` shared by every satellite in a constellation (all TLEs in one
//! file share one epoch — spec invariant, enforced by the TLE reader in
//! `satgen-core`), and a `TimeNs` offset from that epoch at which the
//! dynamic-state driver evaluates the network.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimeError {
    #[error("TLE epoch year {0} out of supported range (57-99 or 00-56, per two-digit TLE convention)")]
    InvalidEpochYear(u32),
    #[error("TLE epoch day-of-year fraction {0} out of range [1.0, 367.0)")]
    InvalidEpochDay(f64),
}

pub type Result<T> = std::result::Result<T, TimeError>;

/// Absolute reference time against which all `TimeNs` offsets are measured.
///
/// Wraps `chrono::DateTime<Utc>` rather than reinventing calendar math,
/// matching how the rest of the workspace uses `chrono` for every other
/// timestamp it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(DateTime<Utc>);

/// Nanoseconds elapsed since an `Epoch`. Always non-negative in this
/// workspace: the dynamic-state driver only ever evaluates `t >= offset_ns`.
pub type TimeNs = i64;

impl Epoch {
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Construct from the two-digit TLE epoch fields: a year (full, e.g.
    /// 1957-2056 convention folded into `u32`) and a fractional day-of-year
    /// (1.0-based, as TLE line 2 encodes it: `"00001.00000000"` means day 1,
    /// midnight).
    pub fn from_tle_fields(full_year: u32, day_of_year_frac: f64) -> Result<Self> {
        if !(1.0..367.0).contains(&day_of_year_frac) {
            return Err(TimeError::InvalidEpochDay(day_of_year_frac));
        }
        let jan1 = NaiveDate::from_ymd_opt(full_year as i32, 1, 1)
            .ok_or(TimeError::InvalidEpochYear(full_year))?;
        let whole_days = (day_of_year_frac - 1.0).floor() as i64;
        let frac_of_day = day_of_year_frac - 1.0 - whole_days as f64;
        let base = jan1.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let nanos_into_day = (frac_of_day * 86_400_000_000_000.0).round() as i64;
        Ok(Self(
            base + Duration::days(whole_days) + Duration::nanoseconds(nanos_into_day),
        ))
    }

    /// The fixed synthetic epoch used by TLE-from-elements generation
    /// (spec §4.1): year 2000, day-of-year 1.0.
    pub fn synthetic_2000_day1() -> Self {
        Self::from_tle_fields(2000, 1.0).expect("fixed synthetic epoch is always valid")
    }

    /// Format this epoch as the TLE line-2 epoch field: two-digit year plus
    /// zero-padded fractional day-of-year, e.g. `"00001.00000000"`.
    pub fn to_tle_epoch_string(&self) -> String {
        let year = self.0.format("%y").to_string();
        let day_of_year = self.0.format("%j").to_string().parse::<u32>().unwrap();
        let start_of_day = self
            .0
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();
        let frac = (self.0 - start_of_day).num_nanoseconds().unwrap() as f64 / 86_400_000_000_000.0;
        format!("{}{:08.8}", year, day_of_year as f64 + frac)
    }

    pub fn plus_ns(&self, offset: TimeNs) -> DateTime<Utc> {
        self.0 + Duration::nanoseconds(offset)
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Iterate the half-open range `[start, end)` in steps of `step`, matching
/// the driver's `t = offset_ns, offset_ns + step_ns, …, t_end_ns - step_ns`
/// loop (spec §4.4). Exposed here so both the driver and its tests share one
/// definition of "which steps get computed."
pub fn time_steps(start_ns: TimeNs, end_ns: TimeNs, step_ns: TimeNs) -> impl Iterator<Item = TimeNs> {
    let mut t = start_ns;
    std::iter::from_fn(move || {
        if t >= end_ns {
            None
        } else {
            let cur = t;
            t += step_ns;
            Some(cur)
        }
    })
}
