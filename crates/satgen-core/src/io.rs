//! Plain-text readers and writers for the six on-disk formats named in
//! spec §6. Line-oriented, `split(',')`/`split(' ')` plus `str::parse` —
//! no parser-combinator machinery, matching how little ceremony the
//! reference tooling spends on these formats.

use crate::error::CoreError;
use crate::ids::{ForwardingEntry, IfaceMeta, NodeId};
use satgen_geodesy::GroundStation;
use satgen_orbit::Satellite;
use satgen_time::Epoch;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

fn io_err(path: &Path, source: std::io::Error) -> CoreError {
    CoreError::IoFailure {
        path: path.to_path_buf(),
        source,
    }
}

fn open_lines(path: &Path) -> Result<impl Iterator<Item = Result<String, CoreError>>, CoreError> {
    let file = File::open(path).map_err(|e| io_err(path, e))?;
    let path_owned = path.to_path_buf();
    Ok(BufReader::new(file)
        .lines()
        .map(move |l| l.map_err(|e| io_err(&path_owned, e))))
}

/// `ground_stations.txt`: 8-column CSV
/// `gid,name,lat_deg,lon_deg,elev_m,ecef_x,ecef_y,ecef_z`.
/// `gid` must strictly increment from 0.
pub fn read_ground_stations_extended(path: &Path) -> Result<Vec<GroundStation>, CoreError> {
    let mut out = Vec::new();
    for (expected_gid, line) in open_lines(path)?.enumerate() {
        let line = line?;
        let cols: Vec<&str> = line.split(',').collect();
        if cols.len() != 8 {
            return Err(CoreError::InvalidInput(format!(
                "ground station line has {} columns, expected 8: {line}",
                cols.len()
            )));
        }
        let gid: u32 = cols[0]
            .trim()
            .parse()
            .map_err(|_| CoreError::InvalidInput(format!("bad gid: {}", cols[0])))?;
        if gid != expected_gid as u32 {
            return Err(CoreError::InvalidInput(format!(
                "ground station ids must strictly increment from 0, got {gid} at position {expected_gid}"
            )));
        }
        let lat: f64 = parse_field(cols[2])?;
        let lon: f64 = parse_field(cols[3])?;
        let elev: f64 = parse_field(cols[4])?;
        let x: f64 = parse_field(cols[5])?;
        let y: f64 = parse_field(cols[6])?;
        let z: f64 = parse_field(cols[7])?;
        out.push(GroundStation::from_parsed_fields(gid, lat, lon, elev, [x, y, z]));
    }
    Ok(out)
}

fn parse_field(s: &str) -> Result<f64, CoreError> {
    s.trim()
        .parse()
        .map_err(|_| CoreError::InvalidInput(format!("bad numeric field: {s}")))
}

/// `tles.txt`: first line `<N_orbits> <N_sats_per_orbit>`, then triplets of
/// `<name> <id>` / TLE line 1 / TLE line 2. Enforces that every satellite
/// shares one epoch (spec §3 invariant).
pub fn read_tles(path: &Path) -> Result<(Epoch, Vec<Satellite>), CoreError> {
    let mut lines = open_lines(path)?;

    let header = lines
        .next()
        .ok_or_else(|| CoreError::InvalidInput("tles.txt is empty".into()))??;
    let mut header_fields = header.split_whitespace();
    let n_orbits: u32 = header_fields
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| CoreError::InvalidInput("missing N_orbits in tles.txt header".into()))?;
    let n_per_orbit: u32 = header_fields
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| CoreError::InvalidInput("missing N_sats_per_orbit in tles.txt header".into()))?;
    let expected_count = n_orbits * n_per_orbit;

    let mut satellites = Vec::with_capacity(expected_count as usize);
    let mut universal_epoch: Option<Epoch> = None;

    let mut next_sid = 0u32;
    loop {
        let Some(name_line) = lines.next() else { break };
        let name_line = name_line?;
        let line1 = lines
            .next()
            .ok_or_else(|| CoreError::InvalidInput(format!("missing TLE line 1 for {name_line}")))??;
        let line2 = lines
            .next()
            .ok_or_else(|| CoreError::InvalidInput(format!("missing TLE line 2 for {name_line}")))??;

        let mut name_fields = name_line.split_whitespace();
        let name = name_fields
            .next()
            .ok_or_else(|| CoreError::InvalidInput(format!("missing name: {name_line}")))?
            .to_string();
        let sid: u32 = name_fields
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| CoreError::InvalidInput(format!("missing satellite id: {name_line}")))?;
        if sid != next_sid {
            return Err(CoreError::InvalidInput(format!(
                "satellite ids must strictly increment from 0, expected {next_sid}, got {sid}"
            )));
        }
        next_sid += 1;

        let elements = sgp4::Elements::from_tle(None, line1.as_bytes(), line2.as_bytes())
            .map_err(|e| CoreError::InvalidInput(format!("invalid TLE for {name}: {e:?}")))?;
        let epoch = Epoch::from_datetime(chrono::DateTime::<chrono::Utc>::from_naive_utc_and_offset(
            elements.datetime,
            chrono::Utc,
        ));
        match universal_epoch {
            None => universal_epoch = Some(epoch),
            Some(u) if u == epoch => {}
            Some(u) => {
                return Err(CoreError::InvalidInput(format!(
                    "satellite {name} epoch {:?} does not match universal epoch {:?}",
                    epoch.as_datetime(),
                    u.as_datetime()
                )))
            }
        }

        satellites.push(Satellite {
            id: sid,
            name,
            tle_line1: line1,
            tle_line2: line2,
        });
    }

    if satellites.len() as u32 != expected_count {
        return Err(CoreError::InvalidInput(format!(
            "tles.txt header declares {expected_count} satellites, found {}",
            satellites.len()
        )));
    }

    let epoch = universal_epoch
        .ok_or_else(|| CoreError::InvalidInput("tles.txt has no satellites".into()))?;
    Ok((epoch, satellites))
}

/// `isls.txt`: space-separated `a b` per line, `a < b` strictly, no
/// duplicates, both indices in `[0, num_satellites)`.
pub fn read_isls(path: &Path, num_satellites: u32) -> Result<Vec<(u32, u32)>, CoreError> {
    let mut out = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for line in open_lines(path)? {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let a: u32 = fields
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| CoreError::InvalidInput(format!("bad ISL line: {line}")))?;
        let b: u32 = fields
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| CoreError::InvalidInput(format!("bad ISL line: {line}")))?;
        if a >= num_satellites || b >= num_satellites {
            return Err(CoreError::InvalidInput(format!(
                "ISL ({a},{b}) references satellite id out of range [0,{num_satellites})"
            )));
        }
        if b <= a {
            return Err(CoreError::InvalidInput(format!(
                "ISL second satellite index must be strictly larger than the first: ({a},{b})"
            )));
        }
        if !seen.insert((a, b)) {
            return Err(CoreError::InvalidInput(format!("duplicate ISL: ({a},{b})")));
        }
        out.push((a, b));
    }
    Ok(out)
}

/// `gsl_interfaces_info.txt`: `node_id,num_ifaces,agg_max_bw`. `node_id`
/// strictly increments `0..num_satellites+num_ground_stations-1`.
pub fn read_gsl_interfaces_info(
    path: &Path,
    num_satellites: u32,
    num_ground_stations: u32,
) -> Result<Vec<IfaceMeta>, CoreError> {
    let mut out = Vec::new();
    for (expected_node_id, line) in open_lines(path)?.enumerate() {
        let line = line?;
        let cols: Vec<&str> = line.split(',').collect();
        if cols.len() != 3 {
            return Err(CoreError::InvalidInput(format!(
                "gsl interface line has {} columns, expected 3: {line}",
                cols.len()
            )));
        }
        let node_id: NodeId = cols[0]
            .trim()
            .parse()
            .map_err(|_| CoreError::InvalidInput(format!("bad node_id: {}", cols[0])))?;
        if node_id != expected_node_id as u32 {
            return Err(CoreError::InvalidInput(format!(
                "node ids must strictly increment from 0, got {node_id} at position {expected_node_id}"
            )));
        }
        let interface_count: u32 = cols[1]
            .trim()
            .parse()
            .map_err(|_| CoreError::InvalidInput(format!("bad interface count: {}", cols[1])))?;
        let aggregate_max_bandwidth: f64 = parse_field(cols[2])?;
        if interface_count == 0 || aggregate_max_bandwidth <= 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "node {node_id}: interface_count and aggregate_max_bandwidth must be positive"
            )));
        }
        out.push(IfaceMeta {
            node_id,
            interface_count,
            aggregate_max_bandwidth,
        });
    }
    let expected_total = num_satellites + num_ground_stations;
    if out.len() as u32 != expected_total {
        return Err(CoreError::InvalidInput(format!(
            "gsl_interfaces_info.txt declares {} nodes, expected {expected_total}",
            out.len()
        )));
    }
    Ok(out)
}

/// Append one `fstate_<t_ns>.txt` delta line:
/// `<current>,<dst>,<next_hop>,<out_iface>,<in_iface>`.
pub fn write_fstate_line(
    writer: &mut BufWriter<File>,
    current: NodeId,
    dst: NodeId,
    entry: &ForwardingEntry,
) -> Result<(), std::io::Error> {
    writeln!(
        writer,
        "{},{},{},{},{}",
        current, dst, entry.next_hop, entry.out_iface, entry.in_iface
    )
}

/// Append one `gsl_if_bandwidth_<t_ns>.txt` delta line: `<node>,<iface>,<bandwidth>`.
pub fn write_gsl_bandwidth_line(
    writer: &mut BufWriter<File>,
    node: NodeId,
    iface: u32,
    bandwidth: f64,
) -> Result<(), std::io::Error> {
    writeln!(writer, "{},{},{}", node, iface, bandwidth)
}

/// Read a `fstate_<t_ns>.txt` delta file and merge it into `fstate` (keyed
/// by `(current, dst)`), matching how post-analysis accumulates deltas
/// sequentially (spec §4.5).
pub fn read_fstate_delta_into(
    path: &Path,
    fstate: &mut std::collections::HashMap<(NodeId, NodeId), ForwardingEntry>,
) -> Result<(), CoreError> {
    for line in open_lines(path)? {
        let line = line?;
        let mut cols = line.split(',');
        let current: NodeId = cols
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| CoreError::InvalidInput(format!("bad fstate line: {line}")))?;
        let dst: NodeId = cols
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| CoreError::InvalidInput(format!("bad fstate line: {line}")))?;
        let next_hop: i64 = cols
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| CoreError::InvalidInput(format!("bad fstate line: {line}")))?;
        let out_iface: i32 = cols
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| CoreError::InvalidInput(format!("bad fstate line: {line}")))?;
        let in_iface: i32 = cols
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| CoreError::InvalidInput(format!("bad fstate line: {line}")))?;
        fstate.insert(
            (current, dst),
            ForwardingEntry {
                next_hop,
                out_iface,
                in_iface,
            },
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn reads_isls_and_rejects_non_increasing_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("isls.txt");
        std::fs::write(&path, "0 1\n1 2\n0 2\n").unwrap();
        let isls = read_isls(&path, 3).unwrap();
        assert_eq!(isls, vec![(0, 1), (1, 2), (0, 2)]);

        std::fs::write(&path, "1 0\n").unwrap();
        assert!(read_isls(&path, 3).is_err());
    }

    #[test]
    fn reads_ground_stations_extended_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ground_stations.txt");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "0,Manila,14.5995,120.9842,0.0,0.0,0.0,0.0").unwrap();
        writeln!(f, "1,Dalian,38.9140,121.6147,0.0,0.0,0.0,0.0").unwrap();
        drop(f);
        let stations = read_ground_stations_extended(&path).unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].id, 0);
        assert_eq!(stations[1].lat_deg, 38.9140);
    }

    #[test]
    fn fstate_delta_round_trips_through_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fstate_0.txt");
        {
            let mut w = BufWriter::new(File::create(&path).unwrap());
            write_fstate_line(&mut w, 0, 10, &ForwardingEntry::reachable(3, 1, 0)).unwrap();
            write_fstate_line(&mut w, 1, 10, &ForwardingEntry::UNREACHABLE).unwrap();
        }
        let mut fstate = std::collections::HashMap::new();
        read_fstate_delta_into(&path, &mut fstate).unwrap();
        assert_eq!(fstate[&(0, 10)], ForwardingEntry::reachable(3, 1, 0));
        assert_eq!(fstate[&(1, 10)], ForwardingEntry::UNREACHABLE);
    }
}
