//! CSV export for demo replay ticks.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::engine::REGISTRY;
use crate::replay::ReplayTick;

/// Fixed leading columns; one column per registry metric follows.
const LEADING: [&str; 5] = ["timestep", "time_hr", "pv_state", "pv_unit", "available"];

/// Column header: leading columns then registry keys in order.
pub fn header() -> Vec<&'static str> {
    LEADING
        .iter()
        .copied()
        .chain(REGISTRY.iter().map(|m| m.key))
        .collect()
}

/// Exports replay ticks to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(ticks: &[ReplayTick], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(ticks, buf)
}

/// Writes replay ticks as CSV to any writer.
///
/// Unavailable metrics are written as empty cells.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(ticks: &[ReplayTick], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(header())?;

    for t in ticks {
        let mut row = vec![
            t.timestep.to_string(),
            format!("{:.2}", t.time_hr),
            t.source.state.clone(),
            t.source.unit.clone().unwrap_or_default(),
            t.available.to_string(),
        ];
        row.extend(REGISTRY.iter().map(|m| {
            t.values
                .get(m.key)
                .copied()
                .flatten()
                .map(|v| v.to_string())
                .unwrap_or_default()
        }));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::source::SourceState;

    fn make_tick(t: usize, available: bool) -> ReplayTick {
        let values: BTreeMap<String, Option<f64>> = REGISTRY
            .iter()
            .map(|m| (m.key.to_string(), available.then_some(1.5)))
            .collect();
        ReplayTick {
            timestep: t,
            time_hr: t as f64,
            source: SourceState::new("2.7", Some("kW")),
            available,
            values,
            message: None,
        }
    }

    #[test]
    fn header_lists_every_metric() {
        let mut buf = Vec::new();
        write_csv(&[make_tick(0, true)], &mut buf).ok();
        let output = String::from_utf8(buf).unwrap_or_default();
        let first_line = output.lines().next().unwrap_or("");
        assert!(first_line.starts_with("timestep,time_hr,pv_state,pv_unit,available,range_km"));
        assert_eq!(first_line.split(',').count(), LEADING.len() + REGISTRY.len());
    }

    #[test]
    fn row_count_matches_tick_count() {
        let ticks: Vec<ReplayTick> = (0..24).map(|t| make_tick(t, true)).collect();
        let mut buf = Vec::new();
        write_csv(&ticks, &mut buf).ok();
        let output = String::from_utf8(buf).unwrap_or_default();
        assert_eq!(output.lines().count(), 25);
    }

    #[test]
    fn unavailable_values_are_empty_cells() {
        let mut buf = Vec::new();
        write_csv(&[make_tick(3, false)], &mut buf).ok();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let record = rdr.records().next().and_then(Result::ok);
        let record = record.as_ref();
        assert_eq!(record.map(|r| &r[4]), Some("false"));
        assert_eq!(record.map(|r| &r[5]), Some(""));
    }
}
