//! Tab-separated interaction file handling

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{AnalyzerError, Result};
use crate::graph::RawRecord;

/// Read raw interaction records from a headerless two-column TSV file
pub fn read_interactions(path: &Path) -> Result<Vec<RawRecord>> {
    log::info!("Reading interaction file: {}", path.display());

    let file = File::open(path).map_err(|err| {
        log::error!("Cannot open {}: {}", path.display(), err);
        AnalyzerError::MissingSource {
            path: path.to_path_buf(),
        }
    })?;

    let records = parse_interactions(BufReader::new(file))?;
    log::info!("Loaded {} interaction rows", records.len());
    Ok(records)
}

/// Parse interaction rows from any buffered reader.
///
/// Blank lines are not records and are passed over. Missing or empty
/// columns are kept as `None` so the builder can report them; columns past
/// the second are ignored. A line that is not valid UTF-8 becomes an
/// unreadable record instead of failing the whole file.
pub fn parse_interactions<R: BufRead>(reader: R) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();

    for (idx, bytes) in reader.split(b'\n').enumerate() {
        let line = match String::from_utf8(bytes?) {
            Ok(line) => line,
            Err(_) => {
                records.push(RawRecord::unreadable(idx + 1));
                continue;
            }
        };
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let mut columns = line.split('\t').map(str::trim);
        let drug_a = columns.next().filter(|s| !s.is_empty()).map(str::to_string);
        let drug_b = columns.next().filter(|s| !s.is_empty()).map(str::to_string);

        if columns.next().is_some() {
            log::debug!("Ignoring extra columns on line {}", idx + 1);
        }

        records.push(RawRecord {
            line: idx + 1,
            drug_a,
            drug_b,
            unreadable: false,
        });
    }

    Ok(records)
}
