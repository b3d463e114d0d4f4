use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, info};

use crate::dataset::{InsuranceDataset, RawColumns};
use crate::error::{InsuranceError, Result};
use crate::records::COLUMNS;

/// Read an insurance CSV file into a dataset.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<InsuranceDataset> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let raw = read_columns(file)?;
    info!("loaded {} clients from {}", raw.age.len(), path.display());
    InsuranceDataset::new(raw)
}

/// Split a CSV stream with a header row into the seven raw columns.
///
/// Columns are located by header name, so their order does not matter and
/// extra columns are ignored. Data rows are numbered from zero.
pub fn read_columns<R: Read>(reader: R) -> Result<RawColumns> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut positions = [0usize; 7];
    for (slot, name) in positions.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| InsuranceError::MissingColumn(name.to_string()))?;
    }
    debug!("column positions {:?} in header {:?}", positions, headers);

    let mut raw = RawColumns::default();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        if record.len() < headers.len() {
            return Err(InsuranceError::MalformedRow {
                row,
                expected: headers.len(),
                found: record.len(),
            });
        }
        let field = |idx: usize| record[positions[idx]].to_string();
        raw.age.push(field(0));
        raw.sex.push(field(1));
        raw.bmi.push(field(2));
        raw.children.push(field(3));
        raw.smoker.push(field(4));
        raw.region.push(field(5));
        raw.charges.push(field(6));
    }
    Ok(raw)
}
