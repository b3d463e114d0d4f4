use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use log::info;
use polars::frame::DataFrame;
use polars::prelude::*;
use polars_io::parquet::ParquetWriter;

use crate::dataset::ClientColumns;
use crate::error::{InsuranceError, Result};
use crate::records::{ClientRecord, AGE, BMI, CHARGES, CHILDREN, REGION, SEX, SMOKER};

/// Build a polars frame from the typed column view.
pub fn to_frame(columns: &ClientColumns) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Series::new(AGE, columns.age.as_slice()),
        Series::new(SEX, columns.sex.as_slice()),
        Series::new(BMI, columns.bmi.as_slice()),
        Series::new(CHILDREN, columns.children.as_slice()),
        Series::new(SMOKER, columns.smoker.as_slice()),
        Series::new(REGION, columns.region.as_slice()),
        Series::new(CHARGES, columns.charges.as_slice()),
    ])
}

/// Read an exported CSV back with the typed schema.
pub fn read_frame<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
    let file = File::open(path)?;

    Ok(CsvReader::new(file)
        .has_header(true)
        .with_dtypes(Some(Arc::new(ClientRecord::raw_schema())))
        .finish()?)
}

pub fn write_csv<P: AsRef<Path>>(path: P, df: &mut DataFrame) -> Result<()> {
    let mut file = File::create(path.as_ref())?;

    CsvWriter::new(&mut file).has_header(true).finish(df)?;
    info!("wrote {} rows to {}", df.height(), path.as_ref().display());

    Ok(())
}

pub fn write_parquet<P: AsRef<Path>>(path: P, df: &mut DataFrame) -> Result<()> {
    let mut file = File::create(path.as_ref())?;

    ParquetWriter::new(&mut file).finish(df)?;
    info!("wrote {} rows to {}", df.height(), path.as_ref().display());

    Ok(())
}

/// Write the typed view to `path`, picking CSV or Parquet from the extension.
pub fn export<P: AsRef<Path>>(path: P, columns: &ClientColumns) -> Result<()> {
    let path = path.as_ref();
    let mut df = to_frame(columns)?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("csv") => write_csv(path, &mut df),
        Some("parquet") => write_parquet(path, &mut df),
        _ => Err(InsuranceError::UnsupportedExport {
            path: path.to_path_buf(),
        }),
    }
}
