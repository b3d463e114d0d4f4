//! Descriptive statistics over a table of insured clients.
//!
//! A CSV file with the columns `age, sex, bmi, children, smoker, region,
//! charges` is loaded into an [`InsuranceDataset`], which answers a small
//! set of read-only queries: distinct regions, average BMI per region and
//! its extremes, smoker share per sex, average BMI above an age threshold
//! and charges against age. Presentation lives outside the dataset, in a
//! [`ReportSink`] for the figures and a [`ChartSink`] for the scatter plot.
//!
//! ```no_run
//! use insurance_costs::{load_csv, Report, ReportSink, TextSink};
//!
//! fn main() -> insurance_costs::Result<()> {
//!     let dataset = load_csv("insurance.csv")?;
//!     let report = Report::build(&dataset, 60)?;
//!     TextSink::new(std::io::stdout()).emit(&report)
//! }
//! ```

pub mod chart;
pub mod dataset;
pub mod error;
pub mod frame;
pub mod loader;
pub mod records;
pub mod report;
pub mod stats;

pub use chart::{ChartSink, ScatterSpec, SvgScatterChart};
pub use dataset::{
    ClientColumns, ColumnValues, InsuranceDataset, OverweightRegions, RawColumns, RegionBmi,
    SmokerShare,
};
pub use error::{InsuranceError, Result};
pub use loader::{load_csv, read_columns};
pub use report::{JsonSink, Report, ReportSink, TextSink};
