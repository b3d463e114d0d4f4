use std::io::Write;

use serde::Serialize;

use crate::dataset::{InsuranceDataset, OverweightRegions, RegionBmi, SmokerShare};
use crate::error::{InsuranceError, Result};

/// Result of a query whose answer depends on what the data contains.
///
/// Empty groups, empty selections and out-of-range thresholds are kept as a
/// message; any other error still fails the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome<T> {
    Value(T),
    Unavailable(String),
}

impl<T> Outcome<T> {
    pub fn from_query(result: Result<T>) -> Result<Self> {
        match result {
            Ok(value) => Ok(Outcome::Value(value)),
            Err(
                err @ (InsuranceError::EmptyGroup(_)
                | InsuranceError::EmptyResult(_)
                | InsuranceError::OutOfRange { .. }),
            ) => Ok(Outcome::Unavailable(err.to_string())),
            Err(err) => Err(err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeThresholdBmi {
    pub threshold: i64,
    pub outcome: Outcome<f64>,
}

/// Results of every dataset query, ready to hand to a [`ReportSink`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub clients: usize,
    pub regions: Vec<String>,
    pub region_bmi: Vec<RegionBmi>,
    pub overweight: OverweightRegions,
    pub smokers: Outcome<SmokerShare>,
    pub bmi_above_age: AgeThresholdBmi,
}

impl Report {
    pub fn build(dataset: &InsuranceDataset, age_threshold: i64) -> Result<Self> {
        let outcome = Outcome::from_query(dataset.average_bmi_above_age(age_threshold))?;

        Ok(Report {
            clients: dataset.len(),
            regions: dataset.regions().into_iter().map(String::from).collect(),
            region_bmi: dataset.region_bmi_averages()?,
            overweight: dataset.most_and_least_overweight_region()?,
            smokers: Outcome::from_query(dataset.smoker_percentage_by_sex())?,
            bmi_above_age: AgeThresholdBmi {
                threshold: age_threshold,
                outcome,
            },
        })
    }
}

/// Presentation side of the analysis.
pub trait ReportSink {
    fn emit(&mut self, report: &Report) -> Result<()>;
}

/// Plain sentences, one finding per line.
pub struct TextSink<W: Write> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        TextSink { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for TextSink<W> {
    fn emit(&mut self, report: &Report) -> Result<()> {
        let out = &mut self.out;
        writeln!(out, "Clients: {}", report.clients)?;
        writeln!(out, "Regions: {}", report.regions.join(", "))?;
        for region in &report.region_bmi {
            writeln!(out, "Average BMI of {} is {:.2}", region.region, region.average_bmi)?;
        }
        writeln!(
            out,
            "The most overweight region is {} ({:.2})",
            report.overweight.most.region, report.overweight.most.average_bmi
        )?;
        writeln!(
            out,
            "The least overweight region is {} ({:.2})",
            report.overweight.least.region, report.overweight.least.average_bmi
        )?;
        match &report.smokers {
            Outcome::Value(share) => {
                writeln!(out, "{:.2} percent of male clients smoke", share.male)?;
                writeln!(out, "{:.2} percent of female clients smoke", share.female)?;
            }
            Outcome::Unavailable(reason) => writeln!(out, "Smoker share unavailable: {}", reason)?,
        }
        match &report.bmi_above_age.outcome {
            Outcome::Value(average) => writeln!(
                out,
                "Average BMI for clients older than {} is {:.2}",
                report.bmi_above_age.threshold, average
            )?,
            Outcome::Unavailable(reason) => writeln!(out, "{}", reason)?,
        }
        out.flush()?;
        Ok(())
    }
}

/// Pretty-printed JSON document.
pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        JsonSink { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for JsonSink<W> {
    fn emit(&mut self, report: &Report) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.out, report)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
