use std::path::PathBuf;

use log::info;
use plotters::prelude::*;

use crate::error::{InsuranceError, Result};

/// Title and axis labels of a scatter plot.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl Default for ScatterSpec {
    fn default() -> Self {
        ScatterSpec {
            title: "Clients yearly charges relation to their age".to_string(),
            x_label: "AGE".to_string(),
            y_label: "CHARGES".to_string(),
        }
    }
}

/// Anything that can render `(x, y)` points as a scatter plot.
pub trait ChartSink {
    fn scatter(&mut self, spec: &ScatterSpec, xs: &[i64], ys: &[f64]) -> Result<()>;
}

/// Renders scatter plots into an SVG file.
pub struct SvgScatterChart {
    path: PathBuf,
    size: (u32, u32),
}

impl SvgScatterChart {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        SvgScatterChart {
            path: path.into(),
            size: (1024, 768),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }
}

fn chart_err<E: std::fmt::Display>(err: E) -> InsuranceError {
    InsuranceError::Chart(err.to_string())
}

/// Padded axis range; a degenerate range is widened so plotters can scale it.
fn axis_range(values: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let pad = ((max - min) * 0.05).max(1.0);
    (min - pad)..(max + pad)
}

impl ChartSink for SvgScatterChart {
    fn scatter(&mut self, spec: &ScatterSpec, xs: &[i64], ys: &[f64]) -> Result<()> {
        if xs.len() != ys.len() {
            return Err(InsuranceError::Validation {
                column: spec.y_label.clone(),
                expected: xs.len(),
                found: ys.len(),
            });
        }

        let x_range = axis_range(xs.iter().map(|x| *x as f64));
        let y_range = axis_range(ys.iter().copied());

        let root = SVGBackend::new(&self.path, self.size).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&spec.title, ("sans-serif", 24))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, y_range)
            .map_err(chart_err)?;

        chart
            .configure_mesh()
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .draw()
            .map_err(chart_err)?;

        chart
            .draw_series(
                xs.iter()
                    .zip(ys)
                    .map(|(x, y)| Circle::new((*x as f64, *y), 3, BLUE.mix(0.5).filled())),
            )
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
        info!("scatter plot of {} points written to {}", xs.len(), self.path.display());
        Ok(())
    }
}
