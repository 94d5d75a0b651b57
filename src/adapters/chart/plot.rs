use std::path::{Path, PathBuf};

use chrono::{Local, TimeZone};
use plotters::prelude::*;
use tracing::info;

use crate::domain::Sample;
use crate::ports::{ChartRenderer, SinkError, SinkResult};

const TITLE: &str = "Docker container execution stats";

/// Panels, top to bottom; must line up with `Sample::chart_values`
const PANELS: [&str; 7] = ["CPU_%", "MEM_USAGE", "NET_I", "NET_O", "BLOCK_I", "BLOCK_O", "PIDS"];

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Multi-panel PNG renderer writing `<outdir>/<stem>.png`
pub struct PlottersChart {
    outdir: PathBuf,
    size: (u32, u32),
}

impl PlottersChart {
    pub fn new(outdir: impl Into<PathBuf>) -> Self {
        Self {
            outdir: outdir.into(),
            size: (1400, 1400),
        }
    }
}

impl ChartRenderer for PlottersChart {
    fn render(&self, stem: &str, samples: &[Sample]) -> SinkResult<()> {
        if samples.is_empty() {
            return Err(SinkError::Chart("no samples to plot".to_string()));
        }

        let path = self.outdir.join(format!("{}.png", stem));
        draw(&path, self.size, samples).map_err(|e| SinkError::Chart(e.to_string()))?;
        info!("Chart saved to {}", path.display());
        Ok(())
    }
}

fn draw(
    path: &Path,
    size: (u32, u32),
    samples: &[Sample],
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let times: Vec<i64> = samples.iter().map(|s| s.timepoint.timestamp_millis()).collect();
    let (x_min, x_max) = time_bounds(&times);
    let date_format = DateFormat::for_span(x_max - x_min);

    let areas = root.split_evenly((PANELS.len(), 1));
    for (index, (area, label)) in areas.iter().zip(PANELS).enumerate() {
        let values: Vec<f64> = samples.iter().map(|s| s.chart_values()[index]).collect();
        let (y_min, y_max) = value_bounds(&values);
        let color = HSLColor(index as f64 / PANELS.len() as f64, 0.65, 0.55);

        let mut builder = ChartBuilder::on(area);
        builder.margin(8).x_label_area_size(24).y_label_area_size(72);
        if index == 0 {
            builder.caption(TITLE, ("sans-serif", 24));
        }
        let mut chart = builder.build_cartesian_2d(x_min..x_max, y_min..y_max)?;

        chart
            .configure_mesh()
            .x_labels(8)
            .y_labels(4)
            .y_desc(label)
            .x_label_formatter(&|ms| date_format.label(*ms))
            .draw()?;

        chart.draw_series(LineSeries::new(
            times.iter().copied().zip(values.iter().copied()),
            color.stroke_width(2),
        ))?;
        chart.draw_series(
            times
                .iter()
                .zip(values.iter())
                .map(|(t, v)| Circle::new((*t, *v), 3, color.filled())),
        )?;
    }

    root.present()?;
    Ok(())
}

/// X range in epoch milliseconds, padded so a single sample still has width
fn time_bounds(times: &[i64]) -> (i64, i64) {
    let min = times.iter().copied().min().unwrap_or(0);
    let max = times.iter().copied().max().unwrap_or(0);
    if max - min < MINUTE_MS {
        (min - MINUTE_MS / 2, max + MINUTE_MS / 2)
    } else {
        (min, max)
    }
}

/// Y range with a 5% margin; flat series get a unit band around the value
fn value_bounds(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }

    let span = max - min;
    if span <= f64::EPSILON {
        let pad = (max.abs() * 0.1).max(1.0);
        return (min - pad, max + pad);
    }
    (min - span * 0.05, max + span * 0.05)
}

/// Tick label format chosen from the time span on the axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateFormat {
    Seconds,
    Minutes,
    DayTime,
    Month,
}

impl DateFormat {
    fn for_span(span_ms: i64) -> Self {
        if span_ms <= HOUR_MS {
            Self::Seconds
        } else if span_ms <= DAY_MS {
            Self::Minutes
        } else if span_ms <= 365 * DAY_MS {
            Self::DayTime
        } else {
            Self::Month
        }
    }

    fn pattern(&self) -> &'static str {
        match self {
            Self::Seconds => "%H:%M:%S",
            Self::Minutes => "%H:%M",
            Self::DayTime => "%b %d %H:%M",
            Self::Month => "%Y-%m",
        }
    }

    fn label(&self, ms: i64) -> String {
        match Local.timestamp_millis_opt(ms).single() {
            Some(at) => at.format(self.pattern()).to_string(),
            None => ms.to_string(),
        }
    }
}
