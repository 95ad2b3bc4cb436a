//! Plotters-powered fit charts written as SVG files.
//!
//! A chart is described by a render-only [`ChartSpec`]: all series inputs and
//! bounds are computed by the caller, so `render()` only draws. The same chart is
//! drawn once per [`Stage`], each stage adding one layer:
//!
//! - `raw`: observed samples
//! - `fit`: + fitted curve
//! - `best`: + dashed extremum overlay and a marker at the critical point

use std::error::Error;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::debug;

use crate::domain::{CriticalPoint, ModelKind, SampleSet, Stage};
use crate::error::CurveError;

/// Everything needed to draw one model's charts.
#[derive(Debug, Clone)]
pub struct ChartSpec<'a> {
    pub samples: &'a SampleSet,
    pub model: ModelKind,
    /// Fitted parameters; `None` if the fit failed (only `raw` is meaningful then).
    pub fitted: Option<&'a [f64]>,
    /// Extremum of the fitted curve; `None` if it is undefined.
    pub extremum: Option<CriticalPoint>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    /// Points per continuous function.
    pub curve_samples: usize,
}

/// Turns a [`ChartSpec`] into a file.
pub trait Renderer {
    /// File extension of produced charts (without the dot).
    fn extension(&self) -> &'static str;

    fn render(&self, chart: &ChartSpec<'_>, stage: Stage, path: &Path) -> Result<(), CurveError>;
}

/// `{dir}/{stage}_{model}.{ext}`
pub fn chart_path(dir: &Path, stage: Stage, model: ModelKind, ext: &str) -> PathBuf {
    dir.join(stage.file_name(model, ext))
}

/// SVG output via `plotters`' SVG backend.
#[derive(Debug, Clone, Copy)]
pub struct SvgRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

impl Renderer for SvgRenderer {
    fn extension(&self) -> &'static str {
        "svg"
    }

    fn render(&self, chart: &ChartSpec<'_>, stage: Stage, path: &Path) -> Result<(), CurveError> {
        let [x0, x1] = chart.x_bounds;
        let [y0, y1] = chart.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return Err(CurveError::Render {
                path: path.to_path_buf(),
                message: format!("invalid axis bounds x=[{x0}, {x1}] y=[{y0}, {y1}]"),
            });
        }

        draw(chart, stage, path, (self.width, self.height)).map_err(|e| CurveError::Render {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        debug!(path = %path.display(), %stage, model = %chart.model, "chart written");
        Ok(())
    }
}

fn draw(chart: &ChartSpec<'_>, stage: Stage, path: &Path, size: (u32, u32)) -> Result<(), Box<dyn Error>> {
    let [x0, x1] = chart.x_bounds;
    let [y0, y1] = chart.y_bounds;

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut ctx = ChartBuilder::on(&root)
        .margin(15)
        .caption(format!("{} ({})", chart.model, stage), ("sans-serif", 20))
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 45)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    // Background grid + axis descriptions.
    ctx.configure_mesh()
        .x_desc(chart.x_label)
        .y_desc(chart.y_label)
        .draw()?;

    let raw_color = RGBColor(0, 0, 255);
    let fit_color = RGBColor(255, 0, 0);
    let best_color = RGBColor(0, 160, 0);

    ctx.draw_series(
        chart
            .samples
            .points()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(x, y)| Circle::new((x, y), 3, raw_color.filled())),
    )?
    .label("Raw")
    .legend(move |(x, y)| Circle::new((x, y), 3, raw_color.filled()));

    if let Some(params) = chart.fitted {
        if stage.shows_fit() {
            let curve = sample_function(x0, x1, chart.curve_samples, |x| chart.model.evaluate(x, params));
            ctx.draw_series(LineSeries::new(curve, &fit_color))?
                .label("Fit")
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], fit_color));
        }

        if stage.shows_extremum() {
            // The overlay traces the value the critical-point solver reports for each x.
            let overlay = sample_function(x0, x1, chart.curve_samples, |x| {
                chart.model.critical_point(x, params).value
            });
            let label = match chart.extremum {
                Some(cp) => format!("Best: {:.2}", cp.x),
                None => "Best: undefined".to_string(),
            };
            ctx.draw_series(DashedLineSeries::new(overlay, 5, 5, best_color.stroke_width(1)))?
                .label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], best_color));

            if let Some(cp) = chart.extremum {
                if (x0..=x1).contains(&cp.x) && (y0..=y1).contains(&cp.value) {
                    ctx.draw_series(std::iter::once(Cross::new(
                        (cp.x, cp.value),
                        6,
                        best_color.stroke_width(2),
                    )))?;
                }
            }
        }
    }

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Evaluate `f` on `n` evenly spaced points of `[x0, x1]`, dropping non-finite values.
pub fn sample_function(x0: f64, x1: f64, n: usize, f: impl Fn(f64) -> f64) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            x0 + u * (x1 - x0)
        })
        .map(|x| (x, f(x)))
        .filter(|(_, y)| y.is_finite())
        .collect()
}
