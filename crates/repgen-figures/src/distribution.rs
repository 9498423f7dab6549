//! Reference-population distribution plots.
//!
//! Each plot shows the prevalence-weighted score density of a healthy and
//! an affected reference group, with the patient's own score marked on the
//! same axis.

use std::f64::consts::PI;
use std::io::Cursor;
use std::sync::OnceLock;

use image::{ImageFormat, RgbImage};
use plotters::prelude::*;
use plotters::style::{FontStyle, FontTransform, register_font};
use serde::{Deserialize, Serialize};
use tracing::debug;

use repgen_core::models::template::Language;

use crate::error::FigureError;
use crate::fonts::BUILTIN_FONT;

const FONT_FAMILY: &str = "sans-serif";
const GRID_POINTS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSettings {
    /// Kernel bandwidth as a factor of the sample standard deviation.
    pub bandwidth: f64,
    /// Axis limits are rounded outwards to a multiple of this step.
    pub round_to: f64,
    pub lower_percentile: f64,
    pub upper_percentile: f64,
    pub width_px: u32,
    pub height_px: u32,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            bandwidth: 0.5,
            round_to: 0.5,
            lower_percentile: 4.0,
            upper_percentile: 96.0,
            width_px: 1600,
            height_px: 1200,
        }
    }
}

/// One model's reference data and the patient's score.
#[derive(Debug, Clone)]
pub struct DistributionPlot<'a> {
    pub model: &'a str,
    pub healthy: &'a [f64],
    pub affected: &'a [f64],
    pub healthy_share: f64,
    pub affected_share: f64,
    /// Drop values outside the percentile band before estimating density.
    pub trim_outliers: bool,
    pub patient_score: f64,
    pub lang: Language,
}

struct Labels {
    healthy: &'static str,
    x_axis: &'static str,
    y_axis: &'static str,
    title: &'static str,
    title_pt: f64,
    marker: &'static str,
    /// Height of the marker label as a share of the y range.
    marker_height: f64,
}

impl Labels {
    fn for_language(lang: Language) -> Self {
        match lang {
            Language::De => Labels {
                healthy: "Gesund",
                x_axis: "Proteom-Score",
                y_axis: "Häufigkeit",
                title: "Verteilung der Proteom-Scores",
                title_pt: 18.0,
                marker: "Aktueller Score",
                marker_height: 0.80,
            },
            Language::En => Labels {
                healthy: "Healthy",
                x_axis: "Proteom Score",
                y_axis: "Frequency",
                title: "Distribution of Proteom Scores",
                title_pt: 16.0,
                marker: "Actual Score",
                marker_height: 0.85,
            },
        }
    }
}

/// Gaussian kernel density estimate over a one-dimensional sample.
#[derive(Debug, Clone)]
pub struct Kde {
    sample: Vec<f64>,
    bandwidth: f64,
}

impl Kde {
    /// `None` for an empty sample. A single value or a sample without
    /// spread gets a tiny bandwidth instead of a degenerate one.
    pub fn new(sample: &[f64], factor: f64) -> Option<Self> {
        if sample.is_empty() {
            return None;
        }
        let spread = std_dev(sample).max(1e-6);
        Some(Self {
            sample: sample.to_vec(),
            bandwidth: spread * factor,
        })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn density(&self, x: f64) -> f64 {
        let norm = self.sample.len() as f64 * self.bandwidth * (2.0 * PI).sqrt();
        let sum: f64 = self
            .sample
            .iter()
            .map(|xi| {
                let z = (x - xi) / self.bandwidth;
                (-0.5 * z * z).exp()
            })
            .sum();
        sum / norm
    }
}

/// Sample standard deviation (n - 1 in the denominator); 0 below two values.
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    var.sqrt()
}

/// Percentile with linear interpolation between closest ranks.
pub fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64))
}

/// Values inside the `[lower, upper]` percentile band, inclusive.
pub fn trim_outliers(values: &[f64], lower: f64, upper: f64) -> Vec<f64> {
    match (percentile(values, lower), percentile(values, upper)) {
        (Some(lo), Some(hi)) => values
            .iter()
            .copied()
            .filter(|v| *v >= lo && *v <= hi)
            .collect(),
        _ => Vec::new(),
    }
}

/// Smallest range of `step` multiples that covers every value.
pub fn axis_range(values: &[f64], step: f64) -> Option<(f64, f64)> {
    let min = values.iter().copied().reduce(f64::min)?;
    let max = values.iter().copied().reduce(f64::max)?;
    let lo = (min / step).floor() * step;
    let mut hi = (max / step).ceil() * step;
    if hi <= lo {
        hi = lo + step;
    }
    Some((lo, hi))
}

/// Distance between labelled ticks: `step`, widened so that there are at
/// most about ten of them.
pub fn tick_spacing(range: f64, step: f64) -> f64 {
    if range / step <= 10.0 {
        return step;
    }
    let widened = ((range / 10.0) * 2.0).round_ties_even() / 2.0;
    if widened > 0.0 { widened } else { step }
}

struct Curves {
    x_min: f64,
    x_max: f64,
    y_top: f64,
    ticks: usize,
    healthy: Vec<(f64, f64)>,
    affected: Vec<(f64, f64)>,
}

fn curves(plot: &DistributionPlot<'_>, settings: &PlotSettings) -> Result<Curves, FigureError> {
    let empty = |group: &str| FigureError::EmptyReference {
        model: plot.model.to_string(),
        group: group.to_string(),
    };

    let raw: Vec<f64> = plot.healthy.iter().chain(plot.affected).copied().collect();
    let (x_min, x_max) = axis_range(&raw, settings.round_to).ok_or_else(|| empty("any"))?;

    let (healthy, affected) = if plot.trim_outliers {
        (
            trim_outliers(plot.healthy, settings.lower_percentile, settings.upper_percentile),
            trim_outliers(plot.affected, settings.lower_percentile, settings.upper_percentile),
        )
    } else {
        (plot.healthy.to_vec(), plot.affected.to_vec())
    };

    let kde_healthy = Kde::new(&healthy, settings.bandwidth).ok_or_else(|| empty("healthy"))?;
    let kde_affected = Kde::new(&affected, settings.bandwidth).ok_or_else(|| empty("affected"))?;

    let step = (x_max - x_min) / (GRID_POINTS - 1) as f64;
    let grid = (0..GRID_POINTS).map(|i| x_min + step * i as f64);
    let healthy: Vec<(f64, f64)> = grid
        .clone()
        .map(|x| (x, kde_healthy.density(x) * plot.healthy_share))
        .collect();
    let affected: Vec<(f64, f64)> = grid
        .map(|x| (x, kde_affected.density(x) * plot.affected_share))
        .collect();

    let peak = healthy
        .iter()
        .chain(&affected)
        .map(|(_, y)| *y)
        .fold(0.0, f64::max);
    let y_top = if peak > 0.0 { peak * 1.05 } else { 1.0 };

    let spacing = tick_spacing(x_max - x_min, settings.round_to);
    let ticks = ((x_max - x_min) / spacing).round() as usize + 1;

    Ok(Curves {
        x_min,
        x_max,
        y_top,
        ticks,
        healthy,
        affected,
    })
}

/// The plot font is the built-in one, registered with plotters once.
fn register_plot_font() -> Result<(), FigureError> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let ok = *REGISTERED
        .get_or_init(|| register_font(FONT_FAMILY, FontStyle::Normal, BUILTIN_FONT).is_ok());
    if ok {
        Ok(())
    } else {
        Err(FigureError::InvalidFont {
            path: "built-in DejaVuSans.ttf".to_string(),
        })
    }
}

/// Render the plot and return PNG bytes.
pub fn render_distribution(
    plot: &DistributionPlot<'_>,
    settings: &PlotSettings,
) -> Result<Vec<u8>, FigureError> {
    register_plot_font()?;
    let curves = curves(plot, settings)?;
    let plot_err = |reason: String| FigureError::Plot {
        model: plot.model.to_string(),
        reason,
    };

    let (width, height) = (settings.width_px, settings.height_px);
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    draw_chart(&mut buffer, plot, &curves, settings).map_err(plot_err)?;

    let img = RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| plot_err("pixel buffer does not match the plot size".to_string()))?;
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| plot_err(e.to_string()))?;

    debug!(
        model = plot.model,
        lang = %plot.lang,
        x_min = curves.x_min,
        x_max = curves.x_max,
        "distribution plot rendered"
    );
    Ok(png)
}

fn draw_chart(
    buffer: &mut [u8],
    plot: &DistributionPlot<'_>,
    curves: &Curves,
    settings: &PlotSettings,
) -> Result<(), String> {
    let labels = Labels::for_language(plot.lang);
    // Sizes are given in points for an 8 x 6 inch figure.
    let dpi = settings.height_px as f64 / 6.0;
    let pt = |points: f64| points * dpi / 72.0;
    let stroke = |points: f64| pt(points).round().max(1.0) as u32;

    let root = BitMapBackend::with_buffer(buffer, (settings.width_px, settings.height_px))
        .into_drawing_area();
    root.fill(&WHITE).map_err(|e| e.to_string())?;

    let mut chart = ChartBuilder::on(&root)
        .margin(stroke(12.0))
        .caption(labels.title, (FONT_FAMILY, pt(labels.title_pt)))
        .x_label_area_size(stroke(44.0))
        .y_label_area_size(stroke(60.0))
        .build_cartesian_2d(curves.x_min..curves.x_max, 0f64..curves.y_top)
        .map_err(|e| e.to_string())?;

    chart
        .configure_mesh()
        .x_labels(curves.ticks)
        .x_label_formatter(&|x: &f64| format!("{x:.1}"))
        .y_label_formatter(&|y: &f64| format!("{y:.2}"))
        .x_desc(labels.x_axis)
        .y_desc(labels.y_axis)
        .label_style((FONT_FAMILY, pt(14.0)))
        .axis_desc_style((FONT_FAMILY, pt(16.0)))
        .draw()
        .map_err(|e| e.to_string())?;

    let line = stroke(3.0);
    let legend_len = stroke(20.0) as i32;
    for (points, color, label) in [
        (&curves.healthy, GREEN, labels.healthy),
        (&curves.affected, RED, plot.model),
    ] {
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(line)))
            .map_err(|e| e.to_string())?
            .label(label)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + legend_len, y)], color.stroke_width(line))
            });
    }

    let score = plot.patient_score;
    if (curves.x_min..=curves.x_max).contains(&score) {
        // Dashed marker: 20 dashes with equal gaps up the full height.
        let dash = curves.y_top / 40.0;
        let marker = BLUE.stroke_width(stroke(3.5));
        chart
            .draw_series((0..20).map(|i| {
                let y0 = 2.0 * dash * i as f64;
                PathElement::new(vec![(score, y0), (score, y0 + dash)], marker)
            }))
            .map_err(|e| e.to_string())?;

        let label_style = (FONT_FAMILY, pt(14.0))
            .into_font()
            .transform(FontTransform::Rotate270)
            .color(&BLUE);
        let label_x = score - 0.05 * (curves.x_max - curves.x_min);
        chart
            .draw_series(std::iter::once(Text::new(
                labels.marker.to_string(),
                (label_x, curves.y_top * labels.marker_height),
                label_style,
            )))
            .map_err(|e| e.to_string())?;
    } else {
        debug!(
            model = plot.model,
            score, "patient score outside the reference range, not marked"
        );
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font((FONT_FAMILY, pt(14.0)))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| e.to_string())?;

    root.present().map_err(|e| e.to_string())?;
    Ok(())
}
