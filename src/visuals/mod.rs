//! Drawing of the stacked plots and writing them to image files.

pub mod lumi;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod stackplot;
pub mod style;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::error::RenderError;
use crate::stack::StackedPlot;
use lumi::CmsLabel;
use style::PlotStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Pdf,
    Png,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Pdf => "pdf",
            ImageFormat::Png => "png",
        }
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(ImageFormat::Pdf),
            "png" => Ok(ImageFormat::Png),
            other => Err(format!("unknown image format '{other}'")),
        }
    }
}

fn draw_err<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Draw(err.to_string())
}

pub fn save_png(
    path: &Path,
    plot: &StackedPlot,
    style: &PlotStyle,
    label: &CmsLabel,
) -> Result<(), RenderError> {
    let root = BitMapBackend::new(path, style.canvas).into_drawing_area();
    stackplot::draw_plot(&root, plot, style, label).map_err(draw_err)?;
    root.present().map_err(draw_err)?;
    Ok(())
}

pub fn render_svg(plot: &StackedPlot, style: &PlotStyle, label: &CmsLabel) -> Result<String, RenderError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, style.canvas).into_drawing_area();
        stackplot::draw_plot(&root, plot, style, label).map_err(draw_err)?;
        root.present().map_err(draw_err)?;
    }
    Ok(svg)
}

#[cfg(feature = "pdf")]
pub fn save_pdf(
    path: &Path,
    plot: &StackedPlot,
    style: &PlotStyle,
    label: &CmsLabel,
) -> Result<(), RenderError> {
    let svg = render_svg(plot, style, label)?;
    std::fs::write(path, pdf::svg_to_pdf(&svg)?)?;
    Ok(())
}

#[cfg(not(feature = "pdf"))]
pub fn save_pdf(
    path: &Path,
    plot: &StackedPlot,
    style: &PlotStyle,
    label: &CmsLabel,
) -> Result<(), RenderError> {
    let _ = (plot, style, label);
    Err(RenderError::Draw(format!(
        "{} not written: built without the `pdf` feature",
        path.display()
    )))
}

/// Write `<dir>/<plot name>.<ext>` for every requested format and return
/// the paths written.
pub fn save_plot(
    dir: &Path,
    plot: &StackedPlot,
    formats: &[ImageFormat],
    style: &PlotStyle,
    label: &CmsLabel,
) -> Vec<Result<PathBuf, RenderError>> {
    formats
        .iter()
        .map(|&format| {
            let path = dir.join(format!("{}.{}", plot.name, format.extension()));
            let saved = match format {
                ImageFormat::Pdf => save_pdf(&path, plot, style, label),
                ImageFormat::Png => save_png(&path, plot, style, label),
            };
            saved.map(|()| path)
        })
        .collect()
}

#[test]
fn image_format_from_str() {
    assert_eq!("PNG".parse::<ImageFormat>(), Ok(ImageFormat::Png));
    assert_eq!("pdf".parse::<ImageFormat>(), Ok(ImageFormat::Pdf));
    assert!("gif".parse::<ImageFormat>().is_err());
}

#[test]
fn svg_carries_legend_and_overlay_text() {
    use crate::collect::SampleSet;
    use crate::config::{ColorConfig, ScaleConfig};
    use crate::histogram::Histogram;
    use crate::stack::StackBuilder;

    let mut set = SampleSet::default();
    let hist = |contents: Vec<f64>| Histogram::new("h_x", vec![0.0, 1.0, 2.0], contents).unwrap();
    set.insert("QCD", hist(vec![4.0, 6.0]));
    set.insert("Data", hist(vec![5.0, 5.0]));
    let colors = ColorConfig::parse("QCD kRed + 1\n");
    let plot = StackBuilder::new(&set, &colors, &ScaleConfig::default())
        .build("h_x")
        .unwrap();

    let svg = render_svg(&plot, &PlotStyle::cms(), &CmsLabel::new("41.5 fb^{-1}")).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("QCD (10.0)"));
    assert!(svg.contains("Data (10)"));
    assert!(svg.contains("CMS"));
    assert!(svg.contains("Preliminary"));
}
