//! The fixed CMS overlay: experiment name and extra text in the top left,
//! luminosity / energy text in the top right.

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontStyle;

use super::style::PlotStyle;

#[derive(Debug, Clone, PartialEq)]
pub struct CmsLabel {
    pub extra_text: String,
    pub lumi_text: String,
}

impl CmsLabel {
    pub fn new(lumi_text: impl Into<String>) -> CmsLabel {
        CmsLabel {
            extra_text: "Preliminary".to_string(),
            lumi_text: lumi_text.into(),
        }
    }
}

impl Default for CmsLabel {
    fn default() -> Self {
        CmsLabel::new("13 TeV")
    }
}

/// Pixel position of a normalized pad coordinate.
fn ndc(pad: (u32, u32), x: f64, y: f64) -> (i32, i32) {
    (
        (x * pad.0 as f64).round() as i32,
        ((1.0 - y) * pad.1 as f64).round() as i32,
    )
}

pub fn draw_cms_label<DB: DrawingBackend>(
    pad: &DrawingArea<DB, Shift>,
    label: &CmsLabel,
    style: &PlotStyle,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let dim = pad.dim_in_pixel();
    let size = |fraction: f64| fraction * dim.1 as f64;
    let baseline_left = Pos::new(HPos::Left, VPos::Bottom);

    let cms = (style.font, size(0.07))
        .into_font()
        .style(FontStyle::Bold)
        .color(&BLACK)
        .pos(baseline_left);
    pad.draw(&Text::new("CMS", ndc(dim, 0.2, 0.83), cms))?;

    if !label.extra_text.is_empty() {
        let extra = (style.font, size(0.05))
            .into_font()
            .style(FontStyle::Italic)
            .color(&BLACK)
            .pos(baseline_left);
        pad.draw(&Text::new(label.extra_text.as_str(), ndc(dim, 0.2, 0.78), extra))?;
    }

    let lumi = (style.font, size(0.05))
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Right, VPos::Bottom));
    pad.draw(&Text::new(label.lumi_text.as_str(), ndc(dim, 0.94, 0.94), lumi))?;
    Ok(())
}

#[test]
fn ndc_origin_is_bottom_left() {
    assert_eq!(ndc((1000, 500), 0.0, 0.0), (0, 500));
    assert_eq!(ndc((1000, 500), 0.94, 0.94), (940, 30));
}
