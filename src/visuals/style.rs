//! Canvas geometry and fonts for the CMS-style stacked plots. One value is
//! built at startup and handed to every draw call.

/// A text box in normalized pad coordinates (0..1, origin bottom left).
#[derive(Debug, Clone, PartialEq)]
pub struct NdcBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotStyle {
    pub canvas: (u32, u32),
    /// Share of the canvas height given to the upper (stack) pad.
    pub upper_fraction: f64,
    pub left_margin: f64,
    pub right_margin: f64,
    pub upper_top_margin: f64,
    pub upper_bottom_margin: f64,
    pub lower_top_margin: f64,
    pub lower_bottom_margin: f64,
    pub font: &'static str,
    /// Text sizes are fractions of the pad height they are drawn in.
    pub upper_title_size: f64,
    pub upper_label_size: f64,
    pub lower_title_size: f64,
    pub lower_label_size: f64,
    pub legend: NdcBox,
    pub legend_text_size: f64,
    pub marker_radius: u32,
    /// Fill for samples without a configured color.
    pub default_fill: (u8, u8, u8),
}

impl PlotStyle {
    /// Layout of the CMS publication style.
    pub fn cms() -> PlotStyle {
        PlotStyle {
            canvas: (1200, 1200),
            upper_fraction: 0.7,
            left_margin: 0.16,
            right_margin: 0.05,
            upper_top_margin: 0.1,
            upper_bottom_margin: 0.02,
            lower_top_margin: 0.03,
            lower_bottom_margin: 0.35,
            font: "sans-serif",
            upper_title_size: 0.06,
            upper_label_size: 0.05,
            lower_title_size: 0.12,
            lower_label_size: 0.1,
            legend: NdcBox {
                x1: 0.6,
                y1: 0.45,
                x2: 0.93,
                y2: 0.88,
            },
            legend_text_size: 0.03,
            marker_radius: 5,
            default_fill: (255, 255, 255),
        }
    }

    pub fn upper_height(&self) -> u32 {
        (self.canvas.1 as f64 * self.upper_fraction).round() as u32
    }

    pub fn lower_height(&self) -> u32 {
        self.canvas.1 - self.upper_height()
    }

    /// `fraction` of `extent` pixels.
    pub fn px(fraction: f64, extent: u32) -> u32 {
        (fraction * extent as f64).round() as u32
    }
}

impl Default for PlotStyle {
    fn default() -> Self {
        PlotStyle::cms()
    }
}

#[test]
fn pads_split_the_canvas() {
    let style = PlotStyle::cms();
    assert_eq!(style.upper_height(), 840);
    assert_eq!(style.lower_height(), 360);
    assert_eq!(PlotStyle::px(style.left_margin, style.canvas.0), 192);
}
