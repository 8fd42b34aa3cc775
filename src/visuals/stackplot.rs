use plotters::coord::Shift;
use plotters::prelude::*;

use super::lumi::{draw_cms_label, CmsLabel};
use super::style::PlotStyle;
use crate::color::ColorIndex;
use crate::ratio::{in_display_range, RATIO_RANGE};
use crate::stack::{LegendMark, StackedPlot};

const DASHES: usize = 40;

fn rgb(color: ColorIndex) -> RGBColor {
    let (r, g, b) = color.rgb();
    RGBColor(r, g, b)
}

fn fill_color(fill: Option<ColorIndex>, style: &PlotStyle) -> RGBColor {
    match fill {
        Some(color) => rgb(color),
        None => {
            let (r, g, b) = style.default_fill;
            RGBColor(r, g, b)
        }
    }
}

/// Upper pad with the stack and data, lower pad with the data / MC ratio.
pub fn draw_plot<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    plot: &StackedPlot,
    style: &PlotStyle,
    label: &CmsLabel,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    let (upper, lower) = root.split_vertically(style.upper_height());

    draw_stack_pad(&upper, plot, style)?;
    draw_cms_label(&upper, label, style)?;
    if plot.ratio.is_some() {
        draw_ratio_pad(&lower, plot, style)?;
    }
    Ok(())
}

fn draw_stack_pad<DB: DrawingBackend>(
    pad: &DrawingArea<DB, Shift>,
    plot: &StackedPlot,
    style: &PlotStyle,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let (width, height) = pad.dim_in_pixel();
    let font_px = |fraction: f64| fraction * height as f64;
    let y_max = if plot.y_max.is_finite() && plot.y_max > 0.0 {
        plot.y_max
    } else {
        1.0
    };

    let mut chart = ChartBuilder::on(pad)
        .margin_top(PlotStyle::px(style.upper_top_margin, height))
        .margin_right(PlotStyle::px(style.right_margin, width))
        .margin_bottom(PlotStyle::px(style.upper_bottom_margin, height))
        .x_label_area_size(0)
        .y_label_area_size(PlotStyle::px(style.left_margin, width))
        .build_cartesian_2d(plot.total.x_min()..plot.total.x_max(), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_label_formatter(&|_| String::new())
        .y_desc("Events")
        .axis_desc_style((style.font, font_px(style.upper_title_size)))
        .label_style((style.font, font_px(style.upper_label_size)))
        .draw()?;

    let mut floor = vec![0.0; plot.total.n_bins()];
    for (layer, entry) in plot.layers.iter().zip(&plot.legend) {
        let fill = fill_color(layer.style.fill, style);
        let outline = rgb(layer.style.line).stroke_width(layer.style.line_width);
        let bars: Vec<(f64, f64, f64, f64)> = layer
            .hist
            .bins()
            .zip(floor.iter_mut())
            .map(|((low, high, content), floor)| {
                let bottom = *floor;
                *floor += content;
                (low, high, bottom, *floor)
            })
            .collect();

        chart
            .draw_series(
                bars.iter()
                    .map(|&(x0, x1, y0, y1)| Rectangle::new([(x0, y0), (x1, y1)], fill.filled())),
            )?
            .label(entry.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 8), (x + 24, y + 8)], fill.filled()));
        chart.draw_series(
            bars.iter()
                .map(|&(x0, x1, y0, y1)| Rectangle::new([(x0, y0), (x1, y1)], outline)),
        )?;
    }

    if let Some(data) = &plot.data {
        let marker = style.marker_radius;
        let points: Vec<(f64, f64, f64)> = (0..data.n_bins())
            .map(|i| (data.bin_center(i), data.contents()[i], data.bin_error(i)))
            .collect();
        chart.draw_series(points.iter().map(|&(x, y, err)| {
            ErrorBar::new_vertical(x, y - err, y, y + err, BLACK.stroke_width(2), 0)
        }))?;
        let series = chart.draw_series(
            points
                .iter()
                .map(|&(x, y, _)| Circle::new((x, y), marker, BLACK.filled())),
        )?;
        if let Some(entry) = plot.legend.iter().find(|e| e.mark == LegendMark::Marker) {
            series
                .label(entry.label.as_str())
                .legend(move |(x, y)| Circle::new((x + 12, y), marker, BLACK.filled()));
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .margin(PlotStyle::px(1.0 - style.legend.x2, width))
        .label_font((style.font, font_px(style.legend_text_size)))
        .background_style(&WHITE.mix(0.0))
        .border_style(&WHITE.mix(0.0))
        .draw()?;
    Ok(())
}

fn draw_ratio_pad<DB: DrawingBackend>(
    pad: &DrawingArea<DB, Shift>,
    plot: &StackedPlot,
    style: &PlotStyle,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let Some(ratio) = &plot.ratio else {
        return Ok(());
    };
    let (width, height) = pad.dim_in_pixel();
    let font_px = |fraction: f64| fraction * height as f64;
    let (low, high) = RATIO_RANGE;
    let (x_min, x_max) = (ratio.x_min(), ratio.x_max());

    let mut chart = ChartBuilder::on(pad)
        .margin_top(PlotStyle::px(style.lower_top_margin, height))
        .margin_right(PlotStyle::px(style.right_margin, width))
        .x_label_area_size(PlotStyle::px(style.lower_bottom_margin, height))
        .y_label_area_size(PlotStyle::px(style.left_margin, width))
        .build_cartesian_2d(x_min..x_max, low..high)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .y_labels(5)
        .y_desc("Data/MC")
        .x_desc(plot.total.x_title.as_str())
        .axis_desc_style((style.font, font_px(style.lower_title_size)))
        .label_style((style.font, font_px(style.lower_label_size)))
        .draw()?;

    let points: Vec<(f64, f64, f64)> = (0..ratio.n_bins())
        .map(|i| (ratio.bin_center(i), ratio.contents()[i], ratio.bin_error(i)))
        .filter(|&(_, y, _)| in_display_range(y))
        .collect();
    chart.draw_series(points.iter().map(|&(x, y, err)| {
        ErrorBar::new_vertical(
            x,
            (y - err).max(low),
            y,
            (y + err).min(high),
            BLACK.stroke_width(2),
            0,
        )
    }))?;
    chart.draw_series(
        points
            .iter()
            .map(|&(x, y, _)| Circle::new((x, y), style.marker_radius, BLACK.filled())),
    )?;

    let step = (x_max - x_min) / (2 * DASHES) as f64;
    chart.draw_series((0..DASHES).map(|i| {
        let start = x_min + 2.0 * step * i as f64;
        PathElement::new(vec![(start, 1.0), (start + step, 1.0)], RED.stroke_width(2))
    }))?;
    Ok(())
}
