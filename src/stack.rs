//! Builds one stacked plot per histogram name: styled sample layers, the
//! simulated total, the legend and the y-axis range.

use tracing::{debug, warn};

use crate::collect::SampleSet;
use crate::color::ColorIndex;
use crate::config::{ColorConfig, ScaleConfig};
use crate::histogram::Histogram;
use crate::ratio;

/// Headroom above the tallest of the simulated total and the data.
pub const Y_HEADROOM: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStyle {
    Solid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerStyle {
    /// `None` when the sample has no configured color.
    pub fill: Option<ColorIndex>,
    pub fill_style: FillStyle,
    pub line: ColorIndex,
    pub line_width: u32,
}

impl LayerStyle {
    pub fn outlined(fill: Option<ColorIndex>) -> LayerStyle {
        LayerStyle {
            fill,
            fill_style: FillStyle::Solid,
            line: ColorIndex::BLACK,
            line_width: 1,
        }
    }
}

/// One sample's contribution to the stack, scaled and styled.
#[derive(Debug, Clone)]
pub struct Layer {
    pub sample: String,
    pub hist: Histogram,
    pub style: LayerStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LegendMark {
    Fill(Option<ColorIndex>),
    Marker,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub mark: LegendMark,
}

#[derive(Debug, Clone)]
pub struct StackedPlot {
    pub name: String,
    /// Bottom layer first.
    pub layers: Vec<Layer>,
    pub total: Histogram,
    pub data: Option<Histogram>,
    pub ratio: Option<Histogram>,
    pub legend: Vec<LegendEntry>,
    pub y_max: f64,
}

impl StackedPlot {
    /// Sum of the integrals of every layer.
    pub fn mc_integral(&self) -> f64 {
        self.layers.iter().map(|layer| layer.hist.integral()).sum()
    }
}

/// Stack order: the reverse of first-seen sample order, so the last sample
/// read ends up at the bottom.
pub fn stack_order(samples: &SampleSet) -> Vec<String> {
    let mut order: Vec<String> = samples.sample_names().map(str::to_string).collect();
    order.reverse();
    order
}

/// Scale a sample histogram by its configured factor, if any.
pub fn scaled(sample: &str, mut hist: Histogram, scales: &ScaleConfig) -> Histogram {
    match scales.get(sample) {
        Some(factor) => hist.scale(factor),
        None => warn!("scale not found for sample {sample}"),
    }
    hist
}

pub fn layer_style(sample: &str, colors: &ColorConfig) -> LayerStyle {
    let fill = colors.get(sample);
    if fill.is_none() {
        warn!("color not found for sample {sample}");
    }
    LayerStyle::outlined(fill)
}

pub fn legend_label(sample: &str, integral: f64) -> String {
    format!("{sample} ({integral:.1})")
}

pub fn data_legend_label(integral: f64) -> String {
    format!("Data ({integral:.0})")
}

pub struct StackBuilder<'a> {
    samples: &'a SampleSet,
    colors: &'a ColorConfig,
    scales: &'a ScaleConfig,
    order: Vec<String>,
}

impl<'a> StackBuilder<'a> {
    pub fn new(samples: &'a SampleSet, colors: &'a ColorConfig, scales: &'a ScaleConfig) -> Self {
        StackBuilder {
            samples,
            colors,
            scales,
            order: stack_order(samples),
        }
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Build the plot for `name`, or `None` when no simulated sample has it.
    pub fn build(&self, name: &str) -> Option<StackedPlot> {
        let mut layers = Vec::with_capacity(self.order.len());
        let mut legend = Vec::with_capacity(self.order.len() + 1);
        let mut total: Option<Histogram> = None;

        for sample in &self.order {
            let Some(hist) = self.samples.get(sample, name) else {
                warn!("histogram {name} not found for sample {sample}");
                continue;
            };
            let total = total.get_or_insert_with(|| hist.zeroed_clone("mcSum"));

            let style = layer_style(sample, self.colors);
            let hist = scaled(sample, hist.clone(), self.scales);
            if let Err(err) = total.add(&hist) {
                warn!("sample {sample}: {err}, left out of the stack");
                continue;
            }

            let integral = hist.integral();
            debug!(hist = name, sample = %sample, integral, "stacked");
            legend.push(LegendEntry {
                label: legend_label(sample, integral),
                mark: LegendMark::Fill(style.fill),
            });
            layers.push(Layer {
                sample: sample.clone(),
                hist,
                style,
            });
        }

        let total = total?;
        let data = self.samples.data(name).cloned();
        let mut y_max = total.maximum();
        if let Some(data) = &data {
            legend.push(LegendEntry {
                label: data_legend_label(data.integral()),
                mark: LegendMark::Marker,
            });
            y_max = y_max.max(data.maximum());
        }
        let ratio = data.as_ref().and_then(|data| ratio::data_over_mc(data, &total));

        Some(StackedPlot {
            name: name.to_string(),
            layers,
            total,
            data,
            ratio,
            legend,
            y_max: y_max * Y_HEADROOM,
        })
    }
}

#[cfg(test)]
fn sample_set(entries: &[(&str, &[f64])]) -> SampleSet {
    let mut set = SampleSet::default();
    for (sample, contents) in entries {
        let edges = (0..=contents.len()).map(|i| i as f64).collect();
        set.insert(sample, Histogram::new("h_x", edges, contents.to_vec()).unwrap());
    }
    set
}

#[test]
fn stack_order_is_reverse_of_first_seen() {
    let set = sample_set(&[("QCD", &[1.0]), ("TTbar", &[1.0]), ("DY", &[1.0])]);
    assert_eq!(stack_order(&set), ["DY", "TTbar", "QCD"]);

    let colors = ColorConfig::default();
    let scales = ScaleConfig::default();
    let plot = StackBuilder::new(&set, &colors, &scales).build("h_x").unwrap();
    let layers: Vec<&str> = plot.layers.iter().map(|l| l.sample.as_str()).collect();
    assert_eq!(layers, ["DY", "TTbar", "QCD"]);
}

#[test]
fn layers_are_scaled_and_colored() {
    let set = sample_set(&[("QCD", &[10.0, 15.0]), ("DY", &[1.0, 2.0])]);
    let colors = ColorConfig::parse("QCD kRed + 1\n");
    let scales = ScaleConfig::parse("QCD 2.0\n");
    let plot = StackBuilder::new(&set, &colors, &scales).build("h_x").unwrap();

    let qcd = &plot.layers[1];
    assert_eq!(qcd.sample, "QCD");
    assert_eq!(qcd.hist.contents(), &[20.0, 30.0]);
    assert_eq!(qcd.style.fill, Some(ColorIndex(633)));
    assert_eq!(qcd.style.line, ColorIndex::BLACK);
    assert_eq!(qcd.style.line_width, 1);

    let dy = &plot.layers[0];
    assert_eq!(dy.hist.contents(), &[1.0, 2.0]);
    assert_eq!(dy.style.fill, None);

    assert_eq!(plot.total.contents(), &[21.0, 32.0]);
    assert_eq!(plot.mc_integral(), 53.0);
}

#[test]
fn sample_histograms_are_not_mutated() {
    let set = sample_set(&[("QCD", &[10.0])]);
    let scales = ScaleConfig::parse("QCD 3.0\n");
    let colors = ColorConfig::default();
    StackBuilder::new(&set, &colors, &scales).build("h_x").unwrap();
    assert_eq!(set.get("QCD", "h_x").unwrap().contents(), &[10.0]);
}

#[test]
fn legend_uses_scaled_integral() {
    let set = sample_set(&[("QCD", &[0.25, 0.3]), ("Data", &[1.0, 1.0])]);
    let scales = ScaleConfig::parse("QCD 2.0\n");
    let colors = ColorConfig::default();
    let plot = StackBuilder::new(&set, &colors, &scales).build("h_x").unwrap();
    assert_eq!(plot.legend[0].label, "QCD (1.1)");
    assert_eq!(plot.legend[1].label, "Data (2)");
    assert_eq!(plot.legend[1].mark, LegendMark::Marker);
}

#[test]
fn missing_sample_is_skipped() {
    let mut set = sample_set(&[("QCD", &[1.0])]);
    set.insert("TTbar", Histogram::uniform("h_other", 1, 0.0, 1.0).unwrap());
    let colors = ColorConfig::default();
    let scales = ScaleConfig::default();
    let plot = StackBuilder::new(&set, &colors, &scales).build("h_x").unwrap();
    assert_eq!(plot.layers.len(), 1);
    assert_eq!(plot.layers[0].sample, "QCD");
}

#[test]
fn y_max_has_headroom_over_data() {
    let set = sample_set(&[("QCD", &[1.0, 4.0]), ("Data", &[10.0, 2.0])]);
    let colors = ColorConfig::default();
    let scales = ScaleConfig::default();
    let plot = StackBuilder::new(&set, &colors, &scales).build("h_x").unwrap();
    assert!((plot.y_max - 12.0).abs() < 1e-12);

    let no_data = sample_set(&[("QCD", &[1.0, 5.0])]);
    let plot = StackBuilder::new(&no_data, &colors, &scales).build("h_x").unwrap();
    assert!((plot.y_max - 6.0).abs() < 1e-12);
    assert!(plot.ratio.is_none());
}

#[test]
fn unknown_name_builds_nothing() {
    let set = sample_set(&[("QCD", &[1.0])]);
    let colors = ColorConfig::default();
    let scales = ScaleConfig::default();
    assert!(StackBuilder::new(&set, &colors, &scales).build("h_nope").is_none());
}
