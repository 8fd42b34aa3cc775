//! End-to-end run: load configs, collect histograms, then one stacked plot
//! per histogram name plus the integral report.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::collect;
use crate::config::{ColorConfig, DisplayConfig, ScaleConfig};
use crate::error::PipelineError;
use crate::report::IntegralReport;
use crate::stack::StackBuilder;
use crate::visuals::lumi::CmsLabel;
use crate::visuals::style::PlotStyle;
use crate::visuals::{self, ImageFormat};

pub const REPORT_FILE: &str = "Integral.txt";

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input_list: PathBuf,
    pub color_config: PathBuf,
    pub scale_config: PathBuf,
    pub hist_config: PathBuf,
    /// Directory receiving the images and the report; created if absent.
    pub output_dir: PathBuf,
    pub lumi_text: String,
    pub formats: Vec<ImageFormat>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    pub plotted: Vec<String>,
    pub images: Vec<PathBuf>,
    pub render_failures: usize,
}

pub fn run(config: &RunConfig, style: &PlotStyle) -> Result<RunSummary, PipelineError> {
    let _guard = flame::start_guard("run");
    info!("input file list: {}", config.input_list.display());

    let colors = ColorConfig::load(&config.color_config);
    let scales = ScaleConfig::load(&config.scale_config);
    let display_config = DisplayConfig::load(&config.hist_config);
    info!(
        colors = colors.len(),
        scales = scales.len(),
        display = display_config.len(),
        "configs loaded"
    );

    let samples = collect::collect(&config.input_list)?;
    let samples = {
        let _guard = flame::start_guard("apply display config");
        samples.map_histograms(|hist| display_config.apply(hist))
    };

    info!("output directory: {}", config.output_dir.display());
    fs::create_dir_all(&config.output_dir).map_err(|source| PipelineError::OutputDir {
        path: config.output_dir.clone(),
        source,
    })?;
    let report_path = config.output_dir.join(REPORT_FILE);
    let report_file = File::create(&report_path).map_err(|source| PipelineError::Report {
        path: report_path.clone(),
        source,
    })?;
    let mut report = IntegralReport::new(BufWriter::new(report_file));

    let names = samples.plot_names();
    if names.is_empty() {
        warn!("no simulated-sample histograms found, nothing to plot");
    }
    let skipped = samples.unplotted_names();
    if !skipped.is_empty() {
        warn!(
            "histograms missing from the first sample are not plotted: {}",
            skipped.join(", ")
        );
    }

    let builder = StackBuilder::new(&samples, &colors, &scales);
    let label = CmsLabel::new(config.lumi_text.as_str());
    let mut summary = RunSummary::default();

    for name in &names {
        let _guard = flame::start_guard(format!("plot {name}"));
        let Some(plot) = builder.build(name) else {
            continue;
        };
        report.write_plot(&plot).map_err(|source| PipelineError::Report {
            path: report_path.clone(),
            source,
        })?;

        for saved in visuals::save_plot(&config.output_dir, &plot, &config.formats, style, &label) {
            match saved {
                Ok(path) => {
                    info!("wrote {}", path.display());
                    summary.images.push(path);
                }
                Err(err) => {
                    error!("could not draw {name}: {err}");
                    summary.render_failures += 1;
                }
            }
        }
        summary.plotted.push(plot.name);
    }

    report.flush().map_err(|source| PipelineError::Report {
        path: report_path,
        source,
    })?;
    Ok(summary)
}

/// `<root>/<name>`, the per-run output directory.
pub fn output_dir(root: &Path, name: &str) -> PathBuf {
    root.join(name)
}
