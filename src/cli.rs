use std::path::PathBuf;

use clap::{command, value_parser, Arg, ArgAction};
use tracing::Level;

use crate::visuals::ImageFormat;

pub const DEFAULT_LUMI_TEXT: &str = "13 TeV";

#[derive(Debug)]
pub struct CliArgs {
    pub input_list: PathBuf,
    pub color_config: PathBuf,
    pub scale_config: PathBuf,
    pub hist_config: PathBuf,
    pub output_dir: String,
    pub lumi_text: String,
    pub output_root: PathBuf,
    pub formats: Vec<ImageFormat>,
    pub log_level: Level,
    pub flamegraph: Option<PathBuf>,
}

fn positional(name: &'static str, help: &'static str, index: usize) -> Arg {
    Arg::new(name).help(help).required(true).index(index)
}

pub fn cli_from<I, T>(args: I) -> Result<CliArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let arguments = command!("stackplot")
        .about("Stacks simulated-sample histograms, overlays data and draws the data/MC ratio.")
        .after_help("Histogram files are .json object stores or .csv bin tables; ROOT binary files are not read.")
        .arg(positional("input_file_list", "File listing one histogram file (or glob pattern) per line", 1))
        .arg(positional("color_config_file", "Sample colors: <sample> <kColor> + <offset>", 2))
        .arg(positional("scale_config_file", "Sample scale factors: <sample> <factor>", 3))
        .arg(positional("hist_config_file", "Display settings: <pattern> <rebin> <x-axis label>", 4))
        .arg(positional("output_dir", "Name of the output directory below the output root", 5))
        .arg(
            Arg::new("lumi_text")
                .help("Text drawn in the top right corner")
                .required(false)
                .default_value(DEFAULT_LUMI_TEXT)
                .index(6),
        )
        .arg(
            Arg::new("output_root")
                .help("Directory the output directory is created in")
                .long("output-root")
                .default_value("Histograms")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("format")
                .help("Image formats to write")
                .long("format")
                .action(ArgAction::Append)
                .value_delimiter(',')
                .value_parser(value_parser!(ImageFormat))
                .default_values(["pdf", "png"]),
        )
        .arg(
            Arg::new("log_level")
                .help("Maximum log level")
                .long("log-level")
                .default_value("info")
                .value_parser(value_parser!(Level)),
        )
        .arg(
            Arg::new("flamegraph")
                .help("Write a flamegraph of the run to this HTML file")
                .long("flamegraph")
                .short('f')
                .value_parser(value_parser!(PathBuf)),
        )
        .try_get_matches_from(args)?;

    let path = |id: &str| PathBuf::from(arguments.get_one::<String>(id).cloned().unwrap_or_default());
    let text = |id: &str| arguments.get_one::<String>(id).cloned().unwrap_or_default();

    Ok(CliArgs {
        input_list: path("input_file_list"),
        color_config: path("color_config_file"),
        scale_config: path("scale_config_file"),
        hist_config: path("hist_config_file"),
        output_dir: text("output_dir"),
        lumi_text: text("lumi_text"),
        output_root: arguments
            .get_one::<PathBuf>("output_root")
            .cloned()
            .unwrap_or_else(|| PathBuf::from("Histograms")),
        formats: arguments
            .get_many::<ImageFormat>("format")
            .map(|formats| formats.copied().collect())
            .unwrap_or_default(),
        log_level: arguments
            .get_one::<Level>("log_level")
            .copied()
            .unwrap_or(Level::INFO),
        flamegraph: arguments.get_one::<PathBuf>("flamegraph").cloned(),
    })
}

pub fn cli() -> Result<CliArgs, clap::Error> {
    cli_from(std::env::args_os())
}

#[test]
fn five_positionals_use_defaults() {
    let args = cli_from(["stackplot", "list.txt", "color.txt", "scale.txt", "hist.txt", "run1"]).unwrap();
    assert_eq!(args.input_list, PathBuf::from("list.txt"));
    assert_eq!(args.output_dir, "run1");
    assert_eq!(args.lumi_text, DEFAULT_LUMI_TEXT);
    assert_eq!(args.output_root, PathBuf::from("Histograms"));
    assert_eq!(args.formats, [ImageFormat::Pdf, ImageFormat::Png]);
    assert_eq!(args.log_level, Level::INFO);
    assert!(args.flamegraph.is_none());
}

#[test]
fn sixth_positional_is_lumi_text() {
    let args = cli_from(["stackplot", "l", "c", "s", "h", "out", "138 fb^{-1} (13 TeV)"]).unwrap();
    assert_eq!(args.lumi_text, "138 fb^{-1} (13 TeV)");
}

#[test]
fn wrong_arity_is_rejected() {
    assert!(cli_from(["stackplot", "l", "c", "s", "h"]).is_err());
    assert!(cli_from(["stackplot", "l", "c", "s", "h", "out", "lumi", "extra"]).is_err());
}

#[test]
fn help_names_the_histogram_file_formats() {
    let err = cli_from(["stackplot", "--help"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    assert!(err.to_string().contains("ROOT binary files are not read"));
}

#[test]
fn format_list_is_split() {
    let args = cli_from(["stackplot", "l", "c", "s", "h", "out", "--format", "png"]).unwrap();
    assert_eq!(args.formats, [ImageFormat::Png]);
}
