use std::process::ExitCode;

use clap::error::ErrorKind;
use hist_stacker::{cli, pipeline, visuals::style::PlotStyle};
use tracing::{error, info};

fn main() -> ExitCode {
    let arguments = match cli::cli() {
        Ok(arguments) => arguments,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(arguments.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = pipeline::RunConfig {
        input_list: arguments.input_list,
        color_config: arguments.color_config,
        scale_config: arguments.scale_config,
        hist_config: arguments.hist_config,
        output_dir: pipeline::output_dir(&arguments.output_root, &arguments.output_dir),
        lumi_text: arguments.lumi_text,
        formats: arguments.formats,
    };

    // Single style value for every plot of the run.
    let style = PlotStyle::cms();
    let result = pipeline::run(&config, &style);

    if let Some(path) = &arguments.flamegraph {
        let dumped = std::fs::File::create(path).and_then(flame::dump_html);
        if let Err(err) = dumped {
            error!("could not write flamegraph {}: {err}", path.display());
        }
    }

    match result {
        Ok(summary) => {
            info!(
                plots = summary.plotted.len(),
                images = summary.images.len(),
                failures = summary.render_failures,
                "done"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::from(1)
        }
    }
}
