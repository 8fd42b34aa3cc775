//! End-to-end runs over histogram files written to a scratch directory.

use std::fs;
use std::path::Path;

use approx::assert_relative_eq;
use hist_stacker::collect;
use hist_stacker::config::{ColorConfig, ScaleConfig};
use hist_stacker::pipeline::{self, RunConfig};
use hist_stacker::stack::StackBuilder;
use hist_stacker::visuals::style::PlotStyle;
use hist_stacker::visuals::ImageFormat;

/// A one-histogram JSON store with `entries` spread evenly over 5 bins.
fn write_store(dir: &Path, file: &str, hist_name: &str, entries: f64) {
    let content = entries / 5.0;
    let text = format!(
        r#"{{"objects": [
            {{"name": "{hist_name}", "class": "TH1D", "x_title": "x",
              "bin_edges": [0, 1, 2, 3, 4, 5],
              "bin_content": [{content}, {content}, {content}, {content}, {content}]}},
            {{"name": "meta", "class": "TNamed"}}
        ]}}"#
    );
    fs::write(dir.join(file), text).unwrap();
}

fn run_config(dir: &Path, list: &str) -> RunConfig {
    RunConfig {
        input_list: dir.join(list),
        color_config: dir.join("color.txt"),
        scale_config: dir.join("scale.txt"),
        hist_config: dir.join("hist.txt"),
        output_dir: dir.join("Histograms").join("run"),
        lumi_text: "13 TeV".to_string(),
        formats: Vec::new(),
    }
}

#[test]
fn data_and_scaled_qcd_agree() {
    let dir = tempfile::tempdir().unwrap();
    write_store(dir.path(), "Data.json", "h_x", 100.0);
    write_store(dir.path(), "QCD.json", "h_x", 50.0);

    let lines = [
        dir.path().join("Data.json").display().to_string(),
        dir.path().join("QCD.json").display().to_string(),
    ];
    let samples = collect::collect_lines(lines.iter().map(String::as_str));
    let colors = ColorConfig::parse("QCD kRed + 1\n");
    let scales = ScaleConfig::parse("QCD 2.0\n");

    let plot = StackBuilder::new(&samples, &colors, &scales).build("h_x").unwrap();
    assert_relative_eq!(plot.total.integral(), 100.0);
    assert_eq!(plot.legend[0].label, "QCD (100.0)");

    let ratio = plot.ratio.as_ref().unwrap();
    for &value in ratio.contents() {
        assert_relative_eq!(value, 1.0);
    }
}

#[test]
fn report_lists_only_primary_vertex_histograms() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    for (file, entries) in [("QCD.json", 30.0), ("TTbar.json", 20.0), ("Data.json", 40.0)] {
        write_store(d, file, "h_Num_PV_reco", entries);
    }
    fs::write(
        d.join("list.txt"),
        format!(
            "{}\n{}\n\n{}\n",
            d.join("QCD.json").display(),
            d.join("TTbar.json").display(),
            d.join("Data.json").display()
        ),
    )
    .unwrap();
    fs::write(d.join("scale.txt"), "QCD 1.0\nTTbar 0.5\n").unwrap();

    let summary = pipeline::run(&run_config(d, "list.txt"), &PlotStyle::cms()).unwrap();
    assert_eq!(summary.plotted, ["h_Num_PV_reco"]);
    assert_eq!(summary.render_failures, 0);

    let report = fs::read_to_string(d.join("Histograms/run/Integral.txt")).unwrap();
    assert_eq!(
        report,
        "h_Num_PV_reco\n\nTTbar 10\nQCD 30\nMCtotal:  40\nData  40\nFrac(MC/Data)  1\n\n"
    );
}

#[test]
fn glob_lines_and_missing_configs_degrade() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    fs::create_dir(d.join("inputs")).unwrap();
    write_store(&d.join("inputs"), "QCD.json", "h_Num_PV", 10.0);
    write_store(&d.join("inputs"), "QCD.part2.json", "h_Num_PV", 5.0);
    fs::write(
        d.join("list.txt"),
        format!("{}\n/nonexistent/DY.json\n", d.join("inputs/*.json").display()),
    )
    .unwrap();

    let summary = pipeline::run(&run_config(d, "list.txt"), &PlotStyle::cms()).unwrap();
    assert_eq!(summary.plotted, ["h_Num_PV"]);

    let report = fs::read_to_string(d.join("Histograms/run/Integral.txt")).unwrap();
    assert!(report.contains("QCD 15\n"));
    assert!(!report.contains("Data"));
}

#[test]
fn missing_input_list_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = pipeline::run(&run_config(dir.path(), "absent.txt"), &PlotStyle::cms()).unwrap_err();
    assert!(matches!(err, hist_stacker::error::PipelineError::InputList { .. }));
}

#[test]
fn only_data_writes_empty_report() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    write_store(d, "Data.json", "h_Num_PV", 10.0);
    fs::write(d.join("list.txt"), format!("{}\n", d.join("Data.json").display())).unwrap();

    let summary = pipeline::run(&run_config(d, "list.txt"), &PlotStyle::cms()).unwrap();
    assert!(summary.plotted.is_empty());
    assert_eq!(fs::read_to_string(d.join("Histograms/run/Integral.txt")).unwrap(), "");
}

/// Run configuration over the inputs shipped in `demos/`, writing below `out`.
fn demo_config(out: &Path, formats: Vec<ImageFormat>) -> RunConfig {
    let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
    let list = out.join("list.txt");
    let lines: Vec<String> = ["QCD.json", "TTbar.csv", "Data.json"]
        .iter()
        .map(|f| demos.join(f).display().to_string())
        .collect();
    fs::write(&list, lines.join("\n")).unwrap();

    RunConfig {
        input_list: list,
        color_config: demos.join("color.txt"),
        scale_config: demos.join("scale.txt"),
        hist_config: demos.join("hist.txt"),
        output_dir: out.join("demo"),
        lumi_text: "13 TeV".to_string(),
        formats,
    }
}

#[test]
fn demo_inputs() {
    let out = tempfile::tempdir().unwrap();
    let summary = pipeline::run(&demo_config(out.path(), Vec::new()), &PlotStyle::cms()).unwrap();
    assert_eq!(summary.plotted, ["h_Num_PV", "h_Pt_Lead"]);
    assert!(summary.images.is_empty());

    let report = fs::read_to_string(out.path().join("demo/Integral.txt")).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines[0], "h_Num_PV");
    assert!(lines[2].starts_with("TTbar "));
    assert!(lines[3].starts_with("QCD "));
    assert!(lines[4].starts_with("MCtotal:  "));
    assert_eq!(lines[5], "Data  808");
    assert!(lines[6].starts_with("Frac(MC/Data)  "));
    assert!(!report.contains("h_Pt_Lead"));
}

#[cfg(feature = "pdf")]
#[test]
fn demo_inputs_write_pdf_and_png_per_plot() {
    let out = tempfile::tempdir().unwrap();
    let config = demo_config(out.path(), vec![ImageFormat::Pdf, ImageFormat::Png]);
    let summary = pipeline::run(&config, &PlotStyle::cms()).unwrap();
    assert_eq!(summary.render_failures, 0);
    assert_eq!(summary.images.len(), 2 * summary.plotted.len());

    for name in &summary.plotted {
        for ext in ["pdf", "png"] {
            let path = out.path().join("demo").join(format!("{name}.{ext}"));
            assert!(path.exists(), "{} missing", path.display());
            assert!(summary.images.contains(&path));
            assert!(fs::metadata(&path).unwrap().len() > 0);
        }
    }
    let pdf = fs::read(out.path().join("demo/h_Num_PV.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
    let png = fs::read(out.path().join("demo/h_Num_PV.png")).unwrap();
    assert!(png.starts_with(b"\x89PNG"));
}
