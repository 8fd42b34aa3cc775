//! `Integral.txt`: per-sample integrals of the primary-vertex histograms.

use std::io::{self, Write};

use crate::stack::StackedPlot;

/// Only histogram names containing this go into the report.
pub const REPORT_FILTER: &str = "h_Num_PV";

pub fn is_reported(hist_name: &str) -> bool {
    hist_name.contains(REPORT_FILTER)
}

pub struct IntegralReport<W: Write> {
    out: W,
}

impl<W: Write> IntegralReport<W> {
    pub fn new(out: W) -> Self {
        IntegralReport { out }
    }

    /// Append the block for `plot`; histograms outside the filter are
    /// ignored.
    pub fn write_plot(&mut self, plot: &StackedPlot) -> io::Result<()> {
        if !is_reported(&plot.name) {
            return Ok(());
        }
        writeln!(self.out, "{}", plot.name)?;
        writeln!(self.out)?;

        let mut mc_total = 0.0;
        for layer in &plot.layers {
            let integral = layer.hist.integral();
            mc_total += integral;
            writeln!(self.out, "{} {}", layer.sample, integral)?;
        }
        writeln!(self.out, "MCtotal:  {mc_total}")?;

        if let Some(data) = &plot.data {
            let data_integral = data.integral();
            writeln!(self.out, "Data  {data_integral}")?;
            writeln!(self.out, "Frac(MC/Data)  {}", mc_total / data_integral)?;
        }
        writeln!(self.out)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
fn plot_named(name: &str, with_data: bool) -> StackedPlot {
    use crate::collect::SampleSet;
    use crate::config::{ColorConfig, ScaleConfig};
    use crate::histogram::Histogram;
    use crate::stack::StackBuilder;

    let mut set = SampleSet::default();
    for (sample, content) in [("QCD", 30.0), ("DY", 10.0)] {
        set.insert(sample, Histogram::new(name, vec![0.0, 1.0], vec![content]).unwrap());
    }
    if with_data {
        set.insert("Data", Histogram::new(name, vec![0.0, 1.0], vec![50.0]).unwrap());
    }
    let scales = ScaleConfig::parse("QCD 1.0\nDY 2.0\n");
    StackBuilder::new(&set, &ColorConfig::default(), &scales)
        .build(name)
        .unwrap()
}

#[test]
fn writes_block_for_reported_histograms() {
    let mut report = IntegralReport::new(Vec::new());
    report.write_plot(&plot_named("h_Num_PV_reco", true)).unwrap();
    let text = String::from_utf8(report.into_inner()).unwrap();
    assert_eq!(
        text,
        "h_Num_PV_reco\n\nDY 20\nQCD 30\nMCtotal:  50\nData  50\nFrac(MC/Data)  1\n\n"
    );
}

#[test]
fn skips_other_histograms() {
    let mut report = IntegralReport::new(Vec::new());
    report.write_plot(&plot_named("h_Pt_Lead", true)).unwrap();
    assert!(report.into_inner().is_empty());
}

#[test]
fn no_data_lines_without_data() {
    let mut report = IntegralReport::new(Vec::new());
    report.write_plot(&plot_named("h_Num_PV", false)).unwrap();
    let text = String::from_utf8(report.into_inner()).unwrap();
    assert!(text.contains("MCtotal:  50\n"));
    assert!(!text.contains("Data"));
    assert!(text.ends_with("\n\n"));
}
