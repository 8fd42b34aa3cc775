use tracing::warn;

use crate::histogram::Histogram;

/// Displayed y range of the ratio panel. Values outside stay in the
/// histogram; they are only cropped when drawn.
pub const RATIO_RANGE: (f64, f64) = (0.5, 1.5);

/// Bin-wise data / simulated total.
pub fn data_over_mc(data: &Histogram, mc_total: &Histogram) -> Option<Histogram> {
    let mut ratio = data.clone();
    ratio.name = "ratioHist".to_string();
    ratio.title.clear();
    if let Err(err) = ratio.divide(mc_total) {
        warn!("no ratio for {}: {err}", data.name);
        return None;
    }
    ratio.x_title = mc_total.x_title.clone();
    Some(ratio)
}

pub fn in_display_range(value: f64) -> bool {
    (RATIO_RANGE.0..=RATIO_RANGE.1).contains(&value)
}

#[cfg(test)]
fn hist(contents: &[f64]) -> Histogram {
    let edges = (0..=contents.len()).map(|i| i as f64).collect();
    Histogram::new("h", edges, contents.to_vec()).unwrap()
}

#[test]
fn ratio_is_binwise_where_mc_nonzero() {
    let data = hist(&[10.0, 3.0, 7.0, 0.0]);
    let mut mc = hist(&[5.0, 3.0, 0.0, 2.0]);
    mc.x_title = "m [GeV]".to_string();
    let ratio = data_over_mc(&data, &mc).unwrap();
    assert_eq!(ratio.contents(), &[2.0, 1.0, 0.0, 0.0]);
    assert_eq!(ratio.x_title, "m [GeV]");
    assert_eq!(data.contents(), &[10.0, 3.0, 7.0, 0.0]);
}

#[test]
fn ratio_keeps_out_of_range_values() {
    let ratio = data_over_mc(&hist(&[4.0]), &hist(&[1.0])).unwrap();
    assert_eq!(ratio.contents(), &[4.0]);
    assert!(!in_display_range(ratio.contents()[0]));
    assert!(in_display_range(1.0));
}

#[test]
fn mismatched_binning_gives_no_ratio() {
    assert!(data_over_mc(&hist(&[1.0]), &hist(&[1.0, 1.0])).is_none());
}
