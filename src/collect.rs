//! Gathers histograms from the files named in an input list and sums them
//! per (sample, histogram name).

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, error, info, warn};

use crate::error::PipelineError;
use crate::histogram::Histogram;
use crate::store;

/// Reserved sample name of the observed dataset.
pub const DATA_SAMPLE: &str = "Data";

/// Histograms per simulated sample plus the observed data, in first-seen
/// order.
#[derive(Debug, Default)]
pub struct SampleSet {
    samples: IndexMap<String, IndexMap<String, Histogram>>,
    data: IndexMap<String, Histogram>,
}

impl SampleSet {
    /// Sum `hist` into the `(sample, hist.name)` slot, or take the slot if it
    /// is still empty.
    pub fn insert(&mut self, sample: &str, hist: Histogram) {
        let slots = if sample == DATA_SAMPLE {
            &mut self.data
        } else {
            self.samples.entry(sample.to_string()).or_default()
        };
        match slots.get_mut(&hist.name) {
            Some(existing) => {
                if let Err(err) = existing.add(&hist) {
                    warn!("sample {sample}: {err}, dropping this copy");
                }
            }
            None => {
                slots.insert(hist.name.clone(), hist);
            }
        }
    }

    /// Simulated sample names, first-seen first.
    pub fn sample_names(&self) -> impl Iterator<Item = &str> {
        self.samples.keys().map(String::as_str)
    }

    pub fn sample(&self, sample: &str) -> Option<&IndexMap<String, Histogram>> {
        self.samples.get(sample)
    }

    pub fn get(&self, sample: &str, hist_name: &str) -> Option<&Histogram> {
        self.samples.get(sample)?.get(hist_name)
    }

    pub fn data(&self, hist_name: &str) -> Option<&Histogram> {
        self.data.get(hist_name)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty() && self.data.is_empty()
    }

    /// Histogram names of the first-seen simulated sample; these are the
    /// names that get plotted.
    pub fn plot_names(&self) -> Vec<String> {
        self.samples
            .first()
            .map(|(_, hists)| hists.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Names present in some later sample but absent from the first one.
    pub fn unplotted_names(&self) -> Vec<String> {
        let Some((_, first)) = self.samples.first() else {
            return Vec::new();
        };
        let mut names: Vec<String> = Vec::new();
        for hists in self.samples.values().skip(1) {
            for name in hists.keys() {
                if !first.contains_key(name) && !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        names
    }

    /// Pass every histogram, data included, through `f`.
    pub fn map_histograms(self, mut f: impl FnMut(Histogram) -> Histogram) -> SampleSet {
        let mut map_all = |hists: IndexMap<String, Histogram>| -> IndexMap<String, Histogram> {
            hists.into_iter().map(|(name, h)| (name, f(h))).collect()
        };
        let samples = self
            .samples
            .into_iter()
            .map(|(sample, hists)| (sample, map_all(hists)))
            .collect();
        let data = map_all(self.data);
        SampleSet { samples, data }
    }
}

/// Sample name of a histogram file: the base name up to its first `.`.
pub fn sample_name(path: &str) -> &str {
    let base = path.rsplit(['/', std::path::MAIN_SEPARATOR]).next().unwrap_or(path);
    base.split('.').next().unwrap_or(base)
}

fn is_glob(line: &str) -> bool {
    line.contains(['*', '?', '['])
}

/// Expand one input-list line into the paths it names.
fn expand_line(line: &str) -> Vec<PathBuf> {
    if !is_glob(line) {
        return vec![PathBuf::from(line)];
    }
    let paths = match glob::glob(line) {
        Ok(paths) => paths,
        Err(err) => {
            error!("invalid pattern {line}: {err}");
            return Vec::new();
        }
    };
    let expanded: Vec<PathBuf> = paths
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(err) => {
                error!("could not read {:?}: {err}", err.path());
                None
            }
        })
        .collect();
    if expanded.is_empty() {
        warn!("pattern {line} matched no files");
    }
    expanded
}

/// Read every histogram of one file into `set`. Unreadable files are logged
/// and skipped.
pub fn collect_file(set: &mut SampleSet, path: &Path) {
    let path_str = path.to_string_lossy();
    let sample = sample_name(&path_str);
    let objects = match store::read_objects(path) {
        Ok(objects) => objects,
        Err(err) => {
            error!("could not open file {}: {err}", path.display());
            return;
        }
    };
    debug!(sample, file = %path.display(), objects = objects.len(), "read histogram file");
    for object in objects {
        let name = object.name().to_string();
        match object.into_histogram() {
            Some(hist) => set.insert(sample, hist),
            None => debug!("skipping non-histogram object {name} in {}", path.display()),
        }
    }
}

/// Collect every file listed (one path or glob pattern per line) in
/// `list_path`.
pub fn collect(list_path: &Path) -> Result<SampleSet, PipelineError> {
    let _guard = flame::start_guard("collect");
    let list = fs::read_to_string(list_path).map_err(|source| PipelineError::InputList {
        path: list_path.to_path_buf(),
        source,
    })?;
    Ok(collect_lines(list.lines()))
}

pub fn collect_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> SampleSet {
    let mut set = SampleSet::default();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        info!("input: {line}");
        for path in expand_line(line) {
            collect_file(&mut set, &path);
        }
    }
    set
}

#[cfg(test)]
fn hist(name: &str, contents: &[f64]) -> Histogram {
    let edges = (0..=contents.len()).map(|i| i as f64).collect();
    Histogram::new(name, edges, contents.to_vec()).unwrap()
}

#[test]
fn sample_name_strips_path_and_extensions() {
    assert_eq!(sample_name("/data/run2/QCD.root"), "QCD");
    assert_eq!(sample_name("TTbar.v2.json"), "TTbar");
    assert_eq!(sample_name("Data"), "Data");
    assert_eq!(sample_name("dir.d/DY_M50.csv"), "DY_M50");
}

#[test]
fn duplicates_are_summed() {
    let mut set = SampleSet::default();
    set.insert("QCD", hist("h_x", &[1.0, 2.0]));
    set.insert("QCD", hist("h_x", &[3.0, 4.0]));
    set.insert("QCD", hist("h_y", &[1.0]));
    assert_eq!(set.get("QCD", "h_x").unwrap().contents(), &[4.0, 6.0]);
    assert_eq!(set.get("QCD", "h_y").unwrap().contents(), &[1.0]);
}

#[test]
fn data_is_kept_apart() {
    let mut set = SampleSet::default();
    set.insert("Data", hist("h_x", &[5.0]));
    set.insert("Data", hist("h_x", &[5.0]));
    set.insert("QCD", hist("h_x", &[1.0]));
    assert_eq!(set.sample_names().collect::<Vec<_>>(), ["QCD"]);
    assert_eq!(set.data("h_x").unwrap().integral(), 10.0);
}

#[test]
fn incompatible_duplicate_is_dropped() {
    let mut set = SampleSet::default();
    set.insert("QCD", hist("h_x", &[1.0, 2.0]));
    set.insert("QCD", hist("h_x", &[1.0, 2.0, 3.0]));
    assert_eq!(set.get("QCD", "h_x").unwrap().contents(), &[1.0, 2.0]);
}

#[test]
fn samples_keep_first_seen_order() {
    let mut set = SampleSet::default();
    for sample in ["QCD", "TTbar", "DY", "QCD"] {
        set.insert(sample, hist("h_x", &[1.0]));
    }
    assert_eq!(set.sample_names().collect::<Vec<_>>(), ["QCD", "TTbar", "DY"]);
}

#[test]
fn plot_names_come_from_first_sample() {
    let mut set = SampleSet::default();
    set.insert("QCD", hist("h_a", &[1.0]));
    set.insert("TTbar", hist("h_a", &[1.0]));
    set.insert("TTbar", hist("h_b", &[1.0]));
    assert_eq!(set.plot_names(), ["h_a"]);
    assert_eq!(set.unplotted_names(), ["h_b"]);
}

#[test]
fn map_histograms_reaches_data() {
    let mut set = SampleSet::default();
    set.insert("Data", hist("h_x", &[1.0]));
    set.insert("QCD", hist("h_x", &[1.0]));
    let set = set.map_histograms(|mut h| {
        h.scale(3.0);
        h
    });
    assert_eq!(set.data("h_x").unwrap().integral(), 3.0);
    assert_eq!(set.get("QCD", "h_x").unwrap().integral(), 3.0);
}

#[test]
fn missing_list_is_fatal() {
    let err = collect(Path::new("/nonexistent/list.txt")).unwrap_err();
    assert!(matches!(err, PipelineError::InputList { .. }));
}

#[test]
fn unreadable_entries_are_skipped() {
    let set = collect_lines(["/nonexistent/QCD.json", "", "  "]);
    assert!(set.is_empty());
}
