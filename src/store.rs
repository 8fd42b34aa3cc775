//! Histogram files: named object stores read from disk.
//!
//! Two on-disk layouts are understood, picked by file extension:
//!
//! ```text
//! .json  {"objects": [{"name": "h_x", "class": "TH1D", "bin_edges": [..], "bin_content": [..]}, ..]}
//! .csv   name,low,high,content[,error]     (one row per bin)
//! ```
//!
//! Every object is classified into a [`StoredObject`]; only
//! [`StoredObject::Histogram`] carries bins.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{HistogramError, StoreError};
use crate::histogram::Histogram;

#[derive(Debug)]
pub enum StoredObject {
    Histogram(Histogram),
    Other { name: String, class_name: String },
}

impl StoredObject {
    pub fn name(&self) -> &str {
        match self {
            StoredObject::Histogram(h) => &h.name,
            StoredObject::Other { name, .. } => name,
        }
    }

    pub fn into_histogram(self) -> Option<Histogram> {
        match self {
            StoredObject::Histogram(h) => Some(h),
            StoredObject::Other { .. } => None,
        }
    }
}

/// Read every object stored in `path`.
pub fn read_objects(path: &Path) -> Result<Vec<StoredObject>, StoreError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => read_json(&fs::read_to_string(path)?),
        Some("csv") => read_csv(fs::File::open(path)?),
        Some("root") => Err(StoreError::RootBinary(path.to_path_buf())),
        _ => Err(StoreError::Unsupported(path.to_path_buf())),
    }
}

#[derive(Deserialize)]
struct JsonStore {
    objects: Vec<JsonObject>,
}

#[derive(Deserialize)]
struct JsonObject {
    name: String,
    class: String,
    #[serde(flatten)]
    body: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct JsonHistogram {
    #[serde(default)]
    title: String,
    #[serde(default)]
    x_title: String,
    bin_edges: Vec<f64>,
    bin_content: Vec<f64>,
    #[serde(default)]
    sumw2: Option<Vec<f64>>,
    #[serde(default)]
    underflow: f64,
    #[serde(default)]
    overflow: f64,
    #[serde(default)]
    entries: Option<f64>,
}

/// One-dimensional histogram classes expose bins; `TH2*`, trees and the rest
/// do not.
fn is_histogram_class(class_name: &str) -> bool {
    class_name.starts_with("TH1")
}

pub fn read_json(text: &str) -> Result<Vec<StoredObject>, StoreError> {
    let store: JsonStore = serde_json::from_str(text)?;
    store
        .objects
        .into_iter()
        .map(|obj| -> Result<StoredObject, StoreError> {
            if !is_histogram_class(&obj.class) {
                return Ok(StoredObject::Other {
                    name: obj.name,
                    class_name: obj.class,
                });
            }
            let body: JsonHistogram = serde_json::from_value(serde_json::Value::Object(obj.body))?;
            let mut hist = Histogram::new(obj.name, body.bin_edges, body.bin_content)?;
            if let Some(sumw2) = body.sumw2 {
                hist = hist.with_sumw2(sumw2)?;
            }
            hist.title = body.title;
            hist.x_title = body.x_title;
            hist.underflow = body.underflow;
            hist.overflow = body.overflow;
            if let Some(entries) = body.entries {
                hist.entries = entries;
            }
            Ok(StoredObject::Histogram(hist))
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct CsvBin {
    name: String,
    low: f64,
    high: f64,
    content: f64,
    #[serde(default)]
    error: Option<f64>,
}

#[derive(Default)]
struct CsvHistogram {
    name: String,
    edges: Vec<f64>,
    contents: Vec<f64>,
    errors: Vec<Option<f64>>,
}

impl CsvHistogram {
    fn push(&mut self, bin: CsvBin) -> Result<(), HistogramError> {
        if let Some(&last) = self.edges.last() {
            if (last - bin.low).abs() > 1e-9 * last.abs().max(1.0) {
                return Err(HistogramError::Invalid {
                    name: bin.name,
                    reason: format!("gap between bins at {last} and {}", bin.low),
                });
            }
        } else {
            self.edges.push(bin.low);
        }
        self.edges.push(bin.high);
        self.contents.push(bin.content);
        self.errors.push(bin.error);
        Ok(())
    }

    fn finish(self) -> Result<Histogram, HistogramError> {
        let hist = Histogram::new(self.name, self.edges, self.contents)?;
        if self.errors.iter().all(Option::is_some) {
            let sumw2 = self.errors.iter().flatten().map(|e| e * e).collect();
            return hist.with_sumw2(sumw2);
        }
        Ok(hist)
    }
}

pub fn read_csv<R: std::io::Read>(reader: R) -> Result<Vec<StoredObject>, StoreError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut objects = Vec::new();
    let mut current: Option<CsvHistogram> = None;

    for result in rdr.deserialize() {
        let bin: CsvBin = result?;
        if let Some(hist) = current.as_mut().filter(|h| h.name == bin.name) {
            hist.push(bin)?;
            continue;
        }
        if let Some(done) = current.take() {
            objects.push(StoredObject::Histogram(done.finish()?));
        }
        let mut hist = CsvHistogram {
            name: bin.name.clone(),
            ..CsvHistogram::default()
        };
        hist.push(bin)?;
        current = Some(hist);
    }
    if let Some(done) = current {
        objects.push(StoredObject::Histogram(done.finish()?));
    }
    Ok(objects)
}

#[test]
fn json_store_classifies_objects() {
    let text = r#"{"objects": [
        {"name": "h_x", "class": "TH1D", "x_title": "x [GeV]",
         "bin_edges": [0, 1, 2], "bin_content": [3, 4], "entries": 7},
        {"name": "events", "class": "TTree", "branches": ["pt"]},
        {"name": "h_xy", "class": "TH2D", "bins": [[1, 2], [3, 4]]}
    ]}"#;
    let objects = read_json(text).unwrap();
    assert_eq!(objects.len(), 3);
    assert_eq!(objects[1].name(), "events");

    let names: Vec<&str> = objects.iter().map(StoredObject::name).collect();
    assert_eq!(names, ["h_x", "events", "h_xy"]);

    let hists: Vec<Histogram> = objects.into_iter().filter_map(StoredObject::into_histogram).collect();
    assert_eq!(hists.len(), 1);
    assert_eq!(hists[0].contents(), &[3.0, 4.0]);
    assert_eq!(hists[0].x_title, "x [GeV]");
    assert_eq!(hists[0].entries, 7.0);
}

#[test]
fn json_store_rejects_bad_binning() {
    let text = r#"{"objects": [{"name": "h", "class": "TH1F", "bin_edges": [0, 1], "bin_content": [1, 2]}]}"#;
    assert!(matches!(read_json(text), Err(StoreError::Histogram(_))));
}

#[test]
fn csv_store_groups_rows_by_name() {
    let text = "name,low,high,content,error\n\
                h_a,0,1,2,1\n\
                h_a,1,2,8,2\n\
                h_b,0,10,5,\n";
    let objects = read_csv(text.as_bytes()).unwrap();
    let hists: Vec<Histogram> = objects.into_iter().filter_map(StoredObject::into_histogram).collect();
    assert_eq!(hists.len(), 2);
    assert_eq!(hists[0].name, "h_a");
    assert_eq!(hists[0].edges(), &[0.0, 1.0, 2.0]);
    assert_eq!(hists[0].sumw2(), Some(&[1.0, 4.0][..]));
    assert_eq!(hists[1].sumw2(), None);
}

#[test]
fn csv_store_rejects_gaps() {
    let text = "name,low,high,content\nh,0,1,1\nh,2,3,1\n";
    assert!(read_csv(text.as_bytes()).is_err());
}

#[test]
fn unknown_extension_is_unsupported() {
    let err = read_objects(Path::new("sample.hist")).unwrap_err();
    assert!(matches!(err, StoreError::Unsupported(_)));
}

#[test]
fn root_files_get_a_dedicated_error() {
    let err = read_objects(Path::new("/data/QCD.root")).unwrap_err();
    assert!(matches!(err, StoreError::RootBinary(_)));
    assert!(err.to_string().contains("ROOT binary files are not supported"));
}
