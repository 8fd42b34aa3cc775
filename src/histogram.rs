//! One-dimensional binned histogram with the arithmetic the stacking
//! pipeline needs.

use crate::error::HistogramError;

const EDGE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub name: String,
    pub title: String,
    pub x_title: String,
    /// Bin edges, `n_bins() + 1` of them, strictly increasing.
    edges: Vec<f64>,
    contents: Vec<f64>,
    /// Sum of squared weights per bin, if the histogram tracks it.
    sumw2: Option<Vec<f64>>,
    pub underflow: f64,
    pub overflow: f64,
    pub entries: f64,
}

impl Histogram {
    pub fn new(
        name: impl Into<String>,
        edges: Vec<f64>,
        contents: Vec<f64>,
    ) -> Result<Histogram, HistogramError> {
        let name = name.into();
        let invalid = |reason: String| HistogramError::Invalid {
            name: name.clone(),
            reason,
        };
        if edges.len() < 2 {
            return Err(invalid(format!("needs at least 2 bin edges, got {}", edges.len())));
        }
        if contents.len() != edges.len() - 1 {
            return Err(invalid(format!(
                "{} bin contents for {} bins",
                contents.len(),
                edges.len() - 1
            )));
        }
        if edges.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(invalid("bin edges are not strictly increasing".to_string()));
        }
        let entries = contents.iter().sum();
        Ok(Histogram {
            name,
            title: String::new(),
            x_title: String::new(),
            edges,
            contents,
            sumw2: None,
            underflow: 0.0,
            overflow: 0.0,
            entries,
        })
    }

    /// Equal-width binning over `[low, high)`.
    pub fn uniform(
        name: impl Into<String>,
        n_bins: usize,
        low: f64,
        high: f64,
    ) -> Result<Histogram, HistogramError> {
        let width = (high - low) / n_bins.max(1) as f64;
        let edges = (0..=n_bins).map(|i| low + width * i as f64).collect();
        Histogram::new(name, edges, vec![0.0; n_bins])
    }

    pub fn with_sumw2(mut self, sumw2: Vec<f64>) -> Result<Histogram, HistogramError> {
        if sumw2.len() != self.contents.len() {
            return Err(HistogramError::Invalid {
                name: self.name,
                reason: format!("{} sumw2 values for {} bins", sumw2.len(), self.contents.len()),
            });
        }
        self.sumw2 = Some(sumw2);
        Ok(self)
    }

    pub fn n_bins(&self) -> usize {
        self.contents.len()
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn contents(&self) -> &[f64] {
        &self.contents
    }

    pub fn sumw2(&self) -> Option<&[f64]> {
        self.sumw2.as_deref()
    }

    pub fn x_min(&self) -> f64 {
        self.edges[0]
    }

    pub fn x_max(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Iterator over `(low_edge, high_edge, content)` per in-range bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.contents)
            .map(|(w, &c)| (w[0], w[1], c))
    }

    pub fn bin_center(&self, bin: usize) -> f64 {
        0.5 * (self.edges[bin] + self.edges[bin + 1])
    }

    pub fn bin_error(&self, bin: usize) -> f64 {
        match &self.sumw2 {
            Some(w2) => w2[bin].sqrt(),
            None => self.contents[bin].abs().sqrt(),
        }
    }

    /// Sum of the in-range bin contents; under- and overflow are excluded.
    pub fn integral(&self) -> f64 {
        self.contents.iter().sum()
    }

    pub fn maximum(&self) -> f64 {
        self.contents.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Same binning and labels, every content and error reset to zero.
    pub fn zeroed_clone(&self, name: impl Into<String>) -> Histogram {
        Histogram {
            name: name.into(),
            title: self.title.clone(),
            x_title: self.x_title.clone(),
            edges: self.edges.clone(),
            contents: vec![0.0; self.contents.len()],
            sumw2: self.sumw2.as_ref().map(|w| vec![0.0; w.len()]),
            underflow: 0.0,
            overflow: 0.0,
            entries: 0.0,
        }
    }

    pub fn same_binning(&self, other: &Histogram) -> bool {
        self.edges.len() == other.edges.len()
            && self
                .edges
                .iter()
                .zip(&other.edges)
                .all(|(a, b)| (a - b).abs() <= EDGE_TOLERANCE * a.abs().max(1.0))
    }

    /// Bin-by-bin sum of `other` into `self`.
    pub fn add(&mut self, other: &Histogram) -> Result<(), HistogramError> {
        if !self.same_binning(other) {
            return Err(HistogramError::Incompatible(other.name.clone()));
        }
        if self.sumw2.is_some() || other.sumw2.is_some() {
            let mine = self.squared_errors();
            let theirs = other.squared_errors();
            self.sumw2 = Some(mine.iter().zip(&theirs).map(|(a, b)| a + b).collect());
        }
        for (c, o) in self.contents.iter_mut().zip(&other.contents) {
            *c += o;
        }
        self.underflow += other.underflow;
        self.overflow += other.overflow;
        self.entries += other.entries;
        Ok(())
    }

    pub fn scale(&mut self, factor: f64) {
        self.contents.iter_mut().for_each(|c| *c *= factor);
        if let Some(w2) = &mut self.sumw2 {
            w2.iter_mut().for_each(|w| *w *= factor * factor);
        }
        self.underflow *= factor;
        self.overflow *= factor;
    }

    /// Merge groups of `factor` adjacent bins. Trailing bins that do not fill
    /// a whole group are folded into the overflow.
    pub fn rebin(&mut self, factor: usize) {
        if factor <= 1 || factor > self.n_bins() {
            return;
        }
        let groups = self.n_bins() / factor;
        let used = groups * factor;

        self.overflow += self.contents[used..].iter().sum::<f64>();
        self.contents = self.contents[..used]
            .chunks(factor)
            .map(|chunk| chunk.iter().sum())
            .collect();
        if let Some(w2) = self.sumw2.take() {
            self.sumw2 = Some(w2[..used].chunks(factor).map(|chunk| chunk.iter().sum()).collect());
        }
        self.edges = self.edges.iter().step_by(factor).take(groups + 1).copied().collect();
    }

    /// Bin-wise `self / denominator`. Bins with a zero denominator are zero.
    pub fn divide(&mut self, denominator: &Histogram) -> Result<(), HistogramError> {
        if !self.same_binning(denominator) {
            return Err(HistogramError::Incompatible(denominator.name.clone()));
        }
        let e1 = self.squared_errors();
        let e2 = denominator.squared_errors();
        let mut errors = Vec::with_capacity(self.n_bins());
        for (i, c1) in self.contents.iter_mut().enumerate() {
            let c2 = denominator.contents[i];
            if c2 == 0.0 {
                *c1 = 0.0;
                errors.push(0.0);
                continue;
            }
            let c2sq = c2 * c2;
            errors.push((*c1 * *c1 * e2[i] + c2sq * e1[i]) / (c2sq * c2sq));
            *c1 /= c2;
        }
        self.sumw2 = Some(errors);
        self.underflow = 0.0;
        self.overflow = 0.0;
        Ok(())
    }

    fn squared_errors(&self) -> Vec<f64> {
        match &self.sumw2 {
            Some(w2) => w2.clone(),
            None => self.contents.iter().map(|c| c.abs()).collect(),
        }
    }
}

#[cfg(test)]
fn filled(name: &str, contents: &[f64]) -> Histogram {
    let mut h = Histogram::uniform(name, contents.len(), 0.0, contents.len() as f64).unwrap();
    h.contents.copy_from_slice(contents);
    h
}

#[test]
fn rejects_unsorted_edges() {
    let err = Histogram::new("h", vec![0.0, 2.0, 1.0], vec![1.0, 1.0]).unwrap_err();
    assert!(matches!(err, HistogramError::Invalid { .. }));
}

#[test]
fn rejects_content_edge_mismatch() {
    assert!(Histogram::new("h", vec![0.0, 1.0], vec![1.0, 2.0]).is_err());
}

#[test]
fn integral_ignores_flows() {
    let mut h = filled("h", &[1.0, 2.0, 3.0]);
    h.underflow = 10.0;
    h.overflow = 20.0;
    assert_eq!(h.integral(), 6.0);
    assert_eq!(h.maximum(), 3.0);
}

#[test]
fn scale_multiplies_every_bin() {
    let mut h = filled("h", &[1.0, 2.5, 4.0]);
    h.scale(2.0);
    assert_eq!(h.contents(), &[2.0, 5.0, 8.0]);
}

#[test]
fn scale_squares_into_sumw2() {
    let mut h = filled("h", &[4.0]).with_sumw2(vec![4.0]).unwrap();
    h.scale(3.0);
    assert_eq!(h.sumw2(), Some(&[36.0][..]));
    assert_eq!(h.bin_error(0), 6.0);
}

#[test]
fn add_is_order_independent() {
    let a = filled("h", &[1.0, 5.0, 0.5]);
    let b = filled("h", &[2.0, 0.0, 7.25]);

    let mut ab = a.clone();
    ab.add(&b).unwrap();
    let mut ba = b.clone();
    ba.add(&a).unwrap();

    assert_eq!(ab.contents(), ba.contents());
    assert_eq!(ab.contents(), &[3.0, 5.0, 7.75]);
}

#[test]
fn add_rejects_different_binning() {
    let mut a = filled("h", &[1.0, 2.0]);
    let b = filled("h", &[1.0, 2.0, 3.0]);
    assert_eq!(a.add(&b), Err(HistogramError::Incompatible("h".to_string())));
    assert_eq!(a.contents(), &[1.0, 2.0]);
}

#[test]
fn rebin_by_one_is_noop() {
    let mut h = filled("h", &[1.0, 2.0, 3.0, 4.0]);
    let before = h.clone();
    h.rebin(1);
    assert_eq!(h, before);
}

#[test]
fn rebin_merges_adjacent_bins() {
    let mut h = filled("h", &[1.0, 2.0, 3.0, 4.0]);
    h.rebin(2);
    assert_eq!(h.n_bins(), 2);
    assert_eq!(h.contents(), &[3.0, 7.0]);
    assert_eq!(h.edges(), &[0.0, 2.0, 4.0]);
}

#[test]
fn rebin_folds_remainder_into_overflow() {
    let mut h = filled("h", &[1.0, 2.0, 3.0, 4.0, 5.0]);
    h.rebin(2);
    assert_eq!(h.contents(), &[3.0, 7.0]);
    assert_eq!(h.overflow, 5.0);
    assert_eq!(h.x_max(), 4.0);
}

#[test]
fn divide_is_binwise() {
    let mut data = filled("data", &[4.0, 9.0, 3.0]);
    let mc = filled("mc", &[2.0, 3.0, 0.0]);
    data.divide(&mc).unwrap();
    assert_eq!(data.contents(), &[2.0, 3.0, 0.0]);
    assert_eq!(data.bin_error(2), 0.0);
}

#[test]
fn zeroed_clone_keeps_binning() {
    let mut h = filled("h", &[1.0, 2.0]);
    h.x_title = "p_{T}".to_string();
    let z = h.zeroed_clone("sum");
    assert!(z.same_binning(&h));
    assert_eq!(z.integral(), 0.0);
    assert_eq!(z.x_title, "p_{T}");
    assert_eq!(z.name, "sum");
}
