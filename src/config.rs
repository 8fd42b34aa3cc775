//! Line-oriented config files: sample colors, sample scale factors and
//! per-histogram display settings.
//!
//! A missing or unreadable file is never fatal: the loader logs it and hands
//! back an empty config. Malformed lines are logged and skipped.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, error, warn};

use crate::color::{BaseHue, ColorIndex};
use crate::error::{ConfigError, LineError};
use crate::histogram::Histogram;

fn read_config(kind: &'static str, path: &Path) -> Option<String> {
    let _guard = flame::start_guard(format!("load {kind} config"));
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(source) => {
            let err = ConfigError {
                kind,
                path: path.to_path_buf(),
                source,
            };
            error!("{err}");
            None
        }
    }
}

fn parse_lines<T>(
    kind: &str,
    text: &str,
    mut parse: impl FnMut(&str) -> Result<T, LineError>,
    mut insert: impl FnMut(T),
) {
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match parse(line) {
            Ok(entry) => insert(entry),
            Err(err) => warn!("invalid format in {kind} config file ({err}): {line}"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ColorConfig {
    colors: HashMap<String, ColorIndex>,
}

impl ColorConfig {
    pub fn load(path: &Path) -> ColorConfig {
        read_config("color", path)
            .map(|text| ColorConfig::parse(&text))
            .unwrap_or_default()
    }

    pub fn parse(text: &str) -> ColorConfig {
        let mut config = ColorConfig::default();
        parse_lines("color", text, parse_color_line, |(sample, color)| {
            debug!(%sample, %color, "color entry");
            config.colors.insert(sample, color);
        });
        config
    }

    pub fn get(&self, sample: &str) -> Option<ColorIndex> {
        self.colors.get(sample).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// `<sample> <colorName> + <offset>`. The `+` may also be glued to the
/// offset (`kRed +2`).
pub fn parse_color_line(line: &str) -> Result<(String, ColorIndex), LineError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let (sample, color_name, offset) = match fields.as_slice() {
        [sample, color_name, "+", offset] => (*sample, *color_name, *offset),
        [sample, color_name, glued] => match glued.strip_prefix('+') {
            Some(offset) if !offset.is_empty() => (*sample, *color_name, offset),
            _ => return Err(LineError::MissingPlus),
        },
        [_, _, _, _] => return Err(LineError::MissingPlus),
        _ => {
            return Err(LineError::FieldCount {
                expected: 4,
                found: fields.len(),
            })
        }
    };
    let offset: i32 = offset
        .parse()
        .map_err(|_| LineError::Int(offset.to_string()))?;
    let color = match BaseHue::from_keyword(color_name) {
        Some(hue) => ColorIndex::from_hue(hue, offset).ok_or(LineError::OffsetRange(offset))?,
        None => ColorIndex::BLACK,
    };
    Ok((sample.to_string(), color))
}

#[derive(Debug, Clone, Default)]
pub struct ScaleConfig {
    factors: HashMap<String, f64>,
}

impl ScaleConfig {
    pub fn load(path: &Path) -> ScaleConfig {
        read_config("scale", path)
            .map(|text| ScaleConfig::parse(&text))
            .unwrap_or_default()
    }

    pub fn parse(text: &str) -> ScaleConfig {
        let mut config = ScaleConfig::default();
        parse_lines("scale", text, parse_scale_line, |(sample, factor)| {
            debug!(%sample, factor, "scale entry");
            config.factors.insert(sample, factor);
        });
        config
    }

    pub fn get(&self, sample: &str) -> Option<f64> {
        self.factors.get(sample).copied()
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

/// `<sample> <factor>`; anything after the factor is ignored.
pub fn parse_scale_line(line: &str) -> Result<(String, f64), LineError> {
    let mut fields = line.split_whitespace();
    let (Some(sample), Some(value)) = (fields.next(), fields.next()) else {
        return Err(LineError::FieldCount {
            expected: 2,
            found: line.split_whitespace().count(),
        });
    };
    let factor: f64 = value
        .parse()
        .map_err(|_| LineError::Float(value.to_string()))?;
    Ok((sample.to_string(), factor))
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    pub rebin: i32,
    pub x_title: String,
}

/// Display settings keyed by histogram-name substring; the first pattern (in
/// file order) contained in a name wins.
#[derive(Debug, Clone, Default)]
pub struct DisplayConfig {
    patterns: IndexMap<String, DisplaySettings>,
}

impl DisplayConfig {
    pub fn load(path: &Path) -> DisplayConfig {
        read_config("histogram", path)
            .map(|text| DisplayConfig::parse(&text))
            .unwrap_or_default()
    }

    pub fn parse(text: &str) -> DisplayConfig {
        let mut config = DisplayConfig::default();
        parse_lines("histogram", text, parse_display_line, |(pattern, settings)| {
            debug!(%pattern, rebin = settings.rebin, x_title = %settings.x_title, "display entry");
            config.patterns.insert(pattern, settings);
        });
        config
    }

    pub fn lookup(&self, hist_name: &str) -> Option<(&str, &DisplaySettings)> {
        self.patterns
            .iter()
            .find(|(pattern, _)| hist_name.contains(pattern.as_str()))
            .map(|(pattern, settings)| (pattern.as_str(), settings))
    }

    /// Rebin and relabel `hist` with the first matching settings.
    pub fn apply(&self, mut hist: Histogram) -> Histogram {
        let Some((pattern, settings)) = self.lookup(&hist.name) else {
            return hist;
        };
        debug!(
            hist = %hist.name,
            pattern,
            rebin = settings.rebin,
            x_title = %settings.x_title,
            "applying display config"
        );
        if settings.rebin > 1 {
            hist.rebin(settings.rebin as usize);
        }
        if !settings.x_title.is_empty() {
            hist.x_title = settings.x_title.clone();
        }
        hist
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// `<pattern> <rebin> <label...>`, with `//` starting a trailing comment in
/// the label.
pub fn parse_display_line(line: &str) -> Result<(String, DisplaySettings), LineError> {
    let (pattern, rest) = split_field(line);
    let (rebin, rest) = split_field(rest);
    if pattern.is_empty() || rebin.is_empty() {
        return Err(LineError::FieldCount {
            expected: 2,
            found: line.split_whitespace().count(),
        });
    }
    let rebin: i32 = rebin.parse().map_err(|_| LineError::Int(rebin.to_string()))?;

    let mut label = rest.trim_start_matches([' ', '\t']);
    if let Some(comment) = label.find("//") {
        label = &label[..comment];
    }
    let label = label.trim_end();

    Ok((
        pattern.to_string(),
        DisplaySettings {
            rebin,
            x_title: unescape_label(label),
        },
    ))
}

fn split_field(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    (&s[..end], &s[end..])
}

/// `\\` becomes a single space; every other backslash sequence is left for
/// the label renderer.
pub fn unescape_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut chars = label.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'\\') {
            chars.next();
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out
}

#[test]
fn color_line_adds_offset() {
    let (sample, color) = parse_color_line("QCD kRed + 1").unwrap();
    assert_eq!(sample, "QCD");
    assert_eq!(color, ColorIndex(633));
}

#[test]
fn color_line_negative_offset() {
    let (_, color) = parse_color_line("TTbar  kAzure + -2").unwrap();
    assert_eq!(color, ColorIndex(858));
}

#[test]
fn unknown_color_falls_back_to_black() {
    let (_, color) = parse_color_line("WJets kCyan + 3").unwrap();
    assert_eq!(color, ColorIndex::BLACK);
}

#[test]
fn invalid_color_lines_are_rejected() {
    assert_eq!(parse_color_line("QCD kRed - 1"), Err(LineError::MissingPlus));
    assert_eq!(parse_color_line("QCD kRed 1"), Err(LineError::MissingPlus));
    assert_eq!(parse_color_line("QCD kRed + x"), Err(LineError::Int("x".to_string())));
    assert!(matches!(
        parse_color_line("QCD kRed"),
        Err(LineError::FieldCount { .. })
    ));
}

#[test]
fn color_offset_overflow_is_rejected() {
    assert_eq!(
        parse_color_line("QCD kAzure + 2147483647"),
        Err(LineError::OffsetRange(i32::MAX))
    );
    let (_, color) = parse_color_line("QCD kRed + -2147483648").unwrap();
    assert_eq!(color.rgb(), (0, 0, 0));

    let config = ColorConfig::parse("QCD kAzure + 2147483647
DY kRed + 1
");
    assert_eq!(config.get("QCD"), None);
    assert_eq!(config.get("DY"), Some(ColorIndex(633)));
}

#[test]
fn color_config_skips_bad_lines_and_last_write_wins() {
    let config = ColorConfig::parse("QCD kRed + 1\nbroken line\n\nDY kGreen + 0\nQCD kBlue + 2\n");
    assert_eq!(config.len(), 2);
    assert_eq!(config.get("QCD"), Some(ColorIndex(602)));
    assert_eq!(config.get("DY"), Some(ColorIndex(416)));
    assert_eq!(config.get("Data"), None);
}

#[test]
fn scale_lines() {
    assert_eq!(parse_scale_line("QCD 2.0").unwrap(), ("QCD".to_string(), 2.0));
    assert_eq!(parse_scale_line("TT 1e-3").unwrap().1, 1e-3);
    assert_eq!(parse_scale_line("QCD two"), Err(LineError::Float("two".to_string())));
    assert!(parse_scale_line("QCD").is_err());
}

#[test]
fn scale_config_missing_sample_is_none() {
    let config = ScaleConfig::parse("QCD 2.0\nbad\n");
    assert_eq!(config.get("QCD"), Some(2.0));
    assert_eq!(config.get("DY"), None);
}

#[test]
fn display_line_strips_comment_and_unescapes() {
    let (pattern, settings) =
        parse_display_line(r"h_Pt 2   p_{T}\\[GeV]   // leading jet").unwrap();
    assert_eq!(pattern, "h_Pt");
    assert_eq!(settings.rebin, 2);
    assert_eq!(settings.x_title, "p_{T} [GeV]");
}

#[test]
fn display_line_keeps_other_escapes() {
    let (_, settings) = parse_display_line(r"h_Eta 1 \eta").unwrap();
    assert_eq!(settings.x_title, r"\eta");
}

#[test]
fn display_line_without_label() {
    let (_, settings) = parse_display_line("h_Num_PV 5").unwrap();
    assert_eq!(settings.rebin, 5);
    assert_eq!(settings.x_title, "");
}

#[test]
fn display_line_rejects_bad_rebin() {
    assert_eq!(
        parse_display_line("h_Pt two label"),
        Err(LineError::Int("two".to_string()))
    );
    assert!(parse_display_line("h_Pt").is_err());
}

#[test]
fn display_lookup_first_match_wins() {
    let config = DisplayConfig::parse("h_Pt 2 first\nh_Pt_Lead 4 second\n");
    let (pattern, settings) = config.lookup("h_Pt_Lead").unwrap();
    assert_eq!(pattern, "h_Pt");
    assert_eq!(settings.x_title, "first");
    assert!(config.lookup("h_Eta").is_none());
}

#[test]
fn display_repeated_pattern_keeps_its_position() {
    let config = DisplayConfig::parse("h_Pt 2 a\nh_Pt_Lead 4 b\nh_Pt 3 c\n");
    assert_eq!(config.len(), 2);
    let (pattern, settings) = config.lookup("h_Pt_Lead").unwrap();
    assert_eq!(pattern, "h_Pt");
    assert_eq!(settings.rebin, 3);
    assert_eq!(settings.x_title, "c");
}

#[test]
fn display_apply_rebins_and_labels() {
    let config = DisplayConfig::parse("h_x 2 mass [GeV]\n");
    let mut hist = Histogram::uniform("h_x", 4, 0.0, 4.0).unwrap();
    hist.x_title = "old".to_string();
    let hist = config.apply(hist);
    assert_eq!(hist.n_bins(), 2);
    assert_eq!(hist.x_title, "mass [GeV]");

    let untouched = config.apply(Histogram::uniform("h_y", 4, 0.0, 4.0).unwrap());
    assert_eq!(untouched.n_bins(), 4);
}

#[test]
fn display_apply_rebin_one_keeps_bins() {
    let config = DisplayConfig::parse("h_x 1\n");
    let hist = config.apply(Histogram::uniform("h_x", 7, 0.0, 7.0).unwrap());
    assert_eq!(hist.n_bins(), 7);
}

#[test]
fn missing_config_file_is_empty() {
    let config = ScaleConfig::load(Path::new("/nonexistent/scale.txt"));
    assert!(config.is_empty());
}
