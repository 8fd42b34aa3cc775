//! Color indices in the numbering used by the CMS plotting tools: a base hue
//! index (`kRed` = 632, ...) plus a signed shade offset.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseHue {
    Red,
    Blue,
    Green,
    Magenta,
    Yellow,
    Orange,
    Azure,
}

impl BaseHue {
    pub const ALL: [BaseHue; 7] = [
        BaseHue::Red,
        BaseHue::Blue,
        BaseHue::Green,
        BaseHue::Magenta,
        BaseHue::Yellow,
        BaseHue::Orange,
        BaseHue::Azure,
    ];

    /// Accepts both `kRed` and `Red`.
    pub fn from_keyword(keyword: &str) -> Option<BaseHue> {
        let bare = keyword.strip_prefix('k').unwrap_or(keyword);
        Some(match bare {
            "Red" => BaseHue::Red,
            "Blue" => BaseHue::Blue,
            "Green" => BaseHue::Green,
            "Magenta" => BaseHue::Magenta,
            "Yellow" => BaseHue::Yellow,
            "Orange" => BaseHue::Orange,
            "Azure" => BaseHue::Azure,
            _ => return None,
        })
    }

    pub fn index(self) -> i32 {
        match self {
            BaseHue::Red => 632,
            BaseHue::Blue => 600,
            BaseHue::Green => 416,
            BaseHue::Magenta => 616,
            BaseHue::Yellow => 400,
            BaseHue::Orange => 800,
            BaseHue::Azure => 860,
        }
    }

    fn rgb(self) -> (u8, u8, u8) {
        match self {
            BaseHue::Red => (255, 0, 0),
            BaseHue::Blue => (0, 0, 255),
            BaseHue::Green => (0, 255, 0),
            BaseHue::Magenta => (255, 0, 255),
            BaseHue::Yellow => (255, 255, 0),
            BaseHue::Orange => (255, 204, 0),
            BaseHue::Azure => (0, 153, 255),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorIndex(pub i32);

impl ColorIndex {
    pub const WHITE: ColorIndex = ColorIndex(0);
    pub const BLACK: ColorIndex = ColorIndex(1);

    /// `None` when the offset pushes the index out of `i32`.
    pub fn from_hue(hue: BaseHue, offset: i32) -> Option<ColorIndex> {
        hue.index().checked_add(offset).map(ColorIndex)
    }

    /// Approximate screen color. Positive offsets darken the base hue,
    /// negative offsets lighten it; indices outside a hue wheel render black.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self.0 {
            0 => return (255, 255, 255),
            1 => return (0, 0, 0),
            _ => {}
        }
        let Some((hue, offset)) = BaseHue::ALL.iter().find_map(|&hue| {
            let offset = self.0.checked_sub(hue.index())?;
            (-10..=4).contains(&offset).then_some((hue, offset))
        }) else {
            return (0, 0, 0);
        };

        let (r, g, b) = hue.rgb();
        let shade = |c: u8| -> u8 {
            let c = c as f64;
            let shaded = if offset >= 0 {
                c * (1.0 - 0.18 * offset as f64)
            } else {
                c + (255.0 - c) * 0.09 * (-offset) as f64
            };
            shaded.round().clamp(0.0, 255.0) as u8
        };
        (shade(r), shade(g), shade(b))
    }
}

impl fmt::Display for ColorIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[test]
fn keywords_with_and_without_prefix() {
    assert_eq!(BaseHue::from_keyword("kRed"), Some(BaseHue::Red));
    assert_eq!(BaseHue::from_keyword("Azure"), Some(BaseHue::Azure));
    assert_eq!(BaseHue::from_keyword("kCyan"), None);
}

#[test]
fn offset_adds_to_base_index() {
    assert_eq!(ColorIndex::from_hue(BaseHue::Red, 1), Some(ColorIndex(633)));
    assert_eq!(ColorIndex::from_hue(BaseHue::Orange, -3), Some(ColorIndex(797)));
}

#[test]
fn extreme_offsets_do_not_overflow() {
    assert_eq!(ColorIndex::from_hue(BaseHue::Azure, i32::MAX), None);
    assert_eq!(ColorIndex::from_hue(BaseHue::Red, i32::MIN), Some(ColorIndex(i32::MIN + 632)));
    assert_eq!(ColorIndex(i32::MIN).rgb(), (0, 0, 0));
    assert_eq!(ColorIndex(i32::MAX).rgb(), (0, 0, 0));
}

#[test]
fn shades_darken_and_lighten() {
    assert_eq!(ColorIndex(632).rgb(), (255, 0, 0));
    let (dark, _, _) = ColorIndex(634).rgb();
    assert!(dark < 255);
    let (_, light, _) = ColorIndex(628).rgb();
    assert!(light > 0);
    assert_eq!(ColorIndex(5000).rgb(), (0, 0, 0));
}
