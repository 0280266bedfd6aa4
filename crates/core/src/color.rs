use std::fmt;

use once_cell::sync::Lazy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |at: usize| u8::from_str_radix(&digits[at..at + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// ColorBrewer YlOrRd, 4 classes (lightest → darkest).
pub const YL_OR_RD_4: [Rgb; 4] = [
    Rgb::new(0xff, 0xff, 0xb2),
    Rgb::new(0xfe, 0xcc, 0x5c),
    Rgb::new(0xfd, 0x8d, 0x3c),
    Rgb::new(0xe3, 0x1a, 0x1c),
];

/// Fill of a residue without a score.
pub const DEFAULT_FILL: Rgb = Rgb::new(0xf2, 0xf2, 0xf2);

/// Process-wide score colour map, anchored at 0, 1/3, 2/3 and 1.
pub static COLOR_SCALE: Lazy<ColorScale> = Lazy::new(|| ColorScale::sequential(&YL_OR_RD_4));

/// Piecewise-linear colour map over increasing anchor values.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    stops: Vec<(f64, Rgb)>,
}

impl ColorScale {
    /// Spread `palette` evenly over [0, 1].
    pub fn sequential(palette: &[Rgb]) -> Self {
        let last = palette.len().saturating_sub(1).max(1) as f64;
        let stops = palette
            .iter()
            .enumerate()
            .map(|(i, &c)| (i as f64 / last, c))
            .collect();
        Self { stops }
    }

    pub fn stops(&self) -> &[(f64, Rgb)] {
        &self.stops
    }

    /// Colour for a score. Absent and NaN scores get [`DEFAULT_FILL`];
    /// scores outside the anchor range clamp to the end colours.
    pub fn color_for(&self, value: Option<f64>) -> Rgb {
        let Some(v) = value.filter(|v| !v.is_nan()) else {
            return DEFAULT_FILL;
        };
        let (Some(&(lo, first)), Some(&(hi, last))) = (self.stops.first(), self.stops.last())
        else {
            return DEFAULT_FILL;
        };
        if v <= lo {
            return first;
        }
        if v >= hi {
            return last;
        }
        for w in self.stops.windows(2) {
            let ((v1, c1), (v2, c2)) = (w[0], w[1]);
            if v <= v2 {
                return c1.lerp(c2, (v - v1) / (v2 - v1));
            }
        }
        last
    }
}
