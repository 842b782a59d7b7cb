//! RGB color stops, three-stop color schemes and the named presets used by the budget charts.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// An RGB color with one byte per channel.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct ColorStop {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorStop {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear interpolation towards `other` at fraction `t`, rounding each channel.
    pub fn lerp(&self, other: &ColorStop, t: f64) -> ColorStop {
        ColorStop {
            r: lerp_channel(self.r, other.r, t),
            g: lerp_channel(self.g, other.g, t),
            b: lerp_channel(self.b, other.b, t),
        }
    }

    /// Formats as `#rrggbb` with lowercase hex digits.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parses `#rrggbb` or `rrggbb`, either case.
    pub fn from_hex(s: &str) -> Option<ColorStop> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |ix: usize| u8::from_str_radix(&hex[ix..ix + 2], 16).ok();
        Some(ColorStop::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

fn lerp_channel(c1: u8, c2: u8, t: f64) -> u8 {
    let c1 = f64::from(c1);
    let c2 = f64::from(c2);
    (c1 + (c2 - c1) * t).round().clamp(0.0, 255.0) as u8
}

impl fmt::Display for ColorStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ColorStop {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ColorStop {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ColorStop::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid hex color '{s}'")))
    }
}

/// The three reference colors of a gradient. `low` is used at the minimum, `mid` at the median
/// and `high` at the maximum. No ordering between the colors themselves is implied.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ColorScheme {
    pub low: ColorStop,
    pub mid: ColorStop,
    pub high: ColorStop,
}

impl ColorScheme {
    pub const fn new(low: ColorStop, mid: ColorStop, high: ColorStop) -> Self {
        Self { low, mid, high }
    }
}

/// Light yellow through orange to a soft red.
pub const RED_TO_YELLOW: ColorScheme = ColorScheme::new(
    ColorStop::new(0xFF, 0xFF, 0xCC),
    ColorStop::new(0xFF, 0xD5, 0x80),
    ColorStop::new(0xF1, 0xCC, 0xCC),
);

/// Green yellow through a pastel lime to lime green.
pub const GREEN_TO_LIGHT_GREEN: ColorScheme = ColorScheme::new(
    ColorStop::new(0xAD, 0xFF, 0x2F),
    ColorStop::new(0x7C, 0xFC, 0x7C),
    ColorStop::new(0x32, 0xCD, 0x32),
);

/// The named color scheme presets.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemePreset {
    #[default]
    RedToYellow,
    GreenToLightGreen,
}

serde_plain::derive_display_from_serialize!(SchemePreset);
serde_plain::derive_fromstr_from_deserialize!(SchemePreset);

impl SchemePreset {
    pub fn scheme(&self) -> ColorScheme {
        match self {
            SchemePreset::RedToYellow => RED_TO_YELLOW,
            SchemePreset::GreenToLightGreen => GREEN_TO_LIGHT_GREEN,
        }
    }
}

impl From<SchemePreset> for ColorScheme {
    fn from(preset: SchemePreset) -> Self {
        preset.scheme()
    }
}
