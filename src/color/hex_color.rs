use std::cmp::Ordering;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use super::error::HexColorError;

// Three 2-character groups followed by an optional numeric alpha suffix.
static HEX_COLOR_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\w{2})(\w{2})(\w{2})([0-9]*\.?[0-9]*)$").expect("valid hex color regex")
});

/// Returns true iff `s` is non-empty and made only of hex digits (any case).
pub fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// An RGB color with an opacity, e.g. `#FF0000-1.0`.
///
/// The alpha is kept floored to two decimals so that the display form, the
/// storage form and equality all agree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexColor {
    red: u8,
    green: u8,
    blue: u8,
    alpha: f64,
}

impl HexColor {
    /// Builds a color from three 2-digit hex components and an alpha in `[0, 1]`.
    pub fn new(red: &str, green: &str, blue: &str, alpha: f64) -> Result<Self, HexColorError> {
        if !(is_hex(red) && is_hex(green) && is_hex(blue)) {
            return Err(HexColorError::InvalidHex);
        }
        if red.len() != 2 || green.len() != 2 || blue.len() != 2 {
            return Err(HexColorError::InvalidLength);
        }
        if !(0.0..=1.0).contains(&alpha) {
            return Err(HexColorError::AlphaOutOfRange);
        }

        Ok(HexColor {
            red: component(red)?,
            green: component(green)?,
            blue: component(blue)?,
            alpha: floor_alpha(alpha),
        })
    }

    /// Fully opaque color.
    pub fn rgb(red: &str, green: &str, blue: &str) -> Result<Self, HexColorError> {
        Self::new(red, green, blue, 1.0)
    }

    /// Like [`HexColor::new`] but with the alpha still in textual form.
    pub fn from_components(
        red: &str,
        green: &str,
        blue: &str,
        alpha: &str,
    ) -> Result<Self, HexColorError> {
        Self::new(red, green, blue, parse_alpha(alpha)?)
    }

    /// The transparent white used as every user's default color.
    pub fn transparent() -> Self {
        HexColor {
            red: 0xFF,
            green: 0xFF,
            blue: 0xFF,
            alpha: 0.0,
        }
    }

    pub fn red(&self) -> String {
        format!("{:02X}", self.red)
    }

    pub fn green(&self) -> String {
        format!("{:02X}", self.green)
    }

    pub fn blue(&self) -> String {
        format!("{:02X}", self.blue)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// `#RRGGBB` without the alpha.
    pub fn code(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }

    /// The fixed-width form persisted in `colors.hex_color`, e.g. `FFFFFF1.0`.
    pub fn to_storage_string(&self) -> String {
        format!(
            "{:02X}{:02X}{:02X}{:?}",
            self.red, self.green, self.blue, self.alpha
        )
    }

    /// Reads back a value produced by [`HexColor::to_storage_string`].
    pub fn from_storage(stored: &str) -> Result<Self, HexColorError> {
        parse_hex_color(stored)
    }

    /// Compares against a raw, user-supplied code. Unparseable input is simply not equal.
    pub fn matches_code(&self, raw: &str) -> bool {
        parse_hex_color(raw).is_ok_and(|other| other == *self)
    }

    fn channels(&self) -> (i32, i32, i32) {
        (self.red as i32, self.green as i32, self.blue as i32)
    }

    pub fn value(&self) -> f64 {
        let (r, g, b) = self.channels();
        r.max(g).max(b) as f64 / 255.0
    }

    pub fn saturation(&self) -> f64 {
        let (r, g, b) = self.channels();
        (r.max(g).max(b) - r.min(g).min(b)) as f64 / 255.0
    }

    /// Hue in degrees, or `-1.0` for achromatic colors.
    pub fn hue(&self) -> f64 {
        let (r, g, b) = self.channels();
        let cmax = r.max(g).max(b);
        let cmin = r.min(g).min(b);
        if cmax == cmin {
            return -1.0;
        }

        let delta = (cmax - cmin) as f64;
        let hue = if b == cmax {
            60.0 * (g - r) as f64 / delta + 60.0
        } else if r == cmax {
            60.0 * (b - g) as f64 / delta + 120.0
        } else {
            60.0 * (r - b) as f64 / delta + 240.0
        };
        hue.rem_euclid(360.0)
    }

    /// Palette order: hue, then saturation, then darker-is-later.
    pub fn palette_cmp(&self, other: &HexColor) -> Ordering {
        self.hue()
            .total_cmp(&other.hue())
            .then_with(|| self.saturation().total_cmp(&other.saturation()))
            .then_with(|| other.value().total_cmp(&self.value()))
    }

    pub fn is_after(&self, other: &HexColor) -> bool {
        self.palette_cmp(other) == Ordering::Greater
    }

    pub fn is_before(&self, other: &HexColor) -> bool {
        self.palette_cmp(other) == Ordering::Less
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:?}", self.code(), self.alpha)
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("HexColor", 2)?;
        state.serialize_field("code", &self.code())?;
        state.serialize_field("alpha", &self.alpha)?;
        state.end()
    }
}

/// Parses a free-form code such as `ffffff`, `FF00000.5` or `#ff0000-----1.0`.
///
/// Everything that is neither alphanumeric nor `.` is stripped before matching.
pub fn parse_hex_color(code: &str) -> Result<HexColor, HexColorError> {
    let sanitized: String = code
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '.')
        .collect();

    let caps = HEX_COLOR_CODE
        .captures(&sanitized)
        .ok_or(HexColorError::MalformedCode)?;

    let (red, green, blue) = (&caps[1], &caps[2], &caps[3]);
    if !(is_hex(red) && is_hex(green) && is_hex(blue)) {
        return Err(HexColorError::InvalidHex);
    }

    let alpha = match &caps[4] {
        "" => 1.0,
        suffix => parse_alpha(suffix)?,
    };

    HexColor::new(red, green, blue, alpha)
}

fn parse_alpha(text: &str) -> Result<f64, HexColorError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| HexColorError::InvalidAlpha(text.to_string()))
}

fn component(hex: &str) -> Result<u8, HexColorError> {
    u8::from_str_radix(hex, 16).map_err(|_| HexColorError::InvalidHex)
}

// The epsilon keeps values like 0.29 from flooring to 0.28.
fn floor_alpha(alpha: f64) -> f64 {
    (alpha * 100.0 + 1e-9).floor() / 100.0
}
