use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{VoyageError, VoyageResult};
use serde::{Deserialize, Serialize};

/// Straight-alpha RGBA8 color as written in configs (`"#1f4e79"`, `"#1f4e7980"` or `[r,g,b,a]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color from RGB.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from RGBA.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional, case-insensitive).
    pub fn parse_hex(s: &str) -> VoyageResult<Self> {
        let t = s.trim();
        let t = t.strip_prefix('#').unwrap_or(t);

        fn hex_byte(pair: &str) -> VoyageResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| VoyageError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        if !t.is_ascii() {
            return Err(VoyageError::validation(format!("invalid hex color \"{s}\"")));
        }
        match t.len() {
            6 => Ok(Self::rgb(
                hex_byte(&t[0..2])?,
                hex_byte(&t[2..4])?,
                hex_byte(&t[4..6])?,
            )),
            8 => Ok(Self::rgba(
                hex_byte(&t[0..2])?,
                hex_byte(&t[2..4])?,
                hex_byte(&t[4..6])?,
                hex_byte(&t[6..8])?,
            )),
            _ => Err(VoyageError::validation(format!(
                "hex color \"{s}\" must be #RRGGBB or #RRGGBBAA"
            ))),
        }
    }

    /// Same color with alpha scaled by `opacity` (clamped to `0..=1`).
    pub fn with_opacity(self, opacity: f32) -> Self {
        let o = opacity.clamp(0.0, 1.0);
        Self {
            a: (f32::from(self.a) * o).round() as u8,
            ..self
        }
    }

    /// Premultiplied form used by surfaces.
    pub fn premul(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.a)
    }

    /// `#rrggbbaa` form.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }

    /// Bytes in `[r, g, b, a]` order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Serialize for Rgba8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgba8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Arr(Vec<u8>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => Self::parse_hex(&s).map_err(serde::de::Error::custom),
            Repr::Arr(v) => match v[..] {
                [r, g, b] => Ok(Self::rgb(r, g, b)),
                [r, g, b, a] => Ok(Self::rgba(r, g, b, a)),
                _ => Err(serde::de::Error::custom(
                    "rgba array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
