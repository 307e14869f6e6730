//! Theme color parsing and the button gradients derived from it.

use std::fmt;
use winnow::ascii::{digit1, space0};
use winnow::combinator::{alt, opt};
use winnow::prelude::*;

/// Gradient used when no theme color is configured.
pub const DEFAULT_GRADIENT: &str = "linear-gradient(135deg, #00B9F2 0%, #1661BE 70%)";

/// Theme color assumed when theme colors are enabled but none is given.
pub const DEFAULT_THEME_COLOR: &str = "#1661BE";

/// Share of each channel removed for the gradient's end stop.
pub const DARKEN_FACTOR: f64 = 0.2;

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Used when a color string cannot be read.
pub const FALLBACK: Rgb = Rgb::new(22, 97, 190);

pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rgb` or `#rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?;
        let bytes = hex.as_bytes();
        match bytes.len() {
            3 => Some(Self::new(
                hex_val(bytes[0])? * 17,
                hex_val(bytes[1])? * 17,
                hex_val(bytes[2])? * 17,
            )),
            6 => Some(Self::new(
                hex_val(bytes[0])? << 4 | hex_val(bytes[1])?,
                hex_val(bytes[2])? << 4 | hex_val(bytes[3])?,
                hex_val(bytes[4])? << 4 | hex_val(bytes[5])?,
            )),
            _ => None,
        }
    }

    /// `rgb(r, g, b)` or `rgba(r, g, b, a)`; the alpha is ignored.
    pub fn from_functional(s: &str) -> Option<Self> {
        let mut input = s.trim();
        parse_functional.parse_next(&mut input).ok()
    }

    /// Parse any supported notation, falling back to [`FALLBACK`].
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        let parsed = if s.starts_with('#') {
            Self::from_hex(s)
        } else {
            Self::from_functional(s)
        };
        parsed.unwrap_or_else(|| {
            log::warn!("unreadable color `{s}`, using fallback");
            FALLBACK
        })
    }

    /// Scale every channel by `1 - factor`, rounding down.
    #[must_use]
    pub fn darken(self, factor: f64) -> Self {
        let scale = |c: u8| (f64::from(c) * (1.0 - factor)).floor().clamp(0.0, 255.0) as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }

    /// CSS `rgb(r, g, b)` notation.
    pub fn to_css(self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Gradient from the theme color to a 20 % darker shade, or
/// [`DEFAULT_GRADIENT`] when there is no theme color.
pub fn computed_gradient(theme_color: Option<&str>) -> String {
    match theme_color.map(str::trim).filter(|c| !c.is_empty()) {
        None => DEFAULT_GRADIENT.to_string(),
        Some(theme) => {
            let darker = Rgb::parse(theme).darken(DARKEN_FACTOR);
            format!("linear-gradient(135deg, {theme} 0%, {} 70%)", darker.to_css())
        }
    }
}

fn channel(input: &mut &str) -> ModalResult<u8> {
    let _ = space0.parse_next(input)?;
    let digits = digit1.parse_next(input)?;
    let _ = space0.parse_next(input)?;
    Ok(digits.parse::<u16>().map_or(255, |v| v.min(255)) as u8)
}

fn parse_functional(input: &mut &str) -> ModalResult<Rgb> {
    let _ = alt(("rgba(", "rgb(")).parse_next(input)?;
    let r = channel.parse_next(input)?;
    let _ = ','.parse_next(input)?;
    let g = channel.parse_next(input)?;
    let _ = ','.parse_next(input)?;
    let b = channel.parse_next(input)?;
    let _ = opt(',').parse_next(input)?;
    Ok(Rgb::new(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_forms() {
        assert_eq!(Rgb::parse("#1661BE"), Rgb::new(22, 97, 190));
        assert_eq!(Rgb::parse("#fff"), Rgb::new(255, 255, 255));
        assert_eq!(Rgb::parse("#0a0B0c"), Rgb::new(10, 11, 12));
    }

    #[test]
    fn parse_functional_forms() {
        assert_eq!(Rgb::parse("rgb(10, 20, 30)"), Rgb::new(10, 20, 30));
        assert_eq!(Rgb::parse("rgba(1,2,3,0.5)"), Rgb::new(1, 2, 3));
    }

    #[test]
    fn unreadable_colors_fall_back() {
        assert_eq!(Rgb::parse("papayawhip"), FALLBACK);
        assert_eq!(Rgb::parse("#12345"), FALLBACK);
        assert_eq!(Rgb::parse("#zzzzzz"), FALLBACK);
    }

    #[test]
    fn darken_floors_each_channel() {
        assert_eq!(Rgb::new(22, 97, 190).darken(0.2), Rgb::new(17, 77, 152));
        assert_eq!(Rgb::new(0, 0, 0).darken(0.2), Rgb::new(0, 0, 0));
    }

    #[test]
    fn gradient_from_theme() {
        assert_eq!(
            computed_gradient(Some("#1661BE")),
            "linear-gradient(135deg, #1661BE 0%, rgb(17, 77, 152) 70%)"
        );
        assert_eq!(computed_gradient(None), DEFAULT_GRADIENT);
        assert_eq!(computed_gradient(Some("  ")), DEFAULT_GRADIENT);
    }

    #[test]
    fn display_is_hex() {
        assert_eq!(Rgb::new(22, 97, 190).to_string(), "#1661BE");
    }
}
