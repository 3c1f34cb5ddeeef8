//! Color tokens used in the run registry.
//!
//! Accepted forms:
//! - `#rrggbb`
//! - framework palette names, optionally shifted: `kBlue`, `kOrange+7`, `kPink-3`
//!
//! Positive shifts darken the base hue and negative shifts lighten it, which
//! matches how the palette's shade families read on a plot.

use crate::error::{QaError, QaResult};
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Blend toward `target` by `t` in [0, 1].
    fn toward(self, target: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8;
        Rgb::new(
            mix(self.r, target.r),
            mix(self.g, target.g),
            mix(self.b, target.b),
        )
    }
}

const PALETTE: &[(&str, Rgb)] = &[
    ("White", Rgb::new(255, 255, 255)),
    ("Black", Rgb::new(0, 0, 0)),
    ("Gray", Rgb::new(204, 204, 204)),
    ("Red", Rgb::new(255, 0, 0)),
    ("Green", Rgb::new(0, 255, 0)),
    ("Blue", Rgb::new(0, 0, 255)),
    ("Yellow", Rgb::new(255, 255, 0)),
    ("Magenta", Rgb::new(255, 0, 255)),
    ("Cyan", Rgb::new(0, 255, 255)),
    ("Orange", Rgb::new(255, 204, 0)),
    ("Spring", Rgb::new(204, 255, 0)),
    ("Teal", Rgb::new(0, 255, 204)),
    ("Azure", Rgb::new(0, 204, 255)),
    ("Violet", Rgb::new(204, 0, 255)),
    ("Pink", Rgb::new(255, 0, 204)),
];

const DARKEN_STEP: f64 = 0.12;
const LIGHTEN_STEP: f64 = 0.09;

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^k([A-Z][a-z]+)\s*(?:([+-])\s*(\d{1,2}))?$").expect("static color regex")
    })
}

fn hex_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^#([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})$").expect("static hex regex")
    })
}

/// Parse a registry color token into RGB.
pub fn parse_color(token: &str) -> QaResult<Rgb> {
    let token = token.trim();

    if let Some(caps) = hex_re().captures(token) {
        let channel = |i: usize| u8::from_str_radix(&caps[i], 16).unwrap_or(0);
        return Ok(Rgb::new(channel(1), channel(2), channel(3)));
    }

    let caps = token_re()
        .captures(token)
        .ok_or_else(|| QaError::bad_config(format!("unrecognized color token {:?}", token)))?;

    let base = PALETTE
        .iter()
        .find(|(name, _)| *name == &caps[1])
        .map(|(_, rgb)| *rgb)
        .ok_or_else(|| QaError::bad_config(format!("unknown palette color k{}", &caps[1])))?;

    let shift: i32 = match (caps.get(2), caps.get(3)) {
        (Some(sign), Some(n)) => {
            let n: i32 = n
                .as_str()
                .parse()
                .map_err(|_| QaError::bad_config(format!("bad color offset in {:?}", token)))?;
            if sign.as_str() == "-" { -n } else { n }
        }
        _ => 0,
    };

    Ok(match shift {
        0 => base,
        s if s > 0 => base.toward(Rgb::BLACK, s as f64 * DARKEN_STEP),
        s => base.toward(Rgb::WHITE, (-s) as f64 * LIGHTEN_STEP),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_hex_and_plain_palette_names() {
        assert_eq!(parse_color("#1f77b4").unwrap(), Rgb::new(0x1f, 0x77, 0xb4));
        assert_eq!(parse_color("kBlue").unwrap(), Rgb::new(0, 0, 255));
        assert_eq!(parse_color(" kBlack ").unwrap(), Rgb::BLACK);
    }

    #[test]
    fn shifted_tokens_darken_or_lighten() {
        let base = parse_color("kBlue").unwrap();
        let dark = parse_color("kBlue+3").unwrap();
        let light = parse_color("kPink-3").unwrap();
        assert!(dark.b < base.b);
        assert_eq!((dark.r, dark.g), (0, 0));
        assert!(light.g > 0);
        assert_eq!(light.r, 255);
        assert_eq!(parse_color("kOrange + 7").unwrap(), parse_color("kOrange+7").unwrap());
    }

    #[test]
    fn rejects_unknown_tokens() {
        for bad in ["blue", "kPurple", "#12345", "kBlue*2", ""] {
            let err = parse_color(bad).unwrap_err();
            assert!(err.is_config(), "{bad:?} should be a config error");
        }
    }
}
