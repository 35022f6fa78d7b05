use serde::{Deserialize, Serialize};
use std::fmt;

/// RGBA color representation with f32 components in [0.0, 1.0] range (sRGB).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Create a new RGBA color.
    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 1.0).
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from a hex string (`#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`).
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(ColorError::InvalidHex);
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| ColorError::InvalidHex);
        let short = |c: &str| -> Result<u8, ColorError> { Ok(channel(c)? * 17) };
        let [r, g, b, a] = match hex.len() {
            3 => [short(&hex[0..1])?, short(&hex[1..2])?, short(&hex[2..3])?, 255],
            4 => [
                short(&hex[0..1])?,
                short(&hex[1..2])?,
                short(&hex[2..3])?,
                short(&hex[3..4])?,
            ],
            6 => [
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            ],
            8 => [
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            ],
            _ => return Err(ColorError::InvalidHex),
        };
        Ok(Self::from_rgba8([r, g, b, a]))
    }

    pub fn from_rgba8(px: [u8; 4]) -> Self {
        Self::rgba(
            px[0] as f32 / 255.0,
            px[1] as f32 / 255.0,
            px[2] as f32 / 255.0,
            px[3] as f32 / 255.0,
        )
    }

    /// Convert to RGBA u8 tuple.
    pub fn to_rgba8(&self) -> [u8; 4] {
        [
            (self.r * 255.0).round().clamp(0.0, 255.0) as u8,
            (self.g * 255.0).round().clamp(0.0, 255.0) as u8,
            (self.b * 255.0).round().clamp(0.0, 255.0) as u8,
            (self.a * 255.0).round().clamp(0.0, 255.0) as u8,
        ]
    }

    /// Parse a CSS color value the rasterizer understands: hex, `rgb()`/`rgba()`,
    /// `transparent` and a small set of named colors.
    ///
    /// Color spaces the rasterizer cannot draw in (`oklch()`, `lab()`, ...)
    /// yield [`ColorError::UnsupportedSpace`]; see [`neutralize_css`].
    pub fn parse_css(input: &str) -> Result<Self, ColorError> {
        match CssColor::parse(input)? {
            CssColor::Srgb(color) => Ok(color),
            CssColor::Unsupported { function, .. } => Err(ColorError::UnsupportedSpace(function)),
        }
    }

    // --- Named constants ---

    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const RED: Color = Color {
        r: 1.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const GREEN: Color = Color {
        r: 0.0,
        g: 1.0,
        b: 0.0,
        a: 1.0,
    };
    pub const BLUE: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 1.0,
        a: 1.0,
    };
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", r, g, b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ColorError {
    #[error("invalid hex color string")]
    InvalidHex,
    #[error("invalid color syntax: {0}")]
    InvalidSyntax(String),
    #[error("unsupported color space: {0}()")]
    UnsupportedSpace(String),
}

/// A parsed CSS color value, before any neutralization.
#[derive(Debug, Clone, PartialEq)]
pub enum CssColor {
    /// A value already expressed in sRGB.
    Srgb(Color),
    /// A syntactically recognizable color function in a space the rasterizer
    /// cannot paint directly.
    Unsupported { function: String, args: Vec<String> },
}

const UNSUPPORTED_FUNCTIONS: &[&str] = &["oklch", "oklab", "lab", "lch", "color", "hwb", "color-mix"];

impl CssColor {
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let value = input.trim().to_ascii_lowercase();
        if value.starts_with('#') {
            return Ok(CssColor::Srgb(Color::from_hex(&value)?));
        }
        if let Some(color) = named_color(&value) {
            return Ok(CssColor::Srgb(color));
        }

        let (function, body) = split_function(&value)
            .ok_or_else(|| ColorError::InvalidSyntax(input.trim().to_string()))?;
        let args = split_args(body);

        match function {
            "rgb" | "rgba" => parse_rgb(&args)
                .map(CssColor::Srgb)
                .ok_or_else(|| ColorError::InvalidSyntax(input.trim().to_string())),
            f if UNSUPPORTED_FUNCTIONS.contains(&f) => Ok(CssColor::Unsupported {
                function: f.to_string(),
                args,
            }),
            _ => Err(ColorError::InvalidSyntax(input.trim().to_string())),
        }
    }
}

/// Outcome of coercing an arbitrary CSS color into something paintable.
#[derive(Debug, Clone, PartialEq)]
pub enum Neutralized {
    /// Already sRGB; painted as-is.
    Kept(Color),
    /// `oklch()`/`oklab()` mapped to the nearest in-gamut sRGB value.
    Converted { from: String, to: Color },
    /// Anything else the rasterizer cannot parse, replaced with the fallback.
    Coerced { from: String, to: Color },
}

impl Neutralized {
    pub fn color(&self) -> Color {
        match self {
            Neutralized::Kept(c) => *c,
            Neutralized::Converted { to, .. } | Neutralized::Coerced { to, .. } => *to,
        }
    }

    pub fn was_substituted(&self) -> bool {
        !matches!(self, Neutralized::Kept(_))
    }
}

/// Color painted in place of values that cannot be converted.
pub const NEUTRAL_FALLBACK: Color = Color::BLACK;

/// Coerce a CSS color string into an sRGB [`Color`] the rasterizer can paint.
pub fn neutralize_css(input: &str) -> Neutralized {
    let coerced = || Neutralized::Coerced {
        from: input.trim().to_string(),
        to: NEUTRAL_FALLBACK,
    };
    match CssColor::parse(input) {
        Ok(CssColor::Srgb(color)) => Neutralized::Kept(color),
        Ok(CssColor::Unsupported { function, args }) => {
            let converted = match function.as_str() {
                "oklch" => oklch_args(&args).map(|(l, c, h, a)| {
                    let rad = h.to_radians();
                    oklab_to_srgb(l, c * rad.cos(), c * rad.sin(), a)
                }),
                "oklab" => oklab_args(&args).map(|(l, a_, b_, a)| oklab_to_srgb(l, a_, b_, a)),
                _ => None,
            };
            match converted {
                Some(to) => Neutralized::Converted {
                    from: input.trim().to_string(),
                    to,
                },
                None => coerced(),
            }
        }
        Err(_) => coerced(),
    }
}

fn named_color(name: &str) -> Option<Color> {
    let color = match name {
        "transparent" => Color::TRANSPARENT,
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::RED,
        "lime" => Color::GREEN,
        "blue" => Color::BLUE,
        "green" => Color::from_rgba8([0, 128, 0, 255]),
        "gray" | "grey" => Color::from_rgba8([128, 128, 128, 255]),
        "orange" => Color::from_rgba8([255, 165, 0, 255]),
        _ => return None,
    };
    Some(color)
}

fn split_function(value: &str) -> Option<(&str, &str)> {
    let open = value.find('(')?;
    let body = value[open + 1..].strip_suffix(')')?;
    Some((value[..open].trim(), body))
}

/// Split function arguments on commas, whitespace and the `/` alpha separator.
/// The separator itself is kept as a token so alpha can be located.
fn split_args(body: &str) -> Vec<String> {
    body.replace('/', " / ")
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a numeric component. Percentages are mapped onto `percent_scale`.
fn component(token: &str, percent_scale: f32) -> Option<f32> {
    if let Some(pct) = token.strip_suffix('%') {
        return pct.parse::<f32>().ok().map(|v| v / 100.0 * percent_scale);
    }
    token.parse::<f32>().ok()
}

fn hue(token: &str) -> Option<f32> {
    if let Some(deg) = token.strip_suffix("deg") {
        return deg.parse().ok();
    }
    if let Some(turn) = token.strip_suffix("turn") {
        return turn.parse::<f32>().ok().map(|t| t * 360.0);
    }
    if let Some(rad) = token.strip_suffix("rad") {
        return rad.parse::<f32>().ok().map(f32::to_degrees);
    }
    token.parse().ok()
}

/// Split `[c1, c2, c3, "/", alpha]` (or legacy `[c1, c2, c3, alpha]`) into
/// the three channel tokens and an optional alpha token.
fn channels_and_alpha(args: &[String]) -> Option<(&[String], Option<&String>)> {
    let parts: Vec<&String> = args.iter().filter(|a| a.as_str() != "/").collect();
    match parts.len() {
        3 => Some((&args[..3], None)),
        4 => Some((&args[..3], parts.last().copied())),
        _ => None,
    }
}

fn alpha(token: Option<&String>) -> Option<f32> {
    match token {
        Some(t) => component(t, 1.0).map(|a| a.clamp(0.0, 1.0)),
        None => Some(1.0),
    }
}

fn parse_rgb(args: &[String]) -> Option<Color> {
    let (channels, a) = channels_and_alpha(args)?;
    let mut rgb = [0.0f32; 3];
    for (slot, token) in rgb.iter_mut().zip(channels) {
        *slot = (component(token, 255.0)? / 255.0).clamp(0.0, 1.0);
    }
    Some(Color::rgba(rgb[0], rgb[1], rgb[2], alpha(a)?))
}

fn oklch_args(args: &[String]) -> Option<(f32, f32, f32, f32)> {
    let (channels, a) = channels_and_alpha(args)?;
    let l = component(&channels[0], 1.0)?;
    let c = component(&channels[1], 0.4)?;
    let h = if channels[2] == "none" { 0.0 } else { hue(&channels[2])? };
    Some((l, c, h, alpha(a)?))
}

fn oklab_args(args: &[String]) -> Option<(f32, f32, f32, f32)> {
    let (channels, a) = channels_and_alpha(args)?;
    Some((
        component(&channels[0], 1.0)?,
        component(&channels[1], 0.4)?,
        component(&channels[2], 0.4)?,
        alpha(a)?,
    ))
}

fn oklab_to_srgb(l: f32, a: f32, b: f32, alpha: f32) -> Color {
    let l_ = l + 0.396_337_78 * a + 0.215_803_76 * b;
    let m_ = l - 0.105_561_346 * a - 0.063_854_17 * b;
    let s_ = l - 0.089_484_18 * a - 1.291_485_5 * b;

    let (l3, m3, s3) = (l_ * l_ * l_, m_ * m_ * m_, s_ * s_ * s_);

    let r = 4.076_741_7 * l3 - 3.307_711_6 * m3 + 0.230_969_94 * s3;
    let g = -1.268_438 * l3 + 2.609_757_4 * m3 - 0.341_319_38 * s3;
    let bl = -0.004_196_086_3 * l3 - 0.703_418_6 * m3 + 1.707_614_7 * s3;

    // Out-of-gamut channels are clipped.
    Color::rgba(gamma_encode(r), gamma_encode(g), gamma_encode(bl), alpha)
}

fn gamma_encode(linear: f32) -> f32 {
    let v = linear.clamp(0.0, 1.0);
    if v <= 0.003_130_8 {
        12.92 * v
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex_rgb() {
        let c = Color::from_hex("#FF8800").unwrap();
        assert_eq!(c.to_rgba8(), [255, 136, 0, 255]);
    }

    #[test]
    fn test_color_from_hex_short_forms() {
        assert_eq!(Color::from_hex("#fff").unwrap().to_rgba8(), [255, 255, 255, 255]);
        assert_eq!(Color::from_hex("#0008").unwrap().to_rgba8(), [0, 0, 0, 136]);
    }

    #[test]
    fn test_color_from_hex_invalid() {
        assert!(Color::from_hex("invalid").is_err());
        assert!(Color::from_hex("#GG0000").is_err());
    }

    #[test]
    fn test_color_display() {
        assert_eq!(format!("{}", Color::RED), "#FF0000");
        assert_eq!(format!("{}", Color::rgba(1.0, 0.0, 0.0, 0.5)), "#FF000080");
    }

    #[test]
    fn test_parse_css_rgb_forms() {
        assert_eq!(
            Color::parse_css("rgb(255, 0, 0)").unwrap().to_rgba8(),
            [255, 0, 0, 255]
        );
        assert_eq!(
            Color::parse_css("rgba(0,0,0,0.5)").unwrap().to_rgba8(),
            [0, 0, 0, 128]
        );
        assert_eq!(
            Color::parse_css("rgb(100% 0% 0% / 50%)").unwrap().to_rgba8(),
            [255, 0, 0, 128]
        );
    }

    #[test]
    fn test_parse_css_named() {
        assert_eq!(Color::parse_css("White").unwrap(), Color::WHITE);
        assert_eq!(Color::parse_css("transparent").unwrap(), Color::TRANSPARENT);
    }

    #[test]
    fn test_parse_css_rejects_oklch() {
        assert_eq!(
            Color::parse_css("oklch(62.8% 0.2577 29.23)"),
            Err(ColorError::UnsupportedSpace("oklch".into()))
        );
    }

    #[test]
    fn test_neutralize_keeps_srgb() {
        let n = neutralize_css("#16a34a");
        assert!(!n.was_substituted());
        assert_eq!(n.color().to_rgba8(), [0x16, 0xa3, 0x4a, 255]);
    }

    #[test]
    fn test_neutralize_converts_oklch_red() {
        let n = neutralize_css("oklch(62.8% 0.2577 29.23)");
        assert!(matches!(n, Neutralized::Converted { .. }));
        let c = n.color();
        assert!(c.r > 0.95, "r = {}", c.r);
        assert!(c.g < 0.05, "g = {}", c.g);
        assert!(c.b < 0.05, "b = {}", c.b);
    }

    #[test]
    fn test_neutralize_converts_oklab_white_with_alpha() {
        let c = neutralize_css("oklab(1 0 0 / 0.5)").color();
        assert!(c.r > 0.99 && c.g > 0.99 && c.b > 0.99);
        assert!((c.a - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_neutralize_coerces_other_spaces() {
        let n = neutralize_css("color(display-p3 1 0 0)");
        assert_eq!(
            n,
            Neutralized::Coerced {
                from: "color(display-p3 1 0 0)".into(),
                to: NEUTRAL_FALLBACK
            }
        );
        assert!(neutralize_css("not-a-color").was_substituted());
    }
}
