use serde::{Deserialize, Serialize};

/// A color value as written in a script file: a channel triple and an
/// optional color-space qualifier (`rgb { 200 0 0 }`, `hsv { 0.5 1 1 }`,
/// or a bare `{ 200 0 0 }`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorAttachment {
    /// The qualifier in front of the channel block, if any.
    pub space: Option<String>,
    /// Channel values in file order. Non-numeric entries are `NaN`.
    pub channels: Vec<f64>,
}

impl ColorAttachment {
    /// An unqualified (RGB) attachment.
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self {
            space: None,
            channels: vec![r, g, b],
        }
    }

    /// An `hsv`-qualified attachment.
    pub fn hsv(h: f64, s: f64, v: f64) -> Self {
        Self {
            space: Some("hsv".into()),
            channels: vec![h, s, v],
        }
    }
}

/// How a [`ColorAttachment`]'s channels are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Red, green, blue in 0-255.
    Rgb,
    /// Hue in degrees, saturation and value as fractions.
    Hsv,
    /// Any other qualifier. Such colors convert to `0`.
    Unknown,
}

impl ColorSpace {
    /// Classify a qualifier. A missing qualifier means RGB.
    pub fn of(space: Option<&str>) -> Self {
        match space {
            None => Self::Rgb,
            Some(s) if s.eq_ignore_ascii_case("rgb") => Self::Rgb,
            Some(s) if s.eq_ignore_ascii_case("hsv") => Self::Hsv,
            Some(_) => Self::Unknown,
        }
    }
}

/// Three 0-255 channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Split a packed `0xRRGGBB` color. Bits above the low 24 are ignored.
    pub fn from_packed(color: u32) -> Self {
        let [_, r, g, b] = color.to_be_bytes();
        Self { r, g, b }
    }
}

/// Convert HSV to RGB. Hue is in degrees and wraps; saturation and value are
/// clamped to `[0, 1]`.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Rgb {
    let h = if h.is_finite() { h.rem_euclid(360.0) } else { 0.0 };
    let s = if s.is_nan() { 0.0 } else { s.clamp(0.0, 1.0) };
    let v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };

    let c = v * s;
    let sector = h / 60.0;
    let x = c * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match sector as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let channel = |f: f64| ((f + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb {
        r: channel(r),
        g: channel(g),
        b: channel(b),
    }
}

/// Pack a color attachment into `0xRRGGBB`.
///
/// Absent attachments, attachments with fewer than three channels, and
/// unknown color spaces give `0`. RGB channels are truncated to integers and
/// packed as `(r << 16) | (g << 8) | b` without masking, so a channel outside
/// 0-255 spills into its neighbours.
pub fn convert_color(color: Option<&ColorAttachment>) -> u32 {
    let Some(color) = color else {
        return 0;
    };
    if color.channels.len() < 3 {
        return 0;
    }
    let (a, b, c) = (color.channels[0], color.channels[1], color.channels[2]);

    match ColorSpace::of(color.space.as_deref()) {
        ColorSpace::Rgb => pack(truncate(a), truncate(b), truncate(c)),
        ColorSpace::Hsv => {
            let rgb = hsv_to_rgb(a, b, c);
            pack(i32::from(rgb.r), i32::from(rgb.g), i32::from(rgb.b))
        }
        ColorSpace::Unknown => 0,
    }
}

/// Format a packed color as `#RRGGBB`.
pub fn format_color(color: u32) -> String {
    format!("#{:06X}", color & 0x00FF_FFFF)
}

// NaN truncates to 0.
fn truncate(channel: f64) -> i32 {
    channel as i64 as i32
}

fn pack(r: i32, g: i32, b: i32) -> u32 {
    (r.wrapping_shl(16) | g.wrapping_shl(8) | b) as u32
}
